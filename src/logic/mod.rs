//! Simulation loop driving a game session.
//!
//! The loop is single threaded and cooperative. Each tick it samples the
//! clock, drains queued events into the session, advances the session by one
//! step, and publishes a snapshot. Producers on other threads only talk to it
//! through the event bus.

pub mod audio;
pub mod autoplay;
pub mod clock;
pub mod engine;
pub mod recorder;
pub mod scheduler;

use crate::input::events::EngineEvent;
use crate::render::surface::DrawSurface;
use crate::state::session::{GameSession, Phase};
use crate::state::snapshot::SessionSnapshot;
use crate::system::bus::{EventBus, EventSender};
use audio::AudioTransport;
use clock::{TimeProvider, TimelineClock};
use scheduler::{CancelToken, LoopScheduler};
use std::thread;
use std::time::{Duration, Instant};

/// Default ticks per second for [`GameLoop::run`].
pub const DEFAULT_TPS: u32 = 60;

pub struct GameLoop<T: AudioTransport, P: TimeProvider> {
    session: GameSession,
    clock: TimelineClock<P>,
    transport: T,
    bus: EventBus,
    scheduler: LoopScheduler,
}

impl<T: AudioTransport, P: TimeProvider> GameLoop<T, P> {
    pub fn new(session: GameSession, transport: T, time: P) -> Self {
        Self {
            session,
            clock: TimelineClock::new(time),
            transport,
            bus: EventBus::new(),
            scheduler: LoopScheduler::new(),
        }
    }

    /// Handle for posting key and media events from anywhere.
    pub fn sender(&self) -> EventSender {
        self.bus.sender()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Token that stops the loop from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.scheduler.token()
    }

    /// Requests a round and begins scheduling ticks.
    ///
    /// Returns `false` if the session refused to start (no song, or a round
    /// already underway).
    pub fn start(&mut self) -> bool {
        let started = self.session.request_start(self.clock.now());
        if started {
            self.clock.reset();
            self.scheduler.start();
            log::info!("LOOP: Started");
        }
        started
    }

    /// Stops the current round and cancels further ticks.
    pub fn stop(&mut self) {
        let tick = self.clock.tick(&self.transport);
        self.session
            .apply_event(EngineEvent::StopRequested, &tick, &mut self.transport);
        self.scheduler.stop();
        log::info!("LOOP: Stopped after {} frames", self.scheduler.frames());
    }

    /// Runs a single step. Returns `None` once the loop has been stopped.
    pub fn tick(&mut self, surface: &mut dyn DrawSurface) -> Option<SessionSnapshot> {
        if !self.scheduler.tick() {
            return None;
        }

        let tick = self.clock.tick(&self.transport);

        for event in self.bus.drain() {
            self.session.apply_event(event, &tick, &mut self.transport);
        }

        self.session.tick(&tick, &mut self.transport, surface);

        match self.session.phase() {
            Phase::Running if self.transport.has_ended() => {
                self.bus.sender().post(EngineEvent::TrackEnded);
            }
            Phase::Stopped | Phase::Idle => {
                self.scheduler.stop();
                log::info!("LOOP: Round over after {} frames", self.scheduler.frames());
            }
            _ => {}
        }

        let snapshot = self.session.snapshot();
        self.bus.publish(snapshot.clone());
        Some(snapshot)
    }

    /// Blocking fixed-rate loop. Ends when the round stops or the cancel
    /// token fires.
    ///
    /// `on_frame` sees every snapshot and may post events for the next tick.
    pub fn run<F>(
        &mut self,
        surface: &mut dyn DrawSurface,
        tps: u32,
        mut on_frame: F,
    ) -> Option<SessionSnapshot>
    where
        F: FnMut(&GameSession, &SessionSnapshot, &EventSender),
    {
        let target_dt = Duration::from_secs_f64(1.0 / tps.max(1) as f64);
        let sender = self.sender();
        let mut last = None;

        loop {
            let frame_start = Instant::now();
            let Some(snapshot) = self.tick(surface) else {
                return last;
            };
            on_frame(&self.session, &snapshot, &sender);
            last = Some(snapshot);

            let spent = frame_start.elapsed();
            if spent < target_dt {
                thread::sleep(target_dt - spent);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn frames(&self) -> u64 {
        self.scheduler.frames()
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn clock(&self) -> &TimelineClock<P> {
        &self.clock
    }
}

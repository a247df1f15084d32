//! Game session state machine.
//!
//! A session owns the note store and lane tracker for one song. It moves
//! through `Idle -> Countdown -> Running -> Stopped` and back to `Countdown`
//! on the next start request. All mutation happens from [`GameSession::apply_event`]
//! and [`GameSession::tick`], both called from the simulation loop.

use super::snapshot::SessionSnapshot;
use crate::database::loader::AssetLoader;
use crate::error::Result;
use crate::input::bindings::KeyMap;
use crate::input::events::EngineEvent;
use crate::input::tracker::LaneInputTracker;
use crate::logic::audio::AudioTransport;
use crate::logic::clock::Tick;
use crate::logic::engine::{ScoringEngine, StepOutcome, fall_unit};
use crate::logic::recorder::CaptureRecorder;
use crate::models::engine::constants::{COUNTDOWN_STEPS, MAX_SONG_DURATION_S};
use crate::models::engine::note::lane_symbol;
use crate::models::engine::{BeatMap, NoteStore, Playfield, TierTable};
use crate::models::settings::FallMode;
use crate::models::stats::HitStats;
use crate::render::frame::{draw_notes, draw_receptors};
use crate::render::surface::DrawSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Countdown,
    Running,
    Stopped,
}

/// What a round does with lane presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Judge presses against a loaded beat map.
    Replay,
    /// Turn presses into a new beat map.
    Capture,
}

#[derive(Debug, Clone, Copy)]
struct Countdown {
    remaining: u32,
    next_step_at: f64,
}

pub struct GameSession {
    mode: Mode,
    phase: Phase,
    field: Playfield,
    fall_mode: FallMode,
    engine: ScoringEngine,
    notes: NoteStore,
    lanes: LaneInputTracker,
    recorder: CaptureRecorder,
    captured: Option<BeatMap>,
    song_ready: bool,
    countdown: Option<Countdown>,
    total_score: u32,
    hit_stats: HitStats,
    message: String,
    hit_label: Option<String>,
    last_unit: f64,
    last_audio_time: f64,
}

impl GameSession {
    pub fn new(keys: KeyMap, field: Playfield, mode: Mode, fall_mode: FallMode) -> Self {
        let mut lanes = LaneInputTracker::new(keys);
        lanes.layout(field.spacing);

        Self {
            mode,
            phase: Phase::Idle,
            field,
            fall_mode,
            engine: ScoringEngine::new(TierTable::new()),
            notes: NoteStore::default(),
            lanes,
            recorder: CaptureRecorder::new(),
            captured: None,
            song_ready: false,
            countdown: None,
            total_score: 0,
            hit_stats: HitStats::new(),
            message: String::new(),
            hit_label: None,
            last_unit: 0.0,
            last_audio_time: 0.0,
        }
    }

    /// Validates and installs the beat map for replay rounds.
    pub fn load_beat_map(&mut self, beat_map: BeatMap) -> Result<()> {
        let store = NoteStore::load(beat_map, self.field.spacing)?;
        log::info!("SESSION: Loaded beat map with {} notes", store.len());
        self.notes = store;
        Ok(())
    }

    /// Accepts or refuses the song based on its probed duration.
    ///
    /// Songs longer than an hour (or with a nonsensical duration) leave the
    /// session unable to start.
    pub fn prepare_song(&mut self, duration: f64) -> bool {
        if !duration.is_finite() || duration < 0.0 || duration > MAX_SONG_DURATION_S {
            log::warn!(
                "SESSION: Refusing song of {:.1}s (limit {:.0}s)",
                duration,
                MAX_SONG_DURATION_S
            );
            self.song_ready = false;
            return false;
        }
        self.song_ready = true;
        true
    }

    /// Setup before a round: fetches the beat map (replay only) and probes
    /// the song length.
    pub fn load_assets(
        &mut self,
        loader: &dyn AssetLoader,
        song: &str,
        beat_map: Option<&str>,
    ) -> Result<bool> {
        if self.mode == Mode::Replay {
            if let Some(location) = beat_map {
                let map = loader.fetch_beat_map(location)?;
                self.load_beat_map(map)?;
            }
        }
        let duration = loader.probe_duration(song)?;
        Ok(self.prepare_song(duration))
    }

    /// Re-lays out the field for a new screen size.
    pub fn resize(&mut self, screen_width: f64, screen_height: f64) {
        self.field = Playfield::from_screen(screen_width, screen_height);
        self.notes.layout(self.field.spacing);
        self.lanes.layout(self.field.spacing);
    }

    /// Changes mode between rounds. Refused while a round is underway.
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if matches!(self.phase, Phase::Countdown | Phase::Running) {
            return false;
        }
        self.mode = mode;
        true
    }

    /// Begins the countdown.
    ///
    /// Duplicate requests during a countdown or a running round are ignored,
    /// as are requests before a song has been accepted.
    pub fn request_start(&mut self, now: f64) -> bool {
        if matches!(self.phase, Phase::Countdown | Phase::Running) {
            return false;
        }
        if !self.song_ready {
            log::warn!("SESSION: Start requested without a playable song");
            return false;
        }

        self.phase = Phase::Countdown;
        self.countdown = Some(Countdown {
            remaining: COUNTDOWN_STEPS,
            next_step_at: now + 1.0,
        });
        self.message = COUNTDOWN_STEPS.to_string();
        log::info!("SESSION: Countdown started ({:?} mode)", self.mode);
        true
    }

    /// Ends a running round or aborts a countdown.
    ///
    /// A second stop while the stop message is on screen changes nothing.
    pub fn stop(&mut self, message: &str, transport: &mut dyn AudioTransport) -> bool {
        if !matches!(self.phase, Phase::Countdown | Phase::Running) {
            return false;
        }

        let was_running = self.phase == Phase::Running;
        self.countdown = None;
        self.phase = Phase::Stopped;
        self.message = message.to_string();
        self.hit_label = None;

        transport.pause();
        transport.rewind();

        self.notes.reset();
        self.lanes.reset();

        // A countdown abort keeps whatever the previous round captured.
        if was_running && self.mode == Mode::Capture {
            let map = self.recorder.finish();
            log::info!("SESSION: Captured {} notes", map.len());
            self.captured = Some(map);
        }

        log::info!("SESSION: Stopped ({})", message);
        true
    }

    /// Applies one queued event.
    pub fn apply_event(
        &mut self,
        event: EngineEvent,
        tick: &Tick,
        transport: &mut dyn AudioTransport,
    ) {
        match event {
            EngineEvent::KeyDown { symbol, at } => {
                let Some(lane) = self.lanes.on_down(&symbol, at, tick.audio_time) else {
                    return;
                };
                if self.mode == Mode::Capture && self.phase == Phase::Running && tick.playing {
                    let x = self.lanes.lanes()[lane].x;
                    let lane_name = lane_symbol(lane).unwrap_or(symbol.as_str());
                    self.recorder.record(lane, lane_name, x, tick.audio_time);
                }
            }
            EngineEvent::KeyUp { symbol, at } => {
                self.lanes.on_up(&symbol, at);
            }
            EngineEvent::TrackEnded => {
                let message = format!("Final Score: {}", self.total_score);
                self.stop(&message, transport);
            }
            EngineEvent::StopRequested => {
                let message = format!("Stopped. Score: {}", self.total_score);
                self.stop(&message, transport);
            }
        }
    }

    /// Runs one simulation step and draws the frame.
    pub fn tick(
        &mut self,
        tick: &Tick,
        transport: &mut dyn AudioTransport,
        surface: &mut dyn DrawSurface,
    ) -> StepOutcome {
        self.last_audio_time = tick.audio_time;

        if self.lanes.take_due_label_clear(tick.now) {
            self.hit_label = None;
        }

        if self.phase == Phase::Countdown {
            self.advance_countdown(tick.now, transport);
        }

        surface.clear(self.field.width, self.field.height);
        draw_receptors(surface, &self.field, &self.lanes, tick.now);

        if self.phase != Phase::Running || !tick.playing || self.mode != Mode::Replay {
            return StepOutcome::default();
        }

        let unit = fall_unit(self.field.base_unit(), tick.frame_delta, self.fall_mode);
        self.last_unit = unit;

        let outcome = self
            .engine
            .step(&mut self.notes, &self.lanes, tick.audio_time, &self.field, unit);

        for _ in 0..outcome.skipped {
            self.hit_stats.record_skip();
        }
        for judgement in &outcome.judgements {
            self.hit_stats.record(judgement.tier);
            self.total_score += judgement.tier.points() as u32;
            self.hit_label = Some(self.engine.tiers().label(judgement.tier).to_string());
        }

        draw_notes(surface, &self.field, &self.notes, tick.audio_time);
        outcome
    }

    fn advance_countdown(&mut self, now: f64, transport: &mut dyn AudioTransport) {
        while let Some(countdown) = self.countdown.as_mut() {
            if now < countdown.next_step_at {
                return;
            }
            countdown.remaining -= 1;
            countdown.next_step_at += 1.0;

            if countdown.remaining == 0 {
                self.countdown = None;
                self.begin_round(transport);
                return;
            }
            self.message = countdown.remaining.to_string();
        }
    }

    fn begin_round(&mut self, transport: &mut dyn AudioTransport) {
        self.message.clear();
        self.hit_label = None;
        self.total_score = 0;
        self.hit_stats = HitStats::new();
        self.notes.reset();
        self.lanes.reset();
        self.recorder.clear();
        self.captured = None;

        transport.rewind();
        transport.play();

        self.phase = Phase::Running;
        log::info!("SESSION: Running");
    }

    /// Zeroes score, note state and lane state.
    pub fn reset(&mut self) {
        self.total_score = 0;
        self.hit_stats = HitStats::new();
        self.hit_label = None;
        self.notes.reset();
        self.lanes.reset();
    }

    /// Takes the beat map produced by the last capture round.
    pub fn take_capture(&mut self) -> Option<BeatMap> {
        self.captured.take()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            mode: self.mode,
            message: self.message.clone(),
            hit_label: self.hit_label.clone(),
            total_score: self.total_score,
            hit_stats: self.hit_stats.clone(),
            accuracy: self.hit_stats.calculate_accuracy(),
            cursor: self.notes.cursor(),
            note_count: self.notes.len(),
            lanes_held: self.lanes.held_mask(),
            audio_time: self.last_audio_time,
            unit: self.last_unit,
            captured_notes: self.recorder.len(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn hit_label(&self) -> Option<&str> {
        self.hit_label.as_deref()
    }

    pub fn field(&self) -> &Playfield {
        &self.field
    }

    pub fn notes(&self) -> &NoteStore {
        &self.notes
    }

    pub fn lanes(&self) -> &LaneInputTracker {
        &self.lanes
    }

    pub fn is_song_ready(&self) -> bool {
        self.song_ready
    }
}

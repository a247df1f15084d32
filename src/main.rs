//! Command-line front end: headless autoplay and scripted capture.

use beatlane::database::{AssetLoader, BeatMapArchive, FileLoader};
use beatlane::input::EngineEvent;
use beatlane::logic::GameLoop;
use beatlane::logic::audio::SimulatedTransport;
use beatlane::logic::autoplay::Autoplay;
use beatlane::logic::clock::{ManualTime, SystemTimeProvider, TimeProvider};
use beatlane::models::engine::{BeatMap, Playfield};
use beatlane::models::settings::Settings;
use beatlane::render::CommandRecorder;
use beatlane::{GameSession, Mode, Phase, Result, SessionSnapshot};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "beatlane", about = "Nine-lane rhythm engine")]
struct Args {
    /// Settings file (defaults are used when it does not exist).
    #[arg(long, default_value = "settings.toml")]
    settings: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Autoplay a beat map and print the final score.
    Play {
        /// Beat map, JSON or `.bm` archive.
        map: PathBuf,

        /// Song length in seconds. Defaults to just past the last note.
        #[arg(long)]
        duration: Option<f64>,

        /// Pace ticks against the wall clock instead of simulating frames.
        #[arg(long)]
        realtime: bool,
    },
    /// Feed a press script through capture mode and write the beat map.
    Record {
        /// JSON list of `{ "key": "a", "time": 10.0 }` presses.
        script: PathBuf,

        #[arg(short, long)]
        out: PathBuf,

        #[arg(long)]
        duration: Option<f64>,

        /// Also store a compressed copy in the archive directory.
        #[arg(long)]
        archive: bool,
    },
}

/// One scripted key press, in song time.
#[derive(Debug, Deserialize)]
struct ScriptedPress {
    key: String,
    time: f64,
    #[serde(default = "default_hold")]
    hold: f64,
}

fn default_hold() -> f64 {
    0.1
}

fn main() {
    if std::env::var_os("RUST_LOG").is_none() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    let args = Args::parse();

    let result = Settings::load_from(&args.settings).and_then(|settings| match args.command {
        Command::Play {
            map,
            duration,
            realtime,
        } => play(&settings, &map, duration, realtime),
        Command::Record {
            script,
            out,
            duration,
            archive,
        } => record(&settings, &script, &out, duration, archive),
    });

    if let Err(e) = result {
        log::error!("MAIN: {}", e);
        std::process::exit(1);
    }
}

fn new_session(settings: &Settings, mode: Mode) -> Result<GameSession> {
    let keys = settings.key_map()?;
    let field = Playfield::from_screen(settings.screen_width, settings.screen_height);
    Ok(GameSession::new(keys, field, mode, settings.fall_mode))
}

fn play(settings: &Settings, map_path: &Path, duration: Option<f64>, realtime: bool) -> Result<()> {
    let loader = FileLoader::new(".");
    let map = loader.fetch_beat_map(&map_path.to_string_lossy())?;
    let duration = duration.unwrap_or(map.last_target_time() + 2.0);

    let mut session = new_session(settings, Mode::Replay)?;
    session.load_beat_map(map)?;
    if !session.prepare_song(duration) {
        return Ok(());
    }

    let mut bot = Autoplay::new(settings.key_map()?);

    let last = if realtime {
        let time = SystemTimeProvider::new();
        let transport = SimulatedTransport::new(time.clone(), duration);
        let mut game = GameLoop::new(session, transport, time.clone());
        if !game.start() {
            return Ok(());
        }
        let mut surface = CommandRecorder::new();
        game.run(&mut surface, settings.target_fps, |session, snapshot, sender| {
            let events = bot.plan(
                session.notes(),
                session.field(),
                snapshot.audio_time,
                snapshot.unit,
                time.now(),
            );
            for event in events {
                sender.post(event);
            }
        })
    } else {
        let time = ManualTime::new();
        let transport = SimulatedTransport::new(time.clone(), duration);
        let mut game = GameLoop::new(session, transport, time.clone());
        if !game.start() {
            return Ok(());
        }
        simulate(&mut game, &time, settings.target_fps, |session, snapshot, now| {
            bot.plan(
                session.notes(),
                session.field(),
                snapshot.audio_time,
                snapshot.unit,
                now,
            )
        })
    };

    if let Some(snapshot) = last {
        print_result(&snapshot);
    }
    Ok(())
}

fn record(
    settings: &Settings,
    script: &Path,
    out: &Path,
    duration: Option<f64>,
    archive: bool,
) -> Result<()> {
    let text = std::fs::read_to_string(script)?;
    let mut presses: Vec<ScriptedPress> = serde_json::from_str(&text)?;
    presses.sort_by(|a, b| a.time.total_cmp(&b.time));

    let last_press = presses.iter().map(|p| p.time + p.hold).fold(0.0, f64::max);
    let duration = duration.unwrap_or(last_press + 1.0);

    let mut session = new_session(settings, Mode::Capture)?;
    if !session.prepare_song(duration) {
        return Ok(());
    }

    let time = ManualTime::new();
    let transport = SimulatedTransport::new(time.clone(), duration);
    let mut game = GameLoop::new(session, transport, time.clone());
    if !game.start() {
        return Ok(());
    }

    // Each press goes down, then up, once song time reaches it.
    let mut pending: Vec<(f64, &str, bool)> = Vec::new();
    for press in &presses {
        pending.push((press.time, press.key.as_str(), true));
        pending.push((press.time + press.hold, press.key.as_str(), false));
    }
    pending.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut next = 0;

    simulate(&mut game, &time, settings.target_fps, |_, snapshot, now| {
        let mut due = Vec::new();
        if snapshot.phase != Phase::Running {
            return due;
        }
        while let Some(&(at, key, down)) = pending.get(next) {
            if at > snapshot.audio_time {
                break;
            }
            due.push(if down {
                EngineEvent::key_down(key, now)
            } else {
                EngineEvent::key_up(key, now)
            });
            next += 1;
        }
        due
    });

    let map = game.session_mut().take_capture().unwrap_or_else(BeatMap::default);
    map.save(out)?;
    println!("Captured {} notes into {}", map.len(), out.display());

    if archive {
        let store = BeatMapArchive::new(&settings.beatmap_dir);
        let hash = store.save_archive(&map)?;
        println!("Archived as {}", store.archive_path(&hash).display());
    }
    Ok(())
}

/// Steps a loop on a manual clock, one frame per tick, until the round ends.
fn simulate<F>(
    game: &mut GameLoop<SimulatedTransport<ManualTime>, ManualTime>,
    time: &ManualTime,
    fps: u32,
    mut feed: F,
) -> Option<SessionSnapshot>
where
    F: FnMut(&GameSession, &SessionSnapshot, f64) -> Vec<EngineEvent>,
{
    let dt = 1.0 / fps.max(1) as f64;
    let sender = game.sender();
    let mut surface = CommandRecorder::new();
    let mut last = None;

    while let Some(snapshot) = game.tick(&mut surface) {
        for event in feed(game.session(), &snapshot, time.now()) {
            sender.post(event);
        }
        last = Some(snapshot);
        time.advance(dt);
    }
    last
}

fn print_result(snapshot: &SessionSnapshot) {
    let stats = &snapshot.hit_stats;
    println!("{}", snapshot.message);
    println!(
        "Perfect {} / Great {} / Ok {} / Poor {} / Miss {} / Skipped {}",
        stats.perfect, stats.great, stats.ok, stats.poor, stats.miss, stats.skipped
    );
    println!("Accuracy {:.2}%", snapshot.accuracy);
}

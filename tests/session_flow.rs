use beatlane::database::FileLoader;
use beatlane::input::{EngineEvent, KeyMap};
use beatlane::logic::GameLoop;
use beatlane::logic::audio::{AudioTransport, SimulatedTransport};
use beatlane::logic::autoplay::Autoplay;
use beatlane::logic::clock::{ManualTime, TimeProvider};
use beatlane::models::engine::{BeatMap, Note, Playfield};
use beatlane::models::settings::FallMode;
use beatlane::render::{CommandRecorder, DrawCommand};
use beatlane::{GameSession, Mode, Phase, SessionSnapshot};

/// Power-of-two frame time so song positions land on exact values.
const DT: f64 = 1.0 / 64.0;

type TestLoop = GameLoop<SimulatedTransport<ManualTime>, ManualTime>;

fn new_loop(mode: Mode, duration: f64, map: Option<BeatMap>) -> (TestLoop, ManualTime) {
    let field = Playfield::from_screen(1250.0, 750.0);
    let mut session = GameSession::new(KeyMap::default(), field, mode, FallMode::Fixed);
    if let Some(map) = map {
        session.load_beat_map(map).unwrap();
    }
    assert!(session.prepare_song(duration));

    let time = ManualTime::new();
    let transport = SimulatedTransport::new(time.clone(), duration);
    (GameLoop::new(session, transport, time.clone()), time)
}

/// Ticks until the loop stops, letting `feed` post events between frames.
fn drive<F>(game: &mut TestLoop, time: &ManualTime, mut feed: F) -> SessionSnapshot
where
    F: FnMut(&GameSession, &SessionSnapshot, f64) -> Vec<EngineEvent>,
{
    let sender = game.sender();
    let mut surface = CommandRecorder::new();
    let mut last = None;

    for _ in 0..100_000 {
        let Some(snapshot) = game.tick(&mut surface) else {
            break;
        };
        for event in feed(game.session(), &snapshot, time.now()) {
            sender.post(event);
        }
        last = Some(snapshot);
        time.advance(DT);
    }
    last.unwrap()
}

#[test]
fn autoplay_round_scores_every_note_perfect() {
    let map = BeatMap::new(vec![
        Note::new("a", 0, 0.5, 2.1),
        Note::new("s", 0, 1.0, 2.6),
        Note::new("a", 0, 1.5, 3.1),
        Note::new(";", 0, 1.5, 3.1),
    ]);
    let (mut game, time) = new_loop(Mode::Replay, 6.0, Some(map));
    let mut bot = Autoplay::new(KeyMap::default());

    assert!(game.start());
    assert!(!game.start());

    let last = drive(&mut game, &time, |session, snapshot, now| {
        bot.plan(
            session.notes(),
            session.field(),
            snapshot.audio_time,
            snapshot.unit,
            now,
        )
    });

    assert_eq!(last.phase, Phase::Stopped);
    assert_eq!(last.message, "Final Score: 20");
    assert_eq!(last.hit_stats.perfect, 4);
    assert_eq!(last.hit_stats.skipped, 0);
    assert!((last.accuracy - 100.0).abs() < 1e-9);
    assert_eq!(bot.presses(), 4);

    // The stop cancelled further ticks and rewound playback.
    let mut surface = CommandRecorder::new();
    assert!(game.tick(&mut surface).is_none());
    assert_eq!(game.transport().position(), 0.0);
    assert!(!game.is_running());
}

#[test]
fn untouched_round_scores_nothing() {
    let map = BeatMap::new(vec![Note::new("f", 0, 0.0, 1.6)]);
    let (mut game, time) = new_loop(Mode::Replay, 4.0, Some(map));
    assert!(game.start());

    let last = drive(&mut game, &time, |_, _, _| Vec::new());
    assert_eq!(last.message, "Final Score: 0");
    assert_eq!(last.hit_stats.judged(), 0);
    assert_eq!(last.hit_stats.skipped, 1);
}

#[test]
fn countdown_then_running_then_restart() {
    let (mut game, time) = new_loop(Mode::Replay, 2.0, None);
    let mut seen = Vec::new();

    assert!(game.start());
    drive(&mut game, &time, |_, snapshot, _| {
        if seen.last() != Some(&snapshot.message) {
            seen.push(snapshot.message.clone());
        }
        Vec::new()
    });

    assert_eq!(seen[..4], ["3", "2", "1", ""]);
    assert_eq!(seen.last().map(String::as_str), Some("Final Score: 0"));

    // A fresh round can be started once stopped.
    assert!(game.start());
    assert_eq!(game.session().phase(), Phase::Countdown);
}

#[test]
fn capture_round_trip_reloads_identically() {
    let (mut game, time) = new_loop(Mode::Capture, 12.0, None);
    assert!(game.start());

    let sender = game.sender();
    let mut surface = CommandRecorder::new();
    let mut pressed = false;

    while game.tick(&mut surface).is_some() {
        time.advance(DT);
        let position = game.transport().position();
        if !pressed && position >= 10.0 {
            sender.key_down("a", time.now());
            sender.key_down("a", time.now());
            sender.key_up("a", time.now());
            pressed = true;
        }
    }

    let map = game.session_mut().take_capture().unwrap();
    assert_eq!(map.len(), 1);
    let note = &map.notes[0];
    assert_eq!(note.lane, "a");
    assert_eq!(note.score, 0);
    assert_eq!(note.target_time, 10.0);
    assert!((note.spawn_time - 8.4).abs() < 1e-9);

    // Back through JSON into a replay session.
    let json = map.to_json().unwrap();
    let field = Playfield::from_screen(1250.0, 750.0);
    let mut replay = GameSession::new(KeyMap::default(), field, Mode::Replay, FallMode::Fixed);
    replay.load_beat_map(BeatMap::from_json(&json).unwrap()).unwrap();
    replay.reset();

    let reloaded = &replay.notes().notes()[0];
    assert_eq!(reloaded.lane, "a");
    assert_eq!(reloaded.spawn_time, note.spawn_time);
    assert_eq!(reloaded.target_time, 10.0);
    assert_eq!(reloaded.score, 0);
}

#[test]
fn stop_request_ends_round_once() {
    let map = BeatMap::new(vec![Note::new("j", 0, 0.0, 1.6)]);
    let (mut game, time) = new_loop(Mode::Replay, 30.0, Some(map));
    assert!(game.start());

    let mut surface = CommandRecorder::new();
    for _ in 0..256 {
        time.advance(DT);
        game.tick(&mut surface);
    }
    assert_eq!(game.session().phase(), Phase::Running);

    game.sender().post(EngineEvent::StopRequested);
    game.sender().post(EngineEvent::StopRequested);
    time.advance(DT);
    let snapshot = game.tick(&mut surface).unwrap();

    assert_eq!(snapshot.phase, Phase::Stopped);
    assert_eq!(snapshot.message, "Stopped. Score: 0");
    assert_eq!(snapshot.cursor, 0);
    assert!(game.tick(&mut surface).is_none());
}

#[test]
fn frames_draw_receptors_and_falling_notes() {
    let map = BeatMap::new(vec![Note::new("d", 0, 0.0, 1.6)]);
    let (mut game, time) = new_loop(Mode::Replay, 30.0, Some(map));
    assert!(game.start());

    let mut surface = CommandRecorder::new();
    for _ in 0..200 {
        time.advance(DT);
        game.tick(&mut surface);
    }

    let frame = surface.last_frame();
    assert!(matches!(frame[0], DrawCommand::Clear { .. }));
    // Nine receptors plus the one falling note.
    assert_eq!(surface.circles().count(), 10);
}

#[test]
fn overlong_song_never_starts() {
    let dir = tempfile::tempdir().unwrap();
    let loader = FileLoader::new(dir.path()).with_duration(3600.5);

    let field = Playfield::from_screen(1250.0, 750.0);
    let session = GameSession::new(KeyMap::default(), field, Mode::Replay, FallMode::Fixed);
    let time = ManualTime::new();
    let transport = SimulatedTransport::new(time.clone(), 3600.5);
    let mut game = GameLoop::new(session, transport, time);

    assert!(!game.session_mut().load_assets(&loader, "song.ogg", None).unwrap());
    assert!(!game.start());
    assert_eq!(game.session().phase(), Phase::Idle);
    assert!(!game.is_running());
}

use super::*;
use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct FakeState {
    playing: bool,
    stopped: bool,
    finished: bool,
    position: Duration,
    volume: f32,
    seek_fails: bool,
}

type Shared = Rc<RefCell<FakeState>>;

struct FakeHandle {
    state: Shared,
    duration: Duration,
}

impl TrackHandle for FakeHandle {
    fn play(&mut self) {
        self.state.borrow_mut().playing = true;
    }

    fn pause(&mut self) {
        self.state.borrow_mut().playing = false;
    }

    fn stop(&mut self) {
        let mut s = self.state.borrow_mut();
        s.playing = false;
        s.stopped = true;
    }

    fn seek(&mut self, position: Duration) -> Result<(), BackendError> {
        let mut s = self.state.borrow_mut();
        if s.seek_fails {
            return Err(BackendError::Seek("not seekable".into()));
        }
        s.position = position;
        Ok(())
    }

    fn position(&self) -> Duration {
        self.state.borrow().position
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    fn is_finished(&self) -> bool {
        self.state.borrow().finished
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.borrow_mut().volume = volume;
    }
}

/// Opens anything except paths containing "missing"; remembers every handle.
struct FakeBackend {
    duration: Duration,
    opened: Rc<RefCell<Vec<(PathBuf, Shared)>>>,
}

impl AudioBackend for FakeBackend {
    type Handle = FakeHandle;

    fn open(&mut self, path: &Path) -> Result<FakeHandle, BackendError> {
        if path.to_string_lossy().contains("missing") {
            return Err(BackendError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                "no such file",
            )));
        }
        let state = Rc::new(RefCell::new(FakeState {
            volume: 1.0,
            ..FakeState::default()
        }));
        self.opened
            .borrow_mut()
            .push((path.to_path_buf(), state.clone()));
        Ok(FakeHandle {
            state,
            duration: self.duration,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Track(PathBuf),
    State(bool),
    Progress(u64, u64),
    Unloaded,
}

#[derive(Default)]
struct Recorder {
    events: RefCell<Vec<Event>>,
}

impl Recorder {
    fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl PlaybackObserver for Recorder {
    fn on_track_changed(&self, track: &TrackInfo) {
        self.events
            .borrow_mut()
            .push(Event::Track(track.path.clone()));
    }

    fn on_state_changed(&self, playing: bool) {
        self.events.borrow_mut().push(Event::State(playing));
    }

    fn on_progress(&self, position_ms: u64, duration_ms: u64) {
        self.events
            .borrow_mut()
            .push(Event::Progress(position_ms, duration_ms));
    }

    fn on_unloaded(&self) {
        self.events.borrow_mut().push(Event::Unloaded);
    }
}

struct ListQueue(Vec<TrackInfo>);

impl QueueProvider for ListQueue {
    fn next_track(&self, current: Option<&TrackInfo>) -> Option<TrackInfo> {
        let pos = current.and_then(|c| self.0.iter().position(|t| t.path == c.path));
        match pos {
            Some(p) => self.0.get(p + 1).cloned(),
            None => self.0.first().cloned(),
        }
    }

    fn previous_track(&self, current: Option<&TrackInfo>) -> Option<TrackInfo> {
        let pos = current.and_then(|c| self.0.iter().position(|t| t.path == c.path))?;
        pos.checked_sub(1).and_then(|p| self.0.get(p).cloned())
    }
}

type Opened = Rc<RefCell<Vec<(PathBuf, Shared)>>>;

fn coordinator() -> (PlaybackCoordinator<FakeBackend>, Opened) {
    let opened: Opened = Rc::new(RefCell::new(Vec::new()));
    let backend = FakeBackend {
        duration: Duration::from_secs(180),
        opened: opened.clone(),
    };
    (
        PlaybackCoordinator::new(backend, DEFAULT_TICK_INTERVAL),
        opened,
    )
}

fn track(path: &str) -> TrackInfo {
    TrackInfo::new(path, "Title").with_artist("Artist1")
}

fn last_handle(opened: &Opened) -> Shared {
    opened.borrow().last().map(|(_, s)| s.clone()).unwrap()
}

#[test]
fn late_subscriber_gets_exactly_one_replay_of_current_state() {
    let (mut coord, opened) = coordinator();
    coord.load_and_play(track("/music/a.mp3")).unwrap();
    last_handle(&opened).borrow_mut().position = Duration::from_millis(1500);

    let rec = Rc::new(Recorder::default());
    assert!(coord.subscribe(rec.clone()));
    assert_eq!(
        rec.take(),
        vec![
            Event::Track(PathBuf::from("/music/a.mp3")),
            Event::State(true),
            Event::Progress(1500, 180_000),
        ]
    );

    // A duplicate registration is a no-op: no replay, no second slot.
    assert!(!coord.subscribe(rec.clone()));
    assert!(rec.take().is_empty());
    assert_eq!(coord.observer_count(), 1);
}

#[test]
fn subscribing_to_an_empty_session_replays_nothing() {
    let (mut coord, _) = coordinator();
    let rec = Rc::new(Recorder::default());
    coord.subscribe(rec.clone());
    assert!(rec.take().is_empty());
}

#[test]
fn unsubscribed_observer_stops_receiving_events() {
    let (mut coord, _) = coordinator();
    let rec = Rc::new(Recorder::default());
    let as_dyn: Rc<dyn PlaybackObserver> = rec.clone();
    coord.subscribe(as_dyn.clone());
    assert!(coord.unsubscribe(&as_dyn));
    assert!(!coord.unsubscribe(&as_dyn));

    coord.load_and_play(track("/music/a.mp3")).unwrap();
    assert!(rec.take().is_empty());
}

#[test]
fn toggle_twice_restores_state_with_a_single_ticker() {
    let (mut coord, opened) = coordinator();
    coord.load_and_play(track("/music/a.mp3")).unwrap();
    let rec = Rc::new(Recorder::default());
    coord.subscribe(rec.clone());
    rec.take();

    coord.toggle_play_pause();
    assert!(!coord.is_playing());
    assert!(!coord.is_ticking());
    assert!(!last_handle(&opened).borrow().playing);

    coord.toggle_play_pause();
    assert!(coord.is_playing());
    assert!(coord.is_ticking());
    assert!(last_handle(&opened).borrow().playing);
    assert_eq!(rec.take(), vec![Event::State(false), Event::State(true)]);

    // One schedule only: a single progress per interval.
    let now = Instant::now();
    assert!(!coord.tick(now));
    assert!(!coord.tick(now + Duration::from_millis(50)));
    let progress = rec
        .take()
        .into_iter()
        .filter(|e| matches!(e, Event::Progress(..)))
        .count();
    assert_eq!(progress, 1);
}

#[test]
fn toggle_with_nothing_loaded_is_a_no_op() {
    let (mut coord, _) = coordinator();
    let rec = Rc::new(Recorder::default());
    coord.subscribe(rec.clone());
    coord.toggle_play_pause();
    assert!(!coord.is_playing());
    assert!(!coord.is_ticking());
    assert!(rec.take().is_empty());
}

#[test]
fn failed_load_leaves_session_and_previous_track_untouched() {
    let (mut coord, opened) = coordinator();
    coord.load_and_play(track("/music/a.mp3")).unwrap();
    coord.seek(2_000);
    let before = coord.session().clone();

    let rec = Rc::new(Recorder::default());
    coord.subscribe(rec.clone());
    rec.take();

    let err = coord
        .load_and_play(track("/music/missing.mp3"))
        .unwrap_err();
    assert!(matches!(err, PlaybackError::Load { ref path, .. } if path == Path::new("/music/missing.mp3")));

    assert_eq!(coord.session(), &before);
    assert!(rec.take().is_empty());
    let previous = last_handle(&opened);
    assert!(previous.borrow().playing);
    assert!(!previous.borrow().stopped);
}

#[test]
fn loading_a_second_track_replaces_the_first() {
    let (mut coord, opened) = coordinator();
    let rec = Rc::new(Recorder::default());
    coord.subscribe(rec.clone());

    coord.load_and_play(track("/music/a.mp3")).unwrap();
    rec.take();
    coord.load_and_play(track("/music/b.mp3")).unwrap();

    let events = rec.take();
    let tracks: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, Event::Track(_)))
        .collect();
    assert_eq!(tracks, vec![&Event::Track(PathBuf::from("/music/b.mp3"))]);
    assert!(events.contains(&Event::State(true)));
    assert!(coord.is_playing());
    assert_eq!(
        coord.current_track().map(|t| t.path.clone()),
        Some(PathBuf::from("/music/b.mp3"))
    );

    let handles = opened.borrow();
    assert!(handles[0].1.borrow().stopped);
    assert!(handles[1].1.borrow().playing);
}

#[test]
fn release_resets_to_empty_and_later_calls_do_not_panic() {
    let (mut coord, opened) = coordinator();
    let rec = Rc::new(Recorder::default());
    coord.subscribe(rec.clone());
    coord.set_queue_provider(Rc::new(ListQueue(vec![track("/music/b.mp3")])));
    coord.load_and_play(track("/music/a.mp3")).unwrap();
    rec.take();

    coord.release();
    assert_eq!(rec.take(), vec![Event::Unloaded]);
    assert!(coord.session().is_empty());
    assert_eq!(coord.observer_count(), 0);
    assert!(!coord.has_queue_provider());
    assert!(!coord.is_ticking());
    assert!(last_handle(&opened).borrow().stopped);

    coord.toggle_play_pause();
    coord.seek(1_000);
    assert!(!coord.tick(Instant::now() + Duration::from_secs(1)));
    assert!(!coord.request_next().unwrap());
    coord.release();
    assert!(rec.take().is_empty());

    // Behaves like a fresh coordinator.
    coord.load_and_play(track("/music/c.mp3")).unwrap();
    assert!(coord.is_playing());
}

#[test]
fn pause_then_seek_reports_progress_once_and_stays_paused() {
    let (mut coord, _) = coordinator();
    let s1 = Rc::new(Recorder::default());
    coord.subscribe(s1.clone());

    let art = PathBuf::from("/music/cover.jpg");
    coord
        .load_and_play(track("/music/a.mp3").with_artwork(art.clone()))
        .unwrap();
    assert_eq!(
        s1.take(),
        vec![Event::Track(PathBuf::from("/music/a.mp3")), Event::State(true)]
    );
    assert_eq!(coord.current_track().and_then(|t| t.artwork.clone()), Some(art));

    coord.toggle_play_pause();
    assert_eq!(s1.take(), vec![Event::State(false)]);
    assert!(!coord.is_ticking());

    coord.seek(5_000);
    assert_eq!(s1.take(), vec![Event::Progress(5_000, 180_000)]);
    assert!(!coord.is_playing());
    assert_eq!(coord.session().progress(), Some((5_000, 180_000)));
}

#[test]
fn seek_clamps_to_track_length() {
    let (mut coord, opened) = coordinator();
    coord.load_and_play(track("/music/a.mp3")).unwrap();
    coord.seek(999_999);
    assert_eq!(coord.session().progress(), Some((180_000, 180_000)));
    assert_eq!(
        last_handle(&opened).borrow().position,
        Duration::from_millis(180_000)
    );

    coord.seek(0);
    assert_eq!(coord.session().progress(), Some((0, 180_000)));
}

#[test]
fn failed_seek_reports_the_handle_position() {
    let (mut coord, opened) = coordinator();
    coord.load_and_play(track("/music/a.mp3")).unwrap();
    {
        let h = last_handle(&opened);
        let mut s = h.borrow_mut();
        s.position = Duration::from_millis(700);
        s.seek_fails = true;
    }
    coord.seek(10_000);
    assert_eq!(coord.session().progress(), Some((700, 180_000)));
}

#[test]
fn tick_reports_handle_position_while_playing() {
    let (mut coord, opened) = coordinator();
    let rec = Rc::new(Recorder::default());
    coord.subscribe(rec.clone());
    coord.load_and_play(track("/music/a.mp3")).unwrap();
    rec.take();

    last_handle(&opened).borrow_mut().position = Duration::from_millis(4_200);
    let now = Instant::now();
    assert!(!coord.tick(now));
    assert_eq!(rec.take(), vec![Event::Progress(4_200, 180_000)]);

    assert!(!coord.tick(now + Duration::from_millis(99)));
    assert!(rec.take().is_empty());
    assert!(!coord.tick(now + Duration::from_millis(100)));
    assert_eq!(rec.take().len(), 1);
}

#[test]
fn completion_pauses_without_advancing() {
    let (mut coord, opened) = coordinator();
    let rec = Rc::new(Recorder::default());
    coord.subscribe(rec.clone());
    coord.set_queue_provider(Rc::new(ListQueue(vec![
        track("/music/a.mp3"),
        track("/music/b.mp3"),
    ])));
    coord.load_and_play(track("/music/a.mp3")).unwrap();
    rec.take();

    last_handle(&opened).borrow_mut().finished = true;
    assert!(coord.tick(Instant::now()));
    assert_eq!(rec.take(), vec![Event::State(false)]);
    assert!(!coord.is_playing());
    assert!(!coord.is_ticking());
    assert_eq!(
        coord.current_track().map(|t| t.path.clone()),
        Some(PathBuf::from("/music/a.mp3"))
    );
    assert_eq!(opened.borrow().len(), 1);
}

#[test]
fn resuming_a_finished_track_restarts_it() {
    let (mut coord, opened) = coordinator();
    coord.load_and_play(track("/music/a.mp3")).unwrap();
    last_handle(&opened).borrow_mut().finished = true;
    assert!(coord.tick(Instant::now()));

    coord.toggle_play_pause();
    assert!(coord.is_playing());
    assert_eq!(opened.borrow().len(), 2);
    assert!(opened.borrow()[0].1.borrow().stopped);
    assert_eq!(coord.session().progress(), Some((0, 180_000)));
}

#[test]
fn removing_the_loaded_track_empties_the_session() {
    let (mut coord, opened) = coordinator();
    let rec = Rc::new(Recorder::default());
    coord.subscribe(rec.clone());
    coord.load_and_play(track("/music/a.mp3")).unwrap();
    rec.take();

    assert!(!coord.track_removed(Path::new("/music/other.mp3")));
    assert!(coord.is_playing());
    assert!(rec.take().is_empty());

    assert!(coord.track_removed(Path::new("/music/a.mp3")));
    assert!(coord.session().is_empty());
    assert!(!coord.is_ticking());
    assert!(last_handle(&opened).borrow().stopped);
    assert_eq!(rec.take(), vec![Event::State(false), Event::Unloaded]);
    assert_eq!(coord.observer_count(), 1);
}

#[test]
fn releasing_an_empty_coordinator_does_not_report_an_unload() {
    let (mut coord, _) = coordinator();
    let rec = Rc::new(Recorder::default());
    coord.subscribe(rec.clone());
    coord.release();
    assert!(rec.take().is_empty());
}

#[test]
fn seek_after_completion_resumes_from_the_new_position() {
    let (mut coord, opened) = coordinator();
    let rec = Rc::new(Recorder::default());
    coord.subscribe(rec.clone());
    coord.load_and_play(track("/music/a.mp3")).unwrap();
    last_handle(&opened).borrow_mut().finished = true;
    assert!(coord.tick(Instant::now()));
    rec.take();

    coord.seek(5_000);
    assert_eq!(rec.take(), vec![Event::Progress(5_000, 180_000)]);
    assert!(!coord.is_playing());
    // The drained source was swapped for a fresh one positioned at 5 s.
    assert_eq!(opened.borrow().len(), 2);
    assert!(opened.borrow()[0].1.borrow().stopped);
    let fresh = last_handle(&opened);
    assert_eq!(fresh.borrow().position, Duration::from_millis(5_000));
    assert!(!fresh.borrow().playing);

    coord.toggle_play_pause();
    assert!(coord.is_playing());
    assert!(fresh.borrow().playing);
    assert_eq!(opened.borrow().len(), 2);
    assert_eq!(coord.session().progress(), Some((5_000, 180_000)));
    assert_eq!(rec.take(), vec![Event::State(true)]);
}

#[test]
fn navigation_goes_through_the_queue_provider() {
    let (mut coord, _) = coordinator();
    assert!(!coord.request_next().unwrap());

    let rec = Rc::new(Recorder::default());
    coord.subscribe(rec.clone());
    coord.set_queue_provider(Rc::new(ListQueue(vec![
        track("/music/a.mp3"),
        track("/music/b.mp3"),
    ])));

    assert!(!coord.request_previous().unwrap());
    assert!(coord.request_next().unwrap());
    assert!(coord.request_next().unwrap());
    assert!(!coord.request_next().unwrap());
    assert!(coord.request_previous().unwrap());

    let tracks: Vec<_> = rec
        .take()
        .into_iter()
        .filter(|e| matches!(e, Event::Track(_)))
        .collect();
    assert_eq!(
        tracks,
        vec![
            Event::Track(PathBuf::from("/music/a.mp3")),
            Event::Track(PathBuf::from("/music/b.mp3")),
            Event::Track(PathBuf::from("/music/a.mp3")),
        ]
    );
}

#[test]
fn navigation_to_an_unplayable_track_surfaces_the_error() {
    let (mut coord, _) = coordinator();
    coord.set_queue_provider(Rc::new(ListQueue(vec![track("/music/missing.mp3")])));
    assert!(matches!(
        coord.request_next(),
        Err(PlaybackError::Load { .. })
    ));
    assert!(coord.session().is_empty());
}

#[test]
fn fade_out_silences_a_playing_track() {
    let (mut coord, opened) = coordinator();
    coord.load_and_play(track("/music/a.mp3")).unwrap();
    coord.fade_out(Duration::ZERO, 20);
    assert_eq!(last_handle(&opened).borrow().volume, 0.0);

    coord.load_and_play(track("/music/b.mp3")).unwrap();
    coord.fade_out(Duration::from_millis(4), 2);
    assert_eq!(last_handle(&opened).borrow().volume, 0.0);
}

#[test]
fn fade_out_with_huge_step_counts_stays_within_its_duration() {
    let (mut coord, opened) = coordinator();
    coord.load_and_play(track("/music/a.mp3")).unwrap();

    let started = Instant::now();
    coord.fade_out(Duration::from_millis(20), 1 << 32);
    coord.fade_out(Duration::from_millis(20), u64::MAX);
    assert_eq!(last_handle(&opened).borrow().volume, 0.0);
    // Two fades of 20 ms each; generous slack for slow schedulers.
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn registry_keeps_insertion_order_and_identity() {
    struct Tag(&'static str, Rc<RefCell<Vec<&'static str>>>);
    impl PlaybackObserver for Tag {
        fn on_state_changed(&self, _playing: bool) {
            self.1.borrow_mut().push(self.0);
        }
    }

    let log = Rc::new(RefCell::new(Vec::new()));
    let a: Rc<dyn PlaybackObserver> = Rc::new(Tag("a", log.clone()));
    let b: Rc<dyn PlaybackObserver> = Rc::new(Tag("b", log.clone()));
    let a_again: Rc<dyn PlaybackObserver> = Rc::new(Tag("a", log.clone()));

    let mut registry = ObserverRegistry::default();
    assert!(registry.add(b.clone()));
    assert!(registry.add(a.clone()));
    assert!(!registry.add(a.clone()));
    // Equal contents, different allocation: a distinct subscriber.
    assert!(registry.add(a_again));
    assert_eq!(registry.len(), 3);

    registry.state_changed(true);
    assert_eq!(*log.borrow(), vec!["b", "a", "a"]);

    assert!(registry.remove(&b));
    assert!(registry.contains(&a));
    registry.clear();
    assert!(registry.is_empty());
}

#[test]
fn ticker_start_is_idempotent_and_stop_cancels() {
    let mut ticker = ProgressTicker::new(Duration::from_millis(100));
    let t0 = Instant::now();
    assert!(!ticker.poll(t0));

    ticker.start(t0);
    ticker.start(t0 + Duration::from_millis(30));
    assert!(ticker.poll(t0));
    assert!(!ticker.poll(t0 + Duration::from_millis(60)));
    assert!(ticker.poll(t0 + Duration::from_millis(100)));

    ticker.stop();
    assert!(!ticker.is_running());
    assert!(!ticker.poll(t0 + Duration::from_secs(10)));
}

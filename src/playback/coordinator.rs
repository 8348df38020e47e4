//! The playback coordinator.
//!
//! Owns the single active track handle and the session, serializes every
//! transport change through `&mut self`, and notifies observers synchronously.
//! The coordinator holds `Rc` observers and is therefore pinned to the thread
//! that created it; that thread also drives `tick`.

use std::path::Path;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use super::backend::{AudioBackend, TrackHandle};
use super::error::{PlaybackError, Result};
use super::observer::{ObserverRegistry, PlaybackObserver};
use super::queue::QueueProvider;
use super::session::{PlaybackSession, TrackInfo};
use super::ticker::ProgressTicker;

/// Default progress notification interval.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound on volume steps in a fade.
pub const MAX_FADE_STEPS: u64 = 1000;

pub struct PlaybackCoordinator<B: AudioBackend> {
    backend: B,
    handle: Option<B::Handle>,
    session: PlaybackSession,
    observers: ObserverRegistry,
    queue: Option<Rc<dyn QueueProvider>>,
    ticker: ProgressTicker,
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl<B: AudioBackend> PlaybackCoordinator<B> {
    pub fn new(backend: B, tick_interval: Duration) -> Self {
        Self {
            backend,
            handle: None,
            session: PlaybackSession::default(),
            observers: ObserverRegistry::default(),
            queue: None,
            ticker: ProgressTicker::new(tick_interval),
        }
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn current_track(&self) -> Option<&TrackInfo> {
        self.session.track()
    }

    pub fn is_playing(&self) -> bool {
        self.session.is_playing()
    }

    /// Whether periodic progress notifications are scheduled.
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_running()
    }

    #[cfg(test)]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    #[cfg(test)]
    pub fn has_queue_provider(&self) -> bool {
        self.queue.is_some()
    }

    /// Bind `track` to the session and start it.
    ///
    /// The new source is opened before anything else is touched: on failure
    /// the previous track keeps playing, the session is unchanged and no
    /// observer hears about it.
    pub fn load_and_play(&mut self, track: TrackInfo) -> Result<()> {
        let mut next = match self.backend.open(&track.path) {
            Ok(handle) => handle,
            Err(source) => {
                log::warn!("cannot play {}: {source}", track.path.display());
                return Err(PlaybackError::Load {
                    path: track.path,
                    source,
                });
            }
        };

        if let Some(mut previous) = self.handle.take() {
            previous.stop();
        }
        next.play();
        let duration_ms = millis(next.duration());
        self.handle = Some(next);

        log::info!("playing {}", track.path.display());
        self.session.replace(track, duration_ms);
        self.ticker.start(Instant::now());

        if let Some(track) = self.session.track() {
            self.observers.track_changed(track);
        }
        self.observers.state_changed(true);
        Ok(())
    }

    /// Pause when playing, resume when paused. No-op with nothing loaded.
    ///
    /// Resuming a track that already ran to its end reopens it from the start.
    pub fn toggle_play_pause(&mut self) {
        let Some(playing) = self.session.loaded().map(|l| l.playing) else {
            log::debug!("toggle ignored: {}", PlaybackError::NoTrackLoaded);
            return;
        };

        if playing {
            if let Some(handle) = self.handle.as_mut() {
                handle.pause();
            }
            self.ticker.stop();
        } else {
            if !self.rewind_if_finished() {
                return;
            }
            if let Some(handle) = self.handle.as_mut() {
                handle.play();
            }
            self.ticker.start(Instant::now());
        }

        if let Some(loaded) = self.session.loaded_mut() {
            loaded.playing = !playing;
        }
        self.observers.state_changed(!playing);
    }

    /// Swap in a fresh handle when the current one has been drained. The new
    /// handle starts at 0 and follows the session's playing flag.
    /// Returns `false` if nothing is loaded or the track can no longer be opened.
    fn rewind_if_finished(&mut self) -> bool {
        let finished = self.handle.as_ref().is_none_or(|h| h.is_finished());
        if !finished {
            return true;
        }
        let Some(path) = self.session.track().map(|t| t.path.clone()) else {
            return false;
        };
        match self.backend.open(&path) {
            Ok(mut handle) => {
                if self.session.is_playing() {
                    handle.play();
                }
                if let Some(mut old) = self.handle.replace(handle) {
                    old.stop();
                }
                if let Some(loaded) = self.session.loaded_mut() {
                    loaded.position_ms = 0;
                }
                true
            }
            Err(e) => {
                log::warn!("cannot restart {}: {e}", path.display());
                false
            }
        }
    }

    /// Move the transport to `position_ms`, clamped to the track length when
    /// the length is known. Fires one progress notification.
    ///
    /// A drained track is reopened first so the position is one the output
    /// really has; a later resume then continues from there.
    pub fn seek(&mut self, position_ms: u64) {
        if self.session.is_empty() {
            log::debug!("seek ignored: {}", PlaybackError::NoTrackLoaded);
            return;
        }
        if !self.rewind_if_finished() {
            return;
        }
        let (Some(handle), Some(loaded)) = (self.handle.as_mut(), self.session.loaded_mut()) else {
            return;
        };

        let target = if loaded.duration_ms > 0 {
            position_ms.min(loaded.duration_ms)
        } else {
            position_ms
        };

        loaded.position_ms = match handle.seek(Duration::from_millis(target)) {
            Ok(()) => target,
            Err(e) => {
                log::warn!("seek to {target}ms failed: {e}");
                millis(handle.position())
            }
        };

        self.observers.progress(loaded.position_ms, loaded.duration_ms);
    }

    /// Register `observer`. A late joiner immediately receives the current
    /// track, state and progress. Returns `false` for a duplicate.
    pub fn subscribe(&mut self, observer: Rc<dyn PlaybackObserver>) -> bool {
        if !self.observers.add(Rc::clone(&observer)) {
            return false;
        }

        self.refresh_position();
        if let Some(loaded) = self.session.loaded() {
            observer.on_track_changed(&loaded.info);
            observer.on_state_changed(loaded.playing);
            observer.on_progress(loaded.position_ms, loaded.duration_ms);
        }
        true
    }

    pub fn unsubscribe(&mut self, observer: &Rc<dyn PlaybackObserver>) -> bool {
        self.observers.remove(observer)
    }

    pub fn set_queue_provider(&mut self, queue: Rc<dyn QueueProvider>) {
        self.queue = Some(queue);
    }

    /// Load the track after the current one, as decided by the queue provider.
    /// `Ok(false)` when there is no provider or nothing comes next.
    pub fn request_next(&mut self) -> Result<bool> {
        let Some(queue) = self.queue.clone() else {
            return Ok(false);
        };
        match queue.next_track(self.session.track()) {
            Some(track) => self.load_and_play(track).map(|()| true),
            None => Ok(false),
        }
    }

    pub fn request_previous(&mut self) -> Result<bool> {
        let Some(queue) = self.queue.clone() else {
            return Ok(false);
        };
        match queue.previous_track(self.session.track()) {
            Some(track) => self.load_and_play(track).map(|()| true),
            None => Ok(false),
        }
    }

    /// Drive periodic progress. Returns `true` when the loaded track ran out
    /// during this tick; the session is then paused and observers have been
    /// told, but nothing else is queued.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.ticker.poll(now) {
            return false;
        }
        let (Some(handle), Some(loaded)) = (self.handle.as_ref(), self.session.loaded_mut()) else {
            self.ticker.stop();
            return false;
        };

        if loaded.playing && handle.is_finished() {
            loaded.playing = false;
            self.ticker.stop();
            log::info!("finished {}", loaded.info.path.display());
            self.observers.state_changed(false);
            return true;
        }

        loaded.position_ms = millis(handle.position());
        self.observers.progress(loaded.position_ms, loaded.duration_ms);
        false
    }

    /// React to `path` having been deleted from the library. When it is the
    /// loaded track the session goes back to empty.
    pub fn track_removed(&mut self, path: &Path) -> bool {
        if !self.session.track().is_some_and(|t| t.is_at(path)) {
            return false;
        }
        self.unload();
        log::info!("unloaded deleted track {}", path.display());
        self.observers.state_changed(false);
        self.observers.unloaded();
        true
    }

    /// Ramp the volume of a playing track down to silence over `over`.
    /// Blocks the calling thread for the duration of the fade.
    ///
    /// `steps` is clamped to `1..=MAX_FADE_STEPS` and to one step per
    /// millisecond of `over`, so the whole fade never outlasts `over`.
    pub fn fade_out(&mut self, over: Duration, steps: u64) {
        if !self.is_playing() {
            return;
        }
        let Some(handle) = self.handle.as_mut() else {
            return;
        };

        let over_ms = u64::try_from(over.as_millis()).unwrap_or(u64::MAX);
        if over_ms == 0 {
            handle.set_volume(0.0);
            return;
        }
        let steps = steps.clamp(1, MAX_FADE_STEPS).min(over_ms);
        // steps <= MAX_FADE_STEPS, so the cast is lossless.
        let step = over / steps as u32;
        handle.set_volume(1.0);
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            handle.set_volume(1.0 - t);
            thread::sleep(step);
        }
        handle.set_volume(0.0);
    }

    /// Tear the session down: stop output, forget the track, drop every
    /// observer and the queue provider. The coordinator is reusable afterwards
    /// and behaves like a freshly constructed one.
    pub fn release(&mut self) {
        let was_loaded = !self.session.is_empty();
        self.unload();
        if was_loaded {
            self.observers.unloaded();
        }
        self.observers.clear();
        self.queue = None;
        log::info!("playback released");
    }

    fn unload(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.stop();
        }
        self.ticker.stop();
        self.session.clear();
    }

    fn refresh_position(&mut self) {
        if let (Some(handle), Some(loaded)) = (self.handle.as_ref(), self.session.loaded_mut()) {
            if !handle.is_finished() {
                loaded.position_ms = millis(handle.position());
            }
        }
    }
}

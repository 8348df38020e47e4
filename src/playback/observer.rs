//! Subscribers to playback transitions and the registry that fans out to them.

use std::rc::Rc;

use super::session::TrackInfo;

/// Receives playback transitions from the coordinator.
///
/// Callbacks run synchronously on the coordinator's thread, in registration
/// order. Observers that only care about some events leave the others as the
/// default no-op.
pub trait PlaybackObserver {
    fn on_track_changed(&self, _track: &TrackInfo) {}
    fn on_state_changed(&self, _playing: bool) {}
    fn on_progress(&self, _position_ms: u64, _duration_ms: u64) {}
    /// The session went back to empty; nothing about the old track may be shown.
    fn on_unloaded(&self) {}
}

/// Insertion-ordered set of observers keyed by allocation identity.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Vec<Rc<dyn PlaybackObserver>>,
}

fn same_observer(a: &Rc<dyn PlaybackObserver>, b: &Rc<dyn PlaybackObserver>) -> bool {
    // Data pointers only; the vtable half of a fat pointer is not a stable identity.
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

impl ObserverRegistry {
    /// Add `observer`. Returns `false` if it was already registered.
    pub fn add(&mut self, observer: Rc<dyn PlaybackObserver>) -> bool {
        if self.contains(&observer) {
            return false;
        }
        self.observers.push(observer);
        true
    }

    /// Remove `observer`. Returns `false` if it was not registered.
    pub fn remove(&mut self, observer: &Rc<dyn PlaybackObserver>) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| !same_observer(o, observer));
        self.observers.len() != before
    }

    pub fn contains(&self, observer: &Rc<dyn PlaybackObserver>) -> bool {
        self.observers.iter().any(|o| same_observer(o, observer))
    }

    pub fn clear(&mut self) {
        self.observers.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn track_changed(&self, track: &TrackInfo) {
        for o in &self.observers {
            o.on_track_changed(track);
        }
    }

    pub fn state_changed(&self, playing: bool) {
        for o in &self.observers {
            o.on_state_changed(playing);
        }
    }

    pub fn progress(&self, position_ms: u64, duration_ms: u64) {
        for o in &self.observers {
            o.on_progress(position_ms, duration_ms);
        }
    }

    pub fn unloaded(&self) {
        for o in &self.observers {
            o.on_unloaded();
        }
    }
}

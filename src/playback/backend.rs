//! The audio primitive the coordinator drives.
//!
//! A backend turns a locator into a paused `TrackHandle`. Opening is separate
//! from starting so a failed open never disturbs the handle already playing.

use std::path::Path;
use std::time::Duration;

use super::error::BackendError;

pub trait AudioBackend {
    type Handle: TrackHandle;

    /// Decode `path` and return a handle positioned at zero, paused.
    fn open(&mut self, path: &Path) -> Result<Self::Handle, BackendError>;
}

pub trait TrackHandle {
    fn play(&mut self);
    fn pause(&mut self);
    /// Stop output for good; the handle is dropped right after.
    fn stop(&mut self);
    fn seek(&mut self, position: Duration) -> Result<(), BackendError>;
    fn position(&self) -> Duration;
    /// Total length, or `Duration::ZERO` when unknown.
    fn duration(&self) -> Duration;
    /// The source has been fully consumed.
    fn is_finished(&self) -> bool;
    fn set_volume(&mut self, volume: f32);
}

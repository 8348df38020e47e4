//! Playback core: the coordinator, its session state and observers.
//!
//! `PlaybackCoordinator` is constructed once by the runtime and passed by
//! reference to whoever needs it. Audio output sits behind `AudioBackend`, with
//! `RodioBackend` as the real implementation.

mod backend;
mod coordinator;
mod error;
mod observer;
mod queue;
mod rodio_backend;
mod session;
mod ticker;

pub use backend::{AudioBackend, TrackHandle};
pub use coordinator::{DEFAULT_TICK_INTERVAL, MAX_FADE_STEPS, PlaybackCoordinator};
pub use error::{BackendError, PlaybackError};
pub use observer::{ObserverRegistry, PlaybackObserver};
pub use queue::QueueProvider;
pub use rodio_backend::RodioBackend;
pub use session::{LoadedTrack, PlaybackSession, TrackInfo};
pub use ticker::ProgressTicker;

#[cfg(test)]
mod tests;

//! Navigation capability injected into the coordinator.

use super::session::TrackInfo;

/// Owner of an ordered track list that can answer "what comes next".
///
/// The coordinator never holds a playlist itself; it asks the provider set
/// for the current session and loads whatever comes back.
pub trait QueueProvider {
    fn next_track(&self, current: Option<&TrackInfo>) -> Option<TrackInfo>;
    fn previous_track(&self, current: Option<&TrackInfo>) -> Option<TrackInfo>;
}

//! `rodio` implementation of the audio primitive.
//!
//! One `OutputStream` lives for the whole process; every opened track gets its
//! own `Sink` on the stream's mixer, created paused.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::file::AudioFile;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use super::backend::{AudioBackend, TrackHandle};
use super::error::BackendError;

pub struct RodioBackend {
    stream: OutputStream,
}

impl RodioBackend {
    /// Open the default output device.
    pub fn open_default() -> Result<Self, BackendError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| BackendError::Output(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped, which tears the TUI.
        stream.log_on_drop(false);
        Ok(Self { stream })
    }
}

impl AudioBackend for RodioBackend {
    type Handle = RodioTrack;

    fn open(&mut self, path: &Path) -> Result<RodioTrack, BackendError> {
        let file = File::open(path)?;
        let source =
            Decoder::new(BufReader::new(file)).map_err(|e| BackendError::Decode(e.to_string()))?;

        // Not every decoder knows its length up front (VBR mp3); tags usually do.
        let duration = source
            .total_duration()
            .or_else(|| probe_duration(path))
            .unwrap_or(Duration::ZERO);

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(source);
        sink.pause();

        log::debug!("opened {} ({:?})", path.display(), duration);
        Ok(RodioTrack { sink, duration })
    }
}

fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero())
}

pub struct RodioTrack {
    sink: Sink,
    duration: Duration,
}

impl TrackHandle for RodioTrack {
    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        self.sink.stop();
    }

    fn seek(&mut self, position: Duration) -> Result<(), BackendError> {
        self.sink
            .try_seek(position)
            .map_err(|e| BackendError::Seek(e.to_string()))
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume);
    }
}

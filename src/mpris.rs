//! MPRIS presenter: the system-visible playback surface.
//!
//! `MprisHandle` observes the coordinator and mirrors the session into state
//! shared with a D-Bus server thread. Transport requests from the desktop come
//! back as `ControlCmd`s over a channel; the server never touches the
//! coordinator directly.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use async_io::{Timer, block_on};
use zbus::object_server::SignalEmitter;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::playback::{PlaybackObserver, TrackInfo};

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.reprise";
const NO_TRACK: &str = "/org/mpris/MediaPlayer2/TrackList/NoTrack";

/// Transport actions issued by the presenter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    PlayPause,
    Next,
    Previous,
}

#[derive(Debug, Default)]
struct SharedState {
    loaded: bool,
    playing: bool,
    title: Option<String>,
    artist: Vec<String>,
    url: Option<String>,
    art_url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<OwnedObjectPath>,
    track_serial: u64,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
}

fn file_url(path: &std::path::Path) -> String {
    format!("file://{}", path.display())
}

impl MprisHandle {
    fn update(&self, f: impl FnOnce(&mut SharedState)) {
        if let Ok(mut s) = self.state.lock() {
            f(&mut s);
        }
        let _ = self.notify.send(());
    }
}

impl PlaybackObserver for MprisHandle {
    fn on_track_changed(&self, track: &TrackInfo) {
        self.update(|s| {
            s.loaded = true;
            s.track_serial += 1;
            s.title = Some(track.title.clone());
            s.artist = track.artist.iter().cloned().collect();
            s.url = Some(file_url(&track.path));
            s.art_url = track.artwork.as_deref().map(file_url);
            s.length_micros = None;
            s.track_id =
                OwnedObjectPath::try_from(format!("{OBJECT_PATH}/track/{}", s.track_serial)).ok();
        });
    }

    fn on_state_changed(&self, playing: bool) {
        self.update(|s| s.playing = playing);
    }

    fn on_progress(&self, _position_ms: u64, duration_ms: u64) {
        let length = i64::try_from(duration_ms.saturating_mul(1000)).ok();
        // Progress fires every tick; only wake the bus when the length changes.
        let changed = self
            .state
            .lock()
            .map(|s| s.length_micros != length)
            .unwrap_or(false);
        if changed {
            self.update(|s| s.length_micros = length);
        }
    }

    fn on_unloaded(&self) {
        // Track ids stay unique across sessions, so the serial survives.
        self.update(|s| {
            *s = SharedState {
                track_serial: s.track_serial,
                ..SharedState::default()
            };
        });
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "reprise"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

impl PlayerIface {
    fn is_playing(&self) -> bool {
        self.state.lock().map(|s| s.playing).unwrap_or(false)
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Previous);
    }

    fn play(&self) {
        if !self.is_playing() {
            let _ = self.tx.send(ControlCmd::PlayPause);
        }
    }

    fn pause(&self) {
        if self.is_playing() {
            let _ = self.tx.send(ControlCmd::PlayPause);
        }
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        self.pause();
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match (s.loaded, s.playing) {
            (false, _) => "Stopped",
            (true, true) => "Playing",
            (true, false) => "Paused",
        }
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        self.state.lock().map(|s| s.loaded).unwrap_or(false)
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        self.can_play()
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let mut put = |key: &str, value: Value<'_>| {
            if let Ok(v) = OwnedValue::try_from(value) {
                map.insert(key.to_string(), v);
            }
        };

        let track_id = s
            .track_id
            .clone()
            .map(OwnedObjectPath::into_inner)
            .unwrap_or_else(|| ObjectPath::from_static_str_unchecked(NO_TRACK));
        put("mpris:trackid", Value::from(track_id));
        if let Some(title) = &s.title {
            put("xesam:title", Value::from(title.clone()));
        }
        if !s.artist.is_empty() {
            put("xesam:artist", Value::from(s.artist.clone()));
        }
        if let Some(url) = &s.url {
            put("xesam:url", Value::from(url.clone()));
        }
        if let Some(art) = &s.art_url {
            put("mpris:artUrl", Value::from(art.clone()));
        }
        if let Some(len) = s.length_micros {
            put("mpris:length", Value::from(len));
        }
        map
    }
}

async fn emit_changes(connection: &Connection) -> zbus::Result<()> {
    let iface_ref = connection
        .object_server()
        .interface::<_, PlayerIface>(OBJECT_PATH)
        .await?;
    let iface = iface_ref.get().await;
    let emitter: &SignalEmitter<'_> = iface_ref.signal_emitter();
    iface.playback_status_changed(emitter).await?;
    iface.metadata_changed(emitter).await?;
    iface.can_play_changed(emitter).await?;
    iface.can_pause_changed(emitter).await
}

async fn serve(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
    notify: Receiver<()>,
) -> zbus::Result<()> {
    let connection = Connection::session().await?;
    connection.request_name(BUS_NAME).await?;

    let object_server = connection.object_server();
    object_server
        .at(OBJECT_PATH, RootIface { tx: tx.clone() })
        .await?;
    object_server.at(OBJECT_PATH, PlayerIface { tx, state }).await?;
    log::info!("MPRIS: registered {BUS_NAME}");

    loop {
        Timer::after(Duration::from_millis(200)).await;

        let mut dirty = false;
        loop {
            match notify.try_recv() {
                Ok(()) => dirty = true,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return Ok(()),
            }
        }
        if dirty {
            if let Err(e) = emit_changes(&connection).await {
                log::warn!("MPRIS: failed to emit property changes: {e}");
            }
        }
    }
}

/// Start the MPRIS server on its own thread. Failing to reach the session bus
/// is logged and leaves the returned handle working as a plain observer.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        if let Err(e) = block_on(serve(tx, state_for_thread, notify_rx)) {
            log::warn!("MPRIS: unavailable: {e}");
        }
    });

    MprisHandle {
        state,
        notify: notify_tx,
    }
}

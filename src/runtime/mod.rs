use std::env;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, NowPlaying};
use crate::library::{Library, scan};
use crate::mpris::ControlCmd;
use crate::playback::{PlaybackCoordinator, RodioBackend};

mod event_loop;
mod logging;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_warning) = settings::load_settings();
    logging::init(&settings.logging);
    if let Some(msg) = config_warning {
        log::warn!("{msg}");
        eprintln!("reprise: {msg}");
    }

    let dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| settings.library.root.clone())
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("Music"));

    let library = Library::from_tracks(scan(&dir, &settings.library));
    let mut app = App::new(library);
    app.shuffle = settings.playback.shuffle;
    app.set_current_dir(dir.display().to_string());

    let backend = RodioBackend::open_default()?;
    let mut coordinator = PlaybackCoordinator::new(
        backend,
        Duration::from_millis(settings.playback.tick_interval_ms),
    );

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx.clone());
    let now_playing = Rc::new(NowPlaying::default());
    coordinator.subscribe(now_playing.clone());
    coordinator.subscribe(Rc::new(mpris));

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut ctx = event_loop::LoopContext {
        settings: &settings,
        app: &mut app,
        coordinator: &mut coordinator,
        now_playing: &now_playing,
        control_tx: &control_tx,
        queue: None,
    };
    let run_result = event_loop::run(&mut terminal, &mut ctx, &control_rx);
    // Error paths skip the fade but must still stop output.
    coordinator.release();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

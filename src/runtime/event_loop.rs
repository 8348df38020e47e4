use std::rc::Rc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, NowPlaying};
use crate::config;
use crate::library::AlbumQueue;
use crate::mpris::ControlCmd;
use crate::playback::{AudioBackend, PlaybackCoordinator};
use crate::ui;

/// Everything the loop reads or drives between frames.
pub struct LoopContext<'a, B: AudioBackend> {
    pub settings: &'a config::Settings,
    pub app: &'a mut App,
    pub coordinator: &'a mut PlaybackCoordinator<B>,
    pub now_playing: &'a NowPlaying,
    pub control_tx: &'a mpsc::Sender<ControlCmd>,
    /// The queue last handed to the coordinator, kept to prune deletions.
    pub queue: Option<Rc<AlbumQueue>>,
}

/// Main terminal event loop: handles input, progress ticks, MPRIS commands
/// and drawing. Returns `Ok(())` when shutdown is requested.
pub fn run<B: AudioBackend>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    ctx: &mut LoopContext<'_, B>,
    control_rx: &mpsc::Receiver<ControlCmd>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let finished = ctx.coordinator.tick(Instant::now());
        if finished && ctx.settings.playback.auto_advance {
            step(ctx, true);
        }

        let snapshot = ctx.now_playing.snapshot();
        let app: &App = ctx.app;
        let settings = ctx.settings;
        terminal.draw(|f| ui::draw(f, app, &snapshot, &settings.ui, &settings.controls))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, ctx) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, ctx) {
                    return Ok(());
                }
            }
        }
    }
}

fn handle_control_cmd<B: AudioBackend>(cmd: ControlCmd, ctx: &mut LoopContext<'_, B>) -> bool {
    match cmd {
        ControlCmd::Quit => {
            shutdown(ctx);
            return true;
        }
        ControlCmd::PlayPause => {
            if ctx.coordinator.session().is_empty() {
                play_selection(ctx);
            } else {
                ctx.coordinator.toggle_play_pause();
            }
        }
        ControlCmd::Next => step(ctx, true),
        ControlCmd::Previous => step(ctx, false),
    }
    false
}

fn handle_key_event<B: AudioBackend>(key: KeyEvent, ctx: &mut LoopContext<'_, B>) -> bool {
    if ctx.app.pending_delete.is_some() {
        match key.code {
            KeyCode::Char('y') => confirm_delete(ctx),
            _ => {
                ctx.app.cancel_delete();
                ctx.app.set_status("delete cancelled");
            }
        }
        return false;
    }

    let scrub_ms = ctx.settings.controls.scrub_seconds.saturating_mul(1000);
    match key.code {
        KeyCode::Char('q') => {
            shutdown(ctx);
            return true;
        }
        KeyCode::Char('j') => ctx.app.next(),
        KeyCode::Char('k') => ctx.app.prev(),
        KeyCode::Tab => ctx.app.switch_pane(),
        KeyCode::Enter => play_selection(ctx),
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            let _ = ctx.control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('l') => {
            let _ = ctx.control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('h') => {
            let _ = ctx.control_tx.send(ControlCmd::Previous);
        }
        KeyCode::Char('L') => {
            if let Some((pos, _)) = ctx.coordinator.session().progress() {
                ctx.coordinator.seek(pos.saturating_add(scrub_ms));
            }
        }
        KeyCode::Char('H') => {
            if let Some((pos, _)) = ctx.coordinator.session().progress() {
                ctx.coordinator.seek(pos.saturating_sub(scrub_ms));
            }
        }
        KeyCode::Char('s') => {
            ctx.app.toggle_shuffle();
            let state = if ctx.app.shuffle { "on" } else { "off" };
            ctx.app.set_status(format!("shuffle {state} for the next album"));
        }
        KeyCode::Char('d') => {
            if !ctx.app.request_delete() {
                ctx.app.set_status("select a track to delete");
            }
        }
        _ => {}
    }
    false
}

/// Install the selected album as the queue and start the chosen track.
fn play_selection<B: AudioBackend>(ctx: &mut LoopContext<'_, B>) {
    let Some((queue, first)) = ctx.app.play_selection() else {
        return;
    };
    let queue = Rc::new(queue);
    ctx.coordinator.set_queue_provider(queue.clone());
    ctx.queue = Some(queue);
    match ctx.coordinator.load_and_play(first) {
        Ok(()) => ctx.app.status = None,
        Err(e) => {
            log::warn!("{e}");
            ctx.app.set_status(format!("cannot play: {e}"));
        }
    }
}

/// Move through the installed queue and keep the cursor on what plays.
fn step<B: AudioBackend>(ctx: &mut LoopContext<'_, B>, forward: bool) {
    let result = if forward {
        ctx.coordinator.request_next()
    } else {
        ctx.coordinator.request_previous()
    };
    match result {
        Ok(true) => {
            ctx.app.status = None;
            if let Some(track) = ctx.coordinator.current_track() {
                let path = track.path.clone();
                ctx.app.follow(&path);
            }
        }
        Ok(false) => {
            let edge = if forward { "end" } else { "start" };
            ctx.app.set_status(format!("{edge} of queue"));
        }
        Err(e) => {
            log::warn!("{e}");
            ctx.app.set_status(format!("cannot play: {e}"));
        }
    }
}

fn confirm_delete<B: AudioBackend>(ctx: &mut LoopContext<'_, B>) {
    let Some(path) = ctx.app.pending_delete.take() else {
        return;
    };
    match ctx.app.library.delete_track(&path) {
        Ok(track) => {
            ctx.coordinator.track_removed(&path);
            if let Some(queue) = ctx.queue.take() {
                let pruned = Rc::new(queue.without(&path));
                ctx.coordinator.set_queue_provider(pruned.clone());
                ctx.queue = Some(pruned);
            }
            ctx.app.clamp_selection();
            ctx.app.set_status(format!("deleted {}", track.display));
        }
        Err(e) => {
            log::warn!("delete failed: {e}");
            ctx.app.set_status(format!("delete failed: {e}"));
        }
    }
}

fn shutdown<B: AudioBackend>(ctx: &mut LoopContext<'_, B>) {
    let audio = &ctx.settings.audio;
    ctx.coordinator
        .fade_out(Duration::from_millis(audio.quit_fade_out_ms), audio.fade_steps);
    ctx.coordinator.release();
}

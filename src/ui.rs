//! UI rendering for the terminal user interface.
//!
//! Everything here is a pure function of `App`, the `NowPlaying` snapshot and
//! settings; drawing never touches the playback coordinator.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::{App, NowPlayingState, Pane};
use crate::config::{ControlsSettings, UiSettings};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    BTreeMap::from([
        ("j/k", "up/down"),
        ("tab", "albums/tracks"),
        ("enter", "play selection"),
        ("space/p", "play/pause"),
        ("h/l", "prev/next song"),
        ("s", "shuffle"),
        ("d", "delete track"),
        ("q", "quit"),
    ])
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    let order = [
        "j/k", "tab", "enter", "space/p", "h/l", "H/L", "s", "d", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format milliseconds as `MM:SS`.
fn format_mmss(ms: u64) -> String {
    let secs = Duration::from_millis(ms).as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn now_playing_text(now: &NowPlayingState, app: &App, ui: &UiSettings) -> String {
    let mut parts: Vec<String> = Vec::new();

    match &now.track {
        Some(track) => {
            let song = match &track.artist {
                Some(artist) => format!("{} - {}", artist, track.title),
                None => track.title.clone(),
            };
            parts.push(format!(
                "Song: {} [{}/{}]",
                song,
                format_mmss(now.position_ms),
                format_mmss(now.duration_ms)
            ));
            parts.push(if now.playing { "Playing" } else { "Paused" }.to_string());
            if ui.show_artwork_path {
                if let Some(art) = &track.artwork {
                    parts.push(format!("Art: {}", art.display()));
                }
            }
        }
        None => parts.push("Stopped".to_string()),
    }

    parts.push(format!("Shuffle: {}", if app.shuffle { "ON" } else { "OFF" }));
    if let Some(dir) = &app.current_dir {
        parts.push(format!("Dir: {}", dir));
    }
    if let Some(msg) = &app.status {
        parts.push(msg.clone());
    }
    parts.join(" • ")
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block.border_style(Style::default().add_modifier(Modifier::BOLD))
    } else {
        block
    }
}

fn left_pad() -> Padding {
    Padding {
        left: 1,
        right: 0,
        top: 0,
        bottom: 0,
    }
}

/// Render the entire UI into `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    now: &NowPlayingState,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" reprise ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status = Paragraph::new(now_playing_text(now, app, ui_settings))
        .block(Block::bordered().padding(left_pad()).title(" now playing "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[2]);

    let playing_path = now.track.as_ref().map(|t| t.path.as_path());

    let albums: Vec<ListItem> = app
        .library
        .albums()
        .iter()
        .map(|a| match &a.artist {
            Some(artist) => ListItem::new(format!("{} ({})", a.title, artist)),
            None => ListItem::new(a.title.as_str()),
        })
        .collect();
    let mut album_state = ListState::default();
    if !albums.is_empty() {
        album_state.select(Some(app.selected_album));
    }
    let album_list = List::new(albums)
        .block(pane_block(" albums ", app.pane == Pane::Albums))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    frame.render_stateful_widget(album_list, panes[0], &mut album_state);

    let tracks: Vec<ListItem> = app
        .album_tracks()
        .iter()
        .map(|t| {
            let marker = if playing_path == Some(t.path.as_path()) {
                "♪ "
            } else {
                "  "
            };
            ListItem::new(format!("{}{}", marker, t.display))
        })
        .collect();
    let mut track_state = ListState::default();
    if !tracks.is_empty() && app.pane == Pane::Tracks {
        track_state.select(Some(app.selected_track));
    }
    let track_list = List::new(tracks)
        .block(pane_block(" tracks ", app.pane == Pane::Tracks))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    frame.render_stateful_widget(track_list, panes[1], &mut track_state);

    if let Some(path) = &app.pending_delete {
        let popup_area = centered_rect_sized(64, 6, chunks[2]);
        frame.render_widget(Clear, popup_area);
        let name = app
            .library
            .track_by_path(path)
            .map(|t| t.display.clone())
            .unwrap_or_else(|| path.display().to_string());
        let confirm = Paragraph::new(format!("Delete \"{}\" from disk?\n\n[y] yes  [any] no", name))
            .bold()
            .block(
                Block::default()
                    .padding(left_pad())
                    .borders(Borders::ALL)
                    .title(" delete "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(confirm, popup_area);
    }

    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(left_pad()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

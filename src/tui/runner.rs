use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;

use crate::app_state::App;
use crate::models::{InputMode, NotificationKind, ToolbarButton, SHORTCUT_SOURCES};
use super::components::{
    render_articles, render_filter_bar, render_help_popup, render_stats, render_status,
    render_toolbar,
};
use super::layout::create_layout;

fn ui(frame: &mut Frame, app: &mut App, now: Instant) {
    let filtering = app.input_mode == InputMode::Filter;
    let layout = create_layout(frame.area(), filtering);
    render_toolbar(frame, app, layout.toolbar, now);
    render_status(frame, app, layout.status);
    render_stats(frame, app, layout.stats);
    if filtering { render_filter_bar(frame, app, layout.filter_bar); }
    render_articles(frame, app, layout.articles);
    if app.show_help { render_help_popup(frame, app); }
}

/// Maps Ctrl/Cmd key chords to the update source they trigger.
pub fn shortcut_for(key: &KeyEvent, numbered: bool) -> Option<&'static str> {
    if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER) {
        return None;
    }
    match key.code {
        KeyCode::Char('r') | KeyCode::Char('R') => Some("all"),
        KeyCode::Char(c @ '1'..='4') if numbered => {
            let idx = c.to_digit(10)? as usize - 1;
            SHORTCUT_SOURCES.get(idx).copied()
        }
        _ => None,
    }
}

/// Applies one key press. Returns `true` when the user asked to quit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if let Some(source) = shortcut_for(&key, app.settings.numbered_shortcuts) {
        app.update_source(source);
        return false;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }
    // Unbound chords must not fall through to the single-letter keys.
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER) {
        return false;
    }

    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter) {
            app.show_help = false;
        }
        return false;
    }

    if app.input_mode == InputMode::Filter {
        match key.code {
            KeyCode::Esc => { app.clear_filter(); app.exit_filter(); }
            KeyCode::Enter => app.exit_filter(),
            KeyCode::Backspace => app.pop_filter_char(),
            KeyCode::Char(c) => app.push_filter_char(c),
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('/') => app.start_filter(),
        KeyCode::Esc => app.clear_filter(),
        KeyCode::Up | KeyCode::Char('k') => app.previous(),
        KeyCode::Down | KeyCode::Char('j') => app.next(),
        KeyCode::Char('c') => app.copy_selected(),
        KeyCode::Enter => {
            if let Some(link) = app.activate_selected() {
                if let Err(e) = open::that_detached(&link) {
                    tracing::warn!(%link, error = %e, "could not open link");
                    app.show_notification(format!("❌ Could not open {}: {}", link, e), NotificationKind::Error);
                }
            }
        }
        KeyCode::Char(c) => {
            if let Some(button) = ToolbarButton::from_key(c) {
                app.press_button(button);
            }
        }
        _ => {}
    }
    false
}

pub fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.poll_api_events();
        let now = Instant::now();
        app.tick(now);

        terminal.draw(|f| ui(f, app, now))?;

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press { continue; }
                if handle_key(app, key) { return Ok(()); }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::{ApiCommand, ApiEvent};
    use crate::app_state::ControllerSettings;
    use crate::models::ArticleRow;
    use tokio::sync::mpsc;

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn plain(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(numbered: bool) -> (App, mpsc::Receiver<ApiCommand>, mpsc::Sender<ApiEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::channel(16);
        let mut settings = ControllerSettings::default();
        settings.numbered_shortcuts = numbered;
        let rows = vec![
            ArticleRow {
                source: "arXiv".into(),
                title: "Diffusion survey".into(),
                category: "Research".into(),
                summary: "Overview".into(),
                link: None,
                date: None,
            },
            ArticleRow {
                source: "YouTube".into(),
                title: "Agents in practice".into(),
                category: "Education".into(),
                summary: "Talk".into(),
                link: None,
                date: None,
            },
        ];
        let mut app = App::new(settings, rows, cmd_tx, event_rx);
        app.clipboard = None;
        app.init(Instant::now());
        (app, cmd_rx, event_tx)
    }

    #[test]
    fn test_ctrl_r_updates_all() {
        assert_eq!(shortcut_for(&ctrl('r'), false), Some("all"));
        let cmd = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::SUPER);
        assert_eq!(shortcut_for(&cmd, false), Some("all"));
        assert_eq!(shortcut_for(&plain(KeyCode::Char('r')), true), None);
    }

    #[test]
    fn test_numbered_shortcuts_follow_profile() {
        assert_eq!(shortcut_for(&ctrl('1'), true), Some("news"));
        assert_eq!(shortcut_for(&ctrl('2'), true), Some("arxiv"));
        assert_eq!(shortcut_for(&ctrl('3'), true), Some("youtube"));
        assert_eq!(shortcut_for(&ctrl('4'), true), Some("all"));
        assert_eq!(shortcut_for(&ctrl('5'), true), None);
        assert_eq!(shortcut_for(&ctrl('1'), false), None);
    }

    #[test]
    fn test_shortcut_sends_single_update() {
        let (mut app, mut commands, _events) = app(true);
        commands.try_recv().unwrap(); // initial stats
        handle_key(&mut app, ctrl('2'));
        handle_key(&mut app, ctrl('r'));
        assert_eq!(commands.try_recv().unwrap(), ApiCommand::Update("arxiv".into()));
        assert!(commands.try_recv().is_err());
    }

    #[test]
    fn test_filter_mode_typing() {
        let (mut app, _commands, _events) = app(false);
        handle_key(&mut app, plain(KeyCode::Char('/')));
        assert!(app.input_mode == InputMode::Filter);
        for c in "agents".chars() {
            handle_key(&mut app, plain(KeyCode::Char(c)));
        }
        // 'n' and 's' are filter text here, not toolbar keys
        assert_eq!(app.filter_query, "agents");
        assert_eq!(app.filter_summary_text(), Some("Showing 1 of 2 articles"));

        handle_key(&mut app, plain(KeyCode::Enter));
        assert!(app.input_mode == InputMode::Normal);
        assert_eq!(app.table.visible_count(), 1);

        handle_key(&mut app, plain(KeyCode::Esc));
        assert_eq!(app.table.visible_count(), 2);
    }

    #[test]
    fn test_quit_and_help() {
        let (mut app, _commands, _events) = app(false);
        assert!(!handle_key(&mut app, plain(KeyCode::Char('?'))));
        assert!(app.show_help);
        assert!(!handle_key(&mut app, plain(KeyCode::Char('q'))));
        handle_key(&mut app, plain(KeyCode::Esc));
        assert!(!app.show_help);
        assert!(handle_key(&mut app, plain(KeyCode::Char('q'))));
    }

    #[test]
    fn test_modified_letters_do_nothing() {
        let (mut app, mut commands, _events) = app(false);
        commands.try_recv().unwrap();
        for c in ['u', 'n', 'x', 'y', 's', 'e', 'q'] {
            assert!(!handle_key(&mut app, ctrl(c)));
            let cmd = KeyEvent::new(KeyCode::Char(c), KeyModifiers::SUPER);
            assert!(!handle_key(&mut app, cmd));
        }
        assert!(commands.try_recv().is_err());
        assert!(!app.is_loading);
        assert!(app.notification().is_none());

        handle_key(&mut app, plain(KeyCode::Char('/')));
        handle_key(&mut app, ctrl('a'));
        assert_eq!(app.filter_query, "");
    }

    #[test]
    fn test_toolbar_keys_press_buttons() {
        let (mut app, mut commands, _events) = app(false);
        commands.try_recv().unwrap();
        handle_key(&mut app, plain(KeyCode::Char('s')));
        assert_eq!(commands.try_recv().unwrap(), ApiCommand::RefreshStats);
        handle_key(&mut app, plain(KeyCode::Char('y')));
        assert_eq!(commands.try_recv().unwrap(), ApiCommand::Update("youtube".into()));
        assert!(app.is_pressed(ToolbarButton::UpdateYoutube, Instant::now()));
    }
}

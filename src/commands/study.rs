use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use rand::seq::SliceRandom;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing::debug;

use crate::app::{AppState, Completion, RequestKind, RequestTicket, View};
use crate::error::TrainerError;
use crate::quiz::QuizQuestion;
use crate::topic::{TOPICS, Topic};
use crate::tui::views::{UiState, draw};
use crate::tutor::Tutor;

const PAGE: i32 = 10;

#[derive(Debug)]
enum CompletionMessage {
    Explanation(RequestTicket, Result<String, TrainerError>),
    Quiz(RequestTicket, Result<Vec<QuizQuestion>, TrainerError>),
}

#[derive(Debug, PartialEq, Eq)]
enum Action {
    Quit,
    Request(RequestTicket),
}

pub async fn run(
    tutor: Tutor,
    start_topic: Option<&'static Topic>,
    initial_request: Option<RequestKind>,
    shuffle: bool,
) -> Result<()> {
    let mut app = AppState::new(tutor.is_configured());
    let mut ui = UiState::default();
    if let Some(topic) = start_topic {
        ui.topic_cursor = TOPICS.iter().position(|t| t.id == topic.id).unwrap_or(0);
        app.select_topic(topic);
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    if let Some(kind) = initial_request
        && let Some(ticket) = app.begin_request(kind)
    {
        spawn_request(&tutor, ticket, shuffle, tx.clone());
    }

    let mut terminal = setup_terminal()?;

    let loop_result: Result<()> = async {
        loop {
            while let Ok(message) = rx.try_recv() {
                apply_completion(&mut app, &mut ui, message);
            }

            terminal
                .draw(|frame| draw(frame, &app, &ui))
                .context("failed to render frame")?;

            if event::poll(Duration::from_millis(16))?
                && let Event::Key(key) = event::read()?
            {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match handle_key(&mut app, &mut ui, key) {
                    Some(Action::Quit) => break Ok(()),
                    Some(Action::Request(ticket)) => {
                        spawn_request(&tutor, ticket, shuffle, tx.clone());
                    }
                    None => {}
                }
            }
        }
    }
    .await;

    teardown_terminal(&mut terminal)?;
    loop_result
}

fn spawn_request(
    tutor: &Tutor,
    ticket: RequestTicket,
    shuffle: bool,
    updates: mpsc::UnboundedSender<CompletionMessage>,
) {
    let tutor = tutor.clone();
    tokio::spawn(async move {
        let message = match ticket.kind {
            RequestKind::Explanation => {
                CompletionMessage::Explanation(ticket, tutor.fetch_explanation(ticket.topic).await)
            }
            RequestKind::Quiz => {
                let mut outcome = tutor.generate_quiz(ticket.topic).await;
                if shuffle && let Ok(questions) = outcome.as_mut() {
                    questions.shuffle(&mut rand::rng());
                }
                CompletionMessage::Quiz(ticket, outcome)
            }
        };
        // The receiver is gone once the user has quit.
        let _ = updates.send(message);
    });
}

fn apply_completion(app: &mut AppState, ui: &mut UiState, message: CompletionMessage) {
    let completion = match message {
        CompletionMessage::Explanation(ticket, outcome) => app.finish_explanation(ticket, outcome),
        CompletionMessage::Quiz(ticket, outcome) => {
            let completion = app.finish_quiz(ticket, outcome);
            if completion == Completion::Applied && app.view() == View::Quiz {
                ui.option_cursor = 0;
                ui.reset_scroll();
            }
            completion
        }
    };
    debug!(?completion, "request finished");
}

fn handle_key(app: &mut AppState, ui: &mut UiState, key: KeyEvent) -> Option<Action> {
    if key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
    {
        return Some(Action::Quit);
    }
    if matches!(key.code, KeyCode::Char('x' | 'X')) && app.notice().is_some() {
        app.dismiss_notice();
        return None;
    }

    match app.view() {
        View::TopicList => handle_topic_list(app, ui, key.code),
        View::TopicDetail => handle_topic_detail(app, ui, key.code),
        View::Quiz => {
            handle_quiz(app, ui, key.code);
            None
        }
    }
}

fn handle_topic_list(app: &mut AppState, ui: &mut UiState, code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => ui.move_topic(-1),
        KeyCode::Down | KeyCode::Char('j') => ui.move_topic(1),
        KeyCode::Enter => {
            if let Some(topic) = TOPICS.get(ui.topic_cursor) {
                app.select_topic(topic);
                ui.reset_scroll();
            }
        }
        _ => {}
    }
    None
}

fn handle_topic_detail(app: &mut AppState, ui: &mut UiState, code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('e' | 'E') => {
            ui.reset_scroll();
            return app.begin_request(RequestKind::Explanation).map(Action::Request);
        }
        KeyCode::Char('q' | 'Q') => {
            return app.begin_request(RequestKind::Quiz).map(Action::Request);
        }
        KeyCode::Up | KeyCode::Char('k') => ui.scroll_by(-1),
        KeyCode::Down | KeyCode::Char('j') => ui.scroll_by(1),
        KeyCode::PageUp => ui.scroll_by(-PAGE),
        KeyCode::PageDown => ui.scroll_by(PAGE),
        KeyCode::Char('b' | 'B') | KeyCode::Backspace => {
            app.back_to_list();
            ui.reset_scroll();
        }
        _ => {}
    }
    None
}

fn handle_quiz(app: &mut AppState, ui: &mut UiState, code: KeyCode) {
    if matches!(code, KeyCode::Char('b' | 'B') | KeyCode::Backspace) {
        app.exit_quiz();
        ui.reset_scroll();
        return;
    }
    let Some(session) = app.session_mut() else {
        return;
    };

    if session.is_submitted() {
        match code {
            KeyCode::Char('r' | 'R') => {
                app.retake_quiz();
                ui.option_cursor = 0;
                ui.reset_scroll();
            }
            KeyCode::Up | KeyCode::Char('k') => ui.scroll_by(-1),
            KeyCode::Down | KeyCode::Char('j') => ui.scroll_by(1),
            KeyCode::PageUp => ui.scroll_by(-PAGE),
            KeyCode::PageDown => ui.scroll_by(PAGE),
            _ => {}
        }
        return;
    }

    let options = session
        .current_question()
        .map(|question| question.options.len())
        .unwrap_or(0);
    match code {
        KeyCode::Char(digit @ '1'..='9') => {
            let idx = digit as usize - '1' as usize;
            if session.select_option(idx).is_ok() {
                ui.option_cursor = idx;
            }
        }
        KeyCode::Up | KeyCode::Char('k') => ui.move_option(-1, options),
        KeyCode::Down | KeyCode::Char('j') => ui.move_option(1, options),
        KeyCode::Char(' ') => {
            let _ = session.select_option(ui.option_cursor);
        }
        KeyCode::Enter => {
            if session.advance().is_ok() {
                ui.option_cursor = 0;
                ui.reset_scroll();
            }
        }
        KeyCode::Char('s' | 'S') => {
            if session.submit().is_ok() {
                ui.reset_scroll();
            }
        }
        _ => {}
    }
}

pub(crate) fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to configure terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to start terminal")?;
    terminal.hide_cursor().context("failed to hide cursor")?;
    Ok(terminal)
}

pub(crate) fn teardown_terminal(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("failed to restore terminal")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

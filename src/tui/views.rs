use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
};

use crate::app::{AppState, Notice, RequestKind, View};
use crate::quiz::QuizQuestion;
use crate::session::QuizSession;
use crate::topic::{TOPICS, Topic};
use crate::tui::{Theme, render_markdown};
use crate::utils::option_label;

/// Cursor and scroll positions; never part of the quiz outcome.
#[derive(Debug, Default)]
pub struct UiState {
    pub topic_cursor: usize,
    pub option_cursor: usize,
    pub scroll: u16,
}

impl UiState {
    pub fn reset_scroll(&mut self) {
        self.scroll = 0;
    }

    pub fn move_topic(&mut self, delta: isize) {
        self.topic_cursor = step(self.topic_cursor, delta, TOPICS.len());
    }

    pub fn move_option(&mut self, delta: isize, options: usize) {
        self.option_cursor = step(self.option_cursor, delta, options);
    }

    pub fn scroll_by(&mut self, delta: i32) {
        self.scroll = (i32::from(self.scroll) + delta).clamp(0, i32::from(u16::MAX)) as u16;
    }
}

fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    current.saturating_add_signed(delta).min(len - 1)
}

pub fn draw(frame: &mut Frame, app: &AppState, ui: &UiState) {
    let area = frame.area();
    frame.render_widget(Theme::backdrop(), area);

    let notice_height = if app.notice().is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(notice_height),
            Constraint::Min(5),
            Constraint::Length(4),
        ])
        .split(area);

    if let Some(notice) = app.notice() {
        draw_notice(frame, chunks[0], notice);
    }

    let (title, body) = match app.view() {
        View::TopicList => ("Life Safety Code Topics".to_string(), topic_list_text(ui)),
        View::TopicDetail => match app.selected() {
            Some(topic) => (topic.title.to_string(), topic_detail_text(app, topic)),
            None => ("Life Safety Code Topics".to_string(), topic_list_text(ui)),
        },
        View::Quiz => quiz_panel(app, ui),
    };
    let body_widget = Paragraph::new(body)
        .block(Theme::panel(title))
        .wrap(Wrap { trim: false })
        .scroll((ui.scroll, 0));
    frame.render_widget(body_widget, chunks[1]);

    let controls = Paragraph::new(controls_lines(app))
        .block(Theme::panel_with_line(Theme::section_header("Controls")))
        .wrap(Wrap { trim: true });
    frame.render_widget(controls, chunks[2]);
}

fn draw_notice(frame: &mut Frame, area: Rect, notice: &Notice) {
    let (label, style) = match notice {
        Notice::Error(_) => ("Error", Theme::danger()),
        Notice::Info(_) => ("Note", Theme::warning()),
    };
    let line = Line::from(vec![
        Span::styled(format!("{label}: "), style),
        Theme::span(notice.message().to_string()),
    ]);
    let widget = Paragraph::new(line)
        .block(Theme::panel_with_line(Line::from(vec![
            Theme::key_chip("X"),
            Theme::span(" dismiss "),
        ])))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn quiz_panel(app: &AppState, ui: &UiState) -> (String, Text<'static>) {
    let title = app.selected().map(|t| t.title).unwrap_or("Quiz");
    match app.session() {
        Some(session) if session.is_submitted() => {
            (format!("Quiz Results for {title}"), results_text(session))
        }
        Some(session) => (format!("Quiz: {title}"), question_text(session, ui.option_cursor)),
        None => (
            format!("Quiz: {title}"),
            Text::from(Line::from(Span::styled(
                "No quiz questions available for this topic yet, or quiz generation failed.",
                Theme::warning(),
            ))),
        ),
    }
}

pub fn topic_list_text(ui: &UiState) -> Text<'static> {
    let mut lines = vec![
        Line::from(Span::styled(
            "Select a topic to study. Explanations and quizzes are generated by AI.",
            Theme::muted(),
        )),
        Line::default(),
    ];
    for (idx, topic) in TOPICS.iter().enumerate() {
        let selected = idx == ui.topic_cursor;
        let marker = if selected { "▶ " } else { "  " };
        let title_style = if selected {
            Theme::highlight()
        } else {
            Theme::emphasis()
        };
        lines.push(Line::from(vec![
            Theme::span(marker),
            Span::styled(topic.title.to_string(), title_style),
        ]));
        lines.push(Line::from(vec![
            Theme::span("    "),
            Span::styled(topic.short_description.to_string(), Theme::muted()),
        ]));
    }
    Text::from(lines)
}

pub fn topic_detail_text(app: &AppState, topic: &Topic) -> Text<'static> {
    let mut lines = vec![
        Line::from(Theme::span(topic.short_description.to_string())),
        Line::default(),
    ];

    match app.in_flight() {
        Some(RequestKind::Explanation) => lines.push(Line::from(Span::styled(
            "Fetching explanation from AI...",
            Theme::warning(),
        ))),
        Some(RequestKind::Quiz) => lines.push(Line::from(Span::styled(
            "Generating quiz questions...",
            Theme::warning(),
        ))),
        None => {}
    }

    if let Some(explanation) = app.explanation() {
        lines.push(Theme::section_header("AI Explanation:"));
        lines.push(Line::default());
        lines.extend(render_markdown(explanation).lines);
    }
    Text::from(lines)
}

pub fn question_text(session: &QuizSession, option_cursor: usize) -> Text<'static> {
    let Some((idx, question)) = session.current_index().zip(session.current_question()) else {
        return Text::default();
    };
    let answer = session.current_answer();

    let mut lines = vec![
        Line::from(Span::styled(
            format!("Question {} of {}", idx + 1, session.len()),
            Theme::muted(),
        )),
        Line::default(),
        Line::from(Span::styled(question.question.clone(), Theme::emphasis())),
        Line::default(),
    ];

    for (option_idx, option) in question.options.iter().enumerate() {
        let chosen = answer == Some(option.as_str());
        let marker = if option_idx == option_cursor { "▶ " } else { "  " };
        let style = if chosen {
            Theme::highlight()
        } else {
            Theme::default_style()
        };
        lines.push(Line::from(vec![
            Theme::span(marker),
            Span::styled(format!("{}. {}", option_label(option_idx), option), style),
        ]));
    }

    lines.extend(issue_lines(question));
    Text::from(lines)
}

fn issue_lines(question: &QuizQuestion) -> Vec<Line<'static>> {
    let issues = question.issues();
    if issues.is_empty() {
        return Vec::new();
    }
    let described = issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    vec![
        Line::default(),
        Line::from(Span::styled(
            format!("⚠ This generated question {described}."),
            Theme::warning(),
        )),
    ]
}

pub fn results_text(session: &QuizSession) -> Text<'static> {
    let mut lines = vec![
        Line::from(Span::styled(
            format!("You scored {} out of {}!", session.score(), session.len()),
            Theme::label(),
        )),
        Line::default(),
    ];

    for (idx, result) in session.results().into_iter().enumerate() {
        lines.push(Line::from(Span::styled(
            format!("{}. {}", idx + 1, result.question),
            Theme::emphasis(),
        )));
        lines.push(Line::from(vec![
            Theme::span("   Your answer: "),
            Theme::span(
                result
                    .selected
                    .unwrap_or_else(|| "Not answered".to_string()),
            ),
        ]));
        lines.push(Line::from(vec![
            Theme::span("   Correct answer: "),
            Span::styled(result.correct_answer, Theme::verdict(result.correct)),
        ]));
        lines.push(Line::default());
    }
    Text::from(lines)
}

pub fn controls_lines(app: &AppState) -> Vec<Line<'static>> {
    let quit = [
        Theme::key_chip("Esc"),
        Theme::span(" / "),
        Theme::key_chip("Ctrl+C"),
        Theme::span(" quit"),
    ];

    let mut line = match app.view() {
        View::TopicList => vec![
            Theme::key_chip("↑/↓"),
            Theme::span(" move"),
            Theme::bullet(),
            Theme::key_chip("Enter"),
            Theme::span(" open topic"),
            Theme::bullet(),
        ],
        View::TopicDetail if app.is_busy() => vec![
            Theme::span("Waiting for the AI service"),
            Theme::bullet(),
            Theme::key_chip("B"),
            Theme::span(" back"),
            Theme::bullet(),
        ],
        View::TopicDetail => vec![
            Theme::key_chip("E"),
            Theme::span(" AI explanation"),
            Theme::bullet(),
            Theme::key_chip("Q"),
            Theme::span(" generate quiz"),
            Theme::bullet(),
            Theme::key_chip("↑/↓"),
            Theme::span(" scroll"),
            Theme::bullet(),
            Theme::key_chip("B"),
            Theme::span(" back"),
            Theme::bullet(),
        ],
        View::Quiz => quiz_controls(app.session()),
    };
    line.extend(quit);

    let mut lines = vec![Line::from(line)];
    if app.notice().is_some() {
        lines.push(Line::from(vec![
            Theme::key_chip("X"),
            Theme::span(" dismiss notice"),
        ]));
    }
    lines
}

fn quiz_controls(session: Option<&QuizSession>) -> Vec<Span<'static>> {
    match session {
        Some(session) if session.is_submitted() => vec![
            Theme::key_chip("R"),
            Theme::span(" retake this quiz"),
            Theme::bullet(),
            Theme::key_chip("B"),
            Theme::span(" back to topic"),
            Theme::bullet(),
        ],
        Some(session) => {
            let options = session
                .current_question()
                .map(|q| q.options.len())
                .unwrap_or(0);
            let advance = if session.is_last_question() {
                " submit quiz"
            } else {
                " next question"
            };
            let advance_style = if session.can_advance() {
                Theme::success()
            } else {
                Theme::muted()
            };
            vec![
                Theme::key_chip(format!("1-{options}")),
                Theme::span(" / "),
                Theme::key_chip("Space"),
                Theme::span(" choose"),
                Theme::bullet(),
                Theme::key_chip("Enter"),
                Span::styled(advance, advance_style),
                Theme::bullet(),
                Theme::key_chip("S"),
                Theme::span(" submit now"),
                Theme::bullet(),
                Theme::key_chip("B"),
                Theme::span(" exit quiz"),
                Theme::bullet(),
            ]
        }
        None => vec![
            Theme::key_chip("B"),
            Theme::span(" back to topic"),
            Theme::bullet(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flatten(text: &[Line<'_>]) -> String {
        text.iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn question(correct: &str) -> QuizQuestion {
        QuizQuestion {
            question: "Which door must swing in the direction of egress?".into(),
            options: ["Stair", "Closet", "Kitchen", "Office"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            correct_answer: correct.into(),
        }
    }

    fn quiz_app(questions: Vec<QuizQuestion>) -> AppState {
        let mut app = AppState::new(true);
        app.select_topic(&TOPICS[0]);
        let ticket = app.begin_request(RequestKind::Quiz).unwrap();
        app.finish_quiz(ticket, Ok(questions));
        app
    }

    #[test]
    fn topic_list_marks_cursor() {
        let ui = UiState {
            topic_cursor: 2,
            ..UiState::default()
        };
        let rendered = flatten(&topic_list_text(&ui).lines);
        assert!(rendered.contains(&format!("▶ {}", TOPICS[2].title)));
        assert!(rendered.contains(&format!("  {}", TOPICS[0].title)));
    }

    #[test]
    fn cursor_movement_is_clamped() {
        let mut ui = UiState::default();
        ui.move_topic(-1);
        assert_eq!(ui.topic_cursor, 0);
        ui.move_topic(100);
        assert_eq!(ui.topic_cursor, TOPICS.len() - 1);

        ui.move_option(2, 4);
        ui.move_option(5, 4);
        assert_eq!(ui.option_cursor, 3);

        ui.scroll_by(-3);
        assert_eq!(ui.scroll, 0);
        ui.scroll_by(4);
        assert_eq!(ui.scroll, 4);
    }

    #[test]
    fn detail_shows_loading_then_explanation() {
        let mut app = AppState::new(true);
        app.select_topic(&TOPICS[0]);
        let ticket = app.begin_request(RequestKind::Explanation).unwrap();
        let loading = flatten(&topic_detail_text(&app, &TOPICS[0]).lines);
        assert!(loading.contains("Fetching explanation from AI..."));

        app.finish_explanation(ticket, Ok("**Doors** must be unlocked.".into()));
        let done = flatten(&topic_detail_text(&app, &TOPICS[0]).lines);
        assert!(!done.contains("Fetching"));
        assert!(done.contains("AI Explanation:"));
        assert!(done.contains("Doors must be unlocked."));
    }

    #[test]
    fn question_view_shows_progress_and_choice() {
        let mut app = quiz_app(vec![question("Stair"), question("Stair")]);
        app.session_mut().unwrap().select_option(0).unwrap();

        let rendered = flatten(&question_text(app.session().unwrap(), 1).lines);
        assert!(rendered.contains("Question 1 of 2"));
        assert!(rendered.contains("  A. Stair"));
        assert!(rendered.contains("▶ B. Closet"));
        assert!(!rendered.contains("⚠"));
    }

    #[test]
    fn question_view_flags_unanswerable_question() {
        let app = quiz_app(vec![question("Garage")]);
        let rendered = flatten(&question_text(app.session().unwrap(), 0).lines);
        assert!(rendered.contains("correct answer is not one of the options"));
    }

    #[test]
    fn results_list_each_answer() {
        let mut app = quiz_app(vec![question("Stair"), question("Stair")]);
        let session = app.session_mut().unwrap();
        session.select_option(0).unwrap();
        session.advance().unwrap();
        session.select_option(1).unwrap();
        session.advance().unwrap();

        let rendered = flatten(&results_text(app.session().unwrap()).lines);
        assert!(rendered.contains("You scored 1 out of 2!"));
        assert!(rendered.contains("Your answer: Closet"));
        assert!(rendered.contains("Correct answer: Stair"));
    }

    #[test]
    fn controls_follow_the_session() {
        let mut app = quiz_app(vec![question("Stair"), question("Stair")]);
        let controls = flatten(&controls_lines(&app));
        assert!(controls.contains("next question"));

        let session = app.session_mut().unwrap();
        session.select_option(0).unwrap();
        session.advance().unwrap();
        assert!(flatten(&controls_lines(&app)).contains("submit quiz"));

        app.session_mut().unwrap().submit().unwrap();
        assert!(flatten(&controls_lines(&app)).contains("retake this quiz"));
    }

    #[test]
    fn controls_offer_dismiss_when_notice_shown() {
        let app = AppState::new(false);
        assert!(flatten(&controls_lines(&app)).contains("dismiss notice"));
    }
}

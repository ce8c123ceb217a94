use tracing::{debug, warn};

use crate::error::TrainerError;
use crate::quiz::QuizQuestion;
use crate::session::QuizSession;
use crate::topic::Topic;

pub const NO_TOPIC_MESSAGE: &str = "AI service not available or topic not selected.";
pub const EXPLANATION_FAILED_MESSAGE: &str = "Failed to fetch explanation from AI. Please ensure your API key is correctly configured and try again.";
pub const QUIZ_FAILED_MESSAGE: &str =
    "Failed to generate quiz. The AI may have returned an unexpected format. Please try again.";
pub const EMPTY_QUIZ_MESSAGE: &str =
    "No quiz questions available for this topic yet, or quiz generation failed.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    TopicList,
    TopicDetail,
    Quiz,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    Explanation,
    Quiz,
}

/// Identifies an in-flight request by the topic selection it was made for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestTicket {
    pub topic: &'static Topic,
    pub kind: RequestKind,
    epoch: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Error(String),
    Info(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Error(message) | Notice::Info(message) => message,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The selection changed while the request was in flight.
    Superseded,
}

#[derive(Debug)]
pub struct AppState {
    view: View,
    selected: Option<&'static Topic>,
    epoch: u64,
    explanation: Option<String>,
    session: Option<QuizSession>,
    in_flight: Option<RequestKind>,
    notice: Option<Notice>,
    configured: bool,
}

impl AppState {
    pub fn new(configured: bool) -> Self {
        let notice = (!configured).then(|| Notice::Error(TrainerError::ConfigurationMissing.to_string()));
        Self {
            view: View::TopicList,
            selected: None,
            epoch: 0,
            explanation: None,
            session: None,
            in_flight: None,
            notice,
            configured,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn selected(&self) -> Option<&'static Topic> {
        self.selected
    }

    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut QuizSession> {
        self.session.as_mut()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<RequestKind> {
        self.in_flight
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn select_topic(&mut self, topic: &'static Topic) {
        self.epoch += 1;
        self.selected = Some(topic);
        self.view = View::TopicDetail;
        self.explanation = None;
        self.session = None;
        self.notice = None;
    }

    pub fn back_to_list(&mut self) {
        self.epoch += 1;
        self.selected = None;
        self.view = View::TopicList;
        self.explanation = None;
        self.session = None;
        self.notice = None;
    }

    pub fn exit_quiz(&mut self) {
        if self.view == View::Quiz {
            self.session = None;
            self.view = View::TopicDetail;
        }
    }

    pub fn retake_quiz(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.retake();
        }
    }

    /// Marks the app busy and hands out a ticket, or records why the request
    /// cannot be made. Returns `None` while another request is in flight.
    pub fn begin_request(&mut self, kind: RequestKind) -> Option<RequestTicket> {
        if self.is_busy() {
            debug!(?kind, "request ignored while another is in flight");
            return None;
        }
        let Some(topic) = self.selected else {
            self.notice = Some(Notice::Error(NO_TOPIC_MESSAGE.to_string()));
            return None;
        };
        if !self.configured {
            self.notice = Some(Notice::Error(
                TrainerError::ConfigurationMissing.to_string(),
            ));
            return None;
        }

        self.in_flight = Some(kind);
        self.notice = None;
        match kind {
            RequestKind::Explanation => self.explanation = None,
            RequestKind::Quiz => self.session = None,
        }
        Some(RequestTicket {
            topic,
            kind,
            epoch: self.epoch,
        })
    }

    fn is_current(&self, ticket: &RequestTicket) -> bool {
        ticket.epoch == self.epoch && self.selected.is_some_and(|topic| topic.id == ticket.topic.id)
    }

    pub fn finish_explanation(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<String, TrainerError>,
    ) -> Completion {
        self.in_flight = None;
        if !self.is_current(&ticket) {
            debug!(topic = ticket.topic.id, "discarding stale explanation");
            return Completion::Superseded;
        }

        match outcome {
            Ok(text) => self.explanation = Some(text),
            Err(err) => {
                warn!(topic = ticket.topic.id, %err, "explanation request failed");
                self.explanation = None;
                self.notice = Some(Notice::Error(failure_message(&err, RequestKind::Explanation)));
            }
        }
        Completion::Applied
    }

    pub fn finish_quiz(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<Vec<QuizQuestion>, TrainerError>,
    ) -> Completion {
        self.in_flight = None;
        if !self.is_current(&ticket) {
            debug!(topic = ticket.topic.id, "discarding stale quiz");
            return Completion::Superseded;
        }

        match outcome {
            Ok(questions) if questions.is_empty() => {
                self.notice = Some(Notice::Info(EMPTY_QUIZ_MESSAGE.to_string()));
            }
            Ok(questions) => {
                self.session = Some(QuizSession::new(questions));
                self.view = View::Quiz;
            }
            Err(err) => {
                warn!(topic = ticket.topic.id, %err, "quiz request failed");
                self.session = None;
                self.notice = Some(Notice::Error(failure_message(&err, RequestKind::Quiz)));
            }
        }
        Completion::Applied
    }
}

fn failure_message(err: &TrainerError, kind: RequestKind) -> String {
    match (err, kind) {
        (TrainerError::ConfigurationMissing, _) => err.to_string(),
        (_, RequestKind::Explanation) => EXPLANATION_FAILED_MESSAGE.to_string(),
        (_, RequestKind::Quiz) => QUIZ_FAILED_MESSAGE.to_string(),
    }
}

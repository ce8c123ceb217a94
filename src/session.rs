use std::collections::HashMap;

use crate::error::SessionError;
use crate::quiz::QuizQuestion;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Answering(usize),
    Submitted { score: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionResult {
    pub question: String,
    pub selected: Option<String>,
    pub correct_answer: String,
    pub correct: bool,
}

/// One attempt at a generated quiz. Answers are keyed by question index and
/// may be partial until submission.
#[derive(Clone, Debug)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    answers: HashMap<usize, String>,
    state: SessionState,
}

impl QuizSession {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        Self {
            questions,
            answers: HashMap::new(),
            state: SessionState::Answering(0),
        }
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.state, SessionState::Submitted { .. })
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            SessionState::Answering(idx) => Some(idx),
            SessionState::Submitted { .. } => None,
        }
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.current_index().and_then(|idx| self.questions.get(idx))
    }

    pub fn answer(&self, idx: usize) -> Option<&str> {
        self.answers.get(&idx).map(String::as_str)
    }

    pub fn current_answer(&self) -> Option<&str> {
        self.current_index().and_then(|idx| self.answer(idx))
    }

    /// Records the option at `option_idx` for the current question,
    /// replacing any earlier choice.
    pub fn select_option(&mut self, option_idx: usize) -> Result<(), SessionError> {
        let idx = self.current_index().ok_or(SessionError::AlreadySubmitted)?;
        let option = self
            .questions
            .get(idx)
            .and_then(|question| question.options.get(option_idx))
            .ok_or(SessionError::NoSuchOption(option_idx + 1))?
            .clone();
        self.answers.insert(idx, option);
        Ok(())
    }

    pub fn can_advance(&self) -> bool {
        self.current_answer().is_some()
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index()
            .is_some_and(|idx| idx + 1 >= self.questions.len())
    }

    /// Moves past the current question, submitting after the last one.
    pub fn advance(&mut self) -> Result<SessionState, SessionError> {
        let idx = self.current_index().ok_or(SessionError::AlreadySubmitted)?;
        if !self.answers.contains_key(&idx) {
            return Err(SessionError::Unanswered(idx));
        }
        if idx + 1 < self.questions.len() {
            self.state = SessionState::Answering(idx + 1);
            Ok(self.state)
        } else {
            self.submit()
        }
    }

    /// Submits early; unanswered questions count as wrong.
    pub fn submit(&mut self) -> Result<SessionState, SessionError> {
        if self.is_submitted() {
            return Err(SessionError::AlreadySubmitted);
        }
        self.state = SessionState::Submitted {
            score: self.score(),
        };
        Ok(self.state)
    }

    pub fn retake(&mut self) {
        self.answers.clear();
        self.state = SessionState::Answering(0);
    }

    pub fn score(&self) -> usize {
        self.questions
            .iter()
            .enumerate()
            .filter(|(idx, question)| {
                self.answers
                    .get(idx)
                    .is_some_and(|answer| question.is_correct(answer))
            })
            .count()
    }

    pub fn results(&self) -> Vec<QuestionResult> {
        self.questions
            .iter()
            .enumerate()
            .map(|(idx, question)| {
                let selected = self.answers.get(&idx).cloned();
                let correct = selected
                    .as_deref()
                    .is_some_and(|answer| question.is_correct(answer));
                QuestionResult {
                    question: question.question.clone(),
                    selected,
                    correct_answer: question.correct_answer.clone(),
                    correct,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(n: usize, correct: &str) -> QuizQuestion {
        QuizQuestion {
            question: format!("Q{n}"),
            options: ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect(),
            correct_answer: correct.to_string(),
        }
    }

    fn five_questions() -> Vec<QuizQuestion> {
        ["A", "B", "C", "D", "A"]
            .iter()
            .enumerate()
            .map(|(n, correct)| question(n + 1, correct))
            .collect()
    }

    fn option_idx(label: &str) -> usize {
        ["A", "B", "C", "D"].iter().position(|o| *o == label).unwrap()
    }

    #[test]
    fn three_right_two_wrong_scores_three() {
        let mut session = QuizSession::new(five_questions());
        for pick in ["A", "B", "C", "A", "B"] {
            session.select_option(option_idx(pick)).unwrap();
            session.advance().unwrap();
        }

        assert_eq!(session.state(), SessionState::Submitted { score: 3 });
        assert_eq!(session.score(), 3);
        assert_eq!(session.score(), session.score());
    }

    #[test]
    fn advancing_requires_an_answer() {
        let mut session = QuizSession::new(five_questions());
        assert!(!session.can_advance());
        assert_eq!(session.advance(), Err(SessionError::Unanswered(0)));

        session.select_option(1).unwrap();
        assert!(session.can_advance());
        assert_eq!(session.advance(), Ok(SessionState::Answering(1)));
        assert_eq!(session.current_question().unwrap().question, "Q2");
    }

    #[test]
    fn reselecting_replaces_the_answer() {
        let mut session = QuizSession::new(five_questions());
        session.select_option(3).unwrap();
        session.select_option(0).unwrap();
        assert_eq!(session.current_answer(), Some("A"));
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn changing_one_answer_moves_score_by_at_most_one() {
        let mut session = QuizSession::new(five_questions());
        for pick in ["A", "B", "D", "D", "C"] {
            session.select_option(option_idx(pick)).unwrap();
            let before = session.score();
            for alternative in 0..4 {
                session.select_option(alternative).unwrap();
                assert!(session.score().abs_diff(before) <= 1);
            }
            session.select_option(option_idx(pick)).unwrap();
            session.advance().unwrap();
        }
    }

    #[test]
    fn early_submit_counts_unanswered_as_wrong() {
        let mut session = QuizSession::new(five_questions());
        session.select_option(0).unwrap();
        assert_eq!(session.submit(), Ok(SessionState::Submitted { score: 1 }));

        let results = session.results();
        assert!(results[0].correct);
        assert_eq!(results[1].selected, None);
        assert!(!results[1].correct);
        assert_eq!(results[4].correct_answer, "A");
    }

    #[test]
    fn submitted_is_terminal_until_retake() {
        let mut session = QuizSession::new(vec![question(1, "A")]);
        session.select_option(0).unwrap();
        assert!(session.is_last_question());
        session.advance().unwrap();

        assert!(session.is_submitted());
        assert_eq!(session.advance(), Err(SessionError::AlreadySubmitted));
        assert_eq!(session.select_option(0), Err(SessionError::AlreadySubmitted));
        assert_eq!(session.submit(), Err(SessionError::AlreadySubmitted));

        session.retake();
        assert_eq!(session.state(), SessionState::Answering(0));
        assert_eq!(session.current_answer(), None);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn out_of_range_option_is_rejected() {
        let mut session = QuizSession::new(vec![question(1, "A")]);
        assert_eq!(session.select_option(4), Err(SessionError::NoSuchOption(5)));
    }
}

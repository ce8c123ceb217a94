use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::TrainerError;

pub const EXPECTED_QUESTIONS: usize = 5;
pub const EXPECTED_OPTIONS: usize = 4;

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(\w*)?\s*\n?(.*?)\n?\s*```$").unwrap());

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

/// Provider obligations that the parser tolerates but reports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizIssue {
    OptionCount(usize),
    AnswerNotInOptions,
    DuplicateOptions,
}

impl fmt::Display for QuizIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizIssue::OptionCount(n) => {
                write!(f, "has {n} options instead of {EXPECTED_OPTIONS}")
            }
            QuizIssue::AnswerNotInOptions => write!(f, "correct answer is not one of the options"),
            QuizIssue::DuplicateOptions => write!(f, "repeats an option"),
        }
    }
}

impl QuizQuestion {
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }

    pub fn issues(&self) -> Vec<QuizIssue> {
        let mut issues = Vec::new();
        if self.options.len() != EXPECTED_OPTIONS {
            issues.push(QuizIssue::OptionCount(self.options.len()));
        }
        if !self.options.iter().any(|option| self.is_correct(option)) {
            issues.push(QuizIssue::AnswerNotInOptions);
        }
        let unique: HashSet<&str> = self.options.iter().map(String::as_str).collect();
        if unique.len() != self.options.len() {
            issues.push(QuizIssue::DuplicateOptions);
        }
        issues
    }

    pub fn answerable(&self) -> bool {
        !self.issues().contains(&QuizIssue::AnswerNotInOptions)
    }
}

/// Turns raw provider text into quiz questions. All elements must pass or the
/// whole response is rejected.
pub fn parse_quiz(raw: &str) -> Result<Vec<QuizQuestion>, TrainerError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(TrainerError::malformed("response was empty"));
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|err| TrainerError::malformed(format!("response is not valid JSON ({err})")))?;

    let Value::Array(items) = value else {
        return Err(TrainerError::malformed(format!(
            "expected a JSON array of questions, found {}",
            json_kind(&value)
        )));
    };

    let questions = items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| question_from_value(idx, item))
        .collect::<Result<Vec<_>, _>>()?;

    for (idx, question) in questions.iter().enumerate() {
        for issue in question.issues() {
            warn!(question = idx + 1, %issue, "quiz question accepted with issue");
        }
    }
    debug!(count = questions.len(), "parsed quiz response");

    Ok(questions)
}

pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    match FENCE_RE.captures(trimmed).and_then(|caps| caps.get(2)) {
        Some(body) => body.as_str().trim(),
        None => trimmed,
    }
}

fn question_from_value(idx: usize, value: Value) -> Result<QuizQuestion, TrainerError> {
    let number = idx + 1;
    let fields = match value {
        Value::Object(fields) if !fields.is_empty() => fields,
        other => {
            return Err(TrainerError::malformed(format!(
                "question {number} is {} instead of an object",
                json_kind(&other)
            )));
        }
    };

    let question = required_text(&fields, "question", number)?;
    let correct_answer = required_text(&fields, "correctAnswer", number)?;

    let options = match fields.get("options") {
        Some(Value::Array(options)) if !options.is_empty() => options
            .iter()
            .map(|option| {
                option.as_str().map(str::to_string).ok_or_else(|| {
                    TrainerError::malformed(format!(
                        "question {number} has a non-text option ({})",
                        json_kind(option)
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => {
            return Err(TrainerError::malformed(format!(
                "question {number} is missing `options`"
            )));
        }
    };

    Ok(QuizQuestion {
        question,
        options,
        correct_answer,
    })
}

fn required_text(
    fields: &Map<String, Value>,
    key: &str,
    number: usize,
) -> Result<String, TrainerError> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| TrainerError::malformed(format!("question {number} is missing `{key}`")))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(map) if map.is_empty() => "an empty object",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample(question: &str, correct: &str) -> QuizQuestion {
        QuizQuestion {
            question: question.to_string(),
            options: ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect(),
            correct_answer: correct.to_string(),
        }
    }

    fn assert_malformed(raw: &str) {
        match parse_quiz(raw) {
            Err(TrainerError::MalformedQuizData(_)) => {}
            other => panic!("expected MalformedQuizData for {raw:?}, got {other:?}"),
        }
    }

    #[test]
    fn parses_fenced_json_with_language_tag() {
        let raw = "```json\n[{\"question\":\"Q1\",\"options\":[\"A\",\"B\",\"C\",\"D\"],\"correctAnswer\":\"B\"}]\n```";
        let questions = parse_quiz(raw).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer, "B");
        assert_eq!(questions[0].options, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn parses_fence_without_language_tag_and_bare_json() {
        let json = serde_json::to_string(&vec![sample("Q1", "C")]).unwrap();

        let fenced = format!("```\n{json}\n```");
        assert_eq!(parse_quiz(&fenced).unwrap(), vec![sample("Q1", "C")]);

        let padded = format!("  \n{json}\n\t");
        assert_eq!(parse_quiz(&padded).unwrap(), vec![sample("Q1", "C")]);
    }

    #[test]
    fn rejects_non_json() {
        assert_malformed("not json");
        assert_malformed("");
        assert_malformed("   \n ");
        assert_malformed("```json\n```");
        assert_malformed("[{\"question\": \"Q\",");
    }

    #[test]
    fn rejects_non_array_values() {
        assert_malformed(r#"{"question":"Q","options":["A"],"correctAnswer":"A"}"#);
        assert_malformed("42");
        assert_malformed("null");
    }

    #[test]
    fn rejects_elements_missing_fields() {
        assert_malformed(r#"[{"options":["A","B"],"correctAnswer":"A"}]"#);
        assert_malformed(r#"[{"question":"Q","correctAnswer":"A"}]"#);
        assert_malformed(r#"[{"question":"Q","options":["A","B"]}]"#);
        assert_malformed(r#"[{"question":"","options":["A"],"correctAnswer":"A"}]"#);
        assert_malformed(r#"[{"question":"Q","options":[],"correctAnswer":"A"}]"#);
        assert_malformed(r#"[{}]"#);
        assert_malformed(r#"["Q"]"#);
    }

    #[test]
    fn one_bad_element_rejects_the_whole_quiz() {
        let raw = r#"[
            {"question":"Q1","options":["A","B","C","D"],"correctAnswer":"A"},
            {"question":"Q2","options":["A","B","C","D"]}
        ]"#;
        let err = parse_quiz(raw).unwrap_err();
        assert!(err.to_string().contains("question 2"));
    }

    #[test]
    fn rejects_non_text_options() {
        assert_malformed(r#"[{"question":"Q","options":["A",2,"C","D"],"correctAnswer":"A"}]"#);
    }

    #[test]
    fn ignores_extra_fields() {
        let raw = r#"[{"question":"Q","options":["A","B","C","D"],"correctAnswer":"D","explanation":"why"}]"#;
        assert_eq!(parse_quiz(raw).unwrap(), vec![sample("Q", "D")]);
    }

    #[test]
    fn keeps_but_flags_inconsistent_questions() {
        let raw = r#"[{"question":"Q","options":["A","B","B"],"correctAnswer":"E"}]"#;
        let questions = parse_quiz(raw).unwrap();
        let issues = questions[0].issues();
        assert!(issues.contains(&QuizIssue::OptionCount(3)));
        assert!(issues.contains(&QuizIssue::AnswerNotInOptions));
        assert!(issues.contains(&QuizIssue::DuplicateOptions));
        assert!(!questions[0].answerable());

        assert!(sample("Q", "A").issues().is_empty());
    }

    #[test]
    fn answer_comparison_is_exact() {
        let question = sample("Q", "B");
        assert!(question.is_correct("B"));
        assert!(!question.is_correct("b"));
        assert!(!question.is_correct(" B"));
    }

    #[test]
    fn strip_code_fence_leaves_unfenced_text() {
        assert_eq!(strip_code_fence("  [1, 2] "), "[1, 2]");
        assert_eq!(strip_code_fence("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("text ```json\n[1]\n```"), "text ```json\n[1]\n```");
    }

    proptest! {
        #[test]
        fn parse_quiz_never_panics(content in "\\PC*") {
            let _ = parse_quiz(&content);
        }

        #[test]
        fn wrapped_questions_survive_parsing(
            texts in prop::collection::vec("[A-Za-z0-9 ?]{1,30}", 1..6),
            tag in prop::option::of("[a-z]{1,6}"),
        ) {
            let questions: Vec<_> = texts
                .iter()
                .filter(|t| !t.trim().is_empty())
                .map(|t| sample(t, "A"))
                .collect();
            let json = serde_json::to_string_pretty(&questions).unwrap();
            let raw = format!("```{}\n{json}\n```", tag.unwrap_or_default());
            prop_assert_eq!(parse_quiz(&raw).unwrap(), questions);
        }
    }
}

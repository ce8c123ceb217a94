use crate::quiz::{EXPECTED_OPTIONS, EXPECTED_QUESTIONS};
use crate::topic::Topic;

pub const EXPLANATION_SYSTEM_PROMPT: &str = r#"
You are a fire and life safety instructor for nursing home staff.
You explain NFPA 101 Life Safety Code requirements accurately and in plain language.
Use short sections, headings, and bullet lists where they help.
"#;

pub const QUIZ_SYSTEM_PROMPT: &str = r#"
You write multiple-choice training quizzes on the NFPA 101 Life Safety Code for nursing home staff.
Every question has exactly one correct answer, and that answer is repeated word for word among the options.
"#;

pub fn explanation_prompt(topic: &Topic) -> String {
    format!(
        "Provide a detailed explanation of the Life Safety Code requirements for \"{title}\" \
         as it applies to nursing homes. Focus on key compliance points, common challenges, \
         and best practices. Structure the explanation for easy understanding by facility staff.",
        title = topic.title
    )
}

pub fn quiz_prompt(topic: &Topic) -> String {
    format!(
        "Generate {EXPECTED_QUESTIONS} multiple-choice quiz questions about Life Safety Code \
         section: \"{title}\" for nursing homes. For each question, provide one correct answer \
         and {distractors} plausible incorrect distractors. Format the output as a JSON array \
         of objects. Each object should have the following properties: \"question\" (string), \
         \"options\" (array of {EXPECTED_OPTIONS} strings), and \"correctAnswer\" (string, which \
         must be one of the provided options). Ensure the JSON is valid.",
        title = topic.title,
        distractors = number_word(EXPECTED_OPTIONS - 1),
    )
}

fn number_word(n: usize) -> String {
    match n {
        1 => "one".to_string(),
        2 => "two".to_string(),
        3 => "three".to_string(),
        4 => "four".to_string(),
        n => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topic::TOPICS;

    #[test]
    fn prompts_embed_the_title_verbatim() {
        for topic in TOPICS {
            assert!(explanation_prompt(topic).contains(topic.title));
            assert!(quiz_prompt(topic).contains(topic.title));
        }
    }

    #[test]
    fn quiz_prompt_states_the_expected_shape() {
        let prompt = quiz_prompt(&TOPICS[0]);
        assert!(prompt.starts_with("Generate 5 multiple-choice quiz questions"));
        assert!(prompt.contains("three plausible incorrect distractors"));
        assert!(prompt.contains("JSON array"));
        assert!(prompt.contains("\"options\" (array of 4 strings)"));
        assert!(prompt.contains("\"correctAnswer\""));
    }

    #[test]
    fn prompts_are_deterministic() {
        let topic = &TOPICS[3];
        assert_eq!(quiz_prompt(topic), quiz_prompt(topic));
        assert_eq!(explanation_prompt(topic), explanation_prompt(topic));
    }
}

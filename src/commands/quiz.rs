use std::io::Write;

use anyhow::{Context, Result};
use rand::seq::SliceRandom;

use crate::app::RequestKind;
use crate::commands::study;
use crate::palette::Palette;
use crate::quiz::QuizQuestion;
use crate::topic::Topic;
use crate::tutor::Tutor;
use crate::utils::{option_label, pluralize};

/// Opens the quiz screen for `topic`, or prints the generated questions with
/// their answers when `plain` is set.
pub async fn run(tutor: Tutor, topic: &'static Topic, plain: bool, shuffle: bool) -> Result<()> {
    if !plain {
        return study::run(tutor, Some(topic), Some(RequestKind::Quiz), shuffle).await;
    }

    let mut questions = tutor
        .generate_quiz(topic)
        .await
        .with_context(|| format!("Could not generate a quiz for {}", topic.title))?;
    if shuffle {
        questions.shuffle(&mut rand::rng());
    }
    let mut stdout = std::io::stdout().lock();
    write_plain(topic, &questions, &mut stdout)
}

fn write_plain(topic: &Topic, questions: &[QuizQuestion], out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "{} ({})\n",
        Palette::paint(Palette::ACCENT, format!("{} quiz", topic.title)),
        pluralize("question", questions.len())
    )?;
    if questions.is_empty() {
        writeln!(out, "{}", Palette::dim("The model returned no questions."))?;
        return Ok(());
    }

    for (n, question) in questions.iter().enumerate() {
        writeln!(out, "{}. {}", n + 1, question.question)?;
        for (idx, option) in question.options.iter().enumerate() {
            let line = format!("   {}. {}", option_label(idx), option);
            if question.is_correct(option) {
                writeln!(out, "{}", Palette::paint(Palette::SUCCESS, line))?;
            } else {
                writeln!(out, "{line}")?;
            }
        }
        writeln!(out, "   {}", Palette::dim(format!("Answer: {}", question.correct_answer)))?;
        for issue in question.issues() {
            writeln!(out, "   {}", Palette::paint(Palette::WARNING, format!("! {issue}")))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

use std::io::Write;

use anyhow::{Context, Result};

use crate::palette::Palette;
use crate::topic::Topic;
use crate::tutor::Tutor;

pub async fn run(tutor: &Tutor, topic: &Topic) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write_explanation(tutor, topic, &mut stdout).await
}

async fn write_explanation(tutor: &Tutor, topic: &Topic, out: &mut impl Write) -> Result<()> {
    let text = tutor
        .fetch_explanation(topic)
        .await
        .with_context(|| format!("Could not explain {}", topic.title))?;
    writeln!(out, "{}", Palette::paint(Palette::ACCENT, topic.title))?;
    writeln!(out, "{}\n", Palette::dim(topic.short_description))?;
    writeln!(out, "{}", text.trim_end())?;
    Ok(())
}

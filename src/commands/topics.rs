use crate::palette::Palette;
use crate::topic::{TOPICS, Topic};
use crate::utils::pluralize;

pub fn run() {
    print!("{}", render(TOPICS));
}

fn render(topics: &[Topic]) -> String {
    let width = topics.iter().map(|t| t.id.len()).max().unwrap_or(0);
    let mut out = String::new();
    for topic in topics {
        out.push_str(&format!(
            "{}  {}\n{}  {}\n",
            Palette::paint(Palette::ACCENT, format!("{:<width$}", topic.id)),
            topic.title,
            " ".repeat(width),
            Palette::dim(topic.short_description),
        ));
    }
    out.push_str(&format!("\n{}\n", pluralize("topic", topics.len())));
    out
}

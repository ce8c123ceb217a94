pub mod markdown;
pub mod theme;
pub mod views;

pub use markdown::render_markdown;
pub use theme::Theme;

pub mod explain;
pub mod llm;
pub mod quiz;
pub mod study;
pub mod topics;

//! Skazka - reading practice in the terminal
//!
//! Skazka asks a hosted language model for a short story at a chosen CEFR
//! level, then quizzes you on it with comprehension or grammar questions,
//! scoring each answer and explaining the correct one.

pub mod app;
pub mod cli;
pub mod config;
pub mod llm;
pub mod quiz;
pub mod store;
pub mod story;
pub mod theme;
pub mod tutor;
pub mod ui;

pub use app::App;
pub use config::Config;
pub use theme::Theme;
pub use tutor::Tutor;

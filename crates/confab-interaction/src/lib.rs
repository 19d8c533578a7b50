//! Remote model integration: the Gemini-backed RemoteAssistant and its
//! configuration loading.

pub mod config;
pub mod gemini;

pub use config::GeminiConfig;
pub use gemini::GeminiAssistant;

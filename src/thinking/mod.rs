pub mod config;
pub mod credentials;
pub mod gemini;
pub mod payload;
pub mod pipeline;
pub mod prompts;
pub mod warn;

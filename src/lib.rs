pub mod config;
pub mod dispatch;
pub mod error;
pub mod orchestrator;
pub mod outcome;
pub mod response;
pub mod session;
pub mod snippets;
pub mod stdin_hint;

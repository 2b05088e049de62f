pub mod commands;
pub mod handlers;
pub mod output;
pub mod prompt;

pub use commands::{CliArgs, Commands};
pub use handlers::CliContext;
pub use output::{OutputFormat, OutputFormatter};
pub use prompt::{Prompter, ScriptedPrompter, StdinPrompter};

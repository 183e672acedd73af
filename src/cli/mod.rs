// CLI module - Argument parsing, rendering and command handlers
pub mod args;
pub mod commands;
pub mod output;
pub mod validate;

pub use args::{FlagValue, ParsedArguments};
pub use commands::{execute_command, CommandContext};
pub use output::{Output, OutputConfig, OutputFormat, OutputSink};

//! memctl library
//!
//! Command-line client for a remote memory storage service: argument
//! tokenizer, output renderer and a REST client with payment retry.

pub mod cli;
pub mod domain;
pub mod infrastructure;

pub use cli::{Output, ParsedArguments};
pub use domain::config::MemctlConfig;
pub use domain::error::{MemctlError, MemctlResult};
pub use infrastructure::http::ApiClient;

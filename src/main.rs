// memctl - Memory service command line client
use memctl::cli::commands::{execute_command, CommandContext};
use memctl::cli::output::{ConsoleSink, Output, OutputConfig};
use memctl::cli::ParsedArguments;
use memctl::domain::config::MemctlConfig;
use memctl::domain::error::MemctlResult;
use memctl::infrastructure::config::ConfigManager;
use memctl::infrastructure::logging::init_logging;
use std::path::Path;
use tracing::debug;

#[tokio::main]
async fn main() {
    let tokens: Vec<String> = std::env::args().skip(1).collect();
    let mut args = ParsedArguments::parse(&tokens);

    let config_manager = ConfigManager::new();
    let config = match load_config(&config_manager, &args) {
        Ok(config) => config,
        Err(e) => fail(&args, &e.to_string()),
    };

    if let Some(namespace) = &config.defaults.namespace {
        args.set_default("namespace", namespace.as_str());
    }
    if let Some(format) = &config.defaults.format {
        args.set_default("format", format.as_str());
    }
    if let Some(limit) = config.defaults.limit {
        args.set_default("limit", limit.to_string());
    }

    if let Err(e) = init_logging(&config.log.level, args.enabled("verbose")) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let output = match Output::configure(&args) {
        Ok(output) => output,
        Err(e) => fail(&args, &e.to_string()),
    };

    let ctx = CommandContext {
        args: &args,
        config: &config,
        config_manager: &config_manager,
        output: &output,
    };

    if let Err(e) = execute_command(&ctx).await {
        debug!("Command failed: {:?}", e);
        if output.error(&e.to_string()).is_err() {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn load_config(manager: &ConfigManager, args: &ParsedArguments) -> MemctlResult<MemctlConfig> {
    let mut config = match args.value("config") {
        Some(path) => manager.load_config_from_path(Path::new(path))?,
        None => manager.load_config()?,
    };
    config.apply_env();
    Ok(config)
}

/// Report a failure that happened before the renderer existed
fn fail(args: &ParsedArguments, message: &str) -> ! {
    let mut config = OutputConfig::from_args(args);
    config.output_file = None;
    let output = Output::with_sink(config, ConsoleSink);
    if output.error(message).is_err() {
        eprintln!("Error: {}", message);
    }
    std::process::exit(1)
}

use repolift::cli::commands::{CliArgs, Commands};
use repolift::cli::handlers::{handle_analyze, handle_provision};
use repolift::config::EnvConfigSource;
use repolift::util::logging::{init_logging, parse_level, LoggingConfig};
use repolift::VERSION;

use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("repolift v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Analyze(analyze_args) => handle_analyze(analyze_args, args.quiet).await,
        Commands::Provision(provision_args) => handle_provision(provision_args, args.quiet).await,
    };

    std::process::exit(exit_code);
}

/// `--log-level` beats `-v`/`-q`, which beat `REPOLIFT_LOG_LEVEL`
fn init_logging_from_args(args: &CliArgs) {
    let mut config = LoggingConfig::from_source(&EnvConfigSource);

    if let Some(level_str) = &args.log_level {
        config.level = parse_level(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }

    init_logging(config);
}

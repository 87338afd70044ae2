use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Repository analysis and infrastructure provisioning
#[derive(Parser, Debug)]
#[command(
    name = "repolift",
    about = "Analyze a source checkout and provision the infrastructure it needs",
    version,
    long_about = "repolift inspects a checkout, detects its applications, databases and \
                  external services, and turns the result into databases, applications, \
                  resource links and environment variables inside one transaction."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Analyze a repository checkout",
        long_about = "Detects the monorepo layout, applications, databases, services and \
                      environment variables of a checkout.\n\n\
                      Examples:\n  \
                      repolift analyze\n  \
                      repolift analyze /tmp/repolift/shop --format json"
    )]
    Analyze(AnalyzeArgs),

    #[command(
        about = "Analyze and provision into an in-memory preview store",
        long_about = "Runs the analysis, then provisions the result into an in-memory \
                      store to preview the databases, applications, links and variables \
                      that would be created.\n\n\
                      Examples:\n  \
                      repolift provision /tmp/repolift/shop --repository https://github.com/acme/shop.git"
    )]
    Provision(ProvisionArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to the checkout (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ProvisionArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to the checkout (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(long, value_name = "URL", help = "Git repository URL of the checkout")]
    pub repository: String,

    #[arg(long, default_value = "main", help = "Git branch to deploy")]
    pub branch: String,

    #[arg(long, default_value = "production", help = "Environment name")]
    pub environment: String,

    #[arg(long, default_value = "local", help = "Destination id")]
    pub destination: String,

    #[arg(long, value_name = "ID", help = "Monorepo group id to tag applications with")]
    pub group_id: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

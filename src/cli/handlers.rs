//! Command handlers; each returns the process exit code

use super::commands::{AnalyzeArgs, ProvisionArgs};
use super::output::{OutputFormat, OutputFormatter};
use crate::config::{AnalyzerConfig, ProvisionerConfig};
use crate::detection::types::AnalysisResult;
use crate::detection::RepositoryAnalyzer;
use crate::provision::{
    Destination, Environment, GitConfig, InMemoryStore, InfrastructureProvisioner,
    StaticDestinationResolver, SubdomainAddressGenerator,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

fn resolve_path(path: &Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.clone()),
        None => std::env::current_dir().context("Failed to read current directory"),
    }
}

/// Analysis is synchronous file I/O plus one `du` run, so it goes to the blocking pool
async fn run_analysis(path: PathBuf) -> Result<AnalysisResult> {
    let config = AnalyzerConfig::from_env().context("Invalid analyzer configuration")?;
    debug!(scratch_root = %config.scratch_root.display(), "Analyzer configuration loaded");

    tokio::task::spawn_blocking(move || {
        RepositoryAnalyzer::from_config(&config)
            .analyze(&path)
            .map_err(anyhow::Error::from)
    })
    .await
    .context("Analysis task panicked")?
}

fn write_output(content: &str, output: &Option<PathBuf>) -> Result<()> {
    match output {
        Some(file) => {
            std::fs::write(file, content)
                .with_context(|| format!("Failed to write output to {}", file.display()))?;
            info!(file = %file.display(), "Output written");
        }
        None => println!("{}", content),
    }
    Ok(())
}

pub async fn handle_analyze(args: &AnalyzeArgs, quiet: bool) -> i32 {
    match analyze(args, quiet).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

async fn analyze(args: &AnalyzeArgs, quiet: bool) -> Result<()> {
    let path = resolve_path(&args.repository_path)?;
    if !quiet {
        info!(path = %path.display(), "Analyzing repository");
    }

    let result = run_analysis(path).await?;
    let formatted = OutputFormatter::new(OutputFormat::from(args.format)).format_analysis(&result)?;
    write_output(&formatted, &args.output)
}

pub async fn handle_provision(args: &ProvisionArgs, quiet: bool) -> i32 {
    match provision(args, quiet).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

fn preview_destination(id: &str) -> Destination {
    Destination {
        id: id.to_string(),
        server_id: "localhost".to_string(),
        network: "repolift".to_string(),
    }
}

async fn provision(args: &ProvisionArgs, quiet: bool) -> Result<()> {
    let path = resolve_path(&args.repository_path)?;
    let config = ProvisionerConfig::from_env().context("Invalid provisioner configuration")?;

    if !quiet {
        info!(path = %path.display(), repository = %args.repository, "Provisioning preview");
    }
    let analysis = run_analysis(path.clone()).await?;

    let store = Arc::new(InMemoryStore::new());
    let provisioner = InfrastructureProvisioner::new(
        store.clone(),
        Arc::new(StaticDestinationResolver::new(preview_destination(
            &args.destination,
        ))),
        Arc::new(SubdomainAddressGenerator::new(config.base_domain.clone())),
    )
    .with_config(config);

    let environment = Environment::new(environment_id(&path, &args.environment), &args.environment);
    let git = GitConfig::new(&args.repository, &args.branch);

    let result = provisioner
        .provision(
            &analysis,
            &environment,
            &args.destination,
            &git,
            args.group_id.clone(),
        )
        .await?;

    let snapshot = store.snapshot()?;
    debug!(
        databases = snapshot.databases.len(),
        applications = snapshot.applications.len(),
        "Preview store committed"
    );

    let formatted =
        OutputFormatter::new(OutputFormat::from(args.format)).format_provisioning(&result)?;
    write_output(&formatted, &args.output)
}

/// Stable preview id: `{checkout dir}-{environment}`
fn environment_id(path: &Path, environment: &str) -> String {
    let checkout = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "checkout".to_string());
    format!("{}-{}", checkout, environment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_id() {
        assert_eq!(
            environment_id(Path::new("/tmp/repolift/shop"), "staging"),
            "shop-staging"
        );
        assert_eq!(environment_id(Path::new("/"), "production"), "checkout-production");
    }

    #[test]
    fn test_resolve_path_prefers_argument() {
        let path = resolve_path(&Some(PathBuf::from("/tmp/x"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/x"));
    }
}

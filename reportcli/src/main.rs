use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use reportcraft_core::{
    DirStore, ObjectStore, ReportResponse, ServiceConfig, TableKind, parse_request, render_report,
    request::DEFAULT_SCENARIO_NAME, store,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reportcli")]
#[command(about = "Render a budget scenario report from the prebuilt XLSM template", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the JSON request payload
    #[arg(value_name = "PAYLOAD")]
    payload: PathBuf,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Template file (defaults to the well-known template key in the store)
    #[arg(long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Object store root directory
    #[arg(long, value_name = "DIR")]
    store_root: Option<PathBuf>,

    /// Base URL for the public report address
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Only print the JSON response
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        ServiceConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        // Try to load default config from current directory if it exists
        let default_config_path = PathBuf::from("reportcli.toml");
        if default_config_path.exists() {
            ServiceConfig::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            ServiceConfig::default()
        }
    };

    if let Some(root) = cli.store_root {
        config.store_root = root;
    }
    if let Some(template) = cli.template {
        config.template_path = Some(template);
    }
    if let Some(base) = cli.base_url {
        config.public_base_url = Some(base);
    }

    // Parse and normalize the payload; a missing scenarioId is rejected here,
    // before any template I/O happens
    let body = std::fs::read_to_string(&cli.payload)
        .with_context(|| format!("Failed to read payload: {}", cli.payload.display()))?;
    let request = parse_request(&body).context("Rejected request payload")?;

    if !cli.quiet {
        println!(
            "Rendering '{}' (scenario {})",
            request
                .scenario_name
                .as_deref()
                .unwrap_or(DEFAULT_SCENARIO_NAME),
            request.scenario_id
        );
        for kind in TableKind::ALL {
            println!(
                "  {}: {} rows",
                kind.sheet_name(),
                request.input.records_for(kind).len()
            );
        }
    }

    // Fetch the template; its absence is a deployment error
    let report_store = DirStore::new(&config.store_root);
    let template = match &config.template_path {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("Template not found: {}", path.display()))?,
        None => report_store
            .get(store::TEMPLATE_KEY)?
            .with_context(|| format!("Template not found: {}", store::TEMPLATE_KEY))?,
    };

    let bytes = render_report(&template, &request.input).context("Failed to render report")?;

    // Persist only after a fully successful render
    let file_name = store::report_file_name(request.scenario_name.as_deref());
    let key = store::report_key(&request.scenario_id, &file_name);
    report_store
        .put(&key, &bytes, store::REPORT_CONTENT_TYPE)
        .with_context(|| format!("Failed to store report at {key}"))?;

    let file_url = config
        .public_base_url
        .as_deref()
        .and_then(|base| store::public_url(base, &key))
        .unwrap_or_else(|| config.store_root.join(&key).display().to_string());

    if !cli.quiet {
        println!("{}", "✓ Report rendered".green().bold());
    }
    let response = ReportResponse { file_url, file_name };
    println!("{}", serde_json::to_string(&response)?);

    Ok(())
}

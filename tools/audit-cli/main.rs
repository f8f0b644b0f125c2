use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use auditor::compliance::ContextDocuments;
use auditor::config::AuditConfig;
use auditor::discovery::{CatalogProvider, DiscoveryProvider, UnavailableProvider};
use auditor::parse::GraphInput;
use auditor::pipeline::{AuditRequest, Auditor};
use auditor::report;
use auditor::scenario::{StubRunner, TestScenario};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Audit a workflow automation JSON file and print a compliance report.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Workflow JSON file.
    workflow: PathBuf,

    /// Query passed to node discovery.
    #[arg(short, long, default_value = "")]
    query: String,

    /// Use case passed to template discovery.
    #[arg(short, long, default_value = "")]
    use_case: String,

    /// JSON array of extra test scenarios.
    #[arg(short, long)]
    scenarios: Option<PathBuf>,

    /// Directory holding context documents (requirements.md, ...).
    #[arg(long)]
    context_dir: Option<PathBuf>,

    /// Mark a context document as present. Repeatable.
    #[arg(long = "doc")]
    docs: Vec<String>,

    /// Audit configuration JSON.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Node/template catalog JSON used for discovery.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Print the run as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn context_documents(cli: &Cli, config: &AuditConfig) -> ContextDocuments {
    let mut docs: ContextDocuments = cli.docs.iter().cloned().collect();
    if let Some(dir) = &cli.context_dir {
        for name in &config.compliance.required_docs {
            if dir.join(name).is_file() {
                docs.insert(name.clone(), true);
            }
        }
    }
    docs
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

async fn run(cli: Cli) -> Result<bool> {
    let config = match &cli.config {
        Some(path) => AuditConfig::from_path(path)
            .with_context(|| format!("invalid config {}", path.display()))?,
        None => AuditConfig::default(),
    };

    let provider: Arc<dyn DiscoveryProvider> = match &cli.catalog {
        Some(path) => Arc::new(
            CatalogProvider::from_path(path)
                .with_context(|| format!("invalid catalog {}", path.display()))?,
        ),
        None => Arc::new(UnavailableProvider),
    };

    let scenarios: Vec<TestScenario> = match &cli.scenarios {
        Some(path) => serde_json::from_str(&read(path)?)
            .with_context(|| format!("invalid scenarios {}", path.display()))?,
        None => Vec::new(),
    };

    let auditor = Auditor::new(provider, Arc::new(StubRunner), config);
    let request = AuditRequest {
        search_query: cli.query.clone(),
        use_case: cli.use_case.clone(),
        workflow: GraphInput::Text(read(&cli.workflow)?),
        scenarios,
        context_documents: context_documents(&cli, auditor.config()),
    };

    let run = auditor.run(&request).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        print!("{}", report::render_run(&run));
    }
    Ok(run.overall_passed())
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

//! azdoc CLI
//!
//! Command-line interface for documenting an Azure subscription from a
//! cached resource inventory.

use anyhow::{Context, Result};
use azdoc_analyzer::{AnalysisReport, SubscriptionAnalyzer, TopologyBuilder};
use azdoc_common::{DocConfig, ResourceStore};
use azdoc_generator::{DiagramRenderer, MarkdownRenderer, Narrative};
use azdoc_insight::InsightService;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = "azdoc.yaml";
const DEFAULT_SUBSCRIPTION_NAME: &str = "Azure Subscription";

#[derive(Parser)]
#[command(name = "azdoc")]
#[command(version, about = "Generate documentation and diagrams for an Azure subscription", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to ./azdoc.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the analyzers and print the scorecard and priority actions
    #[command(after_help = "EXAMPLES:\n  \
        # Print the scorecard\n  \
        azdoc analyze --input resources.json\n\n  \
        # Full analysis as JSON\n  \
        azdoc analyze --input resources.json --json > analysis.json")]
    Analyze {
        /// Resource inventory (JSON array of resource records)
        #[arg(short, long)]
        input: PathBuf,

        /// Print the full analysis as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Build the Markdown document, topology graph and diagrams
    #[command(after_help = "EXAMPLES:\n  \
        # Document into ./docs\n  \
        azdoc build --input resources.json\n\n  \
        # Markdown only, custom location\n  \
        azdoc build \\\n    \
        --input resources.json \\\n    \
        --out ./site \\\n    \
        --md-name PRODUCTION.md \\\n    \
        --no-diagrams\n\n  \
        # With AI narrative sections (key from OPENAI_API_KEY)\n  \
        azdoc build --input resources.json --enable-ai --model gpt-4o")]
    Build {
        /// Resource inventory (JSON array of resource records)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// File name of the Markdown document
        #[arg(long)]
        md_name: Option<String>,

        /// Skip draw.io diagram generation
        #[arg(long)]
        no_diagrams: bool,

        /// Add AI narrative sections and diagram suggestions
        #[arg(long)]
        enable_ai: bool,

        /// Model used for AI sections
        #[arg(long)]
        model: Option<String>,

        /// API key for the text-generation service
        #[arg(long)]
        openai_key: Option<String>,
    },

    /// Write the network topology graph as JSON
    #[command(after_help = "EXAMPLES:\n  \
        azdoc topology --input resources.json --output graph.json")]
    Topology {
        /// Resource inventory (JSON array of resource records)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (defaults to <output.dir>/<output.graph_name>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Command-line overrides for the `build` command
#[derive(Debug, Default)]
struct BuildOverrides {
    out: Option<PathBuf>,
    md_name: Option<String>,
    no_diagrams: bool,
    enable_ai: bool,
    model: Option<String>,
}

impl BuildOverrides {
    /// Flags win over file values
    fn apply(self, config: &mut DocConfig) {
        if let Some(out) = self.out {
            config.output.dir = out;
        }
        if let Some(md_name) = self.md_name {
            config.output.markdown_name = md_name;
        }
        if self.no_diagrams {
            config.output.diagrams = false;
        }
        if self.enable_ai {
            config.insight.enabled = true;
        }
        if let Some(model) = self.model {
            config.insight.model = model;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(level));

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze { input, json } => {
            analyze_command(&input, &config, json)?;
        }
        Commands::Build {
            input,
            out,
            md_name,
            no_diagrams,
            enable_ai,
            model,
            openai_key,
        } => {
            BuildOverrides {
                out,
                md_name,
                no_diagrams,
                enable_ai,
                model,
            }
            .apply(&mut config);
            log::debug!("Effective configuration: {:?}", config);
            build_command(&input, &config, openai_key, cli.verbose)?;
        }
        Commands::Topology { input, output } => {
            let output =
                output.unwrap_or_else(|| config.output.dir.join(&config.output.graph_name));
            topology_command(&input, &output)?;
        }
    }

    Ok(())
}

/// An explicit `--config` must exist; the default file is optional
fn load_config(path: Option<&Path>) -> Result<DocConfig> {
    match path {
        Some(path) => DocConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => DocConfig::load_or_default(Path::new(DEFAULT_CONFIG))
            .context("Failed to load azdoc.yaml"),
    }
}

fn load_store(input: &Path) -> Result<ResourceStore> {
    println!("{} Loading resources: {}", "→".cyan(), input.display());
    let store = ResourceStore::load(input)
        .with_context(|| format!("Failed to load resources from {}", input.display()))?;
    println!("{} Loaded {} resources", "✓".green(), store.len());
    Ok(store)
}

fn analyze_command(input: &Path, config: &DocConfig, json: bool) -> Result<()> {
    let store = ResourceStore::load(input)
        .with_context(|| format!("Failed to load resources from {}", input.display()))?;
    let report = SubscriptionAnalyzer::from_config(config).analyze(&store);

    if json {
        let rendered =
            serde_json::to_string_pretty(&report).context("Failed to serialize analysis")?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("{} Analyzed {} resources", "✓".green(), store.len());
    print_summary(&report);
    Ok(())
}

fn print_summary(report: &AnalysisReport) {
    println!("\n{}", "Scorecard:".bold());
    for line in report.scorecard() {
        println!(
            "  {} {:<11} {:>3}/100  {} ({} findings)",
            line.icon,
            line.name,
            line.score,
            line.label.yellow(),
            line.findings
        );
    }

    if report.priorities.is_empty() {
        println!("\n{}", "✓ No critical or high-priority issues found".green());
        return;
    }

    println!("\n{}", "Priority actions:".bold());
    for (i, action) in report.priorities.iter().enumerate() {
        println!(
            "  {}. {} {} ({})",
            i + 1,
            action.icon,
            action.title,
            action.severity.as_str().red()
        );
        println!("     {}", action.impact);
    }
}

fn build_command(
    input: &Path,
    config: &DocConfig,
    api_key_flag: Option<String>,
    verbose: bool,
) -> Result<()> {
    let store = load_store(input)?;
    let subscription_name = config
        .subscription_name
        .clone()
        .unwrap_or_else(|| DEFAULT_SUBSCRIPTION_NAME.to_string());

    if verbose {
        println!("  Subscription: {}", subscription_name);
        println!("  Output: {}", config.output.dir.display());
        println!("  Diagrams: {}", config.output.diagrams);
        println!("  AI insights: {}", config.insight.enabled);
    }

    println!("{} Analyzing...", "→".cyan());
    let report = SubscriptionAnalyzer::from_config(config).analyze(&store);
    print_summary(&report);

    let insight = connect_insight(config, api_key_flag);
    let mut failures = Vec::new();

    // Every artifact is attempted even after an earlier one fails
    let graph_path = config.output.dir.join(&config.output.graph_name);
    println!("\n{} Building topology graph...", "→".cyan());
    match TopologyBuilder::new(&store).build().save_to_file(&graph_path) {
        Ok(()) => println!("{} Wrote {}", "✓".green(), graph_path.display()),
        Err(e) => failures.push(warn_failure(e)),
    }

    let markdown_path = config.output.dir.join(&config.output.markdown_name);
    println!("{} Rendering Markdown...", "→".cyan());
    let narrative = insight.as_ref().map(|service| {
        println!("{} Requesting AI narrative...", "→".cyan());
        Narrative::gather(service, &store, &report)
    });
    let rendered = MarkdownRenderer::new(subscription_name)
        .and_then(|renderer| renderer.write(&markdown_path, &store, &report, narrative.as_ref()));
    match rendered {
        Ok(()) => println!("{} Wrote {}", "✓".green(), markdown_path.display()),
        Err(e) => failures.push(warn_failure(e)),
    }

    if config.output.diagrams {
        let diagrams_dir = config.output.dir.join(&config.output.diagrams_dir);
        println!("{} Generating diagrams...", "→".cyan());
        let mut renderer = DiagramRenderer::new(&diagrams_dir);
        if let Some(service) = insight.as_ref() {
            renderer = renderer.with_insight(service);
        }

        let diagrams = renderer.render(&store);
        for path in &diagrams.written {
            println!("{} Wrote {}", "✓".green(), path.display());
        }
        for e in diagrams.failures {
            failures.push(warn_failure(e));
        }
    }

    if !failures.is_empty() {
        anyhow::bail!(
            "{} artifact(s) could not be written:\n  {}",
            failures.len(),
            failures.join("\n  ")
        );
    }

    println!("\n{}", "✓ Documentation complete!".green().bold());
    println!("  📄 {}", markdown_path.display());
    Ok(())
}

fn topology_command(input: &Path, output: &Path) -> Result<()> {
    let store = load_store(input)?;

    println!("{} Building topology graph...", "→".cyan());
    let topology = TopologyBuilder::new(&store).build();
    topology
        .save_to_file(output)
        .context("Failed to write topology graph")?;

    println!(
        "{} Wrote {} nodes and {} edges to {}",
        "✓".green(),
        topology.nodes.len(),
        topology.edges.len(),
        output.display()
    );
    Ok(())
}

/// Narrative service when enabled and a key is available; otherwise warn and continue
fn connect_insight(config: &DocConfig, api_key_flag: Option<String>) -> Option<InsightService> {
    if !config.insight.enabled {
        return None;
    }

    let api_key = resolve_api_key(api_key_flag, &config.insight.api_key_env);
    match InsightService::from_config(&config.insight, api_key) {
        Ok(service) => {
            println!(
                "{} AI insights enabled ({})",
                "✓".green(),
                config.insight.model.yellow()
            );
            Some(service)
        }
        Err(e) => {
            println!("{} AI insights unavailable: {}", "⚠".yellow(), e);
            None
        }
    }
}

/// `--openai-key` first, then the configured environment variable
fn resolve_api_key(flag: Option<String>, env_var: &str) -> Option<String> {
    flag.filter(|key| !key.trim().is_empty())
        .or_else(|| std::env::var(env_var).ok())
        .filter(|key| !key.trim().is_empty())
}

fn warn_failure(error: impl std::fmt::Display) -> String {
    let message = error.to_string();
    println!("{} {}", "⚠".yellow(), message);
    message
}

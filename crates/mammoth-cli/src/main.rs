use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use pipeline_graph::config::default_config_dir;
use pipeline_graph::document::{self, workflow_filename};
use pipeline_graph::templates::{self, builtin_templates};
use pipeline_graph::{geometry, Accepts, Catalog, Category, DesignerConfig, GraphStore};

/// Mammoth - pipeline designer for recommender and vision workflows
#[derive(Parser)]
#[command(name = "mammoth")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory holding config.json (default: platform config dir)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the component catalog
    Catalog {
        /// Only show one category (input, transform, model, output)
        #[arg(long)]
        category: Option<String>,

        /// Print catalog entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the built-in workflow templates
    Templates,

    /// Expand a template into a workflow file
    Expand {
        /// Template name
        template: String,

        /// Output path (default: <app>-workflow-<date>.json in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report problems in a saved workflow
    Check {
        /// Path to the workflow file
        workflow_file: PathBuf,
    },

    /// Print edge attachment points of a saved workflow
    Anchors {
        /// Path to the workflow file
        workflow_file: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let config_dir = cli.config_dir.unwrap_or_else(default_config_dir);
    let config = DesignerConfig::load(&config_dir)
        .with_context(|| format!("failed to load config from {}", config_dir.display()))?;
    let catalog = Catalog::builtin();

    match cli.command {
        Commands::Catalog { category, json } => list_catalog(&catalog, category.as_deref(), json),
        Commands::Templates => {
            list_templates();
            Ok(())
        }
        Commands::Expand { template, output } => {
            expand_template(&catalog, &config, &template, output)
        }
        Commands::Check { workflow_file } => check_workflow(&catalog, &workflow_file),
        Commands::Anchors { workflow_file } => print_anchors(&config, &workflow_file),
    }
}

fn list_catalog(catalog: &Catalog, category: Option<&str>, json: bool) -> Result<()> {
    let categories = match category {
        Some(id) => match Category::from_id(id) {
            Some(category) => vec![category],
            None => bail!("unknown category '{}'", id),
        },
        None => Category::ALL.to_vec(),
    };

    if json {
        let entries: Vec<_> = categories
            .iter()
            .flat_map(|c| catalog.list_by_category(*c))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for category in categories {
        println!("{} ({})", category.label(), category.color());
        for component in catalog.list_by_category(category) {
            println!(
                "  {:<24} {:<28} {} -> {}",
                component.id,
                component.label,
                describe_accepts(&component.accepts),
                component.produces
            );
        }
    }
    Ok(())
}

fn describe_accepts(accepts: &Accepts) -> String {
    match accepts {
        Accepts::Nothing => "(source)".to_string(),
        Accepts::Any => "*".to_string(),
        Accepts::OneOf(tags) => tags
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn list_templates() {
    for template in builtin_templates() {
        println!("{:<24} {}", template.name, template.description);
        println!("  {}", template.blocks.join(" -> "));
    }
}

fn expand_template(
    catalog: &Catalog,
    config: &DesignerConfig,
    name: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let template = templates::template(name)?;
    let expansion = templates::expand(catalog, &template, &config.layout);
    for skipped in &expansion.skipped {
        log::warn!(
            "Skipped block {} ('{}'): not in the catalog",
            skipped.index,
            skipped.component_type
        );
    }

    let path = output.unwrap_or_else(|| {
        PathBuf::from(workflow_filename(
            &config.app_name,
            expansion.document.saved_at.date_naive(),
        ))
    });
    document::write_document(&path, &expansion.document)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!(
        "Wrote {} component(s) and {} connection(s) to {}",
        expansion.document.components.len(),
        expansion.document.connections.len(),
        path.display()
    );
    Ok(())
}

fn check_workflow(catalog: &Catalog, workflow_file: &Path) -> Result<()> {
    let contents = document::read_document(workflow_file)
        .with_context(|| format!("failed to read workflow file: {}", workflow_file.display()))?;

    let errors = pipeline_graph::validate_graph(&contents, catalog);
    if errors.is_empty() {
        println!(
            "{}: {} component(s), {} connection(s), no problems",
            workflow_file.display(),
            contents.nodes.len(),
            contents.edges.len()
        );
        return Ok(());
    }

    for error in &errors {
        println!("{}", error);
    }
    bail!("{} problem(s) in {}", errors.len(), workflow_file.display())
}

fn print_anchors(config: &DesignerConfig, workflow_file: &Path) -> Result<()> {
    let contents = document::read_document(workflow_file)
        .with_context(|| format!("failed to read workflow file: {}", workflow_file.display()))?;
    let store = GraphStore::from_contents(contents);

    for edge in store.edges() {
        match geometry::edge_anchors(&store, edge, &config.footprint) {
            Some((exit, entry)) => println!(
                "{:<28} ({}, {}) -> ({}, {})",
                edge.id, exit.x, exit.y, entry.x, entry.y
            ),
            None => log::warn!("Edge '{}' has a missing endpoint", edge.id),
        }
    }
    Ok(())
}

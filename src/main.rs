use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use sectioned::binding::TemplateRegistry;
use sectioned::config::Config;
use sectioned::diff::{diff, CollectionDiff, DiffOptions, RowDiff, SectionChange};
use sectioned::logging::init_tracing;
use sectioned::model::{CollectionDataSource, Row};
use sectioned::state::{ObservableState, Snapshot};

#[derive(Parser)]
#[command(name = "sectioned", version, about = "Inspect and diff sectioned collection layouts")]
struct Cli {
    /// Config file (default: ~/.config/sectioned/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a JSON layout and summarize its sections
    Validate {
        layout: PathBuf,
        /// Registered template name; repeat for each. Enables binding checks.
        #[arg(long = "template")]
        templates: Vec<String>,
    },
    /// Show section and row changes between two layouts
    Diff {
        old: PathBuf,
        new: PathBuf,
        /// Row id field (overrides config)
        #[arg(long)]
        id_key: Option<String>,
    },
    /// Append rows to a section's cell block and print the result
    Append {
        layout: PathBuf,
        #[arg(long)]
        section: usize,
        /// JSON file holding an array of row objects
        #[arg(long)]
        rows: PathBuf,
    },
    /// Publish layouts in order and print what a subscriber receives
    Replay {
        #[arg(required = true)]
        layouts: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    init_tracing(&config.logging);

    match cli.command {
        Command::Validate { layout, templates } => validate(&layout, &templates, &config),
        Command::Diff { old, new, id_key } => {
            let options = match id_key {
                Some(key) if key.is_empty() => DiffOptions::positional(),
                Some(key) => DiffOptions { id_key: Some(key) },
                None => config.diff_options(),
            };
            let old = load_layout(&old)?;
            let new = load_layout(&new)?;
            println!("{}", describe_diff(&diff(&old, &new, &options)));
            Ok(())
        }
        Command::Append {
            layout,
            section,
            rows,
        } => {
            let source = load_layout(&layout)?;
            let content = fs::read_to_string(&rows)
                .with_context(|| format!("reading rows from {}", rows.display()))?;
            let rows: Vec<Row> = serde_json::from_str(&content)
                .with_context(|| format!("parsing rows from {}", rows.display()))?;
            let appended = source.append_cells(section, rows)?;
            println!("{}", appended.to_json_pretty()?);
            Ok(())
        }
        Command::Replay { layouts } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("starting runtime")?;
            runtime.block_on(replay(&layouts, config.diff_options()))
        }
    }
}

fn load_layout(path: &Path) -> Result<CollectionDataSource> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading layout {}", path.display()))?;
    CollectionDataSource::from_json(&content)
        .with_context(|| format!("parsing layout {}", path.display()))
}

fn validate(path: &Path, templates: &[String], config: &Config) -> Result<()> {
    let source = load_layout(path)?;
    for line in summarize(&source) {
        println!("{}", line);
    }

    if templates.is_empty() {
        return Ok(());
    }

    let mut registry = TemplateRegistry::new().with_schema_validation(config.binding.validate_schema);
    for name in templates {
        registry.register(name.as_str(), |_: &Row| ());
    }
    let bound = registry.bind(&source);
    for diagnostic in &bound.diagnostics {
        println!("warning: {}", diagnostic);
    }
    if bound.has_unresolved() {
        bail!("{} has view names with no registered template", path.display());
    }
    Ok(())
}

fn summarize(source: &CollectionDataSource) -> Vec<String> {
    let mut lines = vec![format!(
        "{} sections, {} cell rows",
        source.len(),
        source.total_rows()
    )];
    for (i, section) in source.sections().iter().enumerate() {
        let header = section.header().map_or("-".to_string(), |b| b.view_name().to_string());
        let footer = section.footer().map_or("-".to_string(), |b| b.view_name().to_string());
        let cells = section.cells().map_or("-".to_string(), |b| {
            format!("{} x{}", b.view_name(), b.len())
        });
        lines.push(format!(
            "  [{}] header={} cells={} footer={} columns={}",
            i,
            header,
            cells,
            footer,
            section.columns()
        ));
    }
    lines
}

fn describe_diff(diff: &CollectionDiff) -> String {
    let changes = match diff {
        CollectionDiff::Reload => return "reload".to_string(),
        CollectionDiff::Sections(changes) => changes,
    };
    if diff.is_unchanged() {
        return "unchanged".to_string();
    }
    changes
        .iter()
        .enumerate()
        .filter(|(_, change)| **change != SectionChange::Unchanged)
        .map(|(i, change)| format!("[{}] {}", i, describe_change(change)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_change(change: &SectionChange) -> String {
    match change {
        SectionChange::Unchanged => "unchanged".to_string(),
        SectionChange::Replaced => "replaced".to_string(),
        SectionChange::Inserted => "inserted".to_string(),
        SectionChange::Removed => "removed".to_string(),
        SectionChange::Updated(update) => {
            let mut parts = Vec::new();
            if update.header_changed {
                parts.push("header".to_string());
            }
            if update.footer_changed {
                parts.push("footer".to_string());
            }
            if update.columns_changed {
                parts.push("columns".to_string());
            }
            if !update.rows.is_empty() {
                parts.push(describe_rows(&update.rows));
            }
            format!("updated({})", parts.join(" "))
        }
    }
}

fn describe_rows(rows: &RowDiff) -> String {
    match rows {
        RowDiff::Keyed(d) => format!(
            "rows by id: +{} -{} ~{} moved {}",
            d.inserted.len(),
            d.removed.len(),
            d.updated.len(),
            d.moved.len()
        ),
        RowDiff::Positional(d) => format!(
            "rows by position: +{} -{} ~{}",
            d.inserted.len(),
            d.removed.len(),
            d.updated.len()
        ),
    }
}

async fn replay(layouts: &[PathBuf], options: DiffOptions) -> Result<()> {
    let sources = layouts
        .iter()
        .map(|path| load_layout(path))
        .collect::<Result<Vec<_>>>()?;

    let state = ObservableState::new(CollectionDataSource::new());
    let (delivered_tx, mut delivered_rx) = tokio::sync::mpsc::unbounded_channel();
    let mut previous: Option<Snapshot<CollectionDataSource>> = None;

    let subscription = state.subscribe(move |snapshot: Snapshot<CollectionDataSource>| {
        let change = match &previous {
            Some(prev) => describe_diff(&diff(prev, &snapshot, &options)),
            None => "initial".to_string(),
        };
        println!("v{} ({} sections): {}", snapshot.version(), snapshot.len(), change);
        let _ = delivered_tx.send(snapshot.version());
        previous = Some(snapshot);
    })?;

    let mut last = 0;
    for source in sources {
        last = state.publish(source);
    }

    while let Some(version) = delivered_rx.recv().await {
        if version >= last {
            break;
        }
    }
    subscription.unsubscribe();
    Ok(())
}

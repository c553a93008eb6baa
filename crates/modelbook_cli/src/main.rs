//! Command-line companion for model notebooks.
//!
//! # Responsibility
//! - Smoke-check `modelbook_core` linkage.
//! - List theories, create notebooks and inspect stored or exported ones.
//!
//! # Invariants
//! - Output is deterministic plain text, except `export` which prints JSON.
//! - Failures go to stderr with a non-zero exit code.

use clap::{Parser, Subcommand};
use modelbook_core::{
    init_logging, CellView, CoreConfig, DocRepo, DocumentId, JudgmentView, ModelSession,
    NotebookModel, RefView, TheoryCatalog, TheoryId,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "modelbook")]
#[command(author, version, about = "Inspect and manage model notebooks", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite document store (overrides the config)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print core ping and version
    Ping,

    /// List the theories of the configured catalog
    Theories,

    /// List stored notebooks
    List,

    /// Create an empty notebook and print its id
    New {
        name: String,

        /// Theory id from the catalog
        #[arg(long)]
        theory: Option<String>,
    },

    /// Render a stored notebook with its diagnostics
    Show { doc_id: String },

    /// Print a stored notebook as JSON
    Export { doc_id: String },

    /// Render a notebook JSON file with its diagnostics
    Inspect { path: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    if cli.db.is_some() {
        config.db_path = cli.db.clone();
    }
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }

    match cli.command {
        Commands::Ping => {
            println!("modelbook_core ping={}", modelbook_core::ping());
            println!("modelbook_core version={}", modelbook_core::core_version());
        }
        Commands::Theories => {
            let catalog = config.catalog()?;
            for theory in catalog.theories() {
                println!("{}\t{}", theory.id, theory.name);
                for typ in &theory.types {
                    let shortcut = typ
                        .shortcut
                        .as_ref()
                        .map(|keys| keys.join("+"))
                        .unwrap_or_default();
                    println!("  {:?}\t{}\t{}\t{}", typ.tag, typ.id, typ.name, shortcut);
                }
            }
        }
        Commands::List => {
            let docs = DocRepo::new(require_store(&config)?);
            for row in docs.list()? {
                let theory = row.theory.as_ref().map_or("-", TheoryId::as_str);
                println!("{}\tv{}\t{}\t{}", row.id, row.version, theory, row.name);
            }
        }
        Commands::New { name, theory } => {
            let catalog = config.catalog()?;
            let theory = theory.map(TheoryId::new);
            if let Some(id) = &theory {
                if catalog.get(id).is_none() {
                    return Err(format!("unknown theory: {id}").into());
                }
            }
            let docs = DocRepo::new(require_store(&config)?);
            let handle = docs.create(NotebookModel::new(name).with_theory(theory))?;
            println!("{}", handle.id());
        }
        Commands::Show { doc_id } => {
            let docs = DocRepo::new(require_store(&config)?);
            let id: DocumentId = doc_id.trim().parse()?;
            let session =
                ModelSession::open(&docs, id, Arc::new(config.catalog()?), config.modifier()?)?;
            print_session(&session);
        }
        Commands::Export { doc_id } => {
            let docs = DocRepo::new(require_store(&config)?);
            let id: DocumentId = doc_id.trim().parse()?;
            let handle = docs.open(id)?;
            println!("{}", serde_json::to_string_pretty(&*handle.model())?);
        }
        Commands::Inspect { path } => {
            let json = std::fs::read_to_string(&path)?;
            let model = NotebookModel::from_json(&json)?;
            let catalog: Arc<TheoryCatalog> = Arc::new(config.catalog()?);
            let handle = modelbook_core::DocHandle::new(DocumentId::new(), model);
            let session = ModelSession::new(handle, catalog, config.modifier()?);
            print_session(&session);
        }
    }
    Ok(())
}

fn require_store(
    config: &CoreConfig,
) -> Result<modelbook_core::SqliteDocumentRepository, Box<dyn Error>> {
    if config.db_path.is_none() {
        return Err("no document store: pass --db or set db_path in the config".into());
    }
    Ok(config.open_store()?)
}

fn print_session(session: &ModelSession) {
    let view = session.render();
    println!("name: {}", view.name);
    match (&view.theory, &view.theory_name) {
        (Some(_), Some(name)) => println!("theory: {name}"),
        (Some(id), None) => println!("theory: {id} (unknown)"),
        (None, _) => println!("theory: -"),
    }
    println!("cells: {}", view.cells.len());
    for (index, cell) in view.cells.iter().enumerate() {
        println!("  [{index}] {}", describe_cell(cell));
    }

    let issues = session.diagnostics();
    if issues.is_empty() {
        println!("diagnostics: none");
    } else {
        println!("diagnostics: {}", issues.len());
        for issue in issues {
            println!("  {issue}");
        }
    }
}

fn describe_cell(cell: &CellView<JudgmentView>) -> String {
    match cell {
        CellView::RichText { content, .. } => format!("text ({} chars)", content.chars().count()),
        CellView::Formal { view, .. } => match view {
            JudgmentView::Object(object) => format!(
                "object `{}` : {}",
                object.name,
                type_label(&object.ob_type.id.to_string(), object.ob_type.name.as_deref())
            ),
            JudgmentView::Morphism(morphism) => format!(
                "morphism `{}` : {} -> {} ({})",
                morphism.name,
                ref_label(&morphism.dom),
                ref_label(&morphism.cod),
                type_label(&morphism.mor_type.id.to_string(), morphism.mor_type.name.as_deref())
            ),
        },
        CellView::Unrecognized { tag, .. } => {
            format!("unrecognized cell ({})", tag.as_deref().unwrap_or("no tag"))
        }
    }
}

fn type_label(id: &str, name: Option<&str>) -> String {
    match name {
        Some(name) => name.to_string(),
        None => format!("{id}?"),
    }
}

fn ref_label(reference: &RefView) -> String {
    match reference {
        RefView::Unset => "?".to_string(),
        RefView::Resolved { name, .. } => format!("`{name}`"),
        RefView::Dangling { id } => format!("<missing {id}>"),
    }
}

#[cfg(test)]
mod tests {
    use super::{describe_cell, ref_label, Cli};
    use clap::Parser;
    use modelbook_core::{CellId, CellView, EntityId, JudgmentView, RefView};

    #[test]
    fn parses_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["modelbook", "list", "--db", "/tmp/x.db"]).unwrap();
        assert_eq!(cli.db.as_deref(), Some(std::path::Path::new("/tmp/x.db")));
    }

    #[test]
    fn labels_unresolved_references() {
        let id = EntityId::new();
        assert_eq!(ref_label(&RefView::Unset), "?");
        assert_eq!(ref_label(&RefView::Dangling { id }), format!("<missing {id}>"));
    }

    #[test]
    fn describes_unrecognized_cells() {
        let cell: CellView<JudgmentView> = CellView::Unrecognized {
            id: CellId::new(),
            tag: Some("stack".to_string()),
        };
        assert_eq!(describe_cell(&cell), "unrecognized cell (stack)");
    }
}

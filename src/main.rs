use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use engine::{Engine, EngineConfig};
use script_cache::{DEFAULT_CAPACITY, ScriptStore};
use std::fs;
use std::path::{Path, PathBuf};
use vdom::EditScript;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "domdelta")]
#[command(about = "Diff markup documents and replay edit scripts")]
#[command(version)]
struct Cli {
    /// Engine configuration (TOML)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Script store snapshot (JSON), created on first use
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the edit script turning OLD into NEW as JSON
    Diff {
        old: PathBuf,
        new: PathBuf,

        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,

        /// Also stash the script in the store under this page path
        #[arg(long)]
        page: Option<String>,
    },

    /// Remove a stashed script from the store and print it as JSON
    Take { page: String },

    /// Apply a JSON edit script to a document and print the result
    Apply { document: PathBuf, script: PathBuf },

    /// Revert a JSON edit script previously applied to a document
    Undo { document: PathBuf, script: PathBuf },

    /// Print the virtual tree of a document as JSON
    Parse {
        document: PathBuf,

        #[arg(long)]
        pretty: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_script(path: &Path) -> Result<EditScript> {
    serde_json::from_str(&read(path)?)
        .with_context(|| format!("{} is not a valid edit script", path.display()))
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => Ok(EngineConfig::from_path(path)?),
        None => Ok(EngineConfig::default()),
    }
}

fn store_path(store: Option<&Path>) -> Result<&Path> {
    store.context("--store is required for this command")
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    if let Commands::Config = cli.command {
        print!("{}", config.to_toml_string());
        return Ok(());
    }
    if config.diff_cap.is_some() && !config.debug {
        log::warn!("diff_cap is only enforced when debug is enabled");
    }
    let engine = Engine::from_config(config).context("invalid configuration")?;

    match cli.command {
        Commands::Diff {
            old,
            new,
            pretty,
            page,
        } => {
            let script = engine.diff(&read(&old)?, &read(&new)?);
            log::info!("{} operations", script.len());
            println!("{}", to_json(&script, pretty)?);
            if let Some(page) = page {
                let path = store_path(cli.store.as_deref())?;
                let mut store = ScriptStore::load_or_new(path, DEFAULT_CAPACITY)?;
                if let Some((evicted, _)) = store.stash(page, script) {
                    log::info!("evicted stashed script for {evicted}");
                }
                store.save(path)?;
            }
        }
        Commands::Take { page } => {
            let path = store_path(cli.store.as_deref())?;
            let mut store = ScriptStore::load_or_new(path, DEFAULT_CAPACITY)?;
            let script = store
                .take(&page)
                .with_context(|| format!("no script stashed for {page}"))?;
            store.save(path)?;
            println!("{}", to_json(&script, false)?);
        }
        Commands::Apply { document, script } => {
            let script = read_script(&script)?;
            let mut doc = engine.materialize(&read(&document)?);
            engine
                .apply(&mut doc, &script)
                .with_context(|| format!("failed to apply script to {}", document.display()))?;
            println!("{}", engine.to_markup(&doc));
        }
        Commands::Undo { document, script } => {
            let script = read_script(&script)?;
            let mut doc = engine.materialize(&read(&document)?);
            engine
                .undo(&mut doc, &script)
                .with_context(|| format!("failed to undo script on {}", document.display()))?;
            println!("{}", engine.to_markup(&doc));
        }
        Commands::Parse { document, pretty } => {
            let tree = engine.parse(&read(&document)?);
            println!("{}", to_json(&tree, pretty)?);
        }
        Commands::Config => {}
    }
    Ok(())
}

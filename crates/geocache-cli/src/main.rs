mod play;
mod presenter;

use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use geocache_core::{GameConfig, MementoStore, Player, World, unix_to_iso8601};
use geocache_store::Store;

use crate::presenter::TextPresenter;

#[derive(Parser)]
#[command(name = "geocache", about = "Walk a procedural grid of caches and collect their tokens")]
struct Cli {
    /// Data directory (default: $GEOCACHE_DATA_DIR or ~/.geocache)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (default: <data-dir>/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively, reading commands from stdin
    Play,

    /// List caches in range of the saved position
    Look,

    /// Show world and player statistics
    Stats,

    /// Export mementos and player to a JSON file
    Export {
        /// Output file path
        path: PathBuf,
    },

    /// Import mementos and player from a JSON file
    Import {
        /// Input file path
        path: PathBuf,
    },

    /// Forget every memento and the saved player
    Reset,
}

fn data_dir(cli: &Cli) -> PathBuf {
    cli.data_dir
        .clone()
        .or_else(|| std::env::var("GEOCACHE_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(geocache_store::default_base_dir)
}

fn open_store(cli: &Cli) -> Result<Store> {
    let dir = data_dir(cli);
    geocache_store::open_data_dir(&dir)
        .with_context(|| format!("failed to open store in {}", dir.display()))
}

fn load_config(cli: &Cli) -> Result<GameConfig> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| geocache_store::config_path(&data_dir(cli)));
    geocache_store::load_config(&path).context("failed to load config")
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Play => cmd_play(&cli),
        Commands::Look => cmd_look(&cli),
        Commands::Stats => cmd_stats(&cli),
        Commands::Export { path } => cmd_export(&cli, path),
        Commands::Import { path } => cmd_import(&cli, path),
        Commands::Reset => cmd_reset(&cli),
    }
}

/// Build a session over the durable store, resuming the saved player.
fn open_world(cli: &Cli) -> Result<(World<TextPresenter>, Rc<Store>)> {
    let config = load_config(cli)?;
    let store = Rc::new(open_store(cli)?);
    let player = store.load_player().context("failed to load player")?;

    let mementos = MementoStore::restore(Rc::clone(&store));
    let presenter = TextPresenter::new(config.mapper());
    let mut world = World::from_config(&config, mementos, presenter);
    if let Some(player) = player {
        world = world.with_player(player);
    }
    world.start();
    Ok((world, store))
}

fn cmd_play(cli: &Cli) -> Result<()> {
    let (mut world, store) = open_world(cli)?;
    tracing::info!("starting at cell {}", world.current_cell());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let result = play::run(
        &mut world,
        stdin.lock(),
        |player: &Player| Ok(store.save_player(player)?),
        &mut stdout,
    );

    store
        .save_player(world.player())
        .context("failed to save player")?;
    result
}

fn cmd_look(cli: &Cli) -> Result<()> {
    let (mut world, store) = open_world(cli)?;
    // the listing below replaces the presenter's "+ cache" lines
    world.presenter_mut().drain();

    for line in play::look_lines(&world) {
        println!("{line}");
    }

    store
        .save_player(world.player())
        .context("failed to save player")?;
    Ok(())
}

fn cmd_stats(cli: &Cli) -> Result<()> {
    let store = open_store(cli)?;
    let stats = store
        .memento_stats()
        .context("failed to read mementos")?;
    let player = store.load_player().context("failed to load player")?;
    let last_take = store
        .load_mementos()
        .context("failed to read mementos")?
        .iter()
        .filter_map(|(_, m)| m.last_taken_at)
        .max();

    println!("caches:     {}", stats.total);
    println!("taken:      {}", stats.taken);
    println!("remaining:  {}", stats.tokens_remaining);
    match last_take {
        Some(secs) => println!("last take:  {}", unix_to_iso8601(secs)),
        None => println!("last take:  never"),
    }
    match player {
        Some(p) if p.has_token => println!("carrying:   {}", p.carried),
        _ => println!("carrying:   none"),
    }
    Ok(())
}

fn cmd_export(cli: &Cli, path: &Path) -> Result<()> {
    let store = open_store(cli)?;
    store
        .export_json_file(path)
        .with_context(|| format!("failed to export to {}", path.display()))?;
    println!("exported to {}", path.display());
    Ok(())
}

fn cmd_import(cli: &Cli, path: &Path) -> Result<()> {
    let store = open_store(cli)?;
    store
        .import_json_file(path)
        .context("failed to import JSON")?;
    let stats = store
        .memento_stats()
        .context("failed to read mementos after import")?;
    println!(
        "imported from {}. caches={}, taken={}",
        path.display(),
        stats.total,
        stats.taken
    );
    Ok(())
}

fn cmd_reset(cli: &Cli) -> Result<()> {
    let store = open_store(cli)?;
    store.clear().context("failed to reset")?;
    println!("world reset");
    Ok(())
}

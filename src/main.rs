// Entry point for the termsweeper TUI
// Reads the command line and config, sets up file logging, then hands a game session to the UI

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

// Module declarations
mod tsw_color;  // Terminal-aware tile palette
mod tsw_config; // Config file and command-line options
mod tsw_error;  // Game error types
mod tsw_game;   // Difficulty, game state machine, render interface
mod tsw_grid;   // Minefield generation and neighbours
mod tsw_lang;   // Multi-language string resources
mod tsw_reveal; // Reveal, flood, chord and flag rules
mod tsw_timer;  // One-second game clock
mod tsw_ui;     // Terminal UI rendering and event handling

use tsw_config::{Cli, load_config, log_path};
use tsw_game::GameSession;
use tsw_lang::Lang;
use tsw_ui::run as run_ui;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(&cli);

    // File settings first, command line on top
    let mut cfg = load_config(cli.config.as_deref())?;
    cfg.apply_cli(&cli);

    let lang = Lang::new(&cfg.language);

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let difficulty = cfg.difficulty();
    let mut session = GameSession::new(difficulty, cfg.placement, rng)
        .wrap_err_with(|| format!("cannot set up a {difficulty} board"))?;
    info!(%difficulty, placement = ?cfg.placement, seed = ?cli.seed, "session ready");

    run_ui(&mut session, &cfg, &lang)
}

// The terminal belongs to the UI, so log lines go to a file
fn init_logging(cli: &Cli) {
    let Some(path) = cli.log_file.clone().or_else(log_path) else {
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => tracing_subscriber::fmt()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_max_level(cli.log_level)
            .init(),
        Err(e) => eprintln!("logging disabled, cannot open {}: {e}", path.display()),
    }
}

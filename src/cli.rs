//! Command-line interface for wave-bridge.
//!
//! Each subcommand connects to a running viewer, performs one operation and
//! cleans up the connection again.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::viewer::{SearchDirection, ViewerBridge};
use wave_bridge_config::{BridgeConfig, LogLevel};

/// wave-bridge - drive a running Verdi/nWave waveform viewer
#[derive(Parser, Debug)]
#[command(name = "wave-bridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Viewer interpreter name (default: config `target`, else first candidate)
    #[arg(long, short, global = true, value_name = "NAME")]
    pub target: Option<String>,

    /// Config file to use instead of ~/.config/wave-bridge/config.yaml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Debug log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List interpreter names that look like a viewer
    Candidates,
    /// Print the loaded waveform file
    Filename,
    /// Print the cursor time and timescale
    Cursor,
    /// Print the value of a signal at the cursor
    Value {
        /// Hierarchical signal path, e.g. /top/u0/data[7:0]
        signal: String,
    },
    /// Move the cursor to a time and center the view
    SetCursor {
        /// Time in the file's timescale
        time: String,
    },
    /// Move the cursor to the next (or previous) change of a signal
    Search {
        /// Hierarchical signal path
        signal: String,

        /// Search backward instead of forward
        #[arg(long)]
        prev: bool,
    },
    /// Print the cursor time every time it moves in the viewer
    Watch {
        /// Stop after this many seconds (default: run until interrupted)
        #[arg(long, value_name = "SECONDS")]
        seconds: Option<u64>,
    },
}

/// Parse arguments, run the requested subcommand and return the exit code.
pub fn process_cli() -> i32 {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("wave-bridge: {:#}", e);
            1
        }
    }
}

/// Run one parsed command line.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => BridgeConfig::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => BridgeConfig::load().context("loading config")?,
    };

    // CLI flag wins, then DEBUG_LEVEL, then the config file
    let level = cli.log_level.or_else(|| {
        std::env::var_os("DEBUG_LEVEL")
            .is_none()
            .then_some(config.log_level)
    });
    crate::debug::init_log_bridge(level.map(LogLevel::to_level_filter));
    log::info!("wave-bridge {} running {:?}", crate::VERSION, cli.command);

    let mut bridge = ViewerBridge::connect(&config).context("starting Tk helper")?;

    let result = match cli.command {
        Commands::Candidates => {
            for candidate in bridge.get_candidates_for_wave_tk_name() {
                println!("{}", candidate);
            }
            Ok(())
        }
        command => select_target(&mut bridge, cli.target).and_then(|()| {
            execute(&mut bridge, command)
        }),
    };

    // Always release the viewer-side registration, even on failure
    let cleanup = bridge.cleanup().context("cleaning up viewer connection");
    result.and(cleanup)
}

fn select_target(bridge: &mut ViewerBridge, target: Option<String>) -> anyhow::Result<()> {
    let target = target
        .or_else(|| bridge.get_wave_tk_name().map(str::to_string))
        .or_else(|| bridge.get_candidates_for_wave_tk_name().first().cloned());
    match target {
        Some(name) => {
            log::info!("Using viewer interpreter {:?}", name);
            bridge.set_wave_tk_name(name);
            Ok(())
        }
        None => bail!("no Verdi/nWave interpreter found; is the viewer running on this display?"),
    }
}

fn execute(bridge: &mut ViewerBridge, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Candidates => {}
        Commands::Filename => println!("{}", bridge.get_wave_filename()?),
        Commands::Cursor => {
            let cursor = bridge.get_cursor()?;
            println!("{} {}", cursor.time, cursor.timescale);
        }
        Commands::Value { signal } => println!("{}", bridge.get_signal_value_by_time(&signal)?),
        Commands::SetCursor { time } => {
            bridge.set_cursor(&time)?;
            bridge.center_cursor()?;
        }
        Commands::Search { signal, prev } => {
            let direction = if prev {
                SearchDirection::Prev
            } else {
                SearchDirection::Next
            };
            match bridge.search_signal_change(&signal, direction)? {
                Some(time) => println!("{}", time),
                None => println!("no change of {} ({})", signal, direction),
            }
        }
        Commands::Watch { seconds } => watch(bridge, seconds.map(Duration::from_secs))?,
    }
    Ok(())
}

fn watch(bridge: &mut ViewerBridge, duration: Option<Duration>) -> anyhow::Result<()> {
    // Fail early if the viewer is not answering
    let filename = bridge.get_wave_filename()?.to_string();
    println!("watching cursor in {}", filename);

    bridge.add_time_change_fn(|time| println!("{}", time));
    bridge.register_time_change_callback()?;

    let deadline = duration.map(|d| Instant::now() + d);
    loop {
        let wait = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                (deadline - now).min(Duration::from_millis(250))
            }
            None => Duration::from_millis(250),
        };
        bridge.wait_for_events(wait)?;
    }
    Ok(())
}

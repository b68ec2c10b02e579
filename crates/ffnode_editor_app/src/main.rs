// SPDX-License-Identifier: MIT OR Apache-2.0
//! FFnode Editor - assemble FFmpeg filter graphs and preview them
//!
//! Command-line front end over the editor crates:
//! - Search the filter catalog
//! - Probe media files for their streams
//! - Compile saved graphs into transcoder arguments
//! - Preview saved graphs in an external viewer
//!
//! ## Architecture
//!
//! Graph editing lives in `ffnode_editor_graph`, subprocess handling in
//! `ffnode_editor_runner`. This binary wires both together through an
//! [`session::EditorSession`] configured from the user's preferences.

mod error;
mod preferences;
mod session;

use clap::{Parser, Subcommand};
use error::EditorError;
use ffnode_editor_graph::{Catalog, NodeId};
use ffnode_editor_runner::Runner;
use preferences::Preferences;
use session::EditorSession;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default log directive, extended by `RUST_LOG`
const DEFAULT_LOG_DIRECTIVE: &str = "ffnode_editor=info";

/// FFnode Editor - assemble FFmpeg filter graphs and preview them
#[derive(Parser, Debug)]
#[command(name = "ffnode_editor", version, about, long_about = None)]
struct Args {
    /// Preferences file (platform config directory by default)
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    /// Filter catalog, overriding the preferences
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the filter catalog
    Filters {
        /// Case-insensitive filter name fragment (all filters if omitted)
        query: Option<String>,
        /// Maximum number of results
        #[arg(long, default_value_t = 6)]
        limit: usize,
    },
    /// List the streams of a media file
    Probe {
        /// Media file path or URL
        media: String,
    },
    /// Print the transcoder command for a saved graph
    Compile {
        /// Graph document
        graph: PathBuf,
        /// Only compile what this node depends on
        #[arg(long)]
        root: Option<u32>,
    },
    /// Preview a saved graph in the viewer
    Play {
        /// Graph document
        graph: PathBuf,
        /// Only preview what this node depends on
        #[arg(long)]
        root: Option<u32>,
    },
    /// Show the preferences
    Prefs {
        /// Write default preferences if none exist
        #[arg(long)]
        init: bool,
    },
}

fn main() -> ExitCode {
    let mut env_filter = EnvFilter::from_default_env();
    match DEFAULT_LOG_DIRECTIVE.parse() {
        Ok(directive) => env_filter = env_filter.add_directive(directive),
        Err(e) => eprintln!("Ignoring log directive {DEFAULT_LOG_DIRECTIVE:?}: {e}"),
    }

    // Logs go to stderr so command output can be piped
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    tracing::debug!("Starting FFnode Editor v{}", env!("CARGO_PKG_VERSION"));

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), EditorError> {
    let prefs_path = args.prefs.clone().unwrap_or_else(Preferences::default_path);

    if let Command::Prefs { init } = args.command {
        return show_preferences(&prefs_path, init);
    }

    let prefs = Preferences::load_or_default(&prefs_path).map_err(EditorError::Preferences)?;
    let runner = Arc::new(Runner::new(prefs.runner_config()));

    match args.command {
        Command::Probe { media } => {
            let sockets = runner.get_info(&media);
            if sockets.is_empty() {
                println!("No streams found in {media}");
            }
            for (index, socket) in sockets.iter().enumerate() {
                println!("#{index} {:<8} {}", socket.kind.as_str(), socket.name);
            }
            Ok(())
        }
        command => {
            let catalog_path = args
                .catalog
                .clone()
                .unwrap_or_else(|| prefs.catalog_path(&prefs_path));
            let catalog = Arc::new(Catalog::load_json(&catalog_path)?);
            tracing::info!("Loaded {} filters from {:?}", catalog.len(), catalog_path);

            match command {
                Command::Filters { query, limit } => {
                    list_filters(&catalog, query.as_deref().unwrap_or(""), limit);
                    Ok(())
                }
                Command::Compile { graph, root } => {
                    let session = open(catalog, runner, &graph)?;
                    let compiled = session.compile(root.map(NodeId))?;
                    let program = prefs.transcoder.to_string_lossy().into_owned();
                    let line: Vec<String> = std::iter::once(program)
                        .chain(compiled.render_args())
                        .map(|arg| shell_quote(&arg))
                        .collect();
                    println!("{}", line.join(" "));
                    for preview in compiled.preview_outputs() {
                        println!("# unconnected output {}", preview.label);
                    }
                    Ok(())
                }
                Command::Play { graph, root } => {
                    let session = open(catalog, runner, &graph)?;
                    let outcome = session.play(root.map(NodeId))?;
                    tracing::info!("Preview finished, transcoder {:?}", outcome.transcoder);
                    Ok(())
                }
                Command::Probe { .. } | Command::Prefs { .. } => Ok(()),
            }
        }
    }
}

fn open(catalog: Arc<Catalog>, runner: Arc<Runner>, path: &Path) -> Result<EditorSession, EditorError> {
    let mut session = EditorSession::new(catalog, runner);
    let report = session.open(path)?;
    for missing in &report.missing_filters {
        eprintln!("warning: {missing}");
    }
    for option in &report.unknown_options {
        eprintln!("warning: unknown option {option}");
    }
    for link in &report.dropped_links {
        eprintln!("warning: dropped link {} -> {}", link.src, link.dest);
    }
    Ok(session)
}

fn list_filters(catalog: &Catalog, query: &str, limit: usize) {
    for filter in catalog.search(query, limit) {
        println!("{:<20} {}", filter.name, filter.description);
    }
}

fn show_preferences(path: &Path, init: bool) -> Result<(), EditorError> {
    if init && !path.exists() {
        Preferences::default()
            .save(path)
            .map_err(EditorError::Preferences)?;
        tracing::info!("Wrote default preferences to {:?}", path);
    }
    let prefs = Preferences::load_or_default(path).map_err(EditorError::Preferences)?;
    println!("# {}", path.display());
    println!("transcoder: {}", prefs.transcoder.display());
    println!("prober:     {}", prefs.prober.display());
    println!("viewer:     {:?}", prefs.viewer.as_str());
    println!("catalog:    {}", prefs.catalog_path(path).display());
    println!("container:  {}", prefs.playback.container);
    Ok(())
}

/// Quote an argument for display as a POSIX shell word
fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

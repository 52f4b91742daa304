//! markfold - terminal markdown editor with live marker folding

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use markfold::config::Config;
use markfold::editor::EditorState;
use markfold::error::{EditorError, Result};
use markfold::marker::{render_document, MarkerEngine};
use markfold::terminal::Terminal;

/// Command line options
#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    render: bool,
    file: Option<PathBuf>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = match parse_args(env::args().skip(1))? {
        Some(args) => args,
        None => return Ok(()),
    };

    init_tracing()?;

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let (rules, rule_errors) = config.rule_set_lenient();

    if args.render {
        let path = args
            .file
            .ok_or_else(|| EditorError::Message("--render needs a FILE".to_string()))?;
        let text = fs::read_to_string(&path)?;
        print!("{}", render_document(&text, &rules));
        return Ok(());
    }

    let styles = config.style_table()?;
    let engine = MarkerEngine::new(rules, config.rebuild_policy());

    let terminal = Terminal::new()?;
    let mut editor = EditorState::new(terminal, engine, styles, config.live);

    if let Some(path) = &args.file {
        editor.open_file(path)?;
    }
    if let Some(first) = rule_errors.first() {
        editor
            .display
            .set_message(format!("{} invalid rule(s): {}", rule_errors.len(), first));
    }

    editor.run()
}

/// Parse arguments; `None` means the program already did its job
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<Args>> {
    let mut parsed = Args::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            "--version" | "-V" => {
                println!("markfold {}", env!("CARGO_PKG_VERSION"));
                return Ok(None);
            }
            "--config" | "-c" => {
                let path = args
                    .next()
                    .ok_or_else(|| EditorError::Message("--config needs a PATH".to_string()))?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--render" | "-r" => parsed.render = true,
            _ if arg.starts_with('-') => {
                return Err(EditorError::Message(format!("unknown option {}", arg)));
            }
            _ => parsed.file = Some(PathBuf::from(arg)),
        }
    }

    Ok(Some(parsed))
}

/// Log to the file named by MARKFOLD_LOG; the terminal belongs to the editor
fn init_tracing() -> Result<()> {
    let path = match env::var_os("MARKFOLD_LOG") {
        Some(path) => path,
        None => return Ok(()),
    };
    let file = fs::File::create(path)?;
    let installed = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    if let Err(e) = installed {
        eprintln!("Warning: logging disabled: {}", e);
    }
    Ok(())
}

fn print_usage() {
    println!("markfold {} - markdown editor with live marker folding", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: markfold [OPTIONS] [FILE]");
    println!();
    println!("Options:");
    println!("  -c, --config PATH  Read settings from PATH instead of ~/.markfold.toml");
    println!("  -r, --render       Print FILE as HTML with markers applied, then exit");
    println!("  -h, --help         Show this help message");
    println!("  -V, --version      Show version information");
    println!();
    println!("Logging: set MARKFOLD_LOG=FILE and RUST_LOG=debug");
    println!();
    println!("Key bindings:");
    println!("  C-f, C-b, C-n, C-p, arrows  Move");
    println!("  C-a, Home / C-e, End        Line start / end");
    println!("  C-SPC                       Set or clear the mark");
    println!("  F2                          Toggle live / source mode");
    println!("  C-s, C-x C-s                Save");
    println!("  C-q, C-x C-c                Quit");
}

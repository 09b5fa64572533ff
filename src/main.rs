use anyhow::Context;
use clap::Parser;
use eagle_eye::display::LogDisplay;
use eagle_eye::settings::ConfigPaths;
use eagle_eye::{
    EventKind, Geometry, InsertPosition, Kiosk, KioskEvent, SettingsStore, ShellEvent, UrlEntry,
    APP_NAME,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Runtime;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Cycle through a list of web pages in a single kiosk window.
#[derive(Parser, Debug)]
#[command(name = "eagle-eye", version, about, long_about = None)]
struct Cli {
    /// Configuration directory [default: ~/.eagle-eye]
    #[arg(short, long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Window geometry for this session, e.g. 1280x720+0+0
    #[arg(short, long, value_name = "WxH+X+Y")]
    geometry: Option<Geometry>,

    /// Run without a window, reading commands from stdin
    #[arg(long)]
    headless: bool,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Shorthand for --log-level debug
    #[arg(long)]
    debug: bool,

    /// Shorthand for --log-level trace
    #[arg(long)]
    trace: bool,

    /// URLs to show before the stored list, in order
    #[arg(value_name = "URL")]
    urls: Vec<String>,
}

impl Cli {
    fn log_filter(&self) -> &str {
        if self.trace {
            "trace"
        } else if self.debug {
            "debug"
        } else {
            &self.log_level
        }
    }
}

fn setup_logging(directive: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .with_context(|| format!("invalid log filter '{directive}'"))?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;
    Ok(())
}

/// Puts command-line URLs at the head of the list. URLs already in the list
/// are left where they are so repeated launches do not pile up copies.
fn prepend_urls(store: &mut SettingsStore, urls: &[String]) {
    let mut position = 0;
    for raw in urls {
        let entry = match UrlEntry::parse(raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Ignoring command-line URL '{}': {}", raw, e);
                continue;
            }
        };
        if store.urls().position(&entry).is_some() {
            info!("{} is already in the URL list", entry.display_uri());
            continue;
        }
        store.insert_entry(entry, InsertPosition::At(position));
        position += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Shell(ShellEvent),
    List,
    Add(String),
    Remove(usize),
    CycleTime(u32),
    Help,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let (verb, arg) = match line.split_once(char::is_whitespace) {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (line, ""),
    };
    let command = match (verb, arg) {
        ("n" | "next", "") => Command::Shell(ShellEvent::Next),
        ("p" | "prev" | "previous", "") => Command::Shell(ShellEvent::Previous),
        ("pause", "") => Command::Shell(ShellEvent::TogglePause),
        ("f" | "fullscreen", "") => Command::Shell(ShellEvent::ToggleFullscreen),
        ("q" | "quit", "") => Command::Shell(ShellEvent::Quit),
        ("l" | "list", "") => Command::List,
        ("add", url) if !url.is_empty() => Command::Add(url.to_string()),
        ("rm" | "remove", index) => Command::Remove(index.parse().ok()?),
        ("cycle", seconds) => Command::CycleTime(seconds.parse().ok()?),
        ("h" | "help" | "?", "") => Command::Help,
        _ => return None,
    };
    Some(command)
}

fn run_command(kiosk: &mut Kiosk, command: Command) {
    match command {
        Command::Shell(event) => kiosk.dispatch(event),
        Command::List => {
            for (index, entry) in kiosk.urls().iter().enumerate() {
                let marker = if kiosk.current_index() == Some(index) { '>' } else { ' ' };
                println!("{marker} {index:>3}  {}", entry.display_uri());
            }
        }
        Command::Add(url) => {
            if let Ok(index) = kiosk.insert_url(&url, InsertPosition::End) {
                println!("added at {index}");
            }
        }
        Command::Remove(index) => {
            if let Ok(entry) = kiosk.remove_url(index) {
                println!("removed {}", entry.display_uri());
            }
        }
        Command::CycleTime(seconds) => {
            if let Err(e) = kiosk.set_cycle_time(seconds) {
                warn!("{}", e);
            }
        }
        Command::Help => println!(
            "commands: next|n, prev|p, pause, fullscreen|f, list|l, add URL, rm INDEX, cycle SECONDS, quit|q"
        ),
    }
}

async fn run_headless(store: SettingsStore) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<ShellEvent>();
    let mut kiosk = Kiosk::new(
        store,
        Box::new(LogDisplay::new()),
        Arc::new(move |handle| {
            let _ = tx.send(ShellEvent::CycleTick(handle));
        }),
    );
    kiosk.add_listener(EventKind::StatusChanged, |event| {
        if let KioskEvent::StatusChanged(status) = event {
            debug!("Status: {}", status);
        }
    });
    kiosk.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            Some(event) = rx.recv() => kiosk.dispatch(event),
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match parse_command(&line) {
                    Some(command) => run_command(&mut kiosk, command),
                    None => println!("unknown command '{}', try 'help'", line.trim()),
                },
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!("Stopped reading commands: {}", e);
                    stdin_open = false;
                }
            },
            _ = signal::ctrl_c() => {
                info!("Received SIGINT, shutting down gracefully");
                break;
            }
        }
        if kiosk.quit_requested() {
            break;
        }
    }

    kiosk.shutdown()?;
    Ok(())
}

#[cfg(feature = "windowed")]
fn run(runtime: &Runtime, store: SettingsStore, headless: bool) -> anyhow::Result<()> {
    if headless {
        return runtime.block_on(run_headless(store));
    }
    let _guard = runtime.enter();
    eagle_eye::platform::run_windowed(store, Box::new(LogDisplay::new()))?;
    Ok(())
}

#[cfg(not(feature = "windowed"))]
fn run(runtime: &Runtime, store: SettingsStore, headless: bool) -> anyhow::Result<()> {
    if !headless {
        warn!("Built without window support; running headless");
    }
    runtime.block_on(run_headless(store))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_filter())?;

    info!("Starting {} {}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let config_dir = match cli.config_dir.clone() {
        Some(dir) => dir,
        None => ConfigPaths::default_dir()?,
    };
    let mut store = SettingsStore::open(&config_dir).inspect_err(|e| error!("{}", e))?;
    if let Some(geometry) = cli.geometry {
        store.override_geometry(geometry);
    }
    prepend_urls(&mut store, &cli.urls);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("eagle-eye-timer")
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    run(&runtime, store, cli.headless)
}

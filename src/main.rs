use anyhow::{Context, Result};
use auto_typer::global_hotkey::parse_hotkey;
use auto_typer::job::{load_text, start_delay};
use auto_typer::{CancellationFlag, Config, TyperError, Typist, TypingJob};
use clap::{ArgGroup, Parser};
use colored::Colorize;
use std::future::Future;
use std::io;
use std::process;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "autotyper",
    version,
    about = "Simulates human-like typing of text",
    after_help = "Examples:\n  autotyper -t \"Hello world\" -d 3\n  autotyper -f notes.txt -k ctrl+shift+t --use-enter"
)]
#[command(group(ArgGroup::new("input").required(true).args(["text", "file"])))]
#[command(group(ArgGroup::new("trigger").required(true).args(["delay", "hotkey"])))]
struct Cli {
    /// Text to type
    #[arg(short, long)]
    text: Option<String>,

    /// File containing text to type
    #[arg(short, long)]
    file: Option<String>,

    /// Delay in seconds before typing starts
    #[arg(short, long, allow_negative_numbers = true)]
    delay: Option<f64>,

    /// Hotkey to trigger typing (e.g. "ctrl+shift+t")
    #[arg(short = 'k', long)]
    hotkey: Option<String>,

    /// Minimum delay between keystrokes in seconds [default: 0.02]
    #[arg(long, allow_negative_numbers = true)]
    min_delay: Option<f64>,

    /// Maximum delay between keystrokes in seconds [default: 0.05]
    #[arg(long, allow_negative_numbers = true)]
    max_delay: Option<f64>,

    /// Use Enter for newlines instead of Alt+Enter
    #[arg(long)]
    use_enter: bool,

    /// Key that ends hotkey mode [default: escape]
    #[arg(long)]
    cancel_key: Option<String>,

    /// Load typing settings from a JSON file
    #[arg(short, long)]
    config: Option<String>,

    /// Write the effective settings to a JSON file
    #[arg(long)]
    save_config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

enum Trigger {
    Delay(Duration),
    Hotkey { hotkey: String, cancel_key: String },
}

impl Cli {
    fn settings(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(min) = self.min_delay {
            config.min_delay = min;
        }
        if let Some(max) = self.max_delay {
            config.max_delay = max;
        }
        if self.use_enter {
            config.use_alt_enter = false;
        }
        if let Some(key) = &self.cancel_key {
            config.cancel_key = key.clone();
        }
        config.verbose |= self.verbose;

        Ok(config)
    }

    fn payload(&self) -> Result<String> {
        match (&self.text, &self.file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => Ok(load_text(path)?),
            (None, None) => unreachable!("clap requires --text or --file"),
        }
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "auto_typer=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            report_failure(&e);
            1
        }
    };

    process::exit(code);
}

/// Input and settings problems are shown as a one-line usage error; anything
/// that failed while typing is logged as well.
fn report_failure(e: &anyhow::Error) {
    match e.downcast_ref::<TyperError>() {
        Some(err) if err.is_validation() => {
            println!("{} {err}", "Error:".red().bold());
            println!("{}", "Run with --help for usage.".dimmed());
        }
        _ => {
            error!("{e:#}");
            println!("{} {e:#}", "Error:".red().bold());
            println!("{}", "Typing aborted.".yellow());
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.settings()?;
    init_logging(config.verbose);
    debug!(?config, "effective settings");

    let text = cli.payload()?;
    let job = TypingJob::new(text, config.min_delay, config.max_delay, config.use_alt_enter)?;
    config.validate()?;

    if let Some(path) = &cli.save_config {
        config.save_to_file(path)?;
        println!("💾 Settings saved to {}", path.bold());
    }

    let trigger = match (cli.delay, cli.hotkey) {
        (Some(seconds), _) => Trigger::Delay(start_delay(seconds)?),
        (None, Some(hotkey)) => {
            parse_hotkey(&hotkey)?;
            parse_hotkey(&config.cancel_key)?;
            Trigger::Hotkey {
                hotkey,
                cancel_key: config.cancel_key.clone(),
            }
        }
        (None, None) => unreachable!("clap requires --delay or --hotkey"),
    };

    info!(
        chars = job.text().chars().count(),
        alt_enter = job.use_alt_enter(),
        "typing job ready"
    );

    let mut typist = Typist::with_enigo(job);
    let cancel = typist.cancellation_flag();

    let work = tokio::task::spawn_blocking(move || match trigger {
        Trigger::Delay(delay) => typist.start_after_delay(delay).map(drop),
        Trigger::Hotkey { hotkey, cancel_key } => {
            typist.start_on_hotkey(&hotkey, &cancel_key).map(drop)
        }
    });

    race_interrupt(work, tokio::signal::ctrl_c(), &cancel).await
}

/// Waits for the typing task unless `interrupt` fires first. If the interrupt
/// source itself fails, typing continues without it.
async fn race_interrupt<F>(
    mut work: JoinHandle<auto_typer::Result<()>>,
    interrupt: F,
    cancel: &CancellationFlag,
) -> Result<()>
where
    F: Future<Output = io::Result<()>>,
{
    tokio::select! {
        result = &mut work => {
            result.context("typing task aborted")??;
        }
        signal = interrupt => match signal {
            Ok(()) => {
                cancel.cancel();
                println!("\n{}", "Operation cancelled by user".yellow());
            }
            Err(e) => {
                warn!("cannot listen for Ctrl+C, running without interrupt handling: {e}");
                work.await.context("typing task aborted")??;
            }
        },
    }

    Ok(())
}

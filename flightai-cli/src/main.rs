// flightai-cli/src/main.rs
mod images;
mod models;

use anyhow::{Context, Result, anyhow};
use colored::*;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};

use flightai_core::{FlightAiConfig, Orchestrator, Transcript, audio};

use crate::images::{default_image_dir, save_image};
use crate::models::cli::Cli;

use clap::Parser;
use tracing::{Level, debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, time::LocalTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const CONFIG_FILENAME: &str = "FlightAI.toml";
const LOG_FILE_NAME: &str = "flightai.log";
const GREETING: &str = "Hello! How can I help you today?";

/// Nearest `FlightAI.toml` in `start` or any of its parents.
fn find_config_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|path| path.is_file())
}

fn load_cli_config(explicit: Option<&Path>) -> Result<FlightAiConfig> {
    let config_path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let current_dir = env::current_dir().context("Failed to get current directory")?;
            find_config_file(&current_dir)
        }
    };
    let Some(config_path) = config_path else {
        info!("No {} found, using built-in defaults.", CONFIG_FILENAME);
        return Ok(FlightAiConfig::default());
    };

    info!("Found configuration file at: {:?}", config_path);
    let config_toml_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
    FlightAiConfig::from_toml_str(&config_toml_content)
        .context("Failed to parse or validate configuration content")
}

/// The first few characters of the key, enough to tell keys apart in logs.
fn key_prefix(api_key: &str) -> String {
    api_key.chars().take(8).collect()
}

fn print_welcome_message() {
    println!("\n{}", "FlightAI - Airline Assistant".cyan().bold());
    println!(
        "{}\n{}",
        "Type 'exit', 'quit', Ctrl-D, or press Enter on an empty line to quit.".dimmed(),
        "Type 'clear' to start a fresh conversation.".dimmed()
    );
    println!("\n{} {}\n", "FlightAI:".cyan().bold(), GREETING);
}

/// One conversation plus where its images go.
struct Session {
    orchestrator: Orchestrator,
    transcript: Transcript,
    image_dir: PathBuf,
}

impl Session {
    /// Runs one turn and prints the reply. Returns the reply text.
    async fn send(&mut self, user_text: &str) -> Result<String> {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")?
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "-"]),
        );
        pb.set_message("Checking with FlightAI...");
        pb.enable_steady_tick(Duration::from_millis(100));

        let transcript = std::mem::take(&mut self.transcript);
        let outcome = self
            .orchestrator
            .handle_user_message(transcript, user_text)
            .await;

        pb.finish_and_clear();

        let reply = outcome.reply().to_string();
        self.transcript = outcome.transcript;

        if let Some(image) = outcome.image {
            match save_image(&self.image_dir, &image) {
                Ok(path) => println!("{} {}", "Image:".cyan(), path.display()),
                Err(e) => {
                    error!("Failed to save generated image: {:#}", e);
                    eprintln!("{}", "Error: Failed to save the generated image.".red());
                }
            }
        }
        Ok(reply)
    }

    fn clear(&mut self) {
        self.transcript.clear();
        info!("Cleared conversation.");
    }
}

/// Runs a single turn (non-interactive).
async fn run_single_turn(mut session: Session, user_text: String) -> Result<()> {
    info!(message = %user_text, "Running non-interactive turn.");
    let reply = session.send(&user_text).await?;
    println!("{}", reply);
    Ok(())
}

/// Runs an interactive chat session using rustyline for a REPL experience.
async fn run_interactive(mut session: Session) -> Result<()> {
    print_welcome_message();

    let rl_config = Config::builder()
        .history_ignore_space(true)
        .edit_mode(rustyline::EditMode::Emacs)
        .auto_add_history(true)
        .build();
    let mut rl = DefaultEditor::with_config(rl_config)?;

    let history_dir = dirs::cache_dir()
        .map(|d| d.join("flightai"))
        .ok_or_else(|| anyhow!("Could not determine cache directory for history file"))?;
    fs::create_dir_all(&history_dir).context("Failed to create history directory")?;
    let history_file_path = history_dir.join("cli_history.txt");

    if rl.load_history(&history_file_path).is_err() {
        debug!(path = %history_file_path.display(), "No previous CLI history found or error loading.");
    }

    let prompt = format!("{} ", ">".green().bold());

    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed_input = line.trim();
                let command = trimmed_input.to_lowercase();

                if trimmed_input.is_empty() || command == "exit" || command == "quit" {
                    info!("Exit command or empty line entered, exiting interactive mode.");
                    break;
                }

                if command == "clear" {
                    session.clear();
                    println!("\n{}", "Starting a new conversation...".cyan());
                    println!("\n{} {}\n", "FlightAI:".cyan().bold(), GREETING);
                    continue;
                }

                let reply = session.send(trimmed_input).await?;
                println!("\n{} {}\n", "FlightAI:".cyan().bold(), reply);
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => {
                info!("EOF detected, exiting interactive mode.");
                break;
            }
            Err(err) => {
                error!("Readline error: {:?}", err);
                eprintln!("Error reading input: {}", err.to_string().red());
                break;
            }
        }
    }

    if let Err(e) = rl.save_history(&history_file_path) {
        warn!(path = %history_file_path.display(), error = %e, "Failed to save CLI history.");
    } else {
        debug!(path = %history_file_path.display(), "Saved CLI history.");
    }

    println!("\n{}\n", "Safe travels!".cyan());
    Ok(())
}

/// Installs the stderr and file log layers. The returned guard flushes the
/// file writer and must live until exit.
fn init_logging(verbose: u8) -> Result<WorkerGuard> {
    let default_level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default_level.into()));

    let log_dir = dirs::cache_dir()
        .or_else(dirs::runtime_dir)
        .unwrap_or_else(env::temp_dir)
        .join("flightai");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE_NAME);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let local_timer = LocalTime::new(time::macros::format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ));

    let file_layer = fmt::layer()
        .with_writer(non_blocking_writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .with_timer(local_timer.clone());

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_timer(local_timer)
        .with_target(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    info!(
        "Logging initialized. Level determined by RUST_LOG or -v flags (default: {}). Logging to stderr and {}",
        default_level,
        log_dir.join(LOG_FILE_NAME).display()
    );
    Ok(guard)
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = load_cli_config(cli.config.as_deref())?;
    if cli.no_images {
        config.image.enabled = false;
    }
    if cli.no_voice {
        config.speech.enabled = false;
    }
    if config.speech.enabled && !cfg!(feature = "audio") {
        warn!("Built without the `audio` feature; replies will not be spoken.");
        config.speech.enabled = false;
    }

    let api_key = config.resolve_api_key()?;
    info!(key_prefix = %key_prefix(&api_key), "API key exists.");

    let image_dir = match cli.image_dir {
        Some(dir) => dir,
        None => default_image_dir()?,
    };
    debug!(image_dir = %image_dir.display(), "Resolved image directory.");

    let orchestrator = Orchestrator::from_config(&config, api_key, audio::default_player())?;
    let session = Session {
        orchestrator,
        transcript: Transcript::new(),
        image_dir,
    };

    match cli.turn {
        Some(user_text) => run_single_turn(session, user_text).await,
        None => run_interactive(session).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    colored::control::set_override(true);

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let _guard = match init_logging(cli.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };
    colored::control::unset_override();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("FlightAI exited with an error: {:#}", e);
            eprintln!("{} {:#}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_find_config_file_walks_up_parents() {
        let root = tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.path().join(CONFIG_FILENAME), "").unwrap();

        assert_eq!(
            find_config_file(&nested),
            Some(root.path().join(CONFIG_FILENAME))
        );
    }

    #[test]
    fn test_find_config_file_prefers_nearest() {
        let root = tempdir().unwrap();
        let nested = root.path().join("inner");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.path().join(CONFIG_FILENAME), "").unwrap();
        fs::write(nested.join(CONFIG_FILENAME), "").unwrap();

        assert_eq!(find_config_file(&nested), Some(nested.join(CONFIG_FILENAME)));
    }

    #[test]
    fn test_load_cli_config_from_explicit_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[prices]\nrome = \"$650\"\n").unwrap();

        let config = load_cli_config(Some(&path)).unwrap();
        assert_eq!(config.catalog().lookup("Rome"), "$650");
    }

    #[test]
    fn test_key_prefix() {
        assert_eq!(key_prefix("sk-proj-abcdefgh"), "sk-proj-");
        assert_eq!(key_prefix("short"), "short");
    }
}

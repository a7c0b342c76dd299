use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// FlightAI: ask about ticket prices for FlightAI destinations.
/// Starts an interactive session by default, or answers a single message with --turn.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase message verbosity.
    ///
    /// Specify multiple times for more verbose output:
    ///  -v:  INFO level
    ///  -vv: DEBUG level
    ///  -vvv: TRACE level (most verbose)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Send a single message, print the reply and exit.
    #[arg(short, long)]
    pub turn: Option<String>,

    /// Path to a FlightAI.toml. Defaults to the nearest one in the current
    /// directory or its parents.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Don't read replies aloud.
    #[arg(long)]
    pub no_voice: bool,

    /// Don't generate destination images.
    #[arg(long)]
    pub no_images: bool,

    /// Where generated images are written.
    #[arg(long, value_name = "DIR")]
    pub image_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["flightai"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(cli.turn.is_none());
        assert!(!cli.no_voice);
        assert!(!cli.no_images);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "flightai",
            "-vv",
            "--turn",
            "How much to Paris?",
            "--no-voice",
            "--image-dir",
            "/tmp/pics",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.turn.as_deref(), Some("How much to Paris?"));
        assert!(cli.no_voice);
        assert!(!cli.no_images);
        assert_eq!(cli.image_dir, Some(PathBuf::from("/tmp/pics")));
    }
}

//! CLI argument definitions for factdesk.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// factdesk -- a knowledge-grounded question/answer widget.
#[derive(Parser)]
#[command(
    name = "factdesk",
    version,
    about = "factdesk -- answer visitor questions from a fixed list of facts",
    long_about = "Serves a small question/answer widget whose answers come from an AI \
                  completion service instructed to use only the facts in your \
                  configuration file."
)]
pub struct Cli {
    /// Configuration file (TOML, or JSON with a `.json` extension).
    /// Falls back to `FACTDESK_CONFIG`, then `./factdesk.toml`.
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server with the widget page.
    Serve {
        /// Address to bind the HTTP server to (overrides `server.bind`).
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on (overrides `server.port`).
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Ask one question in the terminal and print the answer.
    Ask {
        /// The question to ask.
        question: String,
    },

    /// Validate the configuration, API key and host page.
    Check,

    /// Print the prompt that would be sent for a question.
    Prompt {
        /// The question to build the prompt for.
        question: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve_with_overrides() {
        let cli = Cli::try_parse_from(["factdesk", "serve", "--port", "8080", "-c", "site.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("site.toml")));
        match cli.command {
            Commands::Serve { bind, port } => {
                assert!(bind.is_none());
                assert_eq!(port, Some(8080));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn parse_ask() {
        let cli = Cli::try_parse_from(["factdesk", "ask", "What are your hours?"]).unwrap();
        assert!(cli.config.is_none());
        assert!(matches!(cli.command, Commands::Ask { question } if question == "What are your hours?"));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["factdesk"]).is_err());
    }
}

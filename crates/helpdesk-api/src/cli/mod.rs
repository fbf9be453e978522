//! CLI command definitions for the `helpdesk` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod session;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Helpdesk agent: per-session chat with tools and memory.
#[derive(Parser)]
#[command(name = "helpdesk", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Port to listen on (defaults to `server.port` from config.toml).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to `server.host` from config.toml).
        #[arg(long)]
        host: Option<String>,
    },

    /// Send one message to a session and print the reply.
    Chat {
        /// Session key.
        #[arg(short, long)]
        session: String,

        /// Model to use for this exchange only.
        #[arg(short, long)]
        model: Option<String>,

        /// Print the reply as stream frames instead of a single result.
        #[arg(long)]
        stream: bool,

        /// The message to send.
        message: String,
    },

    /// Show a session's stored turns.
    History {
        /// Session key.
        #[arg(short, long)]
        session: String,
    },

    /// Show a session's stored memory.
    Memory {
        /// Session key.
        #[arg(short, long)]
        session: String,
    },

    /// Erase a session's history and memory.
    Reset {
        /// Session key.
        #[arg(short, long)]
        session: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_chat() {
        let cli = Cli::parse_from([
            "helpdesk", "chat", "--session", "s1", "--model", "llama3", "--stream", "hello",
        ]);
        match cli.command {
            Commands::Chat {
                session,
                model,
                stream,
                message,
            } => {
                assert_eq!(session, "s1");
                assert_eq!(model.as_deref(), Some("llama3"));
                assert!(stream);
                assert_eq!(message, "hello");
            }
            _ => panic!("expected chat command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["helpdesk", "serve", "-vv", "--otel"]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.otel);
        assert!(matches!(cli.command, Commands::Serve { port: None, host: None }));
    }
}

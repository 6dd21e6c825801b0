//! CLI module: command parsing and dispatch
//!
//! All CLI logic lives here. `main.rs` calls `cli::run()`.

pub mod common;
pub mod generate;
pub mod providers;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

use housemind::providers::ProviderKind;

#[derive(Parser)]
#[command(name = "housemind")]
#[command(version)]
#[command(about = "AI provider core for The House of AI", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.housemind/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Use this provider instead of auto-selection
    #[arg(long, global = true, value_name = "KIND")]
    provider: Option<ProviderKind>,
    /// Override the provider's model
    #[arg(long, global = true, value_name = "MODEL")]
    model: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every registered provider and whether it is available
    Providers,
    /// Exercise all five operations against one provider, without fallback
    Probe {
        /// Provider kind (openai, anthropic, groq, openrouter, rule_based)
        kind: ProviderKind,
    },
    /// Generate a welcome message
    Welcome,
    /// Analyse a user action
    Respond {
        /// Action name (explore_room, meditate, interact_object, ...)
        action: String,
        /// Room the action happened in
        #[arg(long)]
        room: Option<String>,
    },
    /// Generate a hotel room
    Room {
        /// Zero-based room index
        #[arg(long, default_value_t = 0)]
        index: u32,
        /// Room schema JSON file (overrides config)
        #[arg(long, value_name = "PATH")]
        schema: Option<PathBuf>,
        /// Serve from a pre-filled room cache
        #[arg(long)]
        cached: bool,
    },
    /// Generate a consciousness stream passage
    Stream {
        /// Prompt context, e.g. what the visitor is looking at
        context: String,
        /// Room document as JSON
        #[arg(long, value_name = "JSON")]
        room_data: Option<String>,
    },
    /// Generate a hotel-network refresh notice
    Refresh,
}

/// Options shared by every command.
pub(crate) struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
}

pub async fn run() -> Result<()> {
    // A .env file is optional; real environment variables win.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let globals = GlobalArgs {
        config: cli.config,
        provider: cli.provider,
        model: cli.model,
    };

    let config = common::load_config(globals.config.as_deref())?;
    if let Err(e) = housemind::utils::logging::init_logging(&config.logging) {
        eprintln!("Warning: logging not initialized: {}", e);
    }

    match cli.command {
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            println!();
        }
        Some(Commands::Providers) => {
            providers::cmd_providers(&config)?;
        }
        Some(Commands::Probe { kind }) => {
            providers::cmd_probe(&config, kind, globals.model.as_deref()).await?;
        }
        Some(Commands::Welcome) => {
            generate::cmd_welcome(config, &globals).await?;
        }
        Some(Commands::Respond { action, room }) => {
            generate::cmd_respond(config, &globals, &action, room.as_deref()).await?;
        }
        Some(Commands::Room {
            index,
            schema,
            cached,
        }) => {
            generate::cmd_room(config, &globals, index, schema, cached).await?;
        }
        Some(Commands::Stream { context, room_data }) => {
            generate::cmd_stream(config, &globals, &context, room_data.as_deref()).await?;
        }
        Some(Commands::Refresh) => {
            generate::cmd_refresh(config, &globals).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_provider() {
        let cli = Cli::try_parse_from(["housemind", "--provider", "GROQ", "welcome"]).unwrap();
        assert_eq!(cli.provider, Some(ProviderKind::Groq));
        assert!(matches!(cli.command, Some(Commands::Welcome)));
    }

    #[test]
    fn test_parse_respond_with_room() {
        let cli =
            Cli::try_parse_from(["housemind", "respond", "meditate", "--room", "library"]).unwrap();
        match cli.command {
            Some(Commands::Respond { action, room }) => {
                assert_eq!(action, "meditate");
                assert_eq!(room.as_deref(), Some("library"));
            }
            _ => panic!("expected respond"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_provider() {
        assert!(Cli::try_parse_from(["housemind", "probe", "gemini"]).is_err());
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap
//!
//! Defines all command-line arguments and subcommands for the copilot.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// AI Copilot - conversational assistant for notes, reminders and quick searches
#[derive(Parser, Debug)]
#[command(name = "copilot")]
#[command(version, about = "Conversational assistant for notes, reminders and quick searches")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file path (defaults to ~/.copilot/settings.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Model to use (overrides MODEL_NAME and settings)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start interactive chat session (default when no command given)
    Chat(ChatArgs),

    /// Run a single turn through the full pipeline (non-interactive)
    Ask(AskArgs),

    /// List models available from the provider
    Models,
}

/// Arguments for the chat subcommand
#[derive(clap::Args, Debug, Default)]
pub struct ChatArgs {
    /// Turns allowed before the session resets
    #[arg(long)]
    pub max_turns: Option<u32>,

    /// User/assistant pairs kept as context
    #[arg(long)]
    pub context_window: Option<usize>,
}

/// Arguments for the ask subcommand
#[derive(clap::Args, Debug)]
pub struct AskArgs {
    /// The prompt to send
    #[arg(required = true)]
    pub prompt: Vec<String>,
}

impl AskArgs {
    /// Words of the prompt joined back into one line
    pub fn text(&self) -> String {
        self.prompt.join(" ")
    }
}

/// Output format
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Text,

    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_default_no_command() {
        let cli = Cli::parse_from(["copilot"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.model.is_none());
    }

    #[test]
    fn test_cli_verbose_multiple() {
        let cli = Cli::parse_from(["copilot", "-vvv"]);
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn test_cli_config_path() {
        let cli = Cli::parse_from(["copilot", "--config", "/tmp/settings.json"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/settings.json")));
    }

    #[test]
    fn test_cli_model_flag_is_global() {
        let cli = Cli::parse_from(["copilot", "ask", "hola", "--model", "llama-3.1-8b-instant"]);
        assert_eq!(cli.model.as_deref(), Some("llama-3.1-8b-instant"));
    }

    #[test]
    fn test_chat_args() {
        let cli = Cli::parse_from(["copilot", "chat", "--max-turns", "5", "--context-window", "2"]);
        match cli.command {
            Some(Commands::Chat(args)) => {
                assert_eq!(args.max_turns, Some(5));
                assert_eq!(args.context_window, Some(2));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_ask_joins_words() {
        let cli = Cli::parse_from(["copilot", "ask", "/nota", "estudio", "biología"]);
        match cli.command {
            Some(Commands::Ask(args)) => assert_eq!(args.text(), "/nota estudio biología"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_ask_requires_prompt() {
        assert!(Cli::try_parse_from(["copilot", "ask"]).is_err());
    }

    #[test]
    fn test_models_command_and_json_format() {
        let cli = Cli::parse_from(["copilot", "--format", "json", "models"]);
        assert!(matches!(cli.command, Some(Commands::Models)));
        assert_eq!(cli.format, OutputFormat::Json);
    }
}

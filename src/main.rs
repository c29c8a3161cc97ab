// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! AI Copilot - conversational assistant for your terminal
//!
//! Entry point for the copilot CLI application.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    style::{Color, ResetColor, SetForegroundColor},
    ExecutableCommand,
};

use ai_copilot::chat::{ChatEngine, Session};
use ai_copilot::cli::{AskArgs, ChatArgs, Cli, Commands, OutputFormat};
use ai_copilot::config::Settings;
use ai_copilot::llm::factory::ProviderFactory;
use ai_copilot::llm::metrics::MetricsSummary;
use ai_copilot::llm::GenerationGateway;

const WELCOME: &str = "\
👋 Bienvenido a AI Copilot

Funciones disponibles:
- /nota <texto> para crear una nota.
- /recordatorio <texto> para crear un recordatorio.
- /agenda para ver tu agenda.
- /vernota <texto> para ver una nota específica.
- /busqueda <texto> para búsqueda rápida.

Escribe 'salir' para terminar.";

const EXIT_WORDS: &[&str] = &["salir", "exit", "quit"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    // `-v` turns on routing decisions, `-vv` gateway attempts too
    let directives: &[&str] = match cli.verbose {
        0 => &[],
        1 => &["ai_copilot::chat=debug"],
        _ => &["ai_copilot=debug"],
    };
    for directive in directives {
        if let Ok(parsed) = directive.parse() {
            env_filter = env_filter.add_directive(parsed);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::load().context("failed to load settings")?,
    };

    match cli.command {
        None => run_chat(ChatArgs::default(), settings, cli.model.as_deref()).await?,
        Some(Commands::Chat(args)) => run_chat(args, settings, cli.model.as_deref()).await?,
        Some(Commands::Ask(args)) => {
            run_ask(args, settings, cli.model.as_deref(), cli.format).await?
        }
        Some(Commands::Models) => run_models(settings, cli.format).await?,
    }

    Ok(())
}

/// Build the gateway, letting `--model` win over `MODEL_NAME`
fn build_gateway(settings: &Settings, model: Option<&str>) -> anyhow::Result<GenerationGateway> {
    let gateway = GenerationGateway::from_settings(settings)
        .context("could not initialise the generation gateway")?;
    Ok(match model {
        Some(model) => gateway.with_model(model),
        None => gateway,
    })
}

/// Run interactive chat mode
async fn run_chat(args: ChatArgs, mut settings: Settings, model: Option<&str>) -> anyhow::Result<()> {
    if let Some(max_turns) = args.max_turns {
        settings.conversation.max_turns = max_turns;
    }
    if let Some(window) = args.context_window {
        settings.conversation.context_window = window;
    }
    settings.validate()?;

    let gateway = Arc::new(build_gateway(&settings, model)?);
    let engine = ChatEngine::new(Arc::clone(&gateway));
    let mut session = Session::from_config(&settings.conversation);

    print_welcome(gateway.model())?;

    loop {
        let input = match read_user_input()? {
            Some(input) => input,
            None => break,
        };
        if input.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&input.to_lowercase().as_str()) {
            println!("Saliendo...");
            break;
        }

        let reply = engine.handle_turn(&mut session, &input).await;
        print_reply(&reply)?;
    }

    print_metrics(&engine.metrics())?;
    Ok(())
}

/// Run one turn through the full pipeline and print the reply
async fn run_ask(
    args: AskArgs,
    settings: Settings,
    model: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    settings.validate()?;
    let gateway = Arc::new(build_gateway(&settings, model)?);
    let engine = ChatEngine::new(gateway);
    let mut session = Session::from_config(&settings.conversation);

    let reply = engine.handle_turn(&mut session, &args.text()).await;

    match format {
        OutputFormat::Text => println!("{}", reply),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "reply": reply,
                "metrics": engine.metrics(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

/// List the models the provider exposes
async fn run_models(settings: Settings, format: OutputFormat) -> anyhow::Result<()> {
    let provider = ProviderFactory::create_groq(&settings)?;
    let models = provider
        .list_models()
        .await
        .context("could not list models")?;

    match format {
        OutputFormat::Text => {
            println!("Modelos disponibles:");
            for model in &models {
                println!("- {}", model);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&models)?),
    }
    Ok(())
}

fn print_welcome(model: &str) -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::Cyan))?;
    println!("AI Copilot v{}", env!("CARGO_PKG_VERSION"));
    stdout.execute(ResetColor)?;
    println!("Modelo: {}", model);
    println!();
    println!("{}", WELCOME);
    println!();
    Ok(())
}

/// Read one line; `None` on end of input
fn read_user_input() -> anyhow::Result<Option<String>> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::Green))?;
    print!("Tú: ");
    stdout.execute(ResetColor)?;
    stdout.flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn print_reply(reply: &str) -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::Cyan))?;
    print!("\nCopilot: ");
    stdout.execute(ResetColor)?;
    println!("{}\n", reply);
    Ok(())
}

fn print_metrics(metrics: &MetricsSummary) -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::DarkGrey))?;
    println!("Métricas de la sesión: {}", metrics);
    stdout.execute(ResetColor)?;
    Ok(())
}

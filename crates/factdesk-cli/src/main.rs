//! CLI entry point for factdesk.
//!
//! This binary provides the `factdesk` command with subcommands for serving
//! the widget, asking one question from the terminal, validating the setup,
//! and inspecting the prompt.

mod cli;
mod helpers;

use std::io::{IsTerminal, Write};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;

use factdesk_agent::assistant::THINKING_TEXT;
use factdesk_agent::{AnswerView, AssistantController, CycleOutcome, KnowledgeBase, build_prompt};
use factdesk_web::{MountPoint, WebConfig, WebServer, mount_into};

use crate::cli::{Cli, Commands};
use crate::helpers::{completion_for, env_non_empty, init_tracing, load_config};

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Serve { bind, port } => cmd_serve(config, bind, port).await,
        Commands::Ask { question } => cmd_ask(config, &question).await,
        Commands::Check => cmd_check(config),
        Commands::Prompt { question } => cmd_prompt(config, &question),
    }
}

// ---------------------------------------------------------------------------
// Subcommand: serve
// ---------------------------------------------------------------------------

async fn cmd_serve(
    config_path: Option<&std::path::Path>,
    bind: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    init_tracing("info");

    let loaded = load_config(config_path)?;
    let mut settings = loaded.config.server.clone();
    if let Some(bind) = bind {
        settings.bind = bind;
    }
    if let Some(port) = port {
        settings.port = port;
    }

    let completion = completion_for(&loaded.config)?;
    let mut server = WebServer::new(
        WebConfig::from(&settings),
        loaded.config.widget_config(),
        loaded.config.knowledge.clone(),
        completion,
    );

    if let Some(page) = loaded.host_page() {
        let host = std::fs::read_to_string(&page)
            .with_context(|| format!("failed to read host page {}", page.display()))?;
        let mount = MountPoint::from_setting(settings.mount.as_deref());
        server = server
            .with_host_page(&host, &mount)
            .with_context(|| format!("failed to mount widget into {}", page.display()))?;
        info!(page = %page.display(), mount = ?mount, "serving host page");
    }

    println!();
    println!("  factdesk is running at http://{}", server.addr());
    println!();

    server.start().await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: ask
// ---------------------------------------------------------------------------

async fn cmd_ask(config_path: Option<&std::path::Path>, question: &str) -> Result<()> {
    init_tracing("warn");

    let loaded = load_config(config_path)?;
    let completion = completion_for(&loaded.config)?;
    let controller = AssistantController::new(
        loaded.config.widget_config(),
        loaded.config.knowledge,
        completion,
    );

    if controller.is_inert() {
        bail!("{}", controller.display().text());
    }

    let interactive = std::io::stderr().is_terminal();
    let mut display = controller.subscribe();
    let progress = tokio::spawn(async move {
        while display.changed().await.is_ok() {
            let view = display.borrow_and_update().clone();
            if interactive && let AnswerView::Thinking { .. } = view {
                eprint!("\r{:<width$}", view.text(), width = THINKING_TEXT.len() + 3);
                std::io::stderr().flush().ok();
            }
        }
    });

    let outcome = controller.submit(question).await;
    progress.abort();
    if interactive {
        eprint!("\r{:width$}\r", "", width = THINKING_TEXT.len() + 3);
    }

    let text = controller.display().text().into_owned();
    match outcome {
        CycleOutcome::Answered => {
            println!("{text}");
            Ok(())
        }
        _ => bail!("{text}"),
    }
}

// ---------------------------------------------------------------------------
// Subcommand: check
// ---------------------------------------------------------------------------

fn cmd_check(config_path: Option<&std::path::Path>) -> Result<()> {
    init_tracing("warn");

    let loaded = load_config(config_path)?;
    let config = &loaded.config;
    let mut problems = 0usize;

    println!();
    println!("  factdesk Configuration");
    println!("  ======================");
    println!();

    match &loaded.path {
        Some(path) => println!("  Config file:      {}", path.display()),
        None => println!("  Config file:      NONE (using defaults)"),
    }

    match KnowledgeBase::new(config.knowledge.clone()) {
        Ok(kb) => println!("  Knowledge base:   OK ({} facts)", kb.len()),
        Err(_) => {
            problems += 1;
            println!("  Knowledge base:   MISSING (add `knowledge = [...]`)");
        }
    }

    println!(
        "  Provider:         {} ({})",
        config.llm.provider.name(),
        config.llm.effective_model()
    );

    let key_env = config.llm.api_key_env();
    if env_non_empty(key_env).is_some() {
        println!("  API key:          CONFIGURED ({key_env})");
    } else {
        problems += 1;
        println!("  API key:          NOT SET ({key_env})");
    }

    match loaded.host_page() {
        None => println!("  Page:             standalone widget page"),
        Some(page) => {
            let mount = MountPoint::from_setting(config.server.mount.as_deref());
            let widget = config.widget_config();
            let mounted = std::fs::read_to_string(&page)
                .map_err(anyhow::Error::from)
                .and_then(|host| {
                    mount_into(&host, &widget, &AnswerView::Initial(widget.initial_answer_text.clone()), &mount)
                        .map_err(anyhow::Error::from)
                });
            match mounted {
                Ok(_) => println!("  Host page:        OK ({}, {mount:?})", page.display()),
                Err(e) => {
                    problems += 1;
                    println!("  Host page:        ERROR ({}: {e})", page.display());
                }
            }
        }
    }

    println!(
        "  Listen address:   {}:{}",
        config.server.bind, config.server.port
    );
    println!();

    if problems > 0 {
        bail!("configuration has {problems} problem(s)");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: prompt
// ---------------------------------------------------------------------------

fn cmd_prompt(config_path: Option<&std::path::Path>, question: &str) -> Result<()> {
    init_tracing("warn");

    let loaded = load_config(config_path)?;
    let knowledge =
        KnowledgeBase::new(loaded.config.knowledge).context("cannot build a prompt")?;
    println!("{}", build_prompt(&knowledge, question));
    Ok(())
}

mod config;
mod errors;
mod llm_client;
mod persona;
mod reddit;
mod render;
mod state;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, Credentials};
use crate::persona::generator::generate_persona;
use crate::persona::storage::load_persona;
use crate::reddit::extract_username;
use crate::render::{write_pdf_document, PdfConverter};
use crate::state::AppContext;

/// Builds a narrative user persona from a Reddit account's public activity.
#[derive(Debug, Parser)]
#[command(name = "persona", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scrape a Reddit profile, synthesize its persona, save JSON and text.
    Run {
        /// e.g. https://www.reddit.com/user/USERNAME/
        profile_url: String,
    },
    /// Render a previously saved persona to PDF.
    Render { username: String },
}

// Single user, one external call at a time.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Wrong arguments: print usage and do nothing
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print()?;
            return Ok(());
        }
    };

    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting persona v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Run { profile_url } => run(config, &profile_url).await,
        Command::Render { username } => render(config, &username),
    }
}

async fn run(config: Config, profile_url: &str) -> Result<()> {
    let username = extract_username(profile_url)?;
    info!("Username extracted: u/{username}");

    let credentials = Credentials::from_env()?;
    let ctx = AppContext::new(config, &credentials);

    let outcome = generate_persona(&ctx, &username)
        .await
        .with_context(|| format!("Persona generation failed for u/{username}"))?;

    if outcome.persona.is_fallback() {
        warn!("Persona for u/{} is unparsed; `render` will not produce a PDF", outcome.username);
    }
    info!(
        "Done: {} and {}",
        outcome.json_path.display(),
        outcome.text_path.display()
    );
    Ok(())
}

fn render(config: Config, username: &str) -> Result<()> {
    let username = extract_username(username)?;
    let persona = load_persona(&config.data_dir, &username)?;
    let converter = PdfConverter::new(config.wkhtmltopdf_path.clone());

    if let Some(path) = write_pdf_document(&config, &converter, &username, &persona)? {
        info!("PDF ready at {}", path.display());
    }
    Ok(())
}

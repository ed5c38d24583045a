//! gemchat - a minimal chat front end for Google Gemini.
//!
//! Architecture:
//! - The server keeps one session per open chat page: an ordered message log
//!   plus the Gemini chat it is mirrored to
//! - Each turn forwards the user's text to the chat, then appends the text
//!   and the reply (or a warning if the call failed) together
//! - `gemchat chat` drives the same session logic from the terminal

mod cli;
mod config;
mod gemini;
mod logging;
mod models;
mod prompt;
mod server;
mod session;

use anyhow::Result;
use clap::Parser;

use cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up GEMINI_API_KEY and friends from .env, if there is one.
    if let Some(warning) = config::dotenv_warning(&dotenvy::dotenv()) {
        eprintln!("{warning}");
    }

    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);
    execute(cli).await
}

//! CLI command execution.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::config::{ApiKey, Settings};
use crate::gemini::{ChatConfig, GeminiClient};
use crate::prompt::load_system_instruction;
use crate::server::{self, ServerState};
use crate::session::ChatSession;

use super::args::{ChatArgs, Cli, Commands, ServeArgs};
use super::repl;

/// Resolve credentials and the chat configuration.
///
/// The API key is checked first: without it nothing else is loaded and no
/// session can ever be created.
fn resolve_settings<F>(args: &ChatArgs, env: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let api_key = ApiKey::resolve(env)?;
    let system_instruction = load_system_instruction(&args.prompt)?;

    Ok(Settings {
        api_key,
        base_url: args.base_url.clone(),
        request_timeout: Duration::from_secs(args.request_timeout),
        chat: ChatConfig {
            model: args.model.clone(),
            temperature: args.temperature,
            max_output_tokens: args.max_output_tokens,
            ..ChatConfig::new(system_instruction)
        },
    })
}

// === Command Execution ===

pub async fn execute(cli: Cli) -> Result<()> {
    let settings = resolve_settings(&cli.chat, |name| std::env::var(name).ok())?;
    let client = GeminiClient::from_settings(&settings).context("Failed to build HTTP client")?;

    match cli.command {
        Some(Commands::Serve(args)) => serve(settings, client, &args).await,
        None => serve(settings, client, &ServeArgs::default()).await,
        Some(Commands::Chat) => {
            let session = ChatSession::new(Uuid::now_v7(), Arc::new(client), settings.chat);
            repl::run(session).await
        }
    }
}

async fn serve(settings: Settings, client: GeminiClient, args: &ServeArgs) -> Result<()> {
    let state = Arc::new(ServerState::new(Arc::new(client), settings.chat));
    let addr = SocketAddr::new(args.host, args.port);
    server::start_server(state, addr, args.open, args.idle_timeout()).await
}

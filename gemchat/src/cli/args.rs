//! CLI argument definitions.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::gemini::{DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::prompt::DEFAULT_PROMPT_FILE;

const DEFAULT_PORT: u16 = 8501;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 30 * 60;

/// gemchat - a small Gemini chat server
#[derive(Parser, Debug)]
#[command(name = "gemchat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub chat: ChatArgs,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Settings fixed for every chat created by this process.
#[derive(Args, Debug, Clone)]
pub struct ChatArgs {
    /// Model identifier
    #[arg(long, global = true, env = "GEMCHAT_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Sampling temperature
    #[arg(long, global = true, env = "GEMCHAT_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// Maximum tokens per reply
    #[arg(long, global = true, env = "GEMCHAT_MAX_OUTPUT_TOKENS", default_value_t = DEFAULT_MAX_OUTPUT_TOKENS)]
    pub max_output_tokens: u32,

    /// File holding the system instruction
    #[arg(long, global = true, env = "GEMCHAT_PROMPT", default_value = DEFAULT_PROMPT_FILE)]
    pub prompt: PathBuf,

    /// Seconds to wait for a reply before giving up on a turn
    #[arg(long, global = true, env = "GEMCHAT_REQUEST_TIMEOUT", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout: u64,

    /// Gemini API base URL
    #[arg(long, global = true, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL, hide = true)]
    pub base_url: String,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the chat page
    Serve(ServeArgs),

    /// Chat in the terminal
    Chat,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "GEMCHAT_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "GEMCHAT_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,

    /// Seconds a session may sit unused before it is dropped
    #[arg(long, env = "GEMCHAT_IDLE_TIMEOUT", default_value_t = DEFAULT_IDLE_TIMEOUT_SECS)]
    pub idle_timeout: u64,
}

impl ServeArgs {
    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout)
    }
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: DEFAULT_PORT,
            open: false,
            idle_timeout: DEFAULT_IDLE_TIMEOUT_SECS,
        }
    }
}

//! Terminal chat loop.

use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::models::{Message, MessageRole};
use crate::session::{ChatSession, RESET_NOTICE};

/// One line of terminal input.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplCommand<'a> {
    /// Send the text as a turn.
    Say(&'a str),
    /// Start the conversation over.
    Reset,
    /// Print the system instruction.
    ShowPrompt,
    /// Reprint the conversation so far.
    History,
    Help,
    Quit,
    /// Blank line.
    Nothing,
}

impl<'a> ReplCommand<'a> {
    pub fn parse(line: &'a str) -> Self {
        match line.trim() {
            "" => Self::Nothing,
            "/reset" => Self::Reset,
            "/prompt" => Self::ShowPrompt,
            "/history" => Self::History,
            "/help" => Self::Help,
            "/quit" | "/exit" => Self::Quit,
            _ => Self::Say(line),
        }
    }
}

const HELP: &str = "Commands: /reset  /prompt  /history  /help  /quit";

fn label(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "you",
        MessageRole::Assistant => "gemini",
    }
}

/// `[HH:MM:SS] role: text`, with the time in the local zone.
fn history_line(msg: &Message) -> String {
    let at = msg.created_at.with_timezone(&chrono::Local);
    format!("[{}] {}: {}", at.format("%H:%M:%S"), label(msg.role), msg.content)
}

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush().context("Failed to flush stdout")
}

/// Run a chat on stdin/stdout until EOF or `/quit`.
pub async fn run(mut session: ChatSession) -> Result<()> {
    tracing::debug!(session = %session.id(), "terminal chat started");
    println!("System instruction: {}", session.config().system_instruction);
    println!("{HELP}");
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match ReplCommand::parse(&line) {
            ReplCommand::Nothing => {}
            ReplCommand::Quit => break,
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::ShowPrompt => println!("{}", session.config().system_instruction),
            ReplCommand::Reset => {
                session.reset();
                println!("{RESET_NOTICE}");
            }
            ReplCommand::History => {
                for msg in session.messages() {
                    println!("{}", history_line(msg));
                }
            }
            ReplCommand::Say(text) => {
                let appended = session.handle_turn(text).await?;
                if let Some(reply) = appended.last() {
                    println!("{}: {}\n", label(reply.role), reply.content);
                }
            }
        }
        prompt()?;
    }

    println!();
    Ok(())
}

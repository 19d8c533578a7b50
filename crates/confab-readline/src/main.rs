use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::time::timeout;
use tracing_subscriber::EnvFilter;

use confab_core::conversation::Conversation;
use confab_core::message::{Message, MessageRole};
use confab_core::{ChatError, ConversationController, RemoteAssistant};
use confab_infrastructure::JsonFileStore;
use confab_interaction::GeminiAssistant;

/// How long a single remote call may take before it is reported as failed.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: vec![
                "/new".to_string(),
                "/chats".to_string(),
                "/switch".to_string(),
                "/delete".to_string(),
            ],
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

fn print_message(message: &Message) {
    match message.role {
        MessageRole::User => {
            println!("{}", format!("> {}", message.content).green());
        }
        MessageRole::Assistant => {
            for line in message.content.lines() {
                println!("{}", line.bright_blue());
            }
        }
    }
}

fn print_transcript(conversation: &Conversation) {
    println!("{}", format!("--- {} ---", conversation.title).bright_magenta());
    for message in &conversation.messages {
        print_message(message);
    }
}

fn print_chat_list(controller: &ConversationController) {
    let conversations = controller.list_conversations();
    if conversations.is_empty() {
        println!("{}", "No saved conversations yet.".bright_black());
        return;
    }
    for (index, conversation) in conversations.iter().enumerate() {
        let marker = if conversation.id == controller.active().id {
            "*"
        } else {
            " "
        };
        println!(
            "{}",
            format!(
                "{marker} {:2}. {}  ({})",
                index + 1,
                conversation.title,
                conversation.updated_at.format("%Y-%m-%d %H:%M")
            )
            .bright_black()
        );
    }
}

/// Resolves a 1-based index from `/chats` into a conversation id.
fn resolve_conversation_id(controller: &ConversationController, arg: &str) -> Option<String> {
    let index: usize = arg.trim().parse().ok()?;
    controller
        .list_conversations()
        .get(index.checked_sub(1)?)
        .map(|c| c.id.clone())
}

/// The main entry point for the Confab REPL.
///
/// Sets up a rustyline-based REPL that:
/// 1. Restores conversation history and the active conversation from disk
/// 2. Provides command completion for /new, /chats, /switch, and /delete
/// 3. Sends user turns to the remote assistant with a request timeout
/// 4. Displays colored output for user, AI, and system messages
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let store = Arc::new(JsonFileStore::default_location()?);
    let mut controller = ConversationController::new(store);
    let assistant = GeminiAssistant::try_from_env()?;

    let helper = CliHelper::new();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(helper));

    println!("{}", "=== Confab ===".bright_magenta().bold());
    println!(
        "{}",
        "Commands: /new, /chats, /switch <n>, /delete <n>, quit".bright_black()
    );
    println!();
    print_transcript(controller.active());

    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }

                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                if let Some(command) = trimmed.strip_prefix('/') {
                    handle_command(&mut controller, command);
                    continue;
                }

                // ===== Request path =====
                let request = match controller.prepare_request(trimmed) {
                    Ok(request) => request,
                    Err(e) => {
                        println!("{}", format!("{e}").yellow());
                        continue;
                    }
                };

                println!("{}", "thinking...".bright_black());

                let outcome = match timeout(REQUEST_TIMEOUT, assistant.send(&request.prompt)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(ChatError::remote("Request timed out")),
                };

                if let Some(message) =
                    controller.complete_request(&request.conversation_id, outcome)
                {
                    print_message(&message);
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}

fn handle_command(controller: &mut ConversationController, command: &str) {
    let mut parts = command.splitn(2, ' ');
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().unwrap_or_default();

    match name {
        "new" => {
            controller.reset_to_blank_or_new();
            print_transcript(controller.active());
        }
        "chats" => {
            print_chat_list(controller);
        }
        "switch" => match resolve_conversation_id(controller, arg) {
            Some(id) => match controller.switch_to(&id) {
                Ok(conversation) => {
                    let conversation = conversation.clone();
                    print_transcript(&conversation);
                }
                Err(e) => println!("{}", format!("{e}").yellow()),
            },
            None => println!("{}", "Usage: /switch <n> (see /chats)".yellow()),
        },
        "delete" => match resolve_conversation_id(controller, arg) {
            Some(id) => match controller.delete_conversation(&id) {
                Ok(()) => {
                    println!("{}", "Conversation deleted.".bright_black());
                    print_transcript(controller.active());
                }
                Err(e) => println!("{}", format!("{e}").yellow()),
            },
            None => println!("{}", "Usage: /delete <n> (see /chats)".yellow()),
        },
        _ => {
            println!("{}", "Unknown command".bright_black());
        }
    }
}

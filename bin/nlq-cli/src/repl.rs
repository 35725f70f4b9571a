//! Interactive chat loop.
//!
//! Plain lines are sent as chat messages; lines starting with `/` are
//! commands acting on the session list.

use anyhow::Result;
use nlq_core::sidebar::DELETE_FAILED;
use nlq_core::{ChatBackend, ChatState, DeleteOutcome, SessionsPanel, session_label};
use nlq_types::Session;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing::debug;

use crate::render;

pub const HELP: &str = "\
Type a question and press Enter to send it.

Commands:
  /new            start a new chat
  /sessions       list saved sessions
  /open <n|id>    open a session by list number or id
  /delete <n|id>  delete a session
  /help           show this help
  /quit           exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Message(String),
    New,
    Sessions,
    Open(String),
    Delete(String),
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Message(line.to_owned());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    match (name, arg) {
        ("new", _) => Input::New,
        ("sessions" | "ls", _) => Input::Sessions,
        ("open", a) if !a.is_empty() => Input::Open(a.to_owned()),
        ("delete" | "rm", a) if !a.is_empty() => Input::Delete(a.to_owned()),
        ("help" | "?", _) => Input::Help,
        ("quit" | "exit" | "q", _) => Input::Quit,
        _ => Input::Unknown(line.to_owned()),
    }
}

/// Resolve a 1-based list number or a literal id.
pub fn resolve_session(arg: &str, listed: &[Session]) -> String {
    arg.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| listed.get(i))
        .map(|s| s.session_id.clone())
        .unwrap_or_else(|| arg.to_owned())
}

pub async fn run<B: ChatBackend>(backend: &B, resume: Option<String>) -> Result<()> {
    let mut chat = ChatState::new();
    let mut panel = SessionsPanel::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("nlq chat. /help for commands.");
    if let Some(id) = resume {
        open_session(backend, &mut chat, &id).await;
    }

    loop {
        prompt("> ").await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            Input::Empty => {}
            Input::Message(text) => {
                println!("...");
                if let Some(reply) = chat.send(backend, &text).await {
                    println!("{}", render::message(reply));
                }
                if let Some(id) = chat.session_id() {
                    debug!(session_id = id, "turn complete");
                }
            }
            Input::New => {
                chat.new_chat();
                println!("Started a new chat.");
            }
            Input::Sessions => {
                panel.refresh(backend).await;
                match panel.error() {
                    Some(err) => println!("{err}. Type /sessions to retry."),
                    None => println!("{}", render::session_list(panel.sessions(), chat.session_id())),
                }
            }
            Input::Open(arg) => {
                let id = resolve_session(&arg, panel.sessions());
                open_session(backend, &mut chat, &id).await;
            }
            Input::Delete(arg) => {
                let id = resolve_session(&arg, panel.sessions());
                let question = format!("Delete {}? [y/N] ", session_label(&id));
                if !confirm(&mut lines, &question).await? {
                    println!("Cancelled.");
                    continue;
                }
                match panel.delete(backend, &id, &mut chat).await {
                    DeleteOutcome::Deleted { was_current: true } => {
                        println!("Deleted. Started a new chat.")
                    }
                    DeleteOutcome::Deleted { was_current: false } => println!("Deleted."),
                    DeleteOutcome::Busy => println!("Already deleting {id}."),
                    DeleteOutcome::Failed => eprintln!("error: {DELETE_FAILED}"),
                }
            }
            Input::Help => println!("{HELP}"),
            Input::Quit => break,
            Input::Unknown(cmd) => println!("Unknown command {cmd}. /help lists commands."),
        }
    }

    Ok(())
}

async fn open_session<B: ChatBackend>(backend: &B, chat: &mut ChatState, id: &str) {
    println!("Loading {}...", session_label(id));
    chat.load_session(backend, id).await;
    if chat.messages().is_empty() {
        println!("(no messages)");
    }
    for msg in chat.messages() {
        println!("{}", render::message(msg));
    }
}

async fn prompt(text: &str) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await
}

async fn confirm(lines: &mut Lines<BufReader<Stdin>>, question: &str) -> Result<bool> {
    prompt(question).await?;
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_messages_and_commands() {
        assert_eq!(parse_input("   "), Input::Empty);
        assert_eq!(
            parse_input("  how many visits?  "),
            Input::Message("how many visits?".into())
        );
        assert_eq!(parse_input("/new"), Input::New);
        assert_eq!(parse_input("/sessions"), Input::Sessions);
        assert_eq!(parse_input("/open 2"), Input::Open("2".into()));
        assert_eq!(
            parse_input("/delete  session_abc "),
            Input::Delete("session_abc".into())
        );
        assert_eq!(parse_input("/quit"), Input::Quit);
        assert_eq!(parse_input("/open"), Input::Unknown("/open".into()));
        assert_eq!(parse_input("/frobnicate"), Input::Unknown("/frobnicate".into()));
    }

    #[test]
    fn resolves_list_numbers_and_ids() {
        let listed = vec![
            Session {
                session_id: "session_a".into(),
            },
            Session {
                session_id: "session_b".into(),
            },
        ];
        assert_eq!(resolve_session("2", &listed), "session_b");
        assert_eq!(resolve_session("session_x", &listed), "session_x");
        assert_eq!(resolve_session("0", &listed), "0");
        assert_eq!(resolve_session("9", &listed), "9");
    }
}

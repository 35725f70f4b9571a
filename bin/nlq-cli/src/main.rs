//! nlq – terminal front end for nlq-server.

mod render;
mod repl;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use nlq_core::sidebar::DELETE_FAILED;
use nlq_core::{ChatState, DeleteOutcome, ProxyClient, SessionsPanel, session_label};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "nlq", version)]
#[command(about = "Ask questions about your data through nlq-server")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Base URL of nlq-server
    #[arg(long, global = true, env = "NLQ_SERVER_URL", default_value = "http://localhost:3000")]
    server: String,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// tracing filter, e.g. "debug" or "nlq_core=trace"
    #[arg(long, global = true, env = "NLQ_LOG", default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive chat (default)
    Chat {
        /// Resume an existing session
        #[arg(long)]
        session: Option<String>,
    },
    /// Send one message and print the reply
    Send {
        /// Continue an existing session instead of starting a new one
        #[arg(long)]
        session: Option<String>,
        #[arg(required = true, trailing_var_arg = true)]
        message: Vec<String>,
    },
    /// List saved sessions
    Sessions,
    /// Print the messages of a session
    History { session_id: String },
    /// Delete a session
    Delete {
        session_id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = init_tracing(&args.log_level, args.log_file.as_deref())?;

    let client = ProxyClient::new(&args.server)?;

    match args.command.unwrap_or(Command::Chat { session: None }) {
        Command::Chat { session } => repl::run(&client, session).await?,
        Command::Send { session, message } => {
            let mut chat = match session {
                Some(id) => ChatState::with_session(id),
                None => ChatState::new(),
            };
            let text = message.join(" ");
            if let Some(reply) = chat.send(&client, &text).await {
                println!("{}", render::message(reply));
            }
            if let Some(id) = chat.session_id() {
                eprintln!("session: {id}");
            }
        }
        Command::Sessions => {
            let mut panel = SessionsPanel::new();
            panel.refresh(&client).await;
            if let Some(err) = panel.error() {
                bail!("{err}");
            }
            println!("{}", render::session_list(panel.sessions(), None));
        }
        Command::History { session_id } => {
            let mut chat = ChatState::new();
            chat.load_session(&client, &session_id).await;
            if chat.messages().is_empty() {
                println!("(no messages)");
            }
            for msg in chat.messages() {
                println!("{}", render::message(msg));
            }
        }
        Command::Delete { session_id, yes } => {
            if !yes && !confirm_delete(&session_id)? {
                println!("Cancelled.");
                return Ok(());
            }
            let mut panel = SessionsPanel::new();
            let mut chat = ChatState::new();
            match panel.delete(&client, &session_id, &mut chat).await {
                DeleteOutcome::Deleted { .. } => println!("Deleted {session_id}."),
                DeleteOutcome::Busy | DeleteOutcome::Failed => bail!("{DELETE_FAILED}"),
            }
        }
    }

    Ok(())
}

/// Logs go to stderr, or to `log_file` through a non-blocking writer whose
/// guard must outlive `main`.
fn init_tracing(level: &str, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = match level.parse::<EnvFilter>() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("WARN: NLQ_LOG='{level}' is not a valid tracing filter ({e}); falling back to 'warn'");
            EnvFilter::new("warn")
        }
    };
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    let Some(path) = log_file else {
        subscriber.with_writer(std::io::stderr).init();
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .with_context(|| format!("log file path '{}' has no file name", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    subscriber.with_ansi(false).with_writer(writer).init();
    Ok(Some(guard))
}

fn confirm_delete(session_id: &str) -> anyhow::Result<bool> {
    use std::io::Write;

    print!("Delete {}? [y/N] ", session_label(session_id));
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults() {
        let args = Args::try_parse_from(["nlq"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.log_file.is_none());
    }

    #[test]
    fn parses_send_with_session() {
        let args = Args::try_parse_from([
            "nlq", "--server", "http://proxy:8080", "send", "--session", "session_abc", "how", "many",
        ])
        .unwrap();
        assert_eq!(args.server, "http://proxy:8080");
        match args.command {
            Some(Command::Send { session, message }) => {
                assert_eq!(session.as_deref(), Some("session_abc"));
                assert_eq!(message, ["how", "many"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn delete_requires_id() {
        assert!(Args::try_parse_from(["nlq", "delete"]).is_err());
        let args = Args::try_parse_from(["nlq", "delete", "session_a", "-y"]).unwrap();
        assert!(matches!(args.command, Some(Command::Delete { yes: true, .. })));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}

// Pinnote - notes application core
// Entry point and interactive shell

use async_trait::async_trait;
use pinnote::app::{self, AppState, Mode};
use pinnote::error::Result;
use pinnote::events::Intent;
use pinnote::models::Filter;
use pinnote::services::toast::Toast;
use pinnote::view::{ConfirmProvider, Render, ToastSink, ViewModel};
use std::io::{self, Write as _};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pinnote=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Pinnote");

    let mode = if std::env::args().any(|arg| arg == "--api") {
        Mode::Api
    } else {
        Mode::Local
    };

    let runtime = tokio::runtime::Runtime::new().expect("failed to start async runtime");
    if let Err(e) = runtime.block_on(run(data_dir(), mode)) {
        eprintln!("fatal: {}", e);
        std::process::exit(1);
    }
}

fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PINNOTE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("pinnote")
}

async fn run(data_dir: PathBuf, mode: Mode) -> Result<()> {
    let shell = Arc::new(ShellView);
    let mut state = app::setup(data_dir, mode, shell.clone(), shell.clone(), shell).await?;

    if let Some(api) = &state.api {
        if !api.is_logged_in().await {
            println!("Not logged in. Use: login <email> <password>");
        }
    }

    state.controller.load_initial_state().await;
    print_help();

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        if matches!(command, "quit" | "exit") {
            break;
        }

        let result = dispatch(&mut state, command, rest).await;
        if let Err(e) = result {
            println!("error: {}", e);
        }
    }

    Ok(())
}

async fn dispatch(state: &mut AppState, command: &str, rest: &str) -> Result<()> {
    match command {
        "help" => {
            print_help();
            Ok(())
        }
        "list" => {
            state.controller.recompute_view();
            Ok(())
        }
        "add" => match rest.split_once('|') {
            Some((title, body)) => {
                state
                    .controller
                    .handle_intent(Intent::Create {
                        title: title.trim().to_string(),
                        body: body.trim().to_string(),
                    })
                    .await
            }
            None => {
                println!("usage: add <title> | <body>");
                Ok(())
            }
        },
        "pin" => {
            state
                .controller
                .handle_intent(Intent::Pin {
                    id: rest.to_string(),
                    pinned: true,
                })
                .await
        }
        "unpin" => {
            state
                .controller
                .handle_intent(Intent::Pin {
                    id: rest.to_string(),
                    pinned: false,
                })
                .await
        }
        "archive" => {
            state
                .controller
                .handle_intent(Intent::Archive {
                    id: rest.to_string(),
                    archived: true,
                })
                .await
        }
        "unarchive" => {
            state
                .controller
                .handle_intent(Intent::Archive {
                    id: rest.to_string(),
                    archived: false,
                })
                .await
        }
        "delete" => {
            state
                .controller
                .handle_intent(Intent::Delete {
                    id: rest.to_string(),
                })
                .await
        }
        "filter" => match rest.parse::<Filter>() {
            Ok(filter) => {
                state
                    .controller
                    .handle_intent(Intent::FilterChange { filter })
                    .await
            }
            Err(e) => {
                println!("{}", e);
                Ok(())
            }
        },
        "search" => {
            state
                .controller
                .handle_intent(Intent::SearchChange {
                    query: rest.to_string(),
                })
                .await
        }
        "theme" => state.controller.handle_intent(Intent::ThemeToggle).await,
        "export" => state.controller.handle_intent(Intent::ExportData).await,
        "import" => match std::fs::read_to_string(rest) {
            Ok(text) => {
                state
                    .controller
                    .handle_intent(Intent::ImportData {
                        text,
                        filename: rest.to_string(),
                    })
                    .await
            }
            Err(e) => {
                println!("cannot read {}: {}", rest, e);
                Ok(())
            }
        },
        "register" => register(state, rest).await,
        "login" => login(state, rest).await,
        "logout" => logout(state).await,
        "whoami" => whoami(state).await,
        other => {
            println!("unknown command: {} (try help)", other);
            Ok(())
        }
    }
}

async fn register(state: &AppState, rest: &str) -> Result<()> {
    let Some(api) = &state.api else {
        println!("register requires --api mode");
        return Ok(());
    };

    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(email), Some(password)) => {
            let user_id = api.register(name, email, password).await?;
            println!("Registered {} ({})", email, user_id);
            Ok(())
        }
        _ => {
            println!("usage: register <name> <email> <password>");
            Ok(())
        }
    }
}

async fn login(state: &mut AppState, rest: &str) -> Result<()> {
    let Some(api) = state.api.clone() else {
        println!("login requires --api mode");
        return Ok(());
    };

    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(email), Some(password)) => {
            api.login(email, password).await?;
            println!("Logged in as {}", email);
            state.controller.load_initial_state().await;
            Ok(())
        }
        _ => {
            println!("usage: login <email> <password>");
            Ok(())
        }
    }
}

async fn logout(state: &AppState) -> Result<()> {
    let Some(api) = &state.api else {
        println!("logout requires --api mode");
        return Ok(());
    };
    api.clear_access_token().await?;
    println!("Logged out");
    Ok(())
}

async fn whoami(state: &AppState) -> Result<()> {
    let Some(api) = &state.api else {
        println!("whoami requires --api mode");
        return Ok(());
    };
    let user = api.get_user_logged().await?;
    println!("{} <{}>", user.name, user.email);
    Ok(())
}

fn print_help() {
    println!("commands:");
    println!("  list                         show the current view");
    println!("  add <title> | <body>         create a note");
    println!("  pin <id> / unpin <id>        toggle pinned status");
    println!("  archive <id> / unarchive <id> move between collections");
    println!("  delete <id>                  delete (asks for confirmation)");
    println!("  filter <all|active|archived|pinned>");
    println!("  search <query>               filter by title/body substring");
    println!("  theme                        toggle light/dark");
    println!("  export / import <path>       save or load a JSON export");
    println!("  register / login / logout / whoami   (API mode)");
    println!("  quit");
}

/// Line-oriented stand-in for the view components
struct ShellView;

impl Render for ShellView {
    fn render(&self, view: &ViewModel) {
        println!();
        let search = if view.query.is_empty() {
            String::new()
        } else {
            format!(" | search:\"{}\"", view.query)
        };
        println!(
            "[{}] all:{} active:{} archived:{} pinned:{} | theme:{}{}",
            view.filter,
            view.counts.all,
            view.counts.active,
            view.counts.archived,
            view.counts.pinned,
            view.theme,
            search
        );

        if view.notes.is_empty() {
            println!("  (no notes)");
            return;
        }

        for note in &view.notes {
            let pin = if note.pinned { '*' } else { ' ' };
            let arch = if note.archived { '~' } else { ' ' };
            let preview: String = note
                .body
                .replace('\n', " ")
                .chars()
                .take(60)
                .collect();
            println!(" {}{} {} | {} | {}", pin, arch, note.id, note.title, preview);
        }
    }

    fn deliver_export(&self, filename: &str, payload: &str) {
        match std::fs::write(filename, payload) {
            Ok(()) => println!("Wrote {}", filename),
            Err(e) => eprintln!("Failed to write {}: {}", filename, e),
        }
    }
}

#[async_trait]
impl ConfirmProvider for ShellView {
    async fn confirm(&self, message: &str) -> bool {
        print!("{} [y/N] ", message);
        let _ = io::stdout().flush();

        let mut answer = String::new();
        if io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

impl ToastSink for ShellView {
    fn show(&self, toast: &Toast) {
        println!("[{}] {}", toast.variant.as_str(), toast.message);
    }
}

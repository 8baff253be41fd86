//! bumble — command-line driver for bumble-lite.
//!
//! Reads BUMBLE_* settings from the environment (or `.env`). The session,
//! repository settings, local images and likes all live in the store file at
//! BUMBLE_STORE_PATH.

use anyhow::Context;
use bumble_app::{App, FeedState, SettingsForm};
use bumble_cli::{describe_item, describe_state, init_tracing};
use bumble_core::{Account, AppConfig, LikeKind};
use bumble_storage::{Backend, FileStore, PersistenceGateway};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "bumble", about = "Swipe through each other's photos")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in as one of the two accounts
    Login { username: String, password: String },
    /// Forget the stored session
    Logout,
    /// Show the logged-in account
    Whoami,
    /// Show or change the GitHub repository settings
    Settings {
        #[command(subcommand)]
        sub: SettingsCommands,
    },
    /// List the other account's images
    Feed {
        /// Print the feed as JSON
        #[arg(long)]
        json: bool,
    },
    /// Walk the feed: l = like, s = super-like, n = next, q = quit
    Swipe,
    /// Upload images into your own namespace
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show what you have liked
    Likes {
        /// Show super-likes instead
        #[arg(long = "super")]
        super_likes: bool,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Print the current settings (token redacted)
    Show,
    /// Update settings; omitted fields keep their current value
    Set {
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        repo: Option<String>,
        /// Blank means "main"
        #[arg(long)]
        branch: Option<String>,
        /// Pass an empty string to remove the token
        #[arg(long)]
        token: Option<String>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

fn backend_label(backend: &Backend) -> String {
    match backend {
        Backend::Remote(target) => format!("github ({}/{}@{})", target.owner, target.repo, target.branch),
        Backend::Local => "local".to_string(),
    }
}

const LOGIN_HINT: &str = "Not logged in. Run `bumble login <username> <password>` first";

/// Restore the stored session or fail with a hint. The feed is not loaded.
async fn require_session(app: &mut App) -> anyhow::Result<Account> {
    app.restore_session().await?.context(LOGIN_HINT)
}

/// Restore the stored session and load its feed.
async fn require_feed(app: &mut App) -> anyhow::Result<Account> {
    app.boot().await?.context(LOGIN_HINT)
}

fn print_current(app: &App) {
    let feed = app.feed();
    println!("{}", describe_state(feed.state(), feed.len()));
    if let Some(item) = app.current() {
        println!("  {}", describe_item(item));
    }
}

async fn swipe(app: &mut App) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_current(app);
        if !matches!(app.feed().state(), FeedState::Browsing { .. }) {
            return Ok(());
        }
        println!("[l]ike  [s]uper-like  [n]ext  [q]uit");

        let Some(line) = lines.next_line().await.context("Read from stdin")? else {
            return Ok(());
        };
        match line.trim() {
            "l" | "like" => {
                app.like_current().await?;
            }
            "s" | "super" => {
                app.super_like_current().await?;
            }
            "n" | "next" => {
                app.next();
            }
            "q" | "quit" => return Ok(()),
            other => println!("Unknown choice: {:?}", other),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("Invalid BUMBLE_* configuration")?;
    let cli = Cli::parse();

    let kv = FileStore::open(&config.store_path)
        .await
        .with_context(|| format!("Failed to open store {}", config.store_path.display()))?;
    tracing::debug!(path = %config.store_path.display(), api = %config.github_api_url, "Store opened");
    let gateway = PersistenceGateway::new(Arc::new(kv), &config)?;
    let mut app = App::new(Arc::new(gateway));

    match cli.command {
        Commands::Login { username, password } => {
            let account = app.login(&username, &password).await?;
            println!("Logged in as {}.", account);
            print_current(&app);
        }
        Commands::Logout => {
            app.logout().await?;
            println!("Logged out.");
        }
        Commands::Whoami => {
            let account = require_session(&mut app).await?;
            println!("{} (swiping through {})", account, account.other());
        }
        Commands::Settings { sub } => match sub {
            SettingsCommands::Show => {
                let settings = app.settings().await?;
                print_json(&settings.redacted())?;
                let gateway = app.gateway();
                println!("list backend: {}", backend_label(&gateway.list_backend().await?));
                println!("save backend: {}", backend_label(&gateway.save_backend().await?));
            }
            SettingsCommands::Set {
                owner,
                repo,
                branch,
                token,
            } => {
                // Restore the session so saving can reload its feed.
                app.restore_session().await?;
                let mut form = SettingsForm::from(&app.settings().await?);
                if let Some(owner) = owner {
                    form.owner = owner;
                }
                if let Some(repo) = repo {
                    form.repo = repo;
                }
                if let Some(branch) = branch {
                    form.branch = branch;
                }
                if let Some(token) = token {
                    form.token = token;
                }
                let saved = app.save_settings(&form).await?;
                println!("Settings saved.");
                print_json(&saved.redacted())?;
            }
        },
        Commands::Feed { json } => {
            require_feed(&mut app).await?;
            let feed = app.feed();
            if json {
                print_json(&feed.items())?;
            } else {
                println!("{}", describe_state(feed.state(), feed.len()));
                for (i, item) in feed.items().iter().enumerate() {
                    println!("{:>3}. {}", i + 1, describe_item(item));
                }
            }
        }
        Commands::Swipe => {
            require_feed(&mut app).await?;
            swipe(&mut app).await?;
        }
        Commands::Upload { files } => {
            require_session(&mut app).await?;
            let tally = app.upload_paths(&files).await?;
            println!("{}", tally);
            for name in &tally.failed_files {
                println!("  failed: {}", name);
            }
        }
        Commands::Likes { super_likes } => {
            require_session(&mut app).await?;
            let kind = if super_likes {
                LikeKind::SuperLike
            } else {
                LikeKind::Like
            };
            let references = app.likes(kind).await?;
            if references.is_empty() {
                println!("No {}s yet.", kind);
            }
            for reference in references {
                println!("{}", bumble_cli::truncate_string(&reference, 96));
            }
        }
    }

    Ok(())
}

//! `hotel-admin`: operator console for the hotel admin backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Thin shell over the `client` crate. Credentials persist in the file token
//! store between invocations, so `login` once and every later command rides
//! the same pipeline (bearer attachment, silent refresh on 401).
//!
//! Logs go to stderr (`RUST_LOG`, default `warn`); stdout carries results.

mod bookings;
mod menu;
mod output;
mod watch;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use client::net::api::ApiClient;
use client::{ApiError, AuthError, ClientConfig, FileTokenStore, Pipeline, SessionStore};
use records::ParseRecordError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("not logged in; run `hotel-admin login` first")]
    NotLoggedIn,
    #[error("password required; pass --password or set HOTEL_ADMIN_PASSWORD")]
    MissingPassword,
    #[error("invalid value: {0}")]
    Parse(#[from] ParseRecordError),
    #[error("failed to read {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Parser, Debug)]
#[command(name = "hotel-admin", about = "Hotel booking and menu administration console")]
pub(crate) struct Cli {
    /// API root, e.g. http://127.0.0.1:8000/api
    #[arg(long, env = "HOTEL_API_BASE_URL")]
    base_url: Option<String>,

    /// Where the access/refresh pair is persisted.
    #[arg(long, env = "HOTEL_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    /// Print raw JSON instead of summary lines.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Exchange email/password for a persisted token pair.
    Login(LoginArgs),
    /// Forget local credentials and invalidate them server-side.
    Logout,
    /// Verify the persisted session and show the current operator.
    Whoami,
    Bookings(bookings::BookingsCommand),
    Menu(menu::MenuCommand),
    /// Show the notification feed seeded from recent bookings.
    Notifications,
    /// Poll for new bookings and refresh stats until Ctrl-C.
    Watch,
}

#[derive(Args, Debug)]
pub(crate) struct LoginArgs {
    #[arg(long)]
    email: String,
    #[arg(long, env = "HOTEL_ADMIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

/// Everything a command needs: the resolved config and the shared client.
pub(crate) struct CliContext {
    pub config: ClientConfig,
    pub api: ApiClient,
    pub json: bool,
}

impl CliContext {
    fn new(cli: &Cli) -> Result<Self, CliError> {
        let mut config = ClientConfig::from_env();
        if let Some(base_url) = &cli.base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(token_file) = &cli.token_file {
            config.token_file.clone_from(token_file);
        }

        let tokens = Arc::new(FileTokenStore::open(config.token_file.clone()));
        let pipeline = Pipeline::new(config.clone(), tokens)?;
        Ok(Self { config, api: ApiClient::new(Arc::new(pipeline)), json: cli.json })
    }

    pub fn session(&self) -> SessionStore {
        SessionStore::new(self.api.clone())
    }

    /// A session store that has verified the persisted token.
    pub async fn require_session(&self) -> Result<Arc<SessionStore>, CliError> {
        let session = Arc::new(self.session());
        session.check_initial_session().await;
        if session.is_authenticated() {
            Ok(session)
        } else {
            Err(CliError::NotLoggedIn)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = CliContext::new(&cli)?;
    match cli.command {
        Command::Login(args) => run_login(&ctx, args).await,
        Command::Logout => run_logout(&ctx).await,
        Command::Whoami => run_whoami(&ctx).await,
        Command::Bookings(command) => bookings::run(&ctx, command).await,
        Command::Menu(command) => menu::run(&ctx, command).await,
        Command::Notifications => watch::run_notifications(&ctx).await,
        Command::Watch => watch::run_watch(&ctx).await,
    }
}

async fn run_login(ctx: &CliContext, args: LoginArgs) -> Result<(), CliError> {
    let password = args.password.ok_or(CliError::MissingPassword)?;
    let user = ctx.session().login(&args.email, &password).await?;
    if ctx.json {
        output::print_json(&user)?;
    } else {
        println!("logged in as {} <{}>", user.display_name(), user.email);
    }
    Ok(())
}

async fn run_logout(ctx: &CliContext) -> Result<(), CliError> {
    ctx.session().logout().await?;
    println!("logged out");
    Ok(())
}

async fn run_whoami(ctx: &CliContext) -> Result<(), CliError> {
    let session = ctx.session();
    session.check_initial_session().await;
    let snapshot = session.snapshot();
    match snapshot.user {
        Some(user) if ctx.json => output::print_json(&user)?,
        Some(user) => {
            let role = if user.is_admin { "admin" } else { "staff" };
            println!("{} <{}> ({role})", user.display_name(), user.email);
        }
        None => {
            if let Some(error) = snapshot.error {
                eprintln!("{error}");
            }
            return Err(CliError::NotLoggedIn);
        }
    }
    Ok(())
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use kb_client::nav::{LOGIN_PATH, SIGNUP_PATH};
use kb_client::net::Attachment;
use kb_client::services::{ai, auth, documents, files, mcp, notes, tasks};
use kb_client::{ApiClient, ApiError, ClientConfig, FileStore, RouteTracker, SessionContext};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] kb_client::config::ConfigError),
    #[error("{}", .0.message())]
    Api(#[from] ApiError),
    #[error("not logged in; run `kb login`")]
    NotLoggedIn,
    #[error("invalid JSON output: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "kb", about = "Knowledge-base API client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        email: String,
        #[arg(long, env = "KB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Signup {
        name: String,
        email: String,
        #[arg(long, env = "KB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    VerifyEmail {
        email: String,
        otp: String,
    },
    Logout,
    Whoami,
    Notes(NotesCommand),
    Tasks(TasksCommand),
    Docs(DocsCommand),
    Files(FilesCommand),
    Sessions(SessionsCommand),
    Ai(AiCommand),
    Mcp(McpCommand),
}

#[derive(Args, Debug)]
struct NotesCommand {
    #[command(subcommand)]
    command: NotesSubcommand,
}

#[derive(Subcommand, Debug)]
enum NotesSubcommand {
    List,
    Recent {
        #[arg(long, default_value_t = notes::DEFAULT_RECENT_LIMIT)]
        limit: u32,
    },
    Stats,
}

#[derive(Args, Debug)]
struct TasksCommand {
    #[command(subcommand)]
    command: TasksSubcommand,
}

#[derive(Subcommand, Debug)]
enum TasksSubcommand {
    List {
        #[arg(long, value_parser = parse_status)]
        status: Option<tasks::TaskStatus>,
        #[arg(long, value_parser = parse_priority)]
        priority: Option<tasks::TaskPriority>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    Upcoming,
    Overdue,
    Stats,
}

#[derive(Args, Debug)]
struct DocsCommand {
    #[command(subcommand)]
    command: DocsSubcommand,
}

#[derive(Subcommand, Debug)]
enum DocsSubcommand {
    Mine,
    Search {
        query: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    Upload {
        path: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        public: bool,
        #[arg(long)]
        mime: Option<String>,
    },
    Stats,
}

#[derive(Args, Debug)]
struct FilesCommand {
    #[command(subcommand)]
    command: FilesSubcommand,
}

#[derive(Subcommand, Debug)]
enum FilesSubcommand {
    List,
    Upload {
        path: PathBuf,
        #[arg(long)]
        document_id: Option<String>,
        #[arg(long)]
        mime: Option<String>,
    },
    Download {
        filename: String,
        #[arg(long, help = "Output path; defaults to the file name")]
        out: Option<PathBuf>,
    },
    Stats,
}

#[derive(Args, Debug)]
struct McpCommand {
    #[command(subcommand)]
    command: McpSubcommand,
}

#[derive(Subcommand, Debug)]
enum McpSubcommand {
    Tools,
    Health,
    Stats,
}

#[derive(Args, Debug)]
struct SessionsCommand {
    #[command(subcommand)]
    command: SessionsSubcommand,
}

#[derive(Subcommand, Debug)]
enum SessionsSubcommand {
    List,
    Revoke { session_id: String },
    RevokeAll,
}

#[derive(Args, Debug)]
struct AiCommand {
    #[command(subcommand)]
    command: AiSubcommand,
}

#[derive(Subcommand, Debug)]
enum AiSubcommand {
    Status,
    Chat { message: String },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        if matches!(&e, CliError::Api(api) if api.is_auth_failure()) {
            eprintln!("hint: run `kb login` to start a new session");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = ClientConfig::from_env()?;
    tracing::debug!(api_root = %config.api_root(), credentials = %config.credentials_path.display(), "starting");

    let store = Arc::new(FileStore::new(config.credentials_path.clone()));
    let route = Arc::new(RouteTracker::default());
    let client = ApiClient::from_config(&config, store, route.clone())?;
    let session = SessionContext::new(client);

    match cli.command {
        Command::Login { email, password } => {
            route.navigate(LOGIN_PATH);
            let user = session.login(&email, &password).await?;
            eprintln!("logged in as {} <{}>", user.name, user.email);
            Ok(())
        }
        Command::Signup { name, email, password } => {
            route.navigate(SIGNUP_PATH);
            let user_id = session.signup(&name, &email, &password).await?;
            eprintln!("account {user_id} created; check {email} for a verification code");
            Ok(())
        }
        Command::VerifyEmail { email, otp } => {
            route.navigate(SIGNUP_PATH);
            auth::verify_email(session.client(), &email, &otp).await?;
            eprintln!("email verified; run `kb login`");
            Ok(())
        }
        Command::Logout => {
            session.logout().await;
            eprintln!("logged out");
            Ok(())
        }
        Command::Whoami => {
            let user = session.verify().await.ok_or(CliError::NotLoggedIn)?;
            print_json(&user)
        }
        Command::Notes(cmd) => run_notes(session.client(), cmd).await,
        Command::Tasks(cmd) => run_tasks(session.client(), cmd).await,
        Command::Docs(cmd) => run_docs(session.client(), cmd).await,
        Command::Files(cmd) => run_files(session.client(), cmd).await,
        Command::Sessions(cmd) => run_sessions(session.client(), cmd).await,
        Command::Ai(cmd) => run_ai(session.client(), cmd).await,
        Command::Mcp(cmd) => run_mcp(session.client(), cmd).await,
    }
}

async fn run_notes(client: &ApiClient, cmd: NotesCommand) -> Result<(), CliError> {
    match cmd.command {
        NotesSubcommand::List => print_json(&notes::list(client).await?),
        NotesSubcommand::Recent { limit } => print_json(&notes::recent(client, limit).await?),
        NotesSubcommand::Stats => print_json(&notes::stats(client).await?),
    }
}

async fn run_tasks(client: &ApiClient, cmd: TasksCommand) -> Result<(), CliError> {
    match cmd.command {
        TasksSubcommand::List { status, priority, tags } => {
            let filter = tasks::TaskFilter { status, priority, tags };
            print_json(&tasks::list(client, &filter).await?)
        }
        TasksSubcommand::Upcoming => print_json(&tasks::upcoming(client).await?),
        TasksSubcommand::Overdue => print_json(&tasks::overdue(client).await?),
        TasksSubcommand::Stats => print_json(&tasks::stats(client).await?),
    }
}

async fn run_docs(client: &ApiClient, cmd: DocsCommand) -> Result<(), CliError> {
    match cmd.command {
        DocsSubcommand::Mine => print_json(&documents::mine(client).await?),
        DocsSubcommand::Search { query, tags } => {
            let query = documents::DocumentQuery { search: query, tags, ..documents::DocumentQuery::default() };
            print_json(&documents::search(client, &query).await?)
        }
        DocsSubcommand::Upload { path, title, tags, public, mime } => {
            let file = read_attachment(&path, mime).await?;
            let upload = documents::DocumentUpload { title, tags, is_public: Some(public) };
            print_json(&documents::upload(client, &upload, file).await?)
        }
        DocsSubcommand::Stats => print_json(&documents::stats(client).await?),
    }
}

async fn run_files(client: &ApiClient, cmd: FilesCommand) -> Result<(), CliError> {
    match cmd.command {
        FilesSubcommand::List => print_json(&files::list(client).await?),
        FilesSubcommand::Upload { path, document_id, mime } => {
            let file = read_attachment(&path, mime).await?;
            print_json(&files::upload(client, file, document_id.as_deref()).await?)
        }
        FilesSubcommand::Download { filename, out } => {
            let bytes = files::serve(client, &filename).await?;
            let out = out.unwrap_or_else(|| PathBuf::from(&filename));
            tokio::fs::write(&out, &bytes).await?;
            eprintln!("wrote {} bytes to {}", bytes.len(), out.display());
            Ok(())
        }
        FilesSubcommand::Stats => print_json(&files::stats(client).await?),
    }
}

async fn run_mcp(client: &ApiClient, cmd: McpCommand) -> Result<(), CliError> {
    match cmd.command {
        McpSubcommand::Tools => print_json(&mcp::tools(client).await?),
        McpSubcommand::Health => print_json(&mcp::health(client).await?),
        McpSubcommand::Stats => print_json(&mcp::user_stats(client).await?),
    }
}

async fn read_attachment(path: &Path, mime: Option<String>) -> Result<Attachment, CliError> {
    let bytes = tokio::fs::read(path).await?;
    let name = path.file_name().map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());
    let file = Attachment::new(name, bytes);
    Ok(match mime {
        Some(mime) => file.with_mime_type(mime),
        None => file,
    })
}

async fn run_sessions(client: &ApiClient, cmd: SessionsCommand) -> Result<(), CliError> {
    match cmd.command {
        SessionsSubcommand::List => print_json(&auth::sessions(client).await?),
        SessionsSubcommand::Revoke { session_id } => {
            auth::revoke_session(client, &session_id).await?;
            eprintln!("revoked {session_id}");
            Ok(())
        }
        SessionsSubcommand::RevokeAll => {
            auth::revoke_all_sessions(client).await?;
            eprintln!("revoked all sessions");
            Ok(())
        }
    }
}

async fn run_ai(client: &ApiClient, cmd: AiCommand) -> Result<(), CliError> {
    match cmd.command {
        AiSubcommand::Status => print_json(&ai::status(client).await?),
        AiSubcommand::Chat { message } => {
            println!("{}", ai::chat(client, &message, None).await?);
            Ok(())
        }
    }
}

fn parse_status(raw: &str) -> Result<tasks::TaskStatus, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_ascii_uppercase().replace('-', "_")))
        .map_err(|_| format!("unknown status `{raw}`; expected todo, in-progress, done or cancelled"))
}

fn parse_priority(raw: &str) -> Result<tasks::TaskPriority, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_ascii_uppercase()))
        .map_err(|_| format!("unknown priority `{raw}`; expected low, medium, high or urgent"))
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

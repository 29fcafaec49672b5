//! Hermes - Filesystem-Backed Prompt Relay for Autonomous Agents
//!
//! This is the main entry point for the hermes CLI, which moves prompt
//! artifacts between named agents through an auditable approval pipeline.

use clap::{Parser, Subcommand};
use hermes_core::error::Result;
use tracing::{debug, Level};
use tracing_subscriber::{self, EnvFilter};

mod cli;

#[derive(Parser)]
#[command(name = "hermes")]
#[command(about = "Filesystem-backed prompt relay between autonomous agents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Config file path (defaults to hermes.toml)
    #[arg(long)]
    config: Option<String>,

    /// Relay root directory (overrides the configured root)
    #[arg(long, env = "HERMES_ROOT")]
    root: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new pending draft
    Draft {
        /// Short label woven into the artifact name
        #[arg(short, long)]
        slug: Option<String>,

        /// Prompt text (read from stdin if not provided)
        #[arg(short, long)]
        content: Option<String>,

        /// Output format (text/json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Approve a pending draft and record its routing
    Approve {
        /// Source agent
        #[arg(long)]
        from: Option<String>,

        /// Destination agent
        #[arg(long)]
        to: Option<String>,

        /// Draft ID (defaults to the latest pending draft)
        #[arg(long)]
        id: Option<String>,

        /// Immediately send after approval
        #[arg(long)]
        send: bool,

        /// Output format (text/json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Dispatch an approved draft to its recipient
    Send {
        /// Draft ID
        #[arg(long)]
        id: Option<String>,

        /// Output format (text/json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Acknowledge receipt of a sent draft
    Ack {
        /// Acknowledging agent
        #[arg(long)]
        agent: Option<String>,

        /// Draft ID (defaults to the latest sent draft addressed to the agent)
        #[arg(long)]
        id: Option<String>,

        /// Output format (text/json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show per-stage counts and the newest artifact in each stage
    Status {
        /// Output format (text/json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show a draft's stage, routing, history, and content
    Show {
        /// Draft ID
        #[arg(long)]
        id: Option<String>,

        /// Output format (text/json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::new(format!(
        "hermes={},hermes_core={}",
        level.as_str().to_lowercase(),
        level.as_str().to_lowercase()
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("Hermes v{} starting...", env!("CARGO_PKG_VERSION"));

    // Scripted callers depend on a single diagnostic line and exit code 1,
    // not the panic-style report a Result-returning main would produce.
    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let Cli {
        command,
        config,
        root,
        ..
    } = cli;

    match command {
        Commands::Draft {
            slug,
            content,
            format,
        } => cli::draft::handle(slug, content, format, config, root).await,
        Commands::Approve {
            from,
            to,
            id,
            send,
            format,
        } => cli::approve::handle(from, to, id, send, format, config, root).await,
        Commands::Send { id, format } => cli::send::handle(id, format, config, root).await,
        Commands::Ack { agent, id, format } => {
            cli::ack::handle(agent, id, format, config, root).await
        }
        Commands::Status { format } => cli::status::handle(format, config, root).await,
        Commands::Show { id, format } => cli::show::handle(id, format, config, root).await,
    }
}

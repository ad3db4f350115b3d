//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use docanalyzer_core::{ContactRequest, ContactSink, Document, LogContactSink, SAMPLE_QUESTIONS};
use docanalyzer_provider::OpenRouterClient;
use docanalyzer_server::{AppState, bind, router, serve};
use docanalyzer_shared::{AppConfig, DocumentConfig, ProviderSettings, init_config, load_config};
use tracing::{info, warn};
use url::Url;

use crate::ask::{AskArgs, OutputFormat};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// DocAnalyzer: answers about a document, formatted for reading.
#[derive(Parser)]
#[command(
    name = "docanalyzer",
    version,
    about = "Ask questions about a reference document and get formatted answers.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Start the analyze HTTP server.
    Serve {
        /// Address to bind (overrides config and DOCANALYZER_BIND).
        #[arg(long)]
        bind: Option<String>,
    },

    /// Ask a question, or start an interactive session when none is given.
    Ask {
        /// Question to ask. Omit for interactive mode.
        question: Option<String>,

        /// Use a running analyze server instead of calling the provider directly.
        #[arg(long)]
        server: Option<Url>,

        /// Answer format.
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Reference document file (defaults to the built-in profile).
        #[arg(long)]
        document: Option<PathBuf>,
    },

    /// Print the reference document and sample questions.
    Document {
        /// Reference document file (defaults to the built-in profile).
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Send a message when the document has no answer.
    Contact {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        message: String,

        #[arg(long, default_value = "")]
        phone: String,

        #[arg(long, default_value = "")]
        subject: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so answers on
/// stdout stay clean.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docanalyzer=info",
        1 => "docanalyzer=debug",
        _ => "docanalyzer=trace,tower_http=debug",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve { bind } => cmd_serve(bind).await,
        Command::Ask {
            question,
            server,
            format,
            document,
        } => {
            crate::ask::run(AskArgs {
                question,
                server,
                format,
                document,
            })
            .await
        }
        Command::Document { path } => cmd_document(path),
        Command::Contact {
            name,
            email,
            message,
            phone,
            subject,
        } => {
            cmd_contact(ContactRequest {
                name,
                phone,
                email,
                subject,
                message,
            })
            .await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_serve(bind_override: Option<String>) -> Result<()> {
    let mut config = load_config()?;
    if let Some(addr) = bind_override {
        config.server.bind = addr;
    }

    let settings = ProviderSettings::from_config(&config)?;
    if settings.api_key.is_none() {
        warn!(
            env = %settings.api_key_env,
            "API key not set; analyze requests will fail until it is"
        );
    }
    info!(model = %settings.model, api_url = %settings.api_url, "provider configured");

    let client = OpenRouterClient::new(settings)?;
    let app = router(AppState::new(client, LogContactSink));
    let listener = bind(&config.server.bind).await?;

    println!("Analyze server on http://{}", config.server.bind);

    serve(listener, app, async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
        }
    })
    .await?;

    Ok(())
}

fn cmd_document(path: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let doc_config = match path {
        Some(path) => DocumentConfig { path: Some(path) },
        None => config.document,
    };
    let document = Document::load(&doc_config)?;

    println!("{}", document.text().trim_end());
    println!();
    println!("Sample questions:");
    for (i, question) in SAMPLE_QUESTIONS.iter().enumerate() {
        println!("  {}. {question}", i + 1);
    }

    Ok(())
}

async fn cmd_contact(request: ContactRequest) -> Result<()> {
    let receipt = LogContactSink.submit(&request).await?;

    println!();
    println!("  Message sent. We'll get back to you soon.");
    println!("  Reference: {}", receipt.id);
    println!();

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

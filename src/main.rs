use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::{error, info};

use greeny::{chat, web_server, ChatSession, Settings};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// URL of the answer service (defaults to GREENY_ANSWER_URL).
    #[arg(long, global = true)]
    answer_url: Option<String>,

    /// Seconds to wait for the answer service (defaults to GREENY_TIMEOUT_SECS).
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the chat page.
    Serve {
        #[arg(long, help = "Port for the web server.")]
        port: Option<u16>,
        #[arg(long, help = "Directory holding index.html.")]
        templates_dir: Option<PathBuf>,
        #[arg(long, help = "Directory served under /static.")]
        static_dir: Option<PathBuf>,
    },
    /// Chat in the terminal.
    Chat,
    /// Ask a single question and print the answer.
    Ask {
        #[arg(help = "The question to send.")]
        query: String,
    },
}

impl Cli {
    fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        if let Some(url) = &self.answer_url {
            settings.answer_url = url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            settings.request_timeout = Duration::from_secs(secs);
        }
        if let Commands::Serve {
            port,
            templates_dir,
            static_dir,
        } = &self.command
        {
            if let Some(port) = port {
                settings.port = *port;
            }
            if let Some(dir) = templates_dir {
                settings.templates_dir = dir.clone();
            }
            if let Some(dir) = static_dir {
                settings.static_dir = dir.clone();
            }
        }
        settings
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (GREENY_* settings)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG (e.g. RUST_LOG=info,greeny=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = cli.settings();
    info!("Greeny starting with command: {:?}", cli.command);

    let service = settings
        .answer_service()
        .context("Failed to build answer service client")?;
    info!("Using answer service at {}", service.url());

    match cli.command {
        Commands::Serve { .. } => {
            let server = web_server::start_web_server(service, &settings);
            tokio::pin!(server);

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Ctrl-C received, shutting down...");
                }
                res = &mut server => {
                    if let Err(e) = res {
                        error!("Web server failed: {:?}", e);
                        return Err(e);
                    }
                    info!("Web server stopped.");
                }
            }
        }
        Commands::Chat => {
            let session = ChatSession::new(service);
            chat::run_chat(&session, BufReader::new(tokio::io::stdin()), tokio::io::stdout())
                .await
                .context("Chat session failed")?;
        }
        Commands::Ask { query } => {
            let session = ChatSession::new(service);
            chat::ask_once(&session, &query, tokio::io::stdout())
                .await
                .context("Question failed")?;
        }
    }

    Ok(())
}

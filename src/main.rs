use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use pubmed_ai::{
    config::Config,
    search::presets,
    tui,
    utils::{init_file_logging, init_server_logging},
    AppState,
};

#[derive(Parser)]
#[command(name = "pubmed-ai", version, about = "AI-assisted PubMed search")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the proxy server (default)
    Serve {
        /// Overrides PORT
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Open the terminal client
    Tui {
        /// Overrides PROXY_URL
        #[arg(long)]
        proxy_url: Option<String>,
    },
    /// Print the example searches
    Presets,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Command::Tui { proxy_url } => {
            if let Some(url) = proxy_url {
                config.client.proxy_url = url;
            }
            // Logs go to a file; stdout belongs to the terminal UI
            let _guard = init_file_logging(&config.client.data_dir.join("logs"))?;
            tui::run(config).await
        }
        Command::Presets => {
            for preset in presets() {
                println!("{:<16} {}", preset.key, preset.title);
                if let Some(query) = preset.builder.build() {
                    println!("{:<16} {}", "", query);
                }
            }
            Ok(())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    init_server_logging();
    info!("Configuration loaded: {:?}", config);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config);
    let app = pubmed_ai::create_router(state);

    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

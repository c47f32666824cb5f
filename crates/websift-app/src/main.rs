use anyhow::Result;
use clap::{Parser, Subcommand};
use websift::api::{create_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "websift")]
#[command(about = "Web search aggregation: web UI + MCP tool server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web UI, JSON API and MCP HTTP endpoint (default).
    Serve(ServeCmd),
    /// Run as an MCP stdio server (for assistant hosts that spawn a child process).
    McpStdio,
    /// Test the configured LLM API credentials with one round trip (json; no secrets).
    CheckLlm(CheckLlmCmd),
}

#[derive(clap::Args, Debug)]
struct ServeCmd {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 7860)]
    port: u16,
}

impl Default for ServeCmd {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7860,
        }
    }
}

#[derive(clap::Args, Debug)]
struct CheckLlmCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve(ServeCmd::default()));

    match command {
        Commands::Serve(args) => {
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::INFO)
                .with_target(true)
                .init();
            serve(args).await?;
        }
        Commands::McpStdio => {
            // stdout belongs to the protocol; keep logs on stderr.
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::WARN)
                .with_writer(std::io::stderr)
                .init();
            let pipeline = websift::build_pipeline()?;
            websift::mcp::serve_stdio(pipeline)
                .await
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;
        }
        Commands::CheckLlm(args) => {
            check_llm(&args.output).await;
        }
    }
    Ok(())
}

async fn serve(args: ServeCmd) -> Result<()> {
    let pipeline = websift::build_pipeline()?;
    tracing::info!(
        provider = pipeline.provider_name(),
        summarizer = pipeline.summarizer_configured(),
        "pipeline ready"
    );

    let router = create_router(AppState { pipeline });
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening (UI at /, API at /api/search, MCP at /mcp)");
    axum::serve(listener, router).await?;
    Ok(())
}

/// Connectivity/auth check against the configured chat-completion endpoint.
/// Exits non-zero on failure; never prints the key.
async fn check_llm(output: &str) {
    use websift_local::summarize::{OpenAiSummarizer, SummarizerConfig};

    let config = SummarizerConfig::from_env();
    let base_url = config.base_url.clone();
    let model = config.model.clone();

    let outcome = match websift_local::http_client() {
        Ok(client) => match OpenAiSummarizer::new(client, config) {
            Ok(s) => s.check().await,
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };

    let ok = outcome.is_ok();
    match output {
        "text" => match &outcome {
            Ok(()) => println!("ok: {model} @ {base_url}"),
            Err(e) => println!("failed: {e}"),
        },
        _ => {
            let report = serde_json::json!({
                "ok": ok,
                "base_url": base_url,
                "model": model,
                "error": outcome.err().map(|e| e.to_string()),
            });
            println!("{report}");
        }
    }
    if !ok {
        std::process::exit(1);
    }
}

//! CLI entry point for ReviewDesk: ingest the review corpus, ask questions,
//! or serve the chat UI.

mod server;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use reviewdesk_core::config::default_config_path;
use reviewdesk_core::{
    app_data_dir, index_exists, load_config, logging, version, AppContext, ChatTurn, Config, Ingestion, RETRIEVAL_K,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "reviewdesk")]
#[command(about = "ReviewDesk: ask questions about TaskFlow Pro customer reviews")]
struct Cli {
    /// Config file (default: config.toml in the app data directory).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Review CSV to ingest on first run.
    #[arg(long, global = true, value_name = "PATH")]
    csv: Option<PathBuf>,
    /// Index directory.
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show config and whether the index has been built.
    Status,
    /// Show where ReviewDesk stores its config and logs (app data directory).
    DataDir,
    /// Build the index from the CSV if it doesn't exist yet.
    Ingest,
    /// List the reviews nearest to a query, with similarity scores.
    Search {
        #[arg(value_name = "QUERY")]
        query: String,
        #[arg(short, long, default_value_t = RETRIEVAL_K)]
        k: usize,
    },
    /// Answer one question and exit.
    Ask {
        #[arg(value_name = "QUESTION")]
        question: String,
    },
    /// Interactive question loop on the terminal.
    Chat,
    /// Serve the chat UI over HTTP.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(csv) = cli.csv {
        config.csv_path = csv;
    }
    if let Some(db) = cli.db {
        config.db_location = db;
    }

    match cli.command.unwrap_or(Commands::Status) {
        Commands::Status => print_status(&config, cli.config.or_else(default_config_path)),
        Commands::DataDir => match app_data_dir() {
            Some(p) => println!("{}", p.display()),
            None => eprintln!("Could not determine app data directory."),
        },
        Commands::Ingest => {
            let ctx = init(config).await?;
            println!("{}", ingest_summary(&ctx));
        }
        Commands::Search { query, k } => {
            let ctx = init(config).await?;
            let hits = ctx.index.search(&query, k).await?;
            println!("{} result(s) for {:?}", hits.len(), query);
            for (doc, score) in hits {
                println!(
                    "  [{}] {:.3}  {}  (rating {}, {})",
                    doc.id, score, doc.content, doc.metadata.rating, doc.metadata.company_size
                );
            }
        }
        Commands::Ask { question } => {
            let ctx = init(config).await?;
            println!("{}", ctx.answerer.answer_question(&question, &[]).await);
        }
        Commands::Chat => {
            let ctx = init(config).await?;
            chat_loop(&ctx).await?;
        }
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server_name = host;
            }
            if let Some(port) = port {
                config.server_port = port;
            }
            let ctx = Arc::new(init(config).await?);
            serve(ctx).await?;
        }
    }
    Ok(())
}

async fn init(config: Config) -> anyhow::Result<AppContext> {
    AppContext::init(config)
        .await
        .context("failed to initialize review index")
}

fn print_status(config: &Config, config_path: Option<PathBuf>) {
    println!("ReviewDesk");
    println!("  version:    {}", version());
    if let Some(p) = config_path {
        println!("  config:     {}", p.display());
    }
    println!("  ollama:     {}", config.ollama_url);
    println!("  models:     embed={} chat={}", config.embed_model, config.chat_model);
    println!("  csv:        {}", config.csv_path.display());
    let built = if index_exists(&config.db_location) { "built" } else { "not built" };
    println!("  index:      {} ({})", config.db_location.display(), built);
    println!("  collection: {}", config.collection_name);
    println!("  server:     {}", config.bind_addr());
}

/// One line describing what `ingest` did. Progress details go to the log.
fn ingest_summary(ctx: &AppContext) -> String {
    let what = match ctx.ingestion {
        Ingestion::Built(_) => "built",
        Ingestion::Reused => "already present, nothing ingested",
    };
    format!(
        "{} reviews indexed at {} ({})",
        ctx.index.len(),
        ctx.config.db_location.display(),
        what
    )
}

async fn chat_loop(ctx: &AppContext) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut history: Vec<ChatTurn> = Vec::new();

    println!("{}", server::DESCRIPTION);
    println!("Ctrl+D to quit.");
    loop {
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;
        let Some(question) = lines.next_line().await? else {
            break;
        };
        let answer = ctx.answerer.answer_question(&question, &history).await;
        println!("{}", answer);
        history.push(ChatTurn {
            user: question,
            assistant: answer,
        });
    }
    Ok(())
}

async fn serve(ctx: Arc<AppContext>) -> anyhow::Result<()> {
    let bind_addr = ctx.config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, server::router(ctx))
        .await
        .context("Server error")
}

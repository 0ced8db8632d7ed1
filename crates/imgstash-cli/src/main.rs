//! Imgstash CLI - entrypoint for the image store server

mod commands;

use clap::{Parser, Subcommand};
use commands::ServeCommand;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "IMGSTASH_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log format: compact, full
    #[arg(
        long,
        default_value = "compact",
        env = "IMGSTASH_LOG_FORMAT",
        global = true
    )]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve(ServeCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // If RUST_LOG is set, use it directly; otherwise run our crates at the
    // requested level and keep noisy dependencies at warn
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .expect("Invalid RUST_LOG environment variable")
    } else {
        tracing_subscriber::EnvFilter::new(format!(
            "imgstash_cli={level},\
             imgstash_core={level},\
             imgstash_storage={level},\
             imgstash_server={level},\
             tower=warn,\
             hyper=warn",
            level = cli.log_level
        ))
    };

    let fmt_layer = match cli.log_format.as_str() {
        "full" => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
        _ => tracing_subscriber::fmt::layer() // "compact" or any other value
            .compact()
            .with_target(false)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    let runtime = tokio::runtime::Runtime::new()?;
    match cli.command {
        Commands::Serve(cmd) => runtime.block_on(cmd.execute()),
    }
}

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sentinel_infrastructure::{AppConfig, CONFIG_PATH_ENV};

#[derive(Parser, Debug)]
#[command(name = "cybersentinel-backend")]
#[command(about = "CyberSentinel dashboard backend", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: Option<String>,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Write daily-rotated log files here instead of stdout
    #[arg(long, env = "SENTINEL_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP and live feed server (default)
    Serve,
    /// Load the seed dataset into the configured store
    Seed {
        /// Clear every table before seeding
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_logging(format: LogFormat, log_dir: Option<&str>) -> WorkerGuard {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (writer, guard) = match log_dir {
        Some(dir) => tracing_appender::non_blocking(tracing_appender::rolling::daily(
            dir,
            "cybersentinel.log",
        )),
        None => tracing_appender::non_blocking(std::io::stdout()),
    };

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(writer))
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true).with_writer(writer))
            .init(),
    }
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging(args.log_format, args.log_dir.as_deref());

    let config = match args.config.as_deref() {
        Some(path) => AppConfig::load_from(path).await?,
        None => AppConfig::load().await?,
    };

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => sentinel_bootstrap::run_standalone(config).await,
        Command::Seed { reset } => {
            let report = sentinel_bootstrap::run_seed(config, reset).await?;
            info!("seed finished: {}", serde_json::to_string(&report)?);
            Ok(())
        }
    }
}

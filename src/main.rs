use clap::Parser;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use ynab_mirror::args::Args;
use ynab_mirror::{AggregationService, Display, HostMessage, Mode, WidgetConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn main_inner(args: Args) -> anyhow::Result<()> {
    // This allows for running the widget without hitting the YNAB API. When
    // YNAB_MIRROR_IN_TEST_MODE is set and non-zero in length, then the mode will be
    // Mode::Test, otherwise it will be Mode::Live.
    let mode = Mode::from_env();

    let mut config = WidgetConfig::load(args.config()).await?;
    if let Some(token) = args.token() {
        config.token = token.to_string();
    }

    let (host_tx, host_rx) = mpsc::channel::<HostMessage>(8);
    let (widget_tx, widget_rx) = mpsc::channel(8);

    let service = AggregationService::new(mode, host_rx, widget_tx);
    let service_handle = tokio::spawn(service.run());
    let display_handle = tokio::spawn(Display::new(widget_rx).run(|markup| {
        println!("{markup}");
    }));

    host_tx.send(HostMessage::SetConfig(config)).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    host_tx.send(HostMessage::Cleanup).await?;
    drop(host_tx);

    service_handle.await?;
    display_handle.await?;
    Ok(())
}

/// Initializes the tracing subscriber.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

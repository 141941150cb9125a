use clap::Parser;
use jams_proto::config::Config;
use jams_proxy::ProxyState;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Relay between the jams terminal client and the recommendation backend.
#[derive(Debug, Parser)]
#[command(name = "jams-proxy", version)]
struct Args {
    /// Address to listen on (overrides `proxy.bind_address`).
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (overrides `proxy.port`).
    #[arg(long)]
    port: Option<u16>,

    /// Upstream backend base URL (overrides `proxy.upstream_url`).
    #[arg(long)]
    upstream: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup stderr + file logging
    let data_dir = jams_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("proxy.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,jams_proxy=debug")),
        )
        .init();

    info!("Log file: {:?}", log_path);

    let mut config = Config::load()?;
    info!("Config loaded from: {:?}", Config::config_path());

    if let Some(bind) = args.bind {
        config.proxy.bind_address = bind;
    }
    if let Some(port) = args.port {
        config.proxy.port = port;
    }
    if let Some(upstream) = args.upstream {
        config.proxy.upstream_url = upstream;
    }

    let state = ProxyState::from_config(&config.proxy)?;
    let listener = tokio::net::TcpListener::bind(config.proxy.listen_address()).await?;
    jams_proxy::serve(listener, state).await?;

    Ok(())
}

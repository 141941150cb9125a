use clap::Parser;
use jams_proto::config::Config;
use jams_proxy::ProxyState;
use jams_tui::{app::App, ProxyClient};

/// Find new music for a Spotify playlist from Reddit's recommendations.
#[derive(Debug, Parser)]
#[command(name = "jams", version)]
struct Args {
    /// Playlist link to pre-fill the input with.
    playlist_url: Option<String>,

    /// Proxy base URL (overrides `client.proxy_url`).
    #[arg(long)]
    proxy_url: Option<String>,

    /// Run the recommendation proxy inside this process.
    #[arg(long)]
    embedded: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let data_dir = jams_proto::platform::data_dir();
    let log_dir = match std::fs::create_dir_all(&data_dir) {
        Ok(()) => data_dir,
        Err(_) => jams_proto::platform::temp_dir(),
    };
    let log_path = log_dir.join("tui.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; keep connection-level DEBUG from the HTTP
    // client internals out of the log.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("jams log: {}", log_path.display());

    tracing::info!("jams starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = Config::load().unwrap_or_default();

    // ── In-process proxy ─────────────────────────────────────────────────────
    let proxy_url = if args.embedded {
        let state = ProxyState::from_config(&config.proxy)?;
        jams_proxy::start_server(config.proxy.bind_address.clone(), config.proxy.port, state);
        args.proxy_url
            .unwrap_or_else(|| format!("http://{}", config.proxy.listen_address()))
    } else {
        args.proxy_url.unwrap_or_else(|| config.client.proxy_url.clone())
    };

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let client = ProxyClient::new(&proxy_url, config.client.request_timeout())?;
    tracing::info!("using proxy at {}", client.endpoint());

    let app = App::new(client, args.playlist_url);
    app.run().await?;

    Ok(())
}

#[cfg(feature = "server")]
#[derive(clap::Parser, Debug)]
#[command(name = "docusphere", about = "Document search service")]
struct Cli {
    /// Path to the TOML settings file.
    #[arg(long, default_value = docusphere::config::DEFAULT_CONFIG_FILE)]
    config: std::path::PathBuf,

    /// Listen port, overriding the configured one.
    #[arg(long)]
    port: Option<u16>,
}

#[cfg(feature = "server")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use clap::Parser;
    use docusphere::app::{router, select_backend, AppState};
    use docusphere::config::Settings;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docusphere=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting DocuSphere search service...");

    let mut settings = Settings::load(&cli.config)?;
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    tracing::info!("Settings loaded (file: {})", cli.config.display());

    // Backend is chosen once and kept for the lifetime of the process
    let backend = select_backend(&settings).await?;
    let app = router(AppState::new(backend));

    let addr = settings.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

// Without the server stack only the library is useful.
#[cfg(not(feature = "server"))]
fn main() {
    eprintln!("docusphere was built without the `server` feature");
}

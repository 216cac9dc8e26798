use article_search::app::{AppContext, router};
use article_search::config::{Config, USAGE};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = match Config::from_env_and_args(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}\n\n{}", e, USAGE);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(if config.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    tracing::info!(
        "Starting article search (scorer={:?}, workers={})",
        config.scorer,
        config.workers
    );

    let ctx = AppContext::from_config(&config).await?;
    let app = router(ctx);

    tracing::info!("HTTP server listening on {}", config.bind);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! metrotube - video metadata retrieval from the command line.
//!
//! Loads settings and a captured session, then runs one content operation
//! over the internal API or the public pages.

mod cli;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before settings so METROTUBE_* overrides can come from it
    let _ = dotenvy::dotenv();

    let default_filter = if cli::is_verbose() {
        "metrotube=info,metrotube_scrape=info"
    } else {
        "metrotube=warn,metrotube_scrape=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    cli::run().await
}

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use wqdash::app::App;
use wqdash::config::Config;
use wqdash::credential::{self, CredentialResolver, TomlSecrets};
use wqdash::dataset::Dataset;
use wqdash::feeds::apod::HttpApodFetcher;
use wqdash::logging;

#[derive(Parser, Debug)]
#[command(name = "wqdash")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Water quality dashboard with a NASA Astronomy Picture of the Day tab", long_about = None)]
struct Cli {
    /// Path to config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the water quality CSV, overriding the config
    #[arg(short, long)]
    dataset: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dataset) = cli.dataset {
        config.dashboard.dataset = dataset;
    }

    logging::init(&config.logging)?;

    let dataset = Dataset::load(&config.dashboard.dataset, config.dashboard.delimiter)
        .with_context(|| {
            format!(
                "Failed to load dataset {}",
                config.dashboard.dataset.display()
            )
        })?;
    tracing::info!(
        rows = dataset.len(),
        columns = dataset.headers().len(),
        path = %config.dashboard.dataset.display(),
        "dataset loaded"
    );

    match credential::load_dotenv(None) {
        Ok(Some(path)) => tracing::info!(path = %path.display(), "loaded .env file"),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %format!("{:#}", e), "ignoring unreadable .env file"),
    }

    let credentials = CredentialResolver::new(Box::new(TomlSecrets::new(
        config.apod.secrets_path(),
    )));
    let fetcher = Arc::new(HttpApodFetcher::new());

    // Build views before taking over the terminal so dataset errors print normally.
    let app = App::new(config, dataset, fetcher, credentials)?;

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal).await;
    ratatui::restore();

    if let Err(e) = &result {
        tracing::error!(error = %format!("{:#}", e), "dashboard exited with an error");
    }
    result
}

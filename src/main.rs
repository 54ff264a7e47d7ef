use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubefetch::cli::{Cli, Commands};
use tubefetch::config::Config;
use tubefetch::extractors::{PlatformClient, YtDlpClient};
use tubefetch::service::ExtractionService;
use tubefetch::utils;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "tubefetch=debug,tower_http=debug"
    } else {
        "tubefetch=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            secret_key,
        } => {
            let config = config.with_overrides(host, port, secret_key)?;
            warn_missing_dependencies(&config).await;

            if config.server.secret_key == tubefetch::config::DEFAULT_SECRET_KEY {
                tracing::warn!("Using the default secret key; set SECRET_KEY in production");
            }

            let client = YtDlpClient::with_path(config.extractor.yt_dlp_path.clone());
            tracing::info!(
                "Extracting with {}, saving to {} and {}",
                client.platform_name(),
                config.storage.audio_dir.display(),
                config.storage.video_dir.display()
            );

            tubefetch::web::serve(config, Arc::new(client)).await?;
        }
        Commands::Fetch { url } => {
            warn_missing_dependencies(&config).await;

            let client = Arc::new(YtDlpClient::with_path(config.extractor.yt_dlp_path.clone()));
            let service = ExtractionService::new(client, config.storage.clone(), 1);

            let selection = service.resolve(url.trim()).await?;

            println!("Audio file: {} ({})", selection.audio.display(), file_size(&selection.audio));
            println!("Video file: {} ({})", selection.video.display(), file_size(&selection.video));
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                println!("Edit config.yaml in the working directory, or run `tubefetch config --show` to see the active values.");
            }
        }
    }

    Ok(())
}

async fn warn_missing_dependencies(config: &Config) {
    // Non-fatal: the tool may still be reachable when a request arrives
    let missing = utils::check_dependencies(&config.extractor.yt_dlp_path).await;
    for dep in missing {
        tracing::warn!("Dependency check warning: {}", dep);
    }
}

fn file_size(path: &std::path::Path) -> String {
    fs_err::metadata(path)
        .map(|meta| utils::format_file_size(meta.len()))
        .unwrap_or_else(|_| "size unknown".to_string())
}

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tubefetch",
    about = "tubefetch - Download the best audio and video streams from a video URL",
    version,
    long_about = "Runs a small web form that resolves a video-sharing URL through yt-dlp, saves the highest-bitrate audio stream and the highest-resolution progressive mp4 stream, and serves both back as downloads."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web front end
    Serve {
        /// Address to bind to
        #[arg(long, value_name = "HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "PORT", value_name = "PORT")]
        port: Option<u16>,

        /// Secret key used to sign flash message cookies
        #[arg(long, env = "SECRET_KEY", value_name = "KEY", hide_env_values = true)]
        secret_key: Option<String>,
    },

    /// Download audio and video for a single URL and print the saved paths
    Fetch {
        /// Video page URL
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Inspect the effective configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

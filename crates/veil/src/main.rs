use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;
use veil::common::{ResolvedConfig, SourceReference, resolve_source_type};
use veil::oembed::OEmbedClient;
use veil::{ConsentWidget, Page};

#[derive(Parser, Debug)]
#[command(author, version, about = "Render privacy-first embeds for third-party content")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the widget HTML for a reference
    Render {
        /// URL of the content to embed
        src: String,

        /// Provider (twitter, youtube, vimeo, mastodon); detected from the URL if omitted
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        /// YouTube frame width
        #[arg(long)]
        yt_width: Option<String>,

        /// YouTube frame height
        #[arg(long)]
        yt_height: Option<String>,

        /// CSS max-width of the widget
        #[arg(long)]
        max_width: Option<String>,

        /// Render as if the reader had opted in (performs the metadata lookup)
        #[arg(short = 'e', long)]
        expand: bool,

        /// Also print the page head (stylesheet, provider scripts)
        #[arg(long)]
        head: bool,

        /// JSON file with notice texts
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
    },
    /// Print the provider a URL resolves to
    Detect {
        /// URL to classify
        src: String,

        /// Explicit provider, validated instead of detected
        #[arg(short = 't', long = "type")]
        kind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_env_filter(EnvFilter::from_env("VEIL_LOG"))
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Detect { src, kind } => {
            let provider = resolve_source_type(&src, kind.as_deref())?;
            println!("{provider} ({})", provider.label());
        }
        Command::Render {
            src,
            kind,
            yt_width,
            yt_height,
            max_width,
            expand,
            head,
            config,
        } => {
            let config = match config {
                Some(path) => {
                    let json = tokio::fs::read_to_string(&path).await.into_diagnostic()?;
                    ResolvedConfig::from_json(&json).into_diagnostic()?
                }
                None => ResolvedConfig::default(),
            };
            let reference = SourceReference::new()
                .url(src)
                .maybe_explicit_type(kind)
                .maybe_width_override(yt_width)
                .maybe_height_override(yt_height)
                .maybe_max_width(max_width)
                .build();

            let page = Arc::new(Page::default());
            let metadata = OEmbedClient::new(reqwest::Client::new());
            let mut widget = ConsentWidget::new(page.clone(), config, reference, metadata).await?;
            if expand {
                widget.set_consent(true).await;
                if let Some(err) = widget.last_error() {
                    tracing::warn!(error = %err, "embed not shown");
                }
            }

            if head {
                println!("{}", page.head_html().await);
            }
            println!("{}", widget.to_html());
        }
    }

    Ok(())
}

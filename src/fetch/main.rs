//! Dataset downloader for the survey archive file share.
//!
//! Discovers direct-download URLs from the share's landing pages,
//! skips files already complete on disk (Content-Length check) and
//! streams the rest with a progress bar. Individual file failures are
//! logged and skipped; the batch keeps going.

mod manifest;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::manifest::Manifest;

#[derive(Parser, Debug)]
#[command(name = "fetch")]
#[command(about = "Download survey metadata, rasters and pre-extracted data")]
struct Args {
    /// Dataset manifest (TOML)
    #[arg(long, default_value = "datasets.toml")]
    manifest: PathBuf,

    /// Destination directory for all downloaded files
    #[arg(long, default_value = "data")]
    data: PathBuf,

    /// Download metadata for both presence-only and presence-absence data
    #[arg(long)]
    metadata: bool,

    /// Download complete raster datasets for the selected variables
    #[arg(long)]
    rasters: bool,

    /// Download pre-extracted data for the selected variables
    #[arg(long)]
    pre_extracted: bool,

    /// Restrict to presence-only occurrences
    #[arg(long)]
    presence_only: bool,

    /// Restrict to presence-absence surveys
    #[arg(long)]
    presence_absence: bool,

    /// Download cube archives instead of CSV files when available
    #[arg(long)]
    cube: bool,

    /// Variables of interest (repeatable)
    #[arg(long = "variable")]
    variables: Vec<String>,

    /// Select all variables, overriding individual selections
    #[arg(long)]
    all_variables: bool,
}

impl Args {
    fn wants_variable(&self, variable: &str) -> bool {
        self.all_variables || self.variables.iter().any(|v| v == variable)
    }
}

struct Fetcher {
    client: Client,
    raw_path_pattern: Regex,
    url_struct: String,
    data_dir: PathBuf,
}

impl Fetcher {
    fn new(url_struct: String, data_dir: PathBuf) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .user_agent("larkspur-fetch/0.1")
                .connect_timeout(std::time::Duration::from_secs(60))
                .build()
                .context("Failed to create HTTP client")?,
            raw_path_pattern: Regex::new(r"rawPath: '([^']+)'")?,
            url_struct,
            data_dir,
        })
    }

    /// Download one file, logging and swallowing any failure.
    async fn process_download(&self, file: &str) {
        match self.try_download(file).await {
            Ok(()) => {}
            Err(e) => warn!("Failed to download {}: {:#}", file, e),
        }
    }

    async fn try_download(&self, file: &str) -> Result<()> {
        let url = self.find_url(file).await?;
        info!("Downloading {} ({})", url, file);
        self.download_file(&url, &self.data_dir.join(file)).await
    }

    /// Scrape the direct-download URL from the share's landing page.
    async fn find_url(&self, file: &str) -> Result<String> {
        let page = self.url_struct.replace("{}", file);
        let body = self
            .client
            .get(&page)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        // The landing page inlines the raw path into a script block,
        // with dashes escaped as -.
        match self.raw_path_pattern.captures(&body) {
            Some(captures) => Ok(format!(
                "{}?raw=1",
                captures[1].replace("\\u002D", "-")
            )),
            None => bail!("Failed to find url for {file}"),
        }
    }

    async fn download_file(&self, url: &str, target: &Path) -> Result<()> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            bail!("Failed to download file: HTTP {}", response.status());
        }

        let total_size = response.content_length().unwrap_or(0);

        if let Ok(existing) = std::fs::metadata(target) {
            if total_size != 0 && existing.len() == total_size {
                info!("{} already downloaded and complete.", target.display());
                return Ok(());
            }
        }

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let pb = ProgressBar::new(total_size);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }

        let mut file = tokio::fs::File::create(target).await?;
        let mut written = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            pb.set_position(written);
        }
        file.flush().await?;
        pb.finish_and_clear();

        if total_size != 0 && written != total_size {
            bail!("Downloaded size does not match Content-Length");
        }

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let manifest = Manifest::load_from_file(&args.manifest)?;
    std::fs::create_dir_all(&args.data).context("Failed to create data directory")?;

    let fetcher = Fetcher::new(manifest.url_struct.clone(), args.data.clone())?;

    // Neither flag set means both survey kinds.
    let both_kinds = !(args.presence_only || args.presence_absence);

    if args.metadata {
        if args.presence_only || both_kinds {
            info!("Downloading presence-only metadata...");
            for file in &manifest.metadata.po {
                fetcher.process_download(file).await;
            }
        }
        if args.presence_absence || both_kinds {
            info!("Downloading presence-absence metadata...");
            for file in &manifest.metadata.pa {
                fetcher.process_download(file).await;
            }
        }
    }

    if args.rasters {
        for variable in &manifest.variables {
            if args.wants_variable(variable) {
                if let Some(file) = manifest.rasters.get(variable) {
                    info!("Downloading raster data for variable '{}'...", variable);
                    fetcher.process_download(file).await;
                }
            }
        }
    }

    if args.pre_extracted {
        for variable in &manifest.variables {
            if !args.wants_variable(variable) {
                continue;
            }
            if args.presence_only {
                if let Some(files) = manifest.presence_only.get(variable) {
                    info!(
                        "Downloading pre-extracted presence-only data for variable '{}'...",
                        variable
                    );
                    for file in files.select(args.cube) {
                        fetcher.process_download(file).await;
                    }
                }
            }
            if args.presence_absence {
                if let Some(files) = manifest.presence_absence.get(variable) {
                    info!(
                        "Downloading pre-extracted presence-absence data for variable '{}'...",
                        variable
                    );
                    for file in files.select(args.cube) {
                        fetcher.process_download(file).await;
                    }
                }
            }
        }
    }

    Ok(())
}

//! CLI runner - executes commands

use crate::api::{Credential, PocketClient, SavedItem};
use crate::auth::{AuthFlow, TokenCache};
use crate::checkpoint::{CheckpointStore, FileCheckpointStore};
use crate::cli::commands::{Cli, Commands, ExportFormat};
use crate::config::ExporterConfig;
use crate::driver::{CancelToken, DriverConfig, ExportDriver};
use crate::error::{Error, Result};
use crate::extract::{ArticleExtractor, ReadabilityExtractor};
use crate::http::{HttpClient, HttpClientConfig};
use crate::output::{write_json, write_markdown};
use crate::types::JsonValue;
use std::path::Path;
use tracing::info;
use url::Url;

/// How many extraction failures to echo at the end of a run
const MAX_REPORTED_FAILURES: usize = 10;

/// CLI runner
pub struct Runner {
    cli: Cli,
    config: ExporterConfig,
}

impl Runner {
    /// Create a runner, folding CLI overrides into the config
    pub fn new(cli: Cli) -> Self {
        let mut config = ExporterConfig::from_env();
        config.checkpoint_path = cli.checkpoint.clone();
        if let Some(path) = &cli.token_path {
            config.token_path = path.clone();
        }
        Self { cli, config }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Login { force } => self.login(*force).await,
            Commands::Export {
                format,
                outfile,
                outdir,
                batch,
                limit,
                no_extract,
            } => {
                self.export(*format, outfile, outdir, *batch, *limit, *no_extract)
                    .await
            }
            Commands::Status => self.status(),
            Commands::Reset => self.reset(),
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    async fn login(&self, force: bool) -> Result<()> {
        let cache = self.token_cache();
        self.auth_flow().acquire(&cache, force).await?;
        println!("Access token cached at {}", cache.path().display());
        Ok(())
    }

    async fn export(
        &self,
        format: ExportFormat,
        outfile: &Path,
        outdir: &Path,
        batch: u32,
        limit: Option<usize>,
        no_extract: bool,
    ) -> Result<()> {
        let token = self.auth_flow().acquire(&self.token_cache(), false).await?;

        let cancel = CancelToken::new();
        spawn_interrupt_handler(cancel.clone());

        let api = PocketClient::new(
            self.api_http(),
            Credential::new(&self.config.consumer_key, token),
        );
        let store = FileCheckpointStore::new(&self.config.checkpoint_path);
        let driver_config = DriverConfig::new()
            .with_page_size(batch)
            .with_stall_retry_delay(self.config.stall_retry_delay)
            .with_max_stall(self.config.max_stall);
        let mut driver = ExportDriver::new(api, store, driver_config);

        println!("Fetching items in batches of {batch}...");
        let run = match driver.run(&cancel).await {
            Ok(run) => run,
            Err(e) => {
                let offset = driver.store().read();
                eprintln!(
                    "Halted with partial progress saved (checkpoint at offset {offset}); \
                     rerun to resume."
                );
                return Err(e);
            }
        };

        let mut items = run.items;
        if let Some(limit) = limit {
            items.truncate(limit);
        }
        println!("Total items retrieved: {}", items.len());

        let (items, failures) = if no_extract {
            (items, Vec::new())
        } else {
            enrich(&ReadabilityExtractor::new(self.article_http()), items, &cancel).await?
        };

        if !no_extract {
            println!(
                "Extracted {} articles; {} failures.",
                items.len(),
                failures.len()
            );
            if !failures.is_empty() {
                println!("First few errors:");
                for message in failures.iter().take(MAX_REPORTED_FAILURES) {
                    println!("  - {message}");
                }
            }
        }

        match format {
            ExportFormat::Json => write_json(&items, outfile)?,
            ExportFormat::Md => write_markdown(&items, outdir)?,
        }

        println!("Export complete.");
        Ok(())
    }

    fn status(&self) -> Result<()> {
        let store = FileCheckpointStore::new(&self.config.checkpoint_path);
        let offset = store.read();
        if offset == 0 {
            println!("No checkpoint: the next export starts from the beginning.");
        } else {
            println!(
                "Checkpoint at offset {offset} with {} items spooled; the next export resumes there.",
                store.spooled_count()
            );
        }
        Ok(())
    }

    fn reset(&self) -> Result<()> {
        let mut store = FileCheckpointStore::new(&self.config.checkpoint_path);
        store.clear()?;
        println!("Checkpoint removed.");
        Ok(())
    }

    // ========================================================================
    // Wiring
    // ========================================================================

    fn token_cache(&self) -> TokenCache {
        TokenCache::new(&self.config.token_path)
    }

    fn auth_flow(&self) -> AuthFlow {
        AuthFlow::new(
            self.api_http(),
            &self.config.consumer_key,
            &self.config.redirect_uri,
            &self.config.api_base_url,
        )
    }

    /// Transport for the API host: generous timeout, JSON responses
    fn api_http(&self) -> HttpClient {
        HttpClient::with_config(
            HttpClientConfig::builder()
                .base_url(&self.config.api_base_url)
                .timeout(self.config.request_timeout)
                .max_retries(self.config.max_retries)
                .header("X-Accept", "application/json")
                .build(),
        )
    }

    /// Transport for article hosts: no base URL, lighter retry budget,
    /// no rate limiting (requests fan out across many unrelated hosts)
    fn article_http(&self) -> HttpClient {
        HttpClient::with_config(
            HttpClientConfig::builder()
                .timeout(self.config.request_timeout)
                .max_retries(2)
                .no_rate_limit()
                .build(),
        )
    }
}

/// Cancel the run on Ctrl-C, leaving the checkpoint for the next run
fn spawn_interrupt_handler(cancel: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupt received, stopping after the current attempt...");
            cancel.cancel();
        }
    });
}

/// Sequential enrichment pass: fetch and extract each item's article.
///
/// Items whose extraction fails are reported and dropped from the output,
/// matching the per-article failure isolation of the export contract.
pub async fn enrich(
    extractor: &dyn ArticleExtractor,
    items: Vec<SavedItem>,
    cancel: &CancelToken,
) -> Result<(Vec<SavedItem>, Vec<String>)> {
    let total = items.len();
    let mut enriched = Vec::with_capacity(total);
    let mut failures = Vec::new();

    for (index, mut item) in items.into_iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let Some(url) = item.url() else {
            failures.push(format!("{}: no URL", item.id().unwrap_or("unknown")));
            continue;
        };
        let parsed = match Url::parse(&url) {
            Ok(parsed) => parsed,
            Err(e) => {
                failures.push(format!("{url}: {e}"));
                continue;
            }
        };

        match extractor.extract(&parsed).await {
            Ok(article) => {
                item.insert("content_html", JsonValue::String(article.html));
                item.insert("content_text", JsonValue::String(article.text));
                enriched.push(item);
            }
            Err(e) => failures.push(format!("{url}: {e}")),
        }

        if (index + 1) % 10 == 0 || index + 1 == total {
            info!("extracted {}/{}", index + 1, total);
        }
    }

    Ok((enriched, failures))
}

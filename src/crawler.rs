use crate::config::ScraperConfig;
use crate::extract::extract_character_page;
use crate::harvest::harvest_page;
use crate::http_client::HttpClient;
use crate::models::{Character, ScrapeResult, ScrapeStats, SENTINEL};
use log::{error, info, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{sleep, Duration};

#[derive(Debug, Default, Serialize, Clone)]
pub struct CategoryProgress {
    pub name: String,
    pub links: usize,
    pub characters: usize,
}

/// Walks category listings and extracts every linked character page.
pub struct Crawler {
    client: Arc<HttpClient>,
    config: ScraperConfig,
}

impl Crawler {
    pub fn new(client: Arc<HttpClient>, config: ScraperConfig) -> Self {
        Self { client, config }
    }

    pub fn from_config(config: ScraperConfig) -> Result<Self, reqwest::Error> {
        let client = HttpClient::with_config(config.http_client_config())?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Character links listed on one category page.
    pub async fn category_links(&self, category: &str) -> Vec<String> {
        let url = self.config.category_url(category);
        match self.client.fetch_page(&url).await {
            Some(html) => harvest_page(&html, &self.config.base_url),
            None => {
                warn!("Could not fetch category {}", category);
                Vec::new()
            }
        }
    }

    /// Scrape one category, stopping after `limit` links when given.
    pub async fn scrape_category(&self, category: &str, limit: Option<usize>) -> (Vec<Character>, CategoryProgress) {
        let mut links = self.category_links(category).await;
        if let Some(limit) = limit {
            links.truncate(limit);
        }
        info!("Category {}: {} character links", category, links.len());

        let characters = self.scrape_links(&links).await;
        let progress = CategoryProgress {
            name: category.to_string(),
            links: links.len(),
            characters: characters.len(),
        };
        (characters, progress)
    }

    /// Fetch and extract pages in batches, keeping link order.
    ///
    /// At most `concurrent_limit` fetches run at once. Pages that fail to
    /// fetch or hold no card are skipped.
    pub async fn scrape_links(&self, links: &[String]) -> Vec<Character> {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrent_limit.max(1)));
        let batch_delay = Duration::from_millis(self.config.batch_delay_ms);
        let mut characters = Vec::with_capacity(links.len());

        for (batch_index, batch) in links.chunks(self.config.batch_size.max(1)).enumerate() {
            if batch_index > 0 && !batch_delay.is_zero() {
                sleep(batch_delay).await;
            }

            let mut tasks = JoinSet::new();
            for (index, url) in batch.iter().enumerate() {
                let client = Arc::clone(&self.client);
                let semaphore = Arc::clone(&semaphore);
                let url = url.clone();
                tasks.spawn(async move {
                    let _permit = semaphore.acquire_owned().await.ok()?;
                    let html = client.fetch_page(&url).await?;
                    match extract_character_page(&html) {
                        Some(character) => Some((index, character)),
                        None => {
                            warn!("No character card on {}", url);
                            None
                        }
                    }
                });
            }

            let mut extracted = Vec::with_capacity(batch.len());
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(Some(pair)) => extracted.push(pair),
                    Ok(None) => {}
                    Err(e) => error!("Page task failed: {}", e),
                }
            }
            extracted.sort_by_key(|(index, _)| *index);
            characters.extend(extracted.into_iter().map(|(_, character)| character));

            info!(
                "Batch {} done: {}/{} pages extracted",
                batch_index + 1,
                characters.len(),
                links.len()
            );
        }

        characters
    }

    /// Scrape every category, deduplicating characters listed more than once.
    pub async fn scrape_all(&self, categories: &[String], limit: Option<usize>) -> ScrapeResult {
        let started = Instant::now();
        let mut seen = HashSet::new();
        let mut characters = Vec::new();
        let mut processed = Vec::new();

        for category in categories {
            let remaining = limit.map(|l| l.saturating_sub(characters.len()));
            if remaining == Some(0) {
                break;
            }
            let (found, progress) = self.scrape_category(category, remaining).await;
            merge_unique(&mut characters, &mut seen, found);
            info!(
                "Category {} finished: {} of {} links extracted, {} characters total",
                progress.name,
                progress.characters,
                progress.links,
                characters.len()
            );
            processed.push(category.clone());
        }

        if let Some(limit) = limit {
            characters.truncate(limit);
        }

        let stats = ScrapeStats {
            total_characters: characters.len(),
            processing_time: started.elapsed().as_millis(),
            categories_processed: processed,
            errors: self.client.take_errors(),
        };
        info!(
            "Scrape finished: {} characters in {}ms, {} failed fetches",
            stats.total_characters,
            stats.processing_time,
            stats.errors.len()
        );
        ScrapeResult { characters, stats }
    }
}

/// Append characters whose id has not been seen yet.
///
/// Cards without an id cannot be matched up, so they are always kept.
pub fn merge_unique(into: &mut Vec<Character>, seen: &mut HashSet<String>, found: Vec<Character>) {
    for character in found {
        if character.id == SENTINEL {
            warn!(
                "Card {} ({}) has no id, keeping it without deduplication",
                character.name, character.title
            );
            into.push(character);
        } else if seen.insert(character.id.clone()) {
            into.push(character);
        }
    }
}

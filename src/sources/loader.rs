//! Domain List Loading
//!
//! Turns a list selection into the queue of `DomainEntry`s for a run. Fetch
//! failures never escape: every path ends in a usable list and a
//! `used_fallback` flag.
//!
//! Fallback chain for a failed source:
//! 1. local fallback list file (when configured and non-empty)
//! 2. hardcoded fallback list

use crate::core::debug_logger::get_debug_logger;
use crate::core::probe::types::{Category, DomainEntry};
use crate::sources::parsing::{filter_excluded, parse_domain_list};
use crate::sources::presets::{category_info, hardcoded_allowed_domains, hardcoded_fallback_domains};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

#[cfg(feature = "network-probes")]
use isahc::config::{Configurable, RedirectPolicy};
#[cfg(feature = "network-probes")]
use isahc::{AsyncReadResponseExt, HttpClient, Request};

/// List download timeout
pub const LIST_FETCH_TIMEOUT_SECS: u64 = 15;

/// Why a list source could not be used
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP {status}: {url}")]
    Status { status: u16, url: String },
    #[error("failed to fetch {url}: {message}")]
    Transport { url: String, message: String },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no usable domains in {0}")]
    Empty(String),
}

/// Raw text download of a list
#[async_trait::async_trait]
pub trait ListFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, SourceError>;
}

/// Production list fetcher using isahc
#[cfg(feature = "network-probes")]
pub struct IsahcListFetcher {
    client: HttpClient,
}

#[cfg(feature = "network-probes")]
impl IsahcListFetcher {
    pub fn new() -> Result<Self, SourceError> {
        let client = HttpClient::builder()
            .redirect_policy(RedirectPolicy::Limit(5))
            .timeout(std::time::Duration::from_secs(LIST_FETCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| SourceError::Transport {
                url: String::new(),
                message: format!("Failed to create list client: {}", e),
            })?;
        Ok(Self { client })
    }
}

#[cfg(feature = "network-probes")]
#[async_trait::async_trait]
impl ListFetcher for IsahcListFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, SourceError> {
        let transport = |message: String| SourceError::Transport {
            url: url.to_string(),
            message,
        };

        let request = Request::get(url)
            .header("Cache-Control", "no-store")
            .body(())
            .map_err(|e| transport(e.to_string()))?;

        let mut response = self
            .client
            .send_async(request)
            .await
            .map_err(|e| transport(e.to_string()))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(SourceError::Status {
                status,
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| transport(format!("Failed to read list body: {}", e)))
    }
}

/// Fetcher for builds without network support; every download fails
#[derive(Default)]
pub struct OfflineListFetcher;

#[async_trait::async_trait]
impl ListFetcher for OfflineListFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, SourceError> {
        Err(SourceError::Transport {
            url: url.to_string(),
            message: "built without network-probes support".to_string(),
        })
    }
}

/// Default fetcher for this build
pub fn default_list_fetcher() -> Result<Arc<dyn ListFetcher>, SourceError> {
    #[cfg(feature = "network-probes")]
    {
        Ok(Arc::new(IsahcListFetcher::new()?))
    }
    #[cfg(not(feature = "network-probes"))]
    {
        Ok(Arc::new(OfflineListFetcher))
    }
}

/// Which list(s) a run checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSelection {
    /// Balanced mix of category sources; empty means all categories
    Categories(Vec<Category>),
    /// One list; a non-blank custom URL beats the preset URL
    Single {
        preset_url: Option<String>,
        custom_url: Option<String>,
        category: Option<Category>,
    },
}

/// Loader output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedList {
    pub entries: Vec<DomainEntry>,
    pub used_fallback: bool,
}

impl LoadedList {
    pub fn lists_loaded(&self) -> bool {
        !self.used_fallback
    }
}

/// Loads and balances domain lists
pub struct DomainListLoader {
    fetcher: Arc<dyn ListFetcher>,
    fallback_list_path: Option<PathBuf>,
    allowed_list_path: Option<PathBuf>,
}

impl DomainListLoader {
    pub fn new(fetcher: Arc<dyn ListFetcher>) -> Self {
        Self {
            fetcher,
            fallback_list_path: None,
            allowed_list_path: None,
        }
    }

    pub fn with_fallback_list(mut self, path: Option<PathBuf>) -> Self {
        self.fallback_list_path = path;
        self
    }

    pub fn with_allowed_list(mut self, path: Option<PathBuf>) -> Self {
        self.allowed_list_path = path;
        self
    }

    pub async fn load(&self, selection: &ListSelection, limit: usize) -> LoadedList {
        let loaded = match selection {
            ListSelection::Categories(categories) => self.load_categories(categories, limit).await,
            ListSelection::Single {
                preset_url,
                custom_url,
                category,
            } => {
                self.load_single(preset_url.as_deref(), custom_url.as_deref(), *category, limit)
                    .await
            }
        };

        get_debug_logger().list_source(
            match selection {
                ListSelection::Categories(_) => "categories",
                ListSelection::Single { .. } => "single",
            },
            loaded.entries.len(),
            loaded.used_fallback,
        );

        loaded
    }

    /// Download, parse and filter one list
    pub async fn fetch_list(&self, url: &str) -> Result<Vec<String>, SourceError> {
        let text = self.fetcher.fetch_text(url).await?;
        Ok(filter_excluded(parse_domain_list(&text)))
    }

    /// Per-category quota of `max(1, limit / |categories|)`, de-duplicated across categories
    pub async fn load_categories(&self, categories: &[Category], limit: usize) -> LoadedList {
        let categories: Vec<Category> = if categories.is_empty() {
            Category::ALL.to_vec()
        } else {
            categories.to_vec()
        };

        let per_category = (limit / categories.len()).max(1);
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        let mut used_fallback = false;

        for category in categories {
            if entries.len() >= limit {
                break;
            }
            let take = per_category.min(limit - entries.len());

            let domains = match category_info(category).url() {
                None => self.allowed_domains().await,
                Some(url) => match self.fetch_list(&url).await {
                    Ok(domains) => domains,
                    Err(e) => {
                        get_debug_logger().error_sync(
                            "ListLoader",
                            "category_fetch_failed",
                            &format!("{}: {}", category, e),
                        );
                        used_fallback = true;
                        let mut fallback = filter_excluded(self.fallback_domains().await);
                        fallback.truncate(take);
                        fallback
                    }
                },
            };

            let mut added = 0;
            for domain in domains {
                if added >= take || entries.len() >= limit {
                    break;
                }
                if !seen.insert(domain.clone()) {
                    continue;
                }
                entries.push(DomainEntry::new(domain, Some(category)));
                added += 1;
            }
        }

        entries.truncate(limit);
        LoadedList {
            entries,
            used_fallback,
        }
    }

    /// Single list with fallback to the default list on failure or emptiness
    pub async fn load_single(
        &self,
        preset_url: Option<&str>,
        custom_url: Option<&str>,
        category: Option<Category>,
        limit: usize,
    ) -> LoadedList {
        let custom = custom_url.map(str::trim).filter(|u| !u.is_empty());
        let url = custom.or(preset_url);
        // A custom URL carries no category
        let category = if custom.is_some() { None } else { category };

        if let Some(url) = url {
            let fetched = match self.fetch_list(url).await {
                Ok(domains) if domains.is_empty() => Err(SourceError::Empty(url.to_string())),
                other => other,
            };
            match fetched {
                Ok(domains) => {
                    return LoadedList {
                        entries: to_entries(domains, category, limit),
                        used_fallback: false,
                    };
                }
                Err(e) => get_debug_logger().error_sync(
                    "ListLoader",
                    "list_fetch_failed",
                    &e.to_string(),
                ),
            }
        }

        let fallback = filter_excluded(self.fallback_domains().await);
        LoadedList {
            entries: to_entries(fallback, None, limit),
            used_fallback: true,
        }
    }

    /// Local fallback list, else the hardcoded one
    pub async fn fallback_domains(&self) -> Vec<String> {
        match read_local_list(self.fallback_list_path.as_ref()).await {
            Some(domains) => domains,
            None => hardcoded_fallback_domains(),
        }
    }

    /// Local allowed list, else the hardcoded one
    pub async fn allowed_domains(&self) -> Vec<String> {
        let domains = match read_local_list(self.allowed_list_path.as_ref()).await {
            Some(domains) => domains,
            None => hardcoded_allowed_domains(),
        };
        filter_excluded(domains)
    }
}

fn to_entries(domains: Vec<String>, category: Option<Category>, limit: usize) -> Vec<DomainEntry> {
    domains
        .into_iter()
        .take(limit)
        .map(|d| DomainEntry::new(d, category))
        .collect()
}

/// Parsed local list; `None` when unset, unreadable or empty
async fn read_local_list(path: Option<&PathBuf>) -> Option<Vec<String>> {
    let path = path?;
    match tokio::fs::read_to_string(path).await {
        Ok(text) => {
            let domains = parse_domain_list(&text);
            (!domains.is_empty()).then_some(domains)
        }
        Err(source) => {
            let error = SourceError::Io {
                path: path.clone(),
                source,
            };
            get_debug_logger().error_sync("ListLoader", "local_list_failed", &error.to_string());
            None
        }
    }
}

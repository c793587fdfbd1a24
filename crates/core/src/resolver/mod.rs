//! Episode title to source URL resolution.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::provider::{MediaProvider, SearchRequest};
use crate::reconciler::{MatchedSeries, NeededEpisode};

/// Outcome of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(String),
    NotFound,
}

/// Per-series search settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Walk the source newest-first.
    pub playlist_reverse: bool,
    pub cookie_file: Option<PathBuf>,
}

/// Escapes a title so it only matches itself.
pub fn literal_pattern(title: &str) -> String {
    regex_lite::escape(title)
}

/// Title to search the source for: the episode title after the series'
/// source-side rewrite.
pub fn search_title(series: &MatchedSeries, episode: &NeededEpisode) -> String {
    match &series.site_rewrite {
        Some(rewrite) => rewrite.apply(&episode.title),
        None => episode.title.clone(),
    }
}

/// Looks episode titles up through a provider.
pub struct SearchResolver {
    provider: Arc<dyn MediaProvider>,
}

impl SearchResolver {
    pub fn new(provider: Arc<dyn MediaProvider>) -> Self {
        Self { provider }
    }

    /// Finds the first source entry titled `title`.
    ///
    /// Shorts are always excluded. Provider errors are logged and reported as
    /// [`Resolution::NotFound`], as is an entry pointing back at `source_url`.
    pub async fn resolve_episode_url(
        &self,
        title: &str,
        source_url: &str,
        options: &ResolveOptions,
    ) -> Resolution {
        let request = SearchRequest::new(source_url, literal_pattern(title))
            .with_reverse_order(options.playlist_reverse)
            .with_cookie_file(options.cookie_file.clone());

        debug!(
            "Searching {} for '{}' via {}",
            source_url,
            title,
            self.provider.name()
        );

        match self.provider.search(&request).await {
            Ok(Some(url)) if url == source_url => {
                debug!("Search for '{}' only matched the source itself", title);
                Resolution::NotFound
            }
            Ok(Some(url)) => Resolution::Found(url),
            Ok(None) => Resolution::NotFound,
            Err(e) => {
                warn!("Search for '{}' in {} failed: {}", title, source_url, e);
                Resolution::NotFound
            }
        }
    }
}

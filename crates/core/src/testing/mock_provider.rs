//! Mock provider for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::provider::{DownloadOptions, MediaProvider, ProviderError, SearchRequest};

/// A recorded download for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedDownload {
    pub url: String,
    pub options: DownloadOptions,
}

/// In-memory implementation of [`MediaProvider`].
///
/// Search results are keyed by title pattern; unknown patterns find nothing.
/// Download results are consumed in order and default to success once the
/// queue is empty. Errors are stored as messages and rebuilt as
/// [`ProviderError::CommandFailed`].
#[derive(Debug, Default)]
pub struct MockProvider {
    search_results: Arc<RwLock<HashMap<String, Result<Option<String>, String>>>>,
    download_results: Arc<RwLock<VecDeque<Result<(), String>>>>,
    searches: Arc<RwLock<Vec<SearchRequest>>>,
    downloads: Arc<RwLock<Vec<RecordedDownload>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets what a search for `pattern` returns.
    pub async fn set_search_result(
        &self,
        pattern: &str,
        result: Result<Option<String>, ProviderError>,
    ) {
        self.search_results
            .write()
            .await
            .insert(pattern.to_string(), result.map_err(|e| e.to_string()));
    }

    /// Queues the result of the next unanswered download.
    pub async fn push_download_result(&self, result: Result<(), ProviderError>) {
        self.download_results
            .write()
            .await
            .push_back(result.map_err(|e| e.to_string()));
    }

    pub async fn recorded_searches(&self) -> Vec<SearchRequest> {
        self.searches.read().await.clone()
    }

    pub async fn recorded_downloads(&self) -> Vec<RecordedDownload> {
        self.downloads.read().await.clone()
    }

    pub async fn download_count(&self) -> usize {
        self.downloads.read().await.len()
    }
}

#[async_trait]
impl MediaProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Option<String>, ProviderError> {
        self.searches.write().await.push(request.clone());
        match self.search_results.read().await.get(&request.title_pattern) {
            Some(Ok(url)) => Ok(url.clone()),
            Some(Err(message)) => Err(ProviderError::failed(message.clone())),
            None => Ok(None),
        }
    }

    async fn download(&self, url: &str, options: &DownloadOptions) -> Result<(), ProviderError> {
        self.downloads.write().await.push(RecordedDownload {
            url: url.to_string(),
            options: options.clone(),
        });
        match self.download_results.write().await.pop_front() {
            Some(Err(message)) => Err(ProviderError::failed(message)),
            Some(Ok(())) | None => Ok(()),
        }
    }
}

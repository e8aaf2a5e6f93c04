//! Lookup orchestration: discovery, sense enrichment, section dispatch and
//! the full-word batch.

pub mod discovery;
pub mod dispatcher;
pub mod enrichment;
mod fanout;
pub mod full;
pub mod granular;
pub mod resolve;

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, EnrichmentConfig};
use crate::error::LookupError;
use crate::llm::gateway::{HttpCompletionBackend, ModelGateway};
use crate::sources::bilibili::BilibiliClient;
use crate::sources::dictionary::{DictionaryApi, DictionarySource};
use crate::video::VideoMatcher;

/// Longest accepted headword, in characters.
pub const MAX_WORD_CHARS: usize = 64;

/// Everything a lookup needs. Built once at start-up and shared.
pub struct DictionaryService {
    pub(crate) gateway: ModelGateway,
    pub(crate) source: Arc<dyn DictionarySource>,
    pub(crate) videos: VideoMatcher,
    pub(crate) enrichment: EnrichmentConfig,
}

impl DictionaryService {
    pub fn new(
        gateway: ModelGateway,
        source: Arc<dyn DictionarySource>,
        videos: VideoMatcher,
        enrichment: EnrichmentConfig,
    ) -> Self {
        Self {
            gateway,
            source,
            videos,
            enrichment,
        }
    }

    /// Wire the HTTP implementations of every collaborator.
    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        let gateway = ModelGateway::new(
            Arc::new(HttpCompletionBackend::new(client.clone(), config.llm.clone())),
            config.tiers.clone(),
        );
        let source = Arc::new(DictionaryApi::new(client.clone(), config.dictionary.clone()));
        let videos = VideoMatcher::new(
            Arc::new(BilibiliClient::new(client, config.video.clone())),
            gateway.clone(),
            config.video.clone(),
        );
        Self::new(gateway, source, videos, config.enrichment.clone())
    }

    pub(crate) fn sense_deadline(&self) -> Duration {
        Duration::from_secs(self.enrichment.sense_timeout_secs)
    }

    pub(crate) fn batch_deadline(&self) -> Duration {
        Duration::from_secs(self.enrichment.batch_timeout_secs)
    }
}

/// Trim and check a client-supplied word.
pub fn validate_word(word: Option<&str>) -> Result<String, LookupError> {
    let word = word.map(str::trim).unwrap_or_default();
    if word.is_empty() {
        return Err(LookupError::validation("word is required"));
    }
    let chars = word.chars().count();
    if chars > MAX_WORD_CHARS {
        return Err(LookupError::validation(format!(
            "word is too long ({chars} characters, at most {MAX_WORD_CHARS})"
        )));
    }
    Ok(word.to_string())
}

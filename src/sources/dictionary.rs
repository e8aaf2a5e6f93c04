//! Free dictionary API adapter (dictionaryapi.dev response shape).
//!
//! One attempt per lookup. Any non-200, empty array, timeout or transport
//! error comes back as a failure value; the caller decides what to do next.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::DictionaryApiConfig;

/// Raw entry as returned by the API. Kept verbatim; normalization happens in
/// the discovery stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawEntry {
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub phonetics: Vec<RawPhonetic>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub meanings: Vec<RawMeaning>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawPhonetic {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub audio: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawMeaning {
    #[serde(rename = "partOfSpeech", default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<RawDefinition>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawDefinition {
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
}

/// Outcome of a dictionary fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceResult {
    Found(Vec<RawEntry>),
    Failed(String),
}

/// Source of raw dictionary entries.
#[async_trait]
pub trait DictionarySource: Send + Sync {
    async fn fetch(&self, word: &str) -> SourceResult;
}

/// HTTP client for the free dictionary API.
pub struct DictionaryApi {
    client: reqwest::Client,
    config: DictionaryApiConfig,
}

impl DictionaryApi {
    pub fn new(client: reqwest::Client, config: DictionaryApiConfig) -> Self {
        Self { client, config }
    }

    async fn try_fetch(&self, word: &str) -> Result<SourceResult> {
        let mut url = reqwest::Url::parse(&self.config.base_url)
            .context("Invalid dictionary API base URL")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Dictionary API base URL cannot take path segments"))?
            .push(word);

        let resp = self
            .client
            .get(url)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await;

        let resp = match resp {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                return Ok(SourceResult::Failed("API request timeout".to_string()))
            }
            Err(e) => return Err(e).context("Failed to call dictionary API"),
        };

        if !resp.status().is_success() {
            return Ok(SourceResult::Failed(format!(
                "API returned status {}",
                resp.status().as_u16()
            )));
        }

        let entries: Vec<RawEntry> = resp
            .json()
            .await
            .context("Failed to parse dictionary API response")?;

        if entries.is_empty() {
            return Ok(SourceResult::Failed("API returned no entries".to_string()));
        }
        Ok(SourceResult::Found(entries))
    }
}

#[async_trait]
impl DictionarySource for DictionaryApi {
    async fn fetch(&self, word: &str) -> SourceResult {
        match self.try_fetch(word).await {
            Ok(result) => {
                if let SourceResult::Failed(reason) = &result {
                    tracing::info!("Dictionary API miss for '{word}': {reason}");
                }
                result
            }
            Err(e) => {
                tracing::warn!("Dictionary API error for '{word}': {e:#}");
                SourceResult::Failed(format!("{e:#}"))
            }
        }
    }
}

// ─── Pronunciation ───────────────────────────────────────

/// Pick the pronunciation for an entry, in order of preference:
/// UK audio, US audio, any audio, first phonetic text, top-level phonetic.
pub fn extract_pronunciation(entry: &RawEntry) -> Option<String> {
    let audios = || {
        entry
            .phonetics
            .iter()
            .filter_map(|p| non_empty(p.audio.as_deref()))
    };

    audios()
        .find(|a| has_region_marker(a, "uk"))
        .or_else(|| audios().find(|a| has_region_marker(a, "us")))
        .or_else(|| audios().next())
        .or_else(|| first_phonetic_text(entry))
        .or_else(|| non_empty(entry.phonetic.as_deref()))
        .map(str::to_string)
}

/// Phonetic transcription: first non-empty text, else the top-level field.
pub fn extract_ipa(entry: &RawEntry) -> String {
    first_phonetic_text(entry)
        .or_else(|| non_empty(entry.phonetic.as_deref()))
        .unwrap_or_default()
        .to_string()
}

fn first_phonetic_text(entry: &RawEntry) -> Option<&str> {
    entry
        .phonetics
        .iter()
        .find_map(|p| non_empty(p.text.as_deref()))
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// True when the audio file name carries the region as a separate token,
/// e.g. `hello-uk.mp3` or `uk-1.mp3`.
fn has_region_marker(audio_url: &str, region: &str) -> bool {
    let file_name = audio_url.rsplit('/').next().unwrap_or(audio_url);
    file_name
        .split(['-', '_', '.'])
        .any(|token| token.eq_ignore_ascii_case(region))
}

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// LLM provider configuration
    pub llm: LlmConfig,
    /// Token and timeout budgets per task tier
    pub tiers: TierConfig,
    /// Free dictionary API
    pub dictionary: DictionaryApiConfig,
    /// Fan-out deadlines and pool sizing
    pub enrichment: EnrichmentConfig,
    /// Video platform search and subtitle probing
    pub video: VideoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai" (any OpenAI-compatible API, e.g. DeepSeek) or "ollama"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Model name for structured completions
    pub chat_model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            base_url: "https://api.deepseek.com".to_string(),
            chat_model: "deepseek-chat".to_string(),
            api_key: None,
        }
    }
}

/// Resource allocation for one class of model task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierBudget {
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl TierBudget {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Model task tiers. Cheap tasks get small budgets so they never hold up a
/// fan-out that also contains expensive tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Frequency, word family, phrase generation, core sense metadata
    Simple,
    /// Etymology, usage context, cultural notes, examples, usage notes
    Medium,
    /// Related words (synonyms, antonyms, phrases) for one sense
    Complex,
    /// Ab initio sense discovery when the dictionary API has nothing
    Discovery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierConfig {
    pub simple: TierBudget,
    pub medium: TierBudget,
    pub complex: TierBudget,
    pub discovery: TierBudget,
}

impl TierConfig {
    pub fn budget(&self, tier: Tier) -> TierBudget {
        match tier {
            Tier::Simple => self.simple,
            Tier::Medium => self.medium,
            Tier::Complex => self.complex,
            Tier::Discovery => self.discovery,
        }
    }
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            simple: TierBudget {
                max_tokens: 256,
                timeout_secs: 45,
            },
            medium: TierBudget {
                max_tokens: 512,
                timeout_secs: 45,
            },
            complex: TierBudget {
                max_tokens: 600,
                timeout_secs: 30,
            },
            discovery: TierBudget {
                max_tokens: 1024,
                timeout_secs: 45,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryApiConfig {
    /// Entries endpoint; the word is appended as a path segment
    pub base_url: String,
    /// Single-attempt request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for DictionaryApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.dictionaryapi.dev/api/v2/entries/en".to_string(),
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Deadline for the sub-tasks of one sense enrichment
    pub sense_timeout_secs: u64,
    /// Deadline for a full-word batch (granular info + every sense)
    pub batch_timeout_secs: u64,
    /// Upper bound on concurrent tasks in a full-word batch
    pub max_workers: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            sense_timeout_secs: 45,
            batch_timeout_secs: 60,
            max_workers: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Bilibili web API base URL
    pub base_url: String,
    /// SESSDATA cookie; subtitles are often unavailable without it
    pub sessdata: Option<String>,
    /// Maximum number of ranked candidates probed for subtitles
    pub probe_limit: usize,
    pub min_views: u64,
    pub min_favorites: u64,
    /// Candidates scoring below this are dropped
    pub min_score: f64,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.bilibili.com".to_string(),
            sessdata: None,
            probe_limit: 50,
            min_views: 1_000,
            min_favorites: 10,
            min_score: 0.01,
            timeout_secs: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            llm: LlmConfig::default(),
            tiers: TierConfig::default(),
            dictionary: DictionaryApiConfig::default(),
            enrichment: EnrichmentConfig::default(),
            video: VideoConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("LEXISCOPE_BIND_ADDR") {
            config.bind_addr = addr;
        }

        // LLM provider
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY").or_else(|_| std::env::var("DEEPSEEK_API_KEY")) {
            config.llm.api_key = Some(key);
        }

        // Tier budgets
        override_budget(&mut config.tiers.simple, "LLM_SIMPLE");
        override_budget(&mut config.tiers.medium, "LLM_MEDIUM");
        override_budget(&mut config.tiers.complex, "LLM_COMPLEX");
        override_budget(&mut config.tiers.discovery, "LLM_DISCOVERY");

        // Dictionary API
        if let Ok(url) = std::env::var("DICTIONARY_API_BASE") {
            config.dictionary.base_url = url;
        }
        if let Ok(val) = std::env::var("DICTIONARY_API_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.dictionary.timeout_secs = v;
            }
        }

        // Enrichment fan-out
        if let Ok(val) = std::env::var("ENRICHMENT_SENSE_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.enrichment.sense_timeout_secs = v;
            }
        }
        if let Ok(val) = std::env::var("ENRICHMENT_BATCH_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.enrichment.batch_timeout_secs = v;
            }
        }
        if let Ok(val) = std::env::var("ENRICHMENT_MAX_WORKERS") {
            if let Ok(v) = val.parse::<usize>() {
                config.enrichment.max_workers = v.max(1);
            }
        }

        // Video platform
        if let Ok(url) = std::env::var("BILIBILI_API_BASE") {
            config.video.base_url = url;
        }
        if let Ok(sessdata) = std::env::var("BILIBILI_SESSDATA") {
            if !sessdata.is_empty() {
                config.video.sessdata = Some(sessdata);
            }
        }
        if let Ok(val) = std::env::var("VIDEO_PROBE_LIMIT") {
            if let Ok(v) = val.parse() {
                config.video.probe_limit = v;
            }
        }

        config
    }
}

/// Apply `{PREFIX}_MAX_TOKENS` / `{PREFIX}_TIMEOUT_SECS` overrides to a tier.
fn override_budget(budget: &mut TierBudget, prefix: &str) {
    if let Ok(val) = std::env::var(format!("{prefix}_MAX_TOKENS")) {
        if let Ok(v) = val.parse() {
            budget.max_tokens = v;
        }
    }
    if let Ok(val) = std::env::var(format!("{prefix}_TIMEOUT_SECS")) {
        if let Ok(v) = val.parse() {
            budget.timeout_secs = v;
        }
    }
}

//! Entry-level sections. Each is one model call; a failed call degrades to
//! the section's default value rather than failing the lookup.

use crate::config::Tier;
use crate::error::TaskResult;
use crate::llm::gateway::ModelGateway;
use crate::llm::prompts;
use crate::models::{
    CulturalNotesInfo, EtymologyInfo, Frequency, FrequencyInfo, UsageContextInfo, WordEntry,
    WordFamilyInfo,
};

/// What the entry-level prompts know about the entry being described.
#[derive(Debug, Clone, Default)]
pub struct EntryContext {
    /// Sense summary, set only when the word has several entries.
    pub hint: Option<String>,
    pub origin: Option<String>,
}

impl EntryContext {
    pub fn for_entry(entry: &WordEntry, total_entries: usize) -> Self {
        Self {
            hint: (total_entries > 1).then(|| entry.pos_summary()),
            origin: entry.origin.clone(),
        }
    }

    /// Context for the word as a whole: no anchoring, first recorded origin.
    pub fn whole_word(entries: &[WordEntry]) -> Self {
        Self {
            hint: None,
            origin: entries.iter().find_map(|e| e.origin.clone()),
        }
    }
}

/// Unwrap a section result, logging and defaulting on failure.
pub fn or_default<T: Default>(result: TaskResult<T>) -> T {
    result.unwrap_or_else(|failure| {
        tracing::warn!("Using default for {failure}");
        T::default()
    })
}

pub async fn etymology(gateway: &ModelGateway, word: &str, ctx: &EntryContext) -> TaskResult<EtymologyInfo> {
    let prompt = prompts::etymology_prompt(word, ctx.hint.as_deref(), ctx.origin.as_deref());
    gateway.complete("etymology", prompt, Tier::Medium).await
}

pub async fn word_family(gateway: &ModelGateway, word: &str, ctx: &EntryContext) -> TaskResult<Vec<String>> {
    let prompt = prompts::word_family_prompt(word, ctx.hint.as_deref());
    let info: WordFamilyInfo = gateway.complete("word_family", prompt, Tier::Simple).await?;
    Ok(info
        .word_family
        .into_iter()
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty())
        .collect())
}

pub async fn usage_context(
    gateway: &ModelGateway,
    word: &str,
    ctx: &EntryContext,
) -> TaskResult<UsageContextInfo> {
    let prompt = prompts::usage_context_prompt(word, ctx.hint.as_deref());
    gateway.complete("usage_context", prompt, Tier::Medium).await
}

pub async fn cultural_notes(
    gateway: &ModelGateway,
    word: &str,
    ctx: &EntryContext,
) -> TaskResult<CulturalNotesInfo> {
    let prompt = prompts::cultural_notes_prompt(word, ctx.hint.as_deref());
    gateway.complete("cultural_notes", prompt, Tier::Medium).await
}

pub async fn frequency(gateway: &ModelGateway, word: &str, ctx: &EntryContext) -> TaskResult<Frequency> {
    let prompt = prompts::frequency_prompt(word, ctx.hint.as_deref());
    let info: FrequencyInfo = gateway.complete("frequency", prompt, Tier::Simple).await?;
    Ok(info.frequency)
}

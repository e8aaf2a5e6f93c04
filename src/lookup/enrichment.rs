//! Sense enrichment: turn a [`SenseStub`] into a [`DetailedSense`].
//!
//! Two model tasks run concurrently under one deadline:
//!
//! - `sense_core` (simple tier): part of speech, register, domain, tone
//! - `sense_related` (complex tier): synonyms, antonyms, phrases
//!
//! Ground-truth synonyms and antonyms always come first; the model only
//! fills the gap up to three. The definition is never model output.

use std::collections::HashSet;
use std::time::Duration;

use crate::config::Tier;
use crate::error::{LookupError, TaskFailure};
use crate::llm::gateway::ModelGateway;
use crate::llm::prompts::{self, SenseContext};
use crate::llm::schemas::{SenseCoreMetadata, SenseExamples, SenseRelatedWords, SenseUsageNotes};
use crate::lookup::fanout::TaskScope;
use crate::models::{DetailedSense, SenseStub};

/// Items per related-word list, and examples per sense.
pub const LIST_TARGET: usize = 3;

/// How many generated items are still needed to reach `target`.
pub fn needed(target: usize, have: usize) -> usize {
    target.saturating_sub(have)
}

/// Ground truth first, verbatim and in order. Generated items fill the
/// remaining slots, skipping blanks and case-insensitive duplicates. The
/// result is exactly `target` long, padded with empty strings.
pub fn merge_ranked(ground: &[String], generated: &[String], target: usize) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<String> = Vec::with_capacity(target);

    for item in ground {
        seen.insert(item.trim().to_lowercase());
        out.push(item.clone());
    }
    for item in generated {
        let trimmed = item.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            out.push(trimmed.to_string());
        }
    }

    pad_to(out, target)
}

/// Truncate or pad with empty strings to exactly `target` items.
pub fn pad_to(mut items: Vec<String>, target: usize) -> Vec<String> {
    items.truncate(target);
    items.resize(target, String::new());
    items
}

/// Combine the two task outputs with the ground truth.
pub fn merge_detailed(
    stub: &SenseStub,
    part_of_speech: &str,
    core: SenseCoreMetadata,
    related: SenseRelatedWords,
) -> DetailedSense {
    let part_of_speech = if part_of_speech.trim().is_empty() {
        core.part_of_speech
    } else {
        part_of_speech.to_string()
    };

    DetailedSense {
        definition: stub.definition.clone(),
        part_of_speech,
        usage_register: core.usage_register,
        domain: core.domain,
        tone: core.tone,
        synonyms: merge_ranked(&stub.synonyms, &related.synonyms, LIST_TARGET),
        antonyms: merge_ranked(&stub.antonyms, &related.antonyms, LIST_TARGET),
        word_specific_phrases: merge_ranked(&[], &related.word_specific_phrases, LIST_TARGET),
    }
}

/// Enrich one sense. Both tasks must succeed; otherwise every failed task
/// is reported.
pub async fn enrich_sense(
    gateway: &ModelGateway,
    word: &str,
    part_of_speech: &str,
    stub: &SenseStub,
    deadline: Duration,
) -> Result<DetailedSense, LookupError> {
    let sense = SenseContext {
        part_of_speech,
        definition: &stub.definition,
    };
    let core_prompt = prompts::sense_core_prompt(word, sense);
    let related_prompt = prompts::sense_related_prompt(
        word,
        sense,
        &stub.synonyms,
        &stub.antonyms,
        needed(LIST_TARGET, stub.synonyms.len()),
        needed(LIST_TARGET, stub.antonyms.len()),
        LIST_TARGET,
    );

    let mut scope = TaskScope::with_deadline(deadline);
    let core = {
        let gateway = gateway.clone();
        scope.spawn("sense_core", async move {
            gateway
                .complete::<SenseCoreMetadata>("sense_core", core_prompt, Tier::Simple)
                .await
        })
    };
    let related = {
        let gateway = gateway.clone();
        scope.spawn("sense_related", async move {
            gateway
                .complete::<SenseRelatedWords>("sense_related", related_prompt, Tier::Complex)
                .await
        })
    };

    let core = scope.join(core).await;
    let related = scope.join(related).await;

    match (core, related) {
        (Ok(core), Ok(related)) => Ok(merge_detailed(stub, part_of_speech, core, related)),
        (core, related) => {
            let failures: Vec<TaskFailure> = [core.err(), related.err()].into_iter().flatten().collect();
            Err(LookupError::from_failures(failures))
        }
    }
}

/// Exactly three examples: the dictionary example first, generated ones
/// after it.
pub async fn sense_examples(
    gateway: &ModelGateway,
    word: &str,
    part_of_speech: &str,
    stub: &SenseStub,
) -> Result<Vec<String>, LookupError> {
    let known: Vec<String> = stub.example.iter().cloned().collect();
    let missing = needed(LIST_TARGET, known.len());
    if missing == 0 {
        return Ok(pad_to(known, LIST_TARGET));
    }

    let sense = SenseContext {
        part_of_speech,
        definition: &stub.definition,
    };
    let generated = gateway
        .complete::<SenseExamples>(
            "sense_examples",
            prompts::sense_examples_prompt(word, sense, &known, missing),
            Tier::Medium,
        )
        .await
        .map_err(LookupError::ModelTask)?;

    Ok(merge_ranked(&known, &generated.examples, LIST_TARGET))
}

pub async fn sense_usage_notes(
    gateway: &ModelGateway,
    word: &str,
    part_of_speech: &str,
    stub: &SenseStub,
) -> Result<String, LookupError> {
    let sense = SenseContext {
        part_of_speech,
        definition: &stub.definition,
    };
    let notes = gateway
        .complete::<SenseUsageNotes>(
            "sense_usage_notes",
            prompts::sense_usage_notes_prompt(word, sense),
            Tier::Medium,
        )
        .await
        .map_err(LookupError::ModelTask)?;
    Ok(notes.usage_notes.trim().to_string())
}

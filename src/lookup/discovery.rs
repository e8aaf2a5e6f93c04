//! Discovery: the (entries → meanings → senses) structure of a headword,
//! from the dictionary API or, where allowed, from the model.

use crate::config::Tier;
use crate::error::{FailureKind, LookupError, TaskFailure};
use crate::llm::gateway::ModelGateway;
use crate::llm::prompts;
use crate::llm::schemas::WordSensesDiscovery;
use crate::models::{Meaning, Provenance, SenseStub, WordEntry};
use crate::sources::dictionary::{
    extract_ipa, extract_pronunciation, DictionarySource, RawEntry, SourceResult,
};

/// Whether a lookup path may fall back to AI discovery when the dictionary
/// API has nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryPolicy {
    ExternalOnly,
    AllowAiFallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Discovery {
    pub headword: String,
    pub provenance: Provenance,
    pub entries: Vec<WordEntry>,
}

/// One addressable sense, with the part of speech of its meaning.
#[derive(Debug, Clone, Copy)]
pub struct SenseRef<'a> {
    pub entry_index: usize,
    pub sense_index: usize,
    pub part_of_speech: &'a str,
    pub stub: &'a SenseStub,
}

impl Discovery {
    pub fn total_senses(&self) -> usize {
        self.entries.iter().map(WordEntry::total_senses).sum()
    }

    /// Pronunciation of the first entry that has one.
    pub fn pronunciation(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.pronunciation.as_str())
            .find(|p| !p.is_empty())
            .unwrap_or_default()
            .to_string()
    }

    pub fn ipa(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.ipa.as_str())
            .find(|p| !p.is_empty())
            .unwrap_or_default()
            .to_string()
    }

    /// Every sense in entry order, then meaning order, then definition order.
    /// `sense_index` is flat within its entry.
    pub fn senses(&self) -> Vec<SenseRef<'_>> {
        let mut out = Vec::with_capacity(self.total_senses());
        for entry in &self.entries {
            let mut sense_index = 0;
            for meaning in &entry.meanings {
                for stub in &meaning.definitions {
                    out.push(SenseRef {
                        entry_index: entry.entry_index,
                        sense_index,
                        part_of_speech: &meaning.part_of_speech,
                        stub,
                    });
                    sense_index += 1;
                }
            }
        }
        out
    }
}

/// Build discovery from API entries. Definitions with empty text are
/// skipped, as are meanings left with no definitions. Definition-level
/// synonyms and antonyms win over the meaning-level lists.
pub fn normalize_api(word: &str, raw: &[RawEntry]) -> Discovery {
    let entries = raw
        .iter()
        .enumerate()
        .map(|(entry_index, entry)| {
            let meanings = entry
                .meanings
                .iter()
                .filter_map(|m| {
                    let definitions: Vec<SenseStub> = m
                        .definitions
                        .iter()
                        .filter(|d| !d.definition.trim().is_empty())
                        .map(|d| SenseStub {
                            definition: d.definition.trim().to_string(),
                            example: d
                                .example
                                .as_deref()
                                .map(str::trim)
                                .filter(|e| !e.is_empty())
                                .map(str::to_string),
                            synonyms: if d.synonyms.is_empty() {
                                m.synonyms.clone()
                            } else {
                                d.synonyms.clone()
                            },
                            antonyms: if d.antonyms.is_empty() {
                                m.antonyms.clone()
                            } else {
                                d.antonyms.clone()
                            },
                        })
                        .collect();
                    (!definitions.is_empty()).then(|| Meaning {
                        part_of_speech: m.part_of_speech.clone(),
                        definitions,
                    })
                })
                .collect();

            WordEntry {
                entry_index,
                pronunciation: extract_pronunciation(entry).unwrap_or_default(),
                ipa: extract_ipa(entry),
                origin: entry
                    .origin
                    .as_deref()
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string),
                meanings,
            }
        })
        .collect();

    let headword = raw
        .first()
        .map(|e| e.word.trim())
        .filter(|w| !w.is_empty())
        .unwrap_or(word)
        .to_string();

    Discovery {
        headword,
        provenance: Provenance::ExternalSource,
        entries,
    }
}

/// Build a single-entry discovery from model output. Consecutive senses
/// with the same part of speech share one meaning.
pub fn normalize_ai(word: &str, discovered: WordSensesDiscovery) -> Discovery {
    let mut meanings: Vec<Meaning> = Vec::new();
    for sense in discovered.senses {
        let definition = sense.definition.trim().to_string();
        if definition.is_empty() {
            continue;
        }
        let stub = SenseStub {
            definition,
            ..Default::default()
        };
        match meanings.last_mut() {
            Some(last) if last.part_of_speech == sense.part_of_speech => {
                last.definitions.push(stub)
            }
            _ => meanings.push(Meaning {
                part_of_speech: sense.part_of_speech,
                definitions: vec![stub],
            }),
        }
    }

    let headword = match discovered.headword.trim() {
        "" => word.to_string(),
        h => h.to_string(),
    };

    Discovery {
        headword,
        provenance: Provenance::AiFallback,
        entries: vec![WordEntry {
            entry_index: 0,
            pronunciation: discovered.pronunciation.clone(),
            ipa: discovered.pronunciation,
            origin: None,
            meanings,
        }],
    }
}

/// Fetch discovery for `word`. The dictionary API is tried once; on a miss
/// the policy decides between failing and asking the model.
pub async fn discover(
    source: &dyn DictionarySource,
    gateway: &ModelGateway,
    word: &str,
    policy: DiscoveryPolicy,
) -> Result<Discovery, LookupError> {
    let reason = match source.fetch(word).await {
        SourceResult::Found(raw) => {
            let discovery = normalize_api(word, &raw);
            if discovery.total_senses() > 0 {
                return Ok(discovery);
            }
            "API entries contain no definitions".to_string()
        }
        SourceResult::Failed(reason) => reason,
    };

    if policy == DiscoveryPolicy::ExternalOnly {
        return Err(LookupError::SourceUnavailable(reason));
    }

    tracing::info!("Falling back to AI discovery for '{word}': {reason}");
    match gateway
        .complete::<WordSensesDiscovery>(
            "senses_discovery",
            prompts::senses_discovery_prompt(word),
            Tier::Discovery,
        )
        .await
    {
        Ok(discovered) => Ok(normalize_ai(word, discovered)),
        Err(failure) => Err(LookupError::Aggregate(vec![
            TaskFailure::new("dictionary_api", FailureKind::Transport, reason),
            failure,
        ])),
    }
}

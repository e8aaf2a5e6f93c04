//! Section Dispatcher: one request names one section; validate it, route it
//! and package the result with timing.

use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures_util::FutureExt;

use crate::error::LookupError;
use crate::lookup::discovery::{discover, Discovery, DiscoveryPolicy};
use crate::lookup::enrichment::{enrich_sense, sense_examples, sense_usage_notes};
use crate::lookup::granular::{self, or_default, EntryContext};
use crate::lookup::resolve::{index_from_request, resolve_entry, resolve_sense};
use crate::lookup::{validate_word, DictionaryService};
use crate::models::{
    BasicInfo, EntrySummary, LookupRequest, Section, SectionPayload, SectionResponse,
};

/// A validated section request. Sense-level sections always carry both
/// indices.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionQuery {
    pub word: String,
    pub section: Section,
    pub entry_index: usize,
    pub sense_index: Option<usize>,
}

impl SectionQuery {
    /// Validate the raw request. Runs before any network call.
    pub fn parse(request: &LookupRequest) -> Result<Self, LookupError> {
        let word = validate_word(request.word.as_deref())?;

        let name = request
            .section
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                LookupError::validation(format!("section is required. {}", valid_sections()))
            })?;
        let section = Section::parse(name).ok_or_else(|| {
            LookupError::validation(format!("Unknown section '{name}'. {}", valid_sections()))
        })?;

        let entry_index = index_from_request("entry_index", request.entry_index)?;
        let sense_index = index_from_request("sense_index", request.sense_index)?;

        if section.is_sense_level() {
            let (Some(entry_index), Some(sense_index)) = (entry_index, sense_index) else {
                let missing: Vec<&str> = [
                    entry_index.is_none().then_some("entry_index"),
                    sense_index.is_none().then_some("sense_index"),
                ]
                .into_iter()
                .flatten()
                .collect();
                return Err(LookupError::validation(format!(
                    "{} requires both entry_index and sense_index (missing: {})",
                    section.as_str(),
                    missing.join(", ")
                )));
            };
            return Ok(Self {
                word,
                section,
                entry_index,
                sense_index: Some(sense_index),
            });
        }

        Ok(Self {
            word,
            section,
            entry_index: entry_index.unwrap_or(0),
            sense_index: None,
        })
    }
}

fn valid_sections() -> String {
    let names: Vec<&str> = Section::ALL.iter().map(Section::as_str).collect();
    format!("Valid sections: {}", names.join(", "))
}

impl DictionaryService {
    /// Look up one section of a word. Panics inside the lookup come back as
    /// `Internal` errors.
    pub async fn lookup_section(&self, request: &LookupRequest) -> Result<SectionResponse, LookupError> {
        let query = SectionQuery::parse(request)?;
        let started = Instant::now();

        let outcome = AssertUnwindSafe(self.dispatch(&query)).catch_unwind().await;
        let (headword, payload) = match outcome {
            Ok(result) => result?,
            Err(panic) => {
                let msg = panic_message(panic.as_ref());
                tracing::error!("Section {} for '{}' panicked: {msg}", query.section.as_str(), query.word);
                return Err(LookupError::Internal(msg));
            }
        };

        let execution_time = started.elapsed().as_secs_f64();
        tracing::info!(
            "Section {} for '{}' done in {execution_time:.2}s",
            query.section.as_str(),
            query.word
        );
        Ok(SectionResponse {
            headword,
            section: query.section.as_str(),
            payload,
            execution_time,
            success: true,
        })
    }

    async fn dispatch(&self, query: &SectionQuery) -> Result<(String, SectionPayload), LookupError> {
        let word = query.word.as_str();

        if query.section == Section::Basic {
            let discovery = self.discover(word, DiscoveryPolicy::ExternalOnly).await?;
            let payload = SectionPayload::Basic(basic_info(&discovery));
            return Ok((discovery.headword, payload));
        }

        if let Some(sense_index) = query.sense_index {
            let discovery = self.discover(word, DiscoveryPolicy::ExternalOnly).await?;
            let entry = resolve_entry(&discovery.entries, query.entry_index)?;
            let sense = resolve_sense(entry, sense_index)?;
            let (pos, stub) = (sense.part_of_speech, sense.stub);
            let entry_index = query.entry_index;

            let payload = match query.section {
                Section::DetailedSense => SectionPayload::DetailedSense {
                    entry_index,
                    sense_index,
                    detailed_sense: enrich_sense(&self.gateway, word, pos, stub, self.sense_deadline())
                        .await?,
                },
                Section::Examples => SectionPayload::Examples {
                    entry_index,
                    sense_index,
                    definition: stub.definition.clone(),
                    examples: sense_examples(&self.gateway, word, pos, stub).await?,
                },
                Section::UsageNotes => SectionPayload::UsageNotes {
                    entry_index,
                    sense_index,
                    definition: stub.definition.clone(),
                    usage_notes: sense_usage_notes(&self.gateway, word, pos, stub).await?,
                },
                other => {
                    return Err(LookupError::Internal(format!(
                        "section {} is not sense-level",
                        other.as_str()
                    )))
                }
            };
            return Ok((discovery.headword.clone(), payload));
        }

        let discovery = self.discover(word, DiscoveryPolicy::AllowAiFallback).await?;
        let entry = resolve_entry(&discovery.entries, query.entry_index)?;
        let ctx = EntryContext::for_entry(entry, discovery.entries.len());
        let entry_index = query.entry_index;
        let gw = &self.gateway;

        let payload = match query.section {
            Section::Etymology => SectionPayload::Etymology {
                entry_index,
                etymology: or_default(granular::etymology(gw, word, &ctx).await),
            },
            Section::WordFamily => SectionPayload::WordFamily {
                entry_index,
                word_family: or_default(granular::word_family(gw, word, &ctx).await),
            },
            Section::UsageContext => SectionPayload::UsageContext {
                entry_index,
                usage_context: or_default(granular::usage_context(gw, word, &ctx).await),
            },
            Section::CulturalNotes => SectionPayload::CulturalNotes {
                entry_index,
                cultural_notes: or_default(granular::cultural_notes(gw, word, &ctx).await),
            },
            Section::Frequency => SectionPayload::Frequency {
                entry_index,
                frequency: or_default(granular::frequency(gw, word, &ctx).await),
            },
            Section::BilibiliVideos => SectionPayload::BilibiliVideos {
                entry_index,
                bilibili_videos: self.videos.find_videos(word).await,
            },
            other => {
                return Err(LookupError::Internal(format!(
                    "section {} is not entry-level",
                    other.as_str()
                )))
            }
        };
        Ok((discovery.headword.clone(), payload))
    }

    pub(crate) async fn discover(&self, word: &str, policy: DiscoveryPolicy) -> Result<Discovery, LookupError> {
        discover(self.source.as_ref(), &self.gateway, word, policy).await
    }
}

fn basic_info(discovery: &Discovery) -> BasicInfo {
    BasicInfo {
        data_source: discovery.provenance,
        total_entries: discovery.entries.len(),
        total_senses: discovery.total_senses(),
        entries: discovery
            .entries
            .iter()
            .map(|e| EntrySummary {
                entry_index: e.entry_index,
                pronunciation: e.pronunciation.clone(),
                ipa: e.ipa.clone(),
                total_senses: e.total_senses(),
                meanings: e.meanings.clone(),
            })
            .collect(),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "lookup panicked".to_string()
    }
}

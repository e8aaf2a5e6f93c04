//! Output schemas for model tasks.

use serde::Deserialize;

use crate::llm::gateway::StructuredOutput;
use crate::models::{
    CulturalNotesInfo, EtymologyInfo, FrequencyInfo, Tone, UsageContextInfo, WordFamilyInfo,
};

/// Core metadata for one sense. The definition is never requested: the
/// ground-truth definition is authoritative.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SenseCoreMetadata {
    #[serde(default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub usage_register: Vec<String>,
    #[serde(default)]
    pub domain: Vec<String>,
    pub tone: Tone,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SenseRelatedWords {
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
    #[serde(default)]
    pub word_specific_phrases: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SenseExamples {
    #[serde(default)]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SenseUsageNotes {
    #[serde(default)]
    pub usage_notes: String,
}

/// Short phrases used as video search keywords.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CommonPhrases {
    #[serde(default)]
    pub phrases: Vec<String>,
}

/// Ab initio sense discovery for words the dictionary API does not know.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WordSensesDiscovery {
    #[serde(default)]
    pub headword: String,
    #[serde(default)]
    pub pronunciation: String,
    pub senses: Vec<DiscoveredSense>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DiscoveredSense {
    pub definition: String,
    #[serde(default)]
    pub part_of_speech: String,
}

impl StructuredOutput for SenseCoreMetadata {
    const SCHEMA_NAME: &'static str = "SenseCoreMetadata";
    const SHAPE: &'static str = r#"{"part_of_speech": "noun|verb|adjective|phrasal verb|idiom|...", "usage_register": ["formal|informal|colloquial|slang|archaic|literary|professional|academic|neutral"], "domain": ["field of use, may be empty"], "tone": "positive|negative|neutral|humorous|derogatory|pejorative|approving"}"#;
}

impl StructuredOutput for SenseRelatedWords {
    const SCHEMA_NAME: &'static str = "SenseRelatedWords";
    const SHAPE: &'static str = r#"{"synonyms": ["string"], "antonyms": ["string"], "word_specific_phrases": ["fixed expression, phrasal verb or idiom"]}"#;
}

impl StructuredOutput for SenseExamples {
    const SCHEMA_NAME: &'static str = "SenseExamples";
    const SHAPE: &'static str = r#"{"examples": ["example sentence"]}"#;
}

impl StructuredOutput for SenseUsageNotes {
    const SCHEMA_NAME: &'static str = "SenseUsageNotes";
    const SHAPE: &'static str = r#"{"usage_notes": "guidance on when and how to use this sense, and common learner pitfalls"}"#;

    fn validate(&self) -> Result<(), String> {
        if self.usage_notes.trim().is_empty() {
            return Err("usage_notes is empty".into());
        }
        Ok(())
    }
}

impl StructuredOutput for CommonPhrases {
    const SCHEMA_NAME: &'static str = "CommonPhrases";
    const SHAPE: &'static str = r#"{"phrases": ["1-3 common phrases or collocations"]}"#;
}

impl StructuredOutput for WordSensesDiscovery {
    const SCHEMA_NAME: &'static str = "WordSensesDiscovery";
    const SHAPE: &'static str = r#"{"headword": "string", "pronunciation": "IPA or simple phonetic guide", "senses": [{"definition": "string", "part_of_speech": "string"}]}"#;

    fn validate(&self) -> Result<(), String> {
        if self.senses.is_empty() {
            return Err("no senses".into());
        }
        if self.senses.iter().any(|s| s.definition.trim().is_empty()) {
            return Err("sense with empty definition".into());
        }
        Ok(())
    }
}

impl StructuredOutput for EtymologyInfo {
    const SCHEMA_NAME: &'static str = "EtymologyInfo";
    const SHAPE: &'static str = r#"{"etymology": "origin, history and meaning evolution", "root_analysis": "roots, prefixes and suffixes with their meanings"}"#;
}

impl StructuredOutput for WordFamilyInfo {
    const SCHEMA_NAME: &'static str = "WordFamilyInfo";
    const SHAPE: &'static str = r#"{"word_family": ["related word"]}"#;
}

impl StructuredOutput for UsageContextInfo {
    const SCHEMA_NAME: &'static str = "UsageContextInfo";
    const SHAPE: &'static str = r#"{"modern_relevance": "string", "common_confusions": ["string"], "regional_variations": ["string"]}"#;
}

impl StructuredOutput for CulturalNotesInfo {
    const SCHEMA_NAME: &'static str = "CulturalNotesInfo";
    const SHAPE: &'static str = r#"{"notes": "string"}"#;
}

impl StructuredOutput for FrequencyInfo {
    const SCHEMA_NAME: &'static str = "FrequencyInfo";
    const SHAPE: &'static str = r#"{"frequency": "very_common|common|uncommon|rare|very_rare"}"#;
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One dictionary entry for a headword. Homographs with distinct origins
/// are separate entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordEntry {
    pub entry_index: usize,
    /// Preferred audio URL, or phonetic text when no audio exists. May be empty.
    pub pronunciation: String,
    /// Phonetic transcription. May be empty.
    pub ipa: String,
    /// Origin note from the dictionary, when it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    pub meanings: Vec<Meaning>,
}

impl WordEntry {
    pub fn total_senses(&self) -> usize {
        self.meanings.iter().map(|m| m.definitions.len()).sum()
    }

    /// Short "noun: first definition; verb: ..." summary used to anchor
    /// entry-level prompts when a word has several entries.
    pub fn pos_summary(&self) -> String {
        self.meanings
            .iter()
            .filter_map(|m| {
                m.definitions
                    .first()
                    .map(|d| format!("{}: {}", m.part_of_speech, d.definition))
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// One part-of-speech grouping within an entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Meaning {
    pub part_of_speech: String,
    pub definitions: Vec<SenseStub>,
}

/// The smallest addressable sense. Synonyms and antonyms are already
/// resolved: definition-level lists win over the owning meaning's lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SenseStub {
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
    Humorous,
    Derogatory,
    Pejorative,
    Approving,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    VeryCommon,
    #[default]
    Common,
    Uncommon,
    Rare,
    VeryRare,
}

/// Enriched form of a [`SenseStub`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetailedSense {
    /// Always the ground-truth definition, never model output.
    pub definition: String,
    pub part_of_speech: String,
    pub usage_register: Vec<String>,
    pub domain: Vec<String>,
    pub tone: Tone,
    /// Exactly 3, padded with empty strings.
    pub synonyms: Vec<String>,
    /// Exactly 3, padded with empty strings.
    pub antonyms: Vec<String>,
    /// Exactly 3, padded with empty strings.
    pub word_specific_phrases: Vec<String>,
}

// ─── Granular info ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EtymologyInfo {
    pub etymology: String,
    #[serde(default)]
    pub root_analysis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WordFamilyInfo {
    #[serde(default)]
    pub word_family: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UsageContextInfo {
    #[serde(default)]
    pub modern_relevance: String,
    #[serde(default)]
    pub common_confusions: Vec<String>,
    #[serde(default)]
    pub regional_variations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CulturalNotesInfo {
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FrequencyInfo {
    pub frequency: Frequency,
}

// ─── Video ───────────────────────────────────────────────

/// A video matched to one search phrase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VideoMatch {
    pub bvid: String,
    pub aid: u64,
    pub title: String,
    pub description: String,
    pub pic: String,
    pub author: String,
    pub mid: u64,
    pub view: u64,
    pub danmaku: u64,
    pub reply: u64,
    pub favorite: u64,
    pub coin: u64,
    pub share: u64,
    pub like: u64,
    pub pubdate: i64,
    /// Seconds
    pub duration: u64,
    /// Seconds into the video where the phrase is spoken, 0 if unknown
    pub start_time: f64,
    pub matched_phrase: String,
    pub video_url: String,
}

// ─── Requests ────────────────────────────────────────────

/// Sections a client can request independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Basic,
    Etymology,
    WordFamily,
    UsageContext,
    CulturalNotes,
    Frequency,
    DetailedSense,
    Examples,
    UsageNotes,
    BilibiliVideos,
}

impl Section {
    pub const ALL: [Section; 10] = [
        Section::Basic,
        Section::Etymology,
        Section::WordFamily,
        Section::UsageContext,
        Section::CulturalNotes,
        Section::Frequency,
        Section::DetailedSense,
        Section::Examples,
        Section::UsageNotes,
        Section::BilibiliVideos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Basic => "basic",
            Section::Etymology => "etymology",
            Section::WordFamily => "word_family",
            Section::UsageContext => "usage_context",
            Section::CulturalNotes => "cultural_notes",
            Section::Frequency => "frequency",
            Section::DetailedSense => "detailed_sense",
            Section::Examples => "examples",
            Section::UsageNotes => "usage_notes",
            Section::BilibiliVideos => "bilibili_videos",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    /// Sections addressed by (entry_index, sense_index).
    pub fn is_sense_level(&self) -> bool {
        matches!(
            self,
            Section::DetailedSense | Section::Examples | Section::UsageNotes
        )
    }
}

/// Section lookup request, as received from the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupRequest {
    pub word: Option<String>,
    pub section: Option<String>,
    pub entry_index: Option<i64>,
    pub sense_index: Option<i64>,
}

/// Full-word lookup request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FullLookupRequest {
    pub word: Option<String>,
}

// ─── Responses ───────────────────────────────────────────

/// Where a discovery's entries came from. Never mixed within one request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    ExternalSource,
    AiFallback,
}

/// Structure-only view of one entry for the `basic` section.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EntrySummary {
    pub entry_index: usize,
    pub pronunciation: String,
    pub ipa: String,
    pub total_senses: usize,
    pub meanings: Vec<Meaning>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BasicInfo {
    pub data_source: Provenance,
    pub total_entries: usize,
    pub total_senses: usize,
    pub entries: Vec<EntrySummary>,
}

/// Section-specific part of a successful response. Each variant serializes
/// its data under the section's own name.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SectionPayload {
    Basic(BasicInfo),
    Etymology {
        entry_index: usize,
        etymology: EtymologyInfo,
    },
    WordFamily {
        entry_index: usize,
        word_family: Vec<String>,
    },
    UsageContext {
        entry_index: usize,
        usage_context: UsageContextInfo,
    },
    CulturalNotes {
        entry_index: usize,
        cultural_notes: CulturalNotesInfo,
    },
    Frequency {
        entry_index: usize,
        frequency: Frequency,
    },
    DetailedSense {
        entry_index: usize,
        sense_index: usize,
        detailed_sense: DetailedSense,
    },
    Examples {
        entry_index: usize,
        sense_index: usize,
        definition: String,
        examples: Vec<String>,
    },
    UsageNotes {
        entry_index: usize,
        sense_index: usize,
        definition: String,
        usage_notes: String,
    },
    BilibiliVideos {
        entry_index: usize,
        bilibili_videos: Vec<VideoMatch>,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SectionResponse {
    pub headword: String,
    pub section: &'static str,
    #[serde(flatten)]
    pub payload: SectionPayload,
    /// Seconds
    pub execution_time: f64,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headword: Option<String>,
    pub error: String,
    pub success: bool,
}

impl ErrorResponse {
    pub fn new(headword: Option<String>, error: impl Into<String>) -> Self {
        Self {
            headword,
            error: error.into(),
            success: false,
        }
    }
}

/// A detailed sense with its address in the discovery structure.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IndexedSense {
    pub entry_index: usize,
    pub sense_index: usize,
    #[serde(flatten)]
    pub sense: DetailedSense,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SenseFailure {
    pub entry_index: usize,
    pub sense_index: usize,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FullLookupResponse {
    pub headword: String,
    pub pronunciation: String,
    pub ipa: String,
    pub data_source: Provenance,
    pub frequency: Frequency,
    pub etymology: EtymologyInfo,
    pub word_family: Vec<String>,
    pub usage_context: UsageContextInfo,
    pub cultural_notes: CulturalNotesInfo,
    pub detailed_senses: Vec<IndexedSense>,
    pub failed_senses: Vec<SenseFailure>,
    pub total_entries: usize,
    pub total_senses: usize,
    pub generated_at: DateTime<Utc>,
    pub execution_time: f64,
    pub success: bool,
}

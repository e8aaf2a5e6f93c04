//! Prompt builders. Pure string construction, no I/O.

/// Strip ChatML control tokens so user input cannot open a new turn.
pub fn sanitize_for_prompt(text: &str) -> String {
    text.replace("<|im_start|>", "")
        .replace("<|im_end|>", "")
        .replace("<|endoftext|>", "")
}

/// The sense a sense-level prompt is about.
#[derive(Debug, Clone, Copy)]
pub struct SenseContext<'a> {
    pub part_of_speech: &'a str,
    pub definition: &'a str,
}

impl SenseContext<'_> {
    fn describe(&self) -> String {
        let definition = sanitize_for_prompt(self.definition);
        if self.part_of_speech.is_empty() {
            format!("Definition: \"{definition}\"")
        } else {
            format!(
                "Part of speech: {}\nDefinition: \"{definition}\"",
                sanitize_for_prompt(self.part_of_speech)
            )
        }
    }
}

/// Optional anchoring for entry-level prompts on words with several entries.
fn entry_anchor(entry_hint: Option<&str>) -> String {
    match entry_hint {
        Some(hint) if !hint.is_empty() => format!(
            "\nThis word has several dictionary entries. Focus on the entry with these senses: {}\n",
            sanitize_for_prompt(hint)
        ),
        _ => String::new(),
    }
}

pub fn senses_discovery_prompt(word: &str) -> String {
    format!(
        "Analyze the word \"{word}\" and discover ALL its distinct meanings.\n\n\
         For each sense give a clear, concise definition and its part of speech \
         (noun, verb, adjective, adverb, phrasal verb, idiom, ...).\n\
         Also give the headword and a pronunciation (IPA or a simple phonetic guide).\n\n\
         List ALL senses, including rare, archaic and specialized ones, ordered by \
         frequency (most common first).",
        word = sanitize_for_prompt(word)
    )
}

pub fn etymology_prompt(word: &str, entry_hint: Option<&str>, origin: Option<&str>) -> String {
    let origin_note = match origin {
        Some(o) if !o.trim().is_empty() => format!(
            "\nThe dictionary records this origin note, use it as ground truth: {}\n",
            sanitize_for_prompt(o)
        ),
        _ => String::new(),
    };
    format!(
        "You are a linguistic historian.\n\
         Give the etymology and root analysis of the word \"{word}\".{anchor}{origin_note}\n\
         1. etymology: the word's origin, historical development and meaning evolution.\n\
         2. root_analysis: roots, prefixes and suffixes with their meanings and origins.",
        word = sanitize_for_prompt(word),
        anchor = entry_anchor(entry_hint),
    )
}

pub fn word_family_prompt(word: &str, entry_hint: Option<&str>) -> String {
    format!(
        "List the word family of \"{word}\": direct derivatives (e.g. \"happy\" -> \
         \"happiness\", \"unhappy\") and terms from the same root.{anchor}\n\
         Focus on relationships that help language learners.",
        word = sanitize_for_prompt(word),
        anchor = entry_anchor(entry_hint),
    )
}

pub fn usage_context_prompt(word: &str, entry_hint: Option<&str>) -> String {
    format!(
        "Describe the modern usage context of \"{word}\".{anchor}\n\
         1. modern_relevance: current usage trends (e.g. \"rising in tech contexts\", \"considered outdated\").\n\
         2. common_confusions: words or phrases often confused with it, each with a brief discriminator.\n\
         3. regional_variations: differences in meaning, spelling or usage between English variants.",
        word = sanitize_for_prompt(word),
        anchor = entry_anchor(entry_hint),
    )
}

pub fn cultural_notes_prompt(word: &str, entry_hint: Option<&str>) -> String {
    format!(
        "Give concise cultural and linguistic notes on \"{word}\": cultural associations or \
         sensitivities, historical or literary significance, sociolinguistic observations.{anchor}",
        word = sanitize_for_prompt(word),
        anchor = entry_anchor(entry_hint),
    )
}

pub fn frequency_prompt(word: &str, entry_hint: Option<&str>) -> String {
    format!(
        "Estimate how common the word \"{word}\" is in modern English usage.{anchor}\n\
         Answer with exactly one of: very_common, common, uncommon, rare, very_rare.",
        word = sanitize_for_prompt(word),
        anchor = entry_anchor(entry_hint),
    )
}

pub fn sense_core_prompt(word: &str, sense: SenseContext<'_>) -> String {
    format!(
        "Classify this sense of the word \"{word}\".\n{sense}\n\n\
         Give its part of speech, usage register (formal, informal, colloquial, slang, archaic, \
         literary, professional, academic, neutral), domains of use (may be empty) and primary tone.\n\
         The tone MUST be one of: positive, negative, neutral, humorous, derogatory, pejorative, approving.",
        word = sanitize_for_prompt(word),
        sense = sense.describe(),
    )
}

/// Related words for one sense. Asks only for what ground truth does not
/// already cover.
pub fn sense_related_prompt(
    word: &str,
    sense: SenseContext<'_>,
    known_synonyms: &[String],
    known_antonyms: &[String],
    synonyms_needed: usize,
    antonyms_needed: usize,
    phrases_needed: usize,
) -> String {
    let mut prompt = format!(
        "Give related words for this sense of \"{word}\".\n{sense}\n\n",
        word = sanitize_for_prompt(word),
        sense = sense.describe(),
    );
    prompt.push_str(&related_line("synonyms", synonyms_needed, known_synonyms));
    prompt.push_str(&related_line("antonyms", antonyms_needed, known_antonyms));
    prompt.push_str(&format!(
        "word_specific_phrases: exactly {phrases_needed} fixed expressions, phrasal verbs or \
         idioms built around this sense (e.g. \"run up a bill\", \"in the long run\").\n"
    ));
    prompt
}

fn related_line(field: &str, needed: usize, known: &[String]) -> String {
    if needed == 0 {
        return format!("{field}: return an empty list.\n");
    }
    let mut line = format!("{field}: up to {needed} close {field} for this specific sense");
    if !known.is_empty() {
        let known: Vec<String> = known.iter().map(|k| sanitize_for_prompt(k)).collect();
        line.push_str(&format!(", not repeating: {}", known.join(", ")));
    }
    line.push_str(". Use an empty list if none exist.\n");
    line
}

pub fn sense_examples_prompt(
    word: &str,
    sense: SenseContext<'_>,
    known_examples: &[String],
    needed: usize,
) -> String {
    let mut prompt = format!(
        "Write exactly {needed} natural example sentences using \"{word}\" in this sense.\n{sense}\n",
        word = sanitize_for_prompt(word),
        sense = sense.describe(),
    );
    if !known_examples.is_empty() {
        let known: Vec<String> = known_examples.iter().map(|k| sanitize_for_prompt(k)).collect();
        prompt.push_str(&format!("Do not repeat these existing examples: {}\n", known.join(" | ")));
    }
    prompt
}

pub fn sense_usage_notes_prompt(word: &str, sense: SenseContext<'_>) -> String {
    format!(
        "Write usage notes for this sense of \"{word}\": when and how to use it, and the \
         pitfalls language learners commonly hit.\n{sense}",
        word = sanitize_for_prompt(word),
        sense = sense.describe(),
    )
}

pub fn common_phrases_prompt(word: &str) -> String {
    format!(
        "Give 1-3 short, commonly used phrases or collocations containing \"{word}\", suitable \
         as video search keywords. If the word is mostly used on its own, return just the word.",
        word = sanitize_for_prompt(word)
    )
}

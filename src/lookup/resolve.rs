//! 2D addressing: (entry_index, sense_index) against a discovery.

use crate::error::LookupError;
use crate::models::{SenseStub, WordEntry};

/// A sense located inside one entry.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSense<'a> {
    pub part_of_speech: &'a str,
    pub stub: &'a SenseStub,
}

/// Convert a client-supplied index. Negative values are rejected.
pub fn index_from_request(name: &str, value: Option<i64>) -> Result<Option<usize>, LookupError> {
    match value {
        None => Ok(None),
        Some(v) => usize::try_from(v)
            .map(Some)
            .map_err(|_| LookupError::validation(format!("{name} must be a non-negative integer, got {v}"))),
    }
}

pub fn resolve_entry(entries: &[WordEntry], entry_index: usize) -> Result<&WordEntry, LookupError> {
    entries.get(entry_index).ok_or_else(|| {
        LookupError::validation(format!(
            "entry_index {entry_index} is out of range (valid range: {})",
            valid_range(entries.len())
        ))
    })
}

/// Walk the entry's meanings, accumulating definition counts until the flat
/// index falls inside one.
pub fn resolve_sense(entry: &WordEntry, sense_index: usize) -> Result<ResolvedSense<'_>, LookupError> {
    let mut offset = 0;
    for meaning in &entry.meanings {
        let count = meaning.definitions.len();
        if sense_index < offset + count {
            return Ok(ResolvedSense {
                part_of_speech: &meaning.part_of_speech,
                stub: &meaning.definitions[sense_index - offset],
            });
        }
        offset += count;
    }
    Err(LookupError::validation(format!(
        "sense_index {sense_index} is out of range for entry {} (valid range: {})",
        entry.entry_index,
        valid_range(offset)
    )))
}

fn valid_range(len: usize) -> String {
    match len {
        0 => "none".to_string(),
        n => format!("0-{}", n - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Meaning;

    fn entry(counts: &[usize]) -> WordEntry {
        WordEntry {
            entry_index: 0,
            pronunciation: String::new(),
            ipa: String::new(),
            origin: None,
            meanings: counts
                .iter()
                .enumerate()
                .map(|(m, &n)| Meaning {
                    part_of_speech: format!("pos{m}"),
                    definitions: (0..n)
                        .map(|d| SenseStub {
                            definition: format!("m{m}d{d}"),
                            ..Default::default()
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_resolve_walks_meanings() {
        let e = entry(&[3, 2, 5]);
        let s = resolve_sense(&e, 0).unwrap();
        assert_eq!(s.stub.definition, "m0d0");
        let s = resolve_sense(&e, 3).unwrap();
        assert_eq!((s.part_of_speech, s.stub.definition.as_str()), ("pos1", "m1d0"));
        let s = resolve_sense(&e, 9).unwrap();
        assert_eq!(s.stub.definition, "m2d4");
    }

    #[test]
    fn test_sense_out_of_range_names_valid_range() {
        let e = entry(&[4, 6]);
        let err = resolve_sense(&e, 10).unwrap_err();
        assert!(matches!(err, LookupError::Validation(_)));
        assert!(err.to_string().contains("0-9"), "{err}");
    }

    #[test]
    fn test_entry_out_of_range_names_valid_range() {
        let entries = vec![entry(&[1]), entry(&[1])];
        let err = resolve_entry(&entries, 2).unwrap_err();
        assert!(err.to_string().contains("0-1"), "{err}");
        assert!(resolve_entry(&entries, 1).is_ok());
    }

    #[test]
    fn test_negative_index_is_rejected() {
        assert!(index_from_request("entry_index", Some(-1)).is_err());
        assert_eq!(index_from_request("entry_index", Some(2)).unwrap(), Some(2));
        assert_eq!(index_from_request("entry_index", None).unwrap(), None);
    }
}

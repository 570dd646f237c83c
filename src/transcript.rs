use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AudiocutError, Result};

/// One transcribed character with its timestamp range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedChar {
    #[serde(rename = "char")]
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Character-timestamped transcript produced by the ASR collaborator.
///
/// The crate never runs transcription itself; it consumes the JSON file the
/// transcription step writes (`full_text`, per-character timestamps, total
/// duration).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub full_text: String,
    pub chars: Vec<TimedChar>,
    pub duration: f64,
}

impl Transcript {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AudiocutError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let transcript: Transcript = serde_json::from_str(&contents)?;
        transcript.validate()?;
        Ok(transcript)
    }

    fn validate(&self) -> Result<()> {
        if self.duration <= 0.0 {
            return Err(AudiocutError::Transcript(format!(
                "non-positive duration {:.2}",
                self.duration
            )));
        }
        for (i, c) in self.chars.iter().enumerate() {
            if c.start > c.end {
                return Err(AudiocutError::Transcript(format!(
                    "char {i} has start {:.2} after end {:.2}",
                    c.start, c.end
                )));
            }
        }
        for (i, pair) in self.chars.windows(2).enumerate() {
            if pair[1].start < pair[0].start {
                return Err(AudiocutError::Transcript(format!(
                    "chars {i} and {} are out of order",
                    i + 1
                )));
            }
        }
        Ok(())
    }
}

/// One keyword occurrence located in the transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub keyword: String,
    pub start: f64,
    pub end: f64,
    /// Character position of the match in `full_text`.
    pub position: usize,
    pub context: String,
    pub matched_text: String,
}

#[derive(Debug, Deserialize)]
struct KeywordFile {
    #[serde(default)]
    keywords: Vec<String>,
}

/// Load the keyword list from a `{"keywords": [...]}` JSON file.
pub fn load_keywords(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(AudiocutError::FileNotFound(path.display().to_string()));
    }
    let contents = std::fs::read_to_string(path)?;
    let file: KeywordFile = serde_json::from_str(&contents)?;
    Ok(file.keywords)
}

/// Context window captured around each match, in characters per side.
const CONTEXT_CHARS: usize = 10;

/// Find every literal occurrence of each keyword and locate its timestamps
/// via the character-level transcript.
///
/// Matches are returned sorted by text position. An occurrence whose
/// character range has no timestamp coverage is skipped.
pub fn find_keyword_matches(
    transcript: &Transcript,
    keywords: &[String],
) -> Result<Vec<KeywordMatch>> {
    let text_chars: Vec<char> = transcript.full_text.chars().collect();

    // Literal matching works on byte offsets; map them back to character
    // positions, which is what the timestamp array is indexed by.
    let byte_to_char: std::collections::HashMap<usize, usize> = transcript
        .full_text
        .char_indices()
        .enumerate()
        .map(|(char_idx, (byte_idx, _))| (byte_idx, char_idx))
        .collect();

    debug!(
        "Searching {} keywords across {} characters",
        keywords.len(),
        text_chars.len()
    );

    let mut matches = Vec::new();

    for keyword in keywords {
        if keyword.is_empty() {
            continue;
        }
        let pattern = Regex::new(&regex::escape(keyword))
            .map_err(|e| AudiocutError::Transcript(format!("bad keyword '{keyword}': {e}")))?;

        for m in pattern.find_iter(&transcript.full_text) {
            let Some(&start_idx) = byte_to_char.get(&m.start()) else {
                continue;
            };
            let end_idx = if m.end() == transcript.full_text.len() {
                text_chars.len()
            } else {
                match byte_to_char.get(&m.end()) {
                    Some(&idx) => idx,
                    None => continue,
                }
            };

            if start_idx >= transcript.chars.len() || end_idx > transcript.chars.len() {
                continue;
            }

            let start_time = transcript.chars[start_idx].start;
            let end_time = transcript.chars[end_idx - 1].end;

            let context_start = start_idx.saturating_sub(CONTEXT_CHARS);
            let context_end = (end_idx + CONTEXT_CHARS).min(text_chars.len());
            let context: String = text_chars[context_start..context_end].iter().collect();

            debug!(
                "Found '{}' at {:.2}s - {:.2}s",
                keyword, start_time, end_time
            );

            matches.push(KeywordMatch {
                keyword: keyword.clone(),
                start: start_time,
                end: end_time,
                position: start_idx,
                context,
                matched_text: m.as_str().to_string(),
            });
        }
    }

    matches.sort_by_key(|m| m.position);

    info!("Found {} keyword matches", matches.len());
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript_from(text: &str, char_duration: f64) -> Transcript {
        let chars: Vec<TimedChar> = text
            .chars()
            .enumerate()
            .map(|(i, c)| TimedChar {
                text: c.to_string(),
                start: i as f64 * char_duration,
                end: (i + 1) as f64 * char_duration,
            })
            .collect();
        let duration = chars.len() as f64 * char_duration;
        Transcript {
            full_text: text.to_string(),
            chars,
            duration,
        }
    }

    #[test]
    fn test_find_single_match() {
        let transcript = transcript_from("hello bad world", 0.1);
        let matches =
            find_keyword_matches(&transcript, &["bad".to_string()]).unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].keyword, "bad");
        assert_eq!(matches[0].position, 6);
        assert!((matches[0].start - 0.6).abs() < 1e-9);
        assert!((matches[0].end - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_find_repeated_matches_sorted_by_position() {
        let transcript = transcript_from("x bad y bad z", 0.5);
        let matches =
            find_keyword_matches(&transcript, &["bad".to_string()]).unwrap();

        assert_eq!(matches.len(), 2);
        assert!(matches[0].position < matches[1].position);
    }

    #[test]
    fn test_match_on_multibyte_text() {
        let transcript = transcript_from("今天天气很好啊", 1.0);
        let matches =
            find_keyword_matches(&transcript, &["天气".to_string()]).unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].position, 2);
        assert!((matches[0].start - 2.0).abs() < 1e-9);
        assert!((matches[0].end - 4.0).abs() < 1e-9);
        assert_eq!(matches[0].matched_text, "天气");
    }

    #[test]
    fn test_keyword_with_regex_metacharacters_is_literal() {
        let transcript = transcript_from("price is $5.00 today", 0.1);
        let matches =
            find_keyword_matches(&transcript, &["$5.00".to_string()]).unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matched_text, "$5.00");
    }

    #[test]
    fn test_context_is_clamped_at_text_bounds() {
        let transcript = transcript_from("bad end", 0.1);
        let matches =
            find_keyword_matches(&transcript, &["bad".to_string()]).unwrap();

        assert_eq!(matches[0].context, "bad end");
    }

    #[test]
    fn test_no_matches() {
        let transcript = transcript_from("all clean here", 0.1);
        let matches =
            find_keyword_matches(&transcript, &["bad".to_string()]).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_empty_keyword_is_skipped() {
        let transcript = transcript_from("anything", 0.1);
        let matches = find_keyword_matches(&transcript, &[String::new()]).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_validate_rejects_unordered_chars() {
        let mut transcript = transcript_from("ab", 1.0);
        transcript.chars.swap(0, 1);
        assert!(transcript.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_char_range() {
        let mut transcript = transcript_from("ab", 1.0);
        transcript.chars[0].start = 5.0;
        transcript.chars[0].end = 1.0;
        assert!(transcript.validate().is_err());
    }

    #[test]
    fn test_transcript_json_round_trip() {
        let json = r#"{
            "full_text": "你好",
            "chars": [
                {"char": "你", "start": 0.0, "end": 0.25},
                {"char": "好", "start": 0.25, "end": 0.5}
            ],
            "duration": 0.5
        }"#;
        let transcript: Transcript = serde_json::from_str(json).unwrap();
        assert_eq!(transcript.chars.len(), 2);
        assert_eq!(transcript.chars[0].text, "你");
        assert!(transcript.validate().is_ok());
    }
}

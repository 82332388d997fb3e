//! Text Normalization
//!
//! Handles recognizer quirks and argument clean-up before and after command
//! matching.

use std::collections::HashMap;

/// Conversational fillers dropped from the start of an utterance
const LEADING_FILLERS: &[&str] = &["um ", "uh ", "ok ", "okay ", "hey ", "please "];

/// How a free-text argument is cleaned once its prefix phrase is stripped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentStyle {
    /// Spoken words kept as-is (full names)
    Words,
    /// Spaces removed (destinations)
    Compact,
    /// Spoken symbols mapped and spaces removed (emails, passwords)
    Address,
    /// Dashes mapped and spaces removed (segmentation keys)
    Key,
}

/// Normalizes recognized text to fix common recognition errors
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    /// Manual corrections from config
    corrections: HashMap<String, String>,
}

impl TextNormalizer {
    /// Create a new text normalizer
    pub fn new(corrections: HashMap<String, String>) -> Self {
        let corrections = corrections
            .into_iter()
            .map(|(from, to)| (from.to_lowercase(), to.to_lowercase()))
            .collect();
        Self { corrections }
    }

    /// Case-fold, apply corrections and collapse whitespace
    pub fn normalize(&self, text: &str) -> String {
        let mut result = collapse_whitespace(&text.to_lowercase());

        // Corrections are applied longest-first so overlapping entries stay deterministic
        let mut corrections: Vec<(&String, &String)> = self.corrections.iter().collect();
        corrections.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
        for (from, to) in corrections {
            result = replace_phrase(&result, from, to);
        }

        let mut final_text = result;
        loop {
            let mut changed = false;
            for filler in LEADING_FILLERS {
                if let Some(rest) = final_text.strip_prefix(filler) {
                    final_text = rest.trim().to_string();
                    changed = true;
                    break;
                }
            }
            if !changed {
                break;
            }
        }

        final_text
    }
}

/// Remove everything up to and including the last whole-word occurrence of
/// each prefix, trying the prefixes in order
pub fn strip_through_last(text: &str, prefixes: &[&str]) -> String {
    let mut result = text.trim().to_string();
    for prefix in prefixes {
        let padded = format!(" {} ", result);
        if let Some(idx) = padded.rfind(&format!(" {} ", prefix)) {
            result = padded[idx + prefix.len() + 1..].trim().to_string();
        }
    }
    result
}

/// Clean an extracted argument according to its style
pub fn normalize_argument(argument: &str, style: ArgumentStyle) -> String {
    let tokens = argument
        .split_whitespace()
        .filter(|token| *token != "empty");

    match style {
        ArgumentStyle::Words => tokens.collect::<Vec<_>>().join(" "),
        ArgumentStyle::Compact => tokens.collect(),
        ArgumentStyle::Address => tokens
            .map(|token| match token {
                "dash" | "hyphen" => "-",
                "underscore" => "_",
                "at" | "art" | "hat" | "hart" => "@",
                "dot" => ".",
                other => other,
            })
            .collect(),
        ArgumentStyle::Key => tokens
            .map(|token| match token {
                "dash" | "hyphen" => "-",
                other => other,
            })
            .collect(),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace whole-word occurrences of `from` with `to`
fn replace_phrase(text: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return text.to_string();
    }
    let padded = format!(" {} ", text);
    let replaced = padded.replace(&format!(" {} ", from), &format!(" {} ", to));
    collapse_whitespace(&replaced)
}

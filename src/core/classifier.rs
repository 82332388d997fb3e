//! Utterance Classifier
//!
//! Maps free-form recognized text to a discrete [`Command`].

use crate::commands::Command;
use crate::core::grammar::Grammar;
use crate::core::text_normalizer::TextNormalizer;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use tracing::{debug, info};

/// One recognized transcript
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub heard_at: DateTime<Local>,
}

impl Utterance {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_lowercase(),
            heard_at: Local::now(),
        }
    }
}

/// Classifies utterances against a grammar
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    normalizer: TextNormalizer,
}

impl Classifier {
    pub fn new(corrections: HashMap<String, String>) -> Self {
        Self {
            normalizer: TextNormalizer::new(corrections),
        }
    }

    /// Classify a transcript. Same text and grammar always give the same command.
    pub fn classify(&self, text: &str, grammar: &Grammar) -> Command {
        let normalized = self.normalizer.normalize(text);
        if normalized.is_empty() {
            return Command::Unknown(String::new());
        }

        match grammar.first_match(&normalized) {
            Some((rule, command)) => {
                info!("🎯 Matched command: {} (rule: '{}')", command.name(), rule);
                command
            }
            None => {
                debug!(
                    "No command matched on {} for: '{}'",
                    grammar.screen(),
                    normalized
                );
                Command::Unknown(normalized)
            }
        }
    }
}

/// Classify with no configured corrections
pub fn classify(text: &str, grammar: &Grammar) -> Command {
    Classifier::default().classify(text, grammar)
}

//! Core processing modules
//!
//! Contains the utterance classifier, its grammar table and the text
//! normalization it relies on.

pub mod classifier;
pub mod grammar;
pub mod text_normalizer;

pub use classifier::{classify, Classifier, Utterance};
pub use grammar::Grammar;

/*
 * This module contains quality of life structs for the conversion functions.
 * The `ConvertConfig` struct gathers the knobs shared by the prediction
 * reader and the span extractor; it implements the Default trait and can be
 * customized through `ConvertConfigBuilder`.
*/
use std::fmt::Display;

/// Sentence separator markers used by common tagger output formats.
pub const DEFAULT_SEPARATORS: [&str; 2] = ["-DOCSTART-", "-X-"];

#[derive(Debug, Clone, PartialEq, Eq)]
/// Options of a prediction-to-corpus conversion run.
pub struct ConvertConfig {
    /// A prediction line whose first field equals one of these markers ends
    /// the current sentence.
    separators: Vec<String>,
    /// The character separating a tag's prefix from its type suffix, as in
    /// `B-GENE`.
    delimiter: char,
    /// With `strict` set, an `I-*` tag with no preceding `B-*` is a fatal
    /// error instead of an implicit span start.
    strict: bool,
}

impl ConvertConfig {
    pub fn separators(&self) -> &[String] {
        &self.separators
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn strict(&self) -> bool {
        self.strict
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        ConvertConfigBuilder::new().build()
    }
}

impl Display for ConvertConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Sentence separators: {:?}\n Tag delimiter: {}\n Strict inside tags: {}",
            self.separators, self.delimiter, self.strict
        )
    }
}

/// This builder can be used to build and customize a `ConvertConfig`
/// structure.
pub struct ConvertConfigBuilder {
    separators: Vec<String>,
    delimiter: char,
    strict: bool,
}

impl Default for ConvertConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvertConfigBuilder {
    pub fn new() -> Self {
        Self {
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
            delimiter: '-',
            strict: false,
        }
    }

    pub fn separators<S: Into<String>>(mut self, separators: Vec<S>) -> Self {
        self.separators = separators.into_iter().map(|s| s.into()).collect();
        self
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn build(self) -> ConvertConfig {
        ConvertConfig {
            separators: self.separators,
            delimiter: self.delimiter,
            strict: self.strict,
        }
    }
}

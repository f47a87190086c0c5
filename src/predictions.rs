/**
This module parses the token-per-line output of a sequence tagger. Each line
carries two or more whitespace-separated fields; the first field is the token
text and the last one its tag, so extra feature columns in between are
ignored. A blank line, or a line whose first field is one of the configured
sentence separators, ends the current sentence. Parsed sentences are
normalized to IOB2 before being returned.
*/
use crate::config::ConvertConfig;
use crate::schemes::{iobes_to_iob2, TagError, TokenTag};
use crate::align::PredictedSentence;
use std::error::Error;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::mem::take;
use std::path::Path;

#[derive(Debug)]
/// Enum of errors wrapping the failures of prediction reading: either the
/// input could not be read or a tag in it is invalid.
pub enum PredictionError {
    Io(std::io::Error),
    Tag(TagError),
}

impl From<std::io::Error> for PredictionError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<TagError> for PredictionError {
    fn from(value: TagError) -> Self {
        Self::Tag(value)
    }
}

impl Display for PredictionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => std::fmt::Display::fmt(&e, f),
            Self::Tag(e) => e.fmt(f),
        }
    }
}

impl Error for PredictionError {}

/// Reads predicted sentences from a buffered reader and normalizes their
/// tags to IOB2. Empty sentences (consecutive separators, leading or
/// trailing blank lines) are discarded.
pub fn read_predictions<R: BufRead>(
    reader: R,
    config: &ConvertConfig,
) -> Result<Vec<PredictedSentence>, PredictionError> {
    let mut sentences: Vec<PredictedSentence> = Vec::new();
    let mut current: PredictedSentence = Vec::new();
    for read in reader.lines() {
        let line = read?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [] => sentences.push(take(&mut current)),
            [first, ..] if config.separators().iter().any(|s| s == first) => {
                sentences.push(take(&mut current))
            }
            [first, .., last] => current.push(TokenTag::new(*first, *last)),
            // A lone field doubles as both token text and tag.
            [only] => current.push(TokenTag::new(*only, *only)),
        }
    }
    sentences.push(current);
    sentences.retain(|s| !s.is_empty());
    sentences
        .into_iter()
        .map(|s| iobes_to_iob2(s, config.delimiter()))
        .collect::<Result<Vec<_>, TagError>>()
        .map_err(PredictionError::from)
}

pub fn load_predictions(
    path: &Path,
    config: &ConvertConfig,
) -> Result<Vec<PredictedSentence>, PredictionError> {
    read_predictions(BufReader::new(File::open(path)?), config)
}

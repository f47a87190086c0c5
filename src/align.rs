/**
This module re-associates predicted token/tag sentences with the gold
sentences they were produced from. Tokenizers upstream of a tagger may
silently reformat or reorder sentences on whitespace or punctuation, so the
association goes through whitespace-insensitive text equality:

1. an equality probe first checks whether the order already corresponds
   pairwise, in which case the predictions are returned untouched;
2. otherwise predictions are reassigned to gold positions by stripped-text
   lookup, first-in-first-out per duplicate text;
3. the final pairing is verified position by position.

Every failure is fatal: no partial alignment is ever returned.
*/
use crate::corpus::{strip_spaces, Sentence};
use crate::schemes::TokenTag;
use ahash::AHashMap;
use itertools::Itertools;
use std::collections::{BTreeMap, VecDeque};
use std::error::Error;
use std::fmt::Display;
use tracing::debug;

/// An ordered sequence of token/tag pairs forming one predicted sentence.
pub type PredictedSentence = Vec<TokenTag>;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Errors raised while aligning predictions with gold sentences.
pub enum AlignError {
    /// The gold corpus and the predictions do not have the same number of
    /// sentences.
    CountMismatch { gold: usize, predicted: usize },
    /// A predicted sentence's stripped text matches no remaining gold
    /// sentence.
    UnmatchedText(String),
    /// After reordering, a pairing still disagrees on stripped text.
    TextMismatch { gold: String, predicted: String },
}

impl Display for AlignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CountMismatch { gold, predicted } => {
                write!(f, "sentence number mismatch: {} vs {}", gold, predicted)
            }
            Self::UnmatchedText(text) => {
                write!(f, "failed to match predicted text \"{}\"", text)
            }
            Self::TextMismatch { gold, predicted } => {
                write!(f, "text mismatch: \"{}\" vs \"{}\"", gold, predicted)
            }
        }
    }
}

impl Error for AlignError {}

/// Reconstructs the text of a predicted sentence by joining its token texts
/// with single spaces. Space placement is whatever the tokenizer made of it,
/// hence all comparisons against gold text strip spaces first.
pub(crate) fn joined_text(sentence: &[TokenTag]) -> String {
    sentence.iter().map(|t| t.token.as_str()).join(" ")
}

fn texts_match(gold: &[Sentence], predictions: &[PredictedSentence]) -> bool {
    gold.iter()
        .zip(predictions)
        .all(|(sentence, prediction)| {
            strip_spaces(&sentence.text) == strip_spaces(&joined_text(prediction))
        })
}

/// Reassigns each predicted sentence to the oldest unused gold position
/// whose stripped text equals its own. Duplicate gold texts form a queue,
/// consumed first-in-first-out, which keeps the assignment deterministic
/// when a corpus contains verbatim-duplicate sentences.
fn reorder_predictions(
    gold: &[Sentence],
    predictions: Vec<PredictedSentence>,
) -> Result<Vec<PredictedSentence>, AlignError> {
    let mut text_to_index: AHashMap<String, VecDeque<usize>> = AHashMap::new();
    for (i, sentence) in gold.iter().enumerate() {
        text_to_index
            .entry(strip_spaces(&sentence.text))
            .or_default()
            .push_back(i);
    }
    let mut indexed: BTreeMap<usize, PredictedSentence> = BTreeMap::new();
    for prediction in predictions {
        let pred_text = joined_text(&prediction);
        let key = strip_spaces(&pred_text);
        let index = match text_to_index.get_mut(&key).and_then(|q| q.pop_front()) {
            Some(index) => index,
            None => return Err(AlignError::UnmatchedText(pred_text)),
        };
        indexed.insert(index, prediction);
    }
    Ok(indexed.into_values().collect())
}

/// Aligns the predicted sentences with the gold sentences so that position
/// `i` of the result corresponds to gold position `i`. When the order
/// already matches pairwise, the predictions are returned unchanged; the
/// reordering fallback only runs after a failed probe. The returned pairing
/// is verified position by position either way.
pub fn align_predictions(
    gold: &[Sentence],
    predictions: Vec<PredictedSentence>,
) -> Result<Vec<PredictedSentence>, AlignError> {
    if gold.len() != predictions.len() {
        return Err(AlignError::CountMismatch {
            gold: gold.len(),
            predicted: predictions.len(),
        });
    }
    let predictions = if texts_match(gold, &predictions) {
        predictions
    } else {
        debug!("prediction order does not match the gold sentences, reordering");
        reorder_predictions(gold, predictions)?
    };
    for (sentence, prediction) in gold.iter().zip(&predictions) {
        let pred_text = joined_text(prediction);
        if strip_spaces(&sentence.text) != strip_spaces(&pred_text) {
            return Err(AlignError::TextMismatch {
                gold: sentence.text.clone(),
                predicted: pred_text,
            });
        }
    }
    Ok(predictions)
}

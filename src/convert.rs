/*
 * High level driver tying the aligner and the span extractor together. The
 * `convert_predictions` function takes a gold corpus and a set of predicted
 * sentences and produces gold-style mention lines, one per predicted span.
*/
use crate::align::{align_predictions, AlignError, PredictedSentence};
use crate::config::ConvertConfig;
use crate::corpus::{Mention, Sentence};
use crate::schemes::TagError;
use crate::spans::extract_spans;
use std::error::Error;
use std::fmt::Display;

#[derive(Debug)]
/// Wrapper around the errors raised while converting predictions.
pub enum ConvertError {
    Align(AlignError),
    Tag(TagError),
}

impl Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Align(err) => write!(f, "{}", err),
            Self::Tag(err) => write!(f, "{}", err),
        }
    }
}

impl Error for ConvertError {}

impl From<AlignError> for ConvertError {
    fn from(value: AlignError) -> Self {
        Self::Align(value)
    }
}

impl From<TagError> for ConvertError {
    fn from(value: TagError) -> Self {
        Self::Tag(value)
    }
}

/// Converts predicted sentences into mention lines expressed against the
/// gold corpus. The predictions are first aligned on the gold sentence
/// order, then each sentence is scanned for tagged spans. Offsets in the
/// returned mentions ignore whitespace, matching the gold annotation
/// convention.
pub fn convert_predictions(
    gold: &[Sentence],
    predictions: Vec<PredictedSentence>,
    config: &ConvertConfig,
) -> Result<Vec<Mention>, ConvertError> {
    let aligned = align_predictions(gold, predictions)?;
    let mut mentions = Vec::new();
    for (sentence, predicted) in gold.iter().zip(aligned.iter()) {
        let spans = extract_spans(predicted, config.delimiter(), config.strict())?;
        for span in spans {
            mentions.push(Mention {
                sent_id: sentence.id.clone(),
                start: span.start,
                end: span.end,
                text: span.text,
            });
        }
    }
    Ok(mentions)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::schemes::TokenTag;

    fn gold_sentences() -> Vec<Sentence> {
        vec![
            Sentence::new("S001".to_string(), "the Bcl 2 gene".to_string()),
            Sentence::new("S002".to_string(), "no genes here".to_string()),
        ]
    }

    fn tagged(pairs: &[(&str, &str)]) -> PredictedSentence {
        pairs
            .iter()
            .map(|(token, tag)| TokenTag::new(*token, *tag))
            .collect()
    }

    #[test]
    fn test_convert_produces_mentions() {
        let gold = gold_sentences();
        let predictions = vec![
            tagged(&[
                ("the", "O"),
                ("Bcl", "B-GENE"),
                ("2", "I-GENE"),
                ("gene", "O"),
            ]),
            tagged(&[("no", "O"), ("genes", "O"), ("here", "O")]),
        ];
        let mentions =
            convert_predictions(&gold, predictions, &ConvertConfig::default()).unwrap();
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].sent_id, "S001");
        assert_eq!(mentions[0].start, 3);
        assert_eq!(mentions[0].end, 6);
        assert_eq!(mentions[0].text, "Bcl 2");
        assert_eq!(mentions[0].to_string(), "S001|3 6|Bcl 2");
    }

    #[test]
    fn test_convert_aligns_before_extracting() {
        let gold = gold_sentences();
        let predictions = vec![
            tagged(&[("no", "O"), ("genes", "O"), ("here", "O")]),
            tagged(&[
                ("the", "O"),
                ("Bcl", "B-GENE"),
                ("2", "I-GENE"),
                ("gene", "O"),
            ]),
        ];
        let mentions =
            convert_predictions(&gold, predictions, &ConvertConfig::default()).unwrap();
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].sent_id, "S001");
    }

    #[test]
    fn test_convert_propagates_count_mismatch() {
        let gold = gold_sentences();
        let predictions = vec![tagged(&[("the", "O")])];
        let err =
            convert_predictions(&gold, predictions, &ConvertConfig::default()).unwrap_err();
        assert!(matches!(err, ConvertError::Align(_)));
        assert_eq!(err.to_string(), "sentence number mismatch: 2 vs 1");
    }

    #[test]
    fn test_convert_propagates_tag_errors_in_strict_mode() {
        let gold = vec![Sentence::new("S001".to_string(), "Rag1".to_string())];
        let predictions = vec![tagged(&[("Rag1", "I-GENE")])];
        let config = crate::config::ConvertConfigBuilder::new().strict(true).build();
        let err = convert_predictions(&gold, predictions, &config).unwrap_err();
        assert!(matches!(err, ConvertError::Tag(TagError::DanglingInside(_))));
    }
}

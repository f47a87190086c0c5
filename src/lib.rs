/*!
This library converts between the annotation formats of the BioCreative II
Gene Mention corpus. It is built with a focus on performance and soudness.
# FORMATS
The following representations are understood:
* Gold mention lines: `SENTID|START END|TEXT`, where the offsets count only
    the non-whitespace characters of the sentence and `END` is inclusive.
* Gold sentence lines: `SENTID TEXT`, one sentence per line.
* Standoff: one `T<n>\tGENE <start> <end>\t<text>` line per annotation, with
    literal half-open character offsets into the sentence text.
* Predictions: one token per line, first field the token and last field its
    tag; a blank line or a separator marker such as `-DOCSTART-` ends the
    sentence.

Tag sequences may use the IOB2 or IOBES scheme; IOBES input is normalized to
IOB2 before spans are extracted.

## More information about the corpus
* [BioCreative II](https://biocreative.bioinformatics.udel.edu/tasks/biocreative-ii/task-1a-gene-mention-tagging/)
* [Wikipedia](https://en.wikipedia.org/wiki/Inside%E2%80%93outside%E2%80%93beginning_(tagging))

# Terminology
* A mention is a gold annotation line, pointing at a sentence by id with
    whitespace-ignoring offsets.
* An annotation is the literal-offset form of a mention, attached to its
    sentence and ready to be rendered as standoff.
* A tag is a string such as `B-GENE`, made of a one-letter prefix, a
    delimiter and a type suffix. `O` carries no suffix.
* A span is a maximal run of tokens tagged as one entity, recovered from a
    predicted sentence.
*/

mod align;
mod config;
mod convert;
mod corpus;
mod predictions;
mod schemes;
mod spans;
mod write;

// The public api starts here
pub use align::{align_predictions, AlignError, PredictedSentence};

pub use config::{ConvertConfig, ConvertConfigBuilder, DEFAULT_SEPARATORS};

pub use convert::{convert_predictions, ConvertError};

pub use corpus::{
    assemble_corpus, load_corpus, load_mentions, load_sentences, read_mentions, read_sentences,
    Annotation, AppliedRewrite, Corpus, FormatError, LoadError, Mention, Sentence,
};

pub use predictions::{load_predictions, read_predictions, PredictionError};

pub use schemes::{iobes_to_iob2, normalize_tag, Prefix, TagError, TokenTag};

pub use spans::{extract_spans, TokenSpan};

pub use write::{write_mentions, write_standoff, write_standoff_dir};

/// Main entrypoint for the prediction side of the library. Reads token-tag
/// predictions from a reader, aligns them on the gold corpus and returns
/// the recovered mentions in gold line format.
///
/// * `gold`: Gold sentences the predictions were produced from
/// * `reader`: Token-per-line prediction input
/// * `config`: Separator markers, tag delimiter and strictness
///
/// #Example
/// ```rust
/// use bc2gm::{predictions_to_mentions, ConvertConfig, Sentence};
/// use std::io::Cursor;
///
/// let gold = vec![Sentence::new("S001", "the Bcl 2 gene")];
/// let input = "the O\nBcl B-GENE\n2 I-GENE\ngene O\n";
///
/// let mentions =
///     predictions_to_mentions(&gold, Cursor::new(input), &ConvertConfig::default()).unwrap();
/// assert_eq!(mentions.len(), 1);
/// assert_eq!(mentions[0].to_string(), "S001|3 6|Bcl 2");
/// ```
pub fn predictions_to_mentions<R: std::io::BufRead>(
    gold: &[Sentence],
    reader: R,
    config: &ConvertConfig,
) -> Result<Vec<Mention>, PipelineError> {
    let predicted = read_predictions(reader, config)?;
    let mentions = convert_predictions(gold, predicted, config)?;
    Ok(mentions)
}

#[derive(Debug)]
/// Wrapper around the errors raised by the full prediction pipeline.
pub enum PipelineError {
    Read(PredictionError),
    Convert(ConvertError),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read(err) => write!(f, "{}", err),
            Self::Convert(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<PredictionError> for PipelineError {
    fn from(value: PredictionError) -> Self {
        Self::Read(value)
    }
}

impl From<ConvertError> for PipelineError {
    fn from(value: ConvertError) -> Self {
        Self::Convert(value)
    }
}

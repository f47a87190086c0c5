/**
This module holds the in-memory representation of a BC2GM corpus and the
parsers for the two gold file formats:

* the sentence file, one `SENTID TEXT` record per line;
* the mention file, one `SENTID|START END|TEXT` record per line, where
  `START`/`END` are character offsets that ignore whitespace and `END` is
  inclusive.

Both offsets conventions live side by side here. A [`Mention`] carries the
whitespace-ignoring offsets of the source encoding; once attached to its
[`Sentence`], it becomes an [`Annotation`] with literal half-open character
offsets into the sentence text. The translation goes through the sentence's
offset map, built once per sentence.
*/
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Deref;
use std::path::Path;
use tracing::warn;

/// Removes every whitespace character of `text`. The BC2GM encoding counts
/// offsets over the remaining characters only.
pub(crate) fn strip_spaces(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Errors raised while parsing or verifying gold corpus data. Every variant
/// is fatal: a single malformed record aborts the whole conversion run.
pub enum FormatError {
    /// A mention line does not have exactly three pipe-delimited fields.
    FieldCount {
        line_no: usize,
        found: usize,
        line: String,
    },
    /// The `START END` field of a mention line could not be parsed into two
    /// integers.
    SpanSyntax { line_no: usize, line: String },
    /// The whitespace-stripped mention text disagrees with the declared span
    /// width (`end - start + 1`).
    WidthMismatch {
        text: String,
        width: usize,
        start: usize,
        end: usize,
    },
    /// A sentence line has no space separating the sentence id from the text.
    SentenceSyntax { line_no: usize, line: String },
    /// A whitespace-ignoring offset points past the last non-whitespace
    /// character of the sentence.
    OffsetOutOfRange {
        sent_id: String,
        index: usize,
        len: usize,
    },
    /// The literal substring extracted through the offset map disagrees with
    /// the declared mention text.
    TextMismatch { annotation: String, sentence: String },
    /// A mention references a sentence id absent from the sentence file.
    UnknownSentence { sent_id: String },
}

impl Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldCount {
                line_no,
                found,
                line,
            } => write!(
                f,
                "expected 3 fields, got {} at line {}: {}",
                found, line_no, line
            ),
            Self::SpanSyntax { line_no, line } => {
                write!(f, "failed to parse line {}: {}", line_no, line)
            }
            Self::WidthMismatch {
                text,
                width,
                start,
                end,
            } => write!(
                f,
                "text \"{}\" has length {}, span {} {} expects {}",
                text,
                width,
                start,
                end,
                end.saturating_sub(*start) + 1
            ),
            Self::SentenceSyntax { line_no, line } => {
                write!(f, "missing id separator at line {}: {}", line_no, line)
            }
            Self::OffsetOutOfRange {
                sent_id,
                index,
                len,
            } => write!(
                f,
                "offset {} is out of range for sentence {} with {} non-whitespace characters",
                index, sent_id, len
            ),
            Self::TextMismatch {
                annotation,
                sentence,
            } => write!(
                f,
                "text mismatch: annotation \"{}\", sentence \"{}\"",
                annotation, sentence
            ),
            Self::UnknownSentence { sent_id } => {
                write!(f, "mention references unknown sentence {}", sent_id)
            }
        }
    }
}

impl Error for FormatError {}

#[derive(Debug)]
/// Enum of errors wrapping the failures of the loading functions: either the
/// file could not be read or a record in it is malformed.
pub enum LoadError {
    Io(std::io::Error),
    Format(FormatError),
}

impl From<std::io::Error> for LoadError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<FormatError> for LoadError {
    fn from(value: FormatError) -> Self {
        Self::Format(value)
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => std::fmt::Display::fmt(&e, f),
            Self::Format(e) => e.fmt(f),
        }
    }
}

impl Error for LoadError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// One gene mention in the BC2GM span encoding: the owning sentence id, a
/// whitespace-ignoring start offset, a whitespace-ignoring *inclusive* end
/// offset and the annotated text. This is both the parsed form of a gold
/// mention line and the output unit of prediction conversion.
pub struct Mention {
    pub sent_id: String,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Mention {
    pub fn new(sent_id: impl Into<String>, start: usize, end: usize, text: impl Into<String>) -> Self {
        Mention {
            sent_id: sent_id.into(),
            start,
            end,
            text: text.into(),
        }
    }
}

/// Serializes back to the BC2GM mention line format.
impl Display for Mention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}|{} {}|{}",
            self.sent_id, self.start, self.end, self.text
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// An annotation attached to a sentence, in literal character offsets
/// (half-open, counted over unicode characters of the sentence text). Built
/// from a [`Mention`] by [`Sentence::attach`]; never modified afterwards.
pub struct Annotation {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Annotation {
    /// Renders the annotation as one standoff line, `idx` being the 1-based
    /// rank of the annotation within its sentence.
    pub fn to_standoff(&self, idx: usize) -> String {
        format!("T{}\tGENE {} {}\t{}", idx, self.start, self.end, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A gold sentence: its id, its literal text, the annotations attached so
/// far and the offset map translating whitespace-ignoring offsets into
/// literal ones. `offset_map[i]` is the literal character index of the i-th
/// non-whitespace character of `text`.
pub struct Sentence {
    pub id: String,
    pub text: String,
    offset_map: Vec<usize>,
    annotations: Vec<Annotation>,
}

impl Sentence {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let offset_map = text
            .chars()
            .enumerate()
            .filter(|(_, c)| !c.is_whitespace())
            .map(|(i, _)| i)
            .collect();
        Sentence {
            id: id.into(),
            text,
            offset_map,
            annotations: Vec::new(),
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Translates a whitespace-ignoring inclusive span into a literal
    /// half-open character span. The annotated text itself may contain
    /// embedded spaces, the source encoding simply does not count them.
    fn translate(&self, start: usize, end: usize) -> Result<(usize, usize), FormatError> {
        let len = self.offset_map.len();
        let out_of_range = |index| FormatError::OffsetOutOfRange {
            sent_id: self.id.clone(),
            index,
            len,
        };
        let literal_start = *self.offset_map.get(start).ok_or_else(|| out_of_range(start))?;
        let literal_end = *self.offset_map.get(end).ok_or_else(|| out_of_range(end))? + 1;
        Ok((literal_start, literal_end))
    }

    /// Attaches a mention to this sentence, translating its offsets into
    /// literal character offsets. The original whitespace-ignoring offsets
    /// are discarded once the annotation is built.
    pub fn attach(&mut self, mention: Mention) -> Result<(), FormatError> {
        let (start, end) = self.translate(mention.start, mention.end)?;
        self.annotations.push(Annotation {
            start,
            end,
            text: mention.text,
        });
        Ok(())
    }

    fn char_slice(&self, start: usize, end: usize) -> String {
        self.text.chars().skip(start).take(end - start).collect()
    }

    /// Checks that, for every attached annotation, slicing the sentence text
    /// at the literal offsets reproduces the annotated text exactly,
    /// embedded spaces included. A mismatch indicates a corrupt source
    /// record.
    pub fn verify_annotations(&self) -> Result<(), FormatError> {
        for annotation in &self.annotations {
            let extracted = self.char_slice(annotation.start, annotation.end);
            if extracted != annotation.text {
                return Err(FormatError::TextMismatch {
                    annotation: annotation.text.clone(),
                    sentence: extracted,
                });
            }
        }
        Ok(())
    }

    /// Renders the annotations of this sentence as standoff lines, numbered
    /// from 1 in attachment order.
    pub fn to_standoff(&self) -> Vec<String> {
        self.annotations
            .iter()
            .enumerate()
            .map(|(i, a)| a.to_standoff(i + 1))
            .collect()
    }
}

// Exact full-line substitutions for known errors in the source data, applied
// before parsing.
const LINE_REWRITES: [(&str, &str); 4] = [
    (
        "P02196565T0000|162 187|translation upstream factor",
        "P02196565T0000|163 187|translation upstream factor",
    ),
    (
        "P01655713A0294|58 58|S-deficient",
        "P01655713A0294|58 68|S-deficient",
    ),
    ("P02839716A1907|32 34|E2", "P02839716A1907|32 33|E2"),
    (
        "P09139910A0350|197 210|2.6 kbp (pOST2)",
        "P09139910A0350|197 209|2.6 kbp (pOST2)",
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Record of one known-bad mention line that was substituted before parsing.
/// The list of applied rewrites is returned to the caller as an audit trail.
pub struct AppliedRewrite {
    pub line_no: usize,
    pub original: &'static str,
    pub replacement: &'static str,
}

/// Reads BC2GM mentions from a buffered reader. Known-bad lines are replaced
/// through the fixed substitution table first; every substitution is logged
/// and reported back alongside the parsed mentions.
pub fn read_mentions<R: BufRead>(
    reader: R,
) -> Result<(Vec<Mention>, Vec<AppliedRewrite>), LoadError> {
    let mut mentions = Vec::new();
    let mut rewrites = Vec::new();
    for (ln, read) in reader.lines().enumerate() {
        let line_no = ln + 1;
        let mut line = read?;
        if let Some(&(original, replacement)) =
            LINE_REWRITES.iter().find(|(original, _)| *original == line)
        {
            warn!(line_no, original, replacement, "replacing known-bad mention line");
            rewrites.push(AppliedRewrite {
                line_no,
                original,
                replacement,
            });
            line = replacement.to_string();
        }
        mentions.push(parse_mention_line(&line, line_no)?);
    }
    Ok((mentions, rewrites))
}

fn parse_mention_line(line: &str, line_no: usize) -> Result<Mention, FormatError> {
    let fields: Vec<&str> = line.split('|').collect();
    let [sent_id, span, text] = fields.as_slice() else {
        return Err(FormatError::FieldCount {
            line_no,
            found: fields.len(),
            line: line.to_string(),
        });
    };
    let span_syntax = || FormatError::SpanSyntax {
        line_no,
        line: line.to_string(),
    };
    let (start, end) = span.split_once(' ').ok_or_else(span_syntax)?;
    let start: usize = start.parse().map_err(|_| span_syntax())?;
    let end: usize = end.parse().map_err(|_| span_syntax())?;
    let stripped = strip_spaces(text);
    let width = stripped.chars().count();
    if end < start || width != end - start + 1 {
        return Err(FormatError::WidthMismatch {
            text: stripped,
            width,
            start,
            end,
        });
    }
    Ok(Mention::new(*sent_id, start, end, *text))
}

/// Reads BC2GM sentences from a buffered reader. The first space of each
/// line separates the sentence id from the text; the text itself may contain
/// further spaces.
pub fn read_sentences<R: BufRead>(reader: R) -> Result<Vec<Sentence>, LoadError> {
    let mut sentences = Vec::new();
    for (ln, read) in reader.lines().enumerate() {
        let line = read?;
        let (id, text) = line.split_once(' ').ok_or_else(|| FormatError::SentenceSyntax {
            line_no: ln + 1,
            line: line.clone(),
        })?;
        sentences.push(Sentence::new(id, text));
    }
    Ok(sentences)
}

pub fn load_mentions(path: &Path) -> Result<(Vec<Mention>, Vec<AppliedRewrite>), LoadError> {
    read_mentions(BufReader::new(File::open(path)?))
}

pub fn load_sentences(path: &Path) -> Result<Vec<Sentence>, LoadError> {
    read_sentences(BufReader::new(File::open(path)?))
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A fully loaded and verified corpus: the sentences in file order, each one
/// carrying its attached annotations, plus the audit trail of data
/// corrections applied while reading the mention file.
pub struct Corpus {
    sentences: Vec<Sentence>,
    rewrites: Vec<AppliedRewrite>,
}

impl Deref for Corpus {
    type Target = Vec<Sentence>;

    fn deref(&self) -> &Self::Target {
        &self.sentences
    }
}

impl Corpus {
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn applied_rewrites(&self) -> &[AppliedRewrite] {
        &self.rewrites
    }
}

/// Loads a BC2GM corpus from its sentence text file and its mention file,
/// attaches every mention to its sentence and verifies that every translated
/// annotation reproduces its declared text.
pub fn load_corpus(txt: &Path, ann: &Path) -> Result<Corpus, LoadError> {
    let sentences = load_sentences(txt)?;
    let (mentions, rewrites) = load_mentions(ann)?;
    Ok(assemble_corpus(sentences, mentions, rewrites)?)
}

/// Attaches every mention to its sentence and verifies the result. The
/// sentences keep their file order; mentions naming an unknown sentence id
/// are fatal.
pub fn assemble_corpus(
    mut sentences: Vec<Sentence>,
    mentions: Vec<Mention>,
    rewrites: Vec<AppliedRewrite>,
) -> Result<Corpus, FormatError> {
    let index: AHashMap<String, usize> = sentences
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id.clone(), i))
        .collect();
    for mention in mentions {
        let i = *index
            .get(mention.sent_id.as_str())
            .ok_or_else(|| FormatError::UnknownSentence {
                sent_id: mention.sent_id.clone(),
            })?;
        sentences[i].attach(mention)?;
    }
    for sentence in &sentences {
        sentence.verify_annotations()?;
    }
    Ok(Corpus {
        sentences,
        rewrites,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{self, TestResult};
    use std::io::Cursor;

    #[test]
    fn test_offset_map_skips_whitespace() {
        let sentence = Sentence::new("S1", "ab cd  e");
        // Non-whitespace characters sit at literal indices 0,1,3,4,7.
        assert_eq!(sentence.offset_map, vec![0, 1, 3, 4, 7]);
    }

    #[test]
    fn test_attach_translates_offsets() {
        let mut sentence = Sentence::new("S1", "the Bcl 2 gene");
        sentence
            .attach(Mention::new("S1", 3, 6, "Bcl 2"))
            .unwrap();
        let annotation = &sentence.annotations()[0];
        assert_eq!((annotation.start, annotation.end), (4, 9));
        sentence.verify_annotations().unwrap();
    }

    #[test]
    fn test_verify_reports_both_texts() {
        let mut sentence = Sentence::new("S1", "the Bcl 2 gene");
        sentence
            .attach(Mention::new("S1", 3, 6, "Bcl 3"))
            .unwrap();
        let err = sentence.verify_annotations().unwrap_err();
        assert_eq!(
            err,
            FormatError::TextMismatch {
                annotation: String::from("Bcl 3"),
                sentence: String::from("Bcl 2"),
            }
        );
    }

    #[test]
    fn test_attach_out_of_range() {
        let mut sentence = Sentence::new("S1", "short");
        let err = sentence
            .attach(Mention::new("S1", 0, 12, "unreachable.."))
            .unwrap_err();
        assert_eq!(
            err,
            FormatError::OffsetOutOfRange {
                sent_id: String::from("S1"),
                index: 12,
                len: 5,
            }
        );
    }

    #[test]
    fn test_read_mentions() {
        let data = "S1|0 3|Bcl2\nS2|5 10|kinase\n";
        let (mentions, rewrites) = read_mentions(Cursor::new(data)).unwrap();
        assert_eq!(
            mentions,
            vec![
                Mention::new("S1", 0, 3, "Bcl2"),
                Mention::new("S2", 5, 10, "kinase"),
            ]
        );
        assert!(rewrites.is_empty());
    }

    #[test]
    fn test_read_mentions_field_count() {
        let err = read_mentions(Cursor::new("S1|0 3\n")).unwrap_err();
        match err {
            LoadError::Format(FormatError::FieldCount { line_no, found, .. }) => {
                assert_eq!((line_no, found), (1, 2));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_read_mentions_span_syntax() {
        let err = read_mentions(Cursor::new("S1|zero three|Bcl2\n")).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Format(FormatError::SpanSyntax { line_no: 1, .. })
        ));
    }

    #[test]
    fn test_read_mentions_width_mismatch() {
        // "Bcl2" has 4 non-space characters but the span declares 3.
        let err = read_mentions(Cursor::new("S1|0 2|Bcl2\n")).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Format(FormatError::WidthMismatch {
                width: 4,
                start: 0,
                end: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_read_mentions_applies_rewrites() {
        let data = "P02839716A1907|32 34|E2\n";
        let (mentions, rewrites) = read_mentions(Cursor::new(data)).unwrap();
        assert_eq!(mentions, vec![Mention::new("P02839716A1907", 32, 33, "E2")]);
        assert_eq!(
            rewrites,
            vec![AppliedRewrite {
                line_no: 1,
                original: "P02839716A1907|32 34|E2",
                replacement: "P02839716A1907|32 33|E2",
            }]
        );
    }

    #[test]
    fn test_read_sentences() {
        let data = "S1 the Bcl 2 gene\nS2 another sentence\n";
        let sentences = read_sentences(Cursor::new(data)).unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].id, "S1");
        assert_eq!(sentences[0].text, "the Bcl 2 gene");
        assert_eq!(sentences[1].text, "another sentence");
    }

    #[test]
    fn test_read_sentences_missing_separator() {
        let err = read_sentences(Cursor::new("S1\n")).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Format(FormatError::SentenceSyntax { line_no: 1, .. })
        ));
    }

    #[test]
    fn test_assemble_corpus_unknown_sentence() {
        let sentences = vec![Sentence::new("S1", "some text")];
        let mentions = vec![Mention::new("S9", 0, 3, "some")];
        let err = assemble_corpus(sentences, mentions, vec![]).unwrap_err();
        assert_eq!(
            err,
            FormatError::UnknownSentence {
                sent_id: String::from("S9")
            }
        );
    }

    #[test]
    fn test_to_standoff() {
        let mut sentence = Sentence::new("S1", "the Bcl 2 gene and Rag1");
        sentence.attach(Mention::new("S1", 3, 6, "Bcl 2")).unwrap();
        sentence.attach(Mention::new("S1", 14, 17, "Rag1")).unwrap();
        assert_eq!(
            sentence.to_standoff(),
            vec![
                String::from("T1\tGENE 4 9\tBcl 2"),
                String::from("T2\tGENE 19 23\tRag1"),
            ]
        );
    }

    #[test]
    fn test_offset_round_trip_property() {
        fn round_trip(words: Vec<u8>, start: usize, width: usize) -> TestResult {
            // Build a sentence of short ascii words with irregular spacing.
            let text = words
                .iter()
                .enumerate()
                .map(|(i, b)| {
                    let sep = if i % 3 == 0 { "  " } else { " " };
                    format!("{}w{}", sep, b)
                })
                .collect::<String>();
            let sentence = Sentence::new("S1", text.trim_start());
            let stripped = strip_spaces(&sentence.text);
            let total = stripped.chars().count();
            if total == 0 {
                return TestResult::discard();
            }
            let start = start % total;
            let end = (start + width % total).min(total - 1);
            let (s, e) = sentence.translate(start, end).unwrap();
            let literal: String = sentence.text.chars().skip(s).take(e - s).collect();
            let expected: String = stripped.chars().skip(start).take(end - start + 1).collect();
            TestResult::from_bool(strip_spaces(&literal) == expected)
        }
        let mut qc = quickcheck::QuickCheck::new().tests(500);
        qc.quickcheck(round_trip as fn(Vec<u8>, usize, usize) -> TestResult);
    }
}

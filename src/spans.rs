/**
This module reconstructs mention spans from an IOB2 token/tag sequence. The
scan is a single left-to-right pass with a one-token lookahead: a trailing
sentinel stands in for the end of the sentence so that a mention still open
on the last token gets closed.

Offsets follow the whitespace-ignoring convention of the BC2GM encoding: the
running character counter advances by each token's length and never counts
the spaces between tokens, while the span text joins the token texts with
single spaces. The two views may therefore disagree on embedded spaces; the
corpus side reconciles them through the sentence offset map.
*/
use crate::schemes::{tag_prefix, Prefix, TagError, TokenTag};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::iter::once;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// A mention span reconstructed from a token/tag sequence, before it is
/// associated with a sentence id: whitespace-ignoring start and inclusive
/// end offsets, plus the token texts joined with single spaces.
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Display for TokenSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.start, self.end, self.text)
    }
}

/// Walks a token/tag sequence and returns every maximal contiguous run of
/// non-`O` tags as one [`TokenSpan`], in token order.
///
/// A `B` prefix opens a span (an `S` does too, for sequences that were not
/// normalized first). The span closes after the current token whenever the
/// next token's prefix does not continue it, i.e. is not `I` or `E`. An
/// inside tag arriving with no span open is treated as an implicit span
/// start; with `strict` set, the same situation is a
/// [`TagError::DanglingInside`] instead.
pub fn extract_spans(
    sentence: &[TokenTag],
    delimiter: char,
    strict: bool,
) -> Result<Vec<TokenSpan>, TagError> {
    let mut spans = Vec::new();
    let mut offset = 0usize;
    let mut span_start: Option<usize> = None;
    let mut tokens: Vec<&str> = Vec::new();
    for (curr, next) in sentence.iter().map(Some).chain(once(None)).tuple_windows() {
        let curr = match curr {
            Some(token_tag) => token_tag,
            // The sentinel is always the second element of a window.
            None => break,
        };
        let token_len = curr.token.chars().count();
        match tag_prefix(&curr.tag, delimiter)? {
            Prefix::B | Prefix::S => {
                span_start = Some(offset);
                tokens.clear();
            }
            Prefix::I | Prefix::E if span_start.is_none() => {
                if strict {
                    return Err(TagError::DanglingInside(curr.tag.clone()));
                }
                span_start = Some(offset);
                tokens.clear();
            }
            _ => {}
        }
        if let Some(start) = span_start {
            tokens.push(&curr.token);
            let next_continues = match next {
                Some(token_tag) => matches!(
                    tag_prefix(&token_tag.tag, delimiter)?,
                    Prefix::I | Prefix::E
                ),
                None => false,
            };
            if !next_continues {
                spans.push(TokenSpan {
                    start,
                    end: offset + token_len - 1,
                    text: tokens.join(" "),
                });
                span_start = None;
                tokens.clear();
            }
        }
        offset += token_len;
    }
    Ok(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(pairs: &[(&str, &str)]) -> Vec<TokenTag> {
        pairs
            .iter()
            .map(|(token, tag)| TokenTag::new(*token, *tag))
            .collect()
    }

    fn extract(pairs: &[(&str, &str)]) -> Vec<TokenSpan> {
        extract_spans(&sentence(pairs), '-', false).unwrap()
    }

    #[test]
    fn test_single_span() {
        let spans = extract(&[("Bcl", "B-GENE"), ("2", "I-GENE"), ("is", "O")]);
        assert_eq!(
            spans,
            vec![TokenSpan {
                start: 0,
                end: 3,
                text: String::from("Bcl 2"),
            }]
        );
    }

    #[test]
    fn test_span_reaching_sentence_end() {
        let spans = extract(&[("binds", "O"), ("Rag", "B-GENE"), ("1", "I-GENE")]);
        assert_eq!(
            spans,
            vec![TokenSpan {
                start: 5,
                end: 8,
                text: String::from("Rag 1"),
            }]
        );
    }

    #[test]
    fn test_multiple_disjoint_spans() {
        let spans = extract(&[
            ("Bcl2", "B-GENE"),
            ("and", "O"),
            ("Rag1", "B-GENE"),
            ("interact", "O"),
        ]);
        assert_eq!(
            spans,
            vec![
                TokenSpan {
                    start: 0,
                    end: 3,
                    text: String::from("Bcl2"),
                },
                TokenSpan {
                    start: 7,
                    end: 10,
                    text: String::from("Rag1"),
                },
            ]
        );
    }

    #[test]
    fn test_adjacent_spans_split_on_begin() {
        let spans = extract(&[("Bcl2", "B-GENE"), ("Rag1", "B-GENE")]);
        assert_eq!(
            spans,
            vec![
                TokenSpan {
                    start: 0,
                    end: 3,
                    text: String::from("Bcl2"),
                },
                TokenSpan {
                    start: 4,
                    end: 7,
                    text: String::from("Rag1"),
                },
            ]
        );
    }

    #[test]
    fn test_leading_inside_opens_span() {
        let spans = extract(&[("Bcl", "I-GENE"), ("2", "I-GENE"), ("is", "O")]);
        assert_eq!(
            spans,
            vec![TokenSpan {
                start: 0,
                end: 3,
                text: String::from("Bcl 2"),
            }]
        );
    }

    #[test]
    fn test_leading_inside_strict_mode() {
        let tokens = sentence(&[("Bcl", "I-GENE"), ("2", "I-GENE")]);
        let err = extract_spans(&tokens, '-', true).unwrap_err();
        assert_eq!(err, TagError::DanglingInside(String::from("I-GENE")));
    }

    #[test]
    fn test_empty_sentence() {
        assert!(extract(&[]).is_empty());
    }

    #[test]
    fn test_all_outside() {
        assert!(extract(&[("no", "O"), ("genes", "O"), ("here", "O")]).is_empty());
    }

    #[test]
    fn test_invalid_tag_aborts() {
        let tokens = sentence(&[("Bcl2", "B-GENE"), ("x", "Z-GENE")]);
        let err = extract_spans(&tokens, '-', false).unwrap_err();
        assert_eq!(err, TagError::InvalidPrefix(String::from("Z")));
    }

    #[test]
    fn test_unnormalized_iobes_sequence() {
        // S opens and closes a one-token span, E closes a running one.
        let spans = extract(&[
            ("p53", "S-GENE"),
            ("binds", "O"),
            ("Bcl", "B-GENE"),
            ("2", "E-GENE"),
        ]);
        assert_eq!(
            spans,
            vec![
                TokenSpan {
                    start: 0,
                    end: 2,
                    text: String::from("p53"),
                },
                TokenSpan {
                    start: 8,
                    end: 11,
                    text: String::from("Bcl 2"),
                },
            ]
        );
    }
}

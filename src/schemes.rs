/**
This module gives the tooling necessary to parse the tags attached to the
tokens of a predicted sentence and to rewrite a tag sequence from the IOBES
scheme into IOB2. The rewrite is purely local: each tag is mapped on its own,
without looking at its neighbours.
*/
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::error::Error;
use std::fmt::Display;

#[derive(Debug, PartialEq, Hash, Clone, Sequence, Eq)]
/// Prefix of a tag, specifying the place of a token in a mention. For
/// example, in `B-GENE` the prefix is `B` and marks the first token of a gene
/// mention. Prefixes are a single ascii character.
pub enum Prefix {
    I,
    O,
    B,
    E,
    S,
}

impl TryFrom<char> for Prefix {
    type Error = TagError;
    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'I' => Ok(Self::I),
            'O' => Ok(Self::O),
            'B' => Ok(Self::B),
            'E' => Ok(Self::E),
            'S' => Ok(Self::S),
            _ => Err(TagError::InvalidPrefix(String::from(value))),
        }
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Errors raised while reading the tag of a token. Every variant is fatal to
/// the conversion run.
pub enum TagError {
    /// The leading letter of the tag is not one of `I`, `O`, `B`, `E`, `S`.
    InvalidPrefix(String),
    /// The tag is the empty string.
    EmptyTag,
    /// An `I-*` tag arrived with no mention open. Only raised in strict mode;
    /// the default behaviour treats such a tag as an implicit mention start.
    DanglingInside(String),
}

impl Display for TagError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPrefix(tag) => {
                write!(f, "Could not parse the prefix of the tag: {}", tag)
            }
            Self::EmptyTag => write!(f, "Received an empty tag"),
            Self::DanglingInside(tag) => {
                write!(f, "Inside tag {} has no preceding begin tag", tag)
            }
        }
    }
}

impl Error for TagError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// A single token of a predicted sentence: the literal token text and its
/// scheme-encoded tag (`O`, `B-GENE`, `I-GENE`, ...).
pub struct TokenTag {
    pub token: String,
    pub tag: String,
}

impl TokenTag {
    pub fn new(token: impl Into<String>, tag: impl Into<String>) -> Self {
        TokenTag {
            token: token.into(),
            tag: tag.into(),
        }
    }
}

impl Display for TokenTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.token, self.tag)
    }
}

/// Parses the prefix of a tag. The prefix is the part of the tag located
/// before the first `delimiter`, or the whole tag when the delimiter is
/// absent (as in the bare `O` tag). A prefix longer than a single character
/// cannot be parsed.
pub(crate) fn tag_prefix(tag: &str, delimiter: char) -> Result<Prefix, TagError> {
    let head = tag.split(delimiter).next().unwrap_or(tag);
    let mut chars = head.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Err(TagError::EmptyTag),
        (Some(c), None) => Prefix::try_from(c),
        (Some(_), Some(_)) => Err(TagError::InvalidPrefix(tag.to_string())),
    }
}

/// Rewrites a single tag from IOBES to IOB2: `O`, `B-*` and `I-*` are
/// unchanged, `E-*` becomes `I-*` and `S-*` becomes `B-*`, keeping the type
/// suffix. Returns a borrowed tag whenever no rewrite is needed, which makes
/// the function idempotent on IOB2 input.
pub fn normalize_tag(tag: &str, delimiter: char) -> Result<Cow<'_, str>, TagError> {
    match tag_prefix(tag, delimiter)? {
        Prefix::O | Prefix::B | Prefix::I => Ok(Cow::Borrowed(tag)),
        Prefix::E => Ok(Cow::Owned(replace_prefix(tag, 'I'))),
        Prefix::S => Ok(Cow::Owned(replace_prefix(tag, 'B'))),
    }
}

// The prefix is a single char, checked by `tag_prefix`.
fn replace_prefix(tag: &str, prefix: char) -> String {
    let mut rewritten = String::with_capacity(tag.len());
    rewritten.push(prefix);
    rewritten.extend(tag.chars().skip(1));
    rewritten
}

/// Rewrites every tag of a predicted sentence from IOBES to IOB2. The rewrite
/// preserves the token order and never looks at neighbouring tags. An invalid
/// prefix anywhere in the sentence aborts the whole rewrite.
pub fn iobes_to_iob2(
    mut sentence: Vec<TokenTag>,
    delimiter: char,
) -> Result<Vec<TokenTag>, TagError> {
    for token_tag in sentence.iter_mut() {
        let rewritten = match normalize_tag(&token_tag.tag, delimiter)? {
            Cow::Borrowed(_) => None,
            Cow::Owned(tag) => Some(tag),
        };
        if let Some(tag) = rewritten {
            token_tag.tag = tag;
        }
    }
    Ok(sentence)
}

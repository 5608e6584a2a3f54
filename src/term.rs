//! Span-annotated terms and their `text-start-end` string form.
//!
//! The string form is the canonical key used for set membership while
//! scoring. Decoding splits from the right: the last two `-` fields are the
//! offsets and everything before them (hyphens included) is the text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};

/// A term annotated with its offsets in the sentence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    #[serde(rename = "term")]
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Term {
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Encode as `text-start-end`.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Decode a `text-start-end` string.
    ///
    /// Text ending in something that looks like `-number-number` is read
    /// back with those numbers as offsets; the format has no escaping.
    pub fn decode(encoded: &str) -> Result<Self> {
        let mut fields = encoded.rsplitn(3, '-');
        let end = fields.next();
        let start = fields.next();
        let text = fields.next();
        let (Some(text), Some(start), Some(end)) = (text, start, end) else {
            return Err(EvalError::term_codec(
                encoded,
                "expected at least two '-' separators",
            ));
        };
        let start = parse_offset(encoded, start)?;
        let end = parse_offset(encoded, end)?;
        Ok(Self::new(text, start, end))
    }
}

fn parse_offset(encoded: &str, field: &str) -> Result<usize> {
    field
        .parse()
        .map_err(|_| EvalError::term_codec(encoded, format!("offset {field:?} is not an integer")))
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.text, self.start, self.end)
    }
}

impl FromStr for Term {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Vertex decorators: the names of up to four attributes drawn at a vertex's
//! corners.
//!
//! Text form: four fields in the order north-west, north-east, south-east,
//! south-west, each terminated by `;`. A field is either empty (no decorator)
//! or a double-quoted label in which `"` and `\` are escaped with `\`.
//!
//! ```text
//! "degree";;"pinned";;
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::object::{ObjectStore, ObjectValue};

/// `decorators` attribute store.
pub type DecoratorsStore = ObjectStore<VertexDecorators>;

/// Corner decorators of a vertex.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexDecorators {
    /// North-west corner.
    pub north_west: Option<String>,
    /// North-east corner.
    pub north_east: Option<String>,
    /// South-east corner.
    pub south_east: Option<String>,
    /// South-west corner.
    pub south_west: Option<String>,
}

/// Error returned when parsing the decorators text form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecoratorsParseError {
    /// Input ended before four fields were read.
    #[error("unexpected end of decorators text")]
    UnexpectedEnd,
    /// A character other than the expected one was found.
    #[error("expected `{expected}` at byte {at}")]
    Expected {
        /// Expected character.
        expected: char,
        /// Byte offset of the offending character.
        at: usize,
    },
    /// An unsupported escape sequence.
    #[error("invalid escape `\\{escape}` at byte {at}")]
    InvalidEscape {
        /// Escaped character.
        escape: char,
        /// Byte offset of the backslash.
        at: usize,
    },
    /// Characters remained after the fourth field.
    #[error("trailing characters after byte {at}")]
    TrailingInput {
        /// Byte offset where the trailing input starts.
        at: usize,
    },
}

impl VertexDecorators {
    /// Decorators with every corner empty.
    pub const NONE: Self = Self {
        north_west: None,
        north_east: None,
        south_east: None,
        south_west: None,
    };

    /// Constructs decorators from corner labels.
    #[must_use]
    pub fn new(
        north_west: Option<&str>,
        north_east: Option<&str>,
        south_east: Option<&str>,
        south_west: Option<&str>,
    ) -> Self {
        Self {
            north_west: north_west.map(str::to_owned),
            north_east: north_east.map(str::to_owned),
            south_east: south_east.map(str::to_owned),
            south_west: south_west.map(str::to_owned),
        }
    }

    /// Corner labels in text-form order.
    #[must_use]
    pub fn corners(&self) -> [Option<&str>; 4] {
        [
            self.north_west.as_deref(),
            self.north_east.as_deref(),
            self.south_east.as_deref(),
            self.south_west.as_deref(),
        ]
    }
}

impl fmt::Display for VertexDecorators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for corner in self.corners() {
            if let Some(label) = corner {
                f.write_str("\"")?;
                for ch in label.chars() {
                    if ch == '"' || ch == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{ch}")?;
                }
                f.write_str("\"")?;
            }
            f.write_str(";")?;
        }
        Ok(())
    }
}

struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    len: usize,
}

impl Cursor<'_> {
    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.len, |(at, _)| *at)
    }

    fn expect(&mut self, expected: char) -> Result<(), DecoratorsParseError> {
        match self.chars.next() {
            Some((_, ch)) if ch == expected => Ok(()),
            Some((at, _)) => Err(DecoratorsParseError::Expected { expected, at }),
            None => Err(DecoratorsParseError::UnexpectedEnd),
        }
    }

    fn field(&mut self) -> Result<Option<String>, DecoratorsParseError> {
        match self.chars.peek() {
            None => return Err(DecoratorsParseError::UnexpectedEnd),
            Some((_, ';')) => {
                self.chars.next();
                return Ok(None);
            }
            Some(_) => {}
        }
        self.expect('"')?;
        let mut label = String::new();
        loop {
            match self.chars.next() {
                None => return Err(DecoratorsParseError::UnexpectedEnd),
                Some((_, '"')) => break,
                Some((at, '\\')) => match self.chars.next() {
                    Some((_, escaped @ ('"' | '\\'))) => label.push(escaped),
                    Some((_, escape)) => {
                        return Err(DecoratorsParseError::InvalidEscape { escape, at })
                    }
                    None => return Err(DecoratorsParseError::UnexpectedEnd),
                },
                Some((_, ch)) => label.push(ch),
            }
        }
        self.expect(';')?;
        Ok(Some(label))
    }
}

impl FromStr for VertexDecorators {
    type Err = DecoratorsParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut cursor = Cursor {
            chars: text.char_indices().peekable(),
            len: text.len(),
        };
        let north_west = cursor.field()?;
        let north_east = cursor.field()?;
        let south_east = cursor.field()?;
        let south_west = cursor.field()?;
        if cursor.chars.peek().is_some() {
            return Err(DecoratorsParseError::TrailingInput {
                at: cursor.offset(),
            });
        }
        Ok(Self {
            north_west,
            north_east,
            south_east,
            south_west,
        })
    }
}

impl ObjectValue for VertexDecorators {
    const TYPE_NAME: &'static str = "decorators";
    const ORDERING: i32 = 9;

    fn default_value() -> Self {
        Self::NONE
    }

    fn parse_text(text: &str) -> Result<Self, String> {
        text.parse().map_err(|err: DecoratorsParseError| err.to_string())
    }

    fn to_text(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn text_form_round_trips_with_escapes() {
        let deco = VertexDecorators::new(Some("a\"b"), None, Some("c\\d"), Some(""));
        let text = deco.to_string();
        assert_eq!(text, r#""a\"b";;"c\\d";"";"#);
        assert_eq!(text.parse::<VertexDecorators>().unwrap(), deco);
        assert_eq!(VertexDecorators::NONE.to_string(), ";;;;");
    }

    #[test]
    fn malformed_text_is_rejected() {
        assert_eq!(
            "degree;;;;".parse::<VertexDecorators>().unwrap_err(),
            DecoratorsParseError::Expected {
                expected: '"',
                at: 0
            }
        );
        assert_eq!(
            ";;;".parse::<VertexDecorators>().unwrap_err(),
            DecoratorsParseError::UnexpectedEnd
        );
        assert_eq!(
            ";;;;x".parse::<VertexDecorators>().unwrap_err(),
            DecoratorsParseError::TrailingInput { at: 4 }
        );
        assert!(matches!(
            r#""a\n";;;;"#.parse::<VertexDecorators>(),
            Err(DecoratorsParseError::InvalidEscape { escape: 'n', .. })
        ));
    }
}

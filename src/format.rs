use core::fmt::{self, Write};

use crate::consts::DEFAULT_FORMAT;
use crate::prelude::*;
use crate::units::Token;

/// The value of one [`Token`] read from a date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum Value {
    #[display(fmt = "{_0}")]
    Number(i64),
    #[display(fmt = "{_0}")]
    Text(String),
    /// Read from an invalid date, or a label the locale does not have
    #[display(fmt = "NaN")]
    Invalid,
}

impl Value {
    pub const fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) | Self::Invalid => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) | Self::Invalid => None,
        }
    }

    pub const fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid)
    }
}

impl From<Option<i64>> for Value {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Self::Invalid, Self::Number)
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Invalid, Self::Text)
    }
}

/// A piece of a parsed format template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'t> {
    Token(Token),
    /// Text copied to the output unchanged
    Literal(&'t str),
}

/// A format template split into tokens and literal text.
///
/// Every occurrence of `Y M D W H I S A U` (either case) or `MS`/`ms` is a
/// token; everything else, separators included, is literal. An empty
/// template means [`DEFAULT_FORMAT`].
///
/// ```
/// use dateio::{Format, Segment, Token};
///
/// let format = Format::parse("Y年M月");
/// assert_eq!(
///     format.segments(),
///     [
///         Segment::Token(Token::YearPadded),
///         Segment::Literal("年"),
///         Segment::Token(Token::MonthPadded),
///         Segment::Literal("月"),
///     ]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format<'t> {
    segments: Vec<Segment<'t>>,
}

impl<'t> Format<'t> {
    pub fn parse(template: &'t str) -> Self {
        let template = if template.is_empty() {
            DEFAULT_FORMAT
        } else {
            template
        };
        let mut segments = Vec::new();
        let mut literal_start = 0;
        let mut pos = 0;

        while let Some(rest) = template.get(pos..).filter(|rest| !rest.is_empty()) {
            if let Some((token, len)) = Token::match_prefix(rest) {
                if literal_start < pos {
                    segments.push(Segment::Literal(&template[literal_start..pos]));
                }
                segments.push(Segment::Token(token));
                pos += len;
                literal_start = pos;
            } else {
                pos += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
        if literal_start < template.len() {
            segments.push(Segment::Literal(&template[literal_start..]));
        }

        Self { segments }
    }

    pub fn segments(&self) -> &[Segment<'t>] {
        &self.segments
    }

    /// Renders the template, reading each token through `value_of`.
    pub fn render<F>(&self, mut value_of: F) -> String
    where
        F: FnMut(Token) -> Value,
    {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Token(token) => {
                    // writing to a String cannot fail
                    let _ = write!(out, "{}", value_of(*token));
                }
                Segment::Literal(text) => out.push_str(text),
            }
        }
        out
    }
}

impl fmt::Display for Format<'_> {
    /// Writes the template back out.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Token(token) => write!(f, "{token}")?,
                Segment::Literal(text) => f.write_str(text)?,
            }
        }
        Ok(())
    }
}

//! Shared error utilities used across the compilation pipeline.
//!
//! Every stage reports through [`CompileError`]. Errors that stem from user
//! input carry the byte offset of the offending character or token, and
//! [`CompileError::render`] turns them into a chibicc-style diagnostic that
//! points at the culprit with a caret.

use snafu::Snafu;

use crate::tokenizer::TokenKind;
use crate::traverse::NodeKind;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
  #[snafu(display("invalid character '{ch}' at offset {loc}"))]
  InvalidCharacter { ch: char, loc: usize },

  #[snafu(display("unterminated string literal starting at offset {loc}"))]
  UnterminatedString { loc: usize },

  #[snafu(display("unexpected {kind} token \"{text}\" at offset {loc}"))]
  UnexpectedToken {
    kind: TokenKind,
    text: String,
    loc: usize,
  },

  #[snafu(display("expected a name after \"(\", but got {kind} token \"{text}\" at offset {loc}"))]
  ExpectedName {
    kind: TokenKind,
    text: String,
    loc: usize,
  },

  #[snafu(display("unexpected end of input {place}"))]
  UnexpectedEof { place: &'static str, loc: usize },

  #[snafu(display("unknown node type \"{kind}\""))]
  UnknownNodeType { kind: String },

  #[snafu(display("{kind} node has a missing or invalid \"{field}\""))]
  MalformedNode { kind: String, field: &'static str },

  #[snafu(display("{kind} node has no parent build context"))]
  DetachedNode { kind: NodeKind },

  #[snafu(display("invalid JSON tree: {source}"))]
  InvalidJson { source: serde_json::Error },
}

impl CompileError {
  /// Byte offset into the source this error points at, if it has one.
  pub fn loc(&self) -> Option<usize> {
    match self {
      Self::InvalidCharacter { loc, .. }
      | Self::UnterminatedString { loc }
      | Self::UnexpectedToken { loc, .. }
      | Self::ExpectedName { loc, .. }
      | Self::UnexpectedEof { loc, .. } => Some(*loc),
      Self::UnknownNodeType { .. }
      | Self::MalformedNode { .. }
      | Self::DetachedNode { .. }
      | Self::InvalidJson { .. } => None,
    }
  }

  /// Format the error against the source it was produced from.
  ///
  /// Located errors quote the offending line and put a caret under the
  /// offending column:
  ///
  /// ```text
  /// '(foo #)'
  ///       ^ invalid character '#' at offset 5
  /// ```
  pub fn render(&self, source: &str) -> String {
    let Some(loc) = self.loc() else {
      return self.to_string();
    };

    let mut safe_loc = loc.min(source.len());
    while !source.is_char_boundary(safe_loc) {
      safe_loc -= 1;
    }
    let line_start = source[..safe_loc].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[safe_loc..]
      .find('\n')
      .map_or(source.len(), |i| safe_loc + i);
    let line = &source[line_start..line_end];
    let char_offset = source[line_start..safe_loc].chars().count() + 1; // account for opening quote
    let marker = format!("{}^", " ".repeat(char_offset));
    format!("'{line}'\n{marker} {self}")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn render_points_at_offending_column() {
    let err = CompileError::InvalidCharacter { ch: '#', loc: 5 };
    assert_eq!(
      err.render("(foo #)"),
      "'(foo #)'\n      ^ invalid character '#' at offset 5"
    );
  }

  #[test]
  fn render_quotes_only_the_offending_line() {
    let source = "(a)\n(b $)";
    let err = CompileError::InvalidCharacter { ch: '$', loc: 7 };
    assert_eq!(
      err.render(source),
      "'(b $)'\n    ^ invalid character '$' at offset 7"
    );
  }

  #[test]
  fn render_clamps_offsets_past_the_end() {
    let err = CompileError::UnexpectedEof {
      place: "inside call",
      loc: 99,
    };
    assert_eq!(
      err.render("(a"),
      "'(a'\n   ^ unexpected end of input inside call"
    );
  }

  #[test]
  fn unlocated_errors_render_bare() {
    let err = CompileError::UnknownNodeType {
      kind: "Loop".to_string(),
    };
    assert_eq!(err.loc(), None);
    assert_eq!(err.render("(a)"), "unknown node type \"Loop\"");
  }
}

//! Lexical analysis: turns the raw input string into a vector of tokens.
//!
//! The tokenizer only classifies characters. Parentheses become single
//! character tokens, digit and letter runs are munched maximally, and string
//! literals run to the next double quote without any escape handling.

use std::fmt;

use serde::Serialize;

use crate::error::{CompileResult, InvalidCharacterSnafu, UnterminatedStringSnafu};

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
  Parenthesis,
  Number,
  String,
  Name,
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      TokenKind::Parenthesis => "parenthesis",
      TokenKind::Number => "number",
      TokenKind::String => "string",
      TokenKind::Name => "name",
    };
    f.write_str(name)
  }
}

/// A classified lexeme. `text` holds the token value without delimiters, so
/// a string token `"hi"` carries `hi`; `loc` is the byte offset where the
/// token starts in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
  #[serde(rename = "type")]
  pub kind: TokenKind,
  #[serde(rename = "value")]
  pub text: String,
  pub loc: usize,
}

impl Token {
  pub fn new(kind: TokenKind, text: impl Into<String>, loc: usize) -> Self {
    Self {
      kind,
      text: text.into(),
      loc,
    }
  }

  pub fn is_open(&self) -> bool {
    self.kind == TokenKind::Parenthesis && self.text == "("
  }

  pub fn is_close(&self) -> bool {
    self.kind == TokenKind::Parenthesis && self.text == ")"
  }

  /// Offset just past the token in the source, including string quotes.
  pub fn end(&self) -> usize {
    let quotes = if self.kind == TokenKind::String { 2 } else { 0 };
    self.loc + self.text.len() + quotes
  }
}

/// Lex the input into a flat vector of tokens.
pub fn tokenize(input: &str) -> CompileResult<Vec<Token>> {
  let mut tokens = Vec::new();
  let mut i = 0;

  while let Some(c) = input[i..].chars().next() {
    if c == '(' || c == ')' {
      tokens.push(Token::new(TokenKind::Parenthesis, c, i));
      i += 1;
      continue;
    }

    if is_js_whitespace(c) {
      i += c.len_utf8();
      continue;
    }

    if c.is_ascii_digit() {
      let start = i;
      i = munch(input, i, |b| b.is_ascii_digit());
      tokens.push(Token::new(TokenKind::Number, &input[start..i], start));
      continue;
    }

    if c == '"' {
      let start = i;
      let body = start + 1;
      let Some(len) = input[body..].find('"') else {
        return UnterminatedStringSnafu { loc: start }.fail();
      };
      tokens.push(Token::new(TokenKind::String, &input[body..body + len], start));
      i = body + len + 1;
      continue;
    }

    if c.is_ascii_alphabetic() {
      let start = i;
      i = munch(input, i, |b| b.is_ascii_alphabetic());
      tokens.push(Token::new(TokenKind::Name, &input[start..i], start));
      continue;
    }

    return InvalidCharacterSnafu { ch: c, loc: i }.fail();
  }

  Ok(tokens)
}

/// The `\s` class of ECMAScript regular expressions. Unlike
/// `char::is_whitespace` it includes the byte order mark and excludes NEL.
fn is_js_whitespace(c: char) -> bool {
  matches!(
    c,
    '\t'
      | '\n'
      | '\u{000b}'
      | '\u{000c}'
      | '\r'
      | ' '
      | '\u{00a0}'
      | '\u{1680}'
      | '\u{2000}'..='\u{200a}'
      | '\u{2028}'
      | '\u{2029}'
      | '\u{202f}'
      | '\u{205f}'
      | '\u{3000}'
      | '\u{feff}'
  )
}

/// Advance past the longest run of ASCII bytes matching `accept`.
fn munch(input: &str, mut i: usize, accept: impl Fn(u8) -> bool) -> usize {
  let bytes = input.as_bytes();
  while i < bytes.len() && accept(bytes[i]) {
    i += 1;
  }
  i
}

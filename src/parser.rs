//! Recursive-descent parser producing the source AST.
//!
//! The grammar is tiny: a program is a sequence of expressions, and an
//! expression is a number, a string, or a parenthesised call whose first
//! element is the callee name. The parser keeps a single cursor into the
//! token vector and never looks further ahead than the current token.

use serde::Serialize;

use crate::error::{
  CompileResult, ExpectedNameSnafu, UnexpectedEofSnafu, UnexpectedTokenSnafu,
};
use crate::tokenizer::{Token, TokenKind};

/// Root of the source tree: every top-level expression in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub struct Program {
  pub body: Vec<Node>,
}

/// Expression nodes of the source language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Node {
  /// Raw digit text, kept exactly as written.
  NumberLiteral { value: String },
  StringLiteral { value: String },
  CallExpression { name: String, params: Vec<Node> },
}

impl Node {
  pub fn number(value: impl Into<String>) -> Self {
    Self::NumberLiteral {
      value: value.into(),
    }
  }

  pub fn string(value: impl Into<String>) -> Self {
    Self::StringLiteral {
      value: value.into(),
    }
  }

  pub fn call(name: impl Into<String>, params: Vec<Node>) -> Self {
    Self::CallExpression {
      name: name.into(),
      params,
    }
  }
}

/// Parse every top-level expression in the token vector.
pub fn parse(tokens: Vec<Token>) -> CompileResult<Program> {
  let mut stream = TokenStream::new(tokens);
  let mut body = Vec::new();

  while !stream.is_eof() {
    body.push(walk(&mut stream)?);
  }

  Ok(Program { body })
}

fn walk(stream: &mut TokenStream) -> CompileResult<Node> {
  let Some(token) = stream.advance() else {
    return UnexpectedEofSnafu {
      place: "while expecting an expression",
      loc: stream.end_loc(),
    }
    .fail();
  };

  match token.kind {
    TokenKind::Number => Ok(Node::number(token.text)),
    TokenKind::String => Ok(Node::string(token.text)),
    TokenKind::Parenthesis if token.is_open() => parse_call(stream),
    kind => UnexpectedTokenSnafu {
      kind,
      text: token.text,
      loc: token.loc,
    }
    .fail(),
  }
}

/// Parse the remainder of a call once its opening parenthesis is consumed.
fn parse_call(stream: &mut TokenStream) -> CompileResult<Node> {
  let name = match stream.advance() {
    Some(token) if token.kind == TokenKind::Name => token.text,
    Some(token) => {
      return ExpectedNameSnafu {
        kind: token.kind,
        text: token.text,
        loc: token.loc,
      }
      .fail();
    }
    None => {
      return UnexpectedEofSnafu {
        place: "after \"(\"",
        loc: stream.end_loc(),
      }
      .fail();
    }
  };

  let mut params = Vec::new();
  loop {
    match stream.peek().map(Token::is_close) {
      Some(true) => {
        stream.pos += 1;
        break;
      }
      Some(false) => params.push(walk(stream)?),
      None => {
        return UnexpectedEofSnafu {
          place: "inside an unclosed call",
          loc: stream.end_loc(),
        }
        .fail();
      }
    }
  }

  Ok(Node::call(name, params))
}

/// Lightweight cursor over the token vector.
struct TokenStream {
  tokens: Vec<Token>,
  pos: usize,
}

impl TokenStream {
  fn new(tokens: Vec<Token>) -> Self {
    Self { tokens, pos: 0 }
  }

  fn peek(&self) -> Option<&Token> {
    self.tokens.get(self.pos)
  }

  /// Consume and return the current token.
  fn advance(&mut self) -> Option<Token> {
    let token = self.tokens.get(self.pos).cloned()?;
    self.pos += 1;
    Some(token)
  }

  fn is_eof(&self) -> bool {
    self.pos >= self.tokens.len()
  }

  /// Offset just past the last token, used to anchor end-of-input errors.
  fn end_loc(&self) -> usize {
    self.tokens.last().map_or(0, Token::end)
  }
}

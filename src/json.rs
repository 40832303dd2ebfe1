//! Decode source and target trees from their JSON form.
//!
//! Trees serialize with a `"type"` tag per node (see the `Serialize` impls on
//! the AST types). Reading them back is the one place where a node kind can
//! be unknown, so decoding dispatches on the tag by hand and reports
//! [`CompileError::UnknownNodeType`](crate::CompileError::UnknownNodeType)
//! for anything outside the closed set.
//!
//! A root that is not a `Program` is accepted and wrapped into a program
//! with a single body entry.

use serde::Serialize;
use serde_json::Value;
use snafu::ResultExt;

use crate::error::{CompileResult, InvalidJsonSnafu, MalformedNodeSnafu, UnknownNodeTypeSnafu};
use crate::parser;
use crate::transform::{self, CallExpression, Identifier};

/// Pretty-print any stage output (tokens or either tree) as JSON.
pub fn to_pretty<T: Serialize + ?Sized>(value: &T) -> CompileResult<String> {
  serde_json::to_string_pretty(value).context(InvalidJsonSnafu)
}

/// Parse JSON text into a source program.
pub fn source_from_str(json: &str) -> CompileResult<parser::Program> {
  let value: Value = serde_json::from_str(json).context(InvalidJsonSnafu)?;
  source_from_json(&value)
}

/// Parse JSON text into a target program.
pub fn target_from_str(json: &str) -> CompileResult<transform::Program> {
  let value: Value = serde_json::from_str(json).context(InvalidJsonSnafu)?;
  target_from_json(&value)
}

pub fn source_from_json(value: &Value) -> CompileResult<parser::Program> {
  if node_type(value)? == "Program" {
    let body = array(value, "Program", "body")?
      .iter()
      .map(source_node)
      .collect::<CompileResult<_>>()?;
    return Ok(parser::Program { body });
  }

  Ok(parser::Program {
    body: vec![source_node(value)?],
  })
}

pub fn target_from_json(value: &Value) -> CompileResult<transform::Program> {
  if node_type(value)? == "Program" {
    let body = array(value, "Program", "body")?
      .iter()
      .map(target_node)
      .collect::<CompileResult<_>>()?;
    return Ok(transform::Program { body });
  }

  Ok(transform::Program {
    body: vec![target_node(value)?],
  })
}

fn source_node(value: &Value) -> CompileResult<parser::Node> {
  match node_type(value)? {
    kind @ "NumberLiteral" => Ok(parser::Node::number(string(value, kind, "value")?)),
    kind @ "StringLiteral" => Ok(parser::Node::string(string(value, kind, "value")?)),
    kind @ "CallExpression" => {
      let name = string(value, kind, "name")?;
      let params = array(value, kind, "params")?
        .iter()
        .map(source_node)
        .collect::<CompileResult<_>>()?;
      Ok(parser::Node::call(name, params))
    }
    kind => UnknownNodeTypeSnafu { kind }.fail(),
  }
}

fn target_node(value: &Value) -> CompileResult<transform::Node> {
  match node_type(value)? {
    kind @ "ExpressionStatement" => {
      let expression = field(value, kind, "expression")?;
      expect_kind(expression, "CallExpression", kind, "expression")?;
      Ok(transform::Node::ExpressionStatement {
        expression: target_call(expression)?,
      })
    }
    "CallExpression" => Ok(transform::Node::CallExpression(target_call(value)?)),
    "Identifier" => Ok(transform::Node::Identifier(identifier(value)?)),
    kind @ "NumberLiteral" => Ok(transform::Node::number(string(value, kind, "value")?)),
    kind @ "StringLiteral" => Ok(transform::Node::string(string(value, kind, "value")?)),
    kind => UnknownNodeTypeSnafu { kind }.fail(),
  }
}

/// Decode a node already known to be tagged `CallExpression`.
fn target_call(value: &Value) -> CompileResult<CallExpression> {
  let kind = "CallExpression";
  let callee = field(value, kind, "callee")?;
  expect_kind(callee, "Identifier", kind, "callee")?;
  let arguments = array(value, kind, "arguments")?
    .iter()
    .map(target_node)
    .collect::<CompileResult<_>>()?;
  Ok(CallExpression {
    callee: identifier(callee)?,
    arguments,
  })
}

/// Decode a node already known to be tagged `Identifier`.
fn identifier(value: &Value) -> CompileResult<Identifier> {
  Ok(Identifier {
    name: string(value, "Identifier", "name")?.to_string(),
  })
}

/// Tags of the target tree.
const TARGET_KINDS: &[&str] = &[
  "Program",
  "ExpressionStatement",
  "CallExpression",
  "Identifier",
  "NumberLiteral",
  "StringLiteral",
];

/// Check that the node in `parent.field` is tagged `expected`. A known kind
/// in the wrong slot is a malformed parent; an unknown tag stays unknown.
fn expect_kind(
  value: &Value,
  expected: &str,
  parent: &str,
  field: &'static str,
) -> CompileResult<()> {
  let kind = node_type(value)?;
  if kind == expected {
    return Ok(());
  }
  if TARGET_KINDS.iter().any(|known| *known == kind) {
    return MalformedNodeSnafu {
      kind: parent,
      field,
    }
    .fail();
  }
  UnknownNodeTypeSnafu { kind }.fail()
}

fn node_type(value: &Value) -> CompileResult<&str> {
  match value.get("type").and_then(Value::as_str) {
    Some(kind) => Ok(kind),
    None => MalformedNodeSnafu {
      kind: "untyped",
      field: "type",
    }
    .fail(),
  }
}

fn field<'v>(value: &'v Value, kind: &str, name: &'static str) -> CompileResult<&'v Value> {
  match value.get(name) {
    Some(inner) => Ok(inner),
    None => MalformedNodeSnafu { kind, field: name }.fail(),
  }
}

fn string<'v>(value: &'v Value, kind: &str, name: &'static str) -> CompileResult<&'v str> {
  match field(value, kind, name)?.as_str() {
    Some(text) => Ok(text),
    None => MalformedNodeSnafu { kind, field: name }.fail(),
  }
}

fn array<'v>(value: &'v Value, kind: &str, name: &'static str) -> CompileResult<&'v [Value]> {
  match field(value, kind, name)?.as_array() {
    Some(items) => Ok(items.as_slice()),
    None => MalformedNodeSnafu { kind, field: name }.fail(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::CompileError;
  use crate::parser::{Node, parse};
  use crate::tokenizer::tokenize;
  use crate::transform::transform;
  use serde_json::json;

  #[test]
  fn source_tree_reads_back() {
    let program = parse(tokenize("(add 2 (sub \"x\" 8))").unwrap()).unwrap();
    let value = serde_json::to_value(&program).unwrap();
    assert_eq!(source_from_json(&value).unwrap(), program);
  }

  #[test]
  fn target_tree_reads_back() {
    let source = parse(tokenize("(a 1 (b)) (c)").unwrap()).unwrap();
    let target = transform(&source).unwrap();
    let text = to_pretty(&target).unwrap();
    assert_eq!(target_from_str(&text).unwrap(), target);
  }

  #[test]
  fn bare_node_root_is_wrapped() {
    let program = source_from_json(&json!({ "type": "NumberLiteral", "value": "3" })).unwrap();
    assert_eq!(program.body, vec![Node::number("3")]);
  }

  #[test]
  fn unknown_source_kind_is_rejected() {
    let err = source_from_json(&json!({
      "type": "Program",
      "body": [{ "type": "Lambda", "params": [] }]
    }))
    .unwrap_err();
    assert!(matches!(err, CompileError::UnknownNodeType { ref kind } if kind == "Lambda"));
  }

  #[test]
  fn target_nodes_are_not_source_nodes() {
    let err = source_from_json(&json!({
      "type": "Identifier",
      "name": "x"
    }))
    .unwrap_err();
    assert!(matches!(err, CompileError::UnknownNodeType { ref kind } if kind == "Identifier"));
  }

  #[test]
  fn unknown_target_kind_is_rejected() {
    let err = target_from_json(&json!({
      "type": "Program",
      "body": [{ "type": "ReturnStatement" }]
    }))
    .unwrap_err();
    assert!(matches!(err, CompileError::UnknownNodeType { ref kind } if kind == "ReturnStatement"));
  }

  #[test]
  fn known_kind_in_the_wrong_slot_is_malformed() {
    let err = target_from_json(&json!({
      "type": "ExpressionStatement",
      "expression": { "type": "NumberLiteral", "value": "1" }
    }))
    .unwrap_err();
    assert!(matches!(
      err,
      CompileError::MalformedNode { ref kind, field: "expression" } if kind == "ExpressionStatement"
    ));

    let err = target_from_json(&json!({
      "type": "CallExpression",
      "callee": { "type": "StringLiteral", "value": "f" },
      "arguments": []
    }))
    .unwrap_err();
    assert!(matches!(
      err,
      CompileError::MalformedNode { ref kind, field: "callee" } if kind == "CallExpression"
    ));
  }

  #[test]
  fn unknown_kind_in_a_typed_slot_stays_unknown() {
    let err = target_from_json(&json!({
      "type": "ExpressionStatement",
      "expression": { "type": "Lambda" }
    }))
    .unwrap_err();
    assert!(matches!(err, CompileError::UnknownNodeType { ref kind } if kind == "Lambda"));

    let err = target_from_json(&json!({
      "type": "CallExpression",
      "callee": { "type": "Symbol", "name": "f" },
      "arguments": []
    }))
    .unwrap_err();
    assert!(matches!(err, CompileError::UnknownNodeType { ref kind } if kind == "Symbol"));
  }

  #[test]
  fn missing_fields_are_reported() {
    let err = source_from_json(&json!({ "type": "CallExpression", "params": [] })).unwrap_err();
    assert!(matches!(
      err,
      CompileError::MalformedNode { ref kind, field: "name" } if kind == "CallExpression"
    ));

    let err = target_from_json(&json!({ "value": "1" })).unwrap_err();
    assert!(matches!(err, CompileError::MalformedNode { field: "type", .. }));
  }

  #[test]
  fn invalid_json_is_reported() {
    let err = source_from_str("{ not json").unwrap_err();
    assert!(matches!(err, CompileError::InvalidJson { .. }));
  }
}

//! Code generation: render the target AST as C-like call statements.
//!
//! Statements are separated by newlines, calls print as
//! `callee(arg, arg)`, and literals are emitted exactly as they were written.
//! String values are wrapped in double quotes without any re-escaping.

use crate::transform::{CallExpression, Identifier, Node, Program};

/// Render a whole program.
pub fn generate(program: &Program) -> String {
  let mut out = String::new();
  for (i, node) in program.body.iter().enumerate() {
    if i > 0 {
      out.push('\n');
    }
    emit_node(node, &mut out);
  }
  out
}

/// Render a single node outside of any program.
pub fn generate_node(node: &Node) -> String {
  let mut out = String::new();
  emit_node(node, &mut out);
  out
}

fn emit_node(node: &Node, out: &mut String) {
  match node {
    Node::ExpressionStatement { expression } => {
      emit_call(expression, out);
      out.push(';');
    }
    Node::CallExpression(call) => emit_call(call, out),
    Node::Identifier(identifier) => emit_identifier(identifier, out),
    Node::NumberLiteral { value } => out.push_str(value),
    Node::StringLiteral { value } => {
      out.push('"');
      out.push_str(value);
      out.push('"');
    }
  }
}

fn emit_call(call: &CallExpression, out: &mut String) {
  emit_identifier(&call.callee, out);
  out.push('(');
  for (i, argument) in call.arguments.iter().enumerate() {
    if i > 0 {
      out.push_str(", ");
    }
    emit_node(argument, out);
  }
  out.push(')');
}

fn emit_identifier(identifier: &Identifier, out: &mut String) {
  out.push_str(&identifier.name);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn statement_with_literals() {
    let program = Program {
      body: vec![Node::statement(
        "foo",
        vec![Node::number("1"), Node::string("bar")],
      )],
    };
    assert_eq!(generate(&program), "foo(1, \"bar\");");
  }

  #[test]
  fn nested_calls_have_no_semicolon() {
    let node = Node::statement(
      "add",
      vec![
        Node::number("2"),
        Node::call("sub", vec![Node::number("4"), Node::number("1")]),
      ],
    );
    assert_eq!(generate_node(&node), "add(2, sub(4, 1));");
  }

  #[test]
  fn statements_are_newline_separated() {
    let program = Program {
      body: vec![Node::statement("a", vec![]), Node::statement("b", vec![])],
    };
    assert_eq!(generate(&program), "a();\nb();");
  }

  #[test]
  fn empty_program_renders_empty() {
    assert_eq!(generate(&Program::default()), "");
  }

  #[test]
  fn literals_are_verbatim() {
    assert_eq!(generate_node(&Node::number("0042")), "0042");
    assert_eq!(generate_node(&Node::string("say \\\"hi")), "\"say \\\"hi\"");
    assert_eq!(generate_node(&Node::call("f", vec![])), "f()");
    assert_eq!(
      generate_node(&Node::Identifier(Identifier {
        name: "x".to_string()
      })),
      "x"
    );
  }
}

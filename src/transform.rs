//! Lower the source AST into the target AST.
//!
//! The target language wraps top-level calls in expression statements and
//! spells every callee as an [`Identifier`]. The transformer is a single
//! [`Visitor`] pass: when a node is entered, its translation is appended to
//! the build context of its parent, and a call opens a fresh build context
//! for its own arguments. Build contexts live in a side table keyed by
//! [`NodeId`], so neither tree is ever mutated; once the walk finishes the
//! contexts are stitched together into the final tree.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

use crate::error::{CompileResult, DetachedNodeSnafu};
use crate::parser;
use crate::traverse::{NodeId, NodeKind, NodeRef, Visit, Visitor, traverse};

/// Root of the target tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub struct Program {
  pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Node {
  /// A call evaluated for its effect, rendered with a trailing `;`.
  ExpressionStatement {
    #[serde(serialize_with = "tagged_call")]
    expression: CallExpression,
  },
  CallExpression(CallExpression),
  Identifier(Identifier),
  NumberLiteral { value: String },
  StringLiteral { value: String },
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

  pub fn call(callee: impl Into<String>, arguments: Vec<Node>) -> Self {
    Self::CallExpression(CallExpression::new(callee, arguments))
  }

  pub fn statement(callee: impl Into<String>, arguments: Vec<Node>) -> Self {
    Self::ExpressionStatement {
      expression: CallExpression::new(callee, arguments),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallExpression {
  #[serde(serialize_with = "tagged_identifier")]
  pub callee: Identifier,
  pub arguments: Vec<Node>,
}

impl CallExpression {
  pub fn new(callee: impl Into<String>, arguments: Vec<Node>) -> Self {
    Self {
      callee: Identifier {
        name: callee.into(),
      },
      arguments,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identifier {
  pub name: String,
}

/// Structs that also appear as [`Node`] variants, tagged the same way when
/// they sit in a typed field.
#[derive(Serialize)]
#[serde(tag = "type")]
enum Tagged<'a> {
  CallExpression(&'a CallExpression),
  Identifier(&'a Identifier),
}

fn tagged_call<S: Serializer>(call: &CallExpression, serializer: S) -> Result<S::Ok, S::Error> {
  Tagged::CallExpression(call).serialize(serializer)
}

fn tagged_identifier<S: Serializer>(
  identifier: &Identifier,
  serializer: S,
) -> Result<S::Ok, S::Error> {
  Tagged::Identifier(identifier).serialize(serializer)
}

/// Translate a parsed program into the target tree.
pub fn transform(program: &parser::Program) -> CompileResult<Program> {
  let mut transformer = Transformer::default();
  let root = transformer.open_context();
  transformer.contexts.insert(ROOT, root);

  traverse(program, &mut transformer)?;

  let body = transformer.assemble(root);
  Ok(Program { body })
}

const ROOT: NodeId = NodeId(0);

/// A translated node whose call arguments may still be filling up.
enum Pending {
  Done(Node),
  Call {
    callee: String,
    arguments: usize,
    statement: bool,
  },
}

#[derive(Default)]
struct Transformer {
  /// Source node -> index of the build context its children append into.
  contexts: HashMap<NodeId, usize>,
  builds: Vec<Vec<Pending>>,
}

impl Transformer {
  fn open_context(&mut self) -> usize {
    self.builds.push(Vec::new());
    self.builds.len() - 1
  }

  fn append(
    &mut self,
    visit: Visit<'_>,
    parent: Option<Visit<'_>>,
    item: Pending,
  ) -> CompileResult<()> {
    let Some(&context) = parent.and_then(|p| self.contexts.get(&p.id)) else {
      return DetachedNodeSnafu {
        kind: visit.node.kind(),
      }
      .fail();
    };
    self.builds[context].push(item);
    Ok(())
  }

  /// Drain a build context into finished target nodes.
  fn assemble(&mut self, context: usize) -> Vec<Node> {
    std::mem::take(&mut self.builds[context])
      .into_iter()
      .map(|item| match item {
        Pending::Done(node) => node,
        Pending::Call {
          callee,
          arguments,
          statement,
        } => {
          let expression = CallExpression::new(callee, self.assemble(arguments));
          if statement {
            Node::ExpressionStatement { expression }
          } else {
            Node::CallExpression(expression)
          }
        }
      })
      .collect()
  }
}

impl Visitor for Transformer {
  fn enter(&mut self, visit: Visit<'_>, parent: Option<Visit<'_>>) -> CompileResult<()> {
    let NodeRef::Node(node) = visit.node else {
      return Ok(());
    };

    match node {
      parser::Node::NumberLiteral { value } => {
        self.append(visit, parent, Pending::Done(Node::number(value.as_str())))
      }
      parser::Node::StringLiteral { value } => {
        self.append(visit, parent, Pending::Done(Node::string(value.as_str())))
      }
      parser::Node::CallExpression { name, .. } => {
        let arguments = self.open_context();
        self.contexts.insert(visit.id, arguments);
        let nested = parent.is_some_and(|p| p.node.kind() == NodeKind::CallExpression);
        self.append(
          visit,
          parent,
          Pending::Call {
            callee: name.clone(),
            arguments,
            statement: !nested,
          },
        )
      }
    }
  }
}

//! Depth-first traversal over the source AST.
//!
//! [`traverse`] walks the tree once, calling [`Visitor::enter`] before a
//! node's children and [`Visitor::exit`] after them. Every node is handed to
//! the visitor together with its parent and a [`NodeId`] that is unique
//! within the walk, so visitors can keep per-node state in a side table
//! instead of mutating the tree.

use std::fmt;

use crate::error::CompileResult;
use crate::parser::{Node, Program};

/// Closed set of source node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
  Program,
  CallExpression,
  NumberLiteral,
  StringLiteral,
}

impl fmt::Display for NodeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      NodeKind::Program => "Program",
      NodeKind::CallExpression => "CallExpression",
      NodeKind::NumberLiteral => "NumberLiteral",
      NodeKind::StringLiteral => "StringLiteral",
    };
    f.write_str(name)
  }
}

/// Pre-order position of a node within one traversal. The root is always 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Borrowed view of any node in the source tree, root included.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
  Program(&'a Program),
  Node(&'a Node),
}

impl NodeRef<'_> {
  pub fn kind(&self) -> NodeKind {
    match self {
      NodeRef::Program(_) => NodeKind::Program,
      NodeRef::Node(Node::CallExpression { .. }) => NodeKind::CallExpression,
      NodeRef::Node(Node::NumberLiteral { .. }) => NodeKind::NumberLiteral,
      NodeRef::Node(Node::StringLiteral { .. }) => NodeKind::StringLiteral,
    }
  }
}

/// A node as seen by a visitor.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
  pub id: NodeId,
  pub node: NodeRef<'a>,
}

/// Callbacks invoked by [`traverse`]. `parent` is `None` only for the root.
pub trait Visitor {
  fn enter(&mut self, _visit: Visit<'_>, _parent: Option<Visit<'_>>) -> CompileResult<()> {
    Ok(())
  }

  fn exit(&mut self, _visit: Visit<'_>, _parent: Option<Visit<'_>>) -> CompileResult<()> {
    Ok(())
  }
}

/// Walk `program` depth-first, stopping at the first visitor error.
pub fn traverse<V: Visitor + ?Sized>(program: &Program, visitor: &mut V) -> CompileResult<()> {
  let mut walker = Walker {
    visitor,
    next_id: 0,
  };
  walker.visit(NodeRef::Program(program), None)
}

struct Walker<'v, V: ?Sized> {
  visitor: &'v mut V,
  next_id: usize,
}

impl<V: Visitor + ?Sized> Walker<'_, V> {
  fn visit<'a>(&mut self, node: NodeRef<'a>, parent: Option<Visit<'a>>) -> CompileResult<()> {
    let current = Visit {
      id: NodeId(self.next_id),
      node,
    };
    self.next_id += 1;

    self.visitor.enter(current, parent)?;
    match node {
      NodeRef::Program(program) => self.visit_children(&program.body, current)?,
      NodeRef::Node(Node::CallExpression { params, .. }) => self.visit_children(params, current)?,
      NodeRef::Node(Node::NumberLiteral { .. } | Node::StringLiteral { .. }) => {}
    }
    self.visitor.exit(current, parent)
  }

  fn visit_children<'a>(&mut self, children: &'a [Node], parent: Visit<'a>) -> CompileResult<()> {
    for child in children {
      self.visit(NodeRef::Node(child), Some(parent))?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::CompileError;

  #[derive(Default)]
  struct Recorder {
    events: Vec<String>,
  }

  impl Recorder {
    fn record(&mut self, phase: &str, visit: Visit<'_>, parent: Option<Visit<'_>>) {
      let parent = parent.map_or("-".to_string(), |p| p.id.0.to_string());
      self.events.push(format!(
        "{phase} {} #{} <{parent}>",
        visit.node.kind(),
        visit.id.0
      ));
    }
  }

  impl Visitor for Recorder {
    fn enter(&mut self, visit: Visit<'_>, parent: Option<Visit<'_>>) -> CompileResult<()> {
      self.record("enter", visit, parent);
      Ok(())
    }

    fn exit(&mut self, visit: Visit<'_>, parent: Option<Visit<'_>>) -> CompileResult<()> {
      self.record("exit", visit, parent);
      Ok(())
    }
  }

  #[test]
  fn enters_before_children_and_exits_after() {
    let program = Program {
      body: vec![Node::call(
        "add",
        vec![Node::number("1"), Node::call("neg", vec![Node::string("x")])],
      )],
    };
    let mut recorder = Recorder::default();
    traverse(&program, &mut recorder).unwrap();
    assert_eq!(
      recorder.events,
      vec![
        "enter Program #0 <->",
        "enter CallExpression #1 <0>",
        "enter NumberLiteral #2 <1>",
        "exit NumberLiteral #2 <1>",
        "enter CallExpression #3 <1>",
        "enter StringLiteral #4 <3>",
        "exit StringLiteral #4 <3>",
        "exit CallExpression #3 <1>",
        "exit CallExpression #1 <0>",
        "exit Program #0 <->",
      ]
    );
  }

  #[test]
  fn default_callbacks_do_nothing() {
    struct Silent;
    impl Visitor for Silent {}

    let program = Program {
      body: vec![Node::number("1"), Node::number("2")],
    };
    assert!(traverse(&program, &mut Silent).is_ok());
  }

  #[test]
  fn visitor_errors_stop_the_walk() {
    struct FailOnString {
      seen: usize,
    }
    impl Visitor for FailOnString {
      fn enter(&mut self, visit: Visit<'_>, _parent: Option<Visit<'_>>) -> CompileResult<()> {
        self.seen += 1;
        match visit.node.kind() {
          NodeKind::StringLiteral => Err(CompileError::DetachedNode {
            kind: NodeKind::StringLiteral,
          }),
          _ => Ok(()),
        }
      }
    }

    let program = Program {
      body: vec![Node::string("a"), Node::number("1")],
    };
    let mut visitor = FailOnString { seen: 0 };
    let err = traverse(&program, &mut visitor).unwrap_err();
    assert!(matches!(err, CompileError::DetachedNode { .. }));
    assert_eq!(visitor.seen, 2);
  }
}

//! Crate root: wires together the compilation pipeline.
//!
//! The stages are small and composable so they can be exercised on their own:
//! - `tokenizer` performs lexical analysis and produces a flat token vector.
//! - `parser` owns all syntactic knowledge and returns the source AST.
//! - `traverse` walks the source AST and dispatches to a visitor.
//! - `transform` lowers the source AST into the target AST.
//! - `codegen` renders the target AST as C-like call statements.
//! - `json` reads either tree back from its JSON form.
//! - `error` centralises reporting utilities shared by the other modules.

pub mod codegen;
pub mod error;
pub mod json;
pub mod parser;
pub mod tokenizer;
pub mod transform;
pub mod traverse;

use tracing::{debug, trace};

pub use error::{CompileError, CompileResult};

/// Every intermediate product of one compilation.
#[derive(Debug, Clone)]
pub struct Stages {
  pub tokens: Vec<tokenizer::Token>,
  pub ast: parser::Program,
  pub target: transform::Program,
  pub output: String,
}

/// Compile source text into C-like call statements.
pub fn compile(source: &str) -> CompileResult<String> {
  compile_stages(source).map(|stages| stages.output)
}

/// Compile source text, keeping the output of every stage.
pub fn compile_stages(source: &str) -> CompileResult<Stages> {
  let tokens = tokenizer::tokenize(source)?;
  debug!(count = tokens.len(), "tokenized");
  trace!(?tokens);

  let ast = parser::parse(tokens.clone())?;
  debug!(forms = ast.body.len(), "parsed");
  trace!(?ast);

  let target = transform::transform(&ast)?;
  debug!(statements = target.body.len(), "transformed");
  trace!(?target);

  let output = emit(&target);
  Ok(Stages {
    tokens,
    ast,
    target,
    output,
  })
}

/// Compile an already parsed program.
pub fn compile_ast(ast: &parser::Program) -> CompileResult<String> {
  let target = transform::transform(ast)?;
  debug!(statements = target.body.len(), "transformed");
  Ok(emit(&target))
}

fn emit(target: &transform::Program) -> String {
  let output = codegen::generate(target);
  debug!(bytes = output.len(), "generated");
  trace!(%output);
  output
}

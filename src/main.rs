//! `parenc` command line driver.

use std::io::Read;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use parenc::{CompileResult, codegen, json, parser, tokenizer, transform};

#[derive(Parser)]
#[command(name = "parenc", version)]
#[command(about = "Compile parenthesised calls into C-like call statements")]
struct Cli {
  /// Input file, or - for stdin
  #[arg(default_value = "-")]
  input: String,

  /// Compile this text instead of reading INPUT
  #[arg(short, long)]
  expr: Option<String>,

  /// What the input contains
  #[arg(long, value_enum, default_value_t = Input::Source)]
  from: Input,

  /// Which stage to print
  #[arg(long, value_enum, default_value_t = Emit::Code)]
  emit: Emit,

  /// Log pipeline stages to stderr (-v for debug, -vv for trace)
  #[arg(short, long, action = ArgAction::Count)]
  verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Input {
  /// Program text
  Source,
  /// JSON source tree, as printed by `--emit ast`
  Ast,
  /// JSON target tree, as printed by `--emit target`
  Target,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Emit {
  Tokens,
  Ast,
  Target,
  Code,
}

impl Input {
  /// Earliest stage that can still be printed from this input.
  fn earliest(self) -> Emit {
    match self {
      Input::Source => Emit::Tokens,
      Input::Ast => Emit::Ast,
      Input::Target => Emit::Target,
    }
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  if cli.emit < cli.from.earliest() {
    eprintln!("error: cannot emit {:?} from {:?} input", cli.emit, cli.from);
    return ExitCode::from(2);
  }

  let text = match read_input(&cli) {
    Ok(text) => text,
    Err(err) => {
      eprintln!("error: cannot read {}: {err}", cli.input);
      return ExitCode::FAILURE;
    }
  };

  match run(&cli, &text) {
    Ok(output) => {
      println!("{output}");
      ExitCode::SUCCESS
    }
    Err(err) => {
      eprintln!("{}", err.render(&text));
      ExitCode::FAILURE
    }
  }
}

fn init_tracing(verbose: u8) {
  let default = match verbose {
    0 => "parenc=warn",
    1 => "parenc=debug",
    _ => "parenc=trace",
  };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}

fn read_input(cli: &Cli) -> std::io::Result<String> {
  if let Some(expr) = &cli.expr {
    return Ok(expr.clone());
  }
  if cli.input == "-" {
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    return Ok(text);
  }
  std::fs::read_to_string(&cli.input)
}

fn run(cli: &Cli, text: &str) -> CompileResult<String> {
  debug!(from = ?cli.from, emit = ?cli.emit, "running pipeline");

  let target = match cli.from {
    Input::Target => json::target_from_str(text)?,
    Input::Source | Input::Ast => {
      let ast = if cli.from == Input::Source {
        let tokens = tokenizer::tokenize(text)?;
        if cli.emit == Emit::Tokens {
          return json::to_pretty(&tokens);
        }
        parser::parse(tokens)?
      } else {
        json::source_from_str(text)?
      };
      if cli.emit == Emit::Ast {
        return json::to_pretty(&ast);
      }
      transform::transform(&ast)?
    }
  };

  if cli.emit == Emit::Target {
    return json::to_pretty(&target);
  }
  Ok(codegen::generate(&target))
}

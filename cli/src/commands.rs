use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
  /// Execute a Whitespace file.
  Exec(InputArgs),
  /// Compile a dialect file and print the Whitespace text.
  Compile(InputArgs),
  /// Compile a dialect file and execute it.
  Run(InputArgs),
}

#[derive(Clone, Debug, Args)]
pub struct InputArgs {
  /// The file to process.
  #[arg(value_name = "FILE")]
  file: PathBuf,
}

impl InputArgs {
  fn source(&self) -> anyhow::Result<String> {
    std::fs::read_to_string(&self.file)
      .with_context(|| format!("could not read {}", self.file.display()))
  }

  fn path(&self) -> &Path {
    &self.file
  }
}

impl Command {
  pub fn execute(self) -> anyhow::Result<()> {
    match self {
      Self::Exec(args) => handle_exec(args),
      Self::Compile(args) => handle_compile(args),
      Self::Run(args) => handle_run(args),
    }
  }
}

fn handle_exec(args: InputArgs) -> anyhow::Result<()> {
  let text = args.source()?;
  let stdin = std::io::stdin().lock();
  let stdout = BufWriter::new(std::io::stdout().lock());
  wsrb::execute(&text, stdin, stdout)
    .map_err(|e| anyhow::anyhow!("{e}"))
    .with_context(|| format!("failed to execute {}", args.path().display()))
}

fn handle_compile(args: InputArgs) -> anyhow::Result<()> {
  let source = args.source()?;
  let path = args.path().display().to_string();
  match wsrb::compile(&path, &source) {
    Ok(text) => {
      let mut stdout = std::io::stdout().lock();
      stdout.write_all(text.as_bytes())?;
      Ok(())
    }
    Err(e) => {
      eprintln!("{}", e.report(&source));
      anyhow::bail!("failed to compile {path}")
    }
  }
}

fn handle_run(args: InputArgs) -> anyhow::Result<()> {
  let source = args.source()?;
  let path = args.path().display().to_string();
  let stdin = std::io::stdin().lock();
  let stdout = BufWriter::new(std::io::stdout().lock());
  // A `raise` in user code prints its message and exits with status 0;
  // only host-level failures are errors here.
  match wsrb::run(&path, &source, stdin, stdout) {
    Ok(()) => Ok(()),
    Err(e) => {
      eprintln!("{}", e.report(&source));
      anyhow::bail!("failed to run {path}")
    }
  }
}

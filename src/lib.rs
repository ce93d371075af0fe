//! A self-contained toolchain for the Whitespace esoteric language: a
//! decoder and interpreter for Whitespace source, and a compiler that
//! lowers a small dynamic dialect (integers, single-character strings,
//! arrays, hashes, methods, recursion) onto the same instruction stream.
//!
//! ```
//! let ws = wsrb::compile("demo.wsrb", "put_as_number 3 + 2").unwrap();
//! let mut out = Vec::new();
//! wsrb::execute(&ws, &b""[..], &mut out).unwrap();
//! assert_eq!(out, b"5");
//! ```

use std::io::{BufRead, Write};

pub mod emit;
mod error;
pub mod ir;
pub mod prelude;
pub mod span;
pub mod syntax;
pub mod value;
pub mod vm;
pub mod ws;

pub use error::{Error, Result};

use emit::Source;
use ir::Insn;

/// Compiles dialect source into an IR program, prelude included.
pub fn compile_program(path: &str, src: &str) -> Result<Vec<Insn>> {
  let prelude_module = syntax::parse(prelude::SOURCE).map_err(Error::Parse)?;
  let user_module = syntax::parse(src).map_err(Error::Parse)?;
  let sources = [
    Source {
      path: prelude::PATH,
      text: prelude::SOURCE,
      module: &prelude_module,
    },
    Source {
      path,
      text: src,
      module: &user_module,
    },
  ];
  emit::lower(&sources).map_err(Error::Compile)
}

/// Compiles dialect source into Whitespace text.
pub fn compile(path: &str, src: &str) -> Result<String> {
  Ok(ws::encode(&compile_program(path, src)?))
}

/// Decodes Whitespace text and executes it against the given streams.
pub fn execute(text: &str, input: impl BufRead, output: impl Write) -> Result<()> {
  let program = ws::decode(text)?;
  vm::run_program(&program, input, output)?;
  Ok(())
}

/// Compiles and executes dialect source in one step.
pub fn run(path: &str, src: &str, input: impl BufRead, output: impl Write) -> Result<()> {
  let program = compile_program(path, src)?;
  vm::run_program(&program, input, output)?;
  Ok(())
}

#[cfg(test)]
mod tests;

use std::error::Error as StdError;
use std::fmt::Display;

use crate::span::SpannedError;
use crate::vm::RuntimeError;
use crate::ws::WireError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
  /// The dialect source did not parse; one entry per diagnostic.
  Parse(Vec<SpannedError>),
  /// The source parsed but cannot be lowered.
  Compile(SpannedError),
  /// Malformed Whitespace text.
  Wire(WireError),
  /// The program failed while executing.
  Runtime(RuntimeError),
}

impl From<Vec<SpannedError>> for Error {
  fn from(value: Vec<SpannedError>) -> Self {
    Error::Parse(value)
  }
}

impl From<WireError> for Error {
  fn from(value: WireError) -> Self {
    Error::Wire(value)
  }
}

impl From<RuntimeError> for Error {
  fn from(value: RuntimeError) -> Self {
    Error::Runtime(value)
  }
}

impl Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Error::Parse(errors) => {
        for (i, e) in errors.iter().enumerate() {
          if i > 0 {
            writeln!(f)?;
          }
          write!(f, "{e}")?;
        }
        Ok(())
      }
      Error::Compile(e) => write!(f, "{e}"),
      Error::Wire(e) => write!(f, "{e}"),
      Error::Runtime(e) => write!(f, "{e}"),
    }
  }
}

impl StdError for Error {}

impl Error {
  /// Renders the error with source context where there is any.
  pub fn report(&self, src: &str) -> String {
    match self {
      Error::Parse(errors) => {
        let mut out = String::new();
        for (i, e) in errors.iter().enumerate() {
          if i > 0 {
            out.push('\n');
          }
          out.push_str(&e.report(src));
        }
        out
      }
      Error::Compile(e) => e.report(src),
      other => other.to_string(),
    }
  }
}

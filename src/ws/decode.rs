//! Whitespace text to IR.

use std::error::Error as StdError;
use std::fmt::{self, Display};

use num_bigint::{BigInt, BigUint, Sign};

use crate::ir::{Insn, Label};

/// A malformed Whitespace program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireError {
  pub kind: WireErrorKind,
  /// Byte offset of the significant character (or end of input) at which
  /// decoding failed.
  pub offset: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WireErrorKind {
  /// Input ended in the middle of an instruction, number, or label.
  UnexpectedEof,
  /// An IMP/command bit combination that names no instruction.
  IllegalSequence,
}

impl Display for WireError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.kind {
      WireErrorKind::UnexpectedEof => {
        write!(f, "unexpected end of input at byte {}", self.offset)
      }
      WireErrorKind::IllegalSequence => {
        write!(f, "illegal instruction sequence at byte {}", self.offset)
      }
    }
  }
}

impl StdError for WireError {}

/// Decodes Whitespace source text into an IR stream.
///
/// Bytes other than space, tab and linefeed are comments and are skipped
/// wherever they appear.
pub fn decode(src: &str) -> Result<Vec<Insn>, WireError> {
  Decoder::new(src).run()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Glyph {
  Space,
  Tab,
  Lf,
}

struct Decoder<'src> {
  src: &'src [u8],
  pos: usize,
}

impl<'src> Decoder<'src> {
  fn new(src: &'src str) -> Self {
    Self {
      src: src.as_bytes(),
      pos: 0,
    }
  }

  fn run(mut self) -> Result<Vec<Insn>, WireError> {
    let mut program = Vec::new();
    while let Some(glyph) = self.bump() {
      let insn = match glyph {
        Glyph::Space => self.stack()?,
        Glyph::Tab => match self.expect()? {
          Glyph::Space => self.arith()?,
          Glyph::Tab => self.heap()?,
          Glyph::Lf => self.io()?,
        },
        Glyph::Lf => self.flow()?,
      };
      program.push(insn);
    }
    Ok(program)
  }

  fn stack(&mut self) -> Result<Insn, WireError> {
    match self.expect()? {
      Glyph::Space => Ok(Insn::Push(self.number()?)),
      Glyph::Tab => Err(self.illegal()),
      Glyph::Lf => match self.expect()? {
        Glyph::Space => Ok(Insn::Dup),
        Glyph::Tab => Ok(Insn::Swap),
        Glyph::Lf => Ok(Insn::Pop),
      },
    }
  }

  fn arith(&mut self) -> Result<Insn, WireError> {
    match (self.expect()?, self.expect()?) {
      (Glyph::Space, Glyph::Space) => Ok(Insn::Add),
      (Glyph::Space, Glyph::Tab) => Ok(Insn::Sub),
      (Glyph::Space, Glyph::Lf) => Ok(Insn::Mul),
      (Glyph::Tab, Glyph::Space) => Ok(Insn::Div),
      (Glyph::Tab, Glyph::Tab) => Ok(Insn::Mod),
      _ => Err(self.illegal()),
    }
  }

  fn heap(&mut self) -> Result<Insn, WireError> {
    match self.expect()? {
      Glyph::Space => Ok(Insn::Save),
      Glyph::Tab => Ok(Insn::Load),
      Glyph::Lf => Err(self.illegal()),
    }
  }

  fn io(&mut self) -> Result<Insn, WireError> {
    match (self.expect()?, self.expect()?) {
      (Glyph::Space, Glyph::Space) => Ok(Insn::WriteChar),
      (Glyph::Space, Glyph::Tab) => Ok(Insn::WriteNum),
      (Glyph::Tab, Glyph::Space) => Ok(Insn::ReadChar),
      (Glyph::Tab, Glyph::Tab) => Ok(Insn::ReadNum),
      _ => Err(self.illegal()),
    }
  }

  fn flow(&mut self) -> Result<Insn, WireError> {
    match (self.expect()?, self.expect()?) {
      (Glyph::Space, Glyph::Space) => Ok(Insn::Def(self.label()?)),
      (Glyph::Space, Glyph::Tab) => Ok(Insn::Call(self.label()?)),
      (Glyph::Space, Glyph::Lf) => Ok(Insn::Jump(self.label()?)),
      (Glyph::Tab, Glyph::Space) => Ok(Insn::JumpIfZero(self.label()?)),
      (Glyph::Tab, Glyph::Tab) => Ok(Insn::JumpIfNeg(self.label()?)),
      (Glyph::Tab, Glyph::Lf) => Ok(Insn::End),
      (Glyph::Lf, Glyph::Lf) => Ok(Insn::Exit),
      _ => Err(self.illegal()),
    }
  }

  /// Sign bit, then MSB-first magnitude bits up to the terminator.
  fn number(&mut self) -> Result<BigInt, WireError> {
    let sign = match self.expect()? {
      Glyph::Space => Sign::Plus,
      Glyph::Tab => Sign::Minus,
      Glyph::Lf => return Err(self.illegal()),
    };
    let mut magnitude = BigUint::default();
    loop {
      match self.expect()? {
        Glyph::Space => magnitude = magnitude << 1u8,
        Glyph::Tab => magnitude = (magnitude << 1u8) | BigUint::from(1u8),
        Glyph::Lf => break,
      }
    }
    if magnitude == BigUint::default() {
      return Ok(BigInt::default());
    }
    Ok(BigInt::from_biguint(sign, magnitude))
  }

  /// Bit string up to the terminator; leading zeros are significant.
  fn label(&mut self) -> Result<Label, WireError> {
    let mut bits = BigUint::default();
    let mut len = 0u64;
    loop {
      match self.expect()? {
        Glyph::Space => {
          bits = bits << 1u8;
          len += 1;
        }
        Glyph::Tab => {
          bits = (bits << 1u8) | BigUint::from(1u8);
          len += 1;
        }
        Glyph::Lf => break,
      }
    }
    Ok(Label::from_bits(bits, len))
  }

  /// Next significant glyph, skipping comment bytes.
  fn bump(&mut self) -> Option<Glyph> {
    while self.pos < self.src.len() {
      let byte = self.src[self.pos];
      self.pos += 1;
      match byte {
        b' ' => return Some(Glyph::Space),
        b'\t' => return Some(Glyph::Tab),
        b'\n' => return Some(Glyph::Lf),
        _ => {}
      }
    }
    None
  }

  fn expect(&mut self) -> Result<Glyph, WireError> {
    self.bump().ok_or(WireError {
      kind: WireErrorKind::UnexpectedEof,
      offset: self.pos,
    })
  }

  fn illegal(&self) -> WireError {
    WireError {
      kind: WireErrorKind::IllegalSequence,
      offset: self.pos.saturating_sub(1),
    }
  }
}

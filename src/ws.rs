//! The Whitespace wire format.
//!
//! Only space, tab and linefeed are significant; every other byte is a
//! comment. Each instruction is an IMP prefix, a command, and at most one
//! argument. Numbers carry a sign bit (space positive, tab negative)
//! followed by an MSB-first binary magnitude; labels are raw bit strings.
//! Both are terminated by a linefeed.
//!
//! `decode(encode(ir)) == ir` for every IR stream. `encode(decode(w)) == w`
//! for programs whose numbers are in minimal form; redundant leading zero
//! bits in a number decode to the same value and re-encode canonically.
//! Labels always round-trip byte-exactly, because distinct bit strings are
//! distinct labels.

mod decode;
mod encode;

pub use decode::{decode, WireError, WireErrorKind};
pub use encode::encode;

#[cfg(test)]
mod tests {
  use num_bigint::{BigInt, BigUint};

  use super::*;
  use crate::ir::{Insn, Label};

  fn l(index: u64) -> Label {
    Label::from_index(index)
  }

  #[test]
  fn encodes_push() {
    assert_eq!(encode(&[Insn::Push(BigInt::from(5))]), "   \t \t\n");
    assert_eq!(encode(&[Insn::Push(BigInt::from(-3))]), "  \t\t\t\n");
    // Zero is a sign bit with no magnitude bits.
    assert_eq!(encode(&[Insn::Push(BigInt::from(0))]), "   \n");
  }

  #[test]
  fn encodes_flow() {
    assert_eq!(encode(&[Insn::Def(l(1))]), "\n  \t\n");
    assert_eq!(encode(&[Insn::Call(l(1))]), "\n \t\t\n");
    assert_eq!(encode(&[Insn::End]), "\n\t\n");
    assert_eq!(encode(&[Insn::Exit]), "\n\n\n");
  }

  #[test]
  fn decodes_through_comments() {
    // "push 2, push 3, add, write_num, exit" with prose in between.
    let src = "  say \t0... \n then  \t\tpush!\n\t   \t\n \t\n\n\n";
    let ir = decode(src).unwrap();
    assert_eq!(
      ir,
      vec![
        Insn::Push(BigInt::from(2)),
        Insn::Push(BigInt::from(3)),
        Insn::Add,
        Insn::WriteNum,
        Insn::Exit,
      ]
    );
  }

  #[test]
  fn round_trips_every_opcode() {
    let ir = vec![
      Insn::Push(BigInt::from(42)),
      Insn::Push(BigInt::from(-40000000000i64)),
      Insn::Push(BigInt::from(0)),
      Insn::Dup,
      Insn::Swap,
      Insn::Pop,
      Insn::Add,
      Insn::Sub,
      Insn::Mul,
      Insn::Div,
      Insn::Mod,
      Insn::Save,
      Insn::Load,
      Insn::WriteChar,
      Insn::WriteNum,
      Insn::ReadChar,
      Insn::ReadNum,
      Insn::Def(l(0)),
      Insn::Call(l(1)),
      Insn::Jump(l(2)),
      Insn::JumpIfZero(l(3)),
      Insn::JumpIfNeg(l(600)),
      Insn::End,
      Insn::Exit,
    ];
    assert_eq!(decode(&encode(&ir)).unwrap(), ir);
  }

  #[test]
  fn canonical_text_round_trips_byte_exactly() {
    let ir = vec![
      Insn::Push(BigInt::from(7)),
      Insn::Def(l(3)),
      Insn::Jump(l(3)),
      Insn::Exit,
    ];
    let text = encode(&ir);
    assert_eq!(encode(&decode(&text).unwrap()), text);
  }

  #[test]
  fn labels_with_leading_zeros_stay_distinct() {
    // def %1 / def %01: same numeric value, different labels.
    let a = Label::from_bits(BigUint::from(1u32), 1);
    let b = Label::from_bits(BigUint::from(1u32), 2);
    let text = encode(&[Insn::Def(a.clone()), Insn::Def(b.clone())]);
    let ir = decode(&text).unwrap();
    assert_eq!(ir, vec![Insn::Def(a), Insn::Def(b)]);
    assert_eq!(encode(&ir), text);
  }

  #[test]
  fn rejects_truncated_number() {
    let err = decode("   \t\t").unwrap_err();
    assert_eq!(err.kind, WireErrorKind::UnexpectedEof);
  }

  #[test]
  fn rejects_illegal_sequence() {
    // [Space][Tab] is not a stack command.
    let err = decode(" \t").unwrap_err();
    assert_eq!(err.kind, WireErrorKind::IllegalSequence);
    // [Tab][Space][Tab][LF] is not an arithmetic command.
    let err = decode("\t \t\n").unwrap_err();
    assert_eq!(err.kind, WireErrorKind::IllegalSequence);
  }

  #[test]
  fn rejects_eof_mid_instruction() {
    let err = decode("\t").unwrap_err();
    assert_eq!(err.kind, WireErrorKind::UnexpectedEof);
  }
}

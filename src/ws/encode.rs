//! IR to Whitespace text.

use num_bigint::{BigInt, Sign};

use crate::ir::{Insn, Label};

const SPACE: char = ' ';
const TAB: char = '\t';
const LF: char = '\n';

/// Encodes an IR stream into Whitespace source text.
///
/// The encoding is deterministic: numbers are emitted in minimal form,
/// labels reproduce their stored bit pattern.
pub fn encode(program: &[Insn]) -> String {
  let mut out = String::new();
  for insn in program {
    encode_insn(&mut out, insn);
  }
  out
}

fn encode_insn(out: &mut String, insn: &Insn) {
  match insn {
    Insn::Push(n) => {
      out.push(SPACE);
      out.push(SPACE);
      push_number(out, n);
    }
    Insn::Dup => push_str(out, [SPACE, LF, SPACE]),
    Insn::Swap => push_str(out, [SPACE, LF, TAB]),
    Insn::Pop => push_str(out, [SPACE, LF, LF]),

    Insn::Add => push_str(out, [TAB, SPACE, SPACE, SPACE]),
    Insn::Sub => push_str(out, [TAB, SPACE, SPACE, TAB]),
    Insn::Mul => push_str(out, [TAB, SPACE, SPACE, LF]),
    Insn::Div => push_str(out, [TAB, SPACE, TAB, SPACE]),
    Insn::Mod => push_str(out, [TAB, SPACE, TAB, TAB]),

    Insn::Save => push_str(out, [TAB, TAB, SPACE]),
    Insn::Load => push_str(out, [TAB, TAB, TAB]),

    Insn::WriteChar => push_str(out, [TAB, LF, SPACE, SPACE]),
    Insn::WriteNum => push_str(out, [TAB, LF, SPACE, TAB]),
    Insn::ReadChar => push_str(out, [TAB, LF, TAB, SPACE]),
    Insn::ReadNum => push_str(out, [TAB, LF, TAB, TAB]),

    Insn::Def(l) => {
      push_str(out, [LF, SPACE, SPACE]);
      push_label(out, l);
    }
    Insn::Call(l) => {
      push_str(out, [LF, SPACE, TAB]);
      push_label(out, l);
    }
    Insn::Jump(l) => {
      push_str(out, [LF, SPACE, LF]);
      push_label(out, l);
    }
    Insn::JumpIfZero(l) => {
      push_str(out, [LF, TAB, SPACE]);
      push_label(out, l);
    }
    Insn::JumpIfNeg(l) => {
      push_str(out, [LF, TAB, TAB]);
      push_label(out, l);
    }
    Insn::End => push_str(out, [LF, TAB, LF]),
    Insn::Exit => push_str(out, [LF, LF, LF]),
  }
}

fn push_str<const N: usize>(out: &mut String, chars: [char; N]) {
  out.extend(chars);
}

/// Sign bit, MSB-first minimal magnitude, terminator. Zero is a sign bit
/// followed directly by the terminator.
fn push_number(out: &mut String, n: &BigInt) {
  out.push(if n.sign() == Sign::Minus { TAB } else { SPACE });
  let magnitude = n.magnitude();
  let len = magnitude.bits();
  for i in (0..len).rev() {
    out.push(if magnitude.bit(i) { TAB } else { SPACE });
  }
  out.push(LF);
}

fn push_label(out: &mut String, label: &Label) {
  for i in 0..label.len() {
    out.push(if label.bit(i) { TAB } else { SPACE });
  }
  out.push(LF);
}

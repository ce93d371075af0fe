//! The tagged-integer value encoding shared by the compiler and its
//! emitted programs.
//!
//! Every runtime value is a single signed integer whose low two bits are a
//! tag. The payload lives in the remaining high bits:
//!
//! ```text
//! wrapped = (payload << 2) | tag
//! ```
//!
//! Unwrapping is a flooring division by 4, which is exact for negative
//! payloads as well (the VM's DIV floors, see `vm`).

use num_bigint::BigInt;
use num_integer::Integer as _;
use num_traits::ToPrimitive;

/// Tag of the special values (false, none, true, nil, class codes).
pub const TAG_SPECIAL: i64 = 0;
/// Tag of integers.
pub const TAG_INT: i64 = 1;
/// Tag of arrays; the payload is the heap address of the descriptor.
pub const TAG_ARRAY: i64 = 2;
/// Tag of hashes; the payload is the heap address of the bucket block.
pub const TAG_HASH: i64 = 3;

// Wrapped forms of the special values.
pub const FALSE: i64 = 0;
pub const NONE: i64 = 1 << 2;
pub const TRUE: i64 = 2 << 2;
pub const NIL: i64 = 4 << 2;
pub const CLASS_SPECIAL: i64 = 8 << 2;
pub const CLASS_INT: i64 = 9 << 2;
pub const CLASS_ARRAY: i64 = 10 << 2;
pub const CLASS_HASH: i64 = 11 << 2;

/// Heap address of the null link sentinel.
pub const NONE_ADDR: i64 = 0;
/// Heap address of the process-wide scratch cell.
pub const TMP: i64 = 1;
/// Heap address of the bump pointer; holds the last allocated address.
pub const HEAP_COUNT: i64 = 2;
/// First heap address available to the static allocator.
pub const FIRST_STATIC: i64 = 3;

/// Number of head buckets in a hash object.
pub const HASH_BUCKETS: i64 = 11;

pub fn wrap(payload: impl Into<BigInt>, tag: i64) -> BigInt {
  payload.into() * 4 + tag
}

pub fn wrap_int(payload: impl Into<BigInt>) -> BigInt {
  wrap(payload, TAG_INT)
}

pub fn unwrap(wrapped: &BigInt) -> BigInt {
  wrapped.div_floor(&BigInt::from(4))
}

pub fn tag(wrapped: &BigInt) -> i64 {
  // mod_floor keeps the tag in 0..4 for negative wrapped integers.
  wrapped.mod_floor(&BigInt::from(4)).to_i64().unwrap_or(0)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn wrap_unwrap_round_trip() {
    for payload in [-1000i64, -1, 0, 1, 2, 41, 1 << 40] {
      for t in [TAG_SPECIAL, TAG_INT, TAG_ARRAY, TAG_HASH] {
        let w = wrap(payload, t);
        assert_eq!(unwrap(&w), BigInt::from(payload));
        assert_eq!(tag(&w), t);
      }
    }
  }

  #[test]
  fn special_values_are_distinct() {
    let all = [FALSE, NONE, TRUE, NIL, CLASS_SPECIAL, CLASS_INT, CLASS_ARRAY, CLASS_HASH];
    for (i, a) in all.iter().enumerate() {
      assert_eq!(tag(&BigInt::from(*a)), TAG_SPECIAL);
      for b in &all[i + 1..] {
        assert_ne!(a, b);
      }
    }
  }

  #[test]
  fn class_payload_low_bits_match_the_tag() {
    // `is_a?` relies on `class_payload - 8` being the tag of instances.
    assert_eq!(unwrap(&BigInt::from(CLASS_SPECIAL)) - 8, BigInt::from(TAG_SPECIAL));
    assert_eq!(unwrap(&BigInt::from(CLASS_INT)) - 8, BigInt::from(TAG_INT));
    assert_eq!(unwrap(&BigInt::from(CLASS_ARRAY)) - 8, BigInt::from(TAG_ARRAY));
    assert_eq!(unwrap(&BigInt::from(CLASS_HASH)) - 8, BigInt::from(TAG_HASH));
  }

  #[test]
  fn negative_integers_unwrap_exactly() {
    let w = wrap_int(-10);
    assert_eq!(w, BigInt::from(-39));
    assert_eq!(unwrap(&w), BigInt::from(-10));
    assert_eq!(tag(&w), TAG_INT);
  }
}

//! ALU arithmetic operations.
//!
//! Implements integer addition and subtraction, with and without overflow
//! trapping, and the multiply/divide family that writes the HI/LO pair.
//!
//! Overflow uses the two's-complement rule for every signed form (register and
//! immediate alike): an add overflows when both operands share a sign and the
//! result's sign differs; a subtract overflows when the operands differ in sign
//! and the result's sign differs from the minuend's.

use super::AluOp;
use crate::common::Exception;

/// Sign bit of a 32-bit word.
const SIGN_BIT: u32 = 0x8000_0000;

/// Number of bits in a word (used to split 64-bit products into HI/LO).
const WORD_BITS: u32 = 32;

/// Executes an add/subtract operation.
///
/// # Returns
///
/// The wrapped 32-bit result, or [`Exception::Overflow`] for `Add`/`Sub`
/// results that overflow. Non-arithmetic opcodes return `Ok(0)`.
pub fn execute(op: AluOp, a: u32, b: u32) -> Result<u32, Exception> {
    match op {
        AluOp::Add => {
            let sum = a.wrapping_add(b);
            if add_overflows(a, b, sum) {
                Err(Exception::Overflow)
            } else {
                Ok(sum)
            }
        }
        AluOp::Addu => Ok(a.wrapping_add(b)),
        AluOp::Sub => {
            let diff = a.wrapping_sub(b);
            if sub_overflows(a, b, diff) {
                Err(Exception::Overflow)
            } else {
                Ok(diff)
            }
        }
        AluOp::Subu => Ok(a.wrapping_sub(b)),
        _ => Ok(0),
    }
}

/// Returns `true` if `a + b = sum` overflowed as a signed addition.
#[inline(always)]
pub const fn add_overflows(a: u32, b: u32, sum: u32) -> bool {
    (a ^ b) & SIGN_BIT == 0 && (a ^ sum) & SIGN_BIT != 0
}

/// Returns `true` if `a - b = diff` overflowed as a signed subtraction.
#[inline(always)]
pub const fn sub_overflows(a: u32, b: u32, diff: u32) -> bool {
    (a ^ b) & SIGN_BIT != 0 && (a ^ diff) & SIGN_BIT != 0
}

/// Signed 32x32 multiply.
///
/// # Returns
///
/// `(hi, lo)`: the upper and lower words of the 64-bit product.
#[inline]
pub const fn mult(a: u32, b: u32) -> (u32, u32) {
    let product = (a as i32 as i64) * (b as i32 as i64);
    ((product >> WORD_BITS) as u32, product as u32)
}

/// Unsigned 32x32 multiply.
///
/// # Returns
///
/// `(hi, lo)`: the upper and lower words of the 64-bit product.
#[inline]
pub const fn multu(a: u32, b: u32) -> (u32, u32) {
    let product = (a as u64) * (b as u64);
    ((product >> WORD_BITS) as u32, product as u32)
}

/// Signed divide.
///
/// # Returns
///
/// `(hi, lo)`: remainder and quotient. Division by zero yields `(0, 0)`;
/// `i32::MIN / -1` wraps.
#[inline]
pub const fn div(a: u32, b: u32) -> (u32, u32) {
    if b == 0 {
        return (0, 0);
    }
    let (a, b) = (a as i32, b as i32);
    (a.wrapping_rem(b) as u32, a.wrapping_div(b) as u32)
}

/// Unsigned divide.
///
/// # Returns
///
/// `(hi, lo)`: remainder and quotient. Division by zero yields `(0, 0)`.
#[inline]
pub const fn divu(a: u32, b: u32) -> (u32, u32) {
    if b == 0 {
        return (0, 0);
    }
    (a % b, a / b)
}

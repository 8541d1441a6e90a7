//! ALU logical and comparison operations.
//!
//! Implements bitwise AND, OR, XOR, NOR and set-less-than (signed and
//! unsigned). Comparison results are always 0 or 1.

use super::AluOp;

/// Executes a logical or comparison operation.
///
/// Returns `0` for non-logic opcodes.
pub const fn execute(op: AluOp, a: u32, b: u32) -> u32 {
    match op {
        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        AluOp::Nor => !(a | b),
        AluOp::Slt => ((a as i32) < (b as i32)) as u32,
        AluOp::Sltu => (a < b) as u32,
        _ => 0,
    }
}

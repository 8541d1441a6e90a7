//! Arithmetic Logic Unit (ALU).
//!
//! This module implements the integer ALU used by the execute step. It handles
//! arithmetic with overflow detection, logical operations, comparisons and shifts
//! on 32-bit operands, plus the HI/LO multiply and divide family.
//!
//! Operations are organized into submodules by category:
//! - [`arithmetic`]: Add, Addu, Sub, Subu, and the multiply/divide helpers
//! - [`logic`]:      And, Or, Xor, Nor, Slt, Sltu
//! - [`shifts`]:     Sll, Srl, Sra

/// Integer arithmetic operations (add, subtract, multiply, divide).
pub mod arithmetic;

/// Bitwise logical and comparison operations (and, or, xor, nor, slt).
pub mod logic;

/// Shift operations (sll, srl, sra).
pub mod shifts;

use crate::common::Exception;

/// Integer ALU operation selected by the execute step.
///
/// Immediate forms map onto the same operations: `ADDI` is [`AluOp::Add`],
/// `SLTIU` is [`AluOp::Sltu`], and so on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    /// Signed add; traps on overflow.
    Add,
    /// Unsigned (wrapping) add.
    Addu,
    /// Signed subtract; traps on overflow.
    Sub,
    /// Unsigned (wrapping) subtract.
    Subu,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Bitwise NOR.
    Nor,
    /// Signed set-less-than.
    Slt,
    /// Unsigned set-less-than.
    Sltu,
    /// Shift left logical.
    Sll,
    /// Shift right logical.
    Srl,
    /// Shift right arithmetic.
    Sra,
}

/// Arithmetic Logic Unit for integer operations.
#[derive(Debug)]
pub struct Alu;

impl Alu {
    /// Executes an integer ALU operation.
    ///
    /// # Arguments
    ///
    /// * `op` - The ALU operation to perform
    /// * `a`  - First operand (the value being shifted for shift operations)
    /// * `b`  - Second operand (the shift amount for shift operations)
    ///
    /// # Returns
    ///
    /// The 32-bit result, or [`Exception::Overflow`] for a signed add or
    /// subtract whose result does not fit.
    ///
    /// # Examples
    ///
    /// ```
    /// use mipsim_core::common::Exception;
    /// use mipsim_core::core::units::alu::{Alu, AluOp};
    ///
    /// assert_eq!(Alu::execute(AluOp::Addu, 0x7fff_ffff, 1), Ok(0x8000_0000));
    /// assert_eq!(Alu::execute(AluOp::Add, 0x7fff_ffff, 1), Err(Exception::Overflow));
    /// assert_eq!(Alu::execute(AluOp::Sra, 0x8000_0000, 4), Ok(0xf800_0000));
    /// ```
    pub fn execute(op: AluOp, a: u32, b: u32) -> Result<u32, Exception> {
        match op {
            AluOp::Add | AluOp::Addu | AluOp::Sub | AluOp::Subu => arithmetic::execute(op, a, b),
            AluOp::And | AluOp::Or | AluOp::Xor | AluOp::Nor | AluOp::Slt | AluOp::Sltu => {
                Ok(logic::execute(op, a, b))
            }
            AluOp::Sll | AluOp::Srl | AluOp::Sra => Ok(shifts::execute(op, a, b)),
        }
    }
}

//! Instruction Set Architecture (ISA) Definitions.
//!
//! Contains definitions for opcodes, instruction formats, and decoding logic for the
//! MIPS R3000-style integer instruction set the machine executes.
//!
//! # Layout
//!
//! * `instruction`: Field extraction from raw words and the decoded [`Instruction`].
//! * `opcodes`: The [`Opcode`] and [`Format`] enums.
//! * `decode`: The primary and secondary (special / branch-conditional) dispatch tables.
//! * `disasm`: Mnemonic rendering for trace output.
//! * `abi`: Conventional register names.

/// Application Binary Interface (ABI) register name mappings.
pub mod abi;

/// Opcode/format dispatch tables and the decoder.
pub mod decode;

/// Instruction disassembler for debug tracing and diagnostics.
pub mod disasm;

/// Instruction encoding structures and bit extraction utilities.
pub mod instruction;

/// Opcode and format definitions.
pub mod opcodes;

pub use instruction::Instruction;
pub use opcodes::{Format, Opcode};

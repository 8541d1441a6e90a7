//! MIPS Application Binary Interface (ABI) register names.
//!
//! Conventional names for the 32 general-purpose registers, used by the
//! disassembler and state dumps.

/// ABI register names for `$0`–`$31`.
pub const REG_NAMES: [&str; 32] = [
    "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3", "t0", "t1", "t2", "t3", "t4", "t5", "t6",
    "t7", "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", "t8", "t9", "k0", "k1", "gp", "sp",
    "s8", "ra",
];

/// Returns the ABI name for a general-purpose register index.
#[inline]
pub fn reg_name(idx: usize) -> &'static str {
    REG_NAMES.get(idx).copied().unwrap_or("$??")
}

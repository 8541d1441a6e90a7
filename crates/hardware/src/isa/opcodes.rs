//! Opcode and instruction format definitions.

/// Instruction encoding format, selecting how the `extra` field is extracted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// Immediate format: `extra` is the sign-extended 16-bit immediate.
    I,
    /// Jump format: `extra` is the 26-bit target index.
    J,
    /// Register format: `extra` is the 5-bit shift amount.
    R,
}

/// Every operation the machine can execute.
///
/// `Special` and `Bcond` only appear in the primary table; the decoder always
/// resolves them through the secondary tables before execution.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add,
    Addi,
    Addiu,
    Addu,
    And,
    Andi,
    Beq,
    Bgez,
    Bgezal,
    Bgtz,
    Blez,
    Bltz,
    Bltzal,
    Bne,
    Div,
    Divu,
    J,
    Jal,
    Jalr,
    Jr,
    Lb,
    Lbu,
    Lh,
    Lhu,
    Lui,
    Lw,
    Lwl,
    Lwr,
    Mfhi,
    Mflo,
    Mthi,
    Mtlo,
    Mult,
    Multu,
    Nor,
    Or,
    Ori,
    Sb,
    Sh,
    Sll,
    Sllv,
    Slt,
    Slti,
    Sltiu,
    Sltu,
    Sra,
    Srav,
    Srl,
    Srlv,
    Sub,
    Subu,
    Sw,
    Swl,
    Swr,
    Xor,
    Xori,
    Syscall,
    /// Primary-table marker for the register-format group.
    Special,
    /// Primary-table marker for the branch-conditional group.
    Bcond,
    /// Reserved encoding.
    Res,
    /// Valid encoding the machine does not implement (coprocessor ops, `BREAK`).
    Unimp,
}

impl Opcode {
    /// Returns the assembler mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Addi => "addi",
            Self::Addiu => "addiu",
            Self::Addu => "addu",
            Self::And => "and",
            Self::Andi => "andi",
            Self::Beq => "beq",
            Self::Bgez => "bgez",
            Self::Bgezal => "bgezal",
            Self::Bgtz => "bgtz",
            Self::Blez => "blez",
            Self::Bltz => "bltz",
            Self::Bltzal => "bltzal",
            Self::Bne => "bne",
            Self::Div => "div",
            Self::Divu => "divu",
            Self::J => "j",
            Self::Jal => "jal",
            Self::Jalr => "jalr",
            Self::Jr => "jr",
            Self::Lb => "lb",
            Self::Lbu => "lbu",
            Self::Lh => "lh",
            Self::Lhu => "lhu",
            Self::Lui => "lui",
            Self::Lw => "lw",
            Self::Lwl => "lwl",
            Self::Lwr => "lwr",
            Self::Mfhi => "mfhi",
            Self::Mflo => "mflo",
            Self::Mthi => "mthi",
            Self::Mtlo => "mtlo",
            Self::Mult => "mult",
            Self::Multu => "multu",
            Self::Nor => "nor",
            Self::Or => "or",
            Self::Ori => "ori",
            Self::Sb => "sb",
            Self::Sh => "sh",
            Self::Sll => "sll",
            Self::Sllv => "sllv",
            Self::Slt => "slt",
            Self::Slti => "slti",
            Self::Sltiu => "sltiu",
            Self::Sltu => "sltu",
            Self::Sra => "sra",
            Self::Srav => "srav",
            Self::Srl => "srl",
            Self::Srlv => "srlv",
            Self::Sub => "sub",
            Self::Subu => "subu",
            Self::Sw => "sw",
            Self::Swl => "swl",
            Self::Swr => "swr",
            Self::Xor => "xor",
            Self::Xori => "xori",
            Self::Syscall => "syscall",
            Self::Special => "special",
            Self::Bcond => "bcond",
            Self::Res => "res",
            Self::Unimp => "unimp",
        }
    }
}

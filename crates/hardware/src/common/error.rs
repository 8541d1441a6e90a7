//! Exception, fault and simulator error definitions.
//!
//! This module defines the error handling mechanisms for the simulator. It provides:
//! 1. **Machine Exceptions:** The closed set of synchronous exceptions the CPU and
//!    translator can raise into the kernel trap handler.
//! 2. **Faults:** An exception paired with the virtual address that caused it, as
//!    returned by CPU-level operations before it is raised.
//! 3. **Simulator Errors:** Host-side failures (image loading, configuration, host
//!    threads) that abort startup or a run instead of reaching simulated code.

use std::path::PathBuf;

use thiserror::Error;

use super::addr::VirtAddr;

/// Synchronous machine exceptions.
///
/// Every variant is surfaced to the kernel trap handler; the core never resolves
/// one on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum Exception {
    /// A program executed a system call.
    #[error("syscall")]
    Syscall,

    /// No valid translation found for the virtual page.
    #[error("page fault")]
    PageFault,

    /// Write attempted to a page marked read-only.
    #[error("page modification (read-only) exception")]
    ReadOnly,

    /// Translation resulted in an invalid physical frame.
    #[error("bus error")]
    BusError,

    /// Unaligned reference or one beyond the end of the address space.
    #[error("address error")]
    AddressError,

    /// Signed integer overflow in `ADD`, `ADDI` or `SUB`.
    #[error("arithmetic overflow")]
    Overflow,

    /// Reserved or unimplemented instruction.
    #[error("illegal instruction")]
    IllegalInstruction,
}

impl Exception {
    /// Every exception kind, in numbering order.
    pub const ALL: [Self; 7] = [
        Self::Syscall,
        Self::PageFault,
        Self::ReadOnly,
        Self::BusError,
        Self::AddressError,
        Self::Overflow,
        Self::IllegalInstruction,
    ];

    /// Returns the short name used in traces and state dumps.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Syscall => "Syscall",
            Self::PageFault => "PageFault",
            Self::ReadOnly => "ReadOnly",
            Self::BusError => "BusError",
            Self::AddressError => "AddressError",
            Self::Overflow => "Overflow",
            Self::IllegalInstruction => "IllegalInstruction",
        }
    }
}

/// An exception produced by a CPU-level operation, not yet raised.
///
/// `bad_vaddr` is the address that caused a memory exception, or zero for
/// exceptions that are not tied to an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fault {
    /// The kind of exception.
    pub kind: Exception,
    /// Faulting virtual address (recorded in the bad-vaddr register on raise).
    pub bad_vaddr: VirtAddr,
}

impl Fault {
    /// Creates a fault tied to a memory address.
    #[inline]
    pub const fn at(kind: Exception, addr: VirtAddr) -> Self {
        Self {
            kind,
            bad_vaddr: addr,
        }
    }

    /// Creates a fault that is not tied to an address.
    #[inline]
    pub const fn new(kind: Exception) -> Self {
        Self::at(kind, VirtAddr(0))
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.kind, self.bad_vaddr)
    }
}

/// Host-side simulator errors.
#[derive(Debug, Error)]
pub enum SimError {
    /// An executable image could not be read.
    #[error("unable to open {path}: {source}")]
    Io {
        /// Path of the image.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The image does not start with the NOFF magic number.
    #[error("not a NOFF image (magic {found:#010x})")]
    BadMagic {
        /// The first word of the image.
        found: u32,
    },

    /// The image is shorter than its header or one of its segments claims.
    #[error("image truncated: needed {needed} bytes, found {found}")]
    Truncated {
        /// Bytes required by the header.
        needed: usize,
        /// Bytes actually present.
        found: usize,
    },

    /// The header's segment sizes add up to more than a 32-bit address space.
    #[error("image segments overflow the address space: {what}")]
    ImageTooLarge {
        /// The computation that overflowed.
        what: &'static str,
    },

    /// The address space does not fit in the remaining physical frames.
    #[error("address space needs {requested} pages but only {available} are free")]
    OutOfMemory {
        /// Pages the image needs.
        requested: u32,
        /// Frames left in main memory.
        available: u32,
    },

    /// The configuration document is malformed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The configuration parsed but describes an impossible machine.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The host refused to create a thread for a new execution context.
    #[error("failed to spawn host thread for {name}: {source}")]
    Spawn {
        /// Name of the simulated thread.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A simulated thread panicked; the run cannot continue.
    #[error("thread {name} panicked")]
    ContextPanicked {
        /// Name of the simulated thread.
        name: String,
    },
}

//! CPU Core Definition and Initialization.
//!
//! This module defines the central `Cpu` structure, which serves as the container for the
//! entire processor state. It coordinates the following:
//! 1. **State Management:** The 40-slot register file, including PC/NextPC and the
//!    delayed-load pair.
//! 2. **Memory:** Flat little-endian main memory reached only through the translator.
//! 3. **Execution:** One-instruction steps with branch delay slots and delayed loads.
//! 4. **Exceptions:** Producing faults and preparing the register file for the trap handler.

/// Instruction execution (fetch, decode, execute, retire).
pub mod execution;

/// Memory access through the address translator.
pub mod memory;

/// Exception entry and program-counter helpers for the trap handler.
pub mod trap;

use crate::common::RegisterFile;
use crate::config::MachineConfig;
use crate::core::units::mmu::Mmu;

/// Main CPU structure containing all processor state.
///
/// The CPU itself never calls into the kernel: operations that raise an
/// exception return a [`Fault`](crate::common::Fault), and the simulator
/// turns that into a trap-handler invocation.
#[derive(Debug)]
pub struct Cpu {
    /// Architectural registers.
    pub regs: RegisterFile,
    /// Address translator and the active page table.
    pub mmu: Mmu,
    /// Main memory.
    memory: Vec<u8>,
    /// Instructions retired since boot.
    pub instructions_retired: u64,
}

impl Cpu {
    /// Creates a CPU with zeroed registers and memory and no page table.
    ///
    /// # Arguments
    ///
    /// * `config` - Machine geometry (page size and frame count).
    pub fn new(config: &MachineConfig) -> Self {
        Self {
            regs: RegisterFile::new(),
            mmu: Mmu::new(config.page_size, config.num_phys_pages),
            memory: vec![0; config.memory_size()],
            instructions_retired: 0,
        }
    }

    /// Reads a register slot.
    #[inline]
    pub const fn read_register(&self, idx: usize) -> u32 {
        self.regs.read(idx)
    }

    /// Writes a register slot. Writes to register 0 are ignored.
    #[inline]
    pub const fn write_register(&mut self, idx: usize, value: u32) {
        self.regs.write(idx, value);
    }

    /// Main memory as raw bytes, indexed by physical address.
    pub fn main_memory(&self) -> &[u8] {
        &self.memory
    }

    /// Main memory as raw mutable bytes, for loaders.
    pub fn main_memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }

    /// Dumps the register file and active page table to stdout.
    pub fn dump_state(&self) {
        self.regs.dump();
        match self.mmu.page_table() {
            Some(table) => {
                println!("Page table ({} pages):", table.len());
                for e in table.iter().filter(|e| e.valid) {
                    println!(
                        "\tvpn {:>4} -> frame {:>4}{}{}{}",
                        e.virtual_page,
                        e.physical_page,
                        if e.read_only { " ro" } else { "" },
                        if e.used { " used" } else { "" },
                        if e.dirty { " dirty" } else { "" },
                    );
                }
            }
            None => println!("No page table installed"),
        }
    }
}

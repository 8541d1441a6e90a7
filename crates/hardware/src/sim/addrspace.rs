//! User address spaces.
//!
//! An address space owns a process's page table and knows how to prepare the
//! CPU to run it. The scheduler calls into it on every context switch: the
//! outgoing space takes its page table back from the translator, the incoming
//! one installs its own.

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::common::constants::{NEXT_PC_REG, NUM_TOTAL_REGS, PC_REG, STACK_REG};
use crate::common::{SimError, lock};
use crate::core::Cpu;
use crate::core::units::mmu::page_table::PageTable;

use super::loader::{NoffHeader, Segment, load_binary};
use super::simulator::Simulator;

/// Tracing target for address-space events.
const TARGET: &str = "mipsim::addrspace";

/// Per-process memory context, switched along with its thread.
pub trait AddressSpace: Send + fmt::Debug {
    /// Sets the registers for a fresh start of the program.
    fn init_registers(&self, cpu: &mut Cpu);

    /// Persists switch-time state when the owning thread is switched out.
    fn save_on_switch(&mut self, cpu: &mut Cpu);

    /// Makes this space the active one when the owning thread is switched in.
    fn restore_on_switch(&mut self, cpu: &mut Cpu);
}

/// Address space for a program loaded from a NOFF image.
///
/// Pages map one-to-one onto a contiguous run of physical frames. The page
/// table lives in the translator while the owning thread runs and comes back
/// here when it is switched out.
#[derive(Debug)]
pub struct ProcessAddressSpace {
    page_table: Option<PageTable>,
    num_pages: u32,
    page_size: u32,
}

impl ProcessAddressSpace {
    /// Loads the NOFF executable at `path`.
    ///
    /// # Errors
    ///
    /// [`SimError::Io`] if the file cannot be read, or any error from
    /// [`ProcessAddressSpace::from_image`].
    pub fn load(sim: &Simulator, path: &Path) -> Result<Self, SimError> {
        let image = load_binary(path)?;
        Self::from_image(sim, &image)
    }

    /// Builds an address space from a NOFF image already in memory.
    ///
    /// Reserves enough frames for the segments plus the user stack, zeroes
    /// them, and copies the code and initialized data into place.
    ///
    /// # Errors
    ///
    /// * [`SimError::BadMagic`] or [`SimError::Truncated`] for malformed images.
    /// * [`SimError::OutOfMemory`] if main memory cannot hold the program.
    pub fn from_image(sim: &Simulator, image: &[u8]) -> Result<Self, SimError> {
        let header = NoffHeader::parse(image)?;
        let page_size = sim.config().machine.page_size;
        let size = header
            .image_size()?
            .checked_add(sim.config().process.user_stack_size)
            .ok_or(SimError::ImageTooLarge {
                what: "segments plus user stack",
            })?;
        let num_pages = size.div_ceil(page_size);
        let size = num_pages
            .checked_mul(page_size)
            .ok_or(SimError::ImageTooLarge {
                what: "page-rounded size",
            })?;

        let first_frame = {
            let mut frames = lock(&sim.shared().frames);
            let available = frames.available();
            frames.allocate(num_pages).ok_or(SimError::OutOfMemory {
                requested: num_pages,
                available,
            })?
        };
        debug!(
            target: TARGET,
            "initializing address space, num pages {num_pages}, size {size}"
        );

        // Frames come from main memory, so the window always lies inside it.
        let base = first_frame as usize * page_size as usize;
        sim.with_cpu(|cpu| -> Result<(), SimError> {
            let memory = cpu.main_memory_mut();
            let found = memory.len();
            let end = base + size as usize;
            let window = memory
                .get_mut(base..end)
                .ok_or(SimError::Truncated { needed: end, found })?;
            window.fill(0);
            copy_segment(window, &header.code, image, "code")?;
            copy_segment(window, &header.init_data, image, "data")
        })?;

        Ok(Self {
            page_table: Some(PageTable::contiguous(first_frame, num_pages)),
            num_pages,
            page_size,
        })
    }

    /// Number of virtual pages.
    pub const fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// The page table, when it is not installed in the translator.
    pub const fn page_table(&self) -> Option<&PageTable> {
        self.page_table.as_ref()
    }
}

fn copy_segment(
    window: &mut [u8],
    segment: &Segment,
    image: &[u8],
    what: &str,
) -> Result<(), SimError> {
    if segment.size == 0 {
        return Ok(());
    }
    debug!(
        target: TARGET,
        "initializing {what} segment, at {:#x}, size {}",
        segment.virtual_addr,
        segment.size
    );
    let bytes = segment.bytes(image)?;
    let start = segment.virtual_addr as usize;
    let end = start.saturating_add(bytes.len());
    let found = window.len();
    let dest = window
        .get_mut(start..end)
        .ok_or(SimError::Truncated { needed: end, found })?;
    dest.copy_from_slice(bytes);
    Ok(())
}

impl AddressSpace for ProcessAddressSpace {
    fn init_registers(&self, cpu: &mut Cpu) {
        for idx in 0..NUM_TOTAL_REGS {
            cpu.write_register(idx, 0);
        }
        cpu.write_register(PC_REG, 0);
        cpu.write_register(NEXT_PC_REG, 4);

        // Keep the stack pointer a little below the top of the space.
        let sp = (self.num_pages * self.page_size).saturating_sub(16);
        cpu.write_register(STACK_REG, sp);
        debug!(target: TARGET, "initializing stack register to {sp}");
    }

    fn save_on_switch(&mut self, cpu: &mut Cpu) {
        if let Some(table) = cpu.mmu.take_page_table() {
            self.page_table = Some(table);
        }
    }

    fn restore_on_switch(&mut self, cpu: &mut Cpu) {
        if let Some(table) = self.page_table.take() {
            let _ = cpu.mmu.set_page_table(table);
        }
    }
}

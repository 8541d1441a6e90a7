//! Configuration system for the machine simulator.
//!
//! This module defines the configuration structures used to parameterize a run.
//! It provides:
//! 1. **Defaults:** Baseline machine constants (page geometry, tick increments, timer period).
//! 2. **Structures:** Sectioned config for the machine, timing, timer device and user processes.
//! 3. **Loading:** Deserialization from JSON documents, with every field optional.
//!
//! Use `Config::default()` for the classic machine or `Config::from_json` to override parts of it.

use serde::Deserialize;

use crate::common::SimError;

/// Default configuration constants for the simulator.
///
/// These values describe the classic instructional machine and are used
/// whenever a field is not explicitly overridden.
mod defaults {
    use crate::common::constants;

    /// Bytes per page (equal to a disk sector).
    pub const PAGE_SIZE: u32 = constants::PAGE_SIZE;

    /// Number of physical page frames.
    pub const NUM_PHYS_PAGES: u32 = constants::NUM_PHYS_PAGES;

    /// Ticks charged per user instruction.
    pub const USER_TICK: u64 = constants::USER_TICK;

    /// Ticks charged per interrupt-enable in kernel code.
    pub const SYSTEM_TICK: u64 = constants::SYSTEM_TICK;

    /// Ticks between timer interrupts.
    pub const TIMER_TICKS: u64 = constants::TIMER_TICKS;

    /// Bytes reserved for each user stack.
    pub const USER_STACK_SIZE: u32 = constants::USER_STACK_SIZE;
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Memory geometry.
    pub machine: MachineConfig,
    /// Simulated time accounting.
    pub timing: TimingConfig,
    /// Periodic timer device.
    pub timer: TimerConfig,
    /// User process layout.
    pub process: ProcessConfig,
}

impl Config {
    /// Parses a JSON configuration document.
    ///
    /// Missing sections and fields take their defaults.
    ///
    /// # Errors
    ///
    /// * [`SimError::Config`] if the document is not valid JSON or names an
    ///   unknown field.
    /// * [`SimError::InvalidConfig`] if the values fail [`Config::validate`].
    pub fn from_json(text: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the machine described is buildable.
    ///
    /// Pages and frames must be non-empty, and main memory must be
    /// addressable with 32-bit physical addresses.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> Result<(), SimError> {
        let machine = &self.machine;
        if machine.page_size == 0 {
            return Err(SimError::InvalidConfig("machine.page_size must be non-zero".into()));
        }
        if machine.num_phys_pages == 0 {
            return Err(SimError::InvalidConfig(
                "machine.num_phys_pages must be non-zero".into(),
            ));
        }
        if machine.page_size.checked_mul(machine.num_phys_pages).is_none() {
            return Err(SimError::InvalidConfig(format!(
                "{} pages of {} bytes exceed the physical address space",
                machine.num_phys_pages, machine.page_size
            )));
        }
        Ok(())
    }

    /// Returns a copy with the timer device disabled.
    ///
    /// Useful for runs that must observe purely cooperative scheduling.
    #[must_use]
    pub fn without_timer(mut self) -> Self {
        self.timer.enabled = false;
        self
    }
}

/// Physical memory geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MachineConfig {
    /// Bytes per page; must be non-zero.
    pub page_size: u32,
    /// Number of physical page frames; must be non-zero.
    pub num_phys_pages: u32,
}

impl MachineConfig {
    /// Size of main memory in bytes.
    pub const fn memory_size(&self) -> usize {
        self.page_size as usize * self.num_phys_pages as usize
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            page_size: defaults::PAGE_SIZE,
            num_phys_pages: defaults::NUM_PHYS_PAGES,
        }
    }
}

/// Per-mode tick increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Ticks charged for each step taken while the machine is in user mode.
    pub user_tick: u64,
    /// Ticks charged for each step taken while the machine is in system mode.
    pub system_tick: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            user_tick: defaults::USER_TICK,
            system_tick: defaults::SYSTEM_TICK,
        }
    }
}

/// Timer device settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimerConfig {
    /// Whether the timer is started when the simulator boots.
    pub enabled: bool,
    /// Period between interrupts when not randomized.
    pub ticks: u64,
    /// Seed for randomized intervals in `1..=2 * ticks`; `None` means periodic.
    pub random_seed: Option<u64>,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ticks: defaults::TIMER_TICKS,
            random_seed: None,
        }
    }
}

/// User process layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessConfig {
    /// Bytes reserved for the user stack above the loaded segments.
    pub user_stack_size: u32,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            user_stack_size: defaults::USER_STACK_SIZE,
        }
    }
}

//! Simulator: one run's worth of machine and kernel state.
//!
//! Everything that would otherwise be process-wide (the CPU, the event timeline,
//! the scheduler, statistics, the trap handler) lives in one aggregate that is
//! cloned into every simulated thread. Independent simulators can therefore run
//! side by side in the same process.
//!
//! Only one simulated thread executes at a time, so the locks below are never
//! contended; they exist to make the aggregate shareable across host threads.
//! No lock is held while control leaves the simulator (handlers, thread bodies,
//! context switches).

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::common::{Exception, Fault, SimError, VirtAddr, lock};
use crate::config::Config;
use crate::core::Cpu;
use crate::core::arch::mode::MachineStatus;
use crate::core::units::mmu::frames::FrameAllocator;
use crate::devices::timer::Timer;
use crate::stats::SimStats;
use crate::threads::baton::{Baton, Outcome};
use crate::threads::scheduler::Scheduler;
use crate::threads::thread::ThreadStatus;

use super::addrspace::AddressSpace;
use super::interrupt::Timeline;

/// Tracing target for CPU-level events.
const TARGET: &str = "mipsim::machine";

/// Kernel entry point for synchronous exceptions.
///
/// Invoked with the machine in system mode and interrupts enabled. The handler
/// decides whether to move the PC on before returning.
pub type TrapHandler = Arc<dyn Fn(&Simulator, Exception) + Send + Sync>;

/// State shared by every context of one simulator.
pub(crate) struct Shared {
    pub(crate) config: Config,
    pub(crate) cpu: Mutex<Cpu>,
    pub(crate) timeline: Mutex<Timeline>,
    pub(crate) scheduler: Mutex<Scheduler>,
    /// Device and scheduler counters; the clock, instruction and page-fault
    /// counts are read from their owners instead.
    pub(crate) stats: Mutex<SimStats>,
    pub(crate) frames: Mutex<FrameAllocator>,
    pub(crate) baton: Baton,
    trap_handler: Mutex<Option<TrapHandler>>,
}

/// Top-level simulator handle.
///
/// Cheap to clone; all clones refer to the same machine.
#[derive(Clone)]
pub struct Simulator {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

impl Simulator {
    /// Creates a powered-off machine: zeroed memory, no threads, no events.
    ///
    /// # Arguments
    ///
    /// * `config` - Machine geometry, timing and timer settings.
    pub fn new(config: Config) -> Self {
        let shared = Shared {
            cpu: Mutex::new(Cpu::new(&config.machine)),
            timeline: Mutex::new(Timeline::new()),
            scheduler: Mutex::new(Scheduler::new()),
            stats: Mutex::new(SimStats::default()),
            frames: Mutex::new(FrameAllocator::new(config.machine.num_phys_pages)),
            baton: Baton::new(),
            trap_handler: Mutex::new(None),
            config,
        };
        Self {
            shared: Arc::new(shared),
        }
    }

    /// Builder-style variant of [`Simulator::set_trap_handler`].
    #[must_use]
    pub fn with_trap_handler<F>(self, handler: F) -> Self
    where
        F: Fn(&Self, Exception) + Send + Sync + 'static,
    {
        self.set_trap_handler(handler);
        self
    }

    /// Installs the kernel's exception handler.
    pub fn set_trap_handler<F>(&self, handler: F)
    where
        F: Fn(&Self, Exception) + Send + Sync + 'static,
    {
        *lock(&self.shared.trap_handler) = Some(Arc::new(handler));
    }

    pub(crate) fn shared(&self) -> &Shared {
        &self.shared
    }

    /// The configuration this machine was built with.
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// Runs `f` with exclusive access to the CPU.
    ///
    /// `f` must not call back into the simulator.
    pub fn with_cpu<R>(&self, f: impl FnOnce(&mut Cpu) -> R) -> R {
        f(&mut lock(&self.shared.cpu))
    }

    /// Reads a CPU register.
    pub fn read_register(&self, idx: usize) -> u32 {
        lock(&self.shared.cpu).read_register(idx)
    }

    /// Writes a CPU register. Writes to register 0 are ignored.
    pub fn write_register(&self, idx: usize, value: u32) {
        lock(&self.shared.cpu).write_register(idx, value);
    }

    /// Moves the user PC past the instruction that trapped.
    pub fn advance_pc(&self) {
        lock(&self.shared.cpu).advance_pc();
    }

    /// Reads user memory, raising an exception if translation fails.
    ///
    /// # Returns
    ///
    /// The value, or `None` after the exception has been handled.
    pub fn read_mem(&self, addr: u32, size: u32) -> Option<u32> {
        let result = lock(&self.shared.cpu).read_mem(VirtAddr::new(addr), size);
        result.map_err(|fault| self.raise_exception(fault)).ok()
    }

    /// Writes user memory, raising an exception if translation fails.
    ///
    /// # Returns
    ///
    /// `false` if an exception was raised instead.
    pub fn write_mem(&self, addr: u32, size: u32, value: u32) -> bool {
        let result = lock(&self.shared.cpu).write_mem(VirtAddr::new(addr), size, value);
        result.map_err(|fault| self.raise_exception(fault)).is_ok()
    }

    /// Bumps device or scheduler counters.
    pub fn record(&self, f: impl FnOnce(&mut SimStats)) {
        f(&mut lock(&self.shared.stats));
    }

    /// Snapshot of every counter.
    pub fn stats(&self) -> SimStats {
        let (instructions_retired, page_faults) = {
            let cpu = lock(&self.shared.cpu);
            (cpu.instructions_retired, cpu.mmu.page_faults)
        };
        let ticks = lock(&self.shared.timeline).clock();
        SimStats {
            ticks,
            instructions_retired,
            page_faults,
            ..*lock(&self.shared.stats)
        }
    }

    /// Hands an exception to the kernel trap handler.
    ///
    /// Commits any delayed load, records the faulting address, then calls the
    /// handler with the machine in system mode and returns to user mode.
    ///
    /// # Panics
    ///
    /// Panics if no trap handler is installed.
    pub fn raise_exception(&self, fault: Fault) {
        debug!(target: TARGET, "exception: {fault}");
        lock(&self.shared.cpu).enter_exception(fault);
        lock(&self.shared.stats).exceptions_raised += 1;

        self.set_status(MachineStatus::System);
        let handler = lock(&self.shared.trap_handler).clone();
        match handler {
            Some(handler) => handler(self, fault.kind),
            None => panic!("unexpected user mode exception: {fault}"),
        }
        self.set_status(MachineStatus::User);
    }

    /// Executes one user instruction, then advances time by one tick.
    pub fn step(&self) {
        let fault = lock(&self.shared.cpu).one_instruction().err();
        if let Some(fault) = fault {
            self.raise_exception(fault);
        }
        self.tick();
    }

    /// Runs user code in the current address space forever.
    ///
    /// Returns only by way of the trap handler halting the machine or
    /// finishing the thread.
    pub fn run_user(&self) -> ! {
        self.set_status(MachineStatus::User);
        loop {
            self.step();
        }
    }

    /// Turns the current thread into a user process running `space`.
    ///
    /// Resets the registers for the program's entry point, installs the
    /// space's page table and starts executing.
    pub fn exec(&self, space: Box<dyn AddressSpace>) -> ! {
        let thread = self.current_thread();
        {
            let mut cpu = lock(&self.shared.cpu);
            space.init_registers(&mut cpu);
            thread.install_space(space, &mut cpu);
        }
        info!(target: TARGET, "thread {} entering user mode", thread.name());
        drop(thread);
        self.run_user()
    }

    /// Prints the CPU, page table, timeline and ready queue.
    pub fn dump_state(&self) {
        lock(&self.shared.cpu).dump_state();
        lock(&self.shared.timeline).dump();
        let scheduler = lock(&self.shared.scheduler);
        scheduler.print_ready();
    }

    /// Stops the machine: prints the final counters and ends the run.
    ///
    /// [`Simulator::run`] returns the same counters; the calling context never
    /// resumes.
    pub fn halt(&self) -> ! {
        println!("Machine halting!\n");
        let stats = self.stats();
        stats.print();
        info!(target: TARGET, "halted at tick {}", stats.ticks.total);
        self.shared.baton.halt(stats)
    }

    /// Boots the machine with `main` as its first thread and waits for it to halt.
    ///
    /// Starts the timer device if enabled, forks `main` and hands it the CPU.
    ///
    /// # Returns
    ///
    /// The final counters once the machine halts.
    ///
    /// # Errors
    ///
    /// * [`SimError::Spawn`] if the host cannot create the main thread.
    /// * [`SimError::ContextPanicked`] if any simulated thread panics.
    pub fn run<F>(&self, main: F) -> Result<SimStats, SimError>
    where
        F: FnOnce(&Self) + Send + 'static,
    {
        if self.shared.config.timer.enabled {
            let _ = Timer::start(self, self.shared.config.timer);
        }

        let thread = self.fork("main", main)?;
        {
            let mut scheduler = lock(&self.shared.scheduler);
            let first = scheduler.pop_ready();
            debug_assert!(first.is_some_and(|t| Arc::ptr_eq(&t, &thread)));
            thread.set_status(ThreadStatus::Running);
            scheduler.set_current(Arc::clone(&thread));
        }
        info!(target: TARGET, "booting with thread {}", thread.name());
        self.shared.baton.start(thread.pid());

        match self.shared.baton.wait_outcome() {
            Outcome::Halted(stats) => Ok(stats),
            Outcome::Panicked(name) => Err(SimError::ContextPanicked { name }),
        }
    }
}

//! Demonstration kernel trap handler.
//!
//! Implements the classic instructional syscalls so simple user programs can
//! run end to end. The syscall number is in `r2` and the first argument in
//! `r4`; results go back in `r2`.

use std::io::Write;

use tracing::{debug, warn};

use mipsim_core::Simulator;
use mipsim_core::common::Exception;
use mipsim_core::common::constants::{ARG0_REG, NO_PARENT, SYSCALL_NUM_REG};

/// Tracing target shared with address-space events.
const TARGET: &str = "mipsim::addrspace";

/// Syscalls understood by the demo kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Syscall {
    Halt,
    Exit,
    Yield,
    PrintInt,
    PrintChar,
    PrintString,
    GetPid,
    GetPpid,
    Time,
    PrintIntHex,
}

impl Syscall {
    const fn from_number(n: u32) -> Option<Self> {
        Some(match n {
            0 => Self::Halt,
            1 => Self::Exit,
            10 => Self::Yield,
            11 => Self::PrintInt,
            12 => Self::PrintChar,
            13 => Self::PrintString,
            16 => Self::GetPid,
            17 => Self::GetPpid,
            19 => Self::Time,
            20 => Self::PrintIntHex,
            _ => return None,
        })
    }
}

/// Writes `text` to the simulated console.
fn console_write(sim: &Simulator, text: &str) {
    let mut out = std::io::stdout().lock();
    let _ = out.write_all(text.as_bytes());
    let _ = out.flush();
    sim.record(|s| s.console_chars_written += text.len() as u64);
}

/// Reads a NUL-terminated string from user memory.
///
/// Stops early if a byte cannot be read; the exception has been raised by then.
fn read_user_string(sim: &Simulator, mut vaddr: u32) -> String {
    let mut bytes = Vec::new();
    while let Some(b) = sim.read_mem(vaddr, 1) {
        if b == 0 {
            break;
        }
        bytes.push(b as u8);
        vaddr = vaddr.wrapping_add(1);
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Handles an exception raised by user code.
///
/// Unknown syscalls and every non-syscall exception stop the machine.
pub fn handle(sim: &Simulator, which: Exception) {
    let number = sim.read_register(SYSCALL_NUM_REG);
    let arg = sim.read_register(ARG0_REG);

    let call = match (which, Syscall::from_number(number)) {
        (Exception::Syscall, Some(call)) => call,
        _ => {
            println!("Unexpected user mode exception {which} {number}");
            sim.dump_state();
            sim.halt();
        }
    };
    debug!(target: TARGET, "syscall {call:?} (arg {arg:#x})");

    match call {
        Syscall::Halt => {
            debug!(target: TARGET, "shutdown, initiated by user program");
            sim.halt();
        }
        Syscall::Exit => {
            let thread = sim.current_thread();
            debug!(target: TARGET, "thread {} exits with status {}", thread.name(), arg as i32);
            drop(thread);
            sim.finish();
        }
        Syscall::Yield => {
            sim.advance_pc();
            sim.yield_cpu();
            return;
        }
        Syscall::PrintInt => console_write(sim, &(arg as i32).to_string()),
        Syscall::PrintChar => console_write(sim, &char::from(arg as u8).to_string()),
        Syscall::PrintString => {
            let text = read_user_string(sim, arg);
            console_write(sim, &text);
        }
        Syscall::PrintIntHex => console_write(sim, &format!("{arg:#x}")),
        Syscall::GetPid => {
            let pid = sim.current_thread().pid();
            sim.write_register(SYSCALL_NUM_REG, pid);
        }
        Syscall::GetPpid => {
            let ppid = sim.current_thread().ppid().map_or(NO_PARENT, |p| p as i32);
            sim.write_register(SYSCALL_NUM_REG, ppid as u32);
        }
        Syscall::Time => {
            let total = sim.stats().ticks.total;
            if total > u64::from(u32::MAX) {
                warn!(target: TARGET, "tick count {total} truncated to 32 bits");
            }
            sim.write_register(SYSCALL_NUM_REG, total as u32);
        }
    }
    sim.advance_pc();
}

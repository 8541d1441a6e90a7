//! Trap Path Tests.
//!
//! Runs tiny hand-assembled NOFF programs in a user process and checks what
//! the installed trap handler observes.

use mipsim_core::Simulator;
use mipsim_core::common::Exception;
use mipsim_core::common::constants::{ARG0_REG, BAD_VADDR_REG, SYSCALL_NUM_REG};
use mipsim_core::core::arch::mode::MachineStatus;
use mipsim_core::sim::ProcessAddressSpace;
use mipsim_core::sim::loader::image_from_words;
use mipsim_core::stats::SimStats;
use pretty_assertions::assert_eq;

use crate::common::asm::*;
use crate::common::harness::{Log, init_tracing, quiet_config};

const PRINT: i32 = 11;
const HALT: i32 = 0;

fn run_program<H>(words: &[u32], handler: H) -> SimStats
where
    H: Fn(&Simulator, Exception) + Send + Sync + 'static,
{
    init_tracing();
    let image = image_from_words(words);
    Simulator::new(quiet_config())
        .with_trap_handler(handler)
        .run(move |sim| {
            let space = ProcessAddressSpace::from_image(sim, &image).unwrap();
            sim.exec(Box::new(space));
        })
        .unwrap()
}

#[test]
fn syscall_arguments_reach_the_handler() {
    let printed = Log::new();
    let log = printed.clone();
    let stats = run_program(
        &[
            addiu(4, 0, 42),
            addiu(2, 0, PRINT),
            syscall(),
            addiu(2, 0, HALT),
            syscall(),
        ],
        move |sim, which| {
            assert_eq!(which, Exception::Syscall);
            assert_eq!(sim.status(), MachineStatus::System);
            match sim.read_register(SYSCALL_NUM_REG) as i32 {
                PRINT => {
                    log.push(sim.read_register(ARG0_REG));
                    sim.advance_pc();
                }
                _ => sim.halt(),
            }
        },
    );

    assert_eq!(printed.snapshot(), vec![42]);
    assert_eq!(stats.instructions_retired, 3);
    assert_eq!(stats.exceptions_raised, 2);
    // Boot's interrupt enable, then one user tick per step before the halt.
    assert_eq!(stats.ticks.system, 10);
    assert_eq!(stats.ticks.user, 4);
}

#[test]
fn bad_address_is_recorded_for_the_handler() {
    let seen = Log::new();
    let log = seen.clone();
    let _ = run_program(
        &[lui(4, 0x1000), nop(), lw(8, 0, 4), nop()],
        move |sim, which| {
            log.push((which, sim.read_register(BAD_VADDR_REG)));
            sim.halt()
        },
    );
    assert_eq!(seen.snapshot(), vec![(Exception::AddressError, 0x1000_0000)]);
}

#[test]
fn overflow_traps_into_the_handler() {
    let seen = Log::new();
    let log = seen.clone();
    let _ = run_program(
        &[lui(4, 0x7fff), ori(4, 4, 0xffff), addi(5, 4, 1)],
        move |sim, which| {
            log.push((which, sim.read_register(5)));
            sim.halt()
        },
    );
    assert_eq!(seen.snapshot(), vec![(Exception::Overflow, 0)]);
}

#[test]
fn handler_sees_committed_delayed_load() {
    // The syscall sits in the load's delay slot; entering the handler must
    // commit the load so the kernel reads the new value.
    let seen = Log::new();
    let log = seen.clone();
    let _ = run_program(
        &[
            addiu(9, 0, 7),
            sw(9, 0x100, 0),
            lw(4, 0x100, 0),
            syscall(),
        ],
        move |sim, _| {
            log.push(sim.read_register(ARG0_REG));
            sim.halt()
        },
    );
    assert_eq!(seen.snapshot(), vec![7]);
}

#[test]
fn user_memory_helpers_raise_on_bad_addresses() {
    let seen = Log::new();
    let log = seen.clone();
    let _ = run_program(&[addiu(2, 0, PRINT), syscall()], move |sim, which| {
        if which == Exception::Syscall {
            let word = sim.read_mem(0, 4);
            let bad = sim.read_mem(0x0100_0000, 4);
            log.push(format!("{word:?} {bad:?}"));
            sim.halt()
        }
        log.push(format!("{which}"));
    });
    let expected = format!("{:?} None", Some(addiu(2, 0, PRINT)));
    assert_eq!(
        seen.snapshot(),
        vec![Exception::AddressError.to_string(), expected]
    );
}

//! Kernel thread demonstrations.
//!
//! The classic thread test: several threads loop, printing and yielding, so the
//! round-robin order is visible. It is followed by a ping-pong over a pair of
//! semaphores.

use std::sync::Arc;

use tracing::error;

use mipsim_core::Simulator;
use mipsim_core::threads::Semaphore;

/// Forks `threads` workers that each print and yield `iterations` times.
pub fn yield_test(sim: &Simulator, threads: u32, iterations: u32) {
    for t in 0..threads {
        let name = format!("forked thread {t}");
        let spawned = sim.fork(&name, move |sim| {
            for num in 0..iterations {
                let me = sim.current_thread();
                println!("*** thread {} (pid {}) looped {num} times", me.name(), me.pid());
                drop(me);
                sim.yield_cpu();
            }
        });
        if let Err(e) = spawned {
            error!("{e}");
        }
    }
}

/// Bounces control between two threads `rounds` times using two semaphores.
pub fn ping_pong(sim: &Simulator, rounds: u32) {
    let ping = Arc::new(Semaphore::new(sim, "ping", 0));
    let pong = Arc::new(Semaphore::new(sim, "pong", 0));

    let (ping2, pong2) = (Arc::clone(&ping), Arc::clone(&pong));
    let spawned = sim.fork("pong", move |_| {
        for _ in 0..rounds {
            ping2.p();
            println!("*** pong");
            pong2.v();
        }
    });
    if let Err(e) = spawned {
        error!("{e}");
        return;
    }

    for _ in 0..rounds {
        println!("*** ping");
        ping.v();
        pong.p();
    }
}


/// Event ordering, ticking and handler context.
pub mod timeline;

/// User programs trapping into the kernel.
pub mod trap;

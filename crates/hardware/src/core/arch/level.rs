//! Interrupt enable level.

/// Whether hardware interrupts are currently deliverable.
///
/// Kernel code masks interrupts by setting the level to `Off` and must restore
/// the level it observed, never force it `On`, so that masking nests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IntStatus {
    /// Interrupts are masked.
    #[default]
    Off,
    /// Interrupts are enabled.
    On,
}

impl std::fmt::Display for IntStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::On => "on",
        })
    }
}

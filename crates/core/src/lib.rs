//! Core emulator primitives and traits.
//!
//! The main component is [`cpu_6502::Cpu6502`], a table-driven MOS 6502
//! core that any system can drive by implementing
//! [`cpu_6502::Memory6502`].

pub mod config;
pub mod cpu_6502;
pub mod logging;

/// A CPU-like component that can be stepped; returns cycles consumed.
pub trait Cpu {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reset to initial power-on state
    fn reset(&mut self);

    /// Execute one instruction (or interrupt sequence) and return the
    /// cycles it took.
    fn step(&mut self) -> Result<u32, Self::Error>;
}

//! Instruction-level tests for the 6502 core
//!
//! Tests are organized by instruction group:
//! - `tests_alu`: loads, stores, arithmetic, logic, compares, shifts
//! - `tests_branches`: conditional branches and their timing
//! - `tests_control`: jumps, subroutines, stack, reset, stalls
//! - `tests_interrupts`: NMI/IRQ servicing, BRK and RTI
//! - `tests_unofficial`: undocumented opcodes and illegal opcode handling
//! - `tests_addressing`: every addressing mode through real instructions

use super::{ArrayMemory, Cpu6502};

mod tests_addressing;

/// CPU with `program` loaded at $8000 and the reset vector pointing at it.
fn cpu_with(program: &[u8]) -> Cpu6502<ArrayMemory> {
    cpu_at(0x8000, program)
}

fn cpu_at(origin: u16, program: &[u8]) -> Cpu6502<ArrayMemory> {
    let mut mem = ArrayMemory::new();
    mem.load_program(origin, program);
    Cpu6502::new(mem)
}

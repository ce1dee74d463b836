//! Addressing modes and the operand resolver.
//!
//! The resolver reads the operand bytes that follow the opcode (without
//! moving PC; the step loop does that once the handler has run) and turns
//! them into an [`Operand`]. Indexed modes also report whether indexing
//! carried into the high byte, which costs a cycle on some opcodes.

use serde::{Deserialize, Serialize};

use super::memory::Memory6502;
use super::Cpu6502;

/// Encoding of an instruction's operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Relative,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// `JMP ($nnnn)` only
    Indirect,
    /// `($nn,X)`
    IndirectX,
    /// `($nn),Y`
    IndirectY,
}

impl AddressingMode {
    /// Number of operand bytes after the opcode.
    pub const fn operand_size(self) -> u8 {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 0,
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::ZeroPageY
            | AddressingMode::Relative
            | AddressingMode::IndirectX
            | AddressingMode::IndirectY => 1,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
        }
    }

    /// Encoded instruction size, opcode included.
    pub const fn instruction_size(self) -> u8 {
        self.operand_size() + 1
    }
}

/// Index register applied by an indexed mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexRegister {
    X,
    Y,
}

/// A resolved operand, produced fresh for every instruction.
///
/// Addresses are effective addresses: indexing, zero-page wrap and pointer
/// reads have already been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Implied,
    Accumulator,
    Immediate(u8),
    Absolute(u16, Option<IndexRegister>),
    ZeroPage(u8, Option<IndexRegister>),
    /// Jump target read through the pointer of `JMP ($nnnn)`.
    Indirect(u16),
    /// Data address reached through a zero-page pointer, `($nn,X)` or `($nn),Y`.
    IndirectResolved(u16),
    /// Branch target.
    Relative(u16),
}

impl Operand {
    /// Short name of the operand kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Operand::Implied => "implied",
            Operand::Accumulator => "accumulator",
            Operand::Immediate(_) => "immediate",
            Operand::Absolute(..) => "absolute",
            Operand::ZeroPage(..) => "zero page",
            Operand::Indirect(_) => "indirect",
            Operand::IndirectResolved(_) => "indirect resolved",
            Operand::Relative(_) => "relative",
        }
    }

    /// Effective memory address, for operands that name one.
    pub fn address(&self) -> Option<u16> {
        match *self {
            Operand::Absolute(addr, _) | Operand::IndirectResolved(addr) => Some(addr),
            Operand::ZeroPage(addr, _) => Some(addr as u16),
            _ => None,
        }
    }
}

#[inline]
fn page_crossed(base: u16, effective: u16) -> bool {
    (base & 0xFF00) != (effective & 0xFF00)
}

impl<M: Memory6502> Cpu6502<M> {
    /// Resolve the operand of the instruction at PC.
    ///
    /// Returns the operand and whether indexing crossed a page.
    pub(crate) fn resolve_operand(&self, mode: AddressingMode) -> (Operand, bool) {
        let arg = self.pc.wrapping_add(1);
        match mode {
            AddressingMode::Implied => (Operand::Implied, false),
            AddressingMode::Accumulator => (Operand::Accumulator, false),
            AddressingMode::Immediate => (Operand::Immediate(self.read(arg)), false),
            AddressingMode::ZeroPage => (Operand::ZeroPage(self.read(arg), None), false),
            AddressingMode::ZeroPageX => {
                let zp = self.read(arg).wrapping_add(self.x);
                (Operand::ZeroPage(zp, Some(IndexRegister::X)), false)
            }
            AddressingMode::ZeroPageY => {
                let zp = self.read(arg).wrapping_add(self.y);
                (Operand::ZeroPage(zp, Some(IndexRegister::Y)), false)
            }
            AddressingMode::Relative => {
                let offset = self.read(arg) as i8;
                let next = self.pc.wrapping_add(2);
                (Operand::Relative(next.wrapping_add_signed(offset as i16)), false)
            }
            AddressingMode::Absolute => (Operand::Absolute(self.read_u16(arg), None), false),
            AddressingMode::AbsoluteX => {
                let base = self.read_u16(arg);
                let addr = base.wrapping_add(self.x as u16);
                (
                    Operand::Absolute(addr, Some(IndexRegister::X)),
                    page_crossed(base, addr),
                )
            }
            AddressingMode::AbsoluteY => {
                let base = self.read_u16(arg);
                let addr = base.wrapping_add(self.y as u16);
                (
                    Operand::Absolute(addr, Some(IndexRegister::Y)),
                    page_crossed(base, addr),
                )
            }
            AddressingMode::Indirect => {
                let ptr = self.read_u16(arg);
                (Operand::Indirect(self.memory.read_word_bug(ptr)), false)
            }
            AddressingMode::IndirectX => {
                let zp = self.read(arg).wrapping_add(self.x);
                let addr = self.memory.read_word_bug(zp as u16);
                (Operand::IndirectResolved(addr), false)
            }
            AddressingMode::IndirectY => {
                let zp = self.read(arg);
                let base = self.memory.read_word_bug(zp as u16);
                let addr = base.wrapping_add(self.y as u16);
                (Operand::IndirectResolved(addr), page_crossed(base, addr))
            }
        }
    }
}

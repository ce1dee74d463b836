//! Hardware stack on page one ($0100-$01FF).
//!
//! SP wraps silently in both directions, exactly like the real part: a
//! program that over-pushes just overwrites the top of the page.

use super::memory::Memory6502;
use super::Cpu6502;

pub const STACK_BASE: u16 = 0x0100;

impl<M: Memory6502> Cpu6502<M> {
    #[inline]
    pub(crate) fn push_u8(&mut self, v: u8) {
        let addr = STACK_BASE | self.sp as u16;
        self.write(addr, v);
        self.sp = self.sp.wrapping_sub(1);
    }

    #[inline]
    pub(crate) fn pop_u8(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        let addr = STACK_BASE | self.sp as u16;
        self.read(addr)
    }

    /// High byte first, so the word sits little-endian in memory.
    #[inline]
    pub(crate) fn push_u16(&mut self, v: u16) {
        self.push_u8((v >> 8) as u8);
        self.push_u8((v & 0xFF) as u8);
    }

    #[inline]
    pub(crate) fn pop_u16(&mut self) -> u16 {
        let lo = self.pop_u8() as u16;
        let hi = self.pop_u8() as u16;
        (hi << 8) | lo
    }
}

#[cfg(test)]
mod tests {
    use crate::cpu_6502::{ArrayMemory, Cpu6502, Memory6502};

    fn cpu() -> Cpu6502<ArrayMemory> {
        Cpu6502::new(ArrayMemory::new())
    }

    #[test]
    fn push_pop_word_round_trip() {
        let mut cpu = cpu();
        cpu.push_u16(0x1234);
        assert_eq!(cpu.sp, 0xFB);
        assert_eq!(cpu.memory.read(0x01FD), 0x12);
        assert_eq!(cpu.memory.read(0x01FC), 0x34);
        assert_eq!(cpu.pop_u16(), 0x1234);
        assert_eq!(cpu.sp, 0xFD);
    }

    #[test]
    fn push_writes_then_decrements() {
        let mut cpu = cpu();
        cpu.sp = 0x80;
        cpu.push_u8(0xAA);
        assert_eq!(cpu.memory.read(0x0180), 0xAA);
        assert_eq!(cpu.sp, 0x7F);
        assert_eq!(cpu.pop_u8(), 0xAA);
        assert_eq!(cpu.sp, 0x80);
    }

    #[test]
    fn sp_wraps_after_256_pushes() {
        let mut cpu = cpu();
        let start = cpu.sp;
        for i in 0..256u16 {
            cpu.push_u8(i as u8);
        }
        assert_eq!(cpu.sp, start);
    }

    #[test]
    fn underflow_wraps_to_bottom_of_page() {
        let mut cpu = cpu();
        cpu.sp = 0xFF;
        cpu.memory.write(0x0100, 0x5A);
        assert_eq!(cpu.pop_u8(), 0x5A);
        assert_eq!(cpu.sp, 0x00);
    }

    #[test]
    fn overflow_wraps_to_top_of_page() {
        let mut cpu = cpu();
        cpu.sp = 0x00;
        cpu.push_u8(0x11);
        cpu.push_u8(0x22);
        assert_eq!(cpu.memory.read(0x0100), 0x11);
        assert_eq!(cpu.memory.read(0x01FF), 0x22);
        assert_eq!(cpu.sp, 0xFE);
    }

    #[test]
    fn word_split_across_wrap() {
        let mut cpu = cpu();
        cpu.sp = 0x00;
        cpu.push_u16(0xBEEF);
        assert_eq!(cpu.memory.read(0x0100), 0xBE);
        assert_eq!(cpu.memory.read(0x01FF), 0xEF);
        assert_eq!(cpu.pop_u16(), 0xBEEF);
        assert_eq!(cpu.sp, 0x00);
    }
}

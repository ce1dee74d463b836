//! Instruction descriptors, one per mnemonic.
//!
//! A descriptor lists every addressing mode the instruction is encoded with
//! and the opcode byte for each. Aliased encodings (the unofficial NOPs, ANC)
//! appear once per opcode. The opcode table is checked against these lists,
//! and assembler/disassembler front ends can use them directly.

use serde::{Deserialize, Serialize};

use super::addressing::AddressingMode;
use AddressingMode::*;

/// Instruction identity. Dispatch in the step loop matches on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mnemonic {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    // Undocumented
    Alr,
    Anc,
    Arr,
    Axs,
    Dcp,
    Isc,
    Lax,
    Rla,
    Rra,
    Sax,
    Slo,
    Sre,
}

/// One encoding of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressingInfo {
    pub mode: AddressingMode,
    pub opcode: u8,
}

/// Static description of an instruction.
#[derive(Debug)]
pub struct Instruction {
    /// Upper-case assembler name
    pub name: &'static str,
    pub mnemonic: Mnemonic,
    /// Undocumented encoding
    pub unofficial: bool,
    pub addressing: &'static [AddressingInfo],
}

impl Instruction {
    /// Whether the instruction can be encoded with `mode`.
    pub fn supports(&self, mode: AddressingMode) -> bool {
        self.addressing.iter().any(|info| info.mode == mode)
    }

    /// Canonical opcode for `mode` (the first listed when aliases exist).
    pub fn opcode_for(&self, mode: AddressingMode) -> Option<u8> {
        self.addressing
            .iter()
            .find(|info| info.mode == mode)
            .map(|info| info.opcode)
    }

    /// Whether `opcode` is one of this instruction's encodings for `mode`.
    pub fn encodes(&self, mode: AddressingMode, opcode: u8) -> bool {
        self.addressing
            .iter()
            .any(|info| info.mode == mode && info.opcode == opcode)
    }
}

const fn at(mode: AddressingMode, opcode: u8) -> AddressingInfo {
    AddressingInfo { mode, opcode }
}

macro_rules! instruction {
    ($ident:ident, $name:literal, $mnemonic:ident, $unofficial:literal, [$(($mode:ident, $opcode:literal)),+ $(,)?]) => {
        pub static $ident: Instruction = Instruction {
            name: $name,
            mnemonic: Mnemonic::$mnemonic,
            unofficial: $unofficial,
            addressing: &[$(at($mode, $opcode)),+],
        };
    };
}

instruction!(ADC, "ADC", Adc, false, [
    (Immediate, 0x69), (ZeroPage, 0x65), (ZeroPageX, 0x75), (Absolute, 0x6D),
    (AbsoluteX, 0x7D), (AbsoluteY, 0x79), (IndirectX, 0x61), (IndirectY, 0x71),
]);
instruction!(AND, "AND", And, false, [
    (Immediate, 0x29), (ZeroPage, 0x25), (ZeroPageX, 0x35), (Absolute, 0x2D),
    (AbsoluteX, 0x3D), (AbsoluteY, 0x39), (IndirectX, 0x21), (IndirectY, 0x31),
]);
instruction!(ASL, "ASL", Asl, false, [
    (Accumulator, 0x0A), (ZeroPage, 0x06), (ZeroPageX, 0x16), (Absolute, 0x0E),
    (AbsoluteX, 0x1E),
]);
instruction!(BCC, "BCC", Bcc, false, [(Relative, 0x90)]);
instruction!(BCS, "BCS", Bcs, false, [(Relative, 0xB0)]);
instruction!(BEQ, "BEQ", Beq, false, [(Relative, 0xF0)]);
instruction!(BIT, "BIT", Bit, false, [(ZeroPage, 0x24), (Absolute, 0x2C)]);
instruction!(BMI, "BMI", Bmi, false, [(Relative, 0x30)]);
instruction!(BNE, "BNE", Bne, false, [(Relative, 0xD0)]);
instruction!(BPL, "BPL", Bpl, false, [(Relative, 0x10)]);
instruction!(BRK, "BRK", Brk, false, [(Implied, 0x00)]);
instruction!(BVC, "BVC", Bvc, false, [(Relative, 0x50)]);
instruction!(BVS, "BVS", Bvs, false, [(Relative, 0x70)]);
instruction!(CLC, "CLC", Clc, false, [(Implied, 0x18)]);
instruction!(CLD, "CLD", Cld, false, [(Implied, 0xD8)]);
instruction!(CLI, "CLI", Cli, false, [(Implied, 0x58)]);
instruction!(CLV, "CLV", Clv, false, [(Implied, 0xB8)]);
instruction!(CMP, "CMP", Cmp, false, [
    (Immediate, 0xC9), (ZeroPage, 0xC5), (ZeroPageX, 0xD5), (Absolute, 0xCD),
    (AbsoluteX, 0xDD), (AbsoluteY, 0xD9), (IndirectX, 0xC1), (IndirectY, 0xD1),
]);
instruction!(CPX, "CPX", Cpx, false, [(Immediate, 0xE0), (ZeroPage, 0xE4), (Absolute, 0xEC)]);
instruction!(CPY, "CPY", Cpy, false, [(Immediate, 0xC0), (ZeroPage, 0xC4), (Absolute, 0xCC)]);
instruction!(DEC, "DEC", Dec, false, [
    (ZeroPage, 0xC6), (ZeroPageX, 0xD6), (Absolute, 0xCE), (AbsoluteX, 0xDE),
]);
instruction!(DEX, "DEX", Dex, false, [(Implied, 0xCA)]);
instruction!(DEY, "DEY", Dey, false, [(Implied, 0x88)]);
instruction!(EOR, "EOR", Eor, false, [
    (Immediate, 0x49), (ZeroPage, 0x45), (ZeroPageX, 0x55), (Absolute, 0x4D),
    (AbsoluteX, 0x5D), (AbsoluteY, 0x59), (IndirectX, 0x41), (IndirectY, 0x51),
]);
instruction!(INC, "INC", Inc, false, [
    (ZeroPage, 0xE6), (ZeroPageX, 0xF6), (Absolute, 0xEE), (AbsoluteX, 0xFE),
]);
instruction!(INX, "INX", Inx, false, [(Implied, 0xE8)]);
instruction!(INY, "INY", Iny, false, [(Implied, 0xC8)]);
instruction!(JMP, "JMP", Jmp, false, [(Absolute, 0x4C), (Indirect, 0x6C)]);
instruction!(JSR, "JSR", Jsr, false, [(Absolute, 0x20)]);
instruction!(LDA, "LDA", Lda, false, [
    (Immediate, 0xA9), (ZeroPage, 0xA5), (ZeroPageX, 0xB5), (Absolute, 0xAD),
    (AbsoluteX, 0xBD), (AbsoluteY, 0xB9), (IndirectX, 0xA1), (IndirectY, 0xB1),
]);
instruction!(LDX, "LDX", Ldx, false, [
    (Immediate, 0xA2), (ZeroPage, 0xA6), (ZeroPageY, 0xB6), (Absolute, 0xAE),
    (AbsoluteY, 0xBE),
]);
instruction!(LDY, "LDY", Ldy, false, [
    (Immediate, 0xA0), (ZeroPage, 0xA4), (ZeroPageX, 0xB4), (Absolute, 0xAC),
    (AbsoluteX, 0xBC),
]);
instruction!(LSR, "LSR", Lsr, false, [
    (Accumulator, 0x4A), (ZeroPage, 0x46), (ZeroPageX, 0x56), (Absolute, 0x4E),
    (AbsoluteX, 0x5E),
]);
instruction!(NOP, "NOP", Nop, false, [(Implied, 0xEA)]);
instruction!(ORA, "ORA", Ora, false, [
    (Immediate, 0x09), (ZeroPage, 0x05), (ZeroPageX, 0x15), (Absolute, 0x0D),
    (AbsoluteX, 0x1D), (AbsoluteY, 0x19), (IndirectX, 0x01), (IndirectY, 0x11),
]);
instruction!(PHA, "PHA", Pha, false, [(Implied, 0x48)]);
instruction!(PHP, "PHP", Php, false, [(Implied, 0x08)]);
instruction!(PLA, "PLA", Pla, false, [(Implied, 0x68)]);
instruction!(PLP, "PLP", Plp, false, [(Implied, 0x28)]);
instruction!(ROL, "ROL", Rol, false, [
    (Accumulator, 0x2A), (ZeroPage, 0x26), (ZeroPageX, 0x36), (Absolute, 0x2E),
    (AbsoluteX, 0x3E),
]);
instruction!(ROR, "ROR", Ror, false, [
    (Accumulator, 0x6A), (ZeroPage, 0x66), (ZeroPageX, 0x76), (Absolute, 0x6E),
    (AbsoluteX, 0x7E),
]);
instruction!(RTI, "RTI", Rti, false, [(Implied, 0x40)]);
instruction!(RTS, "RTS", Rts, false, [(Implied, 0x60)]);
instruction!(SBC, "SBC", Sbc, false, [
    (Immediate, 0xE9), (ZeroPage, 0xE5), (ZeroPageX, 0xF5), (Absolute, 0xED),
    (AbsoluteX, 0xFD), (AbsoluteY, 0xF9), (IndirectX, 0xE1), (IndirectY, 0xF1),
]);
instruction!(SEC, "SEC", Sec, false, [(Implied, 0x38)]);
instruction!(SED, "SED", Sed, false, [(Implied, 0xF8)]);
instruction!(SEI, "SEI", Sei, false, [(Implied, 0x78)]);
instruction!(STA, "STA", Sta, false, [
    (ZeroPage, 0x85), (ZeroPageX, 0x95), (Absolute, 0x8D), (AbsoluteX, 0x9D),
    (AbsoluteY, 0x99), (IndirectX, 0x81), (IndirectY, 0x91),
]);
instruction!(STX, "STX", Stx, false, [(ZeroPage, 0x86), (ZeroPageY, 0x96), (Absolute, 0x8E)]);
instruction!(STY, "STY", Sty, false, [(ZeroPage, 0x84), (ZeroPageX, 0x94), (Absolute, 0x8C)]);
instruction!(TAX, "TAX", Tax, false, [(Implied, 0xAA)]);
instruction!(TAY, "TAY", Tay, false, [(Implied, 0xA8)]);
instruction!(TSX, "TSX", Tsx, false, [(Implied, 0xBA)]);
instruction!(TXA, "TXA", Txa, false, [(Implied, 0x8A)]);
instruction!(TXS, "TXS", Txs, false, [(Implied, 0x9A)]);
instruction!(TYA, "TYA", Tya, false, [(Implied, 0x98)]);

// Undocumented encodings

instruction!(ALR, "ALR", Alr, true, [(Immediate, 0x4B)]);
instruction!(ANC, "ANC", Anc, true, [(Immediate, 0x0B), (Immediate, 0x2B)]);
instruction!(ARR, "ARR", Arr, true, [(Immediate, 0x6B)]);
instruction!(AXS, "AXS", Axs, true, [(Immediate, 0xCB)]);
instruction!(DCP, "DCP", Dcp, true, [
    (ZeroPage, 0xC7), (ZeroPageX, 0xD7), (Absolute, 0xCF), (AbsoluteX, 0xDF),
    (AbsoluteY, 0xDB), (IndirectX, 0xC3), (IndirectY, 0xD3),
]);
instruction!(ISC, "ISC", Isc, true, [
    (ZeroPage, 0xE7), (ZeroPageX, 0xF7), (Absolute, 0xEF), (AbsoluteX, 0xFF),
    (AbsoluteY, 0xFB), (IndirectX, 0xE3), (IndirectY, 0xF3),
]);
instruction!(LAX, "LAX", Lax, true, [
    (ZeroPage, 0xA7), (ZeroPageY, 0xB7), (Absolute, 0xAF), (AbsoluteY, 0xBF),
    (IndirectX, 0xA3), (IndirectY, 0xB3),
]);
instruction!(NOP_UNOFFICIAL, "NOP", Nop, true, [
    (Implied, 0x1A), (Implied, 0x3A), (Implied, 0x5A), (Implied, 0x7A),
    (Implied, 0xDA), (Implied, 0xFA),
    (Immediate, 0x80), (Immediate, 0x82), (Immediate, 0x89), (Immediate, 0xC2),
    (Immediate, 0xE2),
    (ZeroPage, 0x04), (ZeroPage, 0x44), (ZeroPage, 0x64),
    (ZeroPageX, 0x14), (ZeroPageX, 0x34), (ZeroPageX, 0x54), (ZeroPageX, 0x74),
    (ZeroPageX, 0xD4), (ZeroPageX, 0xF4),
    (Absolute, 0x0C),
    (AbsoluteX, 0x1C), (AbsoluteX, 0x3C), (AbsoluteX, 0x5C), (AbsoluteX, 0x7C),
    (AbsoluteX, 0xDC), (AbsoluteX, 0xFC),
]);
instruction!(RLA, "RLA", Rla, true, [
    (ZeroPage, 0x27), (ZeroPageX, 0x37), (Absolute, 0x2F), (AbsoluteX, 0x3F),
    (AbsoluteY, 0x3B), (IndirectX, 0x23), (IndirectY, 0x33),
]);
instruction!(RRA, "RRA", Rra, true, [
    (ZeroPage, 0x67), (ZeroPageX, 0x77), (Absolute, 0x6F), (AbsoluteX, 0x7F),
    (AbsoluteY, 0x7B), (IndirectX, 0x63), (IndirectY, 0x73),
]);
instruction!(SAX, "SAX", Sax, true, [
    (ZeroPage, 0x87), (ZeroPageY, 0x97), (Absolute, 0x8F), (IndirectX, 0x83),
]);
instruction!(SBC_UNOFFICIAL, "SBC", Sbc, true, [(Immediate, 0xEB)]);
instruction!(SLO, "SLO", Slo, true, [
    (ZeroPage, 0x07), (ZeroPageX, 0x17), (Absolute, 0x0F), (AbsoluteX, 0x1F),
    (AbsoluteY, 0x1B), (IndirectX, 0x03), (IndirectY, 0x13),
]);
instruction!(SRE, "SRE", Sre, true, [
    (ZeroPage, 0x47), (ZeroPageX, 0x57), (Absolute, 0x4F), (AbsoluteX, 0x5F),
    (AbsoluteY, 0x5B), (IndirectX, 0x43), (IndirectY, 0x53),
]);

/// Every descriptor, documented first.
pub static INSTRUCTIONS: [&Instruction; 70] = [
    &ADC, &AND, &ASL, &BCC, &BCS, &BEQ, &BIT, &BMI, &BNE, &BPL, &BRK, &BVC, &BVS, &CLC,
    &CLD, &CLI, &CLV, &CMP, &CPX, &CPY, &DEC, &DEX, &DEY, &EOR, &INC, &INX, &INY, &JMP,
    &JSR, &LDA, &LDX, &LDY, &LSR, &NOP, &ORA, &PHA, &PHP, &PLA, &PLP, &ROL, &ROR, &RTI,
    &RTS, &SBC, &SEC, &SED, &SEI, &STA, &STX, &STY, &TAX, &TAY, &TSX, &TXA, &TXS, &TYA,
    &ALR, &ANC, &ARR, &AXS, &DCP, &ISC, &LAX, &NOP_UNOFFICIAL, &RLA, &RRA, &SAX,
    &SBC_UNOFFICIAL, &SLO, &SRE,
];

/// Look up a descriptor by assembler name. Documented encodings win over
/// undocumented ones that share a name (NOP, SBC).
pub fn by_name(name: &str) -> Option<&'static Instruction> {
    INSTRUCTIONS
        .iter()
        .copied()
        .find(|ins| ins.name.eq_ignore_ascii_case(name))
}

//! Opcode table
//!
//! 256 entries indexed by the opcode byte. `None` marks an illegal opcode
//! (JAM/KIL and the unstable undocumented encodings); decoding one is fatal.
//! Undocumented but stable encodings are ordinary entries whose instruction
//! is flagged `unofficial`.

use std::sync::OnceLock;

use thiserror::Error;

use super::addressing::AddressingMode::{self, *};
use super::instructions::*;

/// Decoding information for one opcode byte.
#[derive(Debug, Clone, Copy)]
pub struct Opcode {
    pub instruction: &'static Instruction,
    pub mode: AddressingMode,
    /// Base cost in cycles
    pub cycles: u8,
    /// One extra cycle when indexing crosses a page
    pub page_cross_cycle: bool,
}

impl Opcode {
    /// Encoded size in bytes, opcode included.
    pub fn size(&self) -> u8 {
        self.mode.instruction_size()
    }

    pub fn is_unofficial(&self) -> bool {
        self.instruction.unofficial
    }

    pub fn name(&self) -> &'static str {
        self.instruction.name
    }
}

const fn op(
    instruction: &'static Instruction,
    mode: AddressingMode,
    cycles: u8,
    page_cross_cycle: bool,
) -> Option<Opcode> {
    Some(Opcode {
        instruction,
        mode,
        cycles,
        page_cross_cycle,
    })
}

/// The decode table. Branch entries carry their not-taken cost; the taken
/// and page-crossing cycles are charged by the branch itself.
pub static OPCODES: [Option<Opcode>; 256] = [
    /* $00 */ op(&BRK, Implied, 7, false),
    /* $01 */ op(&ORA, IndirectX, 6, false),
    /* $02 */ None,
    /* $03 */ op(&SLO, IndirectX, 8, false),
    /* $04 */ op(&NOP_UNOFFICIAL, ZeroPage, 3, false),
    /* $05 */ op(&ORA, ZeroPage, 3, false),
    /* $06 */ op(&ASL, ZeroPage, 5, false),
    /* $07 */ op(&SLO, ZeroPage, 5, false),
    /* $08 */ op(&PHP, Implied, 3, false),
    /* $09 */ op(&ORA, Immediate, 2, false),
    /* $0A */ op(&ASL, Accumulator, 2, false),
    /* $0B */ op(&ANC, Immediate, 2, false),
    /* $0C */ op(&NOP_UNOFFICIAL, Absolute, 4, false),
    /* $0D */ op(&ORA, Absolute, 4, false),
    /* $0E */ op(&ASL, Absolute, 6, false),
    /* $0F */ op(&SLO, Absolute, 6, false),
    /* $10 */ op(&BPL, Relative, 2, false),
    /* $11 */ op(&ORA, IndirectY, 5, true),
    /* $12 */ None,
    /* $13 */ op(&SLO, IndirectY, 8, false),
    /* $14 */ op(&NOP_UNOFFICIAL, ZeroPageX, 4, false),
    /* $15 */ op(&ORA, ZeroPageX, 4, false),
    /* $16 */ op(&ASL, ZeroPageX, 6, false),
    /* $17 */ op(&SLO, ZeroPageX, 6, false),
    /* $18 */ op(&CLC, Implied, 2, false),
    /* $19 */ op(&ORA, AbsoluteY, 4, true),
    /* $1A */ op(&NOP_UNOFFICIAL, Implied, 2, false),
    /* $1B */ op(&SLO, AbsoluteY, 7, false),
    /* $1C */ op(&NOP_UNOFFICIAL, AbsoluteX, 4, true),
    /* $1D */ op(&ORA, AbsoluteX, 4, true),
    /* $1E */ op(&ASL, AbsoluteX, 7, false),
    /* $1F */ op(&SLO, AbsoluteX, 7, false),
    /* $20 */ op(&JSR, Absolute, 6, false),
    /* $21 */ op(&AND, IndirectX, 6, false),
    /* $22 */ None,
    /* $23 */ op(&RLA, IndirectX, 8, false),
    /* $24 */ op(&BIT, ZeroPage, 3, false),
    /* $25 */ op(&AND, ZeroPage, 3, false),
    /* $26 */ op(&ROL, ZeroPage, 5, false),
    /* $27 */ op(&RLA, ZeroPage, 5, false),
    /* $28 */ op(&PLP, Implied, 4, false),
    /* $29 */ op(&AND, Immediate, 2, false),
    /* $2A */ op(&ROL, Accumulator, 2, false),
    /* $2B */ op(&ANC, Immediate, 2, false),
    /* $2C */ op(&BIT, Absolute, 4, false),
    /* $2D */ op(&AND, Absolute, 4, false),
    /* $2E */ op(&ROL, Absolute, 6, false),
    /* $2F */ op(&RLA, Absolute, 6, false),
    /* $30 */ op(&BMI, Relative, 2, false),
    /* $31 */ op(&AND, IndirectY, 5, true),
    /* $32 */ None,
    /* $33 */ op(&RLA, IndirectY, 8, false),
    /* $34 */ op(&NOP_UNOFFICIAL, ZeroPageX, 4, false),
    /* $35 */ op(&AND, ZeroPageX, 4, false),
    /* $36 */ op(&ROL, ZeroPageX, 6, false),
    /* $37 */ op(&RLA, ZeroPageX, 6, false),
    /* $38 */ op(&SEC, Implied, 2, false),
    /* $39 */ op(&AND, AbsoluteY, 4, true),
    /* $3A */ op(&NOP_UNOFFICIAL, Implied, 2, false),
    /* $3B */ op(&RLA, AbsoluteY, 7, false),
    /* $3C */ op(&NOP_UNOFFICIAL, AbsoluteX, 4, true),
    /* $3D */ op(&AND, AbsoluteX, 4, true),
    /* $3E */ op(&ROL, AbsoluteX, 7, false),
    /* $3F */ op(&RLA, AbsoluteX, 7, false),
    /* $40 */ op(&RTI, Implied, 6, false),
    /* $41 */ op(&EOR, IndirectX, 6, false),
    /* $42 */ None,
    /* $43 */ op(&SRE, IndirectX, 8, false),
    /* $44 */ op(&NOP_UNOFFICIAL, ZeroPage, 3, false),
    /* $45 */ op(&EOR, ZeroPage, 3, false),
    /* $46 */ op(&LSR, ZeroPage, 5, false),
    /* $47 */ op(&SRE, ZeroPage, 5, false),
    /* $48 */ op(&PHA, Implied, 3, false),
    /* $49 */ op(&EOR, Immediate, 2, false),
    /* $4A */ op(&LSR, Accumulator, 2, false),
    /* $4B */ op(&ALR, Immediate, 2, false),
    /* $4C */ op(&JMP, Absolute, 3, false),
    /* $4D */ op(&EOR, Absolute, 4, false),
    /* $4E */ op(&LSR, Absolute, 6, false),
    /* $4F */ op(&SRE, Absolute, 6, false),
    /* $50 */ op(&BVC, Relative, 2, false),
    /* $51 */ op(&EOR, IndirectY, 5, true),
    /* $52 */ None,
    /* $53 */ op(&SRE, IndirectY, 8, false),
    /* $54 */ op(&NOP_UNOFFICIAL, ZeroPageX, 4, false),
    /* $55 */ op(&EOR, ZeroPageX, 4, false),
    /* $56 */ op(&LSR, ZeroPageX, 6, false),
    /* $57 */ op(&SRE, ZeroPageX, 6, false),
    /* $58 */ op(&CLI, Implied, 2, false),
    /* $59 */ op(&EOR, AbsoluteY, 4, true),
    /* $5A */ op(&NOP_UNOFFICIAL, Implied, 2, false),
    /* $5B */ op(&SRE, AbsoluteY, 7, false),
    /* $5C */ op(&NOP_UNOFFICIAL, AbsoluteX, 4, true),
    /* $5D */ op(&EOR, AbsoluteX, 4, true),
    /* $5E */ op(&LSR, AbsoluteX, 7, false),
    /* $5F */ op(&SRE, AbsoluteX, 7, false),
    /* $60 */ op(&RTS, Implied, 6, false),
    /* $61 */ op(&ADC, IndirectX, 6, false),
    /* $62 */ None,
    /* $63 */ op(&RRA, IndirectX, 8, false),
    /* $64 */ op(&NOP_UNOFFICIAL, ZeroPage, 3, false),
    /* $65 */ op(&ADC, ZeroPage, 3, false),
    /* $66 */ op(&ROR, ZeroPage, 5, false),
    /* $67 */ op(&RRA, ZeroPage, 5, false),
    /* $68 */ op(&PLA, Implied, 4, false),
    /* $69 */ op(&ADC, Immediate, 2, false),
    /* $6A */ op(&ROR, Accumulator, 2, false),
    /* $6B */ op(&ARR, Immediate, 2, false),
    /* $6C */ op(&JMP, Indirect, 5, false),
    /* $6D */ op(&ADC, Absolute, 4, false),
    /* $6E */ op(&ROR, Absolute, 6, false),
    /* $6F */ op(&RRA, Absolute, 6, false),
    /* $70 */ op(&BVS, Relative, 2, false),
    /* $71 */ op(&ADC, IndirectY, 5, true),
    /* $72 */ None,
    /* $73 */ op(&RRA, IndirectY, 8, false),
    /* $74 */ op(&NOP_UNOFFICIAL, ZeroPageX, 4, false),
    /* $75 */ op(&ADC, ZeroPageX, 4, false),
    /* $76 */ op(&ROR, ZeroPageX, 6, false),
    /* $77 */ op(&RRA, ZeroPageX, 6, false),
    /* $78 */ op(&SEI, Implied, 2, false),
    /* $79 */ op(&ADC, AbsoluteY, 4, true),
    /* $7A */ op(&NOP_UNOFFICIAL, Implied, 2, false),
    /* $7B */ op(&RRA, AbsoluteY, 7, false),
    /* $7C */ op(&NOP_UNOFFICIAL, AbsoluteX, 4, true),
    /* $7D */ op(&ADC, AbsoluteX, 4, true),
    /* $7E */ op(&ROR, AbsoluteX, 7, false),
    /* $7F */ op(&RRA, AbsoluteX, 7, false),
    /* $80 */ op(&NOP_UNOFFICIAL, Immediate, 2, false),
    /* $81 */ op(&STA, IndirectX, 6, false),
    /* $82 */ op(&NOP_UNOFFICIAL, Immediate, 2, false),
    /* $83 */ op(&SAX, IndirectX, 6, false),
    /* $84 */ op(&STY, ZeroPage, 3, false),
    /* $85 */ op(&STA, ZeroPage, 3, false),
    /* $86 */ op(&STX, ZeroPage, 3, false),
    /* $87 */ op(&SAX, ZeroPage, 3, false),
    /* $88 */ op(&DEY, Implied, 2, false),
    /* $89 */ op(&NOP_UNOFFICIAL, Immediate, 2, false),
    /* $8A */ op(&TXA, Implied, 2, false),
    /* $8B */ None,
    /* $8C */ op(&STY, Absolute, 4, false),
    /* $8D */ op(&STA, Absolute, 4, false),
    /* $8E */ op(&STX, Absolute, 4, false),
    /* $8F */ op(&SAX, Absolute, 4, false),
    /* $90 */ op(&BCC, Relative, 2, false),
    /* $91 */ op(&STA, IndirectY, 6, false),
    /* $92 */ None,
    /* $93 */ None,
    /* $94 */ op(&STY, ZeroPageX, 4, false),
    /* $95 */ op(&STA, ZeroPageX, 4, false),
    /* $96 */ op(&STX, ZeroPageY, 4, false),
    /* $97 */ op(&SAX, ZeroPageY, 4, false),
    /* $98 */ op(&TYA, Implied, 2, false),
    /* $99 */ op(&STA, AbsoluteY, 5, false),
    /* $9A */ op(&TXS, Implied, 2, false),
    /* $9B */ None,
    /* $9C */ None,
    /* $9D */ op(&STA, AbsoluteX, 5, false),
    /* $9E */ None,
    /* $9F */ None,
    /* $A0 */ op(&LDY, Immediate, 2, false),
    /* $A1 */ op(&LDA, IndirectX, 6, false),
    /* $A2 */ op(&LDX, Immediate, 2, false),
    /* $A3 */ op(&LAX, IndirectX, 6, false),
    /* $A4 */ op(&LDY, ZeroPage, 3, false),
    /* $A5 */ op(&LDA, ZeroPage, 3, false),
    /* $A6 */ op(&LDX, ZeroPage, 3, false),
    /* $A7 */ op(&LAX, ZeroPage, 3, false),
    /* $A8 */ op(&TAY, Implied, 2, false),
    /* $A9 */ op(&LDA, Immediate, 2, false),
    /* $AA */ op(&TAX, Implied, 2, false),
    /* $AB */ None,
    /* $AC */ op(&LDY, Absolute, 4, false),
    /* $AD */ op(&LDA, Absolute, 4, false),
    /* $AE */ op(&LDX, Absolute, 4, false),
    /* $AF */ op(&LAX, Absolute, 4, false),
    /* $B0 */ op(&BCS, Relative, 2, false),
    /* $B1 */ op(&LDA, IndirectY, 5, true),
    /* $B2 */ None,
    /* $B3 */ op(&LAX, IndirectY, 5, true),
    /* $B4 */ op(&LDY, ZeroPageX, 4, false),
    /* $B5 */ op(&LDA, ZeroPageX, 4, false),
    /* $B6 */ op(&LDX, ZeroPageY, 4, false),
    /* $B7 */ op(&LAX, ZeroPageY, 4, false),
    /* $B8 */ op(&CLV, Implied, 2, false),
    /* $B9 */ op(&LDA, AbsoluteY, 4, true),
    /* $BA */ op(&TSX, Implied, 2, false),
    /* $BB */ None,
    /* $BC */ op(&LDY, AbsoluteX, 4, true),
    /* $BD */ op(&LDA, AbsoluteX, 4, true),
    /* $BE */ op(&LDX, AbsoluteY, 4, true),
    /* $BF */ op(&LAX, AbsoluteY, 4, true),
    /* $C0 */ op(&CPY, Immediate, 2, false),
    /* $C1 */ op(&CMP, IndirectX, 6, false),
    /* $C2 */ op(&NOP_UNOFFICIAL, Immediate, 2, false),
    /* $C3 */ op(&DCP, IndirectX, 8, false),
    /* $C4 */ op(&CPY, ZeroPage, 3, false),
    /* $C5 */ op(&CMP, ZeroPage, 3, false),
    /* $C6 */ op(&DEC, ZeroPage, 5, false),
    /* $C7 */ op(&DCP, ZeroPage, 5, false),
    /* $C8 */ op(&INY, Implied, 2, false),
    /* $C9 */ op(&CMP, Immediate, 2, false),
    /* $CA */ op(&DEX, Implied, 2, false),
    /* $CB */ op(&AXS, Immediate, 2, false),
    /* $CC */ op(&CPY, Absolute, 4, false),
    /* $CD */ op(&CMP, Absolute, 4, false),
    /* $CE */ op(&DEC, Absolute, 6, false),
    /* $CF */ op(&DCP, Absolute, 6, false),
    /* $D0 */ op(&BNE, Relative, 2, false),
    /* $D1 */ op(&CMP, IndirectY, 5, true),
    /* $D2 */ None,
    /* $D3 */ op(&DCP, IndirectY, 8, false),
    /* $D4 */ op(&NOP_UNOFFICIAL, ZeroPageX, 4, false),
    /* $D5 */ op(&CMP, ZeroPageX, 4, false),
    /* $D6 */ op(&DEC, ZeroPageX, 6, false),
    /* $D7 */ op(&DCP, ZeroPageX, 6, false),
    /* $D8 */ op(&CLD, Implied, 2, false),
    /* $D9 */ op(&CMP, AbsoluteY, 4, true),
    /* $DA */ op(&NOP_UNOFFICIAL, Implied, 2, false),
    /* $DB */ op(&DCP, AbsoluteY, 7, false),
    /* $DC */ op(&NOP_UNOFFICIAL, AbsoluteX, 4, true),
    /* $DD */ op(&CMP, AbsoluteX, 4, true),
    /* $DE */ op(&DEC, AbsoluteX, 7, false),
    /* $DF */ op(&DCP, AbsoluteX, 7, false),
    /* $E0 */ op(&CPX, Immediate, 2, false),
    /* $E1 */ op(&SBC, IndirectX, 6, false),
    /* $E2 */ op(&NOP_UNOFFICIAL, Immediate, 2, false),
    /* $E3 */ op(&ISC, IndirectX, 8, false),
    /* $E4 */ op(&CPX, ZeroPage, 3, false),
    /* $E5 */ op(&SBC, ZeroPage, 3, false),
    /* $E6 */ op(&INC, ZeroPage, 5, false),
    /* $E7 */ op(&ISC, ZeroPage, 5, false),
    /* $E8 */ op(&INX, Implied, 2, false),
    /* $E9 */ op(&SBC, Immediate, 2, false),
    /* $EA */ op(&NOP, Implied, 2, false),
    /* $EB */ op(&SBC_UNOFFICIAL, Immediate, 2, false),
    /* $EC */ op(&CPX, Absolute, 4, false),
    /* $ED */ op(&SBC, Absolute, 4, false),
    /* $EE */ op(&INC, Absolute, 6, false),
    /* $EF */ op(&ISC, Absolute, 6, false),
    /* $F0 */ op(&BEQ, Relative, 2, false),
    /* $F1 */ op(&SBC, IndirectY, 5, true),
    /* $F2 */ None,
    /* $F3 */ op(&ISC, IndirectY, 8, false),
    /* $F4 */ op(&NOP_UNOFFICIAL, ZeroPageX, 4, false),
    /* $F5 */ op(&SBC, ZeroPageX, 4, false),
    /* $F6 */ op(&INC, ZeroPageX, 6, false),
    /* $F7 */ op(&ISC, ZeroPageX, 6, false),
    /* $F8 */ op(&SED, Implied, 2, false),
    /* $F9 */ op(&SBC, AbsoluteY, 4, true),
    /* $FA */ op(&NOP_UNOFFICIAL, Implied, 2, false),
    /* $FB */ op(&ISC, AbsoluteY, 7, false),
    /* $FC */ op(&NOP_UNOFFICIAL, AbsoluteX, 4, true),
    /* $FD */ op(&SBC, AbsoluteX, 4, true),
    /* $FE */ op(&INC, AbsoluteX, 7, false),
    /* $FF */ op(&ISC, AbsoluteX, 7, false),
];

/// Look up an opcode byte.
#[inline]
pub fn decode(opcode: u8) -> Option<&'static Opcode> {
    OPCODES[opcode as usize].as_ref()
}

/// A table entry that disagrees with its instruction descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpcodeTableError {
    #[error("opcode ${opcode:02X}: {instruction} is not encoded as {mode:?} with this byte")]
    Mismatch {
        opcode: u8,
        instruction: &'static str,
        mode: AddressingMode,
    },
    #[error("opcode ${opcode:02X}: {instruction} has invalid cycle count {cycles}")]
    BadCycles {
        opcode: u8,
        instruction: &'static str,
        cycles: u8,
    },
    #[error("opcode ${opcode:02X} is listed by {instruction} but missing from the table")]
    Missing {
        opcode: u8,
        instruction: &'static str,
    },
}

/// Check every table entry against the descriptors, and every descriptor
/// encoding against the table.
pub fn validate_opcode_table() -> Result<(), OpcodeTableError> {
    for (byte, entry) in OPCODES.iter().enumerate() {
        let Some(entry) = entry else { continue };
        let opcode = byte as u8;
        if !entry.instruction.encodes(entry.mode, opcode) {
            return Err(OpcodeTableError::Mismatch {
                opcode,
                instruction: entry.instruction.name,
                mode: entry.mode,
            });
        }
        if !(1..=8).contains(&entry.cycles) {
            return Err(OpcodeTableError::BadCycles {
                opcode,
                instruction: entry.instruction.name,
                cycles: entry.cycles,
            });
        }
    }

    for ins in INSTRUCTIONS.iter() {
        for info in ins.addressing {
            let listed = decode(info.opcode)
                .map(|entry| std::ptr::eq(entry.instruction, *ins) && entry.mode == info.mode)
                .unwrap_or(false);
            if !listed {
                return Err(OpcodeTableError::Missing {
                    opcode: info.opcode,
                    instruction: ins.name,
                });
            }
        }
    }
    Ok(())
}

/// Validation result, computed the first time a CPU is built.
pub(crate) fn table_check() -> &'static Result<(), OpcodeTableError> {
    static CHECKED: OnceLock<Result<(), OpcodeTableError>> = OnceLock::new();
    CHECKED.get_or_init(validate_opcode_table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_consistent() {
        assert_eq!(validate_opcode_table(), Ok(()));
    }

    #[test]
    fn counts() {
        let mapped = OPCODES.iter().flatten().count();
        let unofficial = OPCODES.iter().flatten().filter(|e| e.is_unofficial()).count();
        assert_eq!(mapped, 236);
        assert_eq!(mapped - unofficial, 151);
    }

    #[test]
    fn jam_opcodes_are_illegal() {
        for byte in [0x02u8, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2] {
            assert!(decode(byte).is_none(), "${:02X}", byte);
        }
        for byte in [0x8Bu8, 0x93, 0x9B, 0x9C, 0x9E, 0x9F, 0xAB, 0xBB] {
            assert!(decode(byte).is_none(), "${:02X}", byte);
        }
    }

    #[test]
    fn lda_immediate_entry() {
        let e = decode(0xA9).expect("LDA #");
        assert_eq!(e.name(), "LDA");
        assert_eq!(e.mode, Immediate);
        assert_eq!(e.cycles, 2);
        assert_eq!(e.size(), 2);
        assert!(!e.page_cross_cycle);
        assert!(!e.is_unofficial());
    }

    #[test]
    fn page_cross_only_on_reads() {
        // Stores and read-modify-write never take the extra cycle
        for byte in [0x9Du8, 0x99, 0x91, 0x1E, 0xFE, 0xDF, 0x1B, 0x13] {
            assert!(!decode(byte).expect("mapped").page_cross_cycle, "${:02X}", byte);
        }
        for byte in [0xBDu8, 0xB9, 0xB1, 0xBE, 0xBC, 0xBF, 0xB3, 0x1C] {
            assert!(decode(byte).expect("mapped").page_cross_cycle, "${:02X}", byte);
        }
    }

    #[test]
    fn nop_aliases_share_descriptor() {
        let a = decode(0x04).expect("nop zp");
        let b = decode(0x64).expect("nop zp");
        assert!(std::ptr::eq(a.instruction, b.instruction));
        assert!(a.is_unofficial());
        assert_eq!(a.size(), 2);
        assert_eq!(decode(0x0C).expect("nop abs").size(), 3);
    }

    #[test]
    fn table_check_is_cached() {
        assert!(table_check().is_ok());
        assert!(std::ptr::eq(table_check(), table_check()));
    }
}

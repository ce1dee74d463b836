//! Fatal execution errors.

use thiserror::Error;

/// Conditions that stop the CPU. Both leave PC on the offending instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Cpu6502Error {
    /// The opcode byte has no instruction in the table (JAM/KIL and the
    /// unstable undocumented opcodes), or it is unofficial and unofficial
    /// opcodes are switched off.
    #[error("illegal opcode ${opcode:02X} at ${pc:04X}")]
    IllegalOpcode { opcode: u8, pc: u16 },

    /// An instruction handler was given an operand kind it can't use. Only
    /// reachable through a corrupt opcode table.
    #[error("{instruction} does not support {operand} operands")]
    UnsupportedAddressingMode {
        instruction: &'static str,
        operand: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let e = Cpu6502Error::IllegalOpcode {
            opcode: 0x02,
            pc: 0x8000,
        };
        assert_eq!(e.to_string(), "illegal opcode $02 at $8000");

        let e = Cpu6502Error::UnsupportedAddressingMode {
            instruction: "STA",
            operand: "immediate",
        };
        assert_eq!(e.to_string(), "STA does not support immediate operands");
    }
}

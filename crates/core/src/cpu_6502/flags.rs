//! Processor status register (P).

use serde::{Deserialize, Serialize};

/// Carry (bit 0)
pub const FLAG_C: u8 = 0x01;
/// Zero (bit 1)
pub const FLAG_Z: u8 = 0x02;
/// Interrupt disable (bit 2)
pub const FLAG_I: u8 = 0x04;
/// Decimal mode (bit 3)
pub const FLAG_D: u8 = 0x08;
/// Break (bit 4). Only meaningful in a copy of P pushed to the stack.
pub const FLAG_B: u8 = 0x10;
/// Unused (bit 5). Reads back as 1 on real hardware.
pub const FLAG_U: u8 = 0x20;
/// Overflow (bit 6)
pub const FLAG_V: u8 = 0x40;
/// Negative (bit 7)
pub const FLAG_N: u8 = 0x80;

/// Unpacked status flags (NV-BDIZC).
///
/// Each field is a `bool`, so a flag can never hold anything but 0 or 1.
/// `to_byte`/`from_byte` convert to and from the packed hardware layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    pub c: bool,
    pub z: bool,
    pub i: bool,
    pub d: bool,
    pub b: bool,
    pub u: bool,
    pub v: bool,
    pub n: bool,
}

impl Flags {
    /// Power-on value: I and U set (P = $24).
    pub const fn power_on() -> Self {
        Self {
            c: false,
            z: false,
            i: true,
            d: false,
            b: false,
            u: true,
            v: false,
            n: false,
        }
    }

    /// Pack into the status byte, bit for bit.
    pub fn to_byte(self) -> u8 {
        let mut p = 0;
        for (set, bit) in [
            (self.c, FLAG_C),
            (self.z, FLAG_Z),
            (self.i, FLAG_I),
            (self.d, FLAG_D),
            (self.b, FLAG_B),
            (self.u, FLAG_U),
            (self.v, FLAG_V),
            (self.n, FLAG_N),
        ] {
            if set {
                p |= bit;
            }
        }
        p
    }

    /// Unpack a status byte, bit for bit.
    pub fn from_byte(p: u8) -> Self {
        Self {
            c: p & FLAG_C != 0,
            z: p & FLAG_Z != 0,
            i: p & FLAG_I != 0,
            d: p & FLAG_D != 0,
            b: p & FLAG_B != 0,
            u: p & FLAG_U != 0,
            v: p & FLAG_V != 0,
            n: p & FLAG_N != 0,
        }
    }

    /// Status byte as pushed by PHP/BRK (`brk = true`) or IRQ/NMI
    /// (`brk = false`). U always reads as 1 on the stack.
    pub fn to_pushed_byte(self, brk: bool) -> u8 {
        let p = (self.to_byte() | FLAG_U) & !FLAG_B;
        if brk {
            p | FLAG_B
        } else {
            p
        }
    }

    /// Load flags pulled from the stack (PLP/RTI). B and U are not latches on
    /// the NMOS part, so B is dropped and U forced on.
    pub fn from_pulled_byte(p: u8) -> Self {
        Self {
            b: false,
            u: true,
            ..Self::from_byte(p)
        }
    }

    /// Set Z and N from a result byte.
    #[inline]
    pub fn set_zn(&mut self, value: u8) {
        self.z = value == 0;
        self.n = value & 0x80 != 0;
    }

    /// Carry as an integer, for arithmetic.
    #[inline]
    pub fn carry_bit(self) -> u8 {
        self.c as u8
    }
}

//! Memory port consumed by the 6502 core.
//!
//! The host owns the address space; the CPU only ever talks to it through
//! [`Memory6502`]. Word helpers are derived from the two byte primitives.

/// Memory interface trait for the 6502 CPU
///
/// Systems using the 6502 must implement this trait to provide memory access.
/// Both operations are total: every address is readable and writable from the
/// core's point of view. Hosts are free to model open bus, ROM, or mapped I/O
/// behind it.
pub trait Memory6502 {
    /// Read a byte from memory at the given address
    fn read(&self, addr: u16) -> u8;

    /// Write a byte to memory at the given address
    fn write(&mut self, addr: u16, val: u8);

    /// Read a little-endian word. The high byte comes from `addr + 1`,
    /// wrapping at the top of the address space.
    fn read_word(&self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Read a little-endian word the way the NMOS indirect addressing logic
    /// does: the carry out of the low address byte is dropped, so a pointer at
    /// `$xxFF` takes its high byte from `$xx00`.
    fn read_word_bug(&self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi_addr = (addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF);
        let hi = self.read(hi_addr) as u16;
        (hi << 8) | lo
    }

    /// Write a little-endian word.
    fn write_word(&mut self, addr: u16, val: u16) {
        self.write(addr, (val & 0xFF) as u8);
        self.write(addr.wrapping_add(1), (val >> 8) as u8);
    }
}

impl<T: Memory6502 + ?Sized> Memory6502 for Box<T> {
    fn read(&self, addr: u16) -> u8 {
        (**self).read(addr)
    }

    fn write(&mut self, addr: u16, val: u8) {
        (**self).write(addr, val);
    }
}

/// Flat 64KB RAM. Used by tests and benchmarks, and handy for hosts that
/// don't need any mapping.
#[derive(Debug, Clone)]
pub struct ArrayMemory {
    pub data: Box<[u8; 0x10000]>,
}

impl ArrayMemory {
    pub fn new() -> Self {
        Self {
            data: Box::new([0; 0x10000]),
        }
    }

    /// Load a program into memory and point the reset vector at it
    pub fn load_program(&mut self, offset: u16, program: &[u8]) {
        for (i, byte) in program.iter().enumerate() {
            self.data[offset.wrapping_add(i as u16) as usize] = *byte;
        }
        self.data[0xFFFC] = (offset & 0xFF) as u8;
        self.data[0xFFFD] = (offset >> 8) as u8;
    }

    /// Set the NMI vector at $FFFA/$FFFB
    pub fn set_nmi_vector(&mut self, addr: u16) {
        self.write_word(0xFFFA, addr);
    }

    /// Set the IRQ/BRK vector at $FFFE/$FFFF
    pub fn set_irq_vector(&mut self, addr: u16) {
        self.write_word(0xFFFE, addr);
    }
}

impl Default for ArrayMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory6502 for ArrayMemory {
    fn read(&self, addr: u16) -> u8 {
        self.data[addr as usize]
    }

    fn write(&mut self, addr: u16, val: u8) {
        self.data[addr as usize] = val;
    }
}

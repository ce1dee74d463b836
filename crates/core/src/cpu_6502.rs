//! MOS 6502 CPU core implementation
//!
//! This module provides a reusable, generic 6502 CPU implementation that can be used
//! by any system (NES, Atari 2600, Apple II, etc.) by implementing the `Memory6502` trait.
//!
//! Execution is table driven: every step decodes the opcode byte through
//! [`opcodes::OPCODES`], resolves the operand for its addressing mode, runs the
//! instruction's handler and then does PC and cycle bookkeeping. Undocumented
//! opcodes that real software relies on are ordinary table entries.

pub mod addressing;
mod error;
mod execute;
mod flags;
pub mod instructions;
mod interrupts;
mod memory;
pub mod opcodes;
mod stack;
mod state;

#[cfg(test)]
mod tests;

pub use addressing::{AddressingMode, IndexRegister, Operand};
pub use error::Cpu6502Error;
pub use flags::Flags;
pub use instructions::{Instruction, Mnemonic};
pub use interrupts::{InterruptHandle, IRQ_VECTOR, NMI_VECTOR, RESET_VECTOR};
pub use memory::{ArrayMemory, Memory6502};
pub use opcodes::Opcode;
pub use state::{CpuState, InterruptStatus};

use crate::config::CpuConfig;
use crate::logging::{log, LogCategory, LogLevel};

/// Cycles spent by the reset sequence.
const RESET_CYCLES: u64 = 7;

/// Stack pointer after power-on and reset
const SP_POWER_ON: u8 = 0xFD;

/// MOS 6502 CPU state and execution engine
///
/// This is a generic, reusable 6502 CPU implementation that works with any
/// system through the `Memory6502` trait.
#[derive(Debug)]
pub struct Cpu6502<M: Memory6502> {
    /// Accumulator register
    pub a: u8,
    /// X index register
    pub x: u8,
    /// Y index register
    pub y: u8,
    /// Stack pointer (points to 0x0100 + sp)
    pub sp: u8,
    /// Status register (NV-BDIZC)
    pub flags: Flags,
    /// Program counter
    pub pc: u16,
    /// Memory interface
    pub memory: M,
    /// Total cycles executed; only ever grows
    cycles: u64,
    /// Extra cycles injected by the host (DMA and the like), not yet burned
    stall_cycles: u64,
    interrupts: InterruptHandle,
    nmi_running: bool,
    irq_running: bool,
    /// Vectors cached at construction and reset
    nmi_address: u16,
    irq_address: u16,
    config: CpuConfig,
    /// Set by handlers that load PC themselves
    pc_changed: bool,
    /// Cycles a handler adds on top of the table cost (taken branches)
    extra_cycles: u32,
}

impl<M: Memory6502> Cpu6502<M> {
    /// Create a new 6502 CPU with the given memory interface
    ///
    /// PC is loaded from the reset vector and the NMI/IRQ vectors are cached,
    /// so the memory should already hold them.
    pub fn new(memory: M) -> Self {
        Self::with_config(memory, CpuConfig::default())
    }

    /// Create a CPU with explicit behavior options.
    pub fn with_config(memory: M, config: CpuConfig) -> Self {
        let table = opcodes::table_check();
        if let Err(e) = table {
            log(LogCategory::Decode, LogLevel::Error, || {
                format!("CPU: opcode table self-check failed: {}", e)
            });
        }
        debug_assert!(table.is_ok(), "opcode table self-check failed: {:?}", table);

        let mut cpu = Self {
            a: 0,
            x: 0,
            y: 0,
            sp: SP_POWER_ON,
            flags: Flags::power_on(),
            pc: 0,
            memory,
            cycles: 0,
            stall_cycles: 0,
            interrupts: InterruptHandle::new(),
            nmi_running: false,
            irq_running: false,
            nmi_address: 0,
            irq_address: 0,
            config,
            pc_changed: false,
            extra_cycles: 0,
        };
        cpu.pc = cpu.read_u16(RESET_VECTOR);
        cpu.refresh_vectors();
        cpu
    }

    /// Reset the CPU to initial state (preserves memory)
    ///
    /// Pending interrupt requests and stall cycles are dropped. The cycle
    /// counter is not rewound; the reset sequence is charged like any other.
    pub fn reset(&mut self) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = SP_POWER_ON;
        self.flags = Flags::power_on();
        self.nmi_running = false;
        self.irq_running = false;
        self.interrupts.set(false, false);
        self.stall_cycles = 0;
        self.pc_changed = false;
        self.extra_cycles = 0;

        // On real hardware, RESET loads the vector at $FFFC-$FFFD.
        self.pc = self.read_u16(RESET_VECTOR);
        self.refresh_vectors();
        self.cycles += RESET_CYCLES;

        log(LogCategory::Cpu, LogLevel::Info, || {
            format!("CPU: reset, PC={:04X}", self.pc)
        });
    }

    /// Replace the memory interface while preserving CPU state
    pub fn with_memory<N: Memory6502>(self, new_memory: N) -> Cpu6502<N> {
        Cpu6502 {
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            flags: self.flags,
            pc: self.pc,
            memory: new_memory,
            cycles: self.cycles,
            stall_cycles: self.stall_cycles,
            interrupts: self.interrupts,
            nmi_running: self.nmi_running,
            irq_running: self.irq_running,
            nmi_address: self.nmi_address,
            irq_address: self.irq_address,
            config: self.config,
            pc_changed: false,
            extra_cycles: 0,
        }
    }

    pub fn config(&self) -> &CpuConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: CpuConfig) {
        self.config = config;
    }

    /// Total cycles executed since construction.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Queue extra cycles for the host's timing loop (e.g. OAM DMA).
    pub fn stall_cycles(&mut self, n: u64) {
        self.stall_cycles = self.stall_cycles.saturating_add(n);
    }

    pub fn pending_stall_cycles(&self) -> u64 {
        self.stall_cycles
    }

    /// Drain the stall counter, returning what was queued.
    pub fn take_stall_cycles(&mut self) -> u64 {
        std::mem::take(&mut self.stall_cycles)
    }

    /// Read a byte from memory
    #[inline]
    fn read(&self, addr: u16) -> u8 {
        self.memory.read(addr)
    }

    /// Write a byte to memory
    #[inline]
    fn write(&mut self, addr: u16, val: u8) {
        self.memory.write(addr, val);
    }

    #[inline]
    fn read_u16(&self, addr: u16) -> u16 {
        self.memory.read_word(addr)
    }

    /// Load PC from a handler. The step loop then leaves PC alone.
    #[inline]
    fn jump(&mut self, target: u16) {
        self.pc = target;
        self.pc_changed = true;
    }

    /// Look up the opcode at PC, honoring the unofficial-opcode switch.
    fn decode_at(&self, byte: u8) -> Option<&'static Opcode> {
        opcodes::decode(byte).filter(|op| self.config.unofficial_opcodes || !op.is_unofficial())
    }

    /// Execute one instruction, or service one pending interrupt, and return
    /// the cycles used.
    ///
    /// On error PC still points at the offending opcode and no cycles are
    /// charged, so the CPU stays stopped until the host intervenes.
    pub fn step(&mut self) -> Result<u32, Cpu6502Error> {
        if let Some(cycles) = self.service_interrupts() {
            self.cycles += cycles as u64;
            return Ok(cycles);
        }

        let pc = self.pc;
        let byte = self.read(pc);
        let Some(opcode) = self.decode_at(byte) else {
            log(LogCategory::Decode, LogLevel::Error, || {
                format!("CPU: illegal opcode {:02X} at PC={:04X}", byte, pc)
            });
            return Err(Cpu6502Error::IllegalOpcode { opcode: byte, pc });
        };

        let (operand, crossed) = self.resolve_operand(opcode.mode);
        let mut cycles = opcode.cycles as u32;
        if opcode.page_cross_cycle && crossed {
            cycles += 1;
        }

        if self.config.trace {
            log(LogCategory::Cpu, LogLevel::Trace, || self.trace_line(opcode));
        }

        self.pc_changed = false;
        self.extra_cycles = 0;
        if let Err(e) = self.execute(opcode.instruction, operand) {
            self.pc = pc;
            return Err(e);
        }

        if !self.pc_changed {
            self.pc = self.pc.wrapping_add(opcode.size() as u16);
        }
        cycles += self.extra_cycles;
        self.cycles += cycles as u64;
        Ok(cycles)
    }

    /// Run until at least `budget` cycles have been spent.
    ///
    /// Pending stall cycles are burned first, then instructions are stepped.
    /// Returns the cycles actually consumed, which can overshoot the budget
    /// by part of an instruction.
    pub fn run_cycles(&mut self, budget: u64) -> Result<u64, Cpu6502Error> {
        let mut spent = 0u64;
        while spent < budget {
            if self.stall_cycles > 0 {
                let burn = self.stall_cycles.min(budget - spent);
                self.stall_cycles -= burn;
                self.cycles += burn;
                spent += burn;
                continue;
            }
            spent += self.step()? as u64;
        }
        Ok(spent)
    }

    /// nestest-style trace line for the instruction at PC.
    fn trace_line(&self, opcode: &Opcode) -> String {
        let bytes: Vec<String> = (0..opcode.size() as u16)
            .map(|i| format!("{:02X}", self.read(self.pc.wrapping_add(i))))
            .collect();
        let marker = if opcode.is_unofficial() { '*' } else { ' ' };
        format!(
            "{:04X}  {:<8} {}{} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            self.pc,
            bytes.join(" "),
            marker,
            opcode.name(),
            self.a,
            self.x,
            self.y,
            self.flags.to_byte(),
            self.sp,
            self.cycles
        )
    }
}

impl<M: Memory6502> crate::Cpu for Cpu6502<M> {
    type Error = Cpu6502Error;

    fn reset(&mut self) {
        Cpu6502::reset(self);
    }

    fn step(&mut self) -> Result<u32, Self::Error> {
        Cpu6502::step(self)
    }
}

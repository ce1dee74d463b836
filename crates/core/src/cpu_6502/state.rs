//! Register snapshots and JSON save states.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::flags::Flags;
use super::memory::Memory6502;
use super::Cpu6502;

/// Save state format version
const STATE_VERSION: u64 = 1;

/// Interrupt latches and handler markers at the time of a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterruptStatus {
    pub nmi_pending: bool,
    pub irq_pending: bool,
    pub nmi_running: bool,
    pub irq_running: bool,
}

/// Owned copy of everything the CPU holds besides memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuState {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub flags: Flags,
    pub cycles: u64,
    pub stall_cycles: u64,
    pub interrupts: InterruptStatus,
}

impl CpuState {
    /// Packed status byte
    pub fn status(&self) -> u8 {
        self.flags.to_byte()
    }
}

impl<M: Memory6502> Cpu6502<M> {
    /// Snapshot of registers, flags, counters and interrupt status.
    pub fn state(&self) -> CpuState {
        CpuState {
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            pc: self.pc,
            flags: self.flags,
            cycles: self.cycles,
            stall_cycles: self.stall_cycles,
            interrupts: InterruptStatus {
                nmi_pending: self.interrupts.nmi_pending(),
                irq_pending: self.interrupts.irq_pending(),
                nmi_running: self.nmi_running,
                irq_running: self.irq_running,
            },
        }
    }

    /// Put the CPU back into a previously captured state.
    ///
    /// Vectors are re-read from the current memory.
    pub fn restore(&mut self, state: &CpuState) {
        self.a = state.a;
        self.x = state.x;
        self.y = state.y;
        self.sp = state.sp;
        self.pc = state.pc;
        self.flags = state.flags;
        self.cycles = state.cycles;
        self.stall_cycles = state.stall_cycles;
        self.nmi_running = state.interrupts.nmi_running;
        self.irq_running = state.interrupts.irq_running;
        self.interrupts
            .set(state.interrupts.nmi_pending, state.interrupts.irq_pending);
        self.refresh_vectors();
    }

    /// JSON save state. Memory is not included; the host saves its own.
    pub fn save_state(&self) -> Value {
        serde_json::json!({
            "version": STATE_VERSION,
            "cpu": self.state(),
        })
    }

    /// Load a JSON save state produced by [`save_state`](Self::save_state).
    pub fn load_state(&mut self, v: &Value) -> Result<(), serde_json::Error> {
        let version = v["version"].as_u64().unwrap_or(0);
        if version != STATE_VERSION {
            return Err(serde::de::Error::custom(format!(
                "unsupported 6502 save state version {}",
                version
            )));
        }
        let state = CpuState::deserialize(&v["cpu"])?;
        self.restore(&state);
        Ok(())
    }
}

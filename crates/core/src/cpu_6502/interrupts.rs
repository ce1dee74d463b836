//! NMI/IRQ request latches and the vectoring sequence shared with BRK.
//!
//! The request latches are the only CPU state other threads may touch, so
//! they live behind an `Arc` of atomics. Everything else (the "running"
//! markers, the stack pushes) happens inside `step()` on the owning thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::memory::Memory6502;
use super::Cpu6502;
use crate::logging::{log, LogCategory, LogLevel};

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Cycles charged for a hardware interrupt sequence.
pub const INTERRUPT_CYCLES: u32 = 7;

#[derive(Debug, Default)]
struct Lines {
    nmi: AtomicBool,
    irq: AtomicBool,
}

/// Cloneable, thread-safe handle to a CPU's interrupt request lines.
///
/// A video chip on another thread can keep one of these and signal vblank
/// without borrowing the CPU. Triggering is idempotent until the CPU
/// services the request.
#[derive(Debug, Clone, Default)]
pub struct InterruptHandle {
    lines: Arc<Lines>,
}

impl InterruptHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a non-maskable interrupt
    pub fn trigger_nmi(&self) {
        self.lines.nmi.store(true, Ordering::Release);
    }

    /// Request a maskable interrupt
    pub fn trigger_irq(&self) {
        self.lines.irq.store(true, Ordering::Release);
    }

    pub fn nmi_pending(&self) -> bool {
        self.lines.nmi.load(Ordering::Acquire)
    }

    pub fn irq_pending(&self) -> bool {
        self.lines.irq.load(Ordering::Acquire)
    }

    /// Clear and return the NMI latch.
    fn take_nmi(&self) -> bool {
        self.lines.nmi.swap(false, Ordering::AcqRel)
    }

    fn take_irq(&self) -> bool {
        self.lines.irq.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn set(&self, nmi: bool, irq: bool) {
        self.lines.nmi.store(nmi, Ordering::Release);
        self.lines.irq.store(irq, Ordering::Release);
    }
}

impl<M: Memory6502> Cpu6502<M> {
    /// Push PC and P, set I and jump through `vector`.
    ///
    /// `brk` selects the B bit of the pushed status; it is the only thing
    /// that tells a BRK apart from a hardware IRQ on the stack.
    pub(crate) fn vector_to(&mut self, vector: u16, brk: bool) {
        self.push_u16(self.pc);
        let p = self.flags.to_pushed_byte(brk);
        self.push_u8(p);
        self.flags.i = true;
        self.pc = vector;
    }

    /// Service a pending interrupt, if one is allowed to run now.
    ///
    /// NMI wins over IRQ and nests: a new NMI during a handler vectors
    /// again. IRQ is held off only by the I flag, which vectoring sets; the
    /// request stays latched until I is cleared. Returns the cycles spent
    /// when an interrupt was taken.
    pub(crate) fn service_interrupts(&mut self) -> Option<u32> {
        if self.interrupts.nmi_pending() && self.interrupts.take_nmi() {
            self.nmi_running = true;
            let from = self.pc;
            self.vector_to(self.nmi_address, false);
            log(LogCategory::Interrupts, LogLevel::Debug, || {
                format!("CPU: NMI at PC={:04X} -> {:04X}", from, self.pc)
            });
            return Some(INTERRUPT_CYCLES);
        }

        if !self.flags.i && self.interrupts.irq_pending() && self.interrupts.take_irq() {
            self.irq_running = true;
            let from = self.pc;
            self.vector_to(self.irq_address, false);
            log(LogCategory::Interrupts, LogLevel::Debug, || {
                format!("CPU: IRQ at PC={:04X} -> {:04X}", from, self.pc)
            });
            return Some(INTERRUPT_CYCLES);
        }

        None
    }

    /// Called by RTI. Whichever handler was running is finished.
    pub(crate) fn finish_interrupt(&mut self) {
        self.nmi_running = false;
        self.irq_running = false;
    }

    /// Re-read the NMI and IRQ/BRK vectors from memory.
    pub fn refresh_vectors(&mut self) {
        self.nmi_address = self.read_u16(NMI_VECTOR);
        self.irq_address = self.read_u16(IRQ_VECTOR);
    }

    /// Request a non-maskable interrupt, serviced at the start of the next step.
    pub fn trigger_nmi(&self) {
        self.interrupts.trigger_nmi();
    }

    /// Request a maskable interrupt, serviced once I is clear.
    pub fn trigger_irq(&self) {
        self.interrupts.trigger_irq();
    }

    /// A handle other threads can use to raise interrupts on this CPU.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupts.clone()
    }

    /// Check if currently executing an NMI handler
    pub fn is_in_nmi(&self) -> bool {
        self.nmi_running
    }

    /// Check if currently executing an IRQ handler
    pub fn is_in_irq(&self) -> bool {
        self.irq_running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_latches_are_shared() {
        let a = InterruptHandle::new();
        let b = a.clone();
        b.trigger_nmi();
        assert!(a.nmi_pending());
        assert!(!a.irq_pending());
        assert!(a.take_nmi());
        assert!(!b.nmi_pending());
        assert!(!a.take_nmi());
    }

    #[test]
    fn trigger_is_idempotent() {
        let h = InterruptHandle::new();
        h.trigger_irq();
        h.trigger_irq();
        assert!(h.take_irq());
        assert!(!h.take_irq());
    }

    #[test]
    fn handle_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InterruptHandle>();
    }
}

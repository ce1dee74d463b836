//! Instruction semantics.
//!
//! One arm per mnemonic. Handlers see an already-resolved [`Operand`] and
//! never touch PC except through `jump`; the step loop advances PC for
//! everything else. The undocumented read-modify-write opcodes are built by
//! dispatching the two documented handlers back to back, so they share the
//! exact flag behavior of the primitives.

use super::addressing::Operand;
use super::error::Cpu6502Error;
use super::instructions::{Instruction, Mnemonic};
use super::memory::Memory6502;
use super::Cpu6502;
use crate::logging::{log, LogCategory, LogLevel};

impl<M: Memory6502> Cpu6502<M> {
    pub(crate) fn execute(
        &mut self,
        ins: &'static Instruction,
        op: Operand,
    ) -> Result<(), Cpu6502Error> {
        self.dispatch(ins.mnemonic, ins, op)
    }

    /// Run the handler for `mnemonic`. `ins` is the decoded instruction,
    /// which differs from `mnemonic` inside a composed opcode; it names
    /// the instruction in errors.
    fn dispatch(
        &mut self,
        mnemonic: Mnemonic,
        ins: &'static Instruction,
        op: Operand,
    ) -> Result<(), Cpu6502Error> {
        use Mnemonic::*;

        match mnemonic {
            // Loads and stores
            Lda => {
                self.a = self.read_operand(ins, op)?;
                self.flags.set_zn(self.a);
            }
            Ldx => {
                self.x = self.read_operand(ins, op)?;
                self.flags.set_zn(self.x);
            }
            Ldy => {
                self.y = self.read_operand(ins, op)?;
                self.flags.set_zn(self.y);
            }
            Sta => {
                let addr = self.operand_address(ins, op)?;
                self.write(addr, self.a);
            }
            Stx => {
                let addr = self.operand_address(ins, op)?;
                self.write(addr, self.x);
            }
            Sty => {
                let addr = self.operand_address(ins, op)?;
                self.write(addr, self.y);
            }

            // Transfers
            Tax => {
                self.x = self.a;
                self.flags.set_zn(self.x);
            }
            Tay => {
                self.y = self.a;
                self.flags.set_zn(self.y);
            }
            Txa => {
                self.a = self.x;
                self.flags.set_zn(self.a);
            }
            Tya => {
                self.a = self.y;
                self.flags.set_zn(self.a);
            }
            Tsx => {
                self.x = self.sp;
                self.flags.set_zn(self.x);
            }
            // TXS doesn't touch flags
            Txs => self.sp = self.x,

            // Arithmetic and logic
            Adc => {
                let v = self.read_operand(ins, op)?;
                self.adc(v);
            }
            Sbc => {
                let v = self.read_operand(ins, op)?;
                self.sbc(v);
            }
            And => {
                self.a &= self.read_operand(ins, op)?;
                self.flags.set_zn(self.a);
            }
            Ora => {
                self.a |= self.read_operand(ins, op)?;
                self.flags.set_zn(self.a);
            }
            Eor => {
                self.a ^= self.read_operand(ins, op)?;
                self.flags.set_zn(self.a);
            }
            Bit => {
                let v = self.read_operand(ins, op)?;
                self.flags.z = self.a & v == 0;
                self.flags.v = v & 0x40 != 0;
                self.flags.n = v & 0x80 != 0;
            }
            Cmp => {
                let v = self.read_operand(ins, op)?;
                self.compare(self.a, v);
            }
            Cpx => {
                let v = self.read_operand(ins, op)?;
                self.compare(self.x, v);
            }
            Cpy => {
                let v = self.read_operand(ins, op)?;
                self.compare(self.y, v);
            }

            // Increments and decrements
            Inc => {
                self.modify(ins, op, |_, v| v.wrapping_add(1))?;
            }
            Dec => {
                self.modify(ins, op, |_, v| v.wrapping_sub(1))?;
            }
            Inx => {
                self.x = self.x.wrapping_add(1);
                self.flags.set_zn(self.x);
            }
            Iny => {
                self.y = self.y.wrapping_add(1);
                self.flags.set_zn(self.y);
            }
            Dex => {
                self.x = self.x.wrapping_sub(1);
                self.flags.set_zn(self.x);
            }
            Dey => {
                self.y = self.y.wrapping_sub(1);
                self.flags.set_zn(self.y);
            }

            // Shifts and rotates
            Asl => {
                self.modify(ins, op, |cpu, v| {
                    cpu.flags.c = v & 0x80 != 0;
                    v << 1
                })?;
            }
            Lsr => {
                self.modify(ins, op, |cpu, v| {
                    cpu.flags.c = v & 0x01 != 0;
                    v >> 1
                })?;
            }
            Rol => {
                self.modify(ins, op, |cpu, v| {
                    let carry_in = cpu.flags.carry_bit();
                    cpu.flags.c = v & 0x80 != 0;
                    (v << 1) | carry_in
                })?;
            }
            Ror => {
                self.modify(ins, op, |cpu, v| {
                    let carry_in = cpu.flags.carry_bit() << 7;
                    cpu.flags.c = v & 0x01 != 0;
                    (v >> 1) | carry_in
                })?;
            }

            // Branches
            Bcc => self.branch(ins, op, !self.flags.c)?,
            Bcs => self.branch(ins, op, self.flags.c)?,
            Bne => self.branch(ins, op, !self.flags.z)?,
            Beq => self.branch(ins, op, self.flags.z)?,
            Bpl => self.branch(ins, op, !self.flags.n)?,
            Bmi => self.branch(ins, op, self.flags.n)?,
            Bvc => self.branch(ins, op, !self.flags.v)?,
            Bvs => self.branch(ins, op, self.flags.v)?,

            // Jumps and subroutines
            Jmp => {
                let target = match op {
                    Operand::Absolute(addr, None) | Operand::Indirect(addr) => addr,
                    _ => return Err(unsupported(ins, op)),
                };
                if target == self.pc {
                    log(LogCategory::Cpu, LogLevel::Debug, || {
                        format!("CPU: JMP to self at {:04X}", target)
                    });
                }
                self.jump(target);
            }
            Jsr => {
                let Operand::Absolute(target, None) = op else {
                    return Err(unsupported(ins, op));
                };
                // The pushed address is the last byte of the JSR.
                self.push_u16(self.pc.wrapping_add(2));
                self.jump(target);
            }
            Rts => {
                let ret = self.pop_u16();
                self.jump(ret.wrapping_add(1));
            }
            Brk => {
                let brk_pc = self.pc;
                // BRK is two bytes; the signature byte is skipped on return.
                self.pc = brk_pc.wrapping_add(2);
                self.vector_to(self.irq_address, true);
                self.pc_changed = true;
                log(LogCategory::Interrupts, LogLevel::Trace, || {
                    format!("CPU: BRK at PC={:04X} -> {:04X}", brk_pc, self.pc)
                });
            }
            Rti => {
                let p = self.pop_u8();
                self.flags = super::Flags::from_pulled_byte(p);
                let ret = self.pop_u16();
                self.finish_interrupt();
                self.jump(ret);
                log(LogCategory::Interrupts, LogLevel::Trace, || {
                    format!("CPU: RTI -> {:04X}", ret)
                });
            }

            // Stack
            Pha => self.push_u8(self.a),
            Php => {
                let p = self.flags.to_pushed_byte(true);
                self.push_u8(p);
            }
            Pla => {
                self.a = self.pop_u8();
                self.flags.set_zn(self.a);
            }
            Plp => {
                let p = self.pop_u8();
                self.flags = super::Flags::from_pulled_byte(p);
            }

            // Flag operations
            Clc => self.flags.c = false,
            Sec => self.flags.c = true,
            Cli => self.flags.i = false,
            Sei => self.flags.i = true,
            Cld => self.flags.d = false,
            Sed => self.flags.d = true,
            Clv => self.flags.v = false,

            Nop => {
                // The multi-byte NOPs still perform their read.
                if let Some(addr) = op.address() {
                    let _ = self.read(addr);
                }
            }

            // Undocumented
            Slo => {
                self.dispatch(Asl, ins, op)?;
                self.dispatch(Ora, ins, op)?;
            }
            Rla => {
                self.dispatch(Rol, ins, op)?;
                self.dispatch(And, ins, op)?;
            }
            Sre => {
                self.dispatch(Lsr, ins, op)?;
                self.dispatch(Eor, ins, op)?;
            }
            Rra => {
                self.dispatch(Ror, ins, op)?;
                self.dispatch(Adc, ins, op)?;
            }
            Dcp => {
                self.dispatch(Dec, ins, op)?;
                self.dispatch(Cmp, ins, op)?;
            }
            Isc => {
                self.dispatch(Inc, ins, op)?;
                self.dispatch(Sbc, ins, op)?;
            }
            Lax => {
                self.dispatch(Lda, ins, op)?;
                self.dispatch(Tax, ins, Operand::Implied)?;
            }
            Sax => {
                let addr = self.operand_address(ins, op)?;
                self.write(addr, self.a & self.x);
            }
            Anc => {
                self.dispatch(And, ins, op)?;
                self.flags.c = self.flags.n;
            }
            Alr => {
                self.dispatch(And, ins, op)?;
                self.dispatch(Lsr, ins, Operand::Accumulator)?;
            }
            Arr => {
                self.dispatch(And, ins, op)?;
                self.dispatch(Ror, ins, Operand::Accumulator)?;
                let bit6 = self.a & 0x40 != 0;
                let bit5 = self.a & 0x20 != 0;
                self.flags.c = bit6;
                self.flags.v = bit6 ^ bit5;
            }
            Axs => {
                let v = self.read_operand(ins, op)?;
                let ax = self.a & self.x;
                self.compare(ax, v);
                self.x = ax.wrapping_sub(v);
            }
        }

        Ok(())
    }

    /// Fetch the byte an operand refers to.
    fn read_operand(
        &self,
        ins: &'static Instruction,
        op: Operand,
    ) -> Result<u8, Cpu6502Error> {
        match op {
            Operand::Immediate(v) => Ok(v),
            Operand::Absolute(..) | Operand::ZeroPage(..) | Operand::IndirectResolved(_) => {
                self.operand_address(ins, op).map(|addr| self.read(addr))
            }
            _ => Err(unsupported(ins, op)),
        }
    }

    fn operand_address(
        &self,
        ins: &'static Instruction,
        op: Operand,
    ) -> Result<u16, Cpu6502Error> {
        op.address().ok_or_else(|| unsupported(ins, op))
    }

    /// Read-modify-write on A or memory. Z and N follow the stored value.
    fn modify<F>(
        &mut self,
        ins: &'static Instruction,
        op: Operand,
        f: F,
    ) -> Result<u8, Cpu6502Error>
    where
        F: FnOnce(&mut Self, u8) -> u8,
    {
        let result = match op {
            Operand::Accumulator => {
                let a = self.a;
                let v = f(self, a);
                self.a = v;
                v
            }
            _ => {
                let addr = self.operand_address(ins, op)?;
                let old = self.read(addr);
                let v = f(self, old);
                self.write(addr, v);
                v
            }
        };
        self.flags.set_zn(result);
        Ok(result)
    }

    /// Taken branches cost one cycle, two if the target is on another page
    /// than the following instruction.
    fn branch(
        &mut self,
        ins: &'static Instruction,
        op: Operand,
        taken: bool,
    ) -> Result<(), Cpu6502Error> {
        let Operand::Relative(target) = op else {
            return Err(unsupported(ins, op));
        };
        if taken {
            let next = self.pc.wrapping_add(2);
            self.extra_cycles += 1;
            if (next & 0xFF00) != (target & 0xFF00) {
                self.extra_cycles += 1;
            }
            self.jump(target);
        }
        Ok(())
    }

    fn compare(&mut self, reg: u8, v: u8) {
        self.flags.c = reg >= v;
        self.flags.set_zn(reg.wrapping_sub(v));
    }

    fn adc(&mut self, m: u8) {
        if self.config.decimal_mode && self.flags.d {
            self.adc_decimal(m);
            return;
        }
        let a = self.a;
        let sum = a as u16 + m as u16 + self.flags.carry_bit() as u16;
        let result = sum as u8;
        self.flags.c = sum > 0xFF;
        // overflow: operands agree in sign, result doesn't
        self.flags.v = (a ^ m) & 0x80 == 0 && (a ^ result) & 0x80 != 0;
        self.a = result;
        self.flags.set_zn(result);
    }

    /// Flags always come from the binary difference, in decimal mode too.
    fn sbc(&mut self, m: u8) {
        let a = self.a;
        let carry_in = self.flags.carry_bit() as i16;
        let diff = a as i16 - m as i16 - (1 - carry_in);
        let result = diff as u8;
        self.flags.c = diff >= 0;
        self.flags.v = (a ^ m) & 0x80 != 0 && (a ^ result) & 0x80 != 0;
        self.flags.set_zn(result);
        self.a = if self.config.decimal_mode && self.flags.d {
            sbc_decimal(a, m, carry_in)
        } else {
            result
        };
    }

    /// NMOS BCD addition. Z comes from the binary sum, N and V from the sum
    /// before the high nibble is corrected.
    fn adc_decimal(&mut self, m: u8) {
        let a = self.a;
        let c = self.flags.carry_bit() as u16;
        let binary = (a as u16 + m as u16 + c) as u8;

        let mut lo = (a & 0x0F) as u16 + (m & 0x0F) as u16 + c;
        if lo >= 0x0A {
            lo = ((lo + 0x06) & 0x0F) + 0x10;
        }
        let mut sum = (a & 0xF0) as u16 + (m & 0xF0) as u16 + lo;

        self.flags.z = binary == 0;
        self.flags.n = sum & 0x80 != 0;
        self.flags.v = (a ^ m) & 0x80 == 0 && (a as u16 ^ sum) & 0x80 != 0;
        if sum >= 0xA0 {
            sum += 0x60;
        }
        self.flags.c = sum >= 0x100;
        self.a = sum as u8;
    }
}

/// NMOS BCD subtraction, result byte only.
fn sbc_decimal(a: u8, m: u8, carry_in: i16) -> u8 {
    let mut lo = (a & 0x0F) as i16 - (m & 0x0F) as i16 + carry_in - 1;
    if lo < 0 {
        lo = ((lo - 0x06) & 0x0F) - 0x10;
    }
    let mut r = (a & 0xF0) as i16 - (m & 0xF0) as i16 + lo;
    if r < 0 {
        r -= 0x60;
    }
    r as u8
}

fn unsupported(ins: &'static Instruction, op: Operand) -> Cpu6502Error {
    Cpu6502Error::UnsupportedAddressingMode {
        instruction: ins.name,
        operand: op.kind(),
    }
}

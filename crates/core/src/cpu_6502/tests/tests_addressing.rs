//! Tests for every addressing mode, exercised through real instructions

use super::cpu_with;
use crate::cpu_6502::instructions::{LDA, STA};
use crate::cpu_6502::{Cpu6502Error, Memory6502, Operand};

#[test]
fn adc_all_addressing_modes() {
    // zero page
    let mut cpu = cpu_with(&[0x65, 0x10]);
    cpu.memory.write(0x0010, 0x05);
    cpu.a = 0x01;
    assert_eq!(cpu.step(), Ok(3));
    assert_eq!(cpu.a, 0x06);

    // zero page,X
    let mut cpu = cpu_with(&[0x75, 0x10]);
    cpu.x = 0x02;
    cpu.memory.write(0x0012, 0x05);
    assert_eq!(cpu.step(), Ok(4));
    assert_eq!(cpu.a, 0x05);

    // absolute
    let mut cpu = cpu_with(&[0x6D, 0x00, 0x02]);
    cpu.memory.write(0x0200, 0x07);
    assert_eq!(cpu.step(), Ok(4));
    assert_eq!(cpu.a, 0x07);

    // absolute,X
    let mut cpu = cpu_with(&[0x7D, 0x00, 0x02]);
    cpu.x = 0x01;
    cpu.memory.write(0x0201, 0x08);
    assert_eq!(cpu.step(), Ok(4));
    assert_eq!(cpu.a, 0x08);

    // absolute,Y
    let mut cpu = cpu_with(&[0x79, 0x00, 0x02]);
    cpu.y = 0x02;
    cpu.memory.write(0x0202, 0x09);
    assert_eq!(cpu.step(), Ok(4));
    assert_eq!(cpu.a, 0x09);

    // (indirect,X)
    let mut cpu = cpu_with(&[0x61, 0x20]);
    cpu.x = 0x04;
    cpu.memory.write(0x0024, 0x00);
    cpu.memory.write(0x0025, 0x03);
    cpu.memory.write(0x0300, 0x0A);
    assert_eq!(cpu.step(), Ok(6));
    assert_eq!(cpu.a, 0x0A);

    // (indirect),Y
    let mut cpu = cpu_with(&[0x71, 0x20]);
    cpu.y = 0x01;
    cpu.memory.write(0x0020, 0x00);
    cpu.memory.write(0x0021, 0x03);
    cpu.memory.write(0x0301, 0x0B);
    assert_eq!(cpu.step(), Ok(5));
    assert_eq!(cpu.a, 0x0B);
}

#[test]
fn absolute_x_read_page_cross_adds_cycle() {
    let mut cpu = cpu_with(&[0xBD, 0xFF, 0x02]); // LDA $02FF,X
    cpu.x = 0x01;
    cpu.memory.write(0x0300, 0x99);
    assert_eq!(cpu.step(), Ok(5));
    assert_eq!(cpu.a, 0x99);
}

#[test]
fn absolute_y_no_cross_no_penalty() {
    let mut cpu = cpu_with(&[0xB9, 0x00, 0x02]); // LDA $0200,Y
    cpu.y = 0xFF;
    cpu.memory.write(0x02FF, 0x11);
    assert_eq!(cpu.step(), Ok(4));
    assert_eq!(cpu.a, 0x11);
}

#[test]
fn store_never_pays_page_cross() {
    let mut cpu = cpu_with(&[0x9D, 0xFF, 0x02]); // STA $02FF,X
    cpu.a = 0x5A;
    cpu.x = 0x01;
    assert_eq!(cpu.step(), Ok(5));
    assert_eq!(cpu.memory.read(0x0300), 0x5A);
}

#[test]
fn rmw_absolute_x_fixed_cost() {
    let mut cpu = cpu_with(&[0xFE, 0xFF, 0x02]); // INC $02FF,X
    cpu.x = 0x01;
    cpu.memory.write(0x0300, 0x41);
    assert_eq!(cpu.step(), Ok(7));
    assert_eq!(cpu.memory.read(0x0300), 0x42);
}

#[test]
fn indirect_y_page_cross_adds_cycle() {
    let mut cpu = cpu_with(&[0xB1, 0x40]); // LDA ($40),Y
    cpu.memory.write(0x0040, 0xF0);
    cpu.memory.write(0x0041, 0x20);
    cpu.memory.write(0x2100, 0x77);
    cpu.y = 0x10;
    assert_eq!(cpu.step(), Ok(6));
    assert_eq!(cpu.a, 0x77);
}

#[test]
fn zero_page_x_wraps() {
    let mut cpu = cpu_with(&[0xB5, 0xF0]); // LDA $F0,X
    cpu.x = 0x20;
    cpu.memory.write(0x0010, 0x66);
    cpu.memory.write(0x0110, 0x99);
    cpu.step().unwrap();
    assert_eq!(cpu.a, 0x66);
}

#[test]
fn zero_page_y_wraps_for_ldx_and_stx() {
    // LDX $FF,Y; STX $80,Y
    let mut cpu = cpu_with(&[0xB6, 0xFF, 0x96, 0x80]);
    cpu.y = 0x81;
    cpu.memory.write(0x0080, 0x3C);
    assert_eq!(cpu.step(), Ok(4));
    assert_eq!(cpu.x, 0x3C);
    assert_eq!(cpu.step(), Ok(4));
    assert_eq!(cpu.memory.read(0x0001), 0x3C);
}

#[test]
fn indirect_x_pointer_wraps_in_zero_page() {
    let mut cpu = cpu_with(&[0xA1, 0xFF]); // LDA ($FF,X)
    cpu.x = 0x00;
    cpu.memory.write(0x00FF, 0x34);
    cpu.memory.write(0x0000, 0x12);
    cpu.memory.write(0x0100, 0x56);
    cpu.memory.write(0x1234, 0xAB);
    cpu.step().unwrap();
    assert_eq!(cpu.a, 0xAB);
}

#[test]
fn indirect_y_pointer_wraps_in_zero_page() {
    let mut cpu = cpu_with(&[0xB1, 0xFF]); // LDA ($FF),Y
    cpu.y = 0x01;
    cpu.memory.write(0x00FF, 0x00);
    cpu.memory.write(0x0000, 0x40);
    cpu.memory.write(0x4001, 0xCD);
    cpu.step().unwrap();
    assert_eq!(cpu.a, 0xCD);
}

#[test]
fn handler_rejects_wrong_operand_kind() {
    let mut cpu = cpu_with(&[0xEA]);
    assert_eq!(
        cpu.execute(&STA, Operand::Immediate(0x42)),
        Err(Cpu6502Error::UnsupportedAddressingMode {
            instruction: "STA",
            operand: "immediate",
        })
    );
    assert_eq!(
        cpu.execute(&LDA, Operand::Relative(0x8000)),
        Err(Cpu6502Error::UnsupportedAddressingMode {
            instruction: "LDA",
            operand: "relative",
        })
    );
    assert!(cpu.execute(&LDA, Operand::Immediate(0x42)).is_ok());
    assert_eq!(cpu.a, 0x42);
}

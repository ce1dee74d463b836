use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use retro_core::cpu_6502::{Cpu6502, Memory6502};

/// Simple memory implementation for benchmarking
struct BenchMemory {
    ram: Vec<u8>,
}

impl BenchMemory {
    /// 64K of RAM with `program` at $8000 and the reset vector set.
    fn with_program(program: &[u8]) -> Self {
        let mut ram = vec![0; 0x10000];

        // Set reset vector to point to 0x8000
        ram[0xFFFC] = 0x00;
        ram[0xFFFD] = 0x80;
        ram[0x8000..0x8000 + program.len()].copy_from_slice(program);

        Self { ram }
    }

    /// Mixed loads, stores, register ops and ADC, looping forever.
    fn new() -> Self {
        Self::with_program(&[
            0xA9, 0x42, // LDA #$42
            0x8D, 0x00, 0x20, // STA $2000
            0xA2, 0x10, // LDX #$10
            0xA0, 0x20, // LDY #$20
            0xE8, // INX
            0xC8, // INY
            0xCA, // DEX
            0x88, // DEY
            0x69, 0x01, // ADC #$01
            0x4C, 0x00, 0x80, // JMP $8000
        ])
    }

    /// Indexed and indirect addressing, looping forever.
    fn indexed() -> Self {
        let mut mem = Self::with_program(&[
            0xA2, 0x10, // LDX #$10
            0xA0, 0x20, // LDY #$20
            0xBD, 0xF8, 0x20, // LDA $20F8,X (page cross)
            0x99, 0x00, 0x03, // STA $0300,Y
            0xB1, 0x40, // LDA ($40),Y
            0x81, 0x30, // STA ($30,X)
            0xD7, 0x50, // DCP $50,X
            0x4C, 0x00, 0x80, // JMP $8000
        ]);
        mem.ram[0x40] = 0x00;
        mem.ram[0x41] = 0x04;
        mem.ram[0x40 + 0x10] = 0x00;
        mem.ram[0x41 + 0x10] = 0x05;
        mem
    }
}

impl Memory6502 for BenchMemory {
    fn read(&self, addr: u16) -> u8 {
        self.ram[addr as usize]
    }

    fn write(&mut self, addr: u16, val: u8) {
        self.ram[addr as usize] = val;
    }
}

fn bench_cpu_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_6502_step");

    group.bench_function("single_instruction", |b| {
        b.iter(|| {
            let mut cpu = Cpu6502::new(BenchMemory::new());
            cpu.step().unwrap();
            black_box(cpu.a);
        });
    });

    group.finish();
}

fn bench_cpu_multiple_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_6502_multiple_steps");

    for step_count in [10, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(step_count),
            step_count,
            |b, &count| {
                b.iter(|| {
                    let mut cpu = Cpu6502::new(BenchMemory::new());
                    for _ in 0..count {
                        cpu.step().unwrap();
                    }
                    black_box(cpu.cycles());
                });
            },
        );
    }

    group.finish();
}

fn bench_cpu_addressing_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_6502_addressing");

    group.bench_function("immediate_mode", |b| {
        b.iter(|| {
            let mut cpu = Cpu6502::new(BenchMemory::new());
            for _ in 0..100 {
                cpu.step().unwrap();
            }
            black_box(cpu.a);
        });
    });

    group.bench_function("indexed_and_indirect", |b| {
        b.iter(|| {
            let mut cpu = Cpu6502::new(BenchMemory::indexed());
            for _ in 0..100 {
                cpu.step().unwrap();
            }
            black_box(cpu.a);
        });
    });

    group.finish();
}

fn bench_cpu_run_cycles(c: &mut Criterion) {
    // one NTSC frame's worth of CPU time
    c.bench_function("cpu_6502_run_frame", |b| {
        let mut cpu = Cpu6502::new(BenchMemory::new());
        b.iter(|| {
            cpu.stall_cycles(513);
            black_box(cpu.run_cycles(29_781).unwrap());
        });
    });
}

fn bench_cpu_reset(c: &mut Criterion) {
    c.bench_function("cpu_6502_reset", |b| {
        let mut cpu = Cpu6502::new(BenchMemory::new());
        b.iter(|| {
            cpu.reset();
            black_box(cpu.pc);
        });
    });
}

criterion_group!(
    benches,
    bench_cpu_step,
    bench_cpu_multiple_steps,
    bench_cpu_addressing_modes,
    bench_cpu_run_cycles,
    bench_cpu_reset
);
criterion_main!(benches);

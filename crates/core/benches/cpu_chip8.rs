use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use emu_core::cpu_chip8::{Chip8, MachineProfile};

/// Arithmetic loop with a sprite draw per iteration
fn bench_program() -> Vec<u8> {
    let words: [u16; 9] = [
        0x00FF, // HIGH
        0x6042, // LD V0, 0x42
        0x6110, // LD V1, 0x10
        0x8014, // ADD V0, V1
        0x8106, // SHR V1, V0
        0xA050, // LD I, 0x050
        0xD01A, // DRW V0, V1, 10
        0xF033, // LD B, V0
        0x1202, // JP 0x202
    ];
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

fn make_cpu(profile: MachineProfile) -> Chip8 {
    let mut cpu = Chip8::with_seed(profile.quirks(), 0);
    cpu.load_program(&bench_program()).expect("bench program fits");
    cpu
}

fn bench_cpu_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_chip8_step");

    group.bench_function("single_instruction", |b| {
        let mut cpu = make_cpu(MachineProfile::Chip8);
        b.iter(|| {
            black_box(cpu.step());
        });
    });

    group.finish();
}

fn bench_cpu_multiple_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_chip8_multiple_steps");

    for step_count in [10, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(step_count),
            step_count,
            |b, &count| {
                b.iter(|| {
                    let mut cpu = make_cpu(MachineProfile::XoChip);
                    for _ in 0..count {
                        cpu.step();
                    }
                    black_box(cpu.pc());
                });
            },
        );
    }

    group.finish();
}

fn bench_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_chip8_scroll");

    group.bench_function("scroll_down_then_left", |b| {
        let mut cpu = make_cpu(MachineProfile::SuperChip);
        for _ in 0..64 {
            cpu.step();
        }
        let mut display = cpu.display().clone();
        b.iter(|| {
            display.scroll_down(1);
            display.scroll_left(4);
            black_box(display.needs_redraw());
        });
    });

    group.finish();
}

fn bench_cpu_reset(c: &mut Criterion) {
    c.bench_function("cpu_chip8_reset", |b| {
        let mut cpu = make_cpu(MachineProfile::Chip8);
        b.iter(|| {
            cpu.initialize();
            black_box(cpu.pc());
        });
    });
}

criterion_group!(
    benches,
    bench_cpu_step,
    bench_cpu_multiple_steps,
    bench_scroll,
    bench_cpu_reset
);
criterion_main!(benches);

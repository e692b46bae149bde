use aspy_codegen::{Transpiler, TranspilerConfig, simple_transpile};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_transpile_assignments(c: &mut Criterion) {
    let source = "a = [1, 2, 3]\nb = a[0] * 2 + a[2]\nc = (b < 10) * 5\n";

    c.bench_function("transpile_assignments", |b| {
        b.iter(|| {
            let _ = black_box(simple_transpile(black_box(source)).is_ok());
        });
    });
}

fn bench_transpile_inlining(c: &mut Criterion) {
    let source = r#"
def clamp(value, low=0, high=500):
    if value < low:
        return low
    elif value > high:
        return high
    return value

def mix(a, b):
    return clamp(a * 2) - clamp(b, high=100)

left = mix(300, 40)
right = mix(-5, 800)
"#;

    c.bench_function("transpile_inlining", |b| {
        b.iter(|| {
            let _ = black_box(simple_transpile(black_box(source)).is_ok());
        });
    });
}

fn bench_transpile_handlers(c: &mut Criterion) {
    let source = r#"
from clock import *

speed = 0
total = 0

@onevent
def button_forward():
    global speed
    speed = min_speed(speed + 50)

@onevent
def timer0():
    global total
    for i in range(0, 100, 3):
        if i % 2 == 0:
            continue
        total += i
    motor_left_target = speed
    print("elapsed", seconds(), total)

def min_speed(v):
    if v > 500:
        return 500
    return v
"#;

    c.bench_function("transpile_handlers", |b| {
        b.iter(|| {
            let mut transpiler = Transpiler::with_config(TranspilerConfig::new().with_robot_import(true));
            transpiler.set_source(black_box(source));
            let _ = black_box(transpiler.transpile().is_ok());
        });
    });
}

criterion_group!(
    benches,
    bench_transpile_assignments,
    bench_transpile_inlining,
    bench_transpile_handlers
);
criterion_main!(benches);

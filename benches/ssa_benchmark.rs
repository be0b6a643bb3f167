// benches/ssa_benchmark.rs
use criterion::measurement::WallTime;
use criterion::{BenchmarkGroup, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ssa_joints::ir::instruction::{Instruction, UnaryCondition};
use ssa_joints::ir::procedure::Procedure;
use ssa_joints::ssa::update;
use std::hint::black_box;
use std::time::Duration;

fn configure_benchmark_group(group: &mut BenchmarkGroup<WallTime>, warm_up: u64, measurement: u64) {
    group
        .significance_level(0.005)
        .sample_size(50)
        .confidence_level(0.99)
        .warm_up_time(Duration::from_secs(warm_up))
        .measurement_time(Duration::from_secs(measurement));
}

/// A chain of `diamonds` diamond-shaped merges, each writing the same
/// running variable in both arms, so every merge block needs a phi.
fn diamond_chain(diamonds: usize) -> (Procedure, ssa_joints::ir::variable::VarId) {
    let mut proc = Procedure::new();
    let v = proc.create_variable();
    let cond = proc.create_variable();
    let mut entry = proc.push_block();
    proc.block_at_mut(entry).instructions.push(Instruction::IntConstant { value: 0, receiver: v });

    for i in 0..diamonds {
        let left = proc.push_block();
        let right = proc.push_block();
        let merge = proc.push_block();

        proc.block_at_mut(entry).instructions.push(Instruction::BranchUnary {
            condition: UnaryCondition::IsNonZero,
            operand: cond,
            consequent: left,
            alternative: right,
        });
        proc.block_at_mut(left).instructions.push(Instruction::IntConstant { value: i as i32, receiver: v });
        proc.block_at_mut(left).instructions.push(Instruction::Jump { target: merge });
        proc.block_at_mut(right).instructions.push(Instruction::IntConstant { value: -(i as i32), receiver: v });
        proc.block_at_mut(right).instructions.push(Instruction::Jump { target: merge });
        entry = merge;
    }
    proc.block_at_mut(entry).instructions.push(Instruction::Exit { value: Some(v) });
    (proc, cond)
}

fn benchmark_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("ssa-update");
    configure_benchmark_group(&mut group, 2, 5);

    for diamonds in [8usize, 64, 256] {
        let (proc, cond) = diamond_chain(diamonds);
        group.throughput(Throughput::Elements(proc.block_count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(diamonds), &diamonds, |b, _| {
            b.iter(|| {
                let mut proc = proc.clone();
                update(&mut proc, black_box(&[cond]));
                black_box(&proc);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_update);
criterion_main!(benches);

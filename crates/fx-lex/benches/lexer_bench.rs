//! Lexer throughput benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fx_lex::Lexer;
use fx_util::FileId;

fn sample_program(repeat: usize) -> String {
    let unit = "let total = 0\n\
                fex square(x) -> x * x\n\
                for i = 1 to 100: let total = total + square(i) end\n\
                print(\"total: \" + total)\n";
    unit.repeat(repeat)
}

fn bench_lexer(c: &mut Criterion) {
    let small = sample_program(1);
    let large = sample_program(250);

    c.bench_function("lex_small_program", |b| {
        b.iter(|| Lexer::new(black_box(&small), FileId::DUMMY).tokenize().unwrap())
    });

    c.bench_function("lex_large_program", |b| {
        b.iter(|| Lexer::new(black_box(&large), FileId::DUMMY).tokenize().unwrap())
    });
}

criterion_group!(benches, bench_lexer);
criterion_main!(benches);

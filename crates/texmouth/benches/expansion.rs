use criterion::{criterion_group, criterion_main, Criterion};
use texmouth::driver::{Driver, Options};

const PUNISHMENT: &str = r"\def\mustnt#1#2{I must not #1 in #2.}%
\def\five#1#2{\mustnt{#1}{#2}\mustnt{#1}{#2}\mustnt{#1}{#2}\mustnt{#1}{#2}\mustnt{#1}{#2}}%
\def\twenty#1#2{\five{#1}{#2}\five{#1}{#2}\five{#1}{#2}\five{#1}{#2}}%
\def\punishment#1#2{\twenty{#1}{#2}\twenty{#1}{#2}\twenty{#1}{#2}\twenty{#1}{#2}\twenty{#1}{#2}}%
\punishment{run}{the halls}";

fn run(source: &str) -> String {
    let mut driver = Driver::new("bench.tex", source.into(), Options::for_testing());
    driver.run_to_string().unwrap()
}

pub fn expansion_benchmark(c: &mut Criterion) {
    c.bench_function("punishment", |b| b.iter(|| run(PUNISHMENT)));
    c.bench_function("conditionals", |b| {
        b.iter(|| {
            run(r"\def\pick#1{\ifnum #1>0 positive\else negative\fi}\pick7\pick{-3}\pick{42}")
        })
    });
}

criterion_group!(benches, expansion_benchmark);
criterion_main!(benches);

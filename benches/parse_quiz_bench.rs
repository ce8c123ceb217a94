use criterion::{Criterion, criterion_group, criterion_main};
use lsc_trainer::quiz::parse_quiz;
use std::hint::black_box;

fn sample_quiz(questions: usize) -> String {
    let body: Vec<String> = (0..questions)
        .map(|n| {
            format!(
                r#"{{"question":"Which exit route rule applies in case {n}?","options":["Corridor width","Door swing","Stair landing","Exit sign"],"correctAnswer":"Door swing"}}"#
            )
        })
        .collect();
    format!("```json\n[{}]\n```", body.join(","))
}

fn bench_parse_quiz(c: &mut Criterion) {
    let small = sample_quiz(5);
    let large = sample_quiz(200);

    c.bench_function("parse_quiz_5", |b| {
        b.iter(|| black_box(parse_quiz(black_box(&small)).expect("sample quiz parses")))
    });
    c.bench_function("parse_quiz_200", |b| {
        b.iter(|| black_box(parse_quiz(black_box(&large)).expect("sample quiz parses")))
    });
}

criterion_group!(benches, bench_parse_quiz);
criterion_main!(benches);

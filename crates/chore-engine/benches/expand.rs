use std::hint::black_box;

use chrono::NaiveDate;
use chore_engine::{expand_occurrences, Chore, DateWindow, Recurrence};
use criterion::{criterion_group, criterion_main, Criterion};

fn chores(count: usize) -> Vec<Chore> {
    let rules = [
        Recurrence::None,
        Recurrence::Daily,
        Recurrence::Weekly,
        Recurrence::Monthly,
    ];
    (0..count)
        .map(|i| Chore {
            id: i.to_string(),
            title: format!("Chore {}", count - i),
            notes: String::new(),
            start_date: format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1),
            recurrence: rules[i % rules.len()].clone(),
            created_at: String::new(),
        })
        .collect()
}

fn bench_expand(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let horizon = DateWindow::horizon(today, 60);

    for count in [10, 200] {
        let input = chores(count);
        c.bench_function(&format!("expand_60_day_horizon_{}_chores", count), |b| {
            b.iter(|| expand_occurrences(black_box(&input), horizon.start, horizon.end))
        });
    }
}

criterion_group!(benches, bench_expand);
criterion_main!(benches);

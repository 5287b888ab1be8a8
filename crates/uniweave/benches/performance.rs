use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uniweave::{Rope, SegmentedVector, Text};

fn large_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 64);
    for i in 0..line_count {
        out.push_str(&format!(
            "{i:06} the quick brown fox jumps over the lazy dog (uniweave benchmark line)\n"
        ));
    }
    out
}

fn bench_rope_from_large_text(c: &mut Criterion) {
    let text = large_text(50_000);
    c.bench_function("rope_build/50k_lines", |b| {
        b.iter(|| {
            let rope = Rope::from(black_box(text.as_str()));
            black_box(rope.len());
        })
    });
}

fn bench_typing_in_middle(c: &mut Criterion) {
    let text = large_text(10_000);
    c.bench_function("typing_middle/100_inserts", |b| {
        b.iter_batched(
            || Rope::from(text.as_str()),
            |mut rope| {
                let mut offset = rope.len() / 2;
                for _ in 0..100 {
                    rope.insert(offset, "x");
                    offset += 1;
                }
                black_box(rope.len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_snapshot_and_edit(c: &mut Criterion) {
    let text = large_text(10_000);
    let rope = Rope::from(text.as_str());
    c.bench_function("snapshot_edit/clone_then_insert", |b| {
        b.iter(|| {
            let mut copy = rope.clone();
            copy.insert(black_box(copy.len() / 3), "edited");
            black_box(copy.len());
        })
    });
}

fn bench_random_point_edits(c: &mut Criterion) {
    let text = large_text(10_000);
    c.bench_function("random_edits/500_ops", |b| {
        b.iter_batched(
            || {
                (
                    Rope::from(text.as_str()),
                    StdRng::seed_from_u64(0xBE7C_0001),
                )
            },
            |(mut rope, mut rng)| {
                for _ in 0..500 {
                    let i = rng.gen_range(0..rope.len());
                    if rng.gen_bool(0.5) {
                        rope.insert_char(i, 'q');
                    } else {
                        rope.remove(i..i + 1);
                    }
                }
                black_box(rope.len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_slice_without_copy(c: &mut Criterion) {
    let text = large_text(50_000);
    let rope = Rope::from(text.as_str());
    let len = rope.len();
    c.bench_function("slice/10pct_of_50k_lines", |b| {
        b.iter(|| {
            let slice = rope.slice(black_box(len / 2)..black_box(len / 2 + len / 10));
            black_box(slice.len());
        })
    });
}

fn bench_segvec_push(c: &mut Criterion) {
    c.bench_function("segvec_push/100k", |b| {
        b.iter(|| {
            let mut sv: SegmentedVector<u64> = SegmentedVector::new();
            for i in 0..100_000u64 {
                sv.push(i);
            }
            black_box(sv.len());
        })
    });
}

fn bench_nfc_maintenance(c: &mut Criterion) {
    c.bench_function("text_nfc/1k_mark_inserts", |b| {
        b.iter_batched(
            || Text::from(large_text(200).as_str()),
            |mut text| {
                let step = text.len() / 1_000;
                for i in 0..1_000 {
                    text.insert((i * step).min(text.len()), "e\u{301}");
                }
                black_box(text.len());
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    bench_rope_from_large_text,
    bench_typing_in_middle,
    bench_snapshot_and_edit,
    bench_random_point_edits,
    bench_slice_without_copy,
    bench_segvec_push,
    bench_nfc_maintenance,
);
criterion_main!(benches);

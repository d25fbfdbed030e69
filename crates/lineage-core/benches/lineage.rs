use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use lineage_core::{
    DisplayConfig, FilterAction, HistoryEntry, IdentityKey, ImageHistoryGraph, ImageId, ImageRecord,
    MemoryCatalog, RelationPair,
};

const SIZES: [i64; 3] = [50, 100, 200];

fn key(id: i64) -> IdentityKey {
    IdentityKey::default().with_location("/bench", format!("{id}.jpg"))
}

fn catalog(size: i64) -> MemoryCatalog {
    let mut c = MemoryCatalog::new();
    for id in 0..size {
        c.insert_record(ImageRecord::new(ImageId(id), "/bench", format!("{id}.jpg")), []);
    }
    c
}

/// A main line of edits with a side branch every fifth version and a
/// shortcut edge every seventh.
fn lineage(size: i64) -> Vec<RelationPair> {
    let mut pairs = Vec::new();
    for id in 1..size {
        let parent = if id % 5 == 0 { id - 3 } else { id - 1 };
        pairs.push(RelationPair::derived_from(ImageId(id), ImageId(parent.max(0))));
        if id % 7 == 0 && id >= 4 {
            pairs.push(RelationPair::derived_from(ImageId(id), ImageId(id - 4)));
        }
    }
    pairs
}

fn bench_lineage(c: &mut Criterion) {
    let mut group = c.benchmark_group("lineage");

    for size in SIZES {
        let store = catalog(size);
        let pairs = lineage(size);
        let mut built = ImageHistoryGraph::default();
        built.add_relations(&pairs, &store);
        group.throughput(Throughput::Elements(u64::try_from(size).unwrap_or(0)));

        group.bench_with_input(BenchmarkId::new("add_relations", size), &pairs, |b, pairs| {
            b.iter(|| {
                let mut g = ImageHistoryGraph::default();
                g.add_relations(black_box(pairs), &store);
                g
            });
        });

        group.bench_with_input(BenchmarkId::new("linear_history", size), &size, |b, &size| {
            let entries: Vec<HistoryEntry> = (0..size)
                .map(|id| HistoryEntry::step(FilterAction::new("step", 1), key(id)))
                .collect();
            b.iter(|| {
                let mut g = ImageHistoryGraph::default();
                g.add_history(black_box(&entries), None, &store);
                g
            });
        });

        group.bench_with_input(BenchmarkId::new("closure", size), &built, |b, g| {
            b.iter(|| black_box(g.data().graph().transitive_closure(lineage_graph::CopyFlags::NONE)));
        });

        group.bench_with_input(BenchmarkId::new("prepare_for_display", size), &built, |b, g| {
            let subject = ImageRecord::new(ImageId(0), "/bench", "0.jpg");
            b.iter(|| {
                let mut g = g.clone();
                g.prepare_for_display(&subject, &DisplayConfig::default());
                g
            });
        });

        group.bench_with_input(BenchmarkId::new("relation_cloud", size), &built, |b, g| {
            b.iter(|| black_box(g.relation_cloud()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_lineage);
criterion_main!(benches);

//! Invariants that must hold for arbitrary, possibly inconsistent input.

use std::collections::BTreeSet;

use lineage_core::{
    DisplayConfig, FilterAction, HistoryEntry, IdentityKey, ImageHistoryGraph, ImageId, ImageRecord,
    MemoryCatalog, Orientation, RelationPair,
};
use proptest::prelude::*;

const IMAGES: i64 = 8;

fn record(id: i64) -> ImageRecord {
    ImageRecord::new(ImageId(id), "/lib", format!("{id}.tif")).with_uuid(format!("u-{id}"))
}

fn hash_key(id: i64) -> IdentityKey {
    IdentityKey::default().with_hash(format!("h-{id}"), 1000 + id.unsigned_abs())
}

/// Every image answers to its path, its uuid and a content hash.
fn catalog() -> MemoryCatalog {
    let mut c = MemoryCatalog::new();
    for id in 1..=IMAGES {
        c.insert_record(record(id), [hash_key(id)]);
    }
    c
}

/// One of three differently-shaped keys for the same image.
fn arb_key() -> impl Strategy<Value = (i64, IdentityKey)> {
    (1..=IMAGES, 0u8..3).prop_map(|(id, shape)| {
        let key = match shape {
            0 => IdentityKey::default().with_location("/lib", format!("{id}.tif")),
            1 => IdentityKey::default().with_uuid(format!("u-{id}")),
            _ => hash_key(id),
        };
        (id, key)
    })
}

fn arb_entry() -> impl Strategy<Value = (Vec<i64>, HistoryEntry)> {
    (proptest::option::of(0u32..4), prop::collection::vec(arb_key(), 0..3)).prop_map(|(action, keys)| {
        let ids = keys.iter().map(|(id, _)| *id).collect();
        let entry = HistoryEntry {
            action: action.map(|v| FilterAction::new("filter", v)),
            referred: keys.into_iter().map(|(_, k)| k).collect(),
        };
        (ids, entry)
    })
}

fn arb_history() -> impl Strategy<Value = Vec<(Vec<i64>, HistoryEntry)>> {
    prop::collection::vec(arb_entry(), 0..8)
}

fn arb_pairs() -> impl Strategy<Value = Vec<RelationPair>> {
    prop::collection::vec(
        (1..=IMAGES, 1..=IMAGES).prop_map(|(s, o)| RelationPair::derived_from(ImageId(s), ImageId(o))),
        0..20,
    )
}

fn arb_orientation() -> impl Strategy<Value = Orientation> {
    prop_oneof![Just(Orientation::ChildToParent), Just(Orientation::ParentToChild)]
}

fn assert_no_self_loops(g: &ImageHistoryGraph) -> Result<(), TestCaseError> {
    let graph = g.data().graph();
    for e in graph.edges() {
        let ends = graph.endpoints(e);
        prop_assert!(ends.is_some_and(|(u, v)| u != v));
    }
    Ok(())
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(128))]

    #[test]
    fn histories_merge_every_image_into_one_vertex(
        orientation in arb_orientation(),
        histories in prop::collection::vec(arb_history(), 1..4),
    ) {
        let c = catalog();
        let mut g = ImageHistoryGraph::new(orientation);
        let mut referenced: BTreeSet<i64> = BTreeSet::new();
        for history in histories {
            referenced.extend(history.iter().flat_map(|(ids, _)| ids.iter().copied()));
            let entries: Vec<HistoryEntry> = history.into_iter().map(|(_, e)| e).collect();
            g.add_history(&entries, None, &c);
        }

        prop_assert!(g.vertex_count() <= referenced.len());
        prop_assert!(!g.has_unresolved_entries());
        let ids = g.all_image_ids();
        let distinct: BTreeSet<ImageId> = ids.iter().copied().collect();
        prop_assert_eq!(ids.len(), distinct.len());
        prop_assert_eq!(distinct, referenced.into_iter().map(ImageId).collect::<BTreeSet<_>>());
        assert_no_self_loops(&g)?;
    }

    #[test]
    fn relations_never_create_self_loops(orientation in arb_orientation(), pairs in arb_pairs()) {
        let c = catalog();
        let mut g = ImageHistoryGraph::new(orientation);
        g.add_relations(&pairs, &c);
        assert_no_self_loops(&g)?;

        g.prepare_for_display(&record(1), &DisplayConfig::default());
        assert_no_self_loops(&g)?;
        prop_assert!(g.relation_cloud().iter().all(|p| !p.is_self_reference()));
    }

    #[test]
    fn reduction_keeps_the_relation_cloud_of_acyclic_input(pairs in arb_pairs()) {
        let forward: Vec<RelationPair> = pairs.into_iter().filter(|p| p.subject > p.object).collect();
        let c = catalog();
        let mut g = ImageHistoryGraph::default();
        g.add_relations(&forward, &c);

        let before = g.relation_cloud();
        let report = g.reduce_edges();
        prop_assert!(report.applied);
        prop_assert_eq!(g.relation_cloud(), before);
    }
}

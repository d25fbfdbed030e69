//! Graph storage for image histories: merge-on-insert, history assembly and
//! the maintenance passes run before display.
//!
//! # Overview
//!
//! [`HistoryGraphData`] wraps a [`PropertyGraph`] of [`HistoryVertex`] and
//! [`HistoryEdge`] payloads. Vertices are never created blindly: every
//! insertion first tries to find an existing vertex for the identity (see
//! [`HistoryGraphData::add_vertex_for_key`]) and unions the new data into
//! it.
//!
//! ## Edge direction
//!
//! Callers describe edges as "newer derives from older" through
//! [`HistoryGraphData::connect`]. The stored direction follows the graph's
//! [`Orientation`]: with `ChildToParent` (the default) the edge runs
//! `newer → older`, with `ParentToChild` it runs `older → newer`.

#![allow(clippy::module_name_repetitions)]

use std::collections::BTreeSet;

use lineage_graph::{Adjacency, CopyFlags, EdgeId, Orientation, PropertyGraph, VertexId};
use tracing::{debug, instrument, warn};

use super::{HistoryEdge, HistoryEntry, HistoryVertex};
use crate::action::FilterAction;
use crate::catalog::{IdentityResolver, RecordStore};
use crate::identity::{IdentityKey, ImageId, MatchCriterion};
use crate::record::{ImageRecord, RelationPair};

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// An edge dropped by [`HistoryGraphData::reduce_edges`] although it carried
/// actions. The actions are lost from the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ReductionConflict {
    pub source: VertexId,
    pub target: VertexId,
    pub actions: Vec<FilterAction>,
}

/// Outcome of [`HistoryGraphData::reduce_edges`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReductionReport {
    /// `false` when the graph had a cycle and was left untouched.
    pub applied: bool,
    pub removed: usize,
    pub conflicts: Vec<ReductionConflict>,
}

/// The newest state of a linear history, appended after its entries.
#[derive(Debug, Clone, Copy)]
pub enum HistorySubject<'a> {
    None,
    Key(&'a IdentityKey),
    Record(ImageId),
}

// ---------------------------------------------------------------------------
// HistoryGraphData
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HistoryGraphData {
    graph: PropertyGraph<HistoryVertex, HistoryEdge>,
}

impl Default for HistoryGraphData {
    fn default() -> Self {
        Self::new(Orientation::ChildToParent)
    }
}

impl HistoryGraphData {
    #[must_use]
    pub fn new(orientation: Orientation) -> Self {
        Self {
            graph: PropertyGraph::new(orientation),
        }
    }

    /// The underlying graph, for read-only algorithm access.
    #[must_use]
    pub const fn graph(&self) -> &PropertyGraph<HistoryVertex, HistoryEdge> {
        &self.graph
    }

    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.graph.orientation()
    }

    #[must_use]
    pub fn properties(&self, v: VertexId) -> Option<&HistoryVertex> {
        self.graph.properties(v)
    }

    pub fn clear(&mut self) {
        self.graph.clear();
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Vertex holding a key that matches `key`, trying each criterion over
    /// all vertices before falling back to the next one. A stored key whose
    /// UUID differs from `key`'s is never matched by a weaker criterion.
    #[must_use]
    pub fn find_vertex_for_key(&self, key: &IdentityKey) -> Option<VertexId> {
        MatchCriterion::PRIORITY
            .into_iter()
            .find_map(|c| self.graph.find_vertex_by(|v| v.matches_key_by(key, c)))
    }

    /// Vertex holding one of `records`, by id first, then by record UUID.
    #[must_use]
    pub fn find_vertex_for_records(&self, records: &[ImageRecord]) -> Option<VertexId> {
        records
            .iter()
            .find_map(|r| self.graph.find_vertex_by_properties(&r.id))
            .or_else(|| {
                records
                    .iter()
                    .filter_map(|r| r.uuid.as_deref())
                    .find_map(|uuid| self.graph.find_vertex_by(|v| v.carries_uuid(uuid)))
            })
    }

    /// Vertex whose records include `id`.
    #[must_use]
    pub fn vertex_for_image(&self, id: ImageId) -> Option<VertexId> {
        self.graph.find_vertex_by_properties(&id)
    }

    // -----------------------------------------------------------------------
    // Insertion
    // -----------------------------------------------------------------------

    /// Insert a vertex as-is, without identity resolution.
    pub fn insert_vertex(&mut self, props: HistoryVertex) -> VertexId {
        self.graph.add_vertex_with(props)
    }

    /// Find or create the vertex for `key` and merge the key and its
    /// resolved records into it.
    ///
    /// Lookup order:
    ///
    /// 1. a vertex already holding a matching key, by criterion priority;
    /// 2. a vertex holding one of the records `catalog` resolves the key to;
    /// 3. a new vertex.
    pub fn add_vertex_for_key<C>(&mut self, key: &IdentityKey, catalog: &C) -> VertexId
    where
        C: IdentityResolver + RecordStore + ?Sized,
    {
        let records: Vec<ImageRecord> = catalog
            .resolve(key)
            .into_iter()
            .filter_map(|id| catalog.record(id))
            .collect();

        let v = self
            .find_vertex_for_key(key)
            .or_else(|| self.find_vertex_for_records(&records))
            .unwrap_or_else(|| self.graph.add_vertex());

        if let Some(props) = self.graph.properties_mut(v) {
            props.merge_key(key.clone());
            for record in records {
                props.merge_record(record);
            }
        }
        v
    }

    /// One vertex for all valid `keys`. Keys that resolve to different
    /// existing vertices pull those vertices together. `None` when no key
    /// is valid.
    pub fn add_vertex_for_keys<C>(&mut self, keys: &[IdentityKey], catalog: &C) -> Option<VertexId>
    where
        C: IdentityResolver + RecordStore + ?Sized,
    {
        let mut target: Option<VertexId> = None;
        for key in keys {
            if !key.is_valid() {
                debug!(%key, "skipping identity key without usable fields");
                continue;
            }
            let v = self.add_vertex_for_key(key, catalog);
            target = match target {
                Some(t) if t != v => {
                    self.merge_vertices(t, v);
                    Some(t)
                }
                _ => Some(v),
            };
        }
        target
    }

    /// Find or create the vertex for an existing record. `None` (logged)
    /// when `catalog` has no such record.
    pub fn add_vertex_for_record<C>(&mut self, id: ImageId, catalog: &C) -> Option<VertexId>
    where
        C: RecordStore + ?Sized,
    {
        if let Some(v) = self.vertex_for_image(id) {
            return Some(v);
        }
        let Some(record) = catalog.record(id) else {
            warn!(image = %id, "no record found for image id");
            return None;
        };
        let key = record.identity();
        let v = self
            .find_vertex_for_records(std::slice::from_ref(&record))
            .or_else(|| self.find_vertex_for_key(&key))
            .unwrap_or_else(|| self.graph.add_vertex());
        if let Some(props) = self.graph.properties_mut(v) {
            props.merge_key(key);
            props.merge_record(record);
        }
        Some(v)
    }

    /// Record that `newer` was derived from `older` through `actions`.
    ///
    /// Reuses an existing edge, appending actions it does not have yet.
    /// Returns `None` for self-loops and unknown vertices.
    pub fn connect(&mut self, newer: VertexId, older: VertexId, actions: &[FilterAction]) -> Option<EdgeId> {
        let (u, v) = match self.orientation() {
            Orientation::ChildToParent => (newer, older),
            Orientation::ParentToChild => (older, newer),
        };
        let e = self.graph.add_edge(u, v)?;
        if let Some(props) = self.graph.edge_properties_mut(e) {
            props.merge_actions(actions);
        }
        Some(e)
    }

    /// Move every edge and all data of `gone` onto `keep`, then remove
    /// `gone`. Edges that would become self-loops are dropped.
    pub fn merge_vertices(&mut self, keep: VertexId, gone: VertexId) {
        if keep == gone || !self.graph.contains_vertex(keep) {
            return;
        }
        debug!(%keep, %gone, "merging vertices that denote the same image");
        for e in self.graph.edges_of(gone, Adjacency::All) {
            let Some((s, t)) = self.graph.endpoints(e) else {
                continue;
            };
            let actions = self
                .graph
                .edge_properties(e)
                .map(|p| p.actions.clone())
                .unwrap_or_default();
            let s = if s == gone { keep } else { s };
            let t = if t == gone { keep } else { t };
            if s == t {
                continue;
            }
            if let Some(moved) = self.graph.add_edge(s, t) {
                if let Some(props) = self.graph.edge_properties_mut(moved) {
                    props.merge_actions(&actions);
                }
            }
        }
        if let Some(props) = self.graph.remove_vertex(gone) {
            if let Some(kept) = self.graph.properties_mut(keep) {
                kept.absorb(props);
            }
        }
    }

    /// Add a linear history, oldest entry first, followed by `subject`.
    ///
    /// Actions accumulate until an entry refers to a saved file; they then
    /// label the edge from the previous saved state to that file. Actions
    /// before the first saved state have no source image and are dropped.
    /// An entry that resolves to the previous state is a broken history and
    /// adds no edge.
    #[instrument(level = "debug", skip_all, fields(entries = entries.len()))]
    pub fn add_history<C>(&mut self, entries: &[HistoryEntry], subject: HistorySubject<'_>, catalog: &C)
    where
        C: IdentityResolver + RecordStore + ?Sized,
    {
        let mut last: Option<VertexId> = None;
        let mut pending: Vec<FilterAction> = Vec::new();

        for entry in entries {
            if let Some(action) = &entry.action {
                pending.push(action.clone());
            }
            if let Some(current) = self.add_vertex_for_keys(&entry.referred, catalog) {
                self.step(&mut last, current, &mut pending);
            }
        }

        let current = match subject {
            HistorySubject::None => None,
            HistorySubject::Key(key) => key.is_valid().then(|| self.add_vertex_for_key(key, catalog)),
            HistorySubject::Record(id) => self.add_vertex_for_record(id, catalog),
        };
        if let Some(current) = current {
            self.step(&mut last, current, &mut pending);
        }
    }

    fn step(&mut self, last: &mut Option<VertexId>, current: VertexId, pending: &mut Vec<FilterAction>) {
        match *last {
            None if !pending.is_empty() => {
                debug!(dropped = pending.len(), "actions recorded before the first known image");
            }
            Some(previous) if previous == current => {
                warn!(vertex = %current, "broken history: refusing to add a loop");
            }
            Some(previous) => {
                self.connect(current, previous, pending);
            }
            None => {}
        }
        pending.clear();
        *last = Some(current);
    }

    /// Add "subject derived from object" pairs between existing records.
    ///
    /// Self-references, pairs naming unknown records and pairs whose ends
    /// already share a vertex are skipped with a warning.
    #[instrument(level = "debug", skip_all, fields(pairs = pairs.len()))]
    pub fn add_relations<C>(&mut self, pairs: &[RelationPair], catalog: &C)
    where
        C: RecordStore + ?Sized,
    {
        for pair in pairs {
            if pair.is_self_reference() {
                warn!(image = %pair.subject, "skipping self-referencing relation");
                continue;
            }
            let Some(subject) = self.add_vertex_for_record(pair.subject, catalog) else {
                continue;
            };
            let Some(object) = self.add_vertex_for_record(pair.object, catalog) else {
                continue;
            };
            if subject == object {
                warn!(
                    subject = %pair.subject,
                    object = %pair.object,
                    "skipping relation between copies of the same image"
                );
                continue;
            }
            self.connect(subject, object, &[]);
        }
    }

    // -----------------------------------------------------------------------
    // Maintenance
    // -----------------------------------------------------------------------

    /// Replace the graph with its transitive reduction.
    ///
    /// Removed edges that carried actions are reported and logged as
    /// conflicts. A graph with a cycle is left untouched.
    #[instrument(level = "debug", skip_all)]
    pub fn reduce_edges(&mut self) -> ReductionReport {
        let reduction = self.graph.transitive_reduction();
        if !reduction.acyclic {
            warn!("history graph is not a DAG; keeping all edges");
            return ReductionReport::default();
        }

        let mut conflicts = Vec::new();
        for &e in &reduction.removed {
            let (Some((source, target)), Some(props)) = (self.graph.endpoints(e), self.graph.edge_properties(e))
            else {
                continue;
            };
            if props.is_empty() {
                continue;
            }
            // TODO: reconcile dropped actions with the path that replaces the edge
            warn!(
                %source,
                %target,
                actions = props.actions.len(),
                "transitive reduction dropped an edge carrying actions"
            );
            conflicts.push(ReductionConflict {
                source,
                target,
                actions: props.actions.clone(),
            });
        }

        let removed = reduction.removed.len();
        self.graph = reduction.graph;
        debug!(removed, conflicts = conflicts.len(), "edges reduced");
        ReductionReport {
            applied: true,
            removed,
            conflicts,
        }
    }

    /// `true` if some vertex has no resolved record.
    #[must_use]
    pub fn has_unresolved_entries(&self) -> bool {
        self.graph.find_vertex_by(|v| !v.is_resolved()).is_some()
    }

    /// Remove every vertex without a resolved record, splicing each of its
    /// root-ward neighbours to each of its leaf-ward neighbours. Spliced
    /// edges carry the root-ward actions followed by the leaf-ward ones.
    /// Returns the number of removed vertices.
    pub fn drop_unresolved_entries(&mut self) -> usize {
        let mut removed = 0;
        let mut cursor = 0;
        while let Some(v) = self.next_unresolved(cursor) {
            cursor = v.index();
            self.splice_out(v);
            removed += 1;
        }
        if removed > 0 {
            debug!(removed, "dropped unresolved history entries");
        }
        removed
    }

    /// First unresolved vertex with slot index `from` or above. Removals
    /// never shift slots, so a scan can resume where the last one stopped.
    fn next_unresolved(&self, from: usize) -> Option<VertexId> {
        self.graph
            .vertices()
            .filter(|v| v.index() >= from)
            .find(|&v| self.graph.properties(v).is_some_and(|p| !p.is_resolved()))
    }

    fn splice_out(&mut self, v: VertexId) {
        let older = self.neighbour_actions(v, Adjacency::TowardRoot);
        let newer = self.neighbour_actions(v, Adjacency::TowardLeaf);
        for (parent, before) in &older {
            for (child, after) in &newer {
                let mut actions = before.clone();
                actions.extend(after.iter().cloned());
                self.connect(*child, *parent, &actions);
            }
        }
        self.graph.remove_vertex(v);
    }

    /// Neighbours of `v` in direction `adjacency`, with the actions on the
    /// connecting edge.
    fn neighbour_actions(&self, v: VertexId, adjacency: Adjacency) -> Vec<(VertexId, Vec<FilterAction>)> {
        self.graph
            .edges_of(v, adjacency)
            .into_iter()
            .filter_map(|e| {
                let (s, t) = self.graph.endpoints(e)?;
                let other = if s == v { t } else { s };
                let actions = self.graph.edge_properties(e)?.actions.clone();
                Some((other, actions))
            })
            .collect()
    }

    /// Order every vertex's records by proximity to `subject`.
    pub fn sort_for_info(&mut self, subject: &ImageRecord) {
        let vertices: Vec<VertexId> = self.graph.vertices().collect();
        for v in vertices {
            if let Some(props) = self.graph.properties_mut(v) {
                super::proximity::sort_by_proximity(subject, &mut props.records);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Export
    // -----------------------------------------------------------------------

    /// Every (descendant, ancestor) record pair implied by the graph.
    ///
    /// One pair per record combination across each transitive-closure edge.
    #[instrument(level = "debug", skip_all)]
    #[must_use]
    pub fn relation_cloud(&self) -> Vec<RelationPair> {
        let closure = self.graph.transitive_closure(CopyFlags::NONE);
        let mut pairs = BTreeSet::new();
        for e in closure.edges() {
            let Some((s, t)) = closure.endpoints(e) else {
                continue;
            };
            let (newer, older) = match self.orientation() {
                Orientation::ChildToParent => (s, t),
                Orientation::ParentToChild => (t, s),
            };
            let (Some(newer), Some(older)) = (self.graph.properties(newer), self.graph.properties(older)) else {
                continue;
            };
            for subject in &newer.records {
                for object in &older.records {
                    if subject.id != object.id {
                        pairs.insert(RelationPair::derived_from(subject.id, object.id));
                    }
                }
            }
        }
        pairs.into_iter().collect()
    }

    /// Debug rendering, one line per vertex.
    #[must_use]
    pub fn debug_string(&self) -> String {
        self.graph.render(|_, v| v.label())
    }
}

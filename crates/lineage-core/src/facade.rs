//! The entry point applications use to build and query image histories.
//!
//! # Overview
//!
//! [`ImageHistoryGraph`] is a cheap-to-clone handle around
//! [`HistoryGraphData`]. Clones share the data until one of them mutates;
//! every mutator goes through [`ImageHistoryGraph::data_mut`], which copies
//! the data first if another handle still refers to it.
//!
//! A history view typically calls [`ImageHistoryGraph::from_record`], which
//! loads the stored relation cloud and histories around an image and runs
//! [`ImageHistoryGraph::prepare_for_display`].

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use lineage_graph::{Orientation, VertexId};
use tracing::{debug, info, instrument};

use crate::catalog::{IdentityResolver, ImageCatalog, RecordStore};
use crate::config::{DisplayConfig, HistoryConfig};
use crate::error::HistoryError;
use crate::history::data::{HistorySubject, ReductionReport};
use crate::history::{Category, HistoryEntry, HistoryGraphData};
use crate::identity::{IdentityKey, ImageId};
use crate::record::{ImageRecord, RelationPair};

/// What [`ImageHistoryGraph::prepare_for_display`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayReport {
    /// `None` when reduction was disabled.
    pub reduction: Option<ReductionReport>,
    pub dropped_unresolved: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ImageHistoryGraph {
    data: Arc<HistoryGraphData>,
}

impl ImageHistoryGraph {
    #[must_use]
    pub fn new(orientation: Orientation) -> Self {
        Self {
            data: Arc::new(HistoryGraphData::new(orientation)),
        }
    }

    #[must_use]
    pub fn data(&self) -> &HistoryGraphData {
        &self.data
    }

    /// Mutable access, copying the data first if it is shared.
    pub fn data_mut(&mut self) -> &mut HistoryGraphData {
        if Arc::strong_count(&self.data) > 1 {
            debug!("history graph is shared; copying before write");
        }
        Arc::make_mut(&mut self.data)
    }

    /// `true` if both handles refer to the same data.
    #[must_use]
    pub fn shares_data_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    // -----------------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------------

    /// Load the history around `id` the way a history view shows it.
    ///
    /// Pulls the stored relation cloud, the subject's stored history and
    /// the stored histories of every leaf, as enabled in
    /// `config.loading`, then prepares the graph for display. A subject
    /// without any history yields a single-vertex graph.
    ///
    /// # Errors
    ///
    /// [`HistoryError::RecordNotFound`] if `catalog` has no record for `id`.
    #[instrument(skip(catalog, config))]
    pub fn from_record<C>(id: ImageId, catalog: &C, config: &HistoryConfig) -> Result<Self, HistoryError>
    where
        C: ImageCatalog + ?Sized,
    {
        let subject = catalog.record(id).ok_or(HistoryError::RecordNotFound(id))?;
        let mut graph = Self::new(config.orientation);

        if config.loading.relation_cloud {
            graph.add_relations(&catalog.stored_relations(id), catalog);
        }
        if config.loading.subject_history {
            graph.add_scanned_history(&catalog.stored_history(id), id, catalog);
        }
        if config.loading.leaves_history {
            let leaves: Vec<ImageId> = graph
                .leaf_images()
                .into_iter()
                .map(|r| r.id)
                .filter(|&leaf| leaf != id)
                .collect();
            for leaf in leaves {
                let history = catalog.stored_history(leaf);
                if !history.is_empty() {
                    graph.add_scanned_history(&history, leaf, catalog);
                }
            }
        }
        if graph.is_empty() {
            graph.data_mut().add_vertex_for_record(id, catalog);
        }

        graph.prepare_for_display(&subject, &config.display);
        info!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            "history graph loaded"
        );
        Ok(graph)
    }

    /// Add a linear history, oldest entry first. `subject` is the image
    /// the history belongs to and becomes its newest state.
    pub fn add_history<C>(&mut self, history: &[HistoryEntry], subject: Option<&IdentityKey>, catalog: &C)
    where
        C: IdentityResolver + RecordStore + ?Sized,
    {
        let subject = subject.map_or(HistorySubject::None, HistorySubject::Key);
        self.data_mut().add_history(history, subject, catalog);
    }

    /// Add the history read from a newly scanned image `id`.
    pub fn add_scanned_history<C>(&mut self, history: &[HistoryEntry], id: ImageId, catalog: &C)
    where
        C: IdentityResolver + RecordStore + ?Sized,
    {
        self.data_mut()
            .add_history(history, HistorySubject::Record(id), catalog);
    }

    /// Add "subject derived from object" pairs between existing records.
    pub fn add_relations<C>(&mut self, pairs: &[RelationPair], catalog: &C)
    where
        C: RecordStore + ?Sized,
    {
        if pairs.is_empty() {
            return;
        }
        self.data_mut().add_relations(pairs, catalog);
    }

    pub fn clear(&mut self) {
        self.data = Arc::new(HistoryGraphData::new(self.data.orientation()));
    }

    // -----------------------------------------------------------------------
    // Maintenance
    // -----------------------------------------------------------------------

    /// Simplify after building: transitive reduction only.
    ///
    /// Unresolved entries stay and records keep their order. Dropping the
    /// former and sorting the latter belong to
    /// [`ImageHistoryGraph::prepare_for_display`].
    pub fn finish(&mut self) -> ReductionReport {
        self.reduce_edges()
    }

    pub fn reduce_edges(&mut self) -> ReductionReport {
        self.data_mut().reduce_edges()
    }

    pub fn drop_unresolved_entries(&mut self) -> usize {
        if !self.has_unresolved_entries() {
            return 0;
        }
        self.data_mut().drop_unresolved_entries()
    }

    pub fn sort_for_info(&mut self, subject: &ImageRecord) {
        self.data_mut().sort_for_info(subject);
    }

    /// Reduce edges, drop unresolved entries and sort records by proximity
    /// to `subject`, each step as enabled in `options`.
    #[instrument(level = "debug", skip_all, fields(subject = %subject.id))]
    pub fn prepare_for_display(&mut self, subject: &ImageRecord, options: &DisplayConfig) -> DisplayReport {
        let reduction = options.reduce_edges.then(|| self.reduce_edges());
        let dropped_unresolved = if options.drop_unresolved {
            self.drop_unresolved_entries()
        } else {
            0
        };
        if options.sort_for_info {
            self.sort_for_info(subject);
        }
        DisplayReport {
            reduction,
            dropped_unresolved,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.graph().is_empty()
    }

    #[must_use]
    pub fn is_single_vertex(&self) -> bool {
        self.data.graph().vertex_count() == 1
    }

    #[must_use]
    pub fn has_edges(&self) -> bool {
        self.data.graph().edge_count() > 0
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.data.graph().vertex_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.data.graph().edge_count()
    }

    #[must_use]
    pub fn has_unresolved_entries(&self) -> bool {
        self.data.has_unresolved_entries()
    }

    /// Records of every vertex, roots first in breadth-first order.
    #[must_use]
    pub fn all_images(&self) -> Vec<ImageRecord> {
        self.records_of(self.data.graph().vertices_breadth_first(None))
    }

    #[must_use]
    pub fn all_image_ids(&self) -> Vec<ImageId> {
        self.all_images().into_iter().map(|r| r.id).collect()
    }

    #[must_use]
    pub fn root_images(&self) -> Vec<ImageRecord> {
        self.records_of(self.data.graph().roots())
    }

    #[must_use]
    pub fn leaf_images(&self) -> Vec<ImageRecord> {
        self.records_of(self.data.graph().leaves())
    }

    #[must_use]
    pub fn categorize(&self) -> BTreeMap<VertexId, BTreeSet<Category>> {
        self.data.categorize()
    }

    /// Categories per record. Records sharing a vertex share its tags.
    #[must_use]
    pub fn categorize_images(&self) -> BTreeMap<ImageId, BTreeSet<Category>> {
        let mut out = BTreeMap::new();
        for (v, tags) in self.data.categorize() {
            if let Some(props) = self.data.properties(v) {
                for record in &props.records {
                    out.insert(record.id, tags.clone());
                }
            }
        }
        out
    }

    /// Records of every image whose only way back to the root passes
    /// through `id`, `id` included, in depth-first order.
    ///
    /// # Errors
    ///
    /// [`HistoryError::RecordNotFound`] if no vertex holds `id`.
    pub fn images_dominated_by(&self, id: ImageId) -> Result<Vec<ImageRecord>, HistoryError> {
        let graph = self.data.graph();
        let v = self
            .data
            .vertex_for_image(id)
            .ok_or(HistoryError::RecordNotFound(id))?;
        let Some(&root) = graph.roots_of(v).first() else {
            return Ok(Vec::new());
        };
        let first_id = |x: VertexId| {
            graph
                .properties(x)
                .and_then(|p| p.records.first())
                .map(|r| r.id)
        };
        let order = graph.vertices_dominated_by_sorted(v, root, |a, b| first_id(a).cmp(&first_id(b)))?;
        Ok(self.records_of(order))
    }

    #[must_use]
    pub fn relation_cloud(&self) -> Vec<RelationPair> {
        self.data.relation_cloud()
    }

    /// The relation cloud as two aligned vectors: subjects and objects.
    #[must_use]
    pub fn relation_cloud_parallel(&self) -> (Vec<ImageId>, Vec<ImageId>) {
        self.data
            .relation_cloud()
            .into_iter()
            .map(|p| (p.subject, p.object))
            .unzip()
    }

    #[must_use]
    pub fn debug_string(&self) -> String {
        self.data.debug_string()
    }

    fn records_of(&self, vertices: Vec<VertexId>) -> Vec<ImageRecord> {
        let mut seen: HashSet<ImageId> = HashSet::new();
        vertices
            .into_iter()
            .filter_map(|v| self.data.properties(v))
            .flat_map(|p| p.records.iter())
            .filter(|r| seen.insert(r.id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;

    fn catalog() -> MemoryCatalog {
        let mut c = MemoryCatalog::new();
        for id in 1..=3 {
            c.insert_record(ImageRecord::new(ImageId(id), "/p", format!("{id}.jpg")), []);
        }
        c
    }

    #[test]
    fn clones_share_until_written() {
        let c = catalog();
        let mut a = ImageHistoryGraph::default();
        a.add_relations(&[RelationPair::derived_from(ImageId(2), ImageId(1))], &c);

        let mut b = a.clone();
        assert!(a.shares_data_with(&b));

        b.add_relations(&[RelationPair::derived_from(ImageId(3), ImageId(2))], &c);
        assert!(!a.shares_data_with(&b));
        assert_eq!(a.vertex_count(), 2);
        assert_eq!(b.vertex_count(), 3);
    }

    #[test]
    fn finish_only_reduces() {
        let c = catalog();
        let mut g = ImageHistoryGraph::default();
        let key = |name: &str| IdentityKey::default().with_location("/p", name);
        let blur = crate::action::FilterAction::new("blur", 1);
        g.add_history(
            &[
                HistoryEntry::file(key("1.jpg")),
                HistoryEntry::step(blur.clone(), key("missing.jpg")),
                HistoryEntry::step(blur, key("2.jpg")),
            ],
            None,
            &c,
        );

        assert!(g.finish().applied);
        assert!(g.has_unresolved_entries());
        assert_eq!(g.vertex_count(), 3);

        let report = g.prepare_for_display(&ImageRecord::new(ImageId(2), "/p", "2.jpg"), &DisplayConfig::default());
        assert_eq!(report.dropped_unresolved, 1);
        assert!(!g.has_unresolved_entries());
    }

    #[test]
    fn clear_keeps_orientation() {
        let c = catalog();
        let mut g = ImageHistoryGraph::new(Orientation::ParentToChild);
        g.add_relations(&[RelationPair::derived_from(ImageId(2), ImageId(1))], &c);
        g.clear();
        assert!(g.is_empty());
        assert_eq!(g.data().orientation(), Orientation::ParentToChild);
    }

    #[test]
    fn parallel_cloud_is_aligned() {
        let c = catalog();
        let mut g = ImageHistoryGraph::default();
        g.add_relations(
            &[
                RelationPair::derived_from(ImageId(2), ImageId(1)),
                RelationPair::derived_from(ImageId(3), ImageId(2)),
            ],
            &c,
        );
        let (subjects, objects) = g.relation_cloud_parallel();
        assert_eq!(subjects, vec![ImageId(2), ImageId(3), ImageId(3)]);
        assert_eq!(objects, vec![ImageId(1), ImageId(1), ImageId(2)]);
    }

    #[test]
    fn unknown_image_is_not_dominated() {
        let g = ImageHistoryGraph::default();
        let err = g.images_dominated_by(ImageId(7)).expect_err("no such image");
        assert_eq!(err.code(), "E2001");
    }
}

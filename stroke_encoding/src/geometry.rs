// Copyright 2024 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::ops::Range;

use crate::StrokeVertex;

/// Classification of stroke vertices produced by the tessellator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointSet {
    Edge,
    RoundedJoin,
    BevelJoin,
    MiterJoin,
    /// Joins drawn as caps, where an open contour meets a dash boundary.
    CapJoin,
    SquareCap,
    RoundedCap,
    AdjustableCap,
}

impl PointSet {
    /// Number of point set kinds.
    pub const COUNT: usize = 8;

    /// Every point set kind.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Edge,
        Self::RoundedJoin,
        Self::BevelJoin,
        Self::MiterJoin,
        Self::CapJoin,
        Self::SquareCap,
        Self::RoundedCap,
        Self::AdjustableCap,
    ];

    /// Point sets that have per-join ranges.
    pub const JOINS: [Self; 4] = [
        Self::RoundedJoin,
        Self::BevelJoin,
        Self::MiterJoin,
        Self::CapJoin,
    ];

    /// Point sets for caps. Caps are never part of a closed contour.
    pub const CAPS: [Self; 3] = [Self::SquareCap, Self::RoundedCap, Self::AdjustableCap];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn is_join(self) -> bool {
        matches!(
            self,
            Self::RoundedJoin | Self::BevelJoin | Self::MiterJoin | Self::CapJoin
        )
    }

    pub const fn is_cap(self) -> bool {
        matches!(
            self,
            Self::SquareCap | Self::RoundedCap | Self::AdjustableCap
        )
    }
}

/// Source of tessellated stroke geometry.
///
/// Every point set comes in two variants, with and without the closing
/// edges of closed contours. The variant without closing edge must be laid
/// out inside the one with it as follows:
///
/// * its vertices are a prefix of the vertices with closing edge,
/// * its indices are a suffix of the indices with closing edge.
///
/// Index values refer to positions in the vertex sequence of their variant.
/// Per-join ranges are given relative to the variant with closing edge.
pub trait StrokeGeometry {
    /// Vertices of a point set.
    fn vertices(&self, set: PointSet, closing_edge: bool) -> &[StrokeVertex];

    /// Triangle indices of a point set.
    fn indices(&self, set: PointSet, closing_edge: bool) -> &[u32];

    /// Number of contours of the path.
    fn contour_count(&self) -> u32;

    /// Number of joins of a contour.
    fn join_count(&self, contour: u32) -> u32;

    /// Range into `vertices(set, true)` of a single join.
    fn vertex_range(&self, set: PointSet, contour: u32, join: u32) -> Range<u32>;

    /// Range into `indices(set, true)` of a single join.
    fn index_range(&self, set: PointSet, contour: u32, join: u32) -> Range<u32>;

    /// Number of depth layers needed to draw a point set without
    /// self-overlap artifacts.
    fn layer_count(&self, set: PointSet, closing_edge: bool) -> u32;

    /// Sum of the join counts of all contours.
    fn total_join_count(&self) -> u32 {
        (0..self.contour_count()).map(|c| self.join_count(c)).sum()
    }
}

#[derive(Clone, Debug, Default)]
struct JoinRanges {
    vertices: Range<u32>,
    indices: Range<u32>,
}

#[derive(Clone, Debug, Default)]
struct PointSetData {
    vertices: Vec<StrokeVertex>,
    indices: Vec<u32>,
    open_vertex_count: usize,
    open_index_count: usize,
    layers: [u32; 2],
    /// Indexed by contour, then join.
    joins: Vec<Vec<JoinRanges>>,
}

impl PointSetData {
    fn join(&self, contour: u32, join: u32) -> Option<&JoinRanges> {
        self.joins.get(contour as usize)?.get(join as usize)
    }
}

/// In-memory stroke geometry, built with [`StrokedPathBuilder`].
#[derive(Clone, Debug, Default)]
pub struct StrokedPathData {
    sets: [PointSetData; PointSet::COUNT],
    join_counts: Vec<u32>,
}

impl StrokedPathData {
    /// Creates geometry with no contours and no points.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no point set has any vertex.
    pub fn is_empty(&self) -> bool {
        self.sets.iter().all(|set| set.vertices.is_empty())
    }
}

impl StrokeGeometry for StrokedPathData {
    fn vertices(&self, set: PointSet, closing_edge: bool) -> &[StrokeVertex] {
        let data = &self.sets[set.index()];
        if closing_edge {
            &data.vertices
        } else {
            &data.vertices[..data.open_vertex_count]
        }
    }

    fn indices(&self, set: PointSet, closing_edge: bool) -> &[u32] {
        let data = &self.sets[set.index()];
        if closing_edge {
            &data.indices
        } else {
            &data.indices[data.indices.len() - data.open_index_count..]
        }
    }

    fn contour_count(&self) -> u32 {
        self.join_counts.len() as u32
    }

    fn join_count(&self, contour: u32) -> u32 {
        self.join_counts.get(contour as usize).copied().unwrap_or(0)
    }

    fn vertex_range(&self, set: PointSet, contour: u32, join: u32) -> Range<u32> {
        self.sets[set.index()]
            .join(contour, join)
            .map_or(0..0, |j| j.vertices.clone())
    }

    fn index_range(&self, set: PointSet, contour: u32, join: u32) -> Range<u32> {
        self.sets[set.index()]
            .join(contour, join)
            .map_or(0..0, |j| j.indices.clone())
    }

    fn layer_count(&self, set: PointSet, closing_edge: bool) -> u32 {
        self.sets[set.index()].layers[usize::from(closing_edge)]
    }
}

/// A piece of geometry as handed over by the tessellator.
#[derive(Clone, Debug)]
struct Piece {
    join: Option<(u32, u32)>,
    closing_edge: bool,
    vertices: Vec<StrokeVertex>,
    indices: Vec<u32>,
}

/// Assembles [`StrokedPathData`] from tessellated pieces.
///
/// Pieces are pushed in any order with indices local to the piece. The
/// builder takes care of laying them out so the variant without closing
/// edge is a vertex prefix and an index suffix of the full point set. Each
/// piece counts as one depth layer.
#[derive(Clone, Debug, Default)]
pub struct StrokedPathBuilder {
    pieces: [Vec<Piece>; PointSet::COUNT],
    join_counts: Vec<u32>,
}

impl StrokedPathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new contour and returns its index.
    pub fn begin_contour(&mut self) -> u32 {
        self.join_counts.push(0);
        self.join_counts.len() as u32 - 1
    }

    /// Declares the number of joins of a contour, for contours where some
    /// joins produce no geometry.
    ///
    /// # Panics
    ///
    /// Panics if the contour was not started.
    pub fn set_join_count(&mut self, contour: u32, count: u32) {
        let slot = &mut self.join_counts[contour as usize];
        *slot = (*slot).max(count);
    }

    /// Adds the geometry of an edge.
    pub fn add_edge(&mut self, closing_edge: bool, vertices: &[StrokeVertex], indices: &[u32]) {
        self.push(PointSet::Edge, None, closing_edge, vertices, indices);
    }

    /// Adds the geometry of one join of a contour.
    ///
    /// # Panics
    ///
    /// Panics if `set` is not a join point set, if the contour was not
    /// started, or if the join was already added for this point set.
    pub fn add_join(
        &mut self,
        set: PointSet,
        contour: u32,
        join: u32,
        closing_edge: bool,
        vertices: &[StrokeVertex],
        indices: &[u32],
    ) {
        assert!(set.is_join(), "{set:?} is not a join point set");
        assert!(
            !self.pieces[set.index()]
                .iter()
                .any(|p| p.join == Some((contour, join))),
            "join {join} of contour {contour} added twice to {set:?}"
        );
        self.set_join_count(contour, join + 1);
        self.push(set, Some((contour, join)), closing_edge, vertices, indices);
    }

    /// Adds the geometry of a cap.
    ///
    /// # Panics
    ///
    /// Panics if `set` is not a cap point set.
    pub fn add_cap(&mut self, set: PointSet, vertices: &[StrokeVertex], indices: &[u32]) {
        assert!(set.is_cap(), "{set:?} is not a cap point set");
        self.push(set, None, false, vertices, indices);
    }

    fn push(
        &mut self,
        set: PointSet,
        join: Option<(u32, u32)>,
        closing_edge: bool,
        vertices: &[StrokeVertex],
        indices: &[u32],
    ) {
        assert!(
            indices.iter().all(|&i| (i as usize) < vertices.len()),
            "index out of range for a piece of {} vertices",
            vertices.len()
        );
        self.pieces[set.index()].push(Piece {
            join,
            closing_edge,
            vertices: vertices.to_vec(),
            indices: indices.to_vec(),
        });
    }

    pub fn build(self) -> StrokedPathData {
        let join_counts = self.join_counts;
        let mut sets: [PointSetData; PointSet::COUNT] = Default::default();
        for (data, pieces) in sets.iter_mut().zip(self.pieces) {
            *data = layout_point_set(pieces, &join_counts);
        }
        StrokedPathData { sets, join_counts }
    }
}

fn layout_point_set(pieces: Vec<Piece>, join_counts: &[u32]) -> PointSetData {
    let (closing, open): (Vec<_>, Vec<_>) = pieces.into_iter().partition(|p| p.closing_edge);
    let mut data = PointSetData {
        joins: join_counts
            .iter()
            .map(|&n| vec![JoinRanges::default(); n as usize])
            .collect(),
        layers: [open.len() as u32, (open.len() + closing.len()) as u32],
        ..Default::default()
    };

    // Vertices: open pieces, then closing pieces.
    let mut vertex_bases = Vec::with_capacity(open.len() + closing.len());
    for piece in open.iter().chain(&closing) {
        vertex_bases.push(data.vertices.len() as u32);
        data.vertices.extend_from_slice(&piece.vertices);
    }
    data.open_vertex_count = open.iter().map(|p| p.vertices.len()).sum();
    data.open_index_count = open.iter().map(|p| p.indices.len()).sum();

    // Indices: closing pieces, then open pieces.
    let (open_bases, closing_bases) = vertex_bases.split_at(open.len());
    for (piece, &base) in closing.iter().zip(closing_bases).chain(open.iter().zip(open_bases)) {
        let index_start = data.indices.len() as u32;
        data.indices.extend(piece.indices.iter().map(|i| i + base));
        if let Some((contour, join)) = piece.join {
            data.joins[contour as usize][join as usize] = JoinRanges {
                vertices: base..base + piece.vertices.len() as u32,
                indices: index_start..data.indices.len() as u32,
            };
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: f32) -> StrokeVertex {
        StrokeVertex {
            position: [x, 0.0],
            ..Default::default()
        }
    }

    #[test]
    fn empty_geometry() {
        let path = StrokedPathBuilder::new().build();
        assert!(path.is_empty());
        assert_eq!(path.contour_count(), 0);
        assert_eq!(path.total_join_count(), 0);
        for set in PointSet::ALL {
            assert!(path.vertices(set, true).is_empty());
            assert!(path.indices(set, false).is_empty());
            assert_eq!(path.layer_count(set, true), 0);
        }
    }

    #[test]
    fn closing_pieces_split_as_prefix_and_suffix() {
        let mut builder = StrokedPathBuilder::new();
        builder.add_edge(true, &[vertex(9.0), vertex(10.0), vertex(11.0)], &[0, 1, 2]);
        builder.add_edge(false, &[vertex(0.0), vertex(1.0), vertex(2.0)], &[2, 1, 0]);
        let path = builder.build();

        let with = path.vertices(PointSet::Edge, true);
        let without = path.vertices(PointSet::Edge, false);
        assert_eq!(with.len(), 6);
        assert_eq!(without, &with[..3]);
        assert_eq!(without[0].position[0], 0.0);

        // The closing edge's triangle comes first, rebased past the open edge.
        assert_eq!(path.indices(PointSet::Edge, true), &[3, 4, 5, 2, 1, 0]);
        assert_eq!(path.indices(PointSet::Edge, false), &[2, 1, 0]);
        assert_eq!(path.layer_count(PointSet::Edge, true), 2);
        assert_eq!(path.layer_count(PointSet::Edge, false), 1);
    }

    #[test]
    fn join_ranges() {
        let mut builder = StrokedPathBuilder::new();
        let c0 = builder.begin_contour();
        let c1 = builder.begin_contour();
        let tri = [vertex(0.0), vertex(1.0), vertex(2.0)];
        builder.add_join(PointSet::MiterJoin, c0, 0, false, &tri, &[0, 1, 2]);
        builder.add_join(PointSet::MiterJoin, c0, 1, true, &tri[..2], &[0, 1, 1]);
        builder.add_join(PointSet::MiterJoin, c1, 0, false, &tri, &[2, 1, 0]);
        let path = builder.build();

        assert_eq!(path.contour_count(), 2);
        assert_eq!(path.join_count(c0), 2);
        assert_eq!(path.join_count(c1), 1);
        assert_eq!(path.total_join_count(), 3);

        assert_eq!(path.vertex_range(PointSet::MiterJoin, c0, 0), 0..3);
        assert_eq!(path.vertex_range(PointSet::MiterJoin, c1, 0), 3..6);
        assert_eq!(path.vertex_range(PointSet::MiterJoin, c0, 1), 6..8);
        assert_eq!(path.index_range(PointSet::MiterJoin, c0, 1), 0..3);
        assert_eq!(path.index_range(PointSet::MiterJoin, c0, 0), 3..6);
        assert_eq!(path.index_range(PointSet::MiterJoin, c1, 0), 6..9);
        assert_eq!(&path.indices(PointSet::MiterJoin, true)[6..9], &[5, 4, 3]);

        // Joins never added to a point set have empty ranges.
        assert_eq!(path.vertex_range(PointSet::BevelJoin, c0, 1), 0..0);
        assert_eq!(path.index_range(PointSet::BevelJoin, c1, 0), 0..0);
    }

    #[test]
    #[should_panic(expected = "is not a cap point set")]
    fn caps_only_in_cap_sets() {
        StrokedPathBuilder::new().add_cap(PointSet::Edge, &[], &[]);
    }
}

// Copyright 2024 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bytemuck::{Pod, Zeroable};
use peniko::kurbo::{Cap, Join};

/// Number of join kinds that get per-join chunks: rounded, bevel, miter
/// and cap-joins.
pub const NUMBER_JOIN_TYPES: u32 = 4;

/// Identifier of a chunk of stroking data.
///
/// The first [`ChunkId::STATIC_COUNT`] values name whole point sets. The id
/// [`ChunkId::EMPTY`] never holds data. Ids past it address individual joins,
/// see [`ChunkId::named_join`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct ChunkId(pub u32);

impl ChunkId {
    /// Rounded joins, including the joins of the closing edge.
    pub const ROUNDED_JOINS_CLOSING_EDGE: Self = Self(0);
    /// Bevel joins, including the joins of the closing edge.
    pub const BEVEL_JOINS_CLOSING_EDGE: Self = Self(1);
    /// Miter joins, including the joins of the closing edge.
    pub const MITER_JOINS_CLOSING_EDGE: Self = Self(2);
    /// Cap-joins, including the joins of the closing edge.
    pub const CAP_JOINS_CLOSING_EDGE: Self = Self(3);
    /// Edges, including the closing edge.
    pub const EDGE_CLOSING_EDGE: Self = Self(4);

    /// Number of ids with a closing edge. Adding it to one of the ids above
    /// gives the variant without closing edge.
    pub const NUMBER_WITH_CLOSING_EDGE: u32 = 5;

    /// Rounded joins without the joins of the closing edge.
    pub const ROUNDED_JOINS_NO_CLOSING_EDGE: Self = Self(5);
    /// Bevel joins without the joins of the closing edge.
    pub const BEVEL_JOINS_NO_CLOSING_EDGE: Self = Self(6);
    /// Miter joins without the joins of the closing edge.
    pub const MITER_JOINS_NO_CLOSING_EDGE: Self = Self(7);
    /// Cap-joins without the joins of the closing edge.
    pub const CAP_JOINS_NO_CLOSING_EDGE: Self = Self(8);
    /// Edges without the closing edge.
    pub const EDGE_NO_CLOSING_EDGE: Self = Self(9);

    /// Rounded caps.
    pub const ROUNDED_CAP: Self = Self(10);
    /// Square caps.
    pub const SQUARE_CAP: Self = Self(11);
    /// Caps whose length is adjusted by the shader, used by dashed stroking.
    pub const ADJUSTABLE_CAP: Self = Self(12);

    /// Number of static chunk ids.
    pub const STATIC_COUNT: u32 = 13;

    /// Chunk that is always empty.
    ///
    /// Drawing code looks this up instead of branching when nothing is to
    /// be drawn.
    pub const EMPTY: Self = Self(Self::STATIC_COUNT);

    /// Returns the id as an index into a chunk table.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` if this is one of the static ids.
    pub const fn is_static(self) -> bool {
        self.0 < Self::STATIC_COUNT
    }

    /// Returns the matching id without closing edge. Ids that have no
    /// closing edge variant are returned unchanged.
    #[must_use]
    pub const fn without_closing_edge(self) -> Self {
        if self.0 < Self::NUMBER_WITH_CLOSING_EDGE {
            Self(self.0 + Self::NUMBER_WITH_CLOSING_EDGE)
        } else {
            self
        }
    }

    /// Returns the per-join slot (0 to 3) of a static join id, for either
    /// closing edge variant.
    pub const fn join_type_offset(self) -> Option<u32> {
        match self {
            Self::ROUNDED_JOINS_CLOSING_EDGE | Self::ROUNDED_JOINS_NO_CLOSING_EDGE => Some(0),
            Self::BEVEL_JOINS_CLOSING_EDGE | Self::BEVEL_JOINS_NO_CLOSING_EDGE => Some(1),
            Self::MITER_JOINS_CLOSING_EDGE | Self::MITER_JOINS_NO_CLOSING_EDGE => Some(2),
            Self::CAP_JOINS_CLOSING_EDGE | Self::CAP_JOINS_NO_CLOSING_EDGE => Some(3),
            _ => None,
        }
    }

    /// Returns the chunk holding only the `join_number`'th join of the kind
    /// named by `join`.
    ///
    /// The chunk for join `J` of slot `t` is at
    /// `STATIC_COUNT + 1 + t + J * NUMBER_JOIN_TYPES`; the `+ 1` keeps
    /// [`ChunkId::EMPTY`] free.
    ///
    /// # Panics
    ///
    /// Panics if `join` is not one of the static join ids.
    pub fn named_join(join: Self, join_number: u32) -> Self {
        let Some(t) = join.join_type_offset() else {
            panic!("chunk {join:?} does not name a join type");
        };
        Self(Self::STATIC_COUNT + 1 + t + join_number * NUMBER_JOIN_TYPES)
    }

    /// Number of chunks needed for a path with `total_joins` joins summed
    /// over all its contours.
    pub const fn count_for_joins(total_joins: u32) -> u32 {
        Self::STATIC_COUNT + 1 + NUMBER_JOIN_TYPES * total_joins
    }
}

/// Cap style of a stroke.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CapStyle {
    /// Caps are not drawn.
    Flat,
    Rounded,
    Square,
}

impl From<Cap> for CapStyle {
    fn from(cap: Cap) -> Self {
        match cap {
            Cap::Butt => Self::Flat,
            Cap::Round => Self::Rounded,
            Cap::Square => Self::Square,
        }
    }
}

/// Join style of a stroke.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum JoinStyle {
    /// Joins are not drawn.
    NoJoins,
    Rounded,
    Bevel,
    Miter,
}

impl From<Join> for JoinStyle {
    fn from(join: Join) -> Self {
        match join {
            Join::Bevel => Self::Bevel,
            Join::Miter => Self::Miter,
            Join::Round => Self::Rounded,
        }
    }
}

/// Chunk for the caps of the given style.
pub fn cap_chunk(cap: CapStyle) -> ChunkId {
    match cap {
        CapStyle::Rounded => ChunkId::ROUNDED_CAP,
        CapStyle::Square => ChunkId::SQUARE_CAP,
        CapStyle::Flat => ChunkId::EMPTY,
    }
}

/// Chunk for the edges, with or without the closing edge.
pub fn edge_chunk(closing_edge: bool) -> ChunkId {
    if closing_edge {
        ChunkId::EDGE_CLOSING_EDGE
    } else {
        ChunkId::EDGE_NO_CLOSING_EDGE
    }
}

/// Chunk for all joins of the given style.
pub fn join_chunk(join: JoinStyle, closing_edge: bool) -> ChunkId {
    let chunk = match join {
        JoinStyle::Rounded => ChunkId::ROUNDED_JOINS_CLOSING_EDGE,
        JoinStyle::Bevel => ChunkId::BEVEL_JOINS_CLOSING_EDGE,
        JoinStyle::Miter => ChunkId::MITER_JOINS_CLOSING_EDGE,
        JoinStyle::NoJoins => return ChunkId::EMPTY,
    };
    if closing_edge {
        chunk
    } else {
        chunk.without_closing_edge()
    }
}

/// Chunk for all cap-joins.
pub fn cap_join_chunk(closing_edge: bool) -> ChunkId {
    if closing_edge {
        ChunkId::CAP_JOINS_CLOSING_EDGE
    } else {
        ChunkId::CAP_JOINS_NO_CLOSING_EDGE
    }
}

/// Lookup from drawing features to chunks.
///
/// Joins are numbered so that, for every contour, the two joins next to the
/// closing edge come after all other joins. Drawing without the closing edge
/// therefore only needs a prefix of the per-join chunks.
pub trait ChunkSelector {
    /// Chunk for caps of a given style.
    fn cap_chunk(&self, cap: CapStyle) -> ChunkId;

    /// Chunk for the adjustable caps used by dashed stroking.
    fn adjustable_cap_chunk(&self) -> ChunkId;

    /// Chunk for the edges.
    fn edge_chunk(&self, closing_edge: bool) -> ChunkId;

    /// Chunk for all joins of a style.
    fn join_chunk(&self, join: JoinStyle, closing_edge: bool) -> ChunkId;

    /// Chunk for the `join_number`'th join of a style.
    fn named_join_chunk(&self, join: JoinStyle, join_number: u32) -> ChunkId;

    /// Chunk for the `join_number`'th cap-join.
    fn chunk_from_cap_join(&self, join_number: u32) -> ChunkId;
}

/// The chunk layout produced by [`StrokeAttributeFiller`](crate::StrokeAttributeFiller).
#[derive(Copy, Clone, Debug, Default)]
pub struct StrokeChunkSelector;

impl ChunkSelector for StrokeChunkSelector {
    fn cap_chunk(&self, cap: CapStyle) -> ChunkId {
        cap_chunk(cap)
    }

    fn adjustable_cap_chunk(&self) -> ChunkId {
        ChunkId::ADJUSTABLE_CAP
    }

    fn edge_chunk(&self, closing_edge: bool) -> ChunkId {
        edge_chunk(closing_edge)
    }

    fn join_chunk(&self, join: JoinStyle, closing_edge: bool) -> ChunkId {
        join_chunk(join, closing_edge)
    }

    fn named_join_chunk(&self, join: JoinStyle, join_number: u32) -> ChunkId {
        match join_chunk(join, true) {
            ChunkId::EMPTY => ChunkId::EMPTY,
            chunk => ChunkId::named_join(chunk, join_number),
        }
    }

    fn chunk_from_cap_join(&self, join_number: u32) -> ChunkId {
        ChunkId::named_join(ChunkId::CAP_JOINS_CLOSING_EDGE, join_number)
    }
}

/// Sub-ranges of the vertex and index buffers belonging to one chunk.
///
/// Index values stored in the chunk's index range are relative to the start
/// of its vertex range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Zeroable, Pod)]
#[repr(C)]
pub struct Chunk {
    pub vertex_offset: u32,
    pub vertex_count: u32,
    pub index_offset: u32,
    pub index_count: u32,
}

impl Chunk {
    pub fn vertex_range(&self) -> std::ops::Range<usize> {
        let start = self.vertex_offset as usize;
        start..start + self.vertex_count as usize
    }

    pub fn index_range(&self) -> std::ops::Range<usize> {
        let start = self.index_offset as usize;
        start..start + self.index_count as usize
    }

    /// Returns `true` if the chunk has nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.index_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closing_edge_pairs() {
        assert_eq!(
            ChunkId::ROUNDED_JOINS_CLOSING_EDGE.without_closing_edge(),
            ChunkId::ROUNDED_JOINS_NO_CLOSING_EDGE
        );
        assert_eq!(
            ChunkId::EDGE_CLOSING_EDGE.without_closing_edge(),
            ChunkId::EDGE_NO_CLOSING_EDGE
        );
        assert_eq!(
            ChunkId::SQUARE_CAP.without_closing_edge(),
            ChunkId::SQUARE_CAP
        );
        assert_eq!(edge_chunk(true), ChunkId::EDGE_CLOSING_EDGE);
        assert_eq!(edge_chunk(false), ChunkId::EDGE_NO_CLOSING_EDGE);
    }

    #[test]
    fn unsupported_styles_are_empty() {
        assert_eq!(cap_chunk(CapStyle::Flat), ChunkId::EMPTY);
        assert_eq!(join_chunk(JoinStyle::NoJoins, true), ChunkId::EMPTY);
        assert_eq!(join_chunk(JoinStyle::NoJoins, false), ChunkId::EMPTY);
        assert_eq!(
            StrokeChunkSelector.named_join_chunk(JoinStyle::NoJoins, 3),
            ChunkId::EMPTY
        );
    }

    #[test]
    fn kurbo_styles() {
        assert_eq!(cap_chunk(Cap::Round.into()), ChunkId::ROUNDED_CAP);
        assert_eq!(cap_chunk(Cap::Square.into()), ChunkId::SQUARE_CAP);
        assert_eq!(cap_chunk(Cap::Butt.into()), ChunkId::EMPTY);
        assert_eq!(
            join_chunk(Join::Miter.into(), false),
            ChunkId::MITER_JOINS_NO_CLOSING_EDGE
        );
        assert_eq!(
            join_chunk(Join::Bevel.into(), true),
            ChunkId::BEVEL_JOINS_CLOSING_EDGE
        );
    }

    #[test]
    fn named_joins_skip_empty() {
        let first = ChunkId::named_join(ChunkId::ROUNDED_JOINS_CLOSING_EDGE, 0);
        assert_eq!(first, ChunkId(ChunkId::STATIC_COUNT + 1));
        assert_ne!(first, ChunkId::EMPTY);
        assert_eq!(
            ChunkId::named_join(ChunkId::CAP_JOINS_NO_CLOSING_EDGE, 2),
            ChunkId(ChunkId::STATIC_COUNT + 1 + 3 + 2 * NUMBER_JOIN_TYPES)
        );
        assert_eq!(
            StrokeChunkSelector.chunk_from_cap_join(5),
            ChunkId::named_join(ChunkId::CAP_JOINS_CLOSING_EDGE, 5)
        );
        assert_eq!(
            StrokeChunkSelector.named_join_chunk(JoinStyle::Miter, 1),
            ChunkId::named_join(ChunkId::MITER_JOINS_CLOSING_EDGE, 1)
        );
    }

    #[test]
    fn named_joins_are_distinct() {
        let joins = [
            ChunkId::ROUNDED_JOINS_CLOSING_EDGE,
            ChunkId::BEVEL_JOINS_CLOSING_EDGE,
            ChunkId::MITER_JOINS_CLOSING_EDGE,
            ChunkId::CAP_JOINS_CLOSING_EDGE,
        ];
        let total = 7;
        let mut seen = std::collections::BTreeSet::new();
        for j in 0..total {
            for join in joins {
                let id = ChunkId::named_join(join, j);
                assert!(id.0 > ChunkId::EMPTY.0);
                assert!(id.0 < ChunkId::count_for_joins(total));
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), (NUMBER_JOIN_TYPES * total) as usize);
    }

    #[test]
    fn static_region() {
        assert!(ChunkId::ROUNDED_JOINS_CLOSING_EDGE.is_static());
        assert!(ChunkId::ADJUSTABLE_CAP.is_static());
        assert!(!ChunkId::EMPTY.is_static());
        assert!(!ChunkId::named_join(ChunkId::ROUNDED_JOINS_CLOSING_EDGE, 0).is_static());
    }

    #[test]
    #[should_panic(expected = "does not name a join type")]
    fn named_join_rejects_edges() {
        let _ = ChunkId::named_join(ChunkId::EDGE_CLOSING_EDGE, 0);
    }
}

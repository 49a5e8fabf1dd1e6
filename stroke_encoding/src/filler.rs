// Copyright 2024 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    BufferSize, Chunk, ChunkId, Error, PackedVertex, PointSet, StrokeBufferSizes, StrokeGeometry,
    StrokeVertex,
};

/// Caps in the order they are copied, with their chunk.
const CAPS: [(PointSet, ChunkId); 3] = [
    (PointSet::SquareCap, ChunkId::SQUARE_CAP),
    (PointSet::RoundedCap, ChunkId::ROUNDED_CAP),
    (PointSet::AdjustableCap, ChunkId::ADJUSTABLE_CAP),
];

/// Point sets with a closing edge variant in the order they are copied, with
/// their chunk including the closing edge.
const CLOSABLE: [(PointSet, ChunkId); 5] = [
    (PointSet::Edge, ChunkId::EDGE_CLOSING_EDGE),
    (PointSet::BevelJoin, ChunkId::BEVEL_JOINS_CLOSING_EDGE),
    (PointSet::RoundedJoin, ChunkId::ROUNDED_JOINS_CLOSING_EDGE),
    (PointSet::MiterJoin, ChunkId::MITER_JOINS_CLOSING_EDGE),
    (PointSet::CapJoin, ChunkId::CAP_JOINS_CLOSING_EDGE),
];

/// Join point sets in the order their individual joins are emitted.
const NAMED_JOINS: [(PointSet, ChunkId); 4] = [
    (PointSet::RoundedJoin, ChunkId::ROUNDED_JOINS_CLOSING_EDGE),
    (PointSet::BevelJoin, ChunkId::BEVEL_JOINS_CLOSING_EDGE),
    (PointSet::MiterJoin, ChunkId::MITER_JOINS_CLOSING_EDGE),
    (PointSet::CapJoin, ChunkId::CAP_JOINS_CLOSING_EDGE),
];

/// Packs stroke geometry into vertex and index buffers.
///
/// Filling happens in two phases: [`sizes`](Self::sizes) tells how large the
/// buffers must be, then [`fill`](Self::fill) writes them exactly. Both read
/// the same geometry, which must not change in between.
#[derive(Clone, Copy, Debug)]
pub struct StrokeAttributeFiller<'a, G: ?Sized> {
    geometry: &'a G,
}

impl<'a, G: StrokeGeometry + ?Sized> StrokeAttributeFiller<'a, G> {
    pub fn new(geometry: &'a G) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &'a G {
        self.geometry
    }

    /// Computes the buffer sizes needed to fill the geometry.
    pub fn sizes(&self) -> StrokeBufferSizes {
        let g = self.geometry;
        let mut vertices = 0_u32;
        let mut indices = 0_u32;
        for set in PointSet::ALL {
            vertices = vertices.saturating_add(saturating_count(g.vertices(set, true).len()));
            indices = indices.saturating_add(saturating_count(g.indices(set, true).len()));
        }
        // Join indices appear twice: once with all joins of their kind and
        // once in the chunk of the individual join.
        for contour in 0..g.contour_count() {
            for join in 0..g.join_count(contour) {
                for set in PointSet::JOINS {
                    let range = g.index_range(set, contour, join);
                    indices = indices.saturating_add(range_len(&range));
                }
            }
        }
        let total_joins = g.total_join_count();
        StrokeBufferSizes {
            vertices: BufferSize::new(vertices),
            indices: BufferSize::new(indices),
            chunks: BufferSize::new(ChunkId::count_for_joins(total_joins)),
            depth: BufferSize::new(ChunkId::STATIC_COUNT),
            total_joins,
        }
    }

    /// Fills the vertex and index buffers and returns the chunk and depth
    /// tables describing them.
    ///
    /// The buffers must have exactly the lengths returned by
    /// [`sizes`](Self::sizes).
    pub fn try_fill(
        &self,
        vertices: &mut [PackedVertex],
        indices: &mut [u32],
    ) -> Result<StrokeChunks, Error> {
        let sizes = self.sizes();
        if vertices.len() != sizes.vertices.len() as usize {
            return Err(Error::VertexBufferSize {
                expected: sizes.vertices.len(),
                actual: vertices.len(),
            });
        }
        if indices.len() != sizes.indices.len() as usize {
            return Err(Error::IndexBufferSize {
                expected: sizes.indices.len(),
                actual: indices.len(),
            });
        }
        log::debug!("Filling stroke attributes:{sizes}");

        let g = self.geometry;
        let mut chunks = vec![Chunk::default(); sizes.chunks.len() as usize];
        let mut cursor = Cursor {
            vertices,
            indices,
            vertex_loc: 0,
            index_loc: 0,
        };

        for (set, chunk) in CAPS {
            chunks[chunk.index()] =
                cursor.grab(g.vertices(set, false), g.indices(set, false))?;
        }
        for (set, chunk) in CLOSABLE {
            let (with, without) = self.grab_closable(&mut cursor, set)?;
            chunks[chunk.index()] = with;
            chunks[chunk.without_closing_edge().index()] = without;
        }
        // Individual joins add no vertices, only a rebased copy of their
        // indices, so they come after all the blocks above.
        for (set, chunk) in NAMED_JOINS {
            let emitted = self.grab_joins(&mut cursor, &mut chunks, set, chunk)?;
            if emitted != sizes.total_joins {
                return Err(Error::SizeMismatch {
                    what: "joins",
                    sized: sizes.total_joins,
                    filled: emitted,
                });
            }
        }

        if cursor.vertex_loc != cursor.vertices.len() {
            return Err(Error::SizeMismatch {
                what: "vertices",
                sized: sizes.vertices.len(),
                filled: saturating_count(cursor.vertex_loc),
            });
        }
        if cursor.index_loc != cursor.indices.len() {
            return Err(Error::SizeMismatch {
                what: "indices",
                sized: sizes.indices.len(),
                filled: saturating_count(cursor.index_loc),
            });
        }

        let mut depth = vec![0; sizes.depth.len() as usize];
        for (set, chunk) in CLOSABLE {
            depth[chunk.index()] = g.layer_count(set, true);
            depth[chunk.without_closing_edge().index()] = g.layer_count(set, false);
        }
        for (set, chunk) in CAPS {
            depth[chunk.index()] = g.layer_count(set, false);
        }

        Ok(StrokeChunks { chunks, depth })
    }

    /// Like [`try_fill`](Self::try_fill), for callers treating any error as
    /// a bug.
    ///
    /// # Panics
    ///
    /// Panics if the buffers do not match [`sizes`](Self::sizes) or the
    /// geometry violates the [`StrokeGeometry`] layout contract.
    pub fn fill(&self, vertices: &mut [PackedVertex], indices: &mut [u32]) -> StrokeChunks {
        match self.try_fill(vertices, indices) {
            Ok(chunks) => chunks,
            Err(e) => panic!("Filling stroke attributes failed: {e}"),
        }
    }

    /// Copies a point set with its closing edge, and derives the chunk
    /// without closing edge from it.
    fn grab_closable(
        &self,
        cursor: &mut Cursor<'_>,
        set: PointSet,
    ) -> Result<(Chunk, Chunk), Error> {
        let g = self.geometry;
        let with = cursor.grab(g.vertices(set, true), g.indices(set, true))?;
        let open_vertices = saturating_count(g.vertices(set, false).len());
        let open_indices = saturating_count(g.indices(set, false).len());
        if open_vertices > with.vertex_count || open_indices > with.index_count {
            return Err(Error::ClosingEdgeOrder(set));
        }
        // Closing edge vertices come last and their indices first.
        let without = Chunk {
            vertex_offset: with.vertex_offset,
            vertex_count: open_vertices,
            index_offset: with.index_offset + (with.index_count - open_indices),
            index_count: open_indices,
        };
        Ok((with, without))
    }

    /// Emits one chunk per join of a point set, returning how many were
    /// emitted.
    fn grab_joins(
        &self,
        cursor: &mut Cursor<'_>,
        chunks: &mut [Chunk],
        set: PointSet,
        parent: ChunkId,
    ) -> Result<u32, Error> {
        let g = self.geometry;
        let block = chunks[parent.index()];
        let src = g.indices(set, true);
        let mut emitted = 0;
        for (join_number, (contour, join)) in join_order(g).enumerate() {
            let vertices = g.vertex_range(set, contour, join);
            let index_range = g.index_range(set, contour, join);
            let out_of_bounds = Error::JoinOutOfBounds { set, contour, join };
            if vertices.start > vertices.end || vertices.end > block.vertex_count {
                return Err(out_of_bounds);
            }
            let src = src
                .get(index_range.start as usize..index_range.end as usize)
                .ok_or(out_of_bounds)?;

            let id = ChunkId::named_join(parent, join_number as u32);
            let sized = chunks.len() as u32;
            let slot = chunks.get_mut(id.index()).ok_or(Error::SizeMismatch {
                what: "chunks",
                sized,
                filled: id.0 + 1,
            })?;

            let index_offset = cursor.index_loc as u32;
            let dst = cursor.take_indices(src.len())?;
            let local_len = vertices.end - vertices.start;
            for (d, &s) in dst.iter_mut().zip(src) {
                *d = s
                    .checked_sub(vertices.start)
                    .filter(|&i| i < local_len)
                    .ok_or_else(|| Error::JoinIndexOutOfRange {
                        set,
                        contour,
                        join,
                        index: s,
                        vertices: vertices.clone(),
                    })?;
            }
            *slot = Chunk {
                vertex_offset: block.vertex_offset + vertices.start,
                vertex_count: local_len,
                index_offset,
                index_count: src.len() as u32,
            };
            emitted += 1;
        }
        Ok(emitted)
    }
}

/// Order in which joins are numbered: the interior joins of every contour
/// first, then for every contour its last join followed by its second to
/// last one.
///
/// Placing the joins next to the closing edge at the end lets drawing
/// without closing edge use a prefix of the per-join chunks. A contour with a
/// single join contributes it in the second phase.
pub fn join_order<G: StrokeGeometry + ?Sized>(
    geometry: &G,
) -> impl Iterator<Item = (u32, u32)> + '_ {
    let contours = 0..geometry.contour_count();
    let interior = contours.clone().flat_map(move |c| {
        (0..geometry.join_count(c).saturating_sub(2)).map(move |j| (c, j))
    });
    let closing = contours.flat_map(move |c| {
        let n = geometry.join_count(c);
        (n.saturating_sub(2)..n).rev().map(move |j| (c, j))
    });
    interior.chain(closing)
}

fn range_len(range: &std::ops::Range<u32>) -> u32 {
    range.end.saturating_sub(range.start)
}

/// Converts a length to a GPU count. Lengths past `u32::MAX` saturate, so an
/// oversized source makes the fill overrun and fail instead of wrapping.
fn saturating_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Write positions into the output buffers.
struct Cursor<'b> {
    vertices: &'b mut [PackedVertex],
    indices: &'b mut [u32],
    vertex_loc: usize,
    index_loc: usize,
}

impl Cursor<'_> {
    fn grab(&mut self, src_vertices: &[StrokeVertex], src_indices: &[u32]) -> Result<Chunk, Error> {
        let vertex_offset = self.vertex_loc as u32;
        let index_offset = self.index_loc as u32;
        let dst = self.take_vertices(src_vertices.len())?;
        for (d, s) in dst.iter_mut().zip(src_vertices) {
            *d = PackedVertex::pack(s);
        }
        self.take_indices(src_indices.len())?
            .copy_from_slice(src_indices);
        Ok(Chunk {
            vertex_offset,
            vertex_count: src_vertices.len() as u32,
            index_offset,
            index_count: src_indices.len() as u32,
        })
    }

    fn take_vertices(&mut self, len: usize) -> Result<&mut [PackedVertex], Error> {
        let start = self.vertex_loc;
        let sized = saturating_count(self.vertices.len());
        let end = start.saturating_add(len);
        let dst = self
            .vertices
            .get_mut(start..end)
            .ok_or(Error::SizeMismatch {
                what: "vertices",
                sized,
                filled: saturating_count(end),
            })?;
        self.vertex_loc += len;
        Ok(dst)
    }

    fn take_indices(&mut self, len: usize) -> Result<&mut [u32], Error> {
        let start = self.index_loc;
        let sized = saturating_count(self.indices.len());
        let end = start.saturating_add(len);
        let dst = self
            .indices
            .get_mut(start..end)
            .ok_or(Error::SizeMismatch {
                what: "indices",
                sized,
                filled: saturating_count(end),
            })?;
        self.index_loc += len;
        Ok(dst)
    }
}

/// Chunk and depth tables produced by a fill.
///
/// Chunks refer to the buffers that were filled; they stay meaningful as
/// long as those buffers are not modified.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StrokeChunks {
    chunks: Vec<Chunk>,
    depth: Vec<u32>,
}

impl StrokeChunks {
    /// Returns the chunk with the given id. Ids past the end of the table
    /// give an empty chunk.
    pub fn chunk(&self, id: ChunkId) -> Chunk {
        self.chunks.get(id.index()).copied().unwrap_or_default()
    }

    /// The whole chunk table, indexed by [`ChunkId`].
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Number of depth layers of a static chunk, zero for any other chunk.
    pub fn depth(&self, id: ChunkId) -> u32 {
        self.depth.get(id.index()).copied().unwrap_or(0)
    }

    /// The depth table, indexed by static [`ChunkId`].
    pub fn depth_table(&self) -> &[u32] {
        &self.depth
    }

    /// The vertices of a chunk.
    pub fn vertices<'v>(&self, vertices: &'v [PackedVertex], id: ChunkId) -> &'v [PackedVertex] {
        &vertices[self.chunk(id).vertex_range()]
    }

    /// The indices of a chunk, relative to its vertices.
    pub fn indices<'i>(&self, indices: &'i [u32], id: ChunkId) -> &'i [u32] {
        &indices[self.chunk(id).index_range()]
    }
}

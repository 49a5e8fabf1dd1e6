// Copyright 2024 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Consistency checks for filled stroke data.

use crate::{ChunkId, StrokeChunks, NUMBER_JOIN_TYPES};

/// Static chunks that together own every vertex.
const OWNING_CHUNKS: [ChunkId; 8] = [
    ChunkId::ROUNDED_JOINS_CLOSING_EDGE,
    ChunkId::BEVEL_JOINS_CLOSING_EDGE,
    ChunkId::MITER_JOINS_CLOSING_EDGE,
    ChunkId::CAP_JOINS_CLOSING_EDGE,
    ChunkId::EDGE_CLOSING_EDGE,
    ChunkId::ROUNDED_CAP,
    ChunkId::SQUARE_CAP,
    ChunkId::ADJUSTABLE_CAP,
];

/// Parent chunk of a per-join chunk, by join slot.
const JOIN_PARENTS: [ChunkId; NUMBER_JOIN_TYPES as usize] = [
    ChunkId::ROUNDED_JOINS_CLOSING_EDGE,
    ChunkId::BEVEL_JOINS_CLOSING_EDGE,
    ChunkId::MITER_JOINS_CLOSING_EDGE,
    ChunkId::CAP_JOINS_CLOSING_EDGE,
];

/// A broken invariant of a chunk table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkViolation {
    /// No chunk owns the vertices starting at `at`.
    VertexGap { at: u32 },
    /// Two chunks claim the vertex at `at`.
    VertexOverlap { chunk: ChunkId, at: u32 },
    /// Vertices past the end of the vertex buffer are claimed.
    VertexOverrun { chunk: ChunkId },
    /// The chunk's index range lies outside the index buffer.
    IndexOverrun { chunk: ChunkId },
    /// An index does not refer to one of the chunk's own vertices.
    IndexOutOfChunk { chunk: ChunkId, index: u32 },
    /// The vertices without closing edge are not a prefix of the ones with it.
    NotPrefix(ChunkId),
    /// The indices without closing edge are not a suffix of the ones with it.
    NotSuffix(ChunkId),
    /// A per-join chunk's vertices are not inside its point set's chunk.
    JoinOutsideParent(ChunkId),
    /// The empty chunk holds data.
    EmptyChunkUsed,
}

/// Checks the chunk table of a fill against the buffers it filled.
///
/// Returns every violation found, an empty list means the data is
/// consistent.
pub fn validate_chunks(
    chunks: &StrokeChunks,
    vertex_count: usize,
    indices: &[u32],
) -> Vec<ChunkViolation> {
    let mut violations = Vec::new();

    let mut owned: Vec<_> = OWNING_CHUNKS
        .iter()
        .map(|&id| (id, chunks.chunk(id)))
        .filter(|(_, c)| c.vertex_count > 0)
        .collect();
    owned.sort_by_key(|(_, c)| c.vertex_offset);
    let mut next = 0;
    for (id, chunk) in owned {
        if chunk.vertex_offset > next {
            violations.push(ChunkViolation::VertexGap { at: next });
        } else if chunk.vertex_offset < next {
            violations.push(ChunkViolation::VertexOverlap {
                chunk: id,
                at: chunk.vertex_offset,
            });
        }
        next = next.max(chunk.vertex_offset + chunk.vertex_count);
    }
    if (next as usize) < vertex_count {
        violations.push(ChunkViolation::VertexGap { at: next });
    }

    for with in &OWNING_CHUNKS[..ChunkId::NUMBER_WITH_CLOSING_EDGE as usize] {
        let without = with.without_closing_edge();
        let (w, wo) = (chunks.chunk(*with), chunks.chunk(without));
        if wo.vertex_offset != w.vertex_offset || wo.vertex_count > w.vertex_count {
            violations.push(ChunkViolation::NotPrefix(without));
        }
        if wo.index_count > w.index_count
            || wo.index_offset + wo.index_count != w.index_offset + w.index_count
        {
            violations.push(ChunkViolation::NotSuffix(without));
        }
    }

    if chunks.chunk(ChunkId::EMPTY) != Default::default() {
        violations.push(ChunkViolation::EmptyChunkUsed);
    }

    for (ix, chunk) in chunks.chunks().iter().enumerate() {
        let id = ChunkId(ix as u32);
        if chunk.vertex_range().end > vertex_count {
            violations.push(ChunkViolation::VertexOverrun { chunk: id });
        }
        let Some(chunk_indices) = indices.get(chunk.index_range()) else {
            violations.push(ChunkViolation::IndexOverrun { chunk: id });
            continue;
        };
        if let Some(&index) = chunk_indices.iter().find(|&&i| i >= chunk.vertex_count) {
            violations.push(ChunkViolation::IndexOutOfChunk { chunk: id, index });
        }
        if !id.is_static() && id != ChunkId::EMPTY {
            let slot = (id.0 - ChunkId::STATIC_COUNT - 1) % NUMBER_JOIN_TYPES;
            let parent = chunks.chunk(JOIN_PARENTS[slot as usize]);
            if chunk.vertex_count > 0
                && (chunk.vertex_offset < parent.vertex_offset
                    || chunk.vertex_range().end > parent.vertex_range().end)
            {
                violations.push(ChunkViolation::JoinOutsideParent(id));
            }
        }
    }

    if !violations.is_empty() {
        log::warn!("Inconsistent stroke chunks: {violations:#?}");
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PackedVertex, PointSet, StrokeAttributeFiller, StrokeVertex, StrokedPathBuilder};

    #[test]
    fn filled_data_is_consistent() {
        let v = [StrokeVertex::default(); 3];
        let mut builder = StrokedPathBuilder::new();
        let c = builder.begin_contour();
        builder.add_edge(false, &v, &[0, 1, 2]);
        builder.add_edge(true, &v, &[2, 1, 0]);
        builder.add_join(PointSet::RoundedJoin, c, 0, false, &v, &[0, 1, 2]);
        builder.add_join(PointSet::RoundedJoin, c, 1, true, &v[..2], &[0, 1, 0]);
        builder.add_cap(PointSet::SquareCap, &v, &[0, 2, 1]);
        let path = builder.build();

        let filler = StrokeAttributeFiller::new(&path);
        let sizes = filler.sizes();
        let mut vertices = vec![PackedVertex::default(); sizes.vertices.len() as usize];
        let mut indices = vec![0; sizes.indices.len() as usize];
        let chunks = filler.fill(&mut vertices, &mut indices);
        assert!(validate_chunks(&chunks, vertices.len(), &indices).is_empty());
    }

    #[test]
    fn reports_gap() {
        let path = crate::StrokedPathData::new();
        let chunks = StrokeAttributeFiller::new(&path).fill(&mut [], &mut []);
        assert_eq!(
            validate_chunks(&chunks, 2, &[]),
            [ChunkViolation::VertexGap { at: 0 }]
        );
    }
}

// Copyright 2024 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{Chunk, PackedVertex};

/// Typed buffer size primitive.
#[derive(Copy, Clone, Eq, Default, Debug)]
pub struct BufferSize<T: Sized> {
    len: u32,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Sized> BufferSize<T> {
    /// Creates a new buffer size from number of elements.
    pub const fn new(len: u32) -> Self {
        Self {
            len,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Creates a new buffer size from size in bytes.
    pub const fn from_size_in_bytes(size: u32) -> Self {
        Self::new(size / size_of::<T>() as u32)
    }

    /// Returns the number of elements.
    pub const fn len(self) -> u32 {
        self.len
    }

    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    /// Returns the size in bytes.
    pub const fn size_in_bytes(self) -> u32 {
        size_of::<T>() as u32 * self.len
    }

    /// Returns the size in bytes aligned up to the given power of two.
    pub const fn aligned_in_bytes(self, alignment: u32) -> u32 {
        align_up(self.size_in_bytes(), alignment)
    }

    /// Returns the size in bytes of a GPU binding for this buffer.
    ///
    /// Each buffer binding must be large enough to hold at least one element
    /// to avoid triggering validation errors, so this is never zero.
    pub const fn binding_size_in_bytes(self) -> u32 {
        let len = if self.len > 0 { self.len } else { 1 };
        size_of::<T>() as u32 * len
    }
}

impl<T: Sized> PartialEq for BufferSize<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
    }
}

impl<T: Sized> PartialOrd for BufferSize<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.len.partial_cmp(&other.len)
    }
}

/// Sizes required to fill stroke attribute data.
///
/// Computed by [`StrokeAttributeFiller::sizes`](crate::StrokeAttributeFiller::sizes);
/// the buffers handed to the fill must have exactly these lengths.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StrokeBufferSizes {
    /// Packed vertices.
    pub vertices: BufferSize<PackedVertex>,
    /// Indices, including the second copy of every join's indices.
    pub indices: BufferSize<u32>,
    /// Entries of the chunk table.
    pub chunks: BufferSize<Chunk>,
    /// Entries of the depth table.
    pub depth: BufferSize<u32>,
    /// Number of joins over all contours.
    pub total_joins: u32,
}

impl StrokeBufferSizes {
    /// Total size of the vertex and index data in bytes.
    pub fn upload_size_in_bytes(&self) -> u32 {
        self.vertices.size_in_bytes() + self.indices.size_in_bytes()
    }
}

impl std::fmt::Display for StrokeBufferSizes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "\n \
                 \tVertices:\t{} elements ({} bytes)\n\
                 \tIndices:\t{} elements ({} bytes)\n\
                 \tChunks:\t\t{}\n\
                 \tDepth:\t\t{}\n\
                 \tJoins:\t\t{}\n\
                 \tUpload:\t\t{} bytes",
            self.vertices.len(),
            self.vertices.size_in_bytes(),
            self.indices.len(),
            self.indices.size_in_bytes(),
            self.chunks.len(),
            self.depth.len(),
            self.total_joins,
            self.upload_size_in_bytes(),
        )
    }
}

const fn align_up(len: u32, alignment: u32) -> u32 {
    len + (len.wrapping_neg() & (alignment - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChunkId;

    #[test]
    fn sizes_in_bytes() {
        let vertices = BufferSize::<PackedVertex>::new(3);
        assert_eq!(vertices.size_in_bytes(), 3 * 48);
        assert_eq!(vertices.aligned_in_bytes(256), 256);
        assert_eq!(BufferSize::<u32>::from_size_in_bytes(40).len(), 10);
    }

    #[test]
    fn empty_buffers_still_bind() {
        let empty = BufferSize::<u32>::new(0);
        assert!(empty.is_empty());
        assert_eq!(empty.size_in_bytes(), 0);
        assert_eq!(empty.binding_size_in_bytes(), 4);
    }

    #[test]
    fn upload_covers_vertices_and_indices() {
        let sizes = StrokeBufferSizes {
            vertices: BufferSize::new(2),
            indices: BufferSize::new(6),
            chunks: BufferSize::new(ChunkId::count_for_joins(0)),
            depth: BufferSize::new(ChunkId::STATIC_COUNT),
            total_joins: 0,
        };
        assert_eq!(sizes.upload_size_in_bytes(), 2 * 48 + 6 * 4);
        assert!(sizes.to_string().contains("Upload:\t\t120 bytes"));
        assert_eq!(StrokeBufferSizes::default().upload_size_in_bytes(), 0);
    }

    #[test]
    fn align() {
        assert_eq!(align_up(0, 4), 0);
        assert_eq!(align_up(5, 4), 8);
        assert_eq!(align_up(8, 4), 8);
    }
}

// Copyright 2024 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute and index data for stroking paths on the GPU.
//!
//! A stroke tessellator classifies the vertices of a stroked path into point
//! sets (edges, joins of each style, caps of each style). This crate packs
//! those point sets into a single vertex buffer and a single index buffer and
//! builds a table of [`Chunk`]s addressing the sub-ranges needed to draw a
//! feature: "all bevel joins including the closing edge", "the 7th miter
//! join", "square caps".
//!
//! Filling is a two phase process:
//!
//! ```
//! use stroke_encoding::{
//!     join_chunk, ChunkId, JoinStyle, PackedVertex, PointSet, StrokeAttributeFiller,
//!     StrokeVertex, StrokedPathBuilder,
//! };
//!
//! let mut builder = StrokedPathBuilder::new();
//! let contour = builder.begin_contour();
//! let triangle = [StrokeVertex::default(); 3];
//! builder.add_edge(false, &triangle, &[0, 1, 2]);
//! builder.add_join(PointSet::MiterJoin, contour, 0, false, &triangle, &[0, 1, 2]);
//! let path = builder.build();
//!
//! let filler = StrokeAttributeFiller::new(&path);
//! let sizes = filler.sizes();
//! let mut vertices = vec![PackedVertex::default(); sizes.vertices.len() as usize];
//! let mut indices = vec![0; sizes.indices.len() as usize];
//! let chunks = filler.fill(&mut vertices, &mut indices);
//!
//! let miter = chunks.chunk(join_chunk(JoinStyle::Miter, true));
//! assert_eq!(miter.index_count, 3);
//! assert!(chunks.chunk(ChunkId::EMPTY).is_empty());
//! ```

// LINEBENDER LINT SET - lib.rs - v2
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![allow(missing_docs, reason = "We have many as-yet undocumented items.")]

mod chunk;
mod config;
mod dash;
mod error;
mod filler;
mod geometry;
pub mod validate;
mod vertex;

pub use chunk::{
    cap_chunk, cap_join_chunk, edge_chunk, join_chunk, CapStyle, Chunk, ChunkId, ChunkSelector,
    JoinStyle, StrokeChunkSelector, NUMBER_JOIN_TYPES,
};
pub use config::{BufferSize, StrokeBufferSizes};
pub use dash::{DashPatternElement, DashedStrokeHeader, DashedStrokeParams};
pub use error::Error;
pub use filler::{join_order, StrokeAttributeFiller, StrokeChunks};
pub use geometry::{PointSet, StrokeGeometry, StrokedPathBuilder, StrokedPathData};
pub use vertex::{PackedVertex, StrokeVertex};

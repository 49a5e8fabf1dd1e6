// Copyright 2024 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

use crate::PointSet;

/// Errors that can occur while filling stroke attribute data.
///
/// All of them point at a bug in the caller or in the geometry source,
/// never at bad external data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The vertex buffer does not have the length given by the sizing pass.
    #[error("Vertex buffer holds {actual} vertices but {expected} are required")]
    VertexBufferSize { expected: u32, actual: usize },

    /// The index buffer does not have the length given by the sizing pass.
    #[error("Index buffer holds {actual} indices but {expected} are required")]
    IndexBufferSize { expected: u32, actual: usize },

    /// The fill pass produced a different amount of data than the sizing
    /// pass predicted for the same geometry.
    #[error("Sizing computed {sized} {what} but filling needs {filled}")]
    SizeMismatch {
        what: &'static str,
        sized: u32,
        filled: u32,
    },

    /// The variant without closing edge is not contained in the variant
    /// with closing edge.
    #[error("Point set {0:?} has more data without closing edge than with it")]
    ClosingEdgeOrder(PointSet),

    /// A per-join range lies outside its point set.
    #[error("Join {join} of contour {contour} lies outside of point set {set:?}")]
    JoinOutOfBounds {
        set: PointSet,
        contour: u32,
        join: u32,
    },

    /// A join's index does not refer to one of the join's own vertices.
    #[error(
        "Index {index} of join {join} of contour {contour} in {set:?} is outside of its vertices {vertices:?}"
    )]
    JoinIndexOutOfRange {
        set: PointSet,
        contour: u32,
        join: u32,
        index: u32,
        vertices: std::ops::Range<u32>,
    },
}

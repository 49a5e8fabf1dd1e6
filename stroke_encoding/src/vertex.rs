// Copyright 2024 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bytemuck::{Pod, Zeroable};

/// A tessellated vertex along a stroked outline.
///
/// Produced by the stroke tessellator and consumed read-only by the
/// [`StrokeAttributeFiller`](crate::StrokeAttributeFiller).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StrokeVertex {
    /// Position of the vertex on the path.
    pub position: [f32; 2],
    /// Direction in which the vertex is pushed by the stroke width.
    pub pre_offset: [f32; 2],
    /// Distance from the start of the edge the vertex belongs to.
    pub distance_from_edge_start: f32,
    /// Distance from the start of the contour the vertex belongs to.
    pub distance_from_contour_start: f32,
    /// Join or cap specific offset.
    pub auxiliary_offset: [f32; 2],
    /// Flags decoded by the shader. Carried through unmodified.
    pub packed_data: u32,
    /// Length of the edge the vertex belongs to.
    pub edge_length: f32,
    /// Length of the contour without its closing edge.
    pub open_contour_length: f32,
    /// Length of the contour including its closing edge.
    pub closed_contour_length: f32,
}

/// GPU representation of a [`StrokeVertex`].
///
/// This must be kept in sync with the attribute decoding in the stroke
/// vertex shader:
///
/// ```text
/// attrib0: | position.x | position.y | pre_offset.x | pre_offset.y |
/// attrib1: | edge dist  | contour dist | aux.x      | aux.y        |
/// attrib2: | packed_data | edge_length | open len   | closed len   |
/// ```
///
/// Floats are stored as their IEEE-754 bit patterns, `packed_data` as is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Zeroable, Pod)]
#[repr(C)]
pub struct PackedVertex {
    pub attrib0: [u32; 4],
    pub attrib1: [u32; 4],
    pub attrib2: [u32; 4],
}

impl PackedVertex {
    /// Number of 4-wide attribute slots a vertex occupies.
    pub const LANES: usize = 3;

    /// Number of 32-bit scalars in a packed vertex.
    pub const SCALARS: usize = Self::LANES * 4;

    /// Packs a stroke vertex.
    pub fn pack(src: &StrokeVertex) -> Self {
        Self {
            attrib0: pack_vec4([
                src.position[0],
                src.position[1],
                src.pre_offset[0],
                src.pre_offset[1],
            ]),
            attrib1: pack_vec4([
                src.distance_from_edge_start,
                src.distance_from_contour_start,
                src.auxiliary_offset[0],
                src.auxiliary_offset[1],
            ]),
            attrib2: [
                src.packed_data,
                src.edge_length.to_bits(),
                src.open_contour_length.to_bits(),
                src.closed_contour_length.to_bits(),
            ],
        }
    }

    /// Recovers the stroke vertex this was packed from.
    pub fn unpack(&self) -> StrokeVertex {
        let [px, py, ox, oy] = unpack_vec4(self.attrib0);
        let [edge_dist, contour_dist, ax, ay] = unpack_vec4(self.attrib1);
        StrokeVertex {
            position: [px, py],
            pre_offset: [ox, oy],
            distance_from_edge_start: edge_dist,
            distance_from_contour_start: contour_dist,
            auxiliary_offset: [ax, ay],
            packed_data: self.attrib2[0],
            edge_length: f32::from_bits(self.attrib2[1]),
            open_contour_length: f32::from_bits(self.attrib2[2]),
            closed_contour_length: f32::from_bits(self.attrib2[3]),
        }
    }

    /// Returns the vertex as a flat array of scalars in lane order.
    pub fn to_scalars(self) -> [u32; Self::SCALARS] {
        bytemuck::cast(self)
    }
}

impl From<&StrokeVertex> for PackedVertex {
    fn from(vertex: &StrokeVertex) -> Self {
        Self::pack(vertex)
    }
}

impl From<PackedVertex> for StrokeVertex {
    fn from(packed: PackedVertex) -> Self {
        packed.unpack()
    }
}

fn pack_vec4(v: [f32; 4]) -> [u32; 4] {
    v.map(f32::to_bits)
}

fn unpack_vec4(v: [u32; 4]) -> [f32; 4] {
    v.map(f32::from_bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StrokeVertex {
        StrokeVertex {
            position: [10.5, -3.25],
            pre_offset: [0.0, 1.0],
            distance_from_edge_start: 2.0,
            distance_from_contour_start: 12.5,
            auxiliary_offset: [-0.5, 0.75],
            packed_data: 0xDEAD_BEEF,
            edge_length: 4.0,
            open_contour_length: 30.0,
            closed_contour_length: 42.0,
        }
    }

    #[test]
    fn lane_layout() {
        let v = sample();
        let packed = PackedVertex::pack(&v);
        assert_eq!(packed.attrib0[0], 10.5_f32.to_bits());
        assert_eq!(packed.attrib0[3], 1.0_f32.to_bits());
        assert_eq!(packed.attrib1[1], 12.5_f32.to_bits());
        assert_eq!(packed.attrib1[2], (-0.5_f32).to_bits());
        assert_eq!(packed.attrib2[0], 0xDEAD_BEEF);
        assert_eq!(packed.attrib2[3], 42.0_f32.to_bits());
        assert_eq!(size_of::<PackedVertex>(), PackedVertex::SCALARS * 4);
    }

    #[test]
    fn unpack_restores_vertex() {
        let v = sample();
        assert_eq!(PackedVertex::pack(&v).unpack(), v);
    }

    #[test]
    fn unpack_preserves_nan_payload() {
        // Signaling NaN with a payload; a float round trip through arithmetic
        // would be allowed to quiet it, bit copies must not.
        let nan = f32::from_bits(0x7F80_0001);
        let v = StrokeVertex {
            position: [nan, -0.0],
            edge_length: f32::from_bits(0xFFC0_1234),
            ..sample()
        };
        let back = PackedVertex::pack(&v).unpack();
        assert_eq!(back.position[0].to_bits(), 0x7F80_0001);
        assert_eq!(back.position[1].to_bits(), (-0.0_f32).to_bits());
        assert_eq!(back.edge_length.to_bits(), 0xFFC0_1234);
    }

    #[test]
    fn scalars_follow_lane_order() {
        let scalars = PackedVertex::pack(&sample()).to_scalars();
        assert_eq!(scalars[0], 10.5_f32.to_bits());
        assert_eq!(scalars[8], 0xDEAD_BEEF);
        assert_eq!(scalars[11], 42.0_f32.to_bits());
    }
}

// Copyright 2024 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bytemuck::{Pod, Zeroable};
use peniko::kurbo::Stroke;
use smallvec::SmallVec;

/// One element of a dash pattern: how long to draw, then how much space to
/// leave before the next element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Zeroable, Pod)]
#[repr(C)]
pub struct DashPatternElement {
    pub draw_length: f32,
    pub space_length: f32,
}

impl DashPatternElement {
    pub fn new(draw_length: f32, space_length: f32) -> Self {
        Self {
            draw_length,
            space_length,
        }
    }
}

/// Fixed header of the dashed stroke data block.
///
/// This must be kept in sync with the dashed stroke shader, which reads the
/// dash pattern right after it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Zeroable, Pod)]
#[repr(C)]
pub struct DashedStrokeHeader {
    pub width: f32,
    pub miter_limit: f32,
    pub dash_offset: f32,
    /// Sum of all draw and space lengths of the pattern.
    pub total_length: f32,
    /// Position in the pattern where the first non-empty draw interval
    /// starts.
    pub first_interval_start: f32,
}

impl DashedStrokeHeader {
    pub const WIDTH_OFFSET: usize = 0;
    pub const MITER_LIMIT_OFFSET: usize = 1;
    pub const DASH_OFFSET_OFFSET: usize = 2;
    pub const TOTAL_LENGTH_OFFSET: usize = 3;
    pub const FIRST_INTERVAL_START_OFFSET: usize = 4;

    /// Size of the header in 32-bit words.
    pub const SIZE: usize = 5;
}

/// Parameters for dashed stroking.
#[derive(Clone, Debug, PartialEq)]
pub struct DashedStrokeParams {
    width: f32,
    miter_limit: f32,
    dash_offset: f32,
    dash_pattern: SmallVec<[DashPatternElement; 4]>,
}

impl Default for DashedStrokeParams {
    fn default() -> Self {
        Self {
            width: 1.0,
            miter_limit: 4.0,
            dash_offset: 0.0,
            dash_pattern: SmallVec::new(),
        }
    }
}

impl DashedStrokeParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds parameters from a kurbo stroke.
    ///
    /// kurbo stores the pattern as alternating dash and gap lengths. As in
    /// SVG, an odd number of lengths is repeated once to make it even.
    pub fn from_stroke(stroke: &Stroke) -> Self {
        let lengths: SmallVec<[f32; 8]> = if stroke.dash_pattern.len() % 2 == 1 {
            stroke
                .dash_pattern
                .iter()
                .chain(stroke.dash_pattern.iter())
                .map(|&l| l as f32)
                .collect()
        } else {
            stroke.dash_pattern.iter().map(|&l| l as f32).collect()
        };
        Self {
            width: stroke.width as f32,
            miter_limit: stroke.miter_limit as f32,
            dash_offset: stroke.dash_offset as f32,
            dash_pattern: lengths
                .chunks_exact(2)
                .map(|pair| DashPatternElement::new(pair[0], pair[1]))
                .collect(),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn miter_limit(&self) -> f32 {
        self.miter_limit
    }

    pub fn with_miter_limit(mut self, miter_limit: f32) -> Self {
        self.miter_limit = miter_limit;
        self
    }

    /// Where in the dash pattern stroking starts.
    pub fn dash_offset(&self) -> f32 {
        self.dash_offset
    }

    pub fn with_dash_offset(mut self, dash_offset: f32) -> Self {
        self.dash_offset = dash_offset;
        self
    }

    pub fn dash_pattern(&self) -> &[DashPatternElement] {
        &self.dash_pattern
    }

    /// Sets the dash pattern; the elements are copied.
    pub fn with_dash_pattern(mut self, pattern: &[DashPatternElement]) -> Self {
        self.dash_pattern = SmallVec::from_slice(pattern);
        self
    }

    /// Computes the header of the packed data block.
    pub fn header(&self) -> DashedStrokeHeader {
        let total_length = self
            .dash_pattern
            .iter()
            .map(|e| e.draw_length + e.space_length)
            .sum();
        let first_interval_start = self
            .dash_pattern
            .iter()
            .take_while(|e| e.draw_length <= 0.0)
            .map(|e| e.space_length)
            .sum();
        DashedStrokeHeader {
            width: self.width,
            miter_limit: self.miter_limit,
            dash_offset: self.dash_offset,
            total_length,
            first_interval_start,
        }
    }

    /// Size in 32-bit words of the packed data, padded to a multiple of
    /// `alignment` words. An alignment of zero is treated as one.
    pub fn data_size(&self, alignment: u32) -> usize {
        let words = DashedStrokeHeader::SIZE + 2 * self.dash_pattern.len();
        words.next_multiple_of(alignment.max(1) as usize)
    }

    /// Packs the header followed by the dash pattern into `dst`, zeroing the
    /// padding.
    ///
    /// # Panics
    ///
    /// Panics if `dst` is not exactly [`data_size(alignment)`](Self::data_size)
    /// words long.
    pub fn pack_data(&self, alignment: u32, dst: &mut [u32]) {
        assert_eq!(
            dst.len(),
            self.data_size(alignment),
            "dashed stroke data needs an exactly sized destination"
        );
        let (header, rest) = dst.split_at_mut(DashedStrokeHeader::SIZE);
        header.copy_from_slice(bytemuck::cast_slice(&[self.header()]));
        let (pattern, padding) = rest.split_at_mut(2 * self.dash_pattern.len());
        pattern.copy_from_slice(bytemuck::cast_slice(&self.dash_pattern));
        padding.fill(0);
    }

    /// Packs the data into a newly allocated block.
    pub fn to_words(&self, alignment: u32) -> Vec<u32> {
        let mut words = vec![0; self.data_size(alignment)];
        self.pack_data(alignment, &mut words);
        words
    }
}

impl From<&Stroke> for DashedStrokeParams {
    fn from(stroke: &Stroke) -> Self {
        Self::from_stroke(stroke)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_values() {
        let params = DashedStrokeParams::new()
            .with_width(3.0)
            .with_miter_limit(4.0)
            .with_dash_offset(1.5)
            .with_dash_pattern(&[
                DashPatternElement::new(0.0, 2.0),
                DashPatternElement::new(5.0, 1.0),
                DashPatternElement::new(0.0, 3.0),
            ]);
        let header = params.header();
        assert_eq!(header.width, 3.0);
        assert_eq!(header.miter_limit, 4.0);
        assert_eq!(header.dash_offset, 1.5);
        assert_eq!(header.total_length, 11.0);
        assert_eq!(header.first_interval_start, 2.0);
    }

    #[test]
    fn packed_layout() {
        let params = DashedStrokeParams::new()
            .with_width(2.0)
            .with_dash_pattern(&[DashPatternElement::new(4.0, 1.0)]);
        assert_eq!(params.data_size(1), 7);
        assert_eq!(params.data_size(4), 8);
        assert_eq!(params.data_size(3), 9);
        let words = params.to_words(4);
        assert_eq!(words[DashedStrokeHeader::WIDTH_OFFSET], 2.0_f32.to_bits());
        assert_eq!(
            words[DashedStrokeHeader::MITER_LIMIT_OFFSET],
            4.0_f32.to_bits()
        );
        assert_eq!(
            words[DashedStrokeHeader::TOTAL_LENGTH_OFFSET],
            5.0_f32.to_bits()
        );
        assert_eq!(
            words[DashedStrokeHeader::FIRST_INTERVAL_START_OFFSET],
            0.0_f32.to_bits()
        );
        assert_eq!(words[5], 4.0_f32.to_bits());
        assert_eq!(words[6], 1.0_f32.to_bits());
        assert_eq!(words[7], 0);
    }

    #[test]
    fn from_kurbo_stroke() {
        let stroke = Stroke::new(2.0)
            .with_miter_limit(6.0)
            .with_dashes(0.5, [3.0, 1.0, 2.0]);
        let params = DashedStrokeParams::from(&stroke);
        assert_eq!(params.width(), 2.0);
        assert_eq!(params.miter_limit(), 6.0);
        assert_eq!(params.dash_offset(), 0.5);
        assert_eq!(
            params.dash_pattern(),
            &[
                DashPatternElement::new(3.0, 1.0),
                DashPatternElement::new(2.0, 3.0),
                DashPatternElement::new(1.0, 2.0),
            ]
        );
    }

    #[test]
    #[should_panic(expected = "exactly sized destination")]
    fn pack_rejects_short_destination() {
        let params = DashedStrokeParams::new();
        params.pack_data(1, &mut [0; 4]);
    }
}

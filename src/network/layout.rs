//! Genome layout: where every weight matrix and bias vector lives in the
//! flat parameter vector.
//!
//! Computed once from the layer widths and shared by encode and decode, so
//! both directions walk exactly the same table:
//!
//! ```text
//! [ W0 (n0*n1) | b0 (n1) | W1 (n1*n2) | b1 (n2) | ... ]
//! ```
//!
//! Weight matrices are row-major with the source neuron as the outer index.

use std::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    Weights,
    Biases,
}

/// One contiguous block of the genome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Index of the layer transition (`0` is input -> first hidden).
    pub layer: usize,
    pub kind: SegmentKind,
    pub offset: usize,
    pub len: usize,
}

impl Segment {
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamLayout {
    segments: Vec<Segment>,
    total: usize,
}

impl ParamLayout {
    /// Build the layout for a topology. Widths are assumed validated.
    pub fn new(widths: &[usize]) -> Self {
        let mut segments = Vec::with_capacity(widths.len().saturating_sub(1) * 2);
        let mut offset = 0;
        for (layer, pair) in widths.windows(2).enumerate() {
            let (fan_in, fan_out) = (pair[0], pair[1]);
            for (kind, len) in [
                (SegmentKind::Weights, fan_in * fan_out),
                (SegmentKind::Biases, fan_out),
            ] {
                segments.push(Segment {
                    layer,
                    kind,
                    offset,
                    len,
                });
                offset += len;
            }
        }
        Self {
            segments,
            total: offset,
        }
    }

    /// Total parameter count, which is also the genome length.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_two_one_has_nine_params() {
        let layout = ParamLayout::new(&[2, 2, 1]);
        assert_eq!(layout.total(), 9);
        let lens: Vec<usize> = layout.segments().iter().map(|s| s.len).collect();
        assert_eq!(lens, vec![4, 2, 2, 1]);
    }

    #[test]
    fn segments_are_contiguous_and_alternate() {
        let layout = ParamLayout::new(&[30, 15, 5, 1]);
        let mut expected_offset = 0;
        for (i, seg) in layout.segments().iter().enumerate() {
            assert_eq!(seg.offset, expected_offset);
            assert_eq!(seg.layer, i / 2);
            let kind = if i % 2 == 0 {
                SegmentKind::Weights
            } else {
                SegmentKind::Biases
            };
            assert_eq!(seg.kind, kind);
            expected_offset = seg.range().end;
        }
        assert_eq!(expected_offset, layout.total());
        assert_eq!(layout.total(), 30 * 15 + 15 + 15 * 5 + 5 + 5 + 1);
    }
}

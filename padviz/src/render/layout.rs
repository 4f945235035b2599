use super::surface::{Point, Size};

/// Gap between consecutive glyphs along the distribution axis
pub const PADDING: f32 = 20.0;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Distribute along the longer canvas side. Square canvases lay out
    /// horizontally.
    pub fn for_canvas(canvas: Size) -> Self {
        if canvas.height > canvas.width {
            Axis::Vertical
        } else {
            Axis::Horizontal
        }
    }

    fn extent(self, size: Size) -> f32 {
        match self {
            Axis::Horizontal => size.width,
            Axis::Vertical => size.height,
        }
    }
}

/// Glyph centers for devices with the given draw sizes, in the same order.
///
/// A single glyph sits at the canvas midpoint. Several glyphs are packed
/// along one axis with [`PADDING`] between neighbors, the group centered on
/// that axis and every glyph centered on the other.
pub fn compute(canvas: Size, sizes: &[Size]) -> Vec<Point> {
    let middle = Point::new(canvas.width / 2.0, canvas.height / 2.0);

    if sizes.len() <= 1 {
        return sizes.iter().map(|_| middle).collect();
    }

    let axis = Axis::for_canvas(canvas);
    let total = sizes.iter().map(|&s| axis.extent(s)).sum::<f32>()
        + PADDING * (sizes.len() - 1) as f32;

    let mut cursor = (axis.extent(canvas) - total) / 2.0;
    let mut centers = Vec::with_capacity(sizes.len());

    for &size in sizes {
        let extent = axis.extent(size);
        let along = cursor + extent / 2.0;
        centers.push(match axis {
            Axis::Horizontal => Point::new(along, middle.y),
            Axis::Vertical => Point::new(middle.x, along),
        });
        cursor += extent + PADDING;
    }

    centers
}

//! The per-frame draw pass.

use super::layout;
use super::surface::{Point, Rect, Rgba, Surface};
use crate::device::snapshot::DeviceSnapshot;
use crate::profile::VisualizationProfile;
use crate::profile::options::EffectiveOptions;

pub const PLACEHOLDER: &str = "Connect a\ngamepad and\npress any\nbutton";
pub const WASH: Rgba = Rgba::rgba(255, 255, 255, 0.35);

const PLACEHOLDER_MAX_FONT: f32 = 50.0;
const PLACEHOLDER_LINE_GAP: f32 = 5.0;
const OVERLAY_FONT: f32 = 30.0;

/// One device ready to draw
pub struct Glyph<'a> {
    pub visualization: VisualizationProfile,
    pub snapshot: &'a DeviceSnapshot,
    pub options: EffectiveOptions,
}

/// Timing figures shown when debugging
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Overlay {
    /// Time of the previous draw in milliseconds since the loop started
    pub last_draw_ms: f64,
    pub fps: f32,
}

pub fn draw_frame(
    surface: &mut dyn Surface,
    glyphs: &[Glyph],
    background: Rgba,
    overlay: Option<Overlay>,
) {
    let canvas = Rect::from_size(surface.size());
    surface.clear_rect(canvas);

    if glyphs.is_empty() {
        surface.fill_rect(canvas, background);
        surface.fill_rect(canvas, WASH);
        draw_placeholder(surface);
    } else {
        surface.fill_rect(canvas, WASH);
        let sizes: Vec<_> =
            glyphs.iter().map(|g| g.visualization.draw_size()).collect();
        let centers = layout::compute(surface.size(), &sizes);
        for (glyph, center) in glyphs.iter().zip(centers) {
            glyph.visualization.draw(
                surface,
                center,
                glyph.snapshot,
                &glyph.options,
            );
        }
    }

    if let Some(overlay) = overlay {
        surface.fill_text(
            &overlay.last_draw_ms.to_string(),
            Point::new(50.0, 50.0),
            OVERLAY_FONT,
            Rgba::BLACK,
        );
        surface.fill_text(
            &format!("fps: {}", significant(overlay.fps, 3)),
            Point::new(200.0, 50.0),
            OVERLAY_FONT,
            Rgba::BLACK,
        );
    }
}

/// Font size of the idle placeholder for a canvas
pub fn placeholder_font_size(surface: &dyn Surface) -> f32 {
    let size = surface.size();
    (size.width.min(size.height) / 10.0)
        .min(PLACEHOLDER_MAX_FONT)
        .floor()
}

fn draw_placeholder(surface: &mut dyn Surface) {
    let size = surface.size();
    let font_size = placeholder_font_size(surface);
    let line_height = font_size + PLACEHOLDER_LINE_GAP;
    let lines: Vec<&str> = PLACEHOLDER.lines().collect();
    let top = size.height / 2.0 - line_height * lines.len() as f32 / 2.0;

    for (i, line) in lines.iter().enumerate() {
        let width = surface.measure_text(line, font_size);
        let x = size.width / 2.0 - width / 2.0;
        surface.fill_text(
            line,
            Point::new(x, top + i as f32 * line_height),
            font_size,
            Rgba::BLACK,
        );
    }
}

/// `value` rounded to `digits` significant digits. Exponents at or past
/// `digits`, or below -6, switch to `1.23e+3` notation.
fn significant(value: f32, digits: usize) -> String {
    let digits = digits.max(1);
    if !value.is_finite() {
        return value.to_string();
    }

    let scientific = format!("{:.*e}", digits - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -6 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{}{}", mantissa, sign, exponent.abs());
    }

    let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
    format!("{:.*}", decimals, value)
}

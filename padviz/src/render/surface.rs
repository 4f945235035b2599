//! Drawing surface abstraction and the geometry/color types it speaks.

use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn centered(center: Point, width: f32, height: f32) -> Self {
        Self::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            width,
            height,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB`. Returns `None` for anything else.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6
            || !digits.chars().all(|c| c.is_ascii_hexdigit())
        {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).ok()
        };
        Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

/// A 2D drawing target with fixed pixel dimensions.
///
/// Implementations must not retain state between calls beyond the pixels
/// they paint; profiles call into the surface every frame.
pub trait Surface {
    fn size(&self) -> Size;
    fn resize(&mut self, width: u32, height: u32);
    fn clear_rect(&mut self, rect: Rect);
    fn fill_rect(&mut self, rect: Rect, color: Rgba);
    fn stroke_rect(&mut self, rect: Rect, line_width: f32, color: Rgba);
    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba);
    fn stroke_circle(
        &mut self,
        center: Point,
        radius: f32,
        line_width: f32,
        color: Rgba,
    );
    fn line(&mut self, from: Point, to: Point, line_width: f32, color: Rgba);
    /// Width in pixels of `text` rendered at `font_size`
    fn measure_text(&self, text: &str, font_size: f32) -> f32;
    /// Draw `text` with its left baseline at `position`
    fn fill_text(
        &mut self,
        text: &str,
        position: Point,
        font_size: f32,
        color: Rgba,
    );
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Rect),
    FillRect(Rect, Rgba),
    StrokeRect(Rect, f32, Rgba),
    FillCircle(Point, f32, Rgba),
    StrokeCircle(Point, f32, f32, Rgba),
    Line(Point, Point, f32, Rgba),
    Text {
        text: String,
        position: Point,
        font_size: f32,
        color: Rgba,
    },
}

/// Surface that records every call instead of painting pixels.
///
/// Text is measured with a fixed advance of half the font size per
/// character.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Clear(rect));
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCommand::FillRect(rect, color));
    }

    fn stroke_rect(&mut self, rect: Rect, line_width: f32, color: Rgba) {
        self.commands
            .push(DrawCommand::StrokeRect(rect, line_width, color));
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba) {
        self.commands
            .push(DrawCommand::FillCircle(center, radius, color));
    }

    fn stroke_circle(
        &mut self,
        center: Point,
        radius: f32,
        line_width: f32,
        color: Rgba,
    ) {
        self.commands.push(DrawCommand::StrokeCircle(
            center, radius, line_width, color,
        ));
    }

    fn line(&mut self, from: Point, to: Point, line_width: f32, color: Rgba) {
        self.commands
            .push(DrawCommand::Line(from, to, line_width, color));
    }

    fn measure_text(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * 0.5
    }

    fn fill_text(
        &mut self,
        text: &str,
        position: Point,
        font_size: f32,
        color: Rgba,
    ) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            position,
            font_size,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(Rgba::from_hex("#DCDCDC"), Some(Rgba::rgb(220, 220, 220)));
        assert_eq!(Rgba::from_hex("#ff8000"), Some(Rgba::rgb(255, 128, 0)));
        assert_eq!(Rgba::from_hex("DCDCDC"), None);
        assert_eq!(Rgba::from_hex("#DCDC"), None);
        assert_eq!(Rgba::from_hex("#GG0000"), None);
    }

    #[test]
    fn formats_as_css_rgba() {
        let color = Rgba::rgb(255, 255, 255).with_alpha(0.35);
        assert_eq!(color.to_string(), "rgba(255,255,255,0.35)");
        assert_eq!(Rgba::rgb(1, 2, 255).to_hex(), "#0102FF");
    }
}

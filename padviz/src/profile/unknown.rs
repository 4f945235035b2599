//! Generic glyph for controllers no other profile recognizes: a grid of
//! buttons above one bar per axis.

use super::options::{EffectiveOptions, OptionDescriptor};
use crate::device::snapshot::DeviceSnapshot;
use crate::render::surface::{Point, Rect, Size, Surface};

pub const DRAW_SIZE: Size = Size::new(400.0, 300.0);

const COLUMNS: usize = 8;
const MAX_BUTTON_ROWS: usize = 4;
const MAX_AXES: usize = 8;
const BUTTON_SPACING: f32 = 40.0;
const ROW_SPACING: f32 = 36.0;
const BUTTON_RADIUS: f32 = 12.0;
const AXIS_ROW_HEIGHT: f32 = 14.0;
const AXIS_WIDTH: f32 = 300.0;

pub static OPTIONS: [OptionDescriptor; 6] = [
    OptionDescriptor::color(
        "colorBackground",
        "Background color",
        "Fill color behind buttons and axes",
        "#F2F2F2",
    ),
    OptionDescriptor::color(
        "colorButton",
        "Button color",
        "Outline color of released buttons and axis tracks",
        "#1A1A1A",
    ),
    OptionDescriptor::color(
        "colorButtonPressed",
        "Pressed button color",
        "Fill color of pressed buttons",
        "#FF8C00",
    ),
    OptionDescriptor::color(
        "colorAxis",
        "Axis color",
        "Color of the axis position markers",
        "#1BA1E2",
    ),
    OptionDescriptor::checkbox(
        "drawIndices",
        "Draw indices",
        "Draw the raw index next to every button and axis",
        true,
    ),
    OptionDescriptor::text(
        "title",
        "Title",
        "Text drawn above the controller",
        "",
    ),
];

pub fn draw(
    surface: &mut dyn Surface,
    center: Point,
    snapshot: &DeviceSnapshot,
    options: &EffectiveOptions,
) {
    let background = options.color("colorBackground");
    let button_color = options.color("colorButton");
    let pressed_color = options.color("colorButtonPressed");
    let axis_color = options.color("colorAxis");
    let draw_indices = options.flag("drawIndices");

    let frame = Rect::centered(center, DRAW_SIZE.width, DRAW_SIZE.height);
    surface.fill_rect(frame, background);
    surface.stroke_rect(frame, 2.0, button_color);

    let title = options.text("title");
    if !title.is_empty() {
        let width = surface.measure_text(title, 16.0);
        surface.fill_text(
            title,
            Point::new(center.x - width / 2.0, frame.y + 22.0),
            16.0,
            button_color,
        );
    }

    let grid_left = center.x - BUTTON_SPACING * (COLUMNS as f32 - 1.0) / 2.0;
    let grid_top = frame.y + 45.0;
    let visible = snapshot.buttons.len().min(COLUMNS * MAX_BUTTON_ROWS);

    for (index, button) in snapshot.buttons.iter().take(visible).enumerate() {
        let position = Point::new(
            grid_left + (index % COLUMNS) as f32 * BUTTON_SPACING,
            grid_top + (index / COLUMNS) as f32 * ROW_SPACING,
        );
        if button.pressed {
            surface.fill_circle(position, BUTTON_RADIUS, pressed_color);
        } else if button.value > 0.0 {
            surface.fill_circle(
                position,
                BUTTON_RADIUS * button.value.clamp(0.0, 1.0),
                pressed_color,
            );
        }
        surface.stroke_circle(position, BUTTON_RADIUS, 2.0, button_color);
        if draw_indices {
            surface.fill_text(
                &index.to_string(),
                position.offset(-4.0, 4.0),
                10.0,
                button_color,
            );
        }
    }

    let axes_top = grid_top + ROW_SPACING * MAX_BUTTON_ROWS as f32;
    let axis_left = center.x - AXIS_WIDTH / 2.0;

    for (index, &value) in snapshot.axes.iter().take(MAX_AXES).enumerate() {
        let y = axes_top + index as f32 * AXIS_ROW_HEIGHT;
        surface.line(
            Point::new(axis_left, y),
            Point::new(axis_left + AXIS_WIDTH, y),
            2.0,
            button_color,
        );
        let x = axis_left + (value.clamp(-1.0, 1.0) + 1.0) / 2.0 * AXIS_WIDTH;
        surface.fill_circle(Point::new(x, y), 5.0, axis_color);
        if draw_indices {
            surface.fill_text(
                &index.to_string(),
                Point::new(axis_left - 20.0, y + 4.0),
                10.0,
                button_color,
            );
        }
    }
}

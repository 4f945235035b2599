//! Xbox One / 360 controller glyph.
//!
//! Chromium and Firefox expose the same pad with different index layouts,
//! so the two profile variants share the options and draw routine and only
//! differ in their [`Mapping`].

use super::mapping::{Input, InputReader, Mapping};
use super::options::{EffectiveOptions, OptionDescriptor};
use crate::device::snapshot::DeviceSnapshot;
use crate::render::surface::{Point, Rect, Rgba, Size, Surface};

pub const DRAW_SIZE: Size = Size::new(480.0, 320.0);

/// Microsoft vendor id as reported in host identity strings
const VENDOR_ID: &str = "045e";

/// 360 wired, 360 wireless, One, One (2015), One S, Series X|S
const PRODUCT_IDS: [&str; 6] = ["028e", "0719", "02d1", "02dd", "02ea", "0b12"];

pub static CHROMIUM_MAPPING: Mapping = Mapping {
    buttons: &[
        Input::A,
        Input::B,
        Input::X,
        Input::Y,
        Input::LeftBumper,
        Input::RightBumper,
        Input::LeftTrigger,
        Input::RightTrigger,
        Input::Back,
        Input::Start,
        Input::LeftStickPress,
        Input::RightStickPress,
        Input::DpadUp,
        Input::DpadDown,
        Input::DpadLeft,
        Input::DpadRight,
        Input::Home,
    ],
    axes: &[
        Input::LeftStickX,
        Input::LeftStickY,
        Input::RightStickX,
        Input::RightStickY,
    ],
};

pub static FIREFOX_MAPPING: Mapping = Mapping {
    buttons: &[
        Input::A,
        Input::B,
        Input::X,
        Input::Y,
        Input::LeftBumper,
        Input::RightBumper,
        Input::Back,
        Input::Start,
        Input::Home,
        Input::LeftStickPress,
        Input::RightStickPress,
    ],
    axes: &[
        Input::LeftStickX,
        Input::LeftStickY,
        Input::LeftTrigger,
        Input::RightStickX,
        Input::RightStickY,
        Input::RightTrigger,
        Input::DpadX,
        Input::DpadY,
    ],
};

pub static OPTIONS: [OptionDescriptor; 10] = [
    OptionDescriptor::color(
        "colorBody",
        "Body color",
        "Fill color of the controller body",
        "#F2F2F2",
    ),
    OptionDescriptor::color(
        "colorOutline",
        "Outline color",
        "Color of outlines and labels",
        "#1A1A1A",
    ),
    OptionDescriptor::color(
        "colorButtonA",
        "A button color",
        "Color of the A button",
        "#60A917",
    ),
    OptionDescriptor::color(
        "colorButtonB",
        "B button color",
        "Color of the B button",
        "#E51400",
    ),
    OptionDescriptor::color(
        "colorButtonX",
        "X button color",
        "Color of the X button",
        "#1BA1E2",
    ),
    OptionDescriptor::color(
        "colorButtonY",
        "Y button color",
        "Color of the Y button",
        "#F0A30A",
    ),
    OptionDescriptor::color(
        "colorPressed",
        "Pressed color",
        "Highlight color of pressed bumpers, sticks and d-pad directions",
        "#FF8C00",
    ),
    OptionDescriptor::color(
        "colorSticks",
        "Stick color",
        "Fill color of the thumb sticks",
        "#4D4D4D",
    ),
    OptionDescriptor::checkbox(
        "drawLabels",
        "Draw labels",
        "Draw the letters on the face buttons",
        true,
    ),
    OptionDescriptor::text(
        "title",
        "Title",
        "Text drawn below the controller",
        "",
    ),
];

pub fn id_matches_chromium(id: &str) -> bool {
    let id = id.to_ascii_lowercase();
    id.contains("standard gamepad")
        && (id.contains(&format!("vendor: {}", VENDOR_ID))
            || id.contains("xbox")
            || id.contains("x-box"))
}

pub fn id_matches_firefox(id: &str) -> bool {
    let id = id.to_ascii_lowercase();
    let mut parts = id.splitn(3, '-');
    matches!(
        (parts.next(), parts.next()),
        (Some(vendor), Some(product))
            if vendor == VENDOR_ID && PRODUCT_IDS.contains(&product)
    )
}

pub fn draw(
    surface: &mut dyn Surface,
    center: Point,
    mapping: &Mapping,
    snapshot: &DeviceSnapshot,
    options: &EffectiveOptions,
) {
    let input = InputReader::new(mapping, snapshot);
    let body = options.color("colorBody");
    let outline = options.color("colorOutline");
    let pressed = options.color("colorPressed");
    let sticks = options.color("colorSticks");

    // Triggers: outlined bars filled by their analog value
    let triggers = [(Input::LeftTrigger, -170.0), (Input::RightTrigger, 110.0)];
    for (input_id, x) in triggers {
        let bar = Rect::new(center.x + x, center.y - 150.0, 60.0, 20.0);
        let value = input.value(input_id);
        surface.fill_rect(bar, body);
        if value > 0.0 {
            surface.fill_rect(
                Rect::new(bar.x, bar.y, bar.width * value, bar.height),
                pressed,
            );
        }
        surface.stroke_rect(bar, 2.0, outline);
    }

    let bumpers = [(Input::LeftBumper, -190.0), (Input::RightBumper, 100.0)];
    for (input_id, x) in bumpers {
        let bumper = Rect::new(center.x + x, center.y - 120.0, 90.0, 18.0);
        let fill = if input.pressed(input_id) { pressed } else { body };
        surface.fill_rect(bumper, fill);
        surface.stroke_rect(bumper, 2.0, outline);
    }

    // Body with grips
    surface.fill_circle(center.offset(-140.0, 40.0), 80.0, body);
    surface.fill_circle(center.offset(140.0, 40.0), 80.0, body);
    surface.fill_rect(Rect::centered(center, 320.0, 180.0), body);
    surface.stroke_rect(Rect::centered(center, 320.0, 180.0), 2.0, outline);

    draw_stick(
        surface,
        center.offset(-110.0, -30.0),
        input.axis(Input::LeftStickX),
        input.axis(Input::LeftStickY),
        input.pressed(Input::LeftStickPress),
        (sticks, pressed, outline),
    );
    draw_stick(
        surface,
        center.offset(60.0, 50.0),
        input.axis(Input::RightStickX),
        input.axis(Input::RightStickY),
        input.pressed(Input::RightStickPress),
        (sticks, pressed, outline),
    );

    let dpad = center.offset(-60.0, 50.0);
    for (input_id, dx, dy) in [
        (Input::DpadUp, 0.0, -24.0),
        (Input::DpadDown, 0.0, 24.0),
        (Input::DpadLeft, -24.0, 0.0),
        (Input::DpadRight, 24.0, 0.0),
    ] {
        let square = Rect::centered(dpad.offset(dx, dy), 22.0, 22.0);
        let fill = if input.pressed(input_id) { pressed } else { body };
        surface.fill_rect(square, fill);
        surface.stroke_rect(square, 2.0, outline);
    }

    let face = center.offset(110.0, -30.0);
    for (input_id, id, dx, dy) in [
        (Input::Y, "colorButtonY", 0.0, -30.0),
        (Input::A, "colorButtonA", 0.0, 30.0),
        (Input::X, "colorButtonX", -30.0, 0.0),
        (Input::B, "colorButtonB", 30.0, 0.0),
    ] {
        let position = face.offset(dx, dy);
        let color = options.color(id);
        if input.pressed(input_id) {
            surface.fill_circle(position, 13.0, color);
        } else {
            surface.fill_circle(position, 13.0, body);
            surface.stroke_circle(position, 13.0, 3.0, color);
        }
        if options.flag("drawLabels") {
            let label = input_id.label();
            let width = surface.measure_text(label, 14.0);
            surface.fill_text(
                label,
                position.offset(-width / 2.0, 5.0),
                14.0,
                outline,
            );
        }
    }

    for (input_id, dx, dy, radius) in [
        (Input::Back, -35.0, -30.0, 9.0),
        (Input::Start, 35.0, -30.0, 9.0),
        (Input::Home, 0.0, -75.0, 16.0),
    ] {
        let position = center.offset(dx, dy);
        let fill = if input.pressed(input_id) { pressed } else { body };
        surface.fill_circle(position, radius, fill);
        surface.stroke_circle(position, radius, 2.0, outline);
    }

    let title = options.text("title");
    if !title.is_empty() {
        let width = surface.measure_text(title, 20.0);
        surface.fill_text(
            title,
            center.offset(-width / 2.0, 150.0),
            20.0,
            outline,
        );
    }
}

fn draw_stick(
    surface: &mut dyn Surface,
    base: Point,
    x: f32,
    y: f32,
    pressed: bool,
    (stick, highlight, outline): (Rgba, Rgba, Rgba),
) {
    surface.stroke_circle(base, 32.0, 2.0, outline);
    let knob = base.offset(x * 20.0, y * 20.0);
    surface.fill_circle(knob, 20.0, if pressed { highlight } else { stick });
    surface.stroke_circle(knob, 20.0, 2.0, outline);
}

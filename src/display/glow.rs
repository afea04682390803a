// SPDX-License-Identifier: MPL-2.0

//! Glow-text rendering.
//!
//! Draws a label with a soft neon outline and auto-shrinks it to fit the
//! surface width. Cairo has no blur primitive, so the glow is faked by
//! drawing the text four times per offset at the four cardinal directions
//! with decreasing alpha, then once more at full opacity on top.

use cairo;
use pango;
use pangocairo;

/// Smallest font size the fit loop will produce.
pub const MIN_FONT_SIZE: i32 = 10;
/// Size decrement per fit iteration.
const SHRINK_STEP: i32 = 2;
/// Text must fit within this fraction of the surface width.
const FIT_RATIO: f64 = 0.9;

/// The clock uses a monospaced face so the digits don't wobble each second;
/// everything else gets a proportional bold face.
fn font_family(text: &str) -> &'static str {
    if text.contains(':') {
        "Monospace Bold"
    } else {
        "Sans Bold"
    }
}

/// Shrink `base_size` until the widest line fits within `FIT_RATIO` of the
/// surface width, never going below [`MIN_FONT_SIZE`]. `widest` measures the
/// widest line of the text at a given font size.
fn fit_font_size<F>(base_size: i32, surface_width: f64, mut widest: F) -> i32
where
    F: FnMut(i32) -> f64,
{
    let mut size = base_size;
    while widest(size) > surface_width * FIT_RATIO && size > MIN_FONT_SIZE {
        size = (size - SHRINK_STEP).max(MIN_FONT_SIZE);
    }
    size
}

/// Render `text` centered on a `width` x `height` surface with a glow
/// outline in `color`. `divisor` picks the base font size from the surface
/// width; denser panels pass a larger divisor.
pub fn draw_glow_text(
    cr: &cairo::Context,
    width: f64,
    height: f64,
    text: &str,
    color: (f64, f64, f64),
    divisor: f64,
) {
    if text.is_empty() {
        return;
    }

    let layout = pangocairo::functions::create_layout(cr);
    layout.set_alignment(pango::Alignment::Center);

    let family = font_family(text);
    let base_size = (width / divisor).round() as i32;

    let size = fit_font_size(base_size, width, |size| {
        let font = pango::FontDescription::from_string(&format!("{} {}", family, size));
        layout.set_font_description(Some(&font));
        text.lines()
            .map(|line| {
                layout.set_text(line);
                layout.pixel_size().0
            })
            .max()
            .unwrap_or(0) as f64
    });

    let font = pango::FontDescription::from_string(&format!("{} {}", family, size));
    layout.set_font_description(Some(&font));
    layout.set_text(text);

    // Center the whole block on the surface
    let (text_width, text_height) = layout.pixel_size();
    let x = (width - text_width as f64) / 2.0;
    let y = (height - text_height as f64) / 2.0;

    let (red, green, blue) = color;

    // Glow passes, widest offset first so the faintest layer sits lowest
    for offset in (1..=4).rev() {
        let alpha = (30.0 / offset as f64) / 255.0;
        cr.set_source_rgba(red, green, blue, alpha);
        for (dx, dy) in [(-offset, 0), (offset, 0), (0, -offset), (0, offset)] {
            cr.move_to(x + dx as f64, y + dy as f64);
            pangocairo::functions::show_layout(cr, &layout);
        }
    }

    // Full-opacity text on top
    cr.set_source_rgb(red, green, blue);
    cr.move_to(x, y);
    pangocairo::functions::show_layout(cr, &layout);
}

/// Render one frame into an ARGB shared-memory canvas: solid black
/// background, then the panel text composited at the fade opacity.
pub fn render_frame(
    canvas: &mut [u8],
    width: i32,
    height: i32,
    text: &str,
    color: (f64, f64, f64),
    divisor: f64,
    opacity: f64,
) {
    // Use unsafe to extend the lifetime for Cairo
    // This is safe because the surface doesn't outlive the canvas buffer
    let surface = unsafe {
        let ptr = canvas.as_mut_ptr();
        let len = canvas.len();
        let static_slice: &'static mut [u8] = std::slice::from_raw_parts_mut(ptr, len);

        cairo::ImageSurface::create_for_data(
            static_slice,
            cairo::Format::ARgb32,
            width,
            height,
            width * 4,
        )
        .expect("Failed to create cairo surface")
    };

    {
        let cr = cairo::Context::new(&surface).expect("Failed to create cairo context");

        // Solid black background
        cr.save().expect("Failed to save");
        cr.set_operator(cairo::Operator::Source);
        cr.set_source_rgb(0.0, 0.0, 0.0);
        cr.paint().expect("Failed to clear");
        cr.restore().expect("Failed to restore");

        // Paint the panel through a group so the fade opacity applies to
        // the glow passes and the top text together
        cr.push_group();
        draw_glow_text(&cr, width as f64, height as f64, text, color, divisor);
        cr.pop_group_to_source().expect("Failed to set group source");
        cr.paint_with_alpha(opacity.clamp(0.0, 1.0))
            .expect("Failed to composite panel");
    }

    surface.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fake measurer: every character is `char_width` pixels wide.
    fn linear_measure(char_count: usize, char_width: f64) -> impl FnMut(i32) -> f64 {
        move |size| char_count as f64 * char_width * size as f64 / 10.0
    }

    #[test]
    fn test_fit_keeps_base_size_when_text_fits() {
        let size = fit_font_size(100, 1000.0, |_| 100.0);
        assert_eq!(size, 100);
    }

    #[test]
    fn test_fit_shrinks_until_text_fits() {
        // 20 chars at 5px/char per 10 units of size: width = 10 * size
        let size = fit_font_size(100, 500.0, linear_measure(20, 5.0));
        // Needs 10 * size <= 450
        assert!(size as f64 * 10.0 <= 450.0);
        assert!(size >= MIN_FONT_SIZE);
    }

    #[test]
    fn test_fit_never_goes_below_floor() {
        // Text so long it can never fit
        let size = fit_font_size(120, 100.0, linear_measure(500, 8.0));
        assert_eq!(size, MIN_FONT_SIZE);
    }

    #[test]
    fn test_fit_floor_holds_from_odd_base() {
        let size = fit_font_size(13, 100.0, linear_measure(500, 8.0));
        assert_eq!(size, MIN_FONT_SIZE);
    }

    #[test]
    fn test_clock_text_selects_monospace() {
        assert_eq!(font_family("12:30:05"), "Monospace Bold");
        assert_eq!(font_family("15°\nLIGHT RAIN"), "Sans Bold");
    }
}

//! Per-pass render-target sizing from chained scale rules (spec §4.F).

use slangfx_common::Size;
use slangfx_presets::{Scale2D, ScaleType};

/// Round half-to-even ("banker's rounding"); the source's own rounding rule
/// for non-integer scale outputs is unspecified, so this workspace picks one
/// and documents it (spec §9 open question).
pub fn round_banker(x: f32) -> u32 {
    let floor = x.floor();
    let diff = x - floor;
    let floor_u = floor as i64;
    let rounded = if diff < 0.5 {
        floor_u
    } else if diff > 0.5 {
        floor_u + 1
    } else if floor_u % 2 == 0 {
        floor_u
    } else {
        floor_u + 1
    };
    rounded.max(0) as u32
}

fn scale_axis(scale_type: ScaleType, scale: f32, prev_axis: u32, viewport_axis: u32) -> u32 {
    match scale_type {
        ScaleType::Source => round_banker(prev_axis as f32 * scale),
        ScaleType::Absolute => round_banker(scale),
        ScaleType::Viewport => round_banker(viewport_axis as f32 * scale),
    }
}

/// Compute a pass's render-target size (spec §4.F "Sizing"). `prev` is the
/// immediately preceding pass's output size, or the source rectangle's size
/// itself for pass 0; `viewport` is the drawable size.
pub fn compute_pass_size(scaling: &Scale2D, prev: Size<u32>, viewport: Size<u32>) -> Size<u32> {
    Size {
        width: scale_axis(scaling.x, scaling.scale_x, prev.width, viewport.width).max(1),
        height: scale_axis(scaling.y, scaling.scale_y, prev.height, viewport.height).max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_scale_multiplies_previous_pass_size() {
        let scaling = Scale2D {
            x: ScaleType::Source,
            y: ScaleType::Source,
            scale_x: 0.5,
            scale_y: 0.5,
        };
        let size = compute_pass_size(
            &scaling,
            Size { width: 640, height: 480 },
            Size { width: 1280, height: 720 },
        );
        assert_eq!(size, Size { width: 320, height: 240 });
    }

    #[test]
    fn absolute_scale_ignores_previous_size() {
        let scaling = Scale2D {
            x: ScaleType::Absolute,
            y: ScaleType::Absolute,
            scale_x: 256.0,
            scale_y: 256.0,
        };
        let size = compute_pass_size(
            &scaling,
            Size { width: 320, height: 240 },
            Size { width: 1280, height: 720 },
        );
        assert_eq!(size, Size { width: 256, height: 256 });
    }

    #[test]
    fn viewport_scale_tracks_drawable_size() {
        let scaling = Scale2D {
            x: ScaleType::Viewport,
            y: ScaleType::Viewport,
            scale_x: 1.0,
            scale_y: 1.0,
        };
        let size = compute_pass_size(
            &scaling,
            Size { width: 256, height: 256 },
            Size { width: 1280, height: 720 },
        );
        assert_eq!(size, Size { width: 1280, height: 720 });
    }

    #[test]
    fn banker_rounding_rounds_to_even() {
        assert_eq!(round_banker(0.5), 0);
        assert_eq!(round_banker(1.5), 2);
        assert_eq!(round_banker(2.5), 2);
        assert_eq!(round_banker(2.4), 2);
        assert_eq!(round_banker(2.6), 3);
    }
}

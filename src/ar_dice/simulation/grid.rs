//! Procedural grid texture for plane indicators

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use crate::ar_dice::types::PlaneIndicatorSettings;

pub const GRID_TEXTURE_SIZE: u32 = 256;
const GRID_LINE_WIDTH: u32 = 3;

/// RGBA8 pixels of a square grid, row-major.
pub fn grid_pixels(size: u32, settings: &PlaneIndicatorSettings) -> Vec<u8> {
    let cells = settings.grid_cells.clamp(1, size.max(1));
    let cell = (size / cells).max(1);
    let line = settings.line_color.to_rgba8();
    let fill = settings.fill_color.to_rgba8();

    let mut data = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let on_line = x % cell < GRID_LINE_WIDTH
                || y % cell < GRID_LINE_WIDTH
                || x >= size.saturating_sub(GRID_LINE_WIDTH)
                || y >= size.saturating_sub(GRID_LINE_WIDTH);
            data.extend_from_slice(if on_line { &line } else { &fill });
        }
    }
    data
}

pub fn grid_image(settings: &PlaneIndicatorSettings) -> Image {
    Image::new(
        Extent3d {
            width: GRID_TEXTURE_SIZE,
            height: GRID_TEXTURE_SIZE,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        grid_pixels(GRID_TEXTURE_SIZE, settings),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_has_lines_and_fill() {
        let settings = PlaneIndicatorSettings::default();
        let pixels = grid_pixels(64, &settings);
        assert_eq!(pixels.len(), 64 * 64 * 4);

        let line = settings.line_color.to_rgba8();
        let fill = settings.fill_color.to_rgba8();
        // Top-left corner sits on a line; the middle of the first cell does not.
        assert_eq!(&pixels[0..4], &line);
        let cell = 64 / settings.grid_cells;
        let mid = ((cell / 2) * 64 + cell / 2) as usize * 4;
        assert_eq!(&pixels[mid..mid + 4], &fill);
    }

    #[test]
    fn test_tiny_grid_is_all_line() {
        let settings = PlaneIndicatorSettings::default();
        let line = settings.line_color.to_rgba8();
        for size in [0, 1, 2] {
            let pixels = grid_pixels(size, &settings);
            assert_eq!(pixels.len(), (size * size * 4) as usize);
            assert!(pixels.chunks(4).all(|p| p == line));
        }
    }
}

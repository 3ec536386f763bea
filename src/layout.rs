//! Collage layouts: fixed rectangle arrangements for placing up to five
//! images on one banner canvas.

use serde::Serialize;

use crate::constants::MAX_COLLAGE_CELLS;

/// A cell of the canvas, every field in percent of the canvas size.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct Rect {
    pub width: u8,
    pub height: u8,
    pub top: u8,
    pub left: u8,
}

const fn rect(width: u8, height: u8, top: u8, left: u8) -> Rect {
    Rect {
        width,
        height,
        top,
        left,
    }
}

const FULL: [Rect; 1] = [rect(100, 100, 0, 0)];

const SPLIT: [Rect; 2] = [rect(50, 100, 0, 0), rect(50, 100, 0, 50)];

const ONE_AND_TWO: [Rect; 3] = [
    rect(50, 100, 0, 0),
    rect(50, 50, 0, 50),
    rect(50, 50, 50, 50),
];

const GRID: [Rect; 4] = [
    rect(50, 50, 0, 0),
    rect(50, 50, 0, 50),
    rect(50, 50, 50, 0),
    rect(50, 50, 50, 50),
];

const MOSAIC: [Rect; MAX_COLLAGE_CELLS] = [
    rect(40, 50, 0, 0),
    rect(30, 50, 0, 40),
    rect(30, 50, 0, 70),
    rect(50, 50, 50, 0),
    rect(50, 50, 50, 50),
];

/// Returns the collage cells for `image_count` images.
///
/// Counts above five get the five-cell mosaic; images past the fifth are
/// dropped by the caller when pairing cells with images. Zero images yield
/// no cells.
pub fn collage_layout(image_count: usize) -> Vec<Rect> {
    let cells: &[Rect] = match image_count {
        0 => &[],
        1 => &FULL,
        2 => &SPLIT,
        3 => &ONE_AND_TWO,
        4 => &GRID,
        _ => &MOSAIC,
    };

    cells.to_vec()
}

/// Pairs images with their collage cells, ignoring images past the last cell.
pub fn place_images(images: &[String]) -> Vec<(Rect, &str)> {
    collage_layout(images.len())
        .into_iter()
        .zip(images.iter().map(String::as_str))
        .collect()
}

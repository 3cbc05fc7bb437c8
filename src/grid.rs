//! Grid and rectangle math shared by every page kind.
//!
//! Coordinates are millimetres with the origin at the top-left corner of the page and `y`
//! growing downwards. Backends convert to their own coordinate space.

use serde::Serialize;

use crate::capacity::{AFTER_GRID_CAP, AFTER_GRID_COLUMNS, BEFORE_GRID_CAP};

/// A point on the page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a point from page coordinates in millimetres.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle on the page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// X coordinate of the right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Y coordinate of the bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Midpoint of the rectangle.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether `point` lies inside the rectangle, edges included.
    pub fn contains(&self, point: Point) -> bool {
        (self.x..=self.right()).contains(&point.x) && (self.y..=self.bottom()).contains(&point.y)
    }

    /// Shrinks the rectangle by `amount` on every side.
    pub fn inset(&self, amount: f64) -> Rect {
        Rect::new(
            self.x + amount,
            self.y + amount,
            (self.width - 2.0 * amount).max(0.0),
            (self.height - 2.0 * amount).max(0.0),
        )
    }

    /// Splits the rectangle into columns with the given relative weights.
    pub fn split_columns(&self, weights: &[f64]) -> Vec<Rect> {
        let total: f64 = weights.iter().sum();
        let mut x = self.x;
        weights
            .iter()
            .map(|weight| {
                let width = if total > 0.0 {
                    self.width * weight / total
                } else {
                    0.0
                };
                let column = Rect::new(x, self.y, width, self.height);
                x += width;
                column
            })
            .collect()
    }
}

/// How an image is scaled into its cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ImageFit {
    /// Scale to fit entirely inside the cell, preserving aspect ratio.
    Contain,
    /// Scale to fill the cell, preserving aspect ratio and cropping the overflow.
    Cover,
}

/// Grid styles used by the screenshot slides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GridVariant {
    /// "Before" slides: table driven shape, contain scaling.
    Before,
    /// "After" slides: fixed three columns, crop to fill.
    After,
}

impl GridVariant {
    /// Maximum images this variant ever displays.
    pub fn cap(self) -> usize {
        match self {
            Self::Before => BEFORE_GRID_CAP,
            Self::After => AFTER_GRID_CAP,
        }
    }

    /// How images are scaled into their cells.
    pub fn fit(self) -> ImageFit {
        match self {
            Self::Before => ImageFit::Contain,
            Self::After => ImageFit::Cover,
        }
    }

    /// Gap between cells in millimetres.
    pub fn gap(self) -> f64 {
        match self {
            Self::Before => 3.0,
            Self::After => 5.0,
        }
    }

    /// Column/row count for `count` images (already capped).
    pub fn shape(self, count: usize) -> GridShape {
        match self {
            Self::Before => match count {
                0 | 1 => GridShape::new(1, 1),
                2 => GridShape::new(2, 1),
                3 | 4 => GridShape::new(2, 2),
                _ => GridShape::new(3, 2),
            },
            Self::After => GridShape::new(
                AFTER_GRID_COLUMNS,
                ((count + AFTER_GRID_COLUMNS - 1) / AFTER_GRID_COLUMNS).max(1),
            ),
        }
    }
}

/// Number of columns and rows of an image grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GridShape {
    pub columns: usize,
    pub rows: usize,
}

impl GridShape {
    /// Creates a shape of `columns` by `rows` cells.
    pub const fn new(columns: usize, rows: usize) -> Self {
        Self { columns, rows }
    }

    /// Number of cells in the grid.
    pub fn capacity(&self) -> usize {
        self.columns * self.rows
    }
}

/// Divides `area` evenly into `shape` cells separated by `gap`, row-major order.
pub fn cell_rects(area: Rect, shape: GridShape, gap: f64) -> Vec<Rect> {
    let columns = shape.columns.max(1);
    let rows = shape.rows.max(1);
    let cell_width = ((area.width - gap * (columns - 1) as f64) / columns as f64).max(0.0);
    let cell_height = ((area.height - gap * (rows - 1) as f64) / rows as f64).max(0.0);

    (0..rows * columns)
        .map(|index| {
            let row = index / columns;
            let column = index % columns;
            Rect::new(
                area.x + column as f64 * (cell_width + gap),
                area.y + row as f64 * (cell_height + gap),
                cell_width,
                cell_height,
            )
        })
        .collect()
}

/// Rectangle occupied by an image of `image_width` x `image_height` pixels drawn into `cell`
/// with contain scaling, centred in the cell.
pub fn contain_rect(cell: Rect, image_width: u32, image_height: u32) -> Rect {
    if image_width == 0 || image_height == 0 {
        return cell;
    }
    let image_ratio = f64::from(image_width) / f64::from(image_height);
    let cell_ratio = cell.width / cell.height.max(f64::EPSILON);
    let (width, height) = if image_ratio > cell_ratio {
        (cell.width, cell.width / image_ratio)
    } else {
        (cell.height * image_ratio, cell.height)
    };
    Rect::new(
        cell.x + (cell.width - width) / 2.0,
        cell.y + (cell.height - height) / 2.0,
        width,
        height,
    )
}

/// Pixel window of the source image that fills `cell` with cover scaling, centred.
///
/// Returns `(x, y, width, height)` in source pixels.
pub fn cover_crop(cell: Rect, image_width: u32, image_height: u32) -> (u32, u32, u32, u32) {
    if image_width == 0 || image_height == 0 || cell.width <= 0.0 || cell.height <= 0.0 {
        return (0, 0, image_width, image_height);
    }
    let cell_ratio = cell.width / cell.height;
    let image_ratio = f64::from(image_width) / f64::from(image_height);
    if image_ratio > cell_ratio {
        let width = ((f64::from(image_height) * cell_ratio).round() as u32).clamp(1, image_width);
        ((image_width - width) / 2, 0, width, image_height)
    } else {
        let height = ((f64::from(image_width) / cell_ratio).round() as u32).clamp(1, image_height);
        (0, (image_height - height) / 2, image_width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn before_shapes_follow_lookup_table() {
        let shapes: Vec<_> = (1..=6).map(|n| GridVariant::Before.shape(n)).collect();
        assert_eq!(
            shapes,
            vec![
                GridShape::new(1, 1),
                GridShape::new(2, 1),
                GridShape::new(2, 2),
                GridShape::new(2, 2),
                GridShape::new(3, 2),
                GridShape::new(3, 2),
            ]
        );
    }

    #[test]
    fn after_shapes_use_three_columns() {
        assert_eq!(GridVariant::After.shape(2), GridShape::new(3, 1));
        assert_eq!(GridVariant::After.shape(3), GridShape::new(3, 1));
        assert_eq!(GridVariant::After.shape(4), GridShape::new(3, 2));
        assert_eq!(GridVariant::After.shape(8), GridShape::new(3, 3));
    }

    #[test]
    fn cells_tile_the_area() {
        let area = Rect::new(10.0, 20.0, 100.0, 50.0);
        let cells = cell_rects(area, GridShape::new(3, 2), 5.0);
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0].x, 10.0);
        assert_eq!(cells[0].y, 20.0);
        assert!((cells[2].right() - area.right()).abs() < 1e-9);
        assert!((cells[5].bottom() - area.bottom()).abs() < 1e-9);
        assert!((cells[1].x - (cells[0].right() + 5.0)).abs() < 1e-9);
    }

    #[test]
    fn contain_preserves_aspect_ratio() {
        let cell = Rect::new(0.0, 0.0, 100.0, 100.0);
        let wide = contain_rect(cell, 400, 200);
        assert_eq!(wide.width, 100.0);
        assert_eq!(wide.height, 50.0);
        assert_eq!(wide.y, 25.0);

        let tall = contain_rect(cell, 100, 400);
        assert_eq!(tall.height, 100.0);
        assert_eq!(tall.width, 25.0);
    }

    #[test]
    fn cover_crops_the_long_side() {
        let cell = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(cover_crop(cell, 400, 400), (0, 100, 400, 200));
        assert_eq!(cover_crop(cell, 800, 200), (200, 0, 400, 200));
    }

    #[test]
    fn columns_split_by_weight() {
        let columns = Rect::new(0.0, 0.0, 100.0, 10.0).split_columns(&[70.0, 30.0]);
        assert_eq!(columns[0].width, 70.0);
        assert_eq!(columns[1].x, 70.0);
        assert_eq!(columns[1].width, 30.0);
    }
}

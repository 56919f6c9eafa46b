use serde::{Deserialize, Serialize};

use crate::settings::GridSettings;

/// Axis-aligned rectangle, positioned relative to the grid content area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn with_padding(&self, padding: f32) -> Self {
        Self::new(
            self.x - padding,
            self.y - padding,
            self.width + padding * 2.0,
            self.height + padding * 2.0,
        )
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    pub fn contains(&self, other: &Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }
}

/// Tight bounding box of a set of rectangles, `None` when empty.
pub fn bounds_of<'a, I>(rects: I) -> Option<Rect>
where
    I: IntoIterator<Item = &'a Rect>,
{
    let mut iter = rects.into_iter();
    let first = *iter.next()?;
    Some(iter.fold(first, |acc, r| acc.union(r)))
}

/// Cell coordinates of an item inside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPosition {
    pub column: usize,
    pub row: usize,
}

impl GridPosition {
    /// Derive the cell a rectangle occupies from its offset in the content
    /// area. Offsets left of or above the origin clamp to cell zero.
    pub fn of(rect: &Rect, settings: &GridSettings) -> Self {
        let stride = settings.cell_width + settings.gap;
        let column = if stride > 0.0 {
            (rect.x.max(0.0) / stride).floor() as usize
        } else {
            0
        };
        let row = if settings.row_height > 0.0 {
            (rect.y.max(0.0) / settings.row_height).floor() as usize
        } else {
            0
        };
        Self { column, row }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GridSettings;

    fn settings() -> GridSettings {
        GridSettings {
            cell_width: 100.0,
            gap: 10.0,
            border_radius: 8.0,
            row_height: 120.0,
            container_width: 450.0,
            columns_per_row: 4,
        }
    }

    #[test]
    fn union_covers_both_rects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 5.0, 10.0, 20.0);
        let u = a.union(&b);
        assert!(u.contains(&a));
        assert!(u.contains(&b));
        assert_eq!(u, Rect::new(0.0, 0.0, 30.0, 25.0));
    }

    #[test]
    fn padding_expands_symmetrically() {
        let r = Rect::new(10.0, 10.0, 50.0, 30.0).with_padding(8.0);
        assert_eq!(r, Rect::new(2.0, 2.0, 66.0, 46.0));
    }

    #[test]
    fn grid_position_maps_offsets_to_cells() {
        let s = settings();
        let first = GridPosition::of(&Rect::new(0.0, 0.0, 100.0, 110.0), &s);
        assert_eq!(first, GridPosition { column: 0, row: 0 });

        let third_col = GridPosition::of(&Rect::new(220.0, 0.0, 100.0, 110.0), &s);
        assert_eq!(third_col.column, 2);

        let second_row = GridPosition::of(&Rect::new(110.0, 120.0, 100.0, 110.0), &s);
        assert_eq!(second_row, GridPosition { column: 1, row: 1 });
    }

    #[test]
    fn grid_position_clamps_negative_offsets() {
        let s = settings();
        let pos = GridPosition::of(&Rect::new(-5.0, -2.0, 100.0, 110.0), &s);
        assert_eq!(pos, GridPosition { column: 0, row: 0 });
    }

    #[test]
    fn bounds_of_empty_is_none() {
        assert!(bounds_of(std::iter::empty::<&Rect>()).is_none());
    }
}

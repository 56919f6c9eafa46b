use std::collections::{BTreeSet, HashSet};

use crate::detect::DayGroup;
use crate::geometry::GridPosition;
use crate::settings::GridSettings;

/// The five visual arrangements a day group can take in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Exactly one member.
    Single,
    /// All members on one grid row.
    Line,
    /// Every row completely filled.
    Rectangle,
    /// Last row partially filled; the outline needs a notch.
    Cutout,
    /// Two rows with disjoint column sets; drawn as two outlines plus a
    /// connector so the border does not cut through unrelated neighbors.
    Split,
}

/// Decide which arrangement applies.
///
/// Split is checked before the rectangle/cutout decision: a split group
/// always spans more than one row, but a single enclosing rectangle would
/// collide with the groups rendered between its two regions.
pub fn classify(group: &DayGroup, settings: &GridSettings) -> ShapeKind {
    if group.members.len() == 1 {
        return ShapeKind::Single;
    }

    let positions: Vec<GridPosition> = group
        .members
        .iter()
        .map(|m| GridPosition::of(&m.rect, settings))
        .collect();

    let rows: BTreeSet<usize> = positions.iter().map(|p| p.row).collect();
    if rows.len() == 1 {
        return ShapeKind::Line;
    }

    if rows.len() == 2 {
        let first_row = *rows.first().unwrap_or(&0);
        let last_row = *rows.last().unwrap_or(&0);
        let first_cols: HashSet<usize> = positions
            .iter()
            .filter(|p| p.row == first_row)
            .map(|p| p.column)
            .collect();
        let last_cols: HashSet<usize> = positions
            .iter()
            .filter(|p| p.row == last_row)
            .map(|p| p.column)
            .collect();
        if first_cols.is_disjoint(&last_cols) {
            return ShapeKind::Split;
        }
    }

    let remainder = group.members.len() % settings.columns_per_row.max(1);
    if remainder == 0 {
        ShapeKind::Rectangle
    } else {
        ShapeKind::Cutout
    }
}

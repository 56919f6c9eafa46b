use crate::classify::{ShapeKind, classify};
use crate::detect::DayGroup;
use crate::geometry::{GridPosition, Rect, bounds_of};
use crate::settings::GridSettings;

/// Breathing room between an item's content edge and its group border.
pub const OUTLINE_PADDING: f32 = 8.0;
/// Width of the top-edge opening reserved for the day badge.
pub const BADGE_GAP_WIDTH: f32 = 56.0;
/// Where the badge opening starts, measured from the outline's left edge.
pub const BADGE_GAP_OFFSET: f32 = 16.0;

/// Below this length a corner or jog is drawn as a straight joint.
const EPSILON: f32 = 0.5;

/// A generated group outline: SVG path data plus the box it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub outline: String,
    pub bounds: Rect,
    /// Padded box whose top edge carries the badge. For split groups this is
    /// the chronologically-first member's own box, since neither rectangle
    /// reserves a gap.
    pub badge_anchor: Rect,
}

/// Arc direction for a quarter-circle corner. Convex corners of a clockwise
/// outline sweep clockwise; concave (notch) corners sweep the other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    Clockwise,
    CounterClockwise,
}

/// Incremental SVG path-data writer.
#[derive(Debug, Default)]
pub struct PathBuilder {
    d: String,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.cmd(format_args!("M {:.2} {:.2}", x, y));
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.cmd(format_args!("L {:.2} {:.2}", x, y));
    }

    pub fn arc_to(&mut self, radius: f32, sweep: Sweep, x: f32, y: f32) {
        let flag = match sweep {
            Sweep::Clockwise => 1,
            Sweep::CounterClockwise => 0,
        };
        self.cmd(format_args!(
            "A {:.2} {:.2} 0 0 {} {:.2} {:.2}",
            radius, radius, flag, x, y
        ));
    }

    pub fn close(&mut self) {
        self.cmd(format_args!("Z"));
    }

    pub fn finish(self) -> String {
        self.d
    }

    fn cmd(&mut self, args: std::fmt::Arguments<'_>) {
        use std::fmt::Write;
        if !self.d.is_empty() {
            self.d.push(' ');
        }
        let _ = self.d.write_fmt(args);
    }
}

/// Horizontal span of the badge opening in a box's top edge, clamped inside
/// the rounded corners. `None` when the box is too narrow to keep one.
fn badge_gap_span(bounds: &Rect, radius: f32) -> Option<(f32, f32)> {
    let start = (bounds.x + BADGE_GAP_OFFSET).max(bounds.x + radius);
    let end = (start + BADGE_GAP_WIDTH).min(bounds.right() - radius);
    if end - start < EPSILON {
        None
    } else {
        Some((start, end))
    }
}

fn clamp_radius(radius: f32, bounds: &Rect) -> f32 {
    radius
        .min(bounds.width / 2.0)
        .min(bounds.height / 2.0)
        .max(0.0)
}

/// Shared primitive for single, line and rectangle shapes: a clockwise
/// rounded rectangle whose top edge is interrupted by the badge opening.
/// With an opening the path runs from its right lip around to its left lip
/// and stays open; without one it closes.
pub fn rounded_rect_with_gap(bounds: &Rect, radius: f32, gap: bool) -> String {
    let r = clamp_radius(radius, bounds);
    let (x, y) = (bounds.x, bounds.y);
    let (right, bottom) = (bounds.right(), bounds.bottom());
    let span = if gap { badge_gap_span(bounds, r) } else { None };

    let mut pb = PathBuilder::new();
    match span {
        Some((gap_start, gap_end)) => {
            pb.move_to(gap_end, y);
            pb.line_to(right - r, y);
            pb.arc_to(r, Sweep::Clockwise, right, y + r);
            pb.line_to(right, bottom - r);
            pb.arc_to(r, Sweep::Clockwise, right - r, bottom);
            pb.line_to(x + r, bottom);
            pb.arc_to(r, Sweep::Clockwise, x, bottom - r);
            pb.line_to(x, y + r);
            pb.arc_to(r, Sweep::Clockwise, x + r, y);
            pb.line_to(gap_start, y);
        }
        None => {
            pb.move_to(x + r, y);
            pb.line_to(right - r, y);
            pb.arc_to(r, Sweep::Clockwise, right, y + r);
            pb.line_to(right, bottom - r);
            pb.arc_to(r, Sweep::Clockwise, right - r, bottom);
            pb.line_to(x + r, bottom);
            pb.arc_to(r, Sweep::Clockwise, x, bottom - r);
            pb.line_to(x, y + r);
            pb.arc_to(r, Sweep::Clockwise, x + r, y);
            pb.close();
        }
    }
    pb.finish()
}

/// Horizontal jog in a vertical run: the outline travels along `x_from` and
/// continues along `x_to` after the seam. `down` is the travel direction.
///
/// The two corners take opposite sweeps depending on which side the jog
/// turns; the inward one reads as a notch.
fn vertical_jog(pb: &mut PathBuilder, radius: f32, x_from: f32, x_to: f32, seam: f32, down: bool) {
    let dx = x_to - x_from;
    if dx.abs() < EPSILON {
        pb.line_to(x_to, seam);
        return;
    }
    let r = radius.min(dx.abs() / 2.0);
    let dir = if down { 1.0 } else { -1.0 };
    let step = if dx > 0.0 { 1.0 } else { -1.0 };

    // Traveling down and turning right (east) is a left turn for a clockwise
    // outline, so it sweeps counter-clockwise; all other combinations mirror.
    let first = turn_sweep(down, dx > 0.0);
    let second = match first {
        Sweep::Clockwise => Sweep::CounterClockwise,
        Sweep::CounterClockwise => Sweep::Clockwise,
    };

    pb.line_to(x_from, seam - dir * r);
    pb.arc_to(r, first, x_from + step * r, seam);
    pb.line_to(x_to - step * r, seam);
    pb.arc_to(r, second, x_to, seam + dir * r);
}

fn turn_sweep(down: bool, toward_positive_x: bool) -> Sweep {
    // down + west, up + east: right turns (convex). down + east, up + west:
    // left turns (concave).
    if down == toward_positive_x {
        Sweep::CounterClockwise
    } else {
        Sweep::Clockwise
    }
}

/// Non-convex outline for a wrapped group: the first-row extent on top, the
/// last-row extent below, joined with rounded jogs where they meet unevenly.
/// The top edge keeps the badge opening.
///
/// Middle rows of groups spanning three or more rows are enclosed vertically
/// but do not get their own steps; only the first and last effective rows
/// shape the outline.
fn staircase_outline(top: &Rect, bottom: &Rect, radius: f32) -> String {
    let r = clamp_radius(radius, top).min(clamp_radius(radius, bottom));
    let seam = (top.bottom() + bottom.y) / 2.0;
    let span = badge_gap_span(top, r);

    let mut pb = PathBuilder::new();
    let top_start = match span {
        Some((_, gap_end)) => gap_end,
        None => top.x + r,
    };

    pb.move_to(top_start, top.y);
    pb.line_to(top.right() - r, top.y);
    pb.arc_to(r, Sweep::Clockwise, top.right(), top.y + r);

    // Right side: down the first-row extent, jog to the last-row extent.
    vertical_jog(&mut pb, r, top.right(), bottom.right(), seam, true);
    pb.line_to(bottom.right(), bottom.bottom() - r);
    pb.arc_to(r, Sweep::Clockwise, bottom.right() - r, bottom.bottom());

    // Across the bottom and back up the left side.
    pb.line_to(bottom.x + r, bottom.bottom());
    pb.arc_to(r, Sweep::Clockwise, bottom.x, bottom.bottom() - r);
    vertical_jog(&mut pb, r, bottom.x, top.x, seam, false);
    pb.line_to(top.x, top.y + r);
    pb.arc_to(r, Sweep::Clockwise, top.x + r, top.y);

    match span {
        Some((gap_start, _)) => pb.line_to(gap_start, top.y),
        None => pb.close(),
    }
    pb.finish()
}

/// Two plain rounded rectangles joined by a polyline that crosses the
/// vertical midpoint of the inter-row gap, so the connector stays clear of
/// the borders drawn for the groups in between.
fn split_outline(top: &Rect, bottom: &Rect, radius: f32) -> String {
    let r = clamp_radius(radius, top).min(clamp_radius(radius, bottom));
    let mut outline = rounded_rect_with_gap(top, r, false);
    outline.push(' ');
    outline.push_str(&rounded_rect_with_gap(bottom, r, false));

    let mid_y = (top.bottom() + bottom.y) / 2.0;
    let mut pb = PathBuilder::new();
    if bottom.center_x() >= top.center_x() {
        // Bottom region sits to the right: leave from the top rectangle's
        // bottom-right corner center, enter at the bottom one's top-left.
        pb.move_to(top.right() - r, top.bottom() - r);
        pb.line_to(top.right() + r, mid_y);
        pb.line_to(bottom.x - r, mid_y);
        pb.line_to(bottom.x + r, bottom.y + r);
    } else {
        pb.move_to(top.x + r, top.bottom() - r);
        pb.line_to(top.x - r, mid_y);
        pb.line_to(bottom.right() + r, mid_y);
        pb.line_to(bottom.right() - r, bottom.y + r);
    }

    outline.push(' ');
    outline.push_str(&pb.finish());
    outline
}

/// Padded extents of the first and last effective rows of a group.
fn row_extents(group: &DayGroup, settings: &GridSettings) -> Option<(Rect, Rect)> {
    let rows: Vec<usize> = group
        .members
        .iter()
        .map(|m| GridPosition::of(&m.rect, settings).row)
        .collect();
    let first_row = *rows.iter().min()?;
    let last_row = *rows.iter().max()?;

    let extent_of = |row: usize| {
        bounds_of(
            group
                .members
                .iter()
                .zip(&rows)
                .filter(|(_, r)| **r == row)
                .map(|(m, _)| &m.rect),
        )
        .map(|b| b.with_padding(OUTLINE_PADDING))
    };
    Some((extent_of(first_row)?, extent_of(last_row)?))
}

/// Build the outline for one group, or `None` when there is nothing to draw.
pub fn generate(group: &DayGroup, settings: &GridSettings) -> Option<Shape> {
    if group.members.is_empty() {
        return None;
    }
    let kind = classify(group, settings);
    let radius = settings.border_radius;

    let shape = match kind {
        ShapeKind::Single | ShapeKind::Line | ShapeKind::Rectangle => {
            let bounds =
                bounds_of(group.members.iter().map(|m| &m.rect))?.with_padding(OUTLINE_PADDING);
            Shape {
                kind,
                outline: rounded_rect_with_gap(&bounds, radius, true),
                bounds,
                badge_anchor: bounds,
            }
        }
        ShapeKind::Cutout => {
            let (first, last) = row_extents(group, settings)?;
            Shape {
                kind,
                outline: staircase_outline(&first, &last, radius),
                bounds: first.union(&last),
                badge_anchor: first,
            }
        }
        ShapeKind::Split => {
            let (first, last) = row_extents(group, settings)?;
            Shape {
                kind,
                outline: split_outline(&first, &last, radius),
                bounds: first.union(&last),
                badge_anchor: group.members[0].rect.with_padding(OUTLINE_PADDING),
            }
        }
    };
    Some(shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ItemSnapshot;

    const CELL: f32 = 100.0;
    const GAP: f32 = 10.0;
    const ROW: f32 = 120.0;

    fn settings(columns: usize) -> GridSettings {
        GridSettings {
            cell_width: CELL,
            gap: GAP,
            border_radius: 8.0,
            row_height: ROW,
            container_width: columns as f32 * (CELL + GAP),
            columns_per_row: columns,
        }
    }

    fn member(column: usize, row: usize) -> ItemSnapshot {
        ItemSnapshot {
            id: format!("c{column}r{row}"),
            group_key: None,
            category_key: None,
            rect: Rect::new(
                column as f32 * (CELL + GAP),
                row as f32 * ROW,
                CELL,
                ROW - GAP,
            ),
            occurs_at: None,
            visible: true,
        }
    }

    fn group(cells: &[(usize, usize)]) -> DayGroup {
        DayGroup {
            key: "2026-08-27".to_string(),
            category_key: None,
            members: cells.iter().map(|&(c, r)| member(c, r)).collect(),
        }
    }

    fn subpath_count(outline: &str) -> usize {
        outline.matches('M').count()
    }

    #[test]
    fn empty_group_generates_nothing() {
        let g = DayGroup {
            key: "2026-08-27".to_string(),
            category_key: None,
            members: Vec::new(),
        };
        assert!(generate(&g, &settings(3)).is_none());
    }

    #[test]
    fn single_bounds_equal_member_rect_padded() {
        let g = group(&[(1, 0)]);
        let shape = generate(&g, &settings(3)).unwrap();
        assert_eq!(shape.kind, ShapeKind::Single);
        assert_eq!(
            shape.bounds,
            g.members[0].rect.with_padding(OUTLINE_PADDING)
        );
    }

    #[test]
    fn gapped_outline_stays_open_for_the_badge() {
        let bounds = Rect::new(0.0, 0.0, 200.0, 100.0);
        let d = rounded_rect_with_gap(&bounds, 8.0, true);
        assert!(!d.contains('Z'));
        // Starts at the gap's right lip, ends at its left lip.
        assert!(d.starts_with(&format!("M {:.2} 0.00", BADGE_GAP_OFFSET + BADGE_GAP_WIDTH)));
        assert!(d.ends_with(&format!("L {:.2} 0.00", BADGE_GAP_OFFSET)));
    }

    #[test]
    fn narrow_box_drops_the_gap_and_closes() {
        let bounds = Rect::new(0.0, 0.0, 20.0, 100.0);
        let d = rounded_rect_with_gap(&bounds, 8.0, true);
        assert!(d.contains('Z'));
    }

    #[test]
    fn line_outline_covers_the_whole_row() {
        let g = group(&[(0, 0), (1, 0), (2, 0)]);
        let shape = generate(&g, &settings(3)).unwrap();
        assert_eq!(shape.kind, ShapeKind::Line);
        for m in &g.members {
            assert!(shape.bounds.contains(&m.rect));
        }
        assert_eq!(subpath_count(&shape.outline), 1);
    }

    #[test]
    fn cutout_bounds_enclose_every_member() {
        // 5 items over 3 columns.
        let g = group(&[(0, 0), (1, 0), (2, 0), (0, 1), (1, 1)]);
        let shape = generate(&g, &settings(3)).unwrap();
        assert_eq!(shape.kind, ShapeKind::Cutout);
        for m in &g.members {
            assert!(shape.bounds.contains(&m.rect));
        }
        // The notch turns the other way: both sweep flags appear.
        assert!(shape.outline.contains(" 0 0 1 "));
        assert!(shape.outline.contains(" 0 0 0 "));
    }

    #[test]
    fn cutout_keeps_badge_gap_on_first_row_extent() {
        let g = group(&[(0, 0), (1, 0), (2, 0), (0, 1)]);
        let s = settings(3);
        let shape = generate(&g, &s).unwrap();
        assert_eq!(shape.kind, ShapeKind::Cutout);
        assert!(!shape.outline.contains('Z'));
        assert_eq!(shape.badge_anchor.y, -OUTLINE_PADDING);
        assert_eq!(shape.badge_anchor.x, -OUTLINE_PADDING);
    }

    #[test]
    fn split_emits_two_rectangles_and_a_connector() {
        let g = group(&[(0, 0), (1, 0), (2, 1), (3, 1)]);
        let shape = generate(&g, &settings(4)).unwrap();
        assert_eq!(shape.kind, ShapeKind::Split);
        // Two closed rectangles plus one open connector polyline.
        assert_eq!(subpath_count(&shape.outline), 3);
        assert_eq!(shape.outline.matches('Z').count(), 2);
    }

    #[test]
    fn split_connector_crosses_the_inter_row_midpoint() {
        let g = group(&[(0, 0), (1, 0), (2, 1), (3, 1)]);
        let s = settings(4);
        let shape = generate(&g, &s).unwrap();

        let top_extent = Rect::new(0.0, 0.0, 2.0 * CELL + GAP, ROW - GAP)
            .with_padding(OUTLINE_PADDING);
        let bottom = member(2, 1).rect.union(&member(3, 1).rect).with_padding(OUTLINE_PADDING);
        let mid_y = (top_extent.bottom() + bottom.y) / 2.0;
        assert!(shape.outline.contains(&format!("{:.2}", mid_y)));
    }

    #[test]
    fn split_badge_anchor_is_the_first_member() {
        let g = group(&[(2, 0), (3, 0), (0, 1)]);
        let shape = generate(&g, &settings(4)).unwrap();
        assert_eq!(shape.kind, ShapeKind::Split);
        assert_eq!(
            shape.badge_anchor,
            g.members[0].rect.with_padding(OUTLINE_PADDING)
        );
    }

    #[test]
    fn jog_degenerates_to_a_line_when_extents_align() {
        let mut pb = PathBuilder::new();
        pb.move_to(100.0, 0.0);
        vertical_jog(&mut pb, 8.0, 100.0, 100.0, 50.0, true);
        let d = pb.finish();
        assert_eq!(d, "M 100.00 0.00 L 100.00 50.00");
    }

    #[test]
    fn generation_is_deterministic() {
        let g = group(&[(0, 0), (1, 0), (2, 0), (0, 1), (1, 1)]);
        let s = settings(3);
        assert_eq!(generate(&g, &s), generate(&g, &s));
    }
}

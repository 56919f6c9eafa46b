use std::collections::HashMap;

use tracing::{debug, warn};

use crate::detect::{DayGroup, detect_groups};
use crate::error::EngineError;
use crate::geometry::Rect;
use crate::palette::Palette;
use crate::path::{BADGE_GAP_OFFSET, BADGE_GAP_WIDTH, Shape, generate};
use crate::scene::Scene;
use crate::settings::GridSettings;

pub const BADGE_WIDTH: f32 = 48.0;
pub const BADGE_HEIGHT: f32 = 24.0;
const OUTLINE_STROKE_WIDTH: f32 = 2.0;

/// Handle to one element placed on the overlay surface.
pub type ElementId = u64;

/// A positioned day label, centered on its group outline's top edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub center_x: f32,
    pub center_y: f32,
    pub label: String,
    pub fill: String,
    pub text_color: String,
}

/// The vector drawing region the host page provides. The engine only ever
/// draws into it; it never creates or destroys the surface itself.
pub trait OverlaySurface {
    fn clear(&mut self);
    fn draw_outline(&mut self, group_key: &str, shape: &Shape, color: &str) -> ElementId;
    fn draw_badge(&mut self, group_key: &str, badge: &Badge) -> ElementId;
    fn remove(&mut self, id: ElementId);
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Overlay surface that accumulates SVG markup. Backs the CLI output and
/// gives tests byte-comparable passes.
#[derive(Debug, Default)]
pub struct SvgSurface {
    next_id: ElementId,
    elements: Vec<(ElementId, String)>,
    content_bounds: Option<Rect>,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    fn push(&mut self, markup: String) -> ElementId {
        let id = self.next_id;
        self.next_id += 1;
        self.elements.push((id, markup));
        id
    }

    fn grow_bounds(&mut self, rect: Rect) {
        self.content_bounds = Some(match self.content_bounds {
            Some(b) => b.union(&rect),
            None => rect,
        });
    }

    /// Render the whole overlay as a standalone SVG document sized to its
    /// content plus a margin.
    pub fn to_svg(&self, margin: f32) -> String {
        let bounds = self
            .content_bounds
            .unwrap_or_else(|| Rect::new(0.0, 0.0, 100.0, 50.0))
            .with_padding(margin);

        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{:.2} {:.2} {:.2} {:.2}" width="{:.0}" height="{:.0}">"#,
            bounds.x, bounds.y, bounds.width, bounds.height, bounds.width, bounds.height
        );
        for (_, markup) in &self.elements {
            svg.push_str(markup);
        }
        svg.push_str("</svg>");
        svg
    }
}

impl OverlaySurface for SvgSurface {
    fn clear(&mut self) {
        self.elements.clear();
        self.content_bounds = None;
    }

    fn draw_outline(&mut self, group_key: &str, shape: &Shape, color: &str) -> ElementId {
        self.grow_bounds(shape.bounds);
        let markup = format!(
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="{:.1}" data-group="{}"/>"#,
            shape.outline,
            color,
            OUTLINE_STROKE_WIDTH,
            escape_xml(group_key)
        );
        self.push(markup)
    }

    fn draw_badge(&mut self, group_key: &str, badge: &Badge) -> ElementId {
        let x = badge.center_x - BADGE_WIDTH / 2.0;
        let y = badge.center_y - BADGE_HEIGHT / 2.0;
        self.grow_bounds(Rect::new(x, y, BADGE_WIDTH, BADGE_HEIGHT));
        let markup = format!(
            r#"<g data-group="{}"><rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="{:.2}" fill="{}"/><text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="12" fill="{}" text-anchor="middle" dominant-baseline="central">{}</text></g>"#,
            escape_xml(group_key),
            x,
            y,
            BADGE_WIDTH,
            BADGE_HEIGHT,
            BADGE_HEIGHT / 2.0,
            badge.fill,
            badge.center_x,
            badge.center_y,
            badge.text_color,
            escape_xml(&badge.label)
        );
        self.push(markup)
    }

    fn remove(&mut self, id: ElementId) {
        self.elements.retain(|(eid, _)| *eid != id);
    }
}

/// Owns the group-key → outline-element table. The table only exists so a
/// stale element for the same key is removed before its replacement goes in;
/// it is rebuilt from scratch every pass.
#[derive(Debug, Default)]
struct BorderRenderer {
    drawn: HashMap<String, ElementId>,
}

impl BorderRenderer {
    fn reset(&mut self) {
        self.drawn.clear();
    }

    fn draw(
        &mut self,
        surface: &mut impl OverlaySurface,
        group: &DayGroup,
        shape: &Shape,
        color: &str,
    ) -> ElementId {
        if let Some(stale) = self.drawn.remove(&group.key) {
            surface.remove(stale);
        }
        let id = surface.draw_outline(&group.key, shape, color);
        self.drawn.insert(group.key.clone(), id);
        id
    }
}

/// Places day labels, tracked per group key so same-weekday groups on
/// different dates stay independent.
#[derive(Debug, Default)]
struct BadgePositioner {
    placed: HashMap<String, ElementId>,
}

impl BadgePositioner {
    fn reset(&mut self) {
        self.placed.clear();
    }

    /// Best-effort: a group without members or a missing anchor skips its
    /// badge without touching anything else.
    fn position(
        &mut self,
        surface: &mut impl OverlaySurface,
        group: &DayGroup,
        shape: &Shape,
        palette: &Palette,
    ) -> Option<ElementId> {
        group.members.first()?;

        let anchor = shape.badge_anchor;
        let fill = palette.color_for(group.category_key.as_deref()).to_string();
        let badge = Badge {
            center_x: anchor.x + BADGE_GAP_OFFSET + BADGE_GAP_WIDTH / 2.0,
            center_y: anchor.y,
            label: badge_label(&group.key),
            text_color: palette.text_color_on(&fill).to_string(),
            fill,
        };

        if let Some(stale) = self.placed.remove(&group.key) {
            surface.remove(stale);
        }
        let id = surface.draw_badge(&group.key, &badge);
        self.placed.insert(group.key.clone(), id);
        Some(id)
    }
}

/// Short display label for a group key: the day-of-month for ISO dates, the
/// raw key otherwise.
fn badge_label(key: &str) -> String {
    if let Some(day) = key.rsplit('-').next()
        && key.matches('-').count() == 2
        && day.len() == 2
        && day.chars().all(|c| c.is_ascii_digit())
    {
        return day.trim_start_matches('0').to_string();
    }
    key.to_string()
}

/// What one recomputation pass touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub containers: usize,
    pub groups: usize,
    pub outlines: usize,
    pub badges: usize,
}

/// Full detect → classify → generate → draw pipeline over one overlay
/// surface. Every pass clears the surface wholesale and redraws, so repeated
/// passes over an unchanged scene are byte-identical.
pub struct BorderEngine<S: OverlaySurface> {
    surface: S,
    palette: Palette,
    borders: BorderRenderer,
    badges: BadgePositioner,
}

impl<S: OverlaySurface> BorderEngine<S> {
    pub fn new(surface: S, palette: Palette) -> Self {
        Self {
            surface,
            palette,
            borders: BorderRenderer::default(),
            badges: BadgePositioner::default(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Run one synchronous recomputation pass.
    ///
    /// A missing overlay surface aborts the pass before anything is drawn or
    /// cleared; the engine stays usable for a later `refresh`.
    pub fn render_pass(&mut self, scene: &dyn Scene) -> Result<PassReport, EngineError> {
        if !scene.overlay_present() {
            warn!("overlay surface missing, skipping border pass");
            return Err(EngineError::MissingOverlay);
        }

        self.surface.clear();
        self.borders.reset();
        self.badges.reset();

        let settings = GridSettings::resolve(scene);
        let containers = scene.containers();
        let groups = detect_groups(&containers);

        let mut report = PassReport {
            containers: containers.len(),
            groups: groups.len(),
            ..PassReport::default()
        };

        for group in &groups {
            let Some(shape) = generate(group, &settings) else {
                continue;
            };
            let color = self.palette.color_for(group.category_key.as_deref()).to_string();
            self.borders.draw(&mut self.surface, group, &shape, &color);
            report.outlines += 1;

            if self
                .badges
                .position(&mut self.surface, group, &shape, &self.palette)
                .is_some()
            {
                report.badges += 1;
            } else {
                debug!(group = %group.key, "badge skipped");
            }
        }

        debug!(
            containers = report.containers,
            groups = report.groups,
            outlines = report.outlines,
            badges = report.badges,
            columns = settings.columns_per_row,
            "border pass complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ContainerSnapshot, ItemSnapshot, StaticScene};

    fn item(id: &str, x: f32, y: f32) -> ItemSnapshot {
        ItemSnapshot {
            id: id.to_string(),
            group_key: None,
            category_key: Some("thursday".to_string()),
            rect: Rect::new(x, y, 100.0, 110.0),
            occurs_at: None,
            visible: true,
        }
    }

    fn scene() -> StaticScene {
        StaticScene {
            container_width: 340.0,
            metrics: [
                ("cell-width".to_string(), 100.0),
                ("gap".to_string(), 10.0),
                ("row-height".to_string(), 120.0),
            ]
            .into_iter()
            .collect(),
            containers: vec![
                ContainerSnapshot {
                    group_key: Some("2026-08-27".to_string()),
                    items: vec![item("a", 0.0, 0.0), item("b", 110.0, 0.0)],
                },
                ContainerSnapshot {
                    group_key: Some("2026-08-28".to_string()),
                    items: vec![item("c", 220.0, 0.0)],
                },
            ],
            overlay_present: true,
        }
    }

    #[test]
    fn pass_draws_one_outline_and_badge_per_group() {
        let mut engine = BorderEngine::new(SvgSurface::new(), Palette::default());
        let report = engine.render_pass(&scene()).unwrap();

        assert_eq!(
            report,
            PassReport {
                containers: 2,
                groups: 2,
                outlines: 2,
                badges: 2,
            }
        );
        assert_eq!(engine.surface().element_count(), 4);

        let svg = engine.surface().to_svg(10.0);
        assert_eq!(svg.matches("<path").count(), 2);
        assert_eq!(svg.matches("<g data-group").count(), 2);
        assert!(svg.contains(r#"data-group="2026-08-27""#));
    }

    #[test]
    fn repeated_passes_are_byte_identical() {
        let mut engine = BorderEngine::new(SvgSurface::new(), Palette::default());
        let s = scene();

        engine.render_pass(&s).unwrap();
        let first = engine.surface().to_svg(10.0);
        engine.render_pass(&s).unwrap();
        let second = engine.surface().to_svg(10.0);

        assert_eq!(first, second);
        assert_eq!(engine.surface().element_count(), 4);
    }

    #[test]
    fn missing_overlay_aborts_without_touching_the_surface() {
        let mut engine = BorderEngine::new(SvgSurface::new(), Palette::default());
        let mut s = scene();
        engine.render_pass(&s).unwrap();
        let before = engine.surface().to_svg(10.0);

        s.overlay_present = false;
        let err = engine.render_pass(&s).unwrap_err();
        assert!(matches!(err, EngineError::MissingOverlay));
        assert_eq!(engine.surface().to_svg(10.0), before);

        // The surface coming back makes the next pass succeed.
        s.overlay_present = true;
        assert!(engine.render_pass(&s).is_ok());
    }

    #[test]
    fn empty_scene_clears_previous_output() {
        let mut engine = BorderEngine::new(SvgSurface::new(), Palette::default());
        engine.render_pass(&scene()).unwrap();
        assert!(engine.surface().element_count() > 0);

        let empty = StaticScene {
            container_width: 340.0,
            metrics: HashMap::new(),
            containers: Vec::new(),
            overlay_present: true,
        };
        let report = engine.render_pass(&empty).unwrap();
        assert_eq!(report.outlines, 0);
        assert_eq!(engine.surface().element_count(), 0);
    }

    #[test]
    fn badge_labels_shorten_iso_dates() {
        assert_eq!(badge_label("2026-08-07"), "7");
        assert_eq!(badge_label("2026-12-31"), "31");
        assert_eq!(badge_label("week-b"), "week-b");
        assert_eq!(badge_label("saturday"), "saturday");
    }

    #[test]
    fn badge_centers_on_the_gap_in_the_top_edge() {
        let mut engine = BorderEngine::new(SvgSurface::new(), Palette::default());
        engine.render_pass(&scene()).unwrap();
        let svg = engine.surface().to_svg(0.0);

        // First group's outline starts at -8 after padding; the badge rect
        // is centered over the gap.
        let badge_x = -8.0 + BADGE_GAP_OFFSET + BADGE_GAP_WIDTH / 2.0 - BADGE_WIDTH / 2.0;
        assert!(svg.contains(&format!(r#"<rect x="{:.2}" y="{:.2}""#, badge_x, -8.0 - BADGE_HEIGHT / 2.0)));
    }
}

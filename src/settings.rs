use crate::scene::Scene;

pub const DEFAULT_CELL_WIDTH: f32 = 160.0;
pub const DEFAULT_GAP: f32 = 16.0;
pub const DEFAULT_BORDER_RADIUS: f32 = 8.0;
pub const DEFAULT_ROW_HEIGHT: f32 = 150.0;

/// Effective grid geometry for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSettings {
    pub cell_width: f32,
    pub gap: f32,
    pub border_radius: f32,
    pub row_height: f32,
    pub container_width: f32,
    pub columns_per_row: usize,
}

impl GridSettings {
    /// Read grid variables from the host and derive columns-per-row for the
    /// current container width. Never fails: missing variables take the
    /// defaults, degenerate ones clamp columns to 1.
    pub fn resolve(scene: &dyn Scene) -> Self {
        let cell_width = scene
            .grid_metric("cell-width")
            .unwrap_or(DEFAULT_CELL_WIDTH);
        let gap = scene.grid_metric("gap").unwrap_or(DEFAULT_GAP);
        let border_radius = scene
            .grid_metric("border-radius")
            .unwrap_or(DEFAULT_BORDER_RADIUS);
        let row_height = scene
            .grid_metric("row-height")
            .unwrap_or(DEFAULT_ROW_HEIGHT);
        let container_width = scene.container_width();

        Self {
            cell_width,
            gap,
            border_radius,
            row_height,
            container_width,
            columns_per_row: columns_per_row(container_width, cell_width, gap),
        }
    }
}

fn columns_per_row(container_width: f32, cell_width: f32, gap: f32) -> usize {
    if cell_width <= 0.0 || gap <= 0.0 {
        return 1;
    }
    let columns = ((container_width + gap) / (cell_width + gap)).floor();
    if columns >= 1.0 { columns as usize } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::StaticScene;

    fn scene(width: f32, metrics: &[(&str, f32)]) -> StaticScene {
        StaticScene {
            container_width: width,
            metrics: metrics
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            containers: Vec::new(),
            overlay_present: true,
        }
    }

    #[test]
    fn columns_follow_container_width() {
        // 3 * 150 + 2 * 10 = 470 fits exactly in 470.
        let s = GridSettings::resolve(&scene(470.0, &[("cell-width", 150.0), ("gap", 10.0)]));
        assert_eq!(s.columns_per_row, 3);

        let s = GridSettings::resolve(&scene(469.0, &[("cell-width", 150.0), ("gap", 10.0)]));
        assert_eq!(s.columns_per_row, 2);
    }

    #[test]
    fn missing_metrics_take_defaults() {
        let s = GridSettings::resolve(&scene(800.0, &[]));
        assert_eq!(s.cell_width, DEFAULT_CELL_WIDTH);
        assert_eq!(s.gap, DEFAULT_GAP);
        assert_eq!(s.border_radius, DEFAULT_BORDER_RADIUS);
        assert_eq!(s.row_height, DEFAULT_ROW_HEIGHT);
    }

    #[test]
    fn degenerate_metrics_clamp_to_one_column() {
        let s = GridSettings::resolve(&scene(800.0, &[("cell-width", 0.0)]));
        assert_eq!(s.columns_per_row, 1);

        let s = GridSettings::resolve(&scene(800.0, &[("cell-width", 150.0), ("gap", -4.0)]));
        assert_eq!(s.columns_per_row, 1);

        // Container narrower than one cell still yields one column.
        let s = GridSettings::resolve(&scene(80.0, &[("cell-width", 150.0), ("gap", 10.0)]));
        assert_eq!(s.columns_per_row, 1);
    }
}

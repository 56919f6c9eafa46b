//! Adaptive border and badge layout engine for responsive event grids.
//!
//! Given a card grid of calendar events grouped by day, the engine detects
//! which rendered items belong to the same logical day (across one or more
//! physical containers), classifies the group's visual arrangement, and
//! synthesizes an enclosing outline with a reserved opening for a day badge.
//! Wrapped groups get a non-convex staircase outline; groups whose rows
//! share no columns get two outlines joined by a connector.
//!
//! The engine never places items itself — placement belongs to the host's
//! grid layout. It reads a snapshot of the rendered scene through the
//! [`scene::Scene`] trait, and draws into an [`render::OverlaySurface`]
//! provided by the host. Every pass rebuilds the overlay from scratch, so
//! repeated passes over an unchanged scene are byte-identical.

pub mod classify;
pub mod coordinator;
pub mod detect;
pub mod error;
pub mod geometry;
pub mod palette;
pub mod path;
pub mod render;
pub mod scene;
pub mod settings;

pub use classify::{ShapeKind, classify};
pub use coordinator::ResizeCoordinator;
pub use detect::{DayGroup, detect_groups};
pub use error::EngineError;
pub use geometry::{GridPosition, Rect};
pub use palette::Palette;
pub use path::{Shape, generate};
pub use render::{BorderEngine, OverlaySurface, PassReport, SvgSurface};
pub use scene::{ContainerSnapshot, ItemSnapshot, Scene, StaticScene};
pub use settings::GridSettings;

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Geomart experience.

use geomart_core::{FormationConfig, ShapeView};
use geomart_world::{query, World};

/// Produces data required to open the window and seed the first frame.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Exposes the formation configuration required for window setup.
    #[must_use]
    pub fn formation<'world>(&self, world: &'world World) -> &'world FormationConfig {
        query::formation(world)
    }

    /// Exposes the shapes of the formation for presentation purposes.
    #[must_use]
    pub fn shapes(&self, world: &World) -> ShapeView {
        query::shape_view(world)
    }
}

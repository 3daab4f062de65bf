//! Frame driver that steps the world and its systems once per rendered frame.

use std::time::Duration;

use anyhow::{Context, Result};
use geomart_core::{Command, Event, FormationConfig};
use geomart_rendering::{Color, Scene, ShapePresentation};
use geomart_system_choreography::Choreography;
use geomart_system_motion::Motion;
use geomart_world::{self as world, query, World};
use glam::Vec2;
use tracing::debug;

const SHAPE_COLOR: Color = Color::WHITE;

/// Owns the world and the systems reacting to it.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    choreography: Choreography,
    motion: Motion,
    events: Vec<Event>,
    commands: Vec<Command>,
}

impl Simulation {
    /// Builds a simulation whose formation follows `config`.
    pub(crate) fn new(config: FormationConfig) -> Result<Self> {
        let world = World::with_formation(config).context("formation configuration rejected")?;

        Ok(Self {
            world,
            choreography: Choreography::new(),
            motion: Motion::new(),
            events: Vec::new(),
            commands: Vec::new(),
        })
    }

    /// Read-only access to the authoritative world.
    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Advances the formation by one frame lasting `dt`.
    ///
    /// Arrival is evaluated before anything moves, so a formation that
    /// arrived during the previous frame starts its next legs and makes its
    /// first step along them within this frame.
    pub(crate) fn advance(&mut self, dt: Duration) {
        self.events.clear();
        world::apply(&mut self.world, Command::Tick { dt }, &mut self.events);

        let formation = *query::formation(&self.world);
        self.choreography.handle(
            &self.events,
            &query::shape_view(&self.world),
            &formation,
            &mut self.commands,
        );
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
        let started = self
            .events
            .iter()
            .filter(|event| matches!(event, Event::LegStarted { .. }))
            .count();
        if started > 0 {
            debug!(
                shapes = started,
                legs = self.choreography.legs_started(),
                "formation started a new leg"
            );
        }

        self.motion.handle(
            &self.events,
            &query::shape_view(&self.world),
            &formation,
            &mut self.commands,
        );
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    /// Describes every shape of the formation at its current position.
    pub(crate) fn scene(&self) -> Result<Scene> {
        let radius = query::formation(&self.world).circle_radius;
        let shapes = query::shape_view(&self.world)
            .iter()
            .map(|shape| ShapePresentation::from_snapshot(shape, radius, SHAPE_COLOR))
            .collect::<Result<Vec<_>, _>>()
            .context("failed to describe formation shapes")?;
        Ok(Scene::new(shapes))
    }

    /// Moves the scene's shapes that moved during the last frame.
    ///
    /// The scene must have been built by [`Simulation::scene`], which orders
    /// presentations by shape id.
    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        for event in &self.events {
            let Event::ShapeMoved { shape, to, .. } = event else {
                continue;
            };
            let Ok(index) = usize::try_from(shape.get()) else {
                continue;
            };
            if let Some(presentation) = scene.shapes.get_mut(index) {
                presentation.position = Vec2::new(to.x(), to.y());
            }
        }
    }
}

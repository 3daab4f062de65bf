#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Geomart.
//!
//! The world owns every shape of the formation. Shapes only change in
//! response to [`Command`] values passed to [`apply`]; systems observe them
//! through the read-only [`query`] module.

use geomart_core::{
    Command, ConfigError, Direction, Event, FormationConfig, Offset, Position, ShapeId,
    ShapeSnapshot, MAX_FORMATION_SHAPES, WELCOME_BANNER,
};
use tracing::{debug, warn};

/// Index of the shape whose arrival stands in for the whole formation.
///
/// Every shape travels at the same speed over legs of the same length, so
/// they all reach their destinations on the same tick.
const REPRESENTATIVE_INDEX: usize = 0;

/// Represents the authoritative Geomart world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    formation: FormationConfig,
    shapes: Vec<Shape>,
    tick_index: u64,
    leg_index: u64,
}

impl World {
    /// Creates a new world populated with the default formation.
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_formation(FormationConfig::default())
    }

    /// Creates a world laid out from `formation`, or reports why it is invalid.
    pub fn with_formation(formation: FormationConfig) -> Result<Self, ConfigError> {
        formation.validate()?;
        Ok(Self::from_valid_formation(formation))
    }

    fn from_valid_formation(formation: FormationConfig) -> Self {
        Self {
            banner: WELCOME_BANNER,
            shapes: generate_shapes(&formation),
            formation,
            tick_index: 0,
            leg_index: 0,
        }
    }

    fn shape_mut(&mut self, shape: ShapeId) -> Option<&mut Shape> {
        let index = usize::try_from(shape.get()).ok()?;
        self.shapes.get_mut(index).filter(|entry| entry.id == shape)
    }

    fn representative(&self) -> Option<&Shape> {
        self.shapes.get(REPRESENTATIVE_INDEX)
    }

    fn lagging_shapes(&self) -> usize {
        self.shapes.iter().filter(|shape| !shape.has_arrived()).count()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureFormation { config } => {
            if let Err(reason) = config.validate() {
                warn!(%reason, "rejected formation configuration");
                out_events.push(Event::FormationRejected { reason });
                return;
            }

            world.formation = config;
            world.shapes = generate_shapes(&config);
            world.leg_index = 0;
            debug!(shapes = world.shapes.len(), "formation reconfigured");
            out_events.push(Event::FormationConfigured {
                shapes: world.shapes.len(),
            });
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });

            let arrived = world
                .representative()
                .is_some_and(|representative| representative.has_arrived());
            if !arrived {
                return;
            }

            let lagging = world.lagging_shapes();
            if lagging > 0 {
                warn!(
                    lagging,
                    tick = world.tick_index,
                    "formation arrived while shapes were still travelling"
                );
            }

            let leg = world.leg_index;
            world.leg_index = world.leg_index.saturating_add(1);
            debug!(leg, tick = world.tick_index, "formation arrived");
            out_events.push(Event::FormationArrived { leg });
        }
        Command::BeginLeg {
            shape,
            destination,
            direction,
        } => {
            if let Some(entry) = world.shape_mut(shape) {
                entry.destination = destination;
                entry.direction = direction;
                out_events.push(Event::LegStarted {
                    shape,
                    destination,
                    direction,
                });
            }
        }
        Command::MoveShape { shape, delta } => {
            if let Some(entry) = world.shape_mut(shape) {
                let from = entry.position;
                entry.move_by(delta);
                out_events.push(Event::ShapeMoved {
                    shape,
                    from,
                    to: entry.position,
                });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use geomart_core::{FormationConfig, ShapeSnapshot, ShapeView};

    /// Retrieves the welcome banner that adapters may display.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the active formation configuration.
    #[must_use]
    pub fn formation(world: &World) -> &FormationConfig {
        &world.formation
    }

    /// Captures a read-only view of every shape in the formation.
    #[must_use]
    pub fn shape_view(world: &World) -> ShapeView {
        ShapeView::from_snapshots(world.shapes.iter().map(|shape| shape.snapshot()).collect())
    }

    /// Snapshot of the shape used to detect formation arrival, if any.
    #[must_use]
    pub fn representative(world: &World) -> Option<ShapeSnapshot> {
        world.representative().map(|shape| shape.snapshot())
    }

    /// Reports whether the formation sits exactly on its destinations.
    #[must_use]
    pub fn has_arrived(world: &World) -> bool {
        world
            .representative()
            .is_some_and(|shape| shape.has_arrived())
    }

    /// Number of shapes in the formation.
    #[must_use]
    pub fn shape_count(world: &World) -> usize {
        world.shapes.len()
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Number of arrivals announced since the formation was configured.
    #[must_use]
    pub fn leg_index(world: &World) -> u64 {
        world.leg_index
    }
}

#[derive(Clone, Debug)]
struct Shape {
    id: ShapeId,
    position: Position,
    destination: Position,
    direction: Direction,
}

impl Shape {
    fn spawn(id: ShapeId, position: Position, destination: Position) -> Self {
        Self {
            id,
            position,
            destination,
            direction: Direction::horizontal(position, destination),
        }
    }

    fn has_arrived(&self) -> bool {
        self.position == self.destination
    }

    /// Applies `delta`, landing exactly on the destination for any axis whose
    /// delta covers the remaining distance.
    fn move_by(&mut self, delta: Offset) {
        self.position = Position::new(
            settle_axis(self.position.x(), delta.dx(), self.destination.x()),
            settle_axis(self.position.y(), delta.dy(), self.destination.y()),
        );
    }

    fn snapshot(&self) -> ShapeSnapshot {
        ShapeSnapshot {
            id: self.id,
            position: self.position,
            destination: self.destination,
            direction: self.direction,
        }
    }
}

fn settle_axis(current: f32, delta: f32, destination: f32) -> f32 {
    if delta != 0.0 && delta == destination - current {
        destination
    } else {
        current + delta
    }
}

/// Lays out the grid of a formation that already passed validation.
fn generate_shapes(config: &FormationConfig) -> Vec<Shape> {
    let pitch = config.slot_pitch();
    let (per_row, _) = config.grid();
    let half_step = config.step_length / 2.0;
    let top_margin = config.circle_margin / 2.0;

    let count = config.shape_count().min(MAX_FORMATION_SHAPES);
    let mut shapes = Vec::with_capacity(count);
    for index in 0..count {
        let Ok(raw_id) = u32::try_from(index) else {
            break;
        };
        let row = index / per_row;
        let column = index % per_row;
        let odd_row = row % 2 == 1;

        let shift = if odd_row { -half_step } else { half_step };
        let position = Position::new(
            pitch * column as f32 + shift,
            pitch * row as f32 + top_margin,
        );
        let first_leg = if odd_row {
            -config.step_length
        } else {
            config.step_length
        };
        let destination = Position::new(position.x() + first_leg, position.y());

        shapes.push(Shape::spawn(ShapeId::new(raw_id), position, destination));
    }

    shapes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn configure(world: &mut World, config: FormationConfig) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::ConfigureFormation { config },
            &mut events,
        );
        events
    }

    #[test]
    fn default_formation_fills_the_window_grid() {
        let world = World::new();

        assert_eq!(query::shape_count(&world), 16 * 16);
        assert_eq!(query::formation(&world), &FormationConfig::default());
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
    }

    #[test]
    fn rows_alternate_their_first_leg() {
        let world = World::new();
        let view = query::shape_view(&world);
        let shapes = view.into_vec();

        let first = shapes[0];
        assert_eq!(first.position, Position::new(10.0, 15.0));
        assert_eq!(first.destination, Position::new(30.0, 15.0));
        assert_eq!(first.direction, Direction::Right);

        let second_row = shapes[16];
        assert_eq!(second_row.position, Position::new(-10.0, 55.0));
        assert_eq!(second_row.destination, Position::new(-30.0, 55.0));
        assert_eq!(second_row.direction, Direction::Left);

        let neighbour = shapes[1];
        assert_eq!(neighbour.position, Position::new(50.0, 15.0));
    }

    #[test]
    fn configure_formation_replaces_the_layout() {
        let mut world = World::new();
        let config = FormationConfig {
            window_width: 80,
            window_height: 40,
            ..FormationConfig::default()
        };

        let events = configure(&mut world, config);

        assert_eq!(events, vec![Event::FormationConfigured { shapes: 6 }]);
        assert_eq!(query::shape_count(&world), 6);
        assert_eq!(query::formation(&world), &config);
    }

    #[test]
    fn oversized_formation_is_rejected_and_previous_one_kept() {
        let mut world = World::new();
        let config = FormationConfig {
            window_width: u32::MAX,
            window_height: u32::MAX,
            circle_radius: 0.001,
            circle_margin: 0.0,
            ..FormationConfig::default()
        };

        let events = configure(&mut world, config);

        assert!(matches!(
            events.as_slice(),
            [Event::FormationRejected {
                reason: ConfigError::TooManyShapes { .. }
            }]
        ));
        assert_eq!(query::shape_count(&world), 256);
        assert_eq!(query::formation(&world), &FormationConfig::default());
    }

    #[test]
    fn with_formation_lays_out_valid_configs_only() {
        let config = FormationConfig {
            window_width: 80,
            window_height: 40,
            ..FormationConfig::default()
        };
        let world = World::with_formation(config).expect("small formation is valid");
        assert_eq!(query::shape_count(&world), 6);
        assert_eq!(query::tick_index(&world), 0);

        let error = World::with_formation(FormationConfig {
            circle_radius: 0.0,
            ..config
        })
        .expect_err("zero radius is invalid");
        assert!(matches!(error, ConfigError::InvalidRadius { .. }));
    }

    #[test]
    fn largest_formation_assigns_distinct_ids() {
        let world = World::with_formation(FormationConfig {
            window_width: 255,
            window_height: 255,
            circle_radius: 1.0,
            circle_margin: 0.0,
            ..FormationConfig::default()
        })
        .expect("formation at the limit is valid");

        let view = query::shape_view(&world);
        assert_eq!(view.len(), MAX_FORMATION_SHAPES);
        for (index, shape) in view.iter().enumerate() {
            assert_eq!(shape.id.get() as usize, index);
        }
    }

    #[test]
    fn invalid_configuration_keeps_previous_formation() {
        let mut world = World::new();
        let config = FormationConfig {
            circle_radius: -4.0,
            ..FormationConfig::default()
        };

        let events = configure(&mut world, config);

        assert!(matches!(
            events.as_slice(),
            [Event::FormationRejected { .. }]
        ));
        assert_eq!(query::shape_count(&world), 256);
        assert_eq!(query::formation(&world), &FormationConfig::default());
    }

    #[test]
    fn tick_reports_arrival_only_when_representative_arrived() {
        let mut world = World::new();
        let mut events = Vec::new();
        let dt = Duration::from_millis(33);

        apply(&mut world, Command::Tick { dt }, &mut events);
        assert_eq!(events, vec![Event::TimeAdvanced { dt }]);

        let representative = query::representative(&world).expect("formation has shapes");
        let remaining = Offset::new(
            representative.destination.x() - representative.position.x(),
            0.0,
        );
        for shape in query::shape_view(&world).iter() {
            let delta = Offset::new(shape.destination.x() - shape.position.x(), 0.0);
            apply(
                &mut world,
                Command::MoveShape {
                    shape: shape.id,
                    delta,
                },
                &mut events,
            );
        }
        assert_eq!(remaining, Offset::new(20.0, 0.0));
        assert!(query::has_arrived(&world));

        events.clear();
        apply(&mut world, Command::Tick { dt }, &mut events);
        assert_eq!(
            events,
            vec![
                Event::TimeAdvanced { dt },
                Event::FormationArrived { leg: 0 }
            ]
        );
        assert_eq!(query::leg_index(&world), 1);
        assert_eq!(query::tick_index(&world), 2);
    }

    #[test]
    fn move_snaps_to_destination_on_final_step() {
        let mut shape = Shape::spawn(
            ShapeId::new(0),
            Position::new(0.1, 0.7),
            Position::new(0.3, 0.7),
        );
        let remaining = 0.3_f32 - 0.1_f32;

        shape.move_by(Offset::new(remaining, 0.0));

        assert_eq!(shape.position, shape.destination);
        assert!(shape.has_arrived());
    }

    #[test]
    fn move_without_reaching_destination_adds_delta() {
        let mut world = World::new();
        let mut events = Vec::new();
        let shape = ShapeId::new(0);

        apply(
            &mut world,
            Command::MoveShape {
                shape,
                delta: Offset::new(4.0, 0.0),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::ShapeMoved {
                shape,
                from: Position::new(10.0, 15.0),
                to: Position::new(14.0, 15.0),
            }]
        );
    }

    #[test]
    fn begin_leg_replaces_destination_and_direction() {
        let mut world = World::new();
        let mut events = Vec::new();
        let shape = ShapeId::new(3);
        let destination = Position::new(400.0, 12.0);

        apply(
            &mut world,
            Command::BeginLeg {
                shape,
                destination,
                direction: Direction::BottomLeft,
            },
            &mut events,
        );

        let snapshot = query::shape_view(&world)
            .iter()
            .find(|snapshot| snapshot.id == shape)
            .copied()
            .expect("shape exists");
        assert_eq!(snapshot.destination, destination);
        assert_eq!(snapshot.direction, Direction::BottomLeft);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn commands_for_unknown_shapes_are_ignored() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveShape {
                shape: ShapeId::new(10_000),
                delta: Offset::new(1.0, 1.0),
            },
            &mut events,
        );

        assert!(events.is_empty());
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Choreography system that chains the legs of the zig-zag formation.
//!
//! Whenever the formation arrives, every shape starts a new leg chosen by the
//! direction it just travelled in:
//!
//! | Finished leg | Next destination (from current position) | Next direction |
//! |---|---|---|
//! | `Left` | `(+2·step, −2·step)` | `TopRight` |
//! | `Right` | `(−2·step, +2·step)` | `BottomLeft` |
//! | `TopRight` | `(+step, 0)` | `Right` |
//! | `BottomLeft` | `(−step, 0)` | `Left` |

use geomart_core::{Command, Direction, Event, FormationConfig, Offset, Position, ShapeView};

/// Destination and direction of a single leg.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Leg {
    /// Point the shape travels towards.
    pub destination: Position,
    /// Direction state the shape is in while travelling.
    pub direction: Direction,
}

/// Computes the leg that follows `direction` for a shape standing at `position`.
#[must_use]
pub fn advance(position: Position, direction: Direction, step_length: f32) -> Leg {
    let (offset, next) = match direction {
        Direction::Left => (
            Offset::new(step_length * 2.0, -step_length * 2.0),
            Direction::TopRight,
        ),
        Direction::Right => (
            Offset::new(-step_length * 2.0, step_length * 2.0),
            Direction::BottomLeft,
        ),
        Direction::TopRight => (Offset::new(step_length, 0.0), Direction::Right),
        Direction::BottomLeft => (Offset::new(-step_length, 0.0), Direction::Left),
    };
    debug_assert_eq!(next, direction.next());

    Leg {
        destination: position.offset_by(offset),
        direction: next,
    }
}

/// Pure system that answers formation arrivals with new legs.
#[derive(Debug, Default)]
pub struct Choreography {
    legs_started: u64,
}

impl Choreography {
    /// Creates a new choreography system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of arrivals this system has answered.
    #[must_use]
    pub fn legs_started(&self) -> u64 {
        self.legs_started
    }

    /// Consumes world events and the shape view to emit leg commands.
    ///
    /// Shapes are advanced once per batch even if it reports several
    /// arrivals, since every arrival refers to the same shape positions.
    pub fn handle(
        &mut self,
        events: &[Event],
        shapes: &ShapeView,
        formation: &FormationConfig,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::FormationArrived { .. }))
        {
            return;
        }

        for shape in shapes.iter() {
            let leg = advance(shape.position, shape.direction, formation.step_length);
            out.push(Command::BeginLeg {
                shape: shape.id,
                destination: leg.destination,
                direction: leg.direction,
            });
        }
        self.legs_started = self.legs_started.saturating_add(1);
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Motion system that moves every shape towards its destination at constant speed.
//!
//! The per-axis planner never overshoots: once the remaining distance is
//! shorter than the frame's step it returns exactly the remaining distance,
//! which lets the world detect arrival with an exact equality check.

use std::time::Duration;

use geomart_core::{Command, Event, FormationConfig, Offset, Position, ShapeView};

/// Pure system that reacts to elapsed time by emitting shape moves.
#[derive(Debug, Default)]
pub struct Motion;

impl Motion {
    /// Creates a new motion system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes world events and the shape view to emit movement commands.
    ///
    /// Time reported by every [`Event::TimeAdvanced`] in the batch is summed
    /// into a single step so shapes are moved at most once per call.
    pub fn handle(
        &self,
        events: &[Event],
        shapes: &ShapeView,
        formation: &FormationConfig,
        out: &mut Vec<Command>,
    ) {
        let mut elapsed = Duration::ZERO;
        let mut ticked = false;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                elapsed = elapsed.saturating_add(*dt);
                ticked = true;
            }
        }
        if !ticked {
            return;
        }

        let max_step = formation.step_for(elapsed);
        for shape in shapes.iter() {
            let delta = step_towards(shape.position, shape.destination, max_step);
            if delta.is_zero() {
                continue;
            }
            out.push(Command::MoveShape {
                shape: shape.id,
                delta,
            });
        }
    }
}

/// Computes the displacement along one axis for a single frame.
///
/// Moves by `max_step` towards `destination`, or by exactly the remaining
/// distance when a full step would pass it. `max_step` must not be negative.
#[must_use]
pub fn next_step_delta(current: f32, destination: f32, max_step: f32) -> f32 {
    debug_assert!(max_step >= 0.0, "max_step must not be negative");

    let distance = destination - current;
    if distance < 0.0 {
        if current - max_step < destination {
            distance
        } else {
            -max_step
        }
    } else if distance > 0.0 {
        if current + max_step > destination {
            distance
        } else {
            max_step
        }
    } else {
        0.0
    }
}

/// Applies [`next_step_delta`] independently to both axes.
#[must_use]
pub fn step_towards(position: Position, destination: Position, max_step: f32) -> Offset {
    Offset::new(
        next_step_delta(position.x(), destination.x(), max_step),
        next_step_delta(position.y(), destination.y(), max_step),
    )
}

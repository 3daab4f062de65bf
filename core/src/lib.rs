#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Geomart formation engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to. Systems consume event streams, query immutable [`ShapeView`]
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Geomart.";

/// Title applied to the window that hosts the formation.
pub const WINDOW_TITLE: &str = "Geomart 1";

/// Default window width measured in pixels.
pub const DEFAULT_WINDOW_WIDTH: u32 = 600;
/// Default window height measured in pixels.
pub const DEFAULT_WINDOW_HEIGHT: u32 = 600;
/// Default circle radius measured in pixels.
pub const DEFAULT_CIRCLE_RADIUS: f32 = 10.0;
/// Default spacing added to the radius between neighbouring grid slots.
pub const DEFAULT_CIRCLE_MARGIN: f32 = 30.0;
/// Default cardinal leg length, twice the default radius.
pub const DEFAULT_STEP_LENGTH: f32 = DEFAULT_CIRCLE_RADIUS * 2.0;
/// Default duration of a single cardinal leg in seconds.
pub const DEFAULT_LEG_DURATION_SECS: f32 = 0.25;
/// Largest number of shapes a formation may lay out.
pub const MAX_FORMATION_SHAPES: usize = 1 << 16;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds the formation using the provided configuration.
    ConfigureFormation {
        /// Numeric constants describing the window and the choreography.
        config: FormationConfig,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration that elapsed since the previous tick.
        dt: Duration,
    },
    /// Assigns a new destination and direction to a shape.
    BeginLeg {
        /// Identifier of the shape starting the leg.
        shape: ShapeId,
        /// Point the shape should travel towards.
        destination: Position,
        /// Direction state the shape enters for this leg.
        direction: Direction,
    },
    /// Displaces a shape by the provided per-axis delta.
    MoveShape {
        /// Identifier of the shape to move.
        shape: ShapeId,
        /// Displacement applied to the shape's position.
        delta: Offset,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a new formation replaced the previous one.
    FormationConfigured {
        /// Number of shapes laid out by the formation.
        shapes: usize,
    },
    /// Reports that a formation configuration was rejected.
    FormationRejected {
        /// Specific reason the configuration failed validation.
        reason: ConfigError,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the formation reached its current destinations.
    FormationArrived {
        /// Number of legs completed before this arrival.
        leg: u64,
    },
    /// Confirms that a shape started travelling towards a new destination.
    LegStarted {
        /// Identifier of the shape.
        shape: ShapeId,
        /// Destination of the new leg.
        destination: Position,
        /// Direction state of the new leg.
        direction: Direction,
    },
    /// Confirms that a shape moved.
    ShapeMoved {
        /// Identifier of the shape.
        shape: ShapeId,
        /// Position before the move.
        from: Position,
        /// Position after the move.
        to: Position,
    },
}

/// Direction state that decides the next leg of a shape.
///
/// The states form the fixed cycle `Left -> TopRight -> Right -> BottomLeft`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// The shape travelled towards decreasing x.
    Left,
    /// The shape travelled towards increasing x.
    Right,
    /// The shape travelled diagonally up and to the right.
    TopRight,
    /// The shape travelled diagonally down and to the left.
    BottomLeft,
}

impl Direction {
    /// Returns the state that follows `self` in the direction cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Left => Self::TopRight,
            Self::TopRight => Self::Right,
            Self::Right => Self::BottomLeft,
            Self::BottomLeft => Self::Left,
        }
    }

    /// Direction of a horizontal leg running from `from` to `to`.
    ///
    /// Only the cardinal states can be derived this way; shapes are always
    /// created on a horizontal leg.
    #[must_use]
    pub fn horizontal(from: Position, to: Position) -> Self {
        if from.x() > to.x() {
            Self::Left
        } else {
            Self::Right
        }
    }
}

/// Unique identifier assigned to a shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(u32);

impl ShapeId {
    /// Creates a new shape identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Point in window space measured in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate, growing downwards.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Returns the position displaced by `offset`.
    #[must_use]
    pub fn offset_by(self, offset: Offset) -> Self {
        Self::new(self.x + offset.dx(), self.y + offset.dy())
    }
}

/// Per-axis displacement measured in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    dx: f32,
    dy: f32,
}

impl Offset {
    /// Displacement that leaves a position untouched.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates a new displacement.
    #[must_use]
    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn dx(&self) -> f32 {
        self.dx
    }

    /// Vertical component.
    #[must_use]
    pub const fn dy(&self) -> f32 {
        self.dy
    }

    /// Reports whether both components are zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

/// Immutable representation of a single shape's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeSnapshot {
    /// Unique identifier assigned to the shape.
    pub id: ShapeId,
    /// Current position of the shape.
    pub position: Position,
    /// Destination of the shape's current leg.
    pub destination: Position,
    /// Direction state of the current leg.
    pub direction: Direction,
}

impl ShapeSnapshot {
    /// Reports whether the shape sits exactly on its destination.
    #[must_use]
    pub fn has_arrived(&self) -> bool {
        self.position == self.destination
    }
}

/// Read-only snapshot describing all shapes of the formation.
#[derive(Clone, Debug, Default)]
pub struct ShapeView {
    snapshots: Vec<ShapeSnapshot>,
}

impl ShapeView {
    /// Creates a new shape view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ShapeSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &ShapeSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no shapes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ShapeSnapshot> {
        self.snapshots
    }
}

/// Numeric constants describing the window, the grid and the choreography.
///
/// Every field falls back to its default when omitted from a deserialized
/// document.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormationConfig {
    /// Window width in pixels.
    pub window_width: u32,
    /// Window height in pixels.
    pub window_height: u32,
    /// Radius of every circle in pixels.
    pub circle_radius: f32,
    /// Spacing added to the radius between neighbouring grid slots.
    pub circle_margin: f32,
    /// Length of a cardinal leg; diagonal legs span twice this on each axis.
    pub step_length: f32,
    /// Time a shape takes to complete a cardinal leg, in seconds.
    pub leg_duration_secs: f32,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            circle_radius: DEFAULT_CIRCLE_RADIUS,
            circle_margin: DEFAULT_CIRCLE_MARGIN,
            step_length: DEFAULT_STEP_LENGTH,
            leg_duration_secs: DEFAULT_LEG_DURATION_SECS,
        }
    }
}

impl FormationConfig {
    /// Checks that the configuration describes a drawable, moving formation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ConfigError::EmptyWindow {
                width: self.window_width,
                height: self.window_height,
            });
        }
        if !is_positive(self.circle_radius) {
            return Err(ConfigError::InvalidRadius {
                radius: self.circle_radius,
            });
        }
        if !self.circle_margin.is_finite() || self.circle_margin < 0.0 {
            return Err(ConfigError::InvalidMargin {
                margin: self.circle_margin,
            });
        }
        if !is_positive(self.step_length) {
            return Err(ConfigError::InvalidStepLength {
                step_length: self.step_length,
            });
        }
        if !is_positive(self.leg_duration_secs) {
            return Err(ConfigError::InvalidLegDuration {
                seconds: self.leg_duration_secs,
            });
        }
        let count = self.shape_count();
        if count > MAX_FORMATION_SHAPES {
            return Err(ConfigError::TooManyShapes {
                count,
                limit: MAX_FORMATION_SHAPES,
            });
        }
        Ok(())
    }

    /// Number of grid slots along each axis, as `(per_row, per_column)`.
    ///
    /// Counts saturate at `usize::MAX` instead of wrapping.
    #[must_use]
    pub fn grid(&self) -> (usize, usize) {
        let pitch = self.slot_pitch();
        (
            slots_along(self.window_width, pitch),
            slots_along(self.window_height, pitch),
        )
    }

    /// Number of shapes the formation lays out, saturating at `usize::MAX`.
    #[must_use]
    pub fn shape_count(&self) -> usize {
        let (per_row, per_column) = self.grid();
        per_row.saturating_mul(per_column)
    }

    /// Distance between the origins of neighbouring grid slots.
    #[must_use]
    pub fn slot_pitch(&self) -> f32 {
        self.circle_radius + self.circle_margin
    }

    /// Linear speed shared by every shape, in pixels per millisecond.
    #[must_use]
    pub fn speed_per_millisecond(&self) -> f32 {
        self.step_length / self.leg_duration_secs / 1_000.0
    }

    /// Maximum per-axis displacement allowed for a frame lasting `dt`.
    #[must_use]
    pub fn step_for(&self, dt: Duration) -> f32 {
        let elapsed_ms = dt.as_secs_f32() * 1_000.0;
        self.speed_per_millisecond() * elapsed_ms
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn slots_along(extent: u32, pitch: f32) -> usize {
    // Float-to-int casts saturate, so huge ratios clamp rather than wrap.
    ((extent as f32 / pitch).floor() as usize).saturating_add(1)
}

/// Reasons a formation configuration may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The window has no area.
    #[error("window must have a positive area (received {width}x{height})")]
    EmptyWindow {
        /// Provided width.
        width: u32,
        /// Provided height.
        height: u32,
    },
    /// The circle radius is not a positive finite number.
    #[error("circle_radius must be positive (received {radius})")]
    InvalidRadius {
        /// Provided radius.
        radius: f32,
    },
    /// The circle margin is negative or not finite.
    #[error("circle_margin must be zero or positive (received {margin})")]
    InvalidMargin {
        /// Provided margin.
        margin: f32,
    },
    /// The leg length is not a positive finite number.
    #[error("step_length must be positive (received {step_length})")]
    InvalidStepLength {
        /// Provided leg length.
        step_length: f32,
    },
    /// The leg duration is not a positive finite number.
    #[error("leg_duration_secs must be positive (received {seconds})")]
    InvalidLegDuration {
        /// Provided duration in seconds.
        seconds: f32,
    },
    /// The window and pitch lay out more shapes than a formation may hold.
    #[error("formation would hold {count} shapes, more than the limit of {limit}")]
    TooManyShapes {
        /// Number of shapes the grid would contain, saturated at `usize::MAX`.
        count: usize,
        /// Largest accepted number of shapes.
        limit: usize,
    },
}

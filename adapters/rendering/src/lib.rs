#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Geomart adapters.
//!
//! Backends receive a [`Presentation`] describing the window and the initial
//! [`Scene`], then call back into the adapter once per frame so it can advance
//! the simulation and refresh the scene before it is drawn.

use anyhow::Result as AnyResult;
use geomart_core::ShapeSnapshot;
use glam::Vec2;
use std::time::Duration;
use thiserror::Error;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::from_rgb_u8(0, 0, 0);

    /// Opaque white.
    pub const WHITE: Self = Self::from_rgb_u8(255, 255, 255);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Filled circle drawn for a single shape of the formation.
///
/// `position` is the upper-left corner of the circle's bounding square,
/// expressed in window pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapePresentation {
    /// Upper-left corner of the bounding square.
    pub position: Vec2,
    /// Radius of the circle in pixels.
    pub radius: f32,
    /// Fill color of the circle.
    pub color: Color,
}

impl ShapePresentation {
    /// Creates a new shape descriptor.
    ///
    /// Returns an error when `radius` is not a positive finite number.
    pub fn new(position: Vec2, radius: f32, color: Color) -> Result<Self, RenderingError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(RenderingError::InvalidRadius { radius });
        }

        Ok(Self {
            position,
            radius,
            color,
        })
    }

    /// Creates a descriptor positioned at the snapshot's current position.
    pub fn from_snapshot(
        snapshot: &ShapeSnapshot,
        radius: f32,
        color: Color,
    ) -> Result<Self, RenderingError> {
        Self::new(
            Vec2::new(snapshot.position.x(), snapshot.position.y()),
            radius,
            color,
        )
    }

    /// Center of the circle in window pixels.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + Vec2::splat(self.radius)
    }
}

/// Scene description listing everything drawn in a frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    /// Shapes drawn in identifier order.
    pub shapes: Vec<ShapePresentation>,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(shapes: Vec<ShapePresentation>) -> Self {
        Self { shapes }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Width of the created window in pixels.
    pub window_width: u32,
    /// Height of the created window in pixels.
    pub window_height: u32,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(
        window_title: T,
        window_size: (u32, u32),
        clear_color: Color,
        scene: Scene,
    ) -> Self
    where
        T: Into<String>,
    {
        let (window_width, window_height) = window_size;
        Self {
            window_title: window_title.into(),
            window_width,
            window_height,
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Geomart scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the elapsed time of the
    /// frame and may mutate the scene before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum RenderingError {
    /// Circles must have a positive radius to be visible.
    #[error("circle radius must be positive (received {radius})")]
    InvalidRadius {
        /// Provided radius that failed validation.
        radius: f32,
    },
}

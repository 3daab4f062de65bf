#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Geomart.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.

use anyhow::Result;
use geomart_rendering::{Presentation, RenderingBackend, Scene, ShapePresentation};
use macroquad::input::{is_key_pressed, KeyCode};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the frame loop.
    quit_requested: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    frame_limit: Option<u32>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Caps the number of frames presented per second; `None` or zero removes the cap.
    #[must_use]
    pub fn with_frame_limit(mut self, frames_per_second: Option<u32>) -> Self {
        self.frame_limit = frames_per_second.filter(|limit| *limit > 0);
        self
    }
}

/// Sleeps away the unused part of each frame's time budget.
#[derive(Clone, Copy, Debug)]
struct FrameLimiter {
    budget: Option<Duration>,
}

impl FrameLimiter {
    fn new(frames_per_second: Option<u32>) -> Self {
        let budget = frames_per_second
            .filter(|limit| *limit > 0)
            .map(|limit| Duration::from_secs(1) / limit);
        Self { budget }
    }

    /// Time left in the frame budget after `spent`, if any.
    fn remaining(&self, spent: Duration) -> Option<Duration> {
        let budget = self.budget?;
        budget
            .checked_sub(spent)
            .filter(|remaining| !remaining.is_zero())
    }
}

/// Time spent in each phase of a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    simulation: Duration,
    render: Duration,
}

/// Accumulates frame timings and summarises them once per second.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    simulation: Duration,
    render: Duration,
    slowest: Duration,
}

/// Summary of the frames rendered during the last reporting second.
#[derive(Clone, Copy, Debug, PartialEq)]
struct FpsMetrics {
    per_second: f32,
    avg_simulation: Duration,
    avg_render: Duration,
    slowest_frame: Duration,
}

impl FpsCounter {
    /// Records a frame, returning a summary once a full second has been covered.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.simulation += breakdown.simulation;
        self.render += breakdown.render;
        self.slowest = self.slowest.max(breakdown.frame);

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let summary = std::mem::take(self);
        Some(FpsMetrics {
            per_second: summary.frames as f32 / summary.elapsed.as_secs_f32(),
            avg_simulation: summary.simulation / summary.frames,
            avg_render: summary.render / summary.frames,
            slowest_frame: summary.slowest,
        })
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            frame_limit,
        } = self;

        let Presentation {
            window_title,
            window_width,
            window_height,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(window_width).unwrap_or(i32::MAX),
            window_height: i32::try_from(window_height).unwrap_or(i32::MAX),
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        info!(
            width = window_width,
            height = window_height,
            frame_limit = frame_limit.unwrap_or(0),
            "opening window"
        );

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let limiter = FrameLimiter::new(frame_limit);
            let mut fps_counter = FpsCounter::default();

            loop {
                let frame_start = Instant::now();
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    debug!("quit requested from keyboard");
                    break;
                }

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));

                let simulation_start = Instant::now();
                update_scene(frame_dt, &mut scene);
                let simulation_duration = simulation_start.elapsed();

                let render_start = Instant::now();
                macroquad::window::clear_background(background);
                draw_shapes(&scene.shapes);
                let render_duration = render_start.elapsed();

                let fps_metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    simulation: simulation_duration,
                    render: render_duration,
                });
                if show_fps {
                    if let Some(metrics) = fps_metrics {
                        info!(
                            fps = metrics.per_second,
                            simulation_ms = metrics.avg_simulation.as_secs_f64() * 1_000.0,
                            render_ms = metrics.avg_render.as_secs_f64() * 1_000.0,
                            slowest_ms = metrics.slowest_frame.as_secs_f64() * 1_000.0,
                            "frame metrics"
                        );
                    }
                }

                if let Some(pause) = limiter.remaining(frame_start.elapsed()) {
                    std::thread::sleep(pause);
                }
                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn draw_shapes(shapes: &[ShapePresentation]) {
    for shape in shapes {
        let center = shape.center();
        macroquad::shapes::draw_circle(
            center.x,
            center.y,
            shape.radius,
            to_macroquad_color(shape.color),
        );
    }
}

fn to_macroquad_color(color: geomart_rendering::Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

use std::time::Duration;

use geomart_core::{Command, Direction, Event, Position};
use geomart_system_choreography::Choreography;
use geomart_system_motion::Motion;
use geomart_world::{self as world, query, World};

struct Harness {
    world: World,
    choreography: Choreography,
    motion: Motion,
}

impl Harness {
    fn new() -> Self {
        Self {
            world: World::new(),
            choreography: Choreography::new(),
            motion: Motion::new(),
        }
    }

    /// Runs one frame and returns the arrival announced by it, if any.
    fn frame(&mut self, dt: Duration) -> Option<u64> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        let arrival = events.iter().find_map(|event| match event {
            Event::FormationArrived { leg } => Some(*leg),
            _ => None,
        });

        let formation = *query::formation(&self.world);
        let mut commands = Vec::new();
        self.choreography.handle(
            &events,
            &query::shape_view(&self.world),
            &formation,
            &mut commands,
        );
        let mut leg_events = Vec::new();
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, &mut leg_events);
        }

        self.motion.handle(
            &events,
            &query::shape_view(&self.world),
            &formation,
            &mut commands,
        );
        for command in commands {
            world::apply(&mut self.world, command, &mut leg_events);
        }

        arrival
    }

    fn positions(&self) -> Vec<Position> {
        query::shape_view(&self.world)
            .iter()
            .map(|shape| shape.position)
            .collect()
    }
}

#[test]
fn formation_walks_a_closed_zig_zag() {
    let mut harness = Harness::new();
    let dt = Duration::from_millis(40);

    let mut first_arrival = None;
    let mut arrival_directions = Vec::new();
    for _ in 0..1_000 {
        let before = harness.positions();
        let representative_direction = query::representative(&harness.world)
            .expect("formation has shapes")
            .direction;
        let all_arrived = query::shape_view(&harness.world)
            .iter()
            .all(|shape| shape.has_arrived());

        let Some(leg) = harness.frame(dt) else {
            continue;
        };
        assert!(all_arrived, "arrival {leg} announced before every shape arrived");
        arrival_directions.push(representative_direction);

        match leg {
            0 => first_arrival = Some(before),
            4 => {
                let first = first_arrival.take().expect("first arrival recorded");
                assert_eq!(before, first);
                break;
            }
            _ => {}
        }
    }

    assert_eq!(
        arrival_directions,
        vec![
            Direction::Right,
            Direction::BottomLeft,
            Direction::Left,
            Direction::TopRight,
            Direction::Right,
        ]
    );
    assert_eq!(harness.choreography.legs_started(), 5);
}

#[test]
fn diagonal_legs_take_twice_as_long_as_cardinal_legs() {
    let mut harness = Harness::new();
    let dt = Duration::from_millis(12);

    let mut arrival_frames = Vec::new();
    for frame in 0..400_u32 {
        if harness.frame(dt).is_some() {
            arrival_frames.push(frame);
        }
        if arrival_frames.len() == 3 {
            break;
        }
    }

    assert_eq!(arrival_frames, vec![21, 63, 84]);
}

#[test]
fn legs_start_from_each_shape_position() {
    let mut harness = Harness::new();
    let _ = harness.frame(Duration::from_secs(1));
    let arrived_at = harness.positions();

    assert_eq!(harness.frame(Duration::ZERO), Some(0));

    for (shape, origin) in query::shape_view(&harness.world).iter().zip(arrived_at) {
        let expected = match shape.direction {
            Direction::BottomLeft => Position::new(origin.x() - 40.0, origin.y() + 40.0),
            Direction::TopRight => Position::new(origin.x() + 40.0, origin.y() - 40.0),
            other => panic!("unexpected direction {other:?}"),
        };
        assert_eq!(shape.destination, expected);
    }
}

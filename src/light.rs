use crate::config::LightDurations;
use crate::math::Point2d;
use crate::NodeId;

/// The shortest duration a light state may be configured with, in s.
const MIN_STATE_DURATION: f64 = 0.01; // s

/// A traffic light at a road network node.
/// Cycles through green, yellow and red with fixed durations.
#[derive(Clone, Debug)]
pub struct TrafficLight {
    /// The node the light controls.
    node: NodeId,
    /// The position of the node.
    position: Point2d,
    /// The current state.
    state: LightState,
    /// The time since the current state was entered, in s.
    elapsed: f64,
    /// The duration of each state.
    durations: LightDurations,
    /// The distance within which vehicles respond to the light.
    influence_radius: f64,
}

/// The state of a traffic light.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LightState {
    Green,
    Yellow,
    Red,
}

impl LightState {
    /// The state which follows this one.
    pub fn next(self) -> Self {
        match self {
            LightState::Green => LightState::Yellow,
            LightState::Yellow => LightState::Red,
            LightState::Red => LightState::Green,
        }
    }
}

impl TrafficLight {
    /// Creates a green traffic light at the given node.
    pub fn new(
        node: NodeId,
        position: Point2d,
        durations: LightDurations,
        influence_radius: f64,
    ) -> Self {
        let clamp = |d: f64| if d >= MIN_STATE_DURATION { d } else { MIN_STATE_DURATION };
        Self {
            node,
            position,
            state: LightState::Green,
            elapsed: 0.0,
            durations: LightDurations {
                green: clamp(durations.green),
                yellow: clamp(durations.yellow),
                red: clamp(durations.red),
            },
            influence_radius,
        }
    }

    /// The node the light controls.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The position of the light in world space.
    pub fn position(&self) -> Point2d {
        self.position
    }

    /// The current state.
    pub fn state(&self) -> LightState {
        self.state
    }

    /// The time spent in the current state, in s.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Vehicles within this distance respond to the light.
    pub fn influence_radius(&self) -> f64 {
        self.influence_radius
    }

    /// The configured duration of a state, in s.
    pub fn duration(&self, state: LightState) -> f64 {
        match state {
            LightState::Green => self.durations.green,
            LightState::Yellow => self.durations.yellow,
            LightState::Red => self.durations.red,
        }
    }

    /// The duration of a full green, yellow, red cycle, in s.
    pub fn cycle_time(&self) -> f64 {
        self.durations.green + self.durations.yellow + self.durations.red
    }

    /// Advances the light by `dt` seconds, taking as many transitions as have elapsed.
    pub fn step(&mut self, dt: f64) {
        if !(dt > 0.0 && dt.is_finite()) {
            return;
        }
        self.elapsed += dt;
        // Whole cycles leave the state unchanged
        let cycle = self.cycle_time();
        if self.elapsed >= cycle {
            self.elapsed %= cycle;
        }
        while self.elapsed >= self.duration(self.state) {
            self.elapsed -= self.duration(self.state);
            self.state = self.state.next();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn default_light() -> TrafficLight {
        TrafficLight::new(
            NodeId::from_index(0),
            Point2d::new(0.0, 0.0),
            LightDurations::default(),
            15.0,
        )
    }

    #[test]
    fn cycle_with_small_steps() {
        let mut light = default_light();
        let mut time = 0.0;
        let mut seen = vec![];
        let dt = 1.0 / 64.0;
        while time < 66.5 {
            light.step(dt);
            time += dt;
            if [30.5, 33.5, 66.5].contains(&time) {
                seen.push(light.state());
            }
        }
        use LightState::*;
        assert_eq!(seen, vec![Yellow, Red, Green]);
    }

    #[test]
    fn transitions_happen_exactly_at_duration() {
        let mut light = default_light();
        let dt = 0.5;
        let mut entered = 0.0;
        let mut time = 0.0;
        let mut state = light.state();
        for _ in 0..400 {
            light.step(dt);
            time += dt;
            if light.state() != state {
                assert_approx_eq!(time - entered, light.duration(state));
                assert_eq!(light.state(), state.next());
                state = light.state();
                entered = time;
            }
        }
    }

    #[test]
    fn large_step_takes_every_transition() {
        let mut light = default_light();
        light.step(30.5);
        assert_eq!(light.state(), LightState::Yellow);
        assert_approx_eq!(light.elapsed(), 0.5);

        let mut light = default_light();
        light.step(33.5);
        assert_eq!(light.state(), LightState::Red);

        let mut light = default_light();
        light.step(66.5);
        assert_eq!(light.state(), LightState::Green);
        assert_approx_eq!(light.elapsed(), 0.5);

        let mut light = default_light();
        light.step(66.0 * 1.0e6 + 31.0);
        assert_eq!(light.state(), LightState::Yellow);
    }

    #[test]
    fn bad_steps_are_ignored() {
        let mut light = default_light();
        light.step(10.0);
        for dt in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            light.step(dt);
            assert_eq!(light.state(), LightState::Green);
            assert_eq!(light.elapsed(), 10.0);
        }
    }

    #[test]
    fn zero_durations_are_clamped() {
        let mut light = TrafficLight::new(
            NodeId::from_index(0),
            Point2d::new(0.0, 0.0),
            LightDurations {
                green: 0.0,
                yellow: -1.0,
                red: 1.0,
            },
            15.0,
        );
        light.step(0.5);
        assert!(light.cycle_time() > 1.0);
    }
}

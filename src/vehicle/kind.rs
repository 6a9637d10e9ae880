/// An RGB display color with components in `0.0..=1.0`.
pub type Color = [f32; 3];

/// The kind of a vehicle, which fixes its physical attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VehicleKind {
    Car,
    Bus,
    Truck,
    Emergency,
}

/// The fixed attributes of a [VehicleKind].
#[derive(Clone, Copy, Debug)]
pub struct KindAttributes {
    /// The top speed in world units per second.
    pub max_speed: f64,
    /// The mass, which scales steering forces down to accelerations.
    pub mass: f64,
    /// The largest acceleration steering may produce.
    pub max_acceleration: f64,
    /// The collision radius.
    pub radius: f64,
    /// The display color.
    pub color: Color,
}

const ATTRIBUTES: [KindAttributes; 4] = [
    // Car
    KindAttributes {
        max_speed: 15.0,
        mass: 1.0,
        max_acceleration: 40.0,
        radius: 2.0,
        color: [0.2, 0.45, 0.9],
    },
    // Bus
    KindAttributes {
        max_speed: 10.0,
        mass: 3.0,
        max_acceleration: 20.0,
        radius: 3.0,
        color: [0.95, 0.75, 0.1],
    },
    // Truck
    KindAttributes {
        max_speed: 11.0,
        mass: 4.0,
        max_acceleration: 18.0,
        radius: 3.0,
        color: [0.5, 0.35, 0.25],
    },
    // Emergency
    KindAttributes {
        max_speed: 20.0,
        mass: 1.2,
        max_acceleration: 50.0,
        radius: 2.0,
        color: [0.9, 0.1, 0.1],
    },
];

impl VehicleKind {
    /// Every vehicle kind.
    pub const ALL: [VehicleKind; 4] = [
        VehicleKind::Car,
        VehicleKind::Bus,
        VehicleKind::Truck,
        VehicleKind::Emergency,
    ];

    /// The fixed attributes of this kind.
    pub fn attributes(self) -> &'static KindAttributes {
        &ATTRIBUTES[self as usize]
    }

    pub fn max_speed(self) -> f64 {
        self.attributes().max_speed
    }

    pub fn mass(self) -> f64 {
        self.attributes().mass
    }

    pub fn max_acceleration(self) -> f64 {
        self.attributes().max_acceleration
    }

    pub fn radius(self) -> f64 {
        self.attributes().radius
    }

    pub fn color(self) -> Color {
        self.attributes().color
    }

    /// Whether vehicles of this kind may ignore traffic lights.
    pub fn ignores_lights(self) -> bool {
        self == VehicleKind::Emergency
    }
}

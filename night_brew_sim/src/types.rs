// Core types shared across the shop simulation.
//
// Defines floor coordinates (`ShopCoord`), entity identifiers (strongly-typed
// UUID v4 wrappers generated from the sim PRNG), and the small enums every
// module speaks: drink and cup types, movement speeds, sim speed and sound
// cues. Everything derives `Serialize`/`Deserialize` so commands, events and
// config can cross the engine boundary as JSON.
//
// **Critical constraint: determinism.** Entity IDs come from the shop's
// `GameRng`. Do not use external UUID libraries or OS entropy.

use crate::prng::GameRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A tile on the shop floor. The engine owns real geometry; the sim only
/// needs a grid to measure remaining distance and walk one tile at a time.
///
/// - X: east (positive) / west (negative)
/// - Z: toward the street door (positive) / toward the counter (negative)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShopCoord {
    pub x: i32,
    pub z: i32,
}

impl ShopCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Manhattan distance in tiles.
    pub fn manhattan_distance(self, other: Self) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.z - other.z).unsigned_abs()
    }
}

impl fmt::Display for ShopCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

// ---------------------------------------------------------------------------
// Entity IDs: deterministic UUID v4
// ---------------------------------------------------------------------------

/// A UUID v4 generated from the simulation PRNG.
///
/// Layout follows RFC 4122: version nibble (bits 48–51) is `0100`, variant
/// bits (64–65) are `10`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimUuid([u8; 16]);

impl SimUuid {
    pub fn new_v4(rng: &mut GameRng) -> Self {
        let mut bytes = rng.next_128_bits();
        bytes[6] = (bytes[6] & 0x0F) | 0x40;
        bytes[8] = (bytes[8] & 0x3F) | 0x80;
        Self(bytes)
    }

    /// Parse the 8-4-4-4-12 hex form.
    pub fn parse(s: &str) -> Option<Self> {
        let hex: String = s.chars().filter(|c| *c != '-').collect();
        if hex.len() != 32 {
            return None;
        }
        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(hex.get(i * 2..i * 2 + 2)?, 16).ok()?;
        }
        Some(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

// Serialized as the hex string so IDs work as JSON map keys.
impl Serialize for SimUuid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SimUuid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        SimUuid::parse(&s).ok_or_else(|| serde::de::Error::custom("invalid UUID format"))
    }
}

impl fmt::Debug for SimUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimUuid({})", self)
    }
}

impl fmt::Display for SimUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if matches!(i, 4 | 6 | 8 | 10) {
                f.write_str("-")?;
            }
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub SimUuid);

        impl $name {
            pub fn new(rng: &mut GameRng) -> Self {
                Self(SimUuid::new_v4(rng))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

entity_id!(/// Unique identifier for a customer NPC.
CustomerId);
entity_id!(/// Unique identifier for a cup instance picked up by the player.
CupId);
entity_id!(/// Unique identifier for the player (the barista).
PlayerId);

/// Drink machines are placed in the scene and named in config, so their IDs
/// are plain integers rather than PRNG UUIDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MachineId(pub u32);

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MachineId({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Drinks and cups
// ---------------------------------------------------------------------------

/// What a cup holds. `None` is the empty cup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DrinkType {
    #[default]
    None,
    Coffee,
    Beer,
    Cappuccino,
    Latte,
    Mocha,
    Espresso,
    Takeaway,
}

impl DrinkType {
    /// Every orderable drink (everything except `None`).
    pub const MENU: [DrinkType; 7] = [
        DrinkType::Coffee,
        DrinkType::Beer,
        DrinkType::Cappuccino,
        DrinkType::Latte,
        DrinkType::Mocha,
        DrinkType::Espresso,
        DrinkType::Takeaway,
    ];

    /// The enum name as shown to the player and matched against order text.
    pub fn name(self) -> &'static str {
        match self {
            DrinkType::None => "None",
            DrinkType::Coffee => "Coffee",
            DrinkType::Beer => "Beer",
            DrinkType::Cappuccino => "Cappuccino",
            DrinkType::Latte => "Latte",
            DrinkType::Mocha => "Mocha",
            DrinkType::Espresso => "Espresso",
            DrinkType::Takeaway => "Takeaway",
        }
    }
}

impl fmt::Display for DrinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The physical vessel. Fixed for the lifetime of a cup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CupType {
    Coffee,
    Beer,
    Takeaway,
}

impl CupType {
    pub fn display_name(self) -> &'static str {
        match self {
            CupType::Coffee => "Coffee Cup",
            CupType::Beer => "Beer Mug",
            CupType::Takeaway => "Takeaway Cup",
        }
    }
}

// ---------------------------------------------------------------------------
// Simulation enums
// ---------------------------------------------------------------------------

/// Simulation clock state. `Paused` is the engine's `timeScale = 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimSpeed {
    Paused,
    Normal,
}

impl SimSpeed {
    pub fn time_scale(self) -> f32 {
        match self {
            SimSpeed::Paused => 0.0,
            SimSpeed::Normal => 1.0,
        }
    }
}

/// Navigation speed preset. Customers run to the counter and walk away.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveSpeed {
    Walk,
    Run,
}

/// Audio cues the engine plays in response to sim events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    Pour,
    Success,
    Error,
    Trash,
    PhoneBuzz,
    AirDropChime,
    Sting,
}

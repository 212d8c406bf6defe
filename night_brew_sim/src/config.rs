// Data-driven shop configuration.
//
// Every tunable lives in `GameConfig`: movement timings, the shop layout
// (waypoints and seats), the drink machines, the roster, the phone
// milestones and their scripts, and the order match policy. The sim never
// hard-codes these; `GameConfig::default()` is the standard night shift.
//
// Configs load from JSON. Every field has a default, so a partial file only
// overrides what it names. `validate` rejects configs that would break the
// sim's invariants (zero-item orders, a milestone at zero, two machines with
// one ID, seats that do not exist).
//
// See also: `sim.rs` which owns the `GameConfig` as part of `ShopState`,
// `roster.rs` for `RosterConfig`, `phone.rs` for `PhoneMode`/`PhoneScript`.
//
// **Critical constraint: determinism.** Config values feed directly into
// simulation logic. Two runs with the same seed and the same config produce
// identical event streams.

use crate::dispenser::DrinkMachine;
use crate::ending::EndingTexts;
use crate::phone::{PhoneLine, PhoneMode, PhoneScript, PhoneTiming};
use crate::register::MatchPolicy;
use crate::roster::RosterConfig;
use crate::types::{DrinkType, MachineId, ShopCoord};
use serde::{Deserialize, Serialize};
use smallvec::smallvec;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("walk and run ticks per tile must be non-zero")]
    ZeroSpeed,
    #[error("machine {0} has no drink")]
    EmptyMachine(MachineId),
    #[error("machine id {0} is used more than once")]
    DuplicateMachine(MachineId),
    #[error("customer {name} orders nothing")]
    UnorderableDrink { name: String },
    #[error("customer {name} expects zero items")]
    EmptyOrder { name: String },
    #[error("customer {name} wants seat {seat}, but only {seats} seats exist")]
    SeatOutOfRange {
        name: String,
        seat: usize,
        seats: usize,
    },
    #[error("random roster max_quantity must be at least 1")]
    ZeroMaxQuantity,
    #[error("sit chance {0} is outside [0, 1]")]
    SitChance(f64),
    #[error("milestone threshold must be at least 1")]
    ZeroThreshold,
    #[error("two milestones share threshold {0}")]
    DuplicateThreshold(u32),
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Named points on the shop floor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Waypoints {
    /// Just inside the street door, where called customers appear.
    pub spawn: ShopCoord,
    /// In front of the register.
    pub counter: ShopCoord,
    /// Where a customer at the counter looks (behind the bar).
    pub look_target: ShopCoord,
    /// Out the door; customers reaching it are removed.
    pub exit: ShopCoord,
    pub seats: Vec<ShopCoord>,
}

impl Default for Waypoints {
    fn default() -> Self {
        Self {
            spawn: ShopCoord::new(0, 12),
            counter: ShopCoord::new(0, 2),
            look_target: ShopCoord::new(0, 0),
            exit: ShopCoord::new(0, 14),
            seats: vec![
                ShopCoord::new(4, 6),
                ShopCoord::new(6, 6),
                ShopCoord::new(4, 9),
            ],
        }
    }
}

/// A phone branch triggered when `customers_served` first equals
/// `threshold`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneConfig {
    pub threshold: u32,
    pub mode: PhoneMode,
    #[serde(default)]
    pub script: PhoneScript,
}

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Real milliseconds per sim tick. Informational; the sim only counts
    /// ticks.
    pub tick_duration_ms: u32,
    pub walk_ticks_per_tile: u64,
    pub run_ticks_per_tile: u64,
    /// Tiles short of a destination that still count as arrived.
    pub stopping_distance: u32,
    pub waypoints: Waypoints,
    pub machines: Vec<DrinkMachine>,
    pub roster: RosterConfig,
    pub milestones: Vec<MilestoneConfig>,
    pub phone_timing: PhoneTiming,
    pub match_policy: MatchPolicy,
    pub endings: EndingTexts,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_duration_ms: 1,
            walk_ticks_per_tile: 600,
            run_ticks_per_tile: 300,
            stopping_distance: 0,
            waypoints: Waypoints::default(),
            machines: default_machines(),
            roster: RosterConfig::default(),
            milestones: default_milestones(),
            phone_timing: PhoneTiming::default(),
            match_policy: MatchPolicy::default(),
            endings: EndingTexts::default(),
        }
    }
}

fn default_machines() -> Vec<DrinkMachine> {
    [
        DrinkType::Coffee,
        DrinkType::Cappuccino,
        DrinkType::Latte,
        DrinkType::Mocha,
        DrinkType::Espresso,
        DrinkType::Beer,
        DrinkType::Takeaway,
    ]
    .into_iter()
    .zip(1..)
    .map(|(drink, id)| DrinkMachine::new(MachineId(id), drink))
    .collect()
}

fn default_milestones() -> Vec<MilestoneConfig> {
    vec![
        MilestoneConfig {
            threshold: 3,
            mode: PhoneMode::AirDrop {
                sender: "Unknown iPhone".to_string(),
                photo: "shop_window_from_outside".to_string(),
            },
            script: PhoneScript {
                accept_lines: smallvec![
                    PhoneLine::Photo("shop_window_from_outside".to_string()),
                    PhoneLine::Contact("you look busy tonight".to_string()),
                ],
                decline_lines: smallvec![PhoneLine::Contact(
                    "why won't you look".to_string()
                )],
            },
        },
        MilestoneConfig {
            threshold: 5,
            mode: PhoneMode::Text {
                contact: "Unknown Number".to_string(),
                message: "i can see you. can i come in?".to_string(),
            },
            script: PhoneScript {
                accept_lines: smallvec![
                    PhoneLine::Player("we're open till close".to_string()),
                    PhoneLine::Contact("thank you. i'll wait my turn.".to_string()),
                ],
                decline_lines: smallvec![
                    PhoneLine::Player("no. leave me alone.".to_string()),
                    PhoneLine::Contact("too late".to_string()),
                ],
            },
        },
    ]
}

impl GameConfig {
    /// Parse and validate. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Drinks the machines can pour, in a stable order.
    pub fn menu(&self) -> Vec<DrinkType> {
        self.machines
            .iter()
            .map(|m| m.drink_type)
            .filter(|d| *d != DrinkType::None)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.walk_ticks_per_tile == 0 || self.run_ticks_per_tile == 0 {
            return Err(ConfigError::ZeroSpeed);
        }

        let mut machine_ids = BTreeSet::new();
        for machine in &self.machines {
            if machine.drink_type == DrinkType::None {
                return Err(ConfigError::EmptyMachine(machine.id));
            }
            if !machine_ids.insert(machine.id) {
                return Err(ConfigError::DuplicateMachine(machine.id));
            }
        }

        let seats = self.waypoints.seats.len();
        match &self.roster {
            RosterConfig::Scripted(specs) => {
                for spec in specs {
                    spec.validate(seats)?;
                }
            }
            RosterConfig::Random {
                max_quantity,
                sit_chance,
                ..
            } => {
                if *max_quantity == 0 {
                    return Err(ConfigError::ZeroMaxQuantity);
                }
                if !(0.0..=1.0).contains(sit_chance) {
                    return Err(ConfigError::SitChance(*sit_chance));
                }
            }
        }

        let mut thresholds = BTreeSet::new();
        for milestone in &self.milestones {
            if milestone.threshold == 0 {
                return Err(ConfigError::ZeroThreshold);
            }
            if !thresholds.insert(milestone.threshold) {
                return Err(ConfigError::DuplicateThreshold(milestone.threshold));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::CustomerSpec;

    #[test]
    fn default_config_is_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn default_config_roundtrips_through_json() {
        let config = GameConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let restored = GameConfig::from_json(&json).unwrap();
        assert_eq!(restored.walk_ticks_per_tile, config.walk_ticks_per_tile);
        assert_eq!(restored.machines, config.machines);
        assert_eq!(restored.milestones, config.milestones);
        assert_eq!(restored.waypoints, config.waypoints);
    }

    #[test]
    fn partial_json_takes_defaults() {
        let config = GameConfig::from_json(
            r#"{
                "run_ticks_per_tile": 100,
                "match_policy": "Exact",
                "waypoints": { "counter": { "x": 1, "z": 3 } }
            }"#,
        )
        .unwrap();
        assert_eq!(config.run_ticks_per_tile, 100);
        assert_eq!(config.walk_ticks_per_tile, 600);
        assert_eq!(config.match_policy, MatchPolicy::Exact);
        assert_eq!(config.waypoints.counter, ShopCoord::new(1, 3));
        assert_eq!(config.waypoints.spawn, ShopCoord::new(0, 12));
        assert_eq!(config.milestones.len(), 2);
    }

    #[test]
    fn menu_lists_each_drink_once() {
        let mut config = GameConfig::default();
        config
            .machines
            .push(DrinkMachine::new(MachineId(8), DrinkType::Coffee));
        let menu = config.menu();
        assert_eq!(menu.len(), 7);
        assert_eq!(menu[0], DrinkType::Coffee);
    }

    #[test]
    fn rejects_zero_threshold() {
        let mut config = GameConfig::default();
        config.milestones[0].threshold = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroThreshold)));
    }

    #[test]
    fn rejects_duplicate_threshold() {
        let mut config = GameConfig::default();
        config.milestones[1].threshold = 3;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateThreshold(3))
        ));
    }

    #[test]
    fn rejects_duplicate_machine() {
        let mut config = GameConfig::default();
        config
            .machines
            .push(DrinkMachine::new(MachineId(1), DrinkType::Beer));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateMachine(MachineId(1)))
        ));
    }

    #[test]
    fn rejects_zero_item_order_and_bad_seat() {
        let mut config = GameConfig::default();
        config.roster = RosterConfig::Scripted(vec![CustomerSpec::new("Ada", DrinkType::Beer, 0)]);
        assert!(matches!(config.validate(), Err(ConfigError::EmptyOrder { .. })));

        config.roster = RosterConfig::Scripted(vec![
            CustomerSpec::new("Ada", DrinkType::Beer, 1).sitting_at(3),
        ]);
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "customer Ada wants seat 3, but only 3 seats exist"
        );
    }

    #[test]
    fn rejects_bad_sit_chance() {
        let mut config = GameConfig::default();
        config.roster = RosterConfig::Random {
            count: 3,
            max_quantity: 2,
            sit_chance: 1.5,
        };
        assert!(matches!(config.validate(), Err(ConfigError::SitChance(_))));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(
            GameConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = GameConfig::from_file(Path::new("/nonexistent/night_brew.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

// The shift roster: who comes in tonight and what they order.
//
// A roster is either the hand-authored script or a random one rolled from
// the sim's `GameRng` against the drinks the shop's machines can actually
// make. Either way `build_roster` produces a list of `CustomerSpec`s in
// arrival order; the sim turns each into a waiting `Customer`.

use crate::config::ConfigError;
use crate::prng::GameRng;
use crate::types::DrinkType;
use log::warn;
use serde::{Deserialize, Serialize};

/// Names for randomly rolled customers.
const RANDOM_NAMES: [&str; 10] = [
    "Ada", "Bram", "Cleo", "Dev", "Edie", "Finn", "Gus", "Hana", "Ivo", "Jules",
];

fn default_quantity() -> u32 {
    1
}

fn default_waiting_node() -> String {
    "CustomerWaiting".to_string()
}

fn default_counter_node() -> String {
    "CustomerOrder".to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSpec {
    pub name: String,
    pub drink: DrinkType,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Free-form order text. Defaults to "<quantity>x <Drink>".
    #[serde(default)]
    pub order_text: Option<String>,
    /// Index into the configured seats. `None` leaves through the door.
    #[serde(default)]
    pub seat: Option<usize>,
    #[serde(default = "default_waiting_node")]
    pub waiting_node: String,
    #[serde(default = "default_counter_node")]
    pub counter_node: String,
}

impl CustomerSpec {
    pub fn new(name: impl Into<String>, drink: DrinkType, quantity: u32) -> Self {
        Self {
            name: name.into(),
            drink,
            quantity,
            order_text: None,
            seat: None,
            waiting_node: default_waiting_node(),
            counter_node: default_counter_node(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.order_text = Some(text.into());
        self
    }

    pub fn sitting_at(mut self, seat: usize) -> Self {
        self.seat = Some(seat);
        self
    }

    /// Reject customers who could never be served: nothing to order, zero
    /// items, or a seat the layout (with `seats` seats) does not have.
    pub fn validate(&self, seats: usize) -> Result<(), ConfigError> {
        if self.drink == DrinkType::None {
            return Err(ConfigError::UnorderableDrink {
                name: self.name.clone(),
            });
        }
        if self.quantity == 0 {
            return Err(ConfigError::EmptyOrder {
                name: self.name.clone(),
            });
        }
        if let Some(seat) = self.seat.filter(|s| *s >= seats) {
            return Err(ConfigError::SeatOutOfRange {
                name: self.name.clone(),
                seat,
                seats,
            });
        }
        Ok(())
    }

    pub fn order_text(&self) -> String {
        self.order_text
            .clone()
            .unwrap_or_else(|| format!("{}x {}", self.quantity, self.drink))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RosterConfig {
    Scripted(Vec<CustomerSpec>),
    Random {
        count: u32,
        max_quantity: u32,
        /// Probability in [0, 1] that a customer stays for a seat.
        sit_chance: f64,
    },
}

impl Default for RosterConfig {
    fn default() -> Self {
        RosterConfig::Scripted(default_shift())
    }
}

/// The hand-authored night shift.
pub fn default_shift() -> Vec<CustomerSpec> {
    vec![
        CustomerSpec::new("Marnie", DrinkType::Coffee, 1),
        CustomerSpec::new("Dale", DrinkType::Latte, 2).sitting_at(0),
        CustomerSpec::new("Priya", DrinkType::Beer, 1),
        CustomerSpec::new("The Man in the Grey Coat", DrinkType::Espresso, 1)
            .with_text("1x Espresso. Black. Like the night."),
        CustomerSpec::new("Theo", DrinkType::Takeaway, 2),
        CustomerSpec::new("June", DrinkType::Mocha, 1).sitting_at(1),
    ]
}

/// Resolve a roster config into concrete customers, in arrival order.
///
/// `menu` is the set of drinks the shop can pour; random customers only
/// order from it. Random seats are drawn from `0..seat_count`.
pub fn build_roster(
    roster: &RosterConfig,
    menu: &[DrinkType],
    seat_count: usize,
    rng: &mut GameRng,
) -> Vec<CustomerSpec> {
    match roster {
        RosterConfig::Scripted(specs) => specs.clone(),
        RosterConfig::Random {
            count,
            max_quantity,
            sit_chance,
        } => {
            if menu.is_empty() {
                warn!("[ROSTER] No drinks on the menu; random roster is empty");
                return Vec::new();
            }
            (0..*count)
                .map(|_| {
                    let name = rng.choose(&RANDOM_NAMES).copied().unwrap_or("Stranger");
                    let drink = rng.choose(menu).copied().unwrap_or(DrinkType::Coffee);
                    let quantity = rng.range_u32_inclusive(1, (*max_quantity).max(1));
                    let mut spec = CustomerSpec::new(name, drink, quantity);
                    if seat_count > 0 && rng.random_bool(*sit_chance) {
                        spec.seat = Some(rng.range_usize(0, seat_count));
                    }
                    spec
                })
                .collect()
        }
    }
}

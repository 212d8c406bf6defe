// Drink machines.
//
// A `DrinkMachine` pours one drink type. `check_pour` runs the validation
// chain against whatever the player is holding and either names the cup to
// fill or returns a `PourRejection` whose `Display` text is the feedback the
// player sees. The sim applies the result (sound cue, fill, feedback); this
// module never mutates a cup itself.
//
// See also: `cup.rs` for the compatibility table, `sim.rs` for
// `use_drink_machine`.

use crate::cup::{Cup, HeldItem, required_cup_for};
use crate::types::{CupId, CupType, DrinkType, MachineId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Why a pour was refused. Each stage of the chain has its own message.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PourRejection {
    #[error("You need to hold a drink/cup!")]
    NothingHeld,
    #[error("That's not a cup!")]
    NotACup,
    #[error("Cup is already full!")]
    CupFull,
    #[error("Wrong cup! Use a {} for {drink}!", .required.display_name())]
    WrongCup { required: CupType, drink: DrinkType },
    #[error("This machine is out of order.")]
    OutOfOrder,
}

impl PourRejection {
    /// Only an empty hand is too mundane for the error buzzer.
    pub fn plays_error_sound(&self) -> bool {
        !matches!(self, PourRejection::NothingHeld)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrinkMachine {
    pub id: MachineId,
    pub drink_type: DrinkType,
}

impl DrinkMachine {
    pub fn new(id: MachineId, drink_type: DrinkType) -> Self {
        Self { id, drink_type }
    }

    /// Validate the held item against this machine, in order:
    /// something held, it is a cup, the cup is empty, the cup fits the drink.
    pub fn check_pour(
        &self,
        held: Option<&HeldItem>,
        cups: &BTreeMap<CupId, Cup>,
    ) -> Result<CupId, PourRejection> {
        let held = held.ok_or(PourRejection::NothingHeld)?;
        let cup = held
            .cup_id()
            .and_then(|id| cups.get(&id))
            .ok_or(PourRejection::NotACup)?;
        if !cup.is_empty() {
            return Err(PourRejection::CupFull);
        }
        let required = required_cup_for(self.drink_type).ok_or(PourRejection::OutOfOrder)?;
        if cup.cup_type() != required {
            return Err(PourRejection::WrongCup {
                required,
                drink: self.drink_type,
            });
        }
        Ok(cup.id)
    }
}

// Drink containers and what the player can hold.
//
// A `Cup` is pure data: an immutable `CupType` and mutable `contents`. Its
// visual state (`CupVisual`) is derived from the contents on demand, so the
// "exactly one drink model is active iff the cup is full" rule cannot drift.
//
// `required_cup_for` is the drink → vessel compatibility table used by the
// drink machines. It is a total function over `DrinkType`.
//
// See also: `dispenser.rs` (fills cups), `register.rs` (consumes them),
// `trash.rs` (destroys them), `sim.rs` (owns the `cups` registry and the
// player's hand).

use crate::types::{CupId, CupType, DrinkType};
use log::warn;
use serde::{Deserialize, Serialize};

/// Whatever is in the player's hand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeldItem {
    /// A cup from the `cups` registry.
    Cup(CupId),
    /// Anything without a cup component (a mop, a phone charger, ...).
    Prop(String),
}

impl HeldItem {
    pub fn cup_id(&self) -> Option<CupId> {
        match self {
            HeldItem::Cup(id) => Some(*id),
            HeldItem::Prop(_) => None,
        }
    }
}

/// The drink model shown inside a full cup. One category per drink family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CupVisual {
    CoffeeFamily,
    Beer,
    Takeaway,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cup {
    pub id: CupId,
    cup_type: CupType,
    contents: DrinkType,
}

impl Cup {
    /// A fresh, empty cup.
    pub fn new(id: CupId, cup_type: CupType) -> Self {
        Self {
            id,
            cup_type,
            contents: DrinkType::None,
        }
    }

    pub fn cup_type(&self) -> CupType {
        self.cup_type
    }

    pub fn contents(&self) -> DrinkType {
        self.contents
    }

    pub fn is_empty(&self) -> bool {
        self.contents == DrinkType::None
    }

    /// Overwrite the contents. Filling with `None` is rejected and logged;
    /// returns whether the cup changed.
    pub fn fill(&mut self, drink: DrinkType) -> bool {
        if drink == DrinkType::None {
            warn!("[CUP] Refusing to fill {} with nothing", self.id);
            return false;
        }
        self.contents = drink;
        true
    }

    /// The single active drink model, or `None` for an empty cup.
    pub fn visual(&self) -> Option<CupVisual> {
        match self.contents {
            DrinkType::None => None,
            DrinkType::Coffee
            | DrinkType::Cappuccino
            | DrinkType::Latte
            | DrinkType::Mocha
            | DrinkType::Espresso => Some(CupVisual::CoffeeFamily),
            DrinkType::Beer => Some(CupVisual::Beer),
            DrinkType::Takeaway => Some(CupVisual::Takeaway),
        }
    }
}

/// The vessel a drink must be poured into. `None` (the empty drink) has no
/// requirement.
pub fn required_cup_for(drink: DrinkType) -> Option<CupType> {
    match drink {
        DrinkType::None => None,
        DrinkType::Coffee
        | DrinkType::Cappuccino
        | DrinkType::Latte
        | DrinkType::Mocha
        | DrinkType::Espresso => Some(CupType::Coffee),
        DrinkType::Beer => Some(CupType::Beer),
        DrinkType::Takeaway => Some(CupType::Takeaway),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prng::GameRng;

    fn new_cup(cup_type: CupType) -> Cup {
        let mut rng = GameRng::new(1);
        Cup::new(CupId::new(&mut rng), cup_type)
    }

    #[test]
    fn new_cup_is_empty_with_no_visual() {
        let cup = new_cup(CupType::Coffee);
        assert!(cup.is_empty());
        assert_eq!(cup.visual(), None);
    }

    #[test]
    fn fill_with_none_is_rejected() {
        let mut cup = new_cup(CupType::Coffee);
        assert!(!cup.fill(DrinkType::None));
        assert!(cup.is_empty());
    }

    #[test]
    fn fill_overwrites_and_sets_visual() {
        let mut cup = new_cup(CupType::Coffee);
        assert!(cup.fill(DrinkType::Latte));
        assert_eq!(cup.contents(), DrinkType::Latte);
        assert_eq!(cup.visual(), Some(CupVisual::CoffeeFamily));
        assert!(cup.fill(DrinkType::Mocha));
        assert_eq!(cup.contents(), DrinkType::Mocha);
    }

    #[test]
    fn visual_active_iff_full() {
        for drink in DrinkType::MENU {
            let mut cup = new_cup(CupType::Beer);
            assert!(cup.visual().is_none());
            cup.fill(drink);
            assert!(cup.visual().is_some(), "{drink} should show a model");
        }
    }

    #[test]
    fn compatibility_table_is_total() {
        for drink in DrinkType::MENU {
            assert!(required_cup_for(drink).is_some(), "{drink} has no cup");
        }
        assert_eq!(required_cup_for(DrinkType::None), None);
        assert_eq!(required_cup_for(DrinkType::Espresso), Some(CupType::Coffee));
        assert_eq!(required_cup_for(DrinkType::Beer), Some(CupType::Beer));
        assert_eq!(required_cup_for(DrinkType::Takeaway), Some(CupType::Takeaway));
    }

    #[test]
    fn prop_has_no_cup_id() {
        assert_eq!(HeldItem::Prop("mop".into()).cup_id(), None);
    }
}

// Disposal station.
//
// The trash can accepts anything the player holds. `check_dispose` only
// validates; the sim removes the item from the hand (and the cup from the
// registry) and emits the feedback.

use crate::cup::HeldItem;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TrashRejection {
    #[error("You're not holding anything.")]
    NothingHeld,
}

/// Feedback shown after a successful disposal.
pub const DISPOSED_MESSAGE: &str = "Item thrown away";

/// Take the held item for destruction.
pub fn check_dispose(held: Option<&HeldItem>) -> Result<HeldItem, TrashRejection> {
    held.cloned().ok_or(TrashRejection::NothingHeld)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_hand_cannot_dispose() {
        assert_eq!(check_dispose(None), Err(TrashRejection::NothingHeld));
    }

    #[test]
    fn props_go_in_the_trash_too() {
        let held = HeldItem::Prop("receipt".into());
        assert_eq!(check_dispose(Some(&held)), Ok(held.clone()));
    }
}

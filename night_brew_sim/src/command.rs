// Commands that mutate shop state.
//
// All external input to the shop goes through `ShopCommand`: the player's
// interactions (picking things up, using machines, the register and the
// trash, talking to customers, answering the phone), callbacks from the
// dialogue runner, and a few administrative actions for tools and tests.
// The sim is a pure function `(state, commands) -> (new_state, events)`,
// and commands are the input.
//
// The full flow for a player action:
//   engine raycast hits an interactable → constructs a `ShopCommand` →
//   `ShopState::step()` in `sim.rs` processes it.
//
// See also: `sim.rs` for `apply_command()`, `event.rs` for what comes back.
//
// **Critical constraint: determinism.** Commands are the sole external input
// to the sim. Internal state changes come from scheduled events.

use crate::customer::Conversation;
use crate::phone::PhoneChoice;
use crate::roster::CustomerSpec;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// A player-issued command targeting a specific simulation tick.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShopCommand {
    pub player_id: PlayerId,
    pub tick: u64,
    pub action: ShopAction,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ShopAction {
    /// Take a fresh empty cup from the stack. Fails if the hand is full.
    PickUpCup { cup_type: CupType },
    /// Pick up something that is not a cup.
    PickUpProp { name: String },
    /// Put down whatever is held. Dropped cups are gone for good.
    DropHeldItem,
    UseDrinkMachine { machine: MachineId },
    UseTrash,
    UseRegister,
    /// Start this customer's dialogue.
    TalkToCustomer { customer: CustomerId },
    /// The dialogue runner finished a conversation.
    DialogueFinished {
        customer: CustomerId,
        conversation: Conversation,
    },
    PhoneChoice { choice: PhoneChoice },
    /// Append a customer to the back of the queue.
    AddCustomer { spec: CustomerSpec },
    /// Unbind the register from its customer without completing the order.
    ForceReleaseCustomer,
    /// Overwrite the served counter. Fired milestones stay fired.
    SetCustomersServed { count: u32 },
    /// Lock up and go home. Only meaningful once everyone is served.
    LeaveShop,
    SetSimSpeed { speed: SimSpeed },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prng::GameRng;

    #[test]
    fn command_serialization_roundtrip() {
        let mut rng = GameRng::new(42);
        let cmd = ShopCommand {
            player_id: PlayerId::new(&mut rng),
            tick: 100,
            action: ShopAction::AddCustomer {
                spec: CustomerSpec::new("Ada", DrinkType::Mocha, 2).sitting_at(1),
            },
        };

        let json = serde_json::to_string(&cmd).unwrap();
        let restored: ShopCommand = serde_json::from_str(&json).unwrap();

        assert_eq!(cmd.player_id, restored.player_id);
        assert_eq!(cmd.tick, restored.tick);
        // ShopAction doesn't derive PartialEq, so compare re-serialized JSON.
        assert_eq!(json, serde_json::to_string(&restored).unwrap());
    }
}

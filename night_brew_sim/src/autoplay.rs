// Scripted barista for headless runs.
//
// `Autoplayer` reads a `ShopState` and decides what a competent player would
// do right now: take the order of whoever is at the register, grab the right
// cup, pour, and hand it over; answer the phone with a fixed choice; lock up
// when the shift is done. `run` alternates polling and stepping until an
// ending is reached or the tick budget runs out.
//
// Used by the `night_brew_headless` binary, the throughput benchmark and the
// integration tests. It only issues ordinary `ShopAction`s, so everything it
// does goes through the same validation a real player hits.

use crate::command::{ShopAction, ShopCommand};
use crate::cup::required_cup_for;
use crate::customer::Conversation;
use crate::display::Objective;
use crate::ending::EndingKind;
use crate::event::ShopEvent;
use crate::phone::PhoneChoice;
use crate::sim::ShopState;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Autoplayer {
    /// How the bot answers every phone branch.
    pub phone_choice: PhoneChoice,
    /// Ticks between polls.
    pub poll_interval: u64,
}

impl Default for Autoplayer {
    fn default() -> Self {
        Self {
            phone_choice: PhoneChoice::Accept,
            poll_interval: 250,
        }
    }
}

/// Summary of an autoplayed shift.
#[derive(Clone, Debug)]
pub struct ShiftReport {
    pub events: Vec<ShopEvent>,
    pub ending: Option<EndingKind>,
    pub customers_served: u32,
    pub final_tick: u64,
}

impl Autoplayer {
    pub fn new(phone_choice: PhoneChoice) -> Self {
        Self {
            phone_choice,
            ..Self::default()
        }
    }

    /// What to do this poll, in order. Empty when there is nothing to do.
    pub fn next_actions(&self, shop: &ShopState) -> Vec<ShopAction> {
        if shop.ending.is_over() {
            return Vec::new();
        }
        if shop.phone.is_awaiting_choice() {
            return vec![ShopAction::PhoneChoice {
                choice: self.phone_choice,
            }];
        }
        if *shop.task_board.objective() == Objective::LeaveShop {
            return vec![ShopAction::LeaveShop];
        }

        let Some(customer) = shop
            .register
            .current_customer()
            .and_then(|id| shop.customers.get(&id))
        else {
            return Vec::new();
        };

        let mut actions = Vec::new();
        if !customer.finished_order_conversation {
            actions.push(ShopAction::TalkToCustomer {
                customer: customer.id,
            });
            actions.push(ShopAction::DialogueFinished {
                customer: customer.id,
                conversation: Conversation::Order,
            });
        }

        let drink = customer.order.drink;
        if shop.held_cup().is_some_and(|cup| cup.contents() == drink) {
            actions.push(ShopAction::UseRegister);
            return actions;
        }
        let (Some(cup_type), Some(machine)) = (
            required_cup_for(drink),
            shop.machines.values().find(|m| m.drink_type == drink),
        ) else {
            return actions;
        };
        if shop.hand.is_some() {
            actions.push(ShopAction::UseTrash);
        }
        actions.push(ShopAction::PickUpCup { cup_type });
        actions.push(ShopAction::UseDrinkMachine {
            machine: machine.id,
        });
        actions.push(ShopAction::UseRegister);
        actions
    }

    /// Play until an ending or `max_ticks`.
    pub fn run(&self, shop: &mut ShopState, max_ticks: u64) -> ShiftReport {
        let mut events = Vec::new();
        let poll = self.poll_interval.max(1);
        while !shop.ending.is_over() && shop.tick < max_ticks {
            let tick = shop.tick + 1;
            let commands: Vec<ShopCommand> = self
                .next_actions(shop)
                .into_iter()
                .map(|action| ShopCommand {
                    player_id: shop.player_id,
                    tick,
                    action,
                })
                .collect();
            let target = (shop.tick + poll).min(max_ticks).max(tick);
            events.extend(shop.step(&commands, target).events);
        }
        ShiftReport {
            events,
            ending: shop.ending.reached(),
            customers_served: shop.queue.customers_served(),
            final_tick: shop.tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepting_bot_finishes_default_shift_well() {
        let mut shop = ShopState::new(42);
        let report = Autoplayer::new(PhoneChoice::Accept).run(&mut shop, 600_000);
        assert_eq!(report.ending, Some(EndingKind::Good));
        assert_eq!(report.customers_served, 6);
        assert_eq!(shop.at_counter_count(), 0);
    }

    #[test]
    fn declining_bot_ends_at_first_milestone() {
        let mut shop = ShopState::new(42);
        let report = Autoplayer::new(PhoneChoice::Decline).run(&mut shop, 600_000);
        assert_eq!(report.ending, Some(EndingKind::Bad));
        assert_eq!(report.customers_served, 3);
    }

    #[test]
    fn idle_shop_asks_for_nothing() {
        let shop = ShopState::new(42);
        assert!(Autoplayer::default().next_actions(&shop).is_empty());
    }
}

// Customer NPCs and their orders.
//
// Each customer walks a fixed lifecycle:
//
//   Waiting ──call_to_counter──▶ Approaching ──arrive──▶ AtCounter
//   AtCounter ──finish_order_and_leave──▶ Leaving (to the exit, then removed)
//                                      └─▶ Seated  (to a seat, then sits forever)
//
// Transitions are methods on `Customer` that check the current state and
// refuse (with a warning) when called out of order. Movement itself lives in
// the `NavAgent`; the sim steps it and calls `arrive` when the arrival
// predicate holds.
//
// The `Order` tracks items against an expected count. `items_received` is
// capped at `items_expected`, and completion is terminal: delivering to a
// finished order reports `AlreadyComplete` and changes nothing.
//
// Conversation flags are set by the dialogue runner through
// `DialogueFinished` commands and only affect prompts and facing; order
// progress never depends on them.
//
// See also: `sim.rs` for the activation chain that moves customers,
// `queue.rs` for admission, `register.rs` for delivery validation,
// `roster.rs` for `CustomerSpec`.

use crate::nav::NavAgent;
use crate::roster::CustomerSpec;
use crate::types::{CustomerId, DrinkType, MoveSpeed, ShopCoord};
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerState {
    Waiting,
    Approaching,
    AtCounter,
    Leaving,
    Seated,
}

/// Which dialogue a customer has with the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conversation {
    /// Small talk before reaching the counter.
    Waiting,
    /// Placing the order at the counter.
    Order,
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub drink: DrinkType,
    /// Shown on the order board; also the substring match target.
    pub display_text: String,
    pub items_expected: u32,
    items_received: u32,
}

/// Result of handing one item to a customer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryProgress {
    Remaining(u32),
    Completed,
    AlreadyComplete,
}

impl Order {
    pub fn new(drink: DrinkType, display_text: impl Into<String>, items_expected: u32) -> Self {
        Self {
            drink,
            display_text: display_text.into(),
            items_expected,
            items_received: 0,
        }
    }

    pub fn items_received(&self) -> u32 {
        self.items_received
    }

    pub fn remaining(&self) -> u32 {
        self.items_expected.saturating_sub(self.items_received)
    }

    pub fn is_complete(&self) -> bool {
        self.items_received >= self.items_expected
    }

    fn receive(&mut self) -> DeliveryProgress {
        if self.is_complete() {
            return DeliveryProgress::AlreadyComplete;
        }
        self.items_received += 1;
        if self.is_complete() {
            DeliveryProgress::Completed
        } else {
            DeliveryProgress::Remaining(self.remaining())
        }
    }
}

// ---------------------------------------------------------------------------
// Customer
// ---------------------------------------------------------------------------

/// What an arrival meant for the customer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrivalOutcome {
    ReachedCounter,
    ReachedSeat,
    ReachedExit,
    /// Arrival in a state with no destination semantics.
    None,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub state: CustomerState,
    pub order: Order,
    pub agent: NavAgent,
    /// Where to sit after being served; `None` walks out the door.
    pub seat: Option<ShopCoord>,
    pub waiting_node: String,
    pub counter_node: String,
    pub has_arrived_at_counter: bool,
    pub finished_waiting_conversation: bool,
    pub finished_order_conversation: bool,
    pub visible: bool,
    pub sitting: bool,
    /// Point the customer turns to face, if any.
    pub facing: Option<ShopCoord>,
}

impl Customer {
    /// A hidden, waiting customer parked at `spawn`.
    pub fn from_spec(
        id: CustomerId,
        spec: &CustomerSpec,
        seat: Option<ShopCoord>,
        spawn: ShopCoord,
        stopping_distance: u32,
    ) -> Self {
        Self {
            id,
            name: spec.name.clone(),
            state: CustomerState::Waiting,
            order: Order::new(spec.drink, spec.order_text(), spec.quantity),
            agent: NavAgent::new(spawn, stopping_distance),
            seat,
            waiting_node: spec.waiting_node.clone(),
            counter_node: spec.counter_node.clone(),
            has_arrived_at_counter: false,
            finished_waiting_conversation: false,
            finished_order_conversation: false,
            visible: false,
            sitting: false,
            facing: None,
        }
    }

    /// `Waiting → Approaching`: appear at the spawn point and run for the
    /// counter.
    pub fn call_to_counter(&mut self, spawn: ShopCoord, counter: ShopCoord) -> bool {
        if self.state != CustomerState::Waiting {
            warn!(
                "[CUSTOMER] {} called to counter while {:?}; ignoring",
                self.name, self.state
            );
            return false;
        }
        self.agent.teleport(spawn);
        self.agent.set_destination(counter, MoveSpeed::Run);
        self.visible = true;
        self.state = CustomerState::Approaching;
        true
    }

    /// Handle the arrival predicate firing for the current destination.
    pub fn arrive(&mut self, look_target: ShopCoord) -> ArrivalOutcome {
        match self.state {
            CustomerState::Approaching => {
                self.agent.stop();
                self.facing = Some(look_target);
                self.has_arrived_at_counter = true;
                self.state = CustomerState::AtCounter;
                ArrivalOutcome::ReachedCounter
            }
            CustomerState::Leaving => {
                self.agent.stop();
                self.visible = false;
                ArrivalOutcome::ReachedExit
            }
            CustomerState::Seated if !self.sitting => {
                self.agent.stop();
                self.sitting = true;
                ArrivalOutcome::ReachedSeat
            }
            _ => ArrivalOutcome::None,
        }
    }

    /// Hand over one item.
    pub fn deliver_item(&mut self) -> DeliveryProgress {
        if self.state != CustomerState::AtCounter {
            warn!(
                "[CUSTOMER] {} received an item while {:?}",
                self.name, self.state
            );
        }
        self.order.receive()
    }

    /// `AtCounter → Leaving | Seated`, walking to the seat if one is
    /// assigned, otherwise to `exit`.
    pub fn finish_order_and_leave(&mut self, exit: ShopCoord) -> bool {
        if self.state != CustomerState::AtCounter {
            warn!(
                "[CUSTOMER] {} asked to leave while {:?}; ignoring",
                self.name, self.state
            );
            return false;
        }
        self.facing = None;
        match self.seat {
            Some(seat) => {
                self.agent.set_destination(seat, MoveSpeed::Walk);
                self.state = CustomerState::Seated;
            }
            None => {
                self.agent.set_destination(exit, MoveSpeed::Walk);
                self.state = CustomerState::Leaving;
            }
        }
        true
    }

    /// The dialogue node to start when the player talks to this customer.
    pub fn dialogue_node(&self) -> &str {
        if self.has_arrived_at_counter {
            &self.counter_node
        } else {
            &self.waiting_node
        }
    }

    pub fn interaction_prompt(&self) -> Option<String> {
        if !self.visible {
            return None;
        }
        match self.state {
            CustomerState::Approaching if !self.finished_waiting_conversation => {
                Some(format!("Talk to {}", self.name))
            }
            CustomerState::AtCounter if !self.finished_order_conversation => {
                Some(format!("Take {}'s order", self.name))
            }
            CustomerState::AtCounter if !self.order.is_complete() => {
                Some(format!("{} wants {}", self.name, self.order.display_text))
            }
            CustomerState::Seated if self.sitting => Some(format!("Talk to {}", self.name)),
            _ => None,
        }
    }

    pub fn finish_conversation(&mut self, conversation: Conversation) {
        match conversation {
            Conversation::Waiting => self.finished_waiting_conversation = true,
            Conversation::Order => self.finished_order_conversation = true,
        }
    }

    /// Customers at the counter keep turning toward the player until they
    /// have placed their order.
    pub fn faces_player(&self) -> bool {
        self.state == CustomerState::AtCounter && !self.finished_order_conversation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prng::GameRng;

    const SPAWN: ShopCoord = ShopCoord::new(0, 12);
    const COUNTER: ShopCoord = ShopCoord::new(0, 2);
    const LOOK: ShopCoord = ShopCoord::new(0, 0);
    const EXIT: ShopCoord = ShopCoord::new(0, 14);

    fn customer(quantity: u32, seat: Option<ShopCoord>) -> Customer {
        let mut rng = GameRng::new(11);
        let spec = CustomerSpec::new("Dale", DrinkType::Latte, quantity);
        Customer::from_spec(CustomerId::new(&mut rng), &spec, seat, SPAWN, 0)
    }

    fn walk_to_arrival(c: &mut Customer) -> ArrivalOutcome {
        while c.agent.step_toward() {}
        assert!(c.agent.has_arrived());
        c.arrive(LOOK)
    }

    fn at_counter(quantity: u32, seat: Option<ShopCoord>) -> Customer {
        let mut c = customer(quantity, seat);
        assert!(c.call_to_counter(SPAWN, COUNTER));
        assert_eq!(walk_to_arrival(&mut c), ArrivalOutcome::ReachedCounter);
        c
    }

    #[test]
    fn new_customer_is_hidden_and_waiting() {
        let c = customer(1, None);
        assert_eq!(c.state, CustomerState::Waiting);
        assert!(!c.visible);
        assert_eq!(c.interaction_prompt(), None);
        assert_eq!(c.order.display_text, "1x Latte");
    }

    #[test]
    fn call_to_counter_only_from_waiting() {
        let mut c = customer(1, None);
        assert!(c.call_to_counter(SPAWN, COUNTER));
        assert_eq!(c.state, CustomerState::Approaching);
        assert!(c.visible);
        assert_eq!(c.agent.speed(), MoveSpeed::Run);
        assert!(!c.call_to_counter(SPAWN, COUNTER));
        assert_eq!(c.state, CustomerState::Approaching);
    }

    #[test]
    fn arriving_at_counter_faces_look_target() {
        let c = at_counter(1, None);
        assert_eq!(c.state, CustomerState::AtCounter);
        assert!(c.has_arrived_at_counter);
        assert_eq!(c.facing, Some(LOOK));
        assert_eq!(c.agent.position, COUNTER);
        assert!(c.faces_player());
    }

    #[test]
    fn delivery_counts_up_and_caps() {
        let mut c = at_counter(2, None);
        assert_eq!(c.deliver_item(), DeliveryProgress::Remaining(1));
        assert_eq!(c.deliver_item(), DeliveryProgress::Completed);
        assert_eq!(c.deliver_item(), DeliveryProgress::AlreadyComplete);
        assert_eq!(c.order.items_received(), 2);
        assert!(c.order.is_complete());
    }

    #[test]
    fn leaving_walks_to_exit_and_departs() {
        let mut c = at_counter(1, None);
        c.deliver_item();
        assert!(c.finish_order_and_leave(EXIT));
        assert_eq!(c.state, CustomerState::Leaving);
        assert_eq!(c.agent.speed(), MoveSpeed::Walk);
        assert_eq!(walk_to_arrival(&mut c), ArrivalOutcome::ReachedExit);
        assert!(!c.visible);
    }

    #[test]
    fn seated_customer_sits_once() {
        let seat = ShopCoord::new(4, 6);
        let mut c = at_counter(1, Some(seat));
        assert!(c.finish_order_and_leave(EXIT));
        assert_eq!(c.state, CustomerState::Seated);
        assert_eq!(walk_to_arrival(&mut c), ArrivalOutcome::ReachedSeat);
        assert!(c.sitting);
        assert_eq!(c.agent.position, seat);
        assert_eq!(c.arrive(LOOK), ArrivalOutcome::None);
    }

    #[test]
    fn leave_rejected_before_counter() {
        let mut c = customer(1, None);
        assert!(!c.finish_order_and_leave(EXIT));
        assert_eq!(c.state, CustomerState::Waiting);
    }

    #[test]
    fn dialogue_node_switches_on_arrival() {
        let mut c = customer(1, None);
        assert_eq!(c.dialogue_node(), "CustomerWaiting");
        c.call_to_counter(SPAWN, COUNTER);
        walk_to_arrival(&mut c);
        assert_eq!(c.dialogue_node(), "CustomerOrder");
    }

    #[test]
    fn prompts_follow_conversation_flags() {
        let mut c = customer(2, None);
        c.call_to_counter(SPAWN, COUNTER);
        assert_eq!(c.interaction_prompt().as_deref(), Some("Talk to Dale"));
        c.finish_conversation(Conversation::Waiting);
        assert_eq!(c.interaction_prompt(), None);

        walk_to_arrival(&mut c);
        assert_eq!(c.interaction_prompt().as_deref(), Some("Take Dale's order"));
        c.finish_conversation(Conversation::Order);
        assert!(!c.faces_player());
        assert_eq!(c.interaction_prompt().as_deref(), Some("Dale wants 2x Latte"));

        c.deliver_item();
        c.deliver_item();
        assert_eq!(c.interaction_prompt(), None);
    }
}

// Test-only shop driver for end-to-end shift tests.
//
// Wraps a real `ShopState` and provides a synchronous, test-friendly API:
// issue one player action at the next tick, run the clock forward, wait for
// a customer to reach the counter, pour and serve a drink, answer the phone.
// Every event the sim emits is also appended to `log`.
//
// Time always advances in small chunks, and after every chunk the harness
// asserts that at most one customer stands at the counter, so every scenario
// checks that invariant for free.
//
// The only test-specific code here is the driving loop; all behavior goes
// through `ShopState::step` with ordinary `ShopCommand`s.
//
// See also: `tests/full_shift.rs` and `tests/phone_branches.rs`.

use night_brew_sim::command::{ShopAction, ShopCommand};
use night_brew_sim::config::{GameConfig, MilestoneConfig};
use night_brew_sim::cup::required_cup_for;
use night_brew_sim::event::{ShopEvent, ShopEventKind};
use night_brew_sim::phone::PhoneChoice;
use night_brew_sim::roster::{CustomerSpec, RosterConfig};
use night_brew_sim::sim::ShopState;
use night_brew_sim::types::{CupType, CustomerId, DrinkType, MachineId};

/// Ticks per harness step. Small enough that the counter invariant is
/// checked many times per customer walk.
const CHUNK: u64 = 50;

/// Upper bound for any `wait_*` helper.
const WAIT_BUDGET: u64 = 120_000;

pub struct TestShop {
    pub sim: ShopState,
    pub log: Vec<ShopEvent>,
}

impl TestShop {
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, GameConfig::default())
    }

    pub fn with_config(seed: u64, config: GameConfig) -> Self {
        config.validate().expect("test config must be valid");
        Self {
            sim: ShopState::with_config(seed, config),
            log: Vec::new(),
        }
    }

    /// A shop with exactly these customers and milestones.
    pub fn scripted(customers: Vec<CustomerSpec>, milestones: Vec<MilestoneConfig>) -> Self {
        let config = GameConfig {
            roster: RosterConfig::Scripted(customers),
            milestones,
            ..GameConfig::default()
        };
        Self::with_config(42, config)
    }

    fn record(&mut self, events: Vec<ShopEvent>) -> Vec<ShopEvent> {
        assert!(
            self.sim.at_counter_count() <= 1,
            "more than one customer at the counter at tick {}",
            self.sim.tick
        );
        self.log.extend(events.iter().cloned());
        events
    }

    /// Apply one action at the next tick.
    pub fn act(&mut self, action: ShopAction) -> Vec<ShopEvent> {
        self.act_all(vec![action])
    }

    /// Apply several actions, in order, at the next tick.
    pub fn act_all(&mut self, actions: Vec<ShopAction>) -> Vec<ShopEvent> {
        let tick = self.sim.tick + 1;
        let commands: Vec<ShopCommand> = actions
            .into_iter()
            .map(|action| ShopCommand {
                player_id: self.sim.player_id,
                tick,
                action,
            })
            .collect();
        let events = self.sim.step(&commands, tick).events;
        self.record(events)
    }

    /// Advance the clock by `ticks` in small chunks.
    pub fn run_for(&mut self, ticks: u64) -> Vec<ShopEvent> {
        let end = self.sim.tick + ticks;
        let mut events = Vec::new();
        while self.sim.tick < end {
            let target = (self.sim.tick + CHUNK).min(end);
            let chunk = self.sim.step(&[], target).events;
            events.extend(self.record(chunk));
        }
        events
    }

    /// Run until `done` holds, panicking after the wait budget.
    pub fn wait_until(&mut self, what: &str, done: impl Fn(&ShopState) -> bool) -> Vec<ShopEvent> {
        let deadline = self.sim.tick + WAIT_BUDGET;
        let mut events = Vec::new();
        while !done(&self.sim) {
            assert!(self.sim.tick < deadline, "timed out waiting for {what}");
            events.extend(self.run_for(CHUNK));
        }
        events
    }

    /// Run until someone is bound to the register; returns who.
    pub fn wait_for_counter(&mut self) -> CustomerId {
        self.wait_until("a customer at the counter", |sim| {
            sim.register.current_customer().is_some()
        });
        self.sim
            .register
            .current_customer()
            .expect("register bound after wait")
    }

    pub fn wait_for_phone_prompt(&mut self) -> Vec<ShopEvent> {
        self.wait_until("the phone prompt", |sim| sim.phone.is_awaiting_choice())
    }

    /// Answer the phone and run until the sequence has closed.
    pub fn answer_phone(&mut self, choice: PhoneChoice) -> Vec<ShopEvent> {
        let mut events = self.act(ShopAction::PhoneChoice { choice });
        events.extend(self.wait_until("the phone to close", |sim| !sim.phone.is_active()));
        events
    }

    pub fn machine_for(&self, drink: DrinkType) -> MachineId {
        self.sim
            .machines
            .values()
            .find(|m| m.drink_type == drink)
            .map(|m| m.id)
            .unwrap_or_else(|| panic!("no machine pours {drink}"))
    }

    pub fn customer_named(&self, name: &str) -> CustomerId {
        self.sim
            .customer_by_name(name)
            .unwrap_or_else(|| panic!("no customer named {name}"))
            .id
    }

    /// Pick up a fresh cup of `cup_type` and fill it at the `drink` machine.
    pub fn pour(&mut self, cup_type: CupType, drink: DrinkType) -> Vec<ShopEvent> {
        let machine = self.machine_for(drink);
        self.act_all(vec![
            ShopAction::PickUpCup { cup_type },
            ShopAction::UseDrinkMachine { machine },
        ])
    }

    /// Pour `drink` into the right cup and hand it over.
    pub fn serve(&mut self, drink: DrinkType) -> Vec<ShopEvent> {
        let cup_type = required_cup_for(drink).expect("orderable drink");
        let mut events = self.pour(cup_type, drink);
        events.extend(self.act(ShopAction::UseRegister));
        events
    }

    /// Wait for the next customer and serve their whole order.
    pub fn serve_next_customer(&mut self) -> Vec<ShopEvent> {
        let id = self.wait_for_counter();
        let (drink, expected) = {
            let order = &self.sim.customers[&id].order;
            (order.drink, order.items_expected)
        };
        let mut events = Vec::new();
        for _ in 0..expected {
            events.extend(self.serve(drink));
        }
        events
    }
}

// ---------------------------------------------------------------------------
// Event helpers
// ---------------------------------------------------------------------------

pub fn feedback(events: &[ShopEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match &e.kind {
            ShopEventKind::Feedback { message, .. } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

/// Names of customers called to the counter, in order.
pub fn called(events: &[ShopEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match &e.kind {
            ShopEventKind::CustomerCalled { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect()
}

pub fn count(events: &[ShopEvent], pred: impl Fn(&ShopEventKind) -> bool) -> usize {
    events.iter().filter(|e| pred(&e.kind)).count()
}

pub fn coffee_regulars(n: usize) -> Vec<CustomerSpec> {
    (0..n)
        .map(|i| CustomerSpec::new(format!("Regular {i}"), DrinkType::Coffee, 1))
        .collect()
}

// Core shop state and tick loop.
//
// `ShopState` is the single source of truth for one night shift. It owns the
// player's hand, the cup and customer registries, the queue, the register,
// the drink machines, the phone, the HUD projections, the event queue, the
// PRNG and the config. The sim is a pure function:
// `(state, commands) -> (new_state, events)`.
//
// On construction the roster is resolved (`roster.rs`), every customer is
// created hidden and `Waiting`, and an `OpenShop` event is scheduled at tick
// 0 to admit the first one.
//
// ## Customer activation chain
//
// A customer who has somewhere to go has one pending `CustomerActivation`
// event. Each activation walks one tile (`NavAgent::step_toward`), then
// evaluates the arrival predicate. On arrival the state machine in
// `customer.rs` decides what it meant (counter, seat, exit); otherwise the
// next activation is scheduled `ticks_per_tile` later, at run speed while
// approaching and walk speed after being served. This is the only place the
// arrival predicate is evaluated.
//
// ## Service flow
//
//   OpenShop → queue.admit_next → Call(head) → customer runs to the counter
//   → arrival binds the register, shows the order → player pours and uses
//   the register → each match delivers one item → on completion the register
//   is released, the customer walks off, and `queue.customer_left` either
//   admits the next customer or fires a milestone.
//
// A milestone suspends admission and starts a phone sequence. Its steps run
// as `PhoneStep` events carrying the sequence's cancel token. When the
// sequence closes, its continuation resumes admission (accept) or ends the
// shift badly (decline). Running out of customers puts up the "leave the
// shop" objective, and a `LeaveShop` command under that objective is the
// good ending. Either ending pauses the sim and further commands are
// ignored.
//
// ## Pausing
//
// While `speed` is `Paused` commands still apply but scheduled events do
// not fire; the clock keeps advancing and every pending event is postponed
// by the paused duration, so unpausing resumes exactly where things were.
//
// See also: `event.rs` for the event queue, `command.rs` for `ShopCommand`,
// `config.rs` for `GameConfig`, `types.rs` for entity IDs.
//
// **Critical constraint: determinism.** All state mutations flow through
// `ShopCommand` or internal scheduled events. No external input (system time,
// thread state, etc.) may influence the simulation.

use crate::command::{ShopAction, ShopCommand};
use crate::config::GameConfig;
use crate::cup::{Cup, HeldItem};
use crate::customer::{ArrivalOutcome, Conversation, Customer, CustomerState, DeliveryProgress};
use crate::dispenser::DrinkMachine;
use crate::display::{Objective, OrderBoard, Severity, TaskBoard};
use crate::ending::{EndingKind, EndingTracker};
use crate::event::{EventQueue, ScheduledEventKind, ShopEvent, ShopEventKind};
use crate::nav::ticks_per_tile;
use crate::phone::{
    CancelToken, Continuation, Continuations, PhoneChoice, PhoneManager, PhoneOutput,
};
use crate::prng::GameRng;
use crate::queue::{Admission, CustomerQueue, LeftOutcome, Milestone};
use crate::register::Register;
use crate::roster::{CustomerSpec, build_roster};
use crate::trash::{self, DISPOSED_MESSAGE};
use crate::types::*;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level shop state. This is the entire shift.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShopState {
    /// Current simulation tick (1 tick = 1 simulated millisecond).
    pub tick: u64,
    pub rng: GameRng,
    pub config: GameConfig,
    pub speed: SimSpeed,
    pub event_queue: EventQueue,
    pub player_id: PlayerId,
    /// What the barista is holding.
    pub hand: Option<HeldItem>,
    pub cups: BTreeMap<CupId, Cup>,
    pub customers: BTreeMap<CustomerId, Customer>,
    pub queue: CustomerQueue,
    pub register: Register,
    pub machines: BTreeMap<MachineId, DrinkMachine>,
    pub phone: PhoneManager,
    pub order_board: OrderBoard,
    pub task_board: TaskBoard,
    pub ending: EndingTracker,
}

/// Output of `step()`.
#[derive(Clone, Debug, Default)]
pub struct StepResult {
    pub events: Vec<ShopEvent>,
}

impl ShopState {
    /// A shop running the default shift.
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, GameConfig::default())
    }

    /// Build a shop from `config`. An invalid config is logged, not fatal:
    /// scripted customers who could never be served are left out of the
    /// roster so the queue cannot stall on them.
    pub fn with_config(seed: u64, config: GameConfig) -> Self {
        if let Err(e) = config.validate() {
            error!("[CONFIG] Invalid config: {e}");
        }
        let mut rng = GameRng::new(seed);
        let player_id = PlayerId::new(&mut rng);

        let specs = build_roster(
            &config.roster,
            &config.menu(),
            config.waypoints.seats.len(),
            &mut rng,
        );
        let milestones: Vec<Milestone> = config
            .milestones
            .iter()
            .map(|m| Milestone::new(m.threshold))
            .collect();
        let machines = config
            .machines
            .iter()
            .map(|m| (m.id, m.clone()))
            .collect();
        let phone = PhoneManager::new(config.phone_timing.clone());

        let mut state = Self {
            tick: 0,
            rng,
            config,
            speed: SimSpeed::Normal,
            event_queue: EventQueue::new(),
            player_id,
            hand: None,
            cups: BTreeMap::new(),
            customers: BTreeMap::new(),
            queue: CustomerQueue::default(),
            register: Register::default(),
            machines,
            phone,
            order_board: OrderBoard::default(),
            task_board: TaskBoard::default(),
            ending: EndingTracker::default(),
        };

        let seats = state.config.waypoints.seats.len();
        let ids: Vec<CustomerId> = specs
            .iter()
            .filter(|spec| match spec.validate(seats) {
                Ok(()) => true,
                Err(e) => {
                    warn!("[ROSTER] Skipping {}: {e}", spec.name);
                    false
                }
            })
            .map(|spec| state.create_customer(spec))
            .collect();
        state.queue = CustomerQueue::new(ids, milestones);
        state.event_queue.schedule(0, ScheduledEventKind::OpenShop);
        state
    }

    /// Apply a batch of commands and advance the sim to the target tick,
    /// processing all scheduled events up to that point.
    ///
    /// Commands must be sorted by tick. Commands with tick > `target_tick`
    /// are ignored (caller error); commands dated before the current tick
    /// apply immediately.
    pub fn step(&mut self, commands: &[ShopCommand], target_tick: u64) -> StepResult {
        let mut events = Vec::new();
        let mut cmd_idx = 0;

        loop {
            let next_cmd_tick = commands
                .get(cmd_idx)
                .filter(|c| c.tick <= target_tick)
                .map(|c| c.tick.max(self.tick));
            let next_event_tick = if self.speed == SimSpeed::Paused {
                None
            } else {
                self.event_queue
                    .peek_tick()
                    .filter(|t| *t <= target_tick)
            };

            let next_tick = match (next_event_tick, next_cmd_tick) {
                (Some(et), Some(ct)) => et.min(ct),
                (Some(et), None) => et,
                (None, Some(ct)) => ct,
                (None, None) => break,
            };
            self.advance_clock(next_tick);

            while cmd_idx < commands.len() && commands[cmd_idx].tick <= self.tick {
                let cmd = &commands[cmd_idx];
                cmd_idx += 1;
                self.apply_command(cmd, &mut events);
            }

            if self.speed != SimSpeed::Paused {
                while let Some(event) = self.event_queue.pop_if_ready(self.tick) {
                    self.process_event(event.kind, &mut events);
                    if self.speed == SimSpeed::Paused {
                        break;
                    }
                }
            }
        }

        self.advance_clock(target_tick);
        StepResult { events }
    }

    /// Move the clock forward, postponing pending events while paused.
    fn advance_clock(&mut self, to: u64) {
        if to <= self.tick {
            return;
        }
        if self.speed == SimSpeed::Paused {
            self.event_queue.postpone_all(to - self.tick);
        }
        self.tick = to;
    }

    fn emit(&self, events: &mut Vec<ShopEvent>, kind: ShopEventKind) {
        events.push(ShopEvent {
            tick: self.tick,
            kind,
        });
    }

    fn feedback(&self, events: &mut Vec<ShopEvent>, message: impl Into<String>, severity: Severity) {
        self.emit(
            events,
            ShopEventKind::Feedback {
                message: message.into(),
                severity,
            },
        );
    }

    fn sound(&self, events: &mut Vec<ShopEvent>, cue: SoundCue) {
        self.emit(events, ShopEventKind::Sound { cue });
    }

    fn set_objective(&mut self, objective: Objective, events: &mut Vec<ShopEvent>) {
        if self.task_board.set(objective.clone()) {
            let text = objective.text();
            self.emit(events, ShopEventKind::TaskChanged { objective, text });
        }
    }

    /// Schedule `kind` `delay` ticks from now. Zero delays are bumped to one
    /// tick so a step can never re-trigger itself within the same tick.
    fn schedule_in(&mut self, delay: u64, kind: ScheduledEventKind) {
        self.event_queue.schedule(self.tick + delay.max(1), kind);
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    fn apply_command(&mut self, cmd: &ShopCommand, events: &mut Vec<ShopEvent>) {
        if self.ending.is_over() {
            debug!("Ignoring {:?} after the ending", cmd.action);
            return;
        }
        match &cmd.action {
            ShopAction::PickUpCup { cup_type } => {
                if self.hand.is_some() {
                    self.feedback(events, "Your hands are full!", Severity::Info);
                    return;
                }
                let id = CupId::new(&mut self.rng);
                self.cups.insert(id, Cup::new(id, *cup_type));
                self.pick_up(HeldItem::Cup(id), events);
            }
            ShopAction::PickUpProp { name } => {
                if self.hand.is_some() {
                    self.feedback(events, "Your hands are full!", Severity::Info);
                    return;
                }
                self.pick_up(HeldItem::Prop(name.clone()), events);
            }
            ShopAction::DropHeldItem => {
                if let Some(item) = self.take_held() {
                    self.emit(events, ShopEventKind::ItemDropped { item });
                }
            }
            ShopAction::UseDrinkMachine { machine } => {
                self.use_drink_machine(*machine, events);
            }
            ShopAction::UseTrash => self.use_trash(events),
            ShopAction::UseRegister => self.use_register(events),
            ShopAction::TalkToCustomer { customer } => {
                self.talk_to_customer(*customer, events);
            }
            ShopAction::DialogueFinished {
                customer,
                conversation,
            } => {
                self.dialogue_finished(*customer, *conversation, events);
            }
            ShopAction::PhoneChoice { choice } => self.phone_choice(*choice),
            ShopAction::AddCustomer { spec } => {
                if let Err(e) = spec.validate(self.config.waypoints.seats.len()) {
                    warn!("[QUEUE] Not adding {}: {e}", spec.name);
                    return;
                }
                let id = self.create_customer(spec);
                info!("[QUEUE] Added {} to the back of the queue", spec.name);
                if let Some(admission) = self.queue.add_customer(id) {
                    self.handle_admission(admission, events);
                }
            }
            ShopAction::ForceReleaseCustomer => self.force_release(events),
            ShopAction::SetCustomersServed { count } => {
                self.queue.set_customers_served(*count);
            }
            ShopAction::LeaveShop => {
                if *self.task_board.objective() == Objective::LeaveShop {
                    self.reach_ending(EndingKind::Good, events);
                } else {
                    self.feedback(events, "You can't leave yet.", Severity::Info);
                }
            }
            ShopAction::SetSimSpeed { speed } => {
                self.speed = *speed;
                self.emit(events, ShopEventKind::SpeedChanged { speed: *speed });
            }
        }
    }

    fn pick_up(&mut self, item: HeldItem, events: &mut Vec<ShopEvent>) {
        self.hand = Some(item.clone());
        self.emit(events, ShopEventKind::ItemPickedUp { item });
    }

    /// Empty the hand, destroying a held cup.
    fn take_held(&mut self) -> Option<HeldItem> {
        let item = self.hand.take()?;
        if let Some(id) = item.cup_id() {
            self.cups.remove(&id);
        }
        Some(item)
    }

    fn use_drink_machine(&mut self, machine_id: MachineId, events: &mut Vec<ShopEvent>) {
        let Some(machine) = self.machines.get(&machine_id) else {
            error!("[MACHINE] No drink machine with {machine_id}");
            return;
        };
        let drink = machine.drink_type;
        match machine.check_pour(self.hand.as_ref(), &self.cups) {
            Ok(cup_id) => {
                self.sound(events, SoundCue::Pour);
                if let Some(cup) = self.cups.get_mut(&cup_id) {
                    cup.fill(drink);
                }
                self.emit(events, ShopEventKind::CupFilled { cup_id, drink });
                self.feedback(events, format!("Poured {drink}!"), Severity::Success);
            }
            Err(rejection) => {
                if rejection.plays_error_sound() {
                    self.sound(events, SoundCue::Error);
                }
                self.feedback(events, rejection.to_string(), Severity::Error);
            }
        }
    }

    fn use_trash(&mut self, events: &mut Vec<ShopEvent>) {
        if let Err(rejection) = trash::check_dispose(self.hand.as_ref()) {
            self.feedback(events, rejection.to_string(), Severity::Info);
            return;
        }
        if let Some(item) = self.take_held() {
            self.sound(events, SoundCue::Trash);
            self.emit(events, ShopEventKind::ItemDisposed { item });
            self.feedback(events, DISPOSED_MESSAGE, Severity::Info);
        }
    }

    fn use_register(&mut self, events: &mut Vec<ShopEvent>) {
        let delivery = match self.register.check_delivery(
            self.hand.as_ref(),
            &self.cups,
            &self.customers,
            self.config.match_policy,
        ) {
            Ok(delivery) => delivery,
            Err(rejection) => {
                if rejection.plays_error_sound() {
                    self.sound(events, SoundCue::Error);
                }
                self.feedback(events, rejection.to_string(), rejection.severity());
                return;
            }
        };

        // A finished order takes nothing more; the cup stays in hand and the
        // customer is sent on so the queue keeps moving.
        if self
            .customers
            .get(&delivery.customer_id)
            .is_some_and(|c| c.order.is_complete())
        {
            warn!(
                "[REGISTER] {} already has their order; releasing them",
                delivery.customer_id
            );
            self.complete_order(delivery.customer_id, events);
            return;
        }

        self.sound(events, SoundCue::Success);
        self.hand = None;
        self.cups.remove(&delivery.cup_id);
        self.emit(
            events,
            ShopEventKind::ItemDelivered {
                cup_id: delivery.cup_id,
                customer_id: delivery.customer_id,
            },
        );

        let customer_id = delivery.customer_id;
        let Some(customer) = self.customers.get_mut(&customer_id) else {
            return;
        };
        let progress = customer.deliver_item();
        let name = customer.name.clone();
        let text = customer.order.display_text.clone();

        match progress {
            DeliveryProgress::Remaining(remaining) => {
                if self.order_board.update_remaining(remaining) {
                    self.emit(
                        events,
                        ShopEventKind::OrderShown {
                            customer_id,
                            text: text.clone(),
                            remaining,
                        },
                    );
                }
                self.set_objective(Objective::ServeOrder { text, remaining }, events);
                self.feedback(
                    events,
                    format!("{remaining} more item(s) to serve"),
                    Severity::Info,
                );
            }
            DeliveryProgress::Completed => {
                info!("[REGISTER] Order complete for {name}");
                self.feedback(events, "Order Complete!", Severity::Success);
                self.complete_order(customer_id, events);
            }
            DeliveryProgress::AlreadyComplete => {
                warn!("[REGISTER] {name}'s order was already complete");
            }
        }
    }

    /// The register's customer is done: release them, send them off, and
    /// let the queue decide what happens next.
    fn complete_order(&mut self, customer_id: CustomerId, events: &mut Vec<ShopEvent>) {
        self.register.release();
        if self.order_board.clear() {
            self.emit(events, ShopEventKind::OrderCleared);
        }

        let exit = self.config.waypoints.exit;
        let mut leave_delay = None;
        if let Some(customer) = self.customers.get_mut(&customer_id) {
            if customer.finish_order_and_leave(exit) {
                leave_delay = Some(ticks_per_tile(customer.agent.speed(), &self.config));
            }
        }
        if let Some(delay) = leave_delay {
            self.schedule_in(delay, ScheduledEventKind::CustomerActivation { customer_id });
        }

        let outcome = self.queue.customer_left(customer_id);
        self.emit(
            events,
            ShopEventKind::CustomerLeft {
                customer_id,
                customers_served: self.queue.customers_served(),
            },
        );
        match outcome {
            LeftOutcome::Admit(admission) => self.handle_admission(admission, events),
            LeftOutcome::Branch { milestone } => self.start_phone_branch(milestone, events),
        }
    }

    fn talk_to_customer(&mut self, customer_id: CustomerId, events: &mut Vec<ShopEvent>) {
        let Some(customer) = self.customers.get(&customer_id) else {
            warn!("[CUSTOMER] Talk to unknown {customer_id}");
            return;
        };
        if !customer.visible {
            warn!("[CUSTOMER] Talk to hidden customer {}", customer.name);
            return;
        }
        let node = customer.dialogue_node().to_string();
        self.emit(events, ShopEventKind::DialogueStarted { customer_id, node });
    }

    fn dialogue_finished(
        &mut self,
        customer_id: CustomerId,
        conversation: Conversation,
        events: &mut Vec<ShopEvent>,
    ) {
        let Some(customer) = self.customers.get_mut(&customer_id) else {
            warn!("[CUSTOMER] Dialogue finished for unknown {customer_id}");
            return;
        };
        customer.finish_conversation(conversation);
        let objective = Objective::ServeOrder {
            text: customer.order.display_text.clone(),
            remaining: customer.order.remaining(),
        };
        let at_register = self.register.current_customer() == Some(customer_id);
        if conversation == Conversation::Order && at_register {
            self.set_objective(objective, events);
        }
    }

    fn force_release(&mut self, events: &mut Vec<ShopEvent>) {
        let Some(customer_id) = self.register.release() else {
            debug!("[REGISTER] Force release with no customer bound");
            return;
        };
        warn!("[REGISTER] Force-released {customer_id} without completing the order");
        self.emit(events, ShopEventKind::RegisterReleased { customer_id });
        if self.order_board.clear() {
            self.emit(events, ShopEventKind::OrderCleared);
        }
    }

    fn phone_choice(&mut self, choice: PhoneChoice) {
        match self.phone.choose(choice) {
            Ok((token, delay)) => {
                self.schedule_in(delay, ScheduledEventKind::PhoneStep { token });
            }
            Err(e) => warn!("[PHONE] {e}"),
        }
    }

    // -----------------------------------------------------------------------
    // Queue and customers
    // -----------------------------------------------------------------------

    /// Build a hidden, waiting customer from a spec and register it.
    fn create_customer(&mut self, spec: &CustomerSpec) -> CustomerId {
        let id = CustomerId::new(&mut self.rng);
        let seat = spec.seat.and_then(|index| {
            let seat = self.config.waypoints.seats.get(index).copied();
            if seat.is_none() {
                warn!("[ROSTER] {} wants missing seat {index}; will leave instead", spec.name);
            }
            seat
        });
        let customer = Customer::from_spec(
            id,
            spec,
            seat,
            self.config.waypoints.spawn,
            self.config.stopping_distance,
        );
        self.customers.insert(id, customer);
        id
    }

    fn handle_admission(&mut self, admission: Admission, events: &mut Vec<ShopEvent>) {
        match admission {
            Admission::Call(customer_id) => self.call_customer(customer_id, events),
            Admission::Busy(_) | Admission::Idle => {}
            Admission::Suspended => debug!("[QUEUE] Admission suspended"),
            Admission::Exhausted => {
                self.set_objective(Objective::LeaveShop, events);
                self.emit(
                    events,
                    ShopEventKind::ShiftExhausted {
                        customers_served: self.queue.customers_served(),
                    },
                );
            }
        }
    }

    fn call_customer(&mut self, customer_id: CustomerId, events: &mut Vec<ShopEvent>) {
        let spawn = self.config.waypoints.spawn;
        let counter = self.config.waypoints.counter;
        let Some(customer) = self.customers.get_mut(&customer_id) else {
            error!("[QUEUE] Admitted {customer_id}, who does not exist");
            return;
        };
        if !customer.call_to_counter(spawn, counter) {
            return;
        }
        let name = customer.name.clone();
        let delay = ticks_per_tile(customer.agent.speed(), &self.config);
        info!("[QUEUE] Calling {name} to the counter");
        self.schedule_in(delay, ScheduledEventKind::CustomerActivation { customer_id });
        self.emit(events, ShopEventKind::CustomerCalled { customer_id, name });
        self.set_objective(Objective::WaitForCustomer, events);
    }

    // -----------------------------------------------------------------------
    // Scheduled events
    // -----------------------------------------------------------------------

    fn process_event(&mut self, kind: ScheduledEventKind, events: &mut Vec<ShopEvent>) {
        match kind {
            ScheduledEventKind::OpenShop => {
                info!("[QUEUE] Shop open with {} customers queued", self.queue.len());
                let admission = self.queue.admit_next();
                self.handle_admission(admission, events);
            }
            ScheduledEventKind::CustomerActivation { customer_id } => {
                self.process_customer_activation(customer_id, events);
            }
            ScheduledEventKind::PhoneStep { token } => self.process_phone_step(token, events),
        }
    }

    /// Walk one tile, then either handle arrival or schedule the next step.
    fn process_customer_activation(&mut self, customer_id: CustomerId, events: &mut Vec<ShopEvent>) {
        let Some(customer) = self.customers.get_mut(&customer_id) else {
            return;
        };
        customer.agent.step_toward();
        if customer.agent.has_arrived() {
            self.handle_arrival(customer_id, events);
        } else if customer.agent.is_moving() {
            let delay = ticks_per_tile(customer.agent.speed(), &self.config);
            self.schedule_in(delay, ScheduledEventKind::CustomerActivation { customer_id });
        }
    }

    fn handle_arrival(&mut self, customer_id: CustomerId, events: &mut Vec<ShopEvent>) {
        let look_target = self.config.waypoints.look_target;
        let Some(customer) = self.customers.get_mut(&customer_id) else {
            return;
        };
        let outcome = customer.arrive(look_target);
        let name = customer.name.clone();
        let text = customer.order.display_text.clone();
        let remaining = customer.order.remaining();
        let ordered = customer.finished_order_conversation;
        let position = customer.agent.position;

        match outcome {
            ArrivalOutcome::ReachedCounter => {
                info!("[QUEUE] {name} reached the counter");
                self.register.assign(customer_id);
                self.emit(events, ShopEventKind::CustomerArrived { customer_id });
                self.order_board.show(customer_id, &text, remaining);
                self.emit(
                    events,
                    ShopEventKind::OrderShown {
                        customer_id,
                        text: text.clone(),
                        remaining,
                    },
                );
                let objective = if ordered {
                    Objective::ServeOrder { text, remaining }
                } else {
                    Objective::TakeOrder { name }
                };
                self.set_objective(objective, events);
            }
            ArrivalOutcome::ReachedSeat => {
                debug!("[CUSTOMER] {name} sat down at {position}");
                self.emit(
                    events,
                    ShopEventKind::CustomerSeated {
                        customer_id,
                        seat: position,
                    },
                );
            }
            ArrivalOutcome::ReachedExit => {
                debug!("[CUSTOMER] {name} left the shop");
                self.customers.remove(&customer_id);
                self.emit(events, ShopEventKind::CustomerDeparted { customer_id });
            }
            ArrivalOutcome::None => {}
        }
    }

    // -----------------------------------------------------------------------
    // Phone branches and endings
    // -----------------------------------------------------------------------

    fn start_phone_branch(&mut self, index: usize, events: &mut Vec<ShopEvent>) {
        let threshold = self
            .queue
            .milestones()
            .get(index)
            .map_or(0, |m| m.threshold);
        self.emit(
            events,
            ShopEventKind::MilestoneReached {
                threshold,
                customers_served: self.queue.customers_served(),
            },
        );

        let Some(milestone) = self.config.milestones.get(index).cloned() else {
            error!("[PHONE] No phone script for milestone {index}; resuming admission");
            let admission = self.queue.resume();
            self.handle_admission(admission, events);
            return;
        };

        self.set_objective(Objective::AnswerPhone, events);
        let sender = milestone.mode.sender().to_string();
        let cue = milestone.mode.notification_cue();
        let received = self.phone.receive(
            milestone.mode,
            milestone.script,
            Continuations {
                on_accept: Continuation::ResumeAdmission,
                on_decline: Continuation::BadEnding,
            },
        );
        self.sound(events, cue);
        self.emit(events, ShopEventKind::PhoneNotification { sender, cue });
        self.schedule_in(
            received.delay,
            ScheduledEventKind::PhoneStep {
                token: received.token,
            },
        );
    }

    fn process_phone_step(&mut self, token: CancelToken, events: &mut Vec<ShopEvent>) {
        let Some(step) = self.phone.advance(token) else {
            return;
        };
        match step.output {
            PhoneOutput::MessageShown { sender, text } => {
                self.emit(events, ShopEventKind::PhoneMessageShown { sender, text });
            }
            PhoneOutput::Line(line) => {
                self.emit(events, ShopEventKind::PhoneReply { line });
            }
            PhoneOutput::Closed {
                choice,
                continuation,
            } => {
                self.emit(events, ShopEventKind::PhoneClosed { choice });
                self.run_continuation(continuation, events);
            }
        }
        if let Some(delay) = step.next_delay {
            self.schedule_in(delay, ScheduledEventKind::PhoneStep { token });
        }
    }

    fn run_continuation(&mut self, continuation: Continuation, events: &mut Vec<ShopEvent>) {
        match continuation {
            Continuation::ResumeAdmission => {
                let admission = self.queue.resume();
                if admission == Admission::Suspended {
                    warn!("[QUEUE] Still suspended after resume");
                }
                if matches!(admission, Admission::Busy(_) | Admission::Idle) {
                    self.set_objective(Objective::WaitForCustomer, events);
                }
                self.handle_admission(admission, events);
            }
            Continuation::BadEnding => self.reach_ending(EndingKind::Bad, events),
            Continuation::Nothing => {}
        }
    }

    fn reach_ending(&mut self, kind: EndingKind, events: &mut Vec<ShopEvent>) {
        if !self.ending.reach(kind) {
            return;
        }
        if kind == EndingKind::Bad {
            self.sound(events, SoundCue::Sting);
        }
        self.set_objective(Objective::None, events);
        self.speed = SimSpeed::Paused;
        self.emit(
            events,
            ShopEventKind::SpeedChanged {
                speed: SimSpeed::Paused,
            },
        );
        let text = self.config.endings.text(kind).to_string();
        self.emit(events, ShopEventKind::EndingReached { kind, text });
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Customers that currently exist (waiting, moving, at the counter or
    /// seated).
    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    pub fn at_counter_count(&self) -> usize {
        self.customers
            .values()
            .filter(|c| c.state == CustomerState::AtCounter)
            .count()
    }

    pub fn interaction_prompt(&self, customer_id: CustomerId) -> Option<String> {
        self.customers.get(&customer_id)?.interaction_prompt()
    }

    pub fn customer_by_name(&self, name: &str) -> Option<&Customer> {
        self.customers.values().find(|c| c.name == name)
    }

    /// The contents of the held cup, if a cup is held.
    pub fn held_cup(&self) -> Option<&Cup> {
        self.cups.get(&self.hand.as_ref()?.cup_id()?)
    }

    /// The engine's `timeScale`.
    pub fn time_scale(&self) -> f32 {
        self.speed.time_scale()
    }
}

// Simulation events: the internal scheduling queue and the output stream the
// engine renders.
//
// The shop runs as a discrete event simulation. Customer movement and phone
// steps schedule future events into a priority queue ordered by
// `(tick, sequence)`; `ShopState::step` processes them in order, advancing
// the clock as needed. Empty ticks are free.
//
// This file defines two related but distinct concepts:
// - `ScheduledEvent`: internal events in the priority queue that drive the sim.
// - `ShopEvent`: output for the engine and UI (feedback toasts, sound cues,
//   customer visibility, order board, phone bubbles, endings).
//
// See also: `sim.rs` for the loop that processes scheduled events and emits
// shop events, `phone.rs` for `CancelToken`.
//
// **Critical constraint: determinism.** Event ordering must be identical
// across runs. The `(tick, sequence)` key provides a total order.

use crate::cup::HeldItem;
use crate::display::{Objective, Severity};
use crate::ending::EndingKind;
use crate::phone::{CancelToken, PhoneChoice, PhoneLine};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

// ---------------------------------------------------------------------------
// Internal scheduled events (priority queue)
// ---------------------------------------------------------------------------

/// An event scheduled for future processing by the simulation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduledEvent {
    /// The tick at which this event should fire.
    pub tick: u64,
    /// Unique ordering key for deterministic tiebreaking within a tick.
    /// Lower values are processed first.
    pub sequence: u64,
    /// What should happen when this event fires.
    pub kind: ScheduledEventKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledEventKind {
    /// Scene start: admit the first customer.
    OpenShop,
    /// A moving customer walks one tile and checks for arrival.
    CustomerActivation { customer_id: CustomerId },
    /// The next timed step of a phone sequence.
    PhoneStep { token: CancelToken },
}

// We want a min-heap: lowest (tick, sequence) fires first.
// Rust's BinaryHeap is a max-heap, so we reverse the ordering.
impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.tick == other.tick && self.sequence == other.sequence
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .tick
            .cmp(&self.tick)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Min-heap of scheduled events.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventQueue {
    heap: BinaryHeap<ScheduledEvent>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, tick: u64, kind: ScheduledEventKind) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(ScheduledEvent {
            tick,
            sequence,
            kind,
        });
    }

    pub fn peek_tick(&self) -> Option<u64> {
        self.heap.peek().map(|e| e.tick)
    }

    /// Pop the next event if its tick is <= `up_to_tick`.
    pub fn pop_if_ready(&mut self, up_to_tick: u64) -> Option<ScheduledEvent> {
        if self.heap.peek().is_some_and(|e| e.tick <= up_to_tick) {
            self.heap.pop()
        } else {
            None
        }
    }

    /// Push every pending event `by` ticks into the future, keeping their
    /// relative order. Used while the sim is paused.
    pub fn postpone_all(&mut self, by: u64) {
        if by == 0 {
            return;
        }
        let events = std::mem::take(&mut self.heap).into_vec();
        self.heap = events
            .into_iter()
            .map(|mut e| {
                e.tick += by;
                e
            })
            .collect();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Output events
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShopEvent {
    pub tick: u64,
    pub kind: ShopEventKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ShopEventKind {
    /// A toast for the player.
    Feedback { message: String, severity: Severity },
    Sound { cue: SoundCue },
    ItemPickedUp { item: HeldItem },
    ItemDropped { item: HeldItem },
    CupFilled { cup_id: CupId, drink: DrinkType },
    ItemDisposed { item: HeldItem },
    /// The held cup was handed over at the register.
    ItemDelivered {
        cup_id: CupId,
        customer_id: CustomerId,
    },
    /// A waiting customer appeared at the door and is heading in.
    CustomerCalled { customer_id: CustomerId, name: String },
    /// A customer reached the counter and is bound to the register.
    CustomerArrived { customer_id: CustomerId },
    /// A served customer left the counter.
    CustomerLeft {
        customer_id: CustomerId,
        customers_served: u32,
    },
    CustomerSeated { customer_id: CustomerId, seat: ShopCoord },
    /// The customer walked out the door and no longer exists.
    CustomerDeparted { customer_id: CustomerId },
    /// The register was cleared without completing the order.
    RegisterReleased { customer_id: CustomerId },
    OrderShown {
        customer_id: CustomerId,
        text: String,
        remaining: u32,
    },
    OrderCleared,
    TaskChanged { objective: Objective, text: String },
    DialogueStarted { customer_id: CustomerId, node: String },
    PhoneNotification { sender: String, cue: SoundCue },
    PhoneMessageShown { sender: String, text: String },
    PhoneReply { line: PhoneLine },
    PhoneClosed { choice: PhoneChoice },
    MilestoneReached {
        threshold: u32,
        customers_served: u32,
    },
    /// Nobody is left to serve.
    ShiftExhausted { customers_served: u32 },
    EndingReached { kind: EndingKind, text: String },
    SpeedChanged { speed: SimSpeed },
}

// night_brew_sim: pure Rust simulation of the Night Brew coffee-shop shift.
//
// This crate contains the order-fulfillment and customer-queue logic: cups
// and drink machines, the register, customers and their queue, the phone
// branches at service milestones, and the endings. It has no engine
// dependencies and can be tested, benchmarked, and run headless.
//
// Module overview:
// - `sim.rs`:        Top-level ShopState, tick loop, command/event processing.
// - `command.rs`:    ShopCommand / ShopAction, all sim mutations.
// - `event.rs`:      EventQueue (priority queue) + output ShopEvents.
// - `config.rs`:     GameConfig: layout, timings, machines, roster, milestones.
// - `cup.rs`:        Cup, HeldItem, the drink → cup compatibility table.
// - `dispenser.rs`:  DrinkMachine and the pour validation chain.
// - `trash.rs`:      Disposal station.
// - `register.rs`:   Register binding and delivery validation, MatchPolicy.
// - `customer.rs`:   Customer lifecycle state machine and Order.
// - `nav.rs`:        Tile-stepping NavAgent for customer movement.
// - `queue.rs`:      CustomerQueue, admission control and milestones.
// - `phone.rs`:      PhoneManager, timed AirDrop/text branch sequences.
// - `display.rs`:    Order board, task board, feedback severity.
// - `ending.rs`:     Good/bad endings.
// - `roster.rs`:     CustomerSpec and scripted/random shift rosters.
// - `autoplay.rs`:   Scripted barista that plays a shift headless.
// - `prng`:          Re-exported from `night_brew_prng`: xoshiro256++ PRNG with SplitMix64 seeding.
// - `types.rs`:      ShopCoord, entity IDs, drink/cup enums, sound cues.
//
// The engine drives the sim through `ShopState::step` and renders the
// returned `ShopEvent`s. Logging goes through the `log` facade; binaries
// choose the logger.
//
// **Critical constraint: determinism.** The simulation is a pure function:
// `(state, commands) -> (new_state, events)`. All randomness comes from a
// seeded xoshiro256++ PRNG. No `HashMap`, no system time, no OS entropy.
// Use `BTreeMap` for ordered collections.

pub mod autoplay;
pub mod command;
pub mod config;
pub mod cup;
pub mod customer;
pub mod dispenser;
pub mod display;
pub mod ending;
pub mod event;
pub mod nav;
pub mod phone;
pub use night_brew_prng as prng;
pub mod queue;
pub mod register;
pub mod roster;
pub mod sim;
pub mod trash;
pub mod types;

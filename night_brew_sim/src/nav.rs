// Navigation agent for customers.
//
// The engine owns real pathfinding and animation; the sim models a customer's
// movement as a walk across the shop's tile grid, one tile per movement
// activation (see `sim.rs`, `process_customer_activation`). Steps go along
// the x axis first, then z, so a walk is fully determined by its endpoints.
//
// `has_arrived` is the arrival predicate: a destination is set and the
// remaining Manhattan distance is within `stopping_distance`. The sim
// evaluates it in exactly one place, after each step.
//
// See also: `customer.rs` (owns one `NavAgent` per customer), `config.rs` for
// the walk/run tile timings.

use crate::config::GameConfig;
use crate::types::{MoveSpeed, ShopCoord};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavAgent {
    pub position: ShopCoord,
    destination: Option<ShopCoord>,
    speed: MoveSpeed,
    stopping_distance: u32,
}

impl NavAgent {
    pub fn new(position: ShopCoord, stopping_distance: u32) -> Self {
        Self {
            position,
            destination: None,
            speed: MoveSpeed::Walk,
            stopping_distance,
        }
    }

    /// Jump to `position` and forget any destination.
    pub fn teleport(&mut self, position: ShopCoord) {
        self.position = position;
        self.destination = None;
    }

    pub fn set_destination(&mut self, destination: ShopCoord, speed: MoveSpeed) {
        self.destination = Some(destination);
        self.speed = speed;
    }

    pub fn stop(&mut self) {
        self.destination = None;
    }

    pub fn destination(&self) -> Option<ShopCoord> {
        self.destination
    }

    pub fn speed(&self) -> MoveSpeed {
        self.speed
    }

    /// Tiles left to the destination, or 0 without one.
    pub fn remaining_distance(&self) -> u32 {
        self.destination
            .map_or(0, |dest| self.position.manhattan_distance(dest))
    }

    pub fn has_arrived(&self) -> bool {
        self.destination.is_some() && self.remaining_distance() <= self.stopping_distance
    }

    pub fn is_moving(&self) -> bool {
        self.destination.is_some() && !self.has_arrived()
    }

    /// Advance one tile toward the destination. Returns false when there is
    /// nowhere to go.
    pub fn step_toward(&mut self) -> bool {
        let Some(dest) = self.destination else {
            return false;
        };
        if self.has_arrived() {
            return false;
        }
        if self.position.x != dest.x {
            self.position.x += (dest.x - self.position.x).signum();
        } else {
            self.position.z += (dest.z - self.position.z).signum();
        }
        true
    }
}

/// Ticks one tile of movement takes at `speed`. Never zero.
pub fn ticks_per_tile(speed: MoveSpeed, config: &GameConfig) -> u64 {
    let ticks = match speed {
        MoveSpeed::Walk => config.walk_ticks_per_tile,
        MoveSpeed::Run => config.run_ticks_per_tile,
    };
    ticks.max(1)
}

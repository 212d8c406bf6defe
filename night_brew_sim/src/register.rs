// The order register at the counter.
//
// The register holds a weak handle to the customer currently being served.
// It is set by the sim when a customer reaches the counter (`assign`) and
// cleared when their order completes or an administrator forces a release.
// These are the only mutation points, which keeps the register and the
// queue head in agreement.
//
// `check_delivery` validates the player's held cup against the assigned
// customer's order and returns either a `Delivery` for the sim to apply or a
// `RegisterRejection` whose `Display` text is the player feedback. A wrong
// drink costs nothing: the cup stays in hand and the customer stays put.
//
// See also: `customer.rs` for `Order`, `queue.rs` for what happens after an
// order completes, `sim.rs` for `use_register`.

use crate::cup::{Cup, HeldItem};
use crate::customer::{Customer, Order};
use crate::display::Severity;
use crate::types::{CupId, CustomerId, DrinkType};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// How a cup's contents are compared with an order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPolicy {
    /// The drink name, lower-cased, appears anywhere in the lower-cased
    /// order text. Lenient: "Coffee" satisfies "1x Iced Coffee".
    #[default]
    Substring,
    /// The drink equals the order's structured drink type.
    Exact,
}

pub fn drink_matches(contents: DrinkType, order: &Order, policy: MatchPolicy) -> bool {
    if contents == DrinkType::None {
        return false;
    }
    match policy {
        MatchPolicy::Substring => order
            .display_text
            .to_lowercase()
            .contains(&contents.name().to_lowercase()),
        MatchPolicy::Exact => contents == order.drink,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegisterRejection {
    #[error("You need to hold a drink!")]
    NothingHeld,
    #[error("That's not a drink!")]
    NotACup,
    #[error("The cup is empty!")]
    EmptyCup,
    #[error("No customer here")]
    NoCustomer,
    #[error("Wrong Drink! They want {wanted}")]
    WrongDrink { wanted: String },
}

impl RegisterRejection {
    pub fn severity(&self) -> Severity {
        match self {
            RegisterRejection::NoCustomer => Severity::Info,
            _ => Severity::Error,
        }
    }

    pub fn plays_error_sound(&self) -> bool {
        self.severity() == Severity::Error
    }
}

/// A validated hand-over: consume `cup_id`, credit `customer_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub cup_id: CupId,
    pub customer_id: CustomerId,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Register {
    current_customer: Option<CustomerId>,
}

impl Register {
    pub fn current_customer(&self) -> Option<CustomerId> {
        self.current_customer
    }

    /// Bind the customer who just reached the counter.
    pub fn assign(&mut self, customer: CustomerId) {
        if let Some(previous) = self.current_customer.filter(|p| *p != customer) {
            warn!("[REGISTER] Reassigning from {previous} to {customer} without release");
        }
        self.current_customer = Some(customer);
    }

    /// Clear the binding. Returns the customer that was bound.
    pub fn release(&mut self) -> Option<CustomerId> {
        self.current_customer.take()
    }

    /// Validate a hand-over, in order: something held, it is a cup, the cup
    /// is full, a customer is assigned, the drink matches.
    pub fn check_delivery(
        &self,
        held: Option<&HeldItem>,
        cups: &BTreeMap<CupId, Cup>,
        customers: &BTreeMap<CustomerId, Customer>,
        policy: MatchPolicy,
    ) -> Result<Delivery, RegisterRejection> {
        let held = held.ok_or(RegisterRejection::NothingHeld)?;
        let cup = held
            .cup_id()
            .and_then(|id| cups.get(&id))
            .ok_or(RegisterRejection::NotACup)?;
        if cup.is_empty() {
            return Err(RegisterRejection::EmptyCup);
        }
        let customer_id = self.current_customer.ok_or(RegisterRejection::NoCustomer)?;
        let Some(customer) = customers.get(&customer_id) else {
            warn!("[REGISTER] Assigned customer {customer_id} no longer exists");
            return Err(RegisterRejection::NoCustomer);
        };
        if !drink_matches(cup.contents(), &customer.order, policy) {
            return Err(RegisterRejection::WrongDrink {
                wanted: customer.order.display_text.clone(),
            });
        }
        Ok(Delivery {
            cup_id: cup.id,
            customer_id,
        })
    }
}

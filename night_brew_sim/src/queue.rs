// Customer queue: admission control for the single service counter.
//
// The queue is an ordered list of customer IDs. The head is the customer who
// is (or is about to be) at the counter; everyone behind waits off-screen.
// Only the head is ever admitted, and a new admission happens only after the
// head leaves, so at most one customer is ever at the counter.
//
// Each departure bumps `customers_served` and checks the milestones. A
// milestone fires when the served count equals its threshold for the first
// time; firing suspends admission until the narrative branch calls
// `resume`. Fired milestones stay fired even if the count is later adjusted
// downward with `set_customers_served`.
//
// The queue only decides. It returns `Admission` / `LeftOutcome` values and
// the sim carries them out (calling the customer, starting the phone
// sequence, updating the task board).
//
// See also: `sim.rs` (`handle_admission`, `complete_order`), `phone.rs`
// for the branch that eventually calls `resume`.

use crate::types::CustomerId;
use log::{info, warn};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub threshold: u32,
    pub fired: bool,
}

impl Milestone {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            fired: false,
        }
    }
}

/// What the queue wants the sim to do about the counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// Call this customer to the counter.
    Call(CustomerId),
    /// The head was already admitted; nothing to do.
    Busy(CustomerId),
    /// A narrative branch is pending.
    Suspended,
    /// The supply just ran out. Reported once per exhaustion.
    Exhausted,
    /// Empty and already reported exhausted.
    Idle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeftOutcome {
    Admit(Admission),
    /// Milestone at this index fired; admission is suspended.
    Branch { milestone: usize },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CustomerQueue {
    customers: Vec<CustomerId>,
    customers_served: u32,
    milestones: Vec<Milestone>,
    suspended: Option<usize>,
    admitted: Option<CustomerId>,
    exhausted: bool,
}

impl CustomerQueue {
    pub fn new(customers: Vec<CustomerId>, milestones: Vec<Milestone>) -> Self {
        Self {
            customers,
            milestones,
            ..Self::default()
        }
    }

    pub fn head(&self) -> Option<CustomerId> {
        self.customers.first().copied()
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn customers_served(&self) -> u32 {
        self.customers_served
    }

    /// Index of the milestone whose branch is holding admission, if any.
    pub fn pending_milestone(&self) -> Option<usize> {
        self.suspended
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Decide who comes to the counter next.
    pub fn admit_next(&mut self) -> Admission {
        if self.suspended.is_some() {
            return Admission::Suspended;
        }
        match self.head() {
            Some(head) if self.admitted == Some(head) => Admission::Busy(head),
            Some(head) => {
                self.admitted = Some(head);
                Admission::Call(head)
            }
            None if self.exhausted => Admission::Idle,
            None => {
                info!(
                    "[QUEUE] No customers left after serving {}",
                    self.customers_served
                );
                self.exhausted = true;
                Admission::Exhausted
            }
        }
    }

    /// Record that `id` finished and left the counter.
    pub fn customer_left(&mut self, id: CustomerId) -> LeftOutcome {
        self.customers_served += 1;
        match self.customers.iter().position(|c| *c == id) {
            Some(pos) => {
                self.customers.remove(pos);
            }
            None => warn!("[QUEUE] {id} left but was not in the queue"),
        }
        if self.admitted == Some(id) {
            self.admitted = None;
        }

        let served = self.customers_served;
        if let Some(index) = self
            .milestones
            .iter()
            .position(|m| !m.fired && m.threshold == served)
        {
            self.milestones[index].fired = true;
            self.suspended = Some(index);
            info!("[QUEUE] Milestone {index} reached at {served} served; admission suspended");
            return LeftOutcome::Branch { milestone: index };
        }
        LeftOutcome::Admit(self.admit_next())
    }

    /// Lift a milestone suspension and admit.
    pub fn resume(&mut self) -> Admission {
        if self.suspended.take().is_none() {
            warn!("[QUEUE] Resume called while admission was not suspended");
        }
        self.admit_next()
    }

    /// Append a customer. Admits them at once if the queue was empty.
    pub fn add_customer(&mut self, id: CustomerId) -> Option<Admission> {
        let was_empty = self.customers.is_empty();
        self.customers.push(id);
        self.exhausted = false;
        if was_empty && self.suspended.is_none() {
            Some(self.admit_next())
        } else {
            None
        }
    }

    pub fn set_customers_served(&mut self, count: u32) {
        info!(
            "[QUEUE] Served count adjusted {} -> {count}",
            self.customers_served
        );
        self.customers_served = count;
    }
}

// Player-facing projections: the order board, the task board, and feedback
// severity.
//
// These are pure read models. The sim mutates them at the same points where
// it emits the corresponding `ShopEvent`, and nothing in the sim ever reads
// them back to make a decision. Each mutator reports whether anything
// changed so the sim can skip redundant events.
//
// See also: `event.rs` for `OrderShown` / `OrderCleared` / `TaskChanged` /
// `Feedback`, `sim.rs` for the mutation points.

use crate::types::CustomerId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a feedback message is styled on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Success,
    Error,
}

// ---------------------------------------------------------------------------
// Order board
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShownOrder {
    pub customer: CustomerId,
    pub text: String,
    pub remaining: u32,
}

/// The ticket pinned above the register.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OrderBoard {
    current: Option<ShownOrder>,
}

impl OrderBoard {
    pub fn current(&self) -> Option<&ShownOrder> {
        self.current.as_ref()
    }

    pub fn show(&mut self, customer: CustomerId, text: &str, remaining: u32) {
        self.current = Some(ShownOrder {
            customer,
            text: text.to_string(),
            remaining,
        });
    }

    /// Returns false if no order is shown.
    pub fn update_remaining(&mut self, remaining: u32) -> bool {
        match &mut self.current {
            Some(order) if order.remaining != remaining => {
                order.remaining = remaining;
                true
            }
            _ => false,
        }
    }

    /// Returns whether there was anything to clear.
    pub fn clear(&mut self) -> bool {
        self.current.take().is_some()
    }
}

// ---------------------------------------------------------------------------
// Task board
// ---------------------------------------------------------------------------

/// The current objective line in the corner of the HUD.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    #[default]
    None,
    WaitForCustomer,
    TakeOrder { name: String },
    ServeOrder { text: String, remaining: u32 },
    AnswerPhone,
    LeaveShop,
}

impl Objective {
    pub fn text(&self) -> String {
        match self {
            Objective::None => String::new(),
            Objective::WaitForCustomer => "Wait for the next customer".to_string(),
            Objective::TakeOrder { name } => format!("Take {name}'s order"),
            Objective::ServeOrder { text, remaining } => {
                format!("Serve: {text} ({remaining} left)")
            }
            Objective::AnswerPhone => "Check your phone".to_string(),
            Objective::LeaveShop => "Lock up and leave the shop".to_string(),
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TaskBoard {
    objective: Objective,
}

impl TaskBoard {
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Replace the objective. Returns false when it was already current.
    pub fn set(&mut self, objective: Objective) -> bool {
        if self.objective == objective {
            return false;
        }
        self.objective = objective;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prng::GameRng;

    #[test]
    fn order_board_tracks_remaining() {
        let mut rng = GameRng::new(1);
        let customer = CustomerId::new(&mut rng);
        let mut board = OrderBoard::default();
        assert!(!board.update_remaining(1));

        board.show(customer, "2x Latte", 2);
        assert!(board.update_remaining(1));
        assert!(!board.update_remaining(1));
        assert_eq!(board.current().unwrap().remaining, 1);

        assert!(board.clear());
        assert!(!board.clear());
        assert!(board.current().is_none());
    }

    #[test]
    fn task_board_reports_only_changes() {
        let mut board = TaskBoard::default();
        assert!(board.set(Objective::WaitForCustomer));
        assert!(!board.set(Objective::WaitForCustomer));
        assert!(board.set(Objective::TakeOrder {
            name: "Marnie".into()
        }));
        assert_eq!(board.objective().text(), "Take Marnie's order");
    }

    #[test]
    fn serve_objective_shows_remaining() {
        let objective = Objective::ServeOrder {
            text: "2x Latte".into(),
            remaining: 2,
        };
        assert_eq!(objective.to_string(), "Serve: 2x Latte (2 left)");
        assert_eq!(Objective::None.text(), "");
    }
}

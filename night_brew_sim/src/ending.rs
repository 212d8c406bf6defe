// Narrative endings.
//
// Two ways out of a shift: decline the stranger on the phone (bad), or serve
// everyone and lock up (good). Reaching either pauses the sim. The tracker
// only records the first ending; later attempts are ignored.

use log::{info, warn};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndingKind {
    Good,
    Bad,
}

/// Closing card text for each ending.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndingTexts {
    pub good: String,
    pub bad: String,
}

impl Default for EndingTexts {
    fn default() -> Self {
        Self {
            good: "You locked up and walked home. The street was quiet.".to_string(),
            bad: "The lights went out.".to_string(),
        }
    }
}

impl EndingTexts {
    pub fn text(&self, kind: EndingKind) -> &str {
        match kind {
            EndingKind::Good => &self.good,
            EndingKind::Bad => &self.bad,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EndingTracker {
    reached: Option<EndingKind>,
}

impl EndingTracker {
    pub fn reached(&self) -> Option<EndingKind> {
        self.reached
    }

    pub fn is_over(&self) -> bool {
        self.reached.is_some()
    }

    /// Record `kind` if no ending has been reached yet.
    pub fn reach(&mut self, kind: EndingKind) -> bool {
        if let Some(existing) = self.reached {
            warn!("[ENDING] Ignoring {kind:?}; already reached {existing:?}");
            return false;
        }
        info!("[ENDING] {kind:?} ending reached");
        self.reached = Some(kind);
        true
    }
}

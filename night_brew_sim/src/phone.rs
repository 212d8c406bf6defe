// The player's phone: timed narrative branches.
//
// When a milestone fires, the sim hands the `PhoneManager` a mode (an AirDrop
// request or a text message), a reply script and a pair of continuations.
// The manager then runs a small step-sequence state machine:
//
//   Notifying ──delay──▶ AwaitingChoice ──choose──▶ Replying (one line per
//   delay) ──▶ Closing ──delay──▶ closed, yielding one continuation
//
// Timed steps are not run by the manager itself. Each transition that needs a
// delay returns it, and the sim schedules a `PhoneStep { token }` event. The
// `CancelToken` is a generation counter: receiving a new message bumps it,
// so steps scheduled for a replaced sequence find a stale token and do
// nothing. A replaced sequence's continuations are dropped with it.
//
// Continuations are taken out of the sequence when it closes, so each
// sequence yields exactly one (`on_accept` or `on_decline`), and never twice.
//
// See also: `sim.rs` (`start_phone_branch`, `process_phone_step`),
// `config.rs` for `MilestoneConfig` and `PhoneTiming`.

use crate::types::SoundCue;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Script data
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhoneMode {
    AirDrop { sender: String, photo: String },
    Text { contact: String, message: String },
}

impl PhoneMode {
    pub fn sender(&self) -> &str {
        match self {
            PhoneMode::AirDrop { sender, .. } => sender,
            PhoneMode::Text { contact, .. } => contact,
        }
    }

    /// The text on the lock screen / message bubble.
    pub fn prompt(&self) -> String {
        match self {
            PhoneMode::AirDrop { sender, .. } => {
                format!("\"{sender}\" would like to share a photo.")
            }
            PhoneMode::Text { message, .. } => message.clone(),
        }
    }

    pub fn notification_cue(&self) -> SoundCue {
        match self {
            PhoneMode::AirDrop { .. } => SoundCue::AirDropChime,
            PhoneMode::Text { .. } => SoundCue::PhoneBuzz,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhoneChoice {
    Accept,
    Decline,
}

/// One bubble in the reply exchange.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhoneLine {
    Player(String),
    Contact(String),
    /// An image attachment, by asset name.
    Photo(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneScript {
    #[serde(default)]
    pub accept_lines: SmallVec<[PhoneLine; 4]>,
    #[serde(default)]
    pub decline_lines: SmallVec<[PhoneLine; 4]>,
}

impl PhoneScript {
    pub fn lines(&self, choice: PhoneChoice) -> &[PhoneLine] {
        match choice {
            PhoneChoice::Accept => &self.accept_lines,
            PhoneChoice::Decline => &self.decline_lines,
        }
    }
}

/// What the sim should do once a sequence closes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Continuation {
    ResumeAdmission,
    BadEnding,
    Nothing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continuations {
    pub on_accept: Continuation,
    pub on_decline: Continuation,
}

impl Continuations {
    fn select(self, choice: PhoneChoice) -> Continuation {
        match choice {
            PhoneChoice::Accept => self.on_accept,
            PhoneChoice::Decline => self.on_decline,
        }
    }
}

/// Delays between phone steps, in ticks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneTiming {
    /// Buzz to message on screen.
    pub notification_delay_ticks: u64,
    /// Between reply bubbles.
    pub line_delay_ticks: u64,
    /// Last bubble to phone put away.
    pub close_delay_ticks: u64,
}

impl Default for PhoneTiming {
    fn default() -> Self {
        Self {
            notification_delay_ticks: 1500,
            line_delay_ticks: 2000,
            close_delay_ticks: 1500,
        }
    }
}

// ---------------------------------------------------------------------------
// Sequence state machine
// ---------------------------------------------------------------------------

/// Generation stamp shared by every scheduled step of one sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CancelToken(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
enum Stage {
    Notifying,
    AwaitingChoice,
    Replying { choice: PhoneChoice, next_line: usize },
    Closing { choice: PhoneChoice },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Sequence {
    token: CancelToken,
    mode: PhoneMode,
    script: PhoneScript,
    continuations: Option<Continuations>,
    stage: Stage,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PhoneError {
    #[error("The phone isn't waiting for an answer")]
    NotAwaitingChoice,
}

/// A freshly started sequence. `delay` is when its first step is due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Received {
    pub token: CancelToken,
    pub delay: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PhoneOutput {
    MessageShown { sender: String, text: String },
    Line(PhoneLine),
    Closed {
        choice: PhoneChoice,
        continuation: Continuation,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Advance {
    pub output: PhoneOutput,
    /// Schedule the next step this many ticks out, if any.
    pub next_delay: Option<u64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PhoneManager {
    timing: PhoneTiming,
    generation: u64,
    active: Option<Sequence>,
}

impl PhoneManager {
    pub fn new(timing: PhoneTiming) -> Self {
        Self {
            timing,
            generation: 0,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_awaiting_choice(&self) -> bool {
        matches!(
            self.active,
            Some(Sequence {
                stage: Stage::AwaitingChoice,
                ..
            })
        )
    }

    /// Start a new sequence, cancelling any unfinished one.
    pub fn receive(
        &mut self,
        mode: PhoneMode,
        script: PhoneScript,
        continuations: Continuations,
    ) -> Received {
        if self.active.take().is_some() {
            warn!("[PHONE] New message replaced an unfinished sequence; its continuation is dropped");
        }
        self.generation += 1;
        let token = CancelToken(self.generation);
        info!("[PHONE] Incoming from {}", mode.sender());
        self.active = Some(Sequence {
            token,
            mode,
            script,
            continuations: Some(continuations),
            stage: Stage::Notifying,
        });
        Received {
            token,
            delay: self.timing.notification_delay_ticks,
        }
    }

    /// Answer the message. Returns the token and delay for the first reply
    /// step.
    pub fn choose(&mut self, choice: PhoneChoice) -> Result<(CancelToken, u64), PhoneError> {
        match &mut self.active {
            Some(seq) if seq.stage == Stage::AwaitingChoice => {
                info!("[PHONE] Player chose {choice:?}");
                seq.stage = Stage::Replying {
                    choice,
                    next_line: 0,
                };
                Ok((seq.token, self.timing.line_delay_ticks))
            }
            _ => Err(PhoneError::NotAwaitingChoice),
        }
    }

    /// Run the step scheduled under `token`. Stale tokens and steps with
    /// nothing to do return `None`.
    pub fn advance(&mut self, token: CancelToken) -> Option<Advance> {
        let timing = self.timing.clone();
        let seq = match &mut self.active {
            Some(seq) if seq.token == token => seq,
            _ => {
                debug!("[PHONE] Ignoring stale step {token:?}");
                return None;
            }
        };

        match seq.stage {
            Stage::Notifying => {
                seq.stage = Stage::AwaitingChoice;
                Some(Advance {
                    output: PhoneOutput::MessageShown {
                        sender: seq.mode.sender().to_string(),
                        text: seq.mode.prompt(),
                    },
                    next_delay: None,
                })
            }
            Stage::AwaitingChoice => None,
            Stage::Replying { choice, next_line } => {
                let lines = seq.script.lines(choice);
                match lines.get(next_line) {
                    Some(line) => {
                        let line = line.clone();
                        let last = next_line + 1 >= lines.len();
                        seq.stage = if last {
                            Stage::Closing { choice }
                        } else {
                            Stage::Replying {
                                choice,
                                next_line: next_line + 1,
                            }
                        };
                        let delay = if last {
                            timing.close_delay_ticks
                        } else {
                            timing.line_delay_ticks
                        };
                        Some(Advance {
                            output: PhoneOutput::Line(line),
                            next_delay: Some(delay),
                        })
                    }
                    None => self.close(choice),
                }
            }
            Stage::Closing { choice } => self.close(choice),
        }
    }

    fn close(&mut self, choice: PhoneChoice) -> Option<Advance> {
        let seq = self.active.take()?;
        let continuation = seq
            .continuations
            .map_or(Continuation::Nothing, |c| c.select(choice));
        info!("[PHONE] Closed after {choice:?}, continuing with {continuation:?}");
        Some(Advance {
            output: PhoneOutput::Closed {
                choice,
                continuation,
            },
            next_delay: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn text_mode() -> PhoneMode {
        PhoneMode::Text {
            contact: "Unknown Number".into(),
            message: "can i come in?".into(),
        }
    }

    fn script() -> PhoneScript {
        PhoneScript {
            accept_lines: smallvec![
                PhoneLine::Player("sure".into()),
                PhoneLine::Contact("thank you".into()),
            ],
            decline_lines: smallvec![PhoneLine::Player("no".into())],
        }
    }

    fn continuations() -> Continuations {
        Continuations {
            on_accept: Continuation::ResumeAdmission,
            on_decline: Continuation::BadEnding,
        }
    }

    /// Drive a sequence to the end, collecting every output.
    fn run(phone: &mut PhoneManager, choice: PhoneChoice) -> Vec<PhoneOutput> {
        let received = phone.receive(text_mode(), script(), continuations());
        let mut outputs = Vec::new();
        let shown = phone.advance(received.token).unwrap();
        assert_eq!(shown.next_delay, None);
        outputs.push(shown.output);
        let (token, _) = phone.choose(choice).unwrap();
        while let Some(step) = phone.advance(token) {
            outputs.push(step.output);
            if step.next_delay.is_none() {
                break;
            }
        }
        outputs
    }

    #[test]
    fn accept_plays_script_then_resumes() {
        let mut phone = PhoneManager::new(PhoneTiming::default());
        let outputs = run(&mut phone, PhoneChoice::Accept);
        assert_eq!(
            outputs,
            vec![
                PhoneOutput::MessageShown {
                    sender: "Unknown Number".into(),
                    text: "can i come in?".into(),
                },
                PhoneOutput::Line(PhoneLine::Player("sure".into())),
                PhoneOutput::Line(PhoneLine::Contact("thank you".into())),
                PhoneOutput::Closed {
                    choice: PhoneChoice::Accept,
                    continuation: Continuation::ResumeAdmission,
                },
            ]
        );
        assert!(!phone.is_active());
    }

    #[test]
    fn decline_yields_bad_ending_continuation() {
        let mut phone = PhoneManager::new(PhoneTiming::default());
        let outputs = run(&mut phone, PhoneChoice::Decline);
        assert_eq!(
            outputs.last(),
            Some(&PhoneOutput::Closed {
                choice: PhoneChoice::Decline,
                continuation: Continuation::BadEnding,
            })
        );
    }

    #[test]
    fn continuation_fires_only_once() {
        let mut phone = PhoneManager::new(PhoneTiming::default());
        let received = phone.receive(text_mode(), PhoneScript::default(), continuations());
        phone.advance(received.token);
        let (token, _) = phone.choose(PhoneChoice::Accept).unwrap();
        let closed = phone.advance(token).unwrap();
        assert!(matches!(closed.output, PhoneOutput::Closed { .. }));
        assert_eq!(phone.advance(token), None);
    }

    #[test]
    fn choice_only_while_awaiting() {
        let mut phone = PhoneManager::new(PhoneTiming::default());
        assert_eq!(phone.choose(PhoneChoice::Accept), Err(PhoneError::NotAwaitingChoice));
        let received = phone.receive(text_mode(), script(), continuations());
        assert_eq!(phone.choose(PhoneChoice::Accept), Err(PhoneError::NotAwaitingChoice));
        phone.advance(received.token);
        assert!(phone.is_awaiting_choice());
        assert!(phone.choose(PhoneChoice::Accept).is_ok());
        assert_eq!(phone.choose(PhoneChoice::Decline), Err(PhoneError::NotAwaitingChoice));
    }

    #[test]
    fn replaced_sequence_steps_are_stale() {
        let mut phone = PhoneManager::new(PhoneTiming::default());
        let first = phone.receive(text_mode(), script(), continuations());
        let second = phone.receive(
            PhoneMode::AirDrop {
                sender: "Unknown iPhone".into(),
                photo: "window".into(),
            },
            script(),
            continuations(),
        );
        assert!(phone.is_active());
        assert!(!phone.is_awaiting_choice());
        assert_ne!(first.token, second.token);
        assert_eq!(phone.advance(first.token), None);
        assert!(phone.advance(second.token).is_some());
    }

    #[test]
    fn airdrop_prompt_and_cue() {
        let mode = PhoneMode::AirDrop {
            sender: "Unknown iPhone".into(),
            photo: "window".into(),
        };
        assert_eq!(mode.prompt(), "\"Unknown iPhone\" would like to share a photo.");
        assert_eq!(mode.notification_cue(), SoundCue::AirDropChime);
        assert_eq!(text_mode().notification_cue(), SoundCue::PhoneBuzz);
    }
}

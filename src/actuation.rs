//! Actuation table: outcome → timed motor-command routine.
//!
//! Each routine models one physical dispense: rotate the selector (`MOTOR2`)
//! to a bin, pulse the dispense motor (`MOTOR1`), wait for the pills to
//! fall, rotate the selector back.  Routines differ only in selector angle
//! and settle/fall timing.  This table is the only place bin geometry and
//! physical timing live; the orchestrator never hard-codes either.
//!
//! ```text
//!  Outcome ──lookup──▶ ActuationSequence
//!                      ┌──────────────────────┬─────────┐
//!                      │ command              │ wait    │
//!                      ├──────────────────────┼─────────┤
//!                      │ MOTOR2:90:1500:CW    │  2 s    │
//!                      │ MOTOR1:5:1500        │ 30 s    │
//!                      │ MOTOR2:270:1500:CW   │  2 s    │
//!                      └──────────────────────┴─────────┘
//! ```

use core::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Maximum number of steps in one routine (stack-allocated).
pub const MAX_STEPS: usize = 8;

// ═══════════════════════════════════════════════════════════════
//  Command
// ═══════════════════════════════════════════════════════════════

/// Opaque actuator command, sent verbatim.
///
/// The device grammar (`MOTOR<id>:<magnitude>:<pulse_ms>[:<direction>]`)
/// is owned by the actuator firmware and is not validated here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Command(String);

impl Command {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the command fits on one wire line.
    pub fn is_single_line(&self) -> bool {
        !self.0.contains(['\n', '\r'])
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Command {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Steps and sequences
// ═══════════════════════════════════════════════════════════════

/// One command followed by a blocking wait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuationStep {
    pub command: Command,
    /// Settle/fall time after the command is issued (milliseconds).
    pub wait_ms: u64,
}

impl ActuationStep {
    pub fn new(command: impl Into<String>, wait_ms: u64) -> Self {
        Self {
            command: Command::new(command),
            wait_ms,
        }
    }

    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }
}

/// Ordered routine of steps.  Non-empty once validated.
pub type ActuationSequence = heapless::Vec<ActuationStep, MAX_STEPS>;

/// Build a sequence from `(command, wait_ms)` pairs.
/// Returns `None` if `steps` exceeds [`MAX_STEPS`].
pub fn sequence(steps: &[(&str, u64)]) -> Option<ActuationSequence> {
    let mut seq = ActuationSequence::new();
    for &(command, wait_ms) in steps {
        seq.push(ActuationStep::new(command, wait_ms)).ok()?;
    }
    Some(seq)
}

/// Sum of every step's wait: how long the routine occupies the loop.
pub fn total_wait(seq: &ActuationSequence) -> Duration {
    seq.iter().map(ActuationStep::wait).sum()
}

// ═══════════════════════════════════════════════════════════════
//  Outcome keys
// ═══════════════════════════════════════════════════════════════

/// What a routine is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "label", rename_all = "snake_case")]
pub enum Outcome {
    /// A known medicine, matched case-insensitively.
    Label(String),
    /// Packaging/placement fault.
    Fault,
    /// Nominal (full pills) detection.
    Ok,
}

impl Outcome {
    /// Table-key equality: labels compare case-insensitively.
    pub fn same_key(&self, other: &Outcome) -> bool {
        match (self, other) {
            (Self::Label(a), Self::Label(b)) => a.to_lowercase() == b.to_lowercase(),
            (Self::Fault, Self::Fault) | (Self::Ok, Self::Ok) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(name) => f.write_str(name),
            Self::Fault => f.write_str("fault"),
            Self::Ok => f.write_str("ok"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Table
// ═══════════════════════════════════════════════════════════════

/// One row of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub outcome: Outcome,
    pub steps: ActuationSequence,
}

/// Flat outcome → routine mapping, read-only after startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActuationTable {
    entries: Vec<TableEntry>,
}

/// Selector settle time after every `MOTOR2` move.
const SETTLE_MS: u64 = 2_000;
/// Dispense motor pulse, shared by every routine.
const DISPENSE: &str = "MOTOR1:5:1500";

impl ActuationTable {
    pub fn new(entries: Vec<TableEntry>) -> Self {
        Self { entries }
    }

    /// The routines for the reference four-bin dispenser.
    pub fn reference() -> Self {
        let row = |outcome: Outcome, steps: &[(&str, u64)]| TableEntry {
            outcome,
            // Every reference routine is well under MAX_STEPS.
            steps: sequence(steps).unwrap_or_default(),
        };
        let label = |name: &str| Outcome::Label(name.to_string());

        Self::new(vec![
            row(
                label("rosulip"),
                &[("MOTOR2:0:1500:CW", SETTLE_MS), (DISPENSE, 20_000)],
            ),
            row(
                label("ultrafen"),
                &[
                    ("MOTOR2:90:1500:CW", SETTLE_MS),
                    (DISPENSE, 30_000),
                    ("MOTOR2:270:1500:CW", SETTLE_MS),
                ],
            ),
            row(
                label("clovix"),
                &[
                    ("MOTOR2:180:1500:CW", SETTLE_MS),
                    (DISPENSE, 30_000),
                    ("MOTOR2:180:1500:CW", SETTLE_MS),
                ],
            ),
            row(
                label("naproxan"),
                &[
                    ("MOTOR2:270:1500:CW", SETTLE_MS),
                    (DISPENSE, 30_000),
                    ("MOTOR2:90:1500:CW", SETTLE_MS),
                ],
            ),
            row(
                Outcome::Fault,
                &[
                    ("MOTOR2:90:1500:CW", SETTLE_MS),
                    (DISPENSE, 26_000),
                    ("MOTOR2:270:1500:CW", SETTLE_MS),
                ],
            ),
            row(Outcome::Ok, &[(DISPENSE, 26_000)]),
        ])
    }

    /// Find the routine for `outcome`.
    pub fn lookup(&self, outcome: &Outcome) -> Option<&ActuationSequence> {
        self.entries
            .iter()
            .find(|e| e.outcome.same_key(outcome))
            .map(|e| &e.steps)
    }

    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reject tables the orchestrator cannot execute faithfully.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.steps.is_empty() {
                return Err(ConfigError::ValidationFailed("actuation sequence is empty"));
            }
            if let Outcome::Label(name) = &entry.outcome {
                if name.trim().is_empty() {
                    return Err(ConfigError::ValidationFailed("actuation label is blank"));
                }
            }
            for step in &entry.steps {
                if step.command.as_str().trim().is_empty() {
                    return Err(ConfigError::ValidationFailed("actuation command is blank"));
                }
                if !step.command.is_single_line() {
                    return Err(ConfigError::ValidationFailed(
                        "actuation command contains a line break",
                    ));
                }
            }
            if self.entries[..i]
                .iter()
                .any(|prev| prev.outcome.same_key(&entry.outcome))
            {
                return Err(ConfigError::ValidationFailed("duplicate actuation outcome"));
            }
        }
        Ok(())
    }
}

impl Default for ActuationTable {
    fn default() -> Self {
        Self::reference()
    }
}

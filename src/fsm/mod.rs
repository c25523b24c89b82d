//! Two-state hysteresis machine for the lock signal.
//!
//! ```text
//!                 sample > locked_at
//!        ┌──────────┐ ─────────────▶ ┌──────────┐
//!        │ Unlocked │                │  Locked  │
//!        └──────────┘ ◀───────────── └──────────┘
//!                 sample < unlocked_at
//! ```
//!
//! Samples inside `[unlocked_at, locked_at]` never move the machine.  That
//! dead zone is the only debounce: there are no timers or counters, so a
//! single out-of-band sample flips the state.

use core::fmt;

use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Sample type
// ---------------------------------------------------------------------------

/// One raw ADC magnitude from the Hall sensor (12-bit, 0..=4095).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RawSample(pub u16);

impl RawSample {
    /// Full-scale reading of the 12-bit ADC.
    pub const MAX: u16 = 4095;

    pub const fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for RawSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Physical state of the lock bolt as inferred from the magnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LockState {
    Locked,
    #[default]
    Unlocked,
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "LOCKED"),
            Self::Unlocked => write!(f, "UNLOCKED"),
        }
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Asymmetric switching band.  Invariant: `unlocked_at < locked_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    locked_at: u16,
    unlocked_at: u16,
}

impl Thresholds {
    /// Build a band, rejecting an inverted or zero-width one.
    pub fn new(locked_at: u16, unlocked_at: u16) -> Result<Self, ConfigError> {
        if unlocked_at >= locked_at {
            return Err(ConfigError::Validation(
                "unlocked_at must be strictly below locked_at",
            ));
        }
        Ok(Self {
            locked_at,
            unlocked_at,
        })
    }

    pub fn locked_at(&self) -> u16 {
        self.locked_at
    }

    pub fn unlocked_at(&self) -> u16 {
        self.unlocked_at
    }

    /// Whether `sample` falls inside the dead zone (inclusive on both ends).
    pub fn in_dead_zone(&self, sample: RawSample) -> bool {
        (self.unlocked_at..=self.locked_at).contains(&sample.0)
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Result of one evaluation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub next: LockState,
    pub transitioned: bool,
}

/// A state change, carrying the sample that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub to: LockState,
    pub sample: RawSample,
}

/// Pure transition rule.  Total over every `(sample, current)` pair.
pub fn evaluate(thresholds: &Thresholds, sample: RawSample, current: LockState) -> Evaluation {
    let next = match current {
        LockState::Unlocked if sample.0 > thresholds.locked_at => LockState::Locked,
        LockState::Locked if sample.0 < thresholds.unlocked_at => LockState::Unlocked,
        other => other,
    };
    Evaluation {
        next,
        transitioned: next != current,
    }
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// Owns the single `LockState` instance.
#[derive(Debug, Clone)]
pub struct LockFsm {
    thresholds: Thresholds,
    state: LockState,
    transitions: u32,
}

impl LockFsm {
    /// Start in the default state (`Unlocked`).
    pub fn new(thresholds: Thresholds) -> Self {
        Self::with_initial(thresholds, LockState::default())
    }

    pub fn with_initial(thresholds: Thresholds, state: LockState) -> Self {
        Self {
            thresholds,
            state,
            transitions: 0,
        }
    }

    /// Feed one sample.  Returns `Some` only when the state flipped.
    pub fn step(&mut self, sample: RawSample) -> Option<Transition> {
        let eval = evaluate(&self.thresholds, sample, self.state);
        self.state = eval.next;
        if !eval.transitioned {
            return None;
        }
        self.transitions = self.transitions.saturating_add(1);
        Some(Transition {
            to: eval.next,
            sample,
        })
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Number of transitions since boot.
    pub fn transition_count(&self) -> u32 {
        self.transitions
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

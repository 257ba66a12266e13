//! Status lifecycles
//!
//! Appointment and consultation statuses only move along the edges listed
//! by [`Lifecycle::allowed_transitions`]. Terminal statuses have no edges.

use crate::error::TransitionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A status enum with a fixed transition table
pub trait Lifecycle: Copy + Eq + fmt::Debug + fmt::Display + 'static {
    /// Record kind, used in error messages
    const ENTITY: &'static str;

    /// Every status, in lifecycle order
    const ALL: &'static [Self];

    /// Status every new record starts in
    const INITIAL: Self;

    /// Statuses reachable in one step from `self`
    fn allowed_transitions(self) -> &'static [Self];

    /// Whether `self -> to` is an edge
    #[inline]
    fn can_transition_to(self, to: Self) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// Whether no further transition is defined
    #[inline]
    fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

/// Validates a status transition.
pub fn validate_transition<S: Lifecycle>(from: S, to: S) -> Result<(), TransitionError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(TransitionError::Illegal {
            entity: S::ENTITY,
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

/// Partial update carrying only a new status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange<S> {
    /// Requested status
    pub status: S,
}

impl<S: Lifecycle> StatusChange<S> {
    /// Build a status change after checking it against the lifecycle
    pub fn checked(from: S, to: S) -> Result<Self, TransitionError> {
        validate_transition(from, to)?;
        Ok(Self { status: to })
    }
}

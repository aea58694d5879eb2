// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Domain errors.
//!
//! These are the recoverable failures: the caller shows a message and rolls
//! back the pending change.  Broken invariants (arithmetic overflow, unsorted
//! internal state) panic instead, and absent data is reported with `None`.

use crate::category::CategoryId;
use crate::era::EraId;
use crate::event::EventId;
use crate::instant::Instant;
use thiserror::Error;

/// Result type alias for operations that can violate a domain rule.
pub type DomainResult<T> = std::result::Result<T, DomainError>;

/// A rejected change to timeline or view data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // ==========================================================================
    // Category rules
    // ==========================================================================
    #[error("A category named '{0}' already exists")]
    DuplicateCategoryName(String),

    #[error("Category {child} cannot have {parent} as parent: the hierarchy would contain a cycle")]
    CategoryCycle { child: CategoryId, parent: CategoryId },

    #[error("Parent category {0} does not exist in this timeline")]
    UnknownParentCategory(CategoryId),

    #[error("Category {0} does not exist in this timeline")]
    UnknownCategory(CategoryId),

    // ==========================================================================
    // Event rules
    // ==========================================================================
    #[error("Event {0} does not exist in this timeline")]
    UnknownEvent(EventId),

    #[error("Event {0} is locked")]
    EventLocked(EventId),

    #[error("Event {0} is not a container")]
    NotAContainer(EventId),

    #[error("Era {0} does not exist in this timeline")]
    UnknownEra(EraId),

    // ==========================================================================
    // Time rules
    // ==========================================================================
    #[error("Invalid period: start {start} is after end {end}")]
    InvalidPeriod { start: Instant, end: Instant },

    #[error("Period {start} to {end} is outside the range of the calendar")]
    PeriodOutOfRange { start: Instant, end: Instant },
}

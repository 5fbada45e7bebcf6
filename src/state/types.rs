//! Extraction state types
//!
//! These types are serialized to JSON and persisted by the host between
//! invocations.

use crate::error::{Error, Result};
use crate::pagination::PaginationCursor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Phases
// ============================================================================

/// Extraction phases, in the order they must complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    SyncUnits,
    Metadata,
    Data,
    Attachments,
}

impl Phase {
    /// All phases in execution order
    pub const ALL: [Phase; 4] = [
        Phase::SyncUnits,
        Phase::Metadata,
        Phase::Data,
        Phase::Attachments,
    ];

    /// Wire name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::SyncUnits => "sync-units",
            Phase::Metadata => "metadata",
            Phase::Data => "data",
            Phase::Attachments => "attachments",
        }
    }

    /// Phases that must be completed before this one
    pub fn predecessors(&self) -> impl Iterator<Item = Phase> + '_ {
        Self::ALL.into_iter().take_while(move |p| p < self)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "sync-units" | "external-sync-units" => Ok(Phase::SyncUnits),
            "metadata" => Ok(Phase::Metadata),
            "data" => Ok(Phase::Data),
            "attachments" => Ok(Phase::Attachments),
            other => Err(Error::invalid_event(format!("unknown phase '{other}'"))),
        }
    }
}

/// Derived status of one phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    NotStarted,
    InProgress,
    Completed,
    Errored,
}

// ============================================================================
// Phase State
// ============================================================================

/// Progress of one phase
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhaseState {
    /// Phase finished successfully
    pub completed: bool,

    /// Next page to fetch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<PaginationCursor>,

    /// Position in the phase's work list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_index: Option<usize>,

    /// Message of the error that stopped the phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PhaseState {
    /// Create a fresh phase state
    pub fn new() -> Self {
        Self::default()
    }

    /// Status derived from the stored fields
    pub fn status(&self) -> PhaseStatus {
        if self.completed {
            PhaseStatus::Completed
        } else if self.error.is_some() {
            PhaseStatus::Errored
        } else if self.cursor.is_some() || self.current_index.is_some() {
            PhaseStatus::InProgress
        } else {
            PhaseStatus::NotStarted
        }
    }

    /// Record resumable progress
    #[must_use]
    pub fn with_progress(mut self, index: usize, cursor: Option<PaginationCursor>) -> Self {
        self.completed = false;
        self.error = None;
        self.current_index = Some(index);
        self.cursor = cursor;
        self
    }

    /// Mark the phase done, dropping progress markers
    pub fn mark_completed(&mut self) {
        *self = Self {
            completed: true,
            ..Self::default()
        };
    }

    /// Mark the phase failed, keeping progress for a later retry
    pub fn mark_errored(&mut self, message: impl Into<String>) {
        self.completed = false;
        self.error = Some(message.into());
    }

    /// Forget all progress
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// Extraction State
// ============================================================================

/// State of one extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionState {
    #[serde(alias = "sync_units", alias = "externalSyncUnits")]
    pub external_sync_units: PhaseState,
    pub metadata: PhaseState,
    pub data: PhaseState,
    pub attachments: PhaseState,
}

impl ExtractionState {
    /// Create a state with every phase not started
    pub fn new() -> Self {
        Self::default()
    }

    /// State of a phase
    pub fn phase(&self, phase: Phase) -> &PhaseState {
        match phase {
            Phase::SyncUnits => &self.external_sync_units,
            Phase::Metadata => &self.metadata,
            Phase::Data => &self.data,
            Phase::Attachments => &self.attachments,
        }
    }

    /// Mutable state of a phase
    pub fn phase_mut(&mut self, phase: Phase) -> &mut PhaseState {
        match phase {
            Phase::SyncUnits => &mut self.external_sync_units,
            Phase::Metadata => &mut self.metadata,
            Phase::Data => &mut self.data,
            Phase::Attachments => &mut self.attachments,
        }
    }

    /// Status of a phase
    pub fn status(&self, phase: Phase) -> PhaseStatus {
        self.phase(phase).status()
    }

    /// First earlier phase that has not completed
    pub fn pending_before(&self, phase: Phase) -> Option<Phase> {
        phase
            .predecessors()
            .find(|p| !self.phase(*p).completed)
    }

    /// Refuse to run `phase` while an earlier phase is incomplete
    pub fn ensure_can_run(&self, phase: Phase) -> Result<()> {
        match self.pending_before(phase) {
            Some(pending) => Err(Error::PhaseOrder {
                requested: phase.to_string(),
                pending: pending.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Next phase that still has work, if any
    pub fn next_phase(&self) -> Option<Phase> {
        Phase::ALL.into_iter().find(|p| !self.phase(*p).completed)
    }

    /// Check whether every phase completed
    pub fn is_finished(&self) -> bool {
        self.next_phase().is_none()
    }
}

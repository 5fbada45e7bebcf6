//! Engine types
//!
//! Inbound events, outbound signals and worker outcomes.

use super::deadline::Deadline;
use crate::error::Error;
use crate::normalize::ExternalSyncUnit;
use crate::state::{ExtractionState, Phase, PhaseState};
use crate::types::{ConnectionContext, JsonValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Inbound
// ============================================================================

/// Event kinds the host sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EventType {
    ExternalSyncUnitsStart,
    MetadataStart,
    DataStart,
    DataContinue,
    AttachmentsStart,
    AttachmentsContinue,
    /// Bare phase name: run the phase from its persisted progress
    Resume(Phase),
}

impl EventType {
    /// Phase this event drives
    pub fn phase(&self) -> Phase {
        match self {
            EventType::ExternalSyncUnitsStart => Phase::SyncUnits,
            EventType::MetadataStart => Phase::Metadata,
            EventType::DataStart | EventType::DataContinue => Phase::Data,
            EventType::AttachmentsStart | EventType::AttachmentsContinue => Phase::Attachments,
            EventType::Resume(phase) => *phase,
        }
    }

    /// Continue events resume stored progress; start events discard it
    pub fn is_continue(&self) -> bool {
        matches!(
            self,
            EventType::DataContinue | EventType::AttachmentsContinue | EventType::Resume(_)
        )
    }

    /// Host name of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ExternalSyncUnitsStart => "EXTRACTION_EXTERNAL_SYNC_UNITS_START",
            EventType::MetadataStart => "EXTRACTION_METADATA_START",
            EventType::DataStart => "EXTRACTION_DATA_START",
            EventType::DataContinue => "EXTRACTION_DATA_CONTINUE",
            EventType::AttachmentsStart => "EXTRACTION_ATTACHMENTS_START",
            EventType::AttachmentsContinue => "EXTRACTION_ATTACHMENTS_CONTINUE",
            EventType::Resume(phase) => phase.as_str(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts phase names (`data`), host names (`EXTRACTION_DATA_START`) and
/// enum names (`ExtractionDataStart`). A phase name resumes the phase.
impl FromStr for EventType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "syncunits" | "externalsyncunits" => Ok(EventType::Resume(Phase::SyncUnits)),
            "metadata" => Ok(EventType::Resume(Phase::Metadata)),
            "data" => Ok(EventType::Resume(Phase::Data)),
            "attachments" => Ok(EventType::Resume(Phase::Attachments)),
            "extractionexternalsyncunitsstart" => Ok(EventType::ExternalSyncUnitsStart),
            "extractionmetadatastart" => Ok(EventType::MetadataStart),
            "extractiondatastart" => Ok(EventType::DataStart),
            "extractiondatacontinue" => Ok(EventType::DataContinue),
            "extractionattachmentsstart" => Ok(EventType::AttachmentsStart),
            "extractionattachmentscontinue" => Ok(EventType::AttachmentsContinue),
            _ => Err(Error::invalid_event(format!("unknown event type '{s}'"))),
        }
    }
}

impl TryFrom<String> for EventType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        value.as_str().to_string()
    }
}

/// One invocation request from the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Phase to run
    #[serde(alias = "phase")]
    pub event_type: EventType,

    /// State persisted by the previous invocation
    #[serde(default, alias = "resume_state", alias = "resumeState")]
    pub state: ExtractionState,

    /// Wall-clock budget; absent means unbounded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,

    /// Token and organization
    #[serde(
        alias = "connection_data",
        alias = "connection_context",
        alias = "connectionContext"
    )]
    pub connection: ConnectionContext,

    /// Groupings chosen after the sync-units phase
    #[serde(default, alias = "selected_groupings", alias = "selectedGroupings")]
    pub external_sync_units: Vec<ExternalSyncUnit>,
}

impl InboundEvent {
    /// Create an event with fresh state and no deadline
    pub fn new(event_type: EventType, connection: ConnectionContext) -> Self {
        Self {
            event_type,
            state: ExtractionState::new(),
            deadline: None,
            connection,
            external_sync_units: Vec::new(),
        }
    }

    /// Resume from a persisted state
    #[must_use]
    pub fn with_state(mut self, state: ExtractionState) -> Self {
        self.state = state;
        self
    }

    /// Set the deadline
    #[must_use]
    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the selected groupings
    #[must_use]
    pub fn with_sync_units(mut self, units: Vec<ExternalSyncUnit>) -> Self {
        self.external_sync_units = units;
        self
    }

    /// Deadline as a cancellation signal
    pub fn deadline(&self) -> Deadline {
        Deadline::from(self.deadline)
    }
}

// ============================================================================
// Worker Outcomes
// ============================================================================

/// What a finished phase produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoneReport {
    /// Valid groupings
    SyncUnits(Vec<ExternalSyncUnit>),
    /// Metadata pushed, with the number of discovered custom fields
    Metadata { custom_fields: usize },
    /// Items pushed per bucket
    Data { issues: usize, users: usize },
    /// Attachments pushed
    Attachments { count: usize },
}

impl DoneReport {
    /// Report for a phase that had nothing left to do
    pub fn empty(phase: Phase) -> Self {
        match phase {
            Phase::SyncUnits => DoneReport::SyncUnits(Vec::new()),
            Phase::Metadata => DoneReport::Metadata { custom_fields: 0 },
            Phase::Data => DoneReport::Data {
                issues: 0,
                users: 0,
            },
            Phase::Attachments => DoneReport::Attachments { count: 0 },
        }
    }

    fn event_data(&self) -> JsonValue {
        match self {
            DoneReport::SyncUnits(units) => json!({ "items": units }),
            DoneReport::Metadata { .. } => json!({}),
            DoneReport::Data { issues, users } => json!({ "issues": issues, "users": users }),
            DoneReport::Attachments { count } => json!({ "count": count }),
        }
    }
}

/// Result of one worker invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// Phase finished
    Done(DoneReport),
    /// Deadline reached; resume from this state
    Progress(PhaseState),
    /// Phase failed
    Error(String),
}

// ============================================================================
// Outbound
// ============================================================================

/// Outcome class of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Done,
    Progress,
    Error,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutcomeKind::Done => "DONE",
            OutcomeKind::Progress => "PROGRESS",
            OutcomeKind::Error => "ERROR",
        })
    }
}

/// Signal kinds sent back to the host: one per phase and outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ExtractorEventType {
    ExternalSyncUnitsDone,
    ExternalSyncUnitsProgress,
    ExternalSyncUnitsError,
    MetadataDone,
    MetadataProgress,
    MetadataError,
    DataDone,
    DataProgress,
    DataError,
    AttachmentsDone,
    AttachmentsProgress,
    AttachmentsError,
}

impl ExtractorEventType {
    const ALL: [ExtractorEventType; 12] = [
        ExtractorEventType::ExternalSyncUnitsDone,
        ExtractorEventType::ExternalSyncUnitsProgress,
        ExtractorEventType::ExternalSyncUnitsError,
        ExtractorEventType::MetadataDone,
        ExtractorEventType::MetadataProgress,
        ExtractorEventType::MetadataError,
        ExtractorEventType::DataDone,
        ExtractorEventType::DataProgress,
        ExtractorEventType::DataError,
        ExtractorEventType::AttachmentsDone,
        ExtractorEventType::AttachmentsProgress,
        ExtractorEventType::AttachmentsError,
    ];

    /// Signal kind for a phase and outcome
    pub fn new(phase: Phase, outcome: OutcomeKind) -> Self {
        use ExtractorEventType as E;
        match (phase, outcome) {
            (Phase::SyncUnits, OutcomeKind::Done) => E::ExternalSyncUnitsDone,
            (Phase::SyncUnits, OutcomeKind::Progress) => E::ExternalSyncUnitsProgress,
            (Phase::SyncUnits, OutcomeKind::Error) => E::ExternalSyncUnitsError,
            (Phase::Metadata, OutcomeKind::Done) => E::MetadataDone,
            (Phase::Metadata, OutcomeKind::Progress) => E::MetadataProgress,
            (Phase::Metadata, OutcomeKind::Error) => E::MetadataError,
            (Phase::Data, OutcomeKind::Done) => E::DataDone,
            (Phase::Data, OutcomeKind::Progress) => E::DataProgress,
            (Phase::Data, OutcomeKind::Error) => E::DataError,
            (Phase::Attachments, OutcomeKind::Done) => E::AttachmentsDone,
            (Phase::Attachments, OutcomeKind::Progress) => E::AttachmentsProgress,
            (Phase::Attachments, OutcomeKind::Error) => E::AttachmentsError,
        }
    }

    /// Phase the signal reports on
    pub fn phase(&self) -> Phase {
        use ExtractorEventType as E;
        match self {
            E::ExternalSyncUnitsDone | E::ExternalSyncUnitsProgress | E::ExternalSyncUnitsError => {
                Phase::SyncUnits
            }
            E::MetadataDone | E::MetadataProgress | E::MetadataError => Phase::Metadata,
            E::DataDone | E::DataProgress | E::DataError => Phase::Data,
            E::AttachmentsDone | E::AttachmentsProgress | E::AttachmentsError => {
                Phase::Attachments
            }
        }
    }

    /// Outcome the signal reports
    pub fn outcome(&self) -> OutcomeKind {
        use ExtractorEventType as E;
        match self {
            E::ExternalSyncUnitsDone | E::MetadataDone | E::DataDone | E::AttachmentsDone => {
                OutcomeKind::Done
            }
            E::ExternalSyncUnitsProgress
            | E::MetadataProgress
            | E::DataProgress
            | E::AttachmentsProgress => OutcomeKind::Progress,
            E::ExternalSyncUnitsError | E::MetadataError | E::DataError | E::AttachmentsError => {
                OutcomeKind::Error
            }
        }
    }

    /// Host name, e.g. `EXTRACTION_DATA_PROGRESS`
    pub fn as_string(&self) -> String {
        let phase = match self.phase() {
            Phase::SyncUnits => "EXTERNAL_SYNC_UNITS",
            Phase::Metadata => "METADATA",
            Phase::Data => "DATA",
            Phase::Attachments => "ATTACHMENTS",
        };
        format!("EXTRACTION_{phase}_{}", self.outcome())
    }
}

impl fmt::Display for ExtractorEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl FromStr for ExtractorEventType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_string() == s)
            .ok_or_else(|| Error::invalid_event(format!("unknown signal type '{s}'")))
    }
}

impl TryFrom<String> for ExtractorEventType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExtractorEventType> for String {
    fn from(value: ExtractorEventType) -> Self {
        value.as_string()
    }
}

/// The single signal emitted per invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub event_type: ExtractorEventType,
    pub event_data: JsonValue,
    /// State the host must persist for the next invocation
    pub state: ExtractionState,
}

impl Signal {
    /// Build the signal for a worker outcome
    pub fn from_outcome(phase: Phase, outcome: &WorkerOutcome, state: ExtractionState) -> Self {
        match outcome {
            WorkerOutcome::Done(report) => Self {
                event_type: ExtractorEventType::new(phase, OutcomeKind::Done),
                event_data: report.event_data(),
                state,
            },
            WorkerOutcome::Progress(_) => Self {
                event_type: ExtractorEventType::new(phase, OutcomeKind::Progress),
                event_data: json!({}),
                state,
            },
            WorkerOutcome::Error(message) => Self::error(phase, message, state),
        }
    }

    /// Error signal with `{error: {message}}`
    pub fn error(phase: Phase, message: impl Into<String>, state: ExtractionState) -> Self {
        Self {
            event_type: ExtractorEventType::new(phase, OutcomeKind::Error),
            event_data: json!({ "error": { "message": message.into() } }),
            state,
        }
    }

    /// Message of an error signal
    pub fn error_message(&self) -> Option<&str> {
        self.event_data
            .get("error")?
            .get("message")?
            .as_str()
    }

    /// Check whether this signal reports a finished phase
    pub fn is_done(&self) -> bool {
        self.event_type.outcome() == OutcomeKind::Done
    }
}

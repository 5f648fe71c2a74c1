//! Merge run phases
//!
//! INIT → RESOLVING_INPUTS → PROCESSING_PRIMARY → PROCESSING_DEPENDENCIES
//! → FLUSHING → DONE, with FAILED reachable from every non-terminal phase.

use serde::{Deserialize, Serialize};

/// Phase of a merge run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergePhase {
    /// Validating configuration and locations
    #[default]
    Init,
    /// Asking the resolver for dependency archives
    ResolvingInputs,
    /// Walking the primary artifact
    ProcessingPrimary,
    /// Walking dependency archives in resolved order
    ProcessingDependencies,
    /// Writing merged resources and closing outputs
    Flushing,
    /// Finished successfully
    Done,
    /// Aborted by a fatal error
    Failed,
}

impl MergePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MergePhase::Done | MergePhase::Failed)
    }

    /// Check if transition from this phase to target is valid
    pub fn can_transition_to(&self, target: MergePhase) -> bool {
        match (self, target) {
            (from, MergePhase::Failed) => !from.is_terminal(),
            (MergePhase::Init, MergePhase::ResolvingInputs) => true,
            (MergePhase::ResolvingInputs, MergePhase::ProcessingPrimary) => true,
            (MergePhase::ProcessingPrimary, MergePhase::ProcessingDependencies) => true,
            (MergePhase::ProcessingDependencies, MergePhase::Flushing) => true,
            (MergePhase::Flushing, MergePhase::Done) => true,
            _ => false,
        }
    }
}

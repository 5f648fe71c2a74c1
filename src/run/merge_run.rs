//! Mutable state of one merge invocation.

use std::collections::HashSet;

use classpath_classifier::ResourcePath;

use super::{Diagnostics, MergePhase};
use crate::archive::MergedArchive;
use crate::error::MergeError;
use crate::lineset::LineSetMerger;
use crate::properties::PropertiesMerger;
use crate::tracker::OriginTracker;

/// Accumulators, seen set and output sink shared by every archive walk.
///
/// Created fresh per invocation and owned by the orchestrator; nothing in it
/// outlives the run.
#[derive(Default)]
pub struct MergeRun {
    pub(crate) phase: MergePhase,
    pub(crate) origins: OriginTracker,
    pub(crate) properties: PropertiesMerger,
    pub(crate) line_sets: LineSetMerger,
    pub(crate) seen: HashSet<ResourcePath>,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) archive: Option<MergedArchive>,
}

impl MergeRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> MergePhase {
        self.phase
    }

    /// Move to `next`, rejecting transitions the phase machine does not allow
    pub fn transition(&mut self, next: MergePhase) -> Result<(), MergeError> {
        if !self.phase.can_transition_to(next) {
            return Err(MergeError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }

    /// Enter FAILED and drop the output sink, removing any partial jar.
    pub fn fail(&mut self) {
        if self.phase.can_transition_to(MergePhase::Failed) {
            self.phase = MergePhase::Failed;
        }
        self.archive = None;
    }

    pub fn origins(&self) -> &OriginTracker {
        &self.origins
    }

    pub fn properties(&self) -> &PropertiesMerger {
        &self.properties
    }

    pub fn line_sets(&self) -> &LineSetMerger {
        &self.line_sets
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Properties and line-set resources accumulated so far
    pub fn merged_resource_count(&self) -> usize {
        self.properties.len() + self.line_sets.len()
    }
}

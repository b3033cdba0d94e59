//! Executes resolved operations against the camp data service.
//!
//! One operation, one write, awaited. Failures are logged with their cause
//! and reported to the operator as a generic message; nothing is rolled back
//! locally. Every executed operation asks for a full snapshot refresh so the
//! board converges on the service's state whether the write landed or not.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::models::{Assignment, AssignmentCreate, Bunk};

use super::resolver::Operation;

/// Operator-facing message for a failed camper or counselor assignment
pub const ASSIGNMENT_FAILED: &str = "Failed to update assignment.";

/// Operator-facing message for a failed counselor removal
pub const REMOVE_COUNSELOR_FAILED: &str = "Failed to remove counselor.";

/// Write side of the camp data service.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn create_assignment(&self, body: &AssignmentCreate) -> Result<Assignment>;

    async fn delete_assignment(&self, assignment_id: &str) -> Result<()>;

    async fn move_assignment(&self, assignment_id: &str, new_bunk_id: &str) -> Result<Assignment>;

    /// `None` clears the bunk's counselor
    async fn set_bunk_counselor(&self, bunk_id: &str, counselor_user_id: Option<&str>) -> Result<Bunk>;
}

#[async_trait]
impl<S: AssignmentStore + ?Sized> AssignmentStore for Arc<S> {
    async fn create_assignment(&self, body: &AssignmentCreate) -> Result<Assignment> {
        (**self).create_assignment(body).await
    }

    async fn delete_assignment(&self, assignment_id: &str) -> Result<()> {
        (**self).delete_assignment(assignment_id).await
    }

    async fn move_assignment(&self, assignment_id: &str, new_bunk_id: &str) -> Result<Assignment> {
        (**self).move_assignment(assignment_id, new_bunk_id).await
    }

    async fn set_bunk_counselor(&self, bunk_id: &str, counselor_user_id: Option<&str>) -> Result<Bunk> {
        (**self).set_bunk_counselor(bunk_id, counselor_user_id).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A notification for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// What happened to one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub operation: Operation,
    pub notice: Notice,
    /// The snapshot should be re-fetched from the service
    pub refresh: bool,
}

/// Runs operations for one event against a store.
#[derive(Clone)]
pub struct MutationPipeline<S> {
    store: S,
    event_id: String,
}

impl<S: AssignmentStore> MutationPipeline<S> {
    pub fn new(store: S, event_id: impl Into<String>) -> Self {
        Self {
            store,
            event_id: event_id.into(),
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    /// Execute one operation. `NoOp` returns `None` without touching the store.
    pub async fn execute(&self, operation: Operation) -> Option<MutationOutcome> {
        if operation.is_noop() {
            return None;
        }

        let result = self.write(&operation).await;
        let notice = match result {
            Ok(()) => {
                info!(op = operation.kind(), detail = %operation, "Mutation succeeded");
                Notice::success(Self::success_message(&operation))
            }
            Err(e) => {
                warn!(op = operation.kind(), detail = %operation, error = %e, "Mutation failed");
                Notice::error(Self::failure_message(&operation))
            }
        };

        Some(MutationOutcome {
            operation,
            notice,
            refresh: true,
        })
    }

    async fn write(&self, operation: &Operation) -> Result<()> {
        match operation {
            Operation::NoOp => Ok(()),
            Operation::Assign {
                camper_id, bunk_id, ..
            } => {
                let body = AssignmentCreate {
                    bunk_id: bunk_id.clone(),
                    camper_id: camper_id.clone(),
                    event_id: self.event_id.clone(),
                };
                self.store.create_assignment(&body).await.map(|_| ())
            }
            Operation::Unassign { assignment_id, .. } => {
                self.store.delete_assignment(assignment_id).await
            }
            Operation::Move {
                assignment_id,
                to_bunk_id,
                ..
            } => self
                .store
                .move_assignment(assignment_id, to_bunk_id)
                .await
                .map(|_| ()),
            Operation::AssignCounselor {
                counselor_id,
                bunk_id,
                ..
            } => self
                .store
                .set_bunk_counselor(bunk_id, Some(counselor_id.as_str()))
                .await
                .map(|_| ()),
            Operation::RemoveCounselor { bunk_id, .. } => self
                .store
                .set_bunk_counselor(bunk_id, None)
                .await
                .map(|_| ()),
        }
    }

    fn success_message(operation: &Operation) -> String {
        match operation {
            Operation::NoOp => String::new(),
            Operation::Assign { camper_name, .. } => format!("{} assigned to bunk.", camper_name),
            Operation::Unassign { camper_name, .. } => format!("{} removed from bunk.", camper_name),
            Operation::Move { camper_name, .. } => format!("{} moved to new bunk.", camper_name),
            Operation::AssignCounselor { counselor_name, .. } => {
                format!("{} assigned to bunk.", counselor_name)
            }
            Operation::RemoveCounselor { counselor_name, .. } => {
                format!("{} removed from bunk.", counselor_name)
            }
        }
    }

    fn failure_message(operation: &Operation) -> &'static str {
        match operation {
            Operation::RemoveCounselor { .. } => REMOVE_COUNSELOR_FAILED,
            _ => ASSIGNMENT_FAILED,
        }
    }
}

use serde::{Deserialize, Serialize};

use super::Camper;

/// "This camper occupies this bunk for this event."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Assignment {
    pub id: String,
    pub camper_id: String,
    pub bunk_id: String,
    pub event_id: String,
    /// Camper record joined in by the service for display
    #[serde(default)]
    pub camper: Option<Camper>,
}

impl Assignment {
    pub fn camper_name(&self) -> String {
        self.camper
            .as_ref()
            .map(|c| c.full_name())
            .unwrap_or_else(|| self.camper_id.clone())
    }
}

// ===== Request bodies =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentCreate {
    pub bunk_id: String,
    pub camper_id: String,
    pub event_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentMove {
    pub bunk_id: String,
}

/// `counselor_user_id: null` clears the bunk's counselor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BunkCounselorUpdate {
    pub counselor_user_id: Option<String>,
}

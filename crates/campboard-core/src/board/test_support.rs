//! Fixtures shared by the board tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::models::{Assignment, AssignmentCreate, BoardSnapshot, Bunk, Cabin, Camper, Counselor};

use super::mutation::AssignmentStore;
use super::zone::{Rect, ZoneId};

pub const POOL_AT: (u16, u16) = (5, 5);
pub const B1_AT: (u16, u16) = (15, 5);
pub const B2_AT: (u16, u16) = (25, 5);
pub const B4_AT: (u16, u16) = (35, 5);
pub const B9_AT: (u16, u16) = (45, 5);
pub const OUTSIDE: (u16, u16) = (200, 200);

/// Pool, B1, B2, B4, B9, counselor pool: 10x10 cells each, left to right
pub fn standard_zones() -> Vec<(ZoneId, Rect)> {
    vec![
        (ZoneId::Pool, Rect::new(0, 0, 10, 10)),
        (ZoneId::Bunk("B1".to_string()), Rect::new(10, 0, 10, 10)),
        (ZoneId::Bunk("B2".to_string()), Rect::new(20, 0, 10, 10)),
        (ZoneId::Bunk("B4".to_string()), Rect::new(30, 0, 10, 10)),
        (ZoneId::Bunk("B9".to_string()), Rect::new(40, 0, 10, 10)),
        (ZoneId::CounselorPool, Rect::new(50, 0, 10, 10)),
    ]
}

pub fn camper(id: &str) -> Camper {
    Camper {
        id: id.to_string(),
        first_name: "Camper".to_string(),
        last_name: id.to_string(),
        age: Some(11),
        gender: None,
    }
}

pub fn counselor(id: &str) -> Counselor {
    Counselor {
        id: id.to_string(),
        name: format!("Counselor {}", id),
        avatar_url: None,
    }
}

pub fn cabin(id: &str) -> Cabin {
    Cabin {
        id: id.to_string(),
        name: format!("Cabin {}", id),
        description: None,
        location: None,
        capacity: 0,
    }
}

pub fn bunk_in(id: &str, cabin_id: Option<&str>, capacity: u32) -> Bunk {
    Bunk {
        id: id.to_string(),
        name: format!("Bunk {}", id),
        capacity,
        gender: None,
        min_age: None,
        max_age: None,
        cabin_id: cabin_id.map(str::to_string),
        counselor_id: None,
    }
}

pub fn assignment(id: &str, camper_id: &str, bunk_id: &str) -> Assignment {
    Assignment {
        id: id.to_string(),
        camper_id: camper_id.to_string(),
        bunk_id: bunk_id.to_string(),
        event_id: "e1".to_string(),
        camper: Some(camper(camper_id)),
    }
}

/// Event `e1`: cabin C1 holds B1 (led by k1) and B2; B4 and B9 have no cabin.
/// c7 and c9 sit in B1, c42 and c50 wait in the pool, k3 is free.
pub fn sample_snapshot() -> BoardSnapshot {
    let mut b1 = bunk_in("B1", Some("C1"), 10);
    b1.counselor_id = Some("k1".to_string());

    BoardSnapshot {
        event_id: "e1".to_string(),
        bunks: vec![
            b1,
            bunk_in("B2", Some("C1"), 4),
            bunk_in("B4", None, 6),
            bunk_in("B9", None, 2),
        ],
        cabins: vec![cabin("C1")],
        assignments: vec![assignment("a7", "c7", "B1"), assignment("a9", "c9", "B1")],
        unassigned_campers: vec![camper("c42"), camper("c50")],
        counselors: vec![counselor("k1"), counselor("k3")],
    }
}

/// A write recorded by [`FakeStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Create {
        bunk_id: String,
        camper_id: String,
        event_id: String,
    },
    Delete {
        assignment_id: String,
    },
    Move {
        assignment_id: String,
        new_bunk_id: String,
    },
    SetCounselor {
        bunk_id: String,
        counselor_user_id: Option<String>,
    },
}

/// In-memory stand-in for the camp data service. Applies writes to its own
/// snapshot the way the service would, including the one-assignment-per-camper
/// constraint.
pub struct FakeStore {
    state: Mutex<BoardSnapshot>,
    calls: Mutex<Vec<StoreCall>>,
    next_id: Mutex<u32>,
    fail: bool,
}

impl FakeStore {
    pub fn new(snapshot: BoardSnapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
            calls: Mutex::new(Vec::new()),
            next_id: Mutex::new(100),
            fail: false,
        }
    }

    /// Every write is recorded and then rejected
    pub fn failing(snapshot: BoardSnapshot) -> Self {
        Self {
            fail: true,
            ..Self::new(snapshot)
        }
    }

    pub async fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().await.clone()
    }

    pub async fn snapshot(&self) -> BoardSnapshot {
        self.state.lock().await.clone()
    }

    async fn record(&self, call: StoreCall) -> Result<()> {
        self.calls.lock().await.push(call);
        if self.fail {
            Err(anyhow!("service unavailable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AssignmentStore for FakeStore {
    async fn create_assignment(&self, body: &AssignmentCreate) -> Result<Assignment> {
        self.record(StoreCall::Create {
            bunk_id: body.bunk_id.clone(),
            camper_id: body.camper_id.clone(),
            event_id: body.event_id.clone(),
        })
        .await?;

        let mut state = self.state.lock().await;
        if state.assignments.iter().any(|a| a.camper_id == body.camper_id) {
            return Err(anyhow!("camper {} already assigned", body.camper_id));
        }
        let pos = state
            .unassigned_campers
            .iter()
            .position(|c| c.id == body.camper_id)
            .ok_or_else(|| anyhow!("camper {} not found", body.camper_id))?;
        let camper = state.unassigned_campers.remove(pos);

        let mut next_id = self.next_id.lock().await;
        *next_id += 1;
        let created = Assignment {
            id: format!("a{}", *next_id),
            camper_id: camper.id.clone(),
            bunk_id: body.bunk_id.clone(),
            event_id: body.event_id.clone(),
            camper: Some(camper),
        };
        state.assignments.push(created.clone());
        Ok(created)
    }

    async fn delete_assignment(&self, assignment_id: &str) -> Result<()> {
        self.record(StoreCall::Delete {
            assignment_id: assignment_id.to_string(),
        })
        .await?;

        let mut state = self.state.lock().await;
        let pos = state
            .assignments
            .iter()
            .position(|a| a.id == assignment_id)
            .ok_or_else(|| anyhow!("assignment {} not found", assignment_id))?;
        let removed = state.assignments.remove(pos);
        let camper = removed.camper.unwrap_or_else(|| camper(&removed.camper_id));
        state.unassigned_campers.push(camper);
        Ok(())
    }

    async fn move_assignment(&self, assignment_id: &str, new_bunk_id: &str) -> Result<Assignment> {
        self.record(StoreCall::Move {
            assignment_id: assignment_id.to_string(),
            new_bunk_id: new_bunk_id.to_string(),
        })
        .await?;

        let mut state = self.state.lock().await;
        let a = state
            .assignments
            .iter_mut()
            .find(|a| a.id == assignment_id)
            .ok_or_else(|| anyhow!("assignment {} not found", assignment_id))?;
        a.bunk_id = new_bunk_id.to_string();
        Ok(a.clone())
    }

    async fn set_bunk_counselor(&self, bunk_id: &str, counselor_user_id: Option<&str>) -> Result<Bunk> {
        self.record(StoreCall::SetCounselor {
            bunk_id: bunk_id.to_string(),
            counselor_user_id: counselor_user_id.map(str::to_string),
        })
        .await?;

        let mut state = self.state.lock().await;
        let b = state
            .bunks
            .iter_mut()
            .find(|b| b.id == bunk_id)
            .ok_or_else(|| anyhow!("bunk {} not found", bunk_id))?;
        b.counselor_id = counselor_user_id.map(str::to_string);
        Ok(b.clone())
    }
}

//! Cabin grouping and occupancy statistics.
//!
//! Everything here is recomputed from a snapshot; nothing is cached between
//! refreshes.

use std::collections::{HashMap, HashSet};

use crate::models::{Assignment, BoardSnapshot, Bunk, Cabin, Counselor};

/// Percentage at or above which a bunk counts as nearly full
const NEAR_FULL_PERCENT: u32 = 80;

/// Percentage at or above which a bunk counts as full (or over)
const FULL_PERCENT: u32 = 100;

/// Presentation bucket for a bunk's occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityTier {
    Normal,
    NearFull,
    Full,
}

impl CapacityTier {
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage >= FULL_PERCENT {
            CapacityTier::Full
        } else if percentage >= NEAR_FULL_PERCENT {
            CapacityTier::NearFull
        } else {
            CapacityTier::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CapacityTier::Normal => "normal",
            CapacityTier::NearFull => "near-full",
            CapacityTier::Full => "full/over",
        }
    }
}

/// `round(occupancy / capacity * 100)`, or 0 for a bunk with no capacity.
///
/// Halves round away from zero.
pub fn capacity_percentage(occupancy: u32, capacity: u32) -> u32 {
    if capacity == 0 {
        return 0;
    }
    let scaled = occupancy as u64 * 100;
    let cap = capacity as u64;
    ((scaled * 2 + cap) / (cap * 2)) as u32
}

pub fn tier(occupancy: u32, capacity: u32) -> CapacityTier {
    CapacityTier::from_percentage(capacity_percentage(occupancy, capacity))
}

/// One bunk plus its derived statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BunkStats<'a> {
    pub bunk: &'a Bunk,
    pub occupancy: u32,
    pub percentage: u32,
    pub tier: CapacityTier,
}

impl<'a> BunkStats<'a> {
    fn new(bunk: &'a Bunk, occupancy: u32) -> Self {
        let percentage = capacity_percentage(occupancy, bunk.capacity);
        Self {
            bunk,
            occupancy,
            percentage,
            tier: CapacityTier::from_percentage(percentage),
        }
    }

    pub fn is_over_capacity(&self) -> bool {
        self.occupancy > self.bunk.capacity
    }
}

/// A display group: one cabin's bunks, or the synthetic "no cabin" group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CabinGroup<'a> {
    /// `None` for the "no cabin" group
    pub cabin: Option<&'a Cabin>,
    pub bunks: Vec<BunkStats<'a>>,
}

impl<'a> CabinGroup<'a> {
    pub fn title(&self) -> &str {
        self.cabin.map(|c| c.name.as_str()).unwrap_or("No cabin")
    }

    pub fn occupancy(&self) -> u32 {
        self.bunks.iter().map(|b| b.occupancy).sum()
    }

    pub fn capacity(&self) -> u32 {
        self.bunks.iter().map(|b| b.bunk.capacity).sum()
    }
}

/// Active assignment count per bunk id
pub fn occupancy_by_bunk(assignments: &[Assignment]) -> HashMap<&str, u32> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for a in assignments {
        *counts.entry(a.bunk_id.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Group bunks under their cabins, in the cabin list's order.
///
/// Bunks without a cabin, or whose cabin is not in `cabins`, land in a final
/// "no cabin" group that only exists when it has members. Cabins with no
/// bunks still get an (empty) group so they stay visible as drop context.
pub fn group_bunks<'a>(
    bunks: &'a [Bunk],
    cabins: &'a [Cabin],
    assignments: &[Assignment],
) -> Vec<CabinGroup<'a>> {
    let counts = occupancy_by_bunk(assignments);
    let stats = |bunk: &'a Bunk| BunkStats::new(bunk, counts.get(bunk.id.as_str()).copied().unwrap_or(0));

    let known: HashSet<&str> = cabins.iter().map(|c| c.id.as_str()).collect();

    let mut groups: Vec<CabinGroup<'a>> = cabins
        .iter()
        .map(|cabin| CabinGroup {
            cabin: Some(cabin),
            bunks: bunks
                .iter()
                .filter(|b| b.cabin_id.as_deref() == Some(cabin.id.as_str()))
                .map(stats)
                .collect(),
        })
        .collect();

    let orphans: Vec<BunkStats<'a>> = bunks
        .iter()
        .filter(|b| match b.cabin_id.as_deref() {
            Some(id) => !known.contains(id),
            None => true,
        })
        .map(stats)
        .collect();

    if !orphans.is_empty() {
        groups.push(CabinGroup {
            cabin: None,
            bunks: orphans,
        });
    }

    groups
}

/// Counselors no bunk references
pub fn unassigned_counselors<'a>(counselors: &'a [Counselor], bunks: &[Bunk]) -> Vec<&'a Counselor> {
    let taken: HashSet<&str> = bunks
        .iter()
        .filter_map(|b| b.counselor_id.as_deref())
        .collect();
    counselors
        .iter()
        .filter(|k| !taken.contains(k.id.as_str()))
        .collect()
}

/// Convenience wrapper over a snapshot
pub fn snapshot_groups(snapshot: &BoardSnapshot) -> Vec<CabinGroup<'_>> {
    group_bunks(&snapshot.bunks, &snapshot.cabins, &snapshot.assignments)
}

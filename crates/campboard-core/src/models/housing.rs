use serde::{Deserialize, Serialize};

/// A physical building that groups zero or more bunks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Cabin {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Stated capacity of the whole building. Display only.
    #[serde(default)]
    pub capacity: u32,
}

/// A sleeping group campers are assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Bunk {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub min_age: Option<u32>,
    #[serde(default)]
    pub max_age: Option<u32>,
    #[serde(default)]
    pub cabin_id: Option<String>,
    /// User id of the counselor in charge, if any
    #[serde(default, rename = "counselor_user_id")]
    pub counselor_id: Option<String>,
}

impl Bunk {
    /// Human-readable restriction summary, e.g. "Girls 10-12"
    pub fn restriction_display(&self) -> Option<String> {
        let gender = self.gender.as_deref().map(|g| match g.to_lowercase().as_str() {
            "female" | "f" | "girls" => "Girls".to_string(),
            "male" | "m" | "boys" => "Boys".to_string(),
            other => other.to_string(),
        });

        let ages = match (self.min_age, self.max_age) {
            (Some(lo), Some(hi)) => Some(format!("{}-{}", lo, hi)),
            (Some(lo), None) => Some(format!("{}+", lo)),
            (None, Some(hi)) => Some(format!("≤{}", hi)),
            (None, None) => None,
        };

        match (gender, ages) {
            (Some(g), Some(a)) => Some(format!("{} {}", g, a)),
            (Some(g), None) => Some(g),
            (None, Some(a)) => Some(a),
            (None, None) => None,
        }
    }
}

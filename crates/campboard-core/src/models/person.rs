use serde::{Deserialize, Serialize};

/// A camper registered for the event. Read-only from the board's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Camper {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
}

impl Camper {
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => self.id.clone(),
        }
    }

    /// Short attribute line for cards, e.g. "12 · F"
    pub fn attributes_display(&self) -> String {
        let age = self.age.map(|a| a.to_string());
        let gender = self
            .gender
            .as_deref()
            .and_then(|g| g.chars().next())
            .map(|c| c.to_ascii_uppercase().to_string());

        match (age, gender) {
            (Some(a), Some(g)) => format!("{} · {}", a, g),
            (Some(a), None) => a,
            (None, Some(g)) => g,
            (None, None) => String::new(),
        }
    }
}

/// A staff member who can be put in charge of a bunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Counselor {
    /// User id of the staff account; bunks reference counselors by this id.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Counselor {
    /// Initials used where there is no room for the full name
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camper(first: &str, last: &str) -> Camper {
        Camper {
            id: "c1".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            age: Some(11),
            gender: Some("female".to_string()),
        }
    }

    #[test]
    fn test_camper_full_name() {
        assert_eq!(camper("Ada", "Lovelace").full_name(), "Ada Lovelace");
        assert_eq!(camper("Ada", "").full_name(), "Ada");
        assert_eq!(camper("", "Lovelace").full_name(), "Lovelace");
        assert_eq!(camper("", "").full_name(), "c1"); // Falls back to id
    }

    #[test]
    fn test_camper_attributes_display() {
        let mut c = camper("Ada", "Lovelace");
        assert_eq!(c.attributes_display(), "11 · F");
        c.gender = None;
        assert_eq!(c.attributes_display(), "11");
        c.age = None;
        assert_eq!(c.attributes_display(), "");
    }

    #[test]
    fn test_counselor_initials() {
        let k = Counselor {
            id: "k1".to_string(),
            name: "jane q public".to_string(),
            avatar_url: None,
        };
        assert_eq!(k.initials(), "JQ");
    }
}

//! Read models for users and groups.
//!
//! [`NameDirectory`] resolves user ids to display names for one request. It
//! is built from the ids the request needs and dropped with it; nothing is
//! cached across requests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Group, GroupMember, MoneyCents, Participant};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameDirectory {
    names: HashMap<i64, String>,
}

impl NameDirectory {
    pub fn new(names: HashMap<i64, String>) -> Self {
        Self { names }
    }

    /// Display name for `id`, `User {id}` when the user is unknown.
    pub fn name(&self, id: i64) -> String {
        self.names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("User {id}"))
    }

    pub fn participant(&self, id: i64) -> Participant {
        Participant {
            id,
            name: self.name(id),
        }
    }
}

impl FromIterator<(i64, String)> for NameDirectory {
    fn from_iter<T: IntoIterator<Item = (i64, String)>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDetail {
    pub group: Group,
    pub members: Vec<GroupMember>,
}

/// Totals of a user's unsettled ledger entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_you_owe: MoneyCents,
    pub total_owed_to_you: MoneyCents,
    pub active_groups: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ids_fall_back_to_generic_label() {
        let names: NameDirectory = [(1, "Alice".to_string())].into_iter().collect();
        assert_eq!(names.name(1), "Alice");
        assert_eq!(names.name(2), "User 2");
        assert_eq!(names.participant(2).name, "User 2");
    }
}

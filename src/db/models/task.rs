use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Free-form status text. Well-known values are "Open", "In Progress"
    /// and "Done"; anything else sorts last (see [`status_rank`]).
    pub status: String,
    /// Lower value = more urgent. No enforced bounds.
    pub priority: i64,
    /// Free-text label, not a user reference.
    pub assignee: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Ordering rank for task statuses: Open < In Progress < Done < anything else.
pub fn status_rank(status: &str) -> u8 {
    match status {
        "Open" => 1,
        "In Progress" => 2,
        "Done" => 3,
        _ => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_rank_known_values() {
        assert_eq!(status_rank("Open"), 1);
        assert_eq!(status_rank("In Progress"), 2);
        assert_eq!(status_rank("Done"), 3);
    }

    #[test]
    fn status_rank_unknown_values_sort_last() {
        assert_eq!(status_rank("Blocked"), 4);
        assert_eq!(status_rank(""), 4);
        // Rank lookup is case-sensitive, matching the stored text exactly
        assert_eq!(status_rank("open"), 4);
    }
}

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Task Share Models
// ============================================================================

/// A single grant row. Multiple rows may exist for the same
/// (task, grantee) pair; effective capabilities are the OR of all rows.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TaskShare {
    pub id: String,
    pub task_id: String,
    pub grantee_user_id: String,
    pub can_edit_status: bool,
    pub can_edit_assignee: bool,
    pub created_at: NaiveDateTime,
}

/// The merged capability set a grantee holds on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveGrant {
    pub can_edit_status: bool,
    pub can_edit_assignee: bool,
}

impl EffectiveGrant {
    /// OR-merge a set of grant rows into one effective capability set.
    /// Returns `None` when no rows exist, i.e. the user is not a grantee.
    pub fn merge<'a, I>(shares: I) -> Option<EffectiveGrant>
    where
        I: IntoIterator<Item = &'a TaskShare>,
    {
        let mut merged: Option<EffectiveGrant> = None;
        for share in shares {
            let g = merged.get_or_insert(EffectiveGrant {
                can_edit_status: false,
                can_edit_assignee: false,
            });
            g.can_edit_status |= share.can_edit_status;
            g.can_edit_assignee |= share.can_edit_assignee;
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share(can_edit_status: bool, can_edit_assignee: bool) -> TaskShare {
        TaskShare {
            id: uuid::Uuid::new_v4().to_string(),
            task_id: "task".to_string(),
            grantee_user_id: "grantee".to_string(),
            can_edit_status,
            can_edit_assignee,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn merge_of_nothing_is_none() {
        assert_eq!(EffectiveGrant::merge(&Vec::<TaskShare>::new()), None);
    }

    #[test]
    fn merge_single_row_passes_flags_through() {
        let rows = vec![share(true, false)];
        assert_eq!(
            EffectiveGrant::merge(&rows),
            Some(EffectiveGrant {
                can_edit_status: true,
                can_edit_assignee: false,
            })
        );
    }

    #[test]
    fn merge_ors_complementary_rows() {
        // {status:true,assignee:false} + {status:false,assignee:true}
        // must yield {status:true, assignee:true}
        let rows = vec![share(true, false), share(false, true)];
        assert_eq!(
            EffectiveGrant::merge(&rows),
            Some(EffectiveGrant {
                can_edit_status: true,
                can_edit_assignee: true,
            })
        );
    }

    #[test]
    fn merge_of_empty_grants_is_still_a_grant() {
        // A share with no edit rights still makes the task visible
        let rows = vec![share(false, false)];
        assert_eq!(
            EffectiveGrant::merge(&rows),
            Some(EffectiveGrant {
                can_edit_status: false,
                can_edit_assignee: false,
            })
        );
    }
}

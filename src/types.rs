//! Core types for the staff performance server.

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a stored or submitted string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Declares an enum persisted as its display string (e.g. "In Progress").
macro_rules! stored_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Every variant, in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ParseEnumError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: ParseEnumError| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

stored_enum! {
    /// Determines visibility and mutation rights across the hierarchy.
    Role ("role") {
        Admin => "Admin",
        Supervisor => "Supervisor",
        Staff => "Staff",
    }
}

impl Role {
    /// Roles that may be named as another user's supervisor and may review.
    pub fn is_reviewer(&self) -> bool {
        matches!(self, Role::Admin | Role::Supervisor)
    }
}

stored_enum! {
    /// Recurrence of an activity.
    ActivityCategory ("activity category") {
        Daily => "Daily",
        Weekly => "Weekly",
        Monthly => "Monthly",
        Quarterly => "Quarterly",
        Biannually => "Biannually",
        Annually => "Annually",
    }
}

stored_enum! {
    TaskPriority ("task priority") {
        Low => "Low",
        Medium => "Medium",
        High => "High",
        Urgent => "Urgent",
    }
}

stored_enum! {
    TaskStatus ("task status") {
        Pending => "Pending",
        InProgress => "In Progress",
        Completed => "Completed",
        OnHold => "On Hold",
    }
}

stored_enum! {
    /// Where a task came from.
    TaskType ("task type") {
        Personal => "Personal",
        ServiceRequest => "Service Request",
        StaffAssignment => "Staff Assignment",
        Response => "Response",
    }
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub supervisor_id: Option<i64>,
    pub department: String,
    pub position: String,
    pub created_at: i64,
}

/// Profile fields shared by user creation and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub supervisor_id: Option<i64>,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
}

/// A performance objective. `performance` is derived on every read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Objective {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: i64,
    pub performance: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectiveFields {
    pub title: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedOutcome {
    pub id: i64,
    pub objective_id: i64,
    pub title: String,
    pub description: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutcomeFields {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub expected_outcome_id: i64,
    pub title: String,
    pub description: String,
    pub category: ActivityCategory,
    pub progress_percentage: f64,
    pub implementation_level: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityFields {
    pub title: String,
    pub description: String,
    pub category: ActivityCategory,
    pub progress_percentage: f64,
    pub implementation_level: String,
}

/// A discrete unit of work, optionally linked to an expected outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub expected_outcome_id: Option<i64>,
    pub assigned_to: Option<i64>,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub task_type: TaskType,
    pub requested_by: String,
    pub due_date: Option<NaiveDate>,
    pub completion_percentage: f64,
    pub created_at: i64,
    pub completed_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskFields {
    pub expected_outcome_id: Option<i64>,
    pub assigned_to: Option<i64>,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub task_type: TaskType,
    pub requested_by: String,
    pub due_date: Option<NaiveDate>,
    pub completion_percentage: f64,
}

/// Completion timestamp after moving from `current` to `next`.
///
/// `completed_at` is set exactly when the status becomes Completed and cleared
/// when it leaves Completed; staying Completed keeps the original timestamp.
pub fn completed_at_after(
    current: Option<(TaskStatus, Option<i64>)>,
    next: TaskStatus,
    now: i64,
) -> Option<i64> {
    match (current, next) {
        (Some((TaskStatus::Completed, Some(at))), TaskStatus::Completed) => Some(at),
        (_, TaskStatus::Completed) => Some(now),
        _ => None,
    }
}

impl Task {
    /// Apply new field values, keeping `completed_at` in sync with the status.
    pub fn apply(&mut self, fields: TaskFields, now: i64) {
        self.completed_at =
            completed_at_after(Some((self.status, self.completed_at)), fields.status, now);
        self.completion_percentage = if fields.status == TaskStatus::Completed {
            100.0
        } else {
            fields.completion_percentage
        };
        self.expected_outcome_id = fields.expected_outcome_id;
        self.assigned_to = fields.assigned_to;
        self.title = fields.title;
        self.description = fields.description;
        self.priority = fields.priority;
        self.status = fields.status;
        self.task_type = fields.task_type;
        self.requested_by = fields.requested_by;
        self.due_date = fields.due_date;
    }

    /// This task's share of its objective's performance.
    pub fn contribution(&self) -> f64 {
        crate::performance::task_contribution(self.status, self.completion_percentage)
    }
}

/// What a comment is attached to. Exactly one target, by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CommentTarget {
    Objective(i64),
    Activity(i64),
}

impl CommentTarget {
    /// Build from the two nullable persisted columns.
    /// Returns `None` unless exactly one is set.
    pub fn from_columns(objective_id: Option<i64>, activity_id: Option<i64>) -> Option<Self> {
        match (objective_id, activity_id) {
            (Some(id), None) => Some(CommentTarget::Objective(id)),
            (None, Some(id)) => Some(CommentTarget::Activity(id)),
            _ => None,
        }
    }

    /// Split into (objective_id, activity_id) columns.
    pub fn columns(&self) -> (Option<i64>, Option<i64>) {
        match *self {
            CommentTarget::Objective(id) => (Some(id), None),
            CommentTarget::Activity(id) => (None, Some(id)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub target: CommentTarget,
    pub user_id: i64,
    pub comment_text: String,
    pub created_at: i64,
}

/// An expected outcome with everything hanging off it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeTree {
    pub outcome: ExpectedOutcome,
    pub activities: Vec<Activity>,
    pub tasks: Vec<Task>,
}

/// An objective with its outcomes, read in one pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveTree {
    pub objective: Objective,
    pub outcomes: Vec<OutcomeTree>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(status: TaskStatus, completion: f64, completed_at: Option<i64>) -> Task {
        Task {
            id: 1,
            user_id: 1,
            expected_outcome_id: None,
            assigned_to: None,
            title: "t".into(),
            description: String::new(),
            priority: TaskPriority::Medium,
            status,
            task_type: TaskType::Personal,
            requested_by: String::new(),
            due_date: None,
            completion_percentage: completion,
            created_at: 0,
            completed_at,
        }
    }

    fn fields(status: TaskStatus, completion: f64) -> TaskFields {
        TaskFields {
            expected_outcome_id: None,
            assigned_to: None,
            title: "t".into(),
            description: String::new(),
            priority: TaskPriority::Medium,
            status,
            task_type: TaskType::Personal,
            requested_by: String::new(),
            due_date: None,
            completion_percentage: completion,
        }
    }

    #[test]
    fn stored_strings_round_trip() {
        assert_eq!(TaskStatus::InProgress.as_str(), "In Progress");
        assert_eq!("On Hold".parse::<TaskStatus>(), Ok(TaskStatus::OnHold));
        assert_eq!(
            "Service Request".parse::<TaskType>(),
            Ok(TaskType::ServiceRequest)
        );
        assert!("in progress".parse::<TaskStatus>().is_err());
        assert_eq!(ActivityCategory::ALL.len(), 6);
    }

    #[test]
    fn serde_uses_display_strings() {
        let json = serde_json::to_string(&TaskStatus::OnHold).unwrap();
        assert_eq!(json, "\"On Hold\"");
        let role: Role = serde_json::from_str("\"Supervisor\"").unwrap();
        assert_eq!(role, Role::Supervisor);
    }

    #[test]
    fn completing_sets_timestamp_and_full_contribution() {
        let mut t = task(TaskStatus::InProgress, 30.0, None);
        t.apply(fields(TaskStatus::Completed, 30.0), 500);
        assert_eq!(t.completed_at, Some(500));
        assert_eq!(t.contribution(), 100.0);
    }

    #[test]
    fn staying_completed_keeps_original_timestamp() {
        let mut t = task(TaskStatus::Completed, 100.0, Some(10));
        t.apply(fields(TaskStatus::Completed, 100.0), 999);
        assert_eq!(t.completed_at, Some(10));
    }

    #[test]
    fn leaving_completed_clears_timestamp() {
        let mut t = task(TaskStatus::Completed, 100.0, Some(10));
        t.apply(fields(TaskStatus::OnHold, 40.0), 999);
        assert_eq!(t.completed_at, None);
        assert_eq!(t.contribution(), 40.0);
    }

    #[test]
    fn completed_contribution_ignores_stored_percentage() {
        let t = task(TaskStatus::Completed, 30.0, Some(1));
        assert_eq!(t.contribution(), 100.0);
    }

    #[test]
    fn comment_target_requires_exactly_one_column() {
        assert_eq!(
            CommentTarget::from_columns(Some(3), None),
            Some(CommentTarget::Objective(3))
        );
        assert_eq!(
            CommentTarget::from_columns(None, Some(4)),
            Some(CommentTarget::Activity(4))
        );
        assert_eq!(CommentTarget::from_columns(Some(3), Some(4)), None);
        assert_eq!(CommentTarget::from_columns(None, None), None);
        assert_eq!(CommentTarget::Activity(4).columns(), (None, Some(4)));
    }

    #[test]
    fn comment_target_serializes_tagged() {
        let json = serde_json::to_value(CommentTarget::Objective(7)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "objective", "id": 7}));
    }
}

//! Integration tests for the database layer.
//!
//! These tests verify the core database operations using an in-memory SQLite database.
//! Tests are organized by module and functionality.

use chrono::NaiveDate;
use staff_performance::access::{OwnerChain, Resource};
use staff_performance::db::Database;
use staff_performance::error::AppError;
use staff_performance::types::{
    ActivityCategory, ActivityFields, CommentTarget, ObjectiveFields, OutcomeFields, Role,
    TaskFields, TaskPriority, TaskStatus, TaskType, User, UserProfile,
};

/// Helper to create a fresh in-memory database for testing.
fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

fn profile(username: &str, role: Role, supervisor_id: Option<i64>) -> UserProfile {
    UserProfile {
        username: username.to_string(),
        full_name: format!("{} Example", username),
        email: format!("{}@example.org", username),
        role,
        supervisor_id,
        department: "Operations".to_string(),
        position: String::new(),
    }
}

fn make_user(db: &Database, username: &str, role: Role, supervisor_id: Option<i64>) -> User {
    db.create_user(&profile(username, role, supervisor_id), "hash")
        .expect("Failed to create user")
}

fn objective_fields(title: &str) -> ObjectiveFields {
    ObjectiveFields {
        title: title.to_string(),
        ..Default::default()
    }
}

fn outcome_fields(title: &str) -> OutcomeFields {
    OutcomeFields {
        title: title.to_string(),
        description: String::new(),
    }
}

fn activity_fields(title: &str, progress: f64) -> ActivityFields {
    ActivityFields {
        title: title.to_string(),
        description: String::new(),
        category: ActivityCategory::Monthly,
        progress_percentage: progress,
        implementation_level: String::new(),
    }
}

fn task_fields(title: &str, outcome: Option<i64>, status: TaskStatus, completion: f64) -> TaskFields {
    TaskFields {
        expected_outcome_id: outcome,
        assigned_to: None,
        title: title.to_string(),
        description: String::new(),
        priority: TaskPriority::Medium,
        status,
        task_type: TaskType::Personal,
        requested_by: String::new(),
        due_date: None,
        completion_percentage: completion,
    }
}

fn app_error(err: anyhow::Error) -> AppError {
    AppError::from(err)
}

mod user_tests {
    use super::*;

    #[test]
    fn create_and_fetch_user() {
        let db = setup_db();
        let user = make_user(&db, "alice", Role::Staff, None);

        assert!(user.id > 0);
        let fetched = db.get_user(user.id).unwrap().expect("user exists");
        assert_eq!(fetched.username, "alice");
        assert_eq!(fetched.role, Role::Staff);
        assert_eq!(fetched.password_hash, "hash");

        let by_name = db.get_user_by_username("alice").unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        assert!(db.get_user_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_is_a_conflict() {
        let db = setup_db();
        make_user(&db, "alice", Role::Staff, None);

        let err = db
            .create_user(&profile("alice", Role::Admin, None), "other")
            .unwrap_err();
        assert!(matches!(app_error(err), AppError::Conflict(_)));
    }

    #[test]
    fn update_without_hash_keeps_credential() {
        let db = setup_db();
        let user = make_user(&db, "alice", Role::Staff, None);

        let mut changed = profile("alice", Role::Supervisor, None);
        changed.position = "Lead".to_string();
        let updated = db.update_user(user.id, &changed, None).unwrap();
        assert_eq!(updated.role, Role::Supervisor);
        assert_eq!(updated.position, "Lead");
        assert_eq!(updated.password_hash, "hash");

        let updated = db.update_user(user.id, &changed, Some("new-hash")).unwrap();
        assert_eq!(updated.password_hash, "new-hash");
    }

    #[test]
    fn update_and_delete_missing_user_are_not_found() {
        let db = setup_db();
        let err = db
            .update_user(99, &profile("ghost", Role::Staff, None), None)
            .unwrap_err();
        assert!(app_error(err).is_not_found());
        assert!(app_error(db.delete_user(99).unwrap_err()).is_not_found());
    }

    #[test]
    fn list_filters_by_role_and_supervisor() {
        let db = setup_db();
        let boss = make_user(&db, "boss", Role::Supervisor, None);
        make_user(&db, "zed", Role::Staff, Some(boss.id));
        make_user(&db, "amy", Role::Staff, Some(boss.id));
        make_user(&db, "loner", Role::Staff, None);

        let all = db.list_users().unwrap();
        let names: Vec<_> = all.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["amy", "boss", "loner", "zed"]);

        assert_eq!(db.list_users_by_role(Role::Supervisor).unwrap().len(), 1);
        let reports: Vec<_> = db
            .list_users_by_supervisor(boss.id)
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(reports, vec!["amy", "zed"]);
        assert_eq!(db.count_subordinates(boss.id).unwrap(), 2);
        assert_eq!(db.count_users_with_role(Role::Admin).unwrap(), 0);
    }

    #[test]
    fn deleting_supervisor_clears_reference() {
        let db = setup_db();
        let boss = make_user(&db, "boss", Role::Supervisor, None);
        let staff = make_user(&db, "amy", Role::Staff, Some(boss.id));

        db.delete_user(boss.id).unwrap();
        let staff = db.get_user(staff.id).unwrap().unwrap();
        assert_eq!(staff.supervisor_id, None);
    }
}

mod hierarchy_tests {
    use super::*;

    #[test]
    fn objectives_list_newest_first() {
        let db = setup_db();
        let user = make_user(&db, "alice", Role::Staff, None);
        let first = db.create_objective(user.id, &objective_fields("First")).unwrap();
        let second = db.create_objective(user.id, &objective_fields("Second")).unwrap();

        let ids: Vec<_> = db.list_objectives(user.id).unwrap().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn outcomes_and_activities_list_oldest_first() {
        let db = setup_db();
        let user = make_user(&db, "alice", Role::Staff, None);
        let objective = db.create_objective(user.id, &objective_fields("Grow")).unwrap();
        let a = db.create_outcome(objective.id, &outcome_fields("A")).unwrap();
        let b = db.create_outcome(objective.id, &outcome_fields("B")).unwrap();
        let ids: Vec<_> = db.list_outcomes(objective.id).unwrap().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);

        let x = db.create_activity(a.id, &activity_fields("X", 10.0)).unwrap();
        let y = db.create_activity(a.id, &activity_fields("Y", 20.0)).unwrap();
        let ids: Vec<_> = db.list_activities(a.id).unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![x.id, y.id]);
    }

    #[test]
    fn objective_dates_round_trip() {
        let db = setup_db();
        let user = make_user(&db, "alice", Role::Staff, None);
        let fields = ObjectiveFields {
            title: "Dated".to_string(),
            description: String::new(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31),
        };
        let objective = db.create_objective(user.id, &fields).unwrap();
        let fetched = db.get_objective(objective.id).unwrap().unwrap();
        assert_eq!(fetched.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(fetched.end_date, NaiveDate::from_ymd_opt(2024, 12, 31));
    }

    #[test]
    fn tasks_order_by_due_date_with_undated_last() {
        let db = setup_db();
        let user = make_user(&db, "alice", Role::Staff, None);

        let mut late = task_fields("late", None, TaskStatus::Pending, 0.0);
        late.due_date = NaiveDate::from_ymd_opt(2024, 9, 1);
        let mut soon = task_fields("soon", None, TaskStatus::Pending, 0.0);
        soon.due_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        let undated = task_fields("undated", None, TaskStatus::Pending, 0.0);

        db.create_task(user.id, &undated, 1, None).unwrap();
        db.create_task(user.id, &late, 2, None).unwrap();
        db.create_task(user.id, &soon, 3, None).unwrap();
        db.create_task(user.id, &task_fields("undated newer", None, TaskStatus::Pending, 0.0), 4, None)
            .unwrap();

        let titles: Vec<_> = db
            .list_tasks_for_user(user.id)
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["soon", "late", "undated newer", "undated"]);
    }

    #[test]
    fn deleting_outcome_cascades_to_activities_and_linked_tasks() {
        let db = setup_db();
        let user = make_user(&db, "alice", Role::Staff, None);
        let objective = db.create_objective(user.id, &objective_fields("Grow")).unwrap();
        let outcome = db.create_outcome(objective.id, &outcome_fields("A")).unwrap();
        let activity = db.create_activity(outcome.id, &activity_fields("X", 10.0)).unwrap();
        let linked = db
            .create_task(user.id, &task_fields("linked", Some(outcome.id), TaskStatus::Pending, 0.0), 1, None)
            .unwrap();
        let personal = db
            .create_task(user.id, &task_fields("personal", None, TaskStatus::Pending, 0.0), 2, None)
            .unwrap();

        db.delete_outcome(outcome.id).unwrap();

        assert!(db.get_activity(activity.id).unwrap().is_none());
        assert!(db.get_task(linked.id).unwrap().is_none());
        assert!(db.get_task(personal.id).unwrap().is_some());
        assert!(db.get_objective(objective.id).unwrap().is_some());
    }

    #[test]
    fn deleting_user_removes_everything_they_own() {
        let db = setup_db();
        let user = make_user(&db, "alice", Role::Staff, None);
        let objective = db.create_objective(user.id, &objective_fields("Grow")).unwrap();
        let outcome = db.create_outcome(objective.id, &outcome_fields("A")).unwrap();
        let activity = db.create_activity(outcome.id, &activity_fields("X", 10.0)).unwrap();
        let task = db
            .create_task(user.id, &task_fields("t", None, TaskStatus::Pending, 0.0), 1, None)
            .unwrap();

        db.delete_user(user.id).unwrap();

        assert!(db.get_objective(objective.id).unwrap().is_none());
        assert!(db.get_outcome(outcome.id).unwrap().is_none());
        assert!(db.get_activity(activity.id).unwrap().is_none());
        assert!(db.get_task(task.id).unwrap().is_none());
    }

    #[test]
    fn objective_tree_includes_linked_tasks() {
        let db = setup_db();
        let user = make_user(&db, "alice", Role::Staff, None);
        let objective = db.create_objective(user.id, &objective_fields("Grow")).unwrap();
        let outcome = db.create_outcome(objective.id, &outcome_fields("A")).unwrap();
        db.create_activity(outcome.id, &activity_fields("X", 40.0)).unwrap();
        db.create_task(user.id, &task_fields("linked", Some(outcome.id), TaskStatus::Pending, 20.0), 1, None)
            .unwrap();
        db.create_task(user.id, &task_fields("personal", None, TaskStatus::Pending, 0.0), 2, None)
            .unwrap();

        let trees = db.objective_trees(user.id).unwrap();
        assert_eq!(trees.len(), 1);
        let tree = &trees[0];
        assert_eq!(tree.objective.performance, 30.0);
        assert_eq!(tree.outcomes.len(), 1);
        assert_eq!(tree.outcomes[0].activities.len(), 1);
        assert_eq!(tree.outcomes[0].tasks.len(), 1);
        assert_eq!(tree.outcomes[0].tasks[0].title, "linked");
    }

    #[test]
    fn updating_missing_records_is_not_found() {
        let db = setup_db();
        let err = db.update_objective(42, &objective_fields("x")).unwrap_err();
        assert!(app_error(err).is_not_found());
        let err = db.update_outcome(42, &outcome_fields("x")).unwrap_err();
        assert!(app_error(err).is_not_found());
        let err = db.update_activity(42, &activity_fields("x", 1.0)).unwrap_err();
        assert!(app_error(err).is_not_found());
        assert!(app_error(db.delete_task(42).unwrap_err()).is_not_found());
    }

    #[test]
    fn task_counts_treat_anything_not_completed_as_pending() {
        let db = setup_db();
        let user = make_user(&db, "alice", Role::Staff, None);
        db.create_task(user.id, &task_fields("a", None, TaskStatus::Completed, 100.0), 1, Some(1))
            .unwrap();
        db.create_task(user.id, &task_fields("b", None, TaskStatus::OnHold, 10.0), 2, None)
            .unwrap();
        db.create_task(user.id, &task_fields("c", None, TaskStatus::InProgress, 50.0), 3, None)
            .unwrap();

        let counts = db.task_counts(user.id).unwrap();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.pending, 2);

        let other = make_user(&db, "bob", Role::Staff, None);
        let empty = db.task_counts(other.id).unwrap();
        assert_eq!(empty.total, 0);
        assert_eq!(empty.pending, 0);
    }
}

mod comment_tests {
    use super::*;

    #[test]
    fn comments_list_newest_first_per_target() {
        let db = setup_db();
        let boss = make_user(&db, "boss", Role::Supervisor, None);
        let staff = make_user(&db, "amy", Role::Staff, Some(boss.id));
        let objective = db.create_objective(staff.id, &objective_fields("Grow")).unwrap();
        let outcome = db.create_outcome(objective.id, &outcome_fields("A")).unwrap();
        let activity = db.create_activity(outcome.id, &activity_fields("X", 10.0)).unwrap();

        let first = db
            .create_comment(CommentTarget::Objective(objective.id), boss.id, "Good start")
            .unwrap();
        let second = db
            .create_comment(CommentTarget::Objective(objective.id), boss.id, "Keep going")
            .unwrap();
        db.create_comment(CommentTarget::Activity(activity.id), boss.id, "On the activity")
            .unwrap();

        let ids: Vec<_> = db
            .list_comments(CommentTarget::Objective(objective.id))
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);

        let on_activity = db.list_comments(CommentTarget::Activity(activity.id)).unwrap();
        assert_eq!(on_activity.len(), 1);
        assert_eq!(on_activity[0].target, CommentTarget::Activity(activity.id));
    }

    #[test]
    fn store_rejects_comments_with_both_or_neither_target() {
        let db = setup_db();
        let boss = make_user(&db, "boss", Role::Supervisor, None);
        let objective = db.create_objective(boss.id, &objective_fields("Grow")).unwrap();
        let outcome = db.create_outcome(objective.id, &outcome_fields("A")).unwrap();
        let activity = db.create_activity(outcome.id, &activity_fields("X", 10.0)).unwrap();

        let both = db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (objective_id, activity_id, user_id, comment_text, created_at)
                 VALUES (?1, ?2, ?3, 'x', 0)",
                rusqlite::params![objective.id, activity.id, boss.id],
            )?;
            Ok(())
        });
        assert!(both.is_err());

        let neither = db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (objective_id, activity_id, user_id, comment_text, created_at)
                 VALUES (NULL, NULL, ?1, 'x', 0)",
                rusqlite::params![boss.id],
            )?;
            Ok(())
        });
        assert!(neither.is_err());
    }

    #[test]
    fn comments_go_with_their_target() {
        let db = setup_db();
        let boss = make_user(&db, "boss", Role::Supervisor, None);
        let staff = make_user(&db, "amy", Role::Staff, Some(boss.id));
        let objective = db.create_objective(staff.id, &objective_fields("Grow")).unwrap();
        let comment = db
            .create_comment(CommentTarget::Objective(objective.id), boss.id, "Nice")
            .unwrap();

        db.delete_objective(objective.id).unwrap();
        assert!(db.get_comment(comment.id).unwrap().is_none());
    }
}

mod session_tests {
    use super::*;

    #[test]
    fn live_session_resolves_to_user() {
        let db = setup_db();
        let user = make_user(&db, "alice", Role::Staff, None);
        db.create_session("tok", user.id, 1_000, 5_000).unwrap();

        let resolved = db.user_for_session("tok", 2_000).unwrap().unwrap();
        assert_eq!(resolved.id, user.id);
        assert!(db.user_for_session("other", 2_000).unwrap().is_none());
    }

    #[test]
    fn expired_session_does_not_resolve_and_is_purged() {
        let db = setup_db();
        let user = make_user(&db, "alice", Role::Staff, None);
        db.create_session("tok", user.id, 1_000, 5_000).unwrap();

        assert!(db.user_for_session("tok", 5_000).unwrap().is_none());
        assert_eq!(db.purge_expired_sessions(6_000).unwrap(), 1);
    }

    #[test]
    fn logout_and_user_deletion_end_sessions() {
        let db = setup_db();
        let user = make_user(&db, "alice", Role::Staff, None);
        db.create_session("a", user.id, 0, i64::MAX).unwrap();
        db.create_session("b", user.id, 0, i64::MAX).unwrap();

        db.delete_session("a").unwrap();
        assert!(db.user_for_session("a", 1).unwrap().is_none());

        db.delete_user(user.id).unwrap();
        assert!(db.user_for_session("b", 1).unwrap().is_none());
    }
}

mod ownership_tests {
    use super::*;

    #[test]
    fn every_level_resolves_to_the_owning_user() {
        let db = setup_db();
        let boss = make_user(&db, "boss", Role::Supervisor, None);
        let staff = make_user(&db, "amy", Role::Staff, Some(boss.id));
        let objective = db.create_objective(staff.id, &objective_fields("Grow")).unwrap();
        let outcome = db.create_outcome(objective.id, &outcome_fields("A")).unwrap();
        let activity = db.create_activity(outcome.id, &activity_fields("X", 10.0)).unwrap();
        let task = db
            .create_task(staff.id, &task_fields("t", None, TaskStatus::Pending, 0.0), 1, None)
            .unwrap();
        let comment = db
            .create_comment(CommentTarget::Activity(activity.id), boss.id, "Nice")
            .unwrap();

        let expected = OwnerChain {
            owner_id: staff.id,
            owner_supervisor_id: Some(boss.id),
        };
        for resource in [
            Resource::User(staff.id),
            Resource::Objective(objective.id),
            Resource::Outcome(outcome.id),
            Resource::Activity(activity.id),
            Resource::Task(task.id),
            Resource::Comment(comment.id),
        ] {
            assert_eq!(db.owner_chain(resource).unwrap(), Some(expected), "{:?}", resource);
        }
    }

    #[test]
    fn missing_records_have_no_owner() {
        let db = setup_db();
        assert_eq!(db.owner_chain(Resource::Objective(7)).unwrap(), None);
        assert_eq!(db.owner_chain(Resource::Comment(7)).unwrap(), None);
    }
}

mod file_tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reopening_a_file_database_keeps_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("staff.db");

        let id = {
            let db = Database::open(&path).unwrap();
            make_user(&db, "alice", Role::Staff, None).id
        };

        let db = Database::open(&path).unwrap();
        let user = db.get_user(id).unwrap().expect("user survives reopen");
        assert_eq!(user.username, "alice");
    }
}

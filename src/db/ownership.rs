//! Resolves who owns a record, for the authorization gate.

use super::Database;
use crate::access::{OwnerChain, Resource};
use crate::types::CommentTarget;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

fn owner_query(conn: &Connection, sql: &str, id: i64) -> Result<Option<OwnerChain>> {
    let chain = conn
        .query_row(sql, params![id], |row| {
            Ok(OwnerChain {
                owner_id: row.get(0)?,
                owner_supervisor_id: row.get(1)?,
            })
        })
        .optional()?;
    Ok(chain)
}

pub(crate) fn owner_chain_internal(conn: &Connection, resource: Resource) -> Result<Option<OwnerChain>> {
    match resource {
        Resource::User(id) => owner_query(
            conn,
            "SELECT id, supervisor_id FROM users WHERE id = ?1",
            id,
        ),
        Resource::Objective(id) => owner_query(
            conn,
            "SELECT u.id, u.supervisor_id
             FROM objectives o
             INNER JOIN users u ON o.user_id = u.id
             WHERE o.id = ?1",
            id,
        ),
        Resource::Outcome(id) => owner_query(
            conn,
            "SELECT u.id, u.supervisor_id
             FROM expected_outcomes eo
             INNER JOIN objectives o ON eo.objective_id = o.id
             INNER JOIN users u ON o.user_id = u.id
             WHERE eo.id = ?1",
            id,
        ),
        Resource::Activity(id) => owner_query(
            conn,
            "SELECT u.id, u.supervisor_id
             FROM activities a
             INNER JOIN expected_outcomes eo ON a.expected_outcome_id = eo.id
             INNER JOIN objectives o ON eo.objective_id = o.id
             INNER JOIN users u ON o.user_id = u.id
             WHERE a.id = ?1",
            id,
        ),
        Resource::Task(id) => owner_query(
            conn,
            "SELECT u.id, u.supervisor_id
             FROM tasks t
             INNER JOIN users u ON t.user_id = u.id
             WHERE t.id = ?1",
            id,
        ),
        // A comment belongs to whoever owns what it is attached to.
        Resource::Comment(id) => {
            let columns: Option<(Option<i64>, Option<i64>)> = conn
                .query_row(
                    "SELECT objective_id, activity_id FROM comments WHERE id = ?1",
                    params![id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            match columns.and_then(|(o, a)| CommentTarget::from_columns(o, a)) {
                Some(CommentTarget::Objective(oid)) => {
                    owner_chain_internal(conn, Resource::Objective(oid))
                }
                Some(CommentTarget::Activity(aid)) => {
                    owner_chain_internal(conn, Resource::Activity(aid))
                }
                None => Ok(None),
            }
        }
    }
}

impl Database {
    /// Owner chain of a resource, or `None` when the id does not resolve.
    pub fn owner_chain(&self, resource: Resource) -> Result<Option<OwnerChain>> {
        self.with_conn(|conn| owner_chain_internal(conn, resource))
    }
}

//! Supervisor comments.

use super::{gate, require_text};
use crate::access::{Action, Resource};
use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::types::{Comment, CommentTarget, Role, User};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct CommentInput {
    pub target: CommentTarget,
    #[serde(default)]
    pub comment_text: String,
}

fn target_resource(target: CommentTarget) -> Resource {
    match target {
        CommentTarget::Objective(id) => Resource::Objective(id),
        CommentTarget::Activity(id) => Resource::Activity(id),
    }
}

/// Comment on a subordinate's objective or activity. The actor is the author.
pub fn add_comment(db: &Database, actor: &User, input: &CommentInput) -> AppResult<Comment> {
    gate(db, actor, Action::Comment, target_resource(input.target))?;
    let text = require_text("comment_text", &input.comment_text)?;
    let comment = db.create_comment(input.target, actor.id, &text)?;
    info!(
        author = actor.id,
        comment = comment.id,
        target = ?comment.target,
        "Added comment"
    );
    Ok(comment)
}

/// Comments on a target, newest first, for anyone who may read the target.
pub fn list_comments(db: &Database, actor: &User, target: CommentTarget) -> AppResult<Vec<Comment>> {
    gate(db, actor, Action::Read, target_resource(target))?;
    Ok(db.list_comments(target)?)
}

/// Delete a comment. Its author may delete it while still allowed to
/// comment on the target; Admins may delete any comment they could write.
pub fn delete_comment(db: &Database, actor: &User, comment_id: i64) -> AppResult<()> {
    gate(db, actor, Action::Comment, Resource::Comment(comment_id))?;
    let comment = db
        .get_comment(comment_id)?
        .ok_or_else(|| AppError::not_found(format!("comment {}", comment_id)))?;
    if comment.user_id != actor.id && actor.role != Role::Admin {
        return Err(AppError::forbidden("only the author or an admin may delete a comment"));
    }
    db.delete_comment(comment_id)?;
    info!(actor = actor.id, comment = comment_id, "Deleted comment");
    Ok(())
}

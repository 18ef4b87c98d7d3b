use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use cms::{Cms, CmsError};
use domain::{
    CommentDraft, CommentNode, CommentThread, DomainError, EntityId, Relation, ReportDraft, User,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::session::Session;

const LOGIN_TO_COMMENT: &str = "Unauthorized. Please log in to comment.";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCommentRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub relation: String,
    pub parent_id: Option<EntityId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub comment_id: Option<EntityId>,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct ThreadView {
    pub count: usize,
    pub comments: Vec<CommentNode>,
}

fn relation(raw: &str) -> Result<Relation, ApiError> {
    Relation::new(raw).map_err(ApiError::from)
}

/// Posting needs both a cookie and a user the CMS still recognises.
async fn require_user<'a>(
    cms: &Cms,
    session: &'a Session,
) -> Result<(&'a str, User), ApiError> {
    let unauthorized = || ApiError::Unauthorized(LOGIN_TO_COMMENT.into());

    let jwt = session.token().ok_or_else(unauthorized)?;
    match cms.me(jwt).await {
        Ok(user) => Ok((jwt, user)),
        Err(CmsError::Status { status, .. }) => {
            debug!("Commenter token rejected (status {})", status);
            Err(unauthorized())
        }
        Err(e) => Err(ApiError::upstream("An internal server error occurred.", e)),
    }
}

pub async fn list(
    State(cms): State<Cms>,
    Path(raw): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let relation = relation(&raw)?;
    let comments = cms
        .list_comments(&relation)
        .await
        .map_err(|e| ApiError::upstream("Failed to load comments.", e))?;
    Ok(Json(json!({ "data": comments })))
}

/// Same list, already folded into the tree the page renders.
pub async fn thread(
    State(cms): State<Cms>,
    Path(raw): Path<String>,
) -> Result<Json<ThreadView>, ApiError> {
    let relation = relation(&raw)?;
    let comments = cms
        .list_comments(&relation)
        .await
        .map_err(|e| ApiError::upstream("Failed to load comments.", e))?;

    let thread = CommentThread::new(comments);
    Ok(Json(ThreadView {
        count: thread.len(),
        comments: thread.render(),
    }))
}

pub async fn create(
    State(cms): State<Cms>,
    session: Session,
    payload: Result<Json<PostCommentRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    if session.token().is_none() {
        return Err(ApiError::Unauthorized(LOGIN_TO_COMMENT.into()));
    }
    let Json(req) = payload?;
    if req.relation.trim().is_empty() {
        return Err(DomainError::Missing("Content and relation are required").into());
    }
    let relation = relation(req.relation.trim())?;
    // Top-level only; threading goes through `reply`.
    let draft = CommentDraft::new(&req.content, None)?;

    let (jwt, user) = require_user(&cms, &session).await?;
    let created = cms
        .post_comment(jwt, &relation, &draft)
        .await
        .map_err(|e| ApiError::relay("Failed to post comment", e))?;

    info!("{} commented on {}", user.username, relation);
    Ok(Json(json!({ "data": created })))
}

pub async fn reply(
    State(cms): State<Cms>,
    session: Session,
    payload: Result<Json<PostCommentRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    if session.token().is_none() {
        return Err(ApiError::Unauthorized(LOGIN_TO_COMMENT.into()));
    }
    let Json(req) = payload?;
    let parent_id = match req.parent_id {
        Some(id) if !req.relation.trim().is_empty() => id,
        _ => {
            return Err(
                DomainError::Missing("Content, relation, and parentId are required").into(),
            )
        }
    };
    let relation = relation(req.relation.trim())?;
    let draft = CommentDraft::new(&req.content, Some(parent_id))?;

    let (jwt, user) = require_user(&cms, &session).await?;
    let created = cms
        .post_comment(jwt, &relation, &draft)
        .await
        .map_err(|e| ApiError::relay("Failed to post reply", e))?;

    info!("{} replied to comment {} on {}", user.username, parent_id, relation);
    Ok(Json(json!({ "data": created })))
}

/// Anyone may report; the token is forwarded only when present.
pub async fn report(
    State(cms): State<Cms>,
    session: Session,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload?;
    let report = ReportDraft::new(req.comment_id, &req.reason)?;

    cms.report_comment(session.token(), &report)
        .await
        .map_err(|e| ApiError::relay("Failed to report comment", e))?;

    info!("Comment {} reported", report.comment_id);
    Ok(Json(json!({ "message": "Comment reported successfully" })))
}

use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cms::{Cms, CmsError, FileUpload};
use domain::{
    Credentials, EntityId, ForgotPassword, Media, PasswordReset, ProfileUpdate, Registration, User,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::error::ApiError;
use crate::session::{CookiePolicy, Session};

const INTERNAL: &str = "An internal server error occurred.";

/// Whole-request cap for avatar uploads, multipart framing included.
pub const MAX_AVATAR_BYTES: usize = 10 * 1024 * 1024;

// --- DTOs ---

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub user_id: Option<EntityId>,
    pub username: Option<String>,
    pub bio: Option<String>,
}

/// User as the browser sees it: `avatarUrl` for the header, `avatar` for
/// the settings page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: EntityId,
    pub username: String,
    pub email: String,
    pub bio: String,
    pub avatar_url: Option<String>,
    pub avatar: Option<Media>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        UserView {
            id: user.id,
            avatar_url: user.avatar_url().map(str::to_string),
            username: user.username,
            email: user.email,
            bio: user.bio.unwrap_or_default(),
            avatar: user.avatar,
        }
    }
}

/// A CMS refusal keeps its own message; anything else is ours to hide.
fn rejected(e: CmsError, fallback: &str, as_client: fn(String) -> ApiError) -> ApiError {
    match e {
        CmsError::Status { .. } => as_client(
            e.upstream_message()
                .unwrap_or_else(|| fallback.to_string()),
        ),
        other => ApiError::upstream(INTERNAL, other),
    }
}

fn upload_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::PayloadTooLarge(format!(
            "Image is too large. The maximum size is {} MB.",
            MAX_AVATAR_BYTES / (1024 * 1024)
        ));
    }
    ApiError::BadRequest(e.body_text())
}

fn brief(user: &User) -> serde_json::Value {
    json!({ "id": user.id, "username": user.username, "email": user.email })
}

// --- Handlers ---

pub async fn session(State(cms): State<Cms>, session: Session) -> Response {
    let Some(jwt) = session.token() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "authenticated": false, "message": "No session found" })),
        )
            .into_response();
    };

    match cms.me(jwt).await {
        Ok(user) => Json(json!({ "authenticated": true, "user": UserView::from(user) }))
            .into_response(),
        Err(CmsError::Status { status, .. }) => {
            info!("Session rejected by CMS (status {})", status);
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "authenticated": false, "message": "Invalid session" })),
            )
                .into_response()
        }
        Err(e) => {
            error!("Session API error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "authenticated": false, "message": "Internal server error" })),
            )
                .into_response()
        }
    }
}

pub async fn login(
    State(cms): State<Cms>,
    State(cookies): State<CookiePolicy>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let credentials = Credentials::new(&req.identifier, &req.password)?;

    let auth = cms
        .login(&credentials)
        .await
        .map_err(|e| rejected(e, "Invalid credentials", ApiError::Unauthorized))?;

    let cookie = cookies.issue(&auth.jwt);
    Ok((
        [CookiePolicy::header(&cookie)],
        Json(json!({ "message": "Login successful", "user": brief(&auth.user) })),
    )
        .into_response())
}

pub async fn logout(State(cookies): State<CookiePolicy>) -> Response {
    info!("Logout API called");
    let cookie = cookies.clear();
    (
        [CookiePolicy::header(&cookie)],
        Json(json!({ "message": "Logout successful" })),
    )
        .into_response()
}

pub async fn register(
    State(cms): State<Cms>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(req) = payload?;
    let registration = Registration::new(&req.username, &req.email, &req.password)?;

    let user = cms
        .register(&registration)
        .await
        .map_err(|e| {
            rejected(e, "Registration failed. Please try again.", ApiError::BadRequest)
        })?;

    // 需要邮件确认，这里不发 Cookie
    Ok(Json(json!({ "message": "Registration successful", "user": brief(&user) })))
}

pub async fn forgot_password(
    State(cms): State<Cms>,
    payload: Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(req) = payload?;
    let req = ForgotPassword::new(&req.email)?;

    cms.forgot_password(&req)
        .await
        .map_err(|e| rejected(e, "Failed to send reset email.", ApiError::BadRequest))?;

    Ok(Json(json!({
        "message": "If an account exists for that email, a reset link has been sent."
    })))
}

pub async fn reset_password(
    State(cms): State<Cms>,
    payload: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(req) = payload?;
    let reset = PasswordReset::new(&req.code, &req.password, &req.password_confirmation)?;

    cms.reset_password(&reset)
        .await
        .map_err(|e| rejected(e, "Failed to reset password.", ApiError::BadRequest))?;

    Ok(Json(json!({
        "message": "Your password has been successfully reset. You can now log in."
    })))
}

pub async fn update_profile(
    State(cms): State<Cms>,
    session: Session,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let jwt = session
        .token()
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".into()))?;
    let Json(req) = payload?;
    let update = ProfileUpdate::new(req.user_id, req.username, req.bio)?;

    cms.update_user(jwt, &update)
        .await
        .map_err(|e| ApiError::upstream("Failed to update profile", e))?;
    let user = cms
        .me(jwt)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch updated user", e))?;

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": UserView::from(user)
    })))
}

pub async fn upload_avatar(
    State(cms): State<Cms>,
    session: Session,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let jwt = session
        .token()
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".into()))?;

    let mut file = None;
    let mut user_id = None;
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("avatar").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(upload_error)?.to_vec();
                if !bytes.is_empty() {
                    file = Some(FileUpload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            }
            Some("userId") => {
                user_id = field
                    .text()
                    .await
                    .map_err(upload_error)?
                    .trim()
                    .parse::<EntityId>()
                    .ok();
            }
            _ => {}
        }
    }

    let (Some(file), Some(user_id)) = (file, user_id) else {
        return Err(ApiError::BadRequest("File and user ID are required".into()));
    };

    let media = cms
        .upload(jwt, file)
        .await
        .map_err(|e| ApiError::upstream("Failed to upload image", e))?;
    let media_id = media.id.ok_or_else(|| {
        ApiError::upstream(
            "Failed to upload image",
            CmsError::Malformed("uploaded file has no id".into()),
        )
    })?;

    cms.set_avatar(jwt, user_id, media_id)
        .await
        .map_err(|e| ApiError::upstream("Failed to update user avatar", e))?;
    let user = cms
        .me(jwt)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch updated user", e))?;

    Ok(Json(json!({
        "message": "Avatar updated successfully",
        "user": UserView::from(user)
    })))
}

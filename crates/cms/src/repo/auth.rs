use crate::{Cms, CmsError};
use domain::{
    Credentials, EntityId, ForgotPassword, Media, PasswordReset, ProfileUpdate, Registration, User,
};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

/// What a successful login hands back.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub jwt: String,
    pub user: User,
}

#[derive(Deserialize)]
struct RegisterResponse {
    user: Option<User>,
}

/// A file received from the browser, on its way to the media library.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Cms {
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthSession, CmsError> {
        let url = self.url("auth/local");
        let json = self.send(self.post(&url, None).json(credentials), &url).await?;
        let session: AuthSession = crate::decode(&url, json)
            .map_err(|_| CmsError::Malformed("login response missing user or JWT".into()))?;
        info!("Login successful for user: {}", session.user.email);
        Ok(session)
    }

    /// Registration never yields a session: the account still needs email
    /// confirmation.
    pub async fn register(&self, registration: &Registration) -> Result<User, CmsError> {
        let url = self.url("auth/local/register");
        let json = self
            .send(self.post(&url, None).json(registration), &url)
            .await?;
        let res: RegisterResponse = crate::decode(&url, json)?;
        let user = res.user.ok_or_else(|| {
            CmsError::Malformed("registration response missing user object".into())
        })?;
        info!("Registration successful for user: {}", user.email);
        Ok(user)
    }

    pub async fn forgot_password(&self, req: &ForgotPassword) -> Result<(), CmsError> {
        let url = self.url("auth/forgot-password");
        self.send(self.post(&url, None).json(req), &url).await?;
        Ok(())
    }

    pub async fn reset_password(&self, req: &PasswordReset) -> Result<(), CmsError> {
        let url = self.url("auth/reset-password");
        self.send(self.post(&url, None).json(req), &url).await?;
        Ok(())
    }

    /// The user behind `jwt`, avatar populated. Doubles as token validation.
    pub async fn me(&self, jwt: &str) -> Result<User, CmsError> {
        let url = self.url("users/me?populate=avatar");
        let json = self.send(self.get(&url, Some(jwt)), &url).await?;
        crate::decode(&url, json)
    }

    pub async fn update_user(&self, jwt: &str, update: &ProfileUpdate) -> Result<(), CmsError> {
        let url = self.url(&format!("users/{}", update.user_id));
        self.send(self.put(&url, Some(jwt)).json(update), &url).await?;
        Ok(())
    }

    pub async fn set_avatar(
        &self,
        jwt: &str,
        user_id: EntityId,
        media_id: EntityId,
    ) -> Result<(), CmsError> {
        let url = self.url(&format!("users/{}", user_id));
        self.send(
            self.put(&url, Some(jwt)).json(&json!({ "avatar": media_id })),
            &url,
        )
        .await?;
        Ok(())
    }

    /// Uploads into the media library and returns the first stored file.
    pub async fn upload(&self, jwt: &str, file: FileUpload) -> Result<Media, CmsError> {
        let url = self.url("upload");

        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(ct) = file.content_type.as_deref() {
            part = part.mime_str(ct).map_err(|source| CmsError::Transport {
                url: url.clone(),
                source,
            })?;
        }
        let form = Form::new().part("files", part);

        let json = self
            .send(self.post(&url, Some(jwt)).multipart(form), &url)
            .await?;
        let files: Vec<Media> = crate::decode(&url, json)?;
        files
            .into_iter()
            .next()
            .ok_or_else(|| CmsError::Malformed("No file uploaded".into()))
    }
}

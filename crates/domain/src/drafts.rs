use crate::error::DomainError;
use crate::models::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const ARTICLE_UID: &str = "api::article.article";
pub const MIN_PASSWORD_LEN: usize = 6;

/// `<collection uid>:<entity id>`, the key the comments plugin files a
/// thread under, e.g. `api::article.article:23`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Relation(String);

impl Relation {
    pub fn new(s: impl Into<String>) -> Result<Self, DomainError> {
        let s = s.into();
        let Some((uid, id)) = s.rsplit_once(':') else {
            return Err(DomainError::InvalidRelation(s));
        };
        if uid.is_empty() || id.parse::<EntityId>().is_err() {
            return Err(DomainError::InvalidRelation(s));
        }
        if !uid
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, ':' | '.' | '-' | '_'))
        {
            return Err(DomainError::InvalidRelation(s));
        }
        Ok(Self(s))
    }

    pub fn article(id: EntityId) -> Self {
        Self(format!("{}:{}", ARTICLE_UID, id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Relation {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Relation> for String {
    fn from(r: Relation) -> Self {
        r.0
    }
}

fn required(value: &str, message: &'static str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Missing(message));
    }
    Ok(trimmed.to_string())
}

/// A comment or reply about to be posted. Construction is the only
/// validation point, so holding one means the content is non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    pub content: String,
    pub parent_id: Option<EntityId>,
}

impl CommentDraft {
    pub fn new(content: &str, parent_id: Option<EntityId>) -> Result<Self, DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::EmptyContent);
        }
        Ok(Self {
            content: content.to_string(),
            parent_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub identifier: String,
    pub password: String,
}

impl Credentials {
    pub fn new(identifier: &str, password: &str) -> Result<Self, DomainError> {
        const MSG: &str = "Email and password are required";
        if password.is_empty() {
            return Err(DomainError::Missing(MSG));
        }
        Ok(Self {
            identifier: required(identifier, MSG)?,
            password: password.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn new(username: &str, email: &str, password: &str) -> Result<Self, DomainError> {
        const MSG: &str = "All fields are required";
        if password.is_empty() {
            return Err(DomainError::Missing(MSG));
        }
        Ok(Self {
            username: required(username, MSG)?,
            email: required(email, MSG)?,
            password: password.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip)]
    pub user_id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub fn new(
        user_id: Option<EntityId>,
        username: Option<String>,
        bio: Option<String>,
    ) -> Result<Self, DomainError> {
        let user_id = user_id.ok_or(DomainError::Missing("User ID is required"))?;
        Ok(Self {
            user_id,
            username,
            bio,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    pub comment_id: EntityId,
    pub reason: String,
}

impl ReportDraft {
    pub fn new(comment_id: Option<EntityId>, reason: &str) -> Result<Self, DomainError> {
        const MSG: &str = "Comment ID and reason are required";
        let comment_id = comment_id.ok_or(DomainError::Missing(MSG))?;
        Ok(Self {
            comment_id,
            reason: required(reason, MSG)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForgotPassword {
    pub email: String,
}

impl ForgotPassword {
    pub fn new(email: &str) -> Result<Self, DomainError> {
        Ok(Self {
            email: required(email, "Email is required")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset {
    pub code: String,
    pub password: String,
    pub password_confirmation: String,
}

impl PasswordReset {
    pub fn new(code: &str, password: &str, confirmation: &str) -> Result<Self, DomainError> {
        let code = required(code, "Invalid reset link. No code provided.")?;
        if password != confirmation {
            return Err(DomainError::PasswordMismatch);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::PasswordTooShort(MIN_PASSWORD_LEN));
        }
        Ok(Self {
            code,
            password: password.to_string(),
            password_confirmation: confirmation.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_parse() {
        let r = Relation::new("api::article.article:23").unwrap();
        assert_eq!(r, Relation::article(23));

        assert!(Relation::new("api::article.article").is_err());
        assert!(Relation::new("api::article.article:abc").is_err());
        assert!(Relation::new(":23").is_err());
        assert!(Relation::new("api::Article.article:23").is_err());
    }

    #[test]
    fn test_relation_serde() {
        let r: Relation = serde_json::from_str("\"api::article.article:5\"").unwrap();
        assert_eq!(r.as_str(), "api::article.article:5");
        assert!(serde_json::from_str::<Relation>("\"nope\"").is_err());
    }

    #[test]
    fn test_blank_comment_rejected() {
        assert_eq!(CommentDraft::new("", None), Err(DomainError::EmptyContent));
        assert_eq!(CommentDraft::new("  \n\t", Some(3)), Err(DomainError::EmptyContent));

        let draft = CommentDraft::new(" hello ", Some(3)).unwrap();
        assert_eq!(draft.parent_id, Some(3));
        assert_eq!(draft.content, " hello ");
    }

    #[test]
    fn test_credentials() {
        assert!(Credentials::new("a@b.c", "").is_err());
        assert!(Credentials::new(" ", "pw").is_err());
        let c = Credentials::new(" a@b.c ", "pw").unwrap();
        assert_eq!(c.identifier, "a@b.c");
    }

    #[test]
    fn test_password_reset_rules() {
        assert_eq!(
            PasswordReset::new("code", "secret1", "secret2"),
            Err(DomainError::PasswordMismatch)
        );
        assert_eq!(
            PasswordReset::new("code", "abc", "abc"),
            Err(DomainError::PasswordTooShort(MIN_PASSWORD_LEN))
        );
        assert!(PasswordReset::new("", "secret1", "secret1").is_err());

        let reset = PasswordReset::new("code", "secret1", "secret1").unwrap();
        let json = serde_json::to_value(&reset).unwrap();
        assert_eq!(json["passwordConfirmation"], "secret1");
    }

    #[test]
    fn test_profile_update_requires_user() {
        assert!(ProfileUpdate::new(None, Some("x".into()), None).is_err());
        let update = ProfileUpdate::new(Some(4), Some("ferris".into()), None).unwrap();
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "username": "ferris" }));
    }

    #[test]
    fn test_report_requires_reason() {
        assert!(ReportDraft::new(Some(1), "   ").is_err());
        assert!(ReportDraft::new(None, "spam").is_err());
        assert_eq!(ReportDraft::new(Some(1), "spam").unwrap().reason, "spam");
    }
}

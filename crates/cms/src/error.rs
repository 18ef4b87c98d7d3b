use thiserror::Error;

#[derive(Debug, Error)]
pub enum CmsError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("[CMS] HTTP error! status: {status}, message: {body}")]
    Status { status: u16, body: String },

    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected CMS response: {0}")]
    Malformed(String),
}

impl CmsError {
    pub fn status(&self) -> Option<u16> {
        match self {
            CmsError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// `error.message` from the CMS's JSON error body, if there is one.
    pub fn upstream_message(&self) -> Option<String> {
        let CmsError::Status { body, .. } = self else {
            return None;
        };
        let json: serde_json::Value = serde_json::from_str(body).ok()?;
        json.get("error")?
            .get("message")?
            .as_str()
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message() {
        let err = CmsError::Status {
            status: 400,
            body: r#"{"data":null,"error":{"status":400,"name":"ValidationError","message":"Invalid identifier or password"}}"#.into(),
        };
        assert_eq!(
            err.upstream_message().as_deref(),
            Some("Invalid identifier or password")
        );
        assert!(!err.is_unauthorized());

        let err = CmsError::Status {
            status: 401,
            body: "Unauthorized".into(),
        };
        assert!(err.upstream_message().is_none());
        assert!(err.is_unauthorized());
    }
}

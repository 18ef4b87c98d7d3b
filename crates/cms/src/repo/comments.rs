use crate::{Cms, CmsError, MaybeWrapped};
use domain::{Comment, CommentDraft, Relation, ReportDraft};
use serde::Serialize;
use serde_json::json;
use tracing::info;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewComment<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_of: Option<u64>,
}

impl Cms {
    /// Never cached: a thread must reflect posts made a moment ago.
    pub async fn list_comments(&self, relation: &Relation) -> Result<Vec<Comment>, CmsError> {
        let url = self.url(&format!("comments/{}", relation));
        let json = self.send(self.get(&url, None), &url).await?;
        let list: MaybeWrapped<Vec<Comment>> = crate::decode(&url, json)?;
        Ok(list.into_inner())
    }

    /// Posts as the user owning `jwt`. A draft with a parent becomes a reply.
    pub async fn post_comment(
        &self,
        jwt: &str,
        relation: &Relation,
        draft: &CommentDraft,
    ) -> Result<Comment, CmsError> {
        let url = self.url(&format!("comments/{}", relation));
        let body = NewComment {
            content: &draft.content,
            thread_of: draft.parent_id,
        };
        let json = self
            .send(self.post(&url, Some(jwt)).json(&body), &url)
            .await?;
        let created: MaybeWrapped<Comment> = crate::decode(&url, json)?;
        let created = created.into_inner();
        info!(
            "Comment {} posted on {} (reply to {:?})",
            created.id, relation, draft.parent_id
        );
        Ok(created)
    }

    pub async fn report_comment(
        &self,
        jwt: Option<&str>,
        report: &ReportDraft,
    ) -> Result<(), CmsError> {
        let url = self.url(&format!("comments-reports/report/{}", report.comment_id));
        self.send(
            self.post(&url, jwt).json(&json!({ "content": report.reason })),
            &url,
        )
        .await?;
        Ok(())
    }
}

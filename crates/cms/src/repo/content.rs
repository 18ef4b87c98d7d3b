use crate::{Cms, CmsError, Freshness};
use domain::{Article, AuthorProfile, Category, Collection, EntityId, Partner, Tag};
use serde_json::json;

impl Cms {
    pub async fn article_by_slug(&self, slug: &str) -> Result<Option<Article>, CmsError> {
        let query = json!({
            "filters": { "slug": { "$eq": slug } },
            "populate": {
                "coverImage": true,
                "category": true,
                "tags": true,
                "seo": { "populate": "*" },
                "reviewDetails": true,
                "author": { "populate": "*" },
                "contentBlocks": { "populate": "*" }
            }
        });
        let res: Collection<Article> = self
            .fetch_api("articles", &query, Freshness::Revalidate)
            .await?;
        Ok(res.first())
    }

    /// Newest first, card fields only.
    pub async fn latest_articles(&self) -> Result<Vec<Article>, CmsError> {
        let query = json!({
            "populate": {
                "coverImage": { "fields": ["url", "alternativeText", "width", "height", "formats"] },
                "category": { "fields": ["id", "name", "slug"] },
                "author": { "fields": ["name", "slug"] }
            },
            "sort": { "publishedAt": "desc" }
        });
        let res: Collection<Article> = self
            .fetch_api("articles", &query, Freshness::Revalidate)
            .await?;
        Ok(res.data)
    }

    /// Categories without a parent, one level of children, by name.
    pub async fn root_categories(&self) -> Result<Vec<Category>, CmsError> {
        let query = json!({
            "filters": { "parent": { "id": { "$null": true } } },
            "populate": { "children": { "populate": "*" } },
            "sort": "name:asc"
        });
        let res: Collection<Category> = self
            .fetch_api("categories", &query, Freshness::Revalidate)
            .await?;
        Ok(res.data)
    }

    /// The category with three levels of children populated.
    pub async fn category_with_descendants(
        &self,
        slug: &str,
    ) -> Result<Option<Category>, CmsError> {
        let query = json!({
            "filters": { "slug": { "$eq": slug } },
            "populate": "children.children.children"
        });
        let res: Collection<Category> = self
            .fetch_api("categories", &query, Freshness::Revalidate)
            .await?;
        Ok(res.first())
    }

    pub async fn articles_in_categories(
        &self,
        ids: &[EntityId],
    ) -> Result<Vec<Article>, CmsError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = json!({
            "filters": { "category": { "id": { "$in": ids } } },
            "populate": {
                "coverImage": { "fields": ["url", "alternativeText", "width", "height", "formats"] },
                "category": { "fields": ["name", "slug"] },
                "author": { "fields": ["name", "slug"] }
            },
            "sort": "publishedAt:desc"
        });
        let res: Collection<Article> = self
            .fetch_api("articles", &query, Freshness::Revalidate)
            .await?;
        Ok(res.data)
    }

    pub async fn tag_by_slug(&self, slug: &str) -> Result<Option<Tag>, CmsError> {
        let query = json!({
            "filters": { "slug": { "$eq": slug } },
            "populate": {
                "articles": {
                    "populate": { "coverImage": true, "category": true }
                }
            }
        });
        let res: Collection<Tag> = self
            .fetch_api("tags", &query, Freshness::Revalidate)
            .await?;
        Ok(res.first())
    }

    pub async fn author_by_slug(&self, slug: &str) -> Result<Option<AuthorProfile>, CmsError> {
        let query = json!({
            "filters": { "slug": { "$eq": slug } },
            "populate": {
                "avatar": true,
                "articles": { "populate": ["coverImage", "category"] }
            }
        });
        let res: Collection<AuthorProfile> = self
            .fetch_api("author-profiles", &query, Freshness::Revalidate)
            .await?;
        Ok(res.first())
    }

    pub async fn partners(&self) -> Result<Vec<Partner>, CmsError> {
        let res: Collection<Partner> = self
            .fetch_api("partners", &json!({ "populate": "*" }), Freshness::Revalidate)
            .await?;
        Ok(res.data)
    }
}

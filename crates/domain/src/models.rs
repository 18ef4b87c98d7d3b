use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub type EntityId = u64;

/// CMS 有时返回 `null` 而不是空数组
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    #[serde(default)]
    pub id: Option<EntityId>,
    pub url: String,
    #[serde(default)]
    pub alternative_text: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<Media>,
}

/// A comment as returned by the comments plugin. `children` is already
/// populated server-side; the same reply also shows up as its own entry in
/// the flat list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: EntityId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author: Option<CommentAuthor>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub children: Vec<Comment>,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default)]
    pub blocked_thread: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub reports: Vec<Value>,
}

impl Comment {
    pub fn new(id: EntityId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            created_at: None,
            author: None,
            children: Vec::new(),
            blocked: false,
            blocked_thread: false,
            reports: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Comment>) -> Self {
        self.children = children;
        self
    }
}

/// Category node. The CMS guarantees the tree shape; `children` is only
/// populated as deep as the query asked for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: EntityId,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub children: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<Media>,
}

impl User {
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar.as_ref().map(|a| a.url.as_str())
    }
}

/// Rich-text node. Block-level nodes carry `type` and nested `children`,
/// inline leaves carry `text` plus formatting flags (kept in `marks`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub children: Vec<Block>,
    #[serde(flatten)]
    pub marks: serde_json::Map<String, Value>,
}

impl Block {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".into(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn paragraph(children: Vec<Block>) -> Self {
        Self {
            kind: "paragraph".into(),
            children,
            ..Self::default()
        }
    }

    pub fn heading(level: u8, children: Vec<Block>) -> Self {
        Self {
            kind: "heading".into(),
            level: Some(level),
            children,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__component")]
pub enum ContentBlock {
    #[serde(rename = "article-images.image-block")]
    Image {
        id: EntityId,
        #[serde(default)]
        image: Option<Media>,
    },
    #[serde(rename = "article-images.video-embed-block", rename_all = "camelCase")]
    VideoEmbed {
        id: EntityId,
        #[serde(default)]
        embed_code: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetails {
    #[serde(default)]
    pub id: Option<EntityId>,
    pub product_name: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pros: Vec<Block>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cons: Vec<Block>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub verdict: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default, rename = "canonicalURL")]
    pub canonical_url: Option<String>,
    #[serde(default)]
    pub meta_image: Option<Media>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorProfile {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub bio: Vec<Block>,
    #[serde(default)]
    pub avatar: Option<Media>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: EntityId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: Vec<Block>,
    #[serde(default)]
    pub cover_image: Option<Media>,
    #[serde(default)]
    pub author: Option<AuthorProfile>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub review_details: Option<ReviewDetails>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content_blocks: Vec<ContentBlock>,
    #[serde(default)]
    pub seo: Option<Seo>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_featured: bool,
    /// Disclosure badges on the article page.
    #[serde(default)]
    pub is_sponsored: bool,
    #[serde(default)]
    pub is_affiliate: bool,
}

/// Homepage slider size when nothing is marked featured.
pub const HERO_FALLBACK: usize = 5;

impl Article {
    /// Splits a newest-first list into the hero slider and the latest grid.
    /// Featured articles form the hero; with none featured, the first
    /// [`HERO_FALLBACK`] articles do. `latest` is always the non-featured ones.
    pub fn split_hero(articles: Vec<Article>) -> (Vec<Article>, Vec<Article>) {
        let (featured, latest): (Vec<_>, Vec<_>) =
            articles.into_iter().partition(|a| a.is_featured);
        if !featured.is_empty() {
            return (featured, latest);
        }
        let hero = latest.iter().take(HERO_FALLBACK).cloned().collect();
        (hero, latest)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub logo: Option<Media>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// `{ data: [...], meta: {...} }` envelope used by every collection endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Collection<T> {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: Meta,
}

impl<T> Collection<T> {
    pub fn first(self) -> Option<T> {
        self.data.into_iter().next()
    }
}

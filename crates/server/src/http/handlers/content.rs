use axum::{
    extract::{Path, State},
    Json,
};
use cms::Cms;
use domain::{
    blocks_to_text, reading_time, table_of_contents, Article, AuthorProfile, Category, EntityId,
    Partner, ReadingTime, Relation, Tag, TocEntry, User,
};
use serde::Serialize;
use tracing::{debug, warn};

use super::auth::UserView;
use crate::error::ApiError;
use crate::session::Session;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub hero: Vec<Article>,
    pub latest: Vec<Article>,
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationView {
    pub categories: Vec<Category>,
    pub user: Option<UserView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    pub article: Article,
    pub table_of_contents: Vec<TocEntry>,
    pub reading_time: ReadingTime,
    pub is_authenticated: bool,
    pub comment_relation: Relation,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub category: Category,
    pub category_ids: Vec<EntityId>,
    pub articles: Vec<Article>,
}

/// Signed-in user for page chrome. Any failure just means "signed out".
async fn current_user(cms: &Cms, session: &Session) -> Option<User> {
    let jwt = session.token()?;
    match cms.me(jwt).await {
        Ok(user) => Some(user),
        Err(e) => {
            debug!("Ignoring session for page render: {}", e);
            None
        }
    }
}

pub async fn home(State(cms): State<Cms>) -> Result<Json<HomeView>, ApiError> {
    let (articles, categories) =
        futures::try_join!(cms.latest_articles(), cms.root_categories())
            .map_err(|e| ApiError::upstream("Failed to load homepage.", e))?;
    let (hero, latest) = Article::split_hero(articles);
    Ok(Json(HomeView {
        hero,
        latest,
        categories,
    }))
}

pub async fn navigation(State(cms): State<Cms>, session: Session) -> Json<NavigationView> {
    let (categories, user) =
        futures::join!(cms.root_categories(), current_user(&cms, &session));

    // 菜单加载失败不影响页面
    let categories = categories.unwrap_or_else(|e| {
        warn!("Navigation categories unavailable: {}", e);
        Vec::new()
    });

    Json(NavigationView {
        categories,
        user: user.map(UserView::from),
    })
}

pub async fn article(
    State(cms): State<Cms>,
    session: Session,
    Path(slug): Path<String>,
) -> Result<Json<ArticleView>, ApiError> {
    let (article, user) =
        futures::join!(cms.article_by_slug(&slug), current_user(&cms, &session));
    let article = article
        .map_err(|e| ApiError::upstream("Failed to load article.", e))?
        .ok_or_else(|| ApiError::NotFound(format!("Article '{}' not found", slug)))?;

    let text = blocks_to_text(&article.body);
    Ok(Json(ArticleView {
        table_of_contents: table_of_contents(&article.body),
        reading_time: reading_time(&text),
        is_authenticated: user.is_some(),
        comment_relation: Relation::article(article.id),
        article,
    }))
}

/// Articles filed under the category or anywhere beneath it.
pub async fn category(
    State(cms): State<Cms>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryView>, ApiError> {
    let category = cms
        .category_with_descendants(&slug)
        .await
        .map_err(|e| ApiError::upstream("Failed to load category.", e))?
        .ok_or_else(|| ApiError::NotFound(format!("Category '{}' not found", slug)))?;

    let category_ids = category.descendant_ids();
    let articles = cms
        .articles_in_categories(&category_ids)
        .await
        .map_err(|e| ApiError::upstream("Failed to load category articles.", e))?;

    Ok(Json(CategoryView {
        category,
        category_ids,
        articles,
    }))
}

pub async fn tag(
    State(cms): State<Cms>,
    Path(slug): Path<String>,
) -> Result<Json<Tag>, ApiError> {
    let tag = cms
        .tag_by_slug(&slug)
        .await
        .map_err(|e| ApiError::upstream("Failed to load tag.", e))?
        .ok_or_else(|| ApiError::NotFound(format!("Tag '{}' not found", slug)))?;
    Ok(Json(tag))
}

pub async fn author(
    State(cms): State<Cms>,
    Path(slug): Path<String>,
) -> Result<Json<AuthorProfile>, ApiError> {
    let author = cms
        .author_by_slug(&slug)
        .await
        .map_err(|e| ApiError::upstream("Failed to load author.", e))?
        .ok_or_else(|| ApiError::NotFound(format!("Author '{}' not found", slug)))?;
    Ok(Json(author))
}

pub async fn partners(State(cms): State<Cms>) -> Result<Json<Vec<Partner>>, ApiError> {
    let partners = cms
        .partners()
        .await
        .map_err(|e| ApiError::upstream("Failed to load partners.", e))?;
    Ok(Json(partners))
}

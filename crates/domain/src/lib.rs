mod blocks;
mod categories;
mod comments;
mod drafts;
mod error;
mod models;

pub use blocks::{blocks_to_text, reading_time, slugify, table_of_contents, ReadingTime, TocEntry};
pub use comments::{top_level, CommentNode, CommentThread, ANONYMOUS, REMOVED_PLACEHOLDER};
pub use drafts::{
    CommentDraft, Credentials, ForgotPassword, PasswordReset, ProfileUpdate, Registration,
    Relation, ReportDraft, ARTICLE_UID, MIN_PASSWORD_LEN,
};
pub use error::DomainError;
pub use models::{
    Article, AuthorProfile, Block, Category, Collection, Comment, CommentAuthor, ContentBlock,
    EntityId, Media, Meta, Pagination, Partner, ReviewDetails, Seo, Tag, User, HERO_FALLBACK,
};

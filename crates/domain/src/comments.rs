use crate::error::DomainError;
use crate::models::{Comment, EntityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const REMOVED_PLACEHOLDER: &str = "This comment has been removed by a moderator.";
pub const ANONYMOUS: &str = "Anonymous";

/// Comments that are nobody's child within `comments`, in input order.
pub fn top_level(comments: &[Comment]) -> Vec<&Comment> {
    let child_ids: HashSet<EntityId> = comments
        .iter()
        .flat_map(|c| c.children.iter().map(|child| child.id))
        .collect();

    comments
        .iter()
        .filter(|c| !child_ids.contains(&c.id))
        .collect()
}

/// What a reader sees for one comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum CommentNode {
    #[serde(rename_all = "camelCase")]
    Visible {
        id: EntityId,
        author_name: String,
        avatar_url: Option<String>,
        content: String,
        created_at: Option<DateTime<Utc>>,
        replies: Vec<CommentNode>,
    },
    /// Moderated. `blocked` keeps the replies, `blockedThread` drops them.
    Removed {
        id: EntityId,
        placeholder: String,
        replies: Vec<CommentNode>,
    },
}

impl CommentNode {
    pub fn render(comment: &Comment) -> Self {
        if comment.blocked_thread {
            return CommentNode::Removed {
                id: comment.id,
                placeholder: REMOVED_PLACEHOLDER.to_string(),
                replies: Vec::new(),
            };
        }

        let replies = comment.children.iter().map(CommentNode::render).collect();

        if comment.blocked {
            return CommentNode::Removed {
                id: comment.id,
                placeholder: REMOVED_PLACEHOLDER.to_string(),
                replies,
            };
        }

        let author = comment.author.as_ref();
        CommentNode::Visible {
            id: comment.id,
            author_name: author
                .and_then(|a| a.name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| ANONYMOUS.to_string()),
            avatar_url: author.and_then(|a| a.avatar.as_ref()).map(|m| m.url.clone()),
            content: comment.content.clone(),
            created_at: comment.created_at,
            replies,
        }
    }

    pub fn id(&self) -> EntityId {
        match self {
            CommentNode::Visible { id, .. } | CommentNode::Removed { id, .. } => *id,
        }
    }

    pub fn replies(&self) -> &[CommentNode] {
        match self {
            CommentNode::Visible { replies, .. } | CommentNode::Removed { replies, .. } => replies,
        }
    }
}

/// In-memory comment state for one article: the plugin's flat list plus the
/// merge operations applied after a successful post.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentThread {
    comments: Vec<Comment>,
}

impl CommentThread {
    pub fn new(comments: Vec<Comment>) -> Self {
        Self { comments }
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Every comment in the flat list, replies included.
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn top_level(&self) -> Vec<&Comment> {
        top_level(&self.comments)
    }

    /// A freshly created top-level comment goes first.
    pub fn insert_new(&mut self, comment: Comment) {
        self.comments.insert(0, comment);
    }

    /// Attaches `reply` under every copy of the parent, top-level entry or
    /// nested child, and records it in the flat list.
    pub fn append_reply(&mut self, parent_id: EntityId, reply: Comment) -> Result<(), DomainError> {
        let mut found = false;
        for comment in &mut self.comments {
            found |= attach(comment, parent_id, &reply);
        }
        if !found {
            return Err(DomainError::UnknownParent(parent_id));
        }
        self.comments.push(reply);
        Ok(())
    }

    pub fn render(&self) -> Vec<CommentNode> {
        self.top_level()
            .into_iter()
            .map(CommentNode::render)
            .collect()
    }
}

fn attach(node: &mut Comment, parent_id: EntityId, reply: &Comment) -> bool {
    let mut found = false;
    for child in &mut node.children {
        found |= attach(child, parent_id, reply);
    }
    if node.id == parent_id && !node.children.iter().any(|c| c.id == reply.id) {
        node.children.push(reply.clone());
        found = true;
    }
    found || node.id == parent_id
}

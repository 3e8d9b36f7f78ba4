//! Discussion posts, comments and their submission forms.

use super::error::Result;
use super::validation::require;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a vote on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    /// Verb used in notifications ("upvote"/"downvote").
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Up => "upvote",
            Self::Down => "downvote",
        }
    }
}

/// A comment attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub author_name: String,
    pub author_erp: Option<i64>,
    pub anonymous: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl Comment {
    /// Name to show next to the comment, honouring the anonymous flag.
    #[must_use]
    pub fn display_author(&self) -> &str {
        if self.anonymous {
            "Anonymous"
        } else {
            &self.author_name
        }
    }
}

/// A discussion post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub anonymous: bool,
    pub visibility: String,
    pub created_at: Option<DateTime<Utc>>,
    pub upvotes: u64,
    pub downvotes: u64,
    pub comments: Vec<Comment>,
}

impl Post {
    /// Counts a vote the backend has accepted.
    pub fn apply_vote(&mut self, vote: Vote) {
        match vote {
            Vote::Up => self.upvotes = self.upvotes.saturating_add(1),
            Vote::Down => self.downvotes = self.downvotes.saturating_add(1),
        }
    }

    /// Creation time formatted for display, or `"Invalid Date"` when the
    /// backend sent nothing parseable.
    #[must_use]
    pub fn created_label(&self) -> String {
        self.created_at.map_or_else(
            || "Invalid Date".to_string(),
            |at| at.format("%Y-%m-%d %H:%M").to_string(),
        )
    }
}

/// New post form. Posts are always created with `Public` visibility.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub anonymous: bool,
}

impl PostDraft {
    /// # Errors
    ///
    /// Returns a validation error when title or content is blank.
    pub fn validate(&self) -> Result<()> {
        require("title", &self.title, "Title is required")?;
        require("content", &self.content, "Content is required")?;
        Ok(())
    }
}

/// New comment form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentDraft {
    pub post_id: String,
    pub text: String,
    pub anonymous: bool,
}

impl CommentDraft {
    /// # Errors
    ///
    /// Returns a validation error when the comment text is blank.
    pub fn validate(&self) -> Result<()> {
        require("commentText", &self.text, "Comment cannot be empty")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> Post {
        Post {
            id: "p1".into(),
            title: "Exam dates".into(),
            content: "When is the final?".into(),
            author: "ada".into(),
            anonymous: false,
            visibility: "Public".into(),
            created_at: None,
            upvotes: 2,
            downvotes: 0,
            comments: vec![],
        }
    }

    #[test]
    fn votes_increment_only_their_counter() {
        let mut p = post();
        p.apply_vote(Vote::Up);
        p.apply_vote(Vote::Down);
        p.apply_vote(Vote::Down);
        assert_eq!((p.upvotes, p.downvotes), (3, 2));
        assert_eq!(p.title, "Exam dates");
    }

    #[test]
    fn missing_timestamp_reads_invalid_date() {
        assert_eq!(post().created_label(), "Invalid Date");
    }

    #[test]
    fn anonymous_comment_hides_author() {
        let comment = Comment {
            id: "c1".into(),
            text: "same question".into(),
            author_name: "bob".into(),
            author_erp: Some(7),
            anonymous: true,
            created_at: None,
        };
        assert_eq!(comment.display_author(), "Anonymous");
    }

    #[test]
    fn drafts_require_text() {
        assert!(PostDraft::default().validate().is_err());
        let draft = PostDraft {
            title: "t".into(),
            content: "c".into(),
            anonymous: true,
        };
        assert!(draft.validate().is_ok());
        assert!(CommentDraft::default().validate().is_err());
    }
}

//! Text rendering of view models and records.
//!
//! Everything renders to a `String`, one line per row, so the same output can
//! go to a terminal or into a test assertion. A [`Renderer`] built with
//! [`Renderer::plain`] emits no escape sequences at all.

use crate::app::{Notification, NotificationLevel};
use crate::domain::{Comment, CourseDetails, Post, Teacher, UserProfile};
use crate::ui::pagination::{PageItem, PaginationView};
use crate::ui::theme::{Theme, ThemeColors};
use crate::ui::viewmodel::ListViewModel;

/// Renders with an optional color scheme.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    theme: Option<&'a Theme>,
}

impl<'a> Renderer<'a> {
    #[must_use]
    pub const fn plain() -> Self {
        Self { theme: None }
    }

    #[must_use]
    pub const fn themed(theme: &'a Theme) -> Self {
        Self { theme: Some(theme) }
    }

    fn paint(&self, text: &str, color: impl Fn(&ThemeColors) -> &str) -> String {
        match self.theme {
            Some(theme) => format!("{}{text}{}", Theme::fg(color(&theme.colors)), Theme::reset()),
            None => text.to_string(),
        }
    }

    fn heading(&self, text: &str) -> String {
        match self.theme {
            Some(theme) => format!(
                "{}{}{text}{}",
                Theme::bold(),
                Theme::fg(&theme.colors.heading),
                Theme::reset()
            ),
            None => text.to_string(),
        }
    }

    fn dim(&self, text: &str) -> String {
        self.paint(text, |c| &c.dim)
    }

    /// Renders `text` with the character ranges `(start, end)` highlighted.
    ///
    /// Ranges are character indices, end exclusive, sorted and disjoint.
    #[must_use]
    pub fn highlighted(&self, text: &str, ranges: &[(usize, usize)]) -> String {
        let Some(theme) = self.theme else {
            return text.to_string();
        };
        if ranges.is_empty() {
            return text.to_string();
        }

        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len() * 2);
        let mut cursor = 0;
        for &(start, end) in ranges {
            let start = start.min(chars.len());
            let end = end.min(chars.len());
            if start < cursor || start >= end {
                continue;
            }
            out.extend(&chars[cursor..start]);
            out.push_str(&Theme::fg(&theme.colors.match_fg));
            out.push_str(&Theme::bg(&theme.colors.match_bg));
            out.extend(&chars[start..end]);
            out.push_str(Theme::reset());
            cursor = end;
        }
        out.extend(&chars[cursor..]);
        out
    }

    /// Renders the pagination bar, e.g. `< Prev  1 2 … [10] 11 12 … 20  Next >`.
    #[must_use]
    pub fn pagination(&self, view: &PaginationView) -> String {
        let buttons: Vec<String> = view
            .buttons
            .iter()
            .map(|button| match button.item {
                PageItem::Ellipsis => "…".to_string(),
                PageItem::Page(page) if button.is_current => {
                    self.paint(&format!("[{page}]"), |c| &c.accent)
                }
                PageItem::Page(page) => page.to_string(),
            })
            .collect();

        let mut parts = Vec::with_capacity(3);
        if view.has_previous {
            parts.push("< Prev".to_string());
        }
        parts.push(buttons.join(" "));
        if view.has_next {
            parts.push("Next >".to_string());
        }
        parts.join("  ")
    }

    /// Renders a paged list screen.
    #[must_use]
    pub fn list(&self, vm: &ListViewModel) -> String {
        let mut lines = vec![self.heading(vm.header.title.trim())];

        let search = &vm.search_bar;
        if !search.input.is_empty() || !search.committed.is_empty() {
            let pending = if search.is_dirty() { " (searching…)" } else { "" };
            lines.push(self.dim(&format!("Search: {}{pending}", search.input)));
        }

        if let Some(error) = &vm.error {
            lines.push(self.paint(error, |c| &c.error));
        } else if vm.loading && vm.display_items.is_empty() {
            lines.push(self.dim("Loading…"));
        }

        if let Some(empty) = &vm.empty_state {
            lines.push(empty.message.clone());
            if !empty.subtitle.is_empty() {
                lines.push(self.dim(&empty.subtitle));
            }
        }

        for item in &vm.display_items {
            let mut line = format!("  {}", self.highlighted(&item.title, &item.highlight_ranges));
            if let Some(subtitle) = &item.subtitle {
                line.push_str(&format!("  {}", self.dim(subtitle)));
            }
            line.push_str(&format!("  {}", self.dim(&format!("({})", item.id))));
            lines.push(line);
        }

        if let Some(pagination) = &vm.pagination {
            lines.push(String::new());
            lines.push(self.pagination(pagination));
        }
        lines.join("\n")
    }

    #[must_use]
    pub fn notifications(&self, notifications: &[Notification]) -> String {
        notifications
            .iter()
            .map(|n| match n.level {
                NotificationLevel::Success => self.paint(&format!("✓ {}", n.message), |c| &c.success),
                NotificationLevel::Error => self.paint(&format!("✗ {}", n.message), |c| &c.error),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[must_use]
    pub fn course(&self, course: &CourseDetails) -> String {
        let mut lines = vec![self.heading(&course.name)];
        if !course.description.trim().is_empty() {
            lines.push(course.description.clone());
        }
        lines.push(String::new());
        if course.teachers.is_empty() {
            lines.push(self.dim("No teachers assigned"));
        } else {
            lines.push(self.heading("Teachers"));
            for teacher in &course.teachers {
                lines.push(format!(
                    "  {}  {}  {}",
                    teacher.name,
                    self.dim(&teacher.title),
                    self.dim(&format!("({})", teacher.id))
                ));
            }
        }
        lines.join("\n")
    }

    #[must_use]
    pub fn teacher(&self, teacher: &Teacher) -> String {
        let mut lines = vec![self.heading(&teacher.name)];
        for (label, value) in [
            ("Title", &teacher.title),
            ("Email", &teacher.email),
            ("Department", &teacher.department),
            ("Specialization", &teacher.specialization),
            ("Status", &teacher.onboard_status),
        ] {
            if !value.trim().is_empty() {
                lines.push(format!("{}: {value}", self.dim(label)));
            }
        }
        if !teacher.overview.trim().is_empty() {
            lines.push(String::new());
            lines.push(teacher.overview.clone());
        }
        if !teacher.courses_taught.is_empty() {
            lines.push(String::new());
            lines.push(self.heading("Courses"));
            let links = teacher.course_links();
            for (index, name) in teacher.courses_taught.iter().enumerate() {
                match links.get(index) {
                    Some((_, id)) => lines.push(format!("  {name}  {}", self.dim(&format!("({id})")))),
                    None => lines.push(format!("  {name}")),
                }
            }
        }
        lines.join("\n")
    }

    fn post_line(&self, post: &Post) -> String {
        let author = if post.anonymous { "Anonymous" } else { &post.author };
        format!(
            "{}  ▲{} ▼{}  {}",
            self.heading(&post.title),
            post.upvotes,
            post.downvotes,
            self.dim(&format!("by {author} on {} ({})", post.created_label(), post.id))
        )
    }

    #[must_use]
    pub fn posts(&self, posts: &[Post]) -> String {
        if posts.is_empty() {
            return "No posts yet".to_string();
        }
        posts
            .iter()
            .map(|post| self.post_line(post))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Renders a post with its comment thread.
    #[must_use]
    pub fn post(&self, post: &Post, comments: &[Comment]) -> String {
        let mut lines = vec![self.post_line(post), String::new(), post.content.clone()];
        lines.push(String::new());
        lines.push(self.heading(&format!("Comments ({})", comments.len())));
        for comment in comments {
            lines.push(format!("  {}: {}", self.dim(comment.display_author()), comment.text));
        }
        lines.join("\n")
    }

    #[must_use]
    pub fn profile(&self, profile: &UserProfile) -> String {
        let mut lines = vec![self.heading(&profile.full_name())];
        lines.push(format!("{}: {}", self.dim("Email"), profile.email));
        if let Some(erp) = profile.erp {
            lines.push(format!("{}: {erp}", self.dim("ERP")));
        }
        if !profile.roles.is_empty() {
            let roles: Vec<&str> = profile.roles.iter().map(|r| r.as_str()).collect();
            lines.push(format!("{}: {}", self.dim("Roles"), roles.join(", ")));
        }
        lines.join("\n")
    }
}

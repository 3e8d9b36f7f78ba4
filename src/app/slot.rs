//! Request slots: the three-state lifecycle of a remote query and the
//! sequencing that keeps superseded replies from overwriting newer ones.
//!
//! Every logical query target (the course list, the open post, ...) is a slot.
//! Issuing a request bumps the slot's sequence number and hands out a
//! [`Ticket`]; a reply is applied only if its ticket is the slot's latest and
//! was issued under the current session epoch. Network calls are never
//! cancelled; stale replies are dropped when they arrive.
//!
//! # Example
//!
//! ```rust
//! use campus_portal::app::slot::{ListResult, ListQuery, SlotId, RequestStatus};
//!
//! let mut courses: ListResult<String> = ListResult::new(ListQuery::new(9));
//! let first = courses.issue(SlotId::Courses, 0);
//! let second = courses.issue(SlotId::Courses, 0);
//!
//! assert!(!courses.accepts(&first, 0));
//! assert!(courses.accepts(&second, 0));
//! assert_eq!(courses.status, RequestStatus::Pending);
//! ```

use serde::{Deserialize, Serialize};

/// Identifies one logical query target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotId {
    /// Login and identity refresh.
    Session,
    Registration,
    Profile,
    Courses,
    CourseDetails,
    Teachers,
    TeacherDetails,
    /// Teacher create/update/delete.
    TeacherForm,
    Posts,
    PostDetails,
    Comments,
    /// Post create/vote/delete and comment submission.
    PostMutation,
}

/// Issue-order tag carried by a request and echoed by its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket {
    pub slot: SlotId,
    /// Per-slot sequence number, starting at 1.
    pub seq: u64,
    /// Session epoch at issue time.
    pub epoch: u64,
}

/// Lifecycle of the most recent request in a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Rejected,
}

/// Per-slot issue counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Sequence {
    issued: u64,
}

impl Sequence {
    fn next(&mut self, slot: SlotId, epoch: u64) -> Ticket {
        self.issued += 1;
        Ticket {
            slot,
            seq: self.issued,
            epoch,
        }
    }

    const fn accepts(self, ticket: &Ticket, epoch: u64) -> bool {
        ticket.seq == self.issued && ticket.epoch == epoch
    }

    /// Burns a sequence number so no outstanding ticket matches.
    fn invalidate(&mut self) {
        self.issued += 1;
    }
}

/// Parameters of a paged, searchable list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// 1-based page number.
    pub page: u32,
    /// Items per page, at least 1.
    pub limit: u32,
    /// Committed search term; empty means no filter.
    pub search: String,
}

impl ListQuery {
    /// First page, no filter.
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            search: String::new(),
        }
    }
}

/// State of a paged list slot.
///
/// `items` and `total_pages` only ever reflect the latest accepted successful
/// reply; a failure leaves them as they were.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListResult<T> {
    pub status: RequestStatus,
    pub items: Vec<T>,
    /// Known page count, at least 1.
    pub total_pages: u32,
    pub error: Option<String>,
    /// Query the next fetch will use.
    pub query: ListQuery,
    /// Whether any reply has ever been applied.
    pub loaded: bool,
    sequence: Sequence,
}

impl<T> ListResult<T> {
    #[must_use]
    pub fn new(query: ListQuery) -> Self {
        Self {
            status: RequestStatus::Idle,
            items: Vec::new(),
            total_pages: 1,
            error: None,
            query,
            loaded: false,
            sequence: Sequence::default(),
        }
    }

    /// Marks the slot pending and returns the ticket for a new request.
    pub fn issue(&mut self, slot: SlotId, epoch: u64) -> Ticket {
        self.status = RequestStatus::Pending;
        self.error = None;
        self.sequence.next(slot, epoch)
    }

    /// Whether a reply carrying `ticket` may be applied.
    #[must_use]
    pub const fn accepts(&self, ticket: &Ticket, epoch: u64) -> bool {
        self.sequence.accepts(ticket, epoch)
    }

    /// Applies a successful page.
    ///
    /// Also clamps the query's page into the new page range. Returns `true`
    /// when it did, in which case `items` belong to a page the query no
    /// longer names and the caller must refetch.
    pub fn fulfill(&mut self, items: Vec<T>, total_pages: u32) -> bool {
        self.status = RequestStatus::Fulfilled;
        self.items = items;
        self.total_pages = total_pages.max(1);
        self.error = None;
        self.loaded = true;
        if self.query.page > self.total_pages {
            self.query.page = self.total_pages;
            return true;
        }
        false
    }

    /// Records a failure, keeping the previous items.
    pub fn reject(&mut self, message: impl Into<String>) {
        self.status = RequestStatus::Rejected;
        self.error = Some(message.into());
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Forgets loaded data and query. Requests still in flight become stale.
    pub fn reset(&mut self) {
        let limit = self.query.limit;
        self.sequence.invalidate();
        self.status = RequestStatus::Idle;
        self.items.clear();
        self.total_pages = 1;
        self.error = None;
        self.query = ListQuery::new(limit);
        self.loaded = false;
    }
}

/// State of a single-value slot (a details page, a form submission).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource<T> {
    pub status: RequestStatus,
    pub value: Option<T>,
    pub error: Option<String>,
    sequence: Sequence,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self {
            status: RequestStatus::Idle,
            value: None,
            error: None,
            sequence: Sequence::default(),
        }
    }
}

impl<T> Resource<T> {
    /// Marks the slot pending and returns the ticket for a new request.
    ///
    /// With `clear` the previous value is dropped, as when a details page
    /// switches to a different record.
    pub fn issue(&mut self, slot: SlotId, epoch: u64, clear: bool) -> Ticket {
        self.status = RequestStatus::Pending;
        self.error = None;
        if clear {
            self.value = None;
        }
        self.sequence.next(slot, epoch)
    }

    #[must_use]
    pub const fn accepts(&self, ticket: &Ticket, epoch: u64) -> bool {
        self.sequence.accepts(ticket, epoch)
    }

    pub fn fulfill(&mut self, value: T) {
        self.status = RequestStatus::Fulfilled;
        self.value = Some(value);
        self.error = None;
    }

    /// Marks the request fulfilled without replacing the value.
    pub fn settle(&mut self) {
        self.status = RequestStatus::Fulfilled;
        self.error = None;
    }

    pub fn reject(&mut self, message: impl Into<String>) {
        self.status = RequestStatus::Rejected;
        self.error = Some(message.into());
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Forgets value and status. Requests still in flight become stale.
    pub fn reset(&mut self) {
        self.sequence.invalidate();
        self.status = RequestStatus::Idle;
        self.value = None;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_issue_wins_regardless_of_settlement_order() {
        let mut slot: ListResult<&str> = ListResult::new(ListQuery::new(9));
        let x = slot.issue(SlotId::Courses, 0);
        let y = slot.issue(SlotId::Courses, 0);

        assert!(slot.accepts(&y, 0));
        slot.fulfill(vec!["y"], 1);

        assert!(!slot.accepts(&x, 0), "stale reply must be dropped");
        assert_eq!(slot.items, vec!["y"]);
    }

    #[test]
    fn reply_from_previous_epoch_is_stale() {
        let mut post: Resource<u8> = Resource::default();
        let ticket = post.issue(SlotId::PostDetails, 3, true);
        assert!(post.accepts(&ticket, 3));
        assert!(!post.accepts(&ticket, 4));
    }

    #[test]
    fn failure_keeps_previous_items() {
        let mut slot: ListResult<u8> = ListResult::new(ListQuery::new(2));
        slot.issue(SlotId::Teachers, 0);
        slot.fulfill(vec![1, 2], 5);
        slot.issue(SlotId::Teachers, 0);
        slot.reject("boom");

        assert_eq!(slot.status, RequestStatus::Rejected);
        assert_eq!(slot.items, vec![1, 2]);
        assert_eq!(slot.total_pages, 5);
        assert_eq!(slot.error.as_deref(), Some("boom"));
    }

    #[test]
    fn page_is_clamped_to_new_total() {
        let mut slot: ListResult<u8> = ListResult::new(ListQuery::new(2));
        slot.query.page = 7;
        slot.issue(SlotId::Courses, 0);
        assert!(slot.fulfill(vec![], 0));
        assert_eq!(slot.total_pages, 1);
        assert_eq!(slot.query.page, 1);
        assert!(!slot.fulfill(vec![3], 1));
    }

    #[test]
    fn reset_makes_in_flight_requests_stale() {
        let mut slot: ListResult<u8> = ListResult::new(ListQuery::new(2));
        slot.query.search = "x".into();
        let old = slot.issue(SlotId::Courses, 0);
        slot.reset();

        assert_eq!(slot.status, RequestStatus::Idle);
        assert_eq!(slot.query, ListQuery::new(2));
        assert!(!slot.accepts(&old, 0));

        let new = slot.issue(SlotId::Courses, 0);
        assert!(new.seq > old.seq);
        assert!(slot.accepts(&new, 0));
    }

    #[test]
    fn resource_reset_drops_value() {
        let mut profile: Resource<&str> = Resource::default();
        let ticket = profile.issue(SlotId::Profile, 1, false);
        profile.fulfill("ada");
        profile.reset();
        assert_eq!(profile.value, None);
        assert!(!profile.accepts(&ticket, 1));
    }
}

//! Executes a [`RemoteCall`] against a [`Backend`].
//!
//! Runs on a spawned task. The issuing span's trace context is re-attached as
//! the parent of the call's own span, so a reducer event and the HTTP request
//! it caused end up in one trace.

use crate::domain::{PortalError, Result};
use crate::remote::backend::Backend;
use crate::remote::messages::{Failure, RemoteCall, RemoteData, RemoteReply, RemoteRequest, TraceContext};
use tracing::Instrument;

/// Rebuilds the remote parent context from a captured [`TraceContext`].
fn parent_context(trace_context: &TraceContext) -> Option<opentelemetry::Context> {
    use opentelemetry::trace::{
        SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState,
    };

    let trace_id = TraceId::from_hex(&trace_context.trace_id).ok()?;
    let span_id = SpanId::from_hex(&trace_context.parent_span_id).ok()?;

    let span_context = SpanContext::new(
        trace_id,
        span_id,
        TraceFlags::SAMPLED,
        true,
        TraceState::default(),
    );

    Some(opentelemetry::Context::new().with_remote_span_context(span_context))
}

/// Performs `call` and packages the outcome with the call's ticket.
///
/// `token` is the bearer token at issue time. Authenticated requests without
/// one fail as unauthorized without touching the network.
pub async fn execute(backend: &dyn Backend, token: Option<String>, call: RemoteCall) -> RemoteReply {
    use tracing_opentelemetry::OpenTelemetrySpanExt;

    let span = tracing::debug_span!(
        "remote_call",
        operation = call.request.name(),
        slot = ?call.ticket.slot,
        seq = call.ticket.seq,
        epoch = call.ticket.epoch,
    );
    if let Some(parent) = call.trace_context.as_ref().and_then(parent_context) {
        span.set_parent(parent);
    }

    let outcome = dispatch(backend, token.as_deref(), &call.request)
        .instrument(span.clone())
        .await;

    span.in_scope(|| match &outcome {
        Ok(_) => tracing::debug!("remote call succeeded"),
        Err(e) => tracing::debug!(error = %e, "remote call failed"),
    });

    RemoteReply {
        ticket: call.ticket,
        request: call.request,
        outcome: outcome.map_err(Failure::from),
    }
}

async fn dispatch(
    backend: &dyn Backend,
    token: Option<&str>,
    request: &RemoteRequest,
) -> Result<RemoteData> {
    let bearer = || token.ok_or_else(|| PortalError::Unauthorized("Not signed in".to_string()));

    match request {
        RemoteRequest::Login(credentials) => {
            backend.login(credentials).await.map(RemoteData::LoggedIn)
        }
        RemoteRequest::FetchIdentity => backend
            .fetch_identity(bearer()?)
            .await
            .map(RemoteData::Identity),
        RemoteRequest::Register(registration) => {
            let erp = registration.validate()?;
            backend
                .register(registration, erp)
                .await
                .map(|message| RemoteData::Registered { message })
        }
        RemoteRequest::FetchProfile => backend
            .fetch_identity(bearer()?)
            .await
            .map(RemoteData::Profile),
        RemoteRequest::UpdateProfile(update) => backend
            .update_profile(bearer()?, update)
            .await
            .map(|(profile, message)| RemoteData::ProfileUpdated { profile, message }),
        RemoteRequest::ListCourses(query) => backend
            .list_courses(bearer()?, query)
            .await
            .map(RemoteData::Courses),
        RemoteRequest::CourseDetails { id } => backend
            .course_details(bearer()?, id)
            .await
            .map(RemoteData::CourseDetails),
        RemoteRequest::ListTeachers(query) => backend
            .list_teachers(bearer()?, query)
            .await
            .map(RemoteData::Teachers),
        RemoteRequest::TeacherDetails { id } => {
            backend.teacher(bearer()?, id).await.map(RemoteData::Teacher)
        }
        RemoteRequest::CreateTeacher(draft) => backend
            .create_teacher(bearer()?, draft)
            .await
            .map(|()| RemoteData::TeacherSaved),
        RemoteRequest::UpdateTeacher { id, draft } => backend
            .update_teacher(bearer()?, id, draft)
            .await
            .map(|()| RemoteData::TeacherSaved),
        RemoteRequest::DeleteTeacher { id } => backend
            .delete_teacher(bearer()?, id)
            .await
            .map(|()| RemoteData::TeacherSaved),
        RemoteRequest::ListPosts => backend.list_posts(bearer()?).await.map(RemoteData::Posts),
        RemoteRequest::PostDetails { id } => {
            backend.post(bearer()?, id).await.map(RemoteData::Post)
        }
        RemoteRequest::CreatePost(draft) => backend
            .create_post(bearer()?, draft)
            .await
            .map(RemoteData::PostCreated),
        RemoteRequest::VotePost { post_id, vote } => backend
            .vote(bearer()?, post_id, *vote)
            .await
            .map(|()| RemoteData::Voted),
        RemoteRequest::DeletePost { post_id } => backend
            .delete_post(bearer()?, post_id)
            .await
            .map(|()| RemoteData::PostDeleted),
        RemoteRequest::PostComment(draft) => backend
            .post_comment(bearer()?, draft)
            .await
            .map(|()| RemoteData::CommentPosted),
        RemoteRequest::ListComments { post_id } => backend
            .comments(bearer()?, post_id)
            .await
            .map(RemoteData::Comments),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::slot::{ListQuery, SlotId, Ticket};
    use crate::domain::{CoursePage, Vote};
    use crate::remote::backend::MockBackend;
    use crate::remote::messages::FailureKind;
    use mockall::predicate::eq;

    fn ticket(slot: SlotId) -> Ticket {
        Ticket {
            slot,
            seq: 4,
            epoch: 2,
        }
    }

    #[tokio::test]
    async fn reply_echoes_ticket_and_request() {
        let mut backend = MockBackend::new();
        backend
            .expect_list_courses()
            .withf(|token, query| token == "tok" && query.search == "alg")
            .times(1)
            .returning(|_, _| {
                Ok(CoursePage {
                    courses: vec![],
                    total_courses: 0,
                    total_pages: 1,
                })
            });

        let mut query = ListQuery::new(9);
        query.search = "alg".into();
        let call = RemoteCall::list_courses(ticket(SlotId::Courses), query.clone());
        let reply = execute(&backend, Some("tok".into()), call).await;

        assert_eq!(reply.ticket, ticket(SlotId::Courses));
        assert_eq!(reply.request, RemoteRequest::ListCourses(query));
        assert!(matches!(reply.outcome, Ok(RemoteData::Courses(_))));
    }

    #[tokio::test]
    async fn missing_token_fails_without_network() {
        let backend = MockBackend::new();
        let call = RemoteCall::list_posts(ticket(SlotId::Posts));
        let reply = execute(&backend, None, call).await;

        let failure = reply.outcome.unwrap_err();
        assert_eq!(failure.kind, FailureKind::Unauthorized);
    }

    #[tokio::test]
    async fn backend_errors_become_failures() {
        let mut backend = MockBackend::new();
        backend
            .expect_vote()
            .with(eq("tok"), eq("p1"), eq(Vote::Down))
            .returning(|_, _, _| Err(PortalError::Network("status 500".into())));

        let call = RemoteCall::new(
            ticket(SlotId::PostMutation),
            RemoteRequest::VotePost {
                post_id: "p1".into(),
                vote: Vote::Down,
            },
        );
        let reply = execute(&backend, Some("tok".into()), call).await;

        let failure = reply.outcome.unwrap_err();
        assert_eq!(failure.kind, FailureKind::Network);
        assert_eq!(failure.message, "status 500");
    }

    #[test]
    fn malformed_trace_context_is_ignored() {
        let ctx = TraceContext {
            trace_id: "not-hex".into(),
            parent_span_id: "00f067aa0ba902b7".into(),
        };
        assert!(parent_context(&ctx).is_none());
    }
}

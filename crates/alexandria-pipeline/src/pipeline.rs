//! The fixed-order request pipeline.
//!
//! [`Pipeline::dispatch`] executes the canonical lifecycle for every GET
//! and POST request, identically for all services. The order is fixed and
//! cannot be modified by services:
//!
//! | Phase | Action |
//! |---|---|
//! | ENTER | ensure a session exists (create lazily, never replace) |
//! | PRE | service `pre` hook |
//! | MUTATE | service `mutate` hook, mutating requests only |
//! | GATE | evaluate the acceptance gate, exactly once |
//! | PAGE | page hooks interleaved with header/content/footer renders |
//! | REJECTED | service `rejected` hook |
//! | POST | service `post` hook |
//!
//! MUTATE runs **before** GATE and before any page hook: a borrow action's
//! side effect is committed before any data is fetched for display, so the
//! page hooks observe post-mutation state.

use crate::exchange::{Exchange, ServiceRequest};
use crate::gate::AcceptGate;
use crate::hooks::ServiceHooks;
use crate::render::{FragmentRenderer, RenderError};
use alexandria_core::{Response, Session, SessionId, SessionStore};
use std::sync::Arc;
use thiserror::Error;

/// Fragment rendered before every service's content fragment.
pub const HEADER_FRAGMENT: &str = "modules/header";

/// Fragment rendered after every service's content fragment.
pub const FOOTER_FRAGMENT: &str = "modules/footer";

/// The phases of the pipeline, in execution order.
///
/// Phases are not persisted anywhere; they exist for logging and for
/// reasoning about the ordering guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Phase {
    /// Session creation.
    Enter = 1,
    /// Service `pre` hook.
    Pre = 2,
    /// Service `mutate` hook (mutating requests only).
    Mutate = 3,
    /// Acceptance gate evaluation.
    Gate = 4,
    /// Page hooks and fragment assembly.
    Page = 5,
    /// Rejection hook.
    Rejected = 6,
    /// Service `post` hook.
    Post = 7,
}

impl Phase {
    /// Returns the phase name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Pre => "pre",
            Self::Mutate => "mutate",
            Self::Gate => "gate",
            Self::Page => "page",
            Self::Rejected => "rejected",
            Self::Post => "post",
        }
    }
}

/// Errors that abort a dispatch.
///
/// Anything here is an unhandled fault for the request: the hosting layer
/// must answer with a generic server error. Hook failures never appear
/// here; hooks degrade to messages, redirects or error statuses on the
/// response instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// A fragment failed to render.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A completed dispatch: the response plus the session it ran under.
///
/// The hosting layer compares the session against the inbound cookie to
/// decide whether a `Set-Cookie` is needed.
#[derive(Debug)]
pub struct Dispatched {
    /// The assembled HTTP response.
    pub response: Response,

    /// The session the request ran under (created if absent).
    pub session: Arc<Session>,
}

/// Executes the request lifecycle for every service.
///
/// One pipeline instance serves the whole application; per-request state
/// lives in the [`Exchange`], never in the pipeline.
pub struct Pipeline {
    renderer: Arc<dyn FragmentRenderer>,
    sessions: Arc<SessionStore>,
}

impl Pipeline {
    /// Creates a pipeline over `renderer` and `sessions`.
    #[must_use]
    pub fn new(renderer: Arc<dyn FragmentRenderer>, sessions: Arc<SessionStore>) -> Self {
        Self { renderer, sessions }
    }

    /// Returns the session store.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Runs one request through the full lifecycle.
    ///
    /// Hooks run synchronously to completion in a fixed order; exactly one
    /// of the PAGE and REJECTED phases executes, and the `pre`/`post`
    /// hooks run exactly once each.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] only for unhandled faults (rendering
    /// failures). Everything a hook can recover from is reflected in the
    /// response instead.
    pub fn dispatch(
        &self,
        service: &dyn ServiceHooks,
        gate: &dyn AcceptGate,
        request: ServiceRequest,
        session_id: Option<SessionId>,
    ) -> Result<Dispatched, PipelineError> {
        let session = self.sessions.get_or_create(session_id);
        let mutating = request.is_mutation();
        let mut ex = Exchange::new(request, Arc::clone(&session));

        let request_id = ex.context.request_id();
        tracing::debug!(
            %request_id,
            service = service.name(),
            method = %ex.request().method(),
            path = ex.request().path(),
            "dispatching request"
        );

        self.trace(request_id, service, Phase::Pre);
        service.pre(&mut ex);

        if mutating {
            self.trace(request_id, service, Phase::Mutate);
            service.mutate(&mut ex);
        }

        self.trace(request_id, service, Phase::Gate);
        if gate.accept(&ex) {
            self.trace(request_id, service, Phase::Page);
            service.pre_page(&mut ex);
            self.render(HEADER_FRAGMENT, &mut ex)?;
            service.pre_content(&mut ex);
            self.render(service.fragment(), &mut ex)?;
            service.post_content(&mut ex);
            self.render(FOOTER_FRAGMENT, &mut ex)?;
            service.post_page(&mut ex);
        } else {
            self.trace(request_id, service, Phase::Rejected);
            service.rejected(&mut ex);
        }

        self.trace(request_id, service, Phase::Post);
        service.post(&mut ex);

        tracing::debug!(
            %request_id,
            service = service.name(),
            status = %ex.response.status(),
            elapsed = ?ex.context.elapsed(),
            "request complete"
        );

        Ok(Dispatched {
            response: ex.into_response(),
            session,
        })
    }

    fn render(&self, fragment: &str, ex: &mut Exchange) -> Result<(), PipelineError> {
        let html = self.renderer.render(fragment, &ex.context)?;
        ex.response.push_fragment(html);
        Ok(())
    }

    fn trace(&self, request_id: alexandria_core::RequestId, service: &dyn ServiceHooks, phase: Phase) {
        tracing::trace!(%request_id, service = service.name(), phase = phase.name(), "phase");
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("sessions", &self.sessions.len())
            .finish()
    }
}

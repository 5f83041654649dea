//! # Alexandria Pipeline
//!
//! The request-processing pipeline at the heart of Alexandria.
//!
//! Every inbound request flows through the same lifecycle, regardless of
//! which service handles it:
//!
//! ```text
//! ENTER ─ ensure session ─▶ PRE ─▶ [MUTATE, POST only] ─▶ GATE ─┬▶ PAGE ─▶ POST
//!                                                               └▶ REJECTED ─▶ POST
//! ```
//!
//! Services implement the [`ServiceHooks`] capability set; the acceptance
//! decision is an injected [`AcceptGate`] predicate; page bodies are
//! assembled from three fragments through the [`FragmentRenderer`]
//! contract. The [`Pipeline`] owns the ordering guarantees:
//!
//! - PRE and POST run exactly once per request;
//! - MUTATE runs at most once, only for mutating requests, and always
//!   **before** the gate, so page hooks observe post-mutation state;
//! - exactly one of PAGE or REJECTED runs per request.

#![doc(html_root_url = "https://docs.rs/alexandria-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod exchange;
mod gate;
mod hooks;
mod pipeline;
mod render;

pub use exchange::{Exchange, ServiceRequest};
pub use gate::{AcceptAll, AcceptGate, GateFn, SignedInGate};
pub use hooks::ServiceHooks;
pub use pipeline::{Dispatched, Phase, Pipeline, PipelineError, FOOTER_FRAGMENT, HEADER_FRAGMENT};
pub use render::{FragmentRenderer, HtmlFragments, RenderError};

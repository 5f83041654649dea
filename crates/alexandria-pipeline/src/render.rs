//! The rendering contract.
//!
//! The pipeline does not render anything itself; it hands the request
//! context to a [`FragmentRenderer`] three times per accepted request
//! (header, service content, footer). Template syntax is a renderer
//! concern and stays outside this crate.

use alexandria_core::RequestContext;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from fragment rendering.
///
/// A render error is an unhandled fault for the current request: the
/// hosting layer surfaces it as a server error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    /// No template is registered under the requested fragment identifier.
    #[error("unknown fragment '{name}'")]
    UnknownFragment {
        /// The fragment identifier that failed to resolve.
        name: String,
    },

    /// The template itself failed.
    #[error("failed to render fragment '{name}': {message}")]
    Failed {
        /// The fragment identifier.
        name: String,
        /// What went wrong.
        message: String,
    },
}

/// Renders one fragment from the request context.
pub trait FragmentRenderer: Send + Sync {
    /// Renders the fragment named `fragment` against `context`.
    fn render(&self, fragment: &str, context: &RequestContext) -> Result<String, RenderError>;
}

type FragmentFn = Box<dyn Fn(&RequestContext) -> String + Send + Sync>;

/// A fragment registry backed by plain closures.
///
/// Enough of a renderer for the built-in pages and for tests; a real
/// template engine can replace it behind the same trait.
///
/// # Example
///
/// ```
/// use alexandria_pipeline::{FragmentRenderer, HtmlFragments};
/// use alexandria_core::{attr, RequestContext, Session};
/// use std::sync::Arc;
///
/// let fragments = HtmlFragments::new()
///     .with("greeting", |ctx| {
///         format!("<p>{}</p>", ctx.attr_str(attr::MESSAGE).unwrap_or("hello"))
///     });
///
/// let ctx = RequestContext::new(Arc::new(Session::new()));
/// assert_eq!(fragments.render("greeting", &ctx).unwrap(), "<p>hello</p>");
/// ```
#[derive(Default)]
pub struct HtmlFragments {
    templates: HashMap<String, FragmentFn>,
}

impl HtmlFragments {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fragment, consuming and returning the registry.
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, template: F) -> Self
    where
        F: Fn(&RequestContext) -> String + Send + Sync + 'static,
    {
        self.register(name, template);
        self
    }

    /// Registers a fragment, replacing any previous one of the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, template: F)
    where
        F: Fn(&RequestContext) -> String + Send + Sync + 'static,
    {
        self.templates.insert(name.into(), Box::new(template));
    }

    /// Returns the number of registered fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns `true` if no fragments are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl std::fmt::Debug for HtmlFragments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlFragments")
            .field("templates", &self.templates.len())
            .finish()
    }
}

impl FragmentRenderer for HtmlFragments {
    fn render(&self, fragment: &str, context: &RequestContext) -> Result<String, RenderError> {
        let template = self
            .templates
            .get(fragment)
            .ok_or_else(|| RenderError::UnknownFragment {
                name: fragment.to_string(),
            })?;
        Ok(template(context))
    }
}

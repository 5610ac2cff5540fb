//! Request context
//!
//! A [`Context`] travels with a request. It carries the ordered log
//! attribute list, the fields injected by RPC middleware, a cancellation
//! token and an optional deadline.
//!
//! Contexts are immutable: every `with_*` call returns a child that shares
//! the parent's other bindings, and the parent keeps seeing exactly what it
//! saw before. Attribute lists are append-only and never deduplicated.
//!
//! ## Example
//!
//! ```ignore
//! use webmods_domain::Attr;
//! use webmods_infrastructure::context::Context;
//!
//! let ctx = Context::background().with_attrs([Attr::string("user_id", "u1")]);
//! ctx.clone().scope(async {
//!     tracing::info!("handled"); // carries user_id
//! }).await;
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use webmods_domain::error::{Error, Result};
use webmods_domain::value_objects::Attr;

tokio::task_local! {
    static CURRENT: Context;
}

#[derive(Default)]
struct Inner {
    attrs: Vec<Attr>,
    fields: Vec<Attr>,
    token: CancellationToken,
    deadline: Option<Instant>,
}

/// Cheap-to-clone request context
#[derive(Clone, Default)]
pub struct Context {
    inner: Arc<Inner>,
}

impl Context {
    /// Root context: no attributes, never cancelled unless its token is
    pub fn background() -> Self {
        Self::default()
    }

    /// The context installed for the running task, or a fresh root
    pub fn current() -> Self {
        Self::try_current().unwrap_or_default()
    }

    /// The context installed for the running task, if any
    pub fn try_current() -> Option<Self> {
        CURRENT.try_with(Clone::clone).ok()
    }

    /// Run `fut` with this context installed as the current one
    pub async fn scope<F: Future>(self, fut: F) -> F::Output {
        CURRENT.scope(self, fut).await
    }

    /// Run `f` with this context installed as the current one
    pub fn sync_scope<R>(self, f: impl FnOnce() -> R) -> R {
        CURRENT.sync_scope(self, f)
    }

    fn derive(&self, f: impl FnOnce(&mut Inner)) -> Self {
        let mut inner = Inner {
            attrs: self.inner.attrs.clone(),
            fields: self.inner.fields.clone(),
            token: self.inner.token.clone(),
            deadline: self.inner.deadline,
        };
        f(&mut inner);
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Child context whose attribute list is this one's followed by `attrs`
    pub fn with_attrs<I>(&self, attrs: I) -> Self
    where
        I: IntoIterator<Item = Attr>,
    {
        self.derive(|inner| inner.attrs.extend(attrs))
    }

    /// Attributes in the order they were appended
    pub fn attrs(&self) -> &[Attr] {
        &self.inner.attrs
    }

    /// Child context with middleware-injected fields appended
    ///
    /// Fields are emitted after attributes, so they win when a log backend
    /// collapses duplicate keys.
    pub fn with_fields<I>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = Attr>,
    {
        self.derive(|inner| inner.fields.extend(fields))
    }

    /// Middleware-injected fields in the order they were appended
    pub fn fields(&self) -> &[Attr] {
        &self.inner.fields
    }

    /// Child context with its own cancellation token
    ///
    /// Cancelling the returned token cancels the child and its descendants;
    /// cancelling this context still cancels the child.
    pub fn with_cancel(&self) -> (Self, CancellationToken) {
        let token = self.inner.token.child_token();
        let ctx = self.derive(|inner| inner.token = token.clone());
        (ctx, token)
    }

    /// Child context that expires after `timeout`
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Child context that expires at `deadline`; an earlier parent deadline wins
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        self.derive(|inner| {
            inner.deadline = Some(inner.deadline.map_or(deadline, |d| d.min(deadline)));
        })
    }

    /// Deadline carried by this context
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Token observed by this context
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.inner.token
    }

    /// Whether this context has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Wait until this context is cancelled
    pub async fn cancelled(&self) {
        self.inner.token.cancelled().await;
    }

    /// Why this context is done, if it is
    pub fn err(&self) -> Option<Error> {
        if self.is_cancelled() {
            Some(Error::Cancelled)
        } else if self.inner.deadline.is_some_and(|d| Instant::now() >= d) {
            Some(Error::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Drive `fut` unless the context is cancelled or its deadline passes first
    ///
    /// # Errors
    ///
    /// [`Error::Cancelled`] or [`Error::DeadlineExceeded`] when the context
    /// ends first; otherwise whatever `fut` returns.
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }

        let deadline = async {
            match self.inner.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = self.inner.token.cancelled() => Err(Error::Cancelled),
            () = deadline => Err(Error::DeadlineExceeded),
            result = fut => result,
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("attrs", &self.inner.attrs)
            .field("fields", &self.inner.fields)
            .field("cancelled", &self.is_cancelled())
            .field("deadline", &self.inner.deadline)
            .finish()
    }
}

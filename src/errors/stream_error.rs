use std::{any::Any, error::Error, fmt, sync::Arc};

/// An error delivered through a stream's terminal error notification.
///
/// The original error is kept behind an `Arc` so every observer in a pipeline
/// sees the very same value. Its kind is the short type name of the error that
/// was wrapped (`ParseIntError`, `Error` for `std::io::Error`, ...) and its
/// message is the error's `Display` output.
#[derive(Clone)]
pub struct StreamError {
    kind: &'static str,
    inner: Arc<dyn Error + Send + Sync>,
}

impl StreamError {
    /// Wraps `error`, recording its type name as the error kind.
    ///
    /// Wrapping a `StreamError` again returns a clone of it instead of nesting.
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        if let Some(existing) = (&error as &dyn Any).downcast_ref::<StreamError>() {
            return existing.clone();
        }
        StreamError {
            kind: short_type_name::<E>(),
            inner: Arc::new(error),
        }
    }

    /// Wraps an already shared error under an explicit kind.
    pub fn from_arc(kind: &'static str, error: Arc<dyn Error + Send + Sync>) -> Self {
        StreamError { kind, inner: error }
    }

    /// Short type name of the wrapped error.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The wrapped error's message.
    #[must_use]
    pub fn message(&self) -> String {
        self.inner.to_string()
    }

    /// Borrow the wrapped error.
    #[must_use]
    pub fn get_ref(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    /// Attempts to view the wrapped error as a concrete type.
    #[must_use]
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    /// Returns `true` if both handles point at the same original error.
    #[must_use]
    pub fn same_as(&self, other: &StreamError) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamError")
            .field("kind", &self.kind)
            .field("error", &self.inner)
            .finish()
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl Error for StreamError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

/// Last path segment of a type name with generic arguments stripped.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

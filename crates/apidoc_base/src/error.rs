use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use tracing_error::SpanTrace;

/* 📖 # Why a custom error type and not use anyhow/eyre/thiserror etc?

- Better control over error handling
- No dependencies to compile and integrate beyond tracing-error
- The extractor needs to tell failure categories apart (closure handler, missing type,
  anything else) without downcasting, so the categories live in ErrorKind
 */

/// Error variants that can occur in apidoc operations.
/// Each variant represents a specific error category with its associated context.
#[derive(Debug)]
pub enum ErrorKind {
    /// File system operation failed
    FileError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The route handler is a closure and cannot be introspected
    UnsupportedHandler { handler: String },

    /// A path parameter matched a handler argument that declares no type
    MissingType { parameter: String },

    /// Catch-all for other errors with a message
    Message { message: String },
}

/* 📖 # Why separate ErrorKind and ApidocError?
ErrorKind holds the structural variant that callers match on. ApidocError wraps it with
context strings attached during propagation and the span trace captured at creation,
so the log shows which route was being processed when something failed.
*/

/// Error type wrapping ErrorKind with context and a captured span trace.
#[derive(Debug)]
pub struct ApidocError {
    kind: ErrorKind,
    context: Vec<String>,
    span_trace: SpanTrace,
}

impl ApidocError {
    /// Creates a new error from an ErrorKind, capturing the current span trace.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: vec![],
            span_trace: SpanTrace::capture(),
        }
    }

    /// Creates a `Message` error.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message {
            message: message.into(),
        })
    }

    /// Attaches context to an error.
    /// Context is displayed before the error message.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Attaches context using lazy evaluation.
    pub fn with_context<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.context.push(f());
        self
    }

    /// Returns a reference to the underlying ErrorKind.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the context strings in the order they were attached.
    pub fn get_context(&self) -> &[String] {
        &self.context
    }

    /// Returns the span trace captured when the error was created.
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }
}

impl From<ErrorKind> for ApidocError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl StdError for ApidocError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::FileError { source, .. } => Some(source),
            ErrorKind::UnsupportedHandler { .. }
            | ErrorKind::MissingType { .. }
            | ErrorKind::Message { .. } => None,
        }
    }
}

impl fmt::Display for ApidocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ctx) in self.context.iter().enumerate() {
            if i == 0 {
                write!(f, "{}", ctx)?;
            } else {
                write!(f, ": {}", ctx)?;
            }
        }

        if !self.context.is_empty() {
            write!(f, ": ")?;
        }

        match &self.kind {
            ErrorKind::FileError { path, source } => {
                write!(f, "File error at {}: {}", path.display(), source)
            }
            ErrorKind::UnsupportedHandler { handler } => {
                write!(
                    f,
                    "Closure handlers are not supported, use a class method instead ({})",
                    handler
                )
            }
            ErrorKind::MissingType { parameter } => {
                write!(f, "No type specified for parameter `{}`", parameter)
            }
            ErrorKind::Message { message } => {
                write!(f, "{}", message)
            }
        }
    }
}

/// Standard result type for apidoc operations.
pub type ApidocResult<T> = std::result::Result<T, Box<ApidocError>>;

/// Extension trait for attaching context to Results.
pub trait ResultExt<T> {
    /// Attaches context to an error, consuming and re-wrapping it.
    fn context(self, context: impl Into<String>) -> ApidocResult<T>;

    /// Attaches context using lazy evaluation.
    /// Context is only evaluated if the result is an error.
    fn with_context<F>(self, f: F) -> ApidocResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for ApidocResult<T> {
    fn context(self, context: impl Into<String>) -> ApidocResult<T> {
        self.map_err(|err| Box::new(err.context(context)))
    }

    fn with_context<F>(self, f: F) -> ApidocResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| Box::new(err.with_context(f)))
    }
}

/// Creates a boxed `Message` error from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        Box::new($crate::ApidocError::message(format!($($arg)*)))
    };
}

/// Returns early with a boxed `Message` error.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::err!($($arg)*))
    };
}

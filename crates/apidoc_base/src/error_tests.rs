/* 📖 # Why use a separate file for these error tests?

Some of these tests inspect captured span traces, which embed source locations.
Keeping them out of error.rs means edits to the error module do not shift what they observe.
*/

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::{ApidocError, ApidocResult, ResultExt};
    use std::error::Error;
    use std::io;
    use std::path::PathBuf;
    use tracing::warn_span;
    use tracing_error::ErrorLayer;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    /// Set up tracing with ErrorLayer for tests.
    /// Uses `try_init()` to handle multiple tests running concurrently.
    fn setup_tracing_subscriber() {
        let _ = tracing_subscriber::registry()
            .with(ErrorLayer::default())
            .try_init();
    }

    #[test]
    fn test_error_from_file_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let path = PathBuf::from("index.md");
        let error = ApidocError::new(ErrorKind::FileError {
            path: path.clone(),
            source: io_err,
        });

        match error.kind() {
            ErrorKind::FileError { path: p, .. } => assert_eq!(p, &path),
            _ => panic!("Expected FileError variant"),
        }
    }

    #[test]
    fn test_error_message_constructor() {
        let error = ApidocError::message("something went wrong");
        match error.kind() {
            ErrorKind::Message { message } => assert_eq!(message, "something went wrong"),
            _ => panic!("Expected Message variant"),
        }
    }

    #[test]
    fn test_error_context_attachment() {
        let error = ApidocError::message("original error")
            .context("first context")
            .context("second context");

        assert_eq!(error.get_context().len(), 2);
        assert_eq!(error.get_context()[0], "first context");
        assert_eq!(error.get_context()[1], "second context");
    }

    #[test]
    fn test_error_with_context_lazy_evaluation() {
        let mut called = false;
        let error = ApidocError::message("error").with_context(|| {
            called = true;
            "lazy context".to_string()
        });

        assert!(called);
        assert_eq!(error.get_context()[0], "lazy context");
    }

    #[test]
    fn test_error_display_with_multiple_contexts() {
        let error = ApidocError::message("root error")
            .context("first")
            .context("second")
            .context("third");
        assert_eq!(error.to_string(), "first: second: third: root error");
    }

    #[test]
    fn test_error_display_unsupported_handler() {
        let error = ApidocError::new(ErrorKind::UnsupportedHandler {
            handler: "Closure".to_string(),
        });
        assert_eq!(
            error.to_string(),
            "Closure handlers are not supported, use a class method instead (Closure)"
        );
    }

    #[test]
    fn test_error_display_missing_type() {
        let error = ApidocError::new(ErrorKind::MissingType {
            parameter: "id".to_string(),
        })
        .context("GET api/users/{id}");
        assert_eq!(
            error.to_string(),
            "GET api/users/{id}: No type specified for parameter `id`"
        );
    }

    #[test]
    fn test_error_display_file_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "not found");
        let error = ApidocError::new(ErrorKind::FileError {
            path: PathBuf::from("/tmp/index.md"),
            source: io_err,
        });
        let display = error.to_string();
        assert!(display.contains("/tmp/index.md"));
        assert!(display.contains("not found"));
    }

    #[test]
    fn test_only_file_errors_expose_a_source() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error = ApidocError::new(ErrorKind::FileError {
            path: PathBuf::from("index.md"),
            source: io_err,
        });
        assert_eq!(
            error.source().map(|source| source.to_string()),
            Some("access denied".to_string())
        );

        let unsupported = ApidocError::new(ErrorKind::UnsupportedHandler {
            handler: "Closure".to_string(),
        });
        assert!(unsupported.source().is_none());
        assert!(ApidocError::message("test").source().is_none());
    }

    #[test]
    fn test_result_ext_chaining() {
        let result: ApidocResult<i32> = Err(Box::new(ApidocError::message("root")));
        let err = result
            .context("step 1")
            .with_context(|| "step 2".to_string())
            .unwrap_err();
        assert_eq!(err.to_string(), "step 1: step 2: root");
    }

    #[test]
    fn test_result_ext_success_passes_through() {
        let result: ApidocResult<i32> = Ok(42);
        assert_eq!(result.context("never shown").unwrap(), 42);
    }

    #[test]
    fn test_err_and_bail_macros() {
        fn fails(name: &str) -> ApidocResult<()> {
            crate::bail!("no route named {}", name);
        }
        let err = fails("users.show").unwrap_err();
        assert_eq!(err.to_string(), "no route named users.show");

        let boxed: Box<ApidocError> = crate::err!("value {}", 7);
        assert_eq!(boxed.to_string(), "value 7");
    }

    #[test]
    fn test_span_trace_records_active_span() {
        setup_tracing_subscriber();
        let span = warn_span!("extract_route_under_test");
        let error = span.in_scope(|| ApidocError::message("inside span"));

        let trace = error.span_trace().to_string();
        assert!(
            trace.contains("extract_route_under_test"),
            "span trace was: {trace}"
        );
    }
}

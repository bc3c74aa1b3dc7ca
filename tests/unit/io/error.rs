//! Tests for error types including source chaining and message formatting

#[cfg(test)]
mod tests {
    use blackout::BlackoutError;
    use blackout::io::error::{computation_error, evaluation_error, invalid_parameter};
    use std::error::Error;

    // Tests error source chaining works correctly
    // Verified by breaking source chain
    #[test]
    fn test_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = BlackoutError::FileSystem {
            path: "/tmp/target.png".into(),
            operation: "read",
            source: io_error,
        };

        assert!(error.source().is_some());
        assert!(error.to_string().contains("/tmp/target.png"));
    }

    // Tests coefficient range errors name the requested cell
    // Verified by omitting k from the message
    #[test]
    fn test_coefficient_out_of_range_message() {
        let message = BlackoutError::CoefficientOutOfRange { n: 300, k: 7 }.to_string();

        assert!(message.contains("C(300,7)"));
        assert!(message.contains("255"));
    }

    // Tests InvalidParameter error contains all fields
    // Verified by omitting value from message
    #[test]
    fn test_invalid_parameter_error() {
        let error = invalid_parameter("workers", &0, &"at least one worker is required");

        let message = error.to_string();
        assert!(message.contains("workers"));
        assert!(message.contains("'0'"));
        assert!(message.contains("at least one worker"));
        assert!(error.source().is_none());
    }

    // Tests shape mismatches print both dimensions
    // Verified by printing only the expected shape
    #[test]
    fn test_shape_mismatch_message() {
        let error = BlackoutError::ShapeMismatch {
            what: "layer weights",
            expected: (16, 18),
            found: (4, 4),
        };

        let message = error.to_string();
        assert!(message.contains("layer weights"));
        assert!(message.contains("16x18"));
        assert!(message.contains("4x4"));
    }

    // Tests evaluation errors wrap and expose the candidate failure
    // Verified by dropping the boxed source
    #[test]
    fn test_evaluation_error_chain() {
        let error = evaluation_error(5, BlackoutError::TableNotPopulated { n: 3, k: 1 });

        let message = error.to_string();
        assert!(message.contains("candidate 5"));
        assert!(message.contains("C(3,1)"));

        let source = error.source().map(ToString::to_string).unwrap_or_default();
        assert!(source.contains("precomputed"));
    }

    // Tests Computation error formatting
    // Verified by omitting reason from message
    #[test]
    fn test_computation_error() {
        let error = computation_error("probe", &"no candidate received a cost");

        let message = error.to_string();
        assert!(message.contains("probe"));
        assert!(message.contains("no candidate received a cost"));
    }

    // Tests conversions from library errors
    // Verified by mapping I/O errors to image errors
    #[test]
    fn test_from_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(
            BlackoutError::from(io_error),
            BlackoutError::FileSystem { .. }
        ));

        let image_error = image::ImageError::IoError(std::io::Error::other("broken"));
        let error = BlackoutError::from(image_error);
        assert!(matches!(error, BlackoutError::ImageLoad { .. }));
        assert!(error.source().is_some());
    }
}

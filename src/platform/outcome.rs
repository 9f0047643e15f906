// ABOUTME: Result of a remote call paired with the warnings it produced.
// ABOUTME: Warnings survive failures, so callers always forward them.

use super::ApiError;
use crate::warnings::Warnings;

/// Outcome of one platform call.
///
/// Unlike a plain `Result`, the warnings are available whether or not the
/// call succeeded.
#[must_use = "outcomes carry warnings that must be forwarded"]
#[derive(Debug)]
pub struct Outcome<T> {
    pub result: Result<T, ApiError>,
    pub warnings: Warnings,
}

impl<T> Outcome<T> {
    pub fn ok(value: T) -> Self {
        Self {
            result: Ok(value),
            warnings: Warnings::new(),
        }
    }

    pub fn err(error: ApiError) -> Self {
        Self {
            result: Err(error),
            warnings: Warnings::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Warnings) -> Self {
        self.warnings = warnings;
        self
    }

    /// Record the warnings in `sink` and hand back the result.
    pub fn collect(self, sink: &mut Warnings) -> Result<T, ApiError> {
        for warning in self.warnings {
            sink.push(warning);
        }
        self.result
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            result: self.result.map(f),
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_forwards_warnings_on_error() {
        let outcome: Outcome<()> =
            Outcome::err(ApiError::Remote("nope".into())).with_warnings(Warnings::from(["w1"]));

        let mut sink = Warnings::from(["w0"]);
        let result = outcome.collect(&mut sink);

        assert!(result.is_err());
        assert_eq!(sink.as_slice(), ["w0", "w1"]);
    }

    #[test]
    fn map_keeps_warnings() {
        let outcome = Outcome::ok(2).with_warnings(Warnings::from(["w"])).map(|n| n * 2);
        assert_eq!(outcome.result, Ok(4));
        assert_eq!(outcome.warnings.len(), 1);
    }
}

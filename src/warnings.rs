// ABOUTME: Accumulator for non-fatal warnings returned by remote calls.
// ABOUTME: Preserves call order and never deduplicates, so users see every message.

use serde::Serialize;

/// Ordered list of human-readable warnings.
///
/// Every remote call returns warnings next to its result, including calls
/// that fail. Steps append them here in call order and the caller prints them
/// before any error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Warnings(Vec<String>);

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a single warning, auto-logging it via tracing.
    pub fn push(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        tracing::warn!("{}", warning);
        self.0.push(warning);
    }

    /// Move every warning from `other` onto the end of this list.
    ///
    /// Nothing is logged: the warnings were logged when first recorded.
    pub fn append(&mut self, other: Warnings) {
        self.0.extend(other.0);
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for Warnings {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Warnings {
    fn from(values: [S; N]) -> Self {
        values.into_iter().collect()
    }
}

impl IntoIterator for Warnings {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Warnings {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::io;
    use std::sync::Arc;

    #[test]
    fn warnings_start_empty() {
        let warnings = Warnings::new();
        assert!(warnings.is_empty());
        assert_eq!(warnings.len(), 0);
    }

    #[test]
    fn append_keeps_order_and_duplicates() {
        let mut warnings = Warnings::from(["first", "again"]);
        warnings.append(Warnings::from(["again", "last"]));

        assert_eq!(warnings.as_slice(), ["first", "again", "again", "last"]);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn warnings_are_logged_once_across_append() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut step = Warnings::new();
            step.push("disk quota nearly full");
            let mut summary = Warnings::new();
            summary.append(step);
        });

        let log = String::from_utf8(captured.0.lock().clone()).unwrap();
        assert_eq!(log.matches("disk quota nearly full").count(), 1);
    }
}

//! Issues collected while projecting a field map onto a schema.

use crate::access::{Lookup, TypeMismatch};
use crate::error::{ErrorClass, WireError};
use crate::message::{FieldMap, MessageWalk};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// One problem found while building a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub class: ErrorClass,
    /// Absolute buffer offset
    pub offset: usize,
    /// Schema path of the field, e.g. `CotEvent.detail`
    pub context: String,
    pub message: String,
}

/// Accumulates issues for one record.
///
/// Type mismatches are recorded as unsupported and the field is treated as
/// absent; walk errors keep their own class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    issues: Vec<Issue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unwrap a lookup, recording a type mismatch.
    pub fn field<T>(&mut self, context: &str, lookup: Lookup<T>) -> Option<T> {
        match lookup {
            Ok(value) => value,
            Err(mismatch) => {
                self.mismatch(context, &mismatch);
                None
            }
        }
    }

    /// Keep the fields of a walk, recording its error if it stopped early.
    pub fn walk<'a>(&mut self, context: &str, walk: MessageWalk<'a>) -> FieldMap<'a> {
        if let Some(err) = &walk.error {
            self.wire(context, err);
        }
        walk.fields
    }

    /// Look up and walk a nested message.
    pub fn nested<'a>(&mut self, context: &str, lookup: Lookup<MessageWalk<'a>>) -> Option<FieldMap<'a>> {
        self.field(context, lookup).map(|walk| self.walk(context, walk))
    }

    pub fn wire(&mut self, context: &str, err: &WireError) {
        self.push(err.class(), err.offset(), context, err.to_string());
    }

    pub fn mismatch(&mut self, context: &str, mismatch: &TypeMismatch) {
        self.push(ErrorClass::Unsupported, mismatch.offset, context, mismatch.to_string());
    }

    pub fn unsupported(&mut self, context: &str, offset: usize, message: impl Into<String>) {
        self.push(ErrorClass::Unsupported, offset, context, message.into());
    }

    pub fn malformed(&mut self, context: &str, offset: usize, message: impl Into<String>) {
        self.push(ErrorClass::Malformed, offset, context, message.into());
    }

    fn push(&mut self, class: ErrorClass, offset: usize, context: &str, message: String) {
        trace!(?class, offset, context, %message, "projection issue");
        self.issues.push(Issue {
            class,
            offset,
            context: context.to_string(),
            message,
        });
    }

    /// Rewrite the offsets of the issues recorded after the first `from`.
    pub fn remap_offsets(&mut self, from: usize, map: impl Fn(usize) -> usize) {
        for issue in self.issues.iter_mut().skip(from) {
            issue.offset = map(issue.offset);
        }
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// First issue that makes the record malformed.
    pub fn first_malformed(&self) -> Option<&Issue> {
        self.issues.iter().find(|i| i.class == ErrorClass::Malformed)
    }

    pub fn has_malformed(&self) -> bool {
        self.first_malformed().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::parse_all;

    #[test]
    fn test_mismatch_is_skipped_and_recorded() {
        let buf = [0x08, 0x01, 0x12, 0x01, b'x'];
        let walk = parse_all(&buf);
        let mut diag = Diagnostics::new();

        assert_eq!(diag.field("Test.name", walk.fields.string(1)), None);
        assert_eq!(
            diag.field("Test.other", walk.fields.string(2)),
            Some("x".to_string())
        );

        assert_eq!(diag.issues().len(), 1);
        let issue = &diag.issues()[0];
        assert_eq!(issue.class, ErrorClass::Unsupported);
        assert_eq!(issue.context, "Test.name");
        assert!(!diag.has_malformed());
    }

    #[test]
    fn test_remap_offsets_skips_earlier_issues() {
        let mut diag = Diagnostics::new();
        diag.unsupported("a", 1, "kept");
        diag.unsupported("b", 10, "moved");
        diag.remap_offsets(1, |offset| offset + 5);
        let offsets: Vec<_> = diag.issues().iter().map(|i| i.offset).collect();
        assert_eq!(offsets, vec![1, 15]);
    }

    #[test]
    fn test_nested_walk_error_is_malformed() {
        // 2: { 1: string claiming 5 bytes inside a 2 byte message }
        let buf = [0x12, 0x02, 0x0A, 0x05, b'a', b'b', b'c', b'd', b'e'];
        let walk = parse_message_prefix(&buf);
        let mut diag = Diagnostics::new();

        let nested = diag.nested("Test.child", walk.fields.message(2)).unwrap();
        assert!(nested.is_empty());
        let issue = diag.first_malformed().unwrap();
        assert_eq!(issue.context, "Test.child");
        assert_eq!(issue.offset, 3);
    }

    fn parse_message_prefix(buf: &[u8]) -> MessageWalk<'_> {
        crate::message::parse_message(buf, 0, 4)
    }
}

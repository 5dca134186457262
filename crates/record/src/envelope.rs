//! Header-annotated view of a record for a single send call.

use crate::Record;
use uuid::Uuid;

/// Header carrying [`Record::schema_name`].
pub const SCHEMA_NAME_HEADER: &str = "JSON_SCHEMA_NAME";
/// Header carrying [`Record::schema_version`].
pub const SCHEMA_VERSION_HEADER: &str = "JSON_SCHEMA_VALUE";
/// Header carrying the per-message correlation id.
pub const CORRELATION_ID_HEADER: &str = "CORRELATION_ID";

/// A record plus the headers attached to its outbound message.
///
/// The correlation id is a fresh UUID v4 for every envelope, never derived
/// from the record content. Envelopes borrow the record and live only for the
/// duration of one publish call.
#[derive(Debug)]
pub struct PublishEnvelope<'a> {
    record: &'a Record,
    correlation_id: String,
}

impl<'a> PublishEnvelope<'a> {
    pub fn new(record: &'a Record) -> Self {
        Self {
            record,
            correlation_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.record.key
    }

    pub fn value(&self) -> &str {
        &self.record.value
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// The three message headers as (name, value) pairs, in attachment order.
    pub fn headers(&self) -> [(&'static str, &str); 3] {
        [
            (SCHEMA_NAME_HEADER, self.record.schema_name.as_str()),
            (SCHEMA_VERSION_HEADER, self.record.schema_version.as_str()),
            (CORRELATION_ID_HEADER, self.correlation_id.as_str()),
        ]
    }
}

//! Record model for archive-loader.
//!
//! Every regular entry of an input archive holds one JSON document that
//! decodes into a [`Record`]. The pipeline wraps each record in a
//! [`PublishEnvelope`] which carries the three message headers attached on
//! publish.
//!
//! ```rust
//! use archive_record::{decode, PublishEnvelope};
//!
//! let raw = br#"{"recordKey":"k1","recordValue":"v1","schemaName":"url","schemaVersion":"1"}"#;
//! let record = decode(raw).unwrap();
//! let envelope = PublishEnvelope::new(&record);
//! assert_eq!(envelope.headers().len(), 3);
//! ```

mod decode;
mod envelope;
mod error;

pub use decode::decode;
pub use envelope::{
    PublishEnvelope, CORRELATION_ID_HEADER, SCHEMA_NAME_HEADER, SCHEMA_VERSION_HEADER,
};
pub use error::{MalformedRecordError, Result};

/// A decoded archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Routing/partitioning key of the outbound message.
    pub key: String,
    /// Message body. Opaque text in an independent payload format.
    pub value: String,
    pub schema_name: String,
    pub schema_version: String,
}

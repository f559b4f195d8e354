//! Domain primitives, use-cases, and ports.
//!
//! Types here are transport agnostic: the HTTP adapter translates them into
//! responses and the outbound adapters translate them into rows, tokens, and
//! bitmaps. Invariants live on the types themselves.

pub mod error;
pub mod ports;
pub mod record;
pub mod record_service;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::record::{QrRecord, RecordDraft, RecordValidationError, Vatin};
pub use self::record_service::{RecordService, RECORD_NOT_FOUND_MESSAGE, VATIN_RECORD_LIMIT};

/// Response header carrying the request-scoped trace identifier.
pub const TRACE_ID_HEADER: &str = "Trace-Id";

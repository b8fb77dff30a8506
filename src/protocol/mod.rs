//! Protocol Module
//!
//! Defines the wire protocol spoken with the database server. All integers
//! are big-endian and every field is 4- or 8-byte aligned.
//!
//! ### Request Format
//! ```text
//! ┌────────────┬───────────────┬─────────────────────────────┐
//! │ OpCode (4) │ TableIdx (4)  │          Body               │
//! └────────────┴───────────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 1: INSERT - Body: count (4) + values
//! - 2: UPDATE - Body: id (8) + version (8) + count (4) + values
//! - 3: DROP   - Body: id (8)
//! - 4: GET    - Body: id (8)
//! - 5: SCAN   - Body: column (4) + operator (4) + value
//! - 6: EXIT   - Body: empty
//!
//! ### Value Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Tag (4)  │ Len (4)  │  Payload (Len bytes)        │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 1: OK, 2: NOT_FOUND, 3: BAD_TABLE, 4: BAD_QUERY, 5: TXN_ABORT,
//!   6: BAD_VALUE, 7: BAD_ROW, 8: BAD_REQUEST, 9: BAD_FOREIGN,
//!   10: SERVER_BUSY, 11: UNIMPLEMENTED

mod buffer;
mod request;
mod response;
mod types;
mod value;

pub use buffer::ResponseBuf;
pub use request::{Request, ScanPredicate, VersionCheck, HEADER_SIZE};
pub use response::{decode_handshake, decode_response, response_len, Response, HANDSHAKE_LEN};
pub use types::{OpCode, Operator, PrimaryKey, StatusCode, TypeTag, Version};
pub use value::{coerce, decode_value, encode_value, padded_len, Row, Value, FIXED_LEN, STRING_ALIGN};

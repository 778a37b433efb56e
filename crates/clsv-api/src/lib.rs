//! # clsv-api — Axum Integration
//!
//! Runs class validators over inbound HTTP requests.
//!
//! ## Pieces
//!
//! - [`extractors`]: the [`ClassValidateExt`] request extension and the
//!   [`Validated<T>`] extractor.
//! - [`state`]: [`AppState`] holding the shared validator.
//! - [`error`]: [`AppError`], rendered as `{"error": {code, message, details}}`.
//!
//! ## Status codes
//!
//! | Failure                                     | Status |
//! |---------------------------------------------|--------|
//! | Payload rejected by rules                   | 422    |
//! | Payload passes rules but not the Rust type  | 422    |
//! | Body unreadable, not JSON, or not an object | 400    |
//! | Body larger than [`MAX_BODY_BYTES`]         | 413    |
//! | Bag schema does not compile                 | 500    |

pub mod error;
pub mod extractors;
pub mod state;

pub use error::{AppError, ErrorBody, ErrorDetail};
pub use extractors::{ClassValidateExt, Validated, ValidationArgs, MAX_BODY_BYTES};
pub use state::{AppState, ValidatorState};

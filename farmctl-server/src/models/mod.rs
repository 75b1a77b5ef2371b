//! Request-side models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod fields;
pub mod upload;
pub mod validation;

pub use fields::{non_negative, non_negative_count, parse_id, EntityName};
pub use upload::{object_path, sanitize_filename, upload_folder, validate_upload, MAX_UPLOAD_BYTES};
pub use validation::ValidationError;

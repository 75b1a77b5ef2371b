//! Outbound HTTP clients
//!
//! - ai: chat-completion provider for insight generation
//! - auth: bearer-token verification
//! - storage: object uploads
//!
//! Each sits behind a trait so handlers can run against in-process fakes.

pub mod ai;
pub mod auth;
pub mod storage;

pub use ai::{AiError, InsightGenerator, OpenAiClient, UnconfiguredGenerator};
pub use auth::{AuthError, AuthUser, SupabaseAuth, TokenVerifier};
pub use storage::{ObjectStorage, StorageError, StoredObject, SupabaseStorage, UnconfiguredStorage};

//! Request-scoped log tags.
//!
//! Tags are key/value pairs stored as an immutable snapshot on a [`Context`]
//! handle. Downstream code reads them back to enrich log lines without every
//! function taking the identifiers as parameters:
//!
//! ```
//! use ctxlog::{log_tags, Context};
//!
//! let ctx = ctxlog::add_tags_to_context(&Context::background(), log_tags! { "service" => "billing" });
//! let ctx = ctxlog::with_log_tag(&ctx, "req_id");
//!
//! let tags = ctxlog::tags_from_context(&ctx).unwrap();
//! assert!(tags.contains_key("req_id"));
//! ```

pub mod context;
pub mod error;
pub mod random;
pub mod tags;

pub use context::{Context, ContextKey};
pub use error::{RandError, RandResult};
pub use random::{
    rand_bytes, rand_bytes_from, rand_string_b64, rand_string_b64_from, EntropySource, OsEntropy,
};
pub use tags::{
    add_tags_to_context, current_tags, tags_from_context, with_log_tag, with_log_tag_with_value,
    LogTags, DEFAULT_ID_TRIADS,
};

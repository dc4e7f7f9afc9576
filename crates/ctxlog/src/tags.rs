//! Log tags carried on a [`Context`].
//!
//! Tags live in the context as an immutable snapshot. Reading hands back a
//! copy and every write derives a new handle, so a tag set observed by one
//! part of a request can never change underneath it.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::{Context, ContextKey};
use crate::random::{rand_string_b64_or_empty, EntropySource, OsEntropy};

/// Triads of randomness used by [`with_log_tag`] (12 characters).
pub const DEFAULT_ID_TRIADS: usize = 3;

/// Private slot for the tag map.
struct LogTagsKey;

impl ContextKey for LogTagsKey {
    type Value = LogTags;
}

/// Ordered set of logging key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogTags(BTreeMap<String, Value>);

impl LogTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Overlay `other` onto `self`; `other` wins on collisions.
    pub fn merge(&mut self, other: LogTags) {
        self.0.extend(other.0);
    }
}

/// Renders `k1=v1 k2=v2`. Strings are written bare, other values as JSON.
impl fmt::Display for LogTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match value {
                Value::String(s) => write!(f, "{key}={s}")?,
                other => write!(f, "{key}={other}")?,
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for LogTags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for LogTags {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.0
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl IntoIterator for LogTags {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a LogTags {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Build a [`LogTags`] from `key => value` pairs.
///
/// Usage: `let tags = log_tags! { "service" => "billing", "shard" => 4 };`
#[macro_export]
macro_rules! log_tags {
    () => {
        $crate::LogTags::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut tags = $crate::LogTags::new();
        $(tags.insert($key, $value);)+
        tags
    }};
}

/// Merge `tags_to_add` over the tags already on `ctx` and return the child
/// handle holding the result. New values win on key collisions.
///
/// Attaches a tag map even when `tags_to_add` is empty.
pub fn add_tags_to_context(ctx: &Context, tags_to_add: LogTags) -> Context {
    let mut tags = tags_from_context(ctx).unwrap_or_default();
    tags.merge(tags_to_add);
    ctx.with_value::<LogTagsKey>(tags)
}

/// A copy of the tags on `ctx`, or `None` if none were ever attached.
pub fn tags_from_context(ctx: &Context) -> Option<LogTags> {
    ctx.value::<LogTagsKey>().cloned()
}

/// Tags on the handle installed by the enclosing [`Context::scope`].
pub fn current_tags() -> Option<LogTags> {
    tags_from_context(&Context::current())
}

/// Tag `key` with a fresh random identifier unless it is already set.
///
/// If no randomness is available the tag is stored with an empty value.
pub fn with_log_tag(ctx: &Context, key: &str) -> Context {
    with_log_tag_from(ctx, key, &mut OsEntropy)
}

pub(crate) fn with_log_tag_from<S: EntropySource + ?Sized>(
    ctx: &Context,
    key: &str,
    source: &mut S,
) -> Context {
    if has_tag(ctx, key) {
        tracing::trace!(key, "Log tag already set, keeping existing value");
        return ctx.clone();
    }
    set_tag(ctx, key, rand_string_b64_or_empty(source, DEFAULT_ID_TRIADS))
}

/// Tag `key` with `value` unless it is already set.
pub fn with_log_tag_with_value(ctx: &Context, key: &str, value: impl Into<String>) -> Context {
    if has_tag(ctx, key) {
        tracing::trace!(key, "Log tag already set, keeping existing value");
        return ctx.clone();
    }
    set_tag(ctx, key, value.into())
}

fn has_tag(ctx: &Context, key: &str) -> bool {
    ctx.value::<LogTagsKey>()
        .is_some_and(|tags| tags.contains_key(key))
}

fn set_tag(ctx: &Context, key: &str, value: String) -> Context {
    let mut tags = LogTags::new();
    tags.insert(key, value);
    add_tags_to_context(ctx, tags)
}

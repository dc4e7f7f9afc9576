//! Immutable propagation handle.
//!
//! A [`Context`] is a small copy-on-write map from key types to values.
//! Deriving a child with [`Context::with_value`] never touches the parent, so
//! a handle can be shared freely between tasks and threads. The handle can be
//! passed explicitly, or installed for the duration of a future with
//! [`Context::scope`] and picked up again anywhere below with
//! [`Context::current`].

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Marker type naming one slot in a [`Context`].
///
/// Keys are types, not strings, so two modules can only share a slot if they
/// share the key type. Keep a key private to make its slot private.
pub trait ContextKey: 'static {
    type Value: Send + Sync + 'static;
}

type Values = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Immutable, cheaply clonable propagation handle.
#[derive(Clone, Default)]
pub struct Context {
    values: Arc<Values>,
}

tokio::task_local! {
    static CURRENT: Context;
}

impl Context {
    /// The empty root handle.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a child handle carrying `value` under `K`.
    ///
    /// Existing entries are shared with the parent. A value already stored
    /// under `K` is shadowed in the child only.
    pub fn with_value<K: ContextKey>(&self, value: K::Value) -> Self {
        let mut values = Values::clone(&self.values);
        values.insert(TypeId::of::<K>(), Arc::new(value));
        Self {
            values: Arc::new(values),
        }
    }

    /// Look up the value stored under `K`.
    pub fn value<K: ContextKey>(&self) -> Option<&K::Value> {
        self.values
            .get(&TypeId::of::<K>())
            .and_then(|v| v.downcast_ref::<K::Value>())
    }

    /// The handle installed by the innermost enclosing scope on this task,
    /// or [`Context::background`] outside any scope.
    pub fn current() -> Self {
        CURRENT.try_with(Context::clone).unwrap_or_default()
    }

    /// Run `fut` with `self` installed as the current handle.
    ///
    /// Tasks spawned from inside `fut` do not inherit the handle; pass it to
    /// them and open a new scope there.
    pub async fn scope<F>(self, fut: F) -> F::Output
    where
        F: Future,
    {
        CURRENT.scope(self, fut).await
    }

    /// Run `f` with `self` installed as the current handle.
    pub fn sync_scope<F, R>(self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        CURRENT.sync_scope(self, f)
    }

    /// Number of attached values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("values", &self.values.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RequestId;
    impl ContextKey for RequestId {
        type Value = String;
    }

    struct Attempt;
    impl ContextKey for Attempt {
        type Value = u32;
    }

    #[test]
    fn background_is_empty() {
        let ctx = Context::background();
        assert!(ctx.is_empty());
        assert!(ctx.value::<RequestId>().is_none());
    }

    #[test]
    fn child_does_not_touch_parent() {
        let parent = Context::background().with_value::<RequestId>("a".to_string());
        let child = parent.with_value::<Attempt>(2);

        assert_eq!(parent.value::<RequestId>().map(String::as_str), Some("a"));
        assert!(parent.value::<Attempt>().is_none());
        assert_eq!(child.value::<RequestId>().map(String::as_str), Some("a"));
        assert_eq!(child.value::<Attempt>(), Some(&2));
    }

    #[test]
    fn child_shadows_same_key() {
        let parent = Context::background().with_value::<Attempt>(1);
        let child = parent.with_value::<Attempt>(5);

        assert_eq!(parent.value::<Attempt>(), Some(&1));
        assert_eq!(child.value::<Attempt>(), Some(&5));
        assert_eq!(child.len(), 1);
    }

    #[test]
    fn debug_shows_value_count() {
        let ctx = Context::background().with_value::<Attempt>(1);
        assert_eq!(format!("{ctx:?}"), "Context { values: 1 }");
    }

    #[test]
    fn current_outside_scope_is_background() {
        assert!(Context::current().is_empty());
    }

    #[test]
    fn sync_scope_installs_and_restores() {
        let outer = Context::background().with_value::<Attempt>(1);
        let inner = outer.with_value::<Attempt>(2);

        outer.sync_scope(|| {
            assert_eq!(Context::current().value::<Attempt>(), Some(&1));
            inner.sync_scope(|| {
                assert_eq!(Context::current().value::<Attempt>(), Some(&2));
            });
            assert_eq!(Context::current().value::<Attempt>(), Some(&1));
        });
        assert!(Context::current().value::<Attempt>().is_none());
    }

    #[tokio::test]
    async fn scope_survives_await_points() {
        let ctx = Context::background().with_value::<RequestId>("req-1".to_string());

        let seen = ctx
            .scope(async {
                tokio::task::yield_now().await;
                Context::current().value::<RequestId>().cloned()
            })
            .await;

        assert_eq!(seen.as_deref(), Some("req-1"));
    }

    #[tokio::test]
    async fn spawned_task_does_not_inherit_scope() {
        let ctx = Context::background().with_value::<Attempt>(7);

        let inherited = ctx
            .scope(async {
                tokio::spawn(async { Context::current().value::<Attempt>().copied() })
                    .await
                    .unwrap()
            })
            .await;

        assert_eq!(inherited, None);
    }
}

//! Spans that carry the request's log tags.

use ctxlog::Context;

/// Render the tags on `ctx` as `k1=v1 k2=v2`, or an empty string when the
/// handle carries none.
pub fn display_tags(ctx: &Context) -> String {
    ctxlog::tags_from_context(ctx)
        .map(|tags| tags.to_string())
        .unwrap_or_default()
}

/// Create an info span whose `tags` field holds the handle's log tags.
///
/// Usage: `let _span = tagged_span!(&ctx, "handle_request").entered();`
///
/// The tags are rendered once, when the span is created. Tags added to a
/// derived handle afterwards need a new span.
#[macro_export]
macro_rules! tagged_span {
    ($ctx:expr, $name:expr) => {
        $crate::tracing::info_span!($name, tags = %$crate::spans::display_tags($ctx))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxlog::log_tags;

    #[test]
    fn untagged_handle_renders_empty() {
        assert_eq!(display_tags(&Context::background()), "");
    }

    #[test]
    fn tags_render_in_key_order() {
        let ctx = ctxlog::add_tags_to_context(
            &Context::background(),
            log_tags! { "service" => "api", "req_id" => "abc" },
        );
        assert_eq!(display_tags(&ctx), "req_id=abc service=api");
    }

    #[test]
    fn macro_builds_span() {
        let ctx = ctxlog::with_log_tag(&Context::background(), "req_id");
        let span = tagged_span!(&ctx, "unit_test");
        // Whether or not a subscriber is listening, entering must not panic.
        let _entered = span.entered();
    }
}

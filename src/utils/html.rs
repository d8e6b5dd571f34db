// src/utils/html.rs

/// Strips unsafe markup from admin-authored text (question content and options)
/// before it is stored and later rendered by quiz clients.
///
/// Whitelist based: harmless inline tags survive, `<script>` and its body,
/// `<iframe>` and event-handler attributes are removed.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

//! Preview bundling: fold a file map into one self-contained document.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use neonvibe_common::FileMap;

/// Key of the document the preview is built from.
pub const ENTRY_POINT: &str = "index.html";

static STYLESHEET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<link[^>]+href=["']([^"']+\.css)["'][^>]*>"#).unwrap()
});

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<script[^>]+src=["']([^"']+\.js)["'][^>]*></script>"#).unwrap()
});

/// Build the preview document for `files`.
///
/// Returns an empty string while there is no [`ENTRY_POINT`] yet. Every
/// `<link href="x.css">` and empty `<script src="x.js"></script>` whose path
/// is a key of `files` is replaced by an inline `<style>`/`<script>` block
/// holding that file's content. References to anything else (CDN URLs,
/// files the model has not emitted) are left as written.
///
/// The output depends only on `files`, so re-bundling the same map is
/// byte-identical.
pub fn bundle(files: &FileMap) -> String {
    let Some(entry) = files.get(ENTRY_POINT) else {
        return String::new();
    };

    let html = STYLESHEET_RE.replace_all(entry, |caps: &Captures| {
        inline_or_keep(files, caps, "style")
    });
    let html = SCRIPT_RE.replace_all(&html, |caps: &Captures| {
        inline_or_keep(files, caps, "script")
    });

    html.into_owned()
}

fn inline_or_keep(files: &FileMap, caps: &Captures, tag: &str) -> String {
    match files.get(&caps[1]) {
        Some(content) => inline_block(tag, content),
        None => caps[0].to_string(),
    }
}

fn inline_block(tag: &str, content: &str) -> String {
    let mut block = String::with_capacity(content.len() + 2 * tag.len() + 8);
    block.push('<');
    block.push_str(tag);
    block.push_str(">\n");
    block.push_str(content);
    if !content.ends_with('\n') {
        block.push('\n');
    }
    block.push_str("</");
    block.push_str(tag);
    block.push('>');
    block
}

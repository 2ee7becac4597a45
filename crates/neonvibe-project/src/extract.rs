//! Incremental file extraction from marker-delimited model output.
//!
//! The model wraps every file in `<file name="PATH">CONTENT</file>`. While
//! a response is still streaming the buffer usually ends inside a block, so
//! extraction runs two passes over the full text on every tick:
//!
//! 1. every complete block, left to right (a later block with the same
//!    name replaces an earlier one);
//! 2. the single trailing block that was opened but not yet closed, added
//!    only when no complete block already claimed its name.
//!
//! Both passes are one linear walk: find an open marker, find the next
//! close marker, continue after it. Nothing here backtracks, so cost stays
//! proportional to the buffer even when it grows to many kilobytes.

use neonvibe_common::FileMap;

const OPEN_PREFIX: &str = "<file name=\"";
const OPEN_SUFFIX: &str = "\">";
const CLOSE: &str = "</file>";

/// A well-formed open marker: `<file name="NAME">`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenMarker<'a> {
    name: &'a str,
    /// Byte offset of the first content byte, right after `">`.
    content_start: usize,
}

/// Extract every file block from `text`.
///
/// Content is returned verbatim, including leading and trailing newlines.
/// Malformed markers (missing quote, empty name, unterminated header) are
/// skipped silently.
pub fn extract(text: &str) -> FileMap {
    let mut files = FileMap::new();
    let mut trailing: Option<(&str, &str)> = None;
    let mut cursor = 0;

    while let Some(open) = next_open_marker(text, cursor) {
        let body = &text[open.content_start..];
        match body.find(CLOSE) {
            Some(len) => {
                files.insert(open.name.to_string(), body[..len].to_string());
                cursor = open.content_start + len + CLOSE.len();
            }
            None => {
                // No close marker anywhere after this point: this is the
                // block still being streamed, and everything after its
                // header (other markers included) is its content.
                trailing = Some((open.name, body));
                break;
            }
        }
    }

    if let Some((name, partial)) = trailing {
        files
            .entry(name.to_string())
            .or_insert_with(|| partial.to_string());
    }

    files
}

/// Find the next well-formed open marker at or after byte offset `from`.
fn next_open_marker(text: &str, from: usize) -> Option<OpenMarker<'_>> {
    let mut search = from;

    while let Some(found) = text[search..].find(OPEN_PREFIX) {
        let marker_start = search + found;
        let name_start = marker_start + OPEN_PREFIX.len();
        let rest = &text[name_start..];

        // Without another quote no later header can be complete either.
        let quote = rest.find('"')?;
        let name = &rest[..quote];
        if !name.is_empty() && rest[quote..].starts_with(OPEN_SUFFIX) {
            return Some(OpenMarker {
                name,
                content_start: name_start + quote + OPEN_SUFFIX.len(),
            });
        }

        search = marker_start + 1;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_markers_yields_empty_map() {
        assert!(extract("").is_empty());
        assert!(extract("Sure! Here is a plain answer without any files.").is_empty());
        assert!(extract("<div>not a file</div>").is_empty());
    }

    #[test]
    fn complete_blocks_keep_content_verbatim() {
        let text = "Here you go:\n\
                    <file name=\"index.html\">\n<html>\n  <body></body>\n</html>\n</file>\n\
                    <file name=\"styles.css\">  body { margin: 0; }\t</file>\n\
                    <file name=\"README.md\"></file>";
        let files = extract(text);

        assert_eq!(files.len(), 3);
        assert_eq!(files["index.html"], "\n<html>\n  <body></body>\n</html>\n");
        assert_eq!(files["styles.css"], "  body { margin: 0; }\t");
        assert_eq!(files["README.md"], "");
    }

    #[test]
    fn later_complete_block_with_same_name_wins() {
        let text = "<file name=\"a.js\">one</file> then <file name=\"a.js\">two</file>";
        let files = extract(text);
        assert_eq!(files.len(), 1);
        assert_eq!(files["a.js"], "two");
    }

    #[test]
    fn trailing_open_block_is_included() {
        let text = "<file name=\"index.html\"><p>hi</p></file>\n<file name=\"app.js\">\nconsole.log(";
        let files = extract(text);
        assert_eq!(files["index.html"], "<p>hi</p>");
        assert_eq!(files["app.js"], "\nconsole.log(");
    }

    #[test]
    fn trailing_partial_never_overrides_completed_block() {
        let text = "<file name=\"x.css\">final</file>\n<file name=\"x.css\">draf";
        let files = extract(text);
        assert_eq!(files.len(), 1);
        assert_eq!(files["x.css"], "final");
    }

    #[test]
    fn trailing_partial_keeps_half_written_close_marker() {
        let files = extract("<file name=\"a.txt\">body</fi");
        assert_eq!(files["a.txt"], "body</fi");
    }

    #[test]
    fn unterminated_header_is_ignored() {
        let text = "<file name=\"index.html\">ok</file>\n<file name=\"s";
        let files = extract(text);
        assert_eq!(files.len(), 1);
        assert_eq!(files["index.html"], "ok");

        // Quote closed but `>` not yet streamed.
        let files = extract("<file name=\"s.css\"");
        assert!(files.is_empty());
    }

    #[test]
    fn malformed_markers_are_skipped() {
        // Missing opening quote, empty name, single quotes.
        let text = "<file name=index.html>a</file>\
                    <file name=\"\">b</file>\
                    <file name='c.css'>c</file>\
                    <file name=\"ok.txt\">d</file>";
        let files = extract(text);
        assert_eq!(files.len(), 1);
        assert_eq!(files["ok.txt"], "d");
    }

    #[test]
    fn header_with_stray_quote_resyncs_on_next_marker() {
        let text = "<file name=\"bad\" x><file name=\"good.js\">let a;</file>";
        let files = extract(text);
        assert_eq!(files.len(), 1);
        assert_eq!(files["good.js"], "let a;");
    }

    #[test]
    fn nested_marker_stays_inside_outer_content() {
        let text = "<file name=\"a\">x<file name=\"b\">y</file>";
        let files = extract(text);
        assert_eq!(files.len(), 1);
        assert_eq!(files["a"], "x<file name=\"b\">y");
    }

    #[test]
    fn extraction_is_repeatable_on_a_growing_buffer() {
        let full = "<file name=\"index.html\"><h1>Hi</h1></file><file name=\"s.css\">h1{}</file>";
        let mut seen = 0;
        for end in 0..=full.len() {
            let files = extract(&full[..end]);
            assert!(files.len() >= seen, "files vanished at byte {end}");
            assert_eq!(extract(&full[..end]), files);
            seen = files.len();
        }
        let files = extract(full);
        assert_eq!(files["index.html"], "<h1>Hi</h1>");
        assert_eq!(files["s.css"], "h1{}");
    }

    #[test]
    fn multibyte_content_is_preserved() {
        let text = "<file name=\"i18n/ja.txt\">こんにちは ✨</file>";
        assert_eq!(extract(text)["i18n/ja.txt"], "こんにちは ✨");
    }
}

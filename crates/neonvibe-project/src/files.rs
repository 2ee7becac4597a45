//! Merging successive extractions into a session's file map.

use neonvibe_common::FileMap;

/// Apply one tick's extraction onto `target`.
///
/// This is a union with override: entries in `latest` are inserted or
/// replace what was there, entries only present in `target` are kept. A
/// file completed earlier in the turn therefore survives even if a later
/// extraction does not report it. Returns how many entries changed.
pub fn merge_files(target: &mut FileMap, latest: FileMap) -> usize {
    let mut changed = 0;
    for (path, content) in latest {
        match target.get_mut(&path) {
            Some(existing) if *existing == content => {}
            Some(existing) => {
                *existing = content;
                changed += 1;
            }
            None => {
                target.insert(path, content);
                changed += 1;
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> FileMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn merge_adds_new_entries() {
        let mut target = map(&[("a", "1")]);
        let changed = merge_files(&mut target, map(&[("b", "2")]));
        assert_eq!(changed, 1);
        assert_eq!(target, map(&[("a", "1"), ("b", "2")]));
    }

    #[test]
    fn merge_overrides_partial_with_completed_content() {
        let mut target = map(&[("app.js", "cons")]);
        let changed = merge_files(&mut target, map(&[("app.js", "console.log(1);")]));
        assert_eq!(changed, 1);
        assert_eq!(target["app.js"], "console.log(1);");
    }

    #[test]
    fn merge_never_drops_entries() {
        let mut target = map(&[("index.html", "<html></html>"), ("old.css", "x")]);
        let changed = merge_files(&mut target, FileMap::new());
        assert_eq!(changed, 0);
        assert_eq!(target.len(), 2);
    }

    #[test]
    fn merge_counts_only_real_changes() {
        let mut target = map(&[("a", "1"), ("b", "2")]);
        let changed = merge_files(&mut target, map(&[("a", "1"), ("b", "3")]));
        assert_eq!(changed, 1);
    }
}

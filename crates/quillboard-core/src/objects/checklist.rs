//! Checklist convention for note content.
//!
//! A checklist is an unordered list tagged `data-checklist="true"`; each
//! `<li>` carries `data-checked`. Clicking inside the leading checkbox zone
//! of a list item toggles its checked state instead of placing the caret.

/// Width of the leading checkbox zone in screen pixels.
pub const CHECKBOX_ZONE_PX: f64 = 30.0;

/// Whether a click at `local_x` (pixels from the list item's left edge)
/// lands in the checkbox zone.
pub fn in_checkbox_zone(local_x: f64) -> bool {
    (0.0..CHECKBOX_ZONE_PX).contains(&local_x)
}

/// Whether the fragment contains a checklist at all.
pub fn has_checklist(content: &str) -> bool {
    content.contains("data-checklist=\"true\"")
}

/// Toggle the checked state of the `index`-th `<li>` in the fragment.
///
/// Returns the rewritten fragment, or `None` when there is no such list
/// item (the click is then treated as ordinary caret placement).
pub fn toggle_item(content: &str, index: usize) -> Option<String> {
    if !has_checklist(content) {
        return None;
    }

    let mut seen = 0usize;
    let mut search_from = 0usize;
    while let Some(rel) = content[search_from..].find("<li") {
        let tag_start = search_from + rel;
        let tag_end = tag_start + content[tag_start..].find('>')?;
        if seen == index {
            let tag = &content[tag_start..tag_end];
            let rewritten = if let Some(attr) = tag.find("data-checked=\"") {
                let value_start = tag_start + attr + "data-checked=\"".len();
                let value_end = value_start + content[value_start..].find('"')?;
                let flipped = if &content[value_start..value_end] == "true" {
                    "false"
                } else {
                    "true"
                };
                format!(
                    "{}{}{}",
                    &content[..value_start],
                    flipped,
                    &content[value_end..]
                )
            } else {
                format!(
                    "{} data-checked=\"true\"{}",
                    &content[..tag_start + 3],
                    &content[tag_start + 3..]
                )
            };
            return Some(rewritten);
        }
        seen += 1;
        search_from = tag_end;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: &str = r#"<ul data-checklist="true"><li data-checked="false">one</li><li data-checked="true">two</li></ul>"#;

    #[test]
    fn test_checkbox_zone() {
        assert!(in_checkbox_zone(0.0));
        assert!(in_checkbox_zone(29.9));
        assert!(!in_checkbox_zone(30.0));
        assert!(!in_checkbox_zone(-1.0));
    }

    #[test]
    fn test_toggle_unchecked_to_checked() {
        let out = toggle_item(LIST, 0).unwrap();
        assert!(out.contains(r#"<li data-checked="true">one</li>"#));
        assert!(out.contains(r#"<li data-checked="true">two</li>"#));
    }

    #[test]
    fn test_toggle_checked_to_unchecked() {
        let out = toggle_item(LIST, 1).unwrap();
        assert!(out.contains(r#"<li data-checked="false">two</li>"#));
        assert!(out.contains(r#"<li data-checked="false">one</li>"#));
    }

    #[test]
    fn test_toggle_adds_missing_attribute() {
        let list = r#"<ul data-checklist="true"><li>bare</li></ul>"#;
        let out = toggle_item(list, 0).unwrap();
        assert!(out.contains(r#"<li data-checked="true">bare</li>"#));
    }

    #[test]
    fn test_out_of_range_is_none() {
        assert!(toggle_item(LIST, 5).is_none());
    }

    #[test]
    fn test_plain_list_is_untouched() {
        let plain = "<ul><li>not a checklist</li></ul>";
        assert!(toggle_item(plain, 0).is_none());
    }
}

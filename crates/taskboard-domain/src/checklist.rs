//! Checklist blocks embedded in task descriptions.
//!
//! A description may carry one fenced block:
//!
//! ````text
//! Some notes
//! ```checklist
//! - [ ] draft outline
//! - [x] collect sources
//! ```
//! ````
//!
//! Only lines starting with `- [` inside the block are items. Toggling an item
//! rewrites that single line and leaves the rest of the description intact.

use serde::{Deserialize, Serialize};
use taskboard_core::{TaskboardError, TaskboardResult};

const FENCE_OPEN: &str = "```checklist";
const FENCE_CLOSE: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub text: String,
    pub checked: bool,
}

/// Line range (exclusive of the fences) of the first checklist block.
fn block_bounds(lines: &[&str]) -> Option<(usize, usize)> {
    let open = lines
        .iter()
        .position(|line| line.trim_start().starts_with(FENCE_OPEN))?;
    let close = lines[open + 1..]
        .iter()
        .position(|line| line.trim() == FENCE_CLOSE)?;
    Some((open + 1, open + 1 + close))
}

fn parse_item(line: &str) -> Option<ChecklistItem> {
    let rest = line.trim_start().strip_prefix("- [")?;
    let (mark, rest) = match rest.chars().next()? {
        ']' => (' ', &rest[1..]),
        c @ (' ' | 'x' | 'X') => (c, rest[1..].strip_prefix(']')?),
        _ => return None,
    };
    Some(ChecklistItem {
        text: rest.trim().to_string(),
        checked: mark.eq_ignore_ascii_case(&'x'),
    })
}

fn render_item(indent: &str, item: &ChecklistItem) -> String {
    let mark = if item.checked { 'x' } else { ' ' };
    format!("{}- [{}] {}", indent, mark, item.text)
}

pub fn parse(description: &str) -> Vec<ChecklistItem> {
    let lines: Vec<&str> = description.split('\n').collect();
    let Some((start, end)) = block_bounds(&lines) else {
        return Vec::new();
    };
    lines[start..end]
        .iter()
        .filter_map(|line| parse_item(line))
        .collect()
}

/// Flip the `index`-th item and return the rewritten description.
pub fn toggle(description: &str, index: usize) -> TaskboardResult<String> {
    let mut lines: Vec<String> = description.split('\n').map(str::to_string).collect();
    let borrowed: Vec<&str> = lines.iter().map(String::as_str).collect();
    let (start, end) = block_bounds(&borrowed).ok_or_else(|| {
        TaskboardError::Validation("description has no checklist".to_string())
    })?;

    let target = (start..end)
        .filter(|&i| parse_item(&lines[i]).is_some())
        .nth(index)
        .ok_or_else(|| {
            TaskboardError::Validation(format!("checklist has no item {}", index))
        })?;

    let line = &lines[target];
    let indent_len = line.len() - line.trim_start().len();
    let indent = line[..indent_len].to_string();
    if let Some(mut item) = parse_item(line) {
        item.checked = !item.checked;
        lines[target] = render_item(&indent, &item);
    }
    Ok(lines.join("\n"))
}

/// `(checked, total)` for the description's checklist, if it has one.
pub fn progress(description: &str) -> Option<(usize, usize)> {
    let items = parse(description);
    if items.is_empty() {
        return None;
    }
    let done = items.iter().filter(|item| item.checked).count();
    Some((done, items.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTION: &str = "Prepare slides\n```checklist\n- [ ] outline\n- [x] sources\nnot an item\n- [X] rehearse\n```\nThanks";

    #[test]
    fn test_parse_items() {
        let items = parse(DESCRIPTION);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].text, "outline");
        assert!(!items[0].checked);
        assert!(items[1].checked);
        assert!(items[2].checked);
    }

    #[test]
    fn test_parse_without_block() {
        assert!(parse("- [ ] loose line").is_empty());
        assert!(parse("```checklist\n- [ ] never closed").is_empty());
    }

    #[test]
    fn test_toggle_rewrites_only_target_line() {
        let toggled = toggle(DESCRIPTION, 0).unwrap();
        assert!(toggled.starts_with("Prepare slides\n```checklist\n- [x] outline\n"));
        assert!(toggled.contains("not an item"));
        assert!(toggled.ends_with("```\nThanks"));

        let back = toggle(&toggled, 0).unwrap();
        assert_eq!(parse(&back), parse(DESCRIPTION));
    }

    #[test]
    fn test_toggle_out_of_range() {
        assert!(toggle(DESCRIPTION, 3).is_err());
        assert!(toggle("no checklist here", 0).is_err());
    }

    #[test]
    fn test_empty_brackets_are_unchecked() {
        let items = parse("```checklist\n- [] bare\n```");
        assert_eq!(
            items,
            vec![ChecklistItem {
                text: "bare".to_string(),
                checked: false
            }]
        );
    }

    #[test]
    fn test_progress() {
        assert_eq!(progress(DESCRIPTION), Some((2, 3)));
        assert_eq!(progress("plain"), None);
    }
}

//! Lenient parsers for free-form generation output.
//!
//! Model responses have no guaranteed shape. Every parser here degrades to an
//! empty or partial result on malformed input and never returns an error.

/// Characters that open a bullet line.
pub const BULLET_MARKERS: &[char] = &['-', '*', '•'];

/// Marker a self-evaluation verdict must contain to pass.
pub const PASS_MARKER: &str = "PASS";

/// Extract bullet items from a response.
///
/// A line is an item iff its trimmed form starts with a bullet marker. Only
/// that one marker and the surrounding whitespace are stripped, so emphasis
/// such as `**bold**` survives. Rules made only of markers (`---`) and all
/// other lines are dropped.
pub fn parse_bullets(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            let marker = line.chars().next().filter(|c| BULLET_MARKERS.contains(c))?;
            let item = line[marker.len_utf8()..].trim();
            let is_rule = item.chars().all(|c| BULLET_MARKERS.contains(&c) || c.is_whitespace());
            (!is_rule).then(|| item.to_string())
        })
        .collect()
}

/// Parse the first bracketed list of non-negative integers, e.g. `[0, 2, 1]`.
///
/// Returns `None` when there is no bracketed list or any element fails to
/// parse. `[]` parses to an empty list.
pub fn parse_index_list(response: &str) -> Option<Vec<usize>> {
    let start = response.find('[')?;
    let len = response[start..].find(']')?;
    let inner = response[start + 1..start + len].trim();
    if inner.is_empty() {
        return Some(Vec::new());
    }
    inner
        .split(',')
        .map(|part| part.trim().parse::<usize>().ok())
        .collect()
}

/// Whether a self-evaluation response is a pass (case-insensitive).
pub fn evaluation_passed(verdict: &str) -> bool {
    verdict.to_uppercase().contains(PASS_MARKER)
}

/// The first `max_chars` characters of `text`, respecting char boundaries.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullets_keep_only_marked_lines() {
        let response = "Here are the patterns:\n\
                        - Burden shifting\n\
                        \n\
                          *  Materiality of facts  \n\
                        • Plausibility\n\
                        1. numbered items are ignored\n\
                        Closing remark.";
        assert_eq!(
            parse_bullets(response),
            ["Burden shifting", "Materiality of facts", "Plausibility"]
        );
    }

    #[test]
    fn bullets_from_prose_are_empty() {
        assert!(parse_bullets("No list here at all.").is_empty());
        assert!(parse_bullets("").is_empty());
    }

    #[test]
    fn emphasis_inside_items_survives() {
        let response = "- **Burden shifting**: movant must show absence of dispute\n\
                        * *Celotex* controls\n\
                        • - nested dash stays";
        assert_eq!(
            parse_bullets(response),
            [
                "**Burden shifting**: movant must show absence of dispute",
                "*Celotex* controls",
                "- nested dash stays",
            ]
        );
    }

    #[test]
    fn bare_markers_are_skipped() {
        assert_eq!(parse_bullets("-\n- \n--- \n- real"), ["real"]);
    }

    #[test]
    fn index_list_parses_plain_and_wrapped() {
        assert_eq!(parse_index_list("[0, 1, 2, 3, 4]"), Some(vec![0, 1, 2, 3, 4]));
        assert_eq!(
            parse_index_list("The top findings are [3,1 , 0] in order."),
            Some(vec![3, 1, 0])
        );
        assert_eq!(parse_index_list("[]"), Some(vec![]));
    }

    #[test]
    fn index_list_rejects_garbage() {
        assert_eq!(parse_index_list("0, 1, 2"), None);
        assert_eq!(parse_index_list("[0, one, 2]"), None);
        assert_eq!(parse_index_list("[-1, 2]"), None);
        assert_eq!(parse_index_list("[0, 1"), None);
    }

    #[test]
    fn verdicts() {
        assert!(evaluation_passed("PASS"));
        assert!(evaluation_passed("  pass."));
        assert!(evaluation_passed("Verdict: Pass"));
        assert!(!evaluation_passed("FAIL"));
        assert!(!evaluation_passed(""));
    }

    #[test]
    fn excerpt_is_char_safe() {
        assert_eq!(excerpt("héllo wörld", 4), "héll");
        assert_eq!(excerpt("short", 200), "short");
    }
}

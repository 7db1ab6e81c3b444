//! Joins the TXT strings of one answer into a single reply.
//!
//! Long replies arrive as `N/M:content` fragments in arbitrary order. Sets
//! without that explicit shape are concatenated as received.

use dnschat_domain::{ParsedFragmentId, TxtRecordFragment};
use fancy_regex::Regex;
use std::sync::LazyLock;

static FRAGMENT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(\d+)/(\d+):(.*)$").expect("fragment id pattern is valid")
});

pub struct Reassembler;

impl Reassembler {
    /// Never fails; malformed input degrades to a best-effort concatenation.
    pub fn reassemble(fragments: &[TxtRecordFragment]) -> String {
        match fragments {
            [] => String::new(),
            [single] => single.raw_content.clone(),
            _ => {
                let parsed: Vec<ParsedFragmentId> = fragments
                    .iter()
                    .filter_map(|f| Self::parse_fragment_id(&f.raw_content))
                    .collect();

                if parsed.is_empty() {
                    return fragments.iter().map(|f| f.raw_content.as_str()).collect();
                }

                let mut parsed = parsed;
                // Stable: fragments sharing an index keep their received order.
                parsed.sort_by_key(|p| p.index);
                parsed.into_iter().map(|p| p.content).collect()
            }
        }
    }

    /// Splits `N/M:content`; `None` when the prefix is absent or a number overflows.
    pub fn parse_fragment_id(raw: &str) -> Option<ParsedFragmentId> {
        let caps = FRAGMENT_ID.captures(raw).ok().flatten()?;
        let index = caps.get(1)?.as_str().parse::<u32>().ok()?;
        let total = caps.get(2)?.as_str().parse::<u32>().ok()?;
        let content = caps.get(3)?.as_str().to_string();
        Some(ParsedFragmentId {
            index,
            total,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frags(items: &[&str]) -> Vec<TxtRecordFragment> {
        items.iter().map(|s| TxtRecordFragment::from(*s)).collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(Reassembler::reassemble(&[]), "");
    }

    #[test]
    fn test_single_fragment_is_verbatim() {
        assert_eq!(Reassembler::reassemble(&frags(&["hello"])), "hello");
        assert_eq!(Reassembler::reassemble(&frags(&["1/2:half"])), "1/2:half");
    }

    #[test]
    fn test_multi_part_is_sorted() {
        let input = frags(&["2/3:B", "1/3:A", "3/3:C"]);
        assert_eq!(Reassembler::reassemble(&input), "ABC");
    }

    #[test]
    fn test_unparseable_fragments_are_dropped() {
        let input = frags(&["1/2:a", "notanumber"]);
        assert_eq!(Reassembler::reassemble(&input), "a");
    }

    #[test]
    fn test_numeric_only_set_keeps_received_order() {
        assert_eq!(Reassembler::reassemble(&frags(&["2", "1"])), "21");
    }

    #[test]
    fn test_duplicate_indices_keep_relative_order() {
        let input = frags(&["2/2:y", "1/2:a", "1/2:b"]);
        assert_eq!(Reassembler::reassemble(&input), "aby");
    }

    #[test]
    fn test_content_may_contain_colons_and_newlines() {
        let input = frags(&["2/2:c:d", "1/2:a\nb"]);
        assert_eq!(Reassembler::reassemble(&input), "a\nbc:d");
    }

    #[test]
    fn test_overflowing_index_is_unparseable() {
        assert!(Reassembler::parse_fragment_id("99999999999/2:x").is_none());
        let parsed = Reassembler::parse_fragment_id("3/10:").unwrap();
        assert_eq!((parsed.index, parsed.total, parsed.content.as_str()), (3, 10, ""));
    }
}

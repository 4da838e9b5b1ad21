use std::sync::OnceLock;

use karmacheck_core::DEFAULT_CONFIDENCE_THRESHOLD;
use regex::Regex;

/// Markdown link: one bracket pair immediately followed by one paren pair.
const MARKDOWN_LINK_PATTERN: &str = r"\[[^\]\n]*\]\([^)\n]*\)";

fn markdown_link() -> &'static Regex {
    static LINK: OnceLock<Regex> = OnceLock::new();
    LINK.get_or_init(|| Regex::new(MARKDOWN_LINK_PATTERN).expect("valid markdown link regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confidence {
    pub links: usize,
    pub confident: bool,
}

/// Judges whether a lookup response carries enough candidate matches to be
/// worth reporting. A single link is usually a false positive.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceScorer {
    threshold: usize,
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

impl ConfidenceScorer {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn score(&self, response: &str) -> Confidence {
        let links = count_links(response);
        Confidence {
            links,
            confident: links >= self.threshold,
        }
    }

    pub fn is_confident(&self, response: &str) -> bool {
        self.score(response).confident
    }
}

pub fn count_links(text: &str) -> usize {
    markdown_link().find_iter(text).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_link_is_not_confident() {
        let scorer = ConfidenceScorer::default();
        let score = scorer.score("Anyone seen this? [x](y)");
        assert_eq!(score.links, 1);
        assert!(!score.confident);
    }

    #[test]
    fn test_two_links_on_one_line_are_confident() {
        let scorer = ConfidenceScorer::default();
        let score = scorer.score("[first](https://a) and [second](https://b)");
        assert_eq!(score.links, 2);
        assert!(score.confident);
    }

    #[test]
    fn test_no_links() {
        let scorer = ConfidenceScorer::default();
        assert_eq!(scorer.score("").links, 0);
        assert!(!scorer.is_confident("plain text (with parens) and [brackets]"));
    }

    #[test]
    fn test_bracket_and_paren_must_be_adjacent() {
        assert_eq!(count_links("[a] (b)"), 0);
        assert_eq!(count_links("[a](b)[c](d)"), 2);
    }

    #[test]
    fn test_karmadecay_comment() {
        let comment = "Anyone seen this before? | Title | Date | Points\n\
                       [Same pic](https://www.reddit.com/r/pics/comments/1) | 2 years ago | 1200\n\
                       [Older one](https://www.reddit.com/r/funny/comments/2) | 3 years ago | 800\n\
                       [Source: karmadecay](http://karmadecay.com/r/pics/comments/3)";
        let score = ConfidenceScorer::default().score(comment);
        assert_eq!(score.links, 3);
        assert!(score.confident);
    }

    #[test]
    fn test_custom_threshold() {
        let scorer = ConfidenceScorer::new(3);
        assert_eq!(scorer.threshold(), 3);
        assert!(!scorer.is_confident("[a](b) [c](d)"));
        assert!(scorer.is_confident("[a](b) [c](d) [e](f)"));
    }
}

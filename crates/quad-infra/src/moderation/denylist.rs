use quad_core::ports::Verdict;

/// High-severity terms checked when the remote classifier cannot be
/// consulted. Matching is a case-insensitive substring scan, so a term
/// inside a longer word still counts.
const DENY_TERMS: [&str; 6] = ["murder", "kill", "weapon", "bomb", "terrorist", "suicide"];

/// Local keyword screen used as the fallback verdict source.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyList;

impl DenyList {
    pub fn new() -> Self {
        Self
    }

    pub fn verdict(&self, content: &str) -> Verdict {
        let lowered = content.to_lowercase();
        for term in DENY_TERMS {
            if lowered.contains(term) {
                return Verdict::flagged_for(format!("deny_list:{term}"));
            }
        }
        Verdict::clean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_each_term_regardless_of_case() {
        let deny = DenyList::new();
        for term in ["murder", "KILL", "Weapon", "bOmB", "terrorist", "Suicide"] {
            let verdict = deny.verdict(&format!("something about {term} here"));
            assert!(verdict.flagged, "{term} should be flagged");
            assert!(verdict.category.as_deref().unwrap().starts_with("deny_list:"));
        }
    }

    #[test]
    fn matches_terms_inside_longer_words() {
        let deny = DenyList::new();
        assert!(deny.verdict("sharpening my skills").flagged);
    }

    #[test]
    fn ordinary_content_is_clean() {
        let deny = DenyList::new();
        let verdict = deny.verdict("anyone up for pizza after the exam?");
        assert!(!verdict.flagged);
        assert_eq!(verdict.category, None);
    }
}

use crate::oracle::UtilityOracle;
use futures::future;
use thiserror::Error;

/// One class region scheduled for replacement. `start` and `original` come
/// from the pristine document text; `replacement` may be any length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionEdit {
    pub start: usize,
    pub original: String,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("class region at byte {start} is too short ({length} bytes) to hold a unique placeholder")]
pub struct RegionError {
    pub start: usize,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub text: String,
    pub failures: Vec<RegionError>,
}

/// Rewrites one extracted class list. Tokens are classified concurrently but
/// rejoined in input order; splitting on single spaces keeps empty tokens
/// from repeated spaces intact, so the token count never changes. Returns a
/// value equal to the input when nothing needed rewriting.
pub async fn transform_class_list(
    oracle: &dyn UtilityOracle,
    extracted: &str,
    prefix: &str,
) -> String {
    let tokens: Vec<&str> = extracted.split(' ').collect();
    let transformed = future::join_all(
        tokens
            .iter()
            .map(|token| transform_token(oracle, token, prefix)),
    )
    .await;
    transformed.join(" ")
}

async fn transform_token(oracle: &dyn UtilityOracle, token: &str, prefix: &str) -> String {
    let (marker, bare) = match token.strip_prefix('!') {
        Some(rest) => ("!", rest),
        None => ("", token),
    };
    if bare.is_empty() || !oracle.is_utility(bare).await {
        return token.to_string();
    }
    format!("{}{}{}", marker, prefix, bare)
}

/// Two-phase rewrite of regions located against the pristine text.
///
/// Phase one walks edits in discovery order and swaps each region for a
/// placeholder key of exactly the region's byte length. Because every swap
/// preserves length, the pristine offsets of all later regions stay valid in
/// the running buffer. Phase two replaces each key with its final text, in
/// any order, since keys are unique and absent from the source by
/// construction. A region too short to hold a unique key is abandoned with
/// a recorded failure; its siblings still rewrite.
pub fn rewrite_regions(original: &str, edits: &[RegionEdit]) -> RewriteOutcome {
    let mut buffer = original.to_string();
    let mut resolutions: Vec<(String, String)> = Vec::new();
    let mut failures = Vec::new();

    for edit in edits {
        if edit.replacement == edit.original {
            continue;
        }
        let length = edit.original.len();
        let Some(key) = placeholder_key(resolutions.len() + 1, length) else {
            failures.push(RegionError {
                start: edit.start,
                length,
            });
            continue;
        };
        buffer.replace_range(edit.start..edit.start + length, &key);
        resolutions.push((key, edit.replacement.clone()));
    }

    for (key, replacement) in &resolutions {
        buffer = buffer.replacen(key.as_str(), replacement, 1);
    }

    RewriteOutcome {
        text: buffer,
        failures,
    }
}

/// `$` sentinel, `_` filler, then the counter; total length equals the
/// region being replaced. At least one filler character is required so the
/// key cannot collide with a bare `$<counter>` occurring in a document.
fn placeholder_key(counter: usize, length: usize) -> Option<String> {
    let digits = counter.to_string();
    let filler = length.checked_sub(1 + digits.len())?;
    if filler == 0 {
        return None;
    }
    Some(format!("${}{}", "_".repeat(filler), digits))
}

#[cfg(test)]
mod tests {
    use super::{RegionEdit, placeholder_key, rewrite_regions, transform_class_list};
    use crate::oracle::{GeneratedCss, UtilityOracle};
    use async_trait::async_trait;
    use std::collections::HashSet;

    struct FixedOracle {
        utilities: HashSet<String>,
    }

    impl FixedOracle {
        fn recognizing(utilities: &[&str]) -> Self {
            Self {
                utilities: utilities.iter().map(|name| name.to_string()).collect(),
            }
        }
    }

    #[async_trait]
    impl UtilityOracle for FixedOracle {
        async fn is_utility(&self, token: &str) -> bool {
            self.utilities.contains(token)
        }

        async fn css_for(&self, _tokens: &[String]) -> Option<GeneratedCss> {
            None
        }
    }

    #[tokio::test]
    async fn prefixes_recognized_tokens_only() {
        let oracle = FixedOracle::recognizing(&["flex", "hidden"]);
        let result = transform_class_list(&oracle, "flex foo hidden", "tw-").await;
        assert_eq!(result, "tw-flex foo tw-hidden");
    }

    #[tokio::test]
    async fn keeps_negation_marker_outside_the_prefix() {
        let oracle = FixedOracle::recognizing(&["hidden", "flex"]);
        let result = transform_class_list(&oracle, "!hidden flex", "tw-").await;
        assert_eq!(result, "!tw-hidden tw-flex");
    }

    #[tokio::test]
    async fn preserves_empty_tokens_from_repeated_spaces() {
        let oracle = FixedOracle::recognizing(&["flex"]);
        let result = transform_class_list(&oracle, "flex  foo ", "tw-").await;
        assert_eq!(result, "tw-flex  foo ");
        assert_eq!(result.split(' ').count(), "flex  foo ".split(' ').count());
    }

    #[tokio::test]
    async fn returns_input_unchanged_when_nothing_matches() {
        let oracle = FixedOracle::recognizing(&[]);
        let input = "foo  bar !baz";
        let result = transform_class_list(&oracle, input, "tw-").await;
        assert_eq!(result, input);
    }

    #[tokio::test]
    async fn bare_marker_token_passes_through() {
        let oracle = FixedOracle::recognizing(&["flex"]);
        let result = transform_class_list(&oracle, "! flex", "tw-").await;
        assert_eq!(result, "! tw-flex");
    }

    #[test]
    fn placeholder_keys_match_region_length() {
        assert_eq!(placeholder_key(1, 8).as_deref(), Some("$______1"));
        assert_eq!(placeholder_key(3, 3).as_deref(), Some("$_3"));
        assert_eq!(placeholder_key(12, 5).as_deref(), Some("$__12"));
        assert_eq!(placeholder_key(1, 2), None);
        assert_eq!(placeholder_key(10, 3), None);
    }

    #[test]
    fn rewrites_regions_whose_text_embeds_another_region() {
        let text = r#"<a class="flex foo"><b class="flex"></b></a>"#;
        let first_start = text.find("flex foo").expect("first region");
        let second_start = text.rfind("flex").expect("second region");

        let outcome = rewrite_regions(
            text,
            &[
                RegionEdit {
                    start: first_start,
                    original: "flex foo".to_string(),
                    replacement: "tw-flex foo".to_string(),
                },
                RegionEdit {
                    start: second_start,
                    original: "flex".to_string(),
                    replacement: "tw-flex".to_string(),
                },
            ],
        );

        assert!(outcome.failures.is_empty());
        assert_eq!(
            outcome.text,
            r#"<a class="tw-flex foo"><b class="tw-flex"></b></a>"#
        );
    }

    #[test]
    fn later_offsets_survive_shorter_replacements() {
        let text = r#"<i class="hidden block"></i><i class="hidden"></i>"#;
        let first_start = text.find("hidden block").expect("first region");
        let second_start = text.rfind("hidden").expect("second region");

        let outcome = rewrite_regions(
            text,
            &[
                RegionEdit {
                    start: first_start,
                    original: "hidden block".to_string(),
                    replacement: "x".to_string(),
                },
                RegionEdit {
                    start: second_start,
                    original: "hidden".to_string(),
                    replacement: "tw-hidden".to_string(),
                },
            ],
        );

        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.text, r#"<i class="x"></i><i class="tw-hidden"></i>"#);
    }

    #[test]
    fn too_short_region_fails_loudly_without_hurting_siblings() {
        let text = r#"<i class="ab"></i><i class="hidden"></i>"#;
        let first_start = text.find("ab").expect("first region");
        let second_start = text.find("hidden").expect("second region");

        let outcome = rewrite_regions(
            text,
            &[
                RegionEdit {
                    start: first_start,
                    original: "ab".to_string(),
                    replacement: "tw-ab".to_string(),
                },
                RegionEdit {
                    start: second_start,
                    original: "hidden".to_string(),
                    replacement: "tw-hidden".to_string(),
                },
            ],
        );

        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].start, first_start);
        assert_eq!(outcome.failures[0].length, 2);
        assert_eq!(outcome.text, r#"<i class="ab"></i><i class="tw-hidden"></i>"#);
    }

    #[test]
    fn identity_edits_are_skipped() {
        let text = r#"<i class="foo"></i>"#;
        let start = text.find("foo").expect("region");
        let outcome = rewrite_regions(
            text,
            &[RegionEdit {
                start,
                original: "foo".to_string(),
                replacement: "foo".to_string(),
            }],
        );
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.text, text);
    }
}

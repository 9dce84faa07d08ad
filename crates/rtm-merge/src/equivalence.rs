//! Equivalence of two identity-matched elements.
//!
//! Only the elements themselves are compared; children are handled by the
//! reconciler's walk.
//!
//! The attribute-count check runs before bookkeeping attributes are
//! excluded, so an element that merely gained or lost a fingerprint or an
//! internal attribute is *not* equivalent. Values of bookkeeping attributes
//! present on both sides are ignored.

use rtm_dom::Element;

use crate::config::MergeConfig;

/// Returns `true` if `proposed` carries the same content as `original`.
pub fn equivalent(original: &Element, proposed: &Element, config: &MergeConfig) -> bool {
    if original.name != proposed.name {
        return false;
    }
    if original.attributes.len() != proposed.attributes.len() {
        return false;
    }
    original
        .attributes
        .iter()
        .filter(|a| !config.is_bookkeeping(&a.name))
        .all(|a| proposed.attributes.get(&a.name) == Some(a.value.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(name: &str, attrs: &[(&str, &str)]) -> Element {
        attrs
            .iter()
            .fold(Element::new(name), |e, (k, v)| e.with_attr(*k, *v))
    }

    fn eq(a: &Element, b: &Element) -> bool {
        equivalent(a, b, &MergeConfig::default())
    }

    #[test]
    fn identical_elements() {
        let a = el("div", &[("id", "a"), ("x", "1")]);
        assert!(eq(&a, &a.clone()));
    }

    #[test]
    fn attribute_order_is_irrelevant() {
        let a = el("div", &[("id", "a"), ("x", "1")]);
        let b = el("div", &[("x", "1"), ("id", "a")]);
        assert!(eq(&a, &b));
    }

    #[test]
    fn tag_mismatch() {
        assert!(!eq(&el("div", &[("id", "a")]), &el("span", &[("id", "a")])));
    }

    #[test]
    fn value_mismatch() {
        assert!(!eq(
            &el("div", &[("id", "a"), ("x", "1")]),
            &el("div", &[("id", "a"), ("x", "2")])
        ));
    }

    #[test]
    fn missing_attribute_with_same_count() {
        assert!(!eq(
            &el("div", &[("id", "a"), ("x", "1")]),
            &el("div", &[("id", "a"), ("y", "1")])
        ));
    }

    #[test]
    fn bookkeeping_values_are_ignored() {
        let a = el("div", &[("id", "a"), ("z", "h1"), ("_seen", "yes")]);
        let b = el("div", &[("id", "a"), ("z", "h2"), ("_seen", "no")]);
        assert!(eq(&a, &b));
    }

    #[test]
    fn bookkeeping_name_may_differ_when_counts_match() {
        let a = el("div", &[("id", "a"), ("z", "h1")]);
        let b = el("div", &[("id", "a"), ("_render", "true")]);
        assert!(eq(&a, &b));
    }

    #[test]
    fn count_check_precedes_exclusion() {
        // Only difference is the fingerprint, yet counts differ.
        let a = el("div", &[("id", "a"), ("z", "h1")]);
        let b = el("div", &[("id", "a")]);
        assert!(!eq(&a, &b));
        assert!(!eq(&b, &a));
    }

    #[test]
    fn empty_values_compare_equal() {
        let a = el("div", &[("id", "a"), ("title", "")]);
        assert!(eq(&a, &a.clone()));
    }

    #[test]
    fn configured_names_are_honoured() {
        let config = MergeConfig {
            fingerprint_attribute: "hash".into(),
            internal_prefix: "rtm:".into(),
            ..Default::default()
        };
        let a = el("div", &[("id", "a"), ("hash", "1"), ("rtm:x", "1")]);
        let b = el("div", &[("id", "a"), ("hash", "2"), ("rtm:x", "2")]);
        assert!(equivalent(&a, &b, &config));
        let c = el("div", &[("id", "a"), ("z", "1"), ("_x", "1")]);
        let d = el("div", &[("id", "a"), ("z", "2"), ("_x", "2")]);
        assert!(!equivalent(&c, &d, &config));
    }
}

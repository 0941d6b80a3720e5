use manuscript_transform::common::citations::{citation_label, collapse_numbers, number_references};
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Expands a collapsed label back into the numbers it covers.
fn expand(label: &str) -> BTreeSet<usize> {
    let mut numbers = BTreeSet::new();
    for part in label.split(',') {
        match part.split_once('\u{2013}') {
            Some((start, end)) => {
                let (start, end): (usize, usize) = (start.parse().unwrap(), end.parse().unwrap());
                assert!(end >= start + 2, "range {part} is too short to collapse");
                numbers.extend(start..=end);
            }
            None => {
                numbers.insert(part.parse().unwrap());
            }
        }
    }
    numbers
}

#[test]
fn runs_of_three_collapse() {
    assert_eq!(collapse_numbers(&[1, 2, 3, 5]), "1\u{2013}3,5");
    assert_eq!(collapse_numbers(&[2, 1]), "1,2");
    assert_eq!(collapse_numbers(&[4, 4, 4]), "4");
    assert_eq!(collapse_numbers(&[]), "");
}

#[test]
fn labels_follow_bibliography_order() {
    let numbering = number_references(["b", "a", "c", "a"]);
    assert_eq!(numbering["b"], 1);
    assert_eq!(numbering["a"], 2);
    assert_eq!(numbering["c"], 3);

    let rids = |ids: &[&str]| ids.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    assert_eq!(citation_label(&rids(&["c", "b", "a"]), &numbering).as_deref(), Some("1\u{2013}3"));
    assert_eq!(citation_label(&rids(&["x"]), &numbering), None);
}

proptest! {
    #[test]
    fn collapsing_keeps_every_number(numbers in prop::collection::vec(1usize..60, 0..20)) {
        let label = collapse_numbers(&numbers);
        let expected: BTreeSet<usize> = numbers.iter().copied().collect();
        if expected.is_empty() {
            prop_assert_eq!(label, "");
        } else {
            prop_assert_eq!(expand(&label), expected);
        }
    }
}

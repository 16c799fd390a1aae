use itertools::{EitherOrBoth, Itertools};

use crate::label::Label;

/// Returns true if `label_a` dominates `label_b`.
///
/// `label_a` dominates when, for every resource not listed in `excluded`, each element
/// of its value is at most the matching element of `label_b`. Every label dominates
/// itself and equal labels dominate each other; which one survives is up to the caller.
///
/// Only meaningful for two labels at the same node, which is not checked. A compared
/// resource missing from either label, or stored with different lengths, never dominates.
pub fn dominates(label_a : &Label, label_b : &Label, excluded : &[&str]) -> bool {
    let compared = |name : &str| !excluded.contains(&name);

    if label_b.resources().keys().any(|name| compared(name) && label_a.resource(name).is_none()) {
        return false;
    }

    label_a
        .resources()
        .iter()
        .filter(|(name, _)| compared(name))
        .all(|(name, value_a)| {
            let Some(value_b) = label_b.resource(name) else {
                return false;
            };
            value_a.iter().zip_longest(value_b.iter()).all(|pair| match pair {
                // a NaN on either side does not block dominance
                EitherOrBoth::Both(a, b) => !(a > b),
                _ => false,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::Resources;
    use crate::resource::ResourceVector;

    fn label(node : usize, cost : f64, time : f64, visited : Vec<f64>) -> Label {
        let mut resources = Resources::new();
        resources.insert("reduced_cost".to_owned(), ResourceVector::scalar(cost));
        resources.insert("time".to_owned(), ResourceVector::scalar(time));
        resources.insert("is_visited".to_owned(), visited.into());
        Label::new(node, resources)
    }

    #[test]
    fn reflexive() {
        let l = label(3, -4.0, 12.0, vec![1.0, 0.0, 1.0]);
        assert!(dominates(&l, &l, &[]));
    }

    #[test]
    fn strict_and_mutual() {
        let better = label(3, -4.0, 12.0, vec![0.0, 0.0, 1.0]);
        let worse = label(3, -2.0, 12.0, vec![0.0, 1.0, 1.0]);
        assert!(dominates(&better, &worse, &[]));
        assert!(!dominates(&worse, &better, &[]));

        let twin = better.clone();
        assert!(dominates(&better, &twin, &[]));
        assert!(dominates(&twin, &better, &[]));
    }

    #[test]
    fn exclusion_relaxes() {
        let a = label(3, -4.0, 20.0, vec![0.0, 0.0, 1.0]);
        let b = label(3, -2.0, 12.0, vec![0.0, 1.0, 1.0]);
        assert!(!dominates(&a, &b, &[]));
        assert!(dominates(&a, &b, &["time"]));
        assert!(dominates(&a, &b, &["time", "is_visited"]));
    }

    #[test]
    fn negative_costs() {
        let a = label(1, -10.0, 5.0, vec![0.0, 1.0]);
        let b = label(1, -9.5, 5.0, vec![0.0, 1.0]);
        assert!(dominates(&a, &b, &[]));
        assert!(!dominates(&b, &a, &[]));
    }

    #[test]
    fn mismatched_shapes_never_dominate() {
        let a = label(1, 0.0, 0.0, vec![0.0, 0.0]);
        let b = label(1, 0.0, 0.0, vec![0.0, 0.0, 0.0]);
        assert!(!dominates(&a, &b, &[]));
        assert!(dominates(&a, &b, &["is_visited"]));

        let mut resources = a.resources().clone();
        resources.remove("time");
        let partial = Label::new(1, resources);
        assert!(!dominates(&a, &partial, &[]));
        assert!(!dominates(&partial, &a, &[]));
        assert!(dominates(&partial, &a, &["time"]));
        assert!(dominates(&a, &partial, &["time"]));
    }
}

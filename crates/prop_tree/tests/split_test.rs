use approx::assert_relative_eq;
use prop_tree::bag::{ActiveMask, Bag, Dataset};
use prop_tree::split::{SplitCandidate, SplitStrategy};

fn one_attribute(values: &[(f64, u32)]) -> Dataset {
    let bags = values
        .iter()
        .map(|&(v, label)| Bag::new(vec![vec![v]], Some(label)))
        .collect();
    Dataset::new(bags).unwrap()
}

fn thresholds(strategy: SplitStrategy, ds: &Dataset) -> Vec<f64> {
    strategy
        .generate_candidates(ds, &ActiveMask::all_active(ds.n_instances()))
        .into_iter()
        .map(|c| c.threshold)
        .collect()
}

#[test]
fn test_median_odd_count_is_middle_value() {
    let ds = one_attribute(&[(9.0, 0), (1.0, 0), (4.0, 1)]);
    let t = thresholds(SplitStrategy::Median, &ds);
    assert_eq!(t.len(), 1);
    assert_relative_eq!(t[0], 4.0, epsilon = 1e-12);
}

#[test]
fn test_median_even_count_averages_middle_values() {
    let ds = one_attribute(&[(10.0, 0), (1.0, 1), (4.0, 0), (6.0, 1)]);
    let t = thresholds(SplitStrategy::Median, &ds);
    assert_relative_eq!(t[0], 5.0, epsilon = 1e-12);
}

#[test]
fn test_mean_and_range_midpoint() {
    let ds = one_attribute(&[(1.0, 0), (2.0, 0), (9.0, 1)]);
    assert_relative_eq!(thresholds(SplitStrategy::Mean, &ds)[0], 4.0, epsilon = 1e-12);
    assert_relative_eq!(thresholds(SplitStrategy::RangeMidpoint, &ds)[0], 5.0, epsilon = 1e-12);
}

#[test]
fn test_discretized_only_at_label_changes() {
    let ds = one_attribute(&[(1.0, 0), (2.0, 0), (3.0, 1), (4.0, 1), (5.0, 0)]);
    assert_eq!(thresholds(SplitStrategy::Discretized, &ds), vec![2.5, 4.5]);
}

#[test]
fn test_candidates_ordered_by_attribute() {
    let ds = Dataset::new(vec![
        Bag::new(vec![vec![0.0, 10.0], vec![2.0, 30.0]], Some(0)),
        Bag::new(vec![vec![4.0, 50.0]], Some(1)),
    ])
    .unwrap();
    let candidates = SplitStrategy::Mean.generate_candidates(&ds, &ActiveMask::all_active(3));
    assert_eq!(
        candidates,
        vec![SplitCandidate::new(0, 2.0), SplitCandidate::new(1, 30.0)]
    );
}

#[test]
fn test_only_active_instances_contribute() {
    let ds = one_attribute(&[(1.0, 0), (2.0, 1), (100.0, 0)]);
    let mut mask = ActiveMask::all_active(3);
    mask.ignore(2);
    let candidates = SplitStrategy::Mean.generate_candidates(&ds, &mask);
    assert_relative_eq!(candidates[0].threshold, 1.5, epsilon = 1e-12);
}

#[test]
fn test_no_active_instances_means_no_candidates() {
    let ds = one_attribute(&[(1.0, 0), (2.0, 1)]);
    let mut mask = ActiveMask::all_active(2);
    mask.ignore(0);
    mask.ignore(1);
    for strategy in SplitStrategy::ALL {
        assert!(strategy.generate_candidates(&ds, &mask).is_empty());
        assert!(!strategy.can_expand(&ds, &mask));
    }
}

#[test]
fn test_discretized_pure_region_is_not_expandable() {
    let ds = one_attribute(&[(1.0, 1), (2.0, 1), (3.0, 0)]);
    let mut mask = ActiveMask::all_active(3);
    assert!(SplitStrategy::Discretized.can_expand(&ds, &mask));
    assert!(SplitStrategy::Median.can_expand(&ds, &mask));

    mask.ignore(2);
    assert!(!SplitStrategy::Discretized.can_expand(&ds, &mask));
    assert!(SplitStrategy::Median.can_expand(&ds, &mask));
}

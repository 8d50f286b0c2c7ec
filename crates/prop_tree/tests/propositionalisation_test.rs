use prop_tree::bag::{ActiveMask, Bag, Dataset};
use prop_tree::propositionalisation::PropositionalisationStrategy;
use prop_tree::split::SplitCandidate;
use prop_tree::tree::Tree;

/// 3 bags of 4 instances with 5 attributes, filled with consecutive integers
/// so that bag `b`, instance `i`, attribute `j` holds `20b + 5i + j`.
fn consecutive_bags() -> Dataset {
    let bags = (0..3)
        .map(|b| {
            let instances = (0..4)
                .map(|i| (0..5).map(|j| (20 * b + 5 * i + j) as f64).collect())
                .collect();
            Bag::new(instances, Some((b % 2) as u32))
        })
        .collect();
    Dataset::new(bags).unwrap()
}

fn single_split_tree(attribute: usize, threshold: f64, strategy: PropositionalisationStrategy) -> Tree {
    let mut tree = Tree::new(5, strategy);
    tree.commit(0, SplitCandidate::new(attribute, threshold), 0.0);
    tree
}

#[test]
fn test_split_counts_match_direct_enumeration() {
    let ds = consecutive_bags();
    let tree = single_split_tree(2, 25.0, PropositionalisationStrategy::CountOnly);

    let mut counts = Vec::new();
    for bag in ds.bags() {
        let row = tree.propositionalize_bag(bag).unwrap();
        assert_eq!(row.len(), 4);

        let expected_left = bag.instances.iter().filter(|inst| inst[2] <= 25.0).count();
        let expected_right = bag.len() - expected_left;
        assert_eq!(row[1] as usize, expected_left);
        assert_eq!(row[2] as usize, expected_right);
        counts.push((row[1] as usize, row[2] as usize));
    }
    // attribute 2 holds 2, 7, 12, 17 / 22, 27, 32, 37 / 42, 47, 52, 57
    assert_eq!(counts, vec![(4, 0), (1, 3), (0, 4)]);
}

#[test]
fn test_left_plus_right_equals_whole_bag() {
    let ds = consecutive_bags();
    for threshold in [-1.0, 10.0, 33.0, 100.0] {
        let tree = single_split_tree(4, threshold, PropositionalisationStrategy::CountOnly);
        for bag in ds.bags() {
            let row = tree.propositionalize_bag(bag).unwrap();
            assert_eq!(row[0] as usize, bag.len());
            assert_eq!(row[1] + row[2], row[0]);
        }
    }
}

#[test]
fn test_label_is_last_value() {
    let ds = consecutive_bags();
    let tree = single_split_tree(0, 0.0, PropositionalisationStrategy::SummaryStats);
    for bag in ds.bags() {
        let row = tree.propositionalize_bag(bag).unwrap();
        assert_eq!(row.len(), 3 * 25 + 1);
        assert_eq!(*row.last().unwrap(), bag.label.unwrap() as f64);
    }
}

#[test]
fn test_empty_region_summary_is_all_zero() {
    let instances = vec![vec![1.0, -2.0], vec![3.0, 4.0]];
    let mut mask = ActiveMask::all_active(2);
    mask.ignore(0);
    mask.ignore(1);

    let mut out = vec![f64::NAN; 10];
    PropositionalisationStrategy::SummaryStats.propositionalize(&instances, 2, &mask, &mut out, 0);
    assert_eq!(out, vec![0.0; 10]);
}

#[test]
fn test_summary_stats_of_active_instances() {
    let instances = vec![vec![1.0], vec![3.0], vec![8.0]];
    let mut mask = ActiveMask::all_active(3);
    mask.ignore(2);

    let mut out = vec![0.0; 5];
    PropositionalisationStrategy::SummaryStats.propositionalize(&instances, 1, &mask, &mut out, 0);
    assert_eq!(out, vec![2.0, 4.0, 1.0, 3.0, 2.0]);
}

#[test]
fn test_nested_split_only_sees_parent_region() {
    // root: a0 <= 10, then its right child: a0 <= 30
    let mut tree = Tree::new(1, PropositionalisationStrategy::CountOnly);
    tree.commit(0, SplitCandidate::new(0, 10.0), 0.0);
    let (_, right) = tree.expand(0);
    tree.commit(right, SplitCandidate::new(0, 30.0), 0.0);

    let bag = Bag::new(vec![vec![5.0], vec![20.0], vec![25.0], vec![40.0]], Some(1));
    let row = tree.propositionalize_bag(&bag).unwrap();
    // whole, root left, root right, child left, child right, label
    assert_eq!(row, vec![4.0, 1.0, 3.0, 2.0, 1.0, 1.0]);
}

#[test]
fn test_unsplit_tree_has_whole_bag_region_only() {
    let ds = consecutive_bags();
    let tree = Tree::new(5, PropositionalisationStrategy::CountOnly);
    let (table, labels, schema) = tree.propositionalize_dataset(&ds).unwrap();
    assert_eq!(table.shape(), (3, 2));
    assert_eq!(labels, vec![0, 1, 0]);
    assert_eq!(schema.len(), 2);
    assert!(schema.contains("region_0_count"));
    assert!(schema.contains("class"));
}

#[test]
fn test_dataset_table_width_follows_region_count() {
    let ds = consecutive_bags();
    let mut tree = Tree::new(5, PropositionalisationStrategy::SummaryStats);
    tree.commit(0, SplitCandidate::new(1, 30.0), 0.0);
    let (left, _) = tree.expand(0);
    tree.commit(left, SplitCandidate::new(3, 10.0), 0.0);

    let (table, _, _) = tree.propositionalize_dataset(&ds).unwrap();
    // (2 * 2 + 1) regions * 25 features + class
    assert_eq!(table.width(), 5 * 25 + 1);
    assert_eq!(table.height(), 3);
}

#[test]
fn test_wrong_dimension_is_rejected() {
    let tree = Tree::new(5, PropositionalisationStrategy::CountOnly);
    let bag = Bag::new(vec![vec![1.0, 2.0]], Some(0));
    assert!(tree.propositionalize_bag(&bag).is_err());
}

#[test]
fn test_summary_names_follow_feature_layout() {
    let names = PropositionalisationStrategy::SummaryStats.attribute_names_for(2, 1);
    assert_eq!(
        names,
        vec![
            "region_0_a0_count",
            "region_0_a0_sum",
            "region_0_a0_min",
            "region_0_a0_max",
            "region_0_a0_mean",
            "region_1_a0_count",
            "region_1_a0_sum",
            "region_1_a0_min",
            "region_1_a0_max",
            "region_1_a0_mean",
        ]
    );
}

#[test]
fn test_region_writes_only_its_own_slice() {
    let instances = vec![vec![1.0], vec![2.0]];
    let mut out = vec![-1.0; 4];
    PropositionalisationStrategy::CountOnly.propositionalize(
        &instances,
        1,
        &ActiveMask::all_active(2),
        &mut out,
        2,
    );
    assert_eq!(out, vec![-1.0, -1.0, 2.0, -1.0]);
}

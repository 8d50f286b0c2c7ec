use prop_tree::bag::{Bag, Dataset};
use prop_tree::conf::TreeConfig;
use prop_tree::error::PropTreeError;
use prop_tree::estimator::PropTreeClassifier;
use prop_tree::models::{GaussianNaiveBayes, LogisticRegression};
use prop_tree::search::SearchStrategy;

/// Class-1 bags hold a few instances with a large first attribute.
fn marker_bags() -> Dataset {
    let bags = (0..10)
        .map(|b| {
            let label = u32::from(b % 2 == 1);
            let mut instances: Vec<Vec<f64>> = (0..4)
                .map(|i| vec![((b + i) % 5) as f64, (i * 2) as f64])
                .collect();
            if label == 1 {
                instances.push(vec![20.0 + b as f64, 1.0]);
                instances.push(vec![22.0 + b as f64, 3.0]);
            }
            Bag::new(instances, Some(label))
        })
        .collect();
    Dataset::new(bags).unwrap()
}

fn small_config(search: SearchStrategy) -> TreeConfig {
    TreeConfig {
        search_strategy: search,
        max_node_count: 3,
        min_occupancy: 2,
        ..TreeConfig::default()
    }
}

#[test]
fn test_fit_and_predict_marker_bags() {
    let ds = marker_bags();
    for search in SearchStrategy::ALL {
        let mut clf = PropTreeClassifier::new(small_config(search), GaussianNaiveBayes::default());
        clf.fit(&ds).unwrap();
        assert!(clf.is_fitted());

        for bag in ds.bags() {
            let p = clf.predict_proba(bag).unwrap();
            assert!((p[0] + p[1] - 1.0).abs() < 1e-9);
            assert_eq!(clf.predict(bag).unwrap(), bag.label.unwrap());
        }
    }
}

#[test]
fn test_schema_matches_propositionalized_bag() {
    let ds = marker_bags();
    let mut clf = PropTreeClassifier::new(small_config(SearchStrategy::BreadthFirst), LogisticRegression::default());
    clf.fit(&ds).unwrap();

    let tree = clf.tree().unwrap();
    let schema = clf.schema().unwrap();
    assert_eq!(schema.len(), tree.width());
    let row = clf.propositionalize(&ds.bags()[0]).unwrap();
    assert_eq!(row.len(), schema.len());
    assert!(clf.tree_info().unwrap().contains("Committed nodes"));
}

#[test]
fn test_unlabelled_bags_are_dropped() {
    let mut bags = marker_bags().bags().to_vec();
    bags.push(Bag::new(vec![vec![1.0, 1.0]], None));
    let ds = Dataset::new(bags).unwrap();

    let mut clf = PropTreeClassifier::new(small_config(SearchStrategy::BestFirst), GaussianNaiveBayes::default());
    clf.fit(&ds).unwrap();
    // unlabelled bags can still be scored
    let p = clf.predict_proba(&ds.bags()[10]).unwrap();
    assert!(p.iter().all(|v| v.is_finite()));
}

#[test]
fn test_only_unlabelled_bags_is_empty_dataset() {
    let ds = Dataset::new(vec![Bag::new(vec![vec![1.0]], None)]).unwrap();
    let mut clf = PropTreeClassifier::new(TreeConfig::default(), GaussianNaiveBayes::default());
    assert!(matches!(clf.fit(&ds), Err(PropTreeError::EmptyDataset)));
    assert!(!clf.is_fitted());
}

#[test]
fn test_predict_before_fit_fails() {
    let clf = PropTreeClassifier::new(TreeConfig::default(), GaussianNaiveBayes::default());
    let bag = Bag::new(vec![vec![1.0]], None);
    assert!(matches!(clf.predict_proba(&bag), Err(PropTreeError::NotFitted)));
    assert!(matches!(clf.tree_info(), Err(PropTreeError::NotFitted)));
}

#[test]
fn test_bag_with_wrong_dimension_fails_prediction() {
    let ds = marker_bags();
    let mut clf = PropTreeClassifier::new(small_config(SearchStrategy::BreadthFirst), GaussianNaiveBayes::default());
    clf.fit(&ds).unwrap();
    let bag = Bag::new(vec![vec![1.0, 2.0, 3.0]], Some(0));
    assert!(matches!(
        clf.predict_proba(&bag),
        Err(PropTreeError::Dimension { expected: 2, actual: 3, .. })
    ));
}

#[test]
fn test_from_options_rejects_unknown_strategy() {
    let result = PropTreeClassifier::from_options(
        [("split-strategy", "entropy")],
        GaussianNaiveBayes::default(),
    );
    assert!(matches!(
        result,
        Err(PropTreeError::UnknownStrategy { kind: "split", .. })
    ));
}

#[test]
fn test_degenerate_budget_still_fits() {
    let ds = marker_bags();
    let mut clf = PropTreeClassifier::from_options(
        [("max-node-count", "0"), ("propositionalization-strategy", "count-only")],
        GaussianNaiveBayes::default(),
    )
    .unwrap();
    clf.fit(&ds).unwrap();
    assert_eq!(clf.tree().unwrap().node_count(), 0);
    assert_eq!(clf.schema().unwrap().len(), 2);
    // class-1 bags hold 6 instances, class-0 bags hold 4
    assert_eq!(clf.predict(&ds.bags()[1]).unwrap(), 1);
    assert_eq!(clf.predict(&ds.bags()[0]).unwrap(), 0);
}

#[test]
fn test_fitted_classifier_survives_json() {
    let ds = marker_bags();
    let mut clf = PropTreeClassifier::new(small_config(SearchStrategy::BreadthFirst), GaussianNaiveBayes::default());
    clf.fit(&ds).unwrap();

    let json = serde_json::to_string(&clf).unwrap();
    let restored: PropTreeClassifier<GaussianNaiveBayes> = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.config, clf.config);
    assert_eq!(restored.tree(), clf.tree());
    assert_eq!(restored.schema(), clf.schema());
    for bag in ds.bags() {
        assert_eq!(restored.predict_proba(bag).unwrap(), clf.predict_proba(bag).unwrap());
    }
}

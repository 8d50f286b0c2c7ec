use prop_tree::models::GaussianNaiveBayes;
use prop_tree::{Bag, Dataset, PropTreeClassifier, SearchStrategy, TreeConfig};
use std::time::Instant;

/// Two-class bags of 2-d points. Positive bags hide a few points in the
/// upper-right corner among the same background noise negative bags have.
fn generate_bags(n_bags: usize) -> Dataset {
    let mut bags = Vec::with_capacity(n_bags);
    for b in 0..n_bags {
        let label = (b % 2) as u32;
        let size = 4 + b % 5;
        let mut instances: Vec<Vec<f64>> = (0..size)
            .map(|i| {
                let x = ((b * 7 + i * 3) % 10) as f64 / 2.0;
                let y = ((b * 5 + i * 11) % 10) as f64 / 2.0;
                vec![x, y]
            })
            .collect();
        if label == 1 {
            for i in 0..1 + b % 3 {
                instances.push(vec![8.0 + i as f64 * 0.3, 8.5 - i as f64 * 0.2]);
            }
        }
        bags.push(Bag::new(instances, Some(label)));
    }
    Dataset::new(bags).expect("bags share dimensionality")
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prop_tree=info".into()),
        )
        .init();

    let dataset = generate_bags(40);

    for search in SearchStrategy::ALL {
        let config = TreeConfig {
            search_strategy: search,
            max_node_count: 4,
            min_occupancy: 3,
            ..TreeConfig::default()
        };
        let mut clf = PropTreeClassifier::new(config, GaussianNaiveBayes::default());

        let start = Instant::now();
        clf.fit(&dataset).expect("fit");
        let elapsed = start.elapsed();

        let correct = dataset
            .bags()
            .iter()
            .filter(|bag| clf.predict(bag).ok() == bag.label)
            .count();

        println!("--- {search} ({:.2?}) ---", elapsed);
        println!("{}", clf.tree_info().expect("fitted"));
        println!(
            "Training accuracy: {}/{} bags",
            correct,
            dataset.n_bags()
        );
    }
}

//! Inference benchmark: scaled vector → random forest probability.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use skycast::model::{Classifier, ForestClassifier, Node, Tree};

/// Complete tree of the given depth splitting round-robin over the features
fn balanced_tree(depth: u32, n_features: usize) -> Tree {
    let internal = (1usize << depth) - 1;
    let total = (1usize << (depth + 1)) - 1;
    let nodes = (0..total)
        .map(|id| {
            if id < internal {
                Node::Split {
                    feature: id % n_features,
                    threshold: 0.0,
                    left: 2 * id + 1,
                    right: 2 * id + 2,
                }
            } else {
                Node::Leaf {
                    value: [(id % 7) as f64 + 1.0, (id % 5) as f64 + 1.0],
                }
            }
        })
        .collect();
    Tree { nodes }
}

fn bench_forest_by_size(c: &mut Criterion) {
    let n_features = 15;
    let features: Vec<f64> = (0..n_features).map(|i| (i as f64 - 7.0) / 3.0).collect();

    let mut g = c.benchmark_group("forest_predict_proba");
    for n_trees in [10, 100, 300] {
        let trees = (0..n_trees).map(|_| balanced_tree(10, n_features)).collect();
        let forest = ForestClassifier::new(n_features, trees).unwrap();
        g.bench_function(format!("trees_{}", n_trees).as_str(), |b| {
            b.iter(|| forest.predict_proba(black_box(&features)).unwrap())
        });
    }
    g.finish();
}

criterion_group!(benches, bench_forest_by_size);
criterion_main!(benches);

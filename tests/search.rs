//! Searches checked against a brute-force linear scan.

use mtree::{Euclidean, MTree, MTreeConfig, Manhattan, Metric, SplitPolicy};
use rand::prelude::*;

fn make_points(n: usize, seed: u64) -> Vec<[f64; 2]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| [rng.gen::<f64>(), rng.gen::<f64>()]).collect()
}

fn brute_force<M: Metric<[f64; 2]>>(points: &[[f64; 2]], query: &[f64; 2], metric: &M) -> Vec<(f64, usize)> {
    let mut all: Vec<(f64, usize)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (metric.distance(query, p), i))
        .collect();
    all.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    all
}

fn build<M: Metric<[f64; 2]>>(points: &[[f64; 2]], metric: M, config: MTreeConfig) -> MTree<[f64; 2], usize, M> {
    let mut tree = MTree::with_config(metric, config).unwrap();
    for (i, p) in points.iter().enumerate() {
        tree.insert(*p, i);
    }
    tree
}

fn check_nearest<M: Metric<[f64; 2]>>(tree: &MTree<[f64; 2], usize, M>, points: &[[f64; 2]], queries: &[[f64; 2]]) {
    for q in queries {
        let expected = brute_force(points, q, tree.metric());
        for k in [1, 2, 3, 10, 50, points.len(), points.len() + 5] {
            let found = tree.nearest(q, k);
            assert_eq!(found.len(), k.min(points.len()));
            for (hit, want) in found.iter().zip(&expected) {
                assert_eq!(hit.distance, want.0);
                assert_eq!(hit.distance, tree.metric().distance(q, hit.key));
            }
            assert!(found.windows(2).all(|w| w[0].distance <= w[1].distance));
        }
    }
}

fn check_within<M: Metric<[f64; 2]>>(tree: &MTree<[f64; 2], usize, M>, points: &[[f64; 2]], queries: &[[f64; 2]]) {
    for q in queries {
        let expected = brute_force(points, q, tree.metric());
        for r in [0.0, 0.01, 0.05, 0.2, 0.5, 2.0] {
            let mut found: Vec<usize> = tree.within(q, r).iter().map(|h| *h.value).collect();
            let mut want: Vec<usize> = expected.iter().filter(|(d, _)| *d <= r).map(|(_, i)| *i).collect();
            found.sort();
            want.sort();
            assert_eq!(found, want, "radius {}", r);
        }
    }
}

#[test]
fn nearest_three_matches_brute_force() {
    let points = make_points(300, 17);
    let tree = build(&points, Euclidean, MTreeConfig::default());
    for q in make_points(300, 18) {
        let found = tree.nearest(&q, 3);
        let expected = brute_force(&points, &q, &Euclidean);
        assert_eq!(found.len(), 3);
        assert!(found[0].distance <= found[1].distance);
        assert!(found[1].distance <= found[2].distance);
        let got: Vec<f64> = found.iter().map(|h| h.distance).collect();
        let want: Vec<f64> = expected[..3].iter().map(|e| e.0).collect();
        assert_eq!(got, want);
    }
}

#[test]
fn searches_match_across_configurations() {
    let points = make_points(1000, 3);
    let queries = make_points(25, 4);
    for policy in [SplitPolicy::Balanced, SplitPolicy::Hyperplane] {
        for fan_out in [2, 5, 16] {
            let config = MTreeConfig::new().fan_out(fan_out).split_policy(policy);
            let mut tree = build(&points, Euclidean, config);
            check_nearest(&tree, &points, &queries);
            check_within(&tree, &points, &queries);

            tree.rebalance();
            check_nearest(&tree, &points, &queries);
            check_within(&tree, &points, &queries);
        }
    }
}

#[test]
fn searches_with_another_metric() {
    let points = make_points(500, 11);
    let queries = make_points(20, 12);
    let tree = build(&points, Manhattan, MTreeConfig::new().fan_out(7));
    check_nearest(&tree, &points, &queries);
    check_within(&tree, &points, &queries);
}

#[test]
fn searches_after_removals() {
    let mut points = make_points(600, 21);
    let queries = make_points(20, 22);
    let mut tree = build(&points, Euclidean, MTreeConfig::new().fan_out(6));

    // drop every third point, keeping values aligned with positions
    let mut kept = Vec::new();
    for (i, p) in points.iter().enumerate() {
        if i % 3 == 0 {
            assert_eq!(tree.remove(p), Some(i));
        } else {
            kept.push((*p, i));
        }
    }
    assert_eq!(tree.len(), kept.len());

    for q in &queries {
        let mut want: Vec<(f64, usize)> = kept.iter().map(|(p, i)| (Euclidean.distance(q, p), *i)).collect();
        want.sort_by(|a, b| a.0.total_cmp(&b.0));
        let got: Vec<f64> = tree.nearest(q, 7).iter().map(|h| h.distance).collect();
        let expected: Vec<f64> = want[..7].iter().map(|w| w.0).collect();
        assert_eq!(got, expected);

        let mut inside: Vec<usize> = tree.within(q, 0.1).iter().map(|h| *h.value).collect();
        let mut expected: Vec<usize> = want.iter().filter(|w| w.0 <= 0.1).map(|w| w.1).collect();
        inside.sort();
        expected.sort();
        assert_eq!(inside, expected);
    }

    points.retain(|p| tree.contains_key(p));
    assert_eq!(points.len(), kept.len());
}

#[test]
fn degenerate_queries_are_empty() {
    let points = make_points(100, 5);
    let tree = build(&points, Euclidean, MTreeConfig::default());
    assert!(tree.nearest(&[0.5, 0.5], 0).is_empty());
    assert!(tree.within(&[0.5, 0.5], -0.1).is_empty());
    assert!(tree.within(&[0.5, 0.5], f64::NAN).is_empty());
    assert_eq!(tree.within(&[0.5, 0.5], 10.0).len(), 100);
}

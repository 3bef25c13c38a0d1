//! Distance functions.
//!
//! The tree never compares keys with `==`, `Ord` or `Hash`. Everything it
//! knows about keys comes from a [`Metric`].

use num::Float;

/// A distance function over keys of type `K`.
///
/// Implementations must be a true metric:
///
/// * `distance(a, a) == 0`
/// * `distance(a, b) == distance(b, a)`
/// * `distance(a, b) >= 0`
/// * `distance(a, c) <= distance(a, b) + distance(b, c)`
///
/// None of this is checked. A function that breaks the triangle inequality
/// makes searches prune subtrees they should have visited, so results may be
/// missing, but the tree itself stays well formed.
///
/// Two keys at distance exactly `0.0` are the same key as far as the tree is
/// concerned.
pub trait Metric<K: ?Sized> {
    fn distance(&self, a: &K, b: &K) -> f64;
}

impl<K: ?Sized, F> Metric<K> for F
where
    F: Fn(&K, &K) -> f64,
{
    fn distance(&self, a: &K, b: &K) -> f64 {
        self(a, b)
    }
}

/// Straight-line (L2) distance between coordinate vectors.
///
/// ```
/// use mtree::{Euclidean, Metric};
/// assert_eq!(Euclidean.distance(&[0.0f64, 0.0], &[3.0, 4.0]), 5.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

/// Taxicab (L1) distance between coordinate vectors.
///
/// ```
/// use mtree::{Manhattan, Metric};
/// assert_eq!(Manhattan.distance(&[0.0f64, 0.0], &[3.0, -4.0]), 7.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Manhattan;

fn to_f64<F: Float>(x: F) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

fn l2<F: Float>(a: &[F], b: &[F]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = to_f64(x) - to_f64(y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

fn l1<F: Float>(a: &[F], b: &[F]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (to_f64(x) - to_f64(y)).abs())
        .sum()
}

impl<F: Float, const N: usize> Metric<[F; N]> for Euclidean {
    fn distance(&self, a: &[F; N], b: &[F; N]) -> f64 {
        l2(a, b)
    }
}

impl<F: Float> Metric<[F]> for Euclidean {
    fn distance(&self, a: &[F], b: &[F]) -> f64 {
        l2(a, b)
    }
}

impl<F: Float> Metric<Vec<F>> for Euclidean {
    fn distance(&self, a: &Vec<F>, b: &Vec<F>) -> f64 {
        l2(a, b)
    }
}

impl<F: Float, const N: usize> Metric<[F; N]> for Manhattan {
    fn distance(&self, a: &[F; N], b: &[F; N]) -> f64 {
        l1(a, b)
    }
}

impl<F: Float> Metric<[F]> for Manhattan {
    fn distance(&self, a: &[F], b: &[F]) -> f64 {
        l1(a, b)
    }
}

impl<F: Float> Metric<Vec<F>> for Manhattan {
    fn distance(&self, a: &Vec<F>, b: &Vec<F>) -> f64 {
        l1(a, b)
    }
}

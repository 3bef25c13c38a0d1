//! M-trees: maps keyed by points in an arbitrary metric space.
//!
//! The only thing an [`MTree`] ever asks of its keys is a distance, supplied
//! as a [`Metric`]. With it the tree supports exact lookup, replacement and
//! removal (two keys at distance zero are the same key), k-nearest-neighbor
//! search, range search and an explicit [`rebalance`](MTree::rebalance).
//!
//! Entries live in leaf spheres; every sphere has a center key and a radius
//! covering everything beneath it, and searches skip any sphere the triangle
//! inequality proves is too far away.
//!
//! ```
//! use mtree::MTree;
//!
//! // edit distance would do just as well; here, distance along a line
//! let mut tree = MTree::new(|a: &i64, b: &i64| (a - b).abs() as f64);
//! for x in [1, 5, 9, 14, 20] {
//!     tree.insert(x, x * 10);
//! }
//! let closest: Vec<i64> = tree.nearest(&11, 2).iter().map(|n| *n.value).collect();
//! assert_eq!(closest, vec![90, 140]);
//! ```

pub mod config;
pub mod error;
pub mod iter;
pub mod metric;
pub mod mtree;
pub mod query;

mod insert;
mod rebalance;
mod remove;
mod sphere;
mod split;

pub use config::{MTreeConfig, SplitPolicy};
pub use error::{Error, Result};
pub use metric::{Euclidean, Manhattan, Metric};
pub use mtree::MTree;
pub use query::Neighbor;

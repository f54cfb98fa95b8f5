//! Hierarchies as merge sequences, and their pairwise scale representation.
//!
//! ## [`Dendrogram`] - Agglomerative Clustering
//!
//! Records complete merge history from hierarchical clustering:
//!
//! ```text
//!         6 (size=4)
//!        / \
//!       4   5 (size=2)
//!      / \ / \
//!     0  1 2  3 (leaves)
//! ```
//!
//! ## [`ScaleMatrix`] - Comparable Form
//!
//! Two dendrograms over the same samples are compared through their scale
//! matrices: cell `(i, j)` holds the normalised size of the smallest cluster
//! containing both samples. See [`crate::hai`] for the agreement score built
//! on top of it.

mod dendrogram;
mod scale;

pub use dendrogram::{Dendrogram, Merge};
pub use scale::ScaleMatrix;

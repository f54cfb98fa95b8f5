//! Hierarchy Agreement Index and the analysis built on it.
//!
//! Each run of a sweep yields a hierarchy over the same samples. Turning every
//! hierarchy into a [`crate::hierarchy::ScaleMatrix`] makes them comparable;
//! [`hai_score`] measures agreement between two of them; [`assemble`] builds
//! the full pairwise matrix; [`MetaClusterer`] groups runs whose hierarchies
//! agree; [`medoids`] picks one representative run per group.
//!
//! ```text
//! runs ──► scale matrices ──► HAI matrix ──► 1 − HAI ──► meta labels ──► medoids
//! ```

mod matrix;
mod medoid;
mod meta;
mod score;

pub use matrix::{assemble, HaiMatrix};
pub use medoid::medoids;
pub use meta::{MetaClusterer, MetaClustering};
pub use score::hai_score;

//! Sparse vectors and the linear ranking model behind the guide.

pub mod linear;
pub mod sparse;

pub use linear::{LinearModel, ModelError};
pub use sparse::SparseVector;

/// Scores a sparse feature vector and returns transition IDs in decreasing
/// score order; ties are broken towards the lowest ID.
pub trait RankingModel: Send + Sync {
    fn predict_sorted(&self, vector: &SparseVector) -> Vec<usize>;
}

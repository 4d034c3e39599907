//! ego-recommend: Ranks accounts of an ego network by a centrality measure.
//!
//! The measures themselves (pagerank, betweenness, ...) are computed
//! elsewhere; this crate only filters, orders, and scores them.

pub mod error;
pub mod recommender;

pub use error::{RecommendError, Result};
pub use recommender::{
    read_measures, EgoNetworkRecommender, NetworkMeasure, Recommendation, RecommenderConfig,
};

pub mod http;

pub use http::HttpSimilarityProvider;

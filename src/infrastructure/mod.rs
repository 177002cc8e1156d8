pub mod builder;
pub mod chunking;
pub mod embedding;
pub mod extraction;
pub mod logging;
pub mod parsing;
pub mod pipeline;
pub mod store;

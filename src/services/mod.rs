pub mod charts;
pub mod errors;
pub mod extractor;
pub mod market_data;
pub mod normalizer;
pub mod parsers;
pub mod pipeline;
pub mod shared;
pub mod sinks;

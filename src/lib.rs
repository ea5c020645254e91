pub mod catalog;
pub mod dictionary;
pub mod enrich;
pub mod error;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod store;

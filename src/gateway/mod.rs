pub mod attributes;
pub mod query;

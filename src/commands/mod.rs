pub mod annotated;
pub mod convert;
pub mod extract;
pub mod link_yearly;
pub mod merge_entities;
pub mod merge_reports;

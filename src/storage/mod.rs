pub mod export;
pub mod ids;
pub mod records;
pub mod store;

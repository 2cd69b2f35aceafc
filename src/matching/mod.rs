pub mod field_mappings;
pub mod field_model;
pub mod matcher;
pub mod normalize;
pub mod option_scorer;
pub mod scanner;

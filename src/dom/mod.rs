pub mod dom_model;
pub mod host;
pub mod selector;

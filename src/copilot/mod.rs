pub mod controller;
pub mod error;
pub mod page_context;
pub mod protocol;

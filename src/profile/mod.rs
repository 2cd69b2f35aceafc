pub mod profile_model;

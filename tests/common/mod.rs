#![allow(dead_code)]

pub mod hosts;
pub mod pages;
pub mod utils;

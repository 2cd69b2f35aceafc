//! Job-application autofill: scan a page's form controls, match their labels
//! against a stored profile, write the values so page frameworks observe
//! them, and restore the previous values on request.
//!
//! Everything above [`dom::host::PageHost`] is pure and works on
//! [`dom::dom_model::PageSnapshot`]s; [`dom::host::MemoryPage`] and
//! [`browser::session::BrowserSession`] are the two hosts.

pub mod browser;
pub mod cli;
pub mod copilot;
pub mod dom;
pub mod fill;
pub mod matching;
pub mod profile;
pub mod report;
pub mod storage;
pub mod trace;

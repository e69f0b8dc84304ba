//! HyperCap library.
//!
//! A small web service that captures full-page screenshots of arbitrary URLs
//! through the Hyperbrowser remote browsing API, caches results for a short
//! window, and serves the stored images back for viewing and download.

pub mod cache;
pub mod capture;
pub mod config;
pub mod hyperbrowser;
pub mod retention;
pub mod viewport;
pub mod web;

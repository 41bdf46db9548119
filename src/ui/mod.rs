//! HTML served to browsers.
//!
//! - [`page`]: the single page hosting the chat widget

pub mod page;

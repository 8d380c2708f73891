//! Utility modules
//!
//! - **error**: gateway errors and retry handling
//! - **logging**: subscriber setup and secret masking

pub mod error;
pub mod logging;

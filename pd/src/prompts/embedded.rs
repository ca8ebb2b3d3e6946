//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Skeleton pass prompt (coarse breakdown, no prose)
pub const SKELETON: &str = include_str!("../../prompts/skeleton.pmt");

/// Expand pass prompt (full preset from a skeleton)
pub const EXPAND: &str = include_str!("../../prompts/expand.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "skeleton" => {
            debug!("get_embedded: matched skeleton");
            Some(SKELETON)
        }
        "expand" => {
            debug!("get_embedded: matched expand");
            Some(EXPAND)
        }
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}

//! Domain types for the preset generation pipeline
//!
//! Wire-facing types use camelCase field names; the JSON contract they form
//! is enforced separately by the schema validator before deserialization.

mod activity;
mod fallback;
mod preset;
mod request;

pub use activity::{ActivityGroup, ActivityPriority, PipelineActivity, TechnicalDetail};
pub use fallback::fallback_preset;
pub use preset::{Preset, Skeleton, SkeletonActivity};
pub use request::{PipelineInput, PipelineMetadata, PipelineResult};

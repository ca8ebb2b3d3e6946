//! Idempotency signature
//!
//! A deterministic key over the request contents so repeated identical
//! requests are served from cache. The request id is deliberately excluded:
//! re-submission of the same logical action must map to the same signature.

use tracing::debug;

use crate::domain::PipelineInput;

/// Feed one field into the hasher, length-prefixed so the encoding is
/// injective regardless of what bytes the value contains
fn hash_field(hasher: &mut blake3::Hasher, value: &[u8]) {
    hasher.update(&(value.len() as u64).to_le_bytes());
    hasher.update(value);
}

/// Compute the blake3 signature of `(user_id, description, answers, category)`
pub fn request_signature(input: &PipelineInput) -> String {
    debug!(user_id = %input.user_id, "request_signature: called");
    let mut hasher = blake3::Hasher::new();

    hash_field(&mut hasher, input.user_id.as_bytes());
    hash_field(&mut hasher, input.description.as_bytes());

    // BTreeMap iteration is ordered, so the digest is stable
    hasher.update(&(input.answers.len() as u64).to_le_bytes());
    for (key, value) in &input.answers {
        hash_field(&mut hasher, key.as_bytes());
        hash_field(&mut hasher, value.as_bytes());
    }

    match input.category {
        Some(ref category) => {
            hasher.update(&[1]);
            hash_field(&mut hasher, category.as_bytes());
        }
        None => {
            hasher.update(&[0]);
        }
    }

    hasher.finalize().to_hex().to_string()
}

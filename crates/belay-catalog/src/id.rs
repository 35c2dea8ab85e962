//! Resource id generation
//!
//! Ids read as a slug of a human name followed by a short random suffix,
//! e.g. `upper-town-wall-k3j9x0qa2m`.

use belay_core::ResourceId;
use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of the random suffix appended to every id
pub const SUFFIX_LEN: usize = 10;

/// Lowercase `input`, collapse every run of non-alphanumerics to one `-`
/// and trim leading and trailing dashes
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Generates unique, human readable resource ids
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceIdGenerator;

impl ResourceIdGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Slug of `prefix` plus a random suffix; a prefix with no usable
    /// characters yields the suffix alone
    pub fn generate(&self, prefix: &str) -> ResourceId {
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(SUFFIX_LEN)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();

        let slug = slugify(prefix);
        if slug.is_empty() {
            ResourceId::new(suffix)
        } else {
            ResourceId::new(format!("{slug}-{suffix}"))
        }
    }
}

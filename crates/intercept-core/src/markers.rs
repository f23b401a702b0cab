//! Marker extraction: which selector tags apply to a `(type, method)` pair.
//!
//! Extraction scans the type's declared markers, then the method's. Each marker
//! that the metadata source recognizes as a selector is collected. A marker that
//! is a group (a stereotype bundling other markers) contributes its members that
//! are selectors; the group itself only counts if it is independently a
//! selector.
//!
//! By default groups are expanded one level deep. Deeper expansion is opt-in via
//! [`ExtractorConfig::group_depth`]. It collects every selector reachable within
//! that many membership hops, whatever order the markers are declared in, and
//! stops on cycles.

use std::sync::Arc;

use proxy_intercept_types::{
    ExtractorConfig, MethodMetadata, Tag, TagSet, TargetDescriptor, TypeMetadata,
};
use tracing::trace;

/// Metadata queries used during extraction.
///
/// Kept narrow so any source (a registry, a manifest, generated tables) can
/// back it. Must be safe for concurrent lookups.
pub trait MarkerMetadata: Send + Sync {
    /// Whether `tag` can select interceptor behaviors.
    fn is_selector(&self, tag: &Tag) -> bool;

    /// Whether `tag` is a group of other markers.
    fn is_group(&self, tag: &Tag) -> bool;

    /// The markers declared on the group `tag`. Empty for non-groups.
    fn group_members(&self, tag: &Tag) -> Vec<Tag>;
}

/// Computes the deduplicated selector set for a call site.
#[derive(Clone)]
pub struct MarkerExtractor {
    metadata: Arc<dyn MarkerMetadata>,
    config: ExtractorConfig,
}

impl MarkerExtractor {
    pub fn new(metadata: Arc<dyn MarkerMetadata>) -> Self {
        Self::with_config(metadata, ExtractorConfig::default())
    }

    pub fn with_config(metadata: Arc<dyn MarkerMetadata>, config: ExtractorConfig) -> Self {
        Self { metadata, config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Selector tags for `method` on `target_type`.
    pub fn extract(&self, target_type: &TypeMetadata, method: &MethodMetadata) -> TagSet {
        self.extract_descriptor(TargetDescriptor::new(target_type, method))
    }

    pub fn extract_descriptor(&self, descriptor: TargetDescriptor<'_>) -> TagSet {
        let mut result = TagSet::new();
        let mut expanded = Vec::new();
        for markers in descriptor.sources() {
            self.add_bindings(&mut result, markers, &mut expanded);
        }
        result
    }

    fn is_selector(&self, tag: &Tag) -> bool {
        !self.config.is_disabled(tag.kind()) && self.metadata.is_selector(tag)
    }

    fn add_bindings(&self, result: &mut TagSet, markers: &[Tag], expanded: &mut ExpandedGroups) {
        for marker in markers {
            // Single-level expansion skips markers already collected. Deeper
            // expansion re-checks them, since a deeper path may have collected
            // a group without expanding it.
            if self.config.group_depth <= 1 && result.contains(marker) {
                continue;
            }
            if self.is_selector(marker) {
                result.insert(marker.clone());
            }
            if self.config.group_depth > 0
                && self.metadata.is_group(marker)
                && claim_expansion(expanded, marker, 1)
            {
                self.expand_group(result, marker, 1, expanded);
            }
        }
    }

    fn expand_group(
        &self,
        result: &mut TagSet,
        group: &Tag,
        depth: usize,
        expanded: &mut ExpandedGroups,
    ) {
        trace!(group = %group, depth, "expanding marker group");
        for member in self.metadata.group_members(group) {
            if self.is_selector(&member) {
                result.insert(member.clone());
            }
            if depth < self.config.group_depth
                && self.metadata.is_group(&member)
                && claim_expansion(expanded, &member, depth + 1)
            {
                self.expand_group(result, &member, depth + 1, expanded);
            }
        }
    }
}

/// Groups expanded during one extraction, each with the shallowest depth it was
/// expanded at.
type ExpandedGroups = Vec<(Tag, usize)>;

/// Record that `group` is about to be expanded at `depth`. Returns `false` when
/// it was already expanded at the same or a shallower depth, which also stops
/// cycles.
fn claim_expansion(expanded: &mut ExpandedGroups, group: &Tag, depth: usize) -> bool {
    match expanded.iter_mut().find(|(tag, _)| tag == group) {
        Some((_, at)) if *at <= depth => false,
        Some((_, at)) => {
            *at = depth;
            true
        }
        None => {
            expanded.push((group.clone(), depth));
            true
        }
    }
}

impl std::fmt::Debug for MarkerExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerExtractor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

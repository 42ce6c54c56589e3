use amg_core::{MemoryType, Scope, Sensitivity};

/// Filters accepted by [`crate::adapter::StorageAdapter::query`].
///
/// The adapter applies these in order: filter-match, TTL expiry, scope
/// isolation, sensitivity allow-list, `allow_read`. `embedding` triggers the
/// optional cosine-similarity ranking pass; it is not itself a filter
/// predicate.
#[derive(Debug, Clone, Default)]
pub struct QueryFilters {
    pub memory_types: Option<Vec<MemoryType>>,
    pub sensitivity: Option<Vec<Sensitivity>>,
    /// Restrict results to a single policy scope. Applied on top of, not
    /// instead of, the cross-agent scope-isolation check.
    pub scope: Option<Scope>,
    /// Query vector for cosine-similarity ranking. Items with a missing or
    /// wrong-dimension embedding receive a sentinel score of `-1.0` and sink
    /// to the bottom.
    pub embedding: Option<Vec<f32>>,
    pub limit: Option<u32>,
}

impl QueryFilters {
    #[must_use]
    pub fn matches_type_and_sensitivity(
        &self,
        memory_type: MemoryType,
        sensitivity: Sensitivity,
    ) -> bool {
        let type_ok = self
            .memory_types
            .as_ref()
            .is_none_or(|types| types.contains(&memory_type));
        let sensitivity_ok = self
            .sensitivity
            .as_ref()
            .is_none_or(|allowed| allowed.contains(&sensitivity));
        type_ok && sensitivity_ok
    }
}

/// Provider and type extracted from an ARM resource id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub provider: String,
    pub resource_type: String,
}

/// Sentinel used by callers when a resource id cannot be parsed.
pub const UNKNOWN: &str = "Unknown";

/// Parses an ARM resource id into provider and resource type.
///
/// Walks to the `providers` segment and takes the two segments after it,
/// so ids with or without a leading slash, and child-resource paths, all
/// resolve to the top-level provider and type:
///
/// `/subscriptions/S/resourceGroups/RG/providers/Microsoft.Web/sites/app1`
/// yields `{ provider: "Microsoft.Web", resource_type: "sites" }`.
///
/// Returns `None` when both segments are not present, letting callers
/// distinguish a parsed id from a fallback instead of silently
/// misclassifying.
pub fn parse_resource_id(resource_id: &str) -> Option<ResourceRef> {
    let mut segments = resource_id.split('/').filter(|segment| !segment.is_empty());
    while let Some(segment) = segments.next() {
        if segment.eq_ignore_ascii_case("providers") {
            let provider = segments.next()?;
            let resource_type = segments.next()?;
            return Some(ResourceRef {
                provider: provider.to_string(),
                resource_type: resource_type.to_string(),
            });
        }
    }
    None
}

use crate::document::Document;

/// Stamp `document` with `profile`, ahead of any profile applied earlier.
///
/// The list is not deduplicated: readers take index 0 as the most specific
/// profile. `None` or an empty identifier leaves the document untouched.
pub fn apply_profile(document: &mut Document, profile: Option<&str>) {
    let Some(profile) = profile.filter(|p| !p.is_empty()) else {
        return;
    };

    tracing::trace!("Applying profile {} to {}", profile, document.kind);
    document
        .profiles
        .get_or_insert_with(Vec::new)
        .insert(0, profile.to_string());
}

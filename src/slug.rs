use uuid::Uuid;

/// Derive a URL slug from a recipe title: lowercase, collapse runs of
/// non-alphanumeric characters to a single hyphen, trim leading/trailing
/// hyphens, then append a short random suffix. The suffix makes slugs
/// globally unique without a retry loop against the unique index.
pub fn slugify(title: &str) -> String {
    let mut base = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !base.is_empty() {
                base.push('-');
            }
            pending_hyphen = false;
            base.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    let suffix: String = Uuid::new_v4().simple().to_string()[..6].to_string();
    if base.is_empty() {
        suffix
    } else {
        format!("{}-{}", base, suffix)
    }
}

//! Slug and resource identifier derivation.

use uuid::Uuid;

use doctree_entity::node::DocType;

/// Upper bound on the readable part of a derived slug.
const MAX_SLUG_BASE_LEN: usize = 80;

/// Lowercase ASCII words joined by single dashes.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
        if slug.len() >= MAX_SLUG_BASE_LEN {
            break;
        }
    }
    slug
}

/// A slug from `title` (or `untitled`) with a random suffix so that
/// same-titled siblings rarely collide.
pub fn derive_slug(title: Option<&str>, suffix_len: usize) -> String {
    let base = title
        .map(slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "untitled".to_string());
    format!("{base}-{}", random_suffix(suffix_len))
}

/// Deterministic resource identifier for a node kind and slug.
pub fn derive_jrn(doc_type: DocType, slug: &str) -> String {
    format!("jrn:docs:{}/{slug}", doc_type.as_str())
}

fn random_suffix(len: usize) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    hex[..len.clamp(1, hex.len())].to_string()
}

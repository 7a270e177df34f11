use crate::models::Event;

/// Dedup key: registration link, then website link, then slugified name.
/// Deliberately coarse; no fuzzy matching.
pub fn identity_key(event: &Event) -> String {
    event
        .registration_link
        .as_deref()
        .and_then(link_key)
        .or_else(|| event.website_link.as_deref().and_then(link_key))
        .unwrap_or_else(|| slugify(&event.name))
}

pub fn link_key(url: &str) -> Option<String> {
    let mut key = url.trim().to_lowercase();
    for scheme in ["https://", "http://"] {
        if let Some(rest) = key.strip_prefix(scheme) {
            key = rest.to_string();
            break;
        }
    }
    if let Some(rest) = key.strip_prefix("www.") {
        key = rest.to_string();
    }
    if let Some(idx) = key.find(['?', '#']) {
        key.truncate(idx);
    }
    let key = key.trim_end_matches('/');
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

pub fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

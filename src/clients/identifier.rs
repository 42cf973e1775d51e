use crate::clients::entities::TrackId;

/// Scheme and host prefixes a shareable track url may start with
pub const KNOWN_PREFIXES: [&str; 6] = [
    "https://www.mixcloud.com/",
    "http://www.mixcloud.com/",
    "https://mixcloud.com/",
    "http://mixcloud.com/",
    "https://x.mixcloud.com/",
    "http://x.mixcloud.com/",
];

pub fn default_prefixes() -> Vec<String> {
    KNOWN_PREFIXES.iter().map(ToString::to_string).collect()
}

/// Strip the first known prefix from `url`. Anything else is already an identifier.
pub fn track_id_from_url<S: AsRef<str>>(url: &str, prefixes: &[S]) -> TrackId {
    let id = prefixes
        .iter()
        .find_map(|prefix| url.strip_prefix(prefix.as_ref()))
        .unwrap_or(url);
    TrackId::new(id)
}

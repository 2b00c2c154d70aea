//! Batter name canonicalisation.
//!
//! Some exports append the batter's stance to the name ("Yordan AlvarezL"),
//! others carry the bare name. The canonical form used everywhere in this
//! crate is the bare, trimmed name.

/// Stance markers appended by the `name_with_stand` exports.
const HAND_MARKERS: [char; 3] = ['L', 'R', 'S'];

/// Generational suffixes a stance marker can be glued to ("Harris IIL").
const ROMAN_SUFFIXES: [&str; 3] = ["II", "III", "IV"];

/// Trim whitespace and a leading BOM, and optionally drop a trailing stance marker.
///
/// A marker is stripped when it directly follows a lowercase letter, a `.`
/// ("Witt Jr.R") or a roman-numeral suffix ("Harris IIL"). Initials and bare
/// suffixes such as "J.D." or "Jr." are left alone.
pub fn canonical_batter_name(raw: &str, strip_hand_marker: bool) -> String {
    let name = raw.trim().trim_start_matches('\u{feff}').trim();
    if !strip_hand_marker {
        return name.to_string();
    }
    match marker_stem(name) {
        Some(stem) => stem.trim_end().to_string(),
        None => name.to_string(),
    }
}

/// `name` without its stance marker, if it carries one.
fn marker_stem(name: &str) -> Option<&str> {
    let last = name.chars().next_back()?;
    if !HAND_MARKERS.contains(&last) {
        return None;
    }
    let stem = &name[..name.len() - last.len_utf8()];
    let prev = stem.chars().next_back()?;
    if prev.is_lowercase() || prev == '.' {
        return Some(stem);
    }

    // Roman suffix only counts as its own word after a given name
    let (head, token) = stem.rsplit_once(char::is_whitespace)?;
    (!head.trim().is_empty() && ROMAN_SUFFIXES.contains(&token)).then_some(stem)
}

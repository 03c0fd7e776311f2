//! Bounded string helpers

use heapless::String;

/// Copy `s` into a fixed-capacity string, truncating on a char boundary
pub fn bounded<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Copy `s` with all whitespace removed ("44.1 kHz" -> "44.1kHz")
pub fn compact<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars().filter(|c| !c.is_whitespace()) {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

// Identifier normalizer - turns a username or pasted profile URL into a handle
use tracing::{debug, warn};
use url::Url;

/// Domain token that marks the input as a profile URL
pub const HOSTING_DOMAIN: &str = "github.com";

/// Normalize free-form input into a profile handle.
///
/// Plain usernames are returned trimmed. Input mentioning the hosting domain
/// is parsed as a URL and reduced to its first non-empty path segment, so
/// `https://github.com/torvalds/linux` becomes `torvalds`. Anything that
/// cannot be reduced falls back to the trimmed input; this never fails.
pub fn normalize(input: &str) -> String {
    let trimmed = input.trim();
    if !trimmed.to_ascii_lowercase().contains(HOSTING_DOMAIN) {
        return trimmed.to_string();
    }

    match first_path_segment(trimmed) {
        Some(handle) => {
            debug!("Extracted handle {:?} from {:?}", handle, trimmed);
            handle
        }
        None => {
            warn!("Could not parse {:?} as a profile URL, using raw input", trimmed);
            trimmed.to_string()
        }
    }
}

fn first_path_segment(candidate: &str) -> Option<String> {
    let with_scheme = if candidate.to_ascii_lowercase().starts_with("http") {
        candidate.to_string()
    } else {
        format!("https://{}", candidate)
    };

    let url = Url::parse(&with_scheme).ok()?;
    url.path_segments()?
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

use crate::shared::AppError;

const MIN_LEN: usize = 2;
const MAX_LEN: usize = 20;

/// Words that may not appear anywhere in a guest display name.
const RESERVED_WORDS: [&str; 5] = ["admin", "moderator", "system", "bot", "guest"];

/// Validates and sanitizes a guest display name.
///
/// Rules: trimmed, 2–20 characters, letters/digits/space/hyphen/underscore
/// only, and no reserved word as a substring (case-insensitive).
pub fn sanitize_guest_name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();

    if name.len() < MIN_LEN || name.len() > MAX_LEN {
        return Err(AppError::InvalidInput(format!(
            "guest name must be {}-{} characters",
            MIN_LEN, MAX_LEN
        )));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-' || c == '_')
    {
        return Err(AppError::InvalidInput(
            "guest name may only contain letters, digits, spaces, hyphens and underscores"
                .to_string(),
        ));
    }

    let lowered = name.to_ascii_lowercase();
    if RESERVED_WORDS.iter().any(|word| lowered.contains(word)) {
        return Err(AppError::InvalidInput(
            "guest name contains a reserved word".to_string(),
        ));
    }

    Ok(name.to_string())
}

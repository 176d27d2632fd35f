//! Common validation utilities.

use validator::ValidationError;

/// Validates that a probability or threshold lies within [0, 1].
pub fn validate_probability(value: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("probability_range");
        err.message = Some("Value must be between 0 and 1".into());
        Err(err)
    }
}

/// Validates that a numeric order attribute is finite and non-negative.
pub fn validate_non_negative(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("Value must be a non-negative number".into());
        Err(err)
    }
}

/// Normalizes a recipient list.
///
/// Entries are trimmed, blanks dropped and duplicates removed (compared
/// case-insensitively). The first occurrence keeps its position.
pub fn normalize_recipients<I, S>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();

    for entry in entries {
        let trimmed = entry.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = trimmed.to_ascii_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(trimmed.to_string());
    }

    out
}

/// Loose structural check for an email address: one `@`, non-empty local
/// part, a dot in the domain and no whitespace.
pub fn is_plausible_email(address: &str) -> bool {
    let mut parts = address.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !address.chars().any(char::is_whitespace)
}

/// Validates every entry of a recipient list.
pub fn validate_recipients(recipients: &[String]) -> Result<(), ValidationError> {
    match recipients
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .find(|r| !is_plausible_email(r))
    {
        None => Ok(()),
        Some(bad) => {
            let mut err = ValidationError::new("recipient_email");
            err.message = Some(format!("Invalid recipient address: {}", bad).into());
            Err(err)
        }
    }
}

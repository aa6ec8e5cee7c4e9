//! Input validation utilities.
//!
//! Centralized validation helpers used across API routes.

use std::sync::LazyLock;

use validator::Validate;

use crate::error::ClubError;

/// Validate a request body, returning a ClubError::Validation on failure.
pub fn validate_request<T: Validate>(body: &T) -> Result<(), ClubError> {
    body.validate().map_err(|e| ClubError::Validation {
        message: format_validation_errors(e),
    })
}

/// Format validation errors into a human-readable string.
fn format_validation_errors(errors: validator::ValidationErrors) -> String {
    let mut messages = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{field}'"))
            })
        })
        .collect::<Vec<_>>();
    messages.sort();
    messages.join("; ")
}

/// Reject empty or whitespace-only names.
pub fn validate_name(name: &str) -> Result<(), ClubError> {
    if name.trim().is_empty() {
        return Err(ClubError::Validation {
            message: "Name cannot be empty or whitespace only".into(),
        });
    }
    Ok(())
}

static SESSION_NAME_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^(\d{2})-(\d{2})$").unwrap());

/// Academic sessions are written `YY-YY` and span exactly one year, e.g. `23-24`.
pub fn is_valid_session_name(value: &str) -> bool {
    let Some(caps) = SESSION_NAME_REGEX.captures(value) else {
        return false;
    };
    let start: u32 = caps[1].parse().unwrap_or(0);
    let end: u32 = caps[2].parse().unwrap_or(0);
    end == start + 1
}

/// Turn a display name into a URL slug.
///
/// Lower-cases, replaces whitespace runs with `-`, drops anything that is not
/// a word character or dash, collapses repeated dashes and trims them from
/// both ends.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = false;
    for c in name.trim().to_lowercase().chars() {
        let mapped = if c.is_whitespace() || c == '-' {
            '-'
        } else if c.is_alphanumeric() || c == '_' {
            c
        } else {
            continue;
        };
        if mapped == '-' {
            if last_dash {
                continue;
            }
            last_dash = true;
        } else {
            last_dash = false;
        }
        slug.push(mapped);
    }
    slug.trim_matches('-').to_string()
}

/// Emails are compared and stored lower-cased without surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_names() {
        assert!(is_valid_session_name("23-24"));
        assert!(!is_valid_session_name("99-100"));
        assert!(!is_valid_session_name("23-25"));
        assert!(!is_valid_session_name("24-23"));
        assert!(!is_valid_session_name("23 - 24"));
        assert!(!is_valid_session_name("2023-2024"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("  Web Development "), "web-development");
        assert_eq!(slugify("C++ & Rust -- Systems"), "c-rust-systems");
        assert_eq!(slugify("--AI/ML--"), "aiml");
        assert_eq!(slugify("data_science 101"), "data_science-101");
    }

    #[test]
    fn test_validate_name_rejects_blank() {
        assert!(validate_name("   ").is_err());
        assert!(validate_name("CSE").is_ok());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }
}

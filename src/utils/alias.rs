//! Prefix and custom alias composition.
//!
//! Turns the optional `prefix`, `alias` and `length` inputs of a request into
//! a [`Candidate`]: either a caller-chosen code checked once against the
//! store, or a prefix plus a generated segment.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;
use crate::utils::code_generator::{MAX_CODE_LENGTH, generate_code};

/// Allowed characters for prefixes and aliases.
static CODE_SEGMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Codes that would shadow service routes.
const RESERVED_CODES: &[&str] = &["api", "health", "admin", "static", "dashboard"];

/// Code-shaping inputs of a registration request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeRequest {
    pub prefix: Option<String>,
    pub alias: Option<String>,
    pub length: Option<i64>,
}

/// Limits applied by [`compose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AliasRules {
    pub max_prefix_length: usize,
    /// Generated length used when only a prefix is supplied.
    pub default_length: usize,
}

impl Default for AliasRules {
    fn default() -> Self {
        Self {
            max_prefix_length: 16,
            default_length: 6,
        }
    }
}

/// A composed short-code candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// `prefix + alias`, used verbatim.
    Custom(String),
    /// `prefix` followed by `length` generated characters.
    Generated { prefix: String, length: usize },
}

impl Candidate {
    /// Produces one concrete code. Custom candidates always yield the same code.
    pub fn produce(&self) -> Result<String, AppError> {
        match self {
            Candidate::Custom(code) => Ok(code.clone()),
            Candidate::Generated { prefix, length } => generate_code(*length, prefix),
        }
    }
}

/// Validates the request and composes the candidate code.
///
/// Checks run in a fixed order and the first violation is returned:
///
/// 1. at least one of prefix, alias, length is present
/// 2. prefix ceiling and combined length ≤ 32
/// 3. no whitespace in prefix or alias
/// 4. prefix and alias match `[A-Za-z0-9_-]`
/// 5. the resulting custom code is not reserved
///
/// # Errors
///
/// [`AppError::Validation`] for every rule above, [`AppError::InvalidLength`]
/// when `length` is outside `1..=32`.
pub fn compose(request: &CodeRequest, rules: &AliasRules) -> Result<Candidate, AppError> {
    let prefix = non_empty(request.prefix.as_deref());
    let alias = non_empty(request.alias.as_deref());

    if prefix.is_none() && alias.is_none() && request.length.is_none() {
        return Err(AppError::validation(
            "code",
            "one of prefix, alias or length is required",
        ));
    }

    let prefix_len = prefix.map_or(0, |p| p.chars().count());
    if prefix_len > rules.max_prefix_length {
        return Err(AppError::validation(
            "prefix",
            format!("must be at most {} characters", rules.max_prefix_length),
        ));
    }

    let generated_length = match (alias, request.length) {
        (Some(alias), _) => {
            let combined = prefix_len + alias.chars().count();
            if combined > MAX_CODE_LENGTH {
                return Err(AppError::validation(
                    "alias",
                    format!(
                        "prefix and alias together must be at most {MAX_CODE_LENGTH} characters, got {combined}"
                    ),
                ));
            }
            None
        }
        (None, Some(length)) => {
            if !(1..=MAX_CODE_LENGTH as i64).contains(&length) {
                return Err(AppError::InvalidLength(length));
            }
            Some(length as usize)
        }
        (None, None) => Some(rules.default_length),
    };

    if let Some(length) = generated_length
        && prefix_len + length > MAX_CODE_LENGTH
    {
        return Err(AppError::validation(
            "length",
            format!(
                "prefix and generated code together must be at most {MAX_CODE_LENGTH} characters, got {}",
                prefix_len + length
            ),
        ));
    }

    for (field, value) in [("prefix", prefix), ("alias", alias)] {
        if value.is_some_and(|v| v.chars().any(char::is_whitespace)) {
            return Err(AppError::validation(field, "must not contain whitespace"));
        }
    }

    for (field, value) in [("prefix", prefix), ("alias", alias)] {
        if value.is_some_and(|v| !CODE_SEGMENT_REGEX.is_match(v)) {
            return Err(AppError::validation(
                field,
                "may only contain letters, digits, '_' and '-'",
            ));
        }
    }

    let prefix = prefix.unwrap_or_default().to_string();

    match alias {
        Some(alias) => {
            let code = format!("{prefix}{alias}");
            if RESERVED_CODES.contains(&code.to_ascii_lowercase().as_str()) {
                return Err(AppError::validation("alias", "this code is reserved"));
            }
            Ok(Candidate::Custom(code))
        }
        None => Ok(Candidate::Generated {
            prefix,
            length: generated_length.unwrap_or(rules.default_length),
        }),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prefix: Option<&str>, alias: Option<&str>, length: Option<i64>) -> CodeRequest {
        CodeRequest {
            prefix: prefix.map(str::to_string),
            alias: alias.map(str::to_string),
            length,
        }
    }

    fn field_of(err: AppError) -> String {
        match err {
            AppError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_prefix_and_alias_are_concatenated() {
        let candidate = compose(&request(Some("go-"), Some("docs"), None), &AliasRules::default());
        assert_eq!(candidate.unwrap(), Candidate::Custom("go-docs".to_string()));
    }

    #[test]
    fn test_alias_wins_over_length() {
        let candidate = compose(&request(None, Some("launch"), Some(8)), &AliasRules::default());
        assert_eq!(candidate.unwrap(), Candidate::Custom("launch".to_string()));
    }

    #[test]
    fn test_length_only_generates() {
        let candidate = compose(&request(None, None, Some(4)), &AliasRules::default()).unwrap();
        assert_eq!(
            candidate,
            Candidate::Generated {
                prefix: String::new(),
                length: 4
            }
        );
        let code = candidate.produce().unwrap();
        assert_eq!(code.len(), 4);
    }

    #[test]
    fn test_prefix_only_uses_default_length() {
        let rules = AliasRules {
            max_prefix_length: 10,
            default_length: 7,
        };
        let candidate = compose(&request(Some("shop"), None, None), &rules).unwrap();
        assert_eq!(
            candidate,
            Candidate::Generated {
                prefix: "shop".to_string(),
                length: 7
            }
        );
    }

    #[test]
    fn test_missing_inputs_rejected() {
        let err = compose(&request(None, None, None), &AliasRules::default()).unwrap_err();
        assert_eq!(field_of(err), "code");

        let err = compose(&request(Some(""), Some(""), None), &AliasRules::default()).unwrap_err();
        assert_eq!(field_of(err), "code");
    }

    #[test]
    fn test_combined_length_ceiling() {
        let alias = "a".repeat(30);
        let err = compose(&request(Some("abc"), Some(&alias), None), &AliasRules::default())
            .unwrap_err();
        assert_eq!(field_of(err), "alias");

        let err = compose(&request(Some("abcdef"), None, Some(30)), &AliasRules::default())
            .unwrap_err();
        assert_eq!(field_of(err), "length");

        assert!(compose(&request(Some("ab"), None, Some(30)), &AliasRules::default()).is_ok());
    }

    #[test]
    fn test_prefix_ceiling_is_configurable() {
        let rules = AliasRules {
            max_prefix_length: 3,
            default_length: 6,
        };
        let err = compose(&request(Some("abcd"), None, Some(4)), &rules).unwrap_err();
        assert_eq!(field_of(err), "prefix");
    }

    #[test]
    fn test_length_out_of_range() {
        for length in [0, -3, 33] {
            let err =
                compose(&request(None, None, Some(length)), &AliasRules::default()).unwrap_err();
            assert!(matches!(err, AppError::InvalidLength(l) if l == length));
        }
    }

    #[test]
    fn test_whitespace_rejected() {
        let err = compose(&request(Some("my pre"), None, Some(4)), &AliasRules::default())
            .unwrap_err();
        assert_eq!(field_of(err), "prefix");

        let err =
            compose(&request(None, Some("my\talias"), None), &AliasRules::default()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation { ref reason, .. } if reason.contains("whitespace")
        ));
    }

    #[test]
    fn test_charset_enforced() {
        let err =
            compose(&request(None, Some("bad/alias"), None), &AliasRules::default()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation { ref field, ref reason } if field == "alias" && reason.contains("letters")
        ));

        let err =
            compose(&request(Some("ü"), None, Some(3)), &AliasRules::default()).unwrap_err();
        assert_eq!(field_of(err), "prefix");
    }

    #[test]
    fn test_ceiling_checked_before_whitespace() {
        let alias = format!("{} x", "a".repeat(31));
        let err = compose(&request(None, Some(&alias), None), &AliasRules::default()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation { ref reason, .. } if reason.contains("at most")
        ));
    }

    #[test]
    fn test_reserved_codes_rejected() {
        let err = compose(&request(None, Some("API"), None), &AliasRules::default()).unwrap_err();
        assert_eq!(field_of(err), "alias");
    }

    #[test]
    fn test_custom_candidate_is_stable() {
        let candidate = Candidate::Custom("fixed".to_string());
        assert_eq!(candidate.produce().unwrap(), "fixed");
        assert_eq!(candidate.produce().unwrap(), "fixed");
    }
}

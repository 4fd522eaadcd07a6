//! `Authorization` header parsing.
//!
//! The header must be exactly two whitespace-separated words, the first of
//! which is `Bearer` (any case). Each failure has its own message because the
//! authorizer returns it verbatim to the caller.

use thiserror::Error;

/// Reasons an `Authorization` header cannot yield a bearer token.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearerError {
    #[error("Authorization header is expected")]
    Missing,

    #[error("Authorization header must start with 'Bearer'")]
    WrongScheme,

    #[error("Token not found")]
    TokenNotFound,

    #[error("Authorization header must be Bearer token")]
    TooManyParts,
}

/// Extract the token from an `Authorization` header value.
///
/// # Errors
///
/// See [`BearerError`]. The scheme is checked before the word count, so
/// `"Basic"` alone reports [`BearerError::WrongScheme`].
pub fn parse_bearer(header: Option<&str>) -> Result<&str, BearerError> {
    let header = header.ok_or(BearerError::Missing)?;

    let mut parts = header.split_whitespace();
    let scheme = parts.next().ok_or(BearerError::Missing)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(BearerError::WrongScheme);
    }

    let token = parts.next().ok_or(BearerError::TokenNotFound)?;
    if parts.next().is_some() {
        return Err(BearerError::TooManyParts);
    }

    Ok(token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer_valid() {
        assert_eq!(parse_bearer(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_parse_bearer_scheme_case_insensitive() {
        assert_eq!(parse_bearer(Some("bearer tok")).unwrap(), "tok");
        assert_eq!(parse_bearer(Some("BEARER tok")).unwrap(), "tok");
    }

    #[test]
    fn test_parse_bearer_extra_whitespace() {
        assert_eq!(parse_bearer(Some("  Bearer \t tok  ")).unwrap(), "tok");
    }

    #[test]
    fn test_parse_bearer_missing() {
        assert_eq!(parse_bearer(None), Err(BearerError::Missing));
        assert_eq!(parse_bearer(Some("")), Err(BearerError::Missing));
        assert_eq!(parse_bearer(Some("   ")), Err(BearerError::Missing));
    }

    #[test]
    fn test_parse_bearer_wrong_scheme() {
        assert_eq!(
            parse_bearer(Some("Basic dXNlcjpwYXNz")),
            Err(BearerError::WrongScheme)
        );
        assert_eq!(parse_bearer(Some("Basic")), Err(BearerError::WrongScheme));
    }

    #[test]
    fn test_parse_bearer_token_not_found() {
        assert_eq!(parse_bearer(Some("Bearer")), Err(BearerError::TokenNotFound));
    }

    #[test]
    fn test_parse_bearer_too_many_parts() {
        assert_eq!(
            parse_bearer(Some("Bearer a b")),
            Err(BearerError::TooManyParts)
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            BearerError::Missing.to_string(),
            "Authorization header is expected"
        );
        assert_eq!(
            BearerError::WrongScheme.to_string(),
            "Authorization header must start with 'Bearer'"
        );
        assert_eq!(BearerError::TokenNotFound.to_string(), "Token not found");
        assert_eq!(
            BearerError::TooManyParts.to_string(),
            "Authorization header must be Bearer token"
        );
    }
}

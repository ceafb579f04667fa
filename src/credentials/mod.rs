use thiserror::Error;

/// Environment variable name for providing a GitHub token
pub const ENV_TOKEN_VAR: &str = "PR_BOARD_GH_TOKEN";

/// Conventional fallback used by gh and most CI systems
pub const FALLBACK_ENV_TOKEN_VAR: &str = "GITHUB_TOKEN";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error(
        "No GitHub token found. Pass --token or set {env} (or {fallback}).",
        env = ENV_TOKEN_VAR,
        fallback = FALLBACK_ENV_TOKEN_VAR
    )]
    TokenNotFound,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Pick the token from the first non-empty source: the --token flag, then
/// PR_BOARD_GH_TOKEN, then GITHUB_TOKEN.
///
/// The lookup is passed in so the precedence can be tested without touching
/// the process environment.
pub fn resolve_token_with(
    flag: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, CredentialError> {
    non_empty(flag)
        .or_else(|| non_empty(lookup(ENV_TOKEN_VAR)))
        .or_else(|| non_empty(lookup(FALLBACK_ENV_TOKEN_VAR)))
        .ok_or(CredentialError::TokenNotFound)
}

/// Resolve the token from the --token flag or the environment
pub fn resolve_token(flag: Option<String>) -> Result<String, CredentialError> {
    resolve_token_with(flag, |name| std::env::var(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_flag_wins() {
        let token = resolve_token_with(
            Some("from-flag".to_string()),
            env(&[(ENV_TOKEN_VAR, "from-env")]),
        );
        assert_eq!(token.unwrap(), "from-flag");
    }

    #[test]
    fn test_dedicated_env_var_before_fallback() {
        let token = resolve_token_with(
            None,
            env(&[(ENV_TOKEN_VAR, "dedicated"), (FALLBACK_ENV_TOKEN_VAR, "generic")]),
        );
        assert_eq!(token.unwrap(), "dedicated");
    }

    #[test]
    fn test_fallback_env_var() {
        let token = resolve_token_with(None, env(&[(FALLBACK_ENV_TOKEN_VAR, "generic")]));
        assert_eq!(token.unwrap(), "generic");
    }

    #[test]
    fn test_blank_values_are_skipped_and_trimmed() {
        let token = resolve_token_with(
            Some("   ".to_string()),
            env(&[(ENV_TOKEN_VAR, ""), (FALLBACK_ENV_TOKEN_VAR, "  padded\n")]),
        );
        assert_eq!(token.unwrap(), "padded");
    }

    #[test]
    fn test_missing_everywhere() {
        assert_eq!(
            resolve_token_with(None, env(&[])),
            Err(CredentialError::TokenNotFound)
        );
    }
}

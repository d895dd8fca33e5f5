use crate::errors::ApiError;

/// Rejects hashes that cannot have been produced by a root volume
pub fn validate_token(name: &'static str, token: &str) -> Result<(), ApiError> {
    if token.is_empty() {
        return Err(ApiError::MissingParameter(name));
    }

    // Tokens are `a<N>_` followed by url-safe base64
    let valid = token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if !valid {
        tracing::warn!("Rejected malformed {} hash: {:?}", name, token);
        return Err(ApiError::InvalidParameter {
            name,
            value: token.to_string(),
        });
    }

    Ok(())
}

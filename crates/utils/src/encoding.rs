use crate::UtilsError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Encodes a relative path for use inside a client token.
/// The URL-safe alphabet keeps tokens usable in query strings and URL paths.
pub fn encode_path(path: &str) -> String {
    URL_SAFE_NO_PAD.encode(path.as_bytes())
}

pub fn decode_path(encoded: &str) -> Result<String, UtilsError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded.trim_end_matches('='))
        .map_err(|e| UtilsError::DecodeError(e.to_string()))?;

    String::from_utf8(bytes).map_err(|e| UtilsError::DecodeError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for path in ["/", "/docs/a b.txt", "/ünï/cødé_x", "/a_b/c-d"] {
            assert_eq!(decode_path(&encode_path(path)).unwrap(), path);
        }
    }

    #[test]
    fn test_invalid_input() {
        assert!(decode_path("***").is_err());
    }
}

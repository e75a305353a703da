//! # Base64url
//!
//! JWS segments and JWK coordinates use the URL-safe base64 alphabet
//! (`-` and `_`) without padding. Trailing `=` padding is tolerated on input
//! since some issuers emit it.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::Base64Error;

/// Decode URL-safe base64, ignoring any trailing `=` padding.
pub fn decode(text: &str) -> Result<Vec<u8>, Base64Error> {
    URL_SAFE_NO_PAD
        .decode(text.trim_end_matches('='))
        .map_err(|e| Base64Error::Invalid(e.to_string()))
}

/// Encode bytes as unpadded URL-safe base64.
pub fn encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_url_safe_alphabet() {
        assert_eq!(decode("-_8").unwrap(), vec![0xfb, 0xff]);
    }

    #[test]
    fn tolerates_padding() {
        assert_eq!(decode("eyJ6aXAiOiJERUYifQ==").unwrap(), b"{\"zip\":\"DEF\"}");
        assert_eq!(decode("eyJ6aXAiOiJERUYifQ").unwrap(), b"{\"zip\":\"DEF\"}");
    }

    #[test]
    fn rejects_standard_alphabet() {
        assert!(decode("+/8").is_err());
    }

    #[test]
    fn encode_omits_padding() {
        assert_eq!(encode(&[0xfb, 0xff]), "-_8");
    }
}

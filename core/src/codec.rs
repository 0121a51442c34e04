//! Hex text support for identifiers and card payloads.
//!
//! Hosts usually hand identifiers over in their printed form, such as `04:A2:B3:C4` or
//! `04 a2 b3 c4`. Colons and spaces are separators and carry no meaning; digits are
//! case-insensitive.

const SEPARATORS: [char; 2] = [':', ' '];

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("Malformed hex text: {0}")]
pub struct Error(#[from] hex::FromHexError);

/// Decodes hex text into octets, skipping separators.
pub fn decode(text: &str) -> Result<Vec<u8>, Error> {
    let digits: String = text.chars().filter(|c| !SEPARATORS.contains(c)).collect();

    Ok(hex::decode(digits)?)
}

/// Encodes octets into the canonical text form, upper-case and colon-delimited.
pub fn encode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| hex::encode_upper([*b]))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ignores_separators() {
        let expected = vec![0x04, 0xA2, 0xB3, 0xC4];

        assert_eq!(expected, decode("04:A2:B3:C4").unwrap());
        assert_eq!(expected, decode("04A2B3C4").unwrap());
        assert_eq!(expected, decode("04 a2 b3:c4").unwrap());
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(Vec::<u8>::new(), decode("").unwrap());
        assert_eq!(Vec::<u8>::new(), decode(" : ").unwrap());
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert_eq!(
            Err(Error(hex::FromHexError::OddLength)),
            decode("04:A2:B")
        );
        assert!(matches!(
            decode("04:G2"),
            Err(Error(hex::FromHexError::InvalidHexCharacter { c: 'G', .. }))
        ));
    }

    #[test]
    fn test_reencoding_is_idempotent() {
        for text in ["04:a2:b3:c4", "04A2B3C4", "de ad be ef", ""] {
            let bytes = decode(text).unwrap();
            let canonical = encode(&bytes);

            assert_eq!(bytes, decode(&canonical).unwrap());
            assert_eq!(canonical, encode(&decode(&canonical).unwrap()));
        }
    }

    #[test]
    fn test_encode() {
        assert_eq!("04:A2:B3:C4", encode(&[0x04, 0xA2, 0xB3, 0xC4]));
        assert_eq!("", encode(&[]));
    }
}

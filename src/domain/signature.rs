use base64::Engine;
use base64::engine::general_purpose::STANDARD;

pub const DIGEST_FIELD: &str = "DigestValue";
pub const SIGNATURE_FIELD: &str = "SignatureValue";
pub const SERIAL_FIELD: &str = "X509SerialNumber";

/// The signature fields attached to every signed request.
///
/// Always computed fresh over the exact field set being sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureBundle {
    pub digest_value: String,
    pub signature_value: String,
    /// Lowercase hex, no `0x` prefix.
    pub certificate_serial: String,
}

impl SignatureBundle {
    pub fn into_fields(self) -> [(&'static str, String); 3] {
        [
            (DIGEST_FIELD, self.digest_value),
            (SIGNATURE_FIELD, self.signature_value),
            (SERIAL_FIELD, self.certificate_serial),
        ]
    }
}

pub fn to_base64(value: impl AsRef<[u8]>) -> String {
    STANDARD.encode(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn test_to_base64_accepts_text_and_bytes() {
        assert_eq!(to_base64("test source"), "dGVzdCBzb3VyY2U=");
        assert_eq!(to_base64(b"test source"), "dGVzdCBzb3VyY2U=");
        assert_eq!(to_base64(b""), "");
    }

    #[test]
    fn test_base64_round_trip_is_stable() {
        let mut rng = rand::thread_rng();
        for len in [0, 1, 2, 3, 31, 64, 257] {
            let mut bytes = vec![0u8; len];
            rng.fill_bytes(&mut bytes);

            let encoded = to_base64(&bytes);
            let decoded = STANDARD.decode(&encoded).unwrap();
            assert_eq!(to_base64(decoded), encoded);
        }
    }
}

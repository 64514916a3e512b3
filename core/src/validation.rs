//! Local input validation.
//!
//! Everything here runs before a request is built, so a rejected input never
//! reaches the network. Messages are fixed literals that existing partner
//! integrations match on.

use uuid::Uuid;

use crate::error::{
    CpvError, MSG_API_KEY_INVALID, MSG_CPF_INVALID, MSG_CPF_MISSING, MSG_KEY_MISSING,
    MSG_XML_MISSING,
};

/// Number of digits in a CPF, check digits included.
const CPF_LEN: usize = 11;

/// Length of the hyphenated UUID form, the only one sent as `x-api-key`.
const API_KEY_LEN: usize = 36;

/// Validates the syntax of a partner API key (hyphenated UUID).
///
/// The simple, braced and `urn:uuid:` spellings are rejected because the key
/// is forwarded to the service exactly as given.
pub fn validate_api_key(api_key: &str) -> Result<(), CpvError> {
    if api_key.len() != API_KEY_LEN || Uuid::parse_str(api_key).is_err() {
        return Err(CpvError::validation(MSG_API_KEY_INVALID));
    }
    Ok(())
}

/// Validates that the base64 receipt XML was supplied.
pub fn validate_xml(xml: &str) -> Result<(), CpvError> {
    if xml.is_empty() {
        return Err(CpvError::validation(MSG_XML_MISSING));
    }
    Ok(())
}

/// Validates a customer CPF and returns its digits-only form.
///
/// ## Example
/// ```rust
/// use cpv_core::validation::validate_cpf;
///
/// assert_eq!(validate_cpf("529.982.247-25").unwrap(), "52998224725");
/// assert!(validate_cpf("000.000.000-00").is_err());
/// assert!(validate_cpf("").is_err());
/// ```
pub fn validate_cpf(cpf: &str) -> Result<String, CpvError> {
    if cpf.is_empty() {
        return Err(CpvError::validation(MSG_CPF_MISSING));
    }
    if !is_valid_cpf(cpf) {
        return Err(CpvError::validation(MSG_CPF_INVALID));
    }
    Ok(normalize_cpf(cpf))
}

/// Strips every non-digit character.
pub fn normalize_cpf(cpf: &str) -> String {
    cpf.chars().filter(char::is_ascii_digit).collect()
}

/// Validates that a receipt access key was supplied.
pub fn validate_receipt_key(key: &str) -> Result<(), CpvError> {
    if key.is_empty() {
        return Err(CpvError::validation(MSG_KEY_MISSING));
    }
    Ok(())
}

/// CPF checksum: 11 digits, not all equal, both mod-11 check digits match.
///
/// Every non-digit character is ignored, the same way `normalize_cpf`
/// strips it, so the checksum always runs on the value that is sent.
pub fn is_valid_cpf(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != CPF_LEN {
        return false;
    }
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

fn check_digit(digits: &[u32]) -> u32 {
    let top_weight = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top_weight - i as u32))
        .sum();
    match sum % 11 {
        r if r < 2 => 0,
        r => 11 - r,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_accepts_uuid() {
        assert!(validate_api_key("56c1f1b8-9b5c-41cd-b8f7-872be3500ad3").is_ok());
    }

    #[test]
    fn api_key_rejects_other_uuid_spellings() {
        for key in [
            "56c1f1b89b5c41cdb8f7872be3500ad3",
            "{56c1f1b8-9b5c-41cd-b8f7-872be3500ad3}",
            "urn:uuid:56c1f1b8-9b5c-41cd-b8f7-872be3500ad3",
        ] {
            let err = validate_api_key(key).unwrap_err();
            assert_eq!(err.message(), Some(MSG_API_KEY_INVALID), "{key}");
        }
    }

    #[test]
    fn api_key_rejects_free_text() {
        let err = validate_api_key("not-a-uuid").unwrap_err();
        assert_eq!(
            err,
            CpvError::Validation(Some(
                "API Key não é válida, informe uma Api Key válida.".to_string()
            ))
        );
    }

    #[test]
    fn xml_must_be_present() {
        assert!(validate_xml("Q3Vwb21WZXJkZQ==").is_ok());
        assert_eq!(validate_xml("").unwrap_err().message(), Some("XML não informado."));
    }

    #[test]
    fn cpf_known_valid_values() {
        assert!(is_valid_cpf("52998224725"));
        assert!(is_valid_cpf("529.982.247-25"));
        assert!(is_valid_cpf("111.444.777-35"));
    }

    #[test]
    fn cpf_rejects_repeated_digits() {
        for d in 0..=9 {
            let cpf = d.to_string().repeat(11);
            assert!(!is_valid_cpf(&cpf), "{cpf} should be rejected");
        }
    }

    #[test]
    fn cpf_rejects_wrong_check_digits() {
        assert!(!is_valid_cpf("52998224724"));
        assert!(!is_valid_cpf("52998224715"));
    }

    #[test]
    fn cpf_rejects_wrong_length() {
        assert!(!is_valid_cpf("5299822472"));
        assert!(!is_valid_cpf("529982247250"));
        assert!(!is_valid_cpf("5299822472a"));
    }

    #[test]
    fn cpf_ignores_any_non_digit() {
        assert!(is_valid_cpf("CPF 529.982.247-25"));
        assert!(is_valid_cpf("529_982_247:25"));
        assert_eq!(validate_cpf("CPF: 111.444.777-35").unwrap(), "11144477735");
    }

    #[test]
    fn validate_cpf_messages() {
        assert_eq!(
            validate_cpf("").unwrap_err().message(),
            Some("cpfCliente não informado, informe um cpf válido.")
        );
        assert_eq!(
            validate_cpf("00000000000").unwrap_err().message(),
            Some("cpfCliente inválido, informe um cpf válido.")
        );
    }

    #[test]
    fn normalize_strips_punctuation() {
        assert_eq!(normalize_cpf("000.000.000-00"), "00000000000");
        assert_eq!(normalize_cpf(" 529.982.247-25 "), "52998224725");
    }

    #[test]
    fn receipt_key_must_be_present() {
        assert_eq!(
            validate_receipt_key("").unwrap_err().message(),
            Some("Chave não informada.")
        );
        assert!(validate_receipt_key("35200000000000000000000000000000000000000001").is_ok());
    }
}

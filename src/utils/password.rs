use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha256;
use rand::Rng;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

type HmacSha256 = Hmac<Sha256>;

const ITERATIONS: u32 = 260000;
const KEY_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

/// Hash un mot de passe au format Werkzeug: pbkdf2:sha256:iterations$salt$hash
pub fn hash_password(password: &str) -> Result<String, String> {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill(&mut salt);

    let key = derive(password, &salt, ITERATIONS, KEY_LENGTH)?;

    Ok(format!(
        "pbkdf2:sha256:{}${}${}",
        ITERATIONS,
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(key)
    ))
}

/// Vérifie un mot de passe contre un hash stocké
/// Le hash peut être encodé en base64 (comptes créés ici) ou en hex (anciens comptes)
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, String> {
    let mut parts = stored_hash.split('$');
    let (header, salt_str, hash_str) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(s), Some(k), None) => (h, s, k),
        _ => return Err("Invalid hash format".to_string()),
    };

    let iterations = match header.split(':').collect::<Vec<_>>().as_slice() {
        ["pbkdf2", "sha256", iterations] => iterations
            .parse::<u32>()
            .map_err(|_| "Invalid iterations".to_string())?,
        _ => return Err("Invalid header".to_string()),
    };

    let salt = decode(salt_str)?;
    let expected = decode(hash_str)?;
    if expected.is_empty() {
        return Err("Empty hash".to_string());
    }
    let computed = derive(password, &salt, iterations, expected.len())?;

    // Comparaison sans court-circuit
    let diff = computed
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b));

    Ok(diff == 0 && computed.len() == expected.len())
}

fn derive(password: &str, salt: &[u8], iterations: u32, length: usize) -> Result<Vec<u8>, String> {
    let mut key = vec![0u8; length];
    pbkdf2::<HmacSha256>(password.as_bytes(), salt, iterations, &mut key)
        .map_err(|e| format!("PBKDF2 failed: {}", e))?;
    Ok(key)
}

fn decode(input: &str) -> Result<Vec<u8>, String> {
    if input.len() % 2 == 0 && input.len() >= 32 && input.chars().all(|c| c.is_ascii_hexdigit()) {
        return hex::decode(input).map_err(|e| format!("Hex decode failed: {}", e));
    }

    URL_SAFE_NO_PAD
        .decode(input.trim_end_matches('='))
        .map_err(|e| format!("Base64 decode failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();

        assert!(hash.starts_with("pbkdf2:sha256:260000$"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_hex_encoded_hash() {
        let salt = b"0123456789abcdef";
        let key = derive("legacy", salt, 1000, KEY_LENGTH).unwrap();
        let stored = format!("pbkdf2:sha256:1000${}${}", URL_SAFE_NO_PAD.encode(salt), hex::encode(key));

        assert!(verify_password("legacy", &stored).unwrap());
    }

    #[test]
    fn test_malformed_hash() {
        assert!(verify_password("x", "not-a-hash").is_err());
        assert!(verify_password("x", "md5:1$a$b").is_err());
    }

    #[test]
    fn test_empty_hash_segment_never_verifies() {
        let salt = URL_SAFE_NO_PAD.encode(b"0123456789abcdef");

        assert!(verify_password("anything", &format!("pbkdf2:sha256:1000${}$", salt)).is_err());
    }
}

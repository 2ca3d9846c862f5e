//! Hash de contraseñas con PBKDF2-HMAC-SHA256.
//!
//! Formato almacenado: `pbkdf2_sha256$<iteraciones>$<salt b64>$<hash b64>`.
//! Los hashes bcrypt ya existentes en el JSON se siguen verificando.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const PREFIJO_HASH: &str = "pbkdf2_sha256";
pub const ITERACIONES_POR_DEFECTO: u32 = 100_000;

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

/// Genera el hash con salt aleatorio de 16 bytes.
pub fn hash_password(password: &str, iterations: u32) -> String {
    let iterations = iterations.max(1);
    let mut salt = [0u8; 16];
    rand::rng().fill_bytes(&mut salt);
    let key = derive_key(password, &salt, iterations);
    format!("{}${}${}${}", PREFIJO_HASH, iterations, B64.encode(salt), B64.encode(key))
}

struct HashGuardado {
    iterations: u32,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

fn parse_hash(stored: &str) -> Option<HashGuardado> {
    let mut partes = stored.split('$');
    if partes.next()? != PREFIJO_HASH {
        return None;
    }
    let iterations = partes.next()?.parse::<u32>().ok().filter(|n| *n > 0)?;
    let salt = B64.decode(partes.next()?).ok()?;
    let hash = B64.decode(partes.next()?).ok()?;
    if partes.next().is_some() || salt.is_empty() || hash.is_empty() {
        return None;
    }
    Some(HashGuardado { iterations, salt, hash })
}

/// Hashes bcrypt heredados (`$2a$`, `$2b$`, `$2y$`).
fn parece_bcrypt(stored: &str) -> bool {
    let b = stored.as_bytes();
    b.len() == 60 && (stored.starts_with("$2a$") || stored.starts_with("$2b$") || stored.starts_with("$2y$"))
}

/// ¿El valor almacenado tiene forma de hash con salt?
pub fn parece_hash(stored: &str) -> bool {
    parse_hash(stored).is_some() || parece_bcrypt(stored)
}

/// Verifica la contraseña contra un hash almacenado. Hashes mal formados
/// nunca verifican.
pub fn verify_password(password: &str, stored: &str) -> bool {
    if let Some(h) = parse_hash(stored) {
        let key = derive_key(password, &h.salt, h.iterations);
        return key.ct_eq(h.hash.as_slice()).into();
    }
    if parece_bcrypt(stored) {
        return bcrypt::verify(password, stored).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "hash bcrypt inválido");
            false
        });
    }
    false
}

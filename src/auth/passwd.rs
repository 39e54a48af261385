//! 加盐哈希密码凭据
//!
//! 凭据格式为 `算法:盐:摘要`，摘要 = 十六进制(hash(密码 || 盐))

use rand::Rng;
use sha2::{Digest, Sha256};

/// 默认摘要算法
pub const DEFAULT_ALGORITHM: &str = "sha256";

/// 盐的十六进制长度
const SALT_LEN: usize = 12;

/// 由明文密码派生凭据
pub fn passwd(passphrase: &str) -> String {
    let salt = random_salt();
    let digest = sha256_hex(passphrase, &salt);
    format!("{}:{}:{}", DEFAULT_ALGORITHM, salt, digest)
}

/// 由交互输入得到凭据，空输入表示不启用密码
pub fn credential_from_input(input: &str) -> Option<String> {
    let passphrase = input.trim_end_matches(['\r', '\n']);
    if passphrase.is_empty() {
        return None;
    }
    Some(passwd(passphrase))
}

/// 校验明文密码是否与凭据匹配
///
/// 凭据格式错误或算法不受支持时返回 false
pub fn passwd_check(hashed: &str, passphrase: &str) -> bool {
    let mut parts = hashed.splitn(3, ':');
    let (Some(algorithm), Some(salt), Some(expected)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if algorithm != DEFAULT_ALGORITHM || expected.is_empty() {
        return false;
    }

    let actual = sha256_hex(passphrase, salt);
    constant_time_eq(actual.as_bytes(), expected.to_ascii_lowercase().as_bytes())
}

fn random_salt() -> String {
    let bytes: [u8; SALT_LEN / 2] = rand::thread_rng().r#gen();
    hex::encode(bytes)
}

fn sha256_hex(passphrase: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(passphrase.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passwd_format() {
        let hashed = passwd("secret");
        let parts: Vec<&str> = hashed.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "sha256");
        assert_eq!(parts[1].len(), SALT_LEN);
        assert_eq!(parts[2].len(), 64);
    }

    #[test]
    fn test_passwd_check() {
        let hashed = passwd("secret");
        assert!(passwd_check(&hashed, "secret"));
        assert!(!passwd_check(&hashed, "Secret"));
        assert!(!passwd_check(&hashed, ""));
    }

    #[test]
    fn test_credential_from_input() {
        assert!(credential_from_input("").is_none());
        assert!(credential_from_input("\n").is_none());

        let hashed = credential_from_input("secret\r\n").unwrap();
        assert!(passwd_check(&hashed, "secret"));
    }

    #[test]
    fn test_salt_differs() {
        assert_ne!(passwd("secret"), passwd("secret"));
    }

    #[test]
    fn test_known_digest() {
        // sha256("abc" || "") 的已知值
        let hashed = "sha256::ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
        assert!(passwd_check(hashed, "abc"));
    }

    #[test]
    fn test_malformed_credentials() {
        assert!(!passwd_check("", "secret"));
        assert!(!passwd_check("sha256", "secret"));
        assert!(!passwd_check("sha256:abc", "secret"));
        assert!(!passwd_check("sha256:abc:", "secret"));

        let legacy = passwd("secret").replacen("sha256", "sha1", 1);
        assert!(!passwd_check(&legacy, "secret"));
    }
}

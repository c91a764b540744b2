//! 密码重置令牌：原始令牌只出现在邮件链接里，数据库保存 SHA-256 摘要

use rand::RngCore;
use sha2::{Digest, Sha256};

const TOKEN_BYTES: usize = 32;

/// 生成 32 字节随机令牌（十六进制）
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.trim().as_bytes()))
}

/// 邮件中的重置链接
pub fn reset_link(base_url: &str, token: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}token={token}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let token = generate_reset_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_reset_token());
    }

    #[test]
    fn test_hash_is_stable_and_ignores_whitespace() {
        let hash = hash_reset_token("abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash_reset_token(" abc\n"), hash);
    }

    #[test]
    fn test_reset_link() {
        assert_eq!(
            reset_link("http://localhost/reset.html", "ff"),
            "http://localhost/reset.html?token=ff"
        );
        assert_eq!(
            reset_link("http://localhost/reset?lang=pt", "ff"),
            "http://localhost/reset?lang=pt&token=ff"
        );
    }
}

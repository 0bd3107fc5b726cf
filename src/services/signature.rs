//! GitHub webhook 签名校验
//!
//! `X-Hub-Signature-256: sha256=<hex>`，HMAC-SHA256，密钥为 webhook secret

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// 签名前缀
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// 校验签名
///
/// 对任何格式错误的输入返回 false；比较为常量时间
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let presented = signature
        .strip_prefix(SIGNATURE_PREFIX)
        .unwrap_or(signature);
    if presented.is_empty() {
        return false;
    }

    let expected = sign(secret, body);

    // 长度不同时 ct_eq 直接返回 0
    expected.as_bytes().ct_eq(presented.as_bytes()).into()
}

/// 计算 body 的十六进制 HMAC（不带前缀）
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        // HMAC 接受任意长度的密钥
        Err(_) => return String::new(),
    };
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

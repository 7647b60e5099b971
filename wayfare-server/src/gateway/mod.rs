//! Payment gateway integration via REST API (no SDK dependency)
//!
//! 创建支付链接走网关 REST 接口；回调用 HMAC-SHA256 对原始请求体
//! 验签 (`x-gateway-signature` 头，hex 编码)。

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 网关客户端
#[derive(Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    webhook_secret: String,
}

#[derive(Debug, Deserialize)]
struct PaymentLinkResponse {
    #[serde(rename = "checkoutUrl")]
    checkout_url: String,
}

impl GatewayClient {
    pub fn new(api_url: String, api_key: String, webhook_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            api_key,
            webhook_secret,
        }
    }

    /// Create a hosted checkout link for a payment.
    ///
    /// `gateway_ref` 是我们侧生成的唯一引用，回调时用它找回 payment。
    pub async fn create_payment_link(
        &self,
        gateway_ref: &str,
        amount: f64,
        description: &str,
    ) -> Result<String, BoxError> {
        let resp = self
            .http
            .post(format!("{}/payment-requests", self.api_url))
            .basic_auth(&self.api_key, None::<&str>)
            .form(&[
                ("reference", gateway_ref),
                ("amount", &format!("{amount:.2}")),
                ("description", description),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("Gateway payment-request failed ({status}): {body}").into());
        }

        let parsed: PaymentLinkResponse = resp.json().await?;
        Ok(parsed.checkout_url)
    }

    /// Verify the webhook signature header against the raw body.
    ///
    /// Constant-time comparison via `Mac::verify_slice`.
    pub fn verify_webhook_signature(&self, body: &[u8], signature_hex: &str) -> Result<(), String> {
        verify_webhook_signature(body, signature_hex, &self.webhook_secret)
    }
}

/// HMAC-SHA256(secret, body) == hex-decoded signature header
pub fn verify_webhook_signature(
    body: &[u8],
    signature_hex: &str,
    secret: &str,
) -> Result<(), String> {
    let expected = hex::decode(signature_hex.trim())
        .map_err(|_| "signature is not valid hex".to_string())?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| "invalid webhook secret".to_string())?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| "signature mismatch".to_string())
}

/// 测试/客户端侧签名
pub fn sign_webhook_body(body: &[u8], secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key size");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_round_trip() {
        let body = br#"{"id":"evt_1","type":"payment.succeeded"}"#;
        let sig = sign_webhook_body(body, "test-secret");
        assert!(verify_webhook_signature(body, &sig, "test-secret").is_ok());
    }

    #[test]
    fn tampered_body_is_rejected() {
        let sig = sign_webhook_body(b"original", "test-secret");
        assert!(verify_webhook_signature(b"tampered", &sig, "test-secret").is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let sig = sign_webhook_body(b"payload", "secret-a");
        assert!(verify_webhook_signature(b"payload", &sig, "secret-b").is_err());
    }

    #[test]
    fn garbage_signature_is_rejected() {
        assert!(verify_webhook_signature(b"payload", "not-hex!", "secret").is_err());
    }
}

//! # Payment verification signature
//!
//! The gateway checkout flow never persists an order up front. The client completes payment at the
//! gateway and then calls back with the gateway's order id, payment id, and a signature. That
//! signature is the *only* evidence the payment succeeded, so it must be recomputed server-side
//! and compared before any order row is written.
//!
//! ## Message format
//!
//! The signed message is the gateway order id and gateway payment id concatenated with a pipe:
//!
//! ```text
//!     {gateway_order_id}|{gateway_payment_id}
//! ```
//!
//! The signature is HMAC-SHA256 over that message, keyed with the server-held gateway key secret,
//! transmitted as lowercase hex. Comparison is constant-time via the `hmac` crate's verifier.

use hmac::{Hmac, Mac};
use market_common::helpers::{from_hex, to_hex};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub fn signature_message(gateway_order_id: &str, gateway_payment_id: &str) -> String {
    format!("{gateway_order_id}|{gateway_payment_id}")
}

/// Produce the expected hex signature for the given gateway identifiers.
pub fn sign_payment(secret: &str, gateway_order_id: &str, gateway_payment_id: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(signature_message(gateway_order_id, gateway_payment_id).as_bytes());
    to_hex(&mac.finalize().into_bytes())
}

/// Constant-time check of a client-supplied signature. Malformed hex fails closed.
pub fn verify_payment_signature(
    secret: &str,
    gateway_order_id: &str,
    gateway_payment_id: &str,
    supplied: &str,
) -> bool {
    let supplied = match from_hex(supplied.trim()) {
        Some(bytes) => bytes,
        None => return false,
    };
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(signature_message(gateway_order_id, gateway_payment_id).as_bytes());
    mac.verify_slice(&supplied).is_ok()
}

#[cfg(test)]
mod test {
    use super::*;

    const SECRET: &str = "test-gateway-secret";

    #[test]
    fn sign_and_verify_round_trip() {
        let sig = sign_payment(SECRET, "order_abc", "pay_123");
        assert!(verify_payment_signature(SECRET, "order_abc", "pay_123", &sig));
    }

    #[test]
    fn message_format() {
        assert_eq!(signature_message("order_abc", "pay_123"), "order_abc|pay_123");
    }

    #[test]
    fn any_single_byte_tamper_is_rejected() {
        let sig = sign_payment(SECRET, "order_abc", "pay_123");
        for i in 0..sig.len() {
            let mut tampered: Vec<u8> = sig.bytes().collect();
            // Flip to a different hex digit at position i.
            tampered[i] = if tampered[i] == b'0' { b'1' } else { b'0' };
            let tampered = String::from_utf8(tampered).unwrap();
            if tampered == sig {
                continue;
            }
            assert!(
                !verify_payment_signature(SECRET, "order_abc", "pay_123", &tampered),
                "tampered signature at byte {i} was accepted"
            );
        }
    }

    #[test]
    fn wrong_identifiers_are_rejected() {
        let sig = sign_payment(SECRET, "order_abc", "pay_123");
        assert!(!verify_payment_signature(SECRET, "order_abc", "pay_999", &sig));
        assert!(!verify_payment_signature(SECRET, "order_xyz", "pay_123", &sig));
        assert!(!verify_payment_signature("other-secret", "order_abc", "pay_123", &sig));
    }

    #[test]
    fn malformed_hex_is_rejected() {
        assert!(!verify_payment_signature(SECRET, "order_abc", "pay_123", "not-hex"));
        assert!(!verify_payment_signature(SECRET, "order_abc", "pay_123", ""));
        assert!(!verify_payment_signature(SECRET, "order_abc", "pay_123", "abc"));
    }
}

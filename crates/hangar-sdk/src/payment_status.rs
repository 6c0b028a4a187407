// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway status strings mapped onto [`PaymentStatus`].

use hangar_protocol::payment::PaymentStatus;

/// WeChat Pay `trade_state`.
pub fn wechat_trade_state(state: &str) -> PaymentStatus {
    match state.trim().to_ascii_uppercase().as_str() {
        "SUCCESS" => PaymentStatus::Paid,
        "NOTPAY" | "USERPAYING" => PaymentStatus::Pending,
        "REFUND" => PaymentStatus::Refunding,
        "CLOSED" | "REVOKED" => PaymentStatus::Closed,
        "PAYERROR" => PaymentStatus::Failed,
        _ => PaymentStatus::Unspecified,
    }
}

/// Alipay `trade_status`.
pub fn alipay_trade_status(status: &str) -> PaymentStatus {
    match status.trim().to_ascii_uppercase().as_str() {
        "TRADE_SUCCESS" | "TRADE_FINISHED" => PaymentStatus::Paid,
        "WAIT_BUYER_PAY" => PaymentStatus::Pending,
        "TRADE_CLOSED" => PaymentStatus::Closed,
        _ => PaymentStatus::Unspecified,
    }
}

/// EZPay-compatible gateways, case-insensitive.
pub fn ezpay_status(status: &str) -> PaymentStatus {
    match status.trim().to_ascii_lowercase().as_str() {
        "trade_success" | "success" => PaymentStatus::Paid,
        "notpay" | "wait" | "pending" | "userpaying" => PaymentStatus::Pending,
        "closed" => PaymentStatus::Closed,
        "fail" | "failed" => PaymentStatus::Failed,
        _ => PaymentStatus::Unspecified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wechat_states() {
        for (input, want) in [
            ("SUCCESS", PaymentStatus::Paid),
            ("NOTPAY", PaymentStatus::Pending),
            ("USERPAYING", PaymentStatus::Pending),
            ("REFUND", PaymentStatus::Refunding),
            ("CLOSED", PaymentStatus::Closed),
            ("REVOKED", PaymentStatus::Closed),
            ("PAYERROR", PaymentStatus::Failed),
            (" success ", PaymentStatus::Paid),
            ("", PaymentStatus::Unspecified),
        ] {
            assert_eq!(wechat_trade_state(input), want, "{input:?}");
        }
    }

    #[test]
    fn alipay_states() {
        for (input, want) in [
            ("TRADE_SUCCESS", PaymentStatus::Paid),
            ("TRADE_FINISHED", PaymentStatus::Paid),
            ("WAIT_BUYER_PAY", PaymentStatus::Pending),
            ("TRADE_CLOSED", PaymentStatus::Closed),
            ("UNKNOWN", PaymentStatus::Unspecified),
            ("", PaymentStatus::Unspecified),
        ] {
            assert_eq!(alipay_trade_status(input), want, "{input:?}");
        }
    }

    #[test]
    fn ezpay_states() {
        for (input, want) in [
            ("trade_success", PaymentStatus::Paid),
            ("TRADE_SUCCESS", PaymentStatus::Paid),
            ("success", PaymentStatus::Paid),
            ("wait", PaymentStatus::Pending),
            ("userpaying", PaymentStatus::Pending),
            ("closed", PaymentStatus::Closed),
            ("failed", PaymentStatus::Failed),
            ("", PaymentStatus::Unspecified),
        ] {
            assert_eq!(ezpay_status(input), want, "{input:?}");
        }
    }
}

//! Device dialer trait.

use crate::error::Result;

/// Opens the platform dialer for a number.
///
/// Fire-and-forget: `Ok` means the dialer launched, not that the call connected.
#[async_trait::async_trait]
pub trait Dialer: Send + Sync {
    async fn open_call(&self, phone_number: &str) -> Result<()>;
}

/// Builds a `tel:` URI, dropping whitespace and visual separators.
pub fn tel_uri(phone_number: &str) -> String {
    let dialable: String = phone_number
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '*' | '#'))
        .collect();
    format!("tel:{}", dialable)
}

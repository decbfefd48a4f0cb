//! Renders a newly seen order as the text body of a Nostr note.

use crate::order::{currency, Order};
use tracing::warn;

/// Rendered in place of a numeric field the coordinator sent in a form we can't parse.
pub const PLACEHOLDER: &str = "?";

/// Build the announcement body for `order`.
///
/// Never fails: a missing or malformed quantity is logged and rendered as
/// [`PLACEHOLDER`] so the rest of the announcement still goes out.
pub fn format_announcement(order: &Order, referral_url: &str) -> String {
    let amount = if order.has_range {
        format!(
            "{}-{}",
            rounded_text(order.id, "min_amount", order.min_amount.as_deref()),
            rounded_text(order.id, "max_amount", order.max_amount.as_deref()),
        )
    } else {
        rounded_text(order.id, "amount", order.amount.as_deref())
    };

    let premium = match order.premium {
        Some(p) => format!("{p:.1}%"),
        None => format!("{PLACEHOLDER}%"),
    };

    let price = order
        .price
        .map(|p| format!("{p:.0}"))
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    format!(
        "Type: {}\nAmount: {}\nCurrency: {}\nPayment method: {}\nPremium: {}\nPrice: {}\nLINK(TOR): {}",
        order.order_type(),
        amount,
        currency::label(order.currency_code),
        order.payment_method,
        premium,
        price,
        referral_url,
    )
}

fn rounded_text(order_id: i64, field: &str, raw: Option<&str>) -> String {
    match raw.map(str::trim).map(str::parse::<f64>) {
        Some(Ok(v)) if v.is_finite() => format!("{v:.0}"),
        _ => {
            warn!(order_id, field, raw = ?raw, "Cannot parse amount");
            PLACEHOLDER.to_string()
        }
    }
}

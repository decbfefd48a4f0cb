//! Fiat and commodity codes used by the RoboSats coordinator.
//!
//! Mirrors the frontend's `currencies.json`. Codes not listed here are rendered
//! with a placeholder instead of failing.

use once_cell::sync::Lazy;
use std::borrow::Cow;
use std::collections::HashMap;

const CURRENCIES: &[(i64, &str)] = &[
    (1, "USD"),
    (2, "EUR"),
    (3, "JPY"),
    (4, "GBP"),
    (5, "AUD"),
    (6, "CAD"),
    (7, "CHF"),
    (8, "CNY"),
    (9, "HKD"),
    (10, "NZD"),
    (11, "SEK"),
    (12, "KRW"),
    (13, "SGD"),
    (14, "NOK"),
    (15, "MXN"),
    (16, "KRW"),
    (17, "RUB"),
    (18, "ZAR"),
    (19, "TRY"),
    (20, "BRL"),
    (21, "CLP"),
    (22, "CZK"),
    (23, "DKK"),
    (24, "HRK"),
    (25, "HUF"),
    (26, "INR"),
    (27, "ISK"),
    (28, "PLN"),
    (29, "RON"),
    (30, "ARS"),
    (31, "VES"),
    (32, "COP"),
    (33, "PEN"),
    (34, "UYU"),
    (35, "PYG"),
    (36, "BOB"),
    (37, "IDR"),
    (38, "ANG"),
    (39, "CRC"),
    (40, "CUP"),
    (41, "DOP"),
    (42, "GHS"),
    (43, "GTQ"),
    (44, "ILS"),
    (45, "JMD"),
    (46, "KES"),
    (47, "KZT"),
    (48, "MYR"),
    (49, "NAD"),
    (50, "NGN"),
    (51, "AZN"),
    (52, "PAB"),
    (53, "PHP"),
    (54, "PKR"),
    (55, "QAR"),
    (56, "SAR"),
    (57, "THB"),
    (58, "TTD"),
    (59, "VND"),
    (60, "XOF"),
    (61, "TWD"),
    (62, "TZS"),
    (63, "XAF"),
    (64, "UAH"),
    (300, "XAU"),
    (1000, "BTC"),
];

static TABLE: Lazy<HashMap<i64, &'static str>> = Lazy::new(|| CURRENCIES.iter().copied().collect());

/// Look up the ISO-style symbol for a coordinator currency code.
pub fn symbol(code: i64) -> Option<&'static str> {
    TABLE.get(&code).copied()
}

/// Symbol for `code`, or `Unknown currency (<code>)`.
pub fn label(code: i64) -> Cow<'static, str> {
    match symbol(code) {
        Some(s) => Cow::Borrowed(s),
        None => Cow::Owned(format!("Unknown currency ({code})")),
    }
}

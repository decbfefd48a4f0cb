//! Order book records as served by the RoboSats API.

pub mod currency;

use crate::utils::serialization::{de_decimal_text, de_lenient_f64};
use serde::Deserialize;
use strum::{Display, IntoStaticStr};

/// Identifier assigned to an order by the coordinator; the deduplication key.
pub type OrderId = i64;

/// Which side of the trade the maker is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum OrderType {
    Buy,
    Sell,
    /// Any code the coordinator may add later.
    Unknown,
}

impl From<i64> for OrderType {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::Buy,
            1 => Self::Sell,
            _ => Self::Unknown,
        }
    }
}

/// One public order. Read-only: nothing here is ever written back.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(rename = "type")]
    pub type_code: i64,
    #[serde(rename = "currency")]
    pub currency_code: i64,
    #[serde(default, deserialize_with = "de_decimal_text")]
    pub amount: Option<String>,
    #[serde(default)]
    pub has_range: bool,
    #[serde(default, deserialize_with = "de_decimal_text")]
    pub min_amount: Option<String>,
    #[serde(default, deserialize_with = "de_decimal_text")]
    pub max_amount: Option<String>,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub premium: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub price: Option<f64>,

    // Carried for logging only.
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub is_explicit: bool,
    #[serde(default, deserialize_with = "de_decimal_text")]
    pub satoshis: Option<String>,
    #[serde(default)]
    pub bondless_taker: bool,
    #[serde(default)]
    pub maker: Option<i64>,
    #[serde(default)]
    pub escrow_duration: Option<i64>,
    #[serde(default)]
    pub maker_nick: Option<String>,
    #[serde(default)]
    pub maker_status: Option<String>,
}

impl Order {
    pub fn order_type(&self) -> OrderType {
        OrderType::from(self.type_code)
    }
}

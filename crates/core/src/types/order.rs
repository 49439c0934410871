//! Order notification payloads.
//!
//! The storefront checkout posts an order payload after placing an order.
//! The shape is loose: identifiers appear under several keys depending on
//! which checkout path produced the payload, and scalars may arrive as
//! strings or numbers. These types absorb that looseness once, at the edge.

use core::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

use crate::types::money::Money;

/// An order identifier as supplied by the client.
///
/// JSON numbers and strings are both accepted and normalized to a string.
/// There is no guaranteed format; the value is display-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderId(String);

impl OrderId {
    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct OrderIdVisitor;

impl Visitor<'_> for OrderIdVisitor {
    type Value = OrderId;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a string or numeric order identifier")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<OrderId, E> {
        Ok(OrderId(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<OrderId, E> {
        Ok(OrderId(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<OrderId, E> {
        Ok(OrderId(v.to_string()))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<OrderId, E> {
        // Whole-number floats come from JSON encoders that widen integers.
        if v.fract() == 0.0 && v.abs() < 9e15 {
            Ok(OrderId((v as i64).to_string()))
        } else {
            Ok(OrderId(v.to_string()))
        }
    }
}

impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OrderIdVisitor)
    }
}

/// One product entry within an order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderLineItem {
    /// Product name.
    pub name: String,
    /// Weight amount, e.g. "500".
    #[serde(deserialize_with = "lenient_opt_string")]
    pub weight_value: Option<String>,
    /// Weight unit, e.g. "g".
    #[serde(deserialize_with = "lenient_opt_string")]
    pub weight_unit: Option<String>,
    /// Quantity ordered. Malformed values coerce to zero.
    #[serde(deserialize_with = "lenient_quantity")]
    pub quantity: u32,
    /// Unit price. Malformed values coerce to zero.
    pub price: Money,
}

impl OrderLineItem {
    /// Line total, derived as quantity x price.
    ///
    /// Any client-supplied per-line total is ignored.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }

    /// Weight column label: value and unit joined with a space, blank when
    /// both are absent.
    #[must_use]
    pub fn weight_label(&self) -> String {
        match (self.weight_value.as_deref(), self.weight_unit.as_deref()) {
            (None, None) => String::new(),
            (value, unit) => format!("{} {}", value.unwrap_or_default(), unit.unwrap_or_default())
                .trim()
                .to_string(),
        }
    }
}

/// Nested order reference, e.g. `{"order": {"id": 42}}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct OrderRef {
    id: Option<OrderId>,
}

/// Order confirmation request payload.
///
/// Every field is optional at the wire level; the handler decides which are
/// required. Monetary fields degrade to zero on malformed input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderNotificationRequest {
    /// Recipient address. Required by the order confirmation flow.
    pub email: Option<String>,
    /// Ordered line items. Required (but may be empty).
    pub items: Option<Vec<OrderLineItem>>,
    /// Order subtotal before shipping and discounts.
    pub subtotal: Money,
    /// Shipping cost.
    pub shipping_cost: Money,
    /// Discount amount; only displayed when strictly positive.
    pub discount_amount: Money,
    /// Client-computed grand total. Accepted for compatibility but not
    /// trusted; the displayed grand total is derived via [`Self::totals`].
    pub total: Money,
    order_id: Option<OrderId>,
    id: Option<OrderId>,
    order: Option<OrderRef>,
    saved_order: Option<OrderRef>,
}

impl OrderNotificationRequest {
    /// Resolve the display order id.
    ///
    /// Single source of truth for the fallback chain, first present wins:
    /// `orderId` -> `id` -> `order.id` -> `savedOrder.id`. Callers apply
    /// their own placeholder when this returns `None`.
    #[must_use]
    pub fn resolve_order_id(&self) -> Option<&OrderId> {
        self.order_id
            .as_ref()
            .or(self.id.as_ref())
            .or_else(|| self.order.as_ref().and_then(|o| o.id.as_ref()))
            .or_else(|| self.saved_order.as_ref().and_then(|o| o.id.as_ref()))
    }

    /// Line items, empty when the field was absent.
    #[must_use]
    pub fn line_items(&self) -> &[OrderLineItem] {
        self.items.as_deref().unwrap_or_default()
    }

    /// Derived totals block.
    #[must_use]
    pub fn totals(&self) -> OrderTotals {
        let discount = self.discount_amount.is_positive().then_some(self.discount_amount);
        let grand_total = self.subtotal + self.shipping_cost - discount.unwrap_or(Money::ZERO);
        OrderTotals {
            subtotal: self.subtotal,
            shipping: self.shipping_cost,
            discount,
            grand_total,
        }
    }
}

/// Totals as displayed on the invoice and in the email.
///
/// The grand total is subtotal + shipping - discount; the discount is only
/// present (and only subtracted) when strictly positive.
#[derive(Debug, Clone, Copy)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub discount: Option<Money>,
    pub grand_total: Money,
}

/// Accept a string or number, normalized to a string; anything else is None.
fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    struct OptStringVisitor;

    impl Visitor<'_> for OptStringVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a string, a number, or null")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(OptStringVisitor)
}

/// Accept an integer quantity as a number or numeric string; malformed or
/// negative values coerce to zero.
fn lenient_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    struct QuantityVisitor;

    impl Visitor<'_> for QuantityVisitor {
        type Value = u32;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("an integer quantity")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u32, E> {
            Ok(u32::try_from(v).unwrap_or(u32::MAX))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u32, E> {
            Ok(u32::try_from(v).unwrap_or(0))
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u32, E> {
            if v.is_finite() && v >= 0.0 {
                Ok(v.min(f64::from(u32::MAX)) as u32)
            } else {
                Ok(0)
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u32, E> {
            Ok(v.trim().parse::<u32>().unwrap_or(0))
        }

        fn visit_unit<E: de::Error>(self) -> Result<u32, E> {
            Ok(0)
        }
    }

    deserializer.deserialize_any(QuantityVisitor)
}

//! Invoice page layout.
//!
//! Produces a flat list of draw operations from an order payload. The layout
//! is pure and deterministic so the table math and totals block can be tested
//! without parsing PDF bytes; serialization lives in [`super::pdf`].
//!
//! Coordinates are in points, measured from the top-left of a Letter page,
//! matching the fixed positions the downstream invoice QA tooling expects.

use chrono::NaiveDate;
use parampare_core::OrderNotificationRequest;

/// Letter page width in points.
pub const PAGE_WIDTH: f32 = 612.0;
/// Letter page height in points.
pub const PAGE_HEIGHT: f32 = 792.0;

/// Placeholder used for the invoice number when no order id was supplied.
pub const INVOICE_NUMBER_FALLBACK: &str = "0000";

const COMPANY_NAME: &str = "Sanatana Parampare";
const COMPANY_ADDRESS_LINE_1: &str = "123, Traditional Street, Heritage City";
const COMPANY_ADDRESS_LINE_2: &str = "Karnataka, India - 560001";

// Line-item table column x-offsets.
const COL_ITEM: f32 = 50.0;
const COL_WEIGHT: f32 = 250.0;
const COL_QTY: f32 = 350.0;
const COL_PRICE: f32 = 400.0;
const COL_TOTAL: f32 = 480.0;

const TABLE_TOP: f32 = 270.0;
const ROW_HEIGHT: f32 = 20.0;

/// An RGB color with components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0 };
    /// Company header gray (#444444).
    pub const HEADER: Self = Self { r: 0.267, g: 0.267, b: 0.267 };
    /// Horizontal rule gray (#aaaaaa).
    pub const RULE: Self = Self { r: 0.667, g: 0.667, b: 0.667 };
}

/// A single text run at a fixed position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOp {
    pub x: f32,
    /// Distance from the top edge of the page.
    pub y: f32,
    pub size: f32,
    pub bold: bool,
    pub color: Color,
    pub text: String,
}

/// A horizontal rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleOp {
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
}

/// The logo image slot at the top-left of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoOp {
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

/// One drawing operation of the invoice page.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text(TextOp),
    Rule(RuleOp),
    Logo(LogoOp),
}

fn text(x: f32, y: f32, size: f32, bold: bool, color: Color, text: impl Into<String>) -> DrawOp {
    DrawOp::Text(TextOp {
        x,
        y,
        size,
        bold,
        color,
        text: text.into(),
    })
}

fn rule(y: f32) -> DrawOp {
    DrawOp::Rule(RuleOp {
        x1: 50.0,
        x2: 550.0,
        y,
    })
}

/// Lay out an invoice for the given order.
///
/// The invoice number falls back to `INV-0000` when the order carries no
/// resolvable id. `date` is the invoice date shown in the metadata block;
/// it is the only render-time-dependent value on the page.
#[must_use]
pub fn layout_invoice(
    order: &OrderNotificationRequest,
    has_logo: bool,
    date: NaiveDate,
) -> Vec<DrawOp> {
    let mut ops = Vec::new();

    if has_logo {
        ops.push(DrawOp::Logo(LogoOp {
            x: 50.0,
            y: 45.0,
            width: 50.0,
        }));
    }

    ops.push(text(110.0, 57.0, 20.0, false, Color::HEADER, COMPANY_NAME));
    ops.push(text(340.0, 65.0, 10.0, false, Color::HEADER, COMPANY_ADDRESS_LINE_1));
    ops.push(text(395.0, 80.0, 10.0, false, Color::HEADER, COMPANY_ADDRESS_LINE_2));

    ops.push(text(50.0, 160.0, 15.0, false, Color::BLACK, "INVOICE"));
    ops.push(rule(185.0));

    let invoice_number = order
        .resolve_order_id()
        .map_or_else(|| INVOICE_NUMBER_FALLBACK.to_string(), ToString::to_string);
    ops.push(text(
        50.0,
        200.0,
        10.0,
        false,
        Color::BLACK,
        format!("Invoice Number: INV-{invoice_number}"),
    ));
    ops.push(text(
        50.0,
        215.0,
        10.0,
        false,
        Color::BLACK,
        format!("Invoice Date: {}", date.format("%d/%m/%Y")),
    ));
    ops.push(text(
        50.0,
        230.0,
        10.0,
        false,
        Color::BLACK,
        format!("Customer Email: {}", order.email.as_deref().unwrap_or_default()),
    ));

    // Table header
    for (x, label) in [
        (COL_ITEM, "Item"),
        (COL_WEIGHT, "Weight"),
        (COL_QTY, "Qty"),
        (COL_PRICE, "Price"),
        (COL_TOTAL, "Total"),
    ] {
        ops.push(text(x, TABLE_TOP, 10.0, true, Color::BLACK, label));
    }
    ops.push(rule(TABLE_TOP + 15.0));

    // Table rows
    let mut position = TABLE_TOP + 30.0;
    for item in order.line_items() {
        ops.push(text(COL_ITEM, position, 10.0, false, Color::BLACK, item.name.clone()));
        ops.push(text(COL_WEIGHT, position, 10.0, false, Color::BLACK, item.weight_label()));
        ops.push(text(COL_QTY, position, 10.0, false, Color::BLACK, item.quantity.to_string()));
        ops.push(text(COL_PRICE, position, 10.0, false, Color::BLACK, item.price.to_string()));
        ops.push(text(
            COL_TOTAL,
            position,
            10.0,
            false,
            Color::BLACK,
            item.line_total().to_string(),
        ));
        position += ROW_HEIGHT;
    }

    ops.push(rule(position + 5.0));

    // Totals block
    let totals = order.totals();
    position += 20.0;
    ops.push(text(COL_PRICE, position, 10.0, false, Color::BLACK, "Subtotal:"));
    ops.push(text(COL_TOTAL, position, 10.0, false, Color::BLACK, totals.subtotal.to_string()));

    position += 20.0;
    ops.push(text(COL_PRICE, position, 10.0, false, Color::BLACK, "Shipping:"));
    ops.push(text(COL_TOTAL, position, 10.0, false, Color::BLACK, totals.shipping.to_string()));

    if let Some(discount) = totals.discount {
        position += 20.0;
        ops.push(text(COL_PRICE, position, 10.0, false, Color::BLACK, "Discount:"));
        ops.push(text(COL_TOTAL, position, 10.0, false, Color::BLACK, format!("-{discount}")));
    }

    position += 25.0;
    ops.push(text(COL_PRICE, position, 12.0, true, Color::BLACK, "Grand Total:"));
    ops.push(text(
        COL_TOTAL,
        position,
        12.0,
        true,
        Color::BLACK,
        totals.grand_total.to_string(),
    ));

    ops
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order(value: serde_json::Value) -> OrderNotificationRequest {
        serde_json::from_value(value).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn texts(ops: &[DrawOp]) -> Vec<&TextOp> {
        ops.iter()
            .filter_map(|op| match op {
                DrawOp::Text(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn find<'a>(ops: &'a [DrawOp], needle: &str) -> Option<&'a TextOp> {
        texts(ops).into_iter().find(|t| t.text == needle)
    }

    #[test]
    fn test_grand_total_follows_formula() {
        let ops = layout_invoice(
            &order(json!({
                "email": "a@b.com",
                "items": [{"name": "Oil", "quantity": 2, "price": 100}],
                "subtotal": 200, "shippingCost": 20, "total": 220
            })),
            false,
            date(),
        );

        let value = find(&ops, "Rs. 220.00").unwrap();
        assert!(value.bold);
        assert!((value.size - 12.0).abs() < f32::EPSILON);
        assert!(find(&ops, "Discount:").is_none());
    }

    #[test]
    fn test_discount_row_shown_when_positive() {
        let ops = layout_invoice(
            &order(json!({
                "email": "a@b.com",
                "items": [{"name": "Oil", "quantity": 2, "price": 100}],
                "subtotal": 200, "shippingCost": 20, "discountAmount": 20, "total": 200
            })),
            false,
            date(),
        );

        assert!(find(&ops, "Discount:").is_some());
        assert!(find(&ops, "-Rs. 20.00").is_some());
        assert!(find(&ops, "Rs. 200.00").is_some());
    }

    #[test]
    fn test_row_totals_derived_from_quantity_and_price() {
        let ops = layout_invoice(
            &order(json!({
                "email": "a@b.com",
                "items": [{"name": "Ghee", "quantity": 3, "price": 33.33, "total": 1}]
            })),
            false,
            date(),
        );

        // 3 x 33.33, not the bogus provided total.
        assert!(find(&ops, "Rs. 99.99").is_some());
    }

    #[test]
    fn test_empty_items_renders_header_and_totals_only() {
        let ops = layout_invoice(
            &order(json!({"email": "a@b.com", "items": [], "shippingCost": 20})),
            false,
            date(),
        );

        assert!(find(&ops, "Item").is_some());
        assert!(find(&ops, "Subtotal:").is_some());
        assert!(find(&ops, "Rs. 20.00").is_some());
        // Grand total is zero subtotal plus shipping.
        let grand = texts(&ops).into_iter().filter(|t| t.text == "Rs. 20.00").count();
        assert_eq!(grand, 2); // shipping row and grand total
    }

    #[test]
    fn test_invoice_number_fallback() {
        let ops = layout_invoice(&order(json!({"email": "a@b.com", "items": []})), false, date());
        assert!(find(&ops, "Invoice Number: INV-0000").is_some());

        let ops = layout_invoice(
            &order(json!({"email": "a@b.com", "items": [], "savedOrder": {"id": 77}})),
            false,
            date(),
        );
        assert!(find(&ops, "Invoice Number: INV-77").is_some());
    }

    #[test]
    fn test_invoice_date_uses_given_date() {
        let ops = layout_invoice(&order(json!({"items": []})), false, date());
        assert!(find(&ops, "Invoice Date: 14/03/2025").is_some());
    }

    #[test]
    fn test_weight_column_blank_when_absent() {
        let ops = layout_invoice(
            &order(json!({"items": [{"name": "Oil", "quantity": 1, "price": 10}]})),
            false,
            date(),
        );
        let weight = texts(&ops)
            .into_iter()
            .find(|t| (t.x - 250.0).abs() < f32::EPSILON && (t.y - 300.0).abs() < f32::EPSILON)
            .unwrap();
        assert_eq!(weight.text, "");
    }

    #[test]
    fn test_logo_slot_only_when_loaded() {
        let with = layout_invoice(&order(json!({"items": []})), true, date());
        assert!(matches!(with.first(), Some(DrawOp::Logo(_))));

        let without = layout_invoice(&order(json!({"items": []})), false, date());
        assert!(!without.iter().any(|op| matches!(op, DrawOp::Logo(_))));
    }
}

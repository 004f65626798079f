//! # Receipt Module
//!
//! Line pricing and plain-text receipt rendering for a sale.
//!
//! ## Rendered Layout
//! ```text
//! Receipt for Grace Hopper
//! Receipt ID: 17
//! Devices Sold:
//!  - iPhone 15: 2 units, Total: $1598.00
//!  - AirPods Pro: 1 units, Total: $249.00
//! Total Amount: $1847.00
//! Sold by: Gadget Hub
//! Attendant: Sam
//! ```
//!
//! Lines appear in cart order. The layout is fixed; receipts are stored as
//! rendered and re-sent verbatim on recall.

use std::fmt::Write as _;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CartLine, Device};

/// A cart line priced against the device as it was at time of sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub device_id: i64,
    pub model_name: String,
    pub imei: Option<String>,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

impl PricedLine {
    /// Prices `line` using the device's current unit price.
    ///
    /// # Errors
    /// `CoreError::AmountOverflow` if the line total does not fit in cents.
    pub fn new(device: &Device, line: &CartLine) -> CoreResult<Self> {
        let unit_price = device.price();
        let line_total = unit_price
            .checked_multiply_quantity(line.quantity)
            .ok_or_else(|| CoreError::AmountOverflow {
                model_name: device.model_name.clone(),
            })?;

        Ok(PricedLine {
            device_id: device.id,
            model_name: device.model_name.clone(),
            imei: line.imei.clone(),
            quantity: line.quantity,
            unit_price,
            line_total,
        })
    }
}

/// Everything printed on a receipt.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub receipt_id: i64,
    pub customer_name: String,
    pub store_name: String,
    pub sale_attendant: String,
    pub lines: Vec<PricedLine>,
    total: Money,
}

impl Receipt {
    /// Builds a receipt, summing the line totals.
    ///
    /// # Errors
    /// `CoreError::AmountOverflow` if the sum does not fit in cents.
    pub fn new(
        receipt_id: i64,
        customer_name: impl Into<String>,
        store_name: impl Into<String>,
        sale_attendant: impl Into<String>,
        lines: Vec<PricedLine>,
    ) -> CoreResult<Self> {
        let mut total = Money::zero();
        for line in &lines {
            total = total
                .checked_add(line.line_total)
                .ok_or_else(|| CoreError::AmountOverflow {
                    model_name: line.model_name.clone(),
                })?;
        }

        Ok(Receipt {
            receipt_id,
            customer_name: customer_name.into(),
            store_name: store_name.into(),
            sale_attendant: sale_attendant.into(),
            lines,
            total,
        })
    }

    /// Sum of all line totals.
    pub fn total(&self) -> Money {
        self.total
    }

    /// Renders the receipt text.
    pub fn render(&self) -> String {
        let mut out = String::new();

        // Writing into a String cannot fail.
        let _ = writeln!(out, "Receipt for {}", self.customer_name);
        let _ = writeln!(out, "Receipt ID: {}", self.receipt_id);
        let _ = writeln!(out, "Devices Sold:");
        for line in &self.lines {
            let _ = writeln!(
                out,
                " - {}: {} units, Total: {}",
                line.model_name, line.quantity, line.line_total
            );
        }
        let _ = writeln!(out, "Total Amount: {}", self.total());
        let _ = writeln!(out, "Sold by: {}", self.store_name);
        let _ = write!(out, "Attendant: {}", self.sale_attendant);

        out
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! Sales: the sale flow, receipt email and receipt recall.
//!
//! ## Sale Flow
//! ```text
//! validate_new_sale ──► SaleRepository::record_sale (one transaction)
//!                               │ committed
//!                               ▼
//!                       email receipt to customer
//!                       ok  ──► receipt_email_sent = true
//!                       err ──► warn!, receipt_email_sent = false
//!                               (the sale stands either way)
//! ```

use std::sync::Arc;

use serde::Serialize;
use shopfront_core::validation::validate_new_sale;
use shopfront_core::{CoreError, NewSale, ReceiptFilter, Sale, SaleItem};
use tracing::{info, warn};

use crate::auth::AuthenticatedStore;
use crate::email::receipt_email;
use crate::error::ApiError;
use crate::AppState;

/// Outcome of a recorded sale.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleReceipt {
    pub receipt_id: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub total_cents: i64,
    pub receipt: String,
    pub items: Vec<SaleItem>,
    pub receipt_email_sent: bool,
}

/// Sale service.
pub struct SaleService {
    state: Arc<AppState>,
}

impl SaleService {
    pub fn new(state: Arc<AppState>) -> Self {
        SaleService { state }
    }

    /// Records a sale and emails the receipt.
    pub async fn record(&self, store: &AuthenticatedStore, sale: NewSale) -> Result<SaleReceipt, ApiError> {
        validate_new_sale(&sale)?;

        let recorded = self
            .state
            .db
            .sales()
            .record_sale(store.store_id, &store.store_name, &sale)
            .await?;

        let sale = recorded.sale;
        let receipt_email_sent = match self
            .state
            .mailer
            .send(receipt_email(&sale.customer_email, &sale.receipt))
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    receipt_id = sale.receipt_id,
                    error = %e,
                    "Receipt email failed, sale kept"
                );
                false
            }
        };

        info!(
            store_id = store.store_id,
            receipt_id = sale.receipt_id,
            receipt_email_sent,
            "Sale logged"
        );

        Ok(SaleReceipt {
            receipt_id: sale.receipt_id,
            customer_name: sale.customer_name,
            customer_email: sale.customer_email,
            total_cents: sale.total_cents,
            receipt: sale.receipt,
            items: recorded.items,
            receipt_email_sent,
        })
    }

    pub async fn list(&self, store: &AuthenticatedStore) -> Result<Vec<Sale>, ApiError> {
        Ok(self.state.db.sales().list(store.store_id).await?)
    }

    /// A store's receipt with its line items.
    pub async fn receipt(
        &self,
        store: &AuthenticatedStore,
        receipt_id: i64,
    ) -> Result<(Sale, Vec<SaleItem>), ApiError> {
        let sales = self.state.db.sales();

        let sale = sales
            .get_by_receipt_id(store.store_id, receipt_id)
            .await?
            .ok_or(CoreError::ReceiptNotFound(receipt_id))?;
        let items = sales.get_items(sale.id).await?;

        Ok((sale, items))
    }

    /// Sales matching every supplied filter. No match is an error.
    pub async fn recall(
        &self,
        store: &AuthenticatedStore,
        filter: ReceiptFilter,
    ) -> Result<Vec<Sale>, ApiError> {
        let filter = normalize_filter(filter);

        let sales = self.state.db.sales().recall(store.store_id, &filter).await?;
        if sales.is_empty() {
            return Err(ApiError::not_found("No matching receipts found"));
        }

        Ok(sales)
    }

    /// Highest receipt id issued so far, across all stores.
    pub async fn largest_receipt_id(&self) -> Result<i64, ApiError> {
        self.state
            .db
            .sales()
            .largest_receipt_id()
            .await?
            .ok_or_else(|| ApiError::not_found("No sales records found"))
    }
}

/// Blank query values count as absent.
fn normalize_filter(filter: ReceiptFilter) -> ReceiptFilter {
    fn present(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    ReceiptFilter {
        imei: present(filter.imei),
        model_name: present(filter.model_name),
        customer_email: present(filter.customer_email),
    }
}

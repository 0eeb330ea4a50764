//! Dispense transaction: stock decrement plus invoice creation, atomically.
//!
//! The calculator's stock preview is never trusted at dispense time; stock is
//! re-verified inside an immediate transaction so two concurrent dispenses
//! cannot both pass a stale check and over-draw inventory.

use thiserror::Error;
use tracing::warn;

use crate::db::{self, Database, DbError};
use crate::models::{InventoryItem, Invoice, Prescription, PrescriptionStatus};

/// Dispense errors.
#[derive(Error, Debug)]
pub enum DispenseError {
    #[error("prescription not found: {0}")]
    NotFound(String),

    #[error("prescription already dispensed: {0}")]
    AlreadyDispensed(String),

    #[error("prescription cancelled: {0}")]
    Cancelled(String),

    #[error("insufficient stock for {} item(s)", .0.len())]
    StockConflict(Vec<StockShortage>),

    #[error("database error: {0}")]
    Db(#[from] DbError),
}

pub type DispenseResult<T> = Result<T, DispenseError>;

/// One under-stocked line discovered at dispense time.
#[derive(Debug, Clone, PartialEq)]
pub struct StockShortage {
    pub inventory_item_id: String,
    pub drug_name: String,
    pub requested_packages: i64,
    pub available_packages: i64,
}

/// Post-dispense stock level for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct StockLevel {
    pub inventory_item_id: String,
    pub stock_quantity: i64,
}

/// Result of a successful dispense.
#[derive(Debug, Clone, PartialEq)]
pub struct DispenseOutcome {
    pub invoice_id: String,
    pub updated_stock: Vec<StockLevel>,
}

/// Outbound notification hook. Implementations talk to external delivery
/// systems; failures here are logged and never fail the dispense.
pub trait Notifier {
    /// A prescription was dispensed and invoiced.
    fn notify_dispensed(&self, prescription: &Prescription, invoice: &Invoice)
        -> anyhow::Result<()>;

    /// An item fell to or below its reorder level.
    fn notify_low_stock(&self, item: &InventoryItem) -> anyhow::Result<()>;
}

/// Notifier that does nothing; for tests and callers without delivery wiring.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify_dispensed(&self, _: &Prescription, _: &Invoice) -> anyhow::Result<()> {
        Ok(())
    }

    fn notify_low_stock(&self, _: &InventoryItem) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Executes the dispense protocol against the inventory/invoice store.
pub struct Dispenser<'a> {
    db: &'a mut Database,
    notifier: &'a dyn Notifier,
}

impl<'a> Dispenser<'a> {
    /// Create a dispenser with a notification hook.
    pub fn new(db: &'a mut Database, notifier: &'a dyn Notifier) -> Self {
        Self { db, notifier }
    }

    /// Dispense a pending prescription: re-verify stock, decrement it,
    /// raise the invoice, and mark the prescription dispensed, all in one
    /// transaction. Any failure rolls the whole thing back.
    pub fn dispense(
        &mut self,
        prescription_id: &str,
        dispensed_by: &str,
    ) -> DispenseResult<DispenseOutcome> {
        let tx = self.db.immediate_transaction()?;

        let prescription = db::get_prescription_conn(&tx, prescription_id)?
            .ok_or_else(|| DispenseError::NotFound(prescription_id.to_string()))?;

        match prescription.status {
            PrescriptionStatus::Dispensed => {
                return Err(DispenseError::AlreadyDispensed(prescription_id.to_string()))
            }
            PrescriptionStatus::Cancelled => {
                return Err(DispenseError::Cancelled(prescription_id.to_string()))
            }
            PrescriptionStatus::Pending => {}
        }

        // Re-verify every line against live stock before touching anything.
        let mut shortages = Vec::new();
        for item in &prescription.items {
            let inventory = db::get_inventory_item_conn(&tx, &item.inventory_item_id)?
                .ok_or_else(|| {
                    DbError::NotFound(format!("inventory item {}", item.inventory_item_id))
                })?;
            if inventory.stock_quantity < item.packages_needed {
                shortages.push(StockShortage {
                    inventory_item_id: item.inventory_item_id.clone(),
                    drug_name: item.drug_name.clone(),
                    requested_packages: item.packages_needed,
                    available_packages: inventory.stock_quantity,
                });
            }
        }
        if !shortages.is_empty() {
            // Transaction drops here, rolling back the (empty) write set.
            return Err(DispenseError::StockConflict(shortages));
        }

        let mut updated_stock = Vec::new();
        for item in &prescription.items {
            let stock_quantity = db::decrement_stock(&tx, &item.inventory_item_id, item.packages_needed)?;
            updated_stock.push(StockLevel {
                inventory_item_id: item.inventory_item_id.clone(),
                stock_quantity,
            });
        }

        let invoice = Invoice::from_prescription(&prescription);
        db::insert_invoice_conn(&tx, &invoice)?;
        db::mark_dispensed(&tx, prescription_id, dispensed_by)?;

        tx.commit().map_err(DbError::from)?;

        self.send_notifications(&prescription, &invoice, &updated_stock);

        Ok(DispenseOutcome {
            invoice_id: invoice.id,
            updated_stock,
        })
    }

    /// Fire-and-forget side calls after commit. Delivery failures are
    /// logged; they never surface to the dispensing operator.
    fn send_notifications(
        &self,
        prescription: &Prescription,
        invoice: &Invoice,
        updated_stock: &[StockLevel],
    ) {
        if let Err(e) = self.notifier.notify_dispensed(prescription, invoice) {
            warn!(
                prescription_id = %prescription.id,
                error = %e,
                "dispense notification failed"
            );
        }

        for level in updated_stock {
            match self.db.get_inventory_item(&level.inventory_item_id) {
                Ok(Some(item)) if item.is_low_stock() => {
                    if let Err(e) = self.notifier.notify_low_stock(&item) {
                        warn!(
                            inventory_item_id = %item.id,
                            error = %e,
                            "low-stock notification failed"
                        );
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        inventory_item_id = %level.inventory_item_id,
                        error = %e,
                        "could not re-read item for low-stock check"
                    );
                }
            }
        }
    }
}

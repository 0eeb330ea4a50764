//! Inventory database operations.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{InventoryItem, ItemCategory};

impl Database {
    /// Insert or update an inventory item.
    pub fn upsert_inventory_item(&self, item: &InventoryItem) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO inventory_items (
                id, name, category, drug_category, dosage_form, strength,
                stock_quantity, units_per_package, unit_price, corporate_price,
                reorder_level, expiry_date, active, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, datetime('now'))
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                category = excluded.category,
                drug_category = excluded.drug_category,
                dosage_form = excluded.dosage_form,
                strength = excluded.strength,
                stock_quantity = excluded.stock_quantity,
                units_per_package = excluded.units_per_package,
                unit_price = excluded.unit_price,
                corporate_price = excluded.corporate_price,
                reorder_level = excluded.reorder_level,
                expiry_date = excluded.expiry_date,
                active = excluded.active,
                updated_at = datetime('now')
            "#,
            params![
                item.id,
                item.name,
                item.category.as_str(),
                item.drug_category,
                item.dosage_form,
                item.strength,
                item.stock_quantity,
                item.units_per_package,
                item.unit_price,
                item.corporate_price,
                item.reorder_level,
                item.expiry_date,
                item.active,
            ],
        )?;
        Ok(())
    }

    /// Get an inventory item by ID.
    pub fn get_inventory_item(&self, id: &str) -> DbResult<Option<InventoryItem>> {
        get_inventory_item_conn(&self.conn, id)
    }

    /// List all active items, ordered by name.
    pub fn list_active_items(&self) -> DbResult<Vec<InventoryItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM inventory_items WHERE active = 1 ORDER BY name",
            ITEM_COLUMNS
        ))?;
        let rows = stmt.query_map([], map_item_row)?;
        collect_items(rows)
    }

    /// List active items at or below their reorder level.
    pub fn list_low_stock_items(&self) -> DbResult<Vec<InventoryItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM inventory_items WHERE active = 1 AND stock_quantity <= reorder_level ORDER BY name",
            ITEM_COLUMNS
        ))?;
        let rows = stmt.query_map([], map_item_row)?;
        collect_items(rows)
    }

    /// Add packages to stock (restock). Returns the new quantity.
    pub fn restock(&self, id: &str, packages: i64) -> DbResult<i64> {
        if packages <= 0 {
            return Err(DbError::Constraint(format!(
                "restock quantity must be positive, got {}",
                packages
            )));
        }
        let rows = self.conn.execute(
            "UPDATE inventory_items SET stock_quantity = stock_quantity + ?1, updated_at = datetime('now') WHERE id = ?2",
            params![packages, id],
        )?;
        if rows == 0 {
            return Err(DbError::NotFound(format!("inventory item {}", id)));
        }
        let qty: i64 = self.conn.query_row(
            "SELECT stock_quantity FROM inventory_items WHERE id = ?",
            [id],
            |row| row.get(0),
        )?;
        Ok(qty)
    }
}

const ITEM_COLUMNS: &str = "id, name, category, drug_category, dosage_form, strength, \
     stock_quantity, units_per_package, unit_price, corporate_price, \
     reorder_level, expiry_date, active, created_at, updated_at";

/// Fetch an item through any connection, including an open transaction.
pub(crate) fn get_inventory_item_conn(
    conn: &Connection,
    id: &str,
) -> DbResult<Option<InventoryItem>> {
    conn.query_row(
        &format!("SELECT {} FROM inventory_items WHERE id = ?", ITEM_COLUMNS),
        [id],
        map_item_row,
    )
    .optional()
    .map_err(Into::into)
}

/// Decrement stock by `packages`, returning the new quantity.
///
/// The WHERE guard makes the decrement itself refuse to over-draw even if
/// the caller's earlier check was stale.
pub(crate) fn decrement_stock(conn: &Connection, id: &str, packages: i64) -> DbResult<i64> {
    let rows = conn.execute(
        r#"
        UPDATE inventory_items
        SET stock_quantity = stock_quantity - ?1, updated_at = datetime('now')
        WHERE id = ?2 AND stock_quantity >= ?1
        "#,
        params![packages, id],
    )?;
    if rows == 0 {
        return Err(DbError::Constraint(format!(
            "insufficient stock to remove {} package(s) of item {}",
            packages, id
        )));
    }
    let qty: i64 = conn.query_row(
        "SELECT stock_quantity FROM inventory_items WHERE id = ?",
        [id],
        |row| row.get(0),
    )?;
    Ok(qty)
}

fn map_item_row(row: &Row<'_>) -> rusqlite::Result<InventoryItem> {
    let category_raw: String = row.get(2)?;
    let category = ItemCategory::parse(&category_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown item category: {}", category_raw).into(),
        )
    })?;
    Ok(InventoryItem {
        id: row.get(0)?,
        name: row.get(1)?,
        category,
        drug_category: row.get(3)?,
        dosage_form: row.get(4)?,
        strength: row.get(5)?,
        stock_quantity: row.get(6)?,
        units_per_package: row.get(7)?,
        unit_price: row.get(8)?,
        corporate_price: row.get(9)?,
        reorder_level: row.get(10)?,
        expiry_date: row.get(11)?,
        active: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

fn collect_items<I>(rows: I) -> DbResult<Vec<InventoryItem>>
where
    I: Iterator<Item = rusqlite::Result<InventoryItem>>,
{
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn make_item(name: &str, stock: i64) -> InventoryItem {
        let mut item = InventoryItem::new(name.into(), ItemCategory::Medication);
        item.stock_quantity = stock;
        item.units_per_package = 10;
        item.unit_price = 50.0;
        item
    }

    #[test]
    fn test_upsert_and_get() {
        let db = setup_db();

        let mut item = make_item("Paracetamol 500mg", 20);
        item.drug_category = Some("Analgesic".into());
        db.upsert_inventory_item(&item).unwrap();

        let retrieved = db.get_inventory_item(&item.id).unwrap().unwrap();
        assert_eq!(retrieved.name, "Paracetamol 500mg");
        assert_eq!(retrieved.stock_quantity, 20);
        assert_eq!(retrieved.drug_category, Some("Analgesic".into()));
        assert_eq!(retrieved.category, ItemCategory::Medication);

        // Upsert updates in place
        item.unit_price = 60.0;
        db.upsert_inventory_item(&item).unwrap();
        let retrieved = db.get_inventory_item(&item.id).unwrap().unwrap();
        assert_eq!(retrieved.unit_price, 60.0);
    }

    #[test]
    fn test_low_stock_listing() {
        let db = setup_db();

        let mut ok = make_item("Well Stocked", 50);
        ok.reorder_level = 5;
        db.upsert_inventory_item(&ok).unwrap();

        let mut low = make_item("Running Out", 3);
        low.reorder_level = 5;
        db.upsert_inventory_item(&low).unwrap();

        let low_items = db.list_low_stock_items().unwrap();
        assert_eq!(low_items.len(), 1);
        assert_eq!(low_items[0].name, "Running Out");
    }

    #[test]
    fn test_restock() {
        let db = setup_db();

        let item = make_item("Paracetamol 500mg", 2);
        db.upsert_inventory_item(&item).unwrap();

        let qty = db.restock(&item.id, 10).unwrap();
        assert_eq!(qty, 12);

        assert!(db.restock(&item.id, 0).is_err());
        assert!(db.restock("missing", 5).is_err());
    }

    #[test]
    fn test_decrement_refuses_overdraw() {
        let db = setup_db();

        let item = make_item("Paracetamol 500mg", 3);
        db.upsert_inventory_item(&item).unwrap();

        let qty = decrement_stock(db.conn(), &item.id, 2).unwrap();
        assert_eq!(qty, 1);

        let result = decrement_stock(db.conn(), &item.id, 2);
        assert!(matches!(result, Err(DbError::Constraint(_))));

        // Untouched by the failed decrement
        let retrieved = db.get_inventory_item(&item.id).unwrap().unwrap();
        assert_eq!(retrieved.stock_quantity, 1);
    }
}

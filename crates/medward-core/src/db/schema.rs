//! SQLite schema definition.

/// Complete database schema for medward.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Inventory
-- ============================================================================

CREATE TABLE IF NOT EXISTS inventory_items (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    category TEXT NOT NULL CHECK (category IN ('medication', 'supply', 'lab', 'nursing', 'equipment')),
    drug_category TEXT,
    dosage_form TEXT,
    strength TEXT,
    stock_quantity INTEGER NOT NULL DEFAULT 0 CHECK (stock_quantity >= 0),
    units_per_package INTEGER NOT NULL DEFAULT 1,
    unit_price REAL NOT NULL DEFAULT 0,
    corporate_price REAL,
    reorder_level INTEGER NOT NULL DEFAULT 0,
    expiry_date TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_inventory_name ON inventory_items(name);
CREATE INDEX IF NOT EXISTS idx_inventory_category ON inventory_items(category);

-- ============================================================================
-- HMO Policies & Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS hmo_policies (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    coverage_rate REAL NOT NULL DEFAULT 0 CHECK (coverage_rate >= 0 AND coverage_rate <= 1),
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    patient_type TEXT NOT NULL DEFAULT 'self_pay'
        CHECK (patient_type IN ('self_pay', 'hmo', 'corporate')),
    hmo_policy_id TEXT REFERENCES hmo_policies(id),
    allergies TEXT NOT NULL DEFAULT '[]',        -- JSON array of strings
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(last_name, first_name);

-- ============================================================================
-- Prescriptions & Invoices
-- ============================================================================

CREATE TABLE IF NOT EXISTS prescriptions (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id),
    prescribed_by TEXT NOT NULL,
    items TEXT NOT NULL DEFAULT '[]',            -- JSON array of PrescriptionItem
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'dispensed', 'cancelled')),
    dispensed_at TEXT,
    dispensed_by TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_prescriptions_patient ON prescriptions(patient_id);
CREATE INDEX IF NOT EXISTS idx_prescriptions_status ON prescriptions(status);

-- One invoice per prescription; the UNIQUE constraint backs the
-- dispense idempotency guard at the storage level.
CREATE TABLE IF NOT EXISTS invoices (
    id TEXT PRIMARY KEY,
    prescription_id TEXT NOT NULL UNIQUE REFERENCES prescriptions(id),
    patient_id TEXT NOT NULL REFERENCES patients(id),
    line_items TEXT NOT NULL DEFAULT '[]',       -- JSON array of InvoiceLineItem
    total REAL NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_invoices_patient ON invoices(patient_id);

-- ============================================================================
-- Visit Flow (read-only projection for analytics)
-- ============================================================================

CREATE TABLE IF NOT EXISTS visit_flow (
    visit_id TEXT PRIMARY KEY,
    checked_in_at TEXT NOT NULL,
    vitals_completed_at TEXT,
    doctor_started_at TEXT,
    doctor_completed_at TEXT,
    lab_started_at TEXT,
    lab_completed_at TEXT,
    pharmacy_started_at TEXT,
    pharmacy_completed_at TEXT,
    checked_out_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_visit_flow_checked_in ON visit_flow(checked_in_at);
"#;

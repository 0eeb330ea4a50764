//! Medward Core Library
//!
//! Pharmacy dispensing and patient-flow analytics core for a hospital EMR.
//!
//! # Architecture
//!
//! ```text
//! Drug + Dosage + Patient
//!          │
//!          ▼
//!   Safety Advisor ──── advisory warnings (never blocking)
//!          │
//!          ▼
//!     Calculator ────── tablets → packages → cost split (pure, previewable)
//!          │
//!          ▼  on confirmation
//! ┌────────────────────────────────┐
//! │       Dispense Transaction     │
//! │  re-verify stock (immediate tx)│
//! │  decrement stock               │
//! │  raise invoice                 │
//! │  mark prescription dispensed   │
//! └───────────────┬────────────────┘
//!                 │ post-commit
//!                 ▼
//!        Notifications (fire-and-forget)
//!
//! Flow Analytics runs independently over historical visit timestamps.
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite store for inventory, patients, prescriptions, invoices
//! - [`models`]: Domain types (InventoryItem, Patient, Prescription, ...)
//! - [`pricing`]: Dosage → tablet-count → package/cost calculator
//! - [`safety`]: Allergy / duplicate-therapy / interaction advisor
//! - [`dispense`]: Atomic stock-decrement + invoice transaction
//! - [`analytics`]: Visit pipeline timing statistics

pub mod analytics;
pub mod db;
pub mod dispense;
pub mod models;
pub mod pricing;
pub mod safety;

// Re-export commonly used types
pub use analytics::{compute_flow_metrics, FlowFilter, FlowReport, StageStats, StageTransition};
pub use db::{Database, DbError};
pub use dispense::{
    DispenseError, DispenseOutcome, Dispenser, NoopNotifier, Notifier, StockShortage,
};
pub use models::{
    DosageDuration, DosageInstruction, DurationUnit, HmoPolicy, InventoryItem, Invoice,
    ItemCategory, Patient, PatientType, Prescription, PrescriptionItem, PrescriptionStatus,
    VisitFlowRecord,
};
pub use pricing::{CalculationResult, Calculator, PricingError, PrescriptionLine};
pub use safety::{check_safety, PrescribedDrug, SafetyWarning, Severity, WarningKind};

//! Domain models.

mod inventory;
mod invoice;
mod patient;
mod prescription;
mod visit;

pub use inventory::*;
pub use invoice::*;
pub use patient::*;
pub use prescription::*;
pub use visit::*;

//! Shared types for component pricing
//!
//! Part records accumulate distributor offers for one input component. The
//! distributor registry maps aggregator seller names onto the distributor ids
//! used as keys everywhere else.

pub mod distributors;
pub mod error;
pub mod part;

pub use distributors::{DistributorEntry, DistributorKind, DistributorRegistry};
pub use error::{RegistryError, Result};
pub use part::{
    sku_field, sku_qty_field, DistributorOffer, PartRecord, PriceTiers, QtyIncrement,
    LIFECYCLE_OBSOLETE, MANF_FIELD, MANF_QTY_FIELD, REFS_FIELD,
};

#![deny(missing_docs)]
#![doc = "Core error, table and determinism types shared by the DOE campaign crates."]

pub mod errors;
pub mod provenance;
pub mod rng;
pub mod serde;
pub mod table;

pub use errors::{DoeError, ErrorInfo};
pub use provenance::SchemaVersion;
pub use rng::{derive_substream_seed, RngHandle};
pub use serde::{from_json_slice, stable_hash_string, to_canonical_json_bytes};
pub use table::{CellValue, DataTable};

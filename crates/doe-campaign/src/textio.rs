//! Text serialization of the full campaign state.
//!
//! The envelope is readable JSON mirroring the owned object graph; tabular
//! payloads (measurement records, the cached batch) are embedded as opaque
//! bincode-over-hex blobs so floating point content survives the round trip
//! bit-exactly.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use doe_core::{DataTable, DoeError, ErrorInfo, SchemaVersion};
use doe_space::{Objective, SearchSpace};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::{CachedBatch, RecommendationCache};
use crate::campaign::Campaign;
use crate::store::{MeasurementRecord, MeasurementStore};

/// Version of the campaign text schema written by this crate.
pub const TEXT_SCHEMA_VERSION: SchemaVersion = SchemaVersion::new(1, 0, 0);

#[derive(Debug, Serialize, Deserialize)]
struct StoreBlob {
    epoch: u64,
    columns: Vec<String>,
    records: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheBlob {
    batch_quantity: u64,
    fingerprint: u64,
    batch: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CampaignPayload<P> {
    schema_version: SchemaVersion,
    enforce_tolerance: bool,
    space: SearchSpace,
    space_hash: String,
    objective: Objective,
    proposer: P,
    store: StoreBlob,
    cache: Option<CacheBlob>,
}

fn serde_error(code: &str, err: impl ToString) -> DoeError {
    DoeError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn encode_records(records: &[MeasurementRecord]) -> Result<String, DoeError> {
    let bytes = bincode::serialize(records)
        .map_err(|err| serde_error("store-encode", err))?;
    Ok(hex::encode(bytes))
}

fn decode_records(blob: &str) -> Result<Vec<MeasurementRecord>, DoeError> {
    let bytes = hex::decode(blob).map_err(|err| serde_error("store-hex-decode", err))?;
    bincode::deserialize(&bytes).map_err(|err| serde_error("store-decode", err))
}

/// Serializes a campaign into its self-describing text form.
pub fn to_text<P>(campaign: &Campaign<P>) -> Result<String, DoeError>
where
    P: Serialize,
{
    let store = campaign.measurements();
    let payload = CampaignPayload {
        schema_version: TEXT_SCHEMA_VERSION,
        enforce_tolerance: campaign.tolerance_enforced(),
        space: campaign.search_space().clone(),
        space_hash: campaign.search_space().canonical_hash()?,
        objective: campaign.objective().clone(),
        proposer: campaign.proposer(),
        store: StoreBlob {
            epoch: store.epoch(),
            columns: store.columns().to_vec(),
            records: encode_records(store.records())?,
        },
        cache: campaign
            .cache()
            .entry()
            .map(|entry| {
                Ok::<_, DoeError>(CacheBlob {
                    batch_quantity: entry.batch_quantity,
                    fingerprint: entry.fingerprint,
                    batch: entry.batch.to_hex_blob()?,
                })
            })
            .transpose()?,
    };
    serde_json::to_string_pretty(&payload).map_err(|err| serde_error("campaign-serialize", err))
}

/// Reconstructs a campaign from its text form.
///
/// The search space and objective are passed back through their validating
/// constructors, and the embedded space hash is checked, so a corrupted or
/// hand-edited payload is rejected before a campaign is produced.
pub fn from_text<P>(text: &str) -> Result<Campaign<P>, DoeError>
where
    P: DeserializeOwned,
{
    let payload: CampaignPayload<P> =
        serde_json::from_str(text).map_err(|err| serde_error("campaign-parse", err))?;
    if !TEXT_SCHEMA_VERSION.accepts(&payload.schema_version) {
        return Err(DoeError::Serde(
            ErrorInfo::new("campaign-schema-version", "unsupported text schema version")
                .with_context("payload_major", payload.schema_version.major.to_string())
                .with_context("supported_major", TEXT_SCHEMA_VERSION.major.to_string()),
        ));
    }
    let space = SearchSpace::new(payload.space.parameters().to_vec())?;
    let space_hash = space.canonical_hash()?;
    if space_hash != payload.space_hash {
        return Err(DoeError::Serde(
            ErrorInfo::new("campaign-space-hash", "space hash does not match payload")
                .with_context("expected", payload.space_hash)
                .with_context("actual", space_hash),
        ));
    }
    let objective = Objective::new(payload.objective.targets().to_vec())?;
    let records = decode_records(&payload.store.records)?;
    let store = MeasurementStore::from_parts(payload.store.columns, records, payload.store.epoch)?;
    let mut cache = RecommendationCache::new();
    if let Some(blob) = payload.cache {
        cache.store(CachedBatch {
            batch_quantity: blob.batch_quantity,
            fingerprint: blob.fingerprint,
            batch: DataTable::from_hex_blob(&blob.batch)?,
        });
    }
    Ok(Campaign::from_parts(
        Arc::new(space),
        Arc::new(objective),
        payload.proposer,
        store,
        cache,
        payload.enforce_tolerance,
    ))
}

#[derive(Debug, Deserialize)]
struct StoreShape {
    #[allow(dead_code)]
    epoch: u64,
    columns: Vec<String>,
    records: String,
}

#[derive(Debug, Deserialize)]
struct CacheShape {
    batch_quantity: u64,
    #[allow(dead_code)]
    fingerprint: u64,
    batch: String,
}

#[derive(Debug, Deserialize)]
struct PayloadShape {
    schema_version: SchemaVersion,
    #[allow(dead_code)]
    enforce_tolerance: bool,
    space: Value,
    space_hash: String,
    objective: Value,
    #[allow(dead_code)]
    proposer: Value,
    store: StoreShape,
    cache: Option<CacheShape>,
}

fn shape_error(code: &str, message: &str, path: String) -> DoeError {
    DoeError::Serde(ErrorInfo::new(code, message).with_context("path", path))
}

fn check_parameter_shape(idx: usize, value: &Value) -> Result<(), DoeError> {
    let path = format!("space[{idx}]");
    let object = value
        .as_object()
        .ok_or_else(|| shape_error("shape-parameter", "parameter must be an object", path.clone()))?;
    if !object.get("name").map(Value::is_string).unwrap_or(false) {
        return Err(shape_error(
            "shape-parameter-name",
            "parameter needs a string name",
            path,
        ));
    }
    let domain = object
        .get("domain")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            shape_error("shape-parameter-domain", "parameter needs a domain object", path.clone())
        })?;
    if !domain.get("type").map(Value::is_string).unwrap_or(false) {
        return Err(shape_error(
            "shape-domain-type",
            "domain needs a string type tag",
            path,
        ));
    }
    Ok(())
}

fn check_target_shape(idx: usize, value: &Value) -> Result<(), DoeError> {
    let path = format!("objective[{idx}]");
    let object = value
        .as_object()
        .ok_or_else(|| shape_error("shape-target", "target must be an object", path.clone()))?;
    if !object.get("name").map(Value::is_string).unwrap_or(false) {
        return Err(shape_error(
            "shape-target-name",
            "target needs a string name",
            path.clone(),
        ));
    }
    if !object.get("mode").map(Value::is_string).unwrap_or(false) {
        return Err(shape_error(
            "shape-target-mode",
            "target needs a string mode",
            path,
        ));
    }
    Ok(())
}

fn check_hex_blob(code: &str, blob: &str, path: &str) -> Result<(), DoeError> {
    hex::decode(blob).map_err(|err| {
        DoeError::Serde(
            ErrorInfo::new(code, "blob is not valid hex")
                .with_context("path", path.to_string())
                .with_hint(err.to_string()),
        )
    })?;
    Ok(())
}

/// Checks a campaign text against the expected nested schema.
///
/// This is a shape and type check only: it never runs the validating
/// `SearchSpace`/`Objective` constructors and never decodes the binary
/// payloads, so it stays cheap on large texts. A passing text may still be
/// rejected by [`from_text`] on semantic grounds.
pub fn validate_text(text: &str) -> Result<(), DoeError> {
    let shape: PayloadShape =
        serde_json::from_str(text).map_err(|err| serde_error("campaign-parse", err))?;
    if !TEXT_SCHEMA_VERSION.accepts(&shape.schema_version) {
        return Err(DoeError::Serde(
            ErrorInfo::new("campaign-schema-version", "unsupported text schema version")
                .with_context("payload_major", shape.schema_version.major.to_string()),
        ));
    }
    let parameters = shape.space.as_array().ok_or_else(|| {
        shape_error("shape-space", "space must be an array of parameters", "space".into())
    })?;
    if parameters.is_empty() {
        return Err(shape_error(
            "shape-space-empty",
            "space must list at least one parameter",
            "space".into(),
        ));
    }
    for (idx, parameter) in parameters.iter().enumerate() {
        check_parameter_shape(idx, parameter)?;
    }
    let targets = shape.objective.as_array().ok_or_else(|| {
        shape_error(
            "shape-objective",
            "objective must be an array of targets",
            "objective".into(),
        )
    })?;
    for (idx, target) in targets.iter().enumerate() {
        check_target_shape(idx, target)?;
    }
    if shape.space_hash.is_empty() {
        return Err(shape_error(
            "shape-space-hash",
            "space hash must be non-empty",
            "space_hash".into(),
        ));
    }
    if shape.store.columns.is_empty() {
        return Err(shape_error(
            "shape-store-columns",
            "store must list its columns",
            "store.columns".into(),
        ));
    }
    check_hex_blob("shape-store-blob", &shape.store.records, "store.records")?;
    if let Some(cache) = &shape.cache {
        if cache.batch_quantity == 0 {
            return Err(shape_error(
                "shape-cache-quantity",
                "cached batch quantity must be at least 1",
                "cache.batch_quantity".into(),
            ));
        }
        check_hex_blob("shape-cache-blob", &cache.batch, "cache.batch")?;
    }
    Ok(())
}

impl<P: Serialize> Campaign<P> {
    /// Serializes this campaign into its text form. See [`to_text`].
    pub fn to_text(&self) -> Result<String, DoeError> {
        to_text(self)
    }
}

impl<P: DeserializeOwned> Campaign<P> {
    /// Reconstructs a campaign from its text form. See [`from_text`].
    pub fn from_text(text: &str) -> Result<Self, DoeError> {
        from_text(text)
    }
}

/// Writes the campaign text to disk, creating parent directories.
pub fn save<P: Serialize>(campaign: &Campaign<P>, path: &Path) -> Result<(), DoeError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            DoeError::Serde(
                ErrorInfo::new("campaign-mkdir", err.to_string())
                    .with_context("path", parent.display().to_string()),
            )
        })?;
    }
    let text = to_text(campaign)?;
    fs::write(path, text).map_err(|err| {
        DoeError::Serde(
            ErrorInfo::new("campaign-write", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })
}

/// Restores a campaign from a text file on disk.
pub fn load<P: DeserializeOwned>(path: &Path) -> Result<Campaign<P>, DoeError> {
    let text = fs::read_to_string(path).map_err(|err| {
        DoeError::Serde(
            ErrorInfo::new("campaign-read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    from_text(&text)
}

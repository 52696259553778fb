//! Cover dimension lookups for provider-aware print layouts.
//!
//! A print-on-demand provider decides the exact spread size: the spine
//! depends on page count and paper, the bleed on the binding. The
//! [`DimensionService`] trait hides where those numbers come from;
//! [`BodDimensionService`] asks the Books-on-Demand cover calculator.
//!
//! The service answers in millimetres:
//!
//! | Field | Meaning | [`PhysicalSpec`] |
//! |---|---|---|
//! | `ulbreite_m` | cover width incl. bleed | `total_width_cm` |
//! | `hoehe_m` | cover height incl. bleed | `total_height_cm` |
//! | `rueckenbreite` | spine width | `spine_width_cm` |
//! | `beschnitt` | bleed per edge | `edge_width_cm` |
//!
//! Lookups are blocking and happen before any pixel is drawn. Failures are
//! never retried here.

use crate::config::ProviderConfig;
use crate::error::{CoverError, Result};
use crate::imaging::PhysicalSpec;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, instrument};

/// Source of provider-specific cover measurements.
pub trait DimensionService {
    fn lookup(&self, page_count: u32) -> Result<PhysicalSpec>;
}

/// Books-on-Demand `bp_checkcover` calculator.
pub struct BodDimensionService {
    client: reqwest::blocking::Client,
    config: ProviderConfig,
}

impl BodDimensionService {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("simple-cover/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoverError::ExternalLookupFailed(e.to_string()))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Query parameters for a book of `page_count` pages.
    pub fn query(&self, page_count: u32) -> Vec<(&'static str, String)> {
        vec![
            ("MODE", "bp_checkcover".to_string()),
            ("einbandart", self.config.binding.clone()),
            ("buchformat", self.config.book_format.clone()),
            ("anzseiten", page_count.to_string()),
            ("papierfarbe", self.config.paper.clone()),
        ]
    }
}

impl DimensionService for BodDimensionService {
    #[instrument(skip(self), fields(endpoint = %self.config.endpoint))]
    fn lookup(&self, page_count: u32) -> Result<PhysicalSpec> {
        let endpoint = &self.config.endpoint;
        let response = self
            .client
            .post(endpoint)
            .query(&self.query(page_count))
            .send()
            .map_err(|e| CoverError::ExternalLookupFailed(format!("POST {endpoint}: {e}")))?;

        if !response.status().is_success() {
            return Err(CoverError::ExternalLookupFailed(format!(
                "HTTP {} from {endpoint}",
                response.status()
            )));
        }
        let body = response
            .text()
            .map_err(|e| CoverError::ExternalLookupFailed(e.to_string()))?;
        let spec = parse_bod_response(&body)?;
        debug!(?spec, "Cover dimensions received");
        Ok(spec)
    }
}

/// Parse a calculator reply into a spec in centimetres.
///
/// Numbers may arrive as JSON numbers or as strings; a decimal comma is
/// accepted.
pub fn parse_bod_response(body: &str) -> Result<PhysicalSpec> {
    let json: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| CoverError::ExternalLookupFailed(format!("malformed reply: {e}")))?;
    Ok(PhysicalSpec {
        total_width_cm: field_mm(&json, "ulbreite_m")? / 10.0,
        total_height_cm: field_mm(&json, "hoehe_m")? / 10.0,
        spine_width_cm: field_mm(&json, "rueckenbreite")? / 10.0,
        edge_width_cm: field_mm(&json, "beschnitt")? / 10.0,
    })
}

fn field_mm(json: &serde_json::Value, key: &str) -> Result<f64> {
    let value = json
        .get(key)
        .ok_or_else(|| CoverError::ExternalLookupFailed(format!("reply has no '{key}'")))?;
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        CoverError::ExternalLookupFailed(format!("'{key}' is not a number: {value}"))
    })
}

/// Memoizes successful lookups per page count.
pub struct CachedDimensions<S> {
    inner: S,
    cache: Mutex<HashMap<u32, PhysicalSpec>>,
}

impl<S: DimensionService> CachedDimensions<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl<S: DimensionService> DimensionService for CachedDimensions<S> {
    fn lookup(&self, page_count: u32) -> Result<PhysicalSpec> {
        if let Some(spec) = self
            .cache
            .lock()
            .ok()
            .and_then(|c| c.get(&page_count).copied())
        {
            debug!(page_count, "Cover dimensions cache hit");
            return Ok(spec);
        }
        let spec = self.inner.lookup(page_count)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(page_count, spec);
        }
        Ok(spec)
    }
}

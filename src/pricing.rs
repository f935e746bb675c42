//! Azure Retail Prices API client
//!
//! Answers "what does unit X of resource kind Y cost in region Z". Lookups
//! resolve against static tables of common SKUs first for instant, offline
//! pricing, then fall back to the Azure Retail Prices API. Remote failures
//! are logged and surface as `None` - a pricing gap is never fatal to the
//! run.
//!
//! Successful remote lookups are cached by canonicalized query key for a
//! fixed window (1 hour by default). The cache is owned by the client; no
//! process-wide state.

use crate::error::{Result, TerracostError};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Azure Retail Prices API endpoint.
pub const AZURE_PRICES_URL: &str = "https://prices.azure.com/api/retail/prices";

/// Default cache window for remote price lookups.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

// Standard pricing for common VM sizes ($/hour)
const VM_PRICING: &[(&str, f64)] = &[
    ("Standard_D2s_v3", 0.096),
    ("Standard_D4s_v3", 0.192),
    ("Standard_D8s_v3", 0.384),
];

// Standard pricing for common storage account types ($/GB/month)
const STORAGE_PRICING: &[(&str, f64)] = &[
    ("Standard_LRS", 0.0184),
    ("Standard_GRS", 0.0368),
    ("Premium_LRS", 0.15),
    ("Premium_ZRS", 0.175),
];

// Flat monthly pricing for managed disks, by storage type then tier
const DISK_PRICING: &[(&str, &[(&str, f64)])] = &[
    (
        "Standard_LRS",
        &[
            ("P4", 5.28),   // 32 GB
            ("P6", 10.21),  // 64 GB
            ("P10", 19.71), // 128 GB
            ("P15", 38.44), // 256 GB
            ("P20", 73.22), // 512 GB
        ],
    ),
    (
        "Premium_LRS",
        &[
            ("P4", 15.84),
            ("P6", 30.63),
            ("P10", 59.13),
            ("P15", 115.32),
            ("P20", 219.66),
        ],
    ),
];

/// Result of a pricing lookup.
///
/// Absence of a quote is a distinct outcome from a zero-price quote.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub retail_price: f64,
    pub unit_price: f64,
    pub currency_code: String,
    pub price_type: String,
}

impl PriceQuote {
    fn flat(price: f64) -> Self {
        Self {
            retail_price: price,
            unit_price: price,
            currency_code: "USD".to_string(),
            price_type: "Consumption".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(rename = "Items", default)]
    items: Vec<PriceItem>,
}

#[derive(Debug, Deserialize)]
struct PriceItem {
    #[serde(rename = "retailPrice", default)]
    retail_price: f64,
    #[serde(rename = "unitPrice", default)]
    unit_price: f64,
    #[serde(rename = "currencyCode", default = "default_currency")]
    currency_code: String,
    #[serde(rename = "type", default = "default_price_type")]
    price_type: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_price_type() -> String {
    "Consumption".to_string()
}

struct CacheEntry {
    quote: PriceQuote,
    expires_at: Instant,
}

/// Client for the Azure Retail Prices API with static fallback tables.
pub struct PricingClient {
    http: reqwest::Client,
    base_url: String,
    cache_ttl: Duration,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl Default for PricingClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PricingClient {
    pub fn new() -> Self {
        Self::with_settings(AZURE_PRICES_URL, DEFAULT_CACHE_TTL)
    }

    /// Client against an alternate endpoint (tests, config override).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_settings(base_url, DEFAULT_CACHE_TTL)
    }

    pub fn with_settings(base_url: impl Into<String>, cache_ttl: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            cache_ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Hourly price for a VM size.
    pub async fn vm_price(&self, size: &str, region: &str) -> Option<PriceQuote> {
        info!("Getting VM price for size={}, region={}", size, region);

        if let Some((_, rate)) = VM_PRICING.iter().find(|(s, _)| *s == size) {
            return Some(PriceQuote::flat(*rate));
        }

        match self
            .fetch_price(&[
                ("serviceName", "Virtual Machines"),
                ("armRegionName", region),
                ("skuName", size),
            ])
            .await
        {
            Ok(Some(quote)) => Some(quote),
            Ok(None) => {
                warn!("Could not find pricing for VM size: {}", size);
                None
            }
            Err(e) => {
                warn!("API request failed for VM pricing: {}", e);
                None
            }
        }
    }

    /// Per-GB monthly price for a storage account type (e.g. "Standard_LRS").
    pub async fn storage_price(&self, account_type: &str, region: &str) -> Option<PriceQuote> {
        info!(
            "Getting storage price for type={}, region={}",
            account_type, region
        );

        if let Some((_, rate)) = STORAGE_PRICING.iter().find(|(t, _)| *t == account_type) {
            return Some(PriceQuote::flat(*rate));
        }

        match self
            .fetch_price(&[
                ("serviceName", "Storage"),
                ("armRegionName", region),
                ("skuName", account_type),
            ])
            .await
        {
            Ok(Some(quote)) => Some(quote),
            Ok(None) => {
                warn!("Could not find pricing for storage type: {}", account_type);
                None
            }
            Err(e) => {
                warn!("API request failed for storage pricing: {}", e);
                None
            }
        }
    }

    /// Flat monthly price for a managed disk.
    ///
    /// The disk's performance tier is derived from its size via
    /// [`disk_tier_for_size`]; the returned price is already a monthly
    /// figure, not a unit rate.
    pub async fn managed_disk_price(
        &self,
        storage_type: &str,
        size_gb: u64,
        region: &str,
    ) -> Option<PriceQuote> {
        info!(
            "Getting managed disk price for type={}, size={}GB, region={}",
            storage_type, size_gb, region
        );

        let tier = disk_tier_for_size(size_gb);

        let table_price = DISK_PRICING
            .iter()
            .find(|(t, _)| *t == storage_type)
            .and_then(|(_, tiers)| tiers.iter().find(|(name, _)| *name == tier))
            .map(|(_, price)| *price);
        if let Some(price) = table_price {
            return Some(PriceQuote::flat(price));
        }

        match self
            .fetch_price(&[
                ("serviceName", "Managed Disks"),
                ("armRegionName", region),
                ("skuName", storage_type),
                ("tierName", tier),
            ])
            .await
        {
            Ok(Some(quote)) => Some(quote),
            Ok(None) => {
                warn!(
                    "Could not find pricing for disk type={}, tier={}",
                    storage_type, tier
                );
                None
            }
            Err(e) => {
                warn!("API request failed for disk pricing: {}", e);
                None
            }
        }
    }

    /// Fetch a price from the Azure Retail Prices API, consulting the cache
    /// first. Returns `Ok(None)` when the API has no matching item.
    async fn fetch_price(&self, filters: &[(&str, &str)]) -> Result<Option<PriceQuote>> {
        let key = cache_key(filters);

        {
            let mut cache = self.cache.lock().expect("pricing cache poisoned");
            if let Some(entry) = cache.get(&key) {
                if Instant::now() < entry.expires_at {
                    debug!("Price cache hit for {}", key);
                    return Ok(Some(entry.quote.clone()));
                }
                cache.remove(&key);
            }
        }

        let filter = build_filter(filters);
        debug!("Querying pricing API with filter: {}", filter);

        let response = self
            .http
            .get(&self.base_url)
            .query(&[("$filter", filter.as_str())])
            .send()
            .await
            .map_err(|e| TerracostError::PricingUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| TerracostError::PricingUnavailable(e.to_string()))?;

        let body: PriceResponse = response
            .json()
            .await
            .map_err(|e| TerracostError::PricingUnavailable(e.to_string()))?;

        let Some(item) = body.items.into_iter().next() else {
            return Ok(None);
        };
        if item.retail_price < 0.0 {
            warn!("Ignoring negative price from API for {}", key);
            return Ok(None);
        }

        let quote = PriceQuote {
            retail_price: item.retail_price,
            unit_price: item.unit_price,
            currency_code: item.currency_code,
            price_type: item.price_type,
        };

        let mut cache = self.cache.lock().expect("pricing cache poisoned");
        cache.insert(
            key,
            CacheEntry {
                quote: quote.clone(),
                expires_at: Instant::now() + self.cache_ttl,
            },
        );
        Ok(Some(quote))
    }

    /// Drop all cached quotes.
    pub fn clear_cache(&self) {
        self.cache.lock().expect("pricing cache poisoned").clear();
        debug!("Pricing cache cleared");
    }
}

/// Performance tier for a managed disk of the given size.
///
/// The ladder is fixed (boundaries inclusive): <=32 GB -> P4, <=64 -> P6,
/// <=128 -> P10, <=256 -> P15, larger -> P20.
pub fn disk_tier_for_size(size_gb: u64) -> &'static str {
    if size_gb <= 32 {
        "P4"
    } else if size_gb <= 64 {
        "P6"
    } else if size_gb <= 128 {
        "P10"
    } else if size_gb <= 256 {
        "P15"
    } else {
        "P20"
    }
}

/// Canonical cache key: filters sorted by name so equivalent queries hit the
/// cache regardless of insertion order.
fn cache_key(filters: &[(&str, &str)]) -> String {
    let mut pairs: Vec<String> = filters.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    pairs.sort();
    pairs.join("|")
}

/// OData filter expression for the Retail Prices API. Region is matched
/// case-insensitively, service by exact name, sku and tier by containment.
fn build_filter(filters: &[(&str, &str)]) -> String {
    let mut parts = Vec::new();
    for (name, value) in filters {
        match *name {
            "armRegionName" => parts.push(format!("armRegionName eq '{}'", value.to_lowercase())),
            "serviceName" => parts.push(format!("serviceName eq '{}'", value)),
            "skuName" => parts.push(format!("contains(skuName, '{}')", value)),
            "tierName" => parts.push(format!("contains(productName, '{}')", value)),
            _ => {}
        }
    }
    parts.join(" and ")
}

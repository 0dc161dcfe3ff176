use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::HarvestError;

pub const DEFAULT_ID_START: u32 = 1;
pub const DEFAULT_ID_END: u32 = 380_000;

/// Numeric identifier of a product in the Webhallen catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductId(u32);

impl ProductId {
    pub fn new(value: u32) -> Result<Self, HarvestError> {
        if value == 0 {
            return Err(HarvestError::InvalidProductId(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = HarvestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parsed = value
            .trim()
            .parse::<u32>()
            .map_err(|_| HarvestError::InvalidProductId(value.to_string()))?;
        Self::new(parsed)
    }
}

/// Half-open range `[start, end)` of product ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdRange {
    start: u32,
    end: u32,
}

impl IdRange {
    pub fn new(start: u32, end: u32) -> Result<Self, HarvestError> {
        if start == 0 || start > end {
            return Err(HarvestError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn len(&self) -> u64 {
        u64::from(self.end - self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn iter(&self) -> impl Iterator<Item = ProductId> + use<> {
        // start >= 1 is enforced by the constructor
        (self.start..self.end).map(ProductId)
    }
}

impl Default for IdRange {
    fn default() -> Self {
        Self {
            start: DEFAULT_ID_START,
            end: DEFAULT_ID_END,
        }
    }
}

impl fmt::Display for IdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Field paths that earlier runs used to record a product's id.
///
/// Older documents wrap the payload as `{"product": {"id": ..}}`, newer
/// ones carry `id` at the top level. Both count as "already stored".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyKey {
    Nested,
    TopLevel,
}

impl LegacyKey {
    pub const ALL: [LegacyKey; 2] = [LegacyKey::Nested, LegacyKey::TopLevel];

    pub fn path(self) -> &'static str {
        match self {
            LegacyKey::Nested => "product.id",
            LegacyKey::TopLevel => "id",
        }
    }
}

impl fmt::Display for LegacyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A decoded, non-empty product payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    id: ProductId,
    fields: Map<String, Value>,
}

impl ProductRecord {
    pub fn new(id: ProductId, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Identity the store assigned to an inserted document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

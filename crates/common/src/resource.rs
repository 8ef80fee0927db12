//! Resource records and the in-memory resource store
//!
//! Records come from the inventory fetch layer as arbitrary JSON. Every
//! lookup into a record goes through [`Field`], which turns an absent key,
//! an out-of-range index, or a value of the wrong shape into `None` instead
//! of an error, so analyzers can skip malformed data without failing.

use crate::{DocError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Schema-on-read view of a (possibly missing) JSON value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field<'a>(Option<&'a Value>);

impl<'a> Field<'a> {
    pub fn new(value: Option<&'a Value>) -> Self {
        Field(value.filter(|v| !v.is_null()))
    }

    pub fn absent() -> Self {
        Field(None)
    }

    /// Descend into an object key
    pub fn get(self, key: &str) -> Field<'a> {
        Field::new(self.0.and_then(|v| v.as_object()).and_then(|m| m.get(key)))
    }

    /// Descend through a sequence of object keys
    pub fn path(self, keys: &[&str]) -> Field<'a> {
        keys.iter().fold(self, |field, key| field.get(key))
    }

    /// Descend into an array element
    pub fn at(self, index: usize) -> Field<'a> {
        Field::new(self.0.and_then(|v| v.as_array()).and_then(|a| a.get(index)))
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    pub fn is_object(&self) -> bool {
        matches!(self.0, Some(Value::Object(_)))
    }

    pub fn value(&self) -> Option<&'a Value> {
        self.0
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.0.and_then(|v| v.as_str())
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.0.and_then(|v| v.as_f64())
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.0.and_then(|v| v.as_bool())
    }

    /// Array elements as fields; empty for anything that is not an array
    pub fn items(&self) -> Vec<Field<'a>> {
        match self.0 {
            Some(Value::Array(items)) => items.iter().map(|v| Field::new(Some(v))).collect(),
            _ => Vec::new(),
        }
    }

    /// String elements of an array, skipping non-strings
    pub fn strings(&self) -> Vec<&'a str> {
        self.items().iter().filter_map(|f| f.as_str()).collect()
    }
}

/// One discovered cloud resource
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub resource_type: String,
    pub resource_group: String,
    pub location: String,
    raw: Value,
}

impl Resource {
    /// Build a record from a raw JSON value, tolerating missing or mistyped keys
    pub fn from_value(raw: Value) -> Self {
        let text = |key: &str| {
            raw.get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        let id = text("id");
        let name = text("name");
        let resource_type = text("type");
        let resource_group = text("resourceGroup");
        let location = text("location");

        Self {
            id,
            name,
            resource_type,
            resource_group,
            location,
            raw,
        }
    }

    /// Type check ignoring case
    pub fn is_type(&self, resource_type: &str) -> bool {
        self.resource_type.eq_ignore_ascii_case(resource_type)
    }

    /// Lower-cased resource type
    pub fn type_key(&self) -> String {
        self.resource_type.to_ascii_lowercase()
    }

    /// Top-level key of the raw record
    pub fn field(&self, key: &str) -> Field<'_> {
        Field::new(self.raw.get(key))
    }

    pub fn properties(&self) -> Field<'_> {
        self.field("properties")
    }

    pub fn sku(&self) -> Field<'_> {
        self.field("sku")
    }

    /// Tag keys with their string values (`None` for non-string values)
    pub fn tags(&self) -> Vec<(&str, Option<&str>)> {
        match self.raw.get("tags") {
            Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect(),
            _ => Vec::new(),
        }
    }

    /// True when the record carries at least one tag
    pub fn has_tags(&self) -> bool {
        !self.tags().is_empty()
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Resource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Resource::from_value)
    }
}

/// Flat, ordered snapshot of every resource in a subscription
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceStore {
    resources: Vec<Resource>,
}

impl ResourceStore {
    pub fn new(resources: Vec<Resource>) -> Self {
        Self { resources }
    }

    /// Build a store from raw JSON records
    pub fn from_values(values: Vec<Value>) -> Self {
        Self::new(values.into_iter().map(Resource::from_value).collect())
    }

    /// Parse a JSON array of resource records
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        match value {
            Value::Array(items) => {
                let skipped = items.iter().filter(|v| !v.is_object()).count();
                if skipped > 0 {
                    log::debug!("Skipping {} non-object inventory entries", skipped);
                }
                Ok(Self::from_values(
                    items.into_iter().filter(|v| v.is_object()).collect(),
                ))
            }
            _ => Err(DocError::Parse(
                "Inventory must be a JSON array of resource records".to_string(),
            )),
        }
    }

    /// Load a JSON inventory file written by the fetch layer
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DocError::Parse(format!("Failed to read inventory file {:?}: {}", path, e))
        })?;
        let store = Self::from_json_str(&content)?;
        log::info!("Loaded {} resources from {:?}", store.len(), path);
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.resources.iter()
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Resources of one type, compared case-insensitively, in store order
    pub fn of_type(&self, resource_type: &str) -> Vec<&Resource> {
        self.resources
            .iter()
            .filter(|r| r.is_type(resource_type))
            .collect()
    }

    /// Resources of one resource group, in store order
    pub fn in_group(&self, resource_group: &str) -> Vec<&Resource> {
        self.resources
            .iter()
            .filter(|r| r.resource_group == resource_group)
            .collect()
    }

    /// Resources keyed by resource group name
    pub fn group_by_resource_group(&self) -> BTreeMap<&str, Vec<&Resource>> {
        let mut groups: BTreeMap<&str, Vec<&Resource>> = BTreeMap::new();
        for resource in &self.resources {
            groups
                .entry(resource.resource_group.as_str())
                .or_default()
                .push(resource);
        }
        groups
    }

    /// Resource count per lower-cased type
    pub fn type_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for resource in &self.resources {
            *counts.entry(resource.type_key()).or_insert(0) += 1;
        }
        counts
    }
}

impl<'a> IntoIterator for &'a ResourceStore {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.iter()
    }
}

impl FromIterator<Resource> for ResourceStore {
    fn from_iter<I: IntoIterator<Item = Resource>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

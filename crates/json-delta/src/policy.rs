//! Diff policies: per-location overrides of the type-based dispatch.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::DeltaError;

/// Forced opcode choice at a policy node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OType {
    Replace,
    List,
    ListDmp,
    Integer,
    String,
}

impl OType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OType::Replace => "replace",
            OType::List => "list",
            OType::ListDmp => "list_dmp",
            OType::Integer => "integer",
            OType::String => "string",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, DeltaError> {
        match s {
            "replace" => Ok(OType::Replace),
            "list" => Ok(OType::List),
            "list_dmp" => Ok(OType::ListDmp),
            "integer" => Ok(OType::Integer),
            "string" => Ok(OType::String),
            other => Err(DeltaError::InvalidPolicy(format!("unknown otype: {other}"))),
        }
    }
}

/// A recursive diff policy. Absent pieces mean "choose by runtime type";
/// when `otype` disagrees with the runtime type, `otype` wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Policy {
    /// Forces the opcode at this node.
    pub otype: Option<OType>,
    /// Sub-policies for object fields.
    pub attributes: BTreeMap<String, Policy>,
    /// Sub-policy applied to every list element.
    pub item: Option<Box<Policy>>,
}

impl Policy {
    /// A policy that only forces an opcode at this node.
    pub fn with_otype(otype: OType) -> Self {
        Self {
            otype: Some(otype),
            ..Self::default()
        }
    }

    /// Resolve the sub-policy for an object field.
    pub fn attribute(&self, key: &str) -> Option<&Policy> {
        self.attributes.get(key)
    }

    /// Resolve the sub-policy for list elements.
    pub fn item(&self) -> Option<&Policy> {
        self.item.as_deref()
    }

    /// Decode the JSON form:
    /// `{"otype": "...", "attributes": {...}, "item": {...}}`.
    /// Unrecognized fields are ignored; unrecognized `otype` values are
    /// errors.
    pub fn from_json(value: &Value) -> Result<Self, DeltaError> {
        let map = value
            .as_object()
            .ok_or_else(|| DeltaError::InvalidPolicy("policy must be an object".to_string()))?;
        let mut policy = Policy::default();
        if let Some(otype) = map.get("otype") {
            let s = otype.as_str().ok_or_else(|| {
                DeltaError::InvalidPolicy("otype must be a string".to_string())
            })?;
            policy.otype = Some(OType::from_str(s)?);
        }
        if let Some(attrs) = map.get("attributes") {
            let attrs = attrs.as_object().ok_or_else(|| {
                DeltaError::InvalidPolicy("attributes must be an object".to_string())
            })?;
            for (key, sub) in attrs {
                policy.attributes.insert(key.clone(), Policy::from_json(sub)?);
            }
        }
        if let Some(item) = map.get("item") {
            policy.item = Some(Box::new(Policy::from_json(item)?));
        }
        Ok(policy)
    }
}

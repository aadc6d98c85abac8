//! Named numeric knobs for the generators
//!
//! Parameters arrive as a flat JSON object keyed by the camelCase names the
//! dashboard sends (`baseLoad`, `noiseLevel`, ...). Values are only checked
//! for type: a recognised key holding a non-number is rejected here, at the
//! boundary, so the generators never see anything but `f64`. Unknown keys are
//! ignored. Ranges are not checked; a negative noise level simply produces
//! implausible output.

use crate::{Result, SignalKind, SynthError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Flat mapping of parameter name to value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationParameters(BTreeMap<String, f64>);

impl GenerationParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    /// Value of `key`, or `default` when unset
    pub fn get_or(&self, key: &str, default: f64) -> f64 {
        self.0.get(key).copied().unwrap_or(default)
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Parse the parameter object for `kind`
    ///
    /// `null` is treated as "all defaults". Keys `kind` does not recognise are
    /// dropped.
    pub fn from_json(value: &Value, kind: SignalKind) -> Result<Self> {
        let object = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(object) => object,
            other => {
                return Err(SynthError::InvalidParameter(format!(
                    "synthesize: parameters must be an object, got {}",
                    other
                )))
            }
        };

        let recognised = recognised_keys(kind);
        let mut params = Self::default();
        for (key, raw) in object {
            if !recognised.contains(&key.as_str()) {
                continue;
            }
            let number = raw.as_f64().ok_or_else(|| {
                SynthError::InvalidParameter(format!(
                    "synthesize: parameter '{}' must be numeric, got {}",
                    key, raw
                ))
            })?;
            params.set(key.clone(), number);
        }

        Ok(params)
    }
}

/// Parameter names each signal kind reads
pub fn recognised_keys(kind: SignalKind) -> &'static [&'static str] {
    match kind {
        SignalKind::LoadCurve => &[
            "baseLoad",
            "peakLoad",
            "seasonality",
            "noiseLevel",
            "weekendReduction",
        ],
        SignalKind::Prices => &["basePrice", "peakPrice", "noiseLevel", "seasonality"],
        SignalKind::Weather => &[
            "avgTemp",
            "tempRange",
            "seasonality",
            "noiseLevel",
            "timeInterval",
            "numCustomers",
            "regionVariation",
        ],
        SignalKind::CarbonIntensity => &[
            "baseIntensity",
            "peakIntensity",
            "noiseLevel",
            "renewableShare",
            "timeInterval",
            "numCustomers",
            "regionVariation",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_keys_ignored() {
        let raw = json!({ "baseLoad": 80, "colour": "blue", "peakLoad": 120.5 });
        let params = GenerationParameters::from_json(&raw, SignalKind::LoadCurve).unwrap();

        assert_eq!(params.get("baseLoad"), Some(80.0));
        assert_eq!(params.get("peakLoad"), Some(120.5));
        assert_eq!(params.get("colour"), None);
    }

    #[test]
    fn test_non_numeric_known_key_rejected() {
        let raw = json!({ "noiseLevel": "high" });
        let err = GenerationParameters::from_json(&raw, SignalKind::Prices).unwrap_err();
        assert!(matches!(err, SynthError::InvalidParameter(_)));
        assert!(err.to_string().contains("noiseLevel"));
    }

    #[test]
    fn test_keys_are_per_kind() {
        // baseLoad means nothing to the price generator
        let raw = json!({ "baseLoad": "oops", "basePrice": 40 });
        let params = GenerationParameters::from_json(&raw, SignalKind::Prices).unwrap();
        assert_eq!(params.get("basePrice"), Some(40.0));
        assert!(params.get("baseLoad").is_none());
    }

    #[test]
    fn test_null_and_non_object() {
        assert!(GenerationParameters::from_json(&Value::Null, SignalKind::Weather)
            .unwrap()
            .is_empty());
        assert!(GenerationParameters::from_json(&json!([1, 2]), SignalKind::Weather).is_err());
    }

    #[test]
    fn test_negative_values_accepted() {
        let raw = json!({ "noiseLevel": -0.5 });
        let params = GenerationParameters::from_json(&raw, SignalKind::LoadCurve).unwrap();
        assert_eq!(params.get_or("noiseLevel", 0.1), -0.5);
        assert_eq!(params.get_or("seasonality", 0.2), 0.2);
    }
}

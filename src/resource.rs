//! Resource naming and model registration.
//!
//! A module exposes models (`namespace:family:name`) implementing an API
//! (`namespace:type:subtype`). The [`ModelRegistry`] maps each pair to a
//! validator and a constructor, so a host can validate a component's
//! attributes and build it from resolved dependencies.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::detect::Dependencies;
use crate::error::SensorError;
use crate::sensor::Sensor;

/// Resource API triplet, e.g. `rdk:component:sensor`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Api {
    pub namespace: String,
    pub kind: String,
    pub subtype: String,
}

impl Api {
    pub fn new(namespace: &str, kind: &str, subtype: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            kind: kind.to_string(),
            subtype: subtype.to_string(),
        }
    }

    pub fn sensor() -> Self {
        Self::new("rdk", "component", "sensor")
    }
}

/// Model triplet, e.g. `hipsterbrown:sensor:detections`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Model {
    pub namespace: String,
    pub family: String,
    pub name: String,
}

impl Model {
    pub fn new(namespace: &str, family: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            family: family.to_string(),
            name: name.to_string(),
        }
    }
}

fn parse_triplet(kind: &str, value: &str) -> Result<[String; 3]> {
    let parts: Vec<&str> = value.split(':').collect();
    match parts.as_slice() {
        [a, b, c] if !a.is_empty() && !b.is_empty() && !c.is_empty() => {
            Ok([a.to_string(), b.to_string(), c.to_string()])
        }
        _ => Err(anyhow!(
            "invalid {} '{}'; expected three colon-separated parts",
            kind,
            value
        )),
    }
}

impl FromStr for Api {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let [namespace, kind, subtype] = parse_triplet("api", value)?;
        Ok(Self {
            namespace,
            kind,
            subtype,
        })
    }
}

impl FromStr for Model {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let [namespace, family, name] = parse_triplet("model", value)?;
        Ok(Self {
            namespace,
            family,
            name,
        })
    }
}

impl TryFrom<String> for Api {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl TryFrom<String> for Model {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Api> for String {
    fn from(api: Api) -> Self {
        api.to_string()
    }
}

impl From<Model> for String {
    fn from(model: Model) -> Self {
        model.to_string()
    }
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.kind, self.subtype)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.family, self.name)
    }
}

/// Fully qualified resource name, e.g. `rdk:component:sensor/counter`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceName {
    pub api: Api,
    pub name: String,
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api, self.name)
    }
}

/// Raw configuration of one component.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub name: String,
    #[serde(default = "Api::sensor")]
    pub api: Api,
    pub model: Model,
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
    /// Position in the robot config, e.g. `components.0`. Used in
    /// validation errors.
    #[serde(skip)]
    path: String,
}

impl ComponentConfig {
    pub fn new(
        name: impl Into<String>,
        model: Model,
        attributes: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            name: name.into(),
            api: Api::sensor(),
            model,
            attributes,
            path: "components.0".to_string(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub(crate) fn set_path(&mut self, path: String) {
        self.path = path;
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn resource_name(&self) -> ResourceName {
        ResourceName {
            api: self.api.clone(),
            name: self.name.clone(),
        }
    }

    /// Decode the attributes into the model's native config type.
    pub fn native_config<T: DeserializeOwned>(&self) -> Result<T, SensorError> {
        serde_json::from_value(serde_json::Value::Object(self.attributes.clone())).map_err(|e| {
            SensorError::InvalidAttributes {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        })
    }
}

/// Validates attributes and returns implicit dependency names.
pub type Validator = fn(&ComponentConfig) -> Result<Vec<String>, SensorError>;

/// Builds a sensor from resolved dependencies.
pub type Constructor = fn(&Dependencies, &ComponentConfig) -> Result<Arc<dyn Sensor>, SensorError>;

#[derive(Clone, Copy)]
pub struct Registration {
    pub validator: Validator,
    pub constructor: Constructor,
}

/// Registry of model constructors keyed by API and model.
#[derive(Default)]
pub struct ModelRegistry {
    registrations: HashMap<(Api, Model), Registration>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model. Registering the same pair twice is an error.
    pub fn register(&mut self, api: Api, model: Model, registration: Registration) -> Result<()> {
        let key = (api, model);
        if self.registrations.contains_key(&key) {
            return Err(anyhow!(
                "model {} already registered on api {}",
                key.1,
                key.0
            ));
        }
        log::debug!("registered model {} on api {}", key.1, key.0);
        self.registrations.insert(key, registration);
        Ok(())
    }

    pub fn lookup(&self, api: &Api, model: &Model) -> Result<&Registration, SensorError> {
        self.registrations
            .get(&(api.clone(), model.clone()))
            .ok_or_else(|| SensorError::UnknownModel {
                api: api.to_string(),
                model: model.to_string(),
            })
    }

    /// Validate a component config, returning its implicit dependencies.
    pub fn validate(&self, conf: &ComponentConfig) -> Result<Vec<String>, SensorError> {
        let registration = self.lookup(&conf.api, &conf.model)?;
        (registration.validator)(conf)
    }

    /// Validate then construct a component.
    pub fn construct(
        &self,
        deps: &Dependencies,
        conf: &ComponentConfig,
    ) -> Result<Arc<dyn Sensor>, SensorError> {
        let registration = self.lookup(&conf.api, &conf.model)?;
        let implicit = (registration.validator)(conf)?;
        log::debug!(
            "constructing {} ({}) with implicit dependencies {:?}",
            conf.resource_name(),
            conf.model,
            implicit
        );
        (registration.constructor)(deps, conf)
    }

    /// Registered `(api, model)` pairs, sorted.
    pub fn models(&self) -> Vec<(Api, Model)> {
        let mut models: Vec<(Api, Model)> = self.registrations.keys().cloned().collect();
        models.sort_by_key(|(api, model)| (api.to_string(), model.to_string()));
        models
    }
}

//! Startup payload handed to a view-model by its hosting screen.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKey {
    Project,
    Update,
}

impl IntentKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "intent.project",
            Self::Update => "intent.update",
        }
    }
}

/// Keyed extras supplied once when a screen is created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Intent {
    extras: Map<String, Value>,
}

impl Intent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extra<T: Serialize>(
        mut self,
        key: IntentKey,
        value: &T,
    ) -> serde_json::Result<Self> {
        self.put_extra(key, value)?;
        Ok(self)
    }

    pub fn put_extra<T: Serialize>(
        &mut self,
        key: IntentKey,
        value: &T,
    ) -> serde_json::Result<()> {
        let value = serde_json::to_value(value)?;
        self.extras.insert(key.as_str().to_string(), value);
        Ok(())
    }

    /// Typed lookup. A missing key, a null value or a value of another shape
    /// all read as `None`.
    pub fn extra<T: DeserializeOwned>(&self, key: IntentKey) -> Option<T> {
        let value = self.extras.get(key.as_str())?;
        if value.is_null() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    pub fn has_extra(&self, key: IntentKey) -> bool {
        self.extras.contains_key(key.as_str())
    }
}

/// Opaque navigation request raised by the UI layer. Only its timing matters
/// to a view-model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
}

impl Request {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

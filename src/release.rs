use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TemplateError;
use crate::overrides::{OverlayValue, SetValue};

/// Every string-bearing field may contain template expressions, see
/// [`ReleaseSpec::execute_template_expressions`].
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ReleaseSpec {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub chart: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tillerless: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tillerless_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_template: Option<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values_template: Vec<OverlayValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<OverlayValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secrets: Vec<OverlayValue>,

    #[serde(rename = "setTemplate", skip_serializing_if = "Vec::is_empty")]
    pub set_values_template: Vec<SetValue>,
    #[serde(rename = "set", skip_serializing_if = "Vec::is_empty")]
    pub set_values: Vec<SetValue>,

    /// Names of releases this one depends on. Only templated here.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,
}

impl ReleaseSpec {
    /// Independent copy taken through a YAML round trip.
    pub fn snapshot(&self) -> Result<ReleaseSpec, TemplateError> {
        let clone_error = |source| TemplateError::Clone {
            release: self.name.clone(),
            source,
        };

        let serialized = serde_yaml::to_string(self).map_err(clone_error)?;
        serde_yaml::from_str(&serialized).map_err(clone_error)
    }

    /// Whether the release should end up installed. Unset means yes.
    pub fn desired(&self) -> bool {
        self.installed.unwrap_or(true)
    }
}

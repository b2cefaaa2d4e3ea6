//! Component Registry
//!
//! Maps component type names to their property contracts. Registries are
//! loaded once (from the embedded defaults or a file named in configuration)
//! and are read-only afterwards.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use include_dir::{include_dir, Dir};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidatorError};
use crate::schema::ValueType;

/// Built-in registry tables compiled into the binary
static BUILTIN_REGISTRY: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/registry");

/// Contract for a single declared property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyContract {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    /// Shorthand for listing the property in the component's `required` set
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropertyContract {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            required: false,
            description: None,
        }
    }
}

/// Property contract for one component type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentContract {
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared properties, in declaration order
    #[serde(default)]
    pub properties: Vec<PropertyContract>,
    /// Names of properties that must be present
    #[serde(default)]
    pub required: Vec<String>,
}

impl ComponentContract {
    pub fn new(component_type: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            description: None,
            properties: Vec::new(),
            required: Vec::new(),
        }
    }

    /// Declare an optional property
    pub fn property(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.properties.push(PropertyContract::new(name, value_type));
        self
    }

    /// Declare a required property
    pub fn required_property(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.push(PropertyContract::new(name, value_type));
        self
    }

    /// Look up a declared property
    pub fn get_property(&self, name: &str) -> Option<&PropertyContract> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Declared property names, in declaration order
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// On-disk layout of a component registry file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryFile {
    #[serde(default)]
    pub components: Vec<ComponentContract>,
}

/// Immutable lookup table of component contracts
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    contracts: Vec<ComponentContract>,
    index: HashMap<String, usize>,
}

impl ComponentRegistry {
    /// Build a registry, checking that every contract is self-consistent
    pub fn new(contracts: Vec<ComponentContract>) -> Result<Self> {
        let mut index = HashMap::with_capacity(contracts.len());
        let mut normalized = Vec::with_capacity(contracts.len());

        for (position, mut contract) in contracts.into_iter().enumerate() {
            if index.contains_key(&contract.component_type) {
                return Err(ValidatorError::DuplicateComponent(contract.component_type));
            }

            let mut seen = std::collections::HashSet::new();
            for prop in &contract.properties {
                if !seen.insert(prop.name.as_str()) {
                    return Err(ValidatorError::DuplicateProperty {
                        component: contract.component_type.clone(),
                        property: prop.name.clone(),
                    });
                }
            }

            // Fold per-property required flags into the required set
            let flagged: Vec<String> = contract
                .properties
                .iter()
                .filter(|p| p.required && !contract.is_required(&p.name))
                .map(|p| p.name.clone())
                .collect();
            contract.required.extend(flagged);

            if let Some(missing) = contract
                .required
                .iter()
                .find(|r| contract.get_property(r).is_none())
            {
                return Err(ValidatorError::UndeclaredRequired {
                    component: contract.component_type.clone(),
                    property: missing.clone(),
                });
            }

            index.insert(contract.component_type.clone(), position);
            normalized.push(contract);
        }

        Ok(Self {
            contracts: normalized,
            index,
        })
    }

    /// The registry shipped with the crate
    pub fn builtin() -> Result<Self> {
        let file: RegistryFile = serde_json::from_str(embedded_file("components.json")?)?;
        Self::new(file.components)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: RegistryFile = serde_json::from_str(content)?;
        Self::new(file.components)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: RegistryFile = toml::from_str(content)?;
        Self::new(file.components)
    }

    /// Load from a `.json` or `.toml` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file: RegistryFile = read_registry_file(path)?;
        tracing::debug!(
            target: crate::LOG_RUNTIME,
            "Loaded {} component contracts from {}",
            file.components.len(),
            path.display()
        );
        Self::new(file.components)
    }

    /// Contract for a component type, if registered
    pub fn lookup(&self, component_type: &str) -> Option<&ComponentContract> {
        self.index.get(component_type).map(|&i| &self.contracts[i])
    }

    pub fn contains(&self, component_type: &str) -> bool {
        self.index.contains_key(component_type)
    }

    /// Registered type names, in declaration order
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.contracts.iter().map(|c| c.component_type.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentContract> {
        self.contracts.iter()
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

/// Contents of a file from the embedded `registry/` directory
pub(crate) fn embedded_file(name: &str) -> Result<&'static str> {
    BUILTIN_REGISTRY
        .get_file(name)
        .and_then(|f| f.contents_utf8())
        .ok_or_else(|| ValidatorError::MissingEmbedded(name.to_string()))
}

/// Read and deserialize a registry file, choosing the format by extension
pub(crate) fn read_registry_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(serde_json::from_str(&content)?),
        Some("toml") => Ok(toml::from_str(&content)?),
        _ => Err(ValidatorError::UnsupportedFormat(path.display().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_registry() {
        let registry = ComponentRegistry::builtin().unwrap();
        let names: Vec<_> = registry.type_names().collect();
        assert_eq!(names, vec!["Card", "Layout", "Form", "List", "Dialog", "JSSlot"]);

        let card = registry.lookup("Card").unwrap();
        assert!(card.is_required("title"));
        assert_eq!(card.get_property("bordered").unwrap().value_type, ValueType::Boolean);

        // Slot nodes carry their name outside the property map
        let slot = registry.lookup("JSSlot").unwrap();
        assert!(slot.required.is_empty());
    }

    #[test]
    fn test_lookup_missing() {
        let registry = ComponentRegistry::builtin().unwrap();
        assert!(registry.lookup("Table").is_none());
        assert!(!registry.contains(""));
    }

    #[test]
    fn test_duplicate_component_rejected() {
        let result = ComponentRegistry::new(vec![
            ComponentContract::new("Card"),
            ComponentContract::new("Card"),
        ]);
        assert!(matches!(result, Err(ValidatorError::DuplicateComponent(name)) if name == "Card"));
    }

    #[test]
    fn test_undeclared_required_rejected() {
        let mut contract = ComponentContract::new("Card");
        contract.required.push("title".to_string());
        let result = ComponentRegistry::new(vec![contract]);
        assert!(matches!(result, Err(ValidatorError::UndeclaredRequired { .. })));
    }

    #[test]
    fn test_required_flag_folded() {
        let registry = ComponentRegistry::from_json_str(
            r#"{ "components": [
                { "type": "Badge", "properties": [
                    { "name": "count", "type": "number", "required": true },
                    { "name": "color", "type": "string" }
                ] }
            ] }"#,
        )
        .unwrap();
        let badge = registry.lookup("Badge").unwrap();
        assert_eq!(badge.required, vec!["count".to_string()]);
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("components.toml");
        std::fs::write(
            &path,
            r#"
[[components]]
type = "Tag"
required = ["label"]

[[components.properties]]
name = "label"
type = "string"

[[components.properties]]
name = "closable"
type = "boolean"
"#,
        )
        .unwrap();

        let registry = ComponentRegistry::load(&path).unwrap();
        let tag = registry.lookup("Tag").unwrap();
        assert_eq!(tag.property_names().collect::<Vec<_>>(), vec!["label", "closable"]);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("components.yaml");
        std::fs::write(&path, "components: []").unwrap();
        assert!(matches!(
            ComponentRegistry::load(&path),
            Err(ValidatorError::UnsupportedFormat(_))
        ));
    }
}

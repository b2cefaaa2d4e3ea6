//! Named-slot validation
//!
//! A second validation surface next to the structural walk: for a host
//! component, checks the map of slot name -> content against the slot
//! registry (required slots, unknown slots, per-slot rules).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ValidatorError};
use crate::registry::{embedded_file, read_registry_file};
use crate::schema::{PropValue, ValueType, SLOT_TYPE};
use crate::similarity::SimilarityMatcher;

// =============================================================================
// Registry
// =============================================================================

/// A single rule applied to a slot's value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SlotRule {
    /// Value must not be null or the empty string
    Required,
    /// Numeric lower bound (inclusive)
    Min { value: f64 },
    /// Numeric upper bound (inclusive)
    Max { value: f64 },
    /// String values must match the regex
    Pattern { value: String },
    /// Rule kinds this build does not know; always pass
    #[serde(other)]
    Unknown,
}

/// Type check plus rules for a slot's value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotValidation {
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default)]
    pub rules: Vec<SlotRule>,
}

/// A named insertion point of a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDefinition {
    pub name: String,
    /// Declared content type (e.g. `JSX`); informational
    #[serde(rename = "type")]
    pub slot_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<SlotValidation>,
}

/// Slot definitions of one component type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSlots {
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub slots: Vec<SlotDefinition>,
}

impl ComponentSlots {
    pub fn get(&self, name: &str) -> Option<&SlotDefinition> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.name.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SlotRegistryFile {
    #[serde(default)]
    components: Vec<ComponentSlots>,
}

/// Immutable lookup table of slot definitions per component type
#[derive(Debug, Clone, Default)]
pub struct SlotRegistry {
    components: Vec<ComponentSlots>,
    index: HashMap<String, usize>,
    /// Compiled `pattern` rules, keyed by the pattern source
    patterns: HashMap<String, Regex>,
}

impl SlotRegistry {
    /// Build a registry, compiling every pattern rule up front
    pub fn new(components: Vec<ComponentSlots>) -> Result<Self> {
        let mut index = HashMap::with_capacity(components.len());
        let mut patterns = HashMap::new();

        for (position, component) in components.iter().enumerate() {
            if index.contains_key(&component.component_type) {
                return Err(ValidatorError::DuplicateComponent(component.component_type.clone()));
            }

            let mut seen = HashSet::new();
            for slot in &component.slots {
                if !seen.insert(slot.name.as_str()) {
                    return Err(ValidatorError::DuplicateSlot {
                        component: component.component_type.clone(),
                        slot: slot.name.clone(),
                    });
                }

                let rules = slot.validation.iter().flat_map(|v| v.rules.iter());
                for rule in rules {
                    if let SlotRule::Pattern { value } = rule {
                        let regex =
                            Regex::new(value).map_err(|source| ValidatorError::InvalidPattern {
                                component: component.component_type.clone(),
                                slot: slot.name.clone(),
                                source,
                            })?;
                        patterns.insert(value.clone(), regex);
                    }
                }
            }

            index.insert(component.component_type.clone(), position);
        }

        Ok(Self {
            components,
            index,
            patterns,
        })
    }

    /// The slot tables shipped with the crate
    pub fn builtin() -> Result<Self> {
        let file: SlotRegistryFile = serde_json::from_str(embedded_file("slots.json")?)?;
        Self::new(file.components)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: SlotRegistryFile = serde_json::from_str(content)?;
        Self::new(file.components)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: SlotRegistryFile = toml::from_str(content)?;
        Self::new(file.components)
    }

    /// Load from a `.json` or `.toml` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file: SlotRegistryFile = read_registry_file(path)?;
        tracing::debug!(
            target: crate::LOG_RUNTIME,
            "Loaded {} slot tables from {}",
            file.components.len(),
            path.display()
        );
        Self::new(file.components)
    }

    pub fn lookup(&self, component_type: &str) -> Option<&ComponentSlots> {
        self.index.get(component_type).map(|&i| &self.components[i])
    }

    /// Component type names, in declaration order
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|c| c.component_type.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentSlots> {
        self.components.iter()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn pattern(&self, source: &str) -> Option<&Regex> {
        self.patterns.get(source)
    }
}

// =============================================================================
// Validator
// =============================================================================

/// A problem with a component's named slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotValidationError {
    pub component_name: String,
    /// Empty when the error concerns the component itself
    pub slot_name: String,
    pub message: String,
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl SlotValidationError {
    fn new(
        component_name: &str,
        slot_name: &str,
        message: impl Into<String>,
        path: Vec<String>,
    ) -> Self {
        Self {
            component_name: component_name.to_string(),
            slot_name: slot_name.to_string(),
            message: message.into(),
            path,
            suggestions: None,
        }
    }
}

impl fmt::Display for SlotValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} at {}", self.component_name, self.message, self.path.join("."))?;
        if let Some(suggestions) = self.suggestions.as_ref().filter(|s| !s.is_empty()) {
            write!(f, "; did you mean: {}", suggestions.join(", "))?;
        }
        Ok(())
    }
}

/// Checks slot maps against a [`SlotRegistry`]
#[derive(Debug, Clone)]
pub struct SlotValidator {
    registry: Arc<SlotRegistry>,
    matcher: SimilarityMatcher,
}

impl SlotValidator {
    pub fn new(registry: Arc<SlotRegistry>, matcher: SimilarityMatcher) -> Self {
        Self { registry, matcher }
    }

    pub fn registry(&self) -> &SlotRegistry {
        &self.registry
    }

    /// Validate the slots provided for one component
    pub fn validate_component_slots(
        &self,
        component_name: &str,
        slots: &BTreeMap<String, PropValue>,
        path: &[String],
    ) -> Vec<SlotValidationError> {
        let Some(definitions) = self.registry.lookup(component_name) else {
            let mut error = SlotValidationError::new(
                component_name,
                "",
                format!("Component \"{}\" not found in slots registry", component_name),
                path.to_vec(),
            );
            error.suggestions =
                Some(self.matcher.suggest(component_name, self.registry.type_names()));
            return vec![error];
        };

        let mut errors = Vec::new();

        for slot in definitions.slots.iter().filter(|s| s.required) {
            if !slots.get(&slot.name).map_or(false, PropValue::is_truthy) {
                errors.push(SlotValidationError::new(
                    component_name,
                    &slot.name,
                    format!("Required slot \"{}\" is missing", slot.name),
                    child_path(path, &slot.name),
                ));
            }
        }

        for (slot_name, value) in slots {
            let slot_path = child_path(path, slot_name);
            let Some(definition) = definitions.get(slot_name) else {
                let mut error = SlotValidationError::new(
                    component_name,
                    slot_name,
                    format!("Unknown slot \"{}\"", slot_name),
                    slot_path,
                );
                error.suggestions = Some(self.matcher.suggest(slot_name, definitions.slot_names()));
                errors.push(error);
                continue;
            };

            if let Some(validation) = &definition.validation {
                errors.extend(self.validate_slot_value(
                    component_name,
                    slot_name,
                    value,
                    validation,
                    &slot_path,
                ));
            }
        }

        errors
    }

    fn validate_slot_value(
        &self,
        component_name: &str,
        slot_name: &str,
        value: &PropValue,
        validation: &SlotValidation,
        path: &[String],
    ) -> Vec<SlotValidationError> {
        let mut errors = Vec::new();

        if !validation.value_type.matches(value) {
            errors.push(SlotValidationError::new(
                component_name,
                slot_name,
                format!("Invalid type: expected \"{}\"", validation.value_type),
                path.to_vec(),
            ));
        }

        for rule in &validation.rules {
            if let Some(message) = self.apply_rule(value, rule) {
                errors.push(SlotValidationError::new(
                    component_name,
                    slot_name,
                    message,
                    path.to_vec(),
                ));
            }
        }

        errors
    }

    /// Failure message for a rule, or `None` when it holds
    fn apply_rule(&self, value: &PropValue, rule: &SlotRule) -> Option<String> {
        match rule {
            SlotRule::Required => match value {
                PropValue::Null => Some("Value is required".to_string()),
                PropValue::String(s) if s.is_empty() => Some("Value is required".to_string()),
                _ => None,
            },
            SlotRule::Min { value: min } => value
                .as_f64()
                .filter(|v| v < min)
                .map(|_| format!("Value must be greater than or equal to {}", min)),
            SlotRule::Max { value: max } => value
                .as_f64()
                .filter(|v| v > max)
                .map(|_| format!("Value must be less than or equal to {}", max)),
            SlotRule::Pattern { value: pattern } => {
                let text = value.as_str()?;
                let matched = self.registry.pattern(pattern).map_or(false, |re| re.is_match(text));
                (!matched).then(|| "Value does not match pattern".to_string())
            }
            SlotRule::Unknown => None,
        }
    }
}

fn child_path(path: &[String], segment: &str) -> Vec<String> {
    let mut child = path.to_vec();
    child.push(segment.to_string());
    child
}

/// Walk an arbitrary JSON document and validate every slot node in it.
///
/// Slot nodes are objects whose `type` is `JSSlot`; their `componentName`
/// and `slots` fields are checked with `validator`. Every nested object and
/// array element is visited, with keys and indices appended to the path.
pub fn validate_schema_slots(
    document: &Value,
    validator: &SlotValidator,
    path: &[String],
) -> Vec<SlotValidationError> {
    let mut errors = Vec::new();

    match document {
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) == Some(SLOT_TYPE) {
                let component_name = map.get("componentName").and_then(Value::as_str).unwrap_or("");
                let slots: BTreeMap<String, PropValue> = match map.get("slots") {
                    Some(Value::Object(slots)) => slots
                        .iter()
                        .map(|(k, v)| (k.clone(), PropValue::from(v.clone())))
                        .collect(),
                    _ => BTreeMap::new(),
                };
                errors.extend(validator.validate_component_slots(component_name, &slots, path));
            }

            for (key, value) in map {
                match value {
                    Value::Array(items) => {
                        for (index, item) in items.iter().enumerate() {
                            let mut item_path = child_path(path, key);
                            item_path.push(index.to_string());
                            errors.extend(validate_schema_slots(item, validator, &item_path));
                        }
                    }
                    Value::Object(_) => {
                        let child = child_path(path, key);
                        errors.extend(validate_schema_slots(value, validator, &child));
                    }
                    _ => {}
                }
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let child = child_path(path, &index.to_string());
                errors.extend(validate_schema_slots(item, validator, &child));
            }
        }
        _ => {}
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> SlotValidator {
        SlotValidator::new(Arc::new(SlotRegistry::builtin().unwrap()), SimilarityMatcher::default())
    }

    fn slots(value: Value) -> BTreeMap<String, PropValue> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_builtin_slot_registry() {
        let registry = SlotRegistry::builtin().unwrap();
        assert_eq!(
            registry.type_names().collect::<Vec<_>>(),
            vec!["Card", "Layout", "Form", "List", "Dialog"]
        );
        let form = registry.lookup("Form").unwrap();
        assert!(form.get("fields").unwrap().validation.is_some());
    }

    #[test]
    fn test_unknown_component() {
        let errors = validator().validate_component_slots("Cards", &BTreeMap::new(), &[]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].slot_name, "");
        assert_eq!(errors[0].suggestions, Some(vec!["Card".to_string()]));
    }

    #[test]
    fn test_required_slot_missing_or_falsy() {
        let provided = slots(json!({ "title": "" }));
        let errors = validator().validate_component_slots("Dialog", &provided, &[]);
        let missing: Vec<_> = errors.iter().map(|e| e.slot_name.as_str()).collect();
        assert_eq!(missing, vec!["title", "content"]);
        assert_eq!(errors[1].path, vec!["content"]);
    }

    #[test]
    fn test_unknown_slot_suggestions() {
        let errors = validator().validate_component_slots(
            "Card",
            &slots(json!({ "content": { "type": "Text" }, "heade": { "type": "Text" } })),
            &["page".to_string()],
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Unknown slot \"heade\"");
        assert_eq!(errors[0].path, vec!["page", "heade"]);
        assert_eq!(errors[0].suggestions, Some(vec!["header".to_string()]));
    }

    #[test]
    fn test_form_fields_rules() {
        let v = validator();
        let provided = slots(json!({ "fields": [{ "type": "Input" }] }));
        assert!(v.validate_component_slots("Form", &provided, &[]).is_empty());

        let errors = v.validate_component_slots("Form", &slots(json!({ "fields": "name" })), &[]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Invalid type: expected \"array\"");
    }

    #[test]
    fn test_numeric_and_pattern_rules() {
        let registry = SlotRegistry::from_json_str(
            r#"{ "components": [ { "type": "Grid", "slots": [
                { "name": "columns", "type": "number", "validation": { "type": "number", "rules": [
                    { "type": "min", "value": 1 }, { "type": "max", "value": 12 } ] } },
                { "name": "area", "type": "string", "validation": { "type": "string", "rules": [
                    { "type": "required" }, { "type": "pattern", "value": "^[a-z]+$" } ] } }
            ] } ] }"#,
        )
        .unwrap();
        let v = SlotValidator::new(Arc::new(registry), SimilarityMatcher::default());

        let provided = slots(json!({ "columns": 13, "area": "Main" }));
        let errors = v.validate_component_slots("Grid", &provided, &[]);
        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["Value does not match pattern", "Value must be less than or equal to 12"]
        );

        let provided = slots(json!({ "columns": 0, "area": "" }));
        let errors = v.validate_component_slots("Grid", &provided, &[]);
        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Value is required",
                "Value does not match pattern",
                "Value must be greater than or equal to 1"
            ]
        );
    }

    #[test]
    fn test_unrecognized_rule_is_skipped() {
        let registry = SlotRegistry::from_json_str(
            r#"{ "components": [ { "type": "Input", "slots": [
                { "name": "label", "type": "string", "validation": { "type": "string", "rules": [
                    { "type": "maxLength", "value": 5 }, { "type": "required" } ] } } ] } ] }"#,
        )
        .unwrap();
        let rules = &registry.lookup("Input").unwrap().slots[0]
            .validation
            .as_ref()
            .unwrap()
            .rules;
        assert_eq!(rules, &vec![SlotRule::Unknown, SlotRule::Required]);

        let v = SlotValidator::new(Arc::new(registry), SimilarityMatcher::default());
        let long = slots(json!({ "label": "far longer than five" }));
        assert!(v.validate_component_slots("Input", &long, &[]).is_empty());

        let empty = slots(json!({ "label": "" }));
        let errors = v.validate_component_slots("Input", &empty, &[]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Value is required");
    }

    #[test]
    fn test_toml_slot_registry() {
        let registry = SlotRegistry::from_toml_str(
            r#"
            [[components]]
            type = "Tabs"

            [[components.slots]]
            name = "panes"
            type = "array"
            required = true

            [components.slots.validation]
            type = "array"
            rules = [{ type = "min", value = 1 }]
            "#,
        )
        .unwrap();

        let tabs = registry.lookup("Tabs").unwrap();
        assert!(tabs.get("panes").unwrap().required);
        assert_eq!(
            tabs.get("panes").unwrap().validation.as_ref().unwrap().rules,
            vec![SlotRule::Min { value: 1.0 }]
        );
    }

    #[test]
    fn test_invalid_pattern_rejected_at_load() {
        let result = SlotRegistry::from_json_str(
            r#"{ "components": [ { "type": "X", "slots": [
                { "name": "a", "type": "string", "validation": { "type": "string", "rules": [
                    { "type": "pattern", "value": "([" } ] } } ] } ] }"#,
        );
        assert!(matches!(result, Err(ValidatorError::InvalidPattern { .. })));
    }

    #[test]
    fn test_walk_document() {
        let document = json!({
            "type": "Page",
            "children": [
                {
                    "type": "JSSlot",
                    "componentName": "Card",
                    "slots": { "content": { "type": "Text" } }
                },
                { "type": "Layout", "props": {
                    "aside": { "type": "JSSlot", "componentName": "List", "slots": {} }
                } }
            ]
        });

        let errors = validate_schema_slots(&document, &validator(), &[]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].component_name, "List");
        assert_eq!(errors[0].slot_name, "item");
        assert_eq!(errors[0].path, vec!["children", "1", "props", "aside", "item"]);
    }
}

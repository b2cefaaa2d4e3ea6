//! Structural Validator
//!
//! Walks a component tree against the component registry. The walk never
//! stops early: every reachable problem is collected, except that a node of
//! unknown type is reported once and its own subtree is skipped.

use std::sync::Arc;
use std::time::Instant;

use crate::registry::{ComponentContract, ComponentRegistry};
use crate::result::{ErrorCode, NodeTrace, ValidationError};
use crate::schema::ComponentNode;
use crate::similarity::SimilarityMatcher;

/// What a single walk produced, before caching and timing are attached
#[derive(Debug, Clone, Default)]
pub struct WalkOutcome {
    pub errors: Vec<ValidationError>,
    pub nodes_checked: usize,
    /// Post-order node records; empty unless the walk ran in debug mode
    pub trace: Vec<NodeTrace>,
}

/// Per-walk mutable state
struct WalkContext {
    path: Vec<String>,
    nodes_checked: usize,
    trace: Vec<NodeTrace>,
    debug: bool,
}

/// Registry-driven tree checker
#[derive(Debug, Clone)]
pub struct StructuralValidator {
    registry: Arc<ComponentRegistry>,
    matcher: SimilarityMatcher,
}

impl StructuralValidator {
    pub fn new(registry: Arc<ComponentRegistry>, matcher: SimilarityMatcher) -> Self {
        Self { registry, matcher }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn matcher(&self) -> &SimilarityMatcher {
        &self.matcher
    }

    /// Validate a whole tree
    pub fn walk(&self, root: &ComponentNode, debug: bool) -> WalkOutcome {
        let mut ctx = WalkContext {
            path: Vec::new(),
            nodes_checked: 0,
            trace: Vec::new(),
            debug,
        };
        let errors = self.validate_node(root, &mut ctx);
        WalkOutcome {
            errors,
            nodes_checked: ctx.nodes_checked,
            trace: ctx.trace,
        }
    }

    fn validate_node(&self, node: &ComponentNode, ctx: &mut WalkContext) -> Vec<ValidationError> {
        let started = Instant::now();
        ctx.nodes_checked += 1;
        let mut errors = Vec::new();

        tracing::trace!(
            target: crate::LOG_RUNTIME,
            "Validating component {} at path {}",
            node.component_type,
            ctx.path.join(".")
        );

        let Some(contract) = self.registry.lookup(&node.component_type) else {
            let error = ValidationError::new(
                ErrorCode::UnknownComponent,
                ctx.path.clone(),
                &node.component_type,
                format!("Unknown component type: {}", node.component_type),
            )
            .with_suggestions(
                self.matcher
                    .suggest(&node.component_type, self.registry.type_names()),
            );
            tracing::debug!(target: crate::LOG_RUNTIME, "Component type error: {}", error);
            errors.push(error);
            return errors;
        };

        if node.is_slot() {
            let slot_errors = self.validate_slot(node, ctx);
            if !slot_errors.is_empty() {
                tracing::debug!(
                    target: crate::LOG_RUNTIME,
                    "Slot validation errors: {:?}",
                    slot_errors
                );
            }
            errors.extend(slot_errors);
        }

        for (index, child) in node.children.iter().enumerate() {
            ctx.path.push(format!("children[{}]", index));
            let child_errors = self.validate_node(child, ctx);
            errors.extend(child_errors);
            ctx.path.pop();
        }

        let prop_errors = self.validate_props(node, contract, ctx);
        if !prop_errors.is_empty() {
            tracing::debug!(
                target: crate::LOG_RUNTIME,
                "Property validation errors: {:?}",
                prop_errors
            );
        }
        errors.extend(prop_errors);

        if ctx.debug {
            ctx.trace.push(NodeTrace {
                component_type: node.component_type.clone(),
                path: ctx.path.clone(),
                duration_micros: started.elapsed().as_secs_f64() * 1_000_000.0,
                child_count: node.children.len(),
                errors: errors.clone(),
            });
        }

        errors
    }

    /// Name and content checks for slot nodes; independent of the host component
    fn validate_slot(&self, node: &ComponentNode, ctx: &WalkContext) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if node.name.as_deref().map_or(true, str::is_empty) {
            errors.push(ValidationError::new(
                ErrorCode::SlotMissingName,
                ctx.path.clone(),
                &node.component_type,
                "Slot must specify a name",
            ));
        }

        if node.children.is_empty() {
            errors.push(ValidationError::new(
                ErrorCode::SlotEmpty,
                ctx.path.clone(),
                &node.component_type,
                "Slot content cannot be empty",
            ));
        }

        errors
    }

    fn validate_props(
        &self,
        node: &ComponentNode,
        contract: &ComponentContract,
        ctx: &WalkContext,
    ) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for required in &contract.required {
            if !node.properties.contains_key(required) {
                errors.push(ValidationError::new(
                    ErrorCode::MissingProperty,
                    ctx.path.clone(),
                    &node.component_type,
                    format!("Missing required property: {}", required),
                ));
            }
        }

        for (key, value) in &node.properties {
            let mut path = ctx.path.clone();
            path.push(format!("properties.{}", key));

            let Some(declared) = contract.get_property(key) else {
                errors.push(
                    ValidationError::new(
                        ErrorCode::UnknownProperty,
                        path,
                        &node.component_type,
                        format!("Unknown property: {}", key),
                    )
                    .with_suggestions(self.matcher.suggest(key, contract.property_names())),
                );
                continue;
            };

            if !declared.value_type.matches(value) {
                errors.push(ValidationError::new(
                    ErrorCode::InvalidPropertyType,
                    path,
                    &node.component_type,
                    format!(
                        "Property type error: {} should be {}, got {}",
                        key,
                        declared.value_type,
                        value.kind_name()
                    ),
                ));
            }
        }

        errors
    }
}

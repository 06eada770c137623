//! Structural and schema-conformance validation of a [`GraphData`] payload.
//!
//! Never touches the database: the Validator only reasons about the in-memory
//! `Schema` and `GraphData`, so `validateGraphData` can run before a
//! connection is ever acquired.

use std::collections::HashSet;

use serde_json::Value as JsonValue;

use crate::data::{bag_endpoint, bag_id, GraphData, PropertyBag};
use crate::schema::{PropSpec, PropType, Schema};

/// The specific defect a [`ValError`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValErrorKind {
    UnknownType,
    MissingRequired,
    TypeMismatch,
    ConstraintViolation,
}

/// A single validation failure, scoped to one element of one type.
#[derive(Debug, Clone, PartialEq)]
pub struct ValError {
    pub kind: ValErrorKind,
    pub type_name: String,
    pub index: usize,
    pub property: Option<String>,
    pub message: String,
}

/// Result of running the Validator over a payload.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValError>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn merge(&mut self, other: ValidationReport) {
        if !other.valid {
            self.valid = false;
        }
        self.errors.extend(other.errors);
        for w in other.warnings {
            if !self.warnings.contains(&w) {
                self.warnings.push(w);
            }
        }
    }

    fn sort_and_dedup(&mut self) {
        self.errors.sort_by(|a, b| {
            (&a.type_name, a.index, &a.property).cmp(&(&b.type_name, b.index, &b.property))
        });
        self.warnings.sort();
        self.warnings.dedup();
    }
}

/// Inputs controlling how strictly a payload is checked.
#[derive(Debug, Clone, Copy)]
pub struct ValidationPolicy {
    pub validate_types: bool,
    pub validate_required: bool,
    pub allow_unknown_properties: bool,
    pub throw_on_error: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            validate_types: true,
            validate_required: true,
            allow_unknown_properties: true,
            throw_on_error: false,
        }
    }
}

/// Raised by [`Validator::validate_data`] when `policy.throw_on_error` is set
/// and the payload has at least one error.
#[derive(Debug, thiserror::Error)]
#[error("validation failed with {} error(s)", .0.errors.len())]
pub struct ValidationFailed(pub ValidationReport);

/// Validates `GraphData` payloads against a [`Schema`].
pub struct Validator<'s> {
    schema: &'s Schema,
    policy: ValidationPolicy,
}

impl<'s> Validator<'s> {
    pub fn new(schema: &'s Schema, policy: ValidationPolicy) -> Self {
        Self { schema, policy }
    }

    /// Validates a single vertex's properties against its declared type.
    pub fn validate_vertex(&self, type_name: &str, index: usize, props: &PropertyBag) -> ValidationReport {
        let Some(def) = self.schema.vertices.get(type_name) else {
            return error_report(ValError {
                kind: ValErrorKind::UnknownType,
                type_name: type_name.to_string(),
                index,
                property: None,
                message: format!("unknown vertex type '{type_name}'"),
            });
        };

        self.validate_against(type_name, index, props, &def.properties, &def.required)
    }

    /// Validates a single edge's properties, additionally requiring `from`/`to`.
    pub fn validate_edge(&self, type_name: &str, index: usize, props: &PropertyBag) -> ValidationReport {
        let Some(def) = self.schema.edges.get(type_name) else {
            return error_report(ValError {
                kind: ValErrorKind::UnknownType,
                type_name: type_name.to_string(),
                index,
                property: None,
                message: format!("unknown edge type '{type_name}'"),
            });
        };

        let mut required = def.required.clone();
        required.insert("from".to_string());
        required.insert("to".to_string());

        self.validate_against(type_name, index, props, &def.properties, &required)
    }

    fn validate_against(
        &self,
        type_name: &str,
        index: usize,
        props: &PropertyBag,
        declared: &indexmap::IndexMap<String, PropSpec>,
        required: &indexmap::IndexSet<String>,
    ) -> ValidationReport {
        let mut report = ValidationReport::ok();

        if self.policy.validate_required {
            for prop in required {
                if !props.contains_key(prop) {
                    report.valid = false;
                    report.errors.push(ValError {
                        kind: ValErrorKind::MissingRequired,
                        type_name: type_name.to_string(),
                        index,
                        property: Some(prop.clone()),
                        message: format!("missing required property '{prop}'"),
                    });
                }
            }
        }

        if self.policy.validate_types {
            for (prop, value) in props {
                let Some(spec) = declared.get(prop) else {
                    if !self.policy.allow_unknown_properties {
                        report.warnings.push(format!(
                            "UNKNOWN_PROPERTY: {type_name}[{index}].{prop}"
                        ));
                    }
                    continue;
                };

                if value.is_null() {
                    continue;
                }

                if !type_matches(spec.prop_type, value) {
                    report.valid = false;
                    report.errors.push(ValError {
                        kind: ValErrorKind::TypeMismatch,
                        type_name: type_name.to_string(),
                        index,
                        property: Some(prop.clone()),
                        message: format!(
                            "property '{prop}' expected {:?}, got {}",
                            spec.prop_type,
                            value
                        ),
                    });
                    continue;
                }

                if let Some(msg) = constraint_violation(spec, value) {
                    report.valid = false;
                    report.errors.push(ValError {
                        kind: ValErrorKind::ConstraintViolation,
                        type_name: type_name.to_string(),
                        index,
                        property: Some(prop.clone()),
                        message: msg,
                    });
                }
            }
        }

        report
    }

    /// Validates an entire payload: every vertex/edge element, plus the
    /// payload-wide duplicate-id and dangling-reference checks.
    pub fn validate_data(&self, data: &GraphData) -> Result<ValidationReport, ValidationFailed> {
        let mut report = ValidationReport::ok();

        let mut known_ids: HashSet<(&str, &str)> = HashSet::new();
        for (type_name, bags) in &data.vertices {
            let mut seen_ids: HashSet<&str> = HashSet::new();
            for (index, bag) in bags.iter().enumerate() {
                report.merge(self.validate_vertex(type_name, index, bag));
                if let Some(id) = bag_id(bag) {
                    if !seen_ids.insert(id) {
                        report
                            .warnings
                            .push(format!("DUPLICATE_ID: {type_name}[{id}]"));
                    }
                    known_ids.insert((type_name.as_str(), id));
                }
            }
        }

        for (type_name, bags) in &data.edges {
            for (index, bag) in bags.iter().enumerate() {
                report.merge(self.validate_edge(type_name, index, bag));

                if let Some((from_type, to_type)) = self.schema.endpoint_types_of(type_name) {
                    if let Some(from) = bag_endpoint(bag, "from") {
                        if !known_ids.contains(&(from_type, from)) {
                            report.warnings.push(format!(
                                "DANGLING_REFERENCE: {type_name}[{index}].from={from}"
                            ));
                        }
                    }
                    if let Some(to) = bag_endpoint(bag, "to") {
                        if !known_ids.contains(&(to_type, to)) {
                            report.warnings.push(format!(
                                "DANGLING_REFERENCE: {type_name}[{index}].to={to}"
                            ));
                        }
                    }
                }
            }
        }

        report.sort_and_dedup();

        if self.policy.throw_on_error && !report.valid {
            return Err(ValidationFailed(report));
        }

        Ok(report)
    }
}

fn error_report(err: ValError) -> ValidationReport {
    ValidationReport {
        valid: false,
        errors: vec![err],
        warnings: Vec::new(),
    }
}

fn type_matches(prop_type: PropType, value: &JsonValue) -> bool {
    match prop_type {
        PropType::String | PropType::Date => value.is_string(),
        PropType::Integer => value.as_i64().is_some() || value.as_u64().is_some(),
        PropType::Float => value.is_number(),
        PropType::Boolean => value.is_boolean(),
        PropType::Array => value.is_array(),
        PropType::Object => value.is_object(),
    }
}

fn constraint_violation(spec: &PropSpec, value: &JsonValue) -> Option<String> {
    if let Some(n) = value.as_f64() {
        if let Some(min) = spec.constraints.minimum {
            if n < min {
                return Some(format!("value {n} is below minimum {min}"));
            }
        }
        if let Some(max) = spec.constraints.maximum {
            if n > max {
                return Some(format!("value {n} is above maximum {max}"));
            }
        }
    }

    if let Some(format) = &spec.constraints.format {
        if let Some(s) = value.as_str() {
            let ok = match format.as_str() {
                "date" | "date-time" => chrono::DateTime::parse_from_rfc3339(s).is_ok()
                    || chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
                _ => true,
            };
            if !ok {
                return Some(format!("value '{s}' does not match format '{format}'"));
            }
        }
    }

    None
}

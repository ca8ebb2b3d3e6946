//! Preset schema validator
//!
//! Gates every parsed generation response against the fixed structural
//! contract: required fields at every level, enum-restricted group/priority,
//! positive numeric hours, bounded activity count, and no undeclared
//! properties anywhere (the generation backend likes to hallucinate extras).

use jsonschema::{Draft, JSONSchema};
use serde_json::{Value, json};
use tracing::debug;

/// Compiled preset contract; pure gate, no I/O
pub struct SchemaValidator {
    compiled: JSONSchema,
}

impl SchemaValidator {
    /// Compile the contract with the default 5-20 activity bounds
    pub fn new() -> Self {
        Self::with_bounds(5, 20)
    }

    /// Compile the contract with explicit activity count bounds
    pub fn with_bounds(min_activities: usize, max_activities: usize) -> Self {
        debug!(%min_activities, %max_activities, "SchemaValidator::with_bounds: called");
        let schema = preset_schema(min_activities, max_activities);
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema)
            .expect("embedded preset schema is valid");
        Self { compiled }
    }

    /// Validate a candidate preset; the error list is the side channel
    pub fn validate(&self, candidate: &Value) -> Result<(), Vec<String>> {
        debug!("SchemaValidator::validate: called");
        match self.compiled.validate(candidate) {
            Ok(()) => {
                debug!("SchemaValidator::validate: candidate is valid");
                Ok(())
            }
            Err(errors) => {
                let messages: Vec<String> = errors
                    .map(|e| {
                        let path = e.instance_path.to_string();
                        if path.is_empty() {
                            e.to_string()
                        } else {
                            format!("{}: {}", path, e)
                        }
                    })
                    .collect();
                debug!(error_count = %messages.len(), "SchemaValidator::validate: candidate is invalid");
                Err(messages)
            }
        }
    }

    /// Boolean form of the gate
    pub fn is_valid(&self, candidate: &Value) -> bool {
        self.compiled.is_valid(candidate)
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// The declared preset contract as a draft-7 schema
fn preset_schema(min_activities: usize, max_activities: usize) -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "additionalProperties": false,
        "required": [
            "name",
            "shortDescription",
            "description",
            "category",
            "activities",
            "reasoning",
            "confidence"
        ],
        "properties": {
            "name": { "type": "string", "minLength": 1 },
            "shortDescription": { "type": "string" },
            "description": { "type": "string" },
            "category": { "type": "string" },
            "activities": {
                "type": "array",
                "minItems": min_activities,
                "maxItems": max_activities,
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["title", "group", "estimatedHours", "priority"],
                    "properties": {
                        "title": { "type": "string", "minLength": 1 },
                        "group": {
                            "enum": ["analysis", "development", "test", "operations", "governance"]
                        },
                        "estimatedHours": { "type": "number", "exclusiveMinimum": 0 },
                        "priority": { "enum": ["core", "recommended", "optional"] },
                        "description": { "type": "string" },
                        "acceptanceCriteria": {
                            "type": "array",
                            "items": { "type": "string" }
                        },
                        "technicalDetail": {
                            "type": "object",
                            "additionalProperties": false,
                            "properties": {
                                "suggestedFiles": { "type": "array", "items": { "type": "string" } },
                                "suggestedCommands": { "type": "array", "items": { "type": "string" } },
                                "suggestedDependencies": { "type": "array", "items": { "type": "string" } }
                            }
                        },
                        "confidence": { "type": "number", "minimum": 0, "maximum": 1 }
                    }
                }
            },
            "driverDefaults": {
                "type": "object",
                "additionalProperties": { "type": "number" }
            },
            "riskDefaults": {
                "type": "array",
                "items": { "type": "string" }
            },
            "reasoning": { "type": "string" },
            "confidence": { "type": "number", "minimum": 0, "maximum": 1 }
        }
    })
}

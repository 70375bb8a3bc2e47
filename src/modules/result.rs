//! Module results in the shape Ansible expects on stdout.

use serde_json::{json, Map, Value};
use std::process::ExitCode;

use crate::error::ModuleError;

/// Result of one module invocation.
pub type ModuleResult = Result<ModuleOutcome, ModuleError>;

/// A successful module outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleOutcome {
    /// Whether the module changed (or in check mode would change) anything.
    pub changed: bool,
    /// Human readable status text.
    pub msg: Option<String>,
    /// Extra result keys.
    pub data: Map<String, Value>,
}

impl ModuleOutcome {
    /// An outcome reporting no change.
    #[must_use]
    pub fn unchanged() -> Self {
        Self::default()
    }

    /// An outcome with the given changed flag.
    #[must_use]
    pub fn with_changed(changed: bool) -> Self {
        Self {
            changed,
            ..Self::default()
        }
    }

    /// Sets the status text.
    #[must_use]
    pub fn with_msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = Some(msg.into());
        self
    }

    /// Adds a result key.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Returns a result key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

/// Renders a module result as the JSON document Ansible reads.
#[must_use]
pub fn to_ansible_json(result: &ModuleResult) -> Value {
    match result {
        Ok(outcome) => {
            let mut body = Map::new();
            body.insert("changed".to_string(), Value::Bool(outcome.changed));
            if let Some(msg) = &outcome.msg {
                body.insert("msg".to_string(), Value::String(msg.clone()));
            }
            for (key, value) in &outcome.data {
                body.insert(key.clone(), value.clone());
            }
            Value::Object(body)
        }
        Err(error) => json!({
            "failed": true,
            "changed": false,
            "msg": error.to_string(),
        }),
    }
}

/// Process exit code for a module result.
#[must_use]
pub fn exit_code(result: &ModuleResult) -> ExitCode {
    if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_document() {
        let result: ModuleResult = Ok(ModuleOutcome::with_changed(true)
            .with_msg("done")
            .with_data("vps_info", json!({"name": "vps1"})));

        assert_eq!(
            to_ansible_json(&result),
            json!({"changed": true, "msg": "done", "vps_info": {"name": "vps1"}})
        );
    }

    #[test]
    fn test_success_without_msg() {
        let result: ModuleResult = Ok(ModuleOutcome::unchanged());
        assert_eq!(to_ansible_json(&result), json!({"changed": false}));
    }

    #[test]
    fn test_failure_document() {
        let result: ModuleResult = Err(ModuleError::NotFound {
            service: "vps1.ovh.net".to_string(),
        });

        assert_eq!(
            to_ansible_json(&result),
            json!({
                "failed": true,
                "changed": false,
                "msg": "service vps1.ovh.net does not exist",
            })
        );
    }
}

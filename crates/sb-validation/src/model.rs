//! Validator framework: issues, context and composition.

use std::collections::BTreeMap;
use std::fmt;

use sb_capabilities::{CapabilityProvider, FrequencyBand};
use sb_core::Frequency;
use sb_model::{ArrayAssembly, CspConfiguration, TelescopeType, Target};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationIssueLevel {
    Error,
    Warning,
}

/// A single finding against the input.
///
/// `field` is a dotted path into the validated entity (`targets.0`,
/// `csp_configurations.1.lowcbf.correlation_spws.0`). Issues are only ever
/// re-addressed by prepending a prefix as they bubble up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub level: ValidationIssueLevel,
}

impl ValidationIssue {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
            level: ValidationIssueLevel::Error,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
            level: ValidationIssueLevel::Warning,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn prefixed(mut self, prefix: Option<&str>) -> Self {
        self.field = join_path(prefix, self.field.as_deref());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == ValidationIssueLevel::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            ValidationIssueLevel::Error => "error",
            ValidationIssueLevel::Warning => "warning",
        };
        match &self.field {
            Some(field) => write!(f, "{level} [{field}]: {}", self.message),
            None => write!(f, "{level}: {}", self.message),
        }
    }
}

/// Compose a field path: `p` + `x` is `p.x`, `p` + nothing is `p`.
/// An empty prefix leaves the field unchanged.
pub fn join_path(prefix: Option<&str>, field: Option<&str>) -> Option<String> {
    match (prefix.filter(|p| !p.is_empty()), field) {
        (None, field) => field.map(str::to_string),
        (Some(prefix), None) => Some(prefix.to_string()),
        (Some(prefix), Some(field)) => Some(format!("{prefix}.{field}")),
    }
}

/// Auxiliary references a validator may need besides its primary entity.
#[derive(Debug, Clone, Copy)]
pub enum ContextValue<'a> {
    Target(&'a Target),
    Targets(&'a [Target]),
    CspConfiguration(&'a CspConfiguration),
    CspConfigurations(&'a [CspConfiguration]),
    Band(&'a FrequencyBand),
    Frequency(Frequency),
}

/// Everything a validator sees.
pub struct ValidationContext<'a, T> {
    pub primary_entity: &'a T,
    pub telescope: Option<TelescopeType>,
    pub array_assembly: ArrayAssembly,
    pub relevant_context: BTreeMap<&'static str, ContextValue<'a>>,
    /// Path of the primary entity within the enclosing document.
    pub source_jsonpath: Option<String>,
    pub capabilities: &'a dyn CapabilityProvider,
}

impl<T> Clone for ValidationContext<'_, T> {
    fn clone(&self) -> Self {
        Self {
            primary_entity: self.primary_entity,
            telescope: self.telescope,
            array_assembly: self.array_assembly,
            relevant_context: self.relevant_context.clone(),
            source_jsonpath: self.source_jsonpath.clone(),
            capabilities: self.capabilities,
        }
    }
}

impl<'a, T> ValidationContext<'a, T> {
    pub fn new(primary_entity: &'a T, capabilities: &'a dyn CapabilityProvider) -> Self {
        Self {
            primary_entity,
            telescope: None,
            array_assembly: ArrayAssembly::default(),
            relevant_context: BTreeMap::new(),
            source_jsonpath: None,
            capabilities,
        }
    }

    pub fn with_telescope(mut self, telescope: TelescopeType) -> Self {
        self.telescope = Some(telescope);
        self
    }

    pub fn with_array_assembly(mut self, array_assembly: ArrayAssembly) -> Self {
        self.array_assembly = array_assembly;
        self
    }

    pub fn with_context(mut self, key: &'static str, value: ContextValue<'a>) -> Self {
        self.relevant_context.insert(key, value);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source_jsonpath = Some(source.into());
        self
    }

    /// Context for a nested entity: same telescope, assembly and provider,
    /// no relevant context, no source.
    pub fn child<'b, U>(&self, entity: &'b U) -> ValidationContext<'b, U>
    where
        'a: 'b,
    {
        ValidationContext {
            primary_entity: entity,
            telescope: self.telescope,
            array_assembly: self.array_assembly,
            relevant_context: BTreeMap::new(),
            source_jsonpath: None,
            capabilities: self.capabilities,
        }
    }

    pub fn telescope(&self) -> EngineResult<TelescopeType> {
        self.telescope.ok_or(EngineError::MissingTelescope)
    }

    fn without_source(&self) -> Self {
        let mut inner = self.clone();
        inner.source_jsonpath = None;
        inner
    }

    fn context_value(&self, key: &'static str) -> EngineResult<ContextValue<'a>> {
        self.relevant_context
            .get(key)
            .copied()
            .ok_or_else(|| EngineError::MissingRelevantContext { missing: vec![key] })
    }

    pub fn target(&self, key: &'static str) -> EngineResult<&'a Target> {
        match self.context_value(key)? {
            ContextValue::Target(target) => Ok(target),
            _ => Err(unexpected(key, "target")),
        }
    }

    pub fn targets(&self, key: &'static str) -> EngineResult<&'a [Target]> {
        match self.context_value(key)? {
            ContextValue::Targets(targets) => Ok(targets),
            _ => Err(unexpected(key, "list of targets")),
        }
    }

    pub fn csp_configuration(&self, key: &'static str) -> EngineResult<&'a CspConfiguration> {
        match self.context_value(key)? {
            ContextValue::CspConfiguration(config) => Ok(config),
            _ => Err(unexpected(key, "CSP configuration")),
        }
    }

    pub fn csp_configurations(&self, key: &'static str) -> EngineResult<&'a [CspConfiguration]> {
        match self.context_value(key)? {
            ContextValue::CspConfigurations(configs) => Ok(configs),
            _ => Err(unexpected(key, "list of CSP configurations")),
        }
    }

    pub fn band(&self, key: &'static str) -> EngineResult<&'a FrequencyBand> {
        match self.context_value(key)? {
            ContextValue::Band(band) => Ok(band),
            _ => Err(unexpected(key, "frequency band")),
        }
    }

    pub fn frequency(&self, key: &'static str) -> EngineResult<Frequency> {
        match self.context_value(key)? {
            ContextValue::Frequency(frequency) => Ok(frequency),
            _ => Err(unexpected(key, "frequency")),
        }
    }
}

fn unexpected(key: &'static str, expected: &'static str) -> EngineError {
    EngineError::UnexpectedContextValue { key, expected }
}

/// A validator: pure function from a context to zero or more issues.
pub type Validator<T> =
    for<'a, 'b> fn(&'b ValidationContext<'a, T>) -> EngineResult<Vec<ValidationIssue>>;

/// Apply every validator to `context` and concatenate the results in order.
///
/// Validators see the context with its source path cleared; the source path
/// is prepended to every returned field afterwards.
pub fn validate<T>(
    context: &ValidationContext<'_, T>,
    validators: &[Validator<T>],
) -> EngineResult<Vec<ValidationIssue>> {
    let inner = context.without_source();
    let mut issues = Vec::new();
    for validator in validators {
        issues.extend(validator(&inner)?);
    }
    Ok(prefix_issues(context.source_jsonpath.as_deref(), issues))
}

pub fn prefix_issues(prefix: Option<&str>, issues: Vec<ValidationIssue>) -> Vec<ValidationIssue> {
    issues
        .into_iter()
        .map(|issue| issue.prefixed(prefix))
        .collect()
}

/// Fail with every key of `keys` absent from the context's relevant context.
pub fn check_relevant_context_contains<T>(
    keys: &[&'static str],
    context: &ValidationContext<'_, T>,
) -> EngineResult<()> {
    let missing: Vec<&'static str> = keys
        .iter()
        .copied()
        .filter(|key| !context.relevant_context.contains_key(key))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(EngineError::MissingRelevantContext { missing })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn segment() -> impl Strategy<Value = String> {
        "[a-z_]{1,8}|[0-9]{1,2}"
    }

    proptest! {
        #[test]
        fn prefixing_is_associative(
            a in segment(),
            b in segment(),
            x in proptest::option::of(segment()),
        ) {
            // prefix a after prefix b == prefix "a.b"
            let issue = ValidationIssue { message: String::new(), field: x, level: ValidationIssueLevel::Error };
            let stepwise = issue.clone().prefixed(Some(b.as_str())).prefixed(Some(a.as_str()));
            let combined = issue.prefixed(Some(format!("{a}.{b}").as_str()));
            prop_assert_eq!(stepwise.field, combined.field);
        }
    }
}

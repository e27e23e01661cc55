//! Two-pass variable resolution
//!
//! Pass 1 resolves workflow variables against the process environment:
//! a value matching `{{NAME}}` anywhere is replaced wholesale by the value
//! of the `NAME` environment variable. Pass 2 interpolates `${name}`
//! placeholders in command text from the resolved variable map.
//!
//! Both passes run once per run, before any concurrent execution, so the
//! resolved map is an immutable snapshot by the time tasks read it.

use regex::Regex;
use std::collections::HashMap;

/// Matches an environment reference anywhere inside a variable value.
/// A partial match still replaces the entire value, discarding surrounding
/// literal text; this mirrors the behavior of existing workflow files.
const ENV_REF: &str = r"\{\{([^}]+)\}\}";

/// Matches a `${name}` variable reference in command text.
const VAR_REF: &str = r"\$\{([^}]+)\}";

/// Resolves workflow variables and interpolates command text
pub struct VariableResolver {
    env_re: Regex,
    var_re: Regex,
}

/// Immutable snapshot of the variable map after environment resolution
///
/// Variables whose environment reference could not be resolved keep their
/// declared value and carry an error; the error only surfaces on tasks
/// whose command actually references the variable.
#[derive(Debug, Clone, Default)]
pub struct ResolvedVariables {
    values: HashMap<String, String>,
    env_errors: HashMap<String, String>,
}

impl ResolvedVariables {
    /// Environment-resolution errors from pass 1, keyed by variable
    pub fn env_errors(&self) -> &HashMap<String, String> {
        &self.env_errors
    }
}

impl Default for VariableResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableResolver {
    pub fn new() -> Self {
        Self {
            env_re: Regex::new(ENV_REF).unwrap(),
            var_re: Regex::new(VAR_REF).unwrap(),
        }
    }

    /// Pass 1: resolve declared variable values against the process
    /// environment
    pub fn resolve_variables(&self, declared: &HashMap<String, String>) -> ResolvedVariables {
        self.resolve_variables_from(declared, |name| std::env::var(name).ok())
    }

    fn resolve_variables_from(
        &self,
        declared: &HashMap<String, String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ResolvedVariables {
        let mut resolved = ResolvedVariables::default();

        for (key, value) in declared {
            let Some(caps) = self.env_re.captures(value) else {
                resolved.values.insert(key.clone(), value.clone());
                continue;
            };

            match lookup(&caps[1]) {
                Some(env_value) if !env_value.trim().is_empty() => {
                    resolved.values.insert(key.clone(), env_value);
                }
                _ => {
                    resolved.env_errors.insert(
                        key.clone(),
                        format!("could not retrieve environment variable {}", &caps[0]),
                    );
                    resolved.values.insert(key.clone(), value.clone());
                }
            }
        }

        resolved
    }

    /// Pass 2: interpolate `${name}` placeholders in a command
    ///
    /// Every occurrence of a resolvable placeholder is replaced with the
    /// variable's value. Unresolvable references accumulate errors: a
    /// missing variable, or one whose environment reference failed in
    /// pass 1. Any error means the command must not be executed.
    pub fn resolve_command(
        &self,
        raw: &str,
        vars: &ResolvedVariables,
    ) -> Result<String, Vec<String>> {
        let mut errors = Vec::new();
        let mut resolved = raw.to_string();

        for caps in self.var_re.captures_iter(raw) {
            let name = &caps[1];
            let placeholder = &caps[0];

            if let Some(env_error) = vars.env_errors.get(name) {
                errors.push(env_error.clone());
            } else if let Some(value) = vars.values.get(name) {
                resolved = resolved.replace(placeholder, value);
            } else {
                errors.push(format!("could not retrieve variable {}", placeholder));
            }
        }

        if errors.is_empty() {
            Ok(resolved)
        } else {
            Err(errors)
        }
    }
}

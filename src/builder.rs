use crate::environment::Environment;
use crate::error::ConfigError;
use crate::field::FieldDescriptor;
use crate::value::EnvValue;
use crate::EnvConfig;
use std::fmt::Display;

/// Join a namespace and an external name into an environment key
///
/// An empty namespace leaves the name as is. Keys are upper-cased.
pub fn join_key(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_uppercase()
    } else {
        format!("{}_{}", namespace, name).to_uppercase()
    }
}

/// Walks a configuration struct's fields, reading values and collecting errors
///
/// Used by `#[derive(EnvConfig)]` generated code. Every field is visited even
/// after a failure so that all problems are reported at once.
pub struct Resolver<'a> {
    env: &'a Environment,
    namespace: String,
    errors: Vec<ConfigError>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver reading from `env` with `prefix` as the top-level namespace
    pub fn new(env: &'a Environment, prefix: &str) -> Self {
        Self {
            env,
            namespace: prefix.trim_end_matches('_').to_uppercase(),
            errors: Vec::new(),
        }
    }

    /// The namespace keys are currently resolved under
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The primary key for a field in the current namespace
    pub fn key_for(&self, field: &FieldDescriptor) -> String {
        join_key(&self.namespace, field.env)
    }

    /// Find the raw value for a field
    ///
    /// Falls back to the bare external name when the namespaced key is absent
    /// and the name was given explicitly.
    fn lookup(&self, field: &FieldDescriptor) -> (String, Option<&'a str>) {
        let env = self.env;
        let key = self.key_for(field);
        if let Some(value) = env.get(&key) {
            return (key, Some(value));
        }
        if field.explicit && !self.namespace.is_empty() {
            let bare = field.env.to_uppercase();
            if let Some(value) = env.get(&bare) {
                return (bare, Some(value));
            }
        }
        (key, None)
    }

    fn resolve_with<T, E, P, F>(&mut self, field: &FieldDescriptor, parse: P, fallback: F) -> Option<T>
    where
        E: Display,
        P: Fn(&str) -> Result<T, E>,
        F: FnOnce() -> Option<T>,
    {
        let (key, raw) = self.lookup(field);
        let raw = match (raw, field.default) {
            (Some(raw), _) => raw,
            (None, Some(default)) => default,
            (None, None) if field.required => {
                self.errors.push(ConfigError::MissingEnvVar {
                    key,
                    description: field.description.to_string(),
                });
                return None;
            }
            (None, None) => return fallback(),
        };

        match parse(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                self.errors.push(ConfigError::InvalidValue {
                    key,
                    value: raw.to_string(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    /// Load a field that is required or has a default
    pub fn value<T: EnvValue>(&mut self, field: &FieldDescriptor) -> Option<T> {
        self.resolve_with(field, T::parse_env, || None)
    }

    /// Load an optional field, falling back to `T::default()` when missing
    pub fn value_or_default<T: EnvValue + Default>(&mut self, field: &FieldDescriptor) -> Option<T> {
        self.resolve_with(field, T::parse_env, || Some(T::default()))
    }

    /// Load a field with a custom parser
    pub fn value_with<T, E: Display>(
        &mut self,
        field: &FieldDescriptor,
        parse: fn(&str) -> Result<T, E>,
    ) -> Option<T> {
        self.resolve_with(field, parse, || None)
    }

    /// Load an optional field with a custom parser, falling back to `T::default()`
    pub fn value_with_or_default<T: Default, E: Display>(
        &mut self,
        field: &FieldDescriptor,
        parse: fn(&str) -> Result<T, E>,
    ) -> Option<T> {
        self.resolve_with(field, parse, || Some(T::default()))
    }

    /// Load a nested configuration struct
    ///
    /// A field with an explicit external name opens a namespace of its own
    /// (`NAMESPACE_NAME`); otherwise the nested struct shares this namespace.
    pub fn nested<T: EnvConfig>(&mut self, field: &FieldDescriptor) -> Option<T> {
        let inner = if field.explicit && !field.env.is_empty() {
            self.key_for(field)
        } else {
            self.namespace.clone()
        };

        let outer = std::mem::replace(&mut self.namespace, inner);
        let value = T::resolve(self);
        self.namespace = outer;
        value
    }

    pub fn errors(&self) -> &[ConfigError] {
        &self.errors
    }

    /// Finish resolving and return the value, or every error that was collected
    pub fn finish<T>(self, value: Option<T>) -> Result<T, Vec<ConfigError>> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(self.errors),
        }
    }
}

use crate::builder::join_key;
use crate::field::TypeDescriptor;
use crate::EnvConfig;
use std::{fs, path::Path};

/// Environment key a configuration struct reads, with its field metadata
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct KeySpec {
    /// Fully resolved environment key
    pub key: String,
    /// Dotted path of Rust field names leading to this value
    pub path: String,
    pub description: String,
    pub required: bool,
    pub default: Option<String>,
    pub secret: bool,
}

/// List every environment key `T` reads under `prefix`
///
/// Keys follow the same naming rules as loading, so this can be used to
/// document or validate a deployment's environment.
pub fn env_keys<T: EnvConfig>(prefix: &str) -> Vec<KeySpec> {
    let mut keys = Vec::new();
    collect_keys(
        T::descriptor(),
        &prefix.trim_end_matches('_').to_uppercase(),
        "",
        &mut keys,
    );
    keys
}

fn collect_keys(descriptor: &TypeDescriptor, namespace: &str, path: &str, keys: &mut Vec<KeySpec>) {
    for field in descriptor.fields {
        let field_path = if path.is_empty() {
            field.field.to_string()
        } else {
            format!("{}.{}", path, field.field)
        };

        match field.nested {
            Some(nested) => {
                let inner = if field.explicit && !field.env.is_empty() {
                    join_key(namespace, field.env)
                } else {
                    namespace.to_string()
                };
                collect_keys(nested(), &inner, &field_path, keys);
            }
            None => keys.push(KeySpec {
                key: join_key(namespace, field.env),
                path: field_path,
                description: field.description.to_string(),
                required: field.required,
                default: field.default.map(str::to_string),
                secret: field.secret,
            }),
        }
    }
}

/// Write a markdown table of the keys `T` reads to `path`
pub fn write_docs<T: EnvConfig>(prefix: &str, path: impl AsRef<Path>) -> std::io::Result<()> {
    fs::write(path, render_docs(&env_keys::<T>(prefix)))
}

fn render_docs(keys: &[KeySpec]) -> String {
    let mut md = String::new();

    md.push_str("## Environment Variables Summary\n\n");
    md.push_str("| Variable | Required | Description | Default |\n");
    md.push_str("|----------|----------|-------------|---------|\n");
    for key in keys {
        let required_str = if key.required { "Yes" } else { "No" };
        let default_display = key.default.as_deref().unwrap_or("-");
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            key.key, required_str, key.description, default_display
        ));
    }

    md
}

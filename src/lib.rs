// Lets the derive macro's `::envstruct` paths resolve inside this crate
extern crate self as envstruct;

pub mod builder;
pub mod docs;
pub mod dotenv;
pub mod environment;
pub mod error;
pub mod field;
pub mod loader;
pub mod print;
pub mod value;

// Re-export main types
pub use builder::Resolver;
pub use docs::{env_keys, write_docs, KeySpec};
pub use dotenv::MergeReport;
pub use environment::Environment;
pub use error::{format_config_errors, ConfigError};
pub use field::{FieldDescriptor, TypeDescriptor};
pub use loader::{load, load_with_env, FailurePolicy, LoadOptions};
pub use print::{print_config, write_config, Node};
pub use value::EnvValue;

// Re-export macro
pub use envstruct_macros::EnvConfig;

/// A struct that can be populated from environment variables
///
/// Implement with `#[derive(EnvConfig)]`; each field is annotated with
/// `#[field(...)]`:
///
/// - `env = "NAME"`: external name, defaults to the upper-cased field name
/// - `required`: fail the load when missing and no default is given
/// - `default = "value"`: textual default, parsed like an environment value
/// - `nested`: the field is itself an `EnvConfig` struct
/// - `secret`: mask the value in diagnostic output
/// - `parse_with = path`: parse with `fn(&str) -> Result<T, E>`; the field is
///   printed with its `Debug` output, so `T` must implement `Debug`
/// - `doc = "text"`: description, defaults to the field's doc comment
/// - `skip`: never loaded, always `Default::default()`
pub trait EnvConfig: Sized {
    /// Static field table for this type
    fn descriptor() -> &'static TypeDescriptor;

    /// Read every field through `resolver`
    ///
    /// Returns `None` if any field failed; the errors are held by the resolver.
    fn resolve(resolver: &mut Resolver<'_>) -> Option<Self>;

    /// Printable view of the loaded value
    fn to_node(&self) -> Node;
}

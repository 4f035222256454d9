use crate::builder::Resolver;
use crate::dotenv;
use crate::environment::Environment;
use crate::error::{format_config_errors, ConfigError};
use crate::print::print_config;
use crate::EnvConfig;
use std::path::PathBuf;

/// What to do when a configuration struct fails to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Return every error to the caller
    #[default]
    ReturnError,
    /// Panic with a summary of every error
    FailFast,
}

/// Options for a single load
///
/// # Example
/// ```rust
/// use envstruct::{EnvConfig, LoadOptions};
///
/// #[derive(EnvConfig, Debug)]
/// struct Config {
///     #[field(env = "PORT", default = "8080")]
///     port: u16,
/// }
///
/// let config: Config = LoadOptions::new()
///     .add_file(".env")
///     .with_prefix("APP")
///     .load()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    files: Vec<PathBuf>,
    prefix: String,
    print_config: bool,
    export: bool,
    policy: FailurePolicy,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a definition file; adding the same path twice has no effect
    pub fn add_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if !self.files.contains(&path) {
            self.files.push(path);
        }
        self
    }

    /// Merge several definition files
    pub fn add_files<I, P>(self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        paths.into_iter().fold(self, |opts, path| opts.add_file(path))
    }

    /// Namespace prepended to top-level keys, e.g. `APP` reads `APP_PORT`
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Print the loaded configuration to standard output
    pub fn with_print_config(mut self) -> Self {
        self.print_config = true;
        self
    }

    /// Also export merged definition-file values into the process environment
    ///
    /// Nothing is exported when the load fails.
    pub fn with_export(mut self) -> Self {
        self.export = true;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Shorthand for `with_policy(FailurePolicy::FailFast)`
    pub fn fail_fast(self) -> Self {
        self.with_policy(FailurePolicy::FailFast)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Load `T` from the process environment and the configured files
    pub fn load<T: EnvConfig>(&self) -> Result<T, Vec<ConfigError>> {
        load(self)
    }

    /// Load `T` from `env` and the configured files, ignoring the process environment
    pub fn load_with_env<T: EnvConfig>(&self, env: Environment) -> Result<T, Vec<ConfigError>> {
        load_with_env(env, self)
    }
}

/// Load `T` from a snapshot of the process environment and `options`' files
pub fn load<T: EnvConfig>(options: &LoadOptions) -> Result<T, Vec<ConfigError>> {
    load_with_env(Environment::from_process(), options)
}

/// Load `T` from `env` merged with `options`' files
///
/// Definition files never overwrite keys already in `env`. With
/// [`FailurePolicy::FailFast`] this panics instead of returning errors.
pub fn load_with_env<T: EnvConfig>(
    mut env: Environment,
    options: &LoadOptions,
) -> Result<T, Vec<ConfigError>> {
    let report = dotenv::merge_files(&mut env, &options.files);
    tracing::debug!(
        loaded = report.loaded.len(),
        skipped = report.skipped.len(),
        added = report.added,
        total = env.len(),
        "Merged definition files"
    );

    let mut resolver = Resolver::new(&env, &options.prefix);
    let value = T::resolve(&mut resolver);

    match resolver.finish(value) {
        Ok(config) => {
            tracing::debug!(config = T::descriptor().name, "Configuration loaded");
            if options.export {
                let exported = env.export_missing();
                tracing::debug!(
                    exported,
                    "Exported definition-file values to process environment"
                );
            }
            if options.print_config {
                print_config(&config);
            }
            Ok(config)
        }
        Err(errors) => match options.policy {
            FailurePolicy::ReturnError => Err(errors),
            FailurePolicy::FailFast => panic!("{}", format_config_errors(&errors)),
        },
    }
}

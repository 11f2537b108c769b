//! Compiler configuration.
//!
//! Controls the names of the generated root types and the limits applied to
//! the executable schema. Can be embedded in a larger toml file under a
//! `[schema]` section or loaded on its own.
//!
//! # Example Configuration
//!
//! ```toml
//! query_type_name = "Query"
//! mutation_type_name = "Mutation"
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! ```

use serde::{Deserialize, Serialize};

/// Schema compiler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Name of the generated query root type.
    /// Default: "Query"
    #[serde(default = "default_query_type_name")]
    pub query_type_name: String,

    /// Name of the generated mutation root type.
    /// Default: "Mutation"
    #[serde(default = "default_mutation_type_name")]
    pub mutation_type_name: String,

    /// Maximum query depth accepted by the executable schema.
    /// Default: 15
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum query complexity accepted by the executable schema.
    /// Default: 500
    #[serde(default = "default_max_complexity")]
    pub max_complexity: usize,

    /// Enable introspection queries on the executable schema.
    /// Default: true
    #[serde(default = "default_introspection")]
    pub introspection: bool,
}

fn default_query_type_name() -> String {
    "Query".into()
}

fn default_mutation_type_name() -> String {
    "Mutation".into()
}

fn default_max_depth() -> usize {
    15
}

fn default_max_complexity() -> usize {
    500
}

fn default_introspection() -> bool {
    true
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            query_type_name: default_query_type_name(),
            mutation_type_name: default_mutation_type_name(),
            max_depth: default_max_depth(),
            max_complexity: default_max_complexity(),
            introspection: default_introspection(),
        }
    }
}

impl CompilerConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration values are invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.query_type_name.trim().is_empty() {
            return Err("schema.query_type_name must not be empty".into());
        }
        if self.mutation_type_name.trim().is_empty() {
            return Err("schema.mutation_type_name must not be empty".into());
        }
        if self.query_type_name == self.mutation_type_name {
            return Err("schema.query_type_name and schema.mutation_type_name must differ".into());
        }
        if self.max_depth == 0 {
            return Err("schema.max_depth must be > 0".into());
        }
        if self.max_complexity == 0 {
            return Err("schema.max_complexity must be > 0".into());
        }
        Ok(())
    }

    /// Parses and validates a configuration from toml.
    ///
    /// # Errors
    ///
    /// Returns an error if the toml is malformed or the values are invalid.
    pub fn from_toml_str(input: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(input).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }
}

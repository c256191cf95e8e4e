//! Expected shape of bundle configuration.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

/// Shape a configuration value is normalized against.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// Accepts any value unchanged
    Any,
    Bool,
    Int,
    Float,
    String,
    /// Sequence whose items all follow the inner schema
    Sequence(Box<Schema>),
    /// Mapping with arbitrary keys whose values follow the inner schema
    Map(Box<Schema>),
    /// Mapping with a fixed set of known keys
    Struct(IndexMap<String, Schema>),
}

impl Schema {
    pub fn sequence(item: Schema) -> Self {
        Schema::Sequence(Box::new(item))
    }

    pub fn map(value: Schema) -> Self {
        Schema::Map(Box::new(value))
    }

    pub fn structure<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Schema::Struct(fields.into_iter().map(|(k, s)| (k.into(), s)).collect())
    }

    /// Name of the value kind this schema expects, as used in diagnostics.
    pub fn expected(&self) -> &'static str {
        match self {
            Schema::Any => "any",
            Schema::Bool => "bool",
            Schema::Int => "int",
            Schema::Float => "float",
            Schema::String => "string",
            Schema::Sequence(_) => "sequence",
            Schema::Map(_) | Schema::Struct(_) => "map",
        }
    }
}

static BUNDLE_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    let strings = || Schema::sequence(Schema::String);

    Schema::structure([
        (
            "bundle",
            Schema::structure([
                ("name", Schema::String),
                ("target", Schema::String),
                ("cluster_id", Schema::String),
                ("compute_id", Schema::String),
                ("databricks_cli_version", Schema::String),
                ("uuid", Schema::String),
                ("git", Schema::map(Schema::Any)),
                ("deployment", Schema::map(Schema::Any)),
            ]),
        ),
        ("include", strings()),
        ("variables", Schema::map(Schema::Any)),
        ("workspace", Schema::map(Schema::Any)),
        ("artifacts", Schema::map(Schema::map(Schema::Any))),
        // resource type -> resource key -> properties
        (
            "resources",
            Schema::map(Schema::map(Schema::map(Schema::Any))),
        ),
        ("targets", Schema::map(Schema::Any)),
        (
            "experimental",
            Schema::structure([
                (
                    "pydabs",
                    Schema::structure([
                        ("enabled", Schema::Bool),
                        ("venv_path", Schema::String),
                        ("import", strings()),
                    ]),
                ),
                ("python_wheel_wrapper", Schema::Bool),
                ("scripts", Schema::map(Schema::String)),
                ("use_legacy_run_as", Schema::Bool),
            ]),
        ),
        (
            "sync",
            Schema::structure([
                ("include", strings()),
                ("exclude", strings()),
                ("paths", strings()),
            ]),
        ),
        ("permissions", Schema::sequence(Schema::map(Schema::Any))),
        (
            "run_as",
            Schema::structure([
                ("user_name", Schema::String),
                ("service_principal_name", Schema::String),
            ]),
        ),
        ("presets", Schema::map(Schema::Any)),
    ])
});

/// Schema of a whole bundle configuration tree.
///
/// Individual resources are not described beyond being mappings.
pub fn bundle_schema() -> &'static Schema {
    &BUNDLE_SCHEMA
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_schema_sections() {
        let Schema::Struct(fields) = bundle_schema() else {
            panic!("root schema must be a struct");
        };
        for section in ["bundle", "include", "resources", "experimental", "targets"] {
            assert!(fields.contains_key(section), "missing {section}");
        }
        assert_eq!(
            fields["resources"],
            Schema::map(Schema::map(Schema::map(Schema::Any)))
        );
    }

    #[test]
    fn test_expected() {
        assert_eq!(Schema::structure([("a", Schema::Int)]).expected(), "map");
        assert_eq!(Schema::map(Schema::Int).expected(), "map");
        assert_eq!(Schema::sequence(Schema::Int).expected(), "sequence");
        assert_eq!(Schema::Float.expected(), "float");
    }
}

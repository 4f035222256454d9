/// Static description of one field of a configuration struct
///
/// Generated by `#[derive(EnvConfig)]`; one table per struct type, built at
/// compile time.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Rust field name
    pub field: &'static str,
    /// External name used for lookup and display
    pub env: &'static str,
    /// Whether `env` was given explicitly rather than derived from the field name
    pub explicit: bool,
    /// Human-readable description of what this config does
    pub description: &'static str,
    /// Textual default, converted like an environment value
    pub default: Option<&'static str>,
    /// Whether a missing value without a default fails the load
    pub required: bool,
    /// Whether the value is masked in diagnostic output
    pub secret: bool,
    /// Descriptor of the nested struct, if this field is one
    pub nested: Option<fn() -> &'static TypeDescriptor>,
}

impl FieldDescriptor {
    /// A plain value field with its external name derived or given
    pub const fn leaf(field: &'static str, env: &'static str) -> Self {
        Self {
            field,
            env,
            explicit: true,
            description: "",
            default: None,
            required: false,
            secret: false,
            nested: None,
        }
    }

    pub fn is_nested(&self) -> bool {
        self.nested.is_some()
    }
}

/// Static description of a configuration struct
#[derive(Debug)]
pub struct TypeDescriptor {
    /// Struct name, used as the header in diagnostic output
    pub name: &'static str,
    pub fields: &'static [FieldDescriptor],
}

impl TypeDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.field == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static INNER_FIELDS: [FieldDescriptor; 1] = [FieldDescriptor::leaf("address", "ADDRESS")];
    static INNER: TypeDescriptor = TypeDescriptor {
        name: "Inner",
        fields: &INNER_FIELDS,
    };

    fn inner() -> &'static TypeDescriptor {
        &INNER
    }

    #[test]
    fn test_leaf_defaults() {
        let field = FieldDescriptor::leaf("port", "PORT");

        assert_eq!(field.field, "port");
        assert_eq!(field.env, "PORT");
        assert!(field.explicit);
        assert!(!field.required);
        assert!(!field.secret);
        assert_eq!(field.default, None);
        assert!(!field.is_nested());
    }

    #[test]
    fn test_nested_reference() {
        let field = FieldDescriptor {
            nested: Some(inner),
            ..FieldDescriptor::leaf("redis", "DB_REDIS")
        };

        assert!(field.is_nested());
        let nested = (field.nested.unwrap())();
        assert_eq!(nested.name, "Inner");
        assert_eq!(nested.field("address").map(|f| f.env), Some("ADDRESS"));
        assert!(nested.field("missing").is_none());
    }
}

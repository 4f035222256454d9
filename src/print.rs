//! Diagnostic dump of a loaded configuration.

use crate::field::FieldDescriptor;
use crate::EnvConfig;
use std::io::{self, Write};

const SEPARATOR: &str = "--------------------------------";
const MASK: &str = "******";

/// Printable view of a configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A struct with its type name and `(external name, value)` pairs
    Struct {
        name: &'static str,
        fields: Vec<(&'static str, Node)>,
    },
    /// A rendered leaf value
    Value(String),
}

impl Node {
    /// A leaf entry for `field`, masking secret values
    pub fn leaf(field: &FieldDescriptor, rendered: String) -> (&'static str, Node) {
        let rendered = if field.secret && !rendered.is_empty() {
            MASK.to_string()
        } else {
            rendered
        };
        (field.env, Node::Value(rendered))
    }

    /// A nested struct entry for `field`
    pub fn nested(field: &FieldDescriptor, node: Node) -> (&'static str, Node) {
        (field.env, node)
    }
}

/// Print a loaded configuration to standard output
///
/// Printing is best effort; write errors are ignored.
pub fn print_config<T: EnvConfig>(config: &T) {
    let stdout = io::stdout();
    let _ = write_config(&mut stdout.lock(), config);
}

/// Write a loaded configuration to `out`, framed by separator lines
pub fn write_config<W: Write, T: EnvConfig>(out: &mut W, config: &T) -> io::Result<()> {
    write_node(out, &config.to_node())
}

/// Write an arbitrary node, framed by separator lines
pub fn write_node<W: Write>(out: &mut W, node: &Node) -> io::Result<()> {
    writeln!(out, "{}", SEPARATOR)?;
    write_level(out, node)?;
    writeln!(out, "{}\n", SEPARATOR)
}

fn write_level<W: Write>(out: &mut W, node: &Node) -> io::Result<()> {
    let (name, fields) = match node {
        Node::Struct { name, fields } => (name, fields),
        Node::Value(_) => return writeln!(out, "Provided value is not a struct"),
    };

    writeln!(out, "Load {}", name)?;

    let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in fields {
        match value {
            Node::Struct { .. } => write_level(out, value)?,
            Node::Value(value) => writeln!(out, "{:<width$} : {}", label, value, width = width)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(node: &Node) -> String {
        let mut out = Vec::new();
        write_node(&mut out, node).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn value(s: &str) -> Node {
        Node::Value(s.to_string())
    }

    #[test]
    fn test_aligned_output() {
        let node = Node::Struct {
            name: "RedisConfig",
            fields: vec![
                ("DB_REDIS_ADDRESS", value("redis:6379")),
                ("DB_REDIS_PASSWORD", value("secret")),
            ],
        };

        assert_eq!(
            render(&node),
            "--------------------------------\n\
             Load RedisConfig\n\
             DB_REDIS_ADDRESS  : redis:6379\n\
             DB_REDIS_PASSWORD : secret\n\
             --------------------------------\n\n"
        );
    }

    #[test]
    fn test_nested_levels_align_independently() {
        let node = Node::Struct {
            name: "AppConfig",
            fields: vec![
                ("PORT", value("8080")),
                (
                    "DB",
                    Node::Struct {
                        name: "DbConfig",
                        fields: vec![("URL", value("pg://")), ("POOL_SIZE", value("4"))],
                    },
                ),
            ],
        };

        let output = render(&node);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                SEPARATOR,
                "Load AppConfig",
                "PORT : 8080",
                "Load DbConfig",
                "URL       : pg://",
                "POOL_SIZE : 4",
                SEPARATOR,
                "",
            ]
        );
    }

    #[test]
    fn test_non_struct_is_reported() {
        let output = render(&value("42"));
        assert!(output.contains("Provided value is not a struct"));
        assert!(output.starts_with(SEPARATOR));
    }

    #[test]
    fn test_secret_leaf_is_masked() {
        let field = FieldDescriptor {
            secret: true,
            ..FieldDescriptor::leaf("password", "PASSWORD")
        };

        assert_eq!(
            Node::leaf(&field, "hunter2".to_string()),
            ("PASSWORD", value(MASK))
        );
        assert_eq!(Node::leaf(&field, String::new()), ("PASSWORD", value("")));
    }
}

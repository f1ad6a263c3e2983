//! A small model of an ES module, rendered to source text.
//!
//! The wrappers are assembled as a list of statements, which makes their export surface
//! inspectable without parsing the generated text.

use super::devalue::{self, Literal};

const INDENT: &str = "  ";

/// An expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// A reference to a binding.
    Ident(String),
    /// A value, encoded as a literal expression.
    Literal(Literal),
    /// Source text, used as-is.
    Raw(String),
    /// `require("<specifier>")`
    Require(String),
    Call { callee: String, args: Vec<Expr> },
    Object(Vec<Property>),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(name.into())
    }

    pub fn raw(source: impl Into<String>) -> Self {
        Self::Raw(source.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Literal::String(value.into()))
    }

    pub fn call(callee: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Call {
            callee: callee.into(),
            args,
        }
    }

    /// Access a property of a module, which may still be loading.
    ///
    /// A module loaded lazily is a promise, in which case the property is extracted once the
    /// module resolved. The property name is split, so that it is not picked up by the bundler's
    /// static analysis of the module exports.
    pub fn module_property(module: &str, property: &str) -> Self {
        Self::Raw(module_property(module, property))
    }

    /// Like [`Expr::module_property`], falling back to `fallback` when the property is not set.
    pub fn module_property_or(module: &str, property: &str, fallback: &str) -> Self {
        Self::Raw(format!(
            "{} || {fallback}",
            module_property(module, property)
        ))
    }

    /// The default export of a module, which may still be loading.
    pub fn module_default(module: &str) -> Self {
        Self::Raw(format!(
            "{module}.default || {module}.then && {module}.then(mod => mod.default)"
        ))
    }

    fn render(&self, out: &mut String, depth: usize) {
        match self {
            Self::Ident(name) => out.push_str(name),
            Self::Literal(value) => out.push_str(&devalue::encode(value)),
            Self::Raw(source) => out.push_str(source),
            Self::Require(specifier) => {
                out.push_str("require(");
                out.push_str(&devalue::quote(specifier));
                out.push(')');
            }
            Self::Call { callee, args } => {
                out.push_str(callee);
                out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    arg.render(out, depth);
                }
                out.push(')');
            }
            Self::Object(properties) => {
                out.push_str("{\n");
                for property in properties {
                    out.push_str(&INDENT.repeat(depth + 1));
                    match &property.value {
                        Expr::Ident(name) if *name == property.key => out.push_str(name),
                        value => {
                            out.push_str(&devalue::key(&property.key));
                            out.push_str(": ");
                            value.render(out, depth + 1);
                        }
                    }
                    out.push_str(",\n");
                }
                out.push_str(&INDENT.repeat(depth));
                out.push('}');
            }
        }
    }
}

fn module_property(module: &str, property: &str) -> String {
    let split = property
        .char_indices()
        .last()
        .map(|(i, _)| i)
        .unwrap_or_default();
    let (head, tail) = property.split_at(split);
    let access = format!("['{head}' + '{tail}']");
    format!("{module}{access} || {module}.then && {module}.then(mod => mod{access})")
}

impl From<Literal> for Expr {
    fn from(value: Literal) -> Self {
        Self::Literal(value)
    }
}

/// A property of an object literal.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    pub key: String,
    pub value: Expr,
}

impl Property {
    pub fn new(key: impl Into<String>, value: impl Into<Expr>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// A property with the value of the binding of the same name.
    pub fn shorthand(key: &str) -> Self {
        Self::new(key, Expr::ident(key))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Declaration {
    Const,
    Let,
}

/// A top-level statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    /// `import "<from>"`
    ImportSideEffect { from: String },
    /// `import <binding> from "<from>"`
    ImportDefault { binding: String, from: String },
    /// `import { <bindings> } from "<from>"`
    ImportNamed { bindings: Vec<String>, from: String },
    /// `[export] const <name> = <init>`
    Declare {
        kind: Declaration,
        name: String,
        init: Expr,
        export: bool,
    },
    /// `const { <names> } = <init>`
    Destructure { names: Vec<String>, init: Expr },
    /// `<target> = <value>`
    Assign { target: String, value: Expr },
    /// An expression statement.
    Expr(Expr),
    /// Source text, used as-is.
    Raw(String),
    /// `export default <name>`
    ExportDefault(String),
    /// `export { <names> }`
    ExportNamed(Vec<String>),
}

impl Statement {
    pub fn import_default(binding: &str, from: impl Into<String>) -> Self {
        Self::ImportDefault {
            binding: binding.to_string(),
            from: from.into(),
        }
    }

    pub fn constant(name: &str, init: impl Into<Expr>) -> Self {
        Self::Declare {
            kind: Declaration::Const,
            name: name.to_string(),
            init: init.into(),
            export: false,
        }
    }

    pub fn export_const(name: &str, init: impl Into<Expr>) -> Self {
        Self::Declare {
            kind: Declaration::Const,
            name: name.to_string(),
            init: init.into(),
            export: true,
        }
    }

    fn exports(&self) -> Vec<&str> {
        match self {
            Self::Declare {
                name, export: true, ..
            } => vec![name.as_str()],
            Self::ExportDefault(_) => vec!["default"],
            Self::ExportNamed(names) => names.iter().map(String::as_str).collect(),
            _ => vec![],
        }
    }

    fn render(&self, out: &mut String) {
        match self {
            Self::ImportSideEffect { from } => {
                out.push_str("import ");
                out.push_str(&devalue::quote(from));
            }
            Self::ImportDefault { binding, from } => {
                out.push_str(&format!("import {binding} from {}", devalue::quote(from)));
            }
            Self::ImportNamed { bindings, from } => {
                out.push_str(&format!(
                    "import {{ {} }} from {}",
                    bindings.join(", "),
                    devalue::quote(from)
                ));
            }
            Self::Declare {
                kind,
                name,
                init,
                export,
            } => {
                if *export {
                    out.push_str("export ");
                }
                out.push_str(&format!("{kind} {name} = "));
                init.render(out, 0);
            }
            Self::Destructure { names, init } => {
                out.push_str(&format!("const {{ {} }} = ", names.join(", ")));
                init.render(out, 0);
            }
            Self::Assign { target, value } => {
                out.push_str(&format!("{target} = "));
                value.render(out, 0);
            }
            Self::Expr(expr) => expr.render(out, 0),
            Self::Raw(source) => out.push_str(source.trim_end()),
            Self::ExportDefault(name) => out.push_str(&format!("export default {name}")),
            Self::ExportNamed(names) => {
                out.push_str(&format!("export {{ {} }}", names.join(", ")));
            }
        }
        out.push('\n');
    }
}

/// A module, as a sequence of statements.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Module {
    statements: Vec<Statement>,
}

impl Module {
    pub fn push(&mut self, statement: Statement) -> &mut Self {
        self.statements.push(statement);
        self
    }

    pub fn extend(&mut self, statements: impl IntoIterator<Item = Statement>) -> &mut Self {
        self.statements.extend(statements);
        self
    }

    /// The names this module exports, in order of declaration.
    pub fn exports(&self) -> Vec<String> {
        self.statements
            .iter()
            .flat_map(Statement::exports)
            .map(ToString::to_string)
            .collect()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for statement in &self.statements {
            statement.render(&mut out);
        }
        out
    }
}

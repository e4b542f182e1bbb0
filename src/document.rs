//! GraphQL document synthesis
//!
//! Builds query and mutation documents from a root field, its arguments and
//! a selection set. Values are bound as named variables by default; the
//! inline style renders escaped literals for endpoints that do not accept a
//! `variables` object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named argument value, in emission order
pub type Binding = (&'static str, Scalar);

/// Operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    fn keyword(self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
        }
    }
}

/// Typed scalar argument value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    String(String),
    Int(i64),
    Boolean(bool),
    Id(String),
}

impl Scalar {
    /// GraphQL type name used in variable definitions
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::String(_) => "String",
            Scalar::Int(_) => "Int",
            Scalar::Boolean(_) => "Boolean",
            Scalar::Id(_) => "ID",
        }
    }

    /// JSON form carried in the `variables` object
    pub fn to_json(&self) -> Value {
        match self {
            Scalar::String(s) | Scalar::Id(s) => Value::String(s.clone()),
            Scalar::Int(i) => Value::from(*i),
            Scalar::Boolean(b) => Value::Bool(*b),
        }
    }

    /// Literal form for inline documents
    pub fn to_literal(&self) -> String {
        match self {
            Scalar::String(s) | Scalar::Id(s) => format!("\"{}\"", escape_string(s)),
            Scalar::Int(i) => i.to_string(),
            Scalar::Boolean(b) => b.to_string(),
        }
    }
}

/// Escape a string for use inside a GraphQL string literal
pub fn escape_string(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\u{0008}' => escaped.push_str("\\b"),
            '\u{000C}' => escaped.push_str("\\f"),
            c if c.is_control() => escaped.push_str(&format!("\\u{:04X}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Node of a selection set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Leaf(&'static str),
    Nested(&'static str, &'static [Field]),
}

/// How argument values reach the remote side
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BindingStyle {
    /// `$name` references plus a `variables` object
    #[default]
    Variables,
    /// Escaped literals written into the document text
    Inline,
}

/// Compiled request document
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDocument {
    pub kind: OperationKind,
    pub operation_name: String,
    pub root_field: String,
    pub text: String,
    pub variables: Map<String, Value>,
}

/// Wire body of a GraphQL-over-HTTP request
#[derive(Serialize, Debug)]
pub struct GraphQLRequest<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "no_variables")]
    pub variables: &'a Map<String, Value>,
}

fn no_variables(variables: &&Map<String, Value>) -> bool {
    variables.is_empty()
}

impl QueryDocument {
    /// Request body for this document
    pub fn request_body(&self) -> GraphQLRequest<'_> {
        GraphQLRequest {
            query: &self.text,
            variables: &self.variables,
        }
    }
}

struct Argument {
    name: &'static str,
    value: Scalar,
    required: bool,
}

/// Builder for [`QueryDocument`]
pub struct DocumentBuilder {
    kind: OperationKind,
    root_field: String,
    arguments: Vec<Argument>,
    input: Option<Vec<Argument>>,
    selection: &'static [Field],
}

impl DocumentBuilder {
    fn new(kind: OperationKind, root_field: &str) -> Self {
        Self {
            kind,
            root_field: root_field.to_string(),
            arguments: Vec::new(),
            input: None,
            selection: &[],
        }
    }

    /// Start a query against `root_field`
    pub fn query(root_field: &str) -> Self {
        Self::new(OperationKind::Query, root_field)
    }

    /// Start a mutation against `root_field`
    pub fn mutation(root_field: &str) -> Self {
        Self::new(OperationKind::Mutation, root_field)
    }

    /// Add a required top-level argument
    pub fn argument(mut self, name: &'static str, value: Scalar) -> Self {
        self.arguments.push(Argument { name, value, required: true });
        self
    }

    /// Add an `input` object argument carrying exactly `bindings`
    ///
    /// An empty list still emits `input: {}`.
    pub fn input(mut self, bindings: Vec<Binding>, required: bool) -> Self {
        let fields = bindings
            .into_iter()
            .map(|(name, value)| Argument { name, value, required })
            .collect();
        self.input = Some(fields);
        self
    }

    /// Set the selection set of the root field
    pub fn select(mut self, selection: &'static [Field]) -> Self {
        self.selection = selection;
        self
    }

    /// Render the document
    pub fn build(self, style: BindingStyle) -> QueryDocument {
        let operation_name = pascal_case(&self.root_field);
        let mut variables = Map::new();
        let mut definitions = Vec::new();

        let mut render = |arg: &Argument| -> String {
            match style {
                BindingStyle::Inline => arg.value.to_literal(),
                BindingStyle::Variables => {
                    let bang = if arg.required { "!" } else { "" };
                    definitions.push(format!("${}: {}{}", arg.name, arg.value.type_name(), bang));
                    variables.insert(arg.name.to_string(), arg.value.to_json());
                    format!("${}", arg.name)
                }
            }
        };

        let mut rendered_args: Vec<String> = self
            .arguments
            .iter()
            .map(|arg| format!("{}: {}", arg.name, render(arg)))
            .collect();

        if let Some(fields) = &self.input {
            let rendered_fields: Vec<String> = fields
                .iter()
                .map(|field| format!("{}: {}", field.name, render(field)))
                .collect();
            if rendered_fields.is_empty() {
                rendered_args.push("input: {}".to_string());
            } else {
                rendered_args.push(format!("input: {{ {} }}", rendered_fields.join(", ")));
            }
        }

        let mut text = String::from(self.kind.keyword());
        text.push(' ');
        text.push_str(&operation_name);
        if !definitions.is_empty() {
            text.push_str(&format!("({})", definitions.join(", ")));
        }
        text.push_str(" { ");
        text.push_str(&self.root_field);
        if !rendered_args.is_empty() {
            text.push_str(&format!("({})", rendered_args.join(", ")));
        }
        if !self.selection.is_empty() {
            text.push(' ');
            text.push_str(&render_selection(self.selection));
        }
        text.push_str(" }");

        QueryDocument {
            kind: self.kind,
            operation_name,
            root_field: self.root_field,
            text,
            variables,
        }
    }
}

fn render_selection(fields: &[Field]) -> String {
    let parts: Vec<String> = fields
        .iter()
        .map(|field| match field {
            Field::Leaf(name) => (*name).to_string(),
            Field::Nested(name, children) => format!("{} {}", name, render_selection(children)),
        })
        .collect();
    format!("{{ {} }}", parts.join(" "))
}

fn pascal_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

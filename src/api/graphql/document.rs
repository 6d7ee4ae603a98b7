//! Parser for executable GraphQL documents: operations, fragments, variable
//! definitions with defaults, arguments, aliases and directives.

use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::fmt;

use crate::utils::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub fn type_name(self) -> &'static str {
        match self {
            OperationKind::Query => "Query",
            OperationKind::Mutation => "Mutation",
            OperationKind::Subscription => "Subscription",
        }
    }
}

/// An argument or default value as written in the document.
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Variable(String),
    Number(Number),
    String(String),
    Boolean(bool),
    Null,
    Enum(String),
    List(Vec<InputValue>),
    Object(Vec<(String, InputValue)>),
}

/// Variable values after coercion. A declared variable the client did not
/// send maps to `None`, which drops the argument instead of nulling it.
pub type Variables = HashMap<String, Option<Value>>;

impl InputValue {
    pub fn resolve(&self, vars: &Variables) -> Result<Option<Value>, AppError> {
        Ok(Some(match self {
            InputValue::Variable(name) => {
                return vars
                    .get(name)
                    .cloned()
                    .ok_or_else(|| AppError::validation(format!("Variable '${}' is not defined.", name)))
            }
            InputValue::Number(n) => Value::Number(n.clone()),
            InputValue::String(s) | InputValue::Enum(s) => Value::String(s.clone()),
            InputValue::Boolean(b) => Value::Bool(*b),
            InputValue::Null => Value::Null,
            InputValue::List(items) => Value::Array(
                items
                    .iter()
                    .map(|item| -> Result<Value, AppError> { Ok(item.resolve(vars)?.unwrap_or(Value::Null)) })
                    .collect::<Result<_, AppError>>()?,
            ),
            InputValue::Object(fields) => Value::Object(resolve_fields(fields, vars)?),
        }))
    }
}

/// Object fields or field arguments; absent variables leave the key out.
pub fn resolve_fields(fields: &[(String, InputValue)], vars: &Variables) -> Result<Map<String, Value>, AppError> {
    let mut out = Map::new();
    for (name, value) in fields {
        if let Some(value) = value.resolve(vars)? {
            out.insert(name.clone(), value);
        }
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VariableDefinition {
    pub name: String,
    pub ty: TypeRef,
    pub default: Option<InputValue>,
}

#[derive(Debug, Clone)]
pub struct Directive {
    pub name: String,
    pub arguments: Vec<(String, InputValue)>,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub alias: Option<String>,
    pub name: String,
    pub arguments: Vec<(String, InputValue)>,
    pub directives: Vec<Directive>,
    pub selection_set: Vec<Selection>,
}

impl Field {
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone)]
pub enum Selection {
    Field(Field),
    FragmentSpread {
        name: String,
        directives: Vec<Directive>,
    },
    InlineFragment {
        type_condition: Option<String>,
        directives: Vec<Directive>,
        selection_set: Vec<Selection>,
    },
}

#[derive(Debug, Clone)]
pub struct Operation {
    pub kind: OperationKind,
    pub name: Option<String>,
    pub variables: Vec<VariableDefinition>,
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Clone)]
pub struct Fragment {
    pub type_condition: String,
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Default)]
pub struct Document {
    pub operations: Vec<Operation>,
    pub fragments: HashMap<String, Fragment>,
}

impl Document {
    pub fn parse(source: &str) -> Result<Self, AppError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser { tokens, pos: 0 };
        let document = parser.document()?;

        if document.operations.len() > 1 && document.operations.iter().any(|op| op.name.is_none()) {
            return Err(AppError::validation(
                "This anonymous operation must be the only defined operation.",
            ));
        }
        Ok(document)
    }

    /// Picks the operation to run, by name when the document has several.
    pub fn operation(&self, name: Option<&str>) -> Result<&Operation, AppError> {
        match name {
            Some(name) => self
                .operations
                .iter()
                .find(|op| op.name.as_deref() == Some(name))
                .ok_or_else(|| AppError::validation(format!("Unknown operation named '{}'.", name))),
            None => match self.operations.as_slice() {
                [op] => Ok(op),
                [] => Err(AppError::validation("Must provide an operation.")),
                _ => Err(AppError::validation(
                    "Must provide operation name if query contains multiple operations.",
                )),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Punct(char),
    Spread,
    Name(String),
    Int(String),
    Float(String),
    Str(String),
}

fn syntax(message: impl fmt::Display) -> AppError {
    AppError::validation(format!("Syntax Error: {}", message))
}

fn tokenize(source: &str) -> Result<Vec<Token>, AppError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while let Some(&c) = chars.get(i) {
        match c {
            c if c.is_whitespace() || c == ',' || c == '\u{feff}' => i += 1,
            '#' => {
                while i < chars.len() && chars[i] != '\n' && chars[i] != '\r' {
                    i += 1;
                }
            }
            '!' | '$' | '&' | '(' | ')' | ':' | '=' | '@' | '[' | ']' | '{' | '|' | '}' => {
                tokens.push(Token::Punct(c));
                i += 1;
            }
            '.' => {
                if chars.get(i + 1) == Some(&'.') && chars.get(i + 2) == Some(&'.') {
                    tokens.push(Token::Spread);
                    i += 3;
                } else {
                    return Err(syntax("Unexpected '.'"));
                }
            }
            '"' => {
                let (value, next) = if chars[i..].starts_with(&['"', '"', '"']) {
                    read_block_string(&chars, i + 3)?
                } else {
                    read_string(&chars, i + 1)?
                };
                tokens.push(Token::Str(value));
                i = next;
            }
            c if c == '_' || c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && (chars[i] == '_' || chars[i].is_ascii_alphanumeric()) {
                    i += 1;
                }
                tokens.push(Token::Name(chars[start..i].iter().collect()));
            }
            c if c == '-' || c.is_ascii_digit() => {
                let (token, next) = read_number(&chars, i)?;
                tokens.push(token);
                i = next;
            }
            other => return Err(syntax(format!("Unexpected character '{}'", other))),
        }
    }

    Ok(tokens)
}

fn read_digits(chars: &[char], mut i: usize) -> Result<usize, AppError> {
    let start = i;
    while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
        i += 1;
    }
    if i == start {
        return Err(syntax("Invalid number, expected digit"));
    }
    Ok(i)
}

fn read_number(chars: &[char], start: usize) -> Result<(Token, usize), AppError> {
    let mut i = start;
    if chars[i] == '-' {
        i += 1;
    }
    i = read_digits(chars, i)?;
    let mut float = false;
    if chars.get(i) == Some(&'.') {
        float = true;
        i = read_digits(chars, i + 1)?;
    }
    if matches!(chars.get(i), Some('e') | Some('E')) {
        float = true;
        i += 1;
        if matches!(chars.get(i), Some('+') | Some('-')) {
            i += 1;
        }
        i = read_digits(chars, i)?;
    }
    if chars.get(i).is_some_and(|c| *c == '_' || c.is_ascii_alphabetic() || *c == '.') {
        return Err(syntax("Invalid number"));
    }

    let text: String = chars[start..i].iter().collect();
    Ok((if float { Token::Float(text) } else { Token::Int(text) }, i))
}

fn read_string(chars: &[char], mut i: usize) -> Result<(String, usize), AppError> {
    let mut out = String::new();
    loop {
        match chars.get(i) {
            None | Some('\n') | Some('\r') => return Err(syntax("Unterminated string")),
            Some('"') => return Ok((out, i + 1)),
            Some('\\') => {
                let escaped = match chars.get(i + 1) {
                    Some('"') => '"',
                    Some('\\') => '\\',
                    Some('/') => '/',
                    Some('b') => '\u{8}',
                    Some('f') => '\u{c}',
                    Some('n') => '\n',
                    Some('r') => '\r',
                    Some('t') => '\t',
                    Some('u') => {
                        let hex: String = chars.get(i + 2..i + 6).unwrap_or_default().iter().collect();
                        let code = u32::from_str_radix(&hex, 16)
                            .ok()
                            .filter(|_| hex.len() == 4)
                            .and_then(char::from_u32)
                            .ok_or_else(|| syntax(format!("Invalid unicode escape '\\u{}'", hex)))?;
                        out.push(code);
                        i += 6;
                        continue;
                    }
                    other => {
                        return Err(syntax(format!(
                            "Invalid escape sequence '\\{}'",
                            other.map(|c| c.to_string()).unwrap_or_default()
                        )))
                    }
                };
                out.push(escaped);
                i += 2;
            }
            Some(&c) => {
                out.push(c);
                i += 1;
            }
        }
    }
}

fn read_block_string(chars: &[char], mut i: usize) -> Result<(String, usize), AppError> {
    let mut raw = String::new();
    loop {
        if chars[i..].starts_with(&['"', '"', '"']) {
            return Ok((dedent_block(&raw), i + 3));
        }
        if chars[i..].starts_with(&['\\', '"', '"', '"']) {
            raw.push_str("\"\"\"");
            i += 4;
            continue;
        }
        match chars.get(i) {
            None => return Err(syntax("Unterminated string")),
            Some(&c) => {
                raw.push(c);
                i += 1;
            }
        }
    }
}

/// Block strings drop the common indentation and the blank first and last lines.
fn dedent_block(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut lines: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(n, line)| if n == 0 { *line } else { line.get(indent..).unwrap_or("") })
        .collect();
    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_name(&self) -> Option<&str> {
        match self.peek() {
            Some(Token::Name(name)) => Some(name),
            _ => None,
        }
    }

    fn is_punct(&self, c: char) -> bool {
        self.peek() == Some(&Token::Punct(c))
    }

    fn eat_punct(&mut self, c: char) -> bool {
        let found = self.is_punct(c);
        if found {
            self.pos += 1;
        }
        found
    }

    fn expect_punct(&mut self, c: char) -> Result<(), AppError> {
        if self.eat_punct(c) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", c)))
        }
    }

    fn name(&mut self) -> Result<String, AppError> {
        match self.peek_name() {
            Some(name) => {
                let name = name.to_string();
                self.pos += 1;
                Ok(name)
            }
            None => Err(self.unexpected("a name")),
        }
    }

    fn unexpected(&self, expected: &str) -> AppError {
        let found = match self.peek() {
            None => "<EOF>".to_string(),
            Some(Token::Punct(c)) => format!("'{}'", c),
            Some(Token::Spread) => "'...'".to_string(),
            Some(Token::Name(n)) => format!("'{}'", n),
            Some(Token::Int(n)) | Some(Token::Float(n)) => n.clone(),
            Some(Token::Str(s)) => format!("\"{}\"", s),
        };
        syntax(format!("Expected {}, found {}", expected, found))
    }

    fn document(&mut self) -> Result<Document, AppError> {
        let mut document = Document::default();
        if self.peek().is_none() {
            return Err(syntax("Unexpected <EOF>"));
        }

        while self.peek().is_some() {
            if self.is_punct('{') {
                let selection_set = self.selection_set()?;
                document.operations.push(Operation {
                    kind: OperationKind::Query,
                    name: None,
                    variables: Vec::new(),
                    selection_set,
                });
                continue;
            }

            match self.peek_name() {
                Some("query") | Some("mutation") | Some("subscription") => {
                    let operation = self.operation()?;
                    if let Some(name) = &operation.name {
                        if document.operations.iter().any(|op| op.name.as_ref() == Some(name)) {
                            return Err(AppError::validation(format!(
                                "There can be only one operation named '{}'.",
                                name
                            )));
                        }
                    }
                    document.operations.push(operation);
                }
                Some("fragment") => {
                    self.pos += 1;
                    let (name, fragment) = self.fragment()?;
                    if document.fragments.insert(name.clone(), fragment).is_some() {
                        return Err(AppError::validation(format!(
                            "There can be only one fragment named '{}'.",
                            name
                        )));
                    }
                }
                _ => return Err(self.unexpected("an operation or fragment")),
            }
        }

        Ok(document)
    }

    fn operation(&mut self) -> Result<Operation, AppError> {
        let kind = match self.name()?.as_str() {
            "mutation" => OperationKind::Mutation,
            "subscription" => OperationKind::Subscription,
            _ => OperationKind::Query,
        };
        let name = match self.peek_name() {
            Some(_) => Some(self.name()?),
            None => None,
        };
        let variables = if self.is_punct('(') { self.variable_definitions()? } else { Vec::new() };
        // Operation-level directives carry no meaning for these resolvers.
        self.directives()?;
        let selection_set = self.selection_set()?;

        Ok(Operation { kind, name, variables, selection_set })
    }

    fn fragment(&mut self) -> Result<(String, Fragment), AppError> {
        let name = self.name()?;
        if name == "on" {
            return Err(syntax("Unexpected 'on'"));
        }
        if self.peek_name() != Some("on") {
            return Err(self.unexpected("'on'"));
        }
        self.pos += 1;
        let type_condition = self.name()?;
        self.directives()?;
        let selection_set = self.selection_set()?;
        Ok((name, Fragment { type_condition, selection_set }))
    }

    fn variable_definitions(&mut self) -> Result<Vec<VariableDefinition>, AppError> {
        self.expect_punct('(')?;
        let mut definitions = Vec::new();
        loop {
            self.expect_punct('$')?;
            let name = self.name()?;
            self.expect_punct(':')?;
            let ty = self.type_ref()?;
            let default = if self.eat_punct('=') { Some(self.value(true)?) } else { None };
            self.directives()?;
            definitions.push(VariableDefinition { name, ty, default });
            if self.eat_punct(')') {
                return Ok(definitions);
            }
        }
    }

    fn type_ref(&mut self) -> Result<TypeRef, AppError> {
        let ty = if self.eat_punct('[') {
            let inner = self.type_ref()?;
            self.expect_punct(']')?;
            TypeRef::List(Box::new(inner))
        } else {
            TypeRef::Named(self.name()?)
        };
        Ok(if self.eat_punct('!') { TypeRef::NonNull(Box::new(ty)) } else { ty })
    }

    fn directives(&mut self) -> Result<Vec<Directive>, AppError> {
        let mut directives = Vec::new();
        while self.eat_punct('@') {
            let name = self.name()?;
            let arguments = self.arguments()?;
            directives.push(Directive { name, arguments });
        }
        Ok(directives)
    }

    fn arguments(&mut self) -> Result<Vec<(String, InputValue)>, AppError> {
        let mut arguments = Vec::new();
        if !self.eat_punct('(') {
            return Ok(arguments);
        }
        loop {
            let name = self.name()?;
            self.expect_punct(':')?;
            arguments.push((name, self.value(false)?));
            if self.eat_punct(')') {
                return Ok(arguments);
            }
        }
    }

    fn selection_set(&mut self) -> Result<Vec<Selection>, AppError> {
        self.expect_punct('{')?;
        let mut selections = Vec::new();
        loop {
            selections.push(self.selection()?);
            if self.eat_punct('}') {
                return Ok(selections);
            }
        }
    }

    fn selection(&mut self) -> Result<Selection, AppError> {
        if self.peek() == Some(&Token::Spread) {
            self.pos += 1;
            return match self.peek_name() {
                Some("on") => {
                    self.pos += 1;
                    let type_condition = Some(self.name()?);
                    let directives = self.directives()?;
                    let selection_set = self.selection_set()?;
                    Ok(Selection::InlineFragment { type_condition, directives, selection_set })
                }
                Some(_) => {
                    let name = self.name()?;
                    let directives = self.directives()?;
                    Ok(Selection::FragmentSpread { name, directives })
                }
                None => {
                    let directives = self.directives()?;
                    let selection_set = self.selection_set()?;
                    Ok(Selection::InlineFragment { type_condition: None, directives, selection_set })
                }
            };
        }

        let mut name = self.name()?;
        let mut alias = None;
        if self.eat_punct(':') {
            alias = Some(name);
            name = self.name()?;
        }
        let arguments = self.arguments()?;
        let directives = self.directives()?;
        let selection_set = if self.is_punct('{') { self.selection_set()? } else { Vec::new() };

        Ok(Selection::Field(Field { alias, name, arguments, directives, selection_set }))
    }

    fn value(&mut self, constant: bool) -> Result<InputValue, AppError> {
        let token = self.peek().cloned().ok_or_else(|| self.unexpected("a value"))?;
        match token {
            Token::Punct('$') if !constant => {
                self.pos += 1;
                Ok(InputValue::Variable(self.name()?))
            }
            Token::Punct('[') => {
                self.pos += 1;
                let mut items = Vec::new();
                while !self.eat_punct(']') {
                    items.push(self.value(constant)?);
                }
                Ok(InputValue::List(items))
            }
            Token::Punct('{') => {
                self.pos += 1;
                let mut fields = Vec::new();
                while !self.eat_punct('}') {
                    let name = self.name()?;
                    self.expect_punct(':')?;
                    fields.push((name, self.value(constant)?));
                }
                Ok(InputValue::Object(fields))
            }
            Token::Int(text) => {
                self.pos += 1;
                text.parse::<i64>()
                    .map(|n| InputValue::Number(n.into()))
                    .map_err(|_| syntax(format!("Int cannot represent value {}", text)))
            }
            Token::Float(text) => {
                self.pos += 1;
                text.parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(InputValue::Number)
                    .ok_or_else(|| syntax(format!("Float cannot represent value {}", text)))
            }
            Token::Str(s) => {
                self.pos += 1;
                Ok(InputValue::String(s))
            }
            Token::Name(name) => {
                self.pos += 1;
                Ok(match name.as_str() {
                    "true" => InputValue::Boolean(true),
                    "false" => InputValue::Boolean(false),
                    "null" => InputValue::Null,
                    _ => InputValue::Enum(name),
                })
            }
            _ => Err(self.unexpected("a value")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn root_fields(op: &Operation) -> Vec<&Field> {
        op.selection_set
            .iter()
            .filter_map(|s| match s {
                Selection::Field(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_shorthand_query_with_inline_arguments() {
        let doc = Document::parse(r#"{ university(id: "65f0c0ffee65f0c0ffee65f0") { name courses { name } } }"#).unwrap();
        let op = doc.operation(None).unwrap();
        assert_eq!(op.kind, OperationKind::Query);

        let fields = root_fields(op);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "university");
        assert_eq!(
            fields[0].arguments,
            vec![("id".to_string(), InputValue::String("65f0c0ffee65f0c0ffee65f0".into()))]
        );
        assert_eq!(fields[0].selection_set.len(), 2);
    }

    #[test]
    fn test_every_root_field_and_alias_is_kept() {
        let doc = Document::parse("{ universities { id } board: jobs(status: Open) { id } }").unwrap();
        let fields = root_fields(doc.operation(None).unwrap());
        let keys: Vec<&str> = fields.iter().map(|f| f.response_key()).collect();
        assert_eq!(keys, vec!["universities", "board"]);
        assert_eq!(fields[1].name, "jobs");
        assert_eq!(fields[1].arguments[0].1, InputValue::Enum("Open".into()));
    }

    #[test]
    fn test_object_default_with_braces() {
        let doc = Document::parse(r#"query Q($s: String = "{", $o: ListInput = {order: "asc"}) { jobs { id } }"#)
            .unwrap();
        let op = doc.operation(Some("Q")).unwrap();
        assert_eq!(op.variables.len(), 2);
        assert_eq!(op.variables[0].default, Some(InputValue::String("{".into())));
        assert_eq!(
            op.variables[1].default,
            Some(InputValue::Object(vec![("order".into(), InputValue::String("asc".into()))]))
        );
        assert_eq!(root_fields(op)[0].name, "jobs");
    }

    #[test]
    fn test_resolve_drops_absent_variables() {
        let doc = Document::parse(
            "mutation U($id: ID!, $notes: String) { updateUser(id: $id, input: { notes: $notes, status: Contacted }) { id } }",
        )
        .unwrap();
        let field = root_fields(doc.operation(None).unwrap())[0].clone();

        let mut vars = Variables::new();
        vars.insert("id".into(), Some(json!("abc")));
        vars.insert("notes".into(), None);
        let args = resolve_fields(&field.arguments, &vars).unwrap();
        assert_eq!(Value::Object(args), json!({ "id": "abc", "input": { "status": "Contacted" } }));

        vars.insert("notes".into(), Some(Value::Null));
        let args = resolve_fields(&field.arguments, &vars).unwrap();
        assert_eq!(args["input"], json!({ "notes": null, "status": "Contacted" }));
    }

    #[test]
    fn test_undeclared_variable_rejected() {
        let doc = Document::parse("{ job(id: $id) { id } }").unwrap();
        let field = root_fields(doc.operation(None).unwrap())[0].clone();
        let err = resolve_fields(&field.arguments, &Variables::new()).unwrap_err();
        assert_eq!(err.to_string(), "Variable '$id' is not defined.");
    }

    #[test]
    fn test_operation_selection() {
        let doc = Document::parse("query A { jobs { id } } query B { me { id } }").unwrap();
        assert_eq!(doc.operation(Some("B")).unwrap().name.as_deref(), Some("B"));
        assert_eq!(
            doc.operation(None).unwrap_err().to_string(),
            "Must provide operation name if query contains multiple operations."
        );
        assert_eq!(doc.operation(Some("C")).unwrap_err().to_string(), "Unknown operation named 'C'.");
        assert!(Document::parse("{ jobs { id } } query B { me { id } }").is_err());
    }

    #[test]
    fn test_fragments_and_strings() {
        let doc = Document::parse(
            r#"
            # comment with { braces
            query { jobs { ...JobFields ... on Job { status } } }
            fragment JobFields on Job { id title }
            "#,
        )
        .unwrap();
        assert_eq!(doc.fragments["JobFields"].type_condition, "Job");
        assert_eq!(doc.fragments["JobFields"].selection_set.len(), 2);

        let doc = Document::parse(r#"{ a(s: "tab\tquote\" é", b: """
              line one
                line two
            """) }"#)
        .unwrap();
        let field = root_fields(doc.operation(None).unwrap())[0].clone();
        assert_eq!(field.arguments[0].1, InputValue::String("tab\tquote\" é".into()));
        assert_eq!(field.arguments[1].1, InputValue::String("line one\n  line two".into()));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(Document::parse("").is_err());
        assert!(Document::parse("{ jobs { id }").is_err());
        assert!(Document::parse("{ job(id: \"x) { id } }").is_err());
        assert!(Document::parse("query ($x: = 1) { jobs { id } }").is_err());
        assert!(Document::parse("{ jobs(limit: 1.) { id } }").is_err());
    }
}

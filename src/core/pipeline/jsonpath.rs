//! Minimal JSONPath engine used by `JsonPathReplace` rules.
//!
//! Supported syntax: `$`, `.name`, `['name']`, `[0]`, `[-1]`, `[*]`, `.*`, unions
//! `[a,b]`, recursive descent `..name` / `..*` / `..[sel]`, and filters such as
//! `[?(@.kind == 'Source' && @.enabled)]`. Evaluation yields node locations so the
//! caller can rewrite matched values in place.

use crate::core::error::TransformError;
use serde_json::Value;
use std::cmp::Ordering;

/// One step from a node to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    Key(String),
    Index(usize),
}

/// Absolute position of a node inside a document.
pub type Location = Vec<Step>;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Child(Vec<Selector>),
    Descendant(Vec<Selector>),
}

#[derive(Debug, Clone, PartialEq)]
enum Selector {
    Name(String),
    Index(i64),
    Wildcard,
    Filter(Filter),
}

#[derive(Debug, Clone, PartialEq)]
enum Filter {
    Or(Vec<Filter>),
    And(Vec<Filter>),
    Not(Box<Filter>),
    Exists(Query),
    Compare(Operand, CmpOp, Operand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Query(Query),
    Literal(Value),
}

/// Singular query inside a filter, relative to `@` or absolute from `$`.
#[derive(Debug, Clone, PartialEq)]
struct Query {
    absolute: bool,
    steps: Vec<QueryStep>,
}

#[derive(Debug, Clone, PartialEq)]
enum QueryStep {
    Name(String),
    Index(i64),
}

/// A parsed JSONPath expression.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    expression: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn parse(expression: &str) -> Result<Self, TransformError> {
        let segments = Parser::new(expression).parse_path().map_err(|reason| {
            TransformError::InvalidJsonPath {
                expression: expression.to_string(),
                reason,
            }
        })?;
        Ok(Self {
            expression: expression.to_string(),
            segments,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Locations of every matched node, deduplicated, in document order of discovery.
    pub fn locate(&self, root: &Value) -> Vec<Location> {
        let mut current: Vec<Location> = vec![Vec::new()];
        for segment in &self.segments {
            let mut next = Vec::new();
            for location in &current {
                let Some(node) = value_at(root, location) else {
                    continue;
                };
                match segment {
                    Segment::Child(selectors) => {
                        for selector in selectors {
                            select(root, node, location, selector, &mut next);
                        }
                    }
                    Segment::Descendant(selectors) => {
                        let mut nodes = Vec::new();
                        descendants(node, location.clone(), &mut nodes);
                        for (descendant_location, descendant) in &nodes {
                            for selector in selectors {
                                select(root, descendant, descendant_location, selector, &mut next);
                            }
                        }
                    }
                }
            }
            current = next;
        }

        let mut unique: Vec<Location> = Vec::with_capacity(current.len());
        for location in current {
            if !unique.contains(&location) {
                unique.push(location);
            }
        }
        unique
    }

    /// Matched values, in the same order as [`JsonPath::locate`].
    pub fn select<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        self.locate(root)
            .iter()
            .filter_map(|location| value_at(root, location))
            .collect()
    }
}

pub fn value_at<'a>(root: &'a Value, location: &[Step]) -> Option<&'a Value> {
    location.iter().try_fold(root, |node, step| match step {
        Step::Key(key) => node.as_object()?.get(key),
        Step::Index(index) => node.as_array()?.get(*index),
    })
}

pub fn value_at_mut<'a>(root: &'a mut Value, location: &[Step]) -> Option<&'a mut Value> {
    location.iter().try_fold(root, |node, step| match step {
        Step::Key(key) => node.as_object_mut()?.get_mut(key),
        Step::Index(index) => node.as_array_mut()?.get_mut(*index),
    })
}

fn child(location: &[Step], step: Step) -> Location {
    let mut out = location.to_vec();
    out.push(step);
    out
}

fn select(root: &Value, node: &Value, location: &[Step], selector: &Selector, out: &mut Vec<Location>) {
    match selector {
        Selector::Name(name) => {
            if node.as_object().is_some_and(|map| map.contains_key(name)) {
                out.push(child(location, Step::Key(name.clone())));
            }
        }
        Selector::Index(index) => {
            if let Some(items) = node.as_array() {
                if let Some(resolved) = resolve_index(*index, items.len()) {
                    out.push(child(location, Step::Index(resolved)));
                }
            }
        }
        Selector::Wildcard => {
            for (step, _) in children(node) {
                out.push(child(location, step));
            }
        }
        Selector::Filter(filter) => {
            for (step, candidate) in children(node) {
                if filter.matches(root, candidate) {
                    out.push(child(location, step));
                }
            }
        }
    }
}

fn children(node: &Value) -> Vec<(Step, &Value)> {
    match node {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| (Step::Key(key.clone()), value))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, value)| (Step::Index(index), value))
            .collect(),
        _ => Vec::new(),
    }
}

fn descendants<'a>(node: &'a Value, location: Location, out: &mut Vec<(Location, &'a Value)>) {
    out.push((location.clone(), node));
    for (step, value) in children(node) {
        descendants(value, child(&location, step), out);
    }
}

fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { len + index } else { index };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

impl Filter {
    fn matches(&self, root: &Value, current: &Value) -> bool {
        match self {
            Filter::Or(items) => items.iter().any(|f| f.matches(root, current)),
            Filter::And(items) => items.iter().all(|f| f.matches(root, current)),
            Filter::Not(inner) => !inner.matches(root, current),
            Filter::Exists(query) => query.resolve(root, current).is_some(),
            Filter::Compare(left, op, right) => {
                let left = left.resolve(root, current);
                let right = right.resolve(root, current);
                compare(left, *op, right)
            }
        }
    }
}

impl Operand {
    fn resolve<'a>(&'a self, root: &'a Value, current: &'a Value) -> Option<&'a Value> {
        match self {
            Operand::Query(query) => query.resolve(root, current),
            Operand::Literal(value) => Some(value),
        }
    }
}

impl Query {
    fn resolve<'a>(&self, root: &'a Value, current: &'a Value) -> Option<&'a Value> {
        let start = if self.absolute { root } else { current };
        self.steps.iter().try_fold(start, |node, step| match step {
            QueryStep::Name(name) => node.as_object()?.get(name),
            QueryStep::Index(index) => {
                let items = node.as_array()?;
                items.get(resolve_index(*index, items.len())?)
            }
        })
    }
}

fn compare(left: Option<&Value>, op: CmpOp, right: Option<&Value>) -> bool {
    match op {
        CmpOp::Eq => values_equal(left, right),
        CmpOp::Ne => !values_equal(left, right),
        CmpOp::Lt => order(left, right) == Some(Ordering::Less),
        CmpOp::Le => matches!(order(left, right), Some(Ordering::Less | Ordering::Equal)),
        CmpOp::Gt => order(left, right) == Some(Ordering::Greater),
        CmpOp::Ge => matches!(
            order(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
    }
}

fn values_equal(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(Value::Number(a)), Some(Value::Number(b))) => a.as_f64() == b.as_f64(),
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn order(left: Option<&Value>, right: Option<&Value>) -> Option<Ordering> {
    match (left?, right?) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(offset, c)| self.peek_at(offset) == Some(c))
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), String> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(format!(
                "expected '{}' at position {}, found '{}'",
                expected, self.pos, c
            )),
            None => Err(format!("expected '{}' but reached end of expression", expected)),
        }
    }

    fn parse_path(&mut self) -> Result<Vec<Segment>, String> {
        self.skip_ws();
        if self.peek() != Some('$') {
            return Err("expression must start with '$'".to_string());
        }
        self.pos += 1;

        let mut segments = Vec::new();
        loop {
            self.skip_ws();
            let Some(c) = self.peek() else {
                break;
            };
            let segment = if self.starts_with("..") {
                self.pos += 2;
                Segment::Descendant(self.parse_member_selectors()?)
            } else if c == '.' {
                self.pos += 1;
                Segment::Child(self.parse_member_selectors()?)
            } else if c == '[' {
                Segment::Child(self.parse_bracket()?)
            } else {
                return Err(format!("unexpected '{}' at position {}", c, self.pos));
            };
            segments.push(segment);
        }
        Ok(segments)
    }

    /// Selectors after `.` or `..`: a name, `*`, or (after `..`) a bracket.
    fn parse_member_selectors(&mut self) -> Result<Vec<Selector>, String> {
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                Ok(vec![Selector::Wildcard])
            }
            Some('[') => self.parse_bracket(),
            _ => Ok(vec![Selector::Name(self.parse_name()?)]),
        }
    }

    fn parse_name(&mut self) -> Result<String, String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '$') || !c.is_ascii())
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(format!("expected a member name at position {}", start));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_bracket(&mut self) -> Result<Vec<Selector>, String> {
        self.expect('[')?;
        let mut selectors = Vec::new();
        loop {
            self.skip_ws();
            let selector = match self.peek() {
                Some('\'') | Some('"') => Selector::Name(self.parse_string()?),
                Some('*') => {
                    self.pos += 1;
                    Selector::Wildcard
                }
                Some('?') => {
                    self.pos += 1;
                    Selector::Filter(self.parse_or()?)
                }
                Some(c) if c == '-' || c.is_ascii_digit() => Selector::Index(self.parse_integer()?),
                Some(c) => return Err(format!("unexpected '{}' at position {}", c, self.pos)),
                None => return Err("unterminated bracket selector".to_string()),
            };
            selectors.push(selector);
            self.skip_ws();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(']') => {
                    self.pos += 1;
                    return Ok(selectors);
                }
                Some(c) => return Err(format!("unexpected '{}' at position {}", c, self.pos)),
                None => return Err("unterminated bracket selector".to_string()),
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, String> {
        let quote = self.peek().ok_or("expected a string literal")?;
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err("unterminated string literal".to_string()),
                Some('\\') => {
                    let escaped = self
                        .peek_at(1)
                        .ok_or("unterminated escape sequence")?;
                    out.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                    self.pos += 2;
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn parse_integer(&mut self) -> Result<i64, String> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse()
            .map_err(|_| format!("invalid index '{}' at position {}", text, start))
    }

    fn parse_or(&mut self) -> Result<Filter, String> {
        let mut items = vec![self.parse_and()?];
        loop {
            self.skip_ws();
            if self.starts_with("||") {
                self.pos += 2;
                items.push(self.parse_and()?);
            } else {
                break;
            }
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            Filter::Or(items)
        })
    }

    fn parse_and(&mut self) -> Result<Filter, String> {
        let mut items = vec![self.parse_unary()?];
        loop {
            self.skip_ws();
            if self.starts_with("&&") {
                self.pos += 2;
                items.push(self.parse_unary()?);
            } else {
                break;
            }
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            Filter::And(items)
        })
    }

    fn parse_unary(&mut self) -> Result<Filter, String> {
        self.skip_ws();
        match self.peek() {
            Some('!') if self.peek_at(1) != Some('=') => {
                self.pos += 1;
                Ok(Filter::Not(Box::new(self.parse_unary()?)))
            }
            Some('(') => {
                self.pos += 1;
                let inner = self.parse_or()?;
                self.expect(')')?;
                Ok(inner)
            }
            _ => self.parse_comparison(),
        }
    }

    fn parse_comparison(&mut self) -> Result<Filter, String> {
        let left = self.parse_operand()?;
        self.skip_ws();
        let op = if self.starts_with("==") {
            Some((CmpOp::Eq, 2))
        } else if self.starts_with("!=") {
            Some((CmpOp::Ne, 2))
        } else if self.starts_with("<=") {
            Some((CmpOp::Le, 2))
        } else if self.starts_with(">=") {
            Some((CmpOp::Ge, 2))
        } else if self.starts_with("<") {
            Some((CmpOp::Lt, 1))
        } else if self.starts_with(">") {
            Some((CmpOp::Gt, 1))
        } else {
            None
        };

        match (op, left) {
            (Some((op, width)), left) => {
                self.pos += width;
                let right = self.parse_operand()?;
                Ok(Filter::Compare(left, op, right))
            }
            (None, Operand::Query(query)) => Ok(Filter::Exists(query)),
            (None, Operand::Literal(_)) => Err(format!(
                "literal must be compared with a query at position {}",
                self.pos
            )),
        }
    }

    fn parse_operand(&mut self) -> Result<Operand, String> {
        self.skip_ws();
        match self.peek() {
            Some('@') | Some('$') => {
                let absolute = self.peek() == Some('$');
                self.pos += 1;
                Ok(Operand::Query(Query {
                    absolute,
                    steps: self.parse_query_steps()?,
                }))
            }
            Some('\'') | Some('"') => Ok(Operand::Literal(Value::String(self.parse_string()?))),
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number(),
            Some(_) => {
                for (word, value) in [
                    ("true", Value::Bool(true)),
                    ("false", Value::Bool(false)),
                    ("null", Value::Null),
                ] {
                    if self.starts_with(word) {
                        self.pos += word.len();
                        return Ok(Operand::Literal(value));
                    }
                }
                Err(format!("expected a query or literal at position {}", self.pos))
            }
            None => Err("expected a query or literal but reached end of expression".to_string()),
        }
    }

    fn parse_query_steps(&mut self) -> Result<Vec<QueryStep>, String> {
        let mut steps = Vec::new();
        loop {
            match self.peek() {
                Some('.') if self.peek_at(1) != Some('.') => {
                    self.pos += 1;
                    steps.push(QueryStep::Name(self.parse_name()?));
                }
                Some('[') => {
                    self.pos += 1;
                    self.skip_ws();
                    let step = match self.peek() {
                        Some('\'') | Some('"') => QueryStep::Name(self.parse_string()?),
                        _ => QueryStep::Index(self.parse_integer()?),
                    };
                    self.expect(']')?;
                    steps.push(step);
                }
                _ => return Ok(steps),
            }
        }
    }

    fn parse_number(&mut self) -> Result<Operand, String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        serde_json::from_str::<Value>(&text)
            .ok()
            .filter(Value::is_number)
            .map(Operand::Literal)
            .ok_or_else(|| format!("invalid number '{}' at position {}", text, start))
    }
}

//! Whitelisted filter language
//!
//! Filters are conjunctions of `field <op> value` clauses. The operator vocabulary is a
//! closed enum; both the bare (`gte`) and the native (`$gte`) spelling parse to the same
//! operator, so rewriting already-rewritten input is a no-op.

use crate::domain::{FolioError, Result};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

const AND_KEY: &str = "$and";
const OPTIONS_KEY: &str = "$options";

/// Comparison operator accepted in filter expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operator {
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// Member of a list
    In,
    /// Not a member of a list
    Nin,
    /// Equal
    Eq,
    /// Not equal
    Ne,
    /// Regular expression match
    Regex,
}

impl Operator {
    /// All operators, in vocabulary order
    pub const ALL: [Operator; 9] = [
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::In,
        Operator::Nin,
        Operator::Eq,
        Operator::Ne,
        Operator::Regex,
    ];

    /// Bare token (`gte`)
    pub fn token(&self) -> &'static str {
        match self {
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::In => "in",
            Operator::Nin => "nin",
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Regex => "regex",
        }
    }

    /// Native store spelling (`$gte`)
    pub fn native(&self) -> String {
        format!("${}", self.token())
    }

    /// Whether the operator takes a list value
    pub fn takes_list(&self) -> bool {
        matches!(self, Operator::In | Operator::Nin)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Operator {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        let bare = s.strip_prefix('$').unwrap_or(s);
        Operator::ALL
            .iter()
            .copied()
            .find(|op| op.token() == bare)
            .ok_or_else(|| FolioError::Validation(format!("Unsupported filter operator: '{s}'")))
    }
}

/// One `field <op> value` condition
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// Document field (dotted path for nested fields)
    pub field: String,
    /// Operator
    pub op: Operator,
    /// Operand
    pub value: Value,
    /// Case-insensitive matching (regex only)
    pub case_insensitive: bool,
}

impl Clause {
    /// Build a clause, rejecting operator-injection through the field name
    pub fn new(field: impl Into<String>, op: Operator, value: Value) -> Result<Self> {
        let field = field.into();
        validate_field(&field)?;
        if op.takes_list() && !value.is_array() {
            return Err(FolioError::Validation(format!(
                "Operator '{op}' on '{field}' requires a list value"
            )));
        }
        if op == Operator::Regex {
            let pattern = value.as_str().ok_or_else(|| {
                FolioError::Validation(format!("Operator 'regex' on '{field}' requires a string"))
            })?;
            regex::Regex::new(pattern).map_err(|e| {
                FolioError::Validation(format!("Invalid pattern for '{field}': {e}"))
            })?;
        }
        Ok(Self {
            field,
            op,
            value,
            case_insensitive: false,
        })
    }

    /// Case-insensitive substring match on a literal term
    pub fn contains_ignore_case(field: impl Into<String>, term: &str) -> Result<Self> {
        let mut clause = Self::new(field, Operator::Regex, Value::String(regex::escape(term)))?;
        clause.case_insensitive = true;
        Ok(clause)
    }

    /// Evaluate against a document
    pub fn matches(&self, document: &Value) -> bool {
        let actual = lookup(document, &self.field);
        match self.op {
            Operator::Eq => actual.map_or(self.value.is_null(), |a| values_equal(a, &self.value)),
            Operator::Ne => !actual.map_or(self.value.is_null(), |a| values_equal(a, &self.value)),
            Operator::Gt => compare(actual, &self.value) == Some(Ordering::Greater),
            Operator::Gte => matches!(
                compare(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::Lt => compare(actual, &self.value) == Some(Ordering::Less),
            Operator::Lte => matches!(
                compare(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Operator::In => self.list_contains(actual),
            Operator::Nin => !self.list_contains(actual),
            Operator::Regex => {
                let (Some(Value::String(text)), Some(pattern)) = (actual, self.value.as_str())
                else {
                    return false;
                };
                let pattern = if self.case_insensitive {
                    format!("(?i){pattern}")
                } else {
                    pattern.to_string()
                };
                regex::Regex::new(&pattern).map_or(false, |re| re.is_match(text))
            }
        }
    }

    fn render_into(&self, ops: &mut Map<String, Value>) {
        ops.insert(self.op.native(), self.value.clone());
        if self.case_insensitive {
            ops.insert(OPTIONS_KEY.to_string(), Value::String("i".to_string()));
        }
    }

    fn list_contains(&self, actual: Option<&Value>) -> bool {
        match (actual, self.value.as_array()) {
            (Some(a), Some(list)) => list.iter().any(|v| values_equal(a, v)),
            _ => false,
        }
    }
}

/// Conjunction of clauses; empty matches every document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    /// Filter matching every document
    pub fn all() -> Self {
        Self::default()
    }

    /// Single equality clause
    pub fn eq(field: &str, value: impl Into<Value>) -> Result<Self> {
        Ok(Self::all().with(Clause::new(field, Operator::Eq, value.into())?))
    }

    /// Add a clause
    pub fn with(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Conjunction of two filters
    pub fn and(mut self, other: Filter) -> Self {
        self.clauses.extend(other.clauses);
        self
    }

    /// Clauses in insertion order
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Whether the filter matches everything
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluate against a document
    pub fn matches(&self, document: &Value) -> bool {
        self.clauses.iter().all(|c| c.matches(document))
    }

    /// Render the native `{"field": {"$op": value}}` form
    ///
    /// A clause whose field already carries the same operator (or a second regex on one
    /// field) is rendered as its own condition under `$and`, so no clause is lost.
    pub fn to_store_document(&self) -> Value {
        let mut root = Map::new();
        let mut conjuncts = Vec::new();
        for clause in &self.clauses {
            let entry = root
                .entry(clause.field.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            let Value::Object(ops) = entry else {
                continue;
            };
            let taken = ops.contains_key(&clause.op.native())
                || (clause.op == Operator::Regex && ops.contains_key(OPTIONS_KEY));
            if taken {
                let mut single = Map::new();
                clause.render_into(&mut single);
                let mut condition = Map::new();
                condition.insert(clause.field.clone(), Value::Object(single));
                conjuncts.push(Value::Object(condition));
            } else {
                clause.render_into(ops);
            }
        }
        if !conjuncts.is_empty() {
            root.insert(AND_KEY.to_string(), Value::Array(conjuncts));
        }
        Value::Object(root)
    }

    /// Parse a parameter object of the form `{"field": {"op": value}}`
    ///
    /// Bare and `$`-prefixed operator keys are both accepted; a scalar value is an
    /// equality. `$options: "i"` marks a regex clause case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns a validation error for unknown operators, `$`-prefixed field names or a
    /// non-object root.
    pub fn from_store_document(document: &Value) -> Result<Self> {
        let Value::Object(fields) = document else {
            return Err(FolioError::Validation(
                "Filter must be an object of field conditions".to_string(),
            ));
        };

        let mut filter = Filter::all();
        for (field, condition) in fields.iter().filter(|(field, _)| field.as_str() != AND_KEY) {
            match condition {
                Value::Object(ops) => {
                    let case_insensitive = ops
                        .iter()
                        .find(|(k, _)| k.as_str() == OPTIONS_KEY || k.as_str() == "options")
                        .map_or(false, |(_, v)| v.as_str().map_or(false, |s| s.contains('i')));
                    for (token, value) in ops {
                        if token == OPTIONS_KEY || token == "options" {
                            continue;
                        }
                        let op: Operator = token.parse()?;
                        let mut clause = Clause::new(field.clone(), op, value.clone())?;
                        clause.case_insensitive = op == Operator::Regex && case_insensitive;
                        filter = filter.with(clause);
                    }
                }
                scalar => {
                    filter = filter.with(Clause::new(field.clone(), Operator::Eq, scalar.clone())?)
                }
            }
        }

        // repeated conditions follow the per-field ones, as rendered
        if let Some(conjuncts) = fields.get(AND_KEY) {
            let Value::Array(conditions) = conjuncts else {
                return Err(FolioError::Validation(
                    "'$and' requires a list of conditions".to_string(),
                ));
            };
            for nested in conditions {
                filter = filter.and(Self::from_store_document(nested)?);
            }
        }
        Ok(filter)
    }
}

/// Rewrite bare operator keys into the store's native syntax
///
/// `{"price": {"gte": 100}}` becomes `{"price": {"$gte": 100}}`; input already in native
/// form is returned unchanged.
///
/// # Errors
///
/// Returns a validation error for tokens outside the operator vocabulary.
pub fn rewrite_operators(params: &Value) -> Result<Value> {
    Ok(Filter::from_store_document(params)?.to_store_document())
}

fn validate_field(field: &str) -> Result<()> {
    if field.is_empty() {
        return Err(FolioError::Validation("Filter field cannot be empty".to_string()));
    }
    if field.starts_with('$') {
        return Err(FolioError::Validation(format!(
            "Filter field cannot start with '$': '{field}'"
        )));
    }
    if !field
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        return Err(FolioError::Validation(format!(
            "Invalid filter field: '{field}'"
        )));
    }
    Ok(())
}

/// Resolve a dotted path inside a document
pub(crate) fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(document, |current, segment| current.get(segment))
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

pub(crate) fn compare(actual: Option<&Value>, expected: &Value) -> Option<Ordering> {
    match (actual?, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

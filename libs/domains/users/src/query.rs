//! Query-string translation into MongoDB filters and sorts
//!
//! Follows the `api-query-params` grammar:
//!
//! ```text
//! name=Ann            { name: "Ann" }
//! age>=18&age<65      { age: { $gte: 18, $lt: 65 } }
//! email=/example/i    { email: { $regex: "example", $options: "i" } }
//! status!=a,b         { status: { $nin: ["a", "b"] } }
//! phone               { phone: { $exists: true } }
//! !phone              { phone: { $exists: false } }
//! sort=-createdAt     createdAt descending
//! ```
//!
//! Translation never fails. Pagination keys are split out and left for
//! [`PageRequest`](crate::pagination::PageRequest) to interpret.

use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::{self, Bson, Document, doc, oid::ObjectId};
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::LazyLock;

const SORT_KEY: &str = "sort";
const CURRENT_KEY: &str = "current";
const PAGE_SIZE_KEY: &str = "pageSize";
/// Control keys of the query grammar that never become filters.
const IGNORED_KEYS: &[&str] = &["skip", "limit", "fields", "populate"];

static PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>!?)(?P<key>[^><!=]*)(?P<op>[><]=?|!?=|)(?P<value>.*)$").unwrap()
});
static INTEGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(0|[1-9]\d*)$").unwrap()
});
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(0|[1-9]\d*)\.\d+$").unwrap()
});
static REGEX_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(?P<pattern>.*)/(?P<flags>[a-z]*)$").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    fn as_i32(self) -> i32 {
        match self {
            Direction::Ascending => 1,
            Direction::Descending => -1,
        }
    }
}

/// A `/source/flags` literal, compiled once for in-memory evaluation.
///
/// `compiled` is `None` when the `regex` crate rejects the source; such a
/// pattern still renders to `$regex` but matches nothing in memory.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub source: String,
    /// MongoDB `$options`, restricted to `imsx`
    pub options: String,
    compiled: Option<Regex>,
}

impl Pattern {
    pub fn new(source: impl Into<String>, flags: &str) -> Self {
        let source = source.into();
        let options: String = flags
            .chars()
            .filter(|c| matches!(c, 'i' | 'm' | 's' | 'x'))
            .collect();
        let compiled = RegexBuilder::new(&source)
            .case_insensitive(options.contains('i'))
            .multi_line(options.contains('m'))
            .dot_matches_new_line(options.contains('s'))
            .ignore_whitespace(options.contains('x'))
            .build()
            .ok();
        Self {
            source,
            options,
            compiled,
        }
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    fn matches(&self, value: Option<&Bson>) -> bool {
        match (value, &self.compiled) {
            (Some(Bson::String(text)), Some(re)) => re.is_match(text),
            _ => false,
        }
    }

    fn to_document(&self) -> Document {
        doc! { "$regex": self.source.clone(), "$options": self.options.clone() }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.options == other.options
    }
}

/// A match condition on a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(Bson),
    Ne(Bson),
    Gt(Bson),
    Gte(Bson),
    Lt(Bson),
    Lte(Bson),
    In(Vec<Bson>),
    Nin(Vec<Bson>),
    Regex(Pattern),
    NotRegex(Pattern),
    Exists(bool),
    /// Several operator conditions that must all hold
    Many(Vec<Condition>),
}

impl Condition {
    fn operator(&self) -> Option<&'static str> {
        Some(match self {
            Condition::Eq(_) | Condition::Many(_) => return None,
            Condition::Ne(_) => "$ne",
            Condition::Gt(_) => "$gt",
            Condition::Gte(_) => "$gte",
            Condition::Lt(_) => "$lt",
            Condition::Lte(_) => "$lte",
            Condition::In(_) => "$in",
            Condition::Nin(_) => "$nin",
            Condition::Regex(_) => "$regex",
            Condition::NotRegex(_) => "$not",
            Condition::Exists(_) => "$exists",
        })
    }

    /// Combine with a later condition on the same key.
    ///
    /// Equality replaces whatever was there. Operators accumulate, and a
    /// repeated operator keeps its last value.
    fn merge(self, next: Condition) -> Condition {
        let Some(op) = next.operator() else {
            return next;
        };

        let mut parts = match self {
            Condition::Eq(_) => Vec::new(),
            Condition::Many(parts) => parts,
            single => vec![single],
        };
        parts.retain(|c| c.operator() != Some(op));
        parts.push(next);

        if parts.len() == 1 {
            parts.pop().unwrap_or(Condition::Many(Vec::new()))
        } else {
            Condition::Many(parts)
        }
    }

    fn write_operators(&self, out: &mut Document) {
        match self {
            Condition::Eq(_) => {}
            Condition::Ne(v) => {
                out.insert("$ne", v.clone());
            }
            Condition::Gt(v) => {
                out.insert("$gt", v.clone());
            }
            Condition::Gte(v) => {
                out.insert("$gte", v.clone());
            }
            Condition::Lt(v) => {
                out.insert("$lt", v.clone());
            }
            Condition::Lte(v) => {
                out.insert("$lte", v.clone());
            }
            Condition::In(vs) => {
                out.insert("$in", vs.clone());
            }
            Condition::Nin(vs) => {
                out.insert("$nin", vs.clone());
            }
            Condition::Regex(pattern) => {
                for (key, value) in pattern.to_document() {
                    out.insert(key, value);
                }
            }
            Condition::NotRegex(pattern) => {
                out.insert("$not", pattern.to_document());
            }
            Condition::Exists(b) => {
                out.insert("$exists", *b);
            }
            Condition::Many(parts) => parts.iter().for_each(|c| c.write_operators(out)),
        }
    }

    fn to_bson(&self) -> Bson {
        if let Condition::Eq(v) = self {
            return v.clone();
        }
        let mut out = Document::new();
        self.write_operators(&mut out);
        Bson::Document(out)
    }

    /// Evaluate against a field value, `None` meaning the field is absent.
    fn matches(&self, value: Option<&Bson>) -> bool {
        match self {
            Condition::Eq(expected) => match value {
                Some(v) => values_equal(v, expected),
                None => matches!(expected, Bson::Null),
            },
            Condition::Ne(expected) => !Condition::Eq(expected.clone()).matches(value),
            Condition::Gt(b) => ordered(value, b, |o| o == Ordering::Greater),
            Condition::Gte(b) => ordered(value, b, |o| o != Ordering::Less),
            Condition::Lt(b) => ordered(value, b, |o| o == Ordering::Less),
            Condition::Lte(b) => ordered(value, b, |o| o != Ordering::Greater),
            Condition::In(options) => options
                .iter()
                .any(|o| Condition::Eq(o.clone()).matches(value)),
            Condition::Nin(options) => !Condition::In(options.clone()).matches(value),
            Condition::Regex(pattern) => pattern.matches(value),
            Condition::NotRegex(pattern) => !pattern.matches(value),
            Condition::Exists(expected) => value.is_some() == *expected,
            Condition::Many(parts) => parts.iter().all(|c| c.matches(value)),
        }
    }
}

/// Field conditions keyed by (possibly dotted) field path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: BTreeMap<String, Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition, merging with any existing one on the same key.
    pub fn insert(&mut self, key: impl Into<String>, condition: Condition) {
        let key = key.into();
        let merged = match self.conditions.remove(&key) {
            Some(existing) => existing.merge(condition),
            None => condition,
        };
        self.conditions.insert(key, merged);
    }

    pub fn get(&self, key: &str) -> Option<&Condition> {
        self.conditions.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.conditions.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Condition)> {
        self.conditions.iter()
    }

    pub fn to_document(&self) -> Document {
        self.conditions
            .iter()
            .map(|(k, c)| (k.clone(), c.to_bson()))
            .collect()
    }

    /// In-process evaluation with MongoDB comparison semantics.
    ///
    /// Comparisons only hold between values of the same type family
    /// (numbers compare across integer and double).
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(path, condition)| condition.matches(lookup(doc, path)))
    }
}

/// Ordered sort keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<(String, Direction)>,
}

impl SortSpec {
    /// Parse a `sort` value such as `-createdAt,name`.
    pub fn parse(raw: &str) -> Self {
        let keys = raw
            .split(',')
            .map(str::trim)
            .filter_map(|token| {
                let (field, direction) = match token.strip_prefix('-') {
                    Some(rest) => (rest, Direction::Descending),
                    None => (token.trim_start_matches('+'), Direction::Ascending),
                };
                (!field.is_empty()).then(|| (field.to_string(), direction))
            })
            .collect();
        Self { keys }
    }

    pub fn by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.keys.push((field.into(), direction));
        self
    }

    pub fn keys(&self) -> &[(String, Direction)] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn to_document(&self) -> Document {
        self.keys
            .iter()
            .map(|(k, d)| (k.clone(), Bson::Int32(d.as_i32())))
            .collect()
    }

    /// Order two documents by these keys; absent fields sort first.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        for (path, direction) in &self.keys {
            let ordering = sort_order(lookup(a, path), lookup(b, path));
            let ordering = match direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Result of translating one query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedQuery {
    pub filter: Filter,
    pub sort: SortSpec,
    pub current: Option<String>,
    pub page_size: Option<String>,
}

/// Translate a raw query string (without the leading `?`).
pub fn parse(raw: &str) -> ParsedQuery {
    let mut parsed = ParsedQuery::default();

    for param in raw.split('&').filter(|p| !p.is_empty()) {
        let param = decode(param);
        let Some(caps) = PARAM.captures(&param) else {
            continue;
        };
        let key = caps["key"].trim();
        if key.is_empty() {
            continue;
        }
        let negated = !caps["prefix"].is_empty();
        let op = &caps["op"];
        let value = &caps["value"];

        match key {
            SORT_KEY => {
                parsed.sort = SortSpec::parse(value);
                continue;
            }
            CURRENT_KEY => {
                parsed.current = Some(value.to_string());
                continue;
            }
            PAGE_SIZE_KEY => {
                parsed.page_size = Some(value.to_string());
                continue;
            }
            k if IGNORED_KEYS.contains(&k) => continue,
            _ => {}
        }

        let condition = if op.is_empty() {
            Condition::Exists(!negated)
        } else {
            build_condition(key, op, value)
        };
        parsed.filter.insert(key, condition);
    }

    parsed
}

fn decode(param: &str) -> String {
    let spaced = param.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

fn build_condition(key: &str, op: &str, value: &str) -> Condition {
    match op {
        "=" | "!=" => {
            let negate = op == "!=";
            if let Some(caps) = REGEX_LITERAL.captures(value) {
                let pattern = Pattern::new(&caps["pattern"], &caps["flags"]);
                if negate {
                    Condition::NotRegex(pattern)
                } else {
                    Condition::Regex(pattern)
                }
            } else if value.contains(',') {
                let values = value.split(',').map(|v| cast(key, v)).collect();
                if negate {
                    Condition::Nin(values)
                } else {
                    Condition::In(values)
                }
            } else if negate {
                Condition::Ne(cast(key, value))
            } else {
                Condition::Eq(cast(key, value))
            }
        }
        ">" => Condition::Gt(cast(key, value)),
        ">=" => Condition::Gte(cast(key, value)),
        "<" => Condition::Lt(cast(key, value)),
        "<=" => Condition::Lte(cast(key, value)),
        _ => Condition::Eq(Bson::String(format!("{op}{value}"))),
    }
}

/// Infer a BSON value from query text.
pub fn cast(key: &str, value: &str) -> Bson {
    if let Some(inner) = unquote(value) {
        return Bson::String(inner.to_string());
    }
    match value {
        "true" => return Bson::Boolean(true),
        "false" => return Bson::Boolean(false),
        "null" => return Bson::Null,
        _ => {}
    }
    if INTEGER.is_match(value) {
        if let Ok(n) = value.parse::<i64>() {
            return Bson::Int64(n);
        }
    }
    if DECIMAL.is_match(value) {
        if let Ok(n) = value.parse::<f64>() {
            return Bson::Double(n);
        }
    }
    if let Some(date) = parse_date(value) {
        return Bson::DateTime(bson::DateTime::from_millis(date.timestamp_millis()));
    }
    if key == "_id" {
        if let Ok(oid) = ObjectId::parse_str(value) {
            return Bson::ObjectId(oid);
        }
    }
    Bson::String(value.to_string())
}

fn unquote(value: &str) -> Option<&str> {
    ['\'', '"'].into_iter().find_map(|q| {
        value
            .strip_prefix(q)
            .and_then(|rest| rest.strip_suffix(q))
    })
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Bson::Document(inner) => inner.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

/// Same-family comparison; `None` across types.
fn compare(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_f64(a), as_f64(b)) {
        return x.partial_cmp(&y);
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.bytes().cmp(&y.bytes())),
        (Bson::Null, Bson::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn values_equal(actual: &Bson, expected: &Bson) -> bool {
    if let Bson::Array(items) = actual {
        if !matches!(expected, Bson::Array(_)) {
            return items.iter().any(|item| values_equal(item, expected));
        }
    }
    match compare(actual, expected) {
        Some(ordering) => ordering == Ordering::Equal,
        None => actual == expected,
    }
}

fn ordered(value: Option<&Bson>, bound: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
    match value {
        Some(Bson::Array(items)) => items
            .iter()
            .any(|item| compare(item, bound).is_some_and(&accept)),
        Some(v) => compare(v, bound).is_some_and(accept),
        None => false,
    }
}

/// Cross-type sort position, loosely following MongoDB's BSON order.
fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) => 0,
        Some(Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_)) => 1,
        Some(Bson::String(_)) => 2,
        Some(Bson::Document(_)) => 3,
        Some(Bson::Array(_)) => 4,
        Some(Bson::ObjectId(_)) => 5,
        Some(Bson::Boolean(_)) => 6,
        Some(Bson::DateTime(_)) => 7,
        Some(_) => 8,
    }
}

fn sort_order(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            compare(x, y).unwrap_or_else(|| type_rank(a).cmp(&type_rank(b)))
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

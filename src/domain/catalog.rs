//! Argument type catalog - named argument types, each with a parser from raw text to a typed value

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::lookup::normalize_key;
use crate::application::errors::ParseFailure;

/// Semantic type of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Text,
    Integer,
    Number,
    Boolean,
    Duration,
    UserId,
    Choice,
}

/// A typed argument value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Duration(Duration),
    UserId(u64),
    /// Normalized name of the chosen variant
    Choice(String),
}

impl Value {
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Text(_) => TypeTag::Text,
            Value::Integer(_) => TypeTag::Integer,
            Value::Number(_) => TypeTag::Number,
            Value::Boolean(_) => TypeTag::Boolean,
            Value::Duration(_) => TypeTag::Duration,
            Value::UserId(_) => TypeTag::UserId,
            Value::Choice(_) => TypeTag::Choice,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) | Value::Choice(s) => write!(f, "{}", s),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Duration(d) => write!(f, "{}s", d.as_secs()),
            Value::UserId(id) => write!(f, "{}", id),
        }
    }
}

/// Parser function type. The error string explains why the token was refused.
pub type Parser = Arc<dyn Fn(&str) -> Result<Value, String> + Send + Sync>;

/// A named argument type. Without a parser an entry is unsafe and cannot back a command argument.
#[derive(Clone)]
pub struct CatalogEntry {
    pub name: String,
    pub tag: TypeTag,
    parser: Option<Parser>,
}

impl CatalogEntry {
    pub fn new<F>(name: impl Into<String>, tag: TypeTag, parser: F) -> Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            tag,
            parser: Some(Arc::new(parser)),
        }
    }

    pub fn without_parser(name: impl Into<String>, tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            tag,
            parser: None,
        }
    }

    /// Entry accepting one of a fixed set of names, matched case and whitespace insensitively.
    pub fn choice<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let variants: Vec<String> = variants.into_iter().map(|v| normalize_key(v.as_ref())).collect();
        Self::new(name, TypeTag::Choice, move |raw| {
            let key = normalize_key(raw);
            if variants.contains(&key) {
                Ok(Value::Choice(key))
            } else {
                Err(format!("expected one of {}", variants.join(", ").to_lowercase()))
            }
        })
    }

    pub fn has_parser(&self) -> bool {
        self.parser.is_some()
    }

    /// Converts one raw token.
    pub fn parse(&self, raw: &str) -> Result<Value, ParseFailure> {
        let parser = self
            .parser
            .as_ref()
            .ok_or_else(|| ParseFailure::new(&self.name, raw, "argument type has no parser"))?;
        parser(raw).map_err(|reason| ParseFailure::new(&self.name, raw, reason))
    }
}

impl fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("has_parser", &self.has_parser())
            .finish()
    }
}

/// Registry of argument types, keyed by name
#[derive(Default)]
pub struct ArgumentCatalog {
    entries: RwLock<HashMap<String, Arc<CatalogEntry>>>,
}

impl ArgumentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog preloaded with `string`, `integer`, `number`, `boolean`, `duration` and `user-id`.
    pub fn with_builtins() -> Self {
        let catalog = Self::new();
        for entry in builtin_entries() {
            catalog.insert(entry);
        }
        catalog
    }

    /// Adds an entry, returning the one it replaced.
    pub fn insert(&self, entry: CatalogEntry) -> Option<Arc<CatalogEntry>> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(entry.name.clone(), Arc::new(entry))
    }

    pub fn get(&self, name: &str) -> Option<Arc<CatalogEntry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// An entry is usable for commands only when it carries a parser.
    pub fn validate(entry: &CatalogEntry) -> bool {
        entry.has_parser()
    }

    pub fn parse(entry: &CatalogEntry, raw: &str) -> Result<Value, ParseFailure> {
        entry.parse(raw)
    }
}

static DURATION_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+[wdhms])+$").expect("valid duration regex"));
static DURATION_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)([wdhms])").expect("valid duration part regex"));
static MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<@!?(\d+)>$").expect("valid mention regex"));

fn builtin_entries() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new("string", TypeTag::Text, |raw| Ok(Value::Text(raw.to_string()))),
        CatalogEntry::new("integer", TypeTag::Integer, |raw| {
            raw.parse::<i64>()
                .map(Value::Integer)
                .map_err(|e| e.to_string())
        }),
        CatalogEntry::new("number", TypeTag::Number, |raw| {
            match raw.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Value::Number(n)),
                Ok(_) => Err("number must be finite".to_string()),
                Err(e) => Err(e.to_string()),
            }
        }),
        CatalogEntry::new("boolean", TypeTag::Boolean, parse_boolean),
        CatalogEntry::new("duration", TypeTag::Duration, parse_duration),
        CatalogEntry::new("user-id", TypeTag::UserId, parse_user_id),
    ]
}

fn parse_boolean(raw: &str) -> Result<Value, String> {
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "on" => Ok(Value::Boolean(true)),
        "false" | "no" | "off" => Ok(Value::Boolean(false)),
        _ => Err("expected true/false, yes/no or on/off".to_string()),
    }
}

/// Parses compact durations such as `45s`, `10m`, `1h30m` or `2w`.
fn parse_duration(raw: &str) -> Result<Value, String> {
    let raw = raw.to_lowercase();
    if !DURATION_FORMAT.is_match(&raw) {
        return Err("expected a duration like 30s, 10m or 1h30m".to_string());
    }

    let mut secs: u64 = 0;
    for caps in DURATION_PART.captures_iter(&raw) {
        let amount: u64 = caps[1].parse().map_err(|_| "duration amount too large".to_string())?;
        let unit = match &caps[2] {
            "w" => 7 * 24 * 3600,
            "d" => 24 * 3600,
            "h" => 3600,
            "m" => 60,
            _ => 1,
        };
        secs = amount
            .checked_mul(unit)
            .and_then(|part| secs.checked_add(part))
            .ok_or_else(|| "duration too large".to_string())?;
    }
    Ok(Value::Duration(Duration::from_secs(secs)))
}

/// Accepts a bare id or a mention (`<@42>`, `<@!42>`).
fn parse_user_id(raw: &str) -> Result<Value, String> {
    let digits = MENTION
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err("expected a numeric user id or mention".to_string());
    }
    digits
        .parse::<u64>()
        .map(Value::UserId)
        .map_err(|e| e.to_string())
}

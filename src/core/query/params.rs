//! Untyped request parameters
//!
//! Query strings are decoded with `url::form_urlencoded`. Bracket syntax
//! (`price[gte]=100`) becomes an operator condition; reserved keys drive pagination and
//! sorting; every other key is kept as a plain field value.

use super::filter::Operator;
use crate::domain::{FolioError, Result};
use serde_json::Value;
use std::collections::BTreeMap;

const RESERVED_KEYS: &[&str] = &["page", "size", "sort", "sortBy"];

/// Parameters of one listing request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawParams {
    /// Requested page (1-based)
    pub page: Option<i64>,
    /// Requested page size
    pub size: Option<i64>,
    /// `"field direction"` sort expression
    pub sort: Option<String>,
    /// Plain `field=value` pairs
    pub fields: BTreeMap<String, String>,
    /// Bracketed `field[op]=value` conditions
    pub conditions: BTreeMap<String, BTreeMap<Operator, Value>>,
}

impl RawParams {
    /// Parse a URL query string (with or without the leading `?`)
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-numeric page or size, an unknown operator
    /// token, or a malformed bracket expression.
    ///
    /// # Examples
    ///
    /// ```
    /// use folio::core::query::RawParams;
    ///
    /// let params = RawParams::parse("page=2&size=5&pages[gte]=100&title=dune").unwrap();
    /// assert_eq!(params.page, Some(2));
    /// assert_eq!(params.fields["title"], "dune");
    /// assert_eq!(params.conditions["pages"].len(), 1);
    /// ```
    pub fn parse(query: &str) -> Result<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(
            url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned())),
        )
    }

    /// Build from already-decoded key/value pairs
    ///
    /// # Errors
    ///
    /// Same as [`RawParams::parse`].
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Result<Self> {
        let mut params = RawParams::default();

        for (key, value) in pairs {
            if RESERVED_KEYS.contains(&key.as_str()) {
                params.set_reserved(&key, value)?;
                continue;
            }

            match split_bracket(&key)? {
                Some((field, token)) => {
                    let op: Operator = token.parse()?;
                    let operand = if op.takes_list() {
                        Value::Array(
                            value
                                .split(',')
                                .map(str::trim)
                                .filter(|s| !s.is_empty())
                                .map(coerce_scalar)
                                .collect(),
                        )
                    } else if op == Operator::Regex {
                        Value::String(value)
                    } else {
                        coerce_scalar(&value)
                    };
                    params
                        .conditions
                        .entry(field.to_string())
                        .or_default()
                        .insert(op, operand);
                }
                None => {
                    params.fields.insert(key, value);
                }
            }
        }

        Ok(params)
    }

    fn set_reserved(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "page" => self.page = parse_optional_int("page", &value)?,
            "size" => self.size = parse_optional_int("size", &value)?,
            // `sort` wins over the `sortBy` alias
            "sortBy" => {
                if self.sort.is_none() && !value.trim().is_empty() {
                    self.sort = Some(value);
                }
            }
            _ => {
                if !value.trim().is_empty() {
                    self.sort = Some(value);
                }
            }
        }
        Ok(())
    }
}

fn parse_optional_int(name: &str, value: &str) -> Result<Option<i64>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<i64>()
        .map(Some)
        .map_err(|_| FolioError::Validation(format!("'{name}' must be an integer, got '{value}'")))
}

/// Split `field[op]` into its parts
fn split_bracket(key: &str) -> Result<Option<(&str, &str)>> {
    let Some(open) = key.find('[') else {
        if key.contains(']') {
            return Err(FolioError::Validation(format!("Malformed parameter: '{key}'")));
        }
        return Ok(None);
    };
    let rest = &key[open + 1..];
    match rest.strip_suffix(']') {
        Some(token) if open > 0 && !token.is_empty() && !token.contains(['[', ']']) => {
            Ok(Some((&key[..open], token)))
        }
        _ => Err(FolioError::Validation(format!("Malformed parameter: '{key}'"))),
    }
}

/// Numbers and booleans become typed JSON values; everything else stays a string
pub fn coerce_scalar(value: &str) -> Value {
    let trimmed = value.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return Value::from(f);
        }
    }
    match trimmed {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bracket_conditions() {
        let params = RawParams::parse("?price[gte]=100&price[lt]=200.5&tags[in]=a,b").unwrap();
        assert_eq!(params.conditions["price"][&Operator::Gte], json!(100));
        assert_eq!(params.conditions["price"][&Operator::Lt], json!(200.5));
        assert_eq!(params.conditions["tags"][&Operator::In], json!(["a", "b"]));
    }

    #[test]
    fn test_encoded_brackets() {
        let params = RawParams::parse("pages%5Blte%5D=300").unwrap();
        assert_eq!(params.conditions["pages"][&Operator::Lte], json!(300));
    }

    #[test]
    fn test_unknown_operator_rejected() {
        assert!(RawParams::parse("price[where]=1").is_err());
        assert!(RawParams::parse("[gte]=1").is_err());
        assert!(RawParams::parse("price[gte=1").is_err());
    }

    #[test]
    fn test_sort_alias() {
        let params = RawParams::parse("sortBy=name%20asc").unwrap();
        assert_eq!(params.sort.as_deref(), Some("name asc"));

        let params = RawParams::parse("sort=title+desc&sortBy=name").unwrap();
        assert_eq!(params.sort.as_deref(), Some("title desc"));
    }

    #[test]
    fn test_page_must_be_numeric() {
        assert!(RawParams::parse("page=two").is_err());
        assert_eq!(RawParams::parse("page=").unwrap().page, None);
    }

    #[test]
    fn test_regex_operand_not_coerced() {
        let params = RawParams::parse("releaseDate[regex]=2020").unwrap();
        assert_eq!(params.conditions["releaseDate"][&Operator::Regex], json!("2020"));
    }

    #[test]
    fn test_coerce_scalar() {
        assert_eq!(coerce_scalar("42"), json!(42));
        assert_eq!(coerce_scalar("true"), json!(true));
        assert_eq!(coerce_scalar("dune"), json!("dune"));
    }
}

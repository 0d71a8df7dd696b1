//! Parsers for the filter, assignment and order arguments.

use folio_db::{CompareOp, FilterValue, SortDirection, Value};

use crate::error::{CliError, CliResult};

const OPERATOR_CHARS: &[char] = &['=', '!', '<', '>', '~'];

/// One `KEY<op>VALUE[,VALUE...]` filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub key: String,
    pub op: CompareOp,
    pub values: Vec<String>,
}

impl Filter {
    /// Values as text, for custom field comparisons.
    pub fn text_values(&self) -> FilterValue {
        self.wrap(self.values.iter().cloned().map(Value::Text).collect())
    }

    /// Values as numbers where every one parses as a finite number, text
    /// otherwise. Integers stay integers.
    pub fn typed_values(&self) -> FilterValue {
        let numbers: Option<Vec<Value>> = self
            .values
            .iter()
            .map(|value| parse_number(value.trim()))
            .collect();
        match numbers {
            Some(values) => self.wrap(values),
            None => self.text_values(),
        }
    }

    fn wrap(&self, mut values: Vec<Value>) -> FilterValue {
        if values.len() == 1 {
            FilterValue::Scalar(values.remove(0))
        } else {
            FilterValue::Collection(values)
        }
    }
}

fn parse_number(value: &str) -> Option<Value> {
    if let Ok(integer) = value.parse::<i64>() {
        return Some(Value::Integer(integer));
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|real| real.is_finite())
        .map(Value::Real)
}

pub fn parse_filter(input: &str) -> CliResult<Filter> {
    let invalid = || CliError::InvalidFilter(input.to_string());

    let start = input.find(OPERATOR_CHARS).ok_or_else(invalid)?;
    let key = input[..start].trim();
    if key.is_empty() {
        return Err(invalid());
    }

    let rest = &input[start..];
    let end = rest
        .find(|c: char| !OPERATOR_CHARS.contains(&c))
        .unwrap_or(rest.len());
    let op = match &rest[..end] {
        "~" => CompareOp::Like,
        "!~" => CompareOp::NotLike,
        token => token.parse::<CompareOp>().map_err(|_| invalid())?,
    };

    Ok(Filter {
        key: key.to_string(),
        op,
        values: rest[end..].split(',').map(String::from).collect(),
    })
}

pub fn parse_assignment(input: &str) -> CliResult<(String, String)> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(CliError::InvalidAssignment(input.to_string())),
    }
}

pub fn parse_order(input: &str) -> CliResult<(String, SortDirection)> {
    let (name, direction) = match input.rsplit_once(':') {
        Some((name, direction)) => (
            name,
            direction
                .parse::<SortDirection>()
                .map_err(|_| CliError::InvalidOrder(input.to_string()))?,
        ),
        None => (input, SortDirection::Asc),
    };
    if name.trim().is_empty() {
        return Err(CliError::InvalidOrder(input.to_string()));
    }
    Ok((name.trim().to_string(), direction))
}

/// Field values given on the command line are JSON when they parse as JSON.
pub fn field_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_filter_operators() {
        let cases = [
            ("featured=yes", CompareOp::Eq),
            ("featured==yes", CompareOp::Eq),
            ("featured!=yes", CompareOp::NotEq),
            ("price>10", CompareOp::Gt),
            ("price>=10", CompareOp::Gte),
            ("price<10", CompareOp::Lt),
            ("price<=10", CompareOp::Lte),
            ("title~%rust%", CompareOp::Like),
            ("title!~%rust%", CompareOp::NotLike),
        ];
        for (input, op) in cases {
            let filter = parse_filter(input).unwrap();
            assert_eq!(filter.op, op, "{input}");
        }
    }

    #[test]
    fn test_parse_filter_values() {
        let filter = parse_filter("color = red,blue").unwrap();
        assert_eq!(filter.key, "color");
        assert_eq!(filter.values, vec![" red", "blue"]);
        assert!(matches!(filter.text_values(), FilterValue::Collection(ref v) if v.len() == 2));

        let filter = parse_filter("ID=4").unwrap();
        assert_eq!(
            filter.typed_values(),
            FilterValue::Scalar(Value::Integer(4))
        );
        assert_eq!(
            filter.text_values(),
            FilterValue::Scalar(Value::Text("4".into()))
        );

        let filter = parse_filter("price>=9.5,20").unwrap();
        assert_eq!(
            filter.typed_values(),
            FilterValue::Collection(vec![Value::Real(9.5), Value::Integer(20)])
        );
        let filter = parse_filter("mood=nan").unwrap();
        assert_eq!(
            filter.typed_values(),
            FilterValue::Scalar(Value::Text("nan".into()))
        );

        let filter = parse_filter("ID=4,x").unwrap();
        assert_eq!(
            filter.typed_values(),
            FilterValue::Collection(vec![Value::Text("4".into()), Value::Text("x".into())])
        );
    }

    #[test]
    fn test_parse_filter_rejects_garbage() {
        assert!(matches!(
            parse_filter("featured"),
            Err(CliError::InvalidFilter(_))
        ));
        assert!(matches!(parse_filter("=yes"), Err(CliError::InvalidFilter(_))));
        assert!(matches!(
            parse_filter("a=!<b"),
            Err(CliError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_parse_assignment_and_order() {
        assert_eq!(
            parse_assignment("seo.title=Hello = World").unwrap(),
            ("seo.title".to_string(), "Hello = World".to_string())
        );
        assert!(parse_assignment("=x").is_err());
        assert!(parse_assignment("novalue").is_err());

        assert_eq!(
            parse_order("post_date:desc").unwrap(),
            ("post_date".to_string(), SortDirection::Desc)
        );
        assert_eq!(
            parse_order("title").unwrap(),
            ("title".to_string(), SortDirection::Asc)
        );
        assert!(parse_order("title:sideways").is_err());
    }

    #[test]
    fn test_field_value_parses_json() {
        assert_eq!(field_value("12"), json!(12));
        assert_eq!(field_value("[1,2]"), json!([1, 2]));
        assert_eq!(field_value("hello"), json!("hello"));
    }
}

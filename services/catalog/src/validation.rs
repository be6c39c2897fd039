//! Payload validation
//!
//! Payloads arrive as raw JSON objects and are checked field by field against
//! a per-kind [`Schema`]. Checking is exhaustive: every violated field is
//! reported, in schema order. Only fields named by the schema are read, so
//! unknown keys never reach storage.

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::{collections::BTreeMap, fmt, sync::OnceLock};

/// Raw request body of a write operation
pub type Payload = Map<String, Value>;

/// Maximum length of every text column
pub const MAX_TEXT_LEN: usize = 255;

/// Whether a payload creates a row or patches an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Required fields must be present
    Create,
    /// Every field is optional, present ones obey the create rules
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text { max_len: usize },
    Email { max_len: usize },
    /// Integer strictly greater than the bound
    Integer { greater_than: i64 },
    Boolean,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Must be present on create
    pub required: bool,
    /// Accepts `null` and the empty string
    pub nullable: bool,
}

impl FieldRule {
    pub const fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text { max_len: MAX_TEXT_LEN })
    }

    pub const fn email(name: &'static str) -> Self {
        Self::new(name, FieldKind::Email { max_len: MAX_TEXT_LEN })
    }

    pub const fn integer_above(name: &'static str, greater_than: i64) -> Self {
        Self::new(name, FieldKind::Integer { greater_than })
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            nullable: false,
        }
    }
}

/// Field rules of one resource kind
#[derive(Debug)]
pub struct Schema {
    /// Field carrying the natural key
    pub key: &'static str,
    pub fields: &'static [FieldRule],
}

/// Machine-readable reason a field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Required,
    NullValue,
    StringType,
    StringEmpty,
    StringTooLong,
    EmailFormat,
    IntegerType,
    IntegerRange,
    BooleanType,
}

/// A single field-level violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(rename = "type")]
    pub code: ErrorCode,
}

impl FieldError {
    fn new(field: &str, code: ErrorCode, detail: impl fmt::Display) -> Self {
        Self {
            field: field.to_string(),
            message: format!("\"{field}\" {detail}"),
            code,
        }
    }
}

/// Every violation found in one payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Names of the rejected fields, in report order
    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.field.as_str()).collect()
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(err: FieldError) -> Self {
        Self(vec![err])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// A checked field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i32),
    Boolean(bool),
    Null,
}

/// Values that passed validation, keyed by field name
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldValues(BTreeMap<&'static str, FieldValue>);

impl FieldValues {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn text(&mut self, name: &str) -> Option<String> {
        match self.0.remove(name) {
            Some(FieldValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    /// `Some(None)` when the field was submitted as `null`
    pub fn nullable_text(&mut self, name: &str) -> Option<Option<String>> {
        match self.0.remove(name) {
            Some(FieldValue::Text(value)) => Some(Some(value)),
            Some(FieldValue::Null) => Some(None),
            _ => None,
        }
    }

    pub fn integer(&mut self, name: &str) -> Option<i32> {
        match self.0.remove(name) {
            Some(FieldValue::Integer(value)) => Some(value),
            _ => None,
        }
    }

    pub fn boolean(&mut self, name: &str) -> Option<bool> {
        match self.0.remove(name) {
            Some(FieldValue::Boolean(value)) => Some(value),
            _ => None,
        }
    }

    pub fn required_text(&mut self, name: &str) -> Result<String, FieldError> {
        self.text(name)
            .ok_or_else(|| FieldError::new(name, ErrorCode::Required, "is required"))
    }
}

/// Check `payload` against `schema`.
///
/// Returns the allow-listed values on success, or every violation found.
pub fn validate(
    schema: &Schema,
    payload: &Payload,
    mode: Mode,
) -> Result<FieldValues, ValidationErrors> {
    let mut values = BTreeMap::new();
    let mut errors = Vec::new();

    for rule in schema.fields {
        match payload.get(rule.name) {
            None if mode == Mode::Create && rule.required => {
                errors.push(FieldError::new(rule.name, ErrorCode::Required, "is required"));
            }
            None => {}
            Some(value) => match check(rule, value) {
                Ok(checked) => {
                    values.insert(rule.name, checked);
                }
                Err(err) => errors.push(err),
            },
        }
    }

    if errors.is_empty() {
        Ok(FieldValues(values))
    } else {
        Err(ValidationErrors(errors))
    }
}

fn check(rule: &FieldRule, value: &Value) -> Result<FieldValue, FieldError> {
    let name = rule.name;

    if value.is_null() {
        return if rule.nullable {
            Ok(FieldValue::Null)
        } else {
            Err(FieldError::new(name, ErrorCode::NullValue, "must not be null"))
        };
    }

    match rule.kind {
        FieldKind::Text { max_len } => check_text(rule, value, max_len),
        FieldKind::Email { max_len } => {
            let checked = check_text(rule, value, max_len)?;
            match &checked {
                FieldValue::Text(email) if !email.is_empty() && !email_regex().is_match(email) => {
                    Err(FieldError::new(name, ErrorCode::EmailFormat, "must be a valid email"))
                }
                _ => Ok(checked),
            }
        }
        FieldKind::Integer { greater_than } => {
            let Some(number) = whole_number(value) else {
                return Err(FieldError::new(name, ErrorCode::IntegerType, "must be an integer"));
            };
            if number <= greater_than {
                return Err(FieldError::new(
                    name,
                    ErrorCode::IntegerRange,
                    format_args!("must be greater than {greater_than}"),
                ));
            }
            i32::try_from(number).map(FieldValue::Integer).map_err(|_| {
                FieldError::new(
                    name,
                    ErrorCode::IntegerRange,
                    format_args!("must be less than or equal to {}", i32::MAX),
                )
            })
        }
        FieldKind::Boolean => value
            .as_bool()
            .map(FieldValue::Boolean)
            .ok_or_else(|| FieldError::new(name, ErrorCode::BooleanType, "must be a boolean")),
    }
}

/// The value as an integer if it is a number without a fractional part.
/// Whole floats outside `i64` saturate, so they fail the range check.
fn whole_number(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|number| number.is_finite() && number.fract() == 0.0)
            .map(|number| number as i64)
    })
}

fn check_text(rule: &FieldRule, value: &Value, max_len: usize) -> Result<FieldValue, FieldError> {
    let name = rule.name;
    let Some(text) = value.as_str() else {
        return Err(FieldError::new(name, ErrorCode::StringType, "must be a string"));
    };

    if text.is_empty() && !rule.nullable {
        return Err(FieldError::new(name, ErrorCode::StringEmpty, "is not allowed to be empty"));
    }

    if text.chars().count() > max_len {
        return Err(FieldError::new(
            name,
            ErrorCode::StringTooLong,
            format_args!("length must be less than or equal to {max_len} characters long"),
        ));
    }

    Ok(FieldValue::Text(text.to_string()))
}

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static PROFILE: Schema = Schema {
        key: "handle",
        fields: &[
            FieldRule::text("handle").required(),
            FieldRule::email("contact").required(),
            FieldRule::integer_above("age", 0),
            FieldRule::boolean("active"),
            FieldRule::text("bio").nullable(),
        ],
    };

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn accepts_a_complete_payload() {
        let body = payload(json!({
            "handle": "ada",
            "contact": "ada@example.com",
            "age": 36,
            "active": true,
            "bio": ""
        }));

        let mut values = validate(&PROFILE, &body, Mode::Create).unwrap();
        assert_eq!(values.text("handle").as_deref(), Some("ada"));
        assert_eq!(values.integer("age"), Some(36));
        assert_eq!(values.boolean("active"), Some(true));
        assert_eq!(values.nullable_text("bio"), Some(Some(String::new())));
    }

    #[test]
    fn reports_every_violation_in_schema_order() {
        let body = payload(json!({
            "contact": "not-an-email",
            "age": -3,
            "active": "yes"
        }));

        let errors = validate(&PROFILE, &body, Mode::Create).unwrap_err();
        assert_eq!(errors.fields(), vec!["handle", "contact", "age", "active"]);

        let codes: Vec<ErrorCode> = errors.errors().iter().map(|e| e.code).collect();
        assert_eq!(
            codes,
            vec![
                ErrorCode::Required,
                ErrorCode::EmailFormat,
                ErrorCode::IntegerRange,
                ErrorCode::BooleanType,
            ]
        );
    }

    #[test]
    fn update_mode_makes_every_field_optional() {
        let values = validate(&PROFILE, &Payload::new(), Mode::Update).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn update_mode_still_checks_present_fields() {
        let body = payload(json!({ "handle": "", "age": 0 }));

        let errors = validate(&PROFILE, &body, Mode::Update).unwrap_err();
        assert_eq!(errors.fields(), vec!["handle", "age"]);
        assert_eq!(errors.errors()[0].code, ErrorCode::StringEmpty);
    }

    #[test]
    fn unknown_fields_are_dropped() {
        let body = payload(json!({ "id": 42, "role": "admin", "active": false }));

        let mut values = validate(&PROFILE, &body, Mode::Update).unwrap();
        assert_eq!(values.boolean("active"), Some(false));
        assert!(values.is_empty());
    }

    #[test]
    fn null_is_only_accepted_by_nullable_fields() {
        let body = payload(json!({ "bio": null, "age": null }));

        let errors = validate(&PROFILE, &body, Mode::Update).unwrap_err();
        assert_eq!(errors.fields(), vec!["age"]);
        assert_eq!(errors.errors()[0].code, ErrorCode::NullValue);

        let body = payload(json!({ "bio": null }));
        let mut values = validate(&PROFILE, &body, Mode::Update).unwrap();
        assert_eq!(values.nullable_text("bio"), Some(None));
    }

    #[test]
    fn text_length_counts_characters() {
        let exactly = "é".repeat(MAX_TEXT_LEN);
        let body = payload(json!({ "handle": exactly }));
        assert!(validate(&PROFILE, &body, Mode::Update).is_ok());

        let too_long = "a".repeat(MAX_TEXT_LEN + 1);
        let errors = validate(&PROFILE, &payload(json!({ "handle": too_long })), Mode::Update)
            .unwrap_err();
        assert_eq!(errors.errors()[0].code, ErrorCode::StringTooLong);
    }

    #[test]
    fn integers_reject_fractions_strings_and_overflow() {
        for bad in [json!(1.5), json!("12"), json!(3_000_000_000_i64)] {
            let body = payload(json!({ "age": bad }));
            let errors = validate(&PROFILE, &body, Mode::Update).unwrap_err();
            assert_eq!(errors.fields(), vec!["age"], "accepted {bad}");
        }
    }

    #[test]
    fn integers_accept_whole_floats() {
        let body = payload(json!({ "age": 42.0 }));
        let mut values = validate(&PROFILE, &body, Mode::Update).unwrap();
        assert_eq!(values.integer("age"), Some(42));

        let body = payload(json!({ "age": 1e20 }));
        let errors = validate(&PROFILE, &body, Mode::Update).unwrap_err();
        assert_eq!(errors.errors()[0].code, ErrorCode::IntegerRange);
    }

    #[test]
    fn wrong_typed_text_is_reported() {
        let body = payload(json!({ "handle": 7, "contact": false }));

        let errors = validate(&PROFILE, &body, Mode::Update).unwrap_err();
        assert!(errors.errors().iter().all(|e| e.code == ErrorCode::StringType));
        assert_eq!(errors.errors().len(), 2);
    }

    #[test]
    fn errors_serialize_with_type_codes() {
        let errors = validate(&PROFILE, &Payload::new(), Mode::Create).unwrap_err();
        let json = serde_json::to_value(&errors).unwrap();

        assert_eq!(
            json,
            json!([
                { "field": "handle", "message": "\"handle\" is required", "type": "required" },
                { "field": "contact", "message": "\"contact\" is required", "type": "required" }
            ])
        );
    }
}

//! Declarative value schemas used to validate path params, query strings, and JSON bodies.
//!
//! A [`Schema`] checks a [`serde_json::Value`] and returns a normalized copy: coercible
//! primitives are converted (numeric strings become numbers, scalars become strings),
//! object fields not declared by the schema are stripped unless the object is marked
//! passthrough, and the first violation is reported as a [`ValidationError`] carrying a
//! `$.field[0]`-style path.

// crates.io
use serde_json::Number;
// self
use crate::_prelude::*;

/// Part of a request or response a value belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Location {
	/// Path template placeholders.
	Path,
	/// Query string parameters.
	Query,
	/// Request body.
	Body,
	/// Response body.
	Response,
}
impl Location {
	/// Returns a stable label suitable for messages and span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Location::Path => "path",
			Location::Query => "query",
			Location::Body => "body",
			Location::Response => "response",
		}
	}
}
impl Display for Location {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Specific rule a value broke.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationIssue {
	/// A required field is absent.
	Missing,
	/// The value has the wrong JSON type.
	UnexpectedType {
		/// Expected type label.
		expected: &'static str,
		/// Observed type label.
		found: &'static str,
	},
	/// A string could not be coerced into the expected primitive.
	NotCoercible {
		/// Expected type label.
		expected: &'static str,
		/// Raw input.
		raw: String,
	},
	/// A closed-enum value fell outside its allowed set.
	NotAllowed {
		/// Allowed literals.
		allowed: &'static [&'static str],
		/// Observed value.
		found: String,
	},
	/// An integer is smaller than its declared minimum.
	BelowMinimum {
		/// Declared minimum.
		minimum: i64,
	},
	/// A typed input could not be turned into JSON.
	Unserializable {
		/// Serializer message.
		message: String,
	},
}
impl Display for ValidationIssue {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Missing => f.write_str("value is required"),
			Self::UnexpectedType { expected, found } => write!(f, "expected {expected}, found {found}"),
			Self::NotCoercible { expected, raw } => write!(f, "`{raw}` cannot be read as {expected}"),
			Self::NotAllowed { allowed, found } =>
				write!(f, "`{found}` is not one of [{}]", allowed.join(", ")),
			Self::BelowMinimum { minimum } => write!(f, "value must be at least {minimum}"),
			Self::Unserializable { message } => write!(f, "value cannot be serialized: {message}"),
		}
	}
}

/// Caller-supplied (or gateway-supplied) value failed its schema.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Invalid {location} value at `{path}`: {issue}.")]
pub struct ValidationError {
	/// Part of the request/response that failed.
	pub location: Location,
	/// `$`-rooted path to the offending value.
	pub path: String,
	/// Broken rule.
	pub issue: ValidationIssue,
}
impl ValidationError {
	/// Creates an error for the provided location + path.
	pub fn new(location: Location, path: impl Into<String>, issue: ValidationIssue) -> Self {
		Self { location, path: path.into(), issue }
	}

	/// Reports a typed input that failed to serialize.
	pub fn unserializable(location: Location, err: serde_json::Error) -> Self {
		Self::new(location, "$", ValidationIssue::Unserializable { message: err.to_string() })
	}
}

/// What to do with object keys the schema does not declare.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownKeys {
	/// Drop undeclared keys.
	#[default]
	Strip,
	/// Keep undeclared keys untouched.
	Passthrough,
}

/// Declared object field.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
	/// JSON key.
	pub name: &'static str,
	/// Value schema.
	pub schema: Schema,
	/// Whether the key must be present.
	pub required: bool,
}

/// Object shape: ordered field list plus the unknown-key policy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectSchema {
	/// Declared fields.
	pub fields: Vec<Field>,
	/// Policy for undeclared keys.
	pub unknown_keys: UnknownKeys,
}
impl ObjectSchema {
	/// Creates an empty object schema (accepts `{}`).
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares a required field.
	pub fn required(mut self, name: &'static str, schema: impl Into<Schema>) -> Self {
		self.fields.push(Field { name, schema: schema.into(), required: true });

		self
	}

	/// Declares an optional field.
	pub fn optional(mut self, name: &'static str, schema: impl Into<Schema>) -> Self {
		self.fields.push(Field { name, schema: schema.into(), required: false });

		self
	}

	/// Keeps undeclared keys instead of stripping them.
	pub fn passthrough(mut self) -> Self {
		self.unknown_keys = UnknownKeys::Passthrough;

		self
	}

	/// Looks up a declared field.
	pub fn field(&self, name: &str) -> Option<&Field> {
		self.fields.iter().find(|field| field.name == name)
	}

	/// Iterator over declared field names.
	pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.fields.iter().map(|field| field.name)
	}

	/// Validates `value` and returns the normalized object.
	pub fn validate(&self, location: Location, value: &Value) -> Result<Value, ValidationError> {
		self.check(value, "$").map_err(|(path, issue)| ValidationError::new(location, path, issue))
	}

	fn check(&self, value: &Value, path: &str) -> Checked {
		let Value::Object(input) = value else {
			return Err(unexpected(path, "object", value));
		};
		let mut output = Map::new();

		for field in &self.fields {
			let child = format!("{path}.{}", field.name);

			match input.get(field.name) {
				Some(raw) => {
					output.insert(field.name.to_owned(), field.schema.check(raw, &child)?);
				},
				None if field.required => return Err((child, ValidationIssue::Missing)),
				None => (),
			}
		}

		if self.unknown_keys == UnknownKeys::Passthrough {
			for (key, raw) in input {
				if self.field(key).is_none() {
					output.insert(key.clone(), raw.clone());
				}
			}
		}

		Ok(Value::Object(output))
	}
}

/// Value schema.
#[derive(Clone, Debug, PartialEq)]
pub enum Schema {
	/// Accepts anything unchanged.
	Any,
	/// String; `coerce` also accepts numbers and booleans and stringifies them.
	String {
		/// Whether scalars are converted to strings.
		coerce: bool,
	},
	/// Finite number; `coerce` also accepts numeric strings.
	Number {
		/// Whether numeric strings are parsed.
		coerce: bool,
	},
	/// Integer with an optional lower bound; `coerce` also accepts integer strings.
	Integer {
		/// Whether integer strings are parsed.
		coerce: bool,
		/// Inclusive lower bound.
		minimum: Option<i64>,
	},
	/// Boolean.
	Boolean,
	/// Closed set of string literals.
	Enum(&'static [&'static str]),
	/// Homogeneous array.
	Array(Box<Schema>),
	/// Object shape.
	Object(ObjectSchema),
	/// Inner schema or `null`.
	Nullable(Box<Schema>),
}
impl Schema {
	/// Plain string.
	pub const fn string() -> Self {
		Self::String { coerce: false }
	}

	/// String that also accepts (and stringifies) numbers and booleans.
	pub const fn coerced_string() -> Self {
		Self::String { coerce: true }
	}

	/// Plain number.
	pub const fn number() -> Self {
		Self::Number { coerce: false }
	}

	/// Number that also accepts numeric strings.
	pub const fn coerced_number() -> Self {
		Self::Number { coerce: true }
	}

	/// Plain integer.
	pub const fn integer() -> Self {
		Self::Integer { coerce: false, minimum: None }
	}

	/// Integer that also accepts integer strings.
	pub const fn coerced_integer() -> Self {
		Self::Integer { coerce: true, minimum: None }
	}

	/// Boolean.
	pub const fn boolean() -> Self {
		Self::Boolean
	}

	/// Closed string enum.
	pub const fn one_of(allowed: &'static [&'static str]) -> Self {
		Self::Enum(allowed)
	}

	/// Array whose items all match `item`.
	pub fn array_of(item: impl Into<Schema>) -> Self {
		Self::Array(Box::new(item.into()))
	}

	/// Wraps the schema so `null` is also accepted.
	pub fn nullable(self) -> Self {
		Self::Nullable(Box::new(self))
	}

	/// Sets an inclusive lower bound; no-op for non-integer schemas.
	pub fn minimum(self, minimum: i64) -> Self {
		match self {
			Self::Integer { coerce, .. } => Self::Integer { coerce, minimum: Some(minimum) },
			other => other,
		}
	}

	/// Validates `value` and returns the normalized copy.
	pub fn validate(&self, location: Location, value: &Value) -> Result<Value, ValidationError> {
		self.check(value, "$").map_err(|(path, issue)| ValidationError::new(location, path, issue))
	}

	fn check(&self, value: &Value, path: &str) -> Checked {
		match self {
			Self::Any => Ok(value.clone()),
			Self::String { coerce } => check_string(value, path, *coerce),
			Self::Number { coerce } => check_number(value, path, *coerce),
			Self::Integer { coerce, minimum } => check_integer(value, path, *coerce, *minimum),
			Self::Boolean => match value {
				Value::Bool(_) => Ok(value.clone()),
				other => Err(unexpected(path, "boolean", other)),
			},
			Self::Enum(allowed) => match value {
				Value::String(found) if allowed.contains(&found.as_str()) => Ok(value.clone()),
				Value::String(found) => Err((
					path.to_owned(),
					ValidationIssue::NotAllowed { allowed: *allowed, found: found.clone() },
				)),
				other => Err(unexpected(path, "string", other)),
			},
			Self::Array(item) => {
				let Value::Array(values) = value else {
					return Err(unexpected(path, "array", value));
				};

				values
					.iter()
					.enumerate()
					.map(|(idx, raw)| item.check(raw, &format!("{path}[{idx}]")))
					.collect::<Result<Vec<_>, _>>()
					.map(Value::Array)
			},
			Self::Object(object) => object.check(value, path),
			Self::Nullable(inner) =>
				if value.is_null() {
					Ok(Value::Null)
				} else {
					inner.check(value, path)
				},
		}
	}
}
impl From<ObjectSchema> for Schema {
	fn from(value: ObjectSchema) -> Self {
		Self::Object(value)
	}
}

type Checked = Result<Value, (String, ValidationIssue)>;

fn check_string(value: &Value, path: &str, coerce: bool) -> Checked {
	match value {
		Value::String(_) => Ok(value.clone()),
		Value::Number(n) if coerce => Ok(Value::String(n.to_string())),
		Value::Bool(b) if coerce => Ok(Value::String(b.to_string())),
		other => Err(unexpected(path, "string", other)),
	}
}

fn check_number(value: &Value, path: &str, coerce: bool) -> Checked {
	match value {
		Value::Number(_) => Ok(value.clone()),
		Value::String(raw) if coerce => parse_number(raw)
			.map(Value::Number)
			.ok_or_else(|| (path.to_owned(), not_coercible("number", raw))),
		other => Err(unexpected(path, "number", other)),
	}
}

fn check_integer(value: &Value, path: &str, coerce: bool, minimum: Option<i64>) -> Checked {
	let number = match value {
		Value::Number(n) => integral(n).ok_or_else(|| unexpected(path, "integer", value))?,
		Value::String(raw) if coerce => raw
			.trim()
			.parse::<i64>()
			.map(Number::from)
			.map_err(|_| (path.to_owned(), not_coercible("integer", raw)))?,
		other => return Err(unexpected(path, "integer", other)),
	};

	match (minimum, number.as_i64()) {
		(Some(minimum), Some(actual)) if actual < minimum =>
			return Err((path.to_owned(), ValidationIssue::BelowMinimum { minimum })),
		_ => (),
	}

	Ok(Value::Number(number))
}

fn parse_number(raw: &str) -> Option<Number> {
	let trimmed = raw.trim();

	if trimmed.is_empty() {
		return None;
	}
	if let Ok(int) = trimmed.parse::<i64>() {
		return Some(Number::from(int));
	}

	trimmed.parse::<f64>().ok().filter(|value| value.is_finite()).and_then(Number::from_f64)
}

fn integral(number: &Number) -> Option<Number> {
	if number.is_i64() || number.is_u64() {
		return Some(number.clone());
	}

	let value = number.as_f64()?;

	if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
		Some(Number::from(value as i64))
	} else {
		None
	}
}

fn unexpected(path: &str, expected: &'static str, found: &Value) -> (String, ValidationIssue) {
	(path.to_owned(), ValidationIssue::UnexpectedType { expected, found: kind(found) })
}

fn not_coercible(expected: &'static str, raw: &str) -> ValidationIssue {
	ValidationIssue::NotCoercible { expected, raw: raw.to_owned() }
}

fn kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

// self
use crate::{
	_prelude::*,
	contract::ContractDefinitionError,
	schema::{Location, ValidationError, ValidationIssue},
};

/// Single `/`-delimited template segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
	/// Fixed text.
	Literal(String),
	/// `:name` placeholder.
	Param(String),
}

/// Parsed path template such as `/transactions/:transactionId/:typeId/reverse`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathTemplate {
	raw: String,
	segments: Vec<PathSegment>,
}
impl PathTemplate {
	/// Parses a template; `/` (or an empty string) denotes the root.
	pub fn parse(template: &str) -> Result<Self, ContractDefinitionError> {
		let invalid = |reason| ContractDefinitionError::InvalidPathTemplate {
			template: template.to_owned(),
			reason,
		};

		if !template.is_empty() && !template.starts_with('/') {
			return Err(invalid("it must start with `/`"));
		}

		let mut segments = Vec::new();

		for piece in template.split('/').filter(|piece| !piece.is_empty()) {
			let segment = match piece.strip_prefix(':') {
				Some(name) => {
					if name.is_empty()
						|| !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
					{
						return Err(invalid("placeholder names must be alphanumeric"));
					}
					if segments.contains(&PathSegment::Param(name.to_owned())) {
						return Err(invalid("placeholder names must be unique"));
					}

					PathSegment::Param(name.to_owned())
				},
				None => PathSegment::Literal(piece.to_owned()),
			};

			segments.push(segment);
		}

		Ok(Self::from_segments(segments))
	}

	/// Appends `suffix` below this template.
	pub fn join(&self, suffix: &PathTemplate) -> Result<Self, ContractDefinitionError> {
		let mut segments = self.segments.clone();

		for segment in &suffix.segments {
			if matches!(segment, PathSegment::Param(_)) && segments.contains(segment) {
				return Err(ContractDefinitionError::InvalidPathTemplate {
					template: format!("{}{}", self.raw.trim_end_matches('/'), suffix.raw),
					reason: "placeholder names must be unique",
				});
			}

			segments.push(segment.clone());
		}

		Ok(Self::from_segments(segments))
	}

	/// Canonical template text.
	pub fn as_str(&self) -> &str {
		&self.raw
	}

	/// Parsed segments.
	pub fn segments(&self) -> &[PathSegment] {
		&self.segments
	}

	/// Placeholder names in template order.
	pub fn placeholders(&self) -> impl Iterator<Item = &str> {
		self.segments.iter().filter_map(|segment| match segment {
			PathSegment::Param(name) => Some(name.as_str()),
			PathSegment::Literal(_) => None,
		})
	}

	/// Substitutes validated params, rendering each value in string form.
	pub fn render(&self, params: &Map<String, Value>) -> Result<ResolvedPath, ValidationError> {
		let segments = self
			.segments
			.iter()
			.map(|segment| match segment {
				PathSegment::Literal(text) => Ok(text.clone()),
				PathSegment::Param(name) => match params.get(name) {
					Some(Value::String(text)) => Ok(text.clone()),
					Some(Value::Null) | None => Err(ValidationError::new(
						Location::Path,
						format!("$.{name}"),
						ValidationIssue::Missing,
					)),
					Some(other) => Ok(other.to_string()),
				},
			})
			.collect::<Result<_, _>>()?;

		Ok(ResolvedPath { segments })
	}

	fn from_segments(segments: Vec<PathSegment>) -> Self {
		let raw = if segments.is_empty() {
			"/".to_owned()
		} else {
			segments
				.iter()
				.map(|segment| match segment {
					PathSegment::Literal(text) => format!("/{text}"),
					PathSegment::Param(name) => format!("/:{name}"),
				})
				.collect()
		};

		Self { raw, segments }
	}
}
impl Display for PathTemplate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.raw)
	}
}
impl FromStr for PathTemplate {
	type Err = ContractDefinitionError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

/// Concrete path after placeholder substitution; segments are kept unencoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPath {
	segments: Vec<String>,
}
impl ResolvedPath {
	/// Raw segments.
	pub fn segments(&self) -> &[String] {
		&self.segments
	}
}
impl Display for ResolvedPath {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		if self.segments.is_empty() {
			return f.write_str("/");
		}

		for segment in &self.segments {
			write!(f, "/{segment}")?;
		}

		Ok(())
	}
}

use serde::{Serialize, Serializer};
use std::{
	fmt::{self, Display},
	hash::{Hash, Hasher},
};

/// The value a layer reports for one field.
///
/// Values are opaque to the generator: they are compared, hashed and written
/// out unchanged. Floats compare and hash by their bit pattern so that every
/// value can take part in [`AttributeSet`](crate::grid::AttributeSet) equality.
/// Integers above `i64::MAX` are kept as [`AttributeValue::Unsigned`].
#[derive(Clone, Debug)]
pub enum AttributeValue {
	Null,
	Bool(bool),
	Integer(i64),
	Unsigned(u64),
	Float(f64),
	String(String),
}

/// Field value reported by raster layers for cells without data.
pub const NO_DATA: &str = "NoData";

impl AttributeValue {
	/// Returns `true` for the textual `NoData` marker.
	#[must_use]
	pub fn is_no_data(&self) -> bool {
		matches!(self, AttributeValue::String(text) if text == NO_DATA)
	}

	/// Converts a JSON scalar. Arrays and objects are kept as their JSON text.
	#[must_use]
	pub fn from_json(value: &serde_json::Value) -> AttributeValue {
		use serde_json::Value;
		match value {
			Value::Null => AttributeValue::Null,
			Value::Bool(b) => AttributeValue::Bool(*b),
			Value::Number(number) => {
				if let Some(integer) = number.as_i64() {
					AttributeValue::Integer(integer)
				} else if let Some(unsigned) = number.as_u64() {
					AttributeValue::Unsigned(unsigned)
				} else {
					AttributeValue::Float(number.as_f64().unwrap_or(f64::NAN))
				}
			}
			Value::String(text) => AttributeValue::String(text.clone()),
			Value::Array(_) | Value::Object(_) => AttributeValue::String(value.to_string()),
		}
	}
}

impl PartialEq for AttributeValue {
	fn eq(&self, other: &Self) -> bool {
		use AttributeValue::{Bool, Float, Integer, Null, String, Unsigned};
		match (self, other) {
			(Null, Null) => true,
			(Bool(a), Bool(b)) => a == b,
			(Integer(a), Integer(b)) => a == b,
			(Unsigned(a), Unsigned(b)) => a == b,
			(Float(a), Float(b)) => a.to_bits() == b.to_bits(),
			(String(a), String(b)) => a == b,
			_ => false,
		}
	}
}

impl Eq for AttributeValue {}

impl Hash for AttributeValue {
	fn hash<H: Hasher>(&self, state: &mut H) {
		std::mem::discriminant(self).hash(state);
		match self {
			AttributeValue::Null => {}
			AttributeValue::Bool(b) => b.hash(state),
			AttributeValue::Integer(i) => i.hash(state),
			AttributeValue::Unsigned(u) => u.hash(state),
			AttributeValue::Float(f) => f.to_bits().hash(state),
			AttributeValue::String(s) => s.hash(state),
		}
	}
}

impl Serialize for AttributeValue {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			AttributeValue::Null => serializer.serialize_unit(),
			AttributeValue::Bool(b) => serializer.serialize_bool(*b),
			AttributeValue::Integer(i) => serializer.serialize_i64(*i),
			AttributeValue::Unsigned(u) => serializer.serialize_u64(*u),
			AttributeValue::Float(f) => serializer.serialize_f64(*f),
			AttributeValue::String(s) => serializer.serialize_str(s),
		}
	}
}

impl Display for AttributeValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AttributeValue::Null => f.write_str("null"),
			AttributeValue::Bool(b) => write!(f, "{b}"),
			AttributeValue::Integer(i) => write!(f, "{i}"),
			AttributeValue::Unsigned(u) => write!(f, "{u}"),
			AttributeValue::Float(v) => write!(f, "{v}"),
			AttributeValue::String(s) => f.write_str(s),
		}
	}
}

impl From<&str> for AttributeValue {
	fn from(value: &str) -> Self {
		AttributeValue::String(value.to_string())
	}
}

impl From<String> for AttributeValue {
	fn from(value: String) -> Self {
		AttributeValue::String(value)
	}
}

impl From<i64> for AttributeValue {
	fn from(value: i64) -> Self {
		AttributeValue::Integer(value)
	}
}

impl From<u64> for AttributeValue {
	fn from(value: u64) -> Self {
		match i64::try_from(value) {
			Ok(integer) => AttributeValue::Integer(integer),
			Err(_) => AttributeValue::Unsigned(value),
		}
	}
}

impl From<f64> for AttributeValue {
	fn from(value: f64) -> Self {
		AttributeValue::Float(value)
	}
}

impl From<bool> for AttributeValue {
	fn from(value: bool) -> Self {
		AttributeValue::Bool(value)
	}
}

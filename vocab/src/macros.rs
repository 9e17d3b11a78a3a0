#[derive(Debug, thiserror::Error)]
#[error("not a known type value: '{0}'")]
pub struct TypeValueError(pub String);

/// string enums: one canonical wire string per variant, with optional nested
/// sub-enums for partitioned type families
macro_rules! strenum {
	( $(pub enum $enum_name:ident { $($flat:ident),* ; $($deep:ident($inner:ident)),* };)+ ) => {
		$(
			#[derive(PartialEq, Eq, Debug, Clone, Copy)]
			pub enum $enum_name {
				$($flat,)*
				$($deep($inner),)*
			}

			impl AsRef<str> for $enum_name {
				fn as_ref(&self) -> &str {
					match self {
						$(Self::$flat => stringify!($flat),)*
						$(Self::$deep(x) => x.as_ref(),)*
					}
				}
			}

			impl std::fmt::Display for $enum_name {
				fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
					write!(f, "{}", self.as_ref())
				}
			}

			impl TryFrom<&str> for $enum_name {
				type Error = $crate::macros::TypeValueError;

				fn try_from(value: &str) -> Result<Self, Self::Error> {
					match value {
						$(stringify!($flat) => Ok(Self::$flat),)*
						_ => {
							$(
								if let Ok(x) = $inner::try_from(value) {
									return Ok(Self::$deep(x));
								}
							)*
							Err($crate::macros::TypeValueError(value.to_string()))
						},
					}
				}
			}
		)*
	};
}

pub(crate) use strenum;

macro_rules! getter {
	($name:ident -> type $t:ty) => {
		fn $name(&self) -> Option<$t> {
			// `type` may be a single string or a list of strings, first match wins
			match self.get("type")? {
				serde_json::Value::String(x) => x.as_str().try_into().ok(),
				serde_json::Value::Array(v) => v.iter().find_map(|x| x.as_str()?.try_into().ok()),
				_ => None,
			}
		}
	};

	($name:ident -> bool) => {
		fn $name(&self) -> Option<bool> {
			self.get(stringify!($name))?.as_bool()
		}
	};

	($name:ident::$rename:ident -> bool) => {
		fn $name(&self) -> Option<bool> {
			self.get(stringify!($rename))?.as_bool()
		}
	};

	($name:ident -> &str) => {
		fn $name(&self) -> Option<&str> {
			self.get(stringify!($name))?.as_str()
		}
	};

	($name:ident::$rename:ident -> &str) => {
		fn $name(&self) -> Option<&str> {
			self.get(stringify!($rename))?.as_str()
		}
	};

	($name:ident -> u64) => {
		fn $name(&self) -> Option<u64> {
			self.get(stringify!($name))?.as_u64()
		}
	};

	($name:ident::$rename:ident -> u64) => {
		fn $name(&self) -> Option<u64> {
			self.get(stringify!($rename))?.as_u64()
		}
	};

	($name:ident -> chrono::DateTime<chrono::Utc>) => {
		fn $name(&self) -> Option<chrono::DateTime<chrono::Utc>> {
			Some(
				chrono::DateTime::parse_from_rfc3339(self.get(stringify!($name))?.as_str()?)
					.ok()?
					.with_timezone(&chrono::Utc)
			)
		}
	};

	($name:ident::$rename:ident -> chrono::DateTime<chrono::Utc>) => {
		fn $name(&self) -> Option<chrono::DateTime<chrono::Utc>> {
			Some(
				chrono::DateTime::parse_from_rfc3339(self.get(stringify!($rename))?.as_str()?)
					.ok()?
					.with_timezone(&chrono::Utc)
			)
		}
	};

	($name:ident -> node) => {
		fn $name(&self) -> $crate::Node {
			match self.get(stringify!($name)) {
				Some(x) => $crate::Node::from(x.clone()),
				None => $crate::Node::Empty,
			}
		}
	};

	($name:ident::$rename:ident -> node) => {
		fn $name(&self) -> $crate::Node {
			match self.get(stringify!($rename)) {
				Some(x) => $crate::Node::from(x.clone()),
				None => $crate::Node::Empty,
			}
		}
	};
}

pub(crate) use getter;

macro_rules! setter {
	($name:ident -> bool) => {
		paste::item! {
			fn [< set_$name >](mut self, val: Option<bool>) -> Self {
				$crate::macros::set_maybe_value(
					&mut self, stringify!($name), val.map(serde_json::Value::Bool)
				);
				self
			}
		}
	};

	($name:ident::$rename:ident -> bool) => {
		paste::item! {
			fn [< set_$name >](mut self, val: Option<bool>) -> Self {
				$crate::macros::set_maybe_value(
					&mut self, stringify!($rename), val.map(serde_json::Value::Bool)
				);
				self
			}
		}
	};

	($name:ident -> &str) => {
		paste::item! {
			fn [< set_$name >](mut self, val: Option<&str>) -> Self {
				$crate::macros::set_maybe_value(
					&mut self, stringify!($name), val.map(|x| serde_json::Value::String(x.to_string()))
				);
				self
			}
		}
	};

	($name:ident::$rename:ident -> &str) => {
		paste::item! {
			fn [< set_$name >](mut self, val: Option<&str>) -> Self {
				$crate::macros::set_maybe_value(
					&mut self, stringify!($rename), val.map(|x| serde_json::Value::String(x.to_string()))
				);
				self
			}
		}
	};

	($name:ident -> u64) => {
		paste::item! {
			fn [< set_$name >](mut self, val: Option<u64>) -> Self {
				$crate::macros::set_maybe_value(
					&mut self, stringify!($name), val.map(|x| serde_json::Value::Number(x.into()))
				);
				self
			}
		}
	};

	($name:ident::$rename:ident -> u64) => {
		paste::item! {
			fn [< set_$name >](mut self, val: Option<u64>) -> Self {
				$crate::macros::set_maybe_value(
					&mut self, stringify!($rename), val.map(|x| serde_json::Value::Number(x.into()))
				);
				self
			}
		}
	};

	($name:ident -> chrono::DateTime<chrono::Utc>) => {
		paste::item! {
			fn [< set_$name >](mut self, val: Option<chrono::DateTime<chrono::Utc>>) -> Self {
				$crate::macros::set_maybe_value(
					&mut self, stringify!($name), val.map(|x| serde_json::Value::String(x.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)))
				);
				self
			}
		}
	};

	($name:ident::$rename:ident -> chrono::DateTime<chrono::Utc>) => {
		paste::item! {
			fn [< set_$name >](mut self, val: Option<chrono::DateTime<chrono::Utc>>) -> Self {
				$crate::macros::set_maybe_value(
					&mut self, stringify!($rename), val.map(|x| serde_json::Value::String(x.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)))
				);
				self
			}
		}
	};

	($name:ident -> node) => {
		paste::item! {
			fn [< set_$name >](mut self, val: $crate::Node) -> Self {
				$crate::macros::set_maybe_node(&mut self, stringify!($name), val);
				self
			}
		}
	};

	($name:ident::$rename:ident -> node) => {
		paste::item! {
			fn [< set_$name >](mut self, val: $crate::Node) -> Self {
				$crate::macros::set_maybe_node(&mut self, stringify!($rename), val);
				self
			}
		}
	};

	($name:ident -> type $t:ty) => {
		paste::item! {
			fn [< set_$name >](mut self, val: Option<$t>) -> Self {
				$crate::macros::set_maybe_value(
					&mut self, "type", val.map(|x| serde_json::Value::String(x.as_ref().to_string()))
				);
				self
			}
		}
	};
}

pub(crate) use setter;

pub fn set_maybe_node(obj: &mut serde_json::Value, key: &str, node: crate::Node) {
	match node {
		crate::Node::Empty => set_maybe_value(obj, key, None),
		node => set_maybe_value(obj, key, Some(node.into())),
	}
}

pub fn set_maybe_value(obj: &mut serde_json::Value, key: &str, value: Option<serde_json::Value>) {
	if let Some(map) = obj.as_object_mut() {
		match value {
			Some(x) => map.insert(key.to_string(), x),
			None => map.remove(key),
		};
	} else {
		tracing::error!("error setting '{key}' on json value: not an object");
	}
}

use std::collections::BTreeMap;
use std::fmt;

/// Flag consulted by [`super::BestFitCodec`]: render native types as text.
pub const SERIALIZE_AS_STRING: &str = "serialize_as_string";

/// A declared `(name, value)` codec flag, scoped to one field or to the row key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecFlag {
    pub name: String,
    pub value: String,
}

impl CodecFlag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Resolved codec flags of one scope. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodecFlags(BTreeMap<String, String>);

impl CodecFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from declared flags, returning the first repeated name on conflict.
    pub fn from_declared<'a>(
        flags: impl IntoIterator<Item = &'a CodecFlag>,
    ) -> Result<Self, String> {
        let mut map = BTreeMap::new();
        for flag in flags {
            if map.insert(flag.name.clone(), flag.value.clone()).is_some() {
                return Err(flag.name.clone());
            }
        }
        Ok(Self(map))
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// True when the flag is present with value `true` (any case).
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name)
            .map_or(false, |v| v.eq_ignore_ascii_case("true"))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CodecFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        f.write_str("}")
    }
}

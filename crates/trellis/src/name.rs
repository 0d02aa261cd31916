use std::{fmt, str::FromStr};

use convert_case::{Case, Casing};

use crate::error::{Error, Result};

/// Is `c` allowed in a node name?
fn is_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
}

/// A widget name used in diagnostics and on surface nodes: lowercase ASCII
/// alphanumerics plus underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeName(String);

impl NodeName {
    /// Munge an arbitrary string into a valid name by snake-casing it and
    /// dropping anything left over that is not a name character.
    pub fn convert(name: &str) -> Self {
        let filtered: String = name
            .to_case(Case::Snake)
            .chars()
            .filter(|c| is_name_char(*c))
            .collect();
        if filtered.is_empty() {
            Self("widget".into())
        } else {
            Self(filtered)
        }
    }

    /// Derive a name from a Rust type path, keeping only the last segment.
    pub fn of_type(type_name: &str) -> Self {
        let short = type_name
            .split('<')
            .next()
            .and_then(|path| path.rsplit("::").next())
            .unwrap_or(type_name);
        Self::convert(short)
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for NodeName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || !s.chars().all(is_name_char) {
            return Err(Error::Invalid(format!("bad node name: {s:?}")));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for NodeName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

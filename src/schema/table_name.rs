use std::fmt;

use serde::{Deserialize, Serialize};

use crate::util::{Result, Status};

/// Validated table name: non-empty, `[A-Za-z0-9_.-]` only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName(String);

impl TableName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Status::invalid_argument("Table name must not be empty"));
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')))
        {
            return Err(Status::invalid_argument(format!(
                "Illegal character {c:?} in table name '{name}'"
            )));
        }
        Ok(TableName(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TableName {
    type Error = Status;

    fn try_from(value: String) -> Result<Self> {
        TableName::new(value)
    }
}

impl TryFrom<&str> for TableName {
    type Error = Status;

    fn try_from(value: &str) -> Result<Self> {
        TableName::new(value)
    }
}

impl From<TableName> for String {
    fn from(name: TableName) -> Self {
        name.0
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["studentInfoDB", "t1", "a.b-c_d"] {
            assert_eq!(TableName::new(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn test_invalid_names() {
        assert!(TableName::new("").is_err());
        assert!(TableName::new("has space").is_err());
        assert!(TableName::new("ns:table").is_err());
    }

    #[test]
    fn test_serde_rejects_invalid() {
        let ok: TableName = serde_json::from_str("\"t1\"").unwrap();
        assert_eq!(ok.as_str(), "t1");
        assert!(serde_json::from_str::<TableName>("\"bad name\"").is_err());
    }
}

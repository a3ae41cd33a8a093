use serde::{Deserialize, Serialize};

use crate::util::{Result, Status};

/// Default number of versions a read returns per column.
pub const DEFAULT_MAX_VERSIONS: u32 = 1;

/// Definition of one column family inside a table.
///
/// # Example
///
/// ```
/// use student_info_db::ColumnFamilyDescriptor;
///
/// let info = ColumnFamilyDescriptor::new("S_info");
/// let history = ColumnFamilyDescriptor::new("History").with_max_versions(3);
/// assert_eq!(info.max_versions, 1);
/// assert_eq!(history.max_versions, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFamilyDescriptor {
    /// Name of the column family
    pub name: String,

    /// Upper bound on the versions returned per column
    pub max_versions: u32,
}

impl ColumnFamilyDescriptor {
    pub fn new<S: Into<String>>(name: S) -> Self {
        ColumnFamilyDescriptor {
            name: name.into(),
            max_versions: DEFAULT_MAX_VERSIONS,
        }
    }

    pub fn with_max_versions(mut self, max_versions: u32) -> Self {
        self.max_versions = max_versions;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Status::invalid_argument("Column family name must not be empty"));
        }
        if self.name.contains(':') {
            return Err(Status::invalid_argument(format!(
                "Column family name '{}' must not contain ':'",
                self.name
            )));
        }
        if self.max_versions == 0 {
            return Err(Status::invalid_argument(format!(
                "Column family '{}' must keep at least one version",
                self.name
            )));
        }
        Ok(())
    }
}

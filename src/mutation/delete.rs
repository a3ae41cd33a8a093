use bytes::Bytes;

use crate::{
    mutation::to_bytes,
    util::{Result, Status},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    /// Only the newest version of the column.
    LatestVersion { family: String, qualifier: Bytes },
    /// Every version of the column written so far.
    AllVersions { family: String, qualifier: Bytes },
    /// Every column of the family in this row.
    Family { family: String },
}

impl DeleteTarget {
    pub fn family(&self) -> &str {
        match self {
            DeleteTarget::LatestVersion { family, .. }
            | DeleteTarget::AllVersions { family, .. }
            | DeleteTarget::Family { family } => family,
        }
    }
}

/// Deletes cells of a single row. With no targets the whole row goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delete {
    row: Bytes,
    targets: Vec<DeleteTarget>,
}

impl Delete {
    pub fn new(row: impl AsRef<[u8]>) -> Self {
        Delete {
            row: to_bytes(row),
            targets: Vec::new(),
        }
    }

    pub fn add_column(mut self, family: impl Into<String>, qualifier: impl AsRef<[u8]>) -> Self {
        self.targets.push(DeleteTarget::LatestVersion {
            family: family.into(),
            qualifier: to_bytes(qualifier),
        });
        self
    }

    pub fn add_columns(mut self, family: impl Into<String>, qualifier: impl AsRef<[u8]>) -> Self {
        self.targets.push(DeleteTarget::AllVersions {
            family: family.into(),
            qualifier: to_bytes(qualifier),
        });
        self
    }

    pub fn add_family(mut self, family: impl Into<String>) -> Self {
        self.targets.push(DeleteTarget::Family {
            family: family.into(),
        });
        self
    }

    pub fn row(&self) -> &Bytes {
        &self.row
    }

    pub fn targets(&self) -> &[DeleteTarget] {
        &self.targets
    }

    pub fn is_row_delete(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.row.is_empty() {
            return Err(Status::invalid_argument("Row key must not be empty"));
        }
        Ok(())
    }
}

use bytes::Bytes;

use crate::{
    mutation::to_bytes,
    util::{Result, Status},
};

/// Writes one or more cells of a single row.
///
/// Every column is stamped with the same cluster-assigned timestamp when the
/// put is applied. Writing to an existing coordinate adds a newer version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Put {
    row: Bytes,
    columns: Vec<(String, Bytes, Bytes)>,
}

impl Put {
    pub fn new(row: impl AsRef<[u8]>) -> Self {
        Put {
            row: to_bytes(row),
            columns: Vec::new(),
        }
    }

    pub fn add_column(
        mut self,
        family: impl Into<String>,
        qualifier: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
    ) -> Self {
        self.columns.push((family.into(), to_bytes(qualifier), to_bytes(value)));
        self
    }

    pub fn row(&self) -> &Bytes {
        &self.row
    }

    pub fn columns(&self) -> &[(String, Bytes, Bytes)] {
        &self.columns
    }

    pub fn validate(&self) -> Result<()> {
        if self.row.is_empty() {
            return Err(Status::invalid_argument("Row key must not be empty"));
        }
        if self.columns.is_empty() {
            return Err(Status::invalid_argument("No columns to insert"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_builder() {
        let put = Put::new("2015001")
            .add_column("S_info", "S_Name", "Li Lei")
            .add_column("S_info", "S_Age", "23");
        assert_eq!(put.row().as_ref(), b"2015001");
        assert_eq!(put.columns().len(), 2);
        assert!(put.validate().is_ok());
    }

    #[test]
    fn test_put_validate() {
        assert!(Put::new("r1").validate().is_err());
        assert!(Put::new("").add_column("A", "x", "v").validate().is_err());
    }
}

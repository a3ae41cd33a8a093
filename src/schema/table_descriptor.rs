use serde::{Deserialize, Serialize};

use crate::{
    schema::{ColumnFamilyDescriptor, TableName},
    util::{Result, Status},
};

/// Full definition of a table as the cluster stores it.
///
/// `revision` is assigned by the cluster. It starts at 1 on creation and
/// is bumped by every accepted `modify_table`; a descriptor submitted with
/// an older revision is rejected, so a read-modify-write of the schema
/// cannot silently overwrite a concurrent change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    name: TableName,
    families: Vec<ColumnFamilyDescriptor>,
    revision: u64,
}

impl TableDescriptor {
    pub fn new(name: TableName) -> Self {
        TableDescriptor {
            name,
            families: Vec::new(),
            revision: 0,
        }
    }

    /// Build a descriptor with default options for every family name.
    pub fn with_families<S: AsRef<str>>(name: TableName, families: &[S]) -> Result<Self> {
        let mut desc = TableDescriptor::new(name);
        for family in families {
            desc.add_family(ColumnFamilyDescriptor::new(family.as_ref()))?;
        }
        Ok(desc)
    }

    pub fn name(&self) -> &TableName {
        &self.name
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    /// Append a family. Fails if a family of that name is already present.
    pub fn add_family(&mut self, family: ColumnFamilyDescriptor) -> Result<()> {
        family.validate()?;
        if self.has_family(&family.name) {
            return Err(Status::invalid_argument(format!(
                "Column family '{}' already exists in table '{}'",
                family.name, self.name
            )));
        }
        self.families.push(family);
        Ok(())
    }

    pub fn family(&self, name: &str) -> Option<&ColumnFamilyDescriptor> {
        self.families.iter().find(|f| f.name == name)
    }

    pub fn has_family(&self, name: &str) -> bool {
        self.family(name).is_some()
    }

    pub fn families(&self) -> &[ColumnFamilyDescriptor] {
        &self.families
    }

    pub fn family_names(&self) -> Vec<&str> {
        self.families.iter().map(|f| f.name.as_str()).collect()
    }

    /// Checks a descriptor before it is created or submitted as a
    /// modification.
    pub fn validate(&self) -> Result<()> {
        if self.families.is_empty() {
            return Err(Status::invalid_argument(format!(
                "Table '{}' must have at least one column family",
                self.name
            )));
        }
        for (i, family) in self.families.iter().enumerate() {
            family.validate()?;
            if self.families[..i].iter().any(|f| f.name == family.name) {
                return Err(Status::invalid_argument(format!(
                    "Duplicate column family '{}'",
                    family.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> TableName {
        TableName::new(s).unwrap()
    }

    #[test]
    fn test_with_families() {
        let desc = TableDescriptor::with_families(name("t"), &["A", "B"]).unwrap();
        assert_eq!(desc.family_names(), vec!["A", "B"]);
        assert!(desc.has_family("A"));
        assert!(!desc.has_family("C"));
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn test_add_duplicate_family() {
        let mut desc = TableDescriptor::with_families(name("t"), &["A"]).unwrap();
        assert!(desc.add_family(ColumnFamilyDescriptor::new("A")).is_err());
        assert_eq!(desc.families().len(), 1);
    }

    #[test]
    fn test_validate_requires_family() {
        let desc = TableDescriptor::new(name("t"));
        assert!(desc.validate().is_err());
    }

    #[test]
    fn test_serde() {
        let mut desc = TableDescriptor::with_families(name("t"), &["A"]).unwrap();
        desc.set_revision(4);
        let json = serde_json::to_string(&desc).unwrap();
        let back: TableDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, desc);
        assert_eq!(back.revision(), 4);
    }
}

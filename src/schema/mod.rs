/// Table and column family definitions.
///
/// A table is a named set of column families. Families are declared when the
/// table is created and may be added later through `Admin::modify_table`;
/// a cell can only be written into a family the table already has.
///
/// ```text
/// TableDescriptor("studentInfoDB", revision 1)
///  ├─→ ColumnFamilyDescriptor("S_info", max_versions 1)
///  ├─→ ColumnFamilyDescriptor("C_1")
///  └─→ ColumnFamilyDescriptor("Contact")   <- added later, revision 2
/// ```
pub mod column_family_descriptor;
pub mod table_descriptor;
pub mod table_name;

pub use column_family_descriptor::ColumnFamilyDescriptor;
pub use table_descriptor::TableDescriptor;
pub use table_name::TableName;

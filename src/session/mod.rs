//! Console-facing session over a connection and its admin handle.
//!
//! Each operation maps to one client call and reports its outcome as a
//! human readable line on the session's output. The handles are released
//! by `close()` or, at the latest, when the session is dropped.
use std::io::{self, Stdout, Write};

use crate::{
    client::{Admin, Connection, ResultScanner, Table},
    config::ClusterConfig,
    mutation::{Delete, Put},
    schema::{ColumnFamilyDescriptor, TableDescriptor, TableName},
    util::{Result, Status},
};

/// Header printed before scan output, as the shell prints it.
pub const SCAN_HEADER: &str = "ROW\tCOLUMN+CELL";

pub struct Session<W: Write = Stdout> {
    connection: Option<Connection>,
    admin: Option<Admin>,
    out: W,
}

impl Session<Stdout> {
    /// Open a session that prints to stdout.
    pub fn open(config: &ClusterConfig) -> Result<Self> {
        Session::with_output(config, io::stdout())
    }
}

impl<W: Write> Session<W> {
    /// Open a session that prints to `out`.
    pub fn with_output(config: &ClusterConfig, out: W) -> Result<Self> {
        let connection = Connection::open(config).inspect_err(|e| log_failure("open", e))?;
        let admin = match connection.admin() {
            Ok(admin) => admin,
            Err(e) => {
                log_failure("open", &e);
                let _ = connection.close();
                return Err(e);
            }
        };
        Ok(Session {
            connection: Some(connection),
            admin: Some(admin),
            out,
        })
    }

    /// Release the admin handle, then the connection. Safe to call more
    /// than once; failures are logged, never returned.
    pub fn close(&mut self) {
        if let Some(admin) = self.admin.take()
            && let Err(e) = admin.close()
        {
            tracing::error!(error = %e, "failed to close admin");
        }
        if let Some(connection) = self.connection.take()
            && let Err(e) = connection.close()
        {
            tracing::error!(error = %e, "failed to close connection");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.connection.is_none()
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    fn admin(&self) -> Result<&Admin> {
        self.admin
            .as_ref()
            .ok_or_else(|| Status::closed("session is closed"))
    }

    fn connection(&self) -> Result<&Connection> {
        self.connection
            .as_ref()
            .ok_or_else(|| Status::closed("session is closed"))
    }

    fn table(&self, name: &str) -> Result<Table> {
        self.connection()?.table(&TableName::new(name)?)
    }

    /// Print and return the names of all tables, in order.
    pub fn list_tables(&mut self) -> Result<Vec<TableName>> {
        let names = self
            .admin()
            .and_then(Admin::list_table_names)
            .inspect_err(|e| log_failure("list_tables", e))?;
        if names.is_empty() {
            writeln!(self.out, "no table.")?;
        } else {
            writeln!(self.out, "Tables:")?;
            for name in &names {
                writeln!(self.out, "{name}")?;
            }
        }
        Ok(names)
    }

    /// Create `name` with exactly `families`. An existing table is left
    /// untouched; returns whether the table was created.
    pub fn create_table(&mut self, name: &str, families: &[&str]) -> Result<bool> {
        let created = (|| -> Result<bool> {
            let table = TableName::new(name)?;
            let admin = self.admin()?;
            if admin.table_exists(&table)? {
                return Ok(false);
            }
            admin.create_table(&TableDescriptor::with_families(table.clone(), families)?)?;
            Ok(true)
        })()
        .inspect_err(|e| log_failure("create_table", e))?;

        if created {
            writeln!(self.out, "Successfully create table: {name}!")?;
        } else {
            writeln!(self.out, "table {name} exists!")?;
        }
        Ok(created)
    }

    /// Metadata query: the table's current descriptor.
    pub fn describe_table(&self, name: &str) -> Result<TableDescriptor> {
        TableName::new(name)
            .and_then(|table| self.admin()?.get_descriptor(&table))
            .inspect_err(|e| log_failure("describe_table", e))
    }

    /// Fetch the descriptor, append `family` and submit it back. A schema
    /// change made in between is reported as `ConcurrentModification`.
    pub fn add_family(&mut self, name: &str, family: &str) -> Result<()> {
        (|| -> Result<TableDescriptor> {
            let table = TableName::new(name)?;
            let admin = self.admin()?;
            let mut descriptor = admin.get_descriptor(&table)?;
            descriptor.add_family(ColumnFamilyDescriptor::new(family))?;
            admin.modify_table(&descriptor)
        })()
        .inspect_err(|e| log_failure("add_family", e))?;

        writeln!(self.out, "Add column family: {family} successfully!")?;
        Ok(())
    }

    /// Write one cell.
    pub fn insert_data(
        &mut self,
        name: &str,
        row: &str,
        family: &str,
        qualifier: &str,
        value: &str,
    ) -> Result<()> {
        let put = Put::new(row).add_column(family, qualifier, value);
        self.table(name)
            .and_then(|table| table.put(&put))
            .inspect_err(|e| log_failure("insert_data", e))
    }

    /// Delete every version of one cell.
    pub fn delete_by_cell(
        &mut self,
        name: &str,
        row: &str,
        family: &str,
        qualifier: &str,
    ) -> Result<()> {
        let delete = Delete::new(row).add_columns(family, qualifier);
        self.table(name)
            .and_then(|table| table.delete(&delete))
            .inspect_err(|e| log_failure("delete_by_cell", e))
    }

    /// Lazy scan over every row of `name`.
    pub fn scan_table(&self, name: &str) -> Result<ResultScanner> {
        self.table(name)
            .and_then(|table| table.scanner(Default::default()))
            .inspect_err(|e| log_failure("scan_table", e))
    }

    /// Lazy scan restricted to `family:qualifier`.
    pub fn scan_table_by_column(
        &self,
        name: &str,
        family: &str,
        qualifier: &str,
    ) -> Result<ResultScanner> {
        self.table(name)
            .and_then(|table| table.column_scanner(family, qualifier))
            .inspect_err(|e| log_failure("scan_table_by_column", e))
    }

    /// Drain `scanner`, printing one line per cell. Returns the number of
    /// cells printed.
    pub fn print_scan(&mut self, scanner: ResultScanner) -> Result<usize> {
        writeln!(self.out, "{SCAN_HEADER}")?;
        let mut cells = 0;
        for row in scanner {
            let row = row.inspect_err(|e| log_failure("scan", e))?;
            let key = row.row_lossy();
            for cell in row.cells() {
                writeln!(self.out, "{key}\t{cell}")?;
                cells += 1;
            }
        }
        Ok(cells)
    }

    pub fn show_table(&mut self, name: &str) -> Result<usize> {
        let scanner = self.scan_table(name)?;
        self.print_scan(scanner)
    }

    pub fn show_column(&mut self, name: &str, family: &str, qualifier: &str) -> Result<usize> {
        let scanner = self.scan_table_by_column(name, family, qualifier)?;
        self.print_scan(scanner)
    }

    /// Disable and delete `name` if it exists. A missing table is reported,
    /// not treated as an error. Returns whether a table was dropped.
    pub fn drop_table(&mut self, name: &str) -> Result<bool> {
        let dropped = (|| -> Result<bool> {
            let table = TableName::new(name)?;
            let admin = self.admin()?;
            if !admin.table_exists(&table)? {
                return Ok(false);
            }
            if admin.is_table_enabled(&table)? {
                admin.disable_table(&table)?;
            }
            admin.delete_table(&table)?;
            Ok(true)
        })()
        .inspect_err(|e| log_failure("drop_table", e))?;

        if dropped {
            writeln!(self.out, "Drop table {name} successfully!")?;
        } else {
            writeln!(self.out, "There is no table {name}")?;
        }
        Ok(dropped)
    }
}

impl<W: Write> Drop for Session<W> {
    fn drop(&mut self) {
        self.close();
    }
}

fn log_failure(op: &str, status: &Status) {
    tracing::error!(op, kind = ?status.kind(), error = %status, "session operation failed");
}

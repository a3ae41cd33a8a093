use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use student_info_db::{Cluster, ClusterConfig, Code, ServerOptions, Session};
use tracing_subscriber::fmt::MakeWriter;

fn start_cluster() -> (Arc<Cluster>, ClusterConfig) {
    let cluster = Cluster::start(ServerOptions::new("session-test", 0)).unwrap();
    let config = cluster.client_config();
    (cluster, config)
}

fn open(config: &ClusterConfig) -> Session<Vec<u8>> {
    Session::with_output(config, Vec::new()).unwrap()
}

fn output(session: &Session<Vec<u8>>) -> String {
    String::from_utf8(session.output().clone()).unwrap()
}

/// Collects formatted log lines emitted while a test body runs.
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture_logs(f: impl FnOnce()) -> String {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = capture.0.lock().clone();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn test_create_table_reports_families() {
    let (_cluster, config) = start_cluster();
    let mut session = open(&config);

    assert!(session.create_table("t", &["A", "B", "C"]).unwrap());
    let tables = session.list_tables().unwrap();
    assert!(tables.iter().any(|t| t.as_str() == "t"));

    let descriptor = session.describe_table("t").unwrap();
    assert_eq!(descriptor.family_names(), vec!["A", "B", "C"]);

    let out = output(&session);
    assert!(out.contains("Successfully create table: t!"));
    assert!(out.contains("Tables:\nt\n"));
}

#[test]
fn test_create_existing_table_is_noop() {
    let (_cluster, config) = start_cluster();
    let mut session = open(&config);

    assert!(session.create_table("t", &["A"]).unwrap());
    session.insert_data("t", "r1", "A", "x", "v1").unwrap();

    assert!(!session.create_table("t", &["B"]).unwrap());
    assert!(output(&session).contains("table t exists!"));

    let descriptor = session.describe_table("t").unwrap();
    assert_eq!(descriptor.family_names(), vec!["A"]);
    assert_eq!(session.show_table("t").unwrap(), 1);
}

#[test]
fn test_insert_then_column_scan() {
    let (_cluster, config) = start_cluster();
    let mut session = open(&config);
    session.create_table("t", &["A", "B"]).unwrap();

    session.insert_data("t", "r1", "A", "x", "v1").unwrap();
    session.insert_data("t", "r1", "A", "y", "other").unwrap();
    session.insert_data("t", "r1", "B", "x", "other").unwrap();

    let rows: Vec<_> = session
        .scan_table_by_column("t", "A", "x")
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].cells().len(), 1);
    assert_eq!(rows[0].value("A", b"x").unwrap().as_ref(), b"v1");
}

#[test]
fn test_last_write_wins() {
    let (_cluster, config) = start_cluster();
    let mut session = open(&config);
    session.create_table("t", &["A"]).unwrap();

    session.insert_data("t", "r1", "A", "x", "first").unwrap();
    session.insert_data("t", "r1", "A", "x", "second").unwrap();

    let rows: Vec<_> = session
        .scan_table("t")
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].cells().len(), 1);
    assert_eq!(rows[0].value("A", b"x").unwrap().as_ref(), b"second");
}

#[test]
fn test_delete_by_cell_removes_column() {
    let (_cluster, config) = start_cluster();
    let mut session = open(&config);
    session.create_table("t", &["A"]).unwrap();

    session.insert_data("t", "r1", "A", "x", "v1").unwrap();
    session.insert_data("t", "r1", "A", "x", "v2").unwrap();
    session.insert_data("t", "r2", "A", "x", "keep").unwrap();
    session.delete_by_cell("t", "r1", "A", "x").unwrap();

    let rows: Vec<_> = session
        .scan_table_by_column("t", "A", "x")
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let keys: Vec<_> = rows.iter().map(|r| r.row_lossy()).collect();
    assert_eq!(keys, vec!["r2"]);
}

#[test]
fn test_insert_into_missing_family_fails() {
    let (_cluster, config) = start_cluster();
    let mut session = open(&config);
    session.create_table("t", &["A"]).unwrap();

    let err = session.insert_data("t", "r1", "Z", "x", "v").unwrap_err();
    assert_eq!(err.code(), &Code::NoSuchColumnFamily);
    assert!(err.is_operation_error());
}

#[test]
fn test_add_family() {
    let (_cluster, config) = start_cluster();
    let mut session = open(&config);
    session.create_table("t", &["A"]).unwrap();

    session.add_family("t", "Contact").unwrap();
    session.insert_data("t", "r1", "Contact", "Email", "a@b.c").unwrap();

    assert_eq!(
        session.describe_table("t").unwrap().family_names(),
        vec!["A", "Contact"]
    );
    assert!(output(&session).contains("Add column family: Contact successfully!"));

    let err = session.add_family("t", "Contact").unwrap_err();
    assert_eq!(err.code(), &Code::InvalidArgument);
}

#[test]
fn test_drop_missing_table_is_not_error() {
    let (_cluster, config) = start_cluster();
    let mut session = open(&config);

    assert!(!session.drop_table("nothing").unwrap());
    assert!(output(&session).contains("There is no table nothing"));
    let tables = session.list_tables().unwrap();
    assert!(tables.is_empty());
    assert!(output(&session).ends_with("no table.\n"));
}

#[test]
fn test_end_to_end() {
    let (_cluster, config) = start_cluster();
    let mut session = open(&config);

    session.create_table("e2e", &["A", "B"]).unwrap();
    session.insert_data("e2e", "r1", "A", "x", "v1").unwrap();
    assert_eq!(session.show_table("e2e").unwrap(), 1);

    assert!(session.drop_table("e2e").unwrap());
    let tables = session.list_tables().unwrap();
    assert!(tables.iter().all(|t| t.as_str() != "e2e"));

    let out = output(&session);
    assert!(out.contains("ROW\tCOLUMN+CELL\nr1\tA:x, value=v1\n"));
    assert!(out.contains("Drop table e2e successfully!"));
}

#[test]
fn test_open_without_cluster_is_connection_error() {
    let config = ClusterConfig::new("session-test-nowhere", 1);
    let err = Session::with_output(&config, Vec::new()).err().unwrap();
    assert!(err.is_connection_error());
}

#[test]
fn test_close_is_idempotent_and_final() {
    let (_cluster, config) = start_cluster();
    let mut session = open(&config);
    session.create_table("t", &["A"]).unwrap();

    session.close();
    session.close();
    assert!(session.is_closed());

    let err = session.list_tables().unwrap_err();
    assert!(err.is_closed());
    let err = session.insert_data("t", "r1", "A", "x", "v").unwrap_err();
    assert!(err.is_closed());
}

#[test]
fn test_cluster_failure_surfaces_as_operation_error() {
    let (cluster, config) = start_cluster();
    let mut session = open(&config);
    session.create_table("t", &["A"]).unwrap();

    cluster.shutdown();
    let err = session.insert_data("t", "r1", "A", "x", "v").unwrap_err();
    assert!(err.is_operation_error());
    assert_eq!(err.code(), &Code::IOError);

    // Cleanup after a failure never panics or errors.
    session.close();
}

#[test]
fn test_closed_session_failures_are_logged() {
    let (_cluster, config) = start_cluster();
    let mut session = open(&config);
    session.close();

    let logs = capture_logs(|| {
        assert!(session.list_tables().unwrap_err().is_closed());
        assert!(session.insert_data("t", "r1", "A", "x", "v").unwrap_err().is_closed());
        assert!(session.scan_table("t").err().unwrap().is_closed());
        assert!(session.drop_table("t").unwrap_err().is_closed());
    });

    assert_eq!(logs.matches("session operation failed").count(), 4);
    for op in ["list_tables", "insert_data", "scan_table", "drop_table"] {
        assert!(logs.contains(op), "no log line for {op}: {logs}");
    }
}

#[test]
fn test_invalid_table_name_is_logged() {
    let (_cluster, config) = start_cluster();
    let mut session = open(&config);

    let logs = capture_logs(|| {
        let err = session.describe_table("bad name!").unwrap_err();
        assert_eq!(err.code(), &Code::InvalidArgument);
        let err = session.delete_by_cell("bad name!", "r1", "A", "x").unwrap_err();
        assert_eq!(err.code(), &Code::InvalidArgument);
    });

    assert!(logs.contains("describe_table"));
    assert!(logs.contains("delete_by_cell"));
}

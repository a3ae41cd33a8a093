use std::sync::Arc;

use student_info_db::{
    Cluster, ClusterConfig, Code, ColumnFamilyDescriptor, Connection, Delete, Get, Put, Scan,
    ServerOptions, TableDescriptor, TableName,
};

fn start_cluster() -> Arc<Cluster> {
    Cluster::start(ServerOptions::new("client-test", 0)).unwrap()
}

fn name(s: &str) -> TableName {
    TableName::new(s).unwrap()
}

fn setup(cluster: &Cluster, families: &[&str]) -> Connection {
    let connection = Connection::open(&cluster.client_config()).unwrap();
    let admin = connection.admin().unwrap();
    admin
        .create_table(&TableDescriptor::with_families(name("t"), families).unwrap())
        .unwrap();
    connection
}

#[test]
fn test_quorum_fallback() {
    let cluster = start_cluster();
    let mut config = ClusterConfig::default();
    config.set_quorum(&format!("client-test-missing,{}", cluster.host()));
    config.client_port = cluster.port();

    let connection = Connection::open(&config).unwrap();
    assert_eq!(connection.cluster_address(), cluster.address());
}

#[test]
fn test_unreachable_cluster() {
    let cluster = start_cluster();
    let config = cluster.client_config();
    cluster.shutdown();

    let err = Connection::open(&config).err().unwrap();
    assert!(err.is_connection_error());
}

#[test]
fn test_closed_connection_rejects_handles() {
    let cluster = start_cluster();
    let connection = setup(&cluster, &["A"]);
    let table = connection.table(&name("t")).unwrap();

    connection.close().unwrap();
    connection.close().unwrap();
    assert!(connection.is_closed());

    assert!(connection.admin().err().unwrap().is_connection_error());
    let err = table.put(&Put::new("r1").add_column("A", "x", "v")).unwrap_err();
    assert!(err.is_closed());
}

#[test]
fn test_scanner_batches_lazily() {
    let cluster = start_cluster();
    let connection = setup(&cluster, &["A"]);
    let table = connection.table(&name("t")).unwrap();

    let puts: Vec<_> = (0..25)
        .map(|i| Put::new(format!("row{i:03}")).add_column("A", "x", i.to_string()))
        .collect();
    table.put_all(&puts).unwrap();

    let batches_before = cluster.statistics().scanner_batches();
    let mut scanner = table.scanner(Scan::new().with_caching(10)).unwrap();
    assert_eq!(cluster.statistics().scanner_batches(), batches_before);

    let first = scanner.next().unwrap().unwrap();
    assert_eq!(first.row().as_ref(), b"row000");
    assert_eq!(cluster.statistics().scanner_batches(), batches_before + 1);

    let rest: Vec<_> = scanner.by_ref().collect::<Result<_, _>>().unwrap();
    assert_eq!(rest.len(), 24);
    assert!(scanner.next().is_none());
    assert_eq!(cluster.statistics().scanner_batches(), batches_before + 3);

    let keys: Vec<_> = rest.iter().map(|r| r.row_lossy()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn test_scanner_range() {
    let cluster = start_cluster();
    let connection = setup(&cluster, &["A"]);
    let table = connection.table(&name("t")).unwrap();
    for row in ["a", "b", "c", "d"] {
        table.put(&Put::new(row).add_column("A", "x", row)).unwrap();
    }

    let rows: Vec<_> = table
        .scanner(Scan::new().with_start_row("b").with_stop_row("d"))
        .unwrap()
        .map(|r| r.unwrap().row_lossy())
        .collect();
    assert_eq!(rows, vec!["b", "c"]);
}

#[test]
fn test_scanner_stops_after_error() {
    let cluster = start_cluster();
    let connection = setup(&cluster, &["A"]);
    let table = connection.table(&name("t")).unwrap();
    table.put(&Put::new("r1").add_column("A", "x", "v")).unwrap();

    let mut scanner = table.scanner(Scan::new()).unwrap();
    cluster.shutdown();
    assert!(scanner.next().unwrap().is_err());
    assert!(scanner.next().is_none());
}

#[test]
fn test_scan_unknown_family() {
    let cluster = start_cluster();
    let connection = setup(&cluster, &["A"]);
    let table = connection.table(&name("t")).unwrap();

    let mut scanner = table.column_scanner("Nope", "x").unwrap();
    let err = scanner.next().unwrap().unwrap_err();
    assert_eq!(err.code(), &Code::NoSuchColumnFamily);
}

#[test]
fn test_get_versions() {
    let cluster = start_cluster();
    let connection = Connection::open(&cluster.client_config()).unwrap();
    let admin = connection.admin().unwrap();
    let mut desc = TableDescriptor::new(name("t"));
    desc.add_family(ColumnFamilyDescriptor::new("H").with_max_versions(3))
        .unwrap();
    admin.create_table(&desc).unwrap();

    let table = connection.table(&name("t")).unwrap();
    for v in ["v1", "v2", "v3", "v4"] {
        table.put(&Put::new("r1").add_column("H", "x", v)).unwrap();
    }

    let latest = table.get(&Get::new("r1")).unwrap();
    assert_eq!(latest.cells().len(), 1);
    assert_eq!(latest.value("H", b"x").unwrap().as_ref(), b"v4");

    let history = table.get(&Get::new("r1").with_max_versions(10)).unwrap();
    let values: Vec<_> = history.cells().iter().map(|c| c.value.clone()).collect();
    assert_eq!(values, vec!["v4", "v3", "v2"]);
    assert!(history.cells().windows(2).all(|w| w[0].timestamp > w[1].timestamp));
}

#[test]
fn test_delete_family_and_row() {
    let cluster = start_cluster();
    let connection = setup(&cluster, &["A", "B"]);
    let table = connection.table(&name("t")).unwrap();
    table
        .put(
            &Put::new("r1")
                .add_column("A", "x", "1")
                .add_column("B", "y", "2"),
        )
        .unwrap();
    table.put(&Put::new("r2").add_column("A", "x", "3")).unwrap();

    table.delete(&Delete::new("r1").add_family("A")).unwrap();
    let row = table.get(&Get::new("r1")).unwrap();
    assert!(row.value("A", b"x").is_none());
    assert_eq!(row.value("B", b"y").unwrap().as_ref(), b"2");

    table.delete(&Delete::new("r1")).unwrap();
    assert!(table.get(&Get::new("r1")).unwrap().is_empty());
    assert!(!table.get(&Get::new("r2")).unwrap().is_empty());
}

#[test]
fn test_admin_lifecycle() {
    let cluster = start_cluster();
    let connection = setup(&cluster, &["A"]);
    let admin = connection.admin().unwrap();
    let t = name("t");

    assert!(admin.is_table_enabled(&t).unwrap());
    assert_eq!(admin.delete_table(&t).unwrap_err().code(), &Code::TableNotDisabled);

    admin.disable_table(&t).unwrap();
    assert_eq!(admin.disable_table(&t).unwrap_err().code(), &Code::TableNotEnabled);
    admin.enable_table(&t).unwrap();
    admin.disable_table(&t).unwrap();
    admin.delete_table(&t).unwrap();

    assert!(!admin.table_exists(&t).unwrap());
    assert!(admin.get_descriptor(&t).unwrap_err().is_table_not_found());
}

#[test]
fn test_add_column_family_is_atomic() {
    let cluster = start_cluster();
    let connection = setup(&cluster, &["A"]);
    let admin = connection.admin().unwrap();
    let t = name("t");

    let stale = admin.get_descriptor(&t).unwrap();
    admin
        .add_column_family(&t, ColumnFamilyDescriptor::new("B"))
        .unwrap();

    let mut lost_update = stale;
    lost_update
        .add_family(ColumnFamilyDescriptor::new("C"))
        .unwrap();
    let err = admin.modify_table(&lost_update).unwrap_err();
    assert_eq!(err.code(), &Code::ConcurrentModification);
    assert_eq!(admin.get_descriptor(&t).unwrap().family_names(), vec!["A", "B"]);
}

#[test]
fn test_closed_admin() {
    let cluster = start_cluster();
    let connection = setup(&cluster, &["A"]);
    let admin = connection.admin().unwrap();
    admin.close().unwrap();
    admin.close().unwrap();
    assert!(admin.list_tables().unwrap_err().is_closed());
    assert!(connection.admin().unwrap().list_tables().is_ok());
}

#[test]
fn test_table_memory_usage_grows() {
    let cluster = start_cluster();
    let connection = setup(&cluster, &["A"]);
    let table = connection.table(&name("t")).unwrap();

    let before = cluster.table_memory_usage(&name("t")).unwrap();
    table.put(&Put::new("r1").add_column("A", "x", vec![0u8; 1024])).unwrap();
    assert!(cluster.table_memory_usage(&name("t")).unwrap() >= before + 1024);
    assert!(cluster.table_memory_usage(&name("missing")).is_none());
}

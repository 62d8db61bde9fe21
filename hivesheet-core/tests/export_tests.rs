//! Exporter integration tests against a scripted in-memory Hive session.
//!
//! Written workbooks are read back with the crate's own reader.

#![allow(clippy::unwrap_used)]

use hivesheet_core::adapters::{HiveConfig, HiveConnector, HiveSession, Row};
use hivesheet_core::export::{COLUMN_INFO_SHEET, DATA_SHEET, TABLE_INFO_SHEET};
use hivesheet_core::sheet::read_workbook;
use hivesheet_core::{
    CellValue, Credentials, ExportOptions, ExportOutcome, HiveSheetError, Result, TableExporter,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Answers statements from a fixed script; unknown statements fail.
#[derive(Default)]
struct ScriptedSession {
    answers: HashMap<String, std::result::Result<Vec<Row>, String>>,
    issued: Vec<String>,
}

impl ScriptedSession {
    fn answer(mut self, sql: &str, rows: Vec<Row>) -> Self {
        self.answers.insert(sql.to_string(), Ok(rows));
        self
    }

    fn fail(mut self, sql: &str, message: &str) -> Self {
        self.answers.insert(sql.to_string(), Err(message.to_string()));
        self
    }

    /// Scripts a table with no comment, one `id bigint` column and `ids` as data.
    fn plain_table(self, table: &str, ids: &[&str]) -> Self {
        self.answer(
            &format!("SHOW TBLPROPERTIES `{table}`('comment')"),
            vec![row(&[Some(
                format!("Table default.{table} does not have property: comment").as_str(),
            )])],
        )
        .answer(
            &format!("DESCRIBE `{table}`"),
            vec![row(&[Some("id"), Some("bigint"), Some("")])],
        )
        .answer(
            &format!("SELECT * FROM `{table}`"),
            ids.iter().map(|id| row(&[Some(*id)])).collect(),
        )
    }
}

impl HiveSession for ScriptedSession {
    fn execute(&mut self, sql: &str) -> Result<()> {
        self.query(sql).map(|_| ())
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        self.issued.push(sql.to_string());
        match self.answers.get(sql) {
            Some(Ok(rows)) => Ok(rows.clone()),
            Some(Err(message)) => Err(HiveSheetError::query_failed(sql, message.as_str())),
            None if sql.starts_with("USE ") => Ok(Vec::new()),
            None => Err(HiveSheetError::query_failed(sql, "unexpected statement")),
        }
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

fn row(values: &[Option<&str>]) -> Row {
    values.iter().map(|v| v.map(str::to_string)).collect()
}

fn options(dir: &std::path::Path, prefix: &str) -> ExportOptions {
    ExportOptions::new("dws", prefix).with_output_dir(dir.join("out"))
}

#[test]
fn test_export_uncommented_tables_named_after_tables() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ScriptedSession::default()
        .answer(
            "SHOW TABLES LIKE 'dws_x_*'",
            vec![row(&[Some("dws_x_a")]), row(&[Some("dws_x_b")])],
        )
        .plain_table("dws_x_a", &["1", "2"])
        .plain_table("dws_x_b", &[]);

    let mut exporter = TableExporter::new(options(dir.path(), "dws_x_"));
    let summary = exporter.export(&mut session).unwrap();

    assert_eq!(summary.expected, 2);
    assert_eq!(summary.exported(), 2);
    assert!(summary.is_complete());

    let out = dir.path().join("out");
    for (table, rows) in [("dws_x_a", 2), ("dws_x_b", 0)] {
        let sheets = read_workbook(&out.join(format!("{table}.xlsx"))).unwrap();
        let names: Vec<&str> = sheets.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, [DATA_SHEET, TABLE_INFO_SHEET, COLUMN_INFO_SHEET]);

        let (_, data) = &sheets[0];
        assert_eq!(data.headers, vec!["id"]);
        assert_eq!(data.row_count(), rows);

        let (_, info) = &sheets[1];
        assert_eq!(info.rows[0][1], CellValue::Text(table.to_string()));
        assert_eq!(info.rows[1][1], CellValue::Text(table.to_string()));
        #[allow(clippy::cast_precision_loss)]
        let expected_rows = CellValue::Number(rows as f64);
        assert_eq!(info.rows[2][1], expected_rows);
    }
}

#[test]
fn test_export_statements_are_quoted() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ScriptedSession::default()
        .answer("SHOW TABLES LIKE 'p_*'", vec![row(&[Some("p_t")])])
        .plain_table("p_t", &["1"]);

    TableExporter::new(options(dir.path(), "p_"))
        .export(&mut session)
        .unwrap();

    let issued = &session.issued;
    assert_eq!(issued[0], "USE `dws`");
    assert_eq!(issued[1], "SHOW TABLES LIKE 'p_*'");
    assert!(issued.contains(&"DESCRIBE `p_t`".to_string()));
    assert!(issued.contains(&"SELECT * FROM `p_t`".to_string()));
}

#[test]
fn test_export_colliding_comments_get_numbered_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ScriptedSession::default().answer(
        "SHOW TABLES LIKE 'o_*'",
        vec![row(&[Some("o_1")]), row(&[Some("o_2")]), row(&[Some("o_3")])],
    );
    for table in ["o_1", "o_2", "o_3"] {
        session = session
            .plain_table(table, &["7"])
            .answer(
                &format!("SHOW TBLPROPERTIES `{table}`('comment')"),
                vec![row(&[Some("订单:明细")])],
            );
    }

    let summary = TableExporter::new(options(dir.path(), "o_"))
        .export(&mut session)
        .unwrap();

    let out = dir.path().join("out");
    let paths: Vec<_> = summary.exported_paths().into_iter().cloned().collect();
    assert_eq!(
        paths,
        vec![
            out.join("订单明细.xlsx"),
            out.join("订单明细_2.xlsx"),
            out.join("订单明细_3.xlsx"),
        ]
    );
    assert!(paths.iter().all(|p| p.exists()));
}

#[test]
fn test_export_comment_with_only_illegal_chars_uses_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ScriptedSession::default()
        .answer("SHOW TABLES LIKE 'q_*'", vec![row(&[Some("q_t")])])
        .plain_table("q_t", &[])
        .answer("SHOW TBLPROPERTIES `q_t`('comment')", vec![row(&[Some("???")])]);

    TableExporter::new(options(dir.path(), "q_"))
        .export(&mut session)
        .unwrap();

    assert!(dir.path().join("out").join("输出.xlsx").exists());
}

#[test]
fn test_export_no_matching_tables_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ScriptedSession::default().answer("SHOW TABLES LIKE 'none_*'", Vec::new());

    let result = TableExporter::new(options(dir.path(), "none_")).export(&mut session);

    assert!(matches!(result, Err(HiveSheetError::NoMatchingTables { .. })));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_export_failing_table_is_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ScriptedSession::default()
        .answer(
            "SHOW TABLES LIKE 'm_*'",
            vec![row(&[Some("m_bad")]), row(&[Some("m_good")])],
        )
        .plain_table("m_bad", &[])
        .fail("SELECT * FROM `m_bad`", "permission denied")
        .plain_table("m_good", &["1"]);

    let summary = TableExporter::new(options(dir.path(), "m_"))
        .export(&mut session)
        .unwrap();

    assert_eq!(summary.exported(), 1);
    assert_eq!(summary.failed_tables(), vec!["m_bad"]);
    assert!(matches!(
        &summary.outcomes[0],
        ExportOutcome::Failed { reason, .. } if reason.contains("permission denied")
    ));
    assert!(dir.path().join("out").join("m_good.xlsx").exists());
    assert!(!dir.path().join("out").join("m_bad.xlsx").exists());
}

#[test]
fn test_export_comment_lookup_error_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ScriptedSession::default()
        .answer("SHOW TABLES LIKE 'c_*'", vec![row(&[Some("c_t")])])
        .plain_table("c_t", &["1"])
        .fail("SHOW TBLPROPERTIES `c_t`('comment')", "not supported");

    let summary = TableExporter::new(options(dir.path(), "c_"))
        .export(&mut session)
        .unwrap();

    assert_eq!(summary.exported(), 1);
    assert!(dir.path().join("out").join("c_t.xlsx").exists());
}

#[test]
fn test_export_arity_mismatch_fails_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ScriptedSession::default()
        .answer("SHOW TABLES LIKE 'w_*'", vec![row(&[Some("w_t")])])
        .plain_table("w_t", &[])
        .answer("SELECT * FROM `w_t`", vec![row(&[Some("1"), Some("extra")])]);

    let summary = TableExporter::new(options(dir.path(), "w_"))
        .export(&mut session)
        .unwrap();

    assert_eq!(summary.failed_tables(), vec!["w_t"]);
}

#[test]
fn test_export_does_not_overwrite_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("e_t.xlsx"), b"keep me").unwrap();

    let mut session = ScriptedSession::default()
        .answer("SHOW TABLES LIKE 'e_*'", vec![row(&[Some("e_t")])])
        .plain_table("e_t", &["1"]);

    let summary = TableExporter::new(options(dir.path(), "e_"))
        .export(&mut session)
        .unwrap();

    assert_eq!(summary.failed_tables(), vec!["e_t"]);
    assert_eq!(std::fs::read(out.join("e_t.xlsx")).unwrap(), b"keep me");
}

#[test]
fn test_export_typed_cells_and_comment_headers() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ScriptedSession::default()
        .answer("SHOW TABLES LIKE 't_*'", vec![row(&[Some("t_orders")])])
        .answer(
            "SHOW TBLPROPERTIES `t_orders`('comment')",
            vec![row(&[Some("订单")])],
        )
        .answer(
            "DESCRIBE `t_orders`",
            vec![
                row(&[Some("id"), Some("bigint"), Some("编号")]),
                row(&[Some("paid"), Some("boolean"), None]),
                row(&[Some("note"), Some("string"), Some("备注")]),
            ],
        )
        .answer(
            "SELECT * FROM `t_orders`",
            vec![row(&[Some("42"), Some("true"), None])],
        );

    TableExporter::new(options(dir.path(), "t_"))
        .export(&mut session)
        .unwrap();

    let sheets = read_workbook(&dir.path().join("out").join("订单.xlsx")).unwrap();
    let (_, data) = &sheets[0];
    assert_eq!(data.headers, vec!["编号", "paid", "备注"]);
    assert_eq!(data.rows[0][0], CellValue::Number(42.0));
    assert_eq!(data.rows[0][1], CellValue::Bool(true));

    let (_, columns) = &sheets[2];
    assert_eq!(columns.row_count(), 3);
    assert_eq!(columns.rows[1][1], CellValue::Text("boolean".to_string()));
}

struct OneShotConnector {
    session: RefCell<Option<ScriptedSession>>,
    connects: Cell<u32>,
}

impl HiveConnector for OneShotConnector {
    fn connect<'a>(
        &'a self,
        _config: &HiveConfig,
        _credentials: &Credentials,
    ) -> Result<Box<dyn HiveSession + 'a>> {
        self.connects.set(self.connects.get().saturating_add(1));
        let session = self.session.borrow_mut().take().unwrap();
        Ok(Box::new(session))
    }
}

#[test]
fn test_export_run_wraps_session() {
    let dir = tempfile::tempdir().unwrap();
    let connector = OneShotConnector {
        session: RefCell::new(Some(
            ScriptedSession::default()
                .answer("SHOW TABLES LIKE 'r_*'", vec![row(&[Some("r_t")])])
                .plain_table("r_t", &["1"]),
        )),
        connects: Cell::new(0),
    };
    let config = HiveConfig::new("hive.local".to_string());
    let credentials = Credentials::new("u".to_string(), "p".to_string());

    let summary = TableExporter::new(options(dir.path(), "r_"))
        .run(&connector, &config, &credentials)
        .unwrap();

    assert_eq!(summary.exported(), 1);
    assert_eq!(connector.connects.get(), 1);
}

#[test]
fn test_export_run_rejects_invalid_options_before_connecting() {
    let dir = tempfile::tempdir().unwrap();
    let connector = OneShotConnector {
        session: RefCell::new(None),
        connects: Cell::new(0),
    };
    let config = HiveConfig::new("hive.local".to_string());
    let credentials = Credentials::new("u".to_string(), "p".to_string());

    let result = TableExporter::new(options(dir.path(), "bad'prefix"))
        .run(&connector, &config, &credentials);

    assert!(result.unwrap_err().is_configuration());
    assert_eq!(connector.connects.get(), 0);
}

// [libs/infra/storage/src/sqlite.rs]
//! Read-only row walker for extracted table databases, grounded in the
//! original's `utils/database.py::TableDatabase`.

use crate::errors::StorageError;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

#[derive(Debug, Clone)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

pub struct TableDatabase {
    connection: Connection,
}

impl TableDatabase {
    pub fn open_read_only(path: &Path) -> Result<Self, StorageError> {
        let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self { connection })
    }

    pub fn table_names(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self.connection.prepare("SELECT name FROM sqlite_master WHERE type='table'")?;
        let names = stmt.query_map([], |row| row.get::<_, String>(0))?.collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Column names and every row of `table`, in declaration order.
    pub fn table_rows(&self, table: &str) -> Result<(Vec<String>, Vec<Vec<CellValue>>), StorageError> {
        let query = format!("SELECT * FROM \"{table}\"");
        let mut stmt = self.connection.prepare(&query)?;
        let column_names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let column_count = column_names.len();

        let rows = stmt
            .query_map([], |row| {
                let mut values = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    let value = match row.get_ref(i)? {
                        ValueRef::Null => CellValue::Null,
                        ValueRef::Integer(v) => CellValue::Integer(v),
                        ValueRef::Real(v) => CellValue::Real(v),
                        ValueRef::Text(v) => CellValue::Text(String::from_utf8_lossy(v).to_string()),
                        ValueRef::Blob(v) => CellValue::Blob(v.to_vec()),
                    };
                    values.push(value);
                }
                Ok(values)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok((column_names, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection as WriteConnection;

    #[test]
    fn reads_back_tables_and_rows_written_by_a_plain_connection() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("sample.db");
        {
            let conn = WriteConnection::open(&db_path).unwrap();
            conn.execute("CREATE TABLE CharacterExcelTable (id INTEGER, payload BLOB)", []).unwrap();
            conn.execute("INSERT INTO CharacterExcelTable VALUES (1, X'DEADBEEF')", []).unwrap();
        }

        let db = TableDatabase::open_read_only(&db_path).unwrap();
        assert_eq!(db.table_names().unwrap(), vec!["CharacterExcelTable"]);

        let (columns, rows) = db.table_rows("CharacterExcelTable").unwrap();
        assert_eq!(columns, vec!["id", "payload"]);
        assert_eq!(rows.len(), 1);
        assert!(matches!(rows[0][0], CellValue::Integer(1)));
        assert!(matches!(rows[0][1], CellValue::Blob(_)));
    }
}

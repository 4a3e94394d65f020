//! Patient record table operations.

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use tracing::debug;

use super::{Database, DbResult, PatientRow, RecordStore, UpsertOutcome};

const SELECT_SQL: &str = r#"
    SELECT id, date, name, mobile,
           right_eye_sphere, right_eye_cylinder, right_eye_axis, right_eye_add,
           left_eye_sphere, left_eye_cylinder, left_eye_axis, left_eye_add,
           frame_price, glass_price, total_price, remarks
    FROM patient_records
"#;

impl RecordStore for Database {
    fn select_all(&self) -> DbResult<Vec<PatientRow>> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_SQL} ORDER BY rowid"))?;
        let rows = stmt.query_map([], read_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn select_by_mobile(&self, mobile: &str) -> DbResult<Vec<PatientRow>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_SQL} WHERE mobile = ?"))?;
        let rows = stmt.query_map([mobile], read_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn insert(&self, row: &PatientRow) -> DbResult<String> {
        insert_row(&self.conn, row)
    }

    fn update_by_mobile(&self, mobile: &str, row: &PatientRow) -> DbResult<usize> {
        update_row(&self.conn, mobile, row)
    }

    fn delete_all(&self) -> DbResult<usize> {
        Ok(self.conn.execute("DELETE FROM patient_records", [])?)
    }

    /// Lookup and write run in one immediate transaction, so a concurrent
    /// writer cannot slip an insert for the same mobile in between.
    fn upsert(&self, row: &PatientRow) -> DbResult<UpsertOutcome> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM patient_records WHERE mobile = ?)",
            [row.mobile()],
            |r| r.get(0),
        )?;

        let outcome = if exists {
            update_row(&tx, row.mobile(), row)?;
            UpsertOutcome::Updated
        } else {
            insert_row(&tx, row)?;
            UpsertOutcome::Inserted
        };

        tx.commit()?;
        Ok(outcome)
    }
}

fn insert_row(conn: &Connection, row: &PatientRow) -> DbResult<String> {
    let id = uuid::Uuid::new_v4().to_string();
    conn.execute(
        r#"
        INSERT INTO patient_records (
            id, date, name, mobile,
            right_eye_sphere, right_eye_cylinder, right_eye_axis, right_eye_add,
            left_eye_sphere, left_eye_cylinder, left_eye_axis, left_eye_add,
            frame_price, glass_price, total_price, remarks
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
        "#,
        params![
            id,
            row.date,
            row.name,
            row.mobile,
            row.right_eye_sphere,
            row.right_eye_cylinder,
            row.right_eye_axis,
            row.right_eye_add,
            row.left_eye_sphere,
            row.left_eye_cylinder,
            row.left_eye_axis,
            row.left_eye_add,
            row.frame_price,
            row.glass_price,
            row.total_price,
            row.remarks,
        ],
    )?;
    debug!(record_id = %id, "inserted patient record");
    Ok(id)
}

fn update_row(conn: &Connection, mobile: &str, row: &PatientRow) -> DbResult<usize> {
    let rows_affected = conn.execute(
        r#"
        UPDATE patient_records SET
            date = ?2,
            name = ?3,
            right_eye_sphere = ?4,
            right_eye_cylinder = ?5,
            right_eye_axis = ?6,
            right_eye_add = ?7,
            left_eye_sphere = ?8,
            left_eye_cylinder = ?9,
            left_eye_axis = ?10,
            left_eye_add = ?11,
            frame_price = ?12,
            glass_price = ?13,
            total_price = ?14,
            remarks = ?15,
            updated_at = datetime('now')
        WHERE mobile = ?1
        "#,
        params![
            mobile,
            row.date,
            row.name,
            row.right_eye_sphere,
            row.right_eye_cylinder,
            row.right_eye_axis,
            row.right_eye_add,
            row.left_eye_sphere,
            row.left_eye_cylinder,
            row.left_eye_axis,
            row.left_eye_add,
            row.frame_price,
            row.glass_price,
            row.total_price,
            row.remarks,
        ],
    )?;
    debug!(rows_affected, "updated patient record");
    Ok(rows_affected)
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: text(row, 0)?,
        date: text(row, 1)?,
        name: text(row, 2)?,
        mobile: text(row, 3)?,
        right_eye_sphere: text(row, 4)?,
        right_eye_cylinder: text(row, 5)?,
        right_eye_axis: text(row, 6)?,
        right_eye_add: text(row, 7)?,
        left_eye_sphere: text(row, 8)?,
        left_eye_cylinder: text(row, 9)?,
        left_eye_axis: text(row, 10)?,
        left_eye_add: text(row, 11)?,
        frame_price: number(row, 12)?,
        glass_price: number(row, 13)?,
        total_price: number(row, 14)?,
        remarks: text(row, 15)?,
    })
}

/// Read a column as text whatever its storage class.
fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    })
}

/// Read a column as a number; text that does not parse counts as missing.
fn number(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<f64>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Integer(i) => Some(i as f64),
        ValueRef::Real(f) => Some(f),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok()),
        ValueRef::Null | ValueRef::Blob(_) => None,
    })
}

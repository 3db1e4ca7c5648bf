use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::DatabaseId};

/// An organizational/geographic unit that budget is allocated to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Regional {
    /// The id for the regional unit.
    pub id: DatabaseId,
    /// The unique regional code, e.g. "R1" or "HO".
    pub code: String,
    /// The unit's display name.
    pub name: String,
    /// Whether the unit can still be used on new records.
    pub is_active: bool,
}

/// The payload for creating a regional unit.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRegional {
    /// The unique regional code.
    pub code: String,
    /// The unit's display name.
    pub name: String,
}

pub fn create_regional_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS regional (
            id INTEGER PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_regional(row: &Row) -> Result<Regional, rusqlite::Error> {
    Ok(Regional {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        is_active: row.get(3)?,
    })
}

/// Create a new regional unit.
///
/// # Errors
/// This function will return a:
/// - [Error::MissingField] if the code is empty,
/// - [Error::DuplicateRegionalCode] if the code already exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_regional(new_regional: NewRegional, connection: &Connection) -> Result<Regional, Error> {
    if new_regional.code.trim().is_empty() {
        return Err(Error::MissingField("code"));
    }

    let regional = connection
        .prepare(
            "INSERT INTO regional (code, name) VALUES (?1, ?2)
             RETURNING id, code, name, is_active",
        )?
        .query_row(
            (new_regional.code.trim(), new_regional.name),
            map_row_to_regional,
        )?;

    Ok(regional)
}

/// Retrieve a regional unit by its unique `code`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if no unit has the code,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_regional_by_code(code: &str, connection: &Connection) -> Result<Regional, Error> {
    let regional = connection
        .prepare("SELECT id, code, name, is_active FROM regional WHERE code = :code")?
        .query_row(&[(":code", &code)], map_row_to_regional)?;

    Ok(regional)
}

/// List regional units ordered by code. Inactive units are skipped unless
/// `include_inactive` is set.
pub fn list_regionals(
    include_inactive: bool,
    connection: &Connection,
) -> Result<Vec<Regional>, Error> {
    connection
        .prepare(
            "SELECT id, code, name, is_active FROM regional
             WHERE is_active = 1 OR :include_inactive
             ORDER BY code",
        )?
        .query_map(&[(":include_inactive", &include_inactive)], map_row_to_regional)?
        .map(|maybe_regional| maybe_regional.map_err(Error::from))
        .collect()
}

/// Rename a regional unit. The code is immutable once created.
pub fn update_regional(
    id: DatabaseId,
    name: &str,
    connection: &Connection,
) -> Result<Regional, Error> {
    let rows_affected = connection.execute(
        "UPDATE regional SET name = :name WHERE id = :id",
        &[(":name", &name as &dyn rusqlite::ToSql), (":id", &id)],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    let regional = connection
        .prepare("SELECT id, code, name, is_active FROM regional WHERE id = :id")?
        .query_row(&[(":id", &id)], map_row_to_regional)?;

    Ok(regional)
}

/// Flip a regional unit's active flag.
pub fn set_regional_active(
    id: DatabaseId,
    is_active: bool,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE regional SET is_active = :is_active WHERE id = :id",
        &[(":is_active", &is_active as &dyn rusqlite::ToSql), (":id", &id)],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

#[cfg(test)]
mod regional_tests {
    use rusqlite::Connection;

    use crate::{Error, db::initialize};

    use super::{NewRegional, create_regional, list_regionals, set_regional_active};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_and_list() {
        let conn = get_test_connection();
        create_regional(
            NewRegional {
                code: "R1".to_owned(),
                name: "Regional 1".to_owned(),
            },
            &conn,
        )
        .unwrap();

        let regionals = list_regionals(false, &conn).unwrap();

        assert_eq!(regionals.len(), 1);
        assert_eq!(regionals[0].code, "R1");
    }

    #[test]
    fn duplicate_code_is_rejected() {
        let conn = get_test_connection();
        let new_regional = NewRegional {
            code: "R1".to_owned(),
            name: "Regional 1".to_owned(),
        };
        create_regional(new_regional.clone(), &conn).unwrap();

        assert_eq!(
            create_regional(new_regional, &conn),
            Err(Error::DuplicateRegionalCode)
        );
    }

    #[test]
    fn deactivation_is_soft() {
        let conn = get_test_connection();
        let regional = create_regional(
            NewRegional {
                code: "R1".to_owned(),
                name: "Regional 1".to_owned(),
            },
            &conn,
        )
        .unwrap();

        set_regional_active(regional.id, false, &conn).unwrap();

        assert!(list_regionals(false, &conn).unwrap().is_empty());
        assert_eq!(list_regionals(true, &conn).unwrap().len(), 1);
    }
}

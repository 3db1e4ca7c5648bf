//! The revolving-fund card and its stored balance.
//!
//! `saldo` is the source of truth for the card's balance. It is never set
//! directly after creation; only top-ups and fund lifecycle transitions move
//! it, always through [adjust_saldo] inside the operation's database
//! transaction.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::CardId};

/// A named revolving-fund account with a stored balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprestFundCard {
    /// The id for the card.
    pub id: CardId,
    /// The unique card number.
    pub nomor_kartu: String,
    /// The card holder.
    pub user: String,
    /// The person in charge of the card.
    pub pic: String,
    /// The current balance.
    pub saldo: i64,
    /// Whether the card can still be used on new funds.
    pub is_active: bool,
}

/// The payload for registering a card.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    /// The unique card number.
    pub nomor_kartu: String,
    /// The card holder.
    pub user: String,
    /// The person in charge of the card.
    #[serde(default)]
    pub pic: String,
    /// The opening balance.
    #[serde(default)]
    pub saldo: i64,
}

pub fn create_card_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS imprest_fund_card (
            id INTEGER PRIMARY KEY,
            nomor_kartu TEXT NOT NULL UNIQUE,
            user TEXT NOT NULL,
            pic TEXT NOT NULL DEFAULT '',
            saldo INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_card(row: &Row) -> Result<ImprestFundCard, rusqlite::Error> {
    Ok(ImprestFundCard {
        id: row.get(0)?,
        nomor_kartu: row.get(1)?,
        user: row.get(2)?,
        pic: row.get(3)?,
        saldo: row.get(4)?,
        is_active: row.get(5)?,
    })
}

/// Register a new card.
///
/// # Errors
/// This function will return a:
/// - [Error::MissingField] if the card number is empty,
/// - [Error::DuplicateCardNumber] if the number is already registered,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_card(new_card: NewCard, connection: &Connection) -> Result<ImprestFundCard, Error> {
    if new_card.nomor_kartu.trim().is_empty() {
        return Err(Error::MissingField("nomorKartu"));
    }

    let card = connection
        .prepare(
            "INSERT INTO imprest_fund_card (nomor_kartu, user, pic, saldo)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, nomor_kartu, user, pic, saldo, is_active",
        )?
        .query_row(
            (
                new_card.nomor_kartu.trim(),
                new_card.user,
                new_card.pic,
                new_card.saldo,
            ),
            map_row_to_card,
        )?;

    Ok(card)
}

/// Retrieve a card by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid card,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_card(id: CardId, connection: &Connection) -> Result<ImprestFundCard, Error> {
    let card = connection
        .prepare(
            "SELECT id, nomor_kartu, user, pic, saldo, is_active
             FROM imprest_fund_card WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_row_to_card)?;

    Ok(card)
}

/// List cards ordered by card number. Inactive cards are skipped unless
/// `include_inactive` is set.
pub fn list_cards(
    include_inactive: bool,
    connection: &Connection,
) -> Result<Vec<ImprestFundCard>, Error> {
    connection
        .prepare(
            "SELECT id, nomor_kartu, user, pic, saldo, is_active FROM imprest_fund_card
             WHERE is_active = 1 OR :include_inactive
             ORDER BY nomor_kartu",
        )?
        .query_map(&[(":include_inactive", &include_inactive)], map_row_to_card)?
        .map(|maybe_card| maybe_card.map_err(Error::from))
        .collect()
}

/// Update a card's holder and PIC. The card number and saldo are not
/// editable here; saldo only moves through [adjust_saldo].
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid card,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_card(
    id: CardId,
    user: &str,
    pic: &str,
    connection: &Connection,
) -> Result<ImprestFundCard, Error> {
    let rows_affected = connection.execute(
        "UPDATE imprest_fund_card SET user = :user, pic = :pic WHERE id = :id",
        &[
            (":user", &user as &dyn rusqlite::ToSql),
            (":pic", &pic),
            (":id", &id),
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_card(id, connection)
}

/// Flip a card's active flag.
pub fn set_card_active(id: CardId, is_active: bool, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE imprest_fund_card SET is_active = :is_active WHERE id = :id",
        &[(":is_active", &is_active as &dyn rusqlite::ToSql), (":id", &id)],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Move a card's saldo by `delta` (negative to debit) as a single
/// read-modify-write statement.
///
/// Callers run this inside the database transaction of the lifecycle
/// operation that moves the money, so the balance can never drift from the
/// fund records it reflects.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid card,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn adjust_saldo(id: CardId, delta: i64, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE imprest_fund_card SET saldo = saldo + :delta WHERE id = :id",
        &[(":delta", &delta as &dyn rusqlite::ToSql), (":id", &id)],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

#[cfg(test)]
mod card_tests {
    use rusqlite::Connection;

    use crate::{Error, db::initialize};

    use super::{NewCard, adjust_saldo, create_card, get_card, update_card};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn new_card(nomor: &str) -> NewCard {
        NewCard {
            nomor_kartu: nomor.to_owned(),
            user: "Budi".to_owned(),
            pic: "Siti".to_owned(),
            saldo: 5_000_000,
        }
    }

    #[test]
    fn create_and_get() {
        let conn = get_test_connection();

        let card = create_card(new_card("KK-001"), &conn).unwrap();

        assert_eq!(card.saldo, 5_000_000);
        assert_eq!(get_card(card.id, &conn).unwrap(), card);
    }

    #[test]
    fn duplicate_number_is_rejected() {
        let conn = get_test_connection();
        create_card(new_card("KK-001"), &conn).unwrap();

        assert_eq!(
            create_card(new_card("KK-001"), &conn),
            Err(Error::DuplicateCardNumber)
        );
    }

    #[test]
    fn adjust_moves_the_stored_balance() {
        let conn = get_test_connection();
        let card = create_card(new_card("KK-001"), &conn).unwrap();

        adjust_saldo(card.id, -1_200_000, &conn).unwrap();
        adjust_saldo(card.id, 200_000, &conn).unwrap();

        assert_eq!(get_card(card.id, &conn).unwrap().saldo, 4_000_000);
    }

    #[test]
    fn adjust_missing_card_fails() {
        let conn = get_test_connection();

        assert_eq!(adjust_saldo(42, 1, &conn), Err(Error::NotFound));
    }

    #[test]
    fn update_cannot_touch_saldo() {
        let conn = get_test_connection();
        let card = create_card(new_card("KK-001"), &conn).unwrap();

        let updated = update_card(card.id, "Andi", "Rina", &conn).unwrap();

        assert_eq!(updated.user, "Andi");
        assert_eq!(updated.saldo, 5_000_000);
    }
}

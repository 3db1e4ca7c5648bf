//! Orchestrates the imprest fund lifecycle: open, status changes, deletion,
//! and top-ups.
//!
//! Every operation here runs inside a single database transaction, so the
//! fund record, its generated transactions, and the card saldo either all
//! move together or not at all.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
    Error,
    budget::remaining,
    database_id::{CardId, GlAccountId, ImprestFundId},
    imprest_fund::{
        card::adjust_saldo,
        core::{
            FundRow, FundStatus, ImprestFund, ImprestItem, NewImprestItem, delete_fund_row,
            get_fund, insert_fund, items_total, list_items, replace_items, update_fund_row,
        },
    },
    transaction::{
        core::{JenisPengadaan, NewTransaction, create_transaction, delete_transactions_for_fund,
            sync_transactions_for_fund},
        status::{FinanceFields, TaskFlags, TransactionStatus, derive_task_flags},
    },
};

/// The regional booked when a fund has none.
const FALLBACK_REGIONAL: &str = "HO";
/// The using regional booked when neither the item nor the fund names one.
const FALLBACK_PENGGUNA: &str = "Head Office";

/// The payload for creating or editing a fund.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundPayload {
    /// The activity group the request is for.
    pub kelompok_kegiatan: String,
    /// The regional the spend is booked under; required to open.
    #[serde(default)]
    pub regional_code: Option<String>,
    /// The card the fund draws on.
    #[serde(default)]
    pub imprest_fund_card_id: Option<CardId>,
    /// The requested status.
    #[serde(default = "FundPayload::default_status")]
    pub status: FundStatus,
    /// The spend lines. On edit, a non-empty list replaces the existing
    /// items wholesale; an empty list leaves them untouched.
    #[serde(default)]
    pub items: Vec<NewImprestItem>,
    /// The finance hand-off fields.
    #[serde(flatten)]
    pub finance: FinanceFields,
    /// The checklist flags; the derived three are recomputed regardless.
    #[serde(flatten)]
    pub task_flags: TaskFlags,
}

impl FundPayload {
    fn default_status() -> FundStatus {
        FundStatus::Draft
    }
}

/// A fund together with its spend lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundDetail {
    /// The fund record.
    #[serde(flatten)]
    pub fund: ImprestFund,
    /// The spend lines.
    pub items: Vec<ImprestItem>,
}

fn transaction_status_for(status: FundStatus) -> TransactionStatus {
    match status {
        // Draft never reaches the fan-out; opened is the floor.
        FundStatus::Draft | FundStatus::Open => TransactionStatus::Open,
        FundStatus::Proses => TransactionStatus::Proses,
        FundStatus::Close => TransactionStatus::Close,
    }
}

/// Sum the items per GL account, in GL-account order.
fn group_items_by_gl_account(items: &[NewImprestItem]) -> BTreeMap<GlAccountId, i64> {
    let mut groups = BTreeMap::new();
    for item in items {
        *groups.entry(item.gl_account_id).or_insert(0) += item.jumlah;
    }
    groups
}

/// Check every GL-account group against the regional's remaining allocation
/// for the current quarter. All-or-nothing: the first short group fails the
/// whole open.
fn check_allocation_capacity(
    items: &[NewImprestItem],
    regional_code: &str,
    (year, quarter): (i32, u8),
    connection: &Connection,
) -> Result<(), Error> {
    for (gl_account_id, needed) in group_items_by_gl_account(items) {
        let balance = remaining(gl_account_id, regional_code, quarter, year, connection)?;

        if needed > balance.remaining {
            return Err(Error::InsufficientAllocation {
                gl_account_id,
                needed,
                remaining: balance.remaining,
            });
        }
    }

    Ok(())
}

/// Create one `Open` transaction per item, linked back to the fund.
///
/// The transactions are booked under the current calendar quarter and year,
/// not the quarter of the item's own date; the item date becomes the receipt
/// date.
fn generate_transactions(
    fund: &ImprestFund,
    items: &[ImprestItem],
    (year, quarter): (i32, u8),
    connection: &Connection,
) -> Result<(), Error> {
    let regional_code = fund
        .regional_code
        .clone()
        .unwrap_or_else(|| FALLBACK_REGIONAL.to_owned());

    for item in items {
        let regional_pengguna = item
            .area_pengguna
            .clone()
            .or_else(|| fund.regional_code.clone())
            .unwrap_or_else(|| FALLBACK_PENGGUNA.to_owned());

        create_transaction(
            NewTransaction {
                gl_account_id: item.gl_account_id,
                quarter,
                regional_code: regional_code.clone(),
                kegiatan: item.uraian.clone(),
                regional_pengguna,
                year,
                tanggal_kwitansi: Some(item.tanggal),
                nilai_kwitansi: item.jumlah,
                jenis_pajak: None,
                jenis_pengadaan: JenisPengadaan::InpresFund,
                vendor_id: None,
                finance: FinanceFields::default(),
                task_flags: TaskFlags::default(),
                imprest_fund_id: Some(fund.id),
            },
            connection,
        )?;
    }

    Ok(())
}

/// Create a fund, as a draft or opened straight away.
///
/// Opening requires a regional code and enough remaining allocation for
/// every GL-account group of the items; any shortfall aborts the whole
/// operation with nothing persisted. On success the items become `Open`
/// transactions and the card (if any) is debited by the item total.
///
/// # Errors
/// This function will return a:
/// - [Error::MissingField] if opening without a regional code,
/// - [Error::InsufficientAllocation] if an item group exceeds what is left,
/// - [Error::InvalidStatusTransition] if created as proses or close,
/// - [Error::AmountNotPositive] if an item amount is not positive,
/// - [Error::NotFound] if the card or a GL account does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_fund(
    payload: FundPayload,
    current_period: (i32, u8),
    connection: &Connection,
) -> Result<FundDetail, Error> {
    if matches!(payload.status, FundStatus::Proses | FundStatus::Close) {
        return Err(Error::InvalidStatusTransition {
            from: FundStatus::Draft.as_str(),
            to: payload.status.as_str(),
        });
    }

    let finance = payload.finance.normalized();
    let task_flags = derive_task_flags(payload.task_flags, &finance);
    let total_amount = items_total(&payload.items);

    let tx = connection.unchecked_transaction()?;

    if payload.status == FundStatus::Open {
        let regional_code = payload
            .regional_code
            .as_deref()
            .ok_or(Error::MissingField("regionalCode"))?;

        check_allocation_capacity(&payload.items, regional_code, current_period, &tx)?;
    }

    let fund = insert_fund(
        &FundRow {
            kelompok_kegiatan: payload.kelompok_kegiatan,
            regional_code: payload.regional_code,
            imprest_fund_card_id: payload.imprest_fund_card_id,
            status: payload.status,
            total_amount,
            debit: 0,
            finance,
            task_flags,
        },
        &tx,
    )?;
    let items = replace_items(fund.id, &payload.items, &tx)?;

    if payload.status == FundStatus::Open {
        generate_transactions(&fund, &items, current_period, &tx)?;

        if let Some(card_id) = fund.imprest_fund_card_id {
            adjust_saldo(card_id, -total_amount, &tx)?;
        }
    }

    tx.commit()?;

    Ok(FundDetail { fund, items })
}

/// Edit a fund.
///
/// While the fund stays a draft this is a plain write-through with wholesale
/// item replacement. A draft opened here gets its transactions generated and
/// the card debited, like the create path (the allocation capacity check is
/// not re-run on this path). A non-draft edit fans the fund's status,
/// finance fields, and task flags out to every linked transaction, and a
/// transition to close credits the card back the amount finance transferred.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the fund does not exist,
/// - [Error::MissingField] if opening without a regional code,
/// - [Error::InvalidStatusTransition] if a non-draft fund is sent back to
///   draft,
/// - [Error::AmountNotPositive] if a replacement item amount is not
///   positive,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_fund(
    id: ImprestFundId,
    payload: FundPayload,
    current_period: (i32, u8),
    connection: &Connection,
) -> Result<FundDetail, Error> {
    let tx = connection.unchecked_transaction()?;

    let existing = get_fund(id, &tx)?;

    if existing.status != FundStatus::Draft && payload.status == FundStatus::Draft {
        return Err(Error::InvalidStatusTransition {
            from: existing.status.as_str(),
            to: payload.status.as_str(),
        });
    }

    let finance = payload.finance.normalized();
    let task_flags = derive_task_flags(payload.task_flags, &finance);

    let items = if payload.items.is_empty() {
        list_items(id, &tx)?
    } else {
        replace_items(id, &payload.items, &tx)?
    };
    let total_amount = items.iter().map(|item| item.jumlah).sum();

    let regional_code = payload.regional_code.or(existing.regional_code.clone());
    let opening = existing.status == FundStatus::Draft && payload.status == FundStatus::Open;

    if opening && regional_code.is_none() {
        return Err(Error::MissingField("regionalCode"));
    }

    let fund = update_fund_row(
        id,
        &FundRow {
            kelompok_kegiatan: payload.kelompok_kegiatan,
            regional_code,
            imprest_fund_card_id: payload.imprest_fund_card_id.or(existing.imprest_fund_card_id),
            status: payload.status,
            total_amount,
            debit: existing.debit,
            finance,
            task_flags,
        },
        &tx,
    )?;

    if opening {
        generate_transactions(&fund, &items, current_period, &tx)?;

        if let Some(card_id) = fund.imprest_fund_card_id {
            adjust_saldo(card_id, -total_amount, &tx)?;
        }
    } else if existing.status != FundStatus::Draft {
        sync_transactions_for_fund(
            id,
            transaction_status_for(fund.status),
            &fund.finance,
            fund.task_flags,
            &tx,
        )?;

        let closing = fund.status == FundStatus::Close && existing.status != FundStatus::Close;
        if closing
            && let (Some(card_id), Some(nilai_transfer)) =
                (fund.imprest_fund_card_id, fund.finance.nilai_transfer)
        {
            adjust_saldo(card_id, nilai_transfer, &tx)?;
        }
    }

    tx.commit()?;

    Ok(FundDetail { fund, items })
}

/// Delete a fund, undoing its effect on the card.
///
/// A non-draft fund debited its card when it opened, so the card is credited
/// back `total_amount - nilai_transfer` (when positive) before the fund and
/// its generated transactions are removed.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the fund does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_fund(id: ImprestFundId, connection: &Connection) -> Result<(), Error> {
    let tx = connection.unchecked_transaction()?;

    let fund = get_fund(id, &tx)?;

    if let Some(card_id) = fund.imprest_fund_card_id
        && fund.status != FundStatus::Draft
    {
        let amount_to_return = fund.total_amount - fund.finance.nilai_transfer.unwrap_or(0);
        if amount_to_return > 0 {
            adjust_saldo(card_id, amount_to_return, &tx)?;
        }
    }

    delete_transactions_for_fund(id, &tx)?;
    delete_fund_row(id, &tx)?;

    tx.commit()?;

    Ok(())
}

/// Top up a card.
///
/// The top-up is recorded as a degenerate closed fund — no items, the amount
/// in `debit`, every task flag done — so it appears in the same history as
/// real disbursements, and the card is credited immediately.
///
/// # Errors
/// This function will return a:
/// - [Error::AmountNotPositive] if the amount is not positive,
/// - [Error::NotFound] if the card does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn top_up(card_id: CardId, amount: i64, connection: &Connection) -> Result<ImprestFund, Error> {
    if amount <= 0 {
        return Err(Error::AmountNotPositive);
    }

    let tx = connection.unchecked_transaction()?;

    let fund = insert_fund(
        &FundRow {
            kelompok_kegiatan: "Top Up".to_owned(),
            regional_code: None,
            imprest_fund_card_id: Some(card_id),
            status: FundStatus::Close,
            total_amount: 0,
            debit: amount,
            finance: FinanceFields::default(),
            task_flags: TaskFlags::ALL_DONE,
        },
        &tx,
    )?;
    adjust_saldo(card_id, amount, &tx)?;

    tx.commit()?;

    Ok(fund)
}

#[cfg(test)]
mod lifecycle_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        budget::{
            BudgetUpsert, RegionalShare, remaining as remaining_query, upsert_allocations,
            upsert_budget,
        },
        db::initialize,
        gl_account::{NewGlAccount, create_gl_account},
        imprest_fund::{
            card::{NewCard, create_card, get_card},
            core::{FundStatus, NewImprestItem, get_fund, list_items},
        },
        transaction::{
            core::{JenisPengadaan, list_transactions_for_fund},
            status::{FinanceFields, TaskFlags, TransactionStatus},
        },
    };

    use super::{FundPayload, create_fund, delete_fund, top_up, update_fund};

    const NOW: (i32, u8) = (2025, 1);

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert_test_gl_account(conn: &Connection, code: &str) -> i64 {
        create_gl_account(
            NewGlAccount {
                code: code.to_owned(),
                description: "ATK".to_owned(),
                keterangan: String::new(),
            },
            conn,
        )
        .unwrap()
        .id
    }

    fn insert_test_allocation(conn: &Connection, gl_account_id: i64, amount: i64) {
        let budget = upsert_budget(
            BudgetUpsert {
                gl_account_id,
                year: NOW.0,
                rkap: amount * 4,
                release_percent: 100.0,
                quarterly: Some([amount; 4]),
                monthly: None,
            },
            conn,
        )
        .unwrap();

        upsert_allocations(
            budget.id,
            NOW.1,
            &[RegionalShare {
                regional_code: "R1".to_owned(),
                percentage: 100.0,
                amount,
            }],
            conn,
        )
        .unwrap();
    }

    fn insert_test_card(conn: &Connection, saldo: i64) -> i64 {
        create_card(
            NewCard {
                nomor_kartu: "KK-001".to_owned(),
                user: "Budi".to_owned(),
                pic: String::new(),
                saldo,
            },
            conn,
        )
        .unwrap()
        .id
    }

    fn item(gl_account_id: i64, jumlah: i64) -> NewImprestItem {
        NewImprestItem {
            tanggal: date!(2025 - 02 - 10),
            uraian: "Beli ATK".to_owned(),
            gl_account_id,
            area_pengguna: None,
            jumlah,
        }
    }

    fn payload(
        status: FundStatus,
        card_id: Option<i64>,
        items: Vec<NewImprestItem>,
    ) -> FundPayload {
        FundPayload {
            kelompok_kegiatan: "Operasional Kantor".to_owned(),
            regional_code: Some("R1".to_owned()),
            imprest_fund_card_id: card_id,
            status,
            items,
            finance: FinanceFields::default(),
            task_flags: TaskFlags::default(),
        }
    }

    #[test]
    fn opening_debits_the_card_and_generates_open_transactions() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn, "6101001");
        insert_test_allocation(&conn, gl_account_id, 2_000_000);
        let card_id = insert_test_card(&conn, 5_000_000);

        let detail = create_fund(
            payload(
                FundStatus::Open,
                Some(card_id),
                vec![item(gl_account_id, 600_000), item(gl_account_id, 400_000)],
            ),
            NOW,
            &conn,
        )
        .unwrap();

        assert_eq!(detail.fund.status, FundStatus::Open);
        assert_eq!(detail.fund.total_amount, 1_000_000);
        assert_eq!(get_card(card_id, &conn).unwrap().saldo, 4_000_000);

        let transactions = list_transactions_for_fund(detail.fund.id, &conn).unwrap();
        assert_eq!(transactions.len(), 2);
        for transaction in &transactions {
            assert_eq!(transaction.status, TransactionStatus::Open);
            assert_eq!(transaction.jenis_pengadaan, JenisPengadaan::InpresFund);
            assert_eq!(transaction.regional_code, "R1");
            assert_eq!(transaction.quarter, NOW.1);
            assert_eq!(transaction.year, NOW.0);
        }
    }

    #[test]
    fn opened_spend_shows_up_in_the_remaining_balance() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn, "6101001");
        insert_test_allocation(&conn, gl_account_id, 2_000_000);

        create_fund(
            payload(FundStatus::Open, None, vec![item(gl_account_id, 600_000)]),
            NOW,
            &conn,
        )
        .unwrap();

        let balance = remaining_query(gl_account_id, "R1", NOW.1, NOW.0, &conn).unwrap();
        assert_eq!(balance.used, 600_000);
        assert_eq!(balance.remaining, 1_400_000);
    }

    #[test]
    fn opening_fails_atomically_when_allocation_is_short() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn, "6101001");
        insert_test_allocation(&conn, gl_account_id, 500_000);
        let card_id = insert_test_card(&conn, 5_000_000);

        let result = create_fund(
            payload(
                FundStatus::Open,
                Some(card_id),
                vec![item(gl_account_id, 600_000)],
            ),
            NOW,
            &conn,
        );

        assert_eq!(
            result,
            Err(Error::InsufficientAllocation {
                gl_account_id,
                needed: 600_000,
                remaining: 500_000,
            })
        );
        // Nothing was persisted.
        assert_eq!(get_card(card_id, &conn).unwrap().saldo, 5_000_000);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM imprest_fund", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn one_short_group_fails_the_whole_open() {
        let conn = get_test_connection();
        let funded = insert_test_gl_account(&conn, "6101001");
        let unfunded = insert_test_gl_account(&conn, "6101002");
        insert_test_allocation(&conn, funded, 2_000_000);

        let result = create_fund(
            payload(
                FundStatus::Open,
                None,
                vec![item(funded, 100_000), item(unfunded, 100_000)],
            ),
            NOW,
            &conn,
        );

        assert!(matches!(
            result,
            Err(Error::InsufficientAllocation { gl_account_id, .. }) if gl_account_id == unfunded
        ));
    }

    #[test]
    fn opening_requires_a_regional_code() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn, "6101001");

        let mut fund_payload = payload(FundStatus::Open, None, vec![item(gl_account_id, 1)]);
        fund_payload.regional_code = None;

        assert_eq!(
            create_fund(fund_payload, NOW, &conn),
            Err(Error::MissingField("regionalCode"))
        );
    }

    #[test]
    fn drafts_move_no_money() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn, "6101001");
        let card_id = insert_test_card(&conn, 5_000_000);

        let detail = create_fund(
            payload(
                FundStatus::Draft,
                Some(card_id),
                vec![item(gl_account_id, 600_000)],
            ),
            NOW,
            &conn,
        )
        .unwrap();

        assert_eq!(detail.fund.total_amount, 600_000);
        assert_eq!(get_card(card_id, &conn).unwrap().saldo, 5_000_000);
        assert!(list_transactions_for_fund(detail.fund.id, &conn)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn draft_edit_replaces_items_wholesale() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn, "6101001");
        let detail = create_fund(
            payload(
                FundStatus::Draft,
                None,
                vec![item(gl_account_id, 100), item(gl_account_id, 200)],
            ),
            NOW,
            &conn,
        )
        .unwrap();

        let updated = update_fund(
            detail.fund.id,
            payload(FundStatus::Draft, None, vec![item(gl_account_id, 999)]),
            NOW,
            &conn,
        )
        .unwrap();

        assert_eq!(updated.items.len(), 1);
        assert_eq!(updated.fund.total_amount, 999);
        assert_eq!(list_items(detail.fund.id, &conn).unwrap().len(), 1);
    }

    #[test]
    fn opening_via_edit_debits_the_card_without_a_capacity_check() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn, "6101001");
        let card_id = insert_test_card(&conn, 1_000_000);
        // No budget or allocation exists at all.
        let detail = create_fund(
            payload(
                FundStatus::Draft,
                Some(card_id),
                vec![item(gl_account_id, 750_000)],
            ),
            NOW,
            &conn,
        )
        .unwrap();

        let updated = update_fund(
            detail.fund.id,
            payload(FundStatus::Open, Some(card_id), vec![]),
            NOW,
            &conn,
        )
        .unwrap();

        assert_eq!(updated.fund.status, FundStatus::Open);
        assert_eq!(get_card(card_id, &conn).unwrap().saldo, 250_000);
        assert_eq!(
            list_transactions_for_fund(detail.fund.id, &conn).unwrap().len(),
            1
        );
    }

    #[test]
    fn closing_credits_back_the_transferred_amount_and_syncs_transactions() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn, "6101001");
        insert_test_allocation(&conn, gl_account_id, 2_000_000);
        let card_id = insert_test_card(&conn, 5_000_000);
        let detail = create_fund(
            payload(
                FundStatus::Open,
                Some(card_id),
                vec![item(gl_account_id, 1_000_000)],
            ),
            NOW,
            &conn,
        )
        .unwrap();
        assert_eq!(get_card(card_id, &conn).unwrap().saldo, 4_000_000);

        let mut close_payload = payload(FundStatus::Close, Some(card_id), vec![]);
        close_payload.finance = FinanceFields {
            no_tiket_mydx: Some("MYDX-9".to_owned()),
            tgl_serah_finance: Some(date!(2025 - 03 - 01)),
            pic_finance: Some("Rina".to_owned()),
            no_hp_finance: Some("0812000111".to_owned()),
            tgl_transfer_vendor: Some(date!(2025 - 03 - 05)),
            nilai_transfer: Some(600_000),
        };
        let updated = update_fund(detail.fund.id, close_payload, NOW, &conn).unwrap();

        assert_eq!(updated.fund.status, FundStatus::Close);
        assert_eq!(get_card(card_id, &conn).unwrap().saldo, 4_600_000);

        let transactions = list_transactions_for_fund(detail.fund.id, &conn).unwrap();
        for transaction in &transactions {
            assert_eq!(transaction.status, TransactionStatus::Close);
            assert_eq!(transaction.finance.nilai_transfer, Some(600_000));
            assert!(transaction.task_flags.task_vendor_dibayar);
        }
    }

    #[test]
    fn an_opened_fund_cannot_go_back_to_draft() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn, "6101001");
        insert_test_allocation(&conn, gl_account_id, 2_000_000);
        let detail = create_fund(
            payload(FundStatus::Open, None, vec![item(gl_account_id, 1)]),
            NOW,
            &conn,
        )
        .unwrap();

        let result = update_fund(
            detail.fund.id,
            payload(FundStatus::Draft, None, vec![]),
            NOW,
            &conn,
        );

        assert_eq!(
            result,
            Err(Error::InvalidStatusTransition {
                from: "open",
                to: "draft",
            })
        );
    }

    #[test]
    fn deleting_a_closed_fund_credits_the_net_debit_back() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn, "6101001");
        insert_test_allocation(&conn, gl_account_id, 2_000_000);
        let card_id = insert_test_card(&conn, 5_000_000);
        let detail = create_fund(
            payload(
                FundStatus::Open,
                Some(card_id),
                vec![item(gl_account_id, 1_000_000)],
            ),
            NOW,
            &conn,
        )
        .unwrap();

        let mut close_payload = payload(FundStatus::Close, Some(card_id), vec![]);
        close_payload.finance.nilai_transfer = Some(600_000);
        update_fund(detail.fund.id, close_payload, NOW, &conn).unwrap();
        // saldo: 5_000_000 - 1_000_000 + 600_000
        assert_eq!(get_card(card_id, &conn).unwrap().saldo, 4_600_000);

        delete_fund(detail.fund.id, &conn).unwrap();

        // The delete returns total - transfer = 400_000.
        assert_eq!(get_card(card_id, &conn).unwrap().saldo, 5_000_000);
        assert!(list_transactions_for_fund(detail.fund.id, &conn)
            .unwrap()
            .is_empty());
        assert_eq!(get_fund(detail.fund.id, &conn), Err(Error::NotFound));
        assert!(list_items(detail.fund.id, &conn).unwrap().is_empty());
    }

    #[test]
    fn deleting_a_draft_leaves_the_card_alone() {
        let conn = get_test_connection();
        let gl_account_id = insert_test_gl_account(&conn, "6101001");
        let card_id = insert_test_card(&conn, 5_000_000);
        let detail = create_fund(
            payload(
                FundStatus::Draft,
                Some(card_id),
                vec![item(gl_account_id, 1_000_000)],
            ),
            NOW,
            &conn,
        )
        .unwrap();

        delete_fund(detail.fund.id, &conn).unwrap();

        assert_eq!(get_card(card_id, &conn).unwrap().saldo, 5_000_000);
    }

    #[test]
    fn top_up_credits_the_card_and_records_a_closed_fund() {
        let conn = get_test_connection();
        let card_id = insert_test_card(&conn, 1_000_000);

        let fund = top_up(card_id, 250_000, &conn).unwrap();

        assert_eq!(get_card(card_id, &conn).unwrap().saldo, 1_250_000);
        assert_eq!(fund.status, FundStatus::Close);
        assert_eq!(fund.debit, 250_000);
        assert_eq!(fund.total_amount, 0);
        assert_eq!(fund.kelompok_kegiatan, "Top Up");
        assert!(fund.task_flags.all_done());
        assert!(list_items(fund.id, &conn).unwrap().is_empty());
    }

    #[test]
    fn top_up_rejects_non_positive_amounts() {
        let conn = get_test_connection();
        let card_id = insert_test_card(&conn, 1_000_000);

        assert_eq!(top_up(card_id, 0, &conn), Err(Error::AmountNotPositive));
        assert_eq!(get_card(card_id, &conn).unwrap().saldo, 1_000_000);
    }

    #[test]
    fn top_up_on_a_missing_card_fails() {
        let conn = get_test_connection();

        assert_eq!(top_up(42, 100, &conn), Err(Error::NotFound));
    }
}

//! The transaction status machine.
//!
//! Status is never stored by the caller; it is recomputed by a pure function
//! on every write path, driven by which finance fields are filled in and
//! which checklist tasks are done.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::Date;

/// Where a transaction sits in the finance hand-off checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Recorded, nothing handed to finance yet.
    Open,
    /// Somewhere in the finance hand-off.
    Proses,
    /// Fully handed off and paid out.
    Close,
}

impl TransactionStatus {
    /// The canonical string stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Open => "Open",
            TransactionStatus::Proses => "Proses",
            TransactionStatus::Close => "Close",
        }
    }
}

impl ToSql for TransactionStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "Open" => Ok(TransactionStatus::Open),
            "Proses" => Ok(TransactionStatus::Proses),
            "Close" => Ok(TransactionStatus::Close),
            other => Err(FromSqlError::Other(
                format!("unknown transaction status: {other}").into(),
            )),
        }
    }
}

/// The finance hand-off fields shared by transactions and imprest funds.
///
/// Presence of these fields drives the derived task flags and the status
/// machine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceFields {
    /// Ticket number in the MyDX system.
    #[serde(default)]
    pub no_tiket_mydx: Option<String>,
    /// When the paperwork was handed to finance.
    #[serde(default)]
    pub tgl_serah_finance: Option<Date>,
    /// Who in finance took the hand-off.
    #[serde(default)]
    pub pic_finance: Option<String>,
    /// The finance PIC's phone number.
    #[serde(default)]
    pub no_hp_finance: Option<String>,
    /// When the vendor was paid.
    #[serde(default)]
    pub tgl_transfer_vendor: Option<Date>,
    /// The amount finance transferred.
    #[serde(default)]
    pub nilai_transfer: Option<i64>,
}

impl FinanceFields {
    /// Collapse blank strings to `None` so "filled in" means a real value.
    pub fn normalized(mut self) -> Self {
        if self
            .no_tiket_mydx
            .as_deref()
            .is_some_and(|value| value.trim().is_empty())
        {
            self.no_tiket_mydx = None;
        }
        if self
            .pic_finance
            .as_deref()
            .is_some_and(|value| value.trim().is_empty())
        {
            self.pic_finance = None;
        }
        if self
            .no_hp_finance
            .as_deref()
            .is_some_and(|value| value.trim().is_empty())
        {
            self.no_hp_finance = None;
        }
        self
    }

    /// Whether every hand-off field is filled in.
    pub fn is_complete(&self) -> bool {
        self.no_tiket_mydx.is_some()
            && self.tgl_serah_finance.is_some()
            && self.pic_finance.is_some()
            && self.no_hp_finance.is_some()
            && self.tgl_transfer_vendor.is_some()
            && self.nilai_transfer.is_some()
    }
}

/// The six-step checklist tracked on transactions and imprest funds.
///
/// The last three are derived from the finance fields on every write and are
/// never taken from caller input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFlags {
    /// The request has been submitted.
    #[serde(default)]
    pub task_pengajuan: bool,
    /// The vendor transfer has been prepared.
    #[serde(default)]
    pub task_transfer_vendor: bool,
    /// The receipts have been collected.
    #[serde(default)]
    pub task_terima_berkas: bool,
    /// Derived: a MyDX ticket exists.
    #[serde(default)]
    pub task_upload_mydx: bool,
    /// Derived: the paperwork has gone to finance.
    #[serde(default)]
    pub task_serah_finance: bool,
    /// Derived: the vendor has been paid.
    #[serde(default)]
    pub task_vendor_dibayar: bool,
}

impl TaskFlags {
    /// All six tasks done; used by top-up funds.
    pub const ALL_DONE: TaskFlags = TaskFlags {
        task_pengajuan: true,
        task_transfer_vendor: true,
        task_terima_berkas: true,
        task_upload_mydx: true,
        task_serah_finance: true,
        task_vendor_dibayar: true,
    };

    /// Whether every task is done.
    pub fn all_done(self) -> bool {
        self.task_pengajuan
            && self.task_transfer_vendor
            && self.task_terima_berkas
            && self.task_upload_mydx
            && self.task_serah_finance
            && self.task_vendor_dibayar
    }
}

/// Recompute the task flags for a write.
///
/// The first three flags are whatever the caller claims; the last three
/// always mirror the presence of their finance field.
pub fn derive_task_flags(requested: TaskFlags, finance: &FinanceFields) -> TaskFlags {
    TaskFlags {
        task_pengajuan: requested.task_pengajuan,
        task_transfer_vendor: requested.task_transfer_vendor,
        task_terima_berkas: requested.task_terima_berkas,
        task_upload_mydx: finance.no_tiket_mydx.is_some(),
        task_serah_finance: finance.tgl_serah_finance.is_some(),
        task_vendor_dibayar: finance.tgl_transfer_vendor.is_some(),
    }
}

/// The status a freshly created transaction gets.
///
/// A paid-out transaction arrives `Close`, one already in the hand-off
/// arrives `Proses`, everything else starts `Open`.
pub fn derive_status_on_create(finance: &FinanceFields) -> TransactionStatus {
    if finance.tgl_transfer_vendor.is_some() {
        TransactionStatus::Close
    } else if finance.no_tiket_mydx.is_some() || finance.tgl_serah_finance.is_some() {
        TransactionStatus::Proses
    } else {
        TransactionStatus::Open
    }
}

/// Everything the update-path status derivation looks at.
#[derive(Debug, Clone, Copy)]
pub struct CompletionCheck<'a> {
    /// The quarter recorded on the transaction.
    pub quarter: u8,
    /// The regional code, empty when unset.
    pub regional_code: &'a str,
    /// The activity description, empty when unset.
    pub kegiatan: &'a str,
    /// The using regional, empty when unset.
    pub regional_pengguna: &'a str,
    /// Whether a receipt date is recorded.
    pub has_tanggal_kwitansi: bool,
    /// The pre-tax value.
    pub nilai_tanpa_ppn: i64,
    /// Whether a tax treatment is recorded.
    pub has_jenis_pajak: bool,
    /// Whether a vendor is recorded.
    pub has_vendor: bool,
    /// The finance hand-off fields.
    pub finance: &'a FinanceFields,
    /// The checklist flags.
    pub task_flags: TaskFlags,
}

/// The status an updated transaction gets.
///
/// `Close` only when every completion field is present and all six tasks are
/// done; otherwise `Proses`. An edit never takes a transaction back to
/// `Open`.
pub fn derive_status_on_update(check: CompletionCheck<'_>) -> TransactionStatus {
    let complete = (1..=4).contains(&check.quarter)
        && !check.regional_code.is_empty()
        && !check.kegiatan.is_empty()
        && !check.regional_pengguna.is_empty()
        && check.has_tanggal_kwitansi
        && check.nilai_tanpa_ppn > 0
        && check.has_jenis_pajak
        && check.has_vendor
        && check.finance.is_complete()
        && check.task_flags.all_done();

    if complete {
        TransactionStatus::Close
    } else {
        TransactionStatus::Proses
    }
}

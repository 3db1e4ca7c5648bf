//! PPN (value-added tax) computations shared by transactions and budget
//! entry.
//!
//! The two write paths intentionally use inverse conventions: on create the
//! entered receipt value is tax-inclusive and the tax is carved out of it, on
//! update the entered value is pre-tax and the tax is added on top. Both are
//! kept as-is; see DESIGN.md.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// The tax treatment applied to a transaction's receipt value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JenisPajak {
    /// 11% VAT.
    #[serde(rename = "PPN11")]
    Ppn11,
    /// 2% services levy.
    #[serde(rename = "PPNJasa2")]
    PpnJasa2,
    /// 1.1% customs-clearance levy.
    #[serde(rename = "PPNInklaring1.1")]
    PpnInklaring11,
    /// No tax.
    #[serde(rename = "TanpaPPN")]
    TanpaPpn,
}

impl JenisPajak {
    /// The canonical string stored in the database and used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            JenisPajak::Ppn11 => "PPN11",
            JenisPajak::PpnJasa2 => "PPNJasa2",
            JenisPajak::PpnInklaring11 => "PPNInklaring1.1",
            JenisPajak::TanpaPpn => "TanpaPPN",
        }
    }

    /// Parse the canonical string form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PPN11" => Some(JenisPajak::Ppn11),
            "PPNJasa2" => Some(JenisPajak::PpnJasa2),
            "PPNInklaring1.1" => Some(JenisPajak::PpnInklaring11),
            "TanpaPPN" => Some(JenisPajak::TanpaPpn),
            _ => None,
        }
    }
}

impl ToSql for JenisPajak {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for JenisPajak {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        JenisPajak::parse(text)
            .ok_or_else(|| FromSqlError::Other(format!("unknown jenis pajak: {text}").into()))
    }
}

/// The pre-tax and tax portions of a receipt value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PpnSplit {
    /// The pre-tax amount.
    pub nilai_tanpa_ppn: i64,
    /// The tax amount.
    pub nilai_ppn: i64,
}

/// A pre-tax value grossed up to its receipt total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PpnGrossUp {
    /// The pre-tax amount (the caller's input, unchanged).
    pub nilai_tanpa_ppn: i64,
    /// The tax amount.
    pub nilai_ppn: i64,
    /// The receipt total, pre-tax plus tax.
    pub nilai_kwitansi: i64,
}

fn round_rupiah(value: f64) -> i64 {
    value.round() as i64
}

/// Split a receipt value into pre-tax and tax portions (create path).
///
/// The input is the receipt total: for `PPN11` the tax is carved out of it
/// (`base = amount / 1.11`), for the percentage levies the tax is computed on
/// the full amount. No tax code means no tax.
pub fn split_receipt(jenis: Option<JenisPajak>, nilai_kwitansi: i64) -> PpnSplit {
    let nilai_ppn = match jenis {
        Some(JenisPajak::Ppn11) => {
            nilai_kwitansi - round_rupiah(nilai_kwitansi as f64 / 1.11)
        }
        Some(JenisPajak::PpnJasa2) => round_rupiah(nilai_kwitansi as f64 * 0.02),
        Some(JenisPajak::PpnInklaring11) => round_rupiah(nilai_kwitansi as f64 * 0.011),
        Some(JenisPajak::TanpaPpn) | None => 0,
    };

    PpnSplit {
        nilai_tanpa_ppn: nilai_kwitansi - nilai_ppn,
        nilai_ppn,
    }
}

/// Gross a pre-tax value up to its receipt total (update path).
///
/// The input is treated as pre-tax and the tax is added on top, including for
/// `PPN11` — the inverse of [split_receipt]'s convention.
pub fn gross_up(jenis: Option<JenisPajak>, nilai_tanpa_ppn: i64) -> PpnGrossUp {
    let nilai_ppn = match jenis {
        Some(JenisPajak::Ppn11) => round_rupiah(nilai_tanpa_ppn as f64 * 0.11),
        Some(JenisPajak::PpnJasa2) => round_rupiah(nilai_tanpa_ppn as f64 * 0.02),
        Some(JenisPajak::PpnInklaring11) => round_rupiah(nilai_tanpa_ppn as f64 * 0.011),
        Some(JenisPajak::TanpaPpn) | None => 0,
    };

    PpnGrossUp {
        nilai_tanpa_ppn,
        nilai_ppn,
        nilai_kwitansi: nilai_tanpa_ppn + nilai_ppn,
    }
}


#[cfg(test)]
mod gross_up_tests {
    use super::{JenisPajak, gross_up, split_receipt};

    #[test]
    fn ppn11_treats_input_as_pre_tax() {
        let grossed = gross_up(Some(JenisPajak::Ppn11), 100_000);

        assert_eq!(grossed.nilai_tanpa_ppn, 100_000);
        assert_eq!(grossed.nilai_ppn, 11_000);
        assert_eq!(grossed.nilai_kwitansi, 111_000);
    }

    #[test]
    fn create_and_update_paths_disagree_for_ppn11() {
        // Intentional: the create path carves the tax out of the input while
        // the update path adds it on top, so the same number entered on both
        // paths produces different records. Kept as-is; see DESIGN.md.
        let created = split_receipt(Some(JenisPajak::Ppn11), 111_000);
        let updated = gross_up(Some(JenisPajak::Ppn11), 111_000);

        assert_eq!(created.nilai_tanpa_ppn, 100_000);
        assert_eq!(updated.nilai_kwitansi, 123_210);
        assert_ne!(created.nilai_ppn, updated.nilai_ppn);
    }

    #[test]
    fn no_tax_code_passes_the_value_through() {
        let grossed = gross_up(None, 75_000);

        assert_eq!(grossed.nilai_kwitansi, 75_000);
        assert_eq!(grossed.nilai_ppn, 0);
    }
}

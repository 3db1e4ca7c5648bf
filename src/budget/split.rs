//! Deterministic auto-split algorithms for budget amounts.
//!
//! Every split is remainder-absorbing: the parts are equal integer shares and
//! the last part takes whatever integer division left over, so the parts
//! always sum back to the original amount exactly.

use serde::{Deserialize, Serialize};

/// Split `total` across the four quarters. The fourth quarter absorbs the
/// rounding remainder.
pub fn split_across_quarters(total: i64) -> [i64; 4] {
    let per_quarter = total / 4;

    [
        per_quarter,
        per_quarter,
        per_quarter,
        total - 3 * per_quarter,
    ]
}

/// Split `total` across the twelve months. December absorbs the rounding
/// remainder.
pub fn split_across_months(total: i64) -> [i64; 12] {
    let per_month = total / 12;
    let mut months = [per_month; 12];
    months[11] = total - 11 * per_month;

    months
}

/// Derive monthly amounts from quarterly amounts: each quarter is split three
/// ways with its third month absorbing the remainder.
pub fn months_from_quarters(quarters: [i64; 4]) -> [i64; 12] {
    let mut months = [0; 12];

    for (quarter_index, quarter_amount) in quarters.into_iter().enumerate() {
        let per_month = quarter_amount / 3;
        months[quarter_index * 3] = per_month;
        months[quarter_index * 3 + 1] = per_month;
        months[quarter_index * 3 + 2] = quarter_amount - 2 * per_month;
    }

    months
}

/// Derive quarterly amounts from monthly amounts by summing each quarter's
/// three months.
pub fn quarters_from_months(months: [i64; 12]) -> [i64; 4] {
    let mut quarters = [0; 4];

    for (month_index, month_amount) in months.into_iter().enumerate() {
        quarters[month_index / 3] += month_amount;
    }

    quarters
}

/// Split `total` into `parts` equal shares, the last absorbing the remainder.
///
/// Returns an empty vector when `parts` is zero.
pub fn split_evenly(total: i64, parts: usize) -> Vec<i64> {
    if parts == 0 {
        return Vec::new();
    }

    let per_part = total / parts as i64;
    let mut shares = vec![per_part; parts];
    shares[parts - 1] = total - (parts as i64 - 1) * per_part;

    shares
}

/// One regional's share of a quarterly budget amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalShare {
    /// The regional unit's code.
    pub regional_code: String,
    /// The share as a percentage of the quarterly amount.
    #[serde(default)]
    pub percentage: f64,
    /// The share as an amount.
    #[serde(default)]
    pub amount: i64,
}

/// Fill in percentages and derive amounts for a quarter's regional shares.
///
/// Slots left at zero percent share the gap to 100 evenly, so a fully
/// unfilled set degenerates to an even split. Amounts are floored from the
/// percentages, with the last regional absorbing the rounding remainder of
/// `quarter_amount` so the amounts always sum back exactly.
pub fn apply_percentages(quarter_amount: i64, shares: &mut [RegionalShare]) {
    if shares.is_empty() {
        return;
    }

    let assigned: f64 = shares.iter().map(|share| share.percentage).sum();
    let unfilled = shares
        .iter()
        .filter(|share| share.percentage == 0.0)
        .count();

    if unfilled > 0 && assigned < 100.0 {
        let fill = (100.0 - assigned) / unfilled as f64;
        for share in shares.iter_mut() {
            if share.percentage == 0.0 {
                share.percentage = fill;
            }
        }
    }

    let mut allocated = 0;
    let last_index = shares.len() - 1;
    for (index, share) in shares.iter_mut().enumerate() {
        share.amount = if index == last_index {
            quarter_amount - allocated
        } else {
            (quarter_amount as f64 * share.percentage / 100.0).floor() as i64
        };
        allocated += share.amount;
    }
}

#[cfg(test)]
mod split_tests {
    use super::{
        months_from_quarters, quarters_from_months, split_across_months, split_across_quarters,
        split_evenly,
    };

    #[test]
    fn quarters_sum_back_exactly() {
        for total in [0, 1, 3, 799_999, 800_000, 1_000_003] {
            let quarters = split_across_quarters(total);
            assert_eq!(quarters.iter().sum::<i64>(), total, "total {total}");
        }
    }

    #[test]
    fn fourth_quarter_absorbs_the_remainder() {
        assert_eq!(split_across_quarters(800_000), [200_000; 4]);
        assert_eq!(split_across_quarters(10), [2, 2, 2, 4]);
    }

    #[test]
    fn months_sum_back_exactly() {
        for total in [0, 11, 12, 1_000_000] {
            let months = split_across_months(total);
            assert_eq!(months.iter().sum::<i64>(), total, "total {total}");
        }
    }

    #[test]
    fn december_absorbs_the_remainder() {
        let months = split_across_months(25);

        assert_eq!(&months[..11], &[2; 11]);
        assert_eq!(months[11], 3);
    }

    #[test]
    fn months_derived_from_quarters_keep_quarter_totals() {
        let months = months_from_quarters([100, 200, 301, 0]);

        assert_eq!(months[..3].iter().sum::<i64>(), 100);
        assert_eq!(&months[3..6], &[66, 66, 68]);
        assert_eq!(months[6..9].iter().sum::<i64>(), 301);
        assert_eq!(&months[9..], &[0, 0, 0]);
    }

    #[test]
    fn quarters_derived_from_months_are_plain_sums() {
        let mut months = [0_i64; 12];
        months[0] = 10;
        months[2] = 5;
        months[11] = 7;

        assert_eq!(quarters_from_months(months), [15, 0, 0, 7]);
    }

    #[test]
    fn even_split_gives_last_part_the_remainder() {
        assert_eq!(split_evenly(100, 3), vec![33, 33, 34]);
        assert_eq!(split_evenly(9, 3), vec![3, 3, 3]);
        assert_eq!(split_evenly(10, 0), Vec::<i64>::new());
    }
}

#[cfg(test)]
mod apply_percentages_tests {
    use super::{RegionalShare, apply_percentages};

    fn share(code: &str, percentage: f64) -> RegionalShare {
        RegionalShare {
            regional_code: code.to_owned(),
            percentage,
            amount: 0,
        }
    }

    #[test]
    fn unfilled_slots_share_the_gap_to_one_hundred() {
        let mut shares = vec![share("R1", 50.0), share("R2", 0.0), share("R3", 0.0)];

        apply_percentages(1_000_000, &mut shares);

        assert_eq!(shares[1].percentage, 25.0);
        assert_eq!(shares[2].percentage, 25.0);
        let percentage_sum: f64 = shares.iter().map(|s| s.percentage).sum();
        assert!((percentage_sum - 100.0).abs() < 0.01);
    }

    #[test]
    fn amounts_sum_back_exactly_with_last_regional_absorbing() {
        let mut shares = vec![share("R1", 0.0), share("R2", 0.0), share("R3", 0.0)];

        apply_percentages(100, &mut shares);

        assert_eq!(shares[0].amount, 33);
        assert_eq!(shares[1].amount, 33);
        assert_eq!(shares[2].amount, 34);
    }

    #[test]
    fn uneven_percentages_still_sum_exactly() {
        let mut shares = vec![share("R1", 33.33), share("R2", 33.33), share("R3", 33.34)];

        apply_percentages(999_999, &mut shares);

        let amount_sum: i64 = shares.iter().map(|s| s.amount).sum();
        assert_eq!(amount_sum, 999_999);
    }

    #[test]
    fn fully_assigned_percentages_are_left_alone() {
        let mut shares = vec![share("R1", 60.0), share("R2", 40.0)];

        apply_percentages(1_000, &mut shares);

        assert_eq!(shares[0].percentage, 60.0);
        assert_eq!(shares[0].amount, 600);
        assert_eq!(shares[1].amount, 400);
    }

    #[test]
    fn empty_share_list_is_a_no_op() {
        apply_percentages(1_000, &mut []);
    }
}

//! Double-entry validation rules.
//!
//! - At least 2 lines
//! - Every amount strictly positive
//! - Total debits equal total credits
//! - Totals stay within the range of `Decimal`

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{EntryTotals, EntryType, PostingLine, ReferenceTag};

/// Validates the lines of an entry and returns its totals.
pub fn validate_lines(
    reference: &ReferenceTag,
    lines: &[PostingLine],
) -> Result<EntryTotals, LedgerError> {
    if lines.len() < 2 {
        return Err(LedgerError::EmptyEntry {
            reference: reference.clone(),
            count: lines.len(),
        });
    }

    let mut debit = Decimal::ZERO;
    let mut credit = Decimal::ZERO;
    for (index, line) in lines.iter().enumerate() {
        if line.amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount {
                reference: reference.clone(),
                line: index + 1,
                amount: line.amount,
            });
        }
        let total = match line.entry_type {
            EntryType::Debit => &mut debit,
            EntryType::Credit => &mut credit,
        };
        *total = total
            .checked_add(line.amount)
            .ok_or_else(|| LedgerError::AmountOutOfRange {
                reference: reference.clone(),
            })?;
    }

    let totals = EntryTotals::new(debit, credit);
    if !totals.is_balanced {
        return Err(LedgerError::UnbalancedEntry {
            reference: reference.clone(),
            debit,
            credit,
        });
    }
    Ok(totals)
}

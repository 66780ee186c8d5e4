//! CSV format handling for command records and reports
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to command records
//! - Summary and payment-history report serialization
//!
//! All functions are pure (no file I/O) for easy testing.
//!
//! # Input format
//!
//! ```text
//! type,tx,amount,reason
//! open,1,1000000,
//! submit,1,,
//! settle,1,500000,
//! reject,2,,documents missing
//! ```

use crate::types::{Command, CommandRecord, LedgerError, Payment, TransactionRef, TransactionSummary};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: type, tx, amount, reason.
/// Trailing columns may be empty or missing.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub command: String,
    pub tx: TransactionRef,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Convert a CsvRecord to a CommandRecord
///
/// This function:
/// - Parses the command name (case-insensitive)
/// - Parses the amount into a Decimal (if present)
/// - Requires an amount for `open` and `settle`
/// - Uses an empty reason for `reject`/`cancel` when none is given
///
/// Amount values are not range-checked here; the state machine decides
/// whether an amount is acceptable.
///
/// # Errors
///
/// * `ParseError` - Unknown command name or unparseable amount
/// * `MissingAmount` - `open` or `settle` without an amount
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<CommandRecord, LedgerError> {
    let tx = csv_record.tx;

    let amount = match csv_record.amount.as_deref().map(str::trim) {
        Some(amount_str) if !amount_str.is_empty() => {
            Some(Decimal::from_str(amount_str).map_err(|_| LedgerError::ParseError {
                line: None,
                message: format!("Invalid amount '{}' for tx {}", amount_str, tx),
            })?)
        }
        _ => None,
    };

    let reason = csv_record
        .reason
        .map(|reason| reason.trim().to_string())
        .unwrap_or_default();

    let command = match csv_record.command.trim().to_lowercase().as_str() {
        "open" => Command::Open {
            initial_balance: amount.ok_or_else(|| LedgerError::missing_amount("open", tx))?,
        },
        "submit" => Command::Submit,
        "approve" => Command::Approve,
        "activate" => Command::Activate,
        "settle" => Command::Settle {
            amount: amount.ok_or_else(|| LedgerError::missing_amount("settle", tx))?,
        },
        "reject" => Command::Reject { reason },
        "cancel" => Command::Cancel { reason },
        _ => {
            return Err(LedgerError::ParseError {
                line: None,
                message: format!(
                    "Invalid command type '{}' for tx {}",
                    csv_record.command, tx
                ),
            })
        }
    };

    Ok(CommandRecord { tx, command })
}

/// Write transaction summaries in CSV format
///
/// Columns: tx, state, balance, credit, payments, reason. Rows are sorted by
/// transaction reference for deterministic output.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_summary_csv(
    summaries: &[TransactionSummary],
    output: &mut dyn Write,
) -> Result<(), String> {
    let mut writer = csv::Writer::from_writer(output);

    writer
        .write_record(["tx", "state", "balance", "credit", "payments", "reason"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted: Vec<&TransactionSummary> = summaries.iter().collect();
    sorted.sort_by_key(|summary| summary.tx);

    for summary in sorted {
        writer
            .write_record(&[
                summary.tx.to_string(),
                summary.state.to_string(),
                format!("{:.4}", summary.balance),
                format!("{:.4}", summary.credit),
                summary.payments.to_string(),
                summary.reason.clone().unwrap_or_default(),
            ])
            .map_err(|e| format!("Failed to write summary record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

/// Write a payment history in CSV format
///
/// Columns: tx, payment, amount, status, balance, credit, timestamp.
/// Rows are written in the order given.
pub fn write_payments_csv(
    payments: &[(TransactionRef, Payment)],
    output: &mut dyn Write,
) -> Result<(), String> {
    let mut writer = csv::Writer::from_writer(output);

    writer
        .write_record([
            "tx",
            "payment",
            "amount",
            "status",
            "balance",
            "credit",
            "timestamp",
        ])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for (tx, payment) in payments {
        writer
            .write_record(&[
                tx.to_string(),
                payment.id.to_string(),
                format!("{:.4}", payment.amount),
                payment.status.to_string(),
                format!("{:.4}", payment.balance_after),
                format!("{:.4}", payment.credit_after),
                payment.timestamp.to_rfc3339(),
            ])
            .map_err(|e| format!("Failed to write payment record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

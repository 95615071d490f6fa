//! Validation of user-submitted send requests.
//!
//! Forms carry amounts as plain BTC numbers, the way a user types them, and
//! are checked here before anything reaches the node. Every problem is
//! collected so the caller can show them all at once.

use std::collections::BTreeSet;
use std::fmt;

use bitcoin::{Amount, SignedAmount};
use serde::{Deserialize, Serialize};

use crate::config::FundsPolicy;
use crate::rpc::methods::{BumpFeeParams, SendToAddressParams};
use crate::wallet::model::{OutPoint, Outputs, TransactionDraft};

/// One invalid field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All problems found in a form. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// A single problem found outside form validation, e.g. against node state.
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self(vec![FieldError {
            field,
            message: message.into(),
        }])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Whether `field` has at least one error.
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", err.field, err.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Default)]
struct Collector(Vec<FieldError>);

impl Collector {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(ValidationErrors(self.0))
        }
    }

    fn require_text(&mut self, field: &'static str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.push(field, message);
        }
    }

    /// Strictly positive BTC amount with at most 8 decimals.
    fn positive_amount(&mut self, field: &'static str, btc: f64, message: &str) -> Amount {
        if !btc.is_finite() || btc <= 0.0 {
            self.push(field, message);
            return Amount::ZERO;
        }
        match Amount::from_btc(btc) {
            Ok(amount) => amount,
            Err(e) => {
                self.push(field, format!("Invalid amount: {}", e));
                Amount::ZERO
            }
        }
    }

    fn positive_rate(&mut self, field: &'static str, rate: f64) {
        if !rate.is_finite() || rate <= 0.0 {
            self.push(field, "Fee Rate must be greater than zero");
        }
    }

    fn txid(&mut self, field: &'static str, txid: &str) {
        if txid.trim().is_empty() {
            self.push(field, "Transaction id is required");
        } else if !OutPoint::new(txid, 0).has_valid_txid() {
            self.push(field, "Transaction id must be 64 hex characters");
        }
    }
}

/// Spend selected outputs to one destination, with optional change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedSendForm {
    pub inputs: Vec<OutPoint>,
    pub address: String,
    /// BTC.
    pub amount: f64,
    #[serde(default)]
    pub change_address: Option<String>,
    /// BTC. Absent or zero means no change output.
    #[serde(default)]
    pub change_amount: Option<f64>,
}

impl AdvancedSendForm {
    /// Validate and build the unsigned draft.
    pub fn into_draft(self) -> Result<TransactionDraft, ValidationErrors> {
        let mut errors = Collector::default();

        if self.inputs.is_empty() {
            errors.push("inputs", "Select at least one UTXO");
        }
        let mut seen = BTreeSet::new();
        for input in &self.inputs {
            if !input.has_valid_txid() {
                errors.push("inputs", format!("Invalid outpoint {}", input));
            } else if !seen.insert(input) {
                errors.push("inputs", format!("Duplicate input {}", input));
            }
        }

        errors.require_text("address", &self.address, "Address is required");
        let amount =
            errors.positive_amount("amount", self.amount, "Amount must be greater than zero");

        let mut change = None;
        match self.change_amount {
            Some(btc) if !btc.is_finite() || btc < 0.0 => {
                errors.push("change_amount", "Change must be ≥ 0");
            }
            Some(btc) if btc > 0.0 => {
                let address = self.change_address.as_deref().unwrap_or("").trim();
                if address.is_empty() {
                    errors.push("change_address", "Change address is required");
                } else if address == self.address.trim() {
                    errors.push("change_address", "Change address must differ from destination");
                }
                match Amount::from_btc(btc) {
                    Ok(value) => change = Some((address.to_string(), value)),
                    Err(e) => errors.push("change_amount", format!("Invalid amount: {}", e)),
                }
            }
            _ => {}
        }

        errors.finish(|| {
            let mut outputs = Outputs::new();
            outputs.insert(self.address.trim(), amount);
            if let Some((address, value)) = change {
                outputs.insert(address, value);
            }
            TransactionDraft {
                inputs: self.inputs,
                outputs,
            }
        })
    }
}

/// Apply the configured funds policy to a validated draft.
///
/// `selected_total` is the sum of the draft's inputs as found in the latest
/// `listunspent`.
pub fn check_funds(
    policy: FundsPolicy,
    selected_total: Amount,
    draft: &TransactionDraft,
) -> Result<(), ValidationErrors> {
    let mut errors = Collector::default();
    if policy == FundsPolicy::RequireCoverage {
        match draft.outputs.total() {
            Some(total) if total <= selected_total => {}
            _ => errors.push("inputs", "Selected inputs do not cover the outputs"),
        }
    }
    errors.finish(|| ())
}

/// `selected − outputs`; negative when the outputs exceed the inputs.
pub fn implied_fee(selected_total: Amount, outputs_total: Amount) -> Option<SignedAmount> {
    let diff = i128::from(selected_total.to_sat()) - i128::from(outputs_total.to_sat());
    i64::try_from(diff).ok().map(SignedAmount::from_sat)
}

fn default_true() -> bool {
    true
}

/// Wallet-funded send via `sendtoaddress`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendForm {
    pub address: String,
    /// BTC.
    pub amount: f64,
    /// sat/vB.
    pub fee_rate: f64,
    #[serde(default = "default_true")]
    pub replaceable: bool,
    #[serde(default)]
    pub subtract_fee_from_amount: bool,
}

impl SendForm {
    pub fn into_params(self) -> Result<SendToAddressParams, ValidationErrors> {
        let mut errors = Collector::default();
        errors.require_text("address", &self.address, "Address is required");
        let amount =
            errors.positive_amount("amount", self.amount, "Amount must be greater than zero");
        errors.positive_rate("fee_rate", self.fee_rate);

        errors.finish(|| SendToAddressParams {
            address: self.address.trim().to_string(),
            amount,
            fee_rate: self.fee_rate,
            replaceable: self.replaceable,
            subtractfeefromamount: self.subtract_fee_from_amount,
        })
    }
}

/// Replace an unconfirmed wallet transaction at a higher fee rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BumpFeeForm {
    pub txid: String,
    /// sat/vB.
    pub fee_rate: f64,
}

impl BumpFeeForm {
    pub fn into_params(self) -> Result<BumpFeeParams, ValidationErrors> {
        let mut errors = Collector::default();
        errors.txid("txid", &self.txid);
        errors.positive_rate("fee_rate", self.fee_rate);

        errors.finish(|| BumpFeeParams {
            txid: self.txid.trim().to_string(),
            fee_rate: self.fee_rate,
        })
    }
}

/// Child transaction spending one output of an unconfirmed parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpfpForm {
    pub txid: String,
    pub vout: u32,
    pub address: String,
    /// BTC. The difference to the parent output is the child's fee.
    pub amount: f64,
}

impl CpfpForm {
    /// Single input, single output draft.
    pub fn into_draft(self) -> Result<TransactionDraft, ValidationErrors> {
        let mut errors = Collector::default();
        errors.txid("txid", &self.txid);
        errors.require_text("address", &self.address, "Address is required");
        let amount =
            errors.positive_amount("amount", self.amount, "Amount must be greater than zero");

        errors.finish(|| {
            let mut outputs = Outputs::new();
            outputs.insert(self.address.trim(), amount);
            TransactionDraft {
                inputs: vec![OutPoint::new(self.txid.trim(), self.vout)],
                outputs,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_advanced() -> AdvancedSendForm {
        AdvancedSendForm {
            inputs: vec![OutPoint::new("a".repeat(64), 0)],
            address: "addr1".into(),
            amount: 0.001,
            change_address: None,
            change_amount: None,
        }
    }

    #[test]
    fn test_advanced_minimal_draft() {
        let draft = valid_advanced().into_draft().unwrap();
        assert_eq!(draft.inputs, vec![OutPoint::new("a".repeat(64), 0)]);
        assert_eq!(serde_json::to_value(&draft.outputs).unwrap(), json!({ "addr1": 0.001 }));
    }

    #[test]
    fn test_advanced_with_change() {
        let mut form = valid_advanced();
        form.change_address = Some("change1".into());
        form.change_amount = Some(0.5);
        let draft = form.into_draft().unwrap();
        assert_eq!(draft.outputs.len(), 2);
        assert_eq!(draft.outputs.get("change1"), Some(Amount::from_sat(50_000_000)));
    }

    #[test]
    fn test_advanced_zero_change_is_omitted() {
        let mut form = valid_advanced();
        form.change_address = Some("change1".into());
        form.change_amount = Some(0.0);
        let draft = form.into_draft().unwrap();
        assert_eq!(draft.outputs.len(), 1);
        assert!(draft.outputs.get("change1").is_none());
    }

    #[test]
    fn test_advanced_collects_every_error() {
        let form = AdvancedSendForm {
            inputs: vec![],
            address: "  ".into(),
            amount: 0.0,
            change_address: None,
            change_amount: Some(0.2),
        };
        let errors = form.into_draft().unwrap_err();
        assert_eq!(errors.message_for("inputs"), Some("Select at least one UTXO"));
        assert_eq!(errors.message_for("address"), Some("Address is required"));
        assert_eq!(errors.message_for("amount"), Some("Amount must be greater than zero"));
        assert_eq!(errors.message_for("change_address"), Some("Change address is required"));
        assert_eq!(errors.errors().len(), 4);
    }

    #[test]
    fn test_advanced_rejects_negative_change() {
        let mut form = valid_advanced();
        form.change_amount = Some(-0.1);
        let errors = form.into_draft().unwrap_err();
        assert_eq!(errors.message_for("change_amount"), Some("Change must be ≥ 0"));
    }

    #[test]
    fn test_advanced_rejects_change_to_destination() {
        let mut form = valid_advanced();
        form.change_address = Some("addr1".into());
        form.change_amount = Some(0.1);
        let errors = form.into_draft().unwrap_err();
        assert!(errors.has("change_address"));
    }

    #[test]
    fn test_advanced_rejects_bad_and_duplicate_inputs() {
        let mut form = valid_advanced();
        form.inputs.push(OutPoint::new("a".repeat(64), 0));
        form.inputs.push(OutPoint::new("xyz", 1));
        let errors = form.into_draft().unwrap_err();
        let messages: Vec<&str> = errors.errors().iter().map(|e| e.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.starts_with("Duplicate input")));
        assert!(messages.iter().any(|m| m.starts_with("Invalid outpoint")));
    }

    #[test]
    fn test_advanced_rejects_sub_satoshi_amount() {
        let mut form = valid_advanced();
        form.amount = 0.000000001;
        assert!(form.into_draft().unwrap_err().has("amount"));
    }

    #[test]
    fn test_funds_policy() {
        let draft = valid_advanced().into_draft().unwrap();
        let small = Amount::from_sat(50_000);
        assert!(check_funds(FundsPolicy::Node, small, &draft).is_ok());

        let errors = check_funds(FundsPolicy::RequireCoverage, small, &draft).unwrap_err();
        assert!(errors.has("inputs"));
        assert!(check_funds(FundsPolicy::RequireCoverage, Amount::from_sat(100_000), &draft).is_ok());
    }

    #[test]
    fn test_implied_fee() {
        let fee = implied_fee(Amount::from_sat(100_000), Amount::from_sat(98_500)).unwrap();
        assert_eq!(fee, SignedAmount::from_sat(1_500));
        let negative = implied_fee(Amount::from_sat(1_000), Amount::from_sat(2_000)).unwrap();
        assert!(negative.is_negative());
    }

    #[test]
    fn test_send_form() {
        let form: SendForm = serde_json::from_value(json!({
            "address": "bcrt1qdest", "amount": 0.25, "fee_rate": 3.0
        }))
        .unwrap();
        assert!(form.replaceable);
        assert!(!form.subtract_fee_from_amount);
        let params = form.into_params().unwrap();
        assert_eq!(params.amount, Amount::from_sat(25_000_000));

        let bad = SendForm {
            address: String::new(),
            amount: 1.0,
            fee_rate: 0.0,
            replaceable: true,
            subtract_fee_from_amount: false,
        };
        let errors = bad.into_params().unwrap_err();
        assert_eq!(errors.message_for("fee_rate"), Some("Fee Rate must be greater than zero"));
        assert!(errors.has("address"));
    }

    #[test]
    fn test_bump_fee_form() {
        let ok = BumpFeeForm {
            txid: "f".repeat(64),
            fee_rate: 12.0,
        };
        assert_eq!(ok.into_params().unwrap().fee_rate, 12.0);

        let bad = BumpFeeForm {
            txid: "f00".into(),
            fee_rate: -1.0,
        };
        let errors = bad.into_params().unwrap_err();
        assert!(errors.has("txid"));
        assert!(errors.has("fee_rate"));
    }

    #[test]
    fn test_cpfp_form() {
        let form = CpfpForm {
            txid: "d".repeat(64),
            vout: 1,
            address: "bcrt1qchild".into(),
            amount: 0.0999,
        };
        let draft = form.into_draft().unwrap();
        assert_eq!(draft.inputs, vec![OutPoint::new("d".repeat(64), 1)]);
        assert_eq!(draft.outputs.get("bcrt1qchild"), Some(Amount::from_sat(9_990_000)));
    }

    #[test]
    fn test_errors_display() {
        let errors = CpfpForm {
            txid: String::new(),
            vout: 0,
            address: String::new(),
            amount: 1.0,
        }
        .into_draft()
        .unwrap_err();
        assert_eq!(
            errors.to_string(),
            "txid: Transaction id is required; address: Address is required"
        );
    }
}

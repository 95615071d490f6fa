//! Wallet-side data types: RPC responses and drafts built by the console.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bitcoin::{Amount, SignedAmount};
use serde::{Deserialize, Serialize};

/// `listwalletdir` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletDir {
    pub wallets: Vec<WalletDirEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletDirEntry {
    pub name: String,
}

/// `loadwallet` / `unloadwallet` result. Older nodes report a single
/// `warning` string, newer ones a `warnings` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletLoadResult {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastProcessedBlock {
    pub hash: String,
    pub height: u64,
}

/// `getwalletinfo` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletInfo {
    pub walletname: String,
    pub walletversion: u64,
    pub format: String,
    #[serde(default, with = "bitcoin::amount::serde::as_btc::opt")]
    pub balance: Option<Amount>,
    #[serde(default, with = "bitcoin::amount::serde::as_btc::opt")]
    pub unconfirmed_balance: Option<Amount>,
    #[serde(default, with = "bitcoin::amount::serde::as_btc::opt")]
    pub immature_balance: Option<Amount>,
    pub txcount: u64,
    #[serde(default)]
    pub keypoolsize: u64,
    #[serde(default)]
    pub keypoolsize_hd_internal: Option<u64>,
    #[serde(default)]
    pub paytxfee: f64,
    pub private_keys_enabled: bool,
    pub avoid_reuse: bool,
    /// `false` or `{duration, progress}` while rescanning.
    #[serde(default)]
    pub scanning: serde_json::Value,
    pub descriptors: bool,
    #[serde(default)]
    pub external_signer: bool,
    #[serde(default)]
    pub blank: bool,
    #[serde(default)]
    pub birthtime: Option<u64>,
    #[serde(default)]
    pub lastprocessedblock: Option<LastProcessedBlock>,
}

/// One `listtransactions` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTransaction {
    #[serde(default)]
    pub address: Option<String>,
    /// `send`, `receive`, `generate`, `immature` or `orphan`.
    pub category: String,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub amount: SignedAmount,
    #[serde(default)]
    pub vout: u32,
    #[serde(default, with = "bitcoin::amount::serde::as_btc::opt")]
    pub fee: Option<SignedAmount>,
    pub confirmations: i64,
    #[serde(default)]
    pub blockhash: Option<String>,
    #[serde(default)]
    pub blockheight: Option<u64>,
    #[serde(default)]
    pub blockindex: Option<u64>,
    #[serde(default)]
    pub blocktime: Option<u64>,
    pub txid: String,
    #[serde(default)]
    pub wtxid: Option<String>,
    #[serde(default)]
    pub walletconflicts: Vec<String>,
    #[serde(default)]
    pub mempoolconflicts: Vec<String>,
    pub time: u64,
    pub timereceived: u64,
    #[serde(default, rename = "bip125-replaceable")]
    pub bip125_replaceable: Option<String>,
    #[serde(default)]
    pub abandoned: Option<bool>,
    #[serde(default)]
    pub parent_descs: Vec<String>,
    #[serde(default)]
    pub label: Option<String>,
}

impl WalletTransaction {
    /// Unconfirmed and signalling replaceability, so `bumpfee` applies.
    pub fn is_bumpable(&self) -> bool {
        self.confirmations == 0
            && self.category == "send"
            && self.bip125_replaceable.as_deref() == Some("yes")
    }

    /// Unconfirmed incoming output that a child can spend (CPFP).
    pub fn is_cpfp_candidate(&self) -> bool {
        self.confirmations == 0 && self.category == "receive"
    }
}

/// A history entry with the follow-up actions it allows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub tx: WalletTransaction,
    pub bumpable: bool,
    pub cpfp_candidate: bool,
}

impl From<WalletTransaction> for HistoryEntry {
    fn from(tx: WalletTransaction) -> Self {
        Self {
            bumpable: tx.is_bumpable(),
            cpfp_candidate: tx.is_cpfp_candidate(),
            tx,
        }
    }
}

/// One page of wallet history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionPage {
    pub page: u32,
    pub page_size: u32,
    pub items: Vec<HistoryEntry>,
    /// A full page came back, so a next page may exist.
    pub has_more: bool,
}

/// Reference to a transaction output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: String,
    pub vout: u32,
}

impl OutPoint {
    pub fn new(txid: impl Into<String>, vout: u32) -> Self {
        Self {
            txid: txid.into(),
            vout,
        }
    }

    /// 64 hex characters, as the node expects.
    pub fn has_valid_txid(&self) -> bool {
        self.txid.len() == 64 && self.txid.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

impl FromStr for OutPoint {
    type Err = String;

    /// Parse `txid:vout`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (txid, vout) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("expected txid:vout, got '{}'", s))?;
        let vout = vout
            .parse::<u32>()
            .map_err(|e| format!("invalid vout in '{}': {}", s, e))?;
        Ok(Self::new(txid, vout))
    }
}

/// One `listunspent` entry. Snapshot only; nothing is locked at the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnspentOutput {
    pub txid: String,
    pub vout: u32,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "scriptPubKey")]
    pub script_pub_key: Option<String>,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub amount: Amount,
    pub confirmations: i64,
    pub spendable: bool,
    pub solvable: bool,
    pub safe: bool,
    #[serde(default)]
    pub desc: Option<String>,
}

impl UnspentOutput {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.txid.clone(), self.vout)
    }
}

/// Destination → amount map for `createrawtransaction`, amounts in BTC.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outputs(BTreeMap<String, Amount>);

impl Outputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an output; returns `false` if the address was already present.
    pub fn insert(&mut self, address: impl Into<String>, amount: Amount) -> bool {
        match self.0.entry(address.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(amount);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, address: &str) -> Option<Amount> {
        self.0.get(address).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Amount)> {
        self.0.iter()
    }

    /// Sum of all outputs; `None` on overflow.
    pub fn total(&self) -> Option<Amount> {
        self.0
            .values()
            .try_fold(Amount::ZERO, |acc, amount| acc.checked_add(*amount))
    }
}

impl Serialize for Outputs {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (address, amount) in &self.0 {
            map.serialize_entry(address, &amount.to_btc())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Outputs {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, f64>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(address, btc)| {
                Amount::from_btc(btc)
                    .map(|amount| (address, amount))
                    .map_err(serde::de::Error::custom)
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Outputs)
    }
}

/// Unsigned transaction the console asks the node to build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub inputs: Vec<OutPoint>,
    pub outputs: Outputs,
}

/// Per-input failure reported by `signrawtransactionwithwallet`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigningError {
    pub txid: String,
    pub vout: u32,
    #[serde(default, rename = "scriptSig")]
    pub script_sig: String,
    #[serde(default)]
    pub sequence: u64,
    pub error: String,
}

/// `signrawtransactionwithwallet` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub hex: String,
    pub complete: bool,
    #[serde(default)]
    pub errors: Vec<SigningError>,
}

/// `bumpfee` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BumpFeeResult {
    pub txid: String,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub origfee: Amount,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub fee: Amount,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Address kinds accepted by `getnewaddress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressType {
    Legacy,
    P2shSegwit,
    Bech32,
    Bech32m,
}

impl AddressType {
    pub const ALL: [AddressType; 4] = [
        AddressType::Legacy,
        AddressType::P2shSegwit,
        AddressType::Bech32,
        AddressType::Bech32m,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::P2shSegwit => "p2sh-segwit",
            Self::Bech32 => "bech32",
            Self::Bech32m => "bech32m",
        }
    }

    /// Human label for menus.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Legacy => "Legacy",
            Self::P2shSegwit => "P2SH-SegWit",
            Self::Bech32 => "Bech32 (native SegWit)",
            Self::Bech32m => "Bech32m (Taproot)",
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| "Invalid address type".to_string())
    }
}

/// One `[address, amount, label?]` row of `listaddressgroupings`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressBalance {
    pub address: String,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub amount: Amount,
    pub label: Option<String>,
}

impl<'de> Deserialize<'de> for AddressBalance {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Row {
            Labelled(String, f64, String),
            Plain(String, f64),
        }

        let (address, btc, label) = match Row::deserialize(deserializer)? {
            Row::Labelled(address, btc, label) => (address, btc, Some(label)),
            Row::Plain(address, btc) => (address, btc, None),
        };
        let amount = Amount::from_btc(btc).map_err(serde::de::Error::custom)?;
        Ok(Self {
            address,
            amount,
            label,
        })
    }
}

/// `getaddressinfo` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressInfo {
    pub address: String,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: String,
    pub ismine: bool,
    pub iswatchonly: bool,
    pub solvable: bool,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub parent_desc: Option<String>,
    pub isscript: bool,
    #[serde(default)]
    pub ischange: bool,
    pub iswitness: bool,
    #[serde(default)]
    pub witness_version: Option<u8>,
    #[serde(default)]
    pub witness_program: Option<String>,
    #[serde(default)]
    pub pubkey: Option<String>,
    #[serde(default)]
    pub iscompressed: Option<bool>,
    #[serde(default)]
    pub timestamp: Option<u64>,
    #[serde(default)]
    pub hdkeypath: Option<String>,
    #[serde(default)]
    pub hdseedid: Option<String>,
    #[serde(default)]
    pub hdmasterfingerprint: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// `getdescriptorinfo` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorInfo {
    pub descriptor: String,
    pub checksum: String,
    pub isrange: bool,
    pub issolvable: bool,
    pub hasprivatekeys: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outputs_serialize_as_btc() {
        let mut outputs = Outputs::new();
        assert!(outputs.insert("addr1", Amount::from_sat(100_000)));
        assert!(outputs.insert("addr2", Amount::from_sat(250_000_000)));
        assert!(!outputs.insert("addr1", Amount::from_sat(1)));

        let value = serde_json::to_value(&outputs).unwrap();
        assert_eq!(value, json!({ "addr1": 0.001, "addr2": 2.5 }));
        assert_eq!(outputs.get("addr1"), Some(Amount::from_sat(100_000)));
    }

    #[test]
    fn test_outputs_total() {
        let mut outputs = Outputs::new();
        outputs.insert("a", Amount::from_sat(1_000));
        outputs.insert("b", Amount::from_sat(2_500));
        assert_eq!(outputs.total(), Some(Amount::from_sat(3_500)));
        assert_eq!(Outputs::new().total(), Some(Amount::ZERO));
    }

    #[test]
    fn test_outpoint_parse() {
        let txid = "a".repeat(64);
        let op: OutPoint = format!("{}:3", txid).parse().unwrap();
        assert_eq!(op, OutPoint::new(txid.clone(), 3));
        assert!(op.has_valid_txid());
        assert_eq!(op.to_string(), format!("{}:3", txid));

        assert!("nocolon".parse::<OutPoint>().is_err());
        assert!("abc:x".parse::<OutPoint>().is_err());
        assert!(!OutPoint::new("zz", 0).has_valid_txid());
    }

    #[test]
    fn test_unspent_output_decode() {
        let utxo: UnspentOutput = serde_json::from_value(json!({
            "txid": "b".repeat(64),
            "vout": 1,
            "address": "bcrt1qexample",
            "scriptPubKey": "0014abcd",
            "amount": 0.5,
            "confirmations": 12,
            "spendable": true,
            "solvable": true,
            "safe": true
        }))
        .unwrap();
        assert_eq!(utxo.amount, Amount::from_sat(50_000_000));
        assert_eq!(utxo.outpoint(), OutPoint::new("b".repeat(64), 1));
        assert!(utxo.label.is_none());
    }

    #[test]
    fn test_wallet_transaction_negative_amount() {
        let tx: WalletTransaction = serde_json::from_value(json!({
            "address": "bcrt1qdest",
            "category": "send",
            "amount": -0.1,
            "vout": 0,
            "fee": -0.0000141,
            "confirmations": 0,
            "txid": "c".repeat(64),
            "walletconflicts": [],
            "time": 1700000000,
            "timereceived": 1700000000,
            "bip125-replaceable": "yes",
            "abandoned": false
        }))
        .unwrap();
        assert_eq!(tx.amount, SignedAmount::from_sat(-10_000_000));
        assert_eq!(tx.fee, Some(SignedAmount::from_sat(-1_410)));
        assert!(tx.is_bumpable());
        assert!(!tx.is_cpfp_candidate());
    }

    #[test]
    fn test_address_type_roundtrip_names() {
        for t in AddressType::ALL {
            assert_eq!(t.as_str().parse::<AddressType>().unwrap(), t);
            assert_eq!(serde_json::to_value(t).unwrap(), json!(t.as_str()));
        }
        assert!("invalid-vector".parse::<AddressType>().is_err());
    }

    #[test]
    fn test_address_groupings_rows() {
        let groups: Vec<Vec<AddressBalance>> = serde_json::from_value(json!([
            [["bcrt1qone", 0.25, "savings"], ["bcrt1qtwo", 0.0]]
        ]))
        .unwrap();
        assert_eq!(groups[0][0].label.as_deref(), Some("savings"));
        assert_eq!(groups[0][0].amount, Amount::from_sat(25_000_000));
        assert!(groups[0][1].label.is_none());
    }

    #[test]
    fn test_signed_transaction_errors_default() {
        let signed: SignedTransaction =
            serde_json::from_value(json!({ "hex": "02000000", "complete": true })).unwrap();
        assert!(signed.complete);
        assert!(signed.errors.is_empty());
    }
}

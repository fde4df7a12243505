//! Block templates and their binary serialization
//!
//! A [`BlockTemplate`] is built once per daemon template and never changes
//! afterwards, apart from the set of share fingerprints it has seen.

use crate::config::RewardType;
use crate::core::constants::{
    DIFFICULTY_SIZE, EXTRA_DATA_SIZE, HASH_SIZE, HEADER_SIZE, HEADER_TARGET_SIZE,
    LOGS_BLOOM_SIZE, NONCE_SIZE, NTIME_SIZE, SOLUTION_SIZE, U64_FIELD_SIZE,
};
use crate::core::Target;
use crate::error::{Error, Result};
use crate::utils::{decode_hex_padded, var_int};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// Header field as delivered by the daemon: hex string or plain number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    /// Integer value, encoded big-endian
    Number(u64),
    /// Hex string
    Hex(String),
}

/// Header field set of a daemon block template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderFields {
    pub parent_hash: Option<HeaderValue>,
    #[serde(rename = "coinBase", alias = "coinbase")]
    pub coinbase: Option<HeaderValue>,
    pub state_root: Option<HeaderValue>,
    pub tx_trie_root: Option<HeaderValue>,
    pub receipt_trie_root: Option<HeaderValue>,
    pub logs_bloom: Option<HeaderValue>,
    pub difficulty: Option<HeaderValue>,
    pub timestamp: Option<HeaderValue>,
    pub number: Option<HeaderValue>,
    pub extra_data: Option<HeaderValue>,
    pub energy_consumed: Option<HeaderValue>,
    pub energy_limit: Option<HeaderValue>,
}

/// Candidate transaction carried by a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateTransaction {
    /// Raw transaction bytes, hex encoded
    pub data: String,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub txid: Option<String>,
}

/// Block template record as returned by the daemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTemplate {
    #[serde(rename = "previousblockhash")]
    pub previous_block_hash: String,
    pub height: u64,
    /// Explicit big-endian hex target
    #[serde(default)]
    pub target: Option<String>,
    /// Compact-bits target, used when no explicit target is present
    #[serde(default)]
    pub bits: Option<String>,
    /// Block reward, passed through to share notifications
    #[serde(default)]
    pub reward: Option<Value>,
    /// Daemon-side header hash of the template
    #[serde(default, rename = "headerHash")]
    pub header_hash: Option<String>,
    #[serde(default, rename = "blockHeader")]
    pub block_header: HeaderFields,
    /// Generation transaction containing the extranonce placeholder
    #[serde(default)]
    pub coinbasetxn: Option<String>,
    #[serde(default)]
    pub transactions: Vec<TemplateTransaction>,
    #[serde(default)]
    pub masternode_payments: bool,
    #[serde(default)]
    pub votes: Vec<String>,
}

impl RawTemplate {
    /// Parse a template from daemon JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::from)
    }

    /// Resolve the template target: explicit hex first, compact bits second
    pub fn resolve_target(&self) -> Result<Target> {
        let target = match (&self.target, &self.bits) {
            (Some(target), _) => Target::from_hex(target),
            (None, Some(bits)) => Target::from_compact_hex(bits),
            (None, None) => return Err(Error::template("neither target nor bits is present")),
        }
        .map_err(|e| Error::template(e.to_string()))?;

        if target.is_zero() {
            return Err(Error::template("target is zero"));
        }
        Ok(target)
    }
}

/// Fixed-width header fields, decoded and validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLayout {
    pub parent_hash: [u8; HASH_SIZE],
    pub coinbase: [u8; HASH_SIZE],
    pub state_root: [u8; HASH_SIZE],
    pub tx_trie_root: [u8; HASH_SIZE],
    pub receipt_trie_root: [u8; HASH_SIZE],
    pub logs_bloom: [u8; LOGS_BLOOM_SIZE],
    pub difficulty: [u8; DIFFICULTY_SIZE],
    pub timestamp: [u8; U64_FIELD_SIZE],
    pub number: [u8; U64_FIELD_SIZE],
    pub extra_data: [u8; EXTRA_DATA_SIZE],
    pub energy_consumed: [u8; U64_FIELD_SIZE],
    pub energy_limit: [u8; U64_FIELD_SIZE],
}

impl HeaderLayout {
    /// Decode every required header field, naming the first one that is
    /// missing or malformed
    pub fn from_fields(fields: &HeaderFields) -> Result<Self> {
        Ok(Self {
            parent_hash: exact("parentHash", &fields.parent_hash)?,
            coinbase: exact("coinBase", &fields.coinbase)?,
            state_root: exact("stateRoot", &fields.state_root)?,
            tx_trie_root: exact("txTrieRoot", &fields.tx_trie_root)?,
            receipt_trie_root: exact("receiptTrieRoot", &fields.receipt_trie_root)?,
            logs_bloom: exact("logsBloom", &fields.logs_bloom)?,
            difficulty: numeric("difficulty", &fields.difficulty)?,
            timestamp: numeric("timestamp", &fields.timestamp)?,
            number: numeric("number", &fields.number)?,
            extra_data: left_aligned("extraData", &fields.extra_data)?,
            energy_consumed: numeric("energyConsumed", &fields.energy_consumed)?,
            energy_limit: numeric("energyLimit", &fields.energy_limit)?,
        })
    }

    /// Parent hash through extra data, with `n_time` in the timestamp slot
    fn write_prefix(&self, out: &mut Vec<u8>, n_time: &[u8; NTIME_SIZE]) {
        out.extend_from_slice(&self.parent_hash);
        out.extend_from_slice(&self.coinbase);
        out.extend_from_slice(&self.state_root);
        out.extend_from_slice(&self.tx_trie_root);
        out.extend_from_slice(&self.receipt_trie_root);
        out.extend_from_slice(&self.logs_bloom);
        out.extend_from_slice(&self.difficulty);
        out.extend_from_slice(n_time);
        out.extend_from_slice(&self.number);
        out.extend_from_slice(&self.extra_data);
    }

    /// Hex form of each header field in wire order
    fn hex_fields(&self) -> [String; 12] {
        [
            hex::encode(self.parent_hash),
            hex::encode(self.coinbase),
            hex::encode(self.state_root),
            hex::encode(self.tx_trie_root),
            hex::encode(self.receipt_trie_root),
            hex::encode(self.logs_bloom),
            hex::encode(self.difficulty),
            hex::encode(self.timestamp),
            hex::encode(self.number),
            hex::encode(self.extra_data),
            hex::encode(self.energy_consumed),
            hex::encode(self.energy_limit),
        ]
    }
}

fn require<'a>(field: &str, value: &'a Option<HeaderValue>) -> Result<&'a HeaderValue> {
    value
        .as_ref()
        .ok_or_else(|| Error::template(format!("blockHeader.{} is missing", field)))
}

fn to_array<const N: usize>(field: &str, bytes: Vec<u8>) -> Result<[u8; N]> {
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| Error::template(format!("{} decoded to {} bytes", field, b.len())))
}

/// Hash-like field that must be given as exactly `N` bytes of hex
fn exact<const N: usize>(field: &str, value: &Option<HeaderValue>) -> Result<[u8; N]> {
    match require(field, value)? {
        HeaderValue::Hex(s) => {
            let cleaned = s.strip_prefix("0x").unwrap_or(s);
            let bytes = hex::decode(cleaned)
                .map_err(|e| Error::template(format!("{} is not valid hex: {}", field, e)))?;
            if bytes.len() != N {
                return Err(Error::template(format!(
                    "{} must be {} bytes, got {}",
                    field,
                    N,
                    bytes.len()
                )));
            }
            to_array(field, bytes)
        }
        HeaderValue::Number(_) => Err(Error::template(format!("{} must be a hex string", field))),
    }
}

/// Integer field, big-endian and right-aligned in `N` bytes
fn numeric<const N: usize>(field: &str, value: &Option<HeaderValue>) -> Result<[u8; N]> {
    let bytes = match require(field, value)? {
        HeaderValue::Number(n) => {
            let be = n.to_be_bytes();
            let mut out = vec![0u8; N.saturating_sub(be.len())];
            out.extend_from_slice(&be[be.len().saturating_sub(N)..]);
            if N < be.len() && be[..be.len() - N].iter().any(|&b| b != 0) {
                return Err(Error::template(format!("{} does not fit {} bytes", field, N)));
            }
            out
        }
        HeaderValue::Hex(s) => decode_hex_padded(field, s, N)?,
    };
    to_array(field, bytes)
}

/// Variable-length field, left-aligned and zero-filled to `N` bytes
fn left_aligned<const N: usize>(field: &str, value: &Option<HeaderValue>) -> Result<[u8; N]> {
    match require(field, value)? {
        HeaderValue::Hex(s) => {
            let cleaned = s.strip_prefix("0x").unwrap_or(s);
            let mut bytes = hex::decode(cleaned)
                .map_err(|e| Error::template(format!("{} is not valid hex: {}", field, e)))?;
            if bytes.len() > N {
                return Err(Error::template(format!(
                    "{} is {} bytes, field holds {}",
                    field,
                    bytes.len(),
                    N
                )));
            }
            bytes.resize(N, 0);
            to_array(field, bytes)
        }
        HeaderValue::Number(_) => Err(Error::template(format!("{} must be a hex string", field))),
    }
}

/// Coinbase transaction split around the extranonce placeholder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationTransaction {
    pub prefix: Vec<u8>,
    pub suffix: Vec<u8>,
}

impl GenerationTransaction {
    /// Split `coinbase_hex` at the first occurrence of `placeholder`. A
    /// template without a generation transaction yields empty halves.
    pub fn split(coinbase_hex: Option<&str>, placeholder: &[u8]) -> Result<Self> {
        let Some(coinbase_hex) = coinbase_hex else {
            return Ok(Self::default());
        };
        let tx = hex::decode(coinbase_hex)
            .map_err(|e| Error::template(format!("coinbasetxn is not valid hex: {}", e)))?;

        let position = tx
            .windows(placeholder.len())
            .position(|w| w == placeholder)
            .ok_or_else(|| Error::template("coinbasetxn lacks the extranonce placeholder"))?;

        Ok(Self {
            prefix: tx[..position].to_vec(),
            suffix: tx[position + placeholder.len()..].to_vec(),
        })
    }
}

/// One mining job derived from a daemon block template
pub struct BlockTemplate {
    job_id: String,
    raw: RawTemplate,
    header: HeaderLayout,
    target: Target,
    difficulty: f64,
    reward_type: RewardType,
    generation_transaction: GenerationTransaction,
    transaction_data: Vec<u8>,
    vote_data: Vec<u8>,
    submits: Mutex<HashSet<String>>,
    job_params: OnceCell<Vec<Value>>,
}

impl BlockTemplate {
    /// Validate `raw` and build the job. Fails with [`Error::Template`]
    /// before any state is created when a required field is missing or
    /// malformed.
    pub fn new(
        job_id: String,
        raw: RawTemplate,
        extra_nonce_placeholder: &[u8],
        reward_type: RewardType,
    ) -> Result<Self> {
        let header = HeaderLayout::from_fields(&raw.block_header)?;
        let target = raw.resolve_target()?;
        let difficulty = target.difficulty();

        let generation_transaction =
            GenerationTransaction::split(raw.coinbasetxn.as_deref(), extra_nonce_placeholder)?;

        let mut transaction_data = Vec::new();
        for (i, tx) in raw.transactions.iter().enumerate() {
            let bytes = hex::decode(&tx.data)
                .map_err(|e| Error::template(format!("transaction {} is not valid hex: {}", i, e)))?;
            transaction_data.extend_from_slice(&bytes);
        }

        let vote_data = if raw.masternode_payments {
            let mut data = var_int(raw.votes.len() as u64);
            for (i, vote) in raw.votes.iter().enumerate() {
                let bytes = hex::decode(vote)
                    .map_err(|e| Error::template(format!("vote {} is not valid hex: {}", i, e)))?;
                data.extend_from_slice(&bytes);
            }
            data
        } else {
            Vec::new()
        };

        Ok(Self {
            job_id,
            raw,
            header,
            target,
            difficulty,
            reward_type,
            generation_transaction,
            transaction_data,
            vote_data,
            submits: Mutex::new(HashSet::new()),
            job_params: OnceCell::new(),
        })
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Template as received from the daemon
    pub fn raw(&self) -> &RawTemplate {
        &self.raw
    }

    pub fn height(&self) -> u64 {
        self.raw.height
    }

    pub fn previous_block_hash(&self) -> &str {
        &self.raw.previous_block_hash
    }

    /// Daemon-side header hash, if the template carried one
    pub fn header_hash(&self) -> Option<&str> {
        self.raw.header_hash.as_deref()
    }

    pub fn header(&self) -> &HeaderLayout {
        &self.header
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Network difficulty of the job, rounded to nine decimals
    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    pub fn generation_transaction(&self) -> &GenerationTransaction {
        &self.generation_transaction
    }

    /// Raw transaction bytes in template order
    pub fn transaction_data(&self) -> &[u8] {
        &self.transaction_data
    }

    /// 528-byte header without the proof-of-work solution
    pub fn serialize_header(&self, n_time: &[u8; NTIME_SIZE], nonce: &[u8; NONCE_SIZE]) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE);
        self.header.write_prefix(&mut out, n_time);
        out.extend_from_slice(&self.header.energy_consumed);
        out.extend_from_slice(&self.header.energy_limit);
        out.extend_from_slice(nonce);
        debug_assert_eq!(out.len(), HEADER_SIZE);
        out
    }

    /// 1936-byte header including the solution, hashed for the target check
    pub fn serialize_header_target(
        &self,
        nonce: &[u8; NONCE_SIZE],
        solution: &[u8; SOLUTION_SIZE],
        n_time: &[u8; NTIME_SIZE],
    ) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_TARGET_SIZE);
        self.header.write_prefix(&mut out, n_time);
        out.extend_from_slice(nonce);
        out.extend_from_slice(solution);
        out.extend_from_slice(&self.header.energy_consumed);
        out.extend_from_slice(&self.header.energy_limit);
        debug_assert_eq!(out.len(), HEADER_TARGET_SIZE);
        out
    }

    /// Generation transaction with both extranonces spliced in
    pub fn serialize_coinbase(&self, extra_nonce1: &[u8], extra_nonce2: &[u8]) -> Vec<u8> {
        let gen = &self.generation_transaction;
        let mut out = Vec::with_capacity(
            gen.prefix.len() + extra_nonce1.len() + extra_nonce2.len() + gen.suffix.len(),
        );
        out.extend_from_slice(&gen.prefix);
        out.extend_from_slice(extra_nonce1);
        out.extend_from_slice(extra_nonce2);
        out.extend_from_slice(&gen.suffix);
        out
    }

    /// Full block: header, transaction count, coinbase, transactions, vote
    /// data and, for proof-of-stake coins, a zero byte the daemon replaces
    /// with its signature
    pub fn serialize_block(&self, header: &[u8], coinbase: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            header.len() + 9 + coinbase.len() + self.transaction_data.len() + self.vote_data.len() + 1,
        );
        out.extend_from_slice(header);
        out.extend_from_slice(&var_int(self.raw.transactions.len() as u64 + 1));
        out.extend_from_slice(coinbase);
        out.extend_from_slice(&self.transaction_data);
        out.extend_from_slice(&self.vote_data);
        if self.reward_type == RewardType::Pos {
            out.push(0);
        }
        out
    }

    /// Record a share fingerprint. Returns `false` if it was already seen.
    pub fn register_submit(
        &self,
        extra_nonce1: &str,
        extra_nonce2: &str,
        n_time: &str,
        nonce: &str,
    ) -> bool {
        let submission = format!("{}{}{}{}", extra_nonce1, extra_nonce2, n_time, nonce);
        self.submits.lock().insert(submission)
    }

    /// Number of distinct fingerprints registered on this job
    pub fn submit_count(&self) -> usize {
        self.submits.lock().len()
    }

    /// Job parameters broadcast to miners: job id, the twelve header
    /// fields, the clean-job flag and the target
    pub fn job_params(&self) -> &[Value] {
        self.job_params.get_or_init(|| {
            let mut params = Vec::with_capacity(15);
            params.push(Value::String(self.job_id.clone()));
            params.extend(self.header.hex_fields().into_iter().map(Value::String));
            params.push(Value::Bool(true));
            params.push(Value::String(
                self.raw
                    .target
                    .clone()
                    .unwrap_or_else(|| self.target.to_hex()),
            ));
            params
        })
    }
}

impl fmt::Debug for BlockTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockTemplate")
            .field("job_id", &self.job_id)
            .field("height", &self.raw.height)
            .field("previous_block_hash", &self.raw.previous_block_hash)
            .field("target", &self.target.to_hex())
            .field("difficulty", &self.difficulty)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::constants::HEADER_PREFIX_SIZE;
    use crate::utils::read_var_int;
    use serde_json::json;

    pub(crate) const PLACEHOLDER: [u8; 8] = [0xf0, 0x00, 0x00, 0x0f, 0xf1, 0x11, 0x11, 0x1f];

    pub(crate) fn template_json() -> Value {
        json!({
            "previousblockhash": "aa".repeat(32),
            "height": 100,
            "target": format!("0007{}", "ff".repeat(30)),
            "reward": 4_500_000_000u64,
            "headerHash": "cd".repeat(32),
            "blockHeader": {
                "parentHash": "01".repeat(32),
                "coinBase": "02".repeat(32),
                "stateRoot": "03".repeat(32),
                "txTrieRoot": "04".repeat(32),
                "receiptTrieRoot": "05".repeat(32),
                "logsBloom": "06".repeat(256),
                "difficulty": "0a0b",
                "timestamp": 1_540_000_000u64,
                "number": 100,
                "extraData": "6a6f6221",
                "energyConsumed": 21000,
                "energyLimit": "0xe4e1c0"
            },
            "coinbasetxn": format!("0102{}0304", hex::encode(PLACEHOLDER)),
            "transactions": [
                {"data": "deadbeef", "hash": "11".repeat(32)},
                {"data": "cafe", "txid": "22".repeat(32)}
            ]
        })
    }

    pub(crate) fn raw_template() -> RawTemplate {
        serde_json::from_value(template_json()).unwrap()
    }

    fn template(reward: RewardType) -> BlockTemplate {
        BlockTemplate::new("1".to_string(), raw_template(), &PLACEHOLDER, reward).unwrap()
    }

    #[test]
    fn test_target_and_difficulty() {
        let job = template(RewardType::Pow);
        assert_eq!(job.target().to_hex(), format!("0007{}", "ff".repeat(30)));
        // diff1 / 0x0007ff.. is a tiny difficulty
        assert!(job.difficulty() < 0.001);
        assert_eq!(job.difficulty(), crate::core::round_to(job.difficulty(), 9));
    }

    #[test]
    fn test_target_from_bits() {
        let mut value = template_json();
        value.as_object_mut().unwrap().remove("target");
        value["bits"] = json!("1d00ffff");
        let raw: RawTemplate = serde_json::from_value(value).unwrap();
        let job = BlockTemplate::new("2".into(), raw, &PLACEHOLDER, RewardType::Pow).unwrap();
        assert_eq!(job.difficulty(), 1.0);
        assert_eq!(
            job.job_params()[14],
            json!("00000000ffff0000000000000000000000000000000000000000000000000000")
        );
    }

    #[test]
    fn test_missing_header_field_rejected() {
        let mut value = template_json();
        value["blockHeader"]
            .as_object_mut()
            .unwrap()
            .remove("stateRoot");
        let raw: RawTemplate = serde_json::from_value(value).unwrap();
        let err = BlockTemplate::new("1".into(), raw, &PLACEHOLDER, RewardType::Pow).unwrap_err();
        assert!(err.to_string().contains("stateRoot"));
        assert_eq!(err.category(), "template");
    }

    #[test]
    fn test_malformed_fields_rejected() {
        let mut value = template_json();
        value["blockHeader"]["parentHash"] = json!("0102");
        let raw: RawTemplate = serde_json::from_value(value).unwrap();
        assert!(BlockTemplate::new("1".into(), raw, &PLACEHOLDER, RewardType::Pow).is_err());

        let mut value = template_json();
        value.as_object_mut().unwrap().remove("target");
        let raw: RawTemplate = serde_json::from_value(value).unwrap();
        assert!(BlockTemplate::new("1".into(), raw, &PLACEHOLDER, RewardType::Pow).is_err());

        let mut value = template_json();
        value["coinbasetxn"] = json!("01020304");
        let raw: RawTemplate = serde_json::from_value(value).unwrap();
        assert!(BlockTemplate::new("1".into(), raw, &PLACEHOLDER, RewardType::Pow).is_err());

        let mut value = template_json();
        value["target"] = json!("00");
        let raw: RawTemplate = serde_json::from_value(value).unwrap();
        assert!(BlockTemplate::new("1".into(), raw, &PLACEHOLDER, RewardType::Pow).is_err());
    }

    #[test]
    fn test_serialize_header_layout() {
        let job = template(RewardType::Pow);
        let n_time = [0x11u8; 8];
        let nonce = [0x22u8; 32];
        let header = job.serialize_header(&n_time, &nonce);

        assert_eq!(header.len(), HEADER_SIZE);
        assert_eq!(&header[0..32], &[0x01; 32]);
        assert_eq!(&header[32..64], &[0x02; 32]);
        assert_eq!(&header[128..160], &[0x05; 32]);
        assert_eq!(&header[160..416], &[0x06; 256]);
        // difficulty, right aligned
        assert_eq!(&header[416..432], &{
            let mut d = [0u8; 16];
            d[14] = 0x0a;
            d[15] = 0x0b;
            d
        });
        // nTime replaces the template timestamp
        assert_eq!(&header[432..440], &n_time);
        assert_eq!(&header[440..448], &100u64.to_be_bytes());
        assert_eq!(&header[448..452], b"job!");
        assert_eq!(&header[452..480], &[0u8; 28]);
        assert_eq!(&header[480..488], &21000u64.to_be_bytes());
        assert_eq!(&header[488..496], &0xe4e1c0u64.to_be_bytes());
        assert_eq!(&header[496..528], &nonce);
    }

    #[test]
    fn test_serialize_header_target_layout() {
        let job = template(RewardType::Pow);
        let n_time = [0x11u8; 8];
        let nonce = [0x22u8; 32];
        let solution = [0x33u8; SOLUTION_SIZE];
        let header = job.serialize_header_target(&nonce, &solution, &n_time);
        let plain = job.serialize_header(&n_time, &nonce);

        assert_eq!(header.len(), HEADER_TARGET_SIZE);
        assert_eq!(&header[..HEADER_PREFIX_SIZE], &plain[..HEADER_PREFIX_SIZE]);
        assert_eq!(&header[480..512], &nonce);
        assert_eq!(&header[512..1920], &solution[..]);
        assert_eq!(&header[1920..1928], &21000u64.to_be_bytes());
        assert_eq!(&header[1928..1936], &0xe4e1c0u64.to_be_bytes());
    }

    #[test]
    fn test_serialize_coinbase() {
        let job = template(RewardType::Pow);
        let coinbase = job.serialize_coinbase(&[0xaa; 4], &[0xbb; 4]);
        assert_eq!(
            hex::encode(coinbase),
            "0102aaaaaaaabbbbbbbb0304"
        );
    }

    #[test]
    fn test_serialize_block() {
        let job = template(RewardType::Pow);
        let header = vec![0x44u8; 10];
        let coinbase = job.serialize_coinbase(&[0xaa; 4], &[0xbb; 4]);
        let block = job.serialize_block(&header, &coinbase);

        assert_eq!(&block[..10], &header[..]);
        assert_eq!(read_var_int(&block[10..]), Some((3, 1)));
        assert_eq!(&block[11..11 + coinbase.len()], &coinbase[..]);
        assert_eq!(hex::encode(&block[11 + coinbase.len()..]), "deadbeefcafe");
    }

    #[test]
    fn test_serialize_block_pos_and_votes() {
        let mut value = template_json();
        value["masternode_payments"] = json!(true);
        value["votes"] = json!(["0101", "0202"]);
        let raw: RawTemplate = serde_json::from_value(value).unwrap();
        let job = BlockTemplate::new("1".into(), raw, &PLACEHOLDER, RewardType::Pos).unwrap();

        let block = job.serialize_block(&[], &[]);
        assert_eq!(hex::encode(block), "03deadbeefcafe020101020200");
    }

    #[test]
    fn test_register_submit() {
        let job = template(RewardType::Pow);
        assert!(job.register_submit("e1", "e2", "t", "n"));
        assert!(!job.register_submit("e1", "e2", "t", "n"));
        assert!(job.register_submit("e1", "e3", "t", "n"));
        assert_eq!(job.submit_count(), 2);
    }

    #[test]
    fn test_job_params() {
        let job = template(RewardType::Pow);
        let params = job.job_params();

        assert_eq!(params.len(), 15);
        assert_eq!(params[0], json!("1"));
        assert_eq!(params[1], json!("01".repeat(32)));
        assert_eq!(params[8], json!(hex::encode(1_540_000_000u64.to_be_bytes())));
        assert_eq!(params[13], json!(true));
        assert_eq!(params[14], json!(format!("0007{}", "ff".repeat(30))));

        // memoized
        assert!(std::ptr::eq(params, job.job_params()));
    }
}

//! Block-explorer client for the Etherscan API
//!
//! Requires an API key in the `ETHERSCAN_API_KEY` environment variable.
//! Responses are never cached: explorer queries are about recent activity,
//! so every invocation reflects the current chain state.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;
use crate::http::{HttpClient, HttpError};

/// Errors from the block-explorer client
#[derive(Debug, Error)]
pub enum EtherscanError {
    /// The API key environment variable is missing or empty
    #[error("ETHERSCAN_API_KEY environment variable not set")]
    MissingApiKey,

    /// The API answered with an error status in its envelope
    #[error("Etherscan API error: {0}")]
    Api(String),

    /// The envelope decoded but its result had an unexpected shape
    #[error("unexpected Etherscan payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Transport or HTTP-level failure
    #[error(transparent)]
    Http(#[from] HttpError),
}

/// An account transaction as reported by the explorer
///
/// The API serializes every numeric field as a string; they stay strings
/// here and are parsed only where the formatter needs numbers. Fields not
/// rendered anywhere ride along in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    #[serde(rename = "blockNumber", default)]
    pub block_number: String,
    #[serde(rename = "timeStamp", default)]
    pub time_stamp: String,
    #[serde(rename = "from")]
    pub from_address: String,
    #[serde(rename = "to")]
    pub to_address: String,
    /// Value transferred, in wei
    #[serde(default)]
    pub value: String,
    #[serde(rename = "gasUsed", default)]
    pub gas_used: String,
    #[serde(rename = "isError", default)]
    pub is_error: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// An ERC-20 transfer as reported by the explorer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenTransfer {
    pub hash: String,
    #[serde(rename = "timeStamp", default)]
    pub time_stamp: String,
    #[serde(rename = "from")]
    pub from_address: String,
    #[serde(rename = "to")]
    pub to_address: String,
    /// Raw token amount, scaled by `token_decimal`
    #[serde(default)]
    pub value: String,
    #[serde(rename = "tokenName", default)]
    pub token_name: String,
    #[serde(rename = "tokenSymbol", default)]
    pub token_symbol: String,
    #[serde(rename = "tokenDecimal", default)]
    pub token_decimal: String,
    #[serde(rename = "contractAddress", default)]
    pub contract_address: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Verified contract source metadata
///
/// An unverified contract comes back with every field empty rather than as
/// an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractSource {
    #[serde(rename = "ContractName", default)]
    pub contract_name: String,
    #[serde(rename = "CompilerVersion", default)]
    pub compiler_version: String,
    #[serde(rename = "OptimizationUsed", default)]
    pub optimization_used: String,
    #[serde(rename = "LicenseType", default)]
    pub license_type: String,
    #[serde(rename = "Proxy", default)]
    pub proxy: String,
    #[serde(rename = "SourceCode", default)]
    pub source_code: String,
    #[serde(rename = "ABI", default)]
    pub abi: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ContractSource {
    /// Whether the explorer actually holds verified source for the address
    pub fn is_verified(&self) -> bool {
        !self.source_code.is_empty()
    }
}

/// Every explorer response wraps its result in this envelope
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Value,
}

/// Client for the Etherscan API
#[derive(Debug, Clone)]
pub struct EtherscanClient {
    http: HttpClient,
    url: String,
    api_key: String,
}

impl EtherscanClient {
    /// Creates a client, reading the API key from the environment
    pub fn from_env(config: &Config) -> Result<Self, EtherscanError> {
        let api_key = std::env::var("ETHERSCAN_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or(EtherscanError::MissingApiKey)?;
        Ok(Self {
            http: HttpClient::new(&config.http),
            url: config.services.etherscan_url.clone(),
            api_key,
        })
    }

    /// One envelope-unwrapping request with the API key appended
    ///
    /// A `status` other than `"1"` is an API-level error, except for the
    /// explorer's way of saying an account simply has no matching records.
    async fn request(&self, mut params: Vec<(&str, String)>) -> Result<Value, EtherscanError> {
        params.push(("apikey", self.api_key.clone()));
        let envelope: Envelope = self.http.get_json(&self.url, &params).await?;
        if envelope.status != "1" {
            if envelope.message == "No transactions found" {
                return Ok(Value::Array(Vec::new()));
            }
            return Err(EtherscanError::Api(envelope.message));
        }
        Ok(envelope.result)
    }

    /// Transactions for an address, newest first
    pub async fn transactions(
        &self,
        address: &str,
        start_block: Option<u64>,
        end_block: Option<u64>,
        page: u32,
        offset: u32,
    ) -> Result<Vec<Transaction>, EtherscanError> {
        let mut params = vec![
            ("module", "account".to_string()),
            ("action", "txlist".to_string()),
            ("address", address.to_string()),
            ("page", page.to_string()),
            ("offset", offset.to_string()),
            ("sort", "desc".to_string()),
        ];
        if let Some(block) = start_block {
            params.push(("startblock", block.to_string()));
        }
        if let Some(block) = end_block {
            params.push(("endblock", block.to_string()));
        }

        let result = self.request(params).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// ERC-20 transfers for an address, newest first
    pub async fn token_transfers(
        &self,
        address: &str,
        contract_address: Option<&str>,
        page: u32,
        offset: u32,
    ) -> Result<Vec<TokenTransfer>, EtherscanError> {
        let mut params = vec![
            ("module", "account".to_string()),
            ("action", "tokentx".to_string()),
            ("address", address.to_string()),
            ("page", page.to_string()),
            ("offset", offset.to_string()),
            ("sort", "desc".to_string()),
        ];
        if let Some(contract) = contract_address {
            params.push(("contractaddress", contract.to_string()));
        }

        let result = self.request(params).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Verified source metadata for a contract address
    pub async fn contract_source(
        &self,
        address: &str,
    ) -> Result<Option<ContractSource>, EtherscanError> {
        let params = vec![
            ("module", "contract".to_string()),
            ("action", "getsourcecode".to_string()),
            ("address", address.to_string()),
        ];

        let result = self.request(params).await?;
        let mut sources: Vec<ContractSource> = serde_json::from_value(result)?;
        if sources.is_empty() {
            return Ok(None);
        }
        Ok(Some(sources.remove(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transaction_decodes_from_and_to_keywords() {
        let tx: Transaction = serde_json::from_value(json!({
            "hash": "0xaaa",
            "blockNumber": "19000000",
            "timeStamp": "1700000000",
            "from": "0x111",
            "to": "0x222",
            "value": "1500000000000000000",
            "gasUsed": "21000",
            "isError": "0",
            "nonce": "7",
            "input": "0x"
        }))
        .expect("Transaction should deserialize");

        assert_eq!(tx.from_address, "0x111");
        assert_eq!(tx.to_address, "0x222");
        assert_eq!(tx.value, "1500000000000000000");
        // Untyped fields survive in extra
        assert_eq!(tx.extra.get("nonce"), Some(&json!("7")));
    }

    #[test]
    fn test_token_transfer_keeps_decimal_as_string() {
        let transfer: TokenTransfer = serde_json::from_value(json!({
            "hash": "0xbbb",
            "timeStamp": "1700000000",
            "from": "0x111",
            "to": "0x222",
            "value": "2500000",
            "tokenName": "USD Coin",
            "tokenSymbol": "USDC",
            "tokenDecimal": "6",
            "contractAddress": "0xa0b8"
        }))
        .expect("TokenTransfer should deserialize");

        assert_eq!(transfer.token_symbol, "USDC");
        assert_eq!(transfer.token_decimal, "6");
    }

    #[test]
    fn test_contract_source_verification_flag() {
        let verified: ContractSource = serde_json::from_value(json!({
            "ContractName": "WETH9",
            "CompilerVersion": "v0.4.19",
            "OptimizationUsed": "0",
            "LicenseType": "GPL-3.0",
            "Proxy": "0",
            "SourceCode": "contract WETH9 { }",
            "ABI": "[]"
        }))
        .expect("ContractSource should deserialize");
        assert!(verified.is_verified());

        let unverified: ContractSource = serde_json::from_value(json!({
            "ContractName": "",
            "SourceCode": "",
            "ABI": "Contract source code not verified"
        }))
        .expect("ContractSource should deserialize");
        assert!(!unverified.is_verified());
    }

    #[test]
    fn test_envelope_error_statuses() {
        let envelope: Envelope = serde_json::from_value(json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Max rate limit reached"
        }))
        .expect("Envelope should deserialize");
        assert_eq!(envelope.status, "0");
        assert_eq!(envelope.message, "NOTOK");

        let empty: Envelope = serde_json::from_value(json!({
            "status": "0",
            "message": "No transactions found",
            "result": []
        }))
        .expect("Envelope should deserialize");
        assert_eq!(empty.message, "No transactions found");
    }

    #[test]
    fn test_from_env_requires_api_key() {
        // Temporarily clear the variable for this check
        let saved = std::env::var("ETHERSCAN_API_KEY").ok();
        std::env::remove_var("ETHERSCAN_API_KEY");

        let result = EtherscanClient::from_env(&Config::default());
        assert!(matches!(result, Err(EtherscanError::MissingApiKey)));

        if let Some(value) = saved {
            std::env::set_var("ETHERSCAN_API_KEY", value);
        }
    }
}

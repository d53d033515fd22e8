use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use cosmwasm_std::{Addr, Timestamp};

use crate::state::{DepositEntry, Phase};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct InstantiateMsg {
    /// Code id of the cw721 contract to instantiate for claim tokens
    pub claim_code_id: u64,
    /// Name of the claim token collection
    pub claim_name: String,
    /// Symbol of the claim token collection
    pub claim_symbol: String,
    /// End of the donation window
    pub minting_deadline: Timestamp,
    /// End of the redemption window
    pub exchange_deadline: Timestamp,
    /// Maximum number of outstanding claims
    pub supply_cap: u64,
    /// Prefix prepended to claim ids to build claim token URIs
    pub token_uri_prefix: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    /// Donate the NFT `token_id` of `asset_contract` and receive a freshly
    /// minted claim token in exchange. The exchange contract must have been
    /// approved to transfer the NFT beforehand. Only during the Minting phase.
    Donate {
        asset_contract: String,
        token_id: String,
    },
    /// Burn the claim token and receive the donation of the next ledger
    /// entry (cyclic, so the last entry pairs with the first). The exchange
    /// contract must have been approved to burn the claim token beforehand.
    /// Only during the Exchange phase.
    Redeem { claim_id: u64 },
    /// Admin: move the end of the donation window
    SetMintingDeadline { deadline: Timestamp },
    /// Admin: move the end of the redemption window
    SetExchangeDeadline { deadline: Timestamp },
    /// Admin: set the maximum number of outstanding claims
    SetSupplyCap { cap: u64 },
    /// Admin: set the URI prefix applied to newly minted claim tokens
    SetTokenUriPrefix { prefix: String },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    /// Current phase derived from the block time. Returns `PhaseResponse`
    Phase {},
    /// Number of unredeemed claims. Returns `OutstandingCountResponse`
    OutstandingCount {},
    /// Number of deposits ever accepted. Returns `LedgerLengthResponse`
    LedgerLength {},
    /// Contract configuration. Returns `ConfigResponse`
    Config {},
    /// Single deposit entry by claim id. Returns `DepositEntry`
    Deposit { claim_id: u64 },
    /// Deposit entries in donation order. Returns `DepositsResponse`
    Deposits {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct PhaseResponse {
    pub phase: Phase,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct OutstandingCountResponse {
    pub count: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct LedgerLengthResponse {
    pub length: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct ConfigResponse {
    pub admin: Addr,
    /// cw721 collection the exchange mints claims on
    pub claim_token: Addr,
    pub minting_deadline: Timestamp,
    pub exchange_deadline: Timestamp,
    pub supply_cap: u64,
    pub token_uri_prefix: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct DepositsResponse {
    pub deposits: Vec<DepositEntry>,
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use cosmwasm_std::{Addr, BlockInfo, Order, StdResult, Storage, Timestamp};
use cw_storage_plus::{Bound, Item, Map};

/// Lifecycle stage of the exchange, derived from block time on every call.
/// Never stored - the admin may move deadlines at any time (even backwards),
/// so a cached phase would go stale.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Donations are accepted, redemptions are not
    Minting,
    /// Redemptions are accepted, donations are not
    Exchange,
    /// Neither is accepted
    Closed,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Config {
    /// Address allowed to move deadlines and adjust the supply cap
    pub admin: Addr,
    /// End of the donation window
    pub minting_deadline: Timestamp,
    /// End of the redemption window. Expected to lie after `minting_deadline`,
    /// but this is not enforced - the admin owns the consequences
    pub exchange_deadline: Timestamp,
    /// Maximum number of outstanding (unredeemed) claims
    pub supply_cap: u64,
    /// Prefix prepended to the claim id to form the claim token URI
    pub token_uri_prefix: Option<String>,
}

impl Config {
    pub fn phase(&self, block: &BlockInfo) -> Phase {
        if block.time < self.minting_deadline {
            Phase::Minting
        } else if block.time < self.exchange_deadline {
            Phase::Exchange
        } else {
            Phase::Closed
        }
    }
}

/// A single accepted donation. Entries are append-only and never reordered,
/// so the claim id doubles as a stable 1-based ledger position.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct DepositEntry {
    /// Who donated the NFT
    pub depositor: Addr,
    /// cw721 contract the donated NFT lives on
    pub asset_contract: Addr,
    /// Token id of the donated NFT on `asset_contract`
    pub asset_token_id: String,
    /// Id of the claim token minted in exchange
    pub claim_id: u64,
    /// Whether the claim was already redeemed. The donated NFT may leave
    /// custody before this flips - the flag tracks the claim, not the asset
    pub redeemed: bool,
}

pub const CONFIG: Item<Config> = Item::new("config");

/// cw721 contract this exchange mints claims on. Written once by the
/// instantiation reply, never changed afterwards.
pub const CLAIM_TOKEN: Item<Addr> = Item::new("claim_token");

/// Deposit ledger, keyed by claim id
pub const DEPOSITS: Map<u64, DepositEntry> = Map::new("deposits");

/// Number of entries ever appended, which is also the last claim id issued
pub const LEDGER_LEN: Item<u64> = Item::new("ledger_len");

/// Number of unredeemed entries, which is also the live claim token supply
pub const OUTSTANDING: Item<u64> = Item::new("outstanding");

pub fn next_claim_id(storage: &mut dyn Storage) -> StdResult<u64> {
    let id = LEDGER_LEN.load(storage)? + 1;
    LEDGER_LEN.save(storage, &id)?;
    Ok(id)
}

// settings for pagination
const MAX_LIMIT: u32 = 30;
const DEFAULT_LIMIT: u32 = 10;

pub fn read_deposits(
    storage: &dyn Storage,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Vec<DepositEntry>> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    DEPOSITS
        .range(storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| Ok(item?.1))
        .collect()
}

#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    to_binary, Addr, Binary, Deps, DepsMut, Env, MessageInfo, QuerierWrapper, Reply, Response,
    StdError, StdResult, SubMsg, Timestamp, WasmMsg,
};
use cw2::set_contract_version;
use cw721::{Cw721ExecuteMsg, Cw721QueryMsg, OperatorsResponse, OwnerOfResponse};
use cw721_base::{
    ExecuteMsg as ClaimExecuteMsg, Extension, InstantiateMsg as ClaimInstantiateMsg, MintMsg,
};
use cw_utils::parse_reply_instantiate_data;

use crate::error::ContractError;
use crate::msg::{
    ConfigResponse, DepositsResponse, ExecuteMsg, InstantiateMsg, LedgerLengthResponse,
    OutstandingCountResponse, PhaseResponse, QueryMsg,
};
use crate::state::{
    next_claim_id, read_deposits, Config, DepositEntry, Phase, CLAIM_TOKEN, CONFIG, DEPOSITS,
    LEDGER_LEN, OUTSTANDING,
};

// version info for migration info
const CONTRACT_NAME: &str = "crates.io:gift-exchange";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reply id of the claim token instantiation submessage
const INSTANTIATE_CLAIM_TOKEN_ID: u64 = 1;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let config = Config {
        admin: info.sender,
        minting_deadline: msg.minting_deadline,
        exchange_deadline: msg.exchange_deadline,
        supply_cap: msg.supply_cap,
        token_uri_prefix: msg.token_uri_prefix,
    };
    CONFIG.save(deps.storage, &config)?;
    LEDGER_LEN.save(deps.storage, &0)?;
    OUTSTANDING.save(deps.storage, &0)?;

    // Spawn the claim token collection with ourselves as minter; the address
    // comes back in the reply
    let claim_init = ClaimInstantiateMsg {
        name: msg.claim_name,
        symbol: msg.claim_symbol,
        minter: env.contract.address.to_string(),
    };
    let init_msg = WasmMsg::Instantiate {
        admin: None,
        code_id: msg.claim_code_id,
        msg: to_binary(&claim_init)?,
        funds: vec![],
        label: "Gift exchange claim token".to_string(),
    };

    Ok(Response::new()
        .add_submessage(SubMsg::reply_on_success(init_msg, INSTANTIATE_CLAIM_TOKEN_ID)))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(deps: DepsMut, _env: Env, msg: Reply) -> Result<Response, ContractError> {
    // this is the only expected one from init
    if msg.id != INSTANTIATE_CLAIM_TOKEN_ID {
        return Err(StdError::generic_err("Unsupported reply id").into());
    }

    let res = parse_reply_instantiate_data(msg)
        .map_err(|err| ContractError::ClaimTokenInstantiation(err.to_string()))?;
    let claim_token = deps.api.addr_validate(&res.contract_address)?;
    CLAIM_TOKEN.save(deps.storage, &claim_token)?;

    Ok(Response::new().add_attribute("claim_token_addr", claim_token))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Donate {
            asset_contract,
            token_id,
        } => execute_donate(deps, env, info, asset_contract, token_id),
        ExecuteMsg::Redeem { claim_id } => execute_redeem(deps, env, info, claim_id),
        ExecuteMsg::SetMintingDeadline { deadline } => {
            execute_set_minting_deadline(deps, info, deadline)
        }
        ExecuteMsg::SetExchangeDeadline { deadline } => {
            execute_set_exchange_deadline(deps, info, deadline)
        }
        ExecuteMsg::SetSupplyCap { cap } => execute_set_supply_cap(deps, info, cap),
        ExecuteMsg::SetTokenUriPrefix { prefix } => {
            execute_set_token_uri_prefix(deps, info, prefix)
        }
    }
}

/// Checks that `sender` may move `token_id` on the cw721 `contract`: as its
/// owner, an unexpired per-token approvee, or an unexpired operator. The
/// registry re-checks authorization when the transfer actually executes; this
/// check only exists to give the caller a meaningful error upfront.
fn ensure_authorized(
    querier: &QuerierWrapper,
    env: &Env,
    owner: &OwnerOfResponse,
    sender: &Addr,
    contract: &Addr,
) -> Result<(), ContractError> {
    if owner.owner == sender.as_str() {
        return Ok(());
    }

    if owner
        .approvals
        .iter()
        .any(|approval| approval.spender == sender.as_str() && !approval.expires.is_expired(&env.block))
    {
        return Ok(());
    }

    let operators: OperatorsResponse = querier.query_wasm_smart(
        contract.to_string(),
        &Cw721QueryMsg::AllOperators {
            owner: owner.owner.clone(),
            include_expired: None,
            start_after: None,
            limit: None,
        },
    )?;
    if operators
        .operators
        .iter()
        .any(|approval| approval.spender == sender.as_str() && !approval.expires.is_expired(&env.block))
    {
        return Ok(());
    }

    Err(ContractError::Unauthorized {})
}

pub fn execute_donate(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    asset_contract: String,
    token_id: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if config.phase(&env.block) != Phase::Minting {
        return Err(ContractError::PhaseClosed {});
    }

    let asset_contract = deps.api.addr_validate(&asset_contract)?;
    let claim_token = CLAIM_TOKEN.load(deps.storage)?;
    if asset_contract == claim_token || asset_contract == env.contract.address {
        return Err(ContractError::SelfDonation {});
    }

    // also proves the address talks cw721 and the token exists
    let owner: OwnerOfResponse = deps
        .querier
        .query_wasm_smart(
            asset_contract.to_string(),
            &Cw721QueryMsg::OwnerOf {
                token_id: token_id.clone(),
                include_expired: None,
            },
        )
        .map_err(|_| ContractError::InvalidAsset {
            address: asset_contract.to_string(),
        })?;

    ensure_authorized(&deps.querier, &env, &owner, &info.sender, &asset_contract)?;

    let outstanding = OUTSTANDING.load(deps.storage)?;
    if outstanding >= config.supply_cap {
        return Err(ContractError::SupplyCapReached {});
    }

    // Ledger first, outbound transfers second, so a reentrant call can never
    // observe a claim without its deposit entry
    let claim_id = next_claim_id(deps.storage)?;
    let entry = DepositEntry {
        depositor: info.sender.clone(),
        asset_contract: asset_contract.clone(),
        asset_token_id: token_id.clone(),
        claim_id,
        redeemed: false,
    };
    DEPOSITS.save(deps.storage, claim_id, &entry)?;
    OUTSTANDING.save(deps.storage, &(outstanding + 1))?;

    // Pull the donation into custody. Fails (and reverts the whole call) if
    // the exchange was not approved on the donated collection
    let custody_msg = WasmMsg::Execute {
        contract_addr: asset_contract.to_string(),
        msg: to_binary(&Cw721ExecuteMsg::TransferNft {
            recipient: env.contract.address.to_string(),
            token_id: token_id.clone(),
        })?,
        funds: vec![],
    };
    let mint_msg = WasmMsg::Execute {
        contract_addr: claim_token.to_string(),
        msg: to_binary(&ClaimExecuteMsg::Mint(MintMsg::<Extension> {
            token_id: claim_id.to_string(),
            owner: info.sender.to_string(),
            token_uri: config
                .token_uri_prefix
                .as_ref()
                .map(|prefix| format!("{}{}", prefix, claim_id)),
            extension: None,
        }))?,
        funds: vec![],
    };

    Ok(Response::new()
        .add_message(custody_msg)
        .add_message(mint_msg)
        .add_attribute("action", "donate")
        .add_attribute("depositor", info.sender)
        .add_attribute("asset_contract", asset_contract)
        .add_attribute("asset_token_id", token_id)
        .add_attribute("claim_id", claim_id.to_string()))
}

pub fn execute_redeem(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    claim_id: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if config.phase(&env.block) != Phase::Exchange {
        return Err(ContractError::PhaseClosed {});
    }

    let mut entry = DEPOSITS
        .may_load(deps.storage, claim_id)?
        .filter(|entry| !entry.redeemed)
        .ok_or(ContractError::UnknownOrRedeemed { claim_id })?;

    let claim_token = CLAIM_TOKEN.load(deps.storage)?;
    // a claim burned directly on the cw721 also counts as gone
    let owner: OwnerOfResponse = deps
        .querier
        .query_wasm_smart(
            claim_token.to_string(),
            &Cw721QueryMsg::OwnerOf {
                token_id: claim_id.to_string(),
                include_expired: None,
            },
        )
        .map_err(|_| ContractError::UnknownOrRedeemed { claim_id })?;

    ensure_authorized(&deps.querier, &env, &owner, &info.sender, &claim_token)?;

    // Cyclic successor pairing: the donation released for ledger position i
    // is the one at position (i + 1) mod N, with N the total number of
    // entries ever appended. Positions never change, so the outcome does not
    // depend on redemption order, and the last entry wraps around to the
    // first. A single-entry ledger pairs the donor with their own donation.
    let ledger_len = LEDGER_LEN.load(deps.storage)?;
    let released_id = claim_id % ledger_len + 1;
    let released = DEPOSITS.load(deps.storage, released_id)?;

    // Flag before dispatching the transfers so a reentrant redeem of the
    // same claim fails the entry lookup
    entry.redeemed = true;
    DEPOSITS.save(deps.storage, claim_id, &entry)?;
    let outstanding = OUTSTANDING.load(deps.storage)?;
    OUTSTANDING.save(deps.storage, &(outstanding - 1))?;

    // Burn the claim. Fails (and reverts the whole call) if the exchange was
    // not approved on the claim collection
    let burn_msg = WasmMsg::Execute {
        contract_addr: claim_token.to_string(),
        msg: to_binary(&ClaimExecuteMsg::<Extension>::Burn {
            token_id: claim_id.to_string(),
        })?,
        funds: vec![],
    };
    let release_msg = WasmMsg::Execute {
        contract_addr: released.asset_contract.to_string(),
        msg: to_binary(&Cw721ExecuteMsg::TransferNft {
            recipient: info.sender.to_string(),
            token_id: released.asset_token_id.clone(),
        })?,
        funds: vec![],
    };

    Ok(Response::new()
        .add_message(burn_msg)
        .add_message(release_msg)
        .add_attribute("action", "redeem")
        .add_attribute("redeemer", info.sender)
        .add_attribute("claim_id", claim_id.to_string())
        .add_attribute("released_contract", released.asset_contract)
        .add_attribute("released_token_id", released.asset_token_id))
}

fn ensure_admin(config: &Config, sender: &Addr) -> Result<(), ContractError> {
    if *sender != config.admin {
        return Err(ContractError::Unauthorized {});
    }
    Ok(())
}

// The setters below deliberately skip cross-validation: the admin may invert
// the windows or shrink the cap below the outstanding count, which is how
// tests travel through phases.

pub fn execute_set_minting_deadline(
    deps: DepsMut,
    info: MessageInfo,
    deadline: Timestamp,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info.sender)?;

    config.minting_deadline = deadline;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "set_minting_deadline")
        .add_attribute("deadline", deadline.nanos().to_string()))
}

pub fn execute_set_exchange_deadline(
    deps: DepsMut,
    info: MessageInfo,
    deadline: Timestamp,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info.sender)?;

    config.exchange_deadline = deadline;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "set_exchange_deadline")
        .add_attribute("deadline", deadline.nanos().to_string()))
}

pub fn execute_set_supply_cap(
    deps: DepsMut,
    info: MessageInfo,
    cap: u64,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info.sender)?;

    config.supply_cap = cap;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "set_supply_cap")
        .add_attribute("cap", cap.to_string()))
}

pub fn execute_set_token_uri_prefix(
    deps: DepsMut,
    info: MessageInfo,
    prefix: String,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    ensure_admin(&config, &info.sender)?;

    config.token_uri_prefix = Some(prefix.clone());
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "set_token_uri_prefix")
        .add_attribute("prefix", prefix))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Phase {} => to_binary(&query_phase(deps, env)?),
        QueryMsg::OutstandingCount {} => to_binary(&query_outstanding_count(deps)?),
        QueryMsg::LedgerLength {} => to_binary(&query_ledger_length(deps)?),
        QueryMsg::Config {} => to_binary(&query_config(deps)?),
        QueryMsg::Deposit { claim_id } => to_binary(&DEPOSITS.load(deps.storage, claim_id)?),
        QueryMsg::Deposits { start_after, limit } => {
            to_binary(&query_deposits(deps, start_after, limit)?)
        }
    }
}

pub fn query_phase(deps: Deps, env: Env) -> StdResult<PhaseResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(PhaseResponse {
        phase: config.phase(&env.block),
    })
}

pub fn query_outstanding_count(deps: Deps) -> StdResult<OutstandingCountResponse> {
    Ok(OutstandingCountResponse {
        count: OUTSTANDING.load(deps.storage)?,
    })
}

pub fn query_ledger_length(deps: Deps) -> StdResult<LedgerLengthResponse> {
    Ok(LedgerLengthResponse {
        length: LEDGER_LEN.load(deps.storage)?,
    })
}

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        admin: config.admin,
        claim_token: CLAIM_TOKEN.load(deps.storage)?,
        minting_deadline: config.minting_deadline,
        exchange_deadline: config.exchange_deadline,
        supply_cap: config.supply_cap,
        token_uri_prefix: config.token_uri_prefix,
    })
}

pub fn query_deposits(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<DepositsResponse> {
    Ok(DepositsResponse {
        deposits: read_deposits(deps.storage, start_after, limit)?,
    })
}

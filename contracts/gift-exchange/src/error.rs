use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Unauthorized")]
    Unauthorized {},

    #[error("Window for this operation is closed")]
    PhaseClosed {},

    #[error("Cannot donate a claim token back into the exchange")]
    SelfDonation {},

    #[error("{address} is not a recognized NFT contract, or the token does not exist")]
    InvalidAsset { address: String },

    #[error("Limit of outstanding claims reached")]
    SupplyCapReached {},

    #[error("Claim {claim_id} is unknown or already redeemed")]
    UnknownOrRedeemed { claim_id: u64 },

    #[error("Instantiating the claim token failed: {0}")]
    ClaimTokenInstantiation(String),
}

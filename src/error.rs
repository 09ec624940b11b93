use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MathError {
    #[error("math error - overflow")]
    Overflow,
    #[error("math error - underflow")]
    Underflow,
    #[error("math error - out of bounds")]
    OutOfBounds,
    #[error("math error - division by zero")]
    DivisionByZero,
    #[error("bit math error - zero input value")]
    ZeroValue,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("state error - sqrt price out of bounds")]
    SqrtPriceOutOfBounds,
    #[error("state error - sqrt price is 0")]
    SqrtPriceIsZero,
    #[error("state error - sqrt ratio is 0")]
    SqrtRatioIsZero,

    #[error("state error - tick out of bounds")]
    TickOutOfBounds,

    #[error("state error - liquidity is 0")]
    LiquidityIsZero,

    #[error("state error - requested amount exceeds pair reserves")]
    InsufficientReserves,
}

/// Failures surfaced by the stateful pair operations. The short codes in the
/// messages are stable identifiers; [`PairError::code`] exposes them for
/// callers that dispatch on the code rather than the variant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PairError {
    #[error("LOK - reentrant call while the pair is locked")]
    Locked,
    #[error("AI - pair already initialized")]
    AlreadyInitialized,
    #[error("MIN - starting sqrt price below the minimum ratio")]
    PriceTooLow,
    #[error("MAX - starting sqrt price at or above the maximum ratio")]
    PriceTooHigh,
    #[error("TLU - tick lower must be below tick upper")]
    TickOrder,
    #[error("TLM - tick lower below the minimum tick")]
    TickLowerBound,
    #[error("TUM - tick upper above the maximum tick")]
    TickUpperBound,
    #[error("LO - gross liquidity at tick exceeds the per-tick maximum")]
    TickLiquidityOverflow,
    #[error("NP - poke of a position holding no liquidity")]
    NoPositionLiquidity,
    #[error("CP - burn amount exceeds position liquidity")]
    BurnExceedsPosition,
    #[error("M0 - mint callback underpaid token0")]
    MintUnderpaid0,
    #[error("M1 - mint callback underpaid token1")]
    MintUnderpaid1,
    #[error("IIA - swap callback underpaid the input token")]
    InputUnderpaid,
    #[error("SPL - sqrt price limit on the wrong side of the current price")]
    PriceLimitOutOfRange,
    #[error("AS - amount specified is zero")]
    AmountSpecifiedZero,
    #[error("OLD - oracle target precedes the oldest observation")]
    StaleOracleTarget,
    #[error("I - oracle is not initialized")]
    OracleUninitialized,
    #[error("TN - swap ran into the tick range boundary")]
    TickRangeBoundary,
    #[error("F0 - flash callback underpaid token0")]
    FlashUnderpaid0,
    #[error("F1 - flash callback underpaid token1")]
    FlashUnderpaid1,
    #[error("caller is not the pair owner")]
    NotOwner,
    #[error("protocol fee fraction out of range")]
    ProtocolFeeOutOfRange,
}

impl PairError {
    /// Stable short code for the failure, where the source protocol defines
    /// one.
    pub fn code(&self) -> Option<&'static str> {
        Some(match self {
            PairError::Locked => "LOK",
            PairError::AlreadyInitialized => "AI",
            PairError::PriceTooLow => "MIN",
            PairError::PriceTooHigh => "MAX",
            PairError::TickOrder => "TLU",
            PairError::TickLowerBound => "TLM",
            PairError::TickUpperBound => "TUM",
            PairError::TickLiquidityOverflow => "LO",
            PairError::NoPositionLiquidity => "NP",
            PairError::BurnExceedsPosition => "CP",
            PairError::MintUnderpaid0 => "M0",
            PairError::MintUnderpaid1 => "M1",
            PairError::InputUnderpaid => "IIA",
            PairError::PriceLimitOutOfRange => "SPL",
            PairError::AmountSpecifiedZero => "AS",
            PairError::StaleOracleTarget => "OLD",
            PairError::OracleUninitialized => "I",
            PairError::TickRangeBoundary => "TN",
            PairError::FlashUnderpaid0 => "F0",
            PairError::FlashUnderpaid1 => "F1",
            PairError::NotOwner | PairError::ProtocolFeeOutOfRange => return None,
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    MathError(#[from] crate::error::MathError),

    #[error(transparent)]
    StateError(#[from] crate::error::StateError),

    #[error(transparent)]
    PairError(#[from] crate::error::PairError),
}

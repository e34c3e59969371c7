// Transaction kinds
//
// Each constant is the wire spelling of one `TransactionKind` variant.

/// Purchase of an instrument. Adds quantity and cost, decreases cash.
pub const TRANSACTION_KIND_BUY: &str = "buy";

/// Disposal of an instrument at weighted-average cost. Realizes P&L, increases cash.
pub const TRANSACTION_KIND_SELL: &str = "sell";

/// Units arriving from another account. Cost basis travels with the units.
pub const TRANSACTION_KIND_TRANSFER_IN: &str = "transfer_in";

/// Units leaving for another account at average cost. Realizes zero P&L.
pub const TRANSACTION_KIND_TRANSFER_OUT: &str = "transfer_out";

/// Cash entering the account. No instrument effect.
pub const TRANSACTION_KIND_DEPOSIT: &str = "deposit";

/// Cash leaving the account. No instrument effect.
pub const TRANSACTION_KIND_WITHDRAWAL: &str = "withdrawal";

/// Cash dividend. No lot effect; tracked as income on the holding.
pub const TRANSACTION_KIND_DIVIDEND: &str = "dividend";

/// Bonus issue "N:M": N new units for every M held. Total cost unchanged.
pub const TRANSACTION_KIND_BONUS: &str = "bonus";

/// Split "N:M": every M units become N. Total cost unchanged.
pub const TRANSACTION_KIND_SPLIT: &str = "split";

/// Demerger of the parent: total cost scaled by a retention factor in (0, 1].
pub const TRANSACTION_KIND_DEMERGER: &str = "demerger";

/// Units of the entity resulting from a demerger, at an explicit cost per unit.
pub const TRANSACTION_KIND_RESULTING: &str = "resulting";

pub const MAX_COLLECTION_SUPPLY: u32 = 100_000;
pub const MAX_BATCH_MINT: u32 = 10;

pub const MAX_NAME_LEN: usize = 128;
pub const MAX_SYMBOL_LEN: usize = 16;

pub const DEFAULT_OFFERS_PAGE: usize = 50;
pub const MAX_OFFERS_PAGE: usize = 100;

// Replay bound: read-model builders never scan more than this many entries.
pub const MAX_SCAN_WINDOW: u64 = 100_000;


// --- Unit Tests ---
pub mod unit {
    pub mod buy_test;
    pub mod collection_test;
    pub mod dispatch_test;
    pub mod eligibility_test;
    pub mod listing_test;
    pub mod mint_test;
    pub mod offer_test;
    pub mod registry_test;
    pub mod stats_test;
}

#[cfg(test)]
pub mod content_http_tests;
#[cfg(test)]
pub mod ledger_feed_tests;

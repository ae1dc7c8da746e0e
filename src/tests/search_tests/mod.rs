mod listing_tests;
mod poller_tests;
mod zip_lookup_tests;

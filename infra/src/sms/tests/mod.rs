mod ratelimit_tests;
mod retry_tests;

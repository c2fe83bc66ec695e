// builders + hooks + higher level helpers
pub mod builders;
pub mod hooks;
pub mod sinks;
pub mod utils;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub mod file_detection;
pub mod logging;
pub mod test_helpers;

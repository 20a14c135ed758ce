// Test modules for all components
pub mod support;
pub mod test_sync;
pub mod test_trainer;

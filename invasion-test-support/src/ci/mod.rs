//! Settings shared by the CI jobs that drive the test suites.

pub mod property_test_profile;

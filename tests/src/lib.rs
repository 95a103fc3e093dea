//! Host-based tests for the keypad counter panel

#[cfg(test)]
mod pin_mock_tests;
#[cfg(test)]
mod concurrency_tests;
#[cfg(test)]
mod embassy_tests;

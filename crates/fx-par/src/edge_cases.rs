//! Edge case tests for fx-par

// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Unit tests for reconciler helpers

#[cfg(test)]
mod tests {
    use crate::reconcilers::should_reconcile;

    #[test]
    fn test_should_reconcile_on_first_pass() {
        assert!(should_reconcile(Some(1), None));
    }

    #[test]
    fn test_should_reconcile_on_spec_change() {
        assert!(should_reconcile(Some(2), Some(1)));
    }

    #[test]
    fn test_no_reconcile_when_generations_match() {
        assert!(!should_reconcile(Some(3), Some(3)));
    }

    #[test]
    fn test_no_reconcile_without_generation() {
        assert!(!should_reconcile(None, None));
        assert!(!should_reconcile(None, Some(1)));
    }
}

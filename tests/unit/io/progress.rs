//! Tests for candidate progress bars

#[cfg(test)]
mod tests {
    use blackout::io::progress::{candidate_bar, finish_bar};

    // Tests bars are sized to the candidate count
    // Verified by creating bars with zero length
    #[test]
    fn test_candidate_bar_length() {
        let bar = candidate_bar(12, false);

        assert_eq!(bar.length(), Some(12));
        assert_eq!(bar.position(), 0);
        assert!(bar.is_hidden());
    }

    // Tests finishing marks the bar complete
    // Verified by leaving the bar running
    #[test]
    fn test_finish_bar() {
        let bar = candidate_bar(3, false);
        bar.inc(3);
        finish_bar(&bar, Some(42.0));
        assert!(bar.is_finished());

        let cleared = candidate_bar(3, false);
        finish_bar(&cleared, None);
        assert!(cleared.is_finished());
    }
}

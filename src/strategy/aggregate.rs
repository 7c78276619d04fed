use crate::models::Signal;

/// Policy for folding independent per-strategy signals into one action
///
/// Kept behind a trait so alternative aggregation rules can be swapped in
/// without touching the producers.
pub trait SignalPolicy: Send + Sync {
    fn decide(&self, signals: &[Signal]) -> Signal;

    fn name(&self) -> &'static str;
}

/// Emit the side that strictly outnumbers the other
///
/// A tie between buys and sells, an all-hold set, or an empty set decides
/// nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct MajorityVote;

impl SignalPolicy for MajorityVote {
    fn decide(&self, signals: &[Signal]) -> Signal {
        let buys = signals.iter().filter(|&&s| s == Signal::Buy).count();
        let sells = signals.iter().filter(|&&s| s == Signal::Sell).count();

        if buys > sells {
            Signal::Buy
        } else if sells > buys {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    fn name(&self) -> &'static str {
        "majority"
    }
}

/// Every non-hold producer must agree, and at least one must speak
#[derive(Debug, Clone, Copy, Default)]
pub struct Unanimous;

impl SignalPolicy for Unanimous {
    fn decide(&self, signals: &[Signal]) -> Signal {
        let buys = signals.iter().filter(|&&s| s == Signal::Buy).count();
        let sells = signals.iter().filter(|&&s| s == Signal::Sell).count();

        match (buys, sells) {
            (0, 0) => Signal::Hold,
            (_, 0) => Signal::Buy,
            (0, _) => Signal::Sell,
            _ => Signal::Hold,
        }
    }

    fn name(&self) -> &'static str {
        "unanimous"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Signal::*;

    #[test]
    fn test_majority_picks_dominant_side() {
        assert_eq!(MajorityVote.decide(&[Buy, Buy, Sell]), Buy);
        assert_eq!(MajorityVote.decide(&[Sell, Sell, Buy]), Sell);
        assert_eq!(MajorityVote.decide(&[Buy, Hold, Hold]), Buy);
    }

    #[test]
    fn test_majority_tie_is_hold() {
        assert_eq!(MajorityVote.decide(&[Buy, Sell, Hold]), Hold);
        assert_eq!(MajorityVote.decide(&[Buy, Sell]), Hold);
    }

    #[test]
    fn test_majority_all_hold_is_hold() {
        assert_eq!(MajorityVote.decide(&[Hold, Hold, Hold]), Hold);
    }

    #[test]
    fn test_majority_empty_is_hold() {
        assert_eq!(MajorityVote.decide(&[]), Hold);
    }

    #[test]
    fn test_unanimous_requires_full_agreement() {
        assert_eq!(Unanimous.decide(&[Buy, Buy, Hold]), Buy);
        assert_eq!(Unanimous.decide(&[Sell, Hold]), Sell);
        assert_eq!(Unanimous.decide(&[Buy, Sell, Buy]), Hold);
        assert_eq!(Unanimous.decide(&[Hold, Hold]), Hold);
        assert_eq!(Unanimous.decide(&[]), Hold);
    }

    #[test]
    fn test_majority_disagrees_with_unanimous_on_split_votes() {
        let split = [Buy, Buy, Sell];
        assert_eq!(MajorityVote.decide(&split), Buy);
        assert_eq!(Unanimous.decide(&split), Hold);
    }
}

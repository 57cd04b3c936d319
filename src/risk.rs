use crate::types::Color;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Extreme,
}

impl RiskTier {
    pub const ALL: [RiskTier; 4] = [
        RiskTier::Low,
        RiskTier::Medium,
        RiskTier::High,
        RiskTier::Extreme,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
            RiskTier::Extreme => "Extreme",
        }
    }

    pub fn color(self) -> Color {
        match self {
            RiskTier::Low => Color::rgb8(0x16, 0xA3, 0x4A),
            RiskTier::Medium => Color::rgb8(0xD9, 0x77, 0x06),
            RiskTier::High => Color::rgb8(0xEA, 0x58, 0x0C),
            RiskTier::Extreme => Color::rgb8(0xDC, 0x26, 0x26),
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(RiskTier::Low),
            "medium" | "moderate" => Some(RiskTier::Medium),
            "high" => Some(RiskTier::High),
            "extreme" | "severe" => Some(RiskTier::Extreme),
            _ => None,
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const NOT_ASSESSED_COLOR: Color = Color::rgb8(0x6B, 0x72, 0x80);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RiskScale {
    /// Scores 1–16; the 5×5 reference matrix is a fixed lookup table.
    #[default]
    Standard16,
    /// Scores 1–25; matrix cells are likelihood × consequence.
    Extended25,
}

// Inclusive upper bound of Low, Medium and High; Extreme runs to `max_score`.
const STANDARD16_BOUNDS: [i64; 3] = [6, 10, 13];
const EXTENDED25_BOUNDS: [i64; 3] = [4, 9, 16];

// Row = likelihood (1 Rare .. 5 Almost certain), column = consequence
// (1 Insignificant .. 5 Catastrophic). Monotonic along both axes.
const STANDARD16_MATRIX: [[i64; 5]; 5] = [
    [1, 2, 3, 5, 7],
    [2, 4, 6, 8, 11],
    [3, 6, 9, 12, 14],
    [5, 8, 12, 14, 15],
    [7, 11, 14, 15, 16],
];

impl RiskScale {
    pub fn min_score(self) -> i64 {
        1
    }

    pub fn max_score(self) -> i64 {
        match self {
            RiskScale::Standard16 => 16,
            RiskScale::Extended25 => 25,
        }
    }

    fn upper_bounds(self) -> [i64; 3] {
        match self {
            RiskScale::Standard16 => STANDARD16_BOUNDS,
            RiskScale::Extended25 => EXTENDED25_BOUNDS,
        }
    }

    pub fn band(self, tier: RiskTier) -> (i64, i64) {
        let bounds = self.upper_bounds();
        match tier {
            RiskTier::Low => (self.min_score(), bounds[0]),
            RiskTier::Medium => (bounds[0] + 1, bounds[1]),
            RiskTier::High => (bounds[1] + 1, bounds[2]),
            RiskTier::Extreme => (bounds[2] + 1, self.max_score()),
        }
    }

    /// Score of the reference matrix cell for 1-based likelihood and
    /// consequence indices. Indices outside 1..=5 are clamped.
    pub fn matrix_score(self, likelihood: usize, consequence: usize) -> i64 {
        let l = likelihood.clamp(1, 5);
        let c = consequence.clamp(1, 5);
        match self {
            RiskScale::Standard16 => STANDARD16_MATRIX[l - 1][c - 1],
            RiskScale::Extended25 => (l * c) as i64,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            RiskScale::Standard16 => "1-16",
            RiskScale::Extended25 => "1-25",
        }
    }

    pub fn cell_rule(self) -> &'static str {
        match self {
            RiskScale::Standard16 => "Cell scores follow the site lookup table",
            RiskScale::Extended25 => "Risk = likelihood x consequence",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskRating {
    pub tier: RiskTier,
    pub score: i64,
    pub clamped: bool,
}

impl RiskRating {
    pub fn label(&self) -> &'static str {
        self.tier.label()
    }

    pub fn color(&self) -> Color {
        self.tier.color()
    }

    pub fn badge_text(&self) -> String {
        format!("{} ({})", self.tier.label(), self.score)
    }
}

pub fn classify(scale: RiskScale, score: i64) -> RiskRating {
    let clamped_score = score.clamp(scale.min_score(), scale.max_score());
    let bounds = scale.upper_bounds();
    let tier = if clamped_score <= bounds[0] {
        RiskTier::Low
    } else if clamped_score <= bounds[1] {
        RiskTier::Medium
    } else if clamped_score <= bounds[2] {
        RiskTier::High
    } else {
        RiskTier::Extreme
    };
    RiskRating {
        tier,
        score: clamped_score,
        clamped: clamped_score != score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_is_deterministic() {
        for scale in [RiskScale::Standard16, RiskScale::Extended25] {
            for score in -5..=30 {
                let first = classify(scale, score);
                for _ in 0..3 {
                    assert_eq!(classify(scale, score), first);
                }
                assert_eq!(classify(scale, first.score), RiskRating { clamped: false, ..first });
            }
        }
    }

    #[test]
    fn bands_are_contiguous_and_exhaustive() {
        for scale in [RiskScale::Standard16, RiskScale::Extended25] {
            let mut expected_start = scale.min_score();
            for tier in RiskTier::ALL {
                let (lo, hi) = scale.band(tier);
                assert_eq!(lo, expected_start, "{scale:?} {tier} must start where the previous band ended");
                assert!(lo <= hi, "{scale:?} {tier} band must be non-empty");
                for score in lo..=hi {
                    assert_eq!(classify(scale, score).tier, tier);
                }
                expected_start = hi + 1;
            }
            assert_eq!(expected_start, scale.max_score() + 1);
        }
    }

    #[test]
    fn standard_scale_examples() {
        let initial = classify(RiskScale::Standard16, 16);
        assert_eq!(initial.badge_text(), "Extreme (16)");
        assert_eq!(initial.color(), Color::from_hex("#DC2626").unwrap());
        let residual = classify(RiskScale::Standard16, 4);
        assert_eq!(residual.badge_text(), "Low (4)");
        assert_eq!(residual.color(), Color::from_hex("#16A34A").unwrap());
        assert_eq!(classify(RiskScale::Standard16, 7).tier, RiskTier::Medium);
        assert_eq!(classify(RiskScale::Standard16, 11).tier, RiskTier::High);
        assert_eq!(classify(RiskScale::Standard16, 14).tier, RiskTier::Extreme);
    }

    #[test]
    fn out_of_range_scores_clamp_and_flag() {
        let low = classify(RiskScale::Standard16, -3);
        assert_eq!((low.score, low.tier, low.clamped), (1, RiskTier::Low, true));
        let high = classify(RiskScale::Standard16, 99);
        assert_eq!((high.score, high.tier, high.clamped), (16, RiskTier::Extreme, true));
        assert!(!classify(RiskScale::Extended25, 25).clamped);
    }

    #[test]
    fn matrix_scores_are_monotonic_and_in_range() {
        for scale in [RiskScale::Standard16, RiskScale::Extended25] {
            for l in 1..=5 {
                for c in 1..=5 {
                    let score = scale.matrix_score(l, c);
                    assert!(score >= scale.min_score() && score <= scale.max_score());
                    if l > 1 {
                        assert!(score >= scale.matrix_score(l - 1, c));
                    }
                    if c > 1 {
                        assert!(score >= scale.matrix_score(l, c - 1));
                    }
                }
            }
            assert_eq!(scale.matrix_score(5, 5), scale.max_score());
            assert_eq!(scale.matrix_score(1, 1), scale.min_score());
        }
        assert_eq!(RiskScale::Extended25.matrix_score(3, 4), 12);
    }

    #[test]
    fn tier_parsing_accepts_legacy_names() {
        assert_eq!(RiskTier::parse("Severe"), Some(RiskTier::Extreme));
        assert_eq!(RiskTier::parse(" moderate "), Some(RiskTier::Medium));
        assert_eq!(RiskTier::parse("critical"), None);
    }
}

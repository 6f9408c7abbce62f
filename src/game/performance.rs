use crate::game::judgment::Grade;
use log::debug;
use serde::{Deserialize, Serialize};

pub const INITIAL_ACCURACY: f64 = 100.0;
// Combo at which the score multiplier starts growing past 1.
const MULTIPLIER_COMBO_STEP: u32 = 10;

/// Running statistics for one play. Serializes to the leaderboard record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    /// Notes that reached a terminal outcome, hit or missed.
    pub max_possible_combo: u32,
    pub accuracy: f64,
    pub perfect_hits: u32,
    pub good_hits: u32,
    pub bad_hits: u32,
    pub misses: u32,
    pub player_name: String,
}

impl Performance {
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            score: 0,
            combo: 0,
            max_combo: 0,
            max_possible_combo: 0,
            accuracy: INITIAL_ACCURACY,
            perfect_hits: 0,
            good_hits: 0,
            bad_hits: 0,
            misses: 0,
            player_name: player_name.into(),
        }
    }

    /// 1 below a combo of 10, then floor(combo / 10).
    #[inline(always)]
    pub const fn score_multiplier(&self) -> u64 {
        if self.combo < MULTIPLIER_COMBO_STEP {
            1
        } else {
            (self.combo / MULTIPLIER_COMBO_STEP) as u64
        }
    }

    pub fn add_score(&mut self, grade: Grade) {
        self.score += grade.base_points() * self.score_multiplier();
    }

    pub fn update_combo(&mut self, grade: Grade) {
        if grade.is_miss() {
            self.max_combo = self.max_combo.max(self.combo);
            self.combo = 0;
        } else {
            self.combo += 1;
        }
    }

    pub fn update_hits_counter(&mut self, grade: Grade) {
        match grade {
            Grade::Perfect => self.perfect_hits += 1,
            Grade::Good => self.good_hits += 1,
            Grade::Bad => self.bad_hits += 1,
            Grade::Miss => self.misses += 1,
        }
    }

    /// Leaves accuracy untouched while nothing has been counted.
    pub fn update_accuracy(&mut self) {
        let earned = Grade::Perfect.base_points() * u64::from(self.perfect_hits)
            + Grade::Good.base_points() * u64::from(self.good_hits)
            + Grade::Bad.base_points() * u64::from(self.bad_hits);
        let possible = Grade::Perfect.base_points() * u64::from(self.total_counted());
        if possible != 0 {
            self.accuracy = earned as f64 / possible as f64 * 100.0;
        }
    }

    #[inline(always)]
    pub const fn total_counted(&self) -> u32 {
        self.perfect_hits + self.good_hits + self.bad_hits + self.misses
    }

    /// Folds a graded key press. Order is fixed: accuracy, score (with the
    /// combo from before this hit), combo, counters.
    pub fn apply_judged(&mut self, grade: Grade) {
        self.update_accuracy();
        self.add_score(grade);
        self.update_combo(grade);
        self.update_hits_counter(grade);
        self.max_possible_combo += 1;
        debug!(
            "Judged {grade}: score={}, combo={}, accuracy={:.2}",
            self.score, self.combo, self.accuracy
        );
    }

    /// Folds a note that scrolled past the hit window unpressed. Counted as a
    /// miss like a mistimed press, without touching the score.
    pub fn apply_timeout_miss(&mut self) {
        self.max_possible_combo += 1;
        self.update_combo(Grade::Miss);
        self.update_hits_counter(Grade::Miss);
        self.update_accuracy();
    }

    /// End-of-chart bookkeeping: an unbroken streak still counts toward
    /// max_combo, and accuracy reflects the last judged note.
    pub fn finalize(&mut self) {
        self.max_combo = self.max_combo.max(self.combo);
        self.update_accuracy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_combo(combo: u32) -> Performance {
        let mut p = Performance::new("tester");
        p.combo = combo;
        p
    }

    #[test]
    fn fresh_performance_defaults() {
        let p = Performance::new("koli");
        assert_eq!(p.score, 0);
        assert_eq!(p.accuracy, 100.0);
        assert_eq!(p.player_name, "koli");
    }

    #[test]
    fn multiplier_boundaries() {
        assert_eq!(with_combo(0).score_multiplier(), 1);
        assert_eq!(with_combo(9).score_multiplier(), 1);
        assert_eq!(with_combo(10).score_multiplier(), 1);
        assert_eq!(with_combo(19).score_multiplier(), 1);
        assert_eq!(with_combo(20).score_multiplier(), 2);
        assert_eq!(with_combo(25).score_multiplier(), 2);
        assert_eq!(with_combo(137).score_multiplier(), 13);
    }

    #[test]
    fn score_uses_grade_points_times_multiplier() {
        let mut p = with_combo(25);
        p.add_score(Grade::Perfect);
        assert_eq!(p.score, 600);
        p.add_score(Grade::Good);
        assert_eq!(p.score, 800);
        p.add_score(Grade::Bad);
        assert_eq!(p.score, 900);
        p.add_score(Grade::Miss);
        assert_eq!(p.score, 900);
    }

    #[test]
    fn combo_counts_streak_and_miss_folds_max() {
        let mut p = Performance::new("tester");
        for _ in 0..7 {
            p.update_combo(Grade::Good);
        }
        assert_eq!(p.combo, 7);
        p.update_combo(Grade::Miss);
        assert_eq!(p.combo, 0);
        assert_eq!(p.max_combo, 7);
        for _ in 0..3 {
            p.update_combo(Grade::Perfect);
        }
        p.update_combo(Grade::Miss);
        assert_eq!(p.max_combo, 7);
    }

    #[test]
    fn accuracy_without_hits_stays_at_initial_value() {
        let mut p = Performance::new("tester");
        p.update_accuracy();
        assert_eq!(p.accuracy, 100.0);
    }

    #[test]
    fn accuracy_weights_grades() {
        let mut p = Performance::new("tester");
        p.perfect_hits = 1;
        p.misses = 1;
        p.update_accuracy();
        assert_eq!(p.accuracy, 50.0);
        p.good_hits = 1;
        p.bad_hits = 1;
        p.update_accuracy();
        assert!((p.accuracy - 450.0 / 1200.0 * 100.0).abs() < 1e-12);
    }

    #[test]
    fn judged_hit_scores_with_pre_hit_combo() {
        let mut p = with_combo(19);
        p.apply_judged(Grade::Perfect);
        // multiplier from combo 19, not 20
        assert_eq!(p.score, 300);
        assert_eq!(p.combo, 20);
        assert_eq!(p.perfect_hits, 1);
        assert_eq!(p.max_possible_combo, 1);
        p.apply_judged(Grade::Perfect);
        assert_eq!(p.score, 900);
    }

    #[test]
    fn judged_miss_counts_and_breaks_combo() {
        let mut p = with_combo(4);
        p.apply_judged(Grade::Miss);
        assert_eq!(p.misses, 1);
        assert_eq!(p.combo, 0);
        assert_eq!(p.max_combo, 4);
        assert_eq!(p.score, 0);
    }

    #[test]
    fn timeout_miss_counts_as_a_miss() {
        let mut p = Performance::new("tester");
        p.apply_judged(Grade::Perfect);
        p.apply_judged(Grade::Perfect);
        p.apply_timeout_miss();
        assert_eq!(p.misses, 1);
        assert_eq!(p.combo, 0);
        assert_eq!(p.max_combo, 2);
        assert_eq!(p.max_possible_combo, 3);
        assert!((p.accuracy - 600.0 / 900.0 * 100.0).abs() < 1e-12);
        assert_eq!(p.score, 600);
    }

    #[test]
    fn finalize_keeps_unbroken_streak() {
        let mut p = Performance::new("tester");
        for _ in 0..12 {
            p.apply_judged(Grade::Good);
        }
        assert_eq!(p.max_combo, 0);
        p.finalize();
        assert_eq!(p.max_combo, 12);
        assert!((p.accuracy - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn record_serializes_exactly_the_leaderboard_fields() {
        let p = Performance::new("koli");
        let value = serde_json::to_value(&p).expect("serialize");
        let mut keys: Vec<_> = value.as_object().expect("object").keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "accuracy", "bad_hits", "combo", "good_hits", "max_combo",
                "max_possible_combo", "misses", "perfect_hits", "player_name", "score",
            ]
        );
    }
}

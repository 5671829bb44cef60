use chrono::{DateTime, Utc};

use crate::core::scoring::calculate_match_score;
use crate::models::{GatePoints, Grant, Match, Profile};

/// A grant that survived scoring, paired with its unsaved match record
#[derive(Debug, Clone)]
pub struct RankedGrant {
    pub candidate: Match,
    pub grant: Grant,
}

/// Scores a catalog for one profile and ranks the eligible grants
///
/// # Pipeline Stages
/// 1. Score every grant through the eligibility gates
/// 2. Drop zero scores
/// 3. Sort by score, descending; equal scores keep catalog order
/// 4. Truncate to the requested limit
#[derive(Debug, Clone)]
pub struct Matcher {
    points: GatePoints,
}

impl Matcher {
    pub fn new(points: GatePoints) -> Self {
        Self { points }
    }

    pub fn with_default_points() -> Self {
        Self {
            points: GatePoints::default(),
        }
    }

    pub fn points(&self) -> &GatePoints {
        &self.points
    }

    /// Score a single grant for a profile at the current time
    pub fn score(&self, profile: &Profile, grant: &Grant) -> (f64, String) {
        self.score_at(profile, grant, Utc::now())
    }

    /// Score a single grant for a profile as of `now`
    pub fn score_at(&self, profile: &Profile, grant: &Grant, now: DateTime<Utc>) -> (f64, String) {
        calculate_match_score(profile, grant, &self.points, now)
    }

    /// Rank `grants` for `profile` as of `now`
    pub fn rank(
        &self,
        profile: &Profile,
        grants: Vec<Grant>,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Vec<RankedGrant> {
        let mut ranked: Vec<RankedGrant> = grants
            .into_iter()
            .filter_map(|grant| {
                let (score, explanation) =
                    calculate_match_score(profile, &grant, &self.points, now);

                if score > 0.0 {
                    Some(RankedGrant {
                        candidate: Match::new(profile.id(), grant.id(), score, explanation),
                        grant,
                    })
                } else {
                    None
                }
            })
            .collect();

        // sort_by is stable, so ties preserve catalog order
        ranked.sort_by(|a, b| {
            b.candidate
                .score
                .partial_cmp(&a.candidate.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        ranked.truncate(limit);
        ranked
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_points()
    }
}

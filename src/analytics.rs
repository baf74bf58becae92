use crate::api::Backend;
use crate::error::Result;
use crate::logger;
use crate::models::QuizResult;
use crate::pagination::{Pagination, ATTEMPTS_PER_PAGE};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};

const SECONDS_PER_DAY: f64 = 86_400.0;
const TREND_WINDOW: usize = 5;

/// Every recorded attempt for every note title, oldest first. A title whose
/// analysis fails is left out.
pub async fn collect_results(backend: &dyn Backend) -> Result<Vec<QuizResult>> {
    let notes = backend.get_notes().await?;

    let mut seen = HashSet::new();
    let titles: Vec<String> = notes
        .into_iter()
        .map(|note| note.title)
        .filter(|title| seen.insert(title.clone()))
        .collect();

    let mut results = Vec::new();
    for title in &titles {
        match backend.quiz_analysis(title).await {
            Ok(attempts) => {
                results.extend(attempts.into_iter().map(|a| a.into_result(title)));
            }
            Err(e) => logger::warn(&format!("Skipping analysis for {:?}: {}", title, e)),
        }
    }

    results.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(results)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    Week,
    Month,
    Quarter,
    #[default]
    All,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::Week,
        TimeRange::Month,
        TimeRange::Quarter,
        TimeRange::All,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Week => "Last 7 days",
            TimeRange::Month => "Last 30 days",
            TimeRange::Quarter => "Last 3 months",
            TimeRange::All => "All time",
        }
    }

    fn max_days(&self) -> Option<f64> {
        match self {
            TimeRange::Week => Some(7.0),
            TimeRange::Month => Some(30.0),
            TimeRange::Quarter => Some(90.0),
            TimeRange::All => None,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            TimeRange::Week => TimeRange::Month,
            TimeRange::Month => TimeRange::Quarter,
            TimeRange::Quarter => TimeRange::All,
            TimeRange::All => TimeRange::Week,
        }
    }

    pub fn contains(&self, at: &DateTime<Utc>, now: &DateTime<Utc>) -> bool {
        match self.max_days() {
            None => true,
            Some(max) => {
                let days = (*now - *at).num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY;
                days <= max
            }
        }
    }
}

pub fn filter_by_range(
    results: &[QuizResult],
    range: TimeRange,
    now: DateTime<Utc>,
) -> Vec<QuizResult> {
    results
        .iter()
        .filter(|r| range.contains(&r.created_at, &now))
        .cloned()
        .collect()
}

/// Half-up rounding, matching how scores are shown elsewhere.
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

fn mean(scores: &[QuizResult], divisor: usize) -> f64 {
    scores.iter().map(|r| r.score as f64).sum::<f64>() / divisor as f64
}

/// Average of the last five attempts minus the average of the ones before.
pub fn improvement_trend(results: &[QuizResult]) -> i32 {
    if results.len() < 2 {
        return 0;
    }
    let split = results.len().saturating_sub(TREND_WINDOW);
    let (older, recent) = results.split_at(split);
    let recent_avg = mean(recent, recent.len().min(TREND_WINDOW));
    let older_avg = mean(older, older.len().max(1));
    round_half_up(recent_avg - older_avg)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub total: usize,
    pub average: u8,
    pub highest: u8,
    pub trend: i32,
}

pub fn summarize(results: &[QuizResult]) -> Summary {
    if results.is_empty() {
        return Summary::default();
    }
    Summary {
        total: results.len(),
        average: round_half_up(mean(results, results.len())).clamp(0, 100) as u8,
        highest: results.iter().map(|r| r.score).max().unwrap_or(0),
        trend: improvement_trend(results),
    }
}

/// Attempts per 10-point score bucket, lowest bucket first.
pub fn score_distribution(results: &[QuizResult]) -> Vec<(String, u64)> {
    let mut buckets: BTreeMap<u8, u64> = BTreeMap::new();
    for r in results {
        *buckets.entry(r.score / 10 * 10).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(low, count)| (format!("{}-{}%", low, low as u16 + 9), count))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Excellent,
    Good,
    Fair,
    NeedsWork,
}

impl Band {
    pub fn of(score: u8) -> Self {
        match score {
            90.. => Band::Excellent,
            80..=89 => Band::Good,
            70..=79 => Band::Fair,
            _ => Band::NeedsWork,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Band::Excellent => "Excellent (90-100%)",
            Band::Good => "Good (80-89%)",
            Band::Fair => "Fair (70-79%)",
            Band::NeedsWork => "Needs Work (<70%)",
        }
    }
}

/// Attempt count per band; bands with no attempts are left out.
pub fn performance_bands(results: &[QuizResult]) -> Vec<(Band, usize)> {
    [Band::Excellent, Band::Good, Band::Fair, Band::NeedsWork]
        .into_iter()
        .map(|band| {
            let count = results.iter().filter(|r| Band::of(r.score) == band).count();
            (band, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// Analytics screen state: everything loaded plus the active filter and page.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsView {
    results: Vec<QuizResult>,
    range: TimeRange,
    page: usize,
}

impl AnalyticsView {
    pub fn new(results: Vec<QuizResult>) -> Self {
        Self {
            results,
            range: TimeRange::All,
            page: 1,
        }
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn set_range(&mut self, range: TimeRange) {
        self.range = range;
        self.page = 1;
    }

    pub fn filtered(&self, now: DateTime<Utc>) -> Vec<QuizResult> {
        filter_by_range(&self.results, self.range, now)
    }

    pub fn summary(&self, now: DateTime<Utc>) -> Summary {
        summarize(&self.filtered(now))
    }

    /// Most recent attempts first.
    pub fn recent(&self, now: DateTime<Utc>) -> Vec<QuizResult> {
        let mut recent = self.filtered(now);
        recent.reverse();
        recent
    }

    pub fn pagination(&self, now: DateTime<Utc>) -> Pagination {
        Pagination::new(self.page, self.filtered(now).len(), ATTEMPTS_PER_PAGE)
    }

    pub fn recent_page(&self, now: DateTime<Utc>) -> Vec<QuizResult> {
        let recent = self.recent(now);
        self.pagination(now).slice(&recent).to_vec()
    }

    pub fn next_page(&mut self, now: DateTime<Utc>) {
        self.page = self.pagination(now).next().current_page();
    }

    pub fn previous_page(&mut self, now: DateTime<Utc>) {
        self.page = self.pagination(now).previous().current_page();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{raw_attempt, raw_note, MockBackend};
    use chrono::Duration;

    fn result(score: u8, days_ago: i64, now: DateTime<Utc>) -> QuizResult {
        QuizResult {
            title: "Cells".to_string(),
            score,
            created_at: now - Duration::days(days_ago),
        }
    }

    fn scores(values: &[u8]) -> Vec<QuizResult> {
        let now = Utc::now();
        values
            .iter()
            .enumerate()
            .map(|(i, s)| result(*s, (values.len() - i) as i64, now))
            .collect()
    }

    #[tokio::test]
    async fn test_collect_skips_failing_titles_and_sorts() {
        let backend = MockBackend::new()
            .with_notes(vec![
                raw_note("1", "Cells", "", "2024-01-01T00:00:00Z"),
                raw_note("2", "broken note", "", "2024-01-02T00:00:00Z"),
                raw_note("3", "Cells", "", "2024-01-03T00:00:00Z"),
                raw_note("4", "Genetics", "", "2024-01-04T00:00:00Z"),
            ])
            .with_analysis(
                "Cells",
                vec![
                    raw_attempt(80.0, "2024-02-03T00:00:00Z"),
                    raw_attempt(60.0, "2024-02-01T00:00:00Z"),
                ],
            )
            .with_analysis("Genetics", vec![raw_attempt(90.0, "2024-02-02T00:00:00Z")]);

        let results = collect_results(&backend).await.unwrap();
        let got: Vec<(&str, u8)> = results.iter().map(|r| (r.title.as_str(), r.score)).collect();
        assert_eq!(got, vec![("Cells", 60), ("Genetics", 90), ("Cells", 80)]);
        assert_eq!(backend.call_count("quiz_analysis"), 3);
    }

    #[tokio::test]
    async fn test_collect_fails_when_notes_fail() {
        let backend = MockBackend::new().failing("get_notes");
        assert!(collect_results(&backend).await.is_err());
    }

    #[test]
    fn test_time_range_is_inclusive_and_fractional() {
        let now = Utc::now();
        assert!(TimeRange::Week.contains(&(now - Duration::days(7)), &now));
        assert!(!TimeRange::Week.contains(&(now - Duration::hours(7 * 24 + 1)), &now));
        assert!(TimeRange::Quarter.contains(&(now - Duration::days(89)), &now));
        assert!(TimeRange::All.contains(&(now - Duration::days(4000)), &now));
    }

    #[test]
    fn test_summary_values() {
        let summary = summarize(&scores(&[50, 75, 100]));
        assert_eq!(summary.total, 3);
        assert_eq!(summary.average, 75);
        assert_eq!(summary.highest, 100);
        assert_eq!(summarize(&[]), Summary::default());
    }

    #[test]
    fn test_trend_compares_last_five_with_rest() {
        assert_eq!(improvement_trend(&scores(&[90])), 0);
        // Fewer than six attempts: the "older" side averages to zero.
        assert_eq!(improvement_trend(&scores(&[60, 80])), 70);
        assert_eq!(improvement_trend(&scores(&[40, 50, 80, 80, 80, 80, 80])), 35);
    }

    #[test]
    fn test_trend_rounds_half_up() {
        // older avg 79.5, recent 80
        let data = scores(&[79, 80, 80, 80, 80, 80, 80]);
        assert_eq!(improvement_trend(&data), 1);
        // older avg 80.5, recent 80: -0.5 rounds to 0
        let data = scores(&[80, 81, 80, 80, 80, 80, 80]);
        assert_eq!(improvement_trend(&data), 0);
    }

    #[test]
    fn test_distribution_buckets() {
        let buckets = score_distribution(&scores(&[72, 95, 78, 100, 5]));
        assert_eq!(
            buckets,
            vec![
                ("0-9%".to_string(), 1),
                ("70-79%".to_string(), 2),
                ("90-99%".to_string(), 1),
                ("100-109%".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_bands_hide_empty() {
        let bands = performance_bands(&scores(&[95, 91, 65]));
        assert_eq!(bands, vec![(Band::Excellent, 2), (Band::NeedsWork, 1)]);
        assert_eq!(Band::of(89), Band::Good);
        assert_eq!(Band::of(70), Band::Fair);
    }

    #[test]
    fn test_view_recent_first_paged_by_four() {
        let now = Utc::now();
        let results: Vec<QuizResult> = (0..6).map(|i| result(50 + i as u8, 10 - i, now)).collect();
        let mut view = AnalyticsView::new(results);

        let first = view.recent_page(now);
        assert_eq!(first.len(), 4);
        assert_eq!(first[0].score, 55);
        view.next_page(now);
        assert_eq!(view.recent_page(now).len(), 2);

        view.set_range(TimeRange::Week);
        assert_eq!(view.pagination(now).current_page(), 1);
        assert_eq!(view.filtered(now).len(), 3);
    }
}

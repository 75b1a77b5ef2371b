//! Dashboard aggregation
//!
//! Groups raw rows by category and derives the ratios the dashboard charts
//! plot. Everything here works on rows already loaded into memory.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::insight::Severity;
use crate::models::{Crop, Farm, Insight, Livestock};

/// Category label for rows with a blank grouping key
const UNKNOWN: &str = "Unknown";

/// One slice of a categorical chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub category: String,
    pub count: usize,
    /// Summed area (ha) of the rows in the bucket
    pub total_area: f64,
    /// Fraction of all rows that fall in this bucket
    pub share: f64,
}

/// Livestock health for one species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthBucket {
    pub species: String,
    /// Number of livestock groups
    pub groups: usize,
    pub head_count: i64,
    pub healthy_count: i64,
    pub health_ratio: f64,
}

/// Expected vs actual yield for one harvest month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// `YYYY-MM`
    pub month: String,
    pub crops: usize,
    pub expected_yield: f64,
    pub actual_yield: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl SeverityCounts {
    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }
}

/// Everything the farm dashboard renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmDashboard {
    pub farm_id: Uuid,
    pub farm_name: String,
    pub total_area: f64,
    pub cultivated_area: f64,
    /// cultivated / total land
    pub land_utilization: f64,
    pub crop_count: usize,
    pub livestock_groups: usize,
    pub livestock_head_count: i64,
    /// healthy head / all head
    pub livestock_health_ratio: f64,
    pub crops_by_type: Vec<CategoryBucket>,
    pub crops_by_status: Vec<CategoryBucket>,
    pub livestock_by_species: Vec<HealthBucket>,
    pub harvest_timeline: Vec<TimelinePoint>,
    pub insights_by_severity: SeverityCounts,
}

/// `num / den` clamped to [0, 1]; zero when the denominator is not positive.
pub fn ratio(num: f64, den: f64) -> f64 {
    if den <= 0.0 || !den.is_finite() || !num.is_finite() {
        return 0.0;
    }
    (num / den).clamp(0.0, 1.0)
}

fn category_key(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNKNOWN.to_string()
    } else {
        trimmed.to_string()
    }
}

fn bucket_by<'a, F>(crops: &'a [Crop], key: F) -> Vec<CategoryBucket>
where
    F: Fn(&'a Crop) -> &'a str,
{
    let mut groups: HashMap<String, (usize, f64)> = HashMap::new();
    for crop in crops {
        let entry = groups.entry(category_key(key(crop))).or_default();
        entry.0 += 1;
        entry.1 += crop.area.unwrap_or(0.0).max(0.0);
    }

    let total = crops.len() as f64;
    let mut buckets: Vec<CategoryBucket> = groups
        .into_iter()
        .map(|(category, (count, total_area))| CategoryBucket {
            category,
            count,
            total_area,
            share: ratio(count as f64, total),
        })
        .collect();

    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    buckets
}

/// Crops grouped by `crop_type`, largest group first.
pub fn crop_distribution(crops: &[Crop]) -> Vec<CategoryBucket> {
    bucket_by(crops, |c| c.crop_type.as_str())
}

/// Crops grouped by lifecycle `status`, largest group first.
pub fn crop_status_breakdown(crops: &[Crop]) -> Vec<CategoryBucket> {
    bucket_by(crops, |c| c.status.as_str())
}

fn is_healthy(status: &str) -> bool {
    status.trim().eq_ignore_ascii_case("healthy")
}

/// Livestock grouped by species with healthy head ratios.
pub fn livestock_health(livestock: &[Livestock]) -> Vec<HealthBucket> {
    let mut groups: HashMap<String, (usize, i64, i64)> = HashMap::new();
    for group in livestock {
        let head = i64::from(group.count.max(0));
        let entry = groups.entry(category_key(&group.species)).or_default();
        entry.0 += 1;
        entry.1 += head;
        if is_healthy(&group.health_status) {
            entry.2 += head;
        }
    }

    let mut buckets: Vec<HealthBucket> = groups
        .into_iter()
        .map(|(species, (groups, head_count, healthy_count))| HealthBucket {
            species,
            groups,
            head_count,
            healthy_count,
            health_ratio: ratio(healthy_count as f64, head_count as f64),
        })
        .collect();

    buckets.sort_by(|a, b| {
        b.head_count
            .cmp(&a.head_count)
            .then_with(|| a.species.cmp(&b.species))
    });
    buckets
}

/// Expected and actual yield per harvest month, oldest month first.
///
/// Crops without an expected harvest date are left out.
pub fn harvest_timeline(crops: &[Crop]) -> Vec<TimelinePoint> {
    let mut months: BTreeMap<String, TimelinePoint> = BTreeMap::new();
    for crop in crops {
        let Some(date) = crop.expected_harvest_date else {
            continue;
        };
        let month = date.format("%Y-%m").to_string();
        let point = months.entry(month.clone()).or_insert_with(|| TimelinePoint {
            month,
            crops: 0,
            expected_yield: 0.0,
            actual_yield: 0.0,
        });
        point.crops += 1;
        point.expected_yield += crop.expected_yield.unwrap_or(0.0);
        point.actual_yield += crop.actual_yield.unwrap_or(0.0);
    }
    months.into_values().collect()
}

/// Count stored insights per severity; unknown severities count as medium.
pub fn severity_counts(insights: &[Insight]) -> SeverityCounts {
    let mut counts = SeverityCounts::default();
    for insight in insights {
        match Severity::parse(&insight.severity).unwrap_or_default() {
            Severity::Low => counts.low += 1,
            Severity::Medium => counts.medium += 1,
            Severity::High => counts.high += 1,
        }
    }
    counts
}

/// Assemble the full dashboard for one farm.
pub fn build_dashboard(
    farm: &Farm,
    crops: &[Crop],
    livestock: &[Livestock],
    insights: &[Insight],
) -> FarmDashboard {
    let total_area = farm.total_area.unwrap_or(0.0).max(0.0);
    let cultivated_area: f64 = crops.iter().filter_map(|c| c.area).map(|a| a.max(0.0)).sum();

    let livestock_by_species = livestock_health(livestock);
    let livestock_head_count: i64 = livestock_by_species.iter().map(|b| b.head_count).sum();
    let healthy: i64 = livestock_by_species.iter().map(|b| b.healthy_count).sum();

    FarmDashboard {
        farm_id: farm.id,
        farm_name: farm.name.clone(),
        total_area,
        cultivated_area,
        land_utilization: ratio(cultivated_area, total_area),
        crop_count: crops.len(),
        livestock_groups: livestock.len(),
        livestock_head_count,
        livestock_health_ratio: ratio(healthy as f64, livestock_head_count as f64),
        crops_by_type: crop_distribution(crops),
        crops_by_status: crop_status_breakdown(crops),
        livestock_by_species,
        harvest_timeline: harvest_timeline(crops),
        insights_by_severity: severity_counts(insights),
    }
}

//! Prompt construction for insight generation
//!
//! The wording is free to change; what matters is that the aggregates from
//! [`crate::dashboard`] are embedded and the reply shape is requested as JSON.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::dashboard::{crop_distribution, livestock_health, ratio};
use crate::models::{Crop, Farm, GrowthRecord, Livestock};

/// Maximum growth checkpoints included in a farm prompt
const MAX_GROWTH_LINES: usize = 10;

const SYSTEM_PROMPT: &str = "You are an agronomy and animal husbandry advisor. \
Reply with a single JSON object of the form {\"insights\": [...]} and nothing else. \
Each insight has: title (string), description (string), \
severity (\"low\" | \"medium\" | \"high\"), recommended_actions (array of strings), \
confidence (number between 0 and 1), metadata (object).";

/// A system + user message pair for a chat-completion call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Everything the store gathers about a farm before prompting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmSnapshot {
    pub farm: Farm,
    pub crops: Vec<Crop>,
    pub livestock: Vec<Livestock>,
    /// Most recent first
    pub recent_growth: Vec<GrowthRecord>,
}

/// Build the farm-wide insight prompt.
pub fn build_farm_prompt(snapshot: &FarmSnapshot) -> Prompt {
    let farm = &snapshot.farm;
    let mut user = String::new();

    let _ = writeln!(user, "Farm: {}", farm.name);
    if let Some(location) = &farm.location {
        let _ = writeln!(user, "Location: {}", location);
    }
    let cultivated: f64 = snapshot.crops.iter().filter_map(|c| c.area).sum();
    if let Some(total) = farm.total_area {
        let _ = writeln!(
            user,
            "Land: {:.1} ha total, {:.1} ha cultivated ({:.0}% utilization)",
            total,
            cultivated,
            ratio(cultivated, total) * 100.0
        );
    }

    let _ = writeln!(user, "\nCrops ({}):", snapshot.crops.len());
    for bucket in crop_distribution(&snapshot.crops) {
        let _ = writeln!(
            user,
            "- {}: {} planting(s), {:.1} ha",
            bucket.category, bucket.count, bucket.total_area
        );
    }
    for crop in &snapshot.crops {
        let _ = write!(user, "  * {} ({}) status={}", crop.name, crop.crop_type, crop.status);
        if let Some(date) = crop.expected_harvest_date {
            let _ = write!(user, " harvest={}", date);
        }
        if let Some(expected) = crop.expected_yield {
            let _ = write!(user, " expected_yield={:.1}", expected);
        }
        user.push('\n');
    }

    let _ = writeln!(user, "\nLivestock:");
    for bucket in livestock_health(&snapshot.livestock) {
        let _ = writeln!(
            user,
            "- {}: {} head, {} healthy ({:.0}%)",
            bucket.species,
            bucket.head_count,
            bucket.healthy_count,
            bucket.health_ratio * 100.0
        );
    }

    if !snapshot.recent_growth.is_empty() {
        let _ = writeln!(user, "\nRecent growth checkpoints:");
        for record in snapshot.recent_growth.iter().take(MAX_GROWTH_LINES) {
            let crop_name = snapshot
                .crops
                .iter()
                .find(|c| c.id == record.crop_id)
                .map_or("unknown crop", |c| c.name.as_str());
            let _ = write!(user, "- {} on {}", crop_name, record.recorded_at.date_naive());
            if let Some(height) = record.height_cm {
                let _ = write!(user, " height={:.1}cm", height);
            }
            if let Some(health) = &record.health_status {
                let _ = write!(user, " health={}", health);
            }
            if let Some(notes) = &record.notes {
                let _ = write!(user, " notes=\"{}\"", notes);
            }
            user.push('\n');
        }
    }

    user.push_str("\nGive 3 to 5 actionable insights for this farm.");

    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}

/// Build the prompt for a single livestock group.
pub fn build_livestock_prompt(farm: &Farm, livestock: &Livestock) -> Prompt {
    let mut user = String::new();

    let _ = writeln!(user, "Farm: {}", farm.name);
    let _ = writeln!(
        user,
        "Livestock group: {} ({}{})",
        livestock.name,
        livestock.species,
        livestock
            .breed
            .as_deref()
            .map(|b| format!(", {}", b))
            .unwrap_or_default()
    );
    let _ = writeln!(user, "Head count: {}", livestock.count);
    let _ = writeln!(user, "Health status: {}", livestock.health_status);
    if let Some(weight) = livestock.average_weight {
        let _ = writeln!(user, "Average weight: {:.1} kg", weight);
    }
    if let Some(notes) = &livestock.notes {
        let _ = writeln!(user, "Notes: {}", notes);
    }
    user.push_str("\nGive 2 to 4 insights on health, feeding and management for this group.");

    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    fn farm() -> Farm {
        let ts = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Farm {
            id: Uuid::from_u128(1),
            organization_id: Uuid::from_u128(2),
            name: "Willow Creek".into(),
            location: Some("Valley Rd".into()),
            total_area: Some(40.0),
            description: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn crop(name: &str, crop_type: &str, area: f64) -> Crop {
        let ts = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Crop {
            id: Uuid::new_v4(),
            farm_id: Uuid::from_u128(1),
            name: name.into(),
            crop_type: crop_type.into(),
            variety: None,
            area: Some(area),
            status: "growing".into(),
            planting_date: None,
            expected_harvest_date: NaiveDate::from_ymd_opt(2026, 7, 15),
            expected_yield: Some(12.0),
            actual_yield: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn herd(health: &str) -> Livestock {
        let ts = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Livestock {
            id: Uuid::new_v4(),
            farm_id: Uuid::from_u128(1),
            name: "North herd".into(),
            species: "Cattle".into(),
            breed: Some("Angus".into()),
            count: 30,
            health_status: health.into(),
            average_weight: Some(540.0),
            notes: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn farm_prompt_embeds_aggregates() {
        let snapshot = FarmSnapshot {
            farm: farm(),
            crops: vec![crop("Maize A", "Maize", 10.0), crop("Maize B", "Maize", 10.0)],
            livestock: vec![herd("healthy")],
            recent_growth: vec![],
        };

        let prompt = build_farm_prompt(&snapshot);
        assert!(prompt.user.contains("Willow Creek"));
        assert!(prompt.user.contains("20.0 ha cultivated (50% utilization)"));
        assert!(prompt.user.contains("Maize: 2 planting(s)"));
        assert!(prompt.user.contains("Cattle: 30 head, 30 healthy (100%)"));
        assert!(prompt.system.contains("\"insights\""));
    }

    #[test]
    fn livestock_prompt_mentions_group() {
        let prompt = build_livestock_prompt(&farm(), &herd("sick"));
        assert!(prompt.user.contains("North herd (Cattle, Angus)"));
        assert!(prompt.user.contains("Health status: sick"));
    }
}

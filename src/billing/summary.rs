use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use super::{Bill, EncounterType};
use crate::dosage::round2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillSummary {
    pub bill_id: String,
    pub encounter: EncounterType,
    pub created_at: DateTime<Utc>,
    pub line_count: usize,
    pub medicine_lines: usize,
    pub total: f64,
    pub categories: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub line_count: usize,
    pub total: f64,
}

impl BillSummary {
    pub fn from_bill(bill: &Bill) -> Self {
        let mut groups: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
        for line in bill.lines() {
            let entry = groups.entry(line.category.as_str()).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += line.total;
        }

        let categories = groups
            .into_iter()
            .map(|(category, (line_count, total))| CategoryTotal {
                category: category.to_string(),
                line_count,
                total: round2(total),
            })
            .collect();

        Self {
            bill_id: bill.id.clone(),
            encounter: bill.encounter,
            created_at: bill.created_at,
            line_count: bill.lines().len(),
            medicine_lines: bill
                .lines()
                .iter()
                .filter(|line| line.calculation_details.is_some())
                .count(),
            total: bill.total(),
            categories,
        }
    }
}

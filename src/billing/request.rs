use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use log::{info, warn};
use super::{Bill, EncounterType, Prescription};
use crate::config::price_list::PriceList;
use crate::dosage::DosageCalculator;
use crate::error::{BillingError, BillingResult};

/// A bill described as price-list references, as submitted by the bill form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub encounter: EncounterType,
    pub entries: Vec<BillEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BillEntry {
    Service {
        code: String,
        #[serde(default = "default_quantity")]
        quantity: u32,
    },
    Medicine {
        code: String,
        prescription: Prescription,
    },
}

fn default_quantity() -> u32 {
    1
}

impl BillEntry {
    pub fn code(&self) -> &str {
        match self {
            BillEntry::Service { code, .. } | BillEntry::Medicine { code, .. } => code,
        }
    }
}

/// An entry that could not be billed, with the reason shown to staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedEntry {
    pub index: usize,
    pub code: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembledBill {
    pub bill: Bill,
    pub rejected: Vec<RejectedEntry>,
}

impl BillRequest {
    pub fn from_file<P: AsRef<Path>>(path: P) -> BillingResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let request: BillRequest = serde_json::from_str(&content)?;
        Ok(request)
    }

    /// Builds the bill entry by entry. Entries that fail are reported in
    /// `rejected` and never appear on the bill.
    pub fn assemble(&self, price_list: &PriceList, calculator: &DosageCalculator) -> BillingResult<AssembledBill> {
        if self.entries.is_empty() {
            return Err(BillingError::Bill("Bill request has no entries".to_string()));
        }

        let id = self
            .id
            .clone()
            .unwrap_or_else(|| format!("BILL-{}", Utc::now().format("%Y%m%d%H%M%S")));
        let mut bill = Bill::new(id, self.encounter);
        let mut rejected = Vec::new();

        for (index, entry) in self.entries.iter().enumerate() {
            let outcome = match price_list.find(entry.code()) {
                None => Err(BillingError::Bill(format!("Unknown item code: {}", entry.code()))),
                Some(item) => match entry {
                    BillEntry::Service { quantity, .. } => bill.add_service(item, *quantity).map(|_| ()),
                    BillEntry::Medicine { prescription, .. } => {
                        bill.add_medicine(calculator, item, prescription).map(|_| ())
                    }
                },
            };

            if let Err(err) = outcome {
                warn!("Entry {} ({}) not billed: {}", index, entry.code(), err);
                rejected.push(RejectedEntry {
                    index,
                    code: entry.code().to_string(),
                    reason: err.to_string(),
                });
            }
        }

        info!(
            "Assembled bill {} with {} lines ({} rejected)",
            bill.id,
            bill.lines().len(),
            rejected.len()
        );

        Ok(AssembledBill { bill, rejected })
    }
}

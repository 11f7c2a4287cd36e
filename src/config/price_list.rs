use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;
use log::{debug, info};
use crate::error::{BillingError, BillingResult};
use crate::medicine::MedicineType;

/// One priced service or medicine from the hospital price list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceItem {
    pub code: String,
    pub name: String,
    pub category: String,
    /// Price per billing unit.
    pub price: f64,
    /// Medicine form; empty for services and supplies.
    pub med_type: Option<MedicineType>,
}

#[derive(Debug, Clone, Default)]
pub struct PriceList {
    items: Vec<PriceItem>,
}

impl PriceList {
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> BillingResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let list = Self::from_reader(file)?;
        info!("Loaded {} price list items from {:?}", list.items.len(), path);
        Ok(list)
    }

    /// Expects the header `code,name,category,price,med_type`.
    pub fn from_reader<R: Read>(reader: R) -> BillingResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut items = Vec::new();
        for record in csv_reader.deserialize() {
            let item: PriceItem = record?;
            debug!("Price list item {} ({})", item.code, item.name);
            items.push(item);
        }

        Self::new(items)
    }

    pub fn new(items: Vec<PriceItem>) -> BillingResult<Self> {
        let list = Self { items };
        list.validate()?;
        Ok(list)
    }

    pub fn validate(&self) -> BillingResult<()> {
        let mut seen = HashSet::new();

        for item in &self.items {
            if item.code.is_empty() {
                return Err(BillingError::PriceList(
                    format!("Item {:?} has an empty code", item.name)
                ));
            }

            if !seen.insert(item.code.as_str()) {
                return Err(BillingError::PriceList(
                    format!("Duplicate item code: {}", item.code)
                ));
            }

            if !item.price.is_finite() || item.price <= 0.0 {
                return Err(BillingError::PriceList(
                    format!("Item {} must have a positive price", item.code)
                ));
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, code: &str) -> Option<&PriceItem> {
        self.items.iter().find(|item| item.code == code)
    }

    /// Items grouped by category, categories in alphabetical order.
    pub fn by_category(&self) -> BTreeMap<&str, Vec<&PriceItem>> {
        let mut groups: BTreeMap<&str, Vec<&PriceItem>> = BTreeMap::new();
        for item in &self.items {
            groups.entry(item.category.as_str()).or_default().push(item);
        }
        groups
    }
}

pub mod request;
pub mod summary;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use log::{debug, info};
use crate::config::price_list::PriceItem;
use crate::dosage::{format_dosage_for_bill, round2, DosageCalculator, DosageRequest};
use crate::error::{BillingError, BillingResult};
use crate::medicine::{DoseFrequency, MedicineType};

pub use request::{AssembledBill, BillEntry, BillRequest, RejectedEntry};
pub use summary::{BillSummary, CategoryTotal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncounterType {
    Outpatient,
    Inpatient,
}

impl EncounterType {
    pub fn is_inpatient(&self) -> bool {
        matches!(self, EncounterType::Inpatient)
    }
}

/// Prescription details entered against a medicine item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub dose_prescribed: String,
    /// Overrides the medicine form recorded on the price list item.
    #[serde(default)]
    pub med_type: Option<MedicineType>,
    pub dose_frequency: DoseFrequency,
    pub total_days: i64,
    #[serde(default)]
    pub discharge: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillLine {
    pub code: String,
    pub category: String,
    pub description: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_price: f64,
    pub total: f64,
    /// Dosage trace for medicine lines.
    pub calculation_details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub id: String,
    pub encounter: EncounterType,
    pub created_at: DateTime<Utc>,
    lines: Vec<BillLine>,
}

impl Bill {
    pub fn new(id: impl Into<String>, encounter: EncounterType) -> Self {
        Self::with_timestamp(id, encounter, Utc::now())
    }

    pub fn with_timestamp(id: impl Into<String>, encounter: EncounterType, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            encounter,
            created_at,
            lines: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[BillLine] {
        &self.lines
    }

    pub fn add_service(&mut self, item: &PriceItem, quantity: u32) -> BillingResult<&BillLine> {
        if quantity == 0 {
            return Err(BillingError::Bill(
                format!("Quantity for {} must be at least 1", item.code)
            ));
        }

        let quantity = f64::from(quantity);
        self.push_line(BillLine {
            code: item.code.clone(),
            category: item.category.clone(),
            description: item.name.clone(),
            quantity,
            unit: "service".to_string(),
            unit_price: item.price,
            total: round2(item.price * quantity),
            calculation_details: None,
        })
    }

    /// Prices a medicine course and appends it. Nothing is appended on error.
    pub fn add_medicine(
        &mut self,
        calculator: &DosageCalculator,
        item: &PriceItem,
        prescription: &Prescription,
    ) -> BillingResult<&BillLine> {
        let med_type = prescription
            .med_type
            .clone()
            .or_else(|| item.med_type.clone())
            .ok_or_else(|| BillingError::Bill(
                format!("Item {} is not a medicine", item.code)
            ))?;

        let is_inpatient = self.encounter.is_inpatient();
        if prescription.discharge && !is_inpatient {
            debug!("Discharge flag on outpatient bill {} ignored for {}", self.id, item.code);
        }

        let request = DosageRequest {
            dose_prescribed: prescription.dose_prescribed.clone(),
            med_type,
            dose_frequency: prescription.dose_frequency,
            total_days: prescription.total_days,
            base_price: item.price,
            is_inpatient,
            is_discharge_medicine: is_inpatient && prescription.discharge,
        };

        let result = calculator.calculate(&request)?;
        let description = format_dosage_for_bill(
            &item.name,
            &request.dose_prescribed,
            &request.med_type,
            request.dose_frequency,
            request.total_days,
            &result,
        );

        self.push_line(BillLine {
            code: item.code.clone(),
            category: item.category.clone(),
            description,
            quantity: result.total_quantity,
            unit: result.quantity_unit,
            unit_price: result.price_per_unit,
            total: result.total_price,
            calculation_details: Some(result.calculation_details),
        })
    }

    pub fn remove_line(&mut self, index: usize) -> BillingResult<BillLine> {
        if index >= self.lines.len() {
            return Err(BillingError::Bill(
                format!("Bill {} has no line {}", self.id, index)
            ));
        }
        Ok(self.lines.remove(index))
    }

    pub fn total(&self) -> f64 {
        round2(self.lines.iter().map(|line| line.total).sum())
    }

    pub fn summary(&self) -> BillSummary {
        BillSummary::from_bill(self)
    }

    fn push_line(&mut self, line: BillLine) -> BillingResult<&BillLine> {
        info!("Bill {}: {} = {:.2}", self.id, line.description, line.total);
        self.lines.push(line);
        self.lines
            .last()
            .ok_or_else(|| BillingError::Bill("Line was not appended".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn item(code: &str, category: &str, price: f64, med_type: Option<MedicineType>) -> PriceItem {
        PriceItem {
            code: code.to_string(),
            name: format!("{} item", code),
            category: category.to_string(),
            price,
            med_type,
        }
    }

    fn syrup_prescription(discharge: bool) -> Prescription {
        Prescription {
            dose_prescribed: "10".to_string(),
            med_type: None,
            dose_frequency: DoseFrequency::Bid,
            total_days: 7,
            discharge,
        }
    }

    #[test]
    fn test_service_and_medicine_lines() {
        let calculator = DosageCalculator::standard();
        let mut bill = Bill::new("B-1", EncounterType::Outpatient);

        bill.add_service(&item("LAB", "Laboratory", 350.0, None), 2).unwrap();
        let line = bill
            .add_medicine(&calculator, &item("AMX", "Pharmacy", 120.0, Some(MedicineType::Syrup)), &syrup_prescription(false))
            .unwrap();
        assert_eq!(line.quantity, 2.0);
        assert_eq!(line.unit, "bottle");
        assert_eq!(line.description, "AMX item - 10 Syrup, Twice daily, 7 days (Total: 2 bottle)");

        assert_eq!(bill.lines().len(), 2);
        assert_eq!(bill.total(), 940.0);
    }

    #[test]
    fn test_inpatient_ward_and_discharge_lines() {
        let calculator = DosageCalculator::standard();
        let mut bill = Bill::new("B-2", EncounterType::Inpatient);
        let syrup = item("AMX", "Pharmacy", 120.0, Some(MedicineType::Syrup));

        let ward = bill.add_medicine(&calculator, &syrup, &syrup_prescription(false)).unwrap();
        assert_relative_eq!(ward.quantity, 1.4, epsilon = 1e-9);
        let discharge = bill.add_medicine(&calculator, &syrup, &syrup_prescription(true)).unwrap();
        assert_eq!(discharge.quantity, 2.0);

        assert_relative_eq!(bill.total(), 408.0, epsilon = 1e-9);
    }

    #[test]
    fn test_discharge_flag_ignored_for_outpatients() {
        let calculator = DosageCalculator::standard();
        let mut bill = Bill::new("B-3", EncounterType::Outpatient);
        let syrup = item("AMX", "Pharmacy", 120.0, Some(MedicineType::Syrup));
        let line = bill.add_medicine(&calculator, &syrup, &syrup_prescription(true)).unwrap();
        assert_eq!(line.quantity, 2.0);
    }

    #[test]
    fn test_failed_calculation_adds_nothing() {
        let calculator = DosageCalculator::standard();
        let mut bill = Bill::new("B-4", EncounterType::Inpatient);
        let mut prescription = syrup_prescription(false);
        prescription.dose_prescribed = "ten".to_string();

        let err = bill
            .add_medicine(&calculator, &item("AMX", "Pharmacy", 120.0, Some(MedicineType::Syrup)), &prescription)
            .unwrap_err();
        assert!(matches!(err, BillingError::InvalidDose(_)));
        assert!(bill.lines().is_empty());
        assert_eq!(bill.total(), 0.0);
    }

    #[test]
    fn test_service_item_needs_med_type_for_medicine_line() {
        let calculator = DosageCalculator::standard();
        let mut bill = Bill::new("B-5", EncounterType::Outpatient);
        let err = bill
            .add_medicine(&calculator, &item("LAB", "Laboratory", 350.0, None), &syrup_prescription(false))
            .unwrap_err();
        assert!(matches!(err, BillingError::Bill(_)));

        let mut prescription = syrup_prescription(false);
        prescription.med_type = Some(MedicineType::Capsule);
        let line = bill
            .add_medicine(&calculator, &item("CAP", "Pharmacy", 5.0, None), &prescription)
            .unwrap();
        assert_eq!(line.unit, "capsule");
        assert_eq!(line.quantity, 140.0);
    }

    #[test]
    fn test_zero_service_quantity_rejected() {
        let mut bill = Bill::new("B-6", EncounterType::Outpatient);
        assert!(bill.add_service(&item("LAB", "Laboratory", 350.0, None), 0).is_err());
        assert!(bill.lines().is_empty());
    }

    #[test]
    fn test_remove_line() {
        let mut bill = Bill::new("B-7", EncounterType::Outpatient);
        bill.add_service(&item("LAB", "Laboratory", 350.0, None), 1).unwrap();
        bill.add_service(&item("XRAY", "Radiology", 800.0, None), 1).unwrap();

        let removed = bill.remove_line(0).unwrap();
        assert_eq!(removed.code, "LAB");
        assert_eq!(bill.total(), 800.0);
        assert!(bill.remove_line(5).is_err());
    }
}

use super::{ceil_units, format_amount, DoseCourse, QuantityRule, ResolvedQuantity};
use crate::error::BillingResult;
use crate::medicine::RuleTable;

/// Mg, mcg, meq, ampoules, tubes, formula packs, plain quantities and any
/// unregistered form. Always rounded up, whatever the partial flag says.
#[derive(Debug, Clone, Copy)]
pub struct GenericQuantity;

impl QuantityRule for GenericQuantity {
    fn resolve(&self, course: &DoseCourse, rules: &RuleTable) -> BillingResult<ResolvedQuantity> {
        let unit = rules
            .get(course.med_type)
            .map(|rule| rule.unit.to_string())
            .unwrap_or_else(|| course.med_type.as_str().to_lowercase());

        let raw_total = course.raw_total();
        let quantity = ceil_units(raw_total);

        Ok(ResolvedQuantity {
            details: format!(
                "{} = {} {} -> rounded up = {} {}",
                course.describe(),
                format_amount(raw_total),
                unit,
                format_amount(quantity),
                unit,
            ),
            quantity,
            unit,
            partial_applied: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medicine::{DoseFrequency, MedicineType};

    fn resolve(dose: f64, med_type: MedicineType, frequency: DoseFrequency, total_days: u32) -> ResolvedQuantity {
        let course = DoseCourse {
            dose,
            med_type: &med_type,
            frequency,
            total_days,
            is_inpatient: true,
            is_discharge_medicine: false,
        };
        GenericQuantity.resolve(&course, RuleTable::standard()).unwrap()
    }

    #[test]
    fn test_paracetamol_mg_course() {
        let resolved = resolve(500.0, MedicineType::Mg, DoseFrequency::Tid, 5);
        assert_eq!(resolved.quantity, 7500.0);
        assert_eq!(resolved.unit, "mg");
    }

    #[test]
    fn test_partial_units_still_round_up() {
        let resolved = resolve(0.5, MedicineType::Mcg, DoseFrequency::Qod, 3);
        assert_eq!(resolved.quantity, 1.0);
        assert_eq!(resolved.unit, "mcg");
    }

    #[test]
    fn test_container_units() {
        assert_eq!(resolve(1.0, MedicineType::Amp, DoseFrequency::Bid, 3).unit, "ampoule");
        assert_eq!(resolve(1.0, MedicineType::Tube, DoseFrequency::Qweek, 10).quantity, 2.0);
        assert_eq!(resolve(1.0, MedicineType::Formula, DoseFrequency::Qd, 1).unit, "pack");
        assert_eq!(resolve(3.0, MedicineType::Qty, DoseFrequency::Qd, 1).unit, "unit");
    }

    #[test]
    fn test_unregistered_unit_is_lowercased_name() {
        let resolved = resolve(1.0, MedicineType::Unregistered("Patch".to_string()), DoseFrequency::Qd, 3);
        assert_eq!(resolved.unit, "patch");
        assert_eq!(resolved.quantity, 3.0);
        assert!(resolved.details.ends_with("rounded up = 3 patch"));
    }
}

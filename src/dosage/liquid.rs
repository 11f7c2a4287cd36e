use log::warn;
use super::{ceil_units, format_amount, round2, DoseCourse, QuantityRule, ResolvedQuantity};
use crate::error::{BillingError, BillingResult};
use crate::medicine::{MedicineCategory, MedicineTypeRule, RuleTable};

/// Smallest fractional amount billed; a positive course never bills zero.
const MIN_PARTIAL_AMOUNT: f64 = 0.01;

/// Syrups and solutions are billed per bottle; bare volume units per unit.
#[derive(Debug, Clone, Copy)]
pub struct LiquidQuantity;

impl LiquidQuantity {
    fn fractional(value: f64, unit: &str) -> (f64, &'static str) {
        let rounded = round2(value);
        if rounded < MIN_PARTIAL_AMOUNT {
            warn!("{} {} rounds to zero; billing the minimum {} {}", value, unit, MIN_PARTIAL_AMOUNT, unit);
            (MIN_PARTIAL_AMOUNT, " (minimum billable amount)")
        } else {
            (rounded, "")
        }
    }

    fn bottles(
        course: &DoseCourse,
        rule: &MedicineTypeRule,
        bottle_ml: f64,
        total_ml: f64,
    ) -> ResolvedQuantity {
        // Ward stock can be metered; anything leaving the hospital is sealed.
        let partial = course.is_inpatient
            && !course.is_discharge_medicine
            && rule.can_be_partial_inpatient.unwrap_or(false);

        let ratio = total_ml / bottle_ml;
        let (quantity, rounding, note) = if partial {
            let (quantity, note) = Self::fractional(ratio, rule.unit);
            (quantity, "partial bottle from ward stock", note)
        } else {
            (ceil_units(ratio), "rounded up to full bottles", "")
        };

        let details = format!(
            "{} = {} ml -> {} ml / {} ml per bottle = {} -> {} = {} {}{}",
            course.describe(),
            format_amount(total_ml),
            format_amount(total_ml),
            format_amount(bottle_ml),
            format_amount(ratio),
            rounding,
            format_amount(quantity),
            rule.unit,
            note,
        );

        ResolvedQuantity {
            quantity,
            unit: rule.unit.to_string(),
            partial_applied: Some(partial),
            details,
        }
    }

    fn volume(course: &DoseCourse, rule: &MedicineTypeRule, total_ml: f64) -> ResolvedQuantity {
        let (quantity, note) = Self::fractional(course.raw_total(), rule.unit);
        let details = format!(
            "{} = {} {} ({} ml){}",
            course.describe(),
            format_amount(quantity),
            rule.unit,
            format_amount(total_ml),
            note,
        );

        ResolvedQuantity {
            quantity,
            unit: rule.unit.to_string(),
            partial_applied: None,
            details,
        }
    }
}

impl QuantityRule for LiquidQuantity {
    fn resolve(&self, course: &DoseCourse, rules: &RuleTable) -> BillingResult<ResolvedQuantity> {
        let invalid = || BillingError::InvalidMedicineType(
            format!("Invalid liquid medicine type: {}", course.med_type)
        );

        if course.med_type.category() != MedicineCategory::Liquid {
            return Err(invalid());
        }
        let rule = rules.get(course.med_type).ok_or_else(invalid)?;
        let total_ml = rules.convert_to_ml(course.raw_total(), course.med_type);

        match rule.standard_bottle_ml {
            Some(bottle_ml) => Ok(Self::bottles(course, rule, bottle_ml, total_ml)),
            None if rules.ml_per_unit(course.med_type).is_some() => {
                Ok(Self::volume(course, rule, total_ml))
            }
            None => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medicine::{DoseFrequency, MedicineType};
    use approx::assert_relative_eq;

    fn course(
        dose: f64,
        med_type: &MedicineType,
        frequency: DoseFrequency,
        total_days: u32,
        is_inpatient: bool,
        is_discharge_medicine: bool,
    ) -> DoseCourse<'_> {
        DoseCourse {
            dose,
            med_type,
            frequency,
            total_days,
            is_inpatient,
            is_discharge_medicine,
        }
    }

    #[test]
    fn test_one_ml_still_bills_a_bottle_outpatient() {
        let syrup = MedicineType::Syrup;
        let resolved = LiquidQuantity
            .resolve(&course(1.0, &syrup, DoseFrequency::Qd, 1, false, false), RuleTable::standard())
            .unwrap();
        assert_eq!(resolved.quantity, 1.0);
        assert_eq!(resolved.unit, "bottle");
        assert_eq!(resolved.partial_applied, Some(false));
    }

    #[test]
    fn test_ward_solution_is_metered() {
        let solution = MedicineType::Solution;
        let resolved = LiquidQuantity
            .resolve(&course(5.0, &solution, DoseFrequency::Tid, 3, true, false), RuleTable::standard())
            .unwrap();
        assert_relative_eq!(resolved.quantity, 0.45, epsilon = 1e-9);
        assert_eq!(resolved.partial_applied, Some(true));
        assert!(resolved.details.contains("partial bottle from ward stock"));
    }

    #[test]
    fn test_bottle_invariant_holds() {
        let syrup = MedicineType::Syrup;
        for dose in [1.0, 2.5, 5.0, 7.5, 10.0, 15.0] {
            for frequency in DoseFrequency::ALL {
                for days in [1, 3, 7, 14, 30] {
                    for (inpatient, discharge) in [(false, false), (false, true), (true, true), (true, false)] {
                        let c = course(dose, &syrup, frequency, days, inpatient, discharge);
                        let resolved = LiquidQuantity.resolve(&c, RuleTable::standard()).unwrap();
                        let ratio = c.raw_total() / 100.0;
                        let expected = if inpatient && !discharge {
                            round2(ratio).max(MIN_PARTIAL_AMOUNT)
                        } else {
                            ceil_units(ratio)
                        };
                        assert_eq!(resolved.quantity, expected);
                    }
                }
            }
        }
    }

    #[test]
    fn test_tiny_ward_course_bills_minimum_fraction() {
        let syrup = MedicineType::Syrup;
        let resolved = LiquidQuantity
            .resolve(&course(0.4, &syrup, DoseFrequency::Qd, 1, true, false), RuleTable::standard())
            .unwrap();
        assert_eq!(resolved.quantity, 0.01);
        assert!(resolved.details.ends_with("= 0.01 bottle (minimum billable amount)"));

        let ml = MedicineType::MlCc;
        let resolved = LiquidQuantity
            .resolve(&course(0.001, &ml, DoseFrequency::Qd, 1, false, false), RuleTable::standard())
            .unwrap();
        assert_eq!(resolved.quantity, 0.01);
    }

    #[test]
    fn test_spoon_units_keep_their_unit() {
        let tsp = MedicineType::Tsp;
        let resolved = LiquidQuantity
            .resolve(&course(1.5, &tsp, DoseFrequency::Bid, 3, false, false), RuleTable::standard())
            .unwrap();
        assert_eq!(resolved.quantity, 9.0);
        assert_eq!(resolved.unit, "tsp");
        assert!(resolved.details.ends_with("= 9 tsp (45 ml)"));

        let tbsp = MedicineType::Tbsp;
        let resolved = LiquidQuantity
            .resolve(&course(1.0, &tbsp, DoseFrequency::Qd, 2, false, false), RuleTable::standard())
            .unwrap();
        assert_eq!(resolved.quantity, 2.0);
        assert!(resolved.details.contains("(30 ml)"));
    }

    #[test]
    fn test_ml_is_never_rounded_up() {
        let ml = MedicineType::MlCc;
        let resolved = LiquidQuantity
            .resolve(&course(2.5, &ml, DoseFrequency::Qod, 3, false, false), RuleTable::standard())
            .unwrap();
        assert_eq!(resolved.quantity, 3.75);
        assert_eq!(resolved.unit, "ml");
        assert_eq!(resolved.partial_applied, None);
    }

    #[test]
    fn test_rejects_non_liquid_type() {
        let capsule = MedicineType::Capsule;
        let err = LiquidQuantity
            .resolve(&course(1.0, &capsule, DoseFrequency::Qd, 1, false, false), RuleTable::standard())
            .unwrap_err();
        assert!(matches!(err, BillingError::InvalidMedicineType(_)));
    }
}

use super::{format_amount, DosageResult};
use crate::medicine::{DoseFrequency, MedicineType};

/// Renders the bill line for a priced prescription, e.g.
/// `Paracetamol 500mg - 500 Mg, Three times daily, 5 days (Total: 7500 mg)`.
pub fn format_dosage_for_bill(
    medicine_name: &str,
    dose_prescribed: &str,
    med_type: &MedicineType,
    dose_frequency: DoseFrequency,
    total_days: i64,
    result: &DosageResult,
) -> String {
    format!(
        "{} - {} {}, {}, {} {} (Total: {} {})",
        medicine_name.trim(),
        dose_prescribed.trim(),
        med_type,
        dose_frequency.label(),
        total_days,
        if total_days == 1 { "day" } else { "days" },
        format_amount(result.total_quantity),
        result.quantity_unit,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(total_quantity: f64, quantity_unit: &str) -> DosageResult {
        DosageResult {
            total_quantity,
            quantity_unit: quantity_unit.to_string(),
            price_per_unit: 1.0,
            total_price: total_quantity,
            is_partial_allowed: true,
            is_registered_type: true,
            calculation_details: String::new(),
        }
    }

    #[test]
    fn test_paracetamol_line() {
        let line = format_dosage_for_bill(
            "Paracetamol 500mg",
            "500",
            &MedicineType::Mg,
            DoseFrequency::Tid,
            5,
            &result(15.0, "mg"),
        );
        assert_eq!(line, "Paracetamol 500mg - 500 Mg, Three times daily, 5 days (Total: 15 mg)");
    }

    #[test]
    fn test_partial_bottle_single_day() {
        let line = format_dosage_for_bill(
            "Amoxicillin Suspension",
            " 10 ",
            &MedicineType::Syrup,
            DoseFrequency::Qod,
            1,
            &result(1.4, "bottle"),
        );
        assert_eq!(line, "Amoxicillin Suspension - 10 Syrup, Every other day, 1 day (Total: 1.4 bottle)");
    }

    #[test]
    fn test_every_frequency_has_a_label() {
        let labels: Vec<&str> = DoseFrequency::ALL.iter().map(|f| f.label()).collect();
        assert_eq!(
            labels,
            vec![
                "Once daily",
                "Twice daily",
                "Three times daily",
                "Four times daily",
                "Every other day",
                "Once weekly",
            ]
        );
    }
}

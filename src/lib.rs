//! Hospital billing calculator.
//!
//! The core is [`dosage::calculate_medicine_dosage`]: a pure function turning
//! a prescription (dose, form, frequency, days, encounter context) into a
//! billable quantity and price. Price lists, bill assembly and output call
//! into it with plain data.
//!
//! ```rust
//! use hospital_billing::dosage::{calculate_medicine_dosage, DosageRequest};
//! use hospital_billing::medicine::{DoseFrequency, MedicineType};
//!
//! let request = DosageRequest {
//!     dose_prescribed: "10".to_string(),
//!     med_type: MedicineType::Syrup,
//!     dose_frequency: DoseFrequency::Bid,
//!     total_days: 7,
//!     base_price: 120.0,
//!     is_inpatient: false,
//!     is_discharge_medicine: false,
//! };
//!
//! let result = calculate_medicine_dosage(&request).unwrap();
//! assert_eq!(result.total_quantity, 2.0);
//! assert_eq!(result.total_price, 240.0);
//! ```

pub mod billing;
pub mod config;
pub mod dosage;
pub mod error;
pub mod medicine;
pub mod output;

pub use dosage::{calculate_medicine_dosage, format_dosage_for_bill, DosageRequest, DosageResult};
pub use error::{BillingError, BillingResult};

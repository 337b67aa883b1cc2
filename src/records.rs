//! Clinical records that billing reads but never writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::{get_list, RecordStore, LAB_ORDERS, PATIENTS, PRESCRIPTIONS};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Patient {
    pub id: String,
    #[serde(default)]
    pub patient_no: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LabOrderStatus {
    #[default]
    Ordered,
    SampleTaken,
    ResultReady,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LabOrder {
    pub id: String,
    pub patient_id: String,
    #[serde(default)]
    pub patient_name: String,
    pub test_name: String,
    #[serde(default)]
    pub status: LabOrderStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Drug {
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub instructions: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Prescription {
    pub id: String,
    pub patient_id: String,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub visit_id: Option<String>,
    #[serde(default)]
    pub drugs: Vec<Drug>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

pub fn patients<S: RecordStore + ?Sized>(store: &S) -> Result<Vec<Patient>> {
    get_list(store, PATIENTS)
}

pub fn find_patient<S: RecordStore + ?Sized>(store: &S, patient_id: &str) -> Result<Option<Patient>> {
    Ok(patients(store)?.into_iter().find(|p| p.id == patient_id))
}

pub fn lab_orders_for<S: RecordStore + ?Sized>(store: &S, patient_id: &str) -> Result<Vec<LabOrder>> {
    let orders: Vec<LabOrder> = get_list(store, LAB_ORDERS)?;
    Ok(orders
        .into_iter()
        .filter(|o| o.patient_id == patient_id)
        .collect())
}

pub fn prescriptions_for<S: RecordStore + ?Sized>(
    store: &S,
    patient_id: &str,
) -> Result<Vec<Prescription>> {
    let prescriptions: Vec<Prescription> = get_list(store, PRESCRIPTIONS)?;
    Ok(prescriptions
        .into_iter()
        .filter(|p| p.patient_id == patient_id)
        .collect())
}

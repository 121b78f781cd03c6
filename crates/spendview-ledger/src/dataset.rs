//! JSON dataset loading

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::TransportError;
use crate::types::{Employee, Transaction};

/// Employees and transactions as stored on disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Dataset {
    /// Parse a dataset from JSON text
    pub fn from_json(content: &str) -> Result<Self, TransportError> {
        let dataset: Dataset = serde_json::from_str(content)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Load a dataset file
    pub async fn load(path: &Path) -> Result<Self, TransportError> {
        let content = tokio::fs::read_to_string(path).await?;
        let dataset = Self::from_json(&content)?;
        log::info!(
            target: "spendview::ledger",
            "Loaded dataset {}: {} employees, {} transactions",
            path.display(),
            dataset.employees.len(),
            dataset.transactions.len()
        );
        Ok(dataset)
    }

    /// Reject duplicate ids and employees clashing with the sentinel
    pub fn validate(&self) -> Result<(), TransportError> {
        let mut employee_ids = HashSet::new();
        for employee in &self.employees {
            if employee.is_all_employees() {
                return Err(TransportError::Dataset {
                    message: "employee id cannot be empty".to_string(),
                });
            }
            if !employee_ids.insert(employee.id.as_str()) {
                return Err(TransportError::Dataset {
                    message: format!("duplicate employee id: {}", employee.id),
                });
            }
        }

        let mut transaction_ids = HashSet::new();
        for transaction in &self.transactions {
            if !transaction_ids.insert(transaction.id.as_str()) {
                return Err(TransportError::Dataset {
                    message: format!("duplicate transaction id: {}", transaction.id),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "employees": [
            { "id": "e1", "firstName": "Ada", "lastName": "Lovelace" }
        ],
        "transactions": [
            {
                "id": "t1", "amount": 12.0, "merchant": "Uber", "date": "2022-03-01",
                "approved": true,
                "employee": { "id": "e1", "firstName": "Ada", "lastName": "Lovelace" }
            }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let dataset = Dataset::from_json(SAMPLE).unwrap();
        assert_eq!(dataset.employees.len(), 1);
        assert_eq!(dataset.transactions[0].merchant, "Uber");
    }

    #[test]
    fn test_duplicate_transaction_rejected() {
        let mut dataset = Dataset::from_json(SAMPLE).unwrap();
        let copy = dataset.transactions[0].clone();
        dataset.transactions.push(copy);
        assert!(matches!(dataset.validate(), Err(TransportError::Dataset { .. })));
    }

    #[test]
    fn test_sentinel_id_rejected() {
        let dataset = Dataset {
            employees: vec![Employee::all_employees()],
            transactions: vec![],
        };
        assert!(dataset.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Dataset::from_json("{ not json"),
            Err(TransportError::Dataset { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = Dataset::load(Path::new("/nonexistent/ledger.json")).await;
        assert!(matches!(result, Err(TransportError::IoError(_))));
    }
}

//! Option lists rendered into the page by the server, handed to controllers at
//! construction and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::schema::OptionSource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruckOption {
    pub truck_num: String,
    #[serde(default)]
    pub owner_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankOption {
    pub bank_id: String,
    pub bank_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn same(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupData {
    pub suppliers: Vec<String>,
    pub factories: Vec<String>,
    pub zones: Vec<String>,
    pub representatives: Vec<String>,
    pub trucks: Vec<TruckOption>,
    pub banks: Vec<BankOption>,
}

impl LookupData {
    /// Banks submit their id and show their name; every other list uses the
    /// name for both.
    pub fn options(&self, source: OptionSource) -> Vec<SelectOption> {
        match source {
            OptionSource::Suppliers => names(&self.suppliers),
            OptionSource::Factories => names(&self.factories),
            OptionSource::Zones => names(&self.zones),
            OptionSource::Representatives => names(&self.representatives),
            OptionSource::Trucks => self
                .trucks
                .iter()
                .map(|truck| SelectOption::same(truck.truck_num.clone()))
                .collect(),
            OptionSource::Banks => self
                .banks
                .iter()
                .map(|bank| SelectOption {
                    value: bank.bank_id.clone(),
                    label: bank.bank_name.clone(),
                })
                .collect(),
        }
    }

    pub fn truck_owner(&self, truck_num: &str) -> Option<&str> {
        self.trucks
            .iter()
            .find(|truck| truck.truck_num == truck_num)
            .map(|truck| truck.owner_name.as_str())
    }

    /// Value a derived control shows for `key`; empty when nothing maps.
    pub fn derive(&self, source: OptionSource, key: &str) -> String {
        match source {
            OptionSource::Trucks => self.truck_owner(key).unwrap_or_default().to_string(),
            OptionSource::Banks => self
                .banks
                .iter()
                .find(|bank| bank.bank_id == key)
                .map(|bank| bank.bank_name.clone())
                .unwrap_or_default(),
            other => self
                .options(other)
                .into_iter()
                .find(|option| option.value == key)
                .map(|option| option.label)
                .unwrap_or_default(),
        }
    }
}

fn names(values: &[String]) -> Vec<SelectOption> {
    values.iter().cloned().map(SelectOption::same).collect()
}

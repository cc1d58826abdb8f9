//! Company, bank details and user account records.

use crate::model::calendar::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CompanyId = Uuid;
pub type BankDetailsId = Uuid;

/// Bank account attached to a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub uuid: BankDetailsId,
    pub iban: String,
    pub is_active: bool,
}

impl BankDetails {
    pub fn new(iban: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            iban: iban.into(),
            is_active: true,
        }
    }
}

/// Legal entity managed by the ERP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub uuid: CompanyId,
    /// Short unique code, e.g. `ACME`.
    pub code: String,
    pub name: String,
    pub bank_details: Vec<BankDetails>,
}

impl Company {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            bank_details: Vec::new(),
        }
    }

    /// Number of bank details currently flagged active.
    pub fn active_bank_details_count(&self) -> usize {
        self.bank_details
            .iter()
            .filter(|details| details.is_active)
            .count()
    }
}

/// Login account. `active_company` is the company the user currently works in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uuid: UserId,
    pub login: String,
    pub full_name: String,
    pub active_company: Option<CompanyId>,
}

impl User {
    pub fn new(login: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            login: login.into(),
            full_name: full_name.into(),
            active_company: None,
        }
    }
}

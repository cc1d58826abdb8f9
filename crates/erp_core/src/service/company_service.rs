//! Company use-cases.
//!
//! # Responsibility
//! - Keep the multi-bank setting consistent with company bank accounts.
//! - Resolve the company a user-facing operation should default to.

use crate::model::calendar::UserId;
use crate::model::company::{Company, CompanyId};
use crate::model::settings::MANAGE_MULTI_BANKS;
use crate::repo::company_repo::CompanyRepository;
use crate::repo::settings_repo::SettingsRepository;
use crate::repo::RepoResult;
use log::info;

/// Company use-cases over company and settings repositories.
pub struct CompanyService<C: CompanyRepository, S: SettingsRepository> {
    companies: C,
    settings: S,
}

impl<C: CompanyRepository, S: SettingsRepository> CompanyService<C, S> {
    /// Creates a service using the provided repository implementations.
    pub fn new(companies: C, settings: S) -> Self {
        Self {
            companies,
            settings,
        }
    }

    /// Turns on multi-bank management once a company holds more than one
    /// active bank account.
    ///
    /// Returns `true` when the setting was switched on by this call. The
    /// setting is never switched off here.
    pub fn check_multi_banks(&self, company: &Company) -> RepoResult<bool> {
        if company.active_bank_details_count() <= 1 {
            return Ok(false);
        }

        if self.settings.load_settings()?.manage_multi_banks {
            return Ok(false);
        }

        self.settings.set_flag(MANAGE_MULTI_BANKS, true)?;
        info!(
            "event=settings_update module=base status=ok key={} value=true company={}",
            MANAGE_MULTI_BANKS, company.code
        );
        Ok(true)
    }

    /// Resolves the default company.
    ///
    /// Order:
    /// 1. the company with `company_id`, when given and present;
    /// 2. the active company of `user_id`;
    /// 3. the only company, when exactly one exists.
    pub fn default_company(
        &self,
        company_id: Option<CompanyId>,
        user_id: Option<UserId>,
    ) -> RepoResult<Option<Company>> {
        if let Some(company_id) = company_id {
            if let Some(company) = self.companies.get_company(company_id)? {
                return Ok(Some(company));
            }
        }

        if let Some(user_id) = user_id {
            if let Some(company) = self.companies.user_active_company(user_id)? {
                return Ok(Some(company));
            }
        }

        self.companies.single_company()
    }
}

//! Company and user repositories with SQLite implementations.
//!
//! # Invariants
//! - A loaded `Company` always carries its full bank-details list, ordered
//!   by IBAN.
//! - `create_company` writes the company and its bank details with plain
//!   statements; callers needing atomicity wrap it in a transaction.

use crate::model::calendar::UserId;
use crate::model::company::{BankDetails, BankDetailsId, Company, CompanyId, User};
use crate::repo::{bool_to_int, parse_bool, parse_optional_uuid, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

pub trait CompanyRepository {
    fn create_company(&self, company: &Company) -> RepoResult<CompanyId>;
    fn add_bank_details(&self, company_id: CompanyId, details: &BankDetails) -> RepoResult<()>;
    fn set_bank_details_active(&self, id: BankDetailsId, is_active: bool) -> RepoResult<()>;
    fn get_company(&self, id: CompanyId) -> RepoResult<Option<Company>>;
    fn count_companies(&self) -> RepoResult<u64>;
    /// Returns the only company when exactly one exists.
    fn single_company(&self) -> RepoResult<Option<Company>>;
    /// Returns the company the user currently works in, if any.
    fn user_active_company(&self, user_id: UserId) -> RepoResult<Option<Company>>;
}

pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn set_active_company(&self, user_id: UserId, company_id: Option<CompanyId>)
        -> RepoResult<()>;
}

pub struct SqliteCompanyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCompanyRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load_company(&self, id_text: &str) -> RepoResult<Option<Company>> {
        let header = self
            .conn
            .query_row(
                "SELECT uuid, code, name FROM companies WHERE uuid = ?1;",
                [id_text],
                |row| {
                    Ok((
                        row.get::<_, String>("uuid")?,
                        row.get::<_, String>("code")?,
                        row.get::<_, String>("name")?,
                    ))
                },
            )
            .optional()?;

        let Some((uuid_text, code, name)) = header else {
            return Ok(None);
        };

        Ok(Some(Company {
            uuid: parse_uuid(&uuid_text, "companies.uuid")?,
            code,
            name,
            bank_details: self.load_bank_details(&uuid_text)?,
        }))
    }

    fn load_bank_details(&self, company_uuid: &str) -> RepoResult<Vec<BankDetails>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, iban, is_active
             FROM bank_details
             WHERE company_uuid = ?1
             ORDER BY iban ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([company_uuid])?;
        let mut details = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            details.push(BankDetails {
                uuid: parse_uuid(&uuid_text, "bank_details.uuid")?,
                iban: row.get("iban")?,
                is_active: parse_bool(row.get("is_active")?, "bank_details.is_active")?,
            });
        }
        Ok(details)
    }
}

impl CompanyRepository for SqliteCompanyRepository<'_> {
    fn create_company(&self, company: &Company) -> RepoResult<CompanyId> {
        self.conn.execute(
            "INSERT INTO companies (uuid, code, name) VALUES (?1, ?2, ?3);",
            params![
                company.uuid.to_string(),
                company.code.as_str(),
                company.name.as_str()
            ],
        )?;
        for details in &company.bank_details {
            self.add_bank_details(company.uuid, details)?;
        }
        Ok(company.uuid)
    }

    fn add_bank_details(&self, company_id: CompanyId, details: &BankDetails) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO bank_details (uuid, company_uuid, iban, is_active)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                details.uuid.to_string(),
                company_id.to_string(),
                details.iban.as_str(),
                bool_to_int(details.is_active),
            ],
        )?;
        Ok(())
    }

    fn set_bank_details_active(&self, id: BankDetailsId, is_active: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE bank_details SET is_active = ?1 WHERE uuid = ?2;",
            params![bool_to_int(is_active), id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "bank details",
                id,
            });
        }
        Ok(())
    }

    fn get_company(&self, id: CompanyId) -> RepoResult<Option<Company>> {
        self.load_company(&id.to_string())
    }

    fn count_companies(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM companies;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative company count `{count}`")))
    }

    fn single_company(&self) -> RepoResult<Option<Company>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid FROM companies ORDER BY uuid ASC LIMIT 2;")?;
        let mut rows = stmt.query([])?;
        let mut ids = Vec::with_capacity(2);
        while let Some(row) = rows.next()? {
            ids.push(row.get::<_, String>(0)?);
        }

        match ids.as_slice() {
            [only] => self.load_company(only),
            _ => Ok(None),
        }
    }

    fn user_active_company(&self, user_id: UserId) -> RepoResult<Option<Company>> {
        let company_uuid: Option<String> = self
            .conn
            .query_row(
                "SELECT active_company_uuid FROM users WHERE uuid = ?1;",
                [user_id.to_string()],
                |row| row.get(0),
            )
            .optional()?
            .flatten();

        match company_uuid {
            Some(id_text) => self.load_company(&id_text),
            None => Ok(None),
        }
    }
}

pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        self.conn.execute(
            "INSERT INTO users (uuid, login, full_name, active_company_uuid)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                user.uuid.to_string(),
                user.login.as_str(),
                user.full_name.as_str(),
                user.active_company.map(|id| id.to_string()),
            ],
        )?;
        Ok(user.uuid)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                "SELECT uuid, login, full_name, active_company_uuid FROM users WHERE uuid = ?1;",
                [id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>("uuid")?,
                        row.get::<_, String>("login")?,
                        row.get::<_, String>("full_name")?,
                        row.get::<_, Option<String>>("active_company_uuid")?,
                    ))
                },
            )
            .optional()?;

        let Some((uuid_text, login, full_name, company_text)) = row else {
            return Ok(None);
        };

        Ok(Some(User {
            uuid: parse_uuid(&uuid_text, "users.uuid")?,
            login,
            full_name,
            active_company: parse_optional_uuid(company_text, "users.active_company_uuid")?,
        }))
    }

    fn set_active_company(
        &self,
        user_id: UserId,
        company_id: Option<CompanyId>,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users SET active_company_uuid = ?1 WHERE uuid = ?2;",
            params![company_id.map(|id| id.to_string()), user_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "user",
                id: user_id,
            });
        }
        Ok(())
    }
}

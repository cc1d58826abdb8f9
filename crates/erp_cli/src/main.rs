//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `erp_core` linkage and that the bundled schema migrates cleanly.
//! - Keep output deterministic for quick local sanity checks.

use erp_core::db::migrations::latest_version;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("erp_core ping={}", erp_core::ping());
    println!("erp_core version={}", erp_core::core_version());
    println!("erp_core log_level={}", erp_core::default_log_level());

    let conn = match erp_core::open_db_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("erp_core schema=error {err}");
            return ExitCode::FAILURE;
        }
    };

    match conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0)) {
        Ok(applied) => {
            println!("erp_core schema={applied}/{}", latest_version());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("erp_core schema=error {err}");
            ExitCode::FAILURE
        }
    }
}

use erp_core::db::open_db_in_memory;
use erp_core::model::gdpr::{DataToExcludeConfig, GdprConfigError, MetaModel};
use erp_core::repo::gdpr_repo::{GdprRepository, SqliteGdprRepository};
use erp_core::repo::RepoError;
use erp_core::service::gdpr_service::GdprService;

fn field_names(fields: Vec<erp_core::model::gdpr::MetaField>) -> Vec<String> {
    fields.into_iter().map(|field| field.name).collect()
}

#[test]
fn configs_round_trip_in_insertion_order() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteGdprRepository::new(&mut conn);
    let employee = MetaModel::new("com.acme.hr.Employee");

    let first = DataToExcludeConfig::new(employee.clone(), ["birthDate", "phone"]);
    let second = DataToExcludeConfig::new(MetaModel::new("com.acme.base.Partner"), ["email"]);
    repo.create_config(&first).unwrap();
    repo.create_config(&second).unwrap();

    let loaded = repo.list_configs().unwrap();
    assert_eq!(loaded, vec![first, second]);
}

#[test]
fn service_merges_fields_across_configs() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = GdprService::new(SqliteGdprRepository::new(&mut conn));
    let employee = MetaModel::new("com.acme.hr.Employee");

    service
        .add_config(&DataToExcludeConfig::new(employee.clone(), ["birthDate"]))
        .unwrap();
    service
        .add_config(&DataToExcludeConfig::new(
            MetaModel::new("com.acme.base.Partner"),
            ["email"],
        ))
        .unwrap();
    service
        .add_config(&DataToExcludeConfig::new(employee.clone(), ["address"]))
        .unwrap();

    assert!(service.is_model_excluded(&employee).unwrap());
    assert!(!service
        .is_model_excluded(&MetaModel::new("com.acme.crm.Lead"))
        .unwrap());
    assert_eq!(
        field_names(service.fields_to_exclude(&employee).unwrap()),
        vec!["birthDate", "address"]
    );
}

#[test]
fn config_without_fields_still_excludes_the_model() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = GdprService::new(SqliteGdprRepository::new(&mut conn));
    let model = MetaModel::new("com.acme.hr.Employee");

    service
        .add_config(&DataToExcludeConfig::new(model.clone(), Vec::<String>::new()))
        .unwrap();

    assert!(service.is_model_excluded(&model).unwrap());
    assert!(service.fields_to_exclude(&model).unwrap().is_empty());
}

#[test]
fn invalid_config_is_rejected_before_any_write() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteGdprRepository::new(&mut conn);

    let err = repo
        .create_config(&DataToExcludeConfig::new(
            MetaModel::new("com.acme.hr.Employee"),
            ["birth date"],
        ))
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::InvalidGdprConfig(GdprConfigError::InvalidFieldName(_))
    ));
    assert!(repo.list_configs().unwrap().is_empty());
}

#[test]
fn duplicate_field_names_are_rejected_before_any_write() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteGdprRepository::new(&mut conn);

    let err = repo
        .create_config(&DataToExcludeConfig::new(
            MetaModel::new("Employee"),
            ["phone", "email", "phone"],
        ))
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::InvalidGdprConfig(GdprConfigError::DuplicateFieldName(ref name)) if name == "phone"
    ));
    assert!(repo.list_configs().unwrap().is_empty());
}

#[test]
fn delete_config_cascades_to_fields() {
    let mut conn = open_db_in_memory().unwrap();
    let config = DataToExcludeConfig::new(MetaModel::new("Employee"), ["phone"]);
    {
        let mut repo = SqliteGdprRepository::new(&mut conn);
        repo.create_config(&config).unwrap();
        repo.delete_config(config.uuid).unwrap();
        assert!(repo.list_configs().unwrap().is_empty());
        assert!(matches!(
            repo.delete_config(config.uuid),
            Err(RepoError::NotFound { .. })
        ));
    }

    let orphan_fields: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM gdpr_data_to_exclude_fields;",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphan_fields, 0);
}

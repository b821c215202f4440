// ==========================================
// 导入 API 端到端测试
// ==========================================
// 文件 → ImportApi → SQLite，检查报告与落库结果
// ==========================================


use asset_movement_import::api::{ApiError, ImportApi};
use asset_movement_import::config::{config_keys, ConfigManager};
use asset_movement_import::repository::MovementRepositoryImpl;
use test_helpers::{create_test_db, five_rows_with_unknown_third, write_csv, SHIPMENT_HEADER};

#[tokio::test]
async fn test_five_rows_one_unknown_location() {
    let (_db, db_path) = create_test_db().unwrap();
    let file = write_csv(&five_rows_with_unknown_third()).unwrap();

    let api = ImportApi::new(db_path.clone());
    let report = api
        .import_movements(
            file.path().to_str().unwrap(),
            "shipment",
            "1",
            "operator-7",
            Some("192.168.0.10"),
        )
        .await
        .unwrap();

    assert_eq!(report.total_rows, 5);
    assert_eq!(report.rows_parsed, 4);
    assert_eq!(report.rows_created, 4);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].line, 4);
    assert_eq!(
        report.errors[0].messages,
        vec!["store not found: \"XYZ UNKNOWN PLACE\""]
    );

    let created_lines: Vec<usize> = report.created.iter().map(|c| c.line).collect();
    assert_eq!(created_lines, vec![2, 3, 5, 6]);

    // 落库内容
    let repo = MovementRepositoryImpl::new(&db_path).unwrap();
    assert_eq!(repo.count_movements().unwrap(), 4);

    let first = repo
        .find_by_id(&report.created[0].movement_id)
        .unwrap()
        .unwrap();
    assert_eq!(first.origin, "CD PAVUNA");
    assert_eq!(first.destination, "BOTAFOGO");
    assert_eq!(first.kind, "shipment");
    assert_eq!(first.status, "IN_TRANSIT");
    assert_eq!(first.notes.as_deref(), Some("weekly"));
    assert_eq!(first.created_by, "operator-7");
    assert_eq!(first.created_ip, "192.168.0.10");
    assert!(first.code.starts_with("REM-"));

    let lines = repo
        .list_asset_lines(&report.created[0].movement_id)
        .unwrap();
    let pairs: Vec<(&str, u32)> = lines
        .iter()
        .map(|l| (l.asset_type_id.as_str(), l.quantity))
        .collect();
    assert_eq!(pairs, vec![("cxativo_tipo_1", 50), ("cxativo_tipo_3", 100)]);

    let third = repo
        .find_by_id(&report.created[2].movement_id)
        .unwrap()
        .unwrap();
    assert_eq!(third.destination, "CABO FRIO");
    assert_eq!(third.notes, None);
}

#[tokio::test]
async fn test_zero_quantities_yield_single_error() {
    let (_db, db_path) = create_test_db().unwrap();
    let file = write_csv(&[SHIPMENT_HEADER, "MACAE,,CXG,0,BAG,0"]).unwrap();

    let report = ImportApi::new(db_path.clone())
        .import_movements(file.path().to_str().unwrap(), "shipment", "1", "u1", None)
        .await
        .unwrap();

    assert_eq!(report.total_rows, 1);
    assert_eq!(report.rows_parsed, 0);
    assert_eq!(report.rows_created, 0);
    assert_eq!(report.errors[0].messages, vec!["at least one asset required"]);
    assert_eq!(
        MovementRepositoryImpl::new(&db_path)
            .unwrap()
            .count_movements()
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_row_collects_every_error() {
    let (_db, db_path) = create_test_db().unwrap();
    let file = write_csv(&[
        SHIPMENT_HEADER,
        ",,CXG,abc,CXG,",
        "LEBLON,,CXG,3,caixa hnt g,4",
    ])
    .unwrap();

    let report = ImportApi::new(db_path)
        .import_movements(file.path().to_str().unwrap(), "shipment", "1", "u1", None)
        .await
        .unwrap();

    assert_eq!(report.total_rows, 2);
    assert_eq!(report.rows_parsed, 0);
    assert_eq!(report.rows_created, 0);
    assert_eq!(report.errors.len(), 2);

    let first = report.error_for_line(2).unwrap();
    assert_eq!(
        first.messages,
        vec![
            "destination-location is required".to_string(),
            "invalid quantity for CXG: \"abc\"".to_string(),
            "slot 2: asset type \"CXG\" given without quantity".to_string(),
            "at least one asset required".to_string(),
        ]
    );

    // 重复器具类型：保留第一个，整行仍判为错误
    let second = report.error_for_line(3).unwrap();
    assert_eq!(
        second.messages,
        vec!["duplicate asset type: \"caixa hnt g\""]
    );
}

#[tokio::test]
async fn test_transfer_matches_centers_with_legacy_columns() {
    let (_db, db_path) = create_test_db().unwrap();
    let file = write_csv(&[
        "cd_destino,observacoes,tipo_ativo_1,quantidade_1",
        "cd sao paulo,programada,CXG,100",
        "CD PAVUNA,,CXP,1",
        "MACAE,,CXP,1",
    ])
    .unwrap();

    let report = ImportApi::new(db_path.clone())
        .import_movements(file.path().to_str().unwrap(), "transfer", "3", "u1", None)
        .await
        .unwrap();

    assert_eq!(report.rows_created, 2);
    assert_eq!(
        report.error_for_line(4).unwrap().messages,
        vec!["distribution center not found: \"MACAE\""]
    );

    let repo = MovementRepositoryImpl::new(&db_path).unwrap();
    let movement = repo
        .find_by_id(&report.created[0].movement_id)
        .unwrap()
        .unwrap();
    assert_eq!(movement.origin, "CD ESPIRITO SANTO");
    assert_eq!(movement.destination, "CD SÃO PAULO");
    assert_eq!(movement.created_ip, "unknown");
    assert!(movement.code.starts_with("TRF-"));
}

#[tokio::test]
async fn test_structural_errors_abort_whole_upload() {
    let (_db, db_path) = create_test_db().unwrap();
    let api = ImportApi::new(db_path.clone());

    let header_only = write_csv(&[SHIPMENT_HEADER]).unwrap();
    let result = api
        .import_movements(header_only.path().to_str().unwrap(), "shipment", "1", "u1", None)
        .await;
    assert!(matches!(result, Err(ApiError::ImportError(_))));

    let file = write_csv(&five_rows_with_unknown_third()).unwrap();
    let result = api
        .import_movements(file.path().to_str().unwrap(), "shipment", "42", "u1", None)
        .await;
    assert!(matches!(result, Err(ApiError::ImportError(ref m)) if m.contains("42")));

    let result = api
        .import_movements("/no/such/file.xlsx", "shipment", "1", "u1", None)
        .await;
    assert!(matches!(result, Err(ApiError::ImportError(_))));

    assert_eq!(
        MovementRepositoryImpl::new(&db_path)
            .unwrap()
            .count_movements()
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_match_threshold_from_config() {
    let (_db, db_path) = create_test_db().unwrap();
    let file = write_csv(&[SHIPMENT_HEADER, "maca,,CXG,1,,"]).unwrap();
    let api = ImportApi::new(db_path.clone());

    // 默认阈值 0.7：包含关系提升到 0.8，匹配成功
    let report = api
        .import_movements(file.path().to_str().unwrap(), "shipment", "1", "u1", None)
        .await
        .unwrap();
    assert_eq!(report.rows_created, 1);

    ConfigManager::new(&db_path)
        .unwrap()
        .set_global_config_value(config_keys::IMPORT_MATCH_THRESHOLD, "0.95")
        .unwrap();

    let report = api
        .import_movements(file.path().to_str().unwrap(), "shipment", "1", "u1", None)
        .await
        .unwrap();
    assert_eq!(report.rows_created, 0);
    assert_eq!(
        report.errors[0].messages,
        vec!["store not found: \"maca\""]
    );
}

#[tokio::test]
async fn test_build_template_from_seeded_catalog() {
    let (_db, db_path) = create_test_db().unwrap();
    let template = ImportApi::new(db_path)
        .build_template("regresso")
        .await
        .unwrap();

    assert_eq!(template.header[0], "origin-location");
    assert_eq!(template.stores.len(), 76);
    assert_eq!(template.asset_types.len(), 5);
    assert!(template.centers.is_empty());
}

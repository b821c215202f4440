// ==========================================
// 器具移动导入 - 命令行入口
// ==========================================
// 用法:
//   asset-movement-import init-db
//   asset-movement-import import <file> <kind> <own_center_id> <actor_id> [network_address]
//   asset-movement-import template <kind> [output.csv]
//   (模板另写出同目录的 _stores / _centers / _asset_types / _instructions 参考文件)
//
// 数据库路径: ASSET_MOVEMENT_DB_PATH，否则用户数据目录
// ==========================================

use anyhow::{bail, Context};
use asset_movement_import::db::{
    default_db_path, init_schema, open_sqlite_connection, read_schema_version,
    seed_reference_data, CURRENT_SCHEMA_VERSION,
};
use asset_movement_import::{logging, ImportApi};
use chrono::Local;
use std::path::Path;

const USAGE: &str = "usage:
  asset-movement-import init-db
  asset-movement-import import <file> <kind> <own_center_id> <actor_id> [network_address]
  asset-movement-import template <kind> [output.csv]

kind: shipment | return | transfer";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        bail!("{}", USAGE);
    };

    let db_path = default_db_path();
    prepare_database(&db_path)?;

    match command.as_str() {
        "init-db" => {
            println!("database ready: {}", db_path);
        }
        "import" => {
            let [file, kind, own_center_id, actor_id] = match args.get(1..5) {
                Some([a, b, c, d]) => [a, b, c, d],
                _ => bail!("{}", USAGE),
            };
            let network_address = args.get(5).map(String::as_str);

            let api = ImportApi::new(db_path);
            let report = api
                .import_movements(file, kind, own_center_id, actor_id, network_address)
                .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "template" => {
            let Some(kind) = args.get(1) else {
                bail!("{}", USAGE);
            };

            let api = ImportApi::new(db_path);
            let template = api.build_template(kind).await?;
            let output = args
                .get(2)
                .cloned()
                .unwrap_or_else(|| template.file_name(Local::now().date_naive()));

            let written = template
                .write_files(Path::new(&output))
                .with_context(|| format!("cannot write template files for {}", output))?;
            for path in written {
                println!("template written: {}", path.display());
            }
        }
        other => bail!("unknown command: {}\n{}", other, USAGE),
    }

    Ok(())
}

/// 建表 + 写入默认参考目录（幂等）
fn prepare_database(db_path: &str) -> anyhow::Result<()> {
    let conn = open_sqlite_connection(db_path)
        .with_context(|| format!("cannot open database {}", db_path))?;

    init_schema(&conn).context("schema init failed")?;
    seed_reference_data(&conn).context("reference data seed failed")?;

    let version = read_schema_version(&conn)?;
    if version != Some(CURRENT_SCHEMA_VERSION) {
        tracing::warn!(
            ?version,
            expected = CURRENT_SCHEMA_VERSION,
            "数据库 schema_version 与当前代码不一致"
        );
    }
    tracing::info!(db_path, "数据库就绪");
    Ok(())
}

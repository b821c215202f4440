// ==========================================
// 器具移动导入 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键必须每个连接开启）
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 建表 + 默认参考目录
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;

/// 显式指定数据库路径的环境变量
pub const DB_PATH_ENV: &str = "ASSET_MOVEMENT_DB_PATH";

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 默认数据库路径
///
/// 优先使用环境变量 ASSET_MOVEMENT_DB_PATH，否则放在用户数据目录下。
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./asset_movement.db");
    if let Some(data_dir) = dirs::data_dir() {
        let app_dir = data_dir.join("asset-movement-import");
        if std::fs::create_dir_all(&app_dir).is_ok() {
            path = app_dir.join("asset_movement.db");
        }
    }
    path.to_string_lossy().to_string()
}

/// 配置 SQLite 连接的统一 PRAGMA
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 建表（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS location (
            location_id TEXT NOT NULL,
            name TEXT NOT NULL,
            location_type TEXT NOT NULL CHECK (location_type IN ('STORE', 'CENTER')),
            sort_order INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (location_type, location_id),
            UNIQUE (location_type, name)
        );

        CREATE TABLE IF NOT EXISTS asset_type (
            asset_type_id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            code TEXT NOT NULL UNIQUE,
            sort_order INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS movement (
            movement_id TEXT PRIMARY KEY,
            code TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('shipment', 'return', 'transfer')),
            origin TEXT NOT NULL,
            destination TEXT NOT NULL,
            status TEXT NOT NULL,
            notes TEXT,
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            created_ip TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_movement_code ON movement(code);

        CREATE TABLE IF NOT EXISTS movement_asset_line (
            line_id TEXT PRIMARY KEY,
            movement_id TEXT NOT NULL REFERENCES movement(movement_id) ON DELETE CASCADE,
            asset_type_id TEXT NOT NULL REFERENCES asset_type(asset_type_id),
            quantity INTEGER NOT NULL CHECK (quantity > 0)
        );

        CREATE INDEX IF NOT EXISTS idx_asset_line_movement ON movement_asset_line(movement_id);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

// ==========================================
// 默认参考目录
// ==========================================

pub const DEFAULT_STORES: &[&str] = &[
    "MACAE",
    "CABO FRIO",
    "CAMPOS",
    "GRAJAU",
    "BOTAFOGO",
    "TIJUCA",
    "VILA ISABEL",
    "FLAMENGO",
    "DIAS DA ROCHA",
    "ICARAI",
    "SIQUEIRA CAMPOS",
    "LEBLON",
    "MARQUES DE PARANA",
    "PRADO JUNIOR",
    "BARRA",
    "REGIAO OCEANICA",
    "LARANJEIRAS",
    "PRAIA DO SUA",
    "RECREIO",
    "AV DAS AMERICAS",
    "URUGUAI",
    "ILHA DO GOVERNADOR",
    "ADALBERTO FERREIRA",
    "MARQUES DE ABRANTES",
    "RIO DAS OSTRAS",
    "VILA VELHA",
    "SANTA ROSA",
    "VOLUNTARIOS DA PATRIA",
    "BARRA GARDEN",
    "BARRA BLUE",
    "ABELARDO BUENO",
    "GAVEA",
    "INGA",
    "ATAULFO DE PAIVA",
    "VISCONDE DE PIRAJA",
    "RECREIO A5",
    "SAO CONRADO",
    "JUIZ DE FORA",
    "SAO FRANCISCO XAVIER",
    "MARIZ E BARROS",
    "CONDE DE BONFIM",
    "MOREIRA CESAR",
    "ITAIPU",
    "CARLOS GOIS",
    "MARACANA",
    "CONDE 648",
    "HUMAITA",
    "JARDIM BOTANICO",
    "ATERRADO",
    "FREGUESIA",
    "CONDE 99",
    "CATETE",
    "MARIZ 1083",
    "VOLUNTARIOS 157",
    "PASSAGEM",
    "MARIZ 312 NITEROI",
    "CAMPO GRANDE",
    "BUZIOS",
    "LARANJEIRAS 49",
    "PARAISO",
    "SANTOS",
    "VILA MADALENA",
    "INTERLAGOS",
    "NHAMBIQUARAS",
    "ROSA E SILVA",
    "BROOKLIN",
    "VERBO DIVINO",
    "IPIRANGA",
    "JOAO CACHOEIRA",
    "ARAPANES",
    "VILA MARIANA",
    "VILA MASCOTE",
    "SBC KENNEDY",
    "VILA OLIMPIA",
    "BARRA DA TIJUCA",
    "PQ TAMANDARE",
];

pub const DEFAULT_CENTERS: &[&str] = &["CD PAVUNA", "CD SÃO PAULO", "CD ESPIRITO SANTO"];

/// (asset_type_id, name, code)
pub const DEFAULT_ASSET_TYPES: &[(&str, &str, &str)] = &[
    ("cxativo_tipo_1", "CAIXA HNT G", "CXG"),
    ("cxativo_tipo_2", "CAIXA HNT P", "CXP"),
    ("cxativo_tipo_3", "SACO BAG", "BAG"),
    ("cxativo_tipo_4", "PALLET PBR", "PLT"),
    ("cxativo_tipo_5", "CAIXA BASCULHANTE", "CXB"),
];

/// 写入默认参考目录（幂等）
///
/// 地点 ID 为各类型内的 1 起序号，sort_order 与 ID 一致。
pub fn seed_reference_data(conn: &Connection) -> rusqlite::Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut location_stmt = tx.prepare(
            "INSERT OR IGNORE INTO location (location_id, name, location_type, sort_order)
             VALUES (?1, ?2, ?3, ?4)",
        )?;

        for (location_type, names) in [("STORE", DEFAULT_STORES), ("CENTER", DEFAULT_CENTERS)] {
            for (idx, name) in names.iter().enumerate() {
                let order = idx as i64 + 1;
                location_stmt.execute(rusqlite::params![
                    order.to_string(),
                    name,
                    location_type,
                    order
                ])?;
            }
        }

        let mut asset_stmt = tx.prepare(
            "INSERT OR IGNORE INTO asset_type (asset_type_id, name, code, sort_order)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (idx, (id, name, code)) in DEFAULT_ASSET_TYPES.iter().enumerate() {
            asset_stmt.execute(rusqlite::params![id, name, code, idx as i64 + 1])?;
        }
    }
    tx.commit()
}

// ==========================================
// 器具移动导入 - 文本规范化
// ==========================================
// 职责: 自由文本 → 可比较形式
// 规则: 小写 → NFD 分解去变音 → 仅保留 [a-z0-9\s] → 合并空白 → trim
// ==========================================

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// 规范化文本（纯函数，幂等）
///
/// # 示例
/// ```
/// use asset_movement_import::importer::normalizer::normalize;
/// assert_eq!(normalize("  Macaé - RJ "), "macae rj");
/// ```
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_diacritics() {
        assert_eq!(normalize("GRAJAÚ"), "grajau");
        assert_eq!(normalize("CD SÃO PAULO"), "cd sao paulo");
        assert_eq!(normalize("Icaraí"), "icarai");
    }

    #[test]
    fn test_normalize_punctuation_and_whitespace() {
        assert_eq!(normalize("  Cabo   Frio!! "), "cabo frio");
        assert_eq!(normalize("Av. das Américas\t-\n2"), "av das americas 2");
        assert_eq!(normalize("CONDE 648"), "conde 648");
    }

    #[test]
    fn test_normalize_empty_and_symbols_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("--//--"), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "MACAÉ",
            "  São   Conrado ",
            "Mariz 312 Niterói",
            "ÇÀÉÎÕÜ ñ",
            "ß straße",
            "",
            "12-34",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }
}

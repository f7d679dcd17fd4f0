//! locale 代码的校验、归一化与国旗修饰

/// 语言代码到旗帜的映射；`None` 表示该语言明确不配旗帜
const LANGUAGE_FLAGS: &[(&str, Option<&str>)] = &[
    ("ar", Some("🇱🇧")),
    ("ca", None),
    ("cs", Some("🇨🇿")),
    ("da", Some("🇩🇰")),
    ("de", Some("🇩🇪")),
    ("el", Some("🇬🇷")),
    ("en", Some("🇬🇧")),
    ("es", Some("🇪🇸")),
    ("fi", Some("🇫🇮")),
    ("fr", Some("🇫🇷")),
    ("he", Some("🇮🇱")),
    ("hi", Some("🇮🇳")),
    ("hr", Some("🇭🇷")),
    ("hu", Some("🇭🇺")),
    ("id", Some("🇮🇩")),
    ("it", Some("🇮🇹")),
    ("ja", Some("🇯🇵")),
    ("ms", Some("🇲🇾")),
    ("nb", Some("🇳🇴")),
    ("nl", Some("🇳🇱")),
    ("pl", Some("🇵🇱")),
    ("pt", Some("🇵🇹")),
    ("ro", Some("🇷🇴")),
    ("ru", Some("🇷🇺")),
    ("sk", Some("🇸🇰")),
    ("sv", Some("🇸🇪")),
    ("th", Some("🇹🇭")),
    ("tr", Some("🇹🇷")),
    ("uk", Some("🇺🇦")),
    ("vi", Some("🇻🇳")),
    ("zh", Some("🇨🇳")),
];

/// 归一化：去首尾空白并转小写
pub fn normalize(code: &str) -> String {
    code.trim().to_lowercase()
}

/// 合法 locale 代码：首字符为 ASCII 小写字母，其余为小写字母、`_` 或 `-`
pub fn is_valid(code: &str) -> bool {
    let mut chars = code.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_lowercase() {
        return false;
    }
    chars.all(|c| c.is_ascii_lowercase() || c == '_' || c == '-')
}

/// 语言段：第一个 `-` 之前的部分
fn language_part(code: &str) -> &str {
    match code.find('-') {
        Some(i) => &code[..i],
        None => code,
    }
}

/// 由两字母代码合成区域指示符旗帜
fn regional_indicator_flag(letters: &str) -> Option<String> {
    if letters.len() != 2 {
        return None;
    }
    letters
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() {
                char::from_u32(0x1F1E6 + (c as u32 - 'a' as u32))
            } else {
                None
            }
        })
        .collect()
}

/// 为 locale 代码挑选旗帜：先查语言段映射表，不在表中的两字母语言段按区域码合成
pub fn flag_emoji(code: &str) -> Option<String> {
    let language = language_part(code);
    if let Some((_, flag)) = LANGUAGE_FLAGS.iter().find(|(lang, _)| *lang == language) {
        return flag.map(str::to_string);
    }
    regional_indicator_flag(language)
}

/// 展示名：旗帜在前，无旗帜时只给代码
pub fn display_name(code: &str) -> String {
    match flag_emoji(code) {
        Some(flag) => format!("{} {}", flag, code),
        None => code.to_string(),
    }
}

//! 标量写出：样式选择与转义
//!
//! 写出的字符串若会被重新读成布尔、数字、空值或时间戳，必须加单引号
//! 保住字符串类型；含不可打印字符的值走双引号转义。判型规则对应
//! YAML 1.1 的隐式类型，全部手写匹配器，不引入正则。

enum Style {
    Plain,
    Single,
    Double,
}

/// 把一个标量按合适的样式追加到输出缓冲
pub(crate) fn write_scalar(value: &str, out: &mut String) {
    match choose_style(value) {
        Style::Plain => out.push_str(value),
        Style::Single => write_single_quoted(value, out),
        Style::Double => write_double_quoted(value, out),
    }
}

fn choose_style(value: &str) -> Style {
    if value.is_empty() {
        return Style::Single;
    }
    if value.chars().any(|c| !is_printable_literal(c)) {
        return Style::Double;
    }
    if resolves_as_non_string(value) || is_plain_unsafe(value) {
        return Style::Single;
    }
    Style::Plain
}

/// 可以原样写出的字符：可见 ASCII 与基本平面的非控制字符。
/// 换行、制表符、C0/C1 控制符、代理区和增补平面都要转义。
fn is_printable_literal(c: char) -> bool {
    matches!(u32::from(c), 0x20..=0x7E | 0xA0..=0xD7FF | 0xE000..=0xFFFD)
}

/// 平文形式会被解析成非字符串类型的值
fn resolves_as_non_string(s: &str) -> bool {
    matches!(s, "~" | "=" | "<<")
        || matches!(s, "null" | "Null" | "NULL")
        || is_bool_like(s)
        || is_int_like(s)
        || is_float_like(s)
        || is_timestamp_like(s)
}

fn is_bool_like(s: &str) -> bool {
    matches!(
        s,
        "yes" | "Yes" | "YES"
            | "no" | "No" | "NO"
            | "true" | "True" | "TRUE"
            | "false" | "False" | "FALSE"
            | "on" | "On" | "ON"
            | "off" | "Off" | "OFF"
    )
}

fn is_int_like(s: &str) -> bool {
    let body = s.strip_prefix(['-', '+']).unwrap_or(s);
    if body.is_empty() {
        return false;
    }
    if let Some(rest) = body.strip_prefix("0b") {
        return !rest.is_empty() && rest.bytes().all(|b| matches!(b, b'0' | b'1' | b'_'));
    }
    if let Some(rest) = body.strip_prefix("0x") {
        return !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_hexdigit() || b == b'_');
    }
    if let Some(rest) = body.strip_prefix("0o") {
        return !rest.is_empty() && rest.bytes().all(|b| matches!(b, b'0'..=b'7' | b'_'));
    }
    // 六十进制整数：1:30:59 之类
    if body.contains(':') {
        return is_sexagesimal(body, false);
    }
    if body == "0" {
        return true;
    }
    if let Some(rest) = body.strip_prefix('0') {
        // 0 开头按八进制判，带 8/9 的就不是数字
        return !rest.is_empty() && rest.bytes().all(|b| matches!(b, b'0'..=b'7' | b'_'));
    }
    body.starts_with(|c: char| c.is_ascii_digit())
        && body.bytes().all(|b| b.is_ascii_digit() || b == b'_')
}

fn is_float_like(s: &str) -> bool {
    let body = s.strip_prefix(['-', '+']).unwrap_or(s);
    if matches!(body, ".inf" | ".Inf" | ".INF") {
        return true;
    }
    if matches!(s, ".nan" | ".NaN" | ".NAN") {
        return true;
    }
    // 六十进制浮点不带指数
    if body.contains(':') {
        let Some((head, frac)) = body.rsplit_once('.') else {
            return false;
        };
        return frac.bytes().all(|b| b.is_ascii_digit() || b == b'_')
            && is_sexagesimal(head, true);
    }
    let (mantissa, exponent) = match body.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e)),
        None => (body, None),
    };
    if let Some(exp) = exponent {
        let digits = exp.strip_prefix(['-', '+']).unwrap_or(exp);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }
    // 没有小数点的不算浮点，"1e5" 读回来仍是字符串
    let Some((int_part, frac_part)) = mantissa.split_once('.') else {
        return false;
    };
    if frac_part.contains('.') {
        return false;
    }
    if int_part.is_empty() {
        return frac_part.starts_with(|c: char| c.is_ascii_digit())
            && frac_part.bytes().all(|b| b.is_ascii_digit() || b == b'_');
    }
    int_part.starts_with(|c: char| c.is_ascii_digit())
        && int_part.bytes().all(|b| b.is_ascii_digit() || b == b'_')
        && frac_part.bytes().all(|b| b.is_ascii_digit() || b == b'_')
}

/// 冒号分段的六十进制数字：首段为普通数字，其余段 1 到 2 位且不超过 59
fn is_sexagesimal(body: &str, allow_zero_start: bool) -> bool {
    let mut parts = body.split(':');
    let Some(first) = parts.next() else {
        return false;
    };
    let lead_ok = first.starts_with(|c: char| c.is_ascii_digit() && (allow_zero_start || c != '0'));
    if !lead_ok || !first.bytes().all(|b| b.is_ascii_digit() || b == b'_') {
        return false;
    }
    let mut seen_segment = false;
    for part in parts {
        seen_segment = true;
        let ok = match part.as_bytes() {
            [d] => d.is_ascii_digit(),
            [high, low] => (b'0'..=b'5').contains(high) && low.is_ascii_digit(),
            _ => false,
        };
        if !ok {
            return false;
        }
    }
    seen_segment
}

fn is_timestamp_like(s: &str) -> bool {
    is_plain_date(s) || is_datetime(s)
}

/// 纯日期：恰好 yyyy-mm-dd
fn is_plain_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[7] == b'-'
        && bytes[8..10].iter().all(u8::is_ascii_digit)
}

/// 日期加时间，可带小数秒和时区偏移
fn is_datetime(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut pos = 0;
    if !eat_digits_exact(bytes, &mut pos, 4) || !eat_byte(bytes, &mut pos, b'-') {
        return false;
    }
    if !eat_digits_range(bytes, &mut pos, 1, 2) || !eat_byte(bytes, &mut pos, b'-') {
        return false;
    }
    if !eat_digits_range(bytes, &mut pos, 1, 2) {
        return false;
    }
    // 日期与时间之间是 T/t 或至少一个空白
    if pos < bytes.len() && (bytes[pos] == b'T' || bytes[pos] == b't') {
        pos += 1;
    } else {
        let start = pos;
        while pos < bytes.len() && (bytes[pos] == b' ' || bytes[pos] == b'\t') {
            pos += 1;
        }
        if pos == start {
            return false;
        }
    }
    if !eat_digits_range(bytes, &mut pos, 1, 2) || !eat_byte(bytes, &mut pos, b':') {
        return false;
    }
    if !eat_digits_exact(bytes, &mut pos, 2) || !eat_byte(bytes, &mut pos, b':') {
        return false;
    }
    if !eat_digits_exact(bytes, &mut pos, 2) {
        return false;
    }
    if pos < bytes.len() && bytes[pos] == b'.' {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
    }
    // 时区前允许空白，但尾部空白必须跟着时区
    let before_gap = pos;
    while pos < bytes.len() && (bytes[pos] == b' ' || bytes[pos] == b'\t') {
        pos += 1;
    }
    if pos == bytes.len() {
        return before_gap == pos;
    }
    match bytes[pos] {
        b'Z' => pos += 1,
        b'-' | b'+' => {
            pos += 1;
            if !eat_digits_range(bytes, &mut pos, 1, 2) {
                return false;
            }
            if pos < bytes.len() && bytes[pos] == b':' {
                pos += 1;
                if !eat_digits_exact(bytes, &mut pos, 2) {
                    return false;
                }
            }
        }
        _ => return false,
    }
    pos == bytes.len()
}

fn eat_byte(bytes: &[u8], pos: &mut usize, byte: u8) -> bool {
    if *pos < bytes.len() && bytes[*pos] == byte {
        *pos += 1;
        true
    } else {
        false
    }
}

fn eat_digits_exact(bytes: &[u8], pos: &mut usize, count: usize) -> bool {
    let end = *pos + count;
    if end > bytes.len() || !bytes[*pos..end].iter().all(u8::is_ascii_digit) {
        return false;
    }
    *pos = end;
    true
}

fn eat_digits_range(bytes: &[u8], pos: &mut usize, min: usize, max: usize) -> bool {
    let mut count = 0;
    while count < max && *pos < bytes.len() && bytes[*pos].is_ascii_digit() {
        *pos += 1;
        count += 1;
    }
    count >= min
}

/// 解析虽仍是字符串、但平文写出会被误读的形态
fn is_plain_unsafe(s: &str) -> bool {
    let bytes = s.as_bytes();
    let Some(&first) = bytes.first() else {
        return true;
    };
    if s.starts_with(' ') || s.ends_with(' ') {
        return true;
    }
    if matches!(
        first,
        b'#' | b',' | b'[' | b']' | b'{' | b'}' | b'&' | b'*' | b'!' | b'|' | b'>' | b'\''
            | b'"' | b'%' | b'@' | b'`'
    ) {
        return true;
    }
    // 行首的 - ? : 只有后跟空白或到头才危险
    if matches!(first, b'-' | b'?' | b':') && (bytes.len() == 1 || bytes[1] == b' ') {
        return true;
    }
    if s.contains(": ") || s.contains(" #") {
        return true;
    }
    s.ends_with(':')
}

fn write_single_quoted(value: &str, out: &mut String) {
    out.push('\'');
    for c in value.chars() {
        if c == '\'' {
            out.push_str("''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
}

fn write_double_quoted(value: &str, out: &mut String) {
    out.push('"');
    for c in value.chars() {
        match c {
            '\u{00}' => out.push_str("\\0"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{0B}' => out.push_str("\\v"),
            '\u{0C}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '\u{1B}' => out.push_str("\\e"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{85}' => out.push_str("\\N"),
            c if is_printable_literal(c) => out.push(c),
            c => {
                let code = u32::from(c);
                if code <= 0xFF {
                    out.push_str(&format!("\\x{:02X}", code));
                } else if code <= 0xFFFF {
                    out.push_str(&format!("\\u{:04X}", code));
                } else {
                    out.push_str(&format!("\\U{:08X}", code));
                }
            }
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styled(value: &str) -> String {
        let mut out = String::new();
        write_scalar(value, &mut out);
        out
    }

    #[test]
    fn test_plain_passthrough() {
        for value in [
            "hello",
            "Tschüss",
            "中文",
            "☺",
            "a:b",
            "C:\\path",
            "say \"hi\"",
            "don't",
            "a, b",
            "x%y",
            "-x",
            "?x",
            ":x",
            "0129",
            "1e5",
            "yes!",
            "Nullable",
            "2018-1-1",
        ] {
            assert_eq!(styled(value), value, "{:?} 应保持平文", value);
        }
    }

    #[test]
    fn test_empty_and_null_like() {
        assert_eq!(styled(""), "''");
        assert_eq!(styled("~"), "'~'");
        assert_eq!(styled("null"), "'null'");
        assert_eq!(styled("NULL"), "'NULL'");
        assert_eq!(styled("="), "'='");
        assert_eq!(styled("<<"), "'<<'");
    }

    #[test]
    fn test_bool_like_quoted() {
        for value in ["true", "False", "yes", "NO", "on", "Off", "ON"] {
            assert_eq!(styled(value), format!("'{}'", value), "{:?} 应加引号", value);
        }
    }

    #[test]
    fn test_int_like_quoted() {
        for value in [
            "1", "-7", "+3", "0", "007", "0644", "0x1F", "0b101", "0o17", "1_000", "1:30",
            "-1:30:59",
        ] {
            assert_eq!(styled(value), format!("'{}'", value), "{:?} 应加引号", value);
        }
    }

    #[test]
    fn test_float_like_quoted() {
        for value in [
            "2.0", "3.", ".5", "-.5", "1_0.5", "6.8523015e+5", "1.0E3", ".inf", "-.INF", ".nan",
            "1:30.5",
        ] {
            assert_eq!(styled(value), format!("'{}'", value), "{:?} 应加引号", value);
        }
        // 指数里混入非数字就不是浮点
        assert_eq!(styled("1.0e5x"), "1.0e5x");
        assert_eq!(styled("1.2.3"), "1.2.3");
    }

    #[test]
    fn test_timestamp_like_quoted() {
        for value in [
            "2018-01-01",
            "2001-12-14t21:59:43.10-05:00",
            "2001-12-14 21:59:43.10 -5",
            "2001-12-15T02:59:43.1Z",
        ] {
            assert_eq!(styled(value), format!("'{}'", value), "{:?} 应加引号", value);
        }
        assert_eq!(styled("2001-12-14 21:59:43 "), "'2001-12-14 21:59:43 '", "尾部空格走普通引号规则");
    }

    #[test]
    fn test_indicator_prefixes_quoted() {
        assert_eq!(styled("& ist ein schönes Zeichen"), "'& ist ein schönes Zeichen'");
        for value in ["#x", "[x", "]x", "{x", "}x", "*x", "!x", "|x", ">x", "%", "@x", "`x", ",x"] {
            assert_eq!(styled(value), format!("'{}'", value), "{:?} 应加引号", value);
        }
    }

    #[test]
    fn test_spacing_patterns_quoted() {
        assert_eq!(styled("- x"), "'- x'");
        assert_eq!(styled("-"), "'-'");
        assert_eq!(styled("? y"), "'? y'");
        assert_eq!(styled(": y"), "': y'");
        assert_eq!(styled(" x"), "' x'");
        assert_eq!(styled("x "), "'x '");
        assert_eq!(styled("a: b"), "'a: b'");
        assert_eq!(styled("a #b"), "'a #b'");
        assert_eq!(styled("a:"), "'a:'");
    }

    #[test]
    fn test_quote_doubling() {
        assert_eq!(styled("'s"), "'''s'");
        assert_eq!(styled("&'x"), "'&''x'");
    }

    #[test]
    fn test_control_characters_double_quoted() {
        assert_eq!(styled("a\tb"), "\"a\\tb\"");
        assert_eq!(styled("a\nb"), "\"a\\nb\"");
        assert_eq!(styled("\r"), "\"\\r\"");
        assert_eq!(styled("\u{00}"), "\"\\0\"");
        assert_eq!(styled("\u{1B}"), "\"\\e\"");
        assert_eq!(styled("\u{7F}"), "\"\\x7F\"");
        assert_eq!(styled("\u{85}"), "\"\\N\"");
        assert_eq!(styled("\u{9F}"), "\"\\x9F\"");
        assert_eq!(styled("\u{FFFE}"), "\"\\uFFFE\"");
        assert_eq!(styled("back\\slash\n"), "\"back\\\\slash\\n\"");
    }

    #[test]
    fn test_astral_double_quoted() {
        assert_eq!(styled("😍😍😍"), "\"\\U0001F60D\\U0001F60D\\U0001F60D\"");
    }
}

//! IO helper: text file read/write

use std::{fs, io, path::Path};

/// 读取整个文本文件
pub fn read_text_file(p: &Path) -> io::Result<String> {
    fs::read_to_string(p)
}

/// 将文本写入文件（整体覆盖）
pub fn write_text_file(p: &Path, content: &str) -> io::Result<()> {
    fs::write(p, content)
}

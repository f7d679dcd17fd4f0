//! 逐 locale 的精确写出
//!
//! 输出格式完全固定：`---` 起头，两空格缩进，序列条目顶到键的
//! 缩进列，嵌套集合紧凑续行，同级键按字典序排列。值与键统一走
//! 标量样式规则，空译文写成 `''`，空集合写成 `{}` 和 `[]`。

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::node::{self, Node, NodeKind};
use crate::model::tree::TranslationTree;
use crate::utils::fs;
use crate::yaml::scalar;

/// 落盘文件的扩展名
pub const FILE_EXTENSION: &str = "yml";

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("写入失败: {0}")]
    Io(#[from] std::io::Error),
}

/// 一次保存的逐 locale 结果
#[derive(Debug, Default)]
pub struct SaveReport {
    pub written: Vec<(String, PathBuf)>,
    pub failed: Vec<(String, SaveError)>,
}

impl SaveReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 把树渲染成某个 locale 的完整文档文本
pub fn render_locale_document(tree: &TranslationTree, locale: &str) -> String {
    let mut out = String::from("---\n");
    scalar::write_scalar(locale, &mut out);
    if tree.roots().is_empty() {
        out.push_str(": {}\n");
    } else {
        out.push_str(":\n");
        write_mapping(tree.roots(), locale, 1, &mut out);
    }
    out
}

/// 每个 locale 写一个 `<locale>.yml`；单个失败不拦住其余 locale
pub fn save(tree: &TranslationTree, locales: &BTreeSet<String>, destination: &Path) -> SaveReport {
    let mut report = SaveReport::default();
    for locale in locales {
        let rendered = render_locale_document(tree, locale);
        let path = destination.join(format!("{}.{}", locale, FILE_EXTENSION));
        match fs::write_text_file(&path, &rendered) {
            Ok(()) => {
                tracing::info!("已写出 {}", path.display());
                report.written.push((locale.clone(), path));
            }
            Err(err) => {
                tracing::warn!("写出 {} 失败: {}", path.display(), err);
                report.failed.push((locale.clone(), SaveError::Io(err)));
            }
        }
    }
    report
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn sorted_entries(children: &[Node]) -> Vec<&Node> {
    let mut ordered: Vec<&Node> = children.iter().collect();
    ordered.sort_by(|a, b| a.own_key().cmp(b.own_key()));
    ordered
}

/// 序列条目按索引数值排序，非索引键排到末尾
fn sorted_items(children: &[Node]) -> Vec<&Node> {
    let mut ordered: Vec<&Node> = children.iter().collect();
    ordered.sort_by(|a, b| sequence_order(a).cmp(&sequence_order(b)));
    ordered
}

fn sequence_order(item: &Node) -> (usize, &str) {
    match node::parse_sequence_index(item.own_key()) {
        Some(index) => (index, ""),
        None => (usize::MAX, item.own_key()),
    }
}

fn write_mapping(children: &[Node], locale: &str, depth: usize, out: &mut String) {
    for child in sorted_entries(children) {
        write_entry(child, locale, depth, false, out);
    }
}

/// 写一条映射条目；`inline` 表示键接在 `- ` 之后，不再缩进
fn write_entry(entry: &Node, locale: &str, depth: usize, inline: bool, out: &mut String) {
    if !inline {
        indent(depth, out);
    }
    scalar::write_scalar(entry.own_key(), out);
    match entry.kind() {
        NodeKind::Document { translations } => {
            out.push_str(": ");
            let value = translations.get(locale).map(String::as_str).unwrap_or("");
            scalar::write_scalar(value, out);
            out.push('\n');
        }
        NodeKind::Container { children } => {
            if children.is_empty() {
                out.push_str(": {}\n");
            } else {
                out.push_str(":\n");
                write_mapping(children, locale, depth + 1, out);
            }
        }
        NodeKind::Sequence { children } => {
            if children.is_empty() {
                out.push_str(": []\n");
            } else {
                out.push_str(":\n");
                // 序列条目与键同列
                write_sequence(children, locale, depth, out);
            }
        }
    }
}

fn write_sequence(children: &[Node], locale: &str, depth: usize, out: &mut String) {
    for item in sorted_items(children) {
        write_item(item, locale, depth, false, out);
    }
}

fn write_item(item: &Node, locale: &str, depth: usize, inline: bool, out: &mut String) {
    if !inline {
        indent(depth, out);
    }
    out.push_str("- ");
    match item.kind() {
        NodeKind::Document { translations } => {
            let value = translations.get(locale).map(String::as_str).unwrap_or("");
            scalar::write_scalar(value, out);
            out.push('\n');
        }
        NodeKind::Container { children } => {
            if children.is_empty() {
                out.push_str("{}\n");
            } else {
                for (i, child) in sorted_entries(children).into_iter().enumerate() {
                    write_entry(child, locale, depth + 1, i == 0, out);
                }
            }
        }
        NodeKind::Sequence { children } => {
            if children.is_empty() {
                out.push_str("[]\n");
            } else {
                for (i, child) in sorted_items(children).into_iter().enumerate() {
                    write_item(child, locale, depth + 1, i == 0, out);
                }
            }
        }
    }
}

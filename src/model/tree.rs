//! 翻译树：规范键树与已注册 locale 集合，外加全部编辑入口
//!
//! 树内每个节点由点分全键唯一定位；编辑操作只接受单段键名，
//! 全键改动一律级联到后代节点。

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::locale;
use crate::model::node::Node;

/// 编辑与查询操作的错误
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("未找到节点: {0}")]
    NodeNotFound(String),
    #[error("节点不是叶子翻译节点: {0}")]
    NotADocument(String),
    #[error("节点不能容纳命名子节点: {0}")]
    NotAContainer(String),
    #[error("数组子项不支持该编辑: {0}")]
    SequenceChild(String),
    #[error("同级键名已存在: {0}")]
    DuplicateKey(String),
    #[error("非法键名: {0:?}")]
    InvalidKey(String),
    #[error("非法 locale 代码: {0:?}")]
    InvalidLocale(String),
    #[error("locale 已注册: {0}")]
    DuplicateLocale(String),
    #[error("locale 未注册: {0}")]
    UnknownLocale(String),
}

/// 聚合后的翻译树
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationTree {
    roots: Vec<Node>,
    locales: BTreeSet<String>,
}

/// 自上而下定位全键，成功时把兄弟序号路径写入 `acc`
fn index_path(nodes: &[Node], full_key: &str, acc: &mut Vec<usize>) -> bool {
    for (i, node) in nodes.iter().enumerate() {
        if node.full_key() == full_key {
            acc.push(i);
            return true;
        }
        let prefix = node.full_key();
        if full_key.len() > prefix.len()
            && full_key.starts_with(prefix)
            && full_key.as_bytes()[prefix.len()] == b'.'
        {
            acc.push(i);
            if let Some(children) = node.children() {
                if index_path(children, full_key, acc) {
                    return true;
                }
            }
            acc.pop();
        }
    }
    false
}

fn node_at_path<'a>(roots: &'a [Node], path: &[usize]) -> Option<&'a Node> {
    let (first, rest) = path.split_first()?;
    let mut node = roots.get(*first)?;
    for ix in rest {
        node = node.children()?.get(*ix)?;
    }
    Some(node)
}

fn node_at_path_mut<'a>(roots: &'a mut [Node], path: &[usize]) -> Option<&'a mut Node> {
    let (first, rest) = path.split_first()?;
    let mut node = roots.get_mut(*first)?;
    for ix in rest {
        node = node.children_mut()?.get_mut(*ix)?;
    }
    Some(node)
}

/// 单段键名：非空且不含 `.`
fn validate_segment(key: &str) -> Result<(), TreeError> {
    if key.is_empty() || key.contains('.') {
        return Err(TreeError::InvalidKey(key.to_string()));
    }
    Ok(())
}

impl TranslationTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    pub(crate) fn roots_mut(&mut self) -> &mut Vec<Node> {
        &mut self.roots
    }

    /// 已注册 locale，字典序
    pub fn locales(&self) -> &BTreeSet<String> {
        &self.locales
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn document_count(&self) -> usize {
        self.roots.iter().map(Node::document_count).sum()
    }

    pub fn find_node(&self, full_key: &str) -> Option<&Node> {
        let mut path = Vec::new();
        if !index_path(&self.roots, full_key, &mut path) {
            return None;
        }
        node_at_path(&self.roots, &path)
    }

    /// 注册新 locale，返回归一化后的代码
    pub fn register_locale(&mut self, code: &str) -> Result<String, TreeError> {
        let normalized = locale::normalize(code);
        if !locale::is_valid(&normalized) {
            return Err(TreeError::InvalidLocale(code.to_string()));
        }
        if !self.locales.insert(normalized.clone()) {
            return Err(TreeError::DuplicateLocale(normalized));
        }
        Ok(normalized)
    }

    /// 加载路径用的幂等登记
    pub(crate) fn note_locale(&mut self, code: &str) {
        self.locales.insert(code.to_string());
    }

    /// 新建分组节点；`parent` 为 None 时挂到顶层
    pub fn add_container(&mut self, parent: Option<&str>, key: &str) -> Result<String, TreeError> {
        self.add_child(parent, key, |full_key| Node::container(full_key))
    }

    /// 新建叶子翻译节点；`parent` 为 None 时挂到顶层
    pub fn add_document(&mut self, parent: Option<&str>, key: &str) -> Result<String, TreeError> {
        self.add_child(parent, key, |full_key| Node::document(full_key))
    }

    fn add_child(
        &mut self,
        parent: Option<&str>,
        key: &str,
        make: impl FnOnce(String) -> Node,
    ) -> Result<String, TreeError> {
        validate_segment(key)?;
        let Some(parent_key) = parent else {
            if self.roots.iter().any(|n| n.full_key() == key) {
                return Err(TreeError::DuplicateKey(key.to_string()));
            }
            let full_key = key.to_string();
            self.roots.push(make(full_key.clone()));
            return Ok(full_key);
        };

        let mut path = Vec::new();
        if !index_path(&self.roots, parent_key, &mut path) {
            return Err(TreeError::NodeNotFound(parent_key.to_string()));
        }
        let parent_node = node_at_path_mut(&mut self.roots, &path)
            .ok_or_else(|| TreeError::NodeNotFound(parent_key.to_string()))?;
        if parent_node.is_sequence() {
            return Err(TreeError::SequenceChild(parent_key.to_string()));
        }
        let full_key = format!("{}.{}", parent_key, key);
        let children = parent_node
            .children_mut()
            .ok_or_else(|| TreeError::NotAContainer(parent_key.to_string()))?;
        if children.iter().any(|n| n.full_key() == full_key) {
            return Err(TreeError::DuplicateKey(full_key));
        }
        children.push(make(full_key.clone()));
        Ok(full_key)
    }

    /// 摘除整棵子树并返回
    pub fn remove_node(&mut self, full_key: &str) -> Result<Node, TreeError> {
        let mut path = Vec::new();
        if !index_path(&self.roots, full_key, &mut path) {
            return Err(TreeError::NodeNotFound(full_key.to_string()));
        }
        let (last, parent_path) = match path.split_last() {
            Some(split) => split,
            None => return Err(TreeError::NodeNotFound(full_key.to_string())),
        };
        if parent_path.is_empty() {
            return Ok(self.roots.remove(*last));
        }
        let parent = node_at_path_mut(&mut self.roots, parent_path)
            .ok_or_else(|| TreeError::NodeNotFound(full_key.to_string()))?;
        let children = parent
            .children_mut()
            .ok_or_else(|| TreeError::NodeNotFound(full_key.to_string()))?;
        Ok(children.remove(*last))
    }

    /// 改写末段键名并级联更新后代全键，返回新全键
    pub fn rename_node(&mut self, full_key: &str, new_key: &str) -> Result<String, TreeError> {
        validate_segment(new_key)?;
        let mut path = Vec::new();
        if !index_path(&self.roots, full_key, &mut path) {
            return Err(TreeError::NodeNotFound(full_key.to_string()));
        }
        let new_full_key = {
            let (last, parent_path) = match path.split_last() {
                Some(split) => split,
                None => return Err(TreeError::NodeNotFound(full_key.to_string())),
            };
            let (siblings, parent_prefix) = if parent_path.is_empty() {
                (self.roots.as_slice(), None)
            } else {
                let parent = node_at_path(&self.roots, parent_path)
                    .ok_or_else(|| TreeError::NodeNotFound(full_key.to_string()))?;
                if parent.is_sequence() {
                    return Err(TreeError::SequenceChild(full_key.to_string()));
                }
                (parent.children().unwrap_or(&[]), Some(parent.full_key()))
            };
            let new_full_key = match parent_prefix {
                Some(prefix) => format!("{}.{}", prefix, new_key),
                None => new_key.to_string(),
            };
            let clash = siblings
                .iter()
                .enumerate()
                .any(|(i, n)| i != *last && n.full_key() == new_full_key);
            if clash {
                return Err(TreeError::DuplicateKey(new_full_key));
            }
            new_full_key
        };
        let node = node_at_path_mut(&mut self.roots, &path)
            .ok_or_else(|| TreeError::NodeNotFound(full_key.to_string()))?;
        node.rewrite_full_key(new_full_key.clone());
        Ok(new_full_key)
    }

    /// 写入单条译文；译文无变化时返回 `Ok(false)`
    pub fn update_translation(
        &mut self,
        full_key: &str,
        locale: &str,
        value: &str,
    ) -> Result<bool, TreeError> {
        if !self.locales.contains(locale) {
            return Err(TreeError::UnknownLocale(locale.to_string()));
        }
        let mut path = Vec::new();
        if !index_path(&self.roots, full_key, &mut path) {
            return Err(TreeError::NodeNotFound(full_key.to_string()));
        }
        let node = node_at_path_mut(&mut self.roots, &path)
            .ok_or_else(|| TreeError::NodeNotFound(full_key.to_string()))?;
        let translations = node
            .translations_mut()
            .ok_or_else(|| TreeError::NotADocument(full_key.to_string()))?;
        if translations.get(locale).map(String::as_str) == Some(value) {
            return Ok(false);
        }
        translations.insert(locale.to_string(), value.to_string());
        tracing::debug!("更新译文 {} [{}]", full_key, locale);
        Ok(true)
    }
}

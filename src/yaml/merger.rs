//! 逐源并树
//!
//! 每条全键路径首次出现时定型，其后只做增量合并。类型冲突的路径
//! 整棵移除并立墓碑，后续来源再撞上同一路径只告警不复活。唯一的
//! 通融是单复数修复：既有叶子遇到 one/other 映射时升级成分组，
//! 旧译文先复制到两个子键，再让带复数的来源覆盖自己的部分。

use std::collections::HashMap;

use crate::model::node::{self, Node, NodeKind};
use crate::model::warning::Warning;
use crate::yaml::reader::RawNode;

/// 路径的终身状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathState {
    Live,
    Dropped,
}

pub(crate) struct Merger {
    seen: HashMap<String, PathState>,
    warnings: Vec<Warning>,
}

impl Merger {
    pub(crate) fn new() -> Self {
        Self { seen: HashMap::new(), warnings: Vec::new() }
    }

    pub(crate) fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    /// 把一个接受的源文档并入树
    pub(crate) fn merge_source(&mut self, roots: &mut Vec<Node>, locale: &str, content: &RawNode) {
        match content {
            RawNode::Mapping(entries) => {
                tracing::debug!("并入 locale {}，顶层 {} 个键", locale, entries.len());
                self.merge_entries(roots, "", entries, locale);
            }
            _ => {
                tracing::debug!("locale {} 的内容根不是映射，忽略", locale);
            }
        }
    }

    /// 同级条目按键名排序后逐个并入；重复键靠稳定排序保住先后次序
    fn merge_entries(
        &mut self,
        siblings: &mut Vec<Node>,
        parent_key: &str,
        entries: &[(String, RawNode)],
        locale: &str,
    ) {
        let mut ordered: Vec<&(String, RawNode)> = entries.iter().collect();
        ordered.sort_by(|a, b| a.0.cmp(&b.0));
        for (own_key, value) in ordered {
            self.merge_one(siblings, parent_key, own_key, value, locale);
        }
    }

    fn merge_sequence_items(
        &mut self,
        siblings: &mut Vec<Node>,
        parent_key: &str,
        items: &[RawNode],
        locale: &str,
    ) {
        for (index, item) in items.iter().enumerate() {
            let own_key = node::sequence_index_key(index);
            self.merge_one(siblings, parent_key, &own_key, item, locale);
        }
    }

    fn merge_one(
        &mut self,
        siblings: &mut Vec<Node>,
        parent_key: &str,
        own_key: &str,
        value: &RawNode,
        locale: &str,
    ) {
        let full_key = join_key(parent_key, own_key);
        if self.seen.get(&full_key) == Some(&PathState::Dropped) {
            self.warn_mismatch(locale, &full_key);
            return;
        }
        let Some(position) = siblings.iter().position(|n| n.full_key() == full_key) else {
            let created = self.create_node(&full_key, value, locale);
            self.seen.insert(full_key, PathState::Live);
            siblings.push(created);
            return;
        };
        let (is_document, is_sequence, is_container) = {
            let existing = &siblings[position];
            (existing.is_document(), existing.is_sequence(), existing.is_container())
        };
        match value {
            RawNode::Scalar(text) if is_document => {
                siblings[position].set_translation(locale, text.clone());
            }
            RawNode::Sequence(items) if is_sequence => {
                if let Some(children) = siblings[position].children_mut() {
                    self.merge_sequence_items(children, &full_key, items, locale);
                }
            }
            RawNode::Mapping(entries) if is_container => {
                if let Some(children) = siblings[position].children_mut() {
                    self.merge_entries(children, &full_key, entries, locale);
                }
            }
            RawNode::Mapping(entries) if is_document && has_plural_pair(entries) => {
                self.promote_to_plural(&mut siblings[position], &full_key);
                if let Some(children) = siblings[position].children_mut() {
                    self.merge_entries(children, &full_key, entries, locale);
                }
            }
            _ => self.drop_node(siblings, position, locale, &full_key),
        }
    }

    fn create_node(&mut self, full_key: &str, value: &RawNode, locale: &str) -> Node {
        match value {
            RawNode::Scalar(text) => {
                let mut created = Node::document(full_key);
                created.set_translation(locale, text.clone());
                created
            }
            RawNode::Sequence(items) => {
                let mut created = Node::sequence(full_key);
                if let Some(children) = created.children_mut() {
                    self.merge_sequence_items(children, full_key, items, locale);
                }
                created
            }
            RawNode::Mapping(entries) => {
                let mut created = Node::container(full_key);
                if let Some(children) = created.children_mut() {
                    self.merge_entries(children, full_key, entries, locale);
                }
                created
            }
        }
    }

    /// 叶子升级为 one/other 分组，旧译文先整份复制到两个子键
    fn promote_to_plural(&mut self, existing: &mut Node, full_key: &str) {
        let translations = existing.translations().cloned().unwrap_or_default();
        existing.set_kind(NodeKind::Container { children: Vec::new() });
        for plural in ["one", "other"] {
            let child_key = format!("{}.{}", full_key, plural);
            let mut child = Node::document(child_key.clone());
            for (locale, value) in &translations {
                child.set_translation(locale, value.clone());
            }
            self.seen.insert(child_key, PathState::Live);
            existing.push_child(child);
        }
        tracing::debug!("键 {} 升级为单复数分组", full_key);
    }

    fn drop_node(&mut self, siblings: &mut Vec<Node>, position: usize, locale: &str, full_key: &str) {
        siblings.remove(position);
        self.seen.insert(full_key.to_string(), PathState::Dropped);
        self.warn_mismatch(locale, full_key);
    }

    fn warn_mismatch(&mut self, locale: &str, full_key: &str) {
        let message = format!("locale {} 的键 {} 与既有结构冲突，已从树中移除", locale, full_key);
        tracing::warn!("{}", message);
        self.warnings.push(Warning::with_suppress_key(message, full_key));
    }
}

fn join_key(parent_key: &str, own_key: &str) -> String {
    if parent_key.is_empty() {
        own_key.to_string()
    } else {
        format!("{}.{}", parent_key, own_key)
    }
}

fn has_plural_pair(entries: &[(String, RawNode)]) -> bool {
    entries.iter().any(|(k, _)| k == "one") && entries.iter().any(|(k, _)| k == "other")
}

//! 节点模型：键树的唯一实体，种类由封闭枚举承载

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 序列子节点索引键的固定宽度（如 `[0042]`）
pub(crate) const SEQUENCE_INDEX_WIDTH: usize = 4;

/// 节点种类：子节点集合与译文表互斥，由变体本身保证
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// 含命名子节点的分组节点
    Container { children: Vec<Node> },
    /// 按位置排序的数组节点，子节点键形如 `[0000]`
    Sequence { children: Vec<Node> },
    /// 叶子节点：locale → 译文
    Document { translations: BTreeMap<String, String> },
}

/// 树中的一个节点，由点分全键唯一定位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    full_key: String,
    kind: NodeKind,
}

impl Node {
    pub fn container(full_key: impl Into<String>) -> Self {
        Self {
            full_key: full_key.into(),
            kind: NodeKind::Container { children: Vec::new() },
        }
    }

    pub fn sequence(full_key: impl Into<String>) -> Self {
        Self {
            full_key: full_key.into(),
            kind: NodeKind::Sequence { children: Vec::new() },
        }
    }

    pub fn document(full_key: impl Into<String>) -> Self {
        Self {
            full_key: full_key.into(),
            kind: NodeKind::Document { translations: BTreeMap::new() },
        }
    }

    pub fn full_key(&self) -> &str {
        &self.full_key
    }

    /// 末段键名，始终由全键推导
    pub fn own_key(&self) -> &str {
        match self.full_key.rfind('.') {
            Some(i) => &self.full_key[i + 1..],
            None => &self.full_key,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container { .. })
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.kind, NodeKind::Sequence { .. })
    }

    pub fn is_document(&self) -> bool {
        matches!(self.kind, NodeKind::Document { .. })
    }

    /// 子节点（叶子节点返回 None）
    pub fn children(&self) -> Option<&[Node]> {
        match &self.kind {
            NodeKind::Container { children } | NodeKind::Sequence { children } => Some(children),
            NodeKind::Document { .. } => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.kind {
            NodeKind::Container { children } | NodeKind::Sequence { children } => Some(children),
            NodeKind::Document { .. } => None,
        }
    }

    /// 译文表（非叶子节点返回 None）
    pub fn translations(&self) -> Option<&BTreeMap<String, String>> {
        match &self.kind {
            NodeKind::Document { translations } => Some(translations),
            _ => None,
        }
    }

    pub(crate) fn translations_mut(&mut self) -> Option<&mut BTreeMap<String, String>> {
        match &mut self.kind {
            NodeKind::Document { translations } => Some(translations),
            _ => None,
        }
    }

    pub(crate) fn set_kind(&mut self, kind: NodeKind) {
        self.kind = kind;
    }

    pub(crate) fn push_child(&mut self, child: Node) {
        if let Some(children) = self.children_mut() {
            children.push(child);
        }
    }

    pub(crate) fn set_translation(&mut self, locale: &str, value: impl Into<String>) {
        if let NodeKind::Document { translations } = &mut self.kind {
            translations.insert(locale.to_string(), value.into());
        }
    }

    /// 对叶子节点按查询打分；首条命中规则生效，容器类节点恒为 0
    pub fn search_score(&self, query: &str) -> f64 {
        let translations = match &self.kind {
            NodeKind::Document { translations } => translations,
            _ => return 0.0,
        };
        if self.full_key == query {
            return 1.0;
        }
        if self.full_key.contains(query) {
            return 0.5;
        }
        if translations.values().any(|v| v == query) {
            return 0.7;
        }
        if translations.values().any(|v| v.contains(query)) {
            return 0.3;
        }
        0.0
    }

    /// 改写全键并级联改写全部后代的前缀
    pub(crate) fn rewrite_full_key(&mut self, new_full_key: String) {
        let old_len = self.full_key.len();
        if let NodeKind::Container { children } | NodeKind::Sequence { children } = &mut self.kind {
            for child in children {
                let suffix = child.full_key[old_len..].to_string();
                child.rewrite_full_key(format!("{}{}", new_full_key, suffix));
            }
        }
        self.full_key = new_full_key;
    }

    /// 本子树内叶子节点总数
    pub fn document_count(&self) -> usize {
        match &self.kind {
            NodeKind::Document { .. } => 1,
            NodeKind::Container { children } | NodeKind::Sequence { children } => {
                children.iter().map(Node::document_count).sum()
            }
        }
    }
}

/// 生成序列子节点的括号索引键
pub(crate) fn sequence_index_key(index: usize) -> String {
    format!("[{:0width$}]", index, width = SEQUENCE_INDEX_WIDTH)
}

/// 解析括号索引键；非索引形式返回 None
pub(crate) fn parse_sequence_index(key: &str) -> Option<usize> {
    let inner = key.strip_prefix('[')?.strip_suffix(']')?;
    if inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    inner.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_key_derivation() {
        assert_eq!(Node::container("errors").own_key(), "errors");
        assert_eq!(Node::document("errors.not_found").own_key(), "not_found");
        assert_eq!(Node::document("a.b.c").own_key(), "c");
    }

    #[test]
    fn test_rename_cascades_to_descendants() {
        let mut root = Node::container("errors");
        let mut mid = Node::container("errors.http");
        mid.push_child(Node::document("errors.http.not_found"));
        root.push_child(mid);
        root.push_child(Node::document("errors.timeout"));

        root.rewrite_full_key("faults".to_string());

        assert_eq!(root.full_key(), "faults");
        let children = root.children().expect("容器应有子节点");
        assert_eq!(children[0].full_key(), "faults.http");
        assert_eq!(
            children[0].children().expect("容器应有子节点")[0].full_key(),
            "faults.http.not_found"
        );
        assert_eq!(children[1].full_key(), "faults.timeout");
    }

    #[test]
    fn test_search_score_ladder() {
        let mut node = Node::document("menu.file.open");
        node.set_translation("en", "Open File");
        node.set_translation("de", "Datei öffnen");

        assert_eq!(node.search_score("menu.file.open"), 1.0, "全键精确匹配应得 1.0");
        assert_eq!(node.search_score("file"), 0.5, "全键子串匹配应得 0.5");
        assert_eq!(node.search_score("Open File"), 0.7, "译文精确匹配应得 0.7");
        assert_eq!(node.search_score("öffn"), 0.3, "译文子串匹配应得 0.3");
        assert_eq!(node.search_score("missing"), 0.0, "无匹配应得 0");
    }

    #[test]
    fn test_key_substring_outranks_translation_equality() {
        let mut node = Node::document("title");
        node.set_translation("en", "tit");
        // 全键子串规则先于译文规则
        assert_eq!(node.search_score("tit"), 0.5);
    }

    #[test]
    fn test_container_never_scores() {
        let node = Node::container("menu");
        assert_eq!(node.search_score("menu"), 0.0, "容器节点不参与打分");
    }

    #[test]
    fn test_sequence_index_keys() {
        assert_eq!(sequence_index_key(0), "[0000]");
        assert_eq!(sequence_index_key(42), "[0042]");
        assert_eq!(sequence_index_key(12345), "[12345]");

        assert_eq!(parse_sequence_index("[0007]"), Some(7));
        assert_eq!(parse_sequence_index("[12345]"), Some(12345));
        assert_eq!(parse_sequence_index("[00x7]"), None);
        assert_eq!(parse_sequence_index("[]"), None);
        assert_eq!(parse_sequence_index("name"), None);
    }

    #[test]
    fn test_push_child_ignored_on_document() {
        let mut node = Node::document("title");
        node.push_child(Node::document("title.x"));
        assert!(node.children().is_none(), "叶子节点不接受子节点");
    }

    #[test]
    fn test_document_count() {
        let mut root = Node::container("a");
        root.push_child(Node::document("a.x"));
        let mut seq = Node::sequence("a.list");
        seq.push_child(Node::document("a.list.[0000]"));
        seq.push_child(Node::document("a.list.[0001]"));
        root.push_child(seq);

        assert_eq!(root.document_count(), 3);
    }

    #[test]
    fn test_serde_snapshot_roundtrip() {
        let mut node = Node::document("greeting");
        node.set_translation("de", "hallo");
        let json = serde_json::to_string(&node).expect("序列化应成功");
        let back: Node = serde_json::from_str(&json).expect("反序列化应成功");
        assert_eq!(back, node, "快照往返应保持相等");
    }
}

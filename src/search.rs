//! 打分搜索
//!
//! 打分只看叶子节点，树结构不参与排名。结果在后台线程算好后凭
//! 世代计数决定交付还是丢弃：谁最后发起谁说了算，旧结果永远不会
//! 盖过新结果。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crate::model::node::Node;
use crate::model::tree::TranslationTree;

/// 一次搜索最多返回的结果数
pub const MAX_RESULTS: usize = 20;

/// 低于此分的命中不收录
const SCORE_FLOOR: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub full_key: String,
    pub score: f64,
}

/// 对整棵树打分，按分数降序取前二十；同分保持先序遍历次序
pub fn ranked(roots: &[Node], query: &str) -> Vec<SearchHit> {
    if query.is_empty() {
        return Vec::new();
    }
    let mut hits = Vec::new();
    collect_hits(roots, query, &mut hits);
    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    hits.truncate(MAX_RESULTS);
    hits
}

fn collect_hits(nodes: &[Node], query: &str, hits: &mut Vec<SearchHit>) {
    for node in nodes {
        match node.children() {
            Some(children) => collect_hits(children, query, hits),
            None => {
                let score = node.search_score(query);
                if score > SCORE_FLOOR {
                    hits.push(SearchHit { full_key: node.full_key().to_string(), score });
                }
            }
        }
    }
}

/// 世代计数器：每次发起都推进一代，旧代的在途结果一律作废
#[derive(Debug, Default, Clone)]
pub struct SearchCoordinator {
    latest: Arc<AtomicU64>,
}

impl SearchCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == generation
    }

    /// 不发起新搜索，仅作废在途的一轮
    pub fn cancel(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// 在后台线程跑一轮搜索，交付前再确认本代仍是最新
    pub fn launch<F>(&self, tree: &TranslationTree, query: &str, deliver: F) -> u64
    where
        F: FnOnce(Vec<SearchHit>) + Send + 'static,
    {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let trimmed = query.trim();
        if trimmed.is_empty() {
            tracing::debug!("空查询只作废在途搜索");
            return generation;
        }
        let snapshot: Vec<Node> = tree.roots().to_vec();
        let query = trimmed.to_string();
        let latest = Arc::clone(&self.latest);
        thread::spawn(move || {
            let hits = ranked(&snapshot, &query);
            if latest.load(Ordering::SeqCst) == generation {
                deliver(hits);
            } else {
                tracing::debug!("第 {} 代搜索已被取代，丢弃 {} 条结果", generation, hits.len());
            }
        });
        generation
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;
    use crate::yaml::{load, Source};

    fn sample_tree() -> TranslationTree {
        load(vec![Source::new(
            "zz",
            "zz:\n  a:\n    b: hello\n  q:\n    a:\n      b:\n        c: deep\n",
        )])
        .expect("加载应成功")
        .tree
    }

    #[test]
    fn test_exact_key_outranks_substring() {
        let tree = sample_tree();
        let hits = ranked(tree.roots(), "a.b");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].full_key, "a.b");
        assert_eq!(hits[0].score, 1.0);
        assert_eq!(hits[1].full_key, "q.a.b.c");
        assert_eq!(hits[1].score, 0.5);
    }

    #[test]
    fn test_translation_matches() {
        let tree = sample_tree();
        let exact = ranked(tree.roots(), "hello");
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].full_key, "a.b");
        assert_eq!(exact[0].score, 0.7);

        let partial = ranked(tree.roots(), "ell");
        assert_eq!(partial.len(), 1);
        assert_eq!(partial[0].score, 0.3);
    }

    #[test]
    fn test_no_hits_below_floor() {
        let tree = sample_tree();
        assert!(ranked(tree.roots(), "übersetzung").is_empty());
        assert!(ranked(tree.roots(), "").is_empty());
    }

    #[test]
    fn test_results_capped_in_traversal_order() {
        let mut text = String::from("zz:\n");
        for i in 0..25 {
            text.push_str(&format!("  key{:02}: value\n", i));
        }
        let tree = load(vec![Source::new("zz", text)]).expect("加载应成功").tree;

        let hits = ranked(tree.roots(), "key");
        assert_eq!(hits.len(), MAX_RESULTS);
        assert_eq!(hits[0].full_key, "key00");
        assert_eq!(hits[19].full_key, "key19");
    }

    #[test]
    fn test_coordinator_delivers_current_results() {
        let tree = sample_tree();
        let coordinator = SearchCoordinator::new();
        let (tx, rx) = mpsc::channel();
        let generation = coordinator.launch(&tree, "hello", move |hits| {
            tx.send(hits).expect("通道应可用");
        });

        let hits = rx.recv_timeout(Duration::from_secs(5)).expect("应交付结果");
        assert!(coordinator.is_current(generation));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].full_key, "a.b");
    }

    #[test]
    fn test_empty_query_cancels_without_delivery() {
        let tree = sample_tree();
        let coordinator = SearchCoordinator::new();
        let before = coordinator.current_generation();
        let (tx, rx) = mpsc::channel::<Vec<SearchHit>>();
        let generation = coordinator.launch(&tree, "   ", move |hits| {
            tx.send(hits).expect("通道应可用");
        });

        assert!(generation > before, "空查询也要推进世代");
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err(), "空查询不交付结果");
    }

    #[test]
    fn test_superseded_generation_no_longer_current() {
        let tree = sample_tree();
        let coordinator = SearchCoordinator::new();
        let (tx1, _rx1) = mpsc::channel();
        let first = coordinator.launch(&tree, "hello", move |hits| {
            let _ = tx1.send(hits);
        });
        let (tx2, rx2) = mpsc::channel();
        let second = coordinator.launch(&tree, "deep", move |hits| {
            let _ = tx2.send(hits);
        });

        assert!(!coordinator.is_current(first));
        assert!(coordinator.is_current(second));
        let hits = rx2.recv_timeout(Duration::from_secs(5)).expect("最新一轮应交付");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].full_key, "q.a.b.c");
    }

    #[test]
    fn test_cancel_invalidates_in_flight() {
        let tree = sample_tree();
        let coordinator = SearchCoordinator::new();
        let generation = coordinator.launch(&tree, "hello", |_| {});
        let after = coordinator.cancel();

        assert!(!coordinator.is_current(generation));
        assert!(coordinator.is_current(after));
    }
}

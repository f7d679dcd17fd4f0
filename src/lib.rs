//! YAML翻译树工具库
//!
//! 提供多locale YAML文档加载、规范树合并、打分搜索和精确序列化功能
//! 结构冲突自动移除，复数形式键自动修复

pub mod model;
pub mod search;
pub mod utils;
pub mod yaml;

// 重新导出主要类型
pub use model::node::{Node, NodeKind};
pub use model::tree::{TranslationTree, TreeError};
pub use model::warning::Warning;
pub use search::{ranked, SearchCoordinator, SearchHit, MAX_RESULTS};
pub use yaml::writer::{render_locale_document, save, SaveError, SaveReport, FILE_EXTENSION};
pub use yaml::{load, LoadError, LoadOutcome, Source};

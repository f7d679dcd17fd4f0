//! YAML 侧的总入口
//!
//! `load` 把一批源文档折叠成一棵翻译树：解析彼此独立所以并行跑，
//! 装配前按来源名排序，保证结果与传入顺序无关。语法级失败让整批
//! 报错；结构不符的文档跳过并汇总成一条告警；类型冲突的键由并树
//! 器逐个记录。写回走 `writer`。

mod merger;
mod reader;
mod scalar;
pub mod writer;

use std::path::PathBuf;
use std::thread;

use thiserror::Error;
use yaml_rust::scanner::ScanError;

use crate::model::locale;
use crate::model::tree::TranslationTree;
use crate::model::warning::Warning;

use self::merger::Merger;
use self::reader::{ParsedSource, RawNode, ReadError};

/// 一份待加载的源文档；身份名就是去掉扩展名的文件名
#[derive(Debug, Clone)]
pub struct Source {
    pub identity: String,
    pub text: String,
    pub origin: Option<PathBuf>,
}

impl Source {
    pub fn new(identity: impl Into<String>, text: impl Into<String>) -> Self {
        Self { identity: identity.into(), text: text.into(), origin: None }
    }

    pub fn with_origin(
        identity: impl Into<String>,
        text: impl Into<String>,
        origin: PathBuf,
    ) -> Self {
        Self { identity: identity.into(), text: text.into(), origin: Some(origin) }
    }
}

/// 一次加载的全部产出
#[derive(Debug)]
pub struct LoadOutcome {
    pub tree: TranslationTree,
    /// 被接受的来源与其 locale，按来源名排序
    pub locale_by_source: Vec<(String, String)>,
    pub warnings: Vec<Warning>,
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("解析 {name} 失败: {source}")]
    Parse {
        name: String,
        #[source]
        source: ScanError,
    },
    #[error("{name} 含不受支持的结构: {detail}")]
    Unsupported { name: String, detail: String },
}

/// 把一批源文档折叠成翻译树
pub fn load(sources: Vec<Source>) -> Result<LoadOutcome, LoadError> {
    tracing::info!("开始加载 {} 个源文档", sources.len());
    let mut parsed = parse_all(&sources);

    let mut order: Vec<usize> = (0..sources.len()).collect();
    order.sort_by(|&a, &b| sources[a].identity.cmp(&sources[b].identity));

    // 先把整批判定完，任何解析失败都不进入装配
    let mut accepted: Vec<(&Source, String, RawNode)> = Vec::new();
    let mut skipped: Vec<&Source> = Vec::new();
    for ix in order {
        let source = &sources[ix];
        let Some(result) = parsed[ix].take() else {
            continue;
        };
        match result {
            Ok(ParsedSource::Accepted { locale, content }) => {
                let code = locale::normalize(&locale);
                if locale::is_valid(&code) {
                    accepted.push((source, code, content));
                } else {
                    tracing::warn!("{} 的顶层键不是合法 locale，跳过", source.identity);
                    skipped.push(source);
                }
            }
            Ok(ParsedSource::Skipped) => {
                tracing::warn!("{} 结构不符合约定，跳过", source.identity);
                skipped.push(source);
            }
            Err(ReadError::Scan(scan)) => {
                return Err(LoadError::Parse { name: source.identity.clone(), source: scan });
            }
            Err(ReadError::Unsupported(detail)) => {
                return Err(LoadError::Unsupported { name: source.identity.clone(), detail });
            }
        }
    }

    let mut tree = TranslationTree::new();
    let mut merger = Merger::new();
    let mut locale_by_source = Vec::new();
    for (source, code, content) in &accepted {
        tree.note_locale(code);
        locale_by_source.push((source.identity.clone(), code.clone()));
        merger.merge_source(tree.roots_mut(), code, content);
    }
    let mut warnings = merger.into_warnings();

    // 跳过的来源汇总成一条告警，排在逐键告警之后
    if !skipped.is_empty() {
        let names: Vec<&str> = skipped.iter().map(|s| s.identity.as_str()).collect();
        let message = format!("以下源文档加载失败：{}", names.join("、"));
        warnings.push(match skip_suppress_key(&skipped) {
            Some(key) => Warning::with_suppress_key(message, key),
            None => Warning::new(message),
        });
    }

    tracing::info!(
        "加载完成：{} 个 locale，{} 个叶子节点，{} 条告警",
        tree.locales().len(),
        tree.document_count(),
        warnings.len()
    );
    Ok(LoadOutcome { tree, locale_by_source, warnings })
}

/// 解析互不依赖，按源并行
fn parse_all(sources: &[Source]) -> Vec<Option<Result<ParsedSource, ReadError>>> {
    thread::scope(|scope| {
        let handles: Vec<_> = sources
            .iter()
            .map(|source| scope.spawn(move || reader::parse_source(&source.identity, &source.text)))
            .collect();
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => Some(result),
                Err(_) => Some(Err(ReadError::Unsupported("解析线程异常退出".to_string()))),
            })
            .collect()
    })
}

/// 跳过告警的抑制键：第一个带来源路径的跳过项所在目录
fn skip_suppress_key(skipped: &[&Source]) -> Option<String> {
    let origin = skipped.iter().find_map(|s| s.origin.as_deref())?;
    let parent = origin.parent()?;
    Some(parent.to_string_lossy().into_owned())
}

//! YAML 事件流读取
//!
//! 不走通用的 Yaml 值类型，直接消费解析事件搭出原始节点，
//! 顺带把受限子集之外的结构（复合键、多文档流）拦在门口。
//! 每个源文档最终只分三种命运：接受、跳过、整批报错。

use std::collections::HashMap;

use yaml_rust::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust::scanner::{Marker, ScanError, TScalarStyle};

/// 解析得到的原始文档节点，键序保持文档原貌
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawNode {
    Mapping(Vec<(String, RawNode)>),
    Sequence(Vec<RawNode>),
    Scalar(String),
}

/// 单个源文档的判定结果
#[derive(Debug)]
pub(crate) enum ParsedSource {
    /// 顶层恰好一个键且与来源名一致
    Accepted { locale: String, content: RawNode },
    /// 结构不符合约定，整个文档跳过
    Skipped,
}

#[derive(Debug)]
pub(crate) enum ReadError {
    Scan(ScanError),
    Unsupported(String),
}

enum Frame {
    Mapping {
        entries: Vec<(String, RawNode)>,
        pending_key: Option<String>,
        anchor: usize,
    },
    Sequence {
        items: Vec<RawNode>,
        anchor: usize,
    },
}

/// 事件接收器：帧栈自下而上拼装节点
#[derive(Default)]
struct RawBuilder {
    stack: Vec<Frame>,
    root: Option<RawNode>,
    anchors: HashMap<usize, RawNode>,
    unsupported: Option<String>,
}

impl RawBuilder {
    fn begin_collection(&mut self, frame: Frame) {
        // 键位置出现集合就是复合键
        if matches!(self.stack.last(), Some(Frame::Mapping { pending_key: None, .. })) {
            self.unsupported = Some("映射键必须是标量".to_string());
            return;
        }
        self.stack.push(frame);
    }

    fn attach(&mut self, node: RawNode) {
        match self.stack.last_mut() {
            None => {
                if self.root.is_some() {
                    self.unsupported = Some("流包含多个文档".to_string());
                } else {
                    self.root = Some(node);
                }
            }
            Some(Frame::Sequence { items, .. }) => items.push(node),
            Some(Frame::Mapping { entries, pending_key, .. }) => match pending_key.take() {
                Some(key) => entries.push((key, node)),
                None => match node {
                    RawNode::Scalar(text) => *pending_key = Some(text),
                    _ => {
                        self.unsupported = Some("映射键必须是标量".to_string());
                    }
                },
            },
        }
    }
}

impl MarkedEventReceiver for RawBuilder {
    fn on_event(&mut self, ev: Event, _mark: Marker) {
        if self.unsupported.is_some() {
            return;
        }
        match ev {
            Event::Nothing
            | Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart
            | Event::DocumentEnd => {}
            Event::Scalar(text, style, anchor_id, tag) => {
                let node = RawNode::Scalar(scalar_text(text, style, tag.is_some()));
                if anchor_id > 0 {
                    self.anchors.insert(anchor_id, node.clone());
                }
                self.attach(node);
            }
            Event::SequenceStart(anchor_id) => {
                self.begin_collection(Frame::Sequence { items: Vec::new(), anchor: anchor_id });
            }
            Event::MappingStart(anchor_id) => {
                self.begin_collection(Frame::Mapping {
                    entries: Vec::new(),
                    pending_key: None,
                    anchor: anchor_id,
                });
            }
            Event::SequenceEnd => {
                let Some(Frame::Sequence { items, anchor }) = self.stack.pop() else {
                    self.unsupported = Some("序列结束事件不配对".to_string());
                    return;
                };
                let node = RawNode::Sequence(items);
                if anchor > 0 {
                    self.anchors.insert(anchor, node.clone());
                }
                self.attach(node);
            }
            Event::MappingEnd => {
                let Some(Frame::Mapping { entries, anchor, .. }) = self.stack.pop() else {
                    self.unsupported = Some("映射结束事件不配对".to_string());
                    return;
                };
                let node = RawNode::Mapping(entries);
                if anchor > 0 {
                    self.anchors.insert(anchor, node.clone());
                }
                self.attach(node);
            }
            Event::Alias(anchor_id) => match self.anchors.get(&anchor_id) {
                Some(node) => {
                    let node = node.clone();
                    self.attach(node);
                }
                None => {
                    self.unsupported = Some(format!("别名指向未知锚点 {}", anchor_id));
                }
            },
        }
    }
}

/// 平文 `~` 与缺省值都按空译文处理，其余文本原样保留
fn scalar_text(text: String, style: TScalarStyle, tagged: bool) -> String {
    if !tagged && matches!(style, TScalarStyle::Plain) && text == "~" {
        return String::new();
    }
    text
}

/// 解析一个源文档并判定去留
pub(crate) fn parse_source(identity: &str, text: &str) -> Result<ParsedSource, ReadError> {
    let mut parser = Parser::new(text.trim().chars());
    let mut builder = RawBuilder::default();
    parser.load(&mut builder, true).map_err(ReadError::Scan)?;
    if let Some(detail) = builder.unsupported {
        return Err(ReadError::Unsupported(detail));
    }
    let Some(root) = builder.root else {
        tracing::debug!("{} 是空文档，跳过", identity);
        return Ok(ParsedSource::Skipped);
    };
    let RawNode::Mapping(mut entries) = root else {
        tracing::debug!("{} 顶层不是映射，跳过", identity);
        return Ok(ParsedSource::Skipped);
    };
    if entries.len() != 1 {
        tracing::debug!("{} 顶层键数量不是 1，跳过", identity);
        return Ok(ParsedSource::Skipped);
    }
    let Some((key, content)) = entries.pop() else {
        return Ok(ParsedSource::Skipped);
    };
    if key != identity {
        tracing::debug!("{} 顶层键 {} 与来源名不符，跳过", identity, key);
        return Ok(ParsedSource::Skipped);
    }
    Ok(ParsedSource::Accepted { locale: key, content })
}

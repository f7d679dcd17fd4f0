//! 加载过程中产生的非致命告警

use std::fmt;

/// 一条告警；`suppress_key` 供上层做“不再提示”式去重
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    message: String,
    suppress_key: Option<String>,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), suppress_key: None }
    }

    pub fn with_suppress_key(message: impl Into<String>, suppress_key: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suppress_key: Some(suppress_key.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn suppress_key(&self) -> Option<&str> {
        self.suppress_key.as_deref()
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult, ConfigValidator};

/// 服务身份配置
///
/// `name` 同时作为路由键前缀和队列名称，`description` 仅用于展示。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl ServiceConfig {
    pub fn new<N: Into<String>, D: Into<String>>(name: N, description: D) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

impl ConfigValidator for ServiceConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation("服务名称不能为空".to_string()));
        }
        // 路由键以 "." 分段，"*" 和 "#" 是 topic 交换机的通配符
        if self.name.contains(['.', '*', '#']) {
            return Err(ConfigError::Validation(format!(
                "服务名称不能包含 '.', '*' 或 '#': {}",
                self.name
            )));
        }
        Ok(())
    }
}
